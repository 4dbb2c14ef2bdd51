use axum::Router;

use crate::state::AppState;

pub mod analysis;
pub mod chat;
pub mod health;
pub mod missions;

/// Every route that costs an agent call.
pub fn ai_router() -> Router<AppState> {
    Router::new()
        .merge(missions::router())
        .merge(analysis::router())
        .merge(chat::router())
}
