use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use omteam_core::error::ApiError;
use omteam_core::missions::{DailyMissionRequest, DailyMissionResponse, DailyMissions};
use omteam_core::pipeline::dispatch;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ai/missions/daily", post(create_daily_missions))
}

/// Recommend today's missions
///
/// Sends the onboarding profile and recent mission history to the agent and
/// returns 2 to 3 validated missions.
#[utoipa::path(
    post,
    path = "/ai/missions/daily",
    request_body = DailyMissionRequest,
    responses(
        (status = 200, description = "Missions recommended", body = DailyMissionResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 500, description = "Agent reply unusable or agent unreachable", body = ApiError)
    ),
    tag = "missions"
)]
pub async fn create_daily_missions(
    State(state): State<AppState>,
    AppJson(req): AppJson<DailyMissionRequest>,
) -> Result<Json<DailyMissionResponse>, AppError> {
    let response = dispatch::<DailyMissions>(state.agent.as_ref(), &req).await?;
    Ok(Json(response))
}
