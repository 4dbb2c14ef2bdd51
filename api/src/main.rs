use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod agent;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OMTeam AI Server",
        version = "0.1.0",
        description = "Gateway between the OMTeam app and the coaching agent. Every AI result is validated before it is returned."
    ),
    paths(
        routes::health::root,
        routes::health::health_check,
        routes::missions::create_daily_missions,
        routes::analysis::create_daily_feedback,
        routes::analysis::create_weekly_analysis,
        routes::chat::create_chat_session,
        routes::chat::handle_chat_message,
    ),
    components(schemas(
        HealthResponse,
        routes::health::RootResponse,
        omteam_core::error::ApiError,
        omteam_core::missions::DailyMissionRequest,
        omteam_core::missions::DailyMissionResponse,
        omteam_core::analysis::DailyFeedbackRequest,
        omteam_core::analysis::DailyFeedbackResponse,
        omteam_core::analysis::WeeklyAnalysisRequest,
        omteam_core::analysis::WeeklyAnalysisResponse,
        omteam_core::chat::ChatSessionRequest,
        omteam_core::chat::ChatSessionResponse,
        omteam_core::chat::ChatMessageRequest,
        omteam_core::chat::ChatMessageResponse,
    )),
    tags(
        (name = "missions", description = "Daily mission recommendations"),
        (name = "analysis", description = "Daily feedback and weekly analysis"),
        (name = "chat", description = "Coaching chat"),
        (name = "system", description = "Liveness")
    )
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "omteam_api=debug,omteam_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let agent_config =
        agent::AgentConfig::from_env().expect("agent configuration is incomplete");
    tracing::info!(
        url = %agent_config.url,
        timeout_secs = agent_config.timeout.as_secs(),
        authenticated = agent_config.api_key.is_some(),
        "Agent client configured"
    );
    let agent = agent::HttpAgentClient::new(agent_config).expect("Failed to build agent client");

    let app_state = state::AppState::new(Arc::new(agent));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::ai_router().layer(middleware::rate_limit::ai_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer()),
        )
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("OMTeam AI server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
