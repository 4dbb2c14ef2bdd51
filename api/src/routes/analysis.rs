use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use omteam_core::analysis::{
    DailyFeedback, DailyFeedbackRequest, DailyFeedbackResponse, WeeklyAnalysis,
    WeeklyAnalysisRequest, WeeklyAnalysisResponse,
};
use omteam_core::error::ApiError;
use omteam_core::pipeline::dispatch;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai/analysis/daily", post(create_daily_feedback))
        .route("/ai/analysis/weekly", post(create_weekly_analysis))
}

/// Daily feedback on today's mission outcome
#[utoipa::path(
    post,
    path = "/ai/analysis/daily",
    request_body = DailyFeedbackRequest,
    responses(
        (status = 200, description = "Feedback generated", body = DailyFeedbackResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 500, description = "Agent reply unusable or agent unreachable", body = ApiError)
    ),
    tag = "analysis"
)]
pub async fn create_daily_feedback(
    State(state): State<AppState>,
    AppJson(req): AppJson<DailyFeedbackRequest>,
) -> Result<Json<DailyFeedbackResponse>, AppError> {
    let response = dispatch::<DailyFeedback>(state.agent.as_ref(), &req).await?;
    Ok(Json(response))
}

/// Weekly analysis of mission outcomes
#[utoipa::path(
    post,
    path = "/ai/analysis/weekly",
    request_body = WeeklyAnalysisRequest,
    responses(
        (status = 200, description = "Analysis generated", body = WeeklyAnalysisResponse),
        (status = 400, description = "Validation error (e.g. weekRange.start after weekRange.end)", body = ApiError),
        (status = 500, description = "Agent reply unusable or agent unreachable", body = ApiError)
    ),
    tag = "analysis"
)]
pub async fn create_weekly_analysis(
    State(state): State<AppState>,
    AppJson(req): AppJson<WeeklyAnalysisRequest>,
) -> Result<Json<WeeklyAnalysisResponse>, AppError> {
    req.validate()?;
    let response = dispatch::<WeeklyAnalysis>(state.agent.as_ref(), &req).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use omteam_core::context::ContextValue;
    use serde_json::{Value, json};

    use crate::routes::test_support::{StubAgent, fenced, post_json};

    fn daily_request() -> Value {
        json!({
            "userId": 3,
            "targetDate": "2026-01-10",
            "todayMission": {
                "missionType": "EXERCISE",
                "difficulty": "NORMAL",
                "result": "FAILURE",
                "failureReason": "야근"
            },
            "recentSummary": {"successDays": 4, "failureDays": 2}
        })
    }

    fn weekly_request(start: &str, end: &str) -> Value {
        json!({
            "userId": 3,
            "weekRange": {"start": start, "end": end},
            "weeklyStats": {"totalDays": 7, "successDays": 5, "failureDays": 2},
            "failureReasonsRanked": [{"reason": "시간 부족", "count": 2}]
        })
    }

    #[tokio::test]
    async fn daily_feedback_returns_candidates() {
        let reply = fenced(&json!({
            "feedbackText": "오늘은 아쉬웠지만 꾸준함이 보여요.",
            "encouragementCandidates": [
                {"intent": "RETRY", "title": "다시 도전", "message": "내일 10분만 해봐요"}
            ]
        }));
        let agent = StubAgent::replying(&reply);
        let calls = agent.calls();

        let (status, body) = post_json(agent, "/ai/analysis/daily", &daily_request()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["encouragementCandidates"][0]["intent"], "RETRY");
        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0].context.event["fail_reason"],
            ContextValue::Text("야근".to_string())
        );
    }

    #[tokio::test]
    async fn daily_feedback_missing_field_in_reply_is_contract_violation() {
        let reply = fenced(&json!({"encouragementCandidates": []}));

        let (status, body) =
            post_json(StubAgent::replying(&reply), "/ai/analysis/daily", &daily_request()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "agent_contract_violation");
        assert_eq!(body["field"], "feedbackText");
    }

    #[tokio::test]
    async fn weekly_analysis_accepts_bare_json_reply() {
        let reply = json!({
            "mainFailureReason": "시간 부족",
            "overallFeedback": "이번 주 5일 성공했어요."
        })
        .to_string();

        let (status, body) = post_json(
            StubAgent::replying(&reply),
            "/ai/analysis/weekly",
            &weekly_request("2026-01-05", "2026-01-11"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mainFailureReason"], "시간 부족");
    }

    #[tokio::test]
    async fn weekly_analysis_rejects_inverted_range() {
        let agent = StubAgent::replying("{}");
        let calls = agent.calls();

        let (status, body) = post_json(
            agent,
            "/ai/analysis/weekly",
            &weekly_request("2026-01-11", "2026-01-05"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "weekRange");
        assert!(calls.lock().unwrap().is_empty());
    }
}
