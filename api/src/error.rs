use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use omteam_core::error::{self, ApiError, InvalidRequest, PipelineError};

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// The agent pipeline failed (500). Never replaced by fallback content.
    Pipeline(PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    error_code: None,
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::Pipeline(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                pipeline_error_body(err, request_id),
            ),
        };

        (status, Json(api_error)).into_response()
    }
}

/// All pipeline failures share one external error; `error_code` tells them apart.
fn pipeline_error_body(err: PipelineError, request_id: String) -> ApiError {
    let error_code = Some(err.code().to_string());
    let error = error::codes::AI_PROCESSING_FAILED.to_string();

    match err {
        PipelineError::ResponseParse { raw_reply, source } => {
            tracing::error!(request_id = %request_id, error = %source, "Agent reply is not JSON");
            ApiError {
                error,
                error_code,
                message: format!("Failed to parse AI agent's response as JSON: {source}"),
                field: None,
                received: Some(serde_json::Value::String(raw_reply)),
                request_id,
                docs_hint: None,
            }
        }
        PipelineError::ContractValidation {
            contract,
            violation,
            document,
        } => {
            tracing::error!(
                request_id = %request_id,
                contract,
                field = %violation.field,
                document = %document,
                "Agent reply violates result contract"
            );
            ApiError {
                error,
                error_code,
                message: format!(
                    "AI agent's response did not match the expected {contract} schema: {violation}"
                ),
                field: Some(violation.field.to_string()),
                received: Some(violation.received),
                request_id,
                docs_hint: None,
            }
        }
        PipelineError::UpstreamAgent(agent_err) => {
            tracing::error!(request_id = %request_id, error = ?agent_err, "Agent call failed");
            ApiError {
                error,
                error_code,
                message: format!("AI agent call failed: {agent_err}"),
                field: None,
                received: None,
                request_id,
                docs_hint: Some("The agent service may be down or slow; retry later.".to_string()),
            }
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<InvalidRequest> for AppError {
    fn from(err: InvalidRequest) -> Self {
        AppError::Validation {
            message: err.message,
            field: Some(err.field),
            received: err.received,
            docs_hint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use omteam_core::contract::{FieldPath, Violation, ViolationReason};
    use omteam_core::error::AgentError;
    use serde_json::{Value, json};

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn parse_failure_attaches_raw_reply() {
        let source = serde_json::from_str::<Value>("This is not JSON").unwrap_err();
        let err = AppError::from(PipelineError::ResponseParse {
            raw_reply: "This is not JSON".to_string(),
            source,
        });

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "ai_processing_failed");
        assert_eq!(body["error_code"], "agent_response_unparsable");
        assert_eq!(body["received"], "This is not JSON");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Failed to parse AI agent's response as JSON")
        );
    }

    #[tokio::test]
    async fn contract_failure_names_field_and_value() {
        let err = AppError::from(PipelineError::ContractValidation {
            contract: "DailyMissionResponse",
            violation: Violation {
                field: FieldPath::root().key("missions").index(0).key("type"),
                reason: ViolationReason::NotInEnum {
                    allowed: &["EXERCISE", "DIET"],
                },
                received: json!("INVALID_TYPE"),
            },
            document: json!({"missions": [{"type": "INVALID_TYPE"}]}),
        });

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "agent_contract_violation");
        assert_eq!(body["field"], "missions[0].type");
        assert_eq!(body["received"], "INVALID_TYPE");
    }

    #[tokio::test]
    async fn upstream_failure_is_the_same_external_error() {
        let err = AppError::from(PipelineError::from(AgentError::new("connection refused")));

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "ai_processing_failed");
        assert_eq!(body["error_code"], "agent_unavailable");
        assert_eq!(body["message"], "AI agent call failed: connection refused");
    }

    #[tokio::test]
    async fn invalid_request_maps_to_400() {
        let err = AppError::from(InvalidRequest {
            field: "input.value".to_string(),
            message: "input.value is required when input.type is OPTION".to_string(),
            received: None,
        });

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["field"], "input.value");
        assert!(body.get("error_code").is_none());
    }
}
