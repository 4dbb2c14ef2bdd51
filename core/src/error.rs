use serde::Serialize;
use utoipa::ToSchema;

use crate::contract::Violation;

/// Structured error response returned to the mobile client.
/// Pipeline failures carry enough detail to tell a broken agent reply
/// apart from an unreachable agent.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "ai_processing_failed")
    pub error: String,
    /// Finer-grained cause within `error` (e.g. "agent_contract_violation")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const AI_PROCESSING_FAILED: &str = "ai_processing_failed";
    pub const RATE_LIMITED: &str = "rate_limited";

    pub const AGENT_RESPONSE_UNPARSABLE: &str = "agent_response_unparsable";
    pub const AGENT_CONTRACT_VIOLATION: &str = "agent_contract_violation";
    pub const AGENT_UNAVAILABLE: &str = "agent_unavailable";
}

/// A request that deserialized but is semantically invalid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidRequest {
    /// camelCase path of the offending request field
    pub field: String,
    pub message: String,
    pub received: Option<serde_json::Value>,
}

/// Opaque failure raised by an [`AgentClient`](crate::pipeline::AgentClient).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AgentError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AgentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Terminal failure of one pipeline run. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The extracted candidate is not a single JSON value.
    #[error("failed to parse agent reply as JSON: {source}")]
    ResponseParse {
        raw_reply: String,
        #[source]
        source: serde_json::Error,
    },
    /// The reply parsed but does not satisfy the result contract.
    #[error("agent reply did not match the {contract} contract: {violation}")]
    ContractValidation {
        contract: &'static str,
        violation: Violation,
        document: serde_json::Value,
    },
    /// The agent call itself failed.
    #[error("agent call failed: {0}")]
    UpstreamAgent(#[from] AgentError),
}

impl PipelineError {
    /// Stable code for the failure kind, used in API error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ResponseParse { .. } => codes::AGENT_RESPONSE_UNPARSABLE,
            PipelineError::ContractValidation { .. } => codes::AGENT_CONTRACT_VIOLATION,
            PipelineError::UpstreamAgent(_) => codes::AGENT_UNAVAILABLE,
        }
    }
}
