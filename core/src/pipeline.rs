use async_trait::async_trait;

use crate::contract;
use crate::error::{AgentError, PipelineError};
use crate::operation::{AgentCall, Operation};
use crate::reply;

/// What the agent sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
    /// Which internal agent answered. Diagnostic only.
    pub selected_agent: Option<String>,
}

/// The external conversational agent.
///
/// Timeouts and cancellation are the client's business; whatever it reports
/// is surfaced as [`PipelineError::UpstreamAgent`].
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn invoke(&self, call: &AgentCall) -> Result<AgentReply, AgentError>;
}

/// Run one operation end to end: build the call, invoke the agent once,
/// extract the JSON payload and validate it against the result contract.
pub async fn dispatch<O: Operation>(
    agent: &dyn AgentClient,
    request: &O::Request,
) -> Result<O::Response, PipelineError> {
    let call = O::build_call(request);
    tracing::info!(
        operation = O::NAME,
        caller_id = %call.caller_id,
        "Invoking agent"
    );

    let reply = agent.invoke(&call).await.map_err(|err| {
        tracing::error!(operation = O::NAME, error = %err, "Agent call failed");
        PipelineError::from(err)
    })?;
    tracing::info!(
        operation = O::NAME,
        selected_agent = reply.selected_agent.as_deref().unwrap_or("<unknown>"),
        reply_bytes = reply.text.len(),
        "Agent replied"
    );

    let result = reply::parse_reply(&reply.text).and_then(contract::validate::<O::Response>);
    match &result {
        Err(PipelineError::ContractValidation {
            contract,
            violation,
            ..
        }) => tracing::warn!(
            operation = O::NAME,
            contract = *contract,
            field = %violation.field,
            reason = %violation.reason,
            "Agent reply violates result contract"
        ),
        Err(err) => tracing::warn!(
            operation = O::NAME,
            error = %err,
            "Agent reply is not valid JSON"
        ),
        Ok(_) => {}
    }
    result
}


#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::testing::{StubAgent, fenced};
    use super::*;
    use crate::context::AuxiliaryContext;
    use crate::contract::{Contract, FieldPath, ObjectReader, Violation};

    #[derive(Debug, PartialEq)]
    struct Echo {
        said: String,
    }

    impl Contract for Echo {
        const NAME: &'static str = "Echo";

        fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation> {
            let obj = ObjectReader::new(value, path)?;
            Ok(Echo {
                said: obj.string("said")?,
            })
        }
    }

    struct EchoOperation;

    impl Operation for EchoOperation {
        const NAME: &'static str = "echo";
        type Request = (i64, String);
        type Response = Echo;

        fn caller_id(request: &Self::Request) -> String {
            request.0.to_string()
        }

        fn instruction(request: &Self::Request) -> String {
            format!("say {}", request.1)
        }

        fn context(request: &Self::Request) -> AuxiliaryContext {
            AuxiliaryContext::new().event("word", request.1.as_str())
        }
    }

    #[tokio::test]
    async fn dispatch_builds_call_and_validates_reply() {
        let agent = StubAgent::replying(&fenced(&json!({"said": "hi"})));

        let echo = dispatch::<EchoOperation>(&agent, &(7, "hi".to_string()))
            .await
            .unwrap();

        assert_eq!(echo.said, "hi");
        let call = agent.last_call();
        assert_eq!(call.caller_id, "7");
        assert_eq!(call.instruction, "say hi");
        assert_eq!(
            call.context,
            AuxiliaryContext::new().event("word", "hi")
        );
    }

    #[tokio::test]
    async fn dispatch_invokes_agent_exactly_once_on_failure() {
        let agent = StubAgent::replying("I could not decide, sorry.");

        let err = dispatch::<EchoOperation>(&agent, &(1, "x".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ResponseParse { .. }));
        assert_eq!(agent.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_is_propagated_unchanged() {
        let agent = StubAgent::failing("agent timed out after 60s");

        let err = dispatch::<EchoOperation>(&agent, &(1, "x".to_string()))
            .await
            .unwrap_err();

        match err {
            PipelineError::UpstreamAgent(inner) => {
                assert_eq!(inner.message(), "agent timed out after 60s");
            }
            other => panic!("expected upstream failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn contract_failure_keeps_parsed_document() {
        let agent = StubAgent::replying("{\"said\": 42}");

        let err = dispatch::<EchoOperation>(&agent, &(1, "x".to_string()))
            .await
            .unwrap_err();

        match err {
            PipelineError::ContractValidation {
                contract,
                violation,
                document,
            } => {
                assert_eq!(contract, "Echo");
                assert_eq!(violation.field.as_str(), "said");
                assert_eq!(violation.received, json!(42));
                assert_eq!(document, json!({"said": 42}));
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }
}
