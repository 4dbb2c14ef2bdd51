use serde::Serialize;

use crate::context::AuxiliaryContext;
use crate::contract::Contract;

/// Everything the agent receives for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentCall {
    pub instruction: String,
    pub caller_id: String,
    pub context: AuxiliaryContext,
}

/// Descriptor of one request → instruction → result flow.
///
/// Implementations are pure: building the call performs no I/O and is
/// deterministic for a given request.
pub trait Operation {
    /// Operation name used in logs.
    const NAME: &'static str;

    type Request: Send + Sync;
    type Response: Contract + Send;

    fn caller_id(request: &Self::Request) -> String;

    /// Natural-language instruction, including a conforming example payload.
    fn instruction(request: &Self::Request) -> String;

    fn context(request: &Self::Request) -> AuxiliaryContext;

    fn build_call(request: &Self::Request) -> AgentCall {
        AgentCall {
            instruction: Self::instruction(request),
            caller_id: Self::caller_id(request),
            context: Self::context(request),
        }
    }
}

/// Closing paragraph shared by every instruction: the output contract with its example.
pub(crate) fn response_format(example: &str) -> String {
    format!("응답은 반드시 아래 JSON 형식으로만 해주세요:\n```json\n{example}\n```\n")
}

/// `- item` lines, or `- 없음` when there is nothing to list.
pub(crate) fn bullet_lines<I>(lines: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let lines: Vec<String> = lines.into_iter().map(|line| format!("- {line}")).collect();
    if lines.is_empty() {
        "- 없음".to_string()
    } else {
        lines.join("\n")
    }
}
