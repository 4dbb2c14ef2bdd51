//! Recovery of the JSON payload from an agent's free-text reply.
//!
//! Agents answer either with a fenced block (```` ```json ... ``` ````), often
//! wrapped in narrative text, or with a bare JSON object. Exactly those two
//! shapes are recognised.

use serde_json::Value;

use crate::error::PipelineError;

const FENCE: &str = "```";
const JSON_OPENER: &str = "```json";

/// Return the candidate JSON span of `raw`.
///
/// If a line starts with ```` ```json ```` (indentation allowed) and the last
/// fence in the text lies after it, the candidate is the trimmed text between
/// them. Otherwise it is the whole reply, trimmed.
pub fn extract_json_candidate(raw: &str) -> &str {
    if let (Some(body_start), Some(closer)) = (find_json_opener(raw), raw.rfind(FENCE)) {
        if body_start <= closer {
            return raw[body_start..closer].trim();
        }
    }
    raw.trim()
}

/// Byte offset just past the first line-leading ```` ```json ```` opener.
fn find_json_opener(raw: &str) -> Option<usize> {
    let mut line_start = 0;
    for line in raw.split_inclusive('\n') {
        let content = line.trim_start_matches([' ', '\t']);
        if content.starts_with(JSON_OPENER) {
            let indent = line.len() - content.len();
            return Some(line_start + indent + JSON_OPENER.len());
        }
        line_start += line.len();
    }
    None
}

/// Extract and parse the reply into a single JSON value.
pub fn parse_reply(raw: &str) -> Result<Value, PipelineError> {
    serde_json::from_str(extract_json_candidate(raw)).map_err(|source| {
        PipelineError::ResponseParse {
            raw_reply: raw.to_string(),
            source,
        }
    })
}
