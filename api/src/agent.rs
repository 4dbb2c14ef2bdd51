//! HTTP adapter for the external conversational agent.

use std::time::Duration;

use async_trait::async_trait;
use omteam_core::context::ContextBucket;
use omteam_core::error::AgentError;
use omteam_core::operation::AgentCall;
use omteam_core::pipeline::{AgentClient, AgentReply};
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const BODY_EXCERPT_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl AgentConfig {
    /// Reads `OMTEAM_AGENT_URL`, `OMTEAM_AGENT_API_KEY` and `OMTEAM_AGENT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let url = non_blank("OMTEAM_AGENT_URL").ok_or(ConfigError::Missing("OMTEAM_AGENT_URL"))?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "OMTEAM_AGENT_URL",
                message: format!("expected an http(s) URL, got '{url}'"),
            });
        }

        let timeout_secs = match non_blank("OMTEAM_AGENT_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "OMTEAM_AGENT_TIMEOUT_SECS",
                        message: format!("expected a positive number of seconds, got '{raw}'"),
                    });
                }
            },
        };

        Ok(Self {
            url,
            api_key: non_blank("OMTEAM_AGENT_API_KEY"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    user_request: &'a str,
    user_id: &'a str,
    user_payload: UserPayload<'a>,
}

#[derive(Debug, Serialize)]
struct UserPayload<'a> {
    preferences: &'a ContextBucket,
    event: &'a ContextBucket,
}

impl<'a> From<&'a AgentCall> for InvokeRequest<'a> {
    fn from(call: &'a AgentCall) -> Self {
        Self {
            user_request: &call.instruction,
            user_id: &call.caller_id,
            user_payload: UserPayload {
                preferences: &call.context.preferences,
                event: &call.context.event,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    agent_response: String,
    #[serde(default)]
    selected_agent: Option<String>,
}

/// [`AgentClient`] over a single JSON POST endpoint.
pub struct HttpAgentClient {
    http: reqwest::Client,
    config: AgentConfig,
}

impl HttpAgentClient {
    pub fn new(config: AgentConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn invoke(&self, call: &AgentCall) -> Result<AgentReply, AgentError> {
        let mut request = self
            .http
            .post(&self.config.url)
            .json(&InvokeRequest::from(call));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                AgentError::with_source(
                    format!("agent did not answer within {}s", self.config.timeout.as_secs()),
                    err,
                )
            } else {
                AgentError::with_source("agent request failed", err)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Agent returned non-success status");
            return Err(AgentError::new(format!(
                "agent returned {status}: {}",
                excerpt(&body)
            )));
        }

        let envelope = response
            .json::<InvokeResponse>()
            .await
            .map_err(|err| AgentError::with_source("agent response envelope is malformed", err))?;

        Ok(AgentReply {
            text: envelope.agent_response,
            selected_agent: envelope.selected_agent,
        })
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use omteam_core::context::AuxiliaryContext;
    use serde_json::{Value, json};

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn sample_call() -> AgentCall {
        AgentCall {
            instruction: "미션을 추천해주세요".to_string(),
            caller_id: "42".to_string(),
            context: AuxiliaryContext::new()
                .preference("appGoal", "체중 감량")
                .event("recentMissionCount", 0_i64),
        }
    }

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr, api_key: Option<&str>) -> HttpAgentClient {
        HttpAgentClient::new(AgentConfig {
            url: format!("http://{addr}/agent/invoke"),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn config_requires_agent_url() {
        let err = AgentConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OMTEAM_AGENT_URL")));
    }

    #[test]
    fn config_defaults_timeout_and_treats_blank_key_as_absent() {
        let config = AgentConfig::from_lookup(lookup(&[
            ("OMTEAM_AGENT_URL", "http://agent:8080/invoke"),
            ("OMTEAM_AGENT_API_KEY", "  "),
        ]))
        .unwrap();

        assert_eq!(config.url, "http://agent:8080/invoke");
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn config_rejects_bad_timeout_and_scheme() {
        let err = AgentConfig::from_lookup(lookup(&[
            ("OMTEAM_AGENT_URL", "http://agent"),
            ("OMTEAM_AGENT_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "OMTEAM_AGENT_TIMEOUT_SECS",
                ..
            }
        ));

        let err =
            AgentConfig::from_lookup(lookup(&[("OMTEAM_AGENT_URL", "agent:8080")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "OMTEAM_AGENT_URL",
                ..
            }
        ));
    }

    #[test]
    fn request_body_nests_context_under_user_payload() {
        let call = sample_call();
        let body = serde_json::to_value(InvokeRequest::from(&call)).unwrap();
        assert_eq!(
            body,
            json!({
                "user_request": "미션을 추천해주세요",
                "user_id": "42",
                "user_payload": {
                    "preferences": {"appGoal": "체중 감량"},
                    "event": {"recentMissionCount": 0}
                }
            })
        );
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(600);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), 503);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("  short  "), "short");
    }

    #[tokio::test]
    async fn invoke_posts_call_and_unwraps_envelope() {
        let app = Router::new().route(
            "/agent/invoke",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "agent_response": format!("{}|{}|{}", auth, body["user_id"], body["user_payload"]["preferences"]["appGoal"]),
                    "selected_agent": "planner"
                }))
            }),
        );
        let addr = serve(app).await;

        let reply = client_for(addr, Some("secret"))
            .invoke(&sample_call())
            .await
            .unwrap();

        assert_eq!(reply.text, "Bearer secret|\"42\"|\"체중 감량\"");
        assert_eq!(reply.selected_agent.as_deref(), Some("planner"));
    }

    #[tokio::test]
    async fn non_success_status_becomes_agent_error_with_body() {
        let app = Router::new().route(
            "/agent/invoke",
            post(|| async { (StatusCode::BAD_GATEWAY, "model overloaded") }),
        );
        let addr = serve(app).await;

        let err = client_for(addr, None)
            .invoke(&sample_call())
            .await
            .unwrap_err();

        assert_eq!(err.message(), "agent returned 502 Bad Gateway: model overloaded");
    }

    #[tokio::test]
    async fn envelope_without_agent_response_is_an_error() {
        let app = Router::new().route(
            "/agent/invoke",
            post(|| async { Json(json!({"selected_agent": "planner"})) }),
        );
        let addr = serve(app).await;

        let err = client_for(addr, None)
            .invoke(&sample_call())
            .await
            .unwrap_err();

        assert_eq!(err.message(), "agent response envelope is malformed");
    }
}
