//! Request body extraction with structured validation errors.
//!
//! `AppJson<T>` replaces `axum::Json<T>` in handler signatures so a malformed
//! request is rejected with a JSON `AppError` before any agent call is made.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

/// JSON extractor that converts deserialization errors to `AppError::Validation`.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

/// Convert a `JsonRejection` to a structured `AppError::Validation`.
pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();

    let field = backticked_after(&body_text, "missing field `").unwrap_or_else(|| "body".to_string());
    let received = backticked_after(&body_text, "unknown variant `").map(serde_json::Value::String);

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field),
        received,
        docs_hint: Some(
            "Check the request body against the endpoint's schema (GET /api-doc/openapi.json)."
                .to_string(),
        ),
    }
}

/// Text between `marker` and the next backtick, as in serde's "missing field `userId`".
fn backticked_after(msg: &str, marker: &str) -> Option<String> {
    let after = &msg[msg.find(marker)? + marker.len()..];
    after.find('`').map(|end| after[..end].to_string())
}
