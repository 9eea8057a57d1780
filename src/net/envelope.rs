//! Response-envelope unwrapping.
//!
//! The backend answers either with the payload itself (`{"user": .., "token": ..}`)
//! or with the payload nested under `data` (`{"data": {"user": .., "token": ..}}`).
//! Both shapes are accepted; the nested one is detected explicitly instead of
//! probing fields at every call site.

#[cfg(test)]
#[path = "envelope_test.rs"]
mod envelope_test;

use serde_json::Value;

use super::types::{ApiError, AuthSuccess, User};

/// Whether `value` is a `{"data": ...}` wrapper around an object or `null`.
#[must_use]
pub fn is_wrapped(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|map| map.get("data"))
        .is_some_and(|data| data.is_object() || data.is_null())
}

/// Strip one `data` wrapper if present; any other shape is returned as-is.
#[must_use]
pub fn unwrap_envelope(value: Value) -> Value {
    if !is_wrapped(&value) {
        return value;
    }
    match value {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

fn parse_body(body: &str) -> Result<Value, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::MalformedResponse(format!("invalid JSON: {e}")))
}

/// Parse a `POST login` body into the user and token it carries.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the body is not JSON, or the
/// unwrapped payload lacks a usable `user` or `token`.
pub fn parse_auth_success(body: &str) -> Result<AuthSuccess, ApiError> {
    let payload = unwrap_envelope(parse_body(body)?);
    let Some(map) = payload.as_object() else {
        return Err(ApiError::MalformedResponse("login payload is not an object".into()));
    };
    for field in ["user", "token"] {
        if map.get(field).is_none_or(Value::is_null) {
            return Err(ApiError::MalformedResponse(format!("login payload missing `{field}`")));
        }
    }
    let auth: AuthSuccess =
        serde_json::from_value(payload).map_err(|e| ApiError::MalformedResponse(format!("login payload: {e}")))?;
    if auth.token.is_empty() {
        return Err(ApiError::MalformedResponse("login payload has an empty token".into()));
    }
    Ok(auth)
}

/// Parse a `GET users/{id}` body. An empty body or a `null` payload is `None`.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the body is not JSON or the
/// payload is not a user record.
pub fn parse_user(body: &str) -> Result<Option<User>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let payload = unwrap_envelope(parse_body(body)?);
    if payload.is_null() {
        return Ok(None);
    }
    serde_json::from_value(payload)
        .map(Some)
        .map_err(|e| ApiError::MalformedResponse(format!("user payload: {e}")))
}
