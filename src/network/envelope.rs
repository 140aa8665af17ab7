//! Response envelope handling
//!
//! The backend answers in several shapes: `{code, data, message}`,
//! `{status, data, message}`, `{success, data, message}`, a doubly wrapped
//! `{data: {data: T}}`, or the raw payload. Everything goes through [`decode`] so slices only ever see `T`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Which wrapper a payload arrived in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `{data: T, ...}` with at most `code`/`status`/`success`/`message` beside it
    Enveloped,
    /// `{data: {data: T}}`
    DoubleWrapped,
    /// No envelope at all
    Raw,
}

const ENVELOPE_KEYS: [&str; 5] = ["data", "code", "status", "success", "message"];

/// Strips the envelope, turning in-band business errors into [`ApiError::Server`]
pub fn unwrap_envelope(value: Value) -> Result<(Value, EnvelopeShape), ApiError> {
    let Value::Object(mut outer) = value else {
        return Ok((value, EnvelopeShape::Raw));
    };

    if let Some(error) = business_error(&outer) {
        return Err(error);
    }

    if !outer.contains_key("data") || !outer.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())) {
        return Ok((Value::Object(outer), EnvelopeShape::Raw));
    }

    let inner = outer.remove("data").unwrap_or(Value::Null);
    match inner {
        Value::Object(mut wrapper) if wrapper.len() == 1 && wrapper.contains_key("data") => {
            tracing::warn!("Double-wrapped response envelope");
            let payload = wrapper.remove("data").unwrap_or(Value::Null);
            Ok((payload, EnvelopeShape::DoubleWrapped))
        }
        payload => Ok((payload, EnvelopeShape::Enveloped)),
    }
}

/// Unwraps and deserializes a payload
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let (payload, shape) = unwrap_envelope(value)?;
    if shape == EnvelopeShape::Raw {
        tracing::debug!("Response payload without envelope");
    }
    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `{code: 4xx, message}`, `{status: "error", message}` or `{success: false, message}`
/// inside a 2xx answer
fn business_error(outer: &serde_json::Map<String, Value>) -> Option<ApiError> {
    let message = outer.get("message").and_then(Value::as_str).map(str::to_string);

    if let Some(code) = outer.get("code").and_then(Value::as_u64) {
        if !(200..300).contains(&code) {
            return Some(ApiError::Server {
                status: u16::try_from(code).unwrap_or(500),
                code: None,
                message,
            });
        }
    }

    let is_envelope = outer.contains_key("data") || outer.contains_key("message");
    let failed = outer.get("status").and_then(Value::as_str) == Some("error")
        || outer.get("success").and_then(Value::as_bool) == Some(false);
    if is_envelope && failed {
        return Some(ApiError::Server {
            status: 200,
            code: None,
            message,
        });
    }
    None
}

/// Builds the error for a non-2xx answer from its body
pub fn error_from_body(status: u16, body: &str) -> ApiError {
    let (code, message) = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            let message = ["message", "detail"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string);
            let code = ["code", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string);
            (code, message)
        }
        Ok(Value::String(text)) => (None, Some(text)),
        _ => {
            let text = body.trim();
            let message = if text.is_empty() || text.starts_with('<') {
                None
            } else {
                Some(text.to_string())
            };
            (None, message)
        }
    };

    if status == 401 {
        ApiError::Unauthorized { message }
    } else {
        ApiError::Server { status, code, message }
    }
}
