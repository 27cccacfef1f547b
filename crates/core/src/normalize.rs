//! Response normalization.
//!
//! The provider's response schema has drifted between model revisions, so a
//! body is matched against known shapes from most to least specific:
//!
//! 1. `503` -> [`ErrorKind::ServiceLoading`]
//! 2. other non-2xx -> [`ErrorKind::ApiError`] with `"<status> - <body>"`
//! 3. `[{"generated_text": [..., {"content": "..."}]}]` -> the last turn's content
//! 4. `[{"generated_text": "..."}]` -> the flat string
//! 5. any other JSON -> the JSON rendered as text
//!
//! A 2xx body that is not JSON at all is [`ErrorKind::UnparseableResponse`].
//! Normalization is a pure function of its inputs.

use crate::classify::ErrorKind;
use crate::mode::AnalysisMode;
use crate::result::InferenceResult;
use crate::transport::RawResponse;
use serde_json::Value;
use tracing::{debug, warn};

/// Longest body excerpt carried in an `UnparseableResponse` detail.
const SNIPPET_CHARS: usize = 200;

/// Which known response shape a successful body matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Chat transcript whose last turn holds the answer.
    NestedMessages,
    /// Legacy flat `generated_text` string.
    FlatText,
    /// Unrecognized JSON, surfaced verbatim.
    Opaque,
}

pub fn normalize(mode: AnalysisMode, raw: &RawResponse) -> InferenceResult {
    if let Some(kind) = ErrorKind::from_status(raw.status) {
        warn!(mode = %mode, status = raw.status, kind = %kind, "Provider returned an error status");
        let detail = match kind {
            ErrorKind::ServiceLoading => loading_detail(raw),
            _ => format!("{} - {}", raw.status, raw.body),
        };
        return InferenceResult::failure(kind, detail);
    }

    let value: Value = match serde_json::from_str(&raw.body) {
        Ok(value) => value,
        Err(e) => {
            warn!(mode = %mode, error = %e, "Successful response was not JSON");
            return InferenceResult::failure(
                ErrorKind::UnparseableResponse,
                format!("response is not valid JSON: {}", snippet(&raw.body)),
            );
        }
    };

    let (shape, text) = extract_text(&value);
    debug!(mode = %mode, shape = ?shape, "Normalized provider response");
    InferenceResult::success(text)
}

/// Applies the shape chain to an already-parsed successful body.
pub fn extract_text(value: &Value) -> (ResponseShape, String) {
    if let Some(text) = nested_content(value) {
        return (ResponseShape::NestedMessages, text.to_string());
    }
    if let Some(text) = flat_generated_text(value) {
        return (ResponseShape::FlatText, text.to_string());
    }
    (ResponseShape::Opaque, value.to_string())
}

fn first_generated_text(value: &Value) -> Option<&Value> {
    value.as_array()?.first()?.get("generated_text")
}

fn nested_content(value: &Value) -> Option<&str> {
    first_generated_text(value)?
        .as_array()?
        .last()?
        .get("content")?
        .as_str()
}

fn flat_generated_text(value: &Value) -> Option<&str> {
    first_generated_text(value)?.as_str()
}

fn loading_detail(raw: &RawResponse) -> String {
    let parsed: Option<Value> = serde_json::from_str(&raw.body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str);
    let estimate = parsed
        .as_ref()
        .and_then(|v| v.get("estimated_time"))
        .and_then(Value::as_f64);

    match (message, estimate) {
        (Some(message), Some(secs)) => format!(
            "{} - {} (estimated wait {:.0}s)",
            raw.status, message, secs
        ),
        (Some(message), None) => format!("{} - {}", raw.status, message),
        _ if raw.body.trim().is_empty() => format!("{} - model is loading", raw.status),
        _ => format!("{} - {}", raw.status, raw.body),
    }
}

fn snippet(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
