//! Error types for the claims console.

use serde_json::Value;
use thiserror::Error;

/// A failed remote call: transport failure, timeout, or non-2xx response.
///
/// Every remote failure in the client is normalized into this one type so the
/// views need exactly one error-rendering code path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    /// HTTP status, when the failure came from a response rather than the
    /// transport itself.
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            message: format!("transport error: {}", detail.into()),
            status: None,
        }
    }

    pub fn timeout(ms: u32) -> Self {
        Self {
            message: format!("request timed out after {ms}ms"),
            status: None,
        }
    }

    /// Normalize a non-2xx response. A body carrying a structured message
    /// field (`detail` per the backend, `message` as a fallback) is surfaced
    /// verbatim; anything else gets a generic status description.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self {
            message,
            status: Some(status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .copied()
        .find_map(|key| value.get(key)?.as_str().map(str::to_string))
}
