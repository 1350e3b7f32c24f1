use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Request / response ───────────────────────────────────────────────────

/// Options handed to [`Transport::request`] alongside the URL and method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Wire payload. Keys have already been passed through the naming strategy.
    pub data: Map<String, Value>,
}

/// A settled, successful transport response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: u16,
    /// Parsed JSON body, or `Value::Null` when the server sent nothing.
    pub body: Value,
}

// ─── TransportError ───────────────────────────────────────────────────────

/// Failure reported by a [`Transport`].
///
/// The invoker never inspects this beyond triggering a rollback; it is handed
/// back to the caller exactly as the transport produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    /// HTTP status for a non-2xx response, `None` for network-level failures.
    pub status: Option<u16>,
    pub message: String,
    /// Response body, if the server sent one.
    pub body: Option<Value>,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            body: None,
        }
    }

    pub fn status(status: u16, body: Option<Value>) -> Self {
        Self {
            status: Some(status),
            message: format!("request failed with status {status}"),
            body,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "transport error ({code}): {}", self.message),
            None => write!(f, "transport error: {}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

// ─── Transport ────────────────────────────────────────────────────────────

/// The HTTP-style capability an [`Adapter`](crate::Adapter) sends actions through.
///
/// Implementations must return `Err` for non-2xx responses and network
/// failures, and `Ok` otherwise.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        url: &str,
        method: &str,
        options: RequestOptions,
    ) -> Result<ActionResponse, TransportError>;
}
