//! Request and completion types shared by both transports.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::transport::timeout::{CancellationSignal, TimeoutSpec};

/// Opaque request or response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Plain text body.
    Text(String),
    /// Structured JSON body.
    Json(Value),
    /// Raw bytes (the `arraybuffer` response type).
    Binary(Vec<u8>),
}

impl Payload {
    /// Whether the payload counts as a body for status recovery.
    ///
    /// Empty text and JSON `null` are treated as absent; binary buffers always count.
    pub fn is_present(&self) -> bool {
        match self {
            Payload::Text(text) => !text.is_empty(),
            Payload::Json(value) => !value.is_null(),
            Payload::Binary(_) => true,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// A single request, owned by the call that issues it.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: String,
    /// Empty means "use the backend's base URL".
    pub url: String,
    pub body: Option<Payload>,
    /// Headers in insertion order. `None` values are never sent.
    pub headers: Vec<(String, Option<String>)>,
    pub timeout: TimeoutSpec,
    pub with_credentials: bool,
    pub response_type: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            body: None,
            headers: Vec::new(),
            timeout: TimeoutSpec::None,
            with_credentials: false,
            response_type: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>, body: impl Into<Payload>) -> Self {
        Self::new("POST", url).body(body)
    }

    /// Script-injection request; `url` should contain the callback placeholder.
    pub fn jsonp(url: impl Into<String>) -> Self {
        Self::new("JSONP", url)
    }

    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), Some(value.into())));
        self
    }

    /// Record a header with an undefined value. It is kept for ordering but never sent.
    pub fn undefined_header(mut self, name: impl Into<String>) -> Self {
        self.headers.push((name.into(), None));
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = TimeoutSpec::After(duration);
        self
    }

    pub fn cancel_on(mut self, signal: CancellationSignal) -> Self {
        self.timeout = TimeoutSpec::Signal(signal);
        self
    }

    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = Some(response_type.into());
        self
    }
}

/// Terminal outcome of a request: `(status, body, raw_headers, status_text)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub status: i32,
    pub body: Option<Payload>,
    pub raw_headers: Option<String>,
    pub status_text: String,
}

impl Completion {
    /// Outcome of a native error or abort.
    pub fn network_failure() -> Self {
        Self {
            status: -1,
            body: None,
            raw_headers: None,
            status_text: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors raised synchronously while preparing a request.
///
/// Everything that happens after dispatch is reported in-band as a [`Completion`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("response type '{response_type}' is not supported by the transport")]
    UnsupportedResponseType { response_type: String },
}
