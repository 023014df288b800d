//! Native asynchronous request primitive.
//!
//! The direct transport drives one primitive per request through
//! `open → headers → options → send → (load | error | abort)`.

use async_trait::async_trait;
use thiserror::Error;

use crate::transport::types::Payload;

/// A primitive rejected a response type it cannot produce.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported response type '{0}'")]
pub struct UnsupportedResponseType(pub String);

/// What the primitive observed when the exchange finished.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeResponse {
    /// Raw status, including platform quirks such as `0` and `1223`.
    pub status: i32,
    pub status_text: Option<String>,
    /// Structured response field. `None` if the primitive has none.
    pub response: Option<Payload>,
    /// Plain text field.
    pub response_text: Option<String>,
    /// All response headers, `name: value\r\n` per line.
    pub headers: String,
}

/// Terminal event of a native request.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    Load(NativeResponse),
    Error,
    Abort,
}

/// One-shot network request primitive.
#[async_trait]
pub trait NativeRequest: Send {
    fn open(&mut self, method: &str, url: &str);

    fn set_request_header(&mut self, name: &str, value: &str);

    fn set_with_credentials(&mut self, enabled: bool);

    /// Request a response type. Fails synchronously if the primitive cannot produce it.
    fn set_response_type(&mut self, response_type: &str) -> Result<(), UnsupportedResponseType>;

    /// Dispatch the request and wait for its terminal event.
    ///
    /// Dropping the returned future abandons the exchange; callers follow up with [`abort`].
    ///
    /// [`abort`]: NativeRequest::abort
    async fn send(&mut self, body: Option<Payload>) -> NativeEvent;

    fn abort(&mut self);
}

/// Creates a fresh primitive per request.
pub trait NativeRequestFactory: Send + Sync {
    fn create(&self) -> Box<dyn NativeRequest>;
}

impl<F> NativeRequestFactory for F
where
    F: Fn() -> Box<dyn NativeRequest> + Send + Sync,
{
    fn create(&self) -> Box<dyn NativeRequest> {
        self()
    }
}
