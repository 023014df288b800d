//! Direct request/response transport.
//!
//! # Responsibilities
//! - Drive a native request primitive from `open` to its terminal event
//! - Apply headers, credentials and response type before dispatch
//! - Abort the primitive when the timeout fires
//! - Normalize status quirks before reporting
//!
//! # Design Decisions
//! - Error and abort share one outcome: `(-1, None, None, "")`
//! - An unsupported `json` response type is tolerated; the caller can still parse text
//! - The timeout is armed after dispatch and disarmed before the completion is built

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::observability::metrics;
use crate::platform::native::{NativeEvent, NativeRequestFactory, NativeResponse};
use crate::transport::status::normalize_status;
use crate::transport::timeout::TimeoutController;
use crate::transport::types::{Completion, Payload, RequestDescriptor, TransportError};

const TRANSPORT: &str = "direct";

/// Response type whose assignment failure is ignored.
const TOLERATED_RESPONSE_TYPE: &str = "json";

/// Executes requests through a [`NativeRequestFactory`].
#[derive(Clone)]
pub struct DirectTransport {
    factory: Arc<dyn NativeRequestFactory>,
}

impl DirectTransport {
    pub fn new(factory: impl NativeRequestFactory + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Execute one request attempt.
    ///
    /// Only an unsupported response type fails here; every other outcome is a [`Completion`].
    pub async fn send(&self, request: RequestDescriptor) -> Result<Completion, TransportError> {
        let RequestDescriptor {
            method,
            url,
            body,
            headers,
            timeout,
            with_credentials,
            response_type,
        } = request;

        let mut native = self.factory.create();
        native.open(&method, &url);

        for (name, value) in &headers {
            if let Some(value) = value {
                native.set_request_header(name, value);
            }
        }

        if with_credentials {
            native.set_with_credentials(true);
        }

        if let Some(response_type) = response_type.as_deref() {
            if let Err(e) = native.set_response_type(response_type) {
                if response_type != TOLERATED_RESPONSE_TYPE {
                    return Err(TransportError::UnsupportedResponseType {
                        response_type: response_type.to_string(),
                    });
                }
                tracing::debug!(error = %e, "Ignoring unsupported json response type");
            }
        }

        tracing::debug!(method = %method, url = %url, "Dispatching direct request");

        // The timer lives in the trigger branch. `biased` polls `send` first, so the
        // request is dispatched before the timer is armed, and dropping the branch
        // when `send` wins disarms it.
        let timed_out = async move {
            let (abort_tx, abort_rx) = oneshot::channel::<()>();
            let _pending = TimeoutController::arm(timeout, move || {
                let _ = abort_tx.send(());
            });
            abort_rx.await
        };

        let finished = tokio::select! {
            biased;
            event = native.send(body) => Some(event),
            Ok(()) = timed_out => None,
        };

        let event = match finished {
            Some(event) => event,
            None => {
                tracing::warn!(url = %url, "Direct request timed out, aborting");
                metrics::record_timeout(TRANSPORT);
                native.abort();
                NativeEvent::Abort
            }
        };

        let completion = match event {
            NativeEvent::Load(response) => complete_load(response, &url),
            NativeEvent::Error | NativeEvent::Abort => Completion::network_failure(),
        };

        tracing::debug!(status = completion.status, "Direct request completed");
        metrics::record_request(TRANSPORT, completion.status);
        Ok(completion)
    }
}

fn complete_load(response: NativeResponse, url: &str) -> Completion {
    let NativeResponse {
        status,
        status_text,
        response,
        response_text,
        headers,
    } = response;

    let body = response.or_else(|| response_text.map(Payload::Text));
    let body_present = body.as_ref().map(Payload::is_present).unwrap_or(false);

    Completion {
        status: normalize_status(status, body_present, url),
        body,
        raw_headers: Some(headers),
        status_text: status_text.unwrap_or_default(),
    }
}
