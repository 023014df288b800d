//! Script-injection ("JSONP") transport.
//!
//! # Responsibilities
//! - Register a callback slot and inject a script that targets it
//! - Wait for the script's load/error event or the timeout
//! - Detect scripts that load without invoking their callback
//! - Clean up the element and tombstone the slot on every terminal path
//!
//! # Design Decisions
//! - The channel carries no real status: success is 200, everything else 404
//! - Cancellation has no native abort; it takes the error path
//! - Raw headers are always the empty string
//! - A drop guard owns cleanup, so a cancelled `send` future still detaches and tombstones

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::observability::metrics;
use crate::platform::document::{ScriptEvent, ScriptHost, ScriptId};
use crate::transport::registry::CallbackRegistry;
use crate::transport::timeout::TimeoutController;
use crate::transport::types::{Completion, Payload, RequestDescriptor};

const TRANSPORT: &str = "script";

/// Placeholder in request URLs replaced by the callback reference.
pub const DEFAULT_PLACEHOLDER: &str = "JSON_CALLBACK";

/// Executes requests by injecting scripts into a [`ScriptHost`].
#[derive(Clone)]
pub struct ScriptTransport {
    host: Arc<dyn ScriptHost>,
    registry: Arc<CallbackRegistry>,
    placeholder: String,
}

impl ScriptTransport {
    pub fn new(host: Arc<dyn ScriptHost>, registry: Arc<CallbackRegistry>) -> Self {
        Self {
            host,
            registry,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Script URL for `url` with the placeholder pointing at entry `id`.
    pub fn script_url(&self, url: &str, id: &str) -> String {
        url.replacen(&self.placeholder, &self.registry.qualified_name(id), 1)
    }

    /// Execute one request attempt. Method, headers, body and response type do not apply.
    pub async fn send(&self, request: RequestDescriptor) -> Completion {
        let id = self.registry.register();
        let src = self.script_url(&request.url, &id);

        tracing::debug!(callback_id = %id, src = %src, "Injecting script");

        let (listener, events) = oneshot::channel();
        let script = self.host.append_script(&src, listener);
        let mut cleanup = ScriptCleanup::new(&*self.host, &self.registry, script, &id);

        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let mut pending = TimeoutController::arm(request.timeout, move || {
            let _ = cancel_tx.send(());
        });

        let event = tokio::select! {
            biased;
            event = events => event.unwrap_or(ScriptEvent::Error),
            Ok(()) = &mut cancel_rx => {
                tracing::warn!(callback_id = %id, "Script request timed out");
                metrics::record_timeout(TRANSPORT);
                ScriptEvent::Error
            }
        };

        pending.disarm();
        cleanup.remove_script();

        let event = match event {
            ScriptEvent::Load if !self.registry.is_called(&id) => {
                tracing::warn!(callback_id = %id, "Script loaded without invoking its callback");
                ScriptEvent::Error
            }
            other => other,
        };

        let data = cleanup.tombstone();
        let status = match event {
            ScriptEvent::Load => 200,
            ScriptEvent::Error => 404,
        };

        tracing::debug!(callback_id = %id, status, "Script request completed");
        metrics::record_request(TRANSPORT, status);

        Completion {
            status,
            body: data.map(Payload::Json),
            raw_headers: Some(String::new()),
            status_text: event.as_str().to_string(),
        }
    }
}

/// Detaches the script and tombstones its entry, also when `send` is dropped mid-flight.
struct ScriptCleanup<'a> {
    host: &'a dyn ScriptHost,
    registry: &'a CallbackRegistry,
    script: Option<ScriptId>,
    id: &'a str,
    tombstoned: bool,
}

impl<'a> ScriptCleanup<'a> {
    fn new(
        host: &'a dyn ScriptHost,
        registry: &'a CallbackRegistry,
        script: ScriptId,
        id: &'a str,
    ) -> Self {
        Self {
            host,
            registry,
            script: Some(script),
            id,
            tombstoned: false,
        }
    }

    fn remove_script(&mut self) {
        if let Some(script) = self.script.take() {
            self.host.remove_script(script);
        }
    }

    /// Tombstone the entry and return the payload it recorded.
    fn tombstone(mut self) -> Option<Value> {
        self.remove_script();
        self.tombstoned = true;
        self.registry.tombstone(self.id)
    }
}

impl Drop for ScriptCleanup<'_> {
    fn drop(&mut self) {
        if self.tombstoned {
            return;
        }
        tracing::debug!(callback_id = %self.id, "Script request dropped before completion");
        self.remove_script();
        self.registry.tombstone(self.id);
    }
}
