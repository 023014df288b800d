//! Script host that fetches scripts over HTTP and evaluates JSONP calls.
//!
//! # Responsibilities
//! - Fetch each appended script in the background
//! - Evaluate bodies of the form `<namespace>.<id>(<json>)` against the registry
//! - Fire `load` or `error` exactly once per script
//! - Stop loading when a script is removed
//!
//! # Design Decisions
//! - Only the callback-invocation shape is understood; anything else "runs" with no effect
//! - Non-2xx responses fire `error`, mirroring how documents treat failed script loads

use std::sync::Arc;

use dashmap::DashMap;
use reqwest::Client;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::platform::document::{ScriptEvent, ScriptHost, ScriptId, ScriptListener};
use crate::transport::registry::{is_valid_reference, CallbackRegistry};

/// Document whose scripts are loaded with `reqwest`.
#[derive(Debug)]
pub struct HttpScriptHost {
    client: Client,
    registry: Arc<CallbackRegistry>,
    scripts: DashMap<ScriptId, JoinHandle<()>>,
}

impl HttpScriptHost {
    pub fn new(client: Client, registry: Arc<CallbackRegistry>) -> Self {
        Self {
            client,
            registry,
            scripts: DashMap::new(),
        }
    }

    /// Number of scripts currently attached.
    pub fn attached(&self) -> usize {
        self.scripts.len()
    }
}

impl ScriptHost for HttpScriptHost {
    fn append_script(&self, src: &str, listener: ScriptListener) -> ScriptId {
        let id = ScriptId::new();
        let client = self.client.clone();
        let registry = Arc::clone(&self.registry);
        let src = src.to_string();

        let task = tokio::spawn(async move {
            let event = load_script(&client, &registry, &src).await;
            tracing::debug!(src = %src, event = event.as_str(), "Script finished loading");
            let _ = listener.send(event);
        });

        self.scripts.insert(id, task);
        id
    }

    fn remove_script(&self, id: ScriptId) {
        if let Some((_, task)) = self.scripts.remove(&id) {
            task.abort();
        }
    }
}

async fn load_script(client: &Client, registry: &CallbackRegistry, src: &str) -> ScriptEvent {
    let response = match client.get(src).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(src = %src, error = %e, "Script request failed");
            return ScriptEvent::Error;
        }
    };

    if !response.status().is_success() {
        tracing::debug!(src = %src, status = %response.status(), "Script responded with failure status");
        return ScriptEvent::Error;
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(src = %src, error = %e, "Failed to read script body");
            return ScriptEvent::Error;
        }
    };

    match parse_callback_invocation(&body) {
        Some((callee, payload)) => match registry.resolve_reference(callee) {
            Some(id) => {
                registry.invoke(id, payload);
            }
            None => tracing::debug!(callee = %callee, "Script called a function outside the registry"),
        },
        None => tracing::debug!(src = %src, "Script body is not a callback invocation"),
    }

    ScriptEvent::Load
}

/// Parse `name(<json>)`, tolerating a leading `/**/` and a trailing `;`.
///
/// An empty argument list yields `null`.
pub fn parse_callback_invocation(body: &str) -> Option<(&str, Value)> {
    let body = body.trim();
    let body = body.strip_prefix("/**/").unwrap_or(body).trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    let open = body.find('(')?;
    let inner = body.strip_suffix(')')?;
    if open >= inner.len() {
        return None;
    }

    let callee = body[..open].trim();
    if !is_valid_reference(callee) {
        return None;
    }

    let args = inner[open + 1..].trim();
    let payload = if args.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(args).ok()?
    };
    Some((callee, payload))
}
