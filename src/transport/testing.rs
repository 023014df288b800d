//! In-memory fakes of the platform primitives for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::platform::document::{ScriptEvent, ScriptHost, ScriptId, ScriptListener};
use crate::platform::native::{NativeEvent, NativeRequest, NativeResponse, UnsupportedResponseType};
use crate::transport::types::Payload;

#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    Open(String, String),
    Header(String, String),
    WithCredentials(bool),
    ResponseType(String),
    Send(Option<Payload>),
    Abort,
}

/// Scripted native primitive. Clones share the call log.
#[derive(Clone)]
pub struct FakeNative {
    calls: Arc<Mutex<Vec<NativeCall>>>,
    event: NativeEvent,
    delay: Duration,
    reject_response_types: bool,
}

impl FakeNative {
    pub fn responding(response: NativeResponse) -> Self {
        Self::with_event(NativeEvent::Load(response))
    }

    pub fn failing() -> Self {
        Self::with_event(NativeEvent::Error)
    }

    fn with_event(event: NativeEvent) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            event,
            delay: Duration::ZERO,
            reject_response_types: false,
        }
    }

    pub fn ok_text(status: i32, status_text: &str, text: &str) -> NativeResponse {
        NativeResponse {
            status,
            status_text: Some(status_text.to_string()),
            response: None,
            response_text: Some(text.to_string()),
            headers: "content-type: text/plain\r\n".to_string(),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn rejecting_response_types(mut self) -> Self {
        self.reject_response_types = true;
        self
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: NativeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NativeRequest for FakeNative {
    fn open(&mut self, method: &str, url: &str) {
        self.record(NativeCall::Open(method.to_string(), url.to_string()));
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        self.record(NativeCall::Header(name.to_string(), value.to_string()));
    }

    fn set_with_credentials(&mut self, enabled: bool) {
        self.record(NativeCall::WithCredentials(enabled));
    }

    fn set_response_type(&mut self, response_type: &str) -> Result<(), UnsupportedResponseType> {
        if self.reject_response_types {
            return Err(UnsupportedResponseType(response_type.to_string()));
        }
        self.record(NativeCall::ResponseType(response_type.to_string()));
        Ok(())
    }

    async fn send(&mut self, body: Option<Payload>) -> NativeEvent {
        self.record(NativeCall::Send(body));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.event.clone()
    }

    fn abort(&mut self) {
        self.record(NativeCall::Abort);
    }
}

/// Document whose scripts are settled by the test.
#[derive(Clone, Default)]
pub struct FakeDocument {
    inner: Arc<Mutex<FakeDocumentState>>,
}

#[derive(Default)]
struct FakeDocumentState {
    attached: HashMap<ScriptId, (String, Option<ScriptListener>)>,
    removed: Vec<ScriptId>,
}

impl FakeDocument {
    /// `src` of every script still attached.
    pub fn attached_sources(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .attached
            .values()
            .map(|(src, _)| src.clone())
            .collect()
    }

    pub fn removed_count(&self) -> usize {
        self.inner.lock().unwrap().removed.len()
    }

    /// Fire `event` on the only attached script. Returns false if nobody listened.
    pub fn fire(&self, event: ScriptEvent) -> bool {
        let listener = {
            let mut state = self.inner.lock().unwrap();
            state
                .attached
                .values_mut()
                .next()
                .and_then(|(_, listener)| listener.take())
        };
        match listener {
            Some(listener) => listener.send(event).is_ok(),
            None => false,
        }
    }
}

impl ScriptHost for FakeDocument {
    fn append_script(&self, src: &str, listener: ScriptListener) -> ScriptId {
        let id = ScriptId::new();
        self.inner
            .lock()
            .unwrap()
            .attached
            .insert(id, (src.to_string(), Some(listener)));
        id
    }

    fn remove_script(&self, id: ScriptId) {
        let mut state = self.inner.lock().unwrap();
        if state.attached.remove(&id).is_some() {
            state.removed.push(id);
        }
    }
}

/// Wait until `document` has a script attached, failing the test after a second.
pub async fn wait_for_script(document: &FakeDocument) -> String {
    let attached = async {
        loop {
            if let Some(src) = document.attached_sources().into_iter().next() {
                return src;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(1), attached)
        .await
        .expect("no script was attached")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "no script was attached")]
    async fn test_wait_for_script_gives_up() {
        wait_for_script(&FakeDocument::default()).await;
    }
}
