//! Request orchestration.
//!
//! # Responsibilities
//! - Pick the transport for each request
//! - Resolve empty and relative URLs against the base URL
//! - Keep the outstanding request count accurate for idle detection
//! - Deliver exactly one completion per request

use std::sync::Arc;

use tracing::Instrument;
use url::Url;

use crate::backend::outstanding::{OutstandingRequests, RequestGuard};
use crate::config::schema::BackendConfig;
use crate::platform::document::ScriptHost;
use crate::platform::native::NativeRequestFactory;
use crate::transport::direct::DirectTransport;
use crate::transport::registry::CallbackRegistry;
use crate::transport::script::ScriptTransport;
use crate::transport::types::{Completion, RequestDescriptor, TransportError};

/// Which transport carries a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Direct,
    Script,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Direct => "direct",
            TransportKind::Script => "script",
        }
    }
}

/// Dispatches requests to the direct or script transport.
#[derive(Clone)]
pub struct HttpBackend {
    direct: DirectTransport,
    script: ScriptTransport,
    outstanding: OutstandingRequests,
    base_url: Option<Url>,
    script_method: String,
}

impl HttpBackend {
    pub fn new(direct: DirectTransport, script: ScriptTransport) -> Self {
        Self {
            direct,
            script,
            outstanding: OutstandingRequests::new(),
            base_url: None,
            script_method: "JSONP".to_string(),
        }
    }

    /// Build a backend from validated configuration.
    ///
    /// `registry` must be the one `host` delivers script payloads to.
    pub fn from_config(
        config: &BackendConfig,
        factory: impl NativeRequestFactory + 'static,
        host: Arc<dyn ScriptHost>,
        registry: Arc<CallbackRegistry>,
    ) -> Self {
        let script = ScriptTransport::new(host, registry)
            .with_placeholder(config.jsonp.callback_placeholder.clone());

        let mut backend = Self::new(DirectTransport::new(factory), script)
            .with_script_method(config.jsonp.method.clone());

        match Url::parse(&config.base_url) {
            Ok(base_url) => backend.base_url = Some(base_url),
            Err(e) => tracing::warn!(base_url = %config.base_url, error = %e, "Ignoring invalid base URL"),
        }
        backend
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_script_method(mut self, method: impl Into<String>) -> Self {
        self.script_method = method.into();
        self
    }

    /// Share a counter with other backends or an external scheduler.
    pub fn with_outstanding(mut self, outstanding: OutstandingRequests) -> Self {
        self.outstanding = outstanding;
        self
    }

    pub fn outstanding(&self) -> &OutstandingRequests {
        &self.outstanding
    }

    pub fn transport_for(&self, method: &str) -> TransportKind {
        if method.eq_ignore_ascii_case(&self.script_method) {
            TransportKind::Script
        } else {
            TransportKind::Direct
        }
    }

    /// Resolve `url` against the base URL. Absolute URLs are returned unchanged.
    pub fn resolve_url(&self, url: &str) -> String {
        let Some(base) = &self.base_url else {
            return url.to_string();
        };

        if url.is_empty() {
            return base.to_string();
        }

        match Url::parse(url) {
            Ok(_) => url.to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) => base
                .join(url)
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|_| url.to_string()),
            Err(_) => url.to_string(),
        }
    }

    /// Execute one request and return its completion.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Completion, TransportError> {
        let guard = self.outstanding.track();
        self.dispatch(request, &guard).await
    }

    /// Execute one request and hand its completion to `callback`.
    ///
    /// The callback runs exactly once, before the request stops counting as outstanding.
    /// It does not run if the request fails before dispatch.
    pub async fn execute_with<F>(
        &self,
        request: RequestDescriptor,
        callback: F,
    ) -> Result<(), TransportError>
    where
        F: FnOnce(Completion),
    {
        let guard = self.outstanding.track();
        let completion = self.dispatch(request, &guard).await?;
        callback(completion);
        drop(guard);
        Ok(())
    }

    async fn dispatch(
        &self,
        mut request: RequestDescriptor,
        guard: &RequestGuard,
    ) -> Result<Completion, TransportError> {
        request.url = self.resolve_url(&request.url);
        let kind = self.transport_for(&request.method);

        let span = tracing::info_span!(
            "request",
            request_id = %guard.id(),
            method = %request.method,
            transport = kind.as_str()
        );

        async move {
            let completion = match kind {
                TransportKind::Direct => self.direct.send(request).await?,
                TransportKind::Script => self.script.send(request).await,
            };
            tracing::info!(status = completion.status, "Request finished");
            Ok::<_, TransportError>(completion)
        }
        .instrument(span)
        .await
    }
}
