//! Native request primitive backed by `reqwest`.
//!
//! # Responsibilities
//! - Perform the HTTP exchange for the direct transport
//! - Produce text, JSON or binary response fields on request
//! - Serve `file:` URLs from disk with the platform's status-0 convention
//!
//! # Design Decisions
//! - One shared `reqwest::Client` per factory; connection reuse is the client's concern
//! - Transport failures surface as `NativeEvent::Error`, never as panics
//! - Aborting means dropping the in-flight future; `abort` only marks the primitive

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use url::Url;

use crate::config::schema::HttpConfig;
use crate::platform::native::{
    NativeEvent, NativeRequest, NativeRequestFactory, NativeResponse, UnsupportedResponseType,
};
use crate::transport::types::Payload;

/// Response field a request was asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ResponseKind {
    #[default]
    Text,
    Json,
    ArrayBuffer,
}

impl ResponseKind {
    fn parse(response_type: &str) -> Option<Self> {
        match response_type {
            "" | "text" => Some(ResponseKind::Text),
            "json" => Some(ResponseKind::Json),
            "arraybuffer" => Some(ResponseKind::ArrayBuffer),
            _ => None,
        }
    }

    fn structured(&self, bytes: &[u8]) -> Option<Payload> {
        match self {
            ResponseKind::Text => Some(Payload::Text(String::from_utf8_lossy(bytes).into_owned())),
            ResponseKind::Json => serde_json::from_slice(bytes).ok().map(Payload::Json),
            ResponseKind::ArrayBuffer => Some(Payload::Binary(bytes.to_vec())),
        }
    }
}

/// Creates [`ReqwestRequest`]s sharing one client.
#[derive(Debug, Clone)]
pub struct ReqwestFactory {
    client: Client,
}

impl ReqwestFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(config)?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl NativeRequestFactory for ReqwestFactory {
    fn create(&self) -> Box<dyn NativeRequest> {
        Box::new(ReqwestRequest::new(self.client.clone()))
    }
}

/// Build the HTTP client described by `config`.
pub fn build_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .build()
}

/// A single HTTP exchange.
#[derive(Debug)]
pub struct ReqwestRequest {
    client: Client,
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    with_credentials: bool,
    response_kind: ResponseKind,
    aborted: bool,
}

impl ReqwestRequest {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            method: "GET".to_string(),
            url: String::new(),
            headers: Vec::new(),
            with_credentials: false,
            response_kind: ResponseKind::default(),
            aborted: false,
        }
    }

    async fn load_file(&self, url: &Url) -> NativeEvent {
        let bytes = match url.to_file_path() {
            Ok(path) => tokio::fs::read(&path).await.unwrap_or_else(|e| {
                tracing::debug!(path = %path.display(), error = %e, "Local file unreadable");
                Vec::new()
            }),
            Err(()) => Vec::new(),
        };

        let (response, response_text) = if bytes.is_empty() {
            (None, Some(String::new()))
        } else {
            (
                self.response_kind.structured(&bytes),
                Some(String::from_utf8_lossy(&bytes).into_owned()),
            )
        };

        // Local resources report status 0 whether or not they exist.
        NativeEvent::Load(NativeResponse {
            status: 0,
            status_text: None,
            response,
            response_text,
            headers: String::new(),
        })
    }
}

#[async_trait]
impl NativeRequest for ReqwestRequest {
    fn open(&mut self, method: &str, url: &str) {
        self.method = method.to_string();
        self.url = url.to_string();
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn set_with_credentials(&mut self, enabled: bool) {
        self.with_credentials = enabled;
    }

    fn set_response_type(&mut self, response_type: &str) -> Result<(), UnsupportedResponseType> {
        self.response_kind = ResponseKind::parse(response_type)
            .ok_or_else(|| UnsupportedResponseType(response_type.to_string()))?;
        Ok(())
    }

    async fn send(&mut self, body: Option<Payload>) -> NativeEvent {
        if self.aborted {
            return NativeEvent::Abort;
        }

        if let Ok(url) = Url::parse(&self.url) {
            if url.scheme() == "file" {
                return self.load_file(&url).await;
            }
        }

        let method = match Method::from_bytes(self.method.to_ascii_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(e) => {
                tracing::warn!(method = %self.method, error = %e, "Invalid request method");
                return NativeEvent::Error;
            }
        };

        tracing::trace!(
            method = %method,
            url = %self.url,
            with_credentials = self.with_credentials,
            "Sending HTTP request"
        );

        let mut builder = self.client.request(method, &self.url);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match body {
            Some(Payload::Text(text)) => builder.body(text),
            Some(Payload::Json(value)) => builder.body(value.to_string()),
            Some(Payload::Binary(bytes)) => builder.body(bytes),
            None => builder,
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "HTTP request failed");
                return NativeEvent::Error;
            }
        };

        let status = response.status();
        let headers = render_headers(response.headers());
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "Failed to read response body");
                return NativeEvent::Error;
            }
        };

        NativeEvent::Load(NativeResponse {
            status: i32::from(status.as_u16()),
            status_text: status.canonical_reason().map(str::to_string),
            response: self.response_kind.structured(&bytes),
            response_text: Some(String::from_utf8_lossy(&bytes).into_owned()),
            headers,
        })
    }

    fn abort(&mut self) {
        self.aborted = true;
        tracing::debug!(url = %self.url, "HTTP request aborted");
    }
}

/// Render headers one per line as `name: value\r\n`.
pub fn render_headers(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for (name, value) in headers {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        out.push_str("\r\n");
    }
    out
}
