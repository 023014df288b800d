//! Dual-transport request CLI.
//!
//! Executes a single request through the direct or script-injection transport
//! and prints the completion.
//!
//! # Architecture Overview
//!
//! ```text
//!     CLI args + config
//!            │
//!            ▼
//!     ┌──────────────┐   GET/POST/...   ┌──────────────────┐    ┌────────────────┐
//!     │ HttpBackend  │─────────────────▶│ DirectTransport  │───▶│ ReqwestRequest │
//!     │ (outstanding │                  └──────────────────┘    └────────────────┘
//!     │   counter)   │   JSONP          ┌──────────────────┐    ┌────────────────┐
//!     │              │─────────────────▶│ ScriptTransport  │───▶│ HttpScriptHost │
//!     └──────────────┘                  └────────┬─────────┘    └───────┬────────┘
//!            ▲                                   │   CallbackRegistry   │
//!            │        Completion                 └──────────────────────┘
//!            └──────────────────────────────────────────────
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use dual_transport::config::{load_config, BackendConfig};
use dual_transport::observability::logging::init_logging;
use dual_transport::platform::{HttpScriptHost, ReqwestFactory};
use dual_transport::transport::CallbackRegistry;
use dual_transport::{Completion, HttpBackend, Payload, RequestDescriptor};

#[derive(Parser)]
#[command(name = "dual-transport")]
#[command(about = "Execute one request over the direct or script-injection transport", long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request method. The configured script method (default JSONP) selects script injection.
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request header as 'Name: value'. Repeatable.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body.
    #[arg(short = 'd', long)]
    data: Option<String>,

    /// Cancel the request after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Desired response type (text, json, arraybuffer).
    #[arg(long)]
    response_type: Option<String>,

    /// Send credentials with cross-origin requests.
    #[arg(long)]
    with_credentials: bool,

    /// Target URL. Relative URLs resolve against the configured base URL.
    #[arg(default_value = "")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BackendConfig::default(),
    };

    init_logging(&config.observability);

    tracing::debug!(
        base_url = %config.base_url,
        script_method = %config.jsonp.method,
        "Configuration loaded"
    );

    let factory = ReqwestFactory::from_config(&config.http)?;
    let registry = Arc::new(CallbackRegistry::new(config.jsonp.callback_namespace.clone()));
    let host = Arc::new(HttpScriptHost::new(factory.client().clone(), Arc::clone(&registry)));
    let backend = HttpBackend::from_config(&config, factory, host, registry);

    let request = build_request(&cli)?;
    let completion = backend.execute(request).await?;
    print_completion(&completion)?;

    Ok(())
}

fn build_request(cli: &Cli) -> Result<RequestDescriptor, Box<dyn std::error::Error>> {
    let mut request = RequestDescriptor::new(cli.method.clone(), cli.url.clone())
        .with_credentials(cli.with_credentials);

    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{}', expected 'Name: value'", header))?;
        request = request.header(name.trim(), value.trim());
    }

    if let Some(data) = &cli.data {
        request = request.body(data.as_str());
    }
    if let Some(ms) = cli.timeout_ms {
        request = request.timeout(Duration::from_millis(ms));
    }
    if let Some(response_type) = &cli.response_type {
        request = request.response_type(response_type.clone());
    }

    Ok(request)
}

fn print_completion(completion: &Completion) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} {}", completion.status, completion.status_text);
    if let Some(headers) = &completion.raw_headers {
        print!("{}", headers);
    }
    println!();

    match &completion.body {
        Some(Payload::Text(text)) => println!("{}", text),
        Some(Payload::Json(value)) => println!("{}", serde_json::to_string_pretty(value)?),
        Some(Payload::Binary(bytes)) => println!("<{} bytes>", bytes.len()),
        None => {}
    }

    if !completion.is_success() {
        eprintln!("Request failed with status {}", completion.status);
    }
    Ok(())
}
