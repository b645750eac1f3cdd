//! huginn: run a batch of inference requests through the dispatcher.
//!
//! Reads one JSON [`InferenceRequest`] per line (from a file or stdin),
//! processes them concurrently against an Ollama server, and writes one JSON
//! [`InferenceResponse`] per line to stdout, in input order.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use huginn::providers::OllamaEngine;
use huginn::{HuginnError, InferenceRequest, ServiceConfig, ServiceManager};

#[derive(Parser)]
#[command(name = "huginn")]
#[command(version = huginn::PKG_VERSION)]
#[command(about = "Dispatch JSON-lines inference requests to an engine")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ollama base URL.
    #[arg(long, env = "OLLAMA_HOST", default_value = huginn::providers::ollama::DEFAULT_BASE_URL)]
    ollama_url: String,

    /// Override the per-request timeout, in seconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Requests file (JSON lines). Reads stdin when omitted.
    input: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(secs) = args.timeout {
        config = config.request_timeout(Duration::from_secs(secs));
    }

    let requests = read_requests(args.input.as_deref())?;
    info!(
        version = huginn::version_string(),
        requests = requests.len(),
        ollama = %args.ollama_url,
        "huginn starting"
    );

    let manager = ServiceManager::new(config);
    let service = manager.initialize(Some(Arc::new(OllamaEngine::new(&args.ollama_url))), None);

    let responses = service.process_batch(&requests).await;

    let mut stdout = io::stdout().lock();
    for response in &responses {
        serde_json::to_writer(&mut stdout, response)?;
        writeln!(stdout)?;
    }

    info!(status = ?service.status(), "batch complete");
    manager.shutdown();
    Ok(())
}

/// Parse JSON-lines requests, skipping blank lines.
fn read_requests(path: Option<&std::path::Path>) -> Result<Vec<InferenceRequest>, HuginnError> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read requests file {path:?}: {e}"))
        })?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| HuginnError::Configuration(format!("Failed to read stdin: {e}")))?;
            buf
        }
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(HuginnError::from))
        .collect()
}
