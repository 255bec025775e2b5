//! persona-stream replay binary.
//!
//! Replays a captured NDJSON response (file, stdin, or a live HTTP
//! endpoint) through the decoder, classifier and affect engine, printing
//! every event and the final state snapshot as JSON.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` — Tracing filter (default: "info,persona_stream=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin replay -- capture.ndjson --chunk-size 7
//! cat capture.ndjson | cargo run --bin replay -- --strict
//! cargo run --bin replay -- --url http://127.0.0.1:8080/stream
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use persona_stream::affect::{AffectConfig, AffectiveState, MutationMode};
use persona_stream::pipeline::{run_response_cycle_with, AffectHandle, DirectiveMapper};
use persona_stream::stream::{
    CancelHandle, ChunkSource, EventReader, FixedChunkSource, HttpChunkSource, LineReader,
    StreamError,
};
use persona_stream::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "replay",
    version = VERSION,
    about = "Replay an NDJSON assistant stream through the affect engine"
)]
struct Args {
    /// NDJSON capture to replay (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Stream from this URL instead of a file
    #[arg(long, conflicts_with = "input")]
    url: Option<String>,

    /// Bytes per chunk when replaying a file or stdin
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Affect configuration (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report out-of-domain mutations instead of ignoring them
    #[arg(long)]
    strict: bool,

    /// Store non-JSON lines as memories
    #[arg(long)]
    remember_text: bool,

    /// Decode the whole stream as one text blob instead of per-line events
    #[arg(long)]
    buffered: bool,

    /// Suppress per-event output
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,persona_stream=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AffectConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AffectConfig::default(),
    };
    if args.strict {
        config.mode = MutationMode::Strict;
    }

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, canceling stream");
            signal.cancel();
        }
    });

    let source = open_source(&args).await?;
    let cancel = CancelHandle::from_token(shutdown.child_token());

    if args.buffered {
        let event = LineReader::with_cancel(source, cancel)
            .read_buffered_event()
            .await?;
        println!("{}", serde_json::to_string(&event)?);
        return Ok(());
    }

    let handle = AffectHandle::new(AffectiveState::from_config(&config));
    let mapper = DirectiveMapper {
        remember_raw_text: args.remember_text,
        ..DirectiveMapper::default()
    };
    let mut reader = EventReader::with_cancel(source, cancel);

    let quiet = args.quiet;
    let report = run_response_cycle_with(&mut reader, &handle, &mapper, |event| {
        if !quiet {
            match serde_json::to_string(event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::error!("Failed to serialize event: {}", e),
            }
        }
    })
    .await
    .context("stream interrupted")?;

    let summary = serde_json::json!({
        "report": report,
        "snapshot": handle.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn open_source(args: &Args) -> anyhow::Result<Box<dyn ChunkSource>> {
    if let Some(url) = &args.url {
        tracing::info!("Streaming from {}", url);
        let response = reqwest::get(url)
            .await
            .map_err(StreamError::from)
            .with_context(|| format!("requesting {}", url))?;
        let source = HttpChunkSource::from_response(response)?;
        return Ok(Box::new(source));
    }

    let data = match &args.input {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };
    tracing::info!(
        "Replaying {} bytes in chunks of {}",
        data.len(),
        args.chunk_size
    );
    Ok(Box::new(FixedChunkSource::new(data, args.chunk_size)))
}
