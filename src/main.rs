//! accelspec - real-time accelerometer spectrum engine
//!
//! Ingests 12-byte accelerometer frames over a WebSocket (or stdin for
//! local testing), maintains bounded history, estimates the true
//! sampling rate, and serves shaped spectra to a polling dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Serve ingest + API on the default address
//! cargo run --release
//!
//! # Local testing with the frame generator
//! cargo run --bin frame-gen -- --freq 5 --rate 100 | accelspec --stdin
//!
//! # Explicit config file
//! accelspec --config ./accelspec.toml
//! ```
//!
//! # Environment Variables
//!
//! - `ACCELSPEC_CONFIG`: path to the TOML config file
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use accelspec::api::{self, AppContext};
use accelspec::config::Settings;
use accelspec::export::{spawn_export_worker, CsvSink};
use accelspec::ingest::stdin_source;
use accelspec::pipeline::{SensorSession, SpectrumSlot};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "accelspec")]
#[command(about = "Real-time accelerometer spectrum engine")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default from config: "0.0.0.0:8000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (overrides the standard search order)
    #[arg(long)]
    config: Option<String>,

    /// Override the snapshot export directory
    #[arg(long)]
    export_dir: Option<String>,

    /// Read raw 12-byte frames from stdin instead of waiting for a
    /// WebSocket sensor. Use with the frame generator:
    /// frame-gen | accelspec --stdin
    #[arg(long)]
    stdin: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    // ---- Configuration ----
    let mut settings = match &args.config {
        Some(path) => Settings::load_from_file(std::path::Path::new(path))
            .with_context(|| format!("failed to load config from {}", path))?,
        None => Settings::load(),
    };
    if let Some(addr) = args.addr {
        settings.server.bind_addr = addr;
    }
    if let Some(dir) = args.export_dir {
        settings.export.dir = dir;
    }
    settings.validate().context("invalid configuration")?;

    info!(
        bind_addr = %settings.server.bind_addr,
        buffer_capacity = settings.pipeline.buffer_capacity,
        fft_length = settings.spectrum.fft_length,
        "Starting accelspec"
    );

    // ---- Pipeline wiring ----
    let cancel = CancellationToken::new();
    let slot = Arc::new(SpectrumSlot::new());

    let (export_tx, export_rx) = mpsc::unbounded_channel();
    let sink = CsvSink::new(&settings.export.dir)
        .with_context(|| format!("failed to prepare export dir {}", settings.export.dir))?;
    let export_worker = spawn_export_worker(sink, export_rx, cancel.child_token());

    let session = Arc::new(RwLock::new(SensorSession::new(
        &settings,
        slot.clone(),
        export_tx,
    )));
    let ctx = AppContext::new(session, slot, cancel.clone());

    // ---- Optional stdin ingest ----
    let stdin_task = if args.stdin {
        let ctx = ctx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = stdin_source::run(ctx).await {
                warn!(error = %e, "Stdin ingest failed");
            }
        }))
    } else {
        None
    };

    // ---- Shutdown signal ----
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received — shutting down");
                cancel.cancel();
            }
        });
    }

    // ---- Serve ----
    let app = api::router(ctx);
    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_addr))?;
    info!(addr = %settings.server.bind_addr, "Listening for sensor and dashboard connections");

    let shutdown = cancel.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .context("server error")?;

    // ---- Teardown ----
    cancel.cancel();
    if let Some(task) = stdin_task {
        let _ = task.await;
    }
    let _ = export_worker.await;
    info!("Shutdown complete");
    Ok(())
}
