//! Periodic snapshot export
//!
//! Every M appended samples the session captures a value copy of the
//! magnitude buffer and hands it to a sink on a dedicated worker task.
//! The worker drains an unbounded channel, so a slow disk can overlap
//! with ingestion but can never stall it; sink failures are logged and
//! the next export interval proceeds independently.

use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sink failures. Never propagated into the ingestion path.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One captured snapshot, already detached from the live buffer.
#[derive(Debug, Clone)]
pub struct SnapshotJob {
    /// Monotonically increasing export sequence number
    pub sequence: u64,
    /// Magnitude buffer contents, oldest first
    pub values: Vec<f64>,
    /// Wall-clock capture time, used for file naming
    pub captured_at: DateTime<Utc>,
}

/// Durable sink collaborator. Owns naming and format.
pub trait SnapshotSink: Send + 'static {
    fn write_snapshot(&mut self, job: &SnapshotJob) -> Result<(), ExportError>;
}

// ============================================================================
// CSV Sink
// ============================================================================

/// Writes each snapshot as `accel_snapshot_<seq>_<utc>.csv`, one value
/// per line under a single `magnitude` header.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// Create the sink, making the target directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, ExportError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn file_path(&self, job: &SnapshotJob) -> PathBuf {
        let stamp = job.captured_at.format("%Y%m%dT%H%M%SZ");
        self.dir
            .join(format!("accel_snapshot_{:05}_{}.csv", job.sequence, stamp))
    }
}

impl SnapshotSink for CsvSink {
    fn write_snapshot(&mut self, job: &SnapshotJob) -> Result<(), ExportError> {
        let path = self.file_path(job);
        let file = std::fs::File::create(&path)?;
        let mut writer = std::io::BufWriter::new(file);

        writeln!(writer, "magnitude")?;
        for value in &job.values {
            writeln!(writer, "{}", value)?;
        }
        writer.flush()?;

        debug!(
            path = %path.display(),
            values = job.values.len(),
            sequence = job.sequence,
            "Snapshot exported"
        );
        Ok(())
    }
}

// ============================================================================
// Worker Task
// ============================================================================

/// Spawn the export worker. It runs until cancellation, draining any
/// jobs already queued before exiting.
pub fn spawn_export_worker<S: SnapshotSink>(
    mut sink: S,
    mut jobs: mpsc::UnboundedReceiver<SnapshotJob>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut written = 0u64;
        let mut failed = 0u64;

        loop {
            let job = tokio::select! {
                _ = cancel.cancelled() => break,
                job = jobs.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            match sink.write_snapshot(&job) {
                Ok(()) => written += 1,
                Err(e) => {
                    failed += 1;
                    warn!(sequence = job.sequence, error = %e, "Snapshot export failed");
                }
            }
        }

        // Drain whatever arrived before shutdown
        while let Ok(job) = jobs.try_recv() {
            match sink.write_snapshot(&job) {
                Ok(()) => written += 1,
                Err(e) => {
                    failed += 1;
                    warn!(sequence = job.sequence, error = %e, "Snapshot export failed");
                }
            }
        }

        info!(written, failed, "Export worker stopped");
    })
}
