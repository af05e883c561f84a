//! Per-sensor session context
//!
//! One `SensorSession` owns all accumulator state for a sensor feed:
//! history buffers, sample counter, rate estimator, analyzer, and the
//! handoff slot handle. Instantiated once per session and passed by
//! handle to every operation, so independent sessions and tests never
//! cross-contaminate.
//!
//! The codec -> append -> analyze path is synchronous; the transport
//! task drives it frame by frame. Triggers fire off the sample
//! counter: rate re-estimation, spectrum analysis every K samples,
//! and snapshot export every M samples.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::export::SnapshotJob;
use crate::ingest::codec::{decode_frame, CodecError};
use crate::processing::{ProcessingError, SpectrumAnalyzer};

use super::handoff::SpectrumSlot;
use super::history::{Sample, SampleHistory};
use super::rate::RateEstimator;

/// Session counters for status reporting.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SessionStats {
    /// Successfully decoded and appended samples
    pub samples_ingested: u64,
    /// Malformed frames dropped without state mutation
    pub frames_dropped: u64,
    /// Spectra published to the handoff slot
    pub spectra_published: u64,
    /// Analyzer cycles skipped for insufficient signal
    pub cycles_skipped: u64,
    /// Snapshot jobs handed to the export worker
    pub exports_triggered: u64,
}

/// Owned context for one sensor feed.
pub struct SensorSession {
    history: SampleHistory,
    rate: RateEstimator,
    analyzer: SpectrumAnalyzer,
    slot: Arc<SpectrumSlot>,
    export_tx: mpsc::UnboundedSender<SnapshotJob>,

    analysis_window: usize,
    analyzer_interval: u64,
    export_interval: u64,
    rate_interval: u64,

    export_sequence: u64,
    stats: SessionStats,
    clock_origin: Instant,
}

impl SensorSession {
    pub fn new(
        settings: &Settings,
        slot: Arc<SpectrumSlot>,
        export_tx: mpsc::UnboundedSender<SnapshotJob>,
    ) -> Self {
        Self {
            history: SampleHistory::new(settings.pipeline.buffer_capacity),
            rate: RateEstimator::new(settings.rate.default_rate_hz, settings.rate.smoothing_alpha),
            analyzer: SpectrumAnalyzer::new(&settings.spectrum),
            slot,
            export_tx,
            analysis_window: settings.spectrum.analysis_window,
            analyzer_interval: settings.pipeline.analyzer_trigger_interval,
            export_interval: settings.pipeline.export_trigger_interval,
            rate_interval: settings.pipeline.rate_update_interval,
            export_sequence: 0,
            stats: SessionStats::default(),
            clock_origin: Instant::now(),
        }
    }

    /// Ingest one wire frame, stamping it with the session's monotonic
    /// clock.
    ///
    /// A malformed frame is dropped with no state mutation; the error
    /// is returned so the transport can log it, but ingestion
    /// continues on the next frame.
    pub fn ingest_frame(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let now = self.clock_origin.elapsed().as_secs_f64();
        self.ingest_frame_at(bytes, now)
    }

    /// Ingest one wire frame with an explicit arrival timestamp
    /// (monotonic seconds). Drives every downstream trigger.
    pub fn ingest_frame_at(&mut self, bytes: &[u8], timestamp: f64) -> Result<(), CodecError> {
        let (x, y, z) = match decode_frame(bytes) {
            Ok(triple) => triple,
            Err(e) => {
                self.stats.frames_dropped += 1;
                return Err(e);
            }
        };

        self.history.append(Sample::new(x, y, z, timestamp));
        self.stats.samples_ingested += 1;
        let count = self.stats.samples_ingested;

        if count % self.rate_interval == 0 {
            self.rate.update(&self.history.timestamps());
        }
        if count % self.analyzer_interval == 0 {
            self.run_analysis();
        }
        if count % self.export_interval == 0 {
            self.trigger_export();
        }
        Ok(())
    }

    /// One spectrum pass over the buffer tail. An insufficient-signal
    /// cycle is a skip, not an error.
    fn run_analysis(&mut self) {
        let window = self.history.tail(self.analysis_window);
        match self.analyzer.analyze(&window, self.rate.rate_hz()) {
            Ok(result) => {
                debug!(
                    samples = result.sample_count,
                    rate_hz = result.sample_rate_hz,
                    dominant_hz = result.dominant.map(|d| d.frequency_hz),
                    "Spectrum published"
                );
                self.slot.publish(result);
                self.stats.spectra_published += 1;
            }
            Err(ProcessingError::InsufficientData { needed, available }) => {
                self.stats.cycles_skipped += 1;
                debug!(needed, available, "Analyzer cycle skipped — not enough signal");
            }
            Err(e) => {
                warn!(error = %e, "Spectrum analysis failed");
            }
        }
    }

    /// Snapshot the magnitude buffer and hand it off. Never blocks:
    /// the copy detaches from the live buffer and the channel is
    /// unbounded.
    fn trigger_export(&mut self) {
        self.export_sequence += 1;
        let job = SnapshotJob {
            sequence: self.export_sequence,
            values: self.history.magnitude_snapshot(),
            captured_at: chrono::Utc::now(),
        };
        if self.export_tx.send(job).is_err() {
            warn!(
                sequence = self.export_sequence,
                "Export worker gone — snapshot discarded"
            );
        } else {
            self.stats.exports_triggered += 1;
        }
    }

    /// Current sampling-rate belief (Hz).
    pub fn rate_hz(&self) -> f64 {
        self.rate.rate_hz()
    }

    /// Occupied history length.
    pub fn buffer_len(&self) -> usize {
        self.history.len()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}
