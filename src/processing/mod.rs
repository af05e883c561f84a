//! Spectral processing - windowed FFT with band-emphasis shaping

mod spectrum;

pub use spectrum::{hann_window, BandShaper, DominantPeak, SpectrumAnalyzer};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in spectral processing
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Insufficient data: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Invalid sampling rate: {0}")]
    InvalidSamplingRate(f64),
}

/// Immutable spectral snapshot from one analyzer run.
///
/// The four magnitude sequences are parallel to `frequencies` and
/// already carry the band-emphasis shaping. Ownership transfers to
/// the handoff slot; nothing mutates a result after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralResult {
    /// Non-negative frequency bins (Hz), up to Nyquist
    pub frequencies: Vec<f64>,
    /// Shaped magnitude spectrum of the x axis
    pub x: Vec<f64>,
    /// Shaped magnitude spectrum of the y axis
    pub y: Vec<f64>,
    /// Shaped magnitude spectrum of the z axis
    pub z: Vec<f64>,
    /// Shaped magnitude spectrum of the magnitude series
    pub magnitude: Vec<f64>,
    /// Strongest shaped bin within the configured dominant band,
    /// omitted when no bin falls inside the band
    pub dominant: Option<DominantPeak>,
    /// Sample rate the bins were derived from (Hz)
    pub sample_rate_hz: f64,
    /// Number of real (unpadded) samples behind this spectrum
    pub sample_count: usize,
    /// When the analysis ran
    pub computed_at: chrono::DateTime<chrono::Utc>,
}
