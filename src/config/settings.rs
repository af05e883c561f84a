//! Settings - pipeline, spectrum, and export tuning as TOML values
//!
//! Every constant that drives the signal pipeline is a field here.
//! Each struct implements `Default` with values matching the sensor
//! firmware's nominal 100 Hz operation, so behavior is sensible when
//! no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Top-Level Settings
// ============================================================================

/// Root configuration for an accelspec deployment.
///
/// Load with `Settings::load()` which searches:
/// 1. `$ACCELSPEC_CONFIG` env var
/// 2. `./accelspec.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP/WebSocket server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Ingestion pipeline trigger intervals and buffer sizing
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Sampling-rate estimator tuning
    #[serde(default)]
    pub rate: RateSettings,

    /// Spectral analysis and gain shaping
    #[serde(default)]
    pub spectrum: SpectrumSettings,

    /// Snapshot export
    #[serde(default)]
    pub export: ExportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            pipeline: PipelineSettings::default(),
            rate: RateSettings::default(),
            spectrum: SpectrumSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address for the combined ingest + API server
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Pipeline trigger intervals and history sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Capacity of each history sequence (samples retained per axis)
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Run the spectrum analyzer every N appended samples
    #[serde(default = "default_analyzer_interval")]
    pub analyzer_trigger_interval: u64,

    /// Snapshot the magnitude buffer to the export sink every N samples
    #[serde(default = "default_export_interval")]
    pub export_trigger_interval: u64,

    /// Re-estimate the sampling rate every N appended samples
    #[serde(default = "default_rate_update_interval")]
    pub rate_update_interval: u64,
}

fn default_buffer_capacity() -> usize {
    1000
}
fn default_analyzer_interval() -> u64 {
    100
}
fn default_export_interval() -> u64 {
    1000
}
fn default_rate_update_interval() -> u64 {
    10
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            analyzer_trigger_interval: default_analyzer_interval(),
            export_trigger_interval: default_export_interval(),
            rate_update_interval: default_rate_update_interval(),
        }
    }
}

/// Sampling-rate estimator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSettings {
    /// Assumed rate before any data arrives (Hz)
    #[serde(default = "default_rate_hz")]
    pub default_rate_hz: f64,

    /// EMA smoothing factor: weight of the newest instantaneous rate
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,
}

fn default_rate_hz() -> f64 {
    100.0
}
fn default_smoothing_alpha() -> f64 {
    0.2
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            default_rate_hz: default_rate_hz(),
            smoothing_alpha: default_smoothing_alpha(),
        }
    }
}

/// Spectral analysis window and gain shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumSettings {
    /// FFT length (input is zero-padded to this length)
    #[serde(default = "default_fft_length")]
    pub fft_length: usize,

    /// Analysis window: most recent samples fed to each transform
    #[serde(default = "default_analysis_window")]
    pub analysis_window: usize,

    /// Minimum samples required before a spectrum is computed
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Low edge of the band of interest (Hz)
    #[serde(default = "default_min_freq")]
    pub min_freq_hz: f64,

    /// High edge of the band of interest (Hz)
    #[serde(default = "default_max_freq")]
    pub max_freq_hz: f64,

    /// Frequency where the linear emphasis boost begins (Hz)
    #[serde(default = "default_emphasis_start")]
    pub emphasis_start_hz: f64,

    /// Exponential decay rate applied below min_freq_hz
    #[serde(default = "default_low_decay")]
    pub low_decay: f64,

    /// Exponential decay rate applied above max_freq_hz
    #[serde(default = "default_high_decay")]
    pub high_decay: f64,

    /// Extra gain at max_freq_hz: scale there is 1 + emphasis_boost
    #[serde(default = "default_emphasis_boost")]
    pub emphasis_boost: f64,

    /// Low edge of the dominant-frequency search band (Hz)
    #[serde(default = "default_dominant_low")]
    pub dominant_band_low_hz: f64,

    /// High edge of the dominant-frequency search band (Hz)
    #[serde(default = "default_dominant_high")]
    pub dominant_band_high_hz: f64,
}

fn default_fft_length() -> usize {
    128
}
fn default_analysis_window() -> usize {
    100
}
fn default_min_samples() -> usize {
    50
}
fn default_min_freq() -> f64 {
    0.5
}
fn default_max_freq() -> f64 {
    10.0
}
fn default_emphasis_start() -> f64 {
    7.0
}
fn default_low_decay() -> f64 {
    2.0
}
fn default_high_decay() -> f64 {
    0.5
}
fn default_emphasis_boost() -> f64 {
    2.0
}
fn default_dominant_low() -> f64 {
    4.0
}
fn default_dominant_high() -> f64 {
    6.0
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self {
            fft_length: default_fft_length(),
            analysis_window: default_analysis_window(),
            min_samples: default_min_samples(),
            min_freq_hz: default_min_freq(),
            max_freq_hz: default_max_freq(),
            emphasis_start_hz: default_emphasis_start(),
            low_decay: default_low_decay(),
            high_decay: default_high_decay(),
            emphasis_boost: default_emphasis_boost(),
            dominant_band_low_hz: default_dominant_low(),
            dominant_band_high_hz: default_dominant_high(),
        }
    }
}

/// Snapshot export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory where CSV snapshots are written
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

fn default_export_dir() -> String {
    "./exports".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

// ============================================================================
// Loading & Validation
// ============================================================================

/// Configuration loading/validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Settings {
    /// Load settings using the standard search order:
    /// 1. `$ACCELSPEC_CONFIG` environment variable
    /// 2. `./accelspec.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("ACCELSPEC_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(settings) => {
                        info!(path = %p.display(), "Loaded settings from ACCELSPEC_CONFIG");
                        return settings;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from ACCELSPEC_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "ACCELSPEC_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("accelspec.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(settings) => {
                    info!("Loaded settings from ./accelspec.toml");
                    return settings;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./accelspec.toml, using defaults");
                }
            }
        }

        info!("No accelspec.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let settings: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check internal consistency. Bad values here would silently
    /// corrupt every downstream computation, so they are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.buffer_capacity must be > 0".into(),
            ));
        }
        if self.pipeline.analyzer_trigger_interval == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.analyzer_trigger_interval must be > 0".into(),
            ));
        }
        if self.pipeline.export_trigger_interval == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.export_trigger_interval must be > 0".into(),
            ));
        }
        if self.pipeline.rate_update_interval == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.rate_update_interval must be > 0".into(),
            ));
        }
        if self.rate.default_rate_hz <= 0.0 {
            return Err(ConfigError::Invalid(
                "rate.default_rate_hz must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.rate.smoothing_alpha) {
            return Err(ConfigError::Invalid(
                "rate.smoothing_alpha must be within [0, 1]".into(),
            ));
        }
        if self.spectrum.fft_length < 2 {
            return Err(ConfigError::Invalid(
                "spectrum.fft_length must be >= 2".into(),
            ));
        }
        if self.spectrum.min_samples == 0
            || self.spectrum.min_samples > self.spectrum.analysis_window
        {
            return Err(ConfigError::Invalid(
                "spectrum.min_samples must be in 1..=analysis_window".into(),
            ));
        }
        if self.spectrum.min_freq_hz < 0.0
            || self.spectrum.emphasis_start_hz < self.spectrum.min_freq_hz
            || self.spectrum.max_freq_hz <= self.spectrum.emphasis_start_hz
        {
            return Err(ConfigError::Invalid(
                "spectrum band must satisfy 0 <= min_freq <= emphasis_start < max_freq".into(),
            ));
        }
        if self.spectrum.dominant_band_high_hz < self.spectrum.dominant_band_low_hz {
            return Err(ConfigError::Invalid(
                "spectrum.dominant_band_high_hz must be >= dominant_band_low_hz".into(),
            ));
        }
        Ok(())
    }
}
