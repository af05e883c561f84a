//! accelspec: real-time accelerometer spectrum engine.
//!
//! Ingests a continuous stream of 3-axis accelerometer frames from a
//! remote sensor, maintains bounded time-ordered history, adaptively
//! estimates the true sampling rate, and periodically computes a
//! shaped, emphasis-weighted frequency spectrum for a polling display.
//!
//! ## Architecture
//!
//! - **Codec**: fixed 12-byte wire frames, three little-endian f32
//! - **History**: five parallel bounded sequences (x/y/z/magnitude/time)
//! - **Rate Estimator**: EMA over observed inter-arrival deltas
//! - **Spectrum Analyzer**: Hann window + FFT + band-emphasis shaping
//! - **Handoff Slot**: lock-free latest-wins cell for the consumer
//! - **Export**: periodic CSV snapshots on a dedicated worker task

pub mod api;
pub mod config;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod processing;

// Re-export the session context and the types consumers touch
pub use ingest::codec::{decode_frame, encode_frame, CodecError, FRAME_LEN};
pub use pipeline::handoff::SpectrumSlot;
pub use pipeline::history::{HistoryWindow, Sample, SampleHistory};
pub use pipeline::rate::RateEstimator;
pub use pipeline::session::{SensorSession, SessionStats};
pub use processing::{ProcessingError, SpectralResult};
