//! Adaptive sampling-rate estimation
//!
//! Sensor transmission jitter makes raw inter-arrival time noisy. An
//! exponential moving average over the mean delta of the retained
//! timestamp window damps network/OS scheduling jitter while still
//! tracking genuine rate drift, without requiring a hardware clock on
//! the sensor.

/// Minimum buffered timestamps before an update is attempted.
const MIN_TIMESTAMPS: usize = 10;

/// Exponentially-smoothed belief about the sensor's samples-per-second.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    rate_hz: f64,
    alpha: f64,
    updates: u64,
}

impl RateEstimator {
    /// Start from a configured default rate (used for frequency-bin
    /// labeling until enough data has arrived).
    pub fn new(default_rate_hz: f64, alpha: f64) -> Self {
        debug_assert!(default_rate_hz > 0.0);
        Self {
            rate_hz: default_rate_hz,
            alpha,
            updates: 0,
        }
    }

    /// Current estimate in Hz. Always > 0.
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// Number of successful updates applied so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Re-estimate from the retained timestamp window (seconds,
    /// oldest first).
    ///
    /// Fewer than 10 timestamps is not an error, just a no-op. A
    /// non-positive mean delta (duplicate or out-of-order timestamps)
    /// is skipped silently; the previous estimate stands.
    pub fn update(&mut self, timestamps: &[f64]) {
        if timestamps.len() < MIN_TIMESTAMPS {
            return;
        }

        let deltas = timestamps.len() - 1;
        let avg_delta: f64 = timestamps
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .sum::<f64>()
            / deltas as f64;

        if avg_delta <= 0.0 {
            return;
        }

        let instantaneous = 1.0 / avg_delta;
        self.rate_hz = self.alpha * instantaneous + (1.0 - self.alpha) * self.rate_hz;
        self.updates += 1;

        tracing::trace!(
            instantaneous_hz = instantaneous,
            smoothed_hz = self.rate_hz,
            "Sampling rate updated"
        );
    }
}
