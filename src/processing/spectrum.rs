//! Windowed FFT and frequency-domain gain shaping
//!
//! One analyzer run takes the most recent history window, applies a
//! Hann window to suppress leakage from the rectangular observation
//! window, zero-pads to the configured FFT length, transforms each of
//! the four series independently, and shapes the one-sided magnitude
//! spectra to emphasize the human-motion band while suppressing
//! near-DC drift and out-of-band noise.
//!
//! The shaping is a display heuristic, not a band-limiting filter:
//! out-of-band energy is attenuated, never zeroed.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ProcessingError, SpectralResult};
use crate::config::SpectrumSettings;
use crate::pipeline::history::HistoryWindow;

/// Strongest shaped bin within the dominant search band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DominantPeak {
    pub frequency_hz: f64,
    pub magnitude: f64,
}

/// Hann (raised-cosine) window weights for `len` samples.
///
/// Weight at index i: `0.5 - 0.5*cos(2*pi*i / (len - 1))`. A window of
/// one sample degenerates to unity weight.
pub fn hann_window(len: usize) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / denom).cos())
        .collect()
}

// ============================================================================
// Band-Emphasis Shaping
// ============================================================================

/// Frequency-dependent gain curve, piecewise over four regions:
///
/// - below `min_freq`: exponential attenuation growing with distance
///   below the cutoff (suppresses DC/near-DC drift)
/// - `[min_freq, emphasis_start]`: unity
/// - `(emphasis_start, max_freq]`: linear boost up to `1 + boost`
/// - above `max_freq`: the peak boost decaying exponentially, so the
///   curve stays continuous at the breakpoint
///
/// All constants come from configuration; they are display tuning,
/// not physical parameters.
#[derive(Debug, Clone)]
pub struct BandShaper {
    min_freq: f64,
    emphasis_start: f64,
    max_freq: f64,
    low_decay: f64,
    high_decay: f64,
    boost: f64,
}

impl BandShaper {
    pub fn from_settings(settings: &SpectrumSettings) -> Self {
        Self {
            min_freq: settings.min_freq_hz,
            emphasis_start: settings.emphasis_start_hz,
            max_freq: settings.max_freq_hz,
            low_decay: settings.low_decay,
            high_decay: settings.high_decay,
            boost: settings.emphasis_boost,
        }
    }

    /// Gain at frequency `f` (Hz). Finite and non-negative for every
    /// real input, so shaping can never introduce NaN or infinity.
    pub fn scale_at(&self, f: f64) -> f64 {
        if f < self.min_freq {
            ((f - self.min_freq) * self.low_decay).exp()
        } else if f <= self.emphasis_start {
            1.0
        } else if f <= self.max_freq {
            1.0 + (f - self.emphasis_start) / (self.max_freq - self.emphasis_start) * self.boost
        } else {
            (1.0 + self.boost) * (-(f - self.max_freq) * self.high_decay).exp()
        }
    }

    /// Shape a magnitude spectrum in place, bin by bin.
    pub fn apply(&self, frequencies: &[f64], magnitudes: &mut [f64]) {
        for (magnitude, &f) in magnitudes.iter_mut().zip(frequencies.iter()) {
            *magnitude *= self.scale_at(f);
        }
    }
}

// ============================================================================
// Spectrum Analyzer (pre-planned FFT for repeated use)
// ============================================================================

/// Spectral analyzer with a pre-planned transform, reused across runs.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    fft_length: usize,
    min_samples: usize,
    shaper: BandShaper,
    dominant_band: (f64, f64),
}

impl SpectrumAnalyzer {
    pub fn new(settings: &SpectrumSettings) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(settings.fft_length);
        Self {
            fft,
            fft_length: settings.fft_length,
            min_samples: settings.min_samples,
            shaper: BandShaper::from_settings(settings),
            dominant_band: (settings.dominant_band_low_hz, settings.dominant_band_high_hz),
        }
    }

    /// Frequency resolution (Hz per bin) at a given sample rate.
    pub fn bin_width_hz(&self, sample_rate_hz: f64) -> f64 {
        sample_rate_hz / self.fft_length as f64
    }

    /// Run one analysis over a history window.
    ///
    /// Fewer than `min_samples` samples yields `InsufficientData` —
    /// the caller treats that as a skipped cycle, not a failure.
    /// Windows longer than the FFT length are truncated to the most
    /// recent `fft_length` samples; shorter ones are Hann-windowed at
    /// their real length and zero-padded on the right.
    pub fn analyze(
        &self,
        window: &HistoryWindow,
        sample_rate_hz: f64,
    ) -> Result<SpectralResult, ProcessingError> {
        if sample_rate_hz <= 0.0 {
            return Err(ProcessingError::InvalidSamplingRate(sample_rate_hz));
        }
        let available = window.len();
        if available < self.min_samples {
            return Err(ProcessingError::InsufficientData {
                needed: self.min_samples,
                available,
            });
        }

        // Truncate (don't average) to the most recent fft_length samples.
        let used = available.min(self.fft_length);
        let weights = hann_window(used);

        let frequencies: Vec<f64> = (0..=self.fft_length / 2)
            .map(|i| i as f64 * sample_rate_hz / self.fft_length as f64)
            .collect();

        let mut x = self.one_sided_spectrum(&window.x, used, &weights);
        let mut y = self.one_sided_spectrum(&window.y, used, &weights);
        let mut z = self.one_sided_spectrum(&window.z, used, &weights);
        let mut magnitude = self.one_sided_spectrum(&window.magnitude, used, &weights);

        self.shaper.apply(&frequencies, &mut x);
        self.shaper.apply(&frequencies, &mut y);
        self.shaper.apply(&frequencies, &mut z);
        self.shaper.apply(&frequencies, &mut magnitude);

        let dominant = self.dominant_in_band(&frequencies, &magnitude);

        Ok(SpectralResult {
            frequencies,
            x,
            y,
            z,
            magnitude,
            dominant,
            sample_rate_hz,
            sample_count: used,
            computed_at: chrono::Utc::now(),
        })
    }

    /// Window, zero-pad, transform, and normalize one series.
    ///
    /// Magnitudes are scaled by the unpadded sample count, not the FFT
    /// length, so amplitude reads consistently across varying window
    /// occupancy.
    fn one_sided_spectrum(&self, samples: &[f64], used: usize, weights: &[f64]) -> Vec<f64> {
        let tail = &samples[samples.len() - used..];

        let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(self.fft_length);
        buffer.extend(
            tail.iter()
                .zip(weights.iter())
                .map(|(&s, &w)| Complex::new(s * w, 0.0)),
        );
        buffer.resize(self.fft_length, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer
            .iter()
            .take(self.fft_length / 2 + 1)
            .map(|c| c.norm() / used as f64)
            .collect()
    }

    /// Maximum shaped bin within the dominant search band, or None
    /// only when no bin falls inside the band. A flat spectrum still
    /// yields its argmax bin, zero magnitude and all.
    fn dominant_in_band(&self, frequencies: &[f64], magnitudes: &[f64]) -> Option<DominantPeak> {
        let (low, high) = self.dominant_band;
        frequencies
            .iter()
            .zip(magnitudes.iter())
            .filter(|(&f, _)| f >= low && f <= high)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(&f, &m)| DominantPeak {
                frequency_hz: f,
                magnitude: m,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn analyzer() -> SpectrumAnalyzer {
        SpectrumAnalyzer::new(&SpectrumSettings::default())
    }

    fn sine_window(freq: f64, rate: f64, count: usize, amplitude: f64) -> HistoryWindow {
        let x: Vec<f64> = (0..count)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / rate).sin())
            .collect();
        let magnitude = x.iter().map(|v| v.abs()).collect();
        HistoryWindow {
            x: x.clone(),
            y: vec![0.0; count],
            z: vec![0.0; count],
            magnitude,
            timestamps: (0..count).map(|i| i as f64 / rate).collect(),
        }
    }

    #[test]
    fn hann_endpoints_are_zero() {
        let w = hann_window(100);
        assert!(w[0].abs() < 1e-12);
        assert!(w[99].abs() < 1e-12);
        // Symmetric, peaking near the center
        assert!((w[10] - w[89]).abs() < 1e-12);
        assert!(w[49] > 0.99);
    }

    #[test]
    fn hann_degenerate_lengths() {
        assert!(hann_window(0).is_empty());
        assert_eq!(hann_window(1), vec![1.0]);
    }

    #[test]
    fn shaper_is_unity_across_pass_region() {
        let shaper = BandShaper::from_settings(&SpectrumSettings::default());
        assert!((shaper.scale_at(0.5) - 1.0).abs() < 1e-12);
        assert!((shaper.scale_at(3.0) - 1.0).abs() < 1e-12);
        assert!((shaper.scale_at(7.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn shaper_boosts_to_three_x_at_max_freq() {
        let shaper = BandShaper::from_settings(&SpectrumSettings::default());
        assert!((shaper.scale_at(10.0) - 3.0).abs() < 1e-12);
        // Halfway through the boost region: 1 + (8.5-7)/(10-7)*2 = 2.0
        assert!((shaper.scale_at(8.5) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn shaper_continuous_at_breakpoints() {
        let shaper = BandShaper::from_settings(&SpectrumSettings::default());
        let eps = 1e-9;
        for breakpoint in [0.5, 7.0, 10.0] {
            let below = shaper.scale_at(breakpoint - eps);
            let above = shaper.scale_at(breakpoint + eps);
            assert!(
                (below - above).abs() < 1e-6,
                "discontinuity at {} Hz: {} vs {}",
                breakpoint,
                below,
                above
            );
        }
    }

    #[test]
    fn shaper_attenuates_outside_band() {
        let shaper = BandShaper::from_settings(&SpectrumSettings::default());
        // Near-DC drift suppressed hard
        assert!(shaper.scale_at(0.0) < 0.4);
        assert!(shaper.scale_at(0.1) < shaper.scale_at(0.4));
        // Above-band rolloff decays but never reaches zero
        assert!(shaper.scale_at(12.0) < 3.0);
        assert!(shaper.scale_at(20.0) > 0.0);
        assert!(shaper.scale_at(20.0) < shaper.scale_at(12.0));
    }

    #[test]
    fn shaper_finite_for_extreme_inputs() {
        let shaper = BandShaper::from_settings(&SpectrumSettings::default());
        for f in [0.0, 1e-9, 50.0, 500.0, 5000.0] {
            let s = shaper.scale_at(f);
            assert!(s.is_finite() && s >= 0.0, "scale at {} Hz = {}", f, s);
        }
    }

    #[test]
    fn detects_sine_within_one_bin_width() {
        let analyzer = analyzer();
        let rate = 100.0;
        let window = sine_window(5.0, rate, 100, 1.0);

        let result = analyzer.analyze(&window, rate).unwrap();
        let dominant = result.dominant.expect("5 Hz falls inside the 4-6 Hz band");

        let bin_width = analyzer.bin_width_hz(rate);
        assert!(
            (dominant.frequency_hz - 5.0).abs() <= bin_width,
            "dominant {} Hz not within one bin ({} Hz) of 5 Hz",
            dominant.frequency_hz,
            bin_width
        );
    }

    #[test]
    fn sine_on_x_leaves_y_and_z_quiet() {
        let analyzer = analyzer();
        let result = analyzer
            .analyze(&sine_window(5.0, 100.0, 100, 1.0), 100.0)
            .unwrap();

        let x_peak = result.x.iter().cloned().fold(0.0_f64, f64::max);
        let y_peak = result.y.iter().cloned().fold(0.0_f64, f64::max);
        let z_peak = result.z.iter().cloned().fold(0.0_f64, f64::max);
        assert!(x_peak > 0.1);
        assert!(y_peak < 1e-12);
        assert!(z_peak < 1e-12);
    }

    #[test]
    fn zero_signal_yields_zero_spectrum_without_nan() {
        let analyzer = analyzer();
        let count = 100;
        let window = HistoryWindow {
            x: vec![0.0; count],
            y: vec![0.0; count],
            z: vec![0.0; count],
            magnitude: vec![0.0; count],
            timestamps: (0..count).map(|i| i as f64 * 0.01).collect(),
        };

        let result = analyzer.analyze(&window, 100.0).unwrap();
        for series in [&result.x, &result.y, &result.z, &result.magnitude] {
            assert!(series.iter().all(|v| v.is_finite()));
            assert!(series.iter().all(|v| v.abs() < 1e-12));
        }
        assert!(result.frequencies.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn too_few_samples_is_insufficient_data() {
        let analyzer = analyzer();
        let window = sine_window(5.0, 100.0, 49, 1.0);
        match analyzer.analyze(&window, 100.0) {
            Err(ProcessingError::InsufficientData { needed, available }) => {
                assert_eq!(needed, 50);
                assert_eq!(available, 49);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn short_window_is_zero_padded() {
        let analyzer = analyzer();
        let result = analyzer
            .analyze(&sine_window(5.0, 100.0, 60, 1.0), 100.0)
            .unwrap();
        // Bin count comes from the FFT length, not the sample count
        assert_eq!(result.frequencies.len(), 128 / 2 + 1);
        assert_eq!(result.sample_count, 60);
    }

    #[test]
    fn long_window_truncates_to_fft_length() {
        let analyzer = analyzer();
        let result = analyzer
            .analyze(&sine_window(5.0, 100.0, 300, 1.0), 100.0)
            .unwrap();
        assert_eq!(result.sample_count, 128);
        assert_eq!(result.frequencies.len(), 128 / 2 + 1);
    }

    #[test]
    fn bins_stop_at_nyquist() {
        let analyzer = analyzer();
        let rate = 100.0;
        let result = analyzer.analyze(&sine_window(5.0, rate, 100, 1.0), rate).unwrap();
        let last = *result.frequencies.last().unwrap();
        assert!((last - rate / 2.0).abs() < 1e-9);
        assert!(result.frequencies.windows(2).all(|p| p[1] > p[0]));
    }

    #[test]
    fn invalid_sample_rate_rejected() {
        let analyzer = analyzer();
        let window = sine_window(5.0, 100.0, 100, 1.0);
        assert!(matches!(
            analyzer.analyze(&window, 0.0),
            Err(ProcessingError::InvalidSamplingRate(_))
        ));
    }

    #[test]
    fn flat_spectrum_still_reports_an_in_band_dominant_bin() {
        let analyzer = analyzer();
        let count = 100;
        let window = HistoryWindow {
            x: vec![0.0; count],
            y: vec![0.0; count],
            z: vec![0.0; count],
            magnitude: vec![0.0; count],
            timestamps: (0..count).map(|i| i as f64 * 0.01).collect(),
        };

        let result = analyzer.analyze(&window, 100.0).unwrap();
        // Dominant is omitted only when the band contains no bins;
        // zero energy still has an argmax
        let dominant = result.dominant.expect("band contains bins");
        assert!(dominant.frequency_hz >= 4.0 && dominant.frequency_hz <= 6.0);
        assert!(dominant.magnitude.abs() < 1e-12);
    }

    #[test]
    fn dominant_omitted_when_band_has_no_bins() {
        let mut settings = SpectrumSettings::default();
        // Band narrower than one bin and straddling no bin center:
        // bins at multiples of 100/128 = 0.78125 Hz
        settings.dominant_band_low_hz = 5.1;
        settings.dominant_band_high_hz = 5.3;
        let analyzer = SpectrumAnalyzer::new(&settings);

        let result = analyzer
            .analyze(&sine_window(5.0, 100.0, 100, 1.0), 100.0)
            .unwrap();
        assert!(result.dominant.is_none());
    }
}
