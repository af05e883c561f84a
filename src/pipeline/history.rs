//! Bounded time-ordered sample history
//!
//! Four parallel value sequences (x, y, z, magnitude) plus a parallel
//! arrival-timestamp sequence, all of the same fixed capacity. Appends
//! are atomic across all five; when full, the oldest entry is evicted
//! from all five simultaneously (strict FIFO, insertion order = time
//! order).
//!
//! The invariant every observer may rely on: the five sequences always
//! have equal length <= capacity.

use std::collections::VecDeque;

/// One decoded observation. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Euclidean norm of the three axes
    pub magnitude: f64,
    /// Monotonic arrival time in seconds
    pub timestamp: f64,
}

impl Sample {
    /// Build a sample from a decoded axis triple and its arrival time.
    pub fn new(x: f32, y: f32, z: f32, timestamp: f64) -> Self {
        let (xd, yd, zd) = (f64::from(x), f64::from(y), f64::from(z));
        Self {
            x,
            y,
            z,
            magnitude: (xd * xd + yd * yd + zd * zd).sqrt(),
            timestamp,
        }
    }
}

/// Read-only value snapshot of the most recent samples.
///
/// A copy, never a live view — a concurrent append cannot mutate it.
#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub magnitude: Vec<f64>,
    pub timestamps: Vec<f64>,
}

impl HistoryWindow {
    /// Number of samples in the window (identical across sequences).
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Fixed-capacity history of recent samples.
#[derive(Debug)]
pub struct SampleHistory {
    capacity: usize,
    x: VecDeque<f64>,
    y: VecDeque<f64>,
    z: VecDeque<f64>,
    magnitude: VecDeque<f64>,
    timestamps: VecDeque<f64>,
}

impl SampleHistory {
    /// Create an empty history retaining at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            capacity,
            x: VecDeque::with_capacity(capacity),
            y: VecDeque::with_capacity(capacity),
            z: VecDeque::with_capacity(capacity),
            magnitude: VecDeque::with_capacity(capacity),
            timestamps: VecDeque::with_capacity(capacity),
        }
    }

    /// Append one sample, evicting the oldest entry from every
    /// sequence first when at capacity. O(1) amortized.
    pub fn append(&mut self, sample: Sample) {
        if self.x.len() == self.capacity {
            self.x.pop_front();
            self.y.pop_front();
            self.z.pop_front();
            self.magnitude.pop_front();
            self.timestamps.pop_front();
        }
        self.x.push_back(f64::from(sample.x));
        self.y.push_back(f64::from(sample.y));
        self.z.push_back(f64::from(sample.z));
        self.magnitude.push_back(sample.magnitude);
        self.timestamps.push_back(sample.timestamp);
    }

    /// Current occupied length (0..=capacity).
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Value snapshot of up to the last `n` entries per sequence,
    /// oldest first. Returns fewer when the history holds fewer.
    pub fn tail(&self, n: usize) -> HistoryWindow {
        let len = self.x.len();
        let start = len.saturating_sub(n);
        HistoryWindow {
            x: self.x.iter().skip(start).copied().collect(),
            y: self.y.iter().skip(start).copied().collect(),
            z: self.z.iter().skip(start).copied().collect(),
            magnitude: self.magnitude.iter().skip(start).copied().collect(),
            timestamps: self.timestamps.iter().skip(start).copied().collect(),
        }
    }

    /// Value snapshot of the retained timestamps, oldest first.
    pub fn timestamps(&self) -> Vec<f64> {
        self.timestamps.iter().copied().collect()
    }

    /// Value snapshot of the entire magnitude sequence, oldest first.
    pub fn magnitude_snapshot(&self) -> Vec<f64> {
        self.magnitude.iter().copied().collect()
    }
}
