//! Latest-wins spectrum handoff
//!
//! A single-slot, non-blocking mailbox between the analyzer and the
//! polling consumer. `publish` overwrites any unconsumed prior result
//! unconditionally; nothing ever queues. `latest` returns the held
//! result and leaves it in place, so a consumer polling faster than
//! production simply re-reads the same spectrum.
//!
//! Deliberately lossy: display freshness matters more than
//! completeness, and a stalled consumer can never grow memory.

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use crate::processing::SpectralResult;

/// Lock-free single-slot cell holding the most recent spectral result.
#[derive(Default)]
pub struct SpectrumSlot {
    slot: ArcSwapOption<SpectralResult>,
}

impl SpectrumSlot {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Replace the held result. The previous one, consumed or not, is
    /// dropped. Never blocks the producer.
    pub fn publish(&self, result: SpectralResult) {
        self.slot.store(Some(Arc::new(result)));
    }

    /// The currently held result, if any. Leaves it in place for
    /// subsequent polls.
    pub fn latest(&self) -> Option<Arc<SpectralResult>> {
        self.slot.load_full()
    }

    /// Whether a result has been published since startup.
    pub fn is_populated(&self) -> bool {
        self.slot.load().is_some()
    }
}
