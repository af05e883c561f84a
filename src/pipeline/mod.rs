//! Signal pipeline: history, rate estimation, session context, handoff.

pub mod handoff;
pub mod history;
pub mod rate;
pub mod session;

pub use handoff::SpectrumSlot;
pub use history::{HistoryWindow, Sample, SampleHistory};
pub use rate::RateEstimator;
pub use session::{SensorSession, SessionStats};
