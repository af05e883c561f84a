//! Ingest + consumer-facing HTTP surface
//!
//! One axum server carries both ends of the pipeline: the sensor's
//! WebSocket ingest route and the pull API the polling renderer uses.

mod handlers;

pub use handlers::{router, StatusResponse};

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::pipeline::{SensorSession, SpectrumSlot};

/// Shared application context handed to every handler.
///
/// The session sits behind an async `RwLock` (single writer: the
/// ingest task; readers: status handlers). The spectrum slot is
/// lock-free, so the polling consumer never contends with ingestion.
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<RwLock<SensorSession>>,
    pub slot: Arc<SpectrumSlot>,
    pub cancel: CancellationToken,
    pub started: Instant,
}

impl AppContext {
    pub fn new(
        session: Arc<RwLock<SensorSession>>,
        slot: Arc<SpectrumSlot>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            slot,
            cancel,
            started: Instant::now(),
        }
    }
}
