//! Pull API handlers and router assembly
//!
//! The consumer contract is pull-only: `GET /api/spectrum` returns the
//! latest computed spectrum (or 204 when none exists yet — never an
//! error), `GET /api/status` reports rate estimate, buffer occupancy,
//! and session counters. The sensor connects to `GET /ingest` and
//! upgrades to a WebSocket.

use axum::extract::connect_info::ConnectInfo;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::AppContext;
use crate::ingest::ws;
use crate::pipeline::session::SessionStats;

/// Build the combined ingest + pull API router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/ingest", get(ingest_upgrade))
        .route("/api/spectrum", get(latest_spectrum))
        .route("/api/status", get(status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

// ============================================================================
// Response Types
// ============================================================================

/// Session health and pipeline state for the dashboard header.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Current sampling-rate estimate (Hz)
    pub rate_hz: f64,
    /// Occupied history length
    pub buffer_len: usize,
    /// Whether at least one spectrum has been published
    pub spectrum_available: bool,
    /// Server uptime in seconds
    pub uptime_secs: u64,
    #[serde(flatten)]
    pub stats: SessionStats,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /ingest — upgrade the sensor connection to a WebSocket.
async fn ingest_upgrade(
    State(ctx): State<AppContext>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    upgrade: WebSocketUpgrade,
) -> Response {
    info!(client = %peer, "Sensor requesting WebSocket upgrade");
    upgrade.on_upgrade(move |socket| ws::handle_socket(socket, ctx, peer.to_string()))
}

/// GET /api/spectrum — latest spectral result, 204 when none yet.
///
/// The slot is left populated: a consumer polling faster than the
/// analyzer produces will re-read the same result, by design.
async fn latest_spectrum(State(ctx): State<AppContext>) -> Response {
    match ctx.slot.latest() {
        Some(result) => Json(result.as_ref().clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET /api/status — rate estimate, buffer occupancy, counters.
async fn status(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    let (rate_hz, buffer_len, stats) = {
        let session = ctx.session.read().await;
        (session.rate_hz(), session.buffer_len(), session.stats())
    };

    Json(StatusResponse {
        rate_hz,
        buffer_len,
        spectrum_available: ctx.slot.is_populated(),
        uptime_secs: ctx.started.elapsed().as_secs(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::pipeline::{SensorSession, SpectrumSlot};
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};
    use tokio_util::sync::CancellationToken;

    fn test_ctx() -> AppContext {
        let settings = Settings::default();
        let slot = Arc::new(SpectrumSlot::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        // Receiver dropped: export jobs are discarded, which the
        // session tolerates
        let session = SensorSession::new(&settings, slot.clone(), tx);
        AppContext::new(
            Arc::new(RwLock::new(session)),
            slot,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn status_reports_defaults_before_data() {
        let ctx = test_ctx();
        let Json(body) = status(State(ctx)).await;

        assert!((body.rate_hz - 100.0).abs() < f64::EPSILON);
        assert_eq!(body.buffer_len, 0);
        assert!(!body.spectrum_available);
        assert_eq!(body.stats.samples_ingested, 0);
    }

    #[tokio::test]
    async fn spectrum_endpoint_is_no_content_when_empty() {
        let ctx = test_ctx();
        let response = latest_spectrum(State(ctx)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn spectrum_endpoint_returns_json_once_published() {
        let ctx = test_ctx();
        {
            let mut session = ctx.session.write().await;
            for i in 0..100u32 {
                let x = (2.0 * std::f64::consts::PI * 5.0 * f64::from(i) / 100.0).sin() as f32;
                let frame = crate::ingest::codec::encode_frame(x, 0.0, 0.0);
                session
                    .ingest_frame_at(&frame, f64::from(i) / 100.0)
                    .unwrap();
            }
        }

        let response = latest_spectrum(State(ctx)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
