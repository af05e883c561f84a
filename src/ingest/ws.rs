//! WebSocket ingest transport
//!
//! Each sensor holds one persistent WebSocket connection and sends one
//! binary message per frame. Wrong-length frames are dropped with a
//! warning; the connection stays open. When the transport closes, the
//! session's buffers and rate estimate are retained as-is so a
//! reconnect resumes accumulation.

use axum::extract::ws::{Message, WebSocket};
use tracing::{info, warn};

use crate::api::AppContext;

/// Drive one sensor connection until close, error, or shutdown.
pub async fn handle_socket(mut socket: WebSocket, ctx: AppContext, client: String) {
    info!(client = %client, "Sensor connected");

    let mut received = 0u64;
    let mut dropped = 0u64;

    loop {
        let msg = tokio::select! {
            _ = ctx.cancel.cancelled() => {
                info!(client = %client, "Shutting down — closing sensor connection");
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
            msg = socket.recv() => msg,
        };

        match msg {
            Some(Ok(Message::Binary(bytes))) => {
                let result = {
                    let mut session = ctx.session.write().await;
                    session.ingest_frame(&bytes)
                };
                match result {
                    Ok(()) => received += 1,
                    Err(e) => {
                        dropped += 1;
                        warn!(client = %client, error = %e, "Frame dropped");
                    }
                }
            }
            // Control frames and stray text are ignored, not fatal
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Text(_))) => {}
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                warn!(client = %client, error = %e, "Sensor socket error");
                break;
            }
        }
    }

    info!(
        client = %client,
        frames_received = received,
        frames_dropped = dropped,
        "Sensor disconnected — buffers retained for reconnect"
    );
}
