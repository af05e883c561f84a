//! Stdin ingest transport
//!
//! Reads a raw stream of 12-byte frames from stdin for local testing
//! with the frame generator:
//!
//! ```bash
//! frame-gen --freq 5 --rate 100 | accelspec --stdin
//! ```
//!
//! Byte streams carry no message boundaries, so framing is positional:
//! `read_exact` slices the stream into 12-byte chunks. A trailing
//! partial frame at EOF is discarded.

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, warn};

use crate::api::AppContext;
use crate::ingest::codec::FRAME_LEN;

/// Consume frames from stdin until EOF or shutdown.
pub async fn run(ctx: AppContext) -> Result<()> {
    info!("Reading frames from stdin");
    run_from_reader(ctx, tokio::io::stdin()).await
}

/// Drive the session from any raw byte stream.
async fn run_from_reader<R>(ctx: AppContext, mut reader: R) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut frame = [0u8; FRAME_LEN];
    let mut received = 0u64;
    let mut dropped = 0u64;

    loop {
        let read = tokio::select! {
            _ = ctx.cancel.cancelled() => {
                info!(frames_received = received, "Stdin ingest cancelled");
                return Ok(());
            }
            read = reader.read_exact(&mut frame) => read,
        };

        match read {
            Ok(_) => {
                let result = {
                    let mut session = ctx.session.write().await;
                    session.ingest_frame(&frame)
                };
                match result {
                    Ok(()) => received += 1,
                    Err(e) => {
                        dropped += 1;
                        warn!(error = %e, "Frame dropped");
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!(
                    frames_received = received,
                    frames_dropped = dropped,
                    "Stdin stream ended"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::ingest::codec::encode_frame;
    use crate::pipeline::{SensorSession, SpectrumSlot};
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};
    use tokio_util::sync::CancellationToken;

    fn test_ctx() -> AppContext {
        let settings = Settings::default();
        let slot = Arc::new(SpectrumSlot::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = SensorSession::new(&settings, slot.clone(), tx);
        AppContext::new(
            Arc::new(RwLock::new(session)),
            slot,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn slices_stream_into_frames_until_eof() {
        let ctx = test_ctx();
        let mut stream = Vec::new();
        for i in 0..3 {
            stream.extend_from_slice(&encode_frame(i as f32, 0.0, 0.0));
        }

        run_from_reader(ctx.clone(), stream.as_slice())
            .await
            .unwrap();

        let session = ctx.session.read().await;
        assert_eq!(session.stats().samples_ingested, 3);
        assert_eq!(session.stats().frames_dropped, 0);
    }

    #[tokio::test]
    async fn trailing_partial_frame_is_discarded() {
        let ctx = test_ctx();
        let mut stream = Vec::new();
        stream.extend_from_slice(&encode_frame(1.0, 2.0, 3.0));
        stream.extend_from_slice(&[0xAA; 5]); // truncated frame at EOF

        run_from_reader(ctx.clone(), stream.as_slice())
            .await
            .unwrap();

        let session = ctx.session.read().await;
        assert_eq!(session.stats().samples_ingested, 1);
        assert_eq!(session.buffer_len(), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let ctx = test_ctx();
        ctx.cancel.cancel();

        // A pending reader would otherwise block forever
        let (_tx, rx) = tokio::io::duplex(64);
        run_from_reader(ctx.clone(), rx).await.unwrap();

        let session = ctx.session.read().await;
        assert_eq!(session.stats().samples_ingested, 0);
    }
}
