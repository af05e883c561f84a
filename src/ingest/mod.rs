//! Sensor data ingestion
//!
//! Handles frame decode and the transports that deliver frames:
//! WebSocket binary messages from the sensor, or a raw byte stream
//! on stdin for local testing with the frame generator.

pub mod codec;
pub mod stdin_source;
pub mod ws;

pub use codec::{decode_frame, encode_frame, CodecError, FRAME_LEN};
