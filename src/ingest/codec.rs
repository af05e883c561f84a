//! Sample frame wire codec
//!
//! One frame is exactly 12 bytes: three consecutive little-endian
//! IEEE-754 32-bit floats in x, y, z order. This module defines the
//! wire contract; sensor firmware must match it bit-for-bit.
//!
//! Frames of any other length are rejected with [`CodecError::MalformedFrame`]
//! and no state is mutated — the connection itself stays open.

use thiserror::Error;

/// Exact wire frame length in bytes: 3 axes x 4 bytes.
pub const FRAME_LEN: usize = 12;

/// Frame decode errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed frame: expected {FRAME_LEN} bytes, got {0}")]
    MalformedFrame(usize),
}

/// Decode a wire frame into its (x, y, z) acceleration triple.
///
/// Accepts exactly [`FRAME_LEN`] bytes; anything else is malformed.
pub fn decode_frame(bytes: &[u8]) -> Result<(f32, f32, f32), CodecError> {
    if bytes.len() != FRAME_LEN {
        return Err(CodecError::MalformedFrame(bytes.len()));
    }

    // Length is checked above, so these slices are infallible.
    let x = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let y = f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let z = f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    Ok((x, y, z))
}

/// Encode an (x, y, z) triple into wire format.
///
/// Used by the frame generator and tests; the inverse of [`decode_frame`].
pub fn encode_frame(x: f32, y: f32, z: f32) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0..4].copy_from_slice(&x.to_le_bytes());
    frame[4..8].copy_from_slice(&y.to_le_bytes());
    frame[8..12].copy_from_slice(&z.to_le_bytes());
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_triple() {
        let (x, y, z) = (0.125_f32, -9.81_f32, 3.0e-4_f32);
        let frame = encode_frame(x, y, z);
        let (dx, dy, dz) = decode_frame(&frame).unwrap();

        assert!((dx - x).abs() < 1e-6);
        assert!((dy - y).abs() < 1e-6);
        assert!((dz - z).abs() < 1e-6);
    }

    #[test]
    fn decode_is_little_endian_xyz_order() {
        // 1.0f32 LE = [0, 0, 128, 63]
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&[0, 0, 128, 63]);
        let (x, y, z) = decode_frame(&bytes).unwrap();
        assert_eq!(x, 1.0);
        assert_eq!(y, 0.0);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn short_frame_rejected() {
        assert_eq!(
            decode_frame(&[0u8; 11]),
            Err(CodecError::MalformedFrame(11))
        );
    }

    #[test]
    fn long_frame_rejected() {
        assert_eq!(
            decode_frame(&[0u8; 13]),
            Err(CodecError::MalformedFrame(13))
        );
    }

    #[test]
    fn empty_frame_rejected() {
        assert_eq!(decode_frame(&[]), Err(CodecError::MalformedFrame(0)));
    }

    #[test]
    fn special_values_survive_round_trip() {
        let frame = encode_frame(f32::MAX, f32::MIN_POSITIVE, -0.0);
        let (x, y, z) = decode_frame(&frame).unwrap();
        assert_eq!(x, f32::MAX);
        assert_eq!(y, f32::MIN_POSITIVE);
        assert_eq!(z, -0.0);
    }
}
