//! HEX frame validation and decoding.
//!
//! A frame travels on the wire as `:` followed by hex digit pairs. After
//! nibble decoding the byte layout is:
//!
//! ```text
//! +-----+-------+-------+-----+-------+----------------+-------+
//! | cmd | id_lo | id_hi | len | flags | payload        | check |
//! +-----+-------+-------+-----+-------+----------------+-------+
//! ```
//!
//! `len` counts the flags byte plus the payload, so the complete frame is
//! `3 (header) + 1 (length byte) + len + 1 (checksum)` bytes. The sum of all
//! bytes, checksum included, modulo 256 must equal [`FRAME_CHECKSUM`].

use crate::constants::{FRAME_CHECKSUM, FRAME_HEADER_LEN, MIN_FRAME_LEN};
use crate::error::ProtocolError;

/// Byte sum of a decoded frame, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Check the frame checksum law without decoding the body.
pub fn verify_checksum(bytes: &[u8]) -> Result<(), ProtocolError> {
    let actual = checksum(bytes);
    if actual == FRAME_CHECKSUM {
        Ok(())
    } else {
        Err(ProtocolError::ChecksumMismatch {
            actual,
            expected: FRAME_CHECKSUM,
        })
    }
}

/// Total frame length implied by the header, once enough bytes are decoded.
///
/// Returns `None` while fewer than four bytes are available. Used by the
/// assembler to know when a frame is complete.
pub fn expected_frame_len(bytes: &[u8]) -> Option<usize> {
    if bytes.len() <= FRAME_HEADER_LEN {
        return None;
    }
    // header + length byte + body + checksum
    Some(FRAME_HEADER_LEN + 1 + bytes[FRAME_HEADER_LEN] as usize + 1)
}

/// A validated get/async frame borrowed from its decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexFrame<'a> {
    /// Command or response code (first frame byte).
    pub command: u8,
    /// Register identifier (little-endian on the wire).
    pub register_id: u16,
    /// Reply flags.
    pub flags: u8,
    /// Register value bytes.
    pub payload: &'a [u8],
}

impl<'a> HexFrame<'a> {
    /// Decode and validate a get/async frame body.
    ///
    /// Checks the checksum law, the minimum length, and that the declared
    /// length matches the decoded byte count exactly.
    pub fn decode(bytes: &'a [u8]) -> Result<Self, ProtocolError> {
        verify_checksum(bytes)?;
        if bytes.len() < MIN_FRAME_LEN {
            return Err(ProtocolError::FrameTooShort {
                expected: MIN_FRAME_LEN,
                actual: bytes.len(),
            });
        }
        let expected = expected_frame_len(bytes).unwrap_or(MIN_FRAME_LEN);
        if bytes.len() < expected {
            return Err(ProtocolError::FrameTooShort {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(ProtocolError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(HexFrame {
            command: bytes[0],
            register_id: u16::from_le_bytes([bytes[1], bytes[2]]),
            flags: bytes[4],
            payload: &bytes[5..expected - 1],
        })
    }

    /// Encode a frame, computing the length byte and the closing checksum.
    pub fn encode(command: u8, register_id: u16, flags: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MIN_FRAME_LEN + payload.len());
        bytes.push(command);
        bytes.extend_from_slice(&register_id.to_le_bytes());
        bytes.push(1 + payload.len() as u8);
        bytes.push(flags);
        bytes.extend_from_slice(payload);
        bytes.push(FRAME_CHECKSUM.wrapping_sub(checksum(&bytes)));
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RSP_ASYNC;

    #[test]
    fn test_encode_satisfies_checksum_law() {
        let bytes = HexFrame::encode(RSP_ASYNC, 0xEDD5, 0, &[0xE2, 0x04]);
        assert_eq!(checksum(&bytes), FRAME_CHECKSUM);
        assert!(verify_checksum(&bytes).is_ok());
    }

    #[test]
    fn test_decode_round_trip() {
        let bytes = HexFrame::encode(RSP_ASYNC, 0xEDD5, 0, &[0xE2, 0x04]);
        let frame = HexFrame::decode(&bytes).expect("should decode frame");
        assert_eq!(frame.command, RSP_ASYNC);
        assert_eq!(frame.register_id, 0xEDD5);
        assert_eq!(frame.flags, 0);
        assert_eq!(frame.payload, &[0xE2, 0x04]);
    }

    #[test]
    fn test_empty_payload_frame() {
        let bytes = HexFrame::encode(RSP_ASYNC, 0x0201, 0, &[]);
        assert_eq!(bytes.len(), MIN_FRAME_LEN);
        let frame = HexFrame::decode(&bytes).expect("should decode frame");
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_any_single_byte_mutation_fails_checksum() {
        let bytes = HexFrame::encode(RSP_ASYNC, 0xEDD5, 0, &[0xE2, 0x04]);
        for i in 0..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[i] ^= 0x01;
            match HexFrame::decode(&corrupted) {
                Err(ProtocolError::ChecksumMismatch { .. }) => {}
                other => panic!("byte {} mutation not rejected: {:?}", i, other),
            }
        }
    }

    #[test]
    fn test_frame_too_short() {
        // Valid checksum over too few bytes: cmd + id + pad to constant.
        let mut bytes = vec![RSP_ASYNC, 0xD5, 0xED, 0x00];
        bytes.push(FRAME_CHECKSUM.wrapping_sub(checksum(&bytes)));
        match HexFrame::decode(&bytes) {
            Err(ProtocolError::FrameTooShort { actual, .. }) => assert_eq!(actual, 5),
            other => panic!("expected FrameTooShort, got {:?}", other),
        }
    }

    #[test]
    fn test_declared_length_exceeds_bytes() {
        // Length byte claims more body than present; checksum made valid.
        let mut bytes = vec![RSP_ASYNC, 0xD5, 0xED, 0x05, 0x00];
        bytes.push(FRAME_CHECKSUM.wrapping_sub(checksum(&bytes)));
        match HexFrame::decode(&bytes) {
            Err(ProtocolError::FrameTooShort { expected, actual }) => {
                assert_eq!(expected, 10);
                assert_eq!(actual, 6);
            }
            other => panic!("expected FrameTooShort, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_declared_length_with_padding_rejected() {
        // Checksum-valid six bytes whose header declares a 0-byte body;
        // must come back as an error, never slice out of bounds.
        let mut bytes = vec![RSP_ASYNC, 0x00, 0x00, 0x00, 0x00];
        bytes.push(FRAME_CHECKSUM.wrapping_sub(checksum(&bytes)));
        match HexFrame::decode(&bytes) {
            Err(ProtocolError::LengthMismatch { expected, actual }) => {
                assert_eq!(expected, 5);
                assert_eq!(actual, 6);
            }
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_bytes_beyond_declared_length_rejected() {
        let mut bytes = HexFrame::encode(RSP_ASYNC, 0xEDF7, 0, &[0xE2, 0x04]);
        // Append a byte and repair the checksum so only the length is off.
        bytes.push(0x00);
        let last = bytes.len() - 1;
        bytes[last] = FRAME_CHECKSUM.wrapping_sub(checksum(&bytes[..last]));
        match HexFrame::decode(&bytes) {
            Err(ProtocolError::LengthMismatch { expected, actual }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 9);
            }
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_expected_frame_len() {
        assert_eq!(expected_frame_len(&[RSP_ASYNC, 0xD5, 0xED]), None);
        assert_eq!(expected_frame_len(&[RSP_ASYNC, 0xD5, 0xED, 0x03]), Some(8));
    }
}
