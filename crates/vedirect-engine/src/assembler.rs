//! Dual-mode stream assembly.
//!
//! The serial link interleaves two framings: text-mode `TAG<TAB>VALUE` lines
//! terminated by `\r` or `\n`, and HEX-mode binary frames sent as `:`
//! followed by hex digit pairs. [`FrameAssembler`] consumes one byte at a
//! time and emits a complete unit whenever one closes, switching modes at
//! the `:` marker. A frame is complete when the length its header declares
//! has been collected; the length field self-terminates the frame, so no
//! timeout is needed.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};
use tracing::warn;

use vedirect_protocol::{expected_frame_len, ProtocolError, FRAME_CHECKSUM, FRAME_START};

/// A complete unit recovered from the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembledUnit {
    /// One text-mode line, line endings stripped.
    Line(String),
    /// One checksum-valid HEX frame, nibbles already paired into bytes.
    Frame(Bytes),
}

/// A timestamped unit crossing the thread boundary. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnit {
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// The assembled line or frame.
    pub payload: AssembledUnit,
}

impl RawUnit {
    /// Wrap a unit with the current wall-clock capture time.
    pub fn now(payload: AssembledUnit) -> Self {
        RawUnit {
            timestamp_ms: now_millis(),
            payload,
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Hex,
}

/// Incremental line/frame assembler.
///
/// Feed bytes with [`push`](FrameAssembler::push); a returned unit is
/// complete and, for frames, already checksum-validated. Corrupt frames are
/// logged and discarded, and assembly resumes in text mode.
pub struct FrameAssembler {
    mode: Mode,
    line: String,
    frame: BytesMut,
    /// High nibble of a partially decoded hex byte. Explicit state, so
    /// independent assembler instances never interfere.
    pending_nibble: Option<u8>,
    /// Byte sum of the frame so far, modulo 256.
    running_checksum: u8,
}

impl FrameAssembler {
    pub fn new() -> Self {
        FrameAssembler {
            mode: Mode::Text,
            line: String::new(),
            frame: BytesMut::new(),
            pending_nibble: None,
            running_checksum: 0,
        }
    }

    /// Consume one byte, returning a unit if it completed one.
    pub fn push(&mut self, byte: u8) -> Option<AssembledUnit> {
        match self.mode {
            Mode::Text => self.push_text(byte),
            Mode::Hex => self.push_hex(byte),
        }
    }

    fn push_text(&mut self, byte: u8) -> Option<AssembledUnit> {
        match byte {
            FRAME_START if self.line.is_empty() => {
                self.mode = Mode::Hex;
                self.frame.clear();
                self.pending_nibble = None;
                self.running_checksum = 0;
                None
            }
            b'\n' | b'\r' => {
                if self.line.is_empty() {
                    None
                } else {
                    Some(AssembledUnit::Line(std::mem::take(&mut self.line)))
                }
            }
            _ => {
                self.line.push(char::from(byte));
                None
            }
        }
    }

    fn push_hex(&mut self, byte: u8) -> Option<AssembledUnit> {
        // Stray non-hex bytes (whitespace, line endings) carry no nibble
        // value and are skipped; the declared length terminates the frame.
        let nibble = hex_nibble(byte)?;
        match self.pending_nibble.take() {
            None => {
                self.pending_nibble = Some(nibble);
                None
            }
            Some(high) => {
                let decoded = (high << 4) | nibble;
                self.frame.extend_from_slice(&[decoded]);
                self.running_checksum = self.running_checksum.wrapping_add(decoded);
                if expected_frame_len(&self.frame) == Some(self.frame.len()) {
                    return self.finish_frame();
                }
                None
            }
        }
    }

    fn finish_frame(&mut self) -> Option<AssembledUnit> {
        self.mode = Mode::Text;
        self.pending_nibble = None;
        let bytes = self.frame.split().freeze();
        if self.running_checksum == FRAME_CHECKSUM {
            Some(AssembledUnit::Frame(bytes))
        } else {
            let err = ProtocolError::ChecksumMismatch {
                actual: self.running_checksum,
                expected: FRAME_CHECKSUM,
            };
            warn!(%err, "discarding corrupt frame");
            None
        }
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}
