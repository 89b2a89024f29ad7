//! Protocol constants
//!
//! Command codes, response codes, reply flags and framing values used by the
//! VE.Direct HEX protocol, plus the reserved tag of the text protocol.

// ============================================================================
// Command Codes (host → device)
// ============================================================================

/// Enter bootloader mode (payload 0x51FA..51FA).
pub const CMD_ENTER_BOOT: u8 = 0x00;
/// Presence check; the device answers with a ping response.
pub const CMD_PING: u8 = 0x01;
/// Returns the application version in a done response.
pub const CMD_APP_VERSION: u8 = 0x03;
/// Returns the product id in a done response.
pub const CMD_PRODUCT_ID: u8 = 0x04;
/// Restarts the device; no response is sent.
pub const CMD_RESTART: u8 = 0x06;
/// Read a register value.
pub const CMD_GET: u8 = 0x07;
/// Write a register value.
pub const CMD_SET: u8 = 0x08;

// ============================================================================
// Response Codes (device → host)
// ============================================================================

/// Successful execution of the received command.
pub const RSP_DONE: u8 = 0x01;
/// Unknown command; payload carries the offending command byte.
pub const RSP_UNKNOWN: u8 = 0x03;
/// Frame error (payload 0xAAAA) or failure to enter the bootloader.
pub const RSP_ERROR: u8 = 0x04;
/// Ping response carrying the BCD firmware version and firmware type.
pub const RSP_PING: u8 = 0x05;
/// Get response: register id, flags, then the register value.
pub const RSP_GET: u8 = 0x07;
/// Set response: register id, flags, then the value that was written.
pub const RSP_SET: u8 = 0x08;
/// Unsolicited register broadcast; same body as a get response.
pub const RSP_ASYNC: u8 = 0x0A;

// ============================================================================
// Reply Flags
// ============================================================================

/// The requested register id does not exist.
pub const FLAG_UNKNOWN_ID: u8 = 0x01;
/// Attempted to write a read-only register.
pub const FLAG_NOT_SUPPORTED: u8 = 0x02;
/// The written value is out of range or inconsistent.
pub const FLAG_PARAMETER_ERROR: u8 = 0x04;

// ============================================================================
// Framing
// ============================================================================

/// Sum of every decoded frame byte (checksum included) modulo 256 must equal
/// this value for the frame to be accepted.
pub const FRAME_CHECKSUM: u8 = 0x55;

/// Byte that opens a HEX frame when received at the start of a line.
pub const FRAME_START: u8 = b':';

/// Header bytes preceding the length field: command + 16-bit register id.
pub const FRAME_HEADER_LEN: usize = 3;

/// Smallest decodable get/async frame:
/// command, id-lo, id-hi, length, flags, checksum.
pub const MIN_FRAME_LEN: usize = 6;

// ============================================================================
// Text protocol
// ============================================================================

/// Reserved tag that terminates a text block. The accompanying checksum byte
/// is accepted but not verified.
pub const TERMINATOR_TAG: &str = "Checksum";

/// Field separator of the text protocol.
pub const FIELD_SEPARATOR: char = '\t';
