//! Daily history record decoding.
//!
//! The history registers (0x1050.. and 0x10A0..) answer with a fixed 34-byte
//! record. Fields are extracted at explicit, length-checked offsets; the
//! record is never reinterpreted as an overlaid struct.

use std::fmt;

use crate::error::ProtocolError;

/// Size of the daily history record payload in bytes.
pub const HISTORY_RECORD_LEN: usize = 34;

/// One day of charger history, raw (unscaled) field values.
///
/// Scales per the vendor docs: yields 0.01 kWh, voltages 0.01 V, currents
/// 0.1 A, times in minutes, power in W.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryDayRecord {
    /// Reserved byte at offset 0.
    pub reserved: u8,
    /// Yield (0.01 kWh).
    pub yield_total: u32,
    /// Consumed energy (0.01 kWh).
    pub consumed: u32,
    /// Battery voltage maximum (0.01 V).
    pub ubat_max: u16,
    /// Battery voltage minimum (0.01 V).
    pub ubat_min: u16,
    /// Error database marker (always 0).
    pub error_db: u8,
    /// Most recent error code.
    pub error0: u8,
    /// Second error code.
    pub error1: u8,
    /// Third error code.
    pub error2: u8,
    /// Fourth error code.
    pub error3: u8,
    /// Time spent in bulk (min).
    pub time_bulk: u16,
    /// Time spent in absorption (min).
    pub time_absorption: u16,
    /// Time spent in float (min).
    pub time_float: u16,
    /// Maximum power (W).
    pub power_max: u32,
    /// Maximum battery current (0.1 A).
    pub batt_current_max: u16,
    /// Maximum panel voltage (0.01 V).
    pub upanel_max: u16,
    /// Day sequence number.
    pub day_sequence: u16,
}

impl HistoryDayRecord {
    /// Decode a record from a register payload.
    ///
    /// The payload must hold at least [`HISTORY_RECORD_LEN`] bytes; extra
    /// trailing bytes are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < HISTORY_RECORD_LEN {
            return Err(ProtocolError::FrameTooShort {
                expected: HISTORY_RECORD_LEN,
                actual: payload.len(),
            });
        }
        Ok(HistoryDayRecord {
            reserved: payload[0],
            yield_total: read_u32(payload, 1),
            consumed: read_u32(payload, 5),
            ubat_max: read_u16(payload, 9),
            ubat_min: read_u16(payload, 11),
            error_db: payload[13],
            error0: payload[14],
            error1: payload[15],
            error2: payload[16],
            error3: payload[17],
            time_bulk: read_u16(payload, 18),
            time_absorption: read_u16(payload, 20),
            time_float: read_u16(payload, 22),
            power_max: read_u32(payload, 24),
            batt_current_max: read_u16(payload, 28),
            upanel_max: read_u16(payload, 30),
            day_sequence: read_u16(payload, 32),
        })
    }
}

impl fmt::Display for HistoryDayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n\tYield: {}", self.yield_total)?;
        write!(f, "\n\tConsumed: {}", self.consumed)?;
        write!(f, "\n\tUBatMax: {}", self.ubat_max)?;
        write!(f, "\n\tUBatMin: {}", self.ubat_min)?;
        write!(f, "\n\tErrors: {}", self.error_db)?;
        for code in [self.error0, self.error1, self.error2, self.error3] {
            if code != 0 {
                write!(f, ", {}", code)?;
            }
        }
        write!(f, "\n\tTimeBulk: {}", self.time_bulk)?;
        write!(f, "\n\tTimeAbs: {}", self.time_absorption)?;
        write!(f, "\n\tTimeFloat: {}", self.time_float)?;
        write!(f, "\n\tPowerMax: {}", self.power_max)?;
        write!(f, "\n\tBattCurrMax: {}", self.batt_current_max)?;
        write!(f, "\n\tUPanelMax: {}", self.upanel_max)?;
        write!(f, "\n\tDaySeqNr: {}", self.day_sequence)
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Vec<u8> {
        let mut payload = vec![0u8; HISTORY_RECORD_LEN];
        payload[0] = 0; // reserved
        payload[1..5].copy_from_slice(&1234u32.to_le_bytes()); // yield
        payload[5..9].copy_from_slice(&56u32.to_le_bytes()); // consumed
        payload[9..11].copy_from_slice(&1420u16.to_le_bytes()); // ubat max
        payload[11..13].copy_from_slice(&1180u16.to_le_bytes()); // ubat min
        payload[14] = 2; // error0
        payload[18..20].copy_from_slice(&240u16.to_le_bytes()); // bulk
        payload[20..22].copy_from_slice(&120u16.to_le_bytes()); // absorption
        payload[22..24].copy_from_slice(&300u16.to_le_bytes()); // float
        payload[24..28].copy_from_slice(&480u32.to_le_bytes()); // power max
        payload[28..30].copy_from_slice(&155u16.to_le_bytes()); // current max
        payload[30..32].copy_from_slice(&7510u16.to_le_bytes()); // panel max
        payload[32..34].copy_from_slice(&42u16.to_le_bytes()); // day seq
        payload
    }

    #[test]
    fn test_decode_record() {
        let record = HistoryDayRecord::decode(&sample_record()).expect("should decode");
        assert_eq!(record.yield_total, 1234);
        assert_eq!(record.consumed, 56);
        assert_eq!(record.ubat_max, 1420);
        assert_eq!(record.ubat_min, 1180);
        assert_eq!(record.error0, 2);
        assert_eq!(record.time_bulk, 240);
        assert_eq!(record.time_absorption, 120);
        assert_eq!(record.time_float, 300);
        assert_eq!(record.power_max, 480);
        assert_eq!(record.batt_current_max, 155);
        assert_eq!(record.upanel_max, 7510);
        assert_eq!(record.day_sequence, 42);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut payload = sample_record();
        payload.extend_from_slice(&[0xAA, 0xBB]);
        let record = HistoryDayRecord::decode(&payload).expect("should decode");
        assert_eq!(record.day_sequence, 42);
    }

    #[test]
    fn test_short_record_rejected() {
        let payload = vec![0u8; HISTORY_RECORD_LEN - 1];
        match HistoryDayRecord::decode(&payload) {
            Err(ProtocolError::FrameTooShort { expected, actual }) => {
                assert_eq!(expected, HISTORY_RECORD_LEN);
                assert_eq!(actual, HISTORY_RECORD_LEN - 1);
            }
            other => panic!("expected FrameTooShort, got {:?}", other),
        }
    }

    #[test]
    fn test_render_lists_only_nonzero_errors() {
        let record = HistoryDayRecord::decode(&sample_record()).unwrap();
        let text = record.to_string();
        assert!(text.contains("\tYield: 1234"));
        assert!(text.contains("\tErrors: 0, 2\n"));
        assert!(text.contains("\tDaySeqNr: 42"));
    }
}
