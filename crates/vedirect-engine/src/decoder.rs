//! Unit decoding and sample publication.
//!
//! [`Decoder`] takes assembled lines and frames, resolves them against the
//! catalogs and publishes (output path, value) samples through two hooks:
//! `on_data` for every successfully decoded sample and `on_change` only when
//! the value differs from the cached one. Change tracking is keyed by the
//! wire identity of the sample (text tag or 16-bit register id), not the
//! output path, so aliased registers that share a path are still tracked
//! apart. Every failure is logged and the unit dropped; decoding never
//! stalls the stream.
//!
//! Text values are published raw; turning them into typed numbers is the
//! consumer's job, via [`ParameterDefinition::scaled_value`]. Register
//! payloads are decoded and scaled here, since their raw form is binary.
//!
//! [`ParameterDefinition::scaled_value`]: vedirect_protocol::ParameterDefinition::scaled_value

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use vedirect_protocol::{
    lookup_parameter, lookup_register, verify_checksum, HexFrame, ProtocolError,
    RegisterDefinition, RSP_ASYNC, RSP_GET, RSP_PING, TERMINATOR_TAG,
};

use crate::assembler::{now_millis, AssembledUnit, RawUnit};
use crate::cache::ChangeCache;

/// Sample publication hook: `(output path, value)`.
pub type SampleHook = Box<dyn FnMut(&str, &str) + Send>;

/// Decodes assembled units into published samples.
pub struct Decoder {
    cache: ChangeCache,
    /// Register catalog resolutions, memoized on first sight so repeated
    /// async broadcasts skip the table scan.
    resolved: HashMap<u16, Option<&'static RegisterDefinition>>,
    on_data: SampleHook,
    on_change: SampleHook,
}

impl Decoder {
    pub fn new(on_data: SampleHook, on_change: SampleHook) -> Self {
        Decoder {
            cache: ChangeCache::new(),
            resolved: HashMap::new(),
            on_data,
            on_change,
        }
    }

    /// Decode one assembled unit at its capture time.
    pub fn handle_unit(&mut self, unit: &RawUnit) {
        match &unit.payload {
            AssembledUnit::Line(line) => self.line_at(line, unit.timestamp_ms),
            AssembledUnit::Frame(bytes) => self.frame_at(bytes, unit.timestamp_ms),
        }
    }

    /// Decode one text-mode line, stamped with the current time.
    pub fn handle_line(&mut self, line: &str) {
        self.line_at(line, now_millis());
    }

    /// Decode one checksum-valid HEX frame, stamped with the current time.
    pub fn handle_frame(&mut self, bytes: &[u8]) {
        self.frame_at(bytes, now_millis());
    }

    fn line_at(&mut self, line: &str, timestamp_ms: u64) {
        let fields: Vec<&str> = line.split('\t').collect();
        // The checksum tag closes a text block; its value byte is arbitrary
        // binary and is swallowed whether or not the separator survived.
        if fields[0] == TERMINATOR_TAG {
            trace!("text block boundary");
            return;
        }
        if fields.len() != 2 {
            let err = ProtocolError::SyntaxError {
                fields: fields.len(),
                line: line.to_string(),
            };
            warn!(%err, "dropping malformed line");
            return;
        }
        let (tag, raw) = (fields[0], fields[1].trim());
        match lookup_parameter(tag) {
            Some(def) => {
                (self.on_data)(def.output_path, raw);
                if self.cache.update_text(tag, raw, timestamp_ms) {
                    (self.on_change)(def.output_path, raw);
                }
            }
            None => {
                let err = ProtocolError::UnknownTag(tag.to_string());
                warn!(%err, "dropping line");
            }
        }
    }

    fn frame_at(&mut self, bytes: &[u8], timestamp_ms: u64) {
        if let Err(err) = verify_checksum(bytes) {
            warn!(%err, "dropping corrupt frame");
            return;
        }
        // Dispatch on the response code before assuming the get/async body
        // layout; a ping or error reply need not fit it.
        match bytes.first().copied() {
            Some(RSP_GET) | Some(RSP_ASYNC) => {}
            Some(RSP_PING) => {
                debug!(payload = %hex::encode_upper(&bytes[1..]), "ping response");
                return;
            }
            Some(other) => {
                trace!(command = other, "ignoring frame");
                return;
            }
            None => return,
        }
        let frame = match HexFrame::decode(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "dropping undecodable frame");
                return;
            }
        };
        if frame.flags != 0 {
            warn!(
                register = format_args!("0x{:04X}", frame.register_id),
                flags = frame.flags,
                "device reported reply flags"
            );
            return;
        }
        let def = *self
            .resolved
            .entry(frame.register_id)
            .or_insert_with(|| lookup_register(frame.register_id));
        let def = match def {
            Some(def) => def,
            None => {
                // Best-effort passthrough: raw payload under a synthetic
                // path, no change tracking without a definition.
                let err = ProtocolError::UnknownRegister(frame.register_id);
                warn!(%err, "passing payload through unresolved");
                let path = format!("Hex/0x{:04X}", frame.register_id);
                (self.on_data)(&path, &hex::encode_upper(frame.payload));
                return;
            }
        };
        match def.decode_value(frame.payload) {
            Ok(value) => {
                (self.on_data)(def.output_path, &value);
                if self
                    .cache
                    .update_register(frame.register_id, &value, timestamp_ms)
                {
                    (self.on_change)(def.output_path, &value);
                }
            }
            Err(err) => {
                warn!(%err, register = %def.name, "dropping undecodable payload");
            }
        }
    }

    /// Cached last values, for diagnostics.
    pub fn cache(&self) -> &ChangeCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Samples = Arc<Mutex<Vec<(String, String)>>>;

    fn recording_decoder() -> (Decoder, Samples, Samples) {
        let data: Samples = Arc::new(Mutex::new(Vec::new()));
        let changes: Samples = Arc::new(Mutex::new(Vec::new()));
        let data_sink = data.clone();
        let change_sink = changes.clone();
        let decoder = Decoder::new(
            Box::new(move |path, value| {
                data_sink.lock().push((path.to_string(), value.to_string()));
            }),
            Box::new(move |path, value| {
                change_sink
                    .lock()
                    .push((path.to_string(), value.to_string()));
            }),
        );
        (decoder, data, changes)
    }

    #[test]
    fn test_text_line_published_raw() {
        let (mut decoder, data, changes) = recording_decoder();
        decoder.handle_line("V\t13050");
        assert_eq!(
            data.lock().as_slice(),
            &[("Dc/0/Voltage".to_string(), "13050".to_string())]
        );
        assert_eq!(changes.lock().len(), 1);
    }

    #[test]
    fn test_repeated_line_fires_data_not_change() {
        let (mut decoder, data, changes) = recording_decoder();
        decoder.handle_line("V\t13050");
        decoder.handle_line("V\t13050");
        decoder.handle_line("V\t12980");
        assert_eq!(data.lock().len(), 3);
        let changes = changes.lock();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1], ("Dc/0/Voltage".to_string(), "12980".to_string()));
    }

    #[test]
    fn test_value_whitespace_trimmed() {
        let (mut decoder, data, _) = recording_decoder();
        decoder.handle_line("PPV\t 52 ");
        assert_eq!(
            data.lock().as_slice(),
            &[("Pv/0/Power".to_string(), "52".to_string())]
        );
    }

    #[test]
    fn test_checksum_tag_swallowed() {
        let (mut decoder, data, _) = recording_decoder();
        decoder.handle_line("Checksum\t\u{0084}");
        decoder.handle_line("Checksum");
        assert!(data.lock().is_empty());
    }

    #[test]
    fn test_unknown_tag_dropped_without_callbacks() {
        let (mut decoder, data, changes) = recording_decoder();
        decoder.handle_line("XYZ\t1");
        assert!(data.lock().is_empty());
        assert!(changes.lock().is_empty());
        assert!(decoder.cache().is_empty());
    }

    #[test]
    fn test_malformed_line_dropped() {
        let (mut decoder, data, _) = recording_decoder();
        decoder.handle_line("V\t13050\textra");
        assert!(data.lock().is_empty());
    }

    #[test]
    fn test_async_frame_decoded_and_change_tracked() {
        // Absorption voltage register, un16, scale 0.01 V; raw 1250.
        let (mut decoder, data, changes) = recording_decoder();
        let frame = HexFrame::encode(RSP_ASYNC, 0xEDF7, 0, &1250u16.to_le_bytes());
        decoder.handle_frame(&frame);
        decoder.handle_frame(&frame);
        assert_eq!(
            data.lock().as_slice(),
            &[
                ("Settings/AbsorptionVoltage".to_string(), "12.50".to_string()),
                ("Settings/AbsorptionVoltage".to_string(), "12.50".to_string()),
            ]
        );
        assert_eq!(changes.lock().len(), 1);
    }

    #[test]
    fn test_corrupt_frame_fires_nothing() {
        let (mut decoder, data, changes) = recording_decoder();
        let mut frame = HexFrame::encode(RSP_ASYNC, 0xEDF7, 0, &1250u16.to_le_bytes());
        let last = frame.len() - 1;
        frame[last] ^= 0x10;
        decoder.handle_frame(&frame);
        assert!(data.lock().is_empty());
        assert!(changes.lock().is_empty());
    }

    #[test]
    fn test_flagged_reply_dropped() {
        let frame = HexFrame::encode(
            RSP_GET,
            0xEDF7,
            vedirect_protocol::FLAG_UNKNOWN_ID,
            &1250u16.to_le_bytes(),
        );
        let (mut decoder, data, _) = recording_decoder();
        decoder.handle_frame(&frame);
        assert!(data.lock().is_empty());
    }

    #[test]
    fn test_unknown_register_passes_raw_hex_without_change() {
        let (mut decoder, data, changes) = recording_decoder();
        let frame = HexFrame::encode(RSP_ASYNC, 0x9999, 0, &[0xAB, 0xCD]);
        decoder.handle_frame(&frame);
        assert_eq!(
            data.lock().as_slice(),
            &[("Hex/0x9999".to_string(), "ABCD".to_string())]
        );
        assert!(changes.lock().is_empty());
        assert!(decoder.cache().is_empty());
    }

    #[test]
    fn test_aliased_history_register_resolves() {
        // 0x1052 aliases onto the daily history entry at 0x1050.
        let mut payload = vec![0u8; 34];
        payload[1..5].copy_from_slice(&250u32.to_le_bytes());
        let frame = HexFrame::encode(RSP_GET, 0x1052, 0, &payload);
        let (mut decoder, data, _) = recording_decoder();
        decoder.handle_frame(&frame);
        let data = data.lock();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].0, "History/Daily");
        assert!(data[0].1.contains("Yield: 250"));
    }

    #[test]
    fn test_aliased_registers_change_tracked_per_id() {
        // Two history days with identical payloads publish under one path
        // but each register id gets its own change record.
        let payload = vec![0u8; 34];
        let (mut decoder, _, changes) = recording_decoder();
        decoder.handle_frame(&HexFrame::encode(RSP_GET, 0x1051, 0, &payload));
        decoder.handle_frame(&HexFrame::encode(RSP_GET, 0x1052, 0, &payload));
        decoder.handle_frame(&HexFrame::encode(RSP_GET, 0x1051, 0, &payload));
        assert_eq!(changes.lock().len(), 2);
        assert!(decoder.cache().register(0x1051).is_some());
        assert!(decoder.cache().register(0x1052).is_some());
    }

    #[test]
    fn test_ping_response_ignored() {
        // A ping reply does not carry the get/async body layout; it is
        // acknowledged and dropped without callbacks.
        let mut frame = vec![RSP_PING, 0x16, 0x12];
        frame.push(0x55u8.wrapping_sub(frame.iter().fold(0, |s, &b| s.wrapping_add(b))));
        let (mut decoder, data, changes) = recording_decoder();
        decoder.handle_frame(&frame);
        assert!(data.lock().is_empty());
        assert!(changes.lock().is_empty());
    }

    #[test]
    fn test_first_seen_timestamp_from_capture() {
        let (mut decoder, _, _) = recording_decoder();
        let unit = RawUnit {
            timestamp_ms: 42_000,
            payload: AssembledUnit::Line("V\t13050".to_string()),
        };
        decoder.handle_unit(&unit);
        let entry = decoder.cache().text("V").expect("entry should exist");
        assert_eq!(entry.first_seen_ms, 42_000);
        assert_eq!(entry.last_value, "13050");
    }
}
