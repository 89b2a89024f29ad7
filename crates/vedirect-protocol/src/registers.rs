//! Register catalog for the HEX protocol.
//!
//! A static, declaration-ordered table mapping 16-bit register identifiers to
//! typed, scaled definitions, plus the decode helpers for each primitive
//! type. Lookups are a linear first-match scan; the table is small enough
//! that a map buys nothing on the hardware this protocol comes from.
//!
//! Two identifier ranges alias onto a single table entry each: the daily
//! history block (`0x1051..=0x106E` → `0x1050`, today backwards) and the
//! per-tracker daily history block (`0x10A1..=0x10BE` → `0x10A0`).

use crate::error::ProtocolError;
use crate::history::HistoryDayRecord;

/// Primitive interpretation of a register payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegKind {
    /// No payload interpretation (command-style registers).
    None,
    /// Unsigned 8-bit.
    U8,
    /// Unsigned 16-bit little-endian.
    U16,
    /// Unsigned 32-bit little-endian.
    U32,
    /// Signed 8-bit.
    S8,
    /// Signed 16-bit little-endian.
    S16,
    /// Signed 32-bit little-endian.
    S32,
    /// UTF-8 text, copied through.
    String,
    /// Composite layout (daily history record).
    Raw,
}

impl RegKind {
    /// Wire-format name of the type, as the vendor docs spell it.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegKind::U8 => "un8",
            RegKind::U16 => "un16",
            RegKind::U32 => "un32",
            RegKind::S8 => "sn8",
            RegKind::S16 => "sn16",
            RegKind::S32 => "sn32",
            RegKind::String => "string",
            RegKind::Raw => "raw",
            RegKind::None => "",
        }
    }
}

/// Physical unit of a register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Unit {
    None,
    Volts,
    Amps,
    Watts,
    KiloWattHours,
    Ohms,
    Celsius,
    Kelvin,
    MilliVoltsPerKelvin,
    Hours,
    Minutes,
    Seconds,
    Millis,
    Percent,
}

impl Unit {
    /// Display string for the unit, empty when there is none.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Volts => "V",
            Unit::Amps => "A",
            Unit::Watts => "W",
            Unit::KiloWattHours => "kWh",
            Unit::Ohms => "Ohm",
            Unit::Celsius => "°C",
            Unit::Kelvin => "K",
            Unit::MilliVoltsPerKelvin => "mV/K",
            Unit::Hours => "hours",
            Unit::Minutes => "min",
            Unit::Seconds => "s",
            Unit::Millis => "ms",
            Unit::Percent => "%",
            Unit::None => "",
        }
    }
}

/// One entry of the register catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisterDefinition {
    /// Register identifier.
    pub id: u16,
    /// Short display name.
    pub name: &'static str,
    /// Multiply the raw value by this to get the SI value; `0.0` means the
    /// raw value is passed through unscaled (enumerations, bitmasks, ids).
    pub scale: f64,
    /// Payload interpretation.
    pub kind: RegKind,
    /// Physical unit.
    pub unit: Unit,
    /// Value notes from the vendor docs, empty if none.
    pub description: &'static str,
    /// Key under which decoded samples are published.
    pub output_path: &'static str,
}

const fn reg(
    id: u16,
    name: &'static str,
    scale: f64,
    kind: RegKind,
    unit: Unit,
    output_path: &'static str,
) -> RegisterDefinition {
    RegisterDefinition {
        id,
        name,
        scale,
        kind,
        unit,
        description: "",
        output_path,
    }
}

const fn reg_note(
    id: u16,
    name: &'static str,
    scale: f64,
    kind: RegKind,
    unit: Unit,
    description: &'static str,
    output_path: &'static str,
) -> RegisterDefinition {
    RegisterDefinition {
        id,
        name,
        scale,
        kind,
        unit,
        description,
        output_path,
    }
}

use RegKind::{Raw, S16, S32, U16, U32, U8};
use Unit::{
    Amps, Celsius, Hours, Kelvin, KiloWattHours, Millis, MilliVoltsPerKelvin, Minutes, Ohms,
    Percent, Seconds, Volts, Watts,
};

/// The register catalog, in declaration order.
///
/// Duplicate identifiers exist in the vendor documentation this table is
/// transcribed from (0xEDEC, 0xED90, 0x0401, 0x0402, 0x0404); resolution is
/// first match in declaration order, and [`duplicate_ids`] reports them so
/// callers can flag the overrides at startup.
pub static REGISTER_DEFS: &[RegisterDefinition] = &[
    // Product information registers
    reg(0x0100, "Product Id", 0.0, U32, Unit::None, "Product/Id"),
    reg(0x0104, "Group Id", 0.0, U8, Unit::None, "Product/GroupId"),
    reg(0x010A, "Serial number", 0.0, RegKind::String, Unit::None, "Product/Serial"),
    reg(0x010B, "Model name", 0.0, RegKind::String, Unit::None, "Product/Model"),
    reg(0x0140, "Capabilities", 0.0, U32, Unit::None, "Product/Capabilities"),
    // Generic device control registers
    reg(0x0200, "Device mode", 0.0, U8, Unit::None, "Device/Mode"),
    reg(0x0201, "Device state", 0.0, U8, Unit::None, "Device/State"),
    reg(0x0202, "Remote control used", 0.0, U32, Unit::None, "Device/RemoteControl"),
    reg(0x0205, "Device off reason", 0.0, U8, Unit::None, "Device/OffReason"),
    reg(0x0207, "Device off reason", 0.0, U32, Unit::None, "Device/OffReason2"),
    // Battery settings registers
    reg_note(0xEDFF, "Batterysafe mode", 0.0, U8, Unit::None, "0=off, 1=on", "Settings/BatterySafeMode"),
    reg_note(0xEDFE, "Adaptive mode", 0.0, U8, Unit::None, "0=off, 1=on", "Settings/AdaptiveMode"),
    reg_note(0xEDFD, "Automatic equalisation mode", 0.0, U8, Unit::None, "0=off, 1..250", "Settings/AutoEqualiseMode"),
    reg(0xEDFC, "Battery bulk time limit", 0.01, U16, Hours, "Settings/BulkTimeLimit"),
    reg(0xEDFB, "Battery absorption time limit", 0.01, U16, Hours, "Settings/AbsorptionTimeLimit"),
    reg(0xEDF7, "Battery absorption voltage", 0.01, U16, Volts, "Settings/AbsorptionVoltage"),
    reg(0xEDF6, "Battery float voltage", 0.01, U16, Volts, "Settings/FloatVoltage"),
    reg(0xEDF4, "Battery equalisation voltage", 0.01, U16, Volts, "Settings/EqualisationVoltage"),
    reg(0xEDF2, "Battery temp. compensation", 0.01, S16, MilliVoltsPerKelvin, "Settings/TempCompensation"),
    reg_note(0xEDF1, "Battery type", 1.0, U8, Unit::None, "0xFF = user", "Settings/BatteryType"),
    reg(0xEDF0, "Battery maximum current", 0.1, U16, Amps, "Settings/MaxCurrent"),
    reg(0xEDEF, "Battery voltage", 1.0, U8, Volts, "Settings/BatteryVoltage"),
    reg_note(0xEDEC, "Battery temperature", 0.01, U16, Kelvin, "0xFFFF=N/A", "Battery/Temperature"),
    reg(0xEDEA, "Battery voltage setting", 1.0, U8, Volts, "Settings/BatteryVoltageSetting"),
    reg_note(0xEDE8, "BMS present", 0.0, U8, Unit::None, "0=no, 1=yes", "Settings/BmsPresent"),
    reg(0xEDE7, "Tail current", 0.1, U16, Unit::None, "Settings/TailCurrent"),
    reg_note(0xEDE6, "Low temperature charge current", 0.1, U16, Amps, "0xFFFF=use max", "Settings/LowTempChargeCurrent"),
    reg_note(0xEDE5, "Auto equalise stop on voltage", 0.0, U8, Unit::None, "0=no, 1=yes", "Settings/AutoEqualiseStopOnVoltage"),
    reg_note(0xEDE4, "Equalisation current level", 1.0, U8, Percent, "(of 0xEDF0)", "Settings/EqualisationCurrentLevel"),
    reg(0xEDE3, "Equalisation duration", 0.01, U16, Hours, "Settings/EqualisationDuration"),
    reg(0xED2E, "Re-bulk voltage offset", 0.01, U16, Volts, "Settings/RebulkVoltageOffset"),
    reg(0xEDE0, "Battery low temperature level", 0.01, S16, Celsius, "Settings/LowTempLevel"),
    reg(0xEDCA, "Voltage compensation", 0.01, U16, Volts, "Settings/VoltageCompensation"),
    // Charger data registers
    reg(0xEDEC, "Battery temperature", 0.01, U16, Kelvin, "Battery/Temperature"),
    reg(0xEDDF, "Charger maximum current", 0.1, U16, Amps, "Charger/MaxCurrent"),
    reg(0xEDDD, "System yield", 0.01, U32, KiloWattHours, "History/SystemYield"),
    reg(0xEDDC, "User yield (resettable)", 0.01, U32, KiloWattHours, "History/UserYield"),
    reg(0xEDDB, "Charger internal temperature", 0.01, S16, Celsius, "Charger/Temperature"),
    reg(0xEDDA, "Charger error code", 0.0, U8, Unit::None, "Charger/ErrorCode"),
    reg(0xEDD7, "Charger current", 0.1, U16, Amps, "Charger/Current"),
    reg(0xEDD5, "Charger voltage", 0.01, U16, Volts, "Charger/Voltage"),
    reg(0xEDD4, "Additional charger state info", 0.0, U8, Unit::None, "Charger/StateInfo"),
    reg_note(0xEDD3, "Yield today", 0.01, U16, KiloWattHours, "un32 for fw <= 1.12", "History/YieldToday"),
    reg(0xEDD2, "Maximum power today", 1.0, U16, Watts, "History/MaxPowerToday"),
    reg_note(0xEDD1, "Yield yesterday", 0.01, U16, KiloWattHours, "un32 for fw <= 1.12", "History/YieldYesterday"),
    reg(0xEDD0, "Maximum power yesterday", 1.0, U16, Watts, "History/MaxPowerYesterday"),
    reg(0xEDCE, "Voltage settings range", 0.0, U16, Unit::None, "Charger/VoltageSettingsRange"),
    reg(0xEDCD, "History version", 0.0, U8, Unit::None, "Charger/HistoryVersion"),
    reg(0xEDCC, "Streetlight version", 0.0, U8, Unit::None, "Charger/StreetlightVersion"),
    reg(0xEDC7, "Equalise current maximum", 1.0, U8, Percent, "Charger/EqualiseCurrentMax"),
    reg(0xEDC6, "Equalise voltage maximum", 0.01, U16, Volts, "Charger/EqualiseVoltageMax"),
    reg(0x2211, "Adjustable voltage minimum", 0.01, U16, Volts, "Charger/AdjustableVoltageMin"),
    reg(0x2212, "Adjustable voltage maximum", 0.01, U16, Volts, "Charger/AdjustableVoltageMax"),
    // DC channel registers (MPPT RS models)
    reg(0xED8B, "Battery ripple voltage", 0.01, U16, Volts, "Dc/RippleVoltage"),
    reg(0xED8D, "Battery voltage", 0.01, S16, Volts, "Dc/Voltage"),
    reg(0xED8F, "Battery current", 0.1, S16, Amps, "Dc/Current"),
    // Solar panel data registers
    reg(0x0244, "Number of MPPT trackers", 0.0, U8, Unit::None, "Pv/TrackerCount"),
    reg(0xEDBF, "Panel maximum current", 0.1, U16, Amps, "Pv/MaxCurrent"),
    reg(0xEDBC, "Panel power", 0.01, U32, Watts, "Pv/Power"),
    reg(0xEDBB, "Panel voltage", 0.01, U16, Volts, "Pv/Voltage"),
    reg(0xEDBD, "Panel current", 0.1, U16, Amps, "Pv/Current"),
    reg(0xEDB8, "Panel maximum voltage", 0.01, U16, Volts, "Pv/MaxVoltage"),
    reg(0xEDB3, "Tracker mode", 0.0, U8, Unit::None, "Pv/TrackerMode"),
    reg(0xEDB2, "Panel starting voltage", 0.01, U16, Volts, "Pv/StartingVoltage"),
    reg(0xEDB1, "Panel input resistance", 1.0, U32, Ohms, "Pv/InputResistance"),
    // Load output data/settings registers
    reg(0xEDAD, "Load current", 0.1, U16, Amps, "Load/Current"),
    reg(0xEDAC, "Load offset voltage", 0.01, U8, Volts, "Load/OffsetVoltage"),
    reg(0xEDAB, "Load output control", 0.0, U8, Unit::None, "Load/OutputControl"),
    reg(0xEDA9, "Load output voltage", 0.01, U16, Volts, "Load/OutputVoltage"),
    reg(0xEDA8, "Load output state", 0.0, U8, Unit::None, "Load/OutputState"),
    reg(0xED9D, "Load switch high level", 0.01, U16, Volts, "Load/SwitchHighLevel"),
    reg(0xED9C, "Load switch low level", 0.01, U16, Volts, "Load/SwitchLowLevel"),
    reg(0xED91, "Load output off reason", 0.0, U8, Unit::None, "Load/OffReason"),
    reg(0xED90, "Load AES timer", 1.0, U16, Minutes, "Load/AesTimer"),
    // Relay settings registers
    reg(0xEDD9, "Relay operation mode", 0.0, U8, Unit::None, "Relay/Mode"),
    reg(0x0350, "Relay battery low voltage set", 0.01, U16, Volts, "Relay/BatteryLowSet"),
    reg(0x0351, "Relay battery low voltage clear", 0.01, U16, Volts, "Relay/BatteryLowClear"),
    reg(0x0352, "Relay battery high voltage set", 0.01, U16, Volts, "Relay/BatteryHighSet"),
    reg(0x0353, "Relay battery high voltage clear", 0.01, U16, Volts, "Relay/BatteryHighClear"),
    reg(0xEDBA, "Relay panel high voltage set", 0.01, U16, Volts, "Relay/PanelHighSet"),
    reg(0xEDB9, "Relay panel high voltage clear", 0.01, U16, Volts, "Relay/PanelHighClear"),
    reg(0x100A, "Relay minimum enabled time", 1.0, U16, Minutes, "Relay/MinEnabledTime"),
    // Lighting controller timer
    reg(0xEDA0, "Timer event 0", 0.0, U32, Unit::None, "Lighting/TimerEvent0"),
    reg(0xEDA1, "Timer event 1", 0.0, U32, Unit::None, "Lighting/TimerEvent1"),
    reg(0xEDA2, "Timer event 2", 0.0, U32, Unit::None, "Lighting/TimerEvent2"),
    reg(0xEDA3, "Timer event 3", 0.0, U32, Unit::None, "Lighting/TimerEvent3"),
    reg(0xEDA4, "Timer event 4", 0.0, U32, Unit::None, "Lighting/TimerEvent4"),
    reg(0xEDA5, "Timer event 5", 0.0, U32, Unit::None, "Lighting/TimerEvent5"),
    reg(0xEDA7, "Mid-point shift", 1.0, S16, Minutes, "Lighting/MidPointShift"),
    reg(0xED9B, "Gradual dim speed", 1.0, U8, Seconds, "Lighting/GradualDimSpeed"),
    reg(0xED9A, "Panel voltage night", 0.01, U16, Volts, "Lighting/PanelVoltageNight"),
    reg(0xED99, "Panel voltage day", 0.01, U16, Volts, "Lighting/PanelVoltageDay"),
    reg(0xED96, "Sunset delay", 1.0, U16, Minutes, "Lighting/SunsetDelay"),
    reg(0xED97, "Sunrise delay", 1.0, U16, Minutes, "Lighting/SunriseDelay"),
    reg(0xED90, "AES Timer", 1.0, U16, Minutes, "Load/AesTimer"),
    reg_note(0x2030, "Solar activity", 0.0, U8, Unit::None, "0=dark, 1=light", "Lighting/SolarActivity"),
    reg_note(0x2031, "Time-of-day", 1.0, U16, Minutes, "0=mid-night", "Lighting/TimeOfDay"),
    // VE.Direct port functions
    reg(0xED9E, "TX Port operation mode", 0.0, U8, Unit::None, "Port/TxMode"),
    reg(0xED98, "RX Port operation mode", 0.0, U8, Unit::None, "Port/RxMode"),
    // Restore factory defaults
    reg(0x0004, "Restore default", 0.0, RegKind::None, Unit::None, "Device/RestoreDefault"),
    // History data
    reg(0x1030, "Clear history", 0.0, RegKind::None, Unit::None, "History/Clear"),
    reg_note(0x1050, "Daily history", 0.0, Raw, Unit::None, "0x1050=today, 0x1051=yesterday, ..", "History/Daily"),
    reg_note(0x10A0, "Daily MPPT history", 0.0, Raw, Unit::None, "0x10A0=today, 0x10A1=yesterday, ..", "History/TrackerDaily"),
    // Pluggable display settings
    reg_note(0x0400, "Display backlight mode", 0.0, U8, Unit::None, "0 = keypress, 1 = on, 2 = auto", "Display/BacklightMode"),
    reg_note(0x0401, "Display backlight intensity", 0.0, U8, Unit::None, "0 = always off, 1 = on", "Display/BacklightIntensity"),
    reg_note(0x0402, "Display scroll text speed", 0.0, U8, Unit::None, "1 = slow, 5 = fast", "Display/ScrollSpeed"),
    reg_note(0x0403, "Display setup lock", 0.0, U8, Unit::None, "0 = unlocked, 1 = locked", "Display/SetupLock"),
    reg_note(0x0404, "Display temperature unit", 0.0, U8, Unit::None, "0 = Celsius, 1 = Fahrenheit", "Display/TemperatureUnit"),
    // Internal display settings
    reg_note(0x0401, "Display backlight intensity", 0.0, U8, Unit::None, "0 = always off, 1 = on", "Display/BacklightIntensity"),
    reg_note(0x0402, "Display scroll text speed", 0.0, U8, Unit::None, "1 = slow, 5 = fast", "Display/ScrollSpeed"),
    reg_note(0x0404, "Display temperature unit", 0.0, U8, Unit::None, "0 = Celsius, 1 = Fahrenheit", "Display/TemperatureUnit"),
    reg(0x0406, "Display contrast", 0.0, U8, Unit::None, "Display/Contrast"),
    reg_note(0x0408, "Display backlight mode", 0.0, U8, Unit::None, "0 = off, 1 = on, 2 = auto", "Display/BacklightMode"),
    // Remote control registers
    reg(0x2000, "Charge algorithm version", 0.0, U8, Unit::None, "Remote/ChargeAlgorithmVersion"),
    reg(0x2001, "Charge voltage set-point", 0.01, U16, Volts, "Remote/ChargeVoltageSetpoint"),
    reg(0x2002, "Battery voltage sense", 0.01, U16, Volts, "Remote/BatteryVoltageSense"),
    reg(0x2003, "Battery temperature sense", 0.01, S16, Celsius, "Remote/BatteryTemperatureSense"),
    reg(0x2004, "Remote command", 0.0, U8, Unit::None, "Remote/Command"),
    reg(0x2007, "Charge state elapsed time", 1.0, U32, Millis, "Remote/ChargeStateElapsed"),
    reg(0x2008, "Absorption time", 0.01, U16, Hours, "Remote/AbsorptionTime"),
    reg(0x2009, "Error code", 0.0, U8, Unit::None, "Remote/ErrorCode"),
    reg(0x200A, "Battery charge current", 0.001, S32, Amps, "Remote/BatteryChargeCurrent"),
    reg(0x200B, "Battery idle voltage", 0.01, U16, Volts, "Remote/BatteryIdleVoltage"),
    reg(0x200C, "Device state", 0.0, U8, Unit::None, "Remote/DeviceState"),
    reg(0x200D, "Network info", 0.0, U8, Unit::None, "Remote/NetworkInfo"),
    reg(0x200E, "Network mode", 0.0, U8, Unit::None, "Remote/NetworkMode"),
    reg(0x200F, "Network status register", 0.0, U8, Unit::None, "Remote/NetworkStatus"),
    reg(0x2013, "Total charge current", 0.001, S32, Amps, "Remote/TotalChargeCurrent"),
    reg(0x2014, "Charge current percentage", 1.0, U8, Percent, "Remote/ChargeCurrentPercentage"),
    reg(0x2015, "Charge current limit", 0.1, U16, Amps, "Remote/ChargeCurrentLimit"),
    reg(0x2018, "Manual equalisation pending", 0.0, U8, Unit::None, "Remote/ManualEqualisationPending"),
    reg(0x2027, "Total DC input power", 0.01, U32, Watts, "Remote/TotalDcInputPower"),
];

/// First aliased daily history identifier (today).
pub const HISTORY_DAILY_BASE: u16 = 0x1050;
/// Last aliased daily history identifier.
pub const HISTORY_DAILY_END: u16 = 0x106E;
/// First aliased per-tracker daily history identifier (today).
pub const HISTORY_TRACKER_BASE: u16 = 0x10A0;
/// Last aliased per-tracker daily history identifier.
pub const HISTORY_TRACKER_END: u16 = 0x10BE;

/// Collapse the two history blocks onto their canonical table entry.
pub fn canonical_id(id: u16) -> u16 {
    if id > HISTORY_DAILY_BASE && id <= HISTORY_DAILY_END {
        HISTORY_DAILY_BASE
    } else if id > HISTORY_TRACKER_BASE && id <= HISTORY_TRACKER_END {
        HISTORY_TRACKER_BASE
    } else {
        id
    }
}

/// Look up a register definition by identifier.
///
/// History-block identifiers are collapsed onto their canonical entry first;
/// then the table is scanned in declaration order and the first match wins.
pub fn lookup_register(id: u16) -> Option<&'static RegisterDefinition> {
    let id = canonical_id(id);
    REGISTER_DEFS.iter().find(|def| def.id == id)
}

/// Identifiers that appear more than once in the catalog, in first-seen
/// order. Non-empty by construction; callers log this once at startup.
pub fn duplicate_ids() -> Vec<u16> {
    let mut seen = Vec::new();
    let mut dups = Vec::new();
    for def in REGISTER_DEFS {
        if seen.contains(&def.id) {
            if !dups.contains(&def.id) {
                dups.push(def.id);
            }
        } else {
            seen.push(def.id);
        }
    }
    dups
}

impl RegisterDefinition {
    /// Decode a register payload into its display string.
    ///
    /// Integer types are read little-endian, scaled by [`scale`] when it is
    /// non-zero, and printed with the decimal places the scale implies.
    /// Strings are copied through (trailing NULs stripped). Raw registers
    /// decode the daily history record layout.
    ///
    /// [`scale`]: RegisterDefinition::scale
    pub fn decode_value(&self, payload: &[u8]) -> Result<std::string::String, ProtocolError> {
        let raw = match self.kind {
            RegKind::U8 => f64::from(*payload.first().ok_or(too_short(1, payload))?),
            RegKind::S8 => f64::from(*payload.first().ok_or(too_short(1, payload))? as i8),
            RegKind::U16 => f64::from(u16::from_le_bytes(fixed::<2>(payload)?)),
            RegKind::S16 => f64::from(i16::from_le_bytes(fixed::<2>(payload)?)),
            RegKind::U32 => f64::from(u32::from_le_bytes(fixed::<4>(payload)?)),
            RegKind::S32 => f64::from(i32::from_le_bytes(fixed::<4>(payload)?)),
            RegKind::String => {
                let text = std::str::from_utf8(payload).map_err(|_| ProtocolError::InvalidUtf8)?;
                return Ok(text.trim_end_matches('\0').to_string());
            }
            RegKind::Raw => return Ok(HistoryDayRecord::decode(payload)?.to_string()),
            RegKind::None => return Ok(hex::encode_upper(payload)),
        };
        Ok(self.format_scaled(raw))
    }

    /// Apply the scale and render with scale-implied precision, so equal
    /// values always compare equal as strings (change detection relies on
    /// this).
    fn format_scaled(&self, raw: f64) -> std::string::String {
        if self.scale == 0.0 {
            return format!("{}", raw as i64);
        }
        let value = raw * self.scale;
        let places = if self.scale >= 1.0 {
            0
        } else {
            (-self.scale.log10()).round() as usize
        };
        format!("{:.*}", places, value)
    }
}

fn too_short(expected: usize, payload: &[u8]) -> ProtocolError {
    ProtocolError::FrameTooShort {
        expected,
        actual: payload.len(),
    }
}

fn fixed<const N: usize>(payload: &[u8]) -> Result<[u8; N], ProtocolError> {
    payload
        .get(..N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| too_short(N, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_register() {
        let def = lookup_register(0xEDD5).expect("charger voltage should resolve");
        assert_eq!(def.name, "Charger voltage");
        assert_eq!(def.kind, RegKind::U16);
        assert_eq!(def.unit, Unit::Volts);
        assert_eq!(def.output_path, "Charger/Voltage");
    }

    #[test]
    fn test_lookup_unknown_register() {
        assert!(lookup_register(0xBEEF).is_none());
    }

    #[test]
    fn test_daily_history_aliasing() {
        let today = lookup_register(0x1050).expect("today should resolve");
        let yesterday = lookup_register(0x1051).expect("yesterday should alias");
        let oldest = lookup_register(0x106E).expect("oldest should alias");
        assert_eq!(today.id, 0x1050);
        assert_eq!(yesterday.id, 0x1050);
        assert_eq!(oldest.id, 0x1050);
        // One past the block is not aliased and not in the table.
        assert!(lookup_register(0x106F).is_none());
    }

    #[test]
    fn test_tracker_history_aliasing() {
        let today = lookup_register(0x10A0).expect("tracker today should resolve");
        let oldest = lookup_register(0x10BE).expect("tracker oldest should alias");
        assert_eq!(today.id, 0x10A0);
        assert_eq!(oldest.id, 0x10A0);
        assert!(lookup_register(0x10BF).is_none());
    }

    #[test]
    fn test_duplicate_ids_resolve_first_match() {
        // 0xEDEC appears in both the settings and the charger data sections;
        // declaration order picks the settings entry with its value note.
        let def = lookup_register(0xEDEC).expect("battery temperature should resolve");
        assert_eq!(def.description, "0xFFFF=N/A");

        let dups = duplicate_ids();
        for id in [0xEDEC, 0xED90, 0x0401, 0x0402, 0x0404] {
            assert!(dups.contains(&id), "0x{:04X} should be reported", id);
        }
    }

    #[test]
    fn test_decode_u16_scaled() {
        let def = lookup_register(0xEDD5).unwrap();
        // 1250 raw at scale 0.01 -> 12.50
        assert_eq!(def.decode_value(&[0xE2, 0x04]).unwrap(), "12.50");
    }

    #[test]
    fn test_decode_s16_negative() {
        let def = lookup_register(0xEDE0).unwrap();
        // -500 raw at scale 0.01 -> -5.00
        let raw = (-500i16).to_le_bytes();
        assert_eq!(def.decode_value(&raw).unwrap(), "-5.00");
    }

    #[test]
    fn test_decode_s32_milli_scale() {
        let def = lookup_register(0x200A).unwrap();
        let raw = (-12345i32).to_le_bytes();
        assert_eq!(def.decode_value(&raw).unwrap(), "-12.345");
    }

    #[test]
    fn test_decode_unscaled_passthrough() {
        let def = lookup_register(0x0201).unwrap();
        assert_eq!(def.decode_value(&[0x05]).unwrap(), "5");
    }

    #[test]
    fn test_decode_string_strips_nul_padding() {
        let def = lookup_register(0x010A).unwrap();
        assert_eq!(def.decode_value(b"HQ2129ABCDE\0\0").unwrap(), "HQ2129ABCDE");
    }

    #[test]
    fn test_decode_short_payload_rejected() {
        let def = lookup_register(0xEDD5).unwrap();
        match def.decode_value(&[0xE2]) {
            Err(ProtocolError::FrameTooShort { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected FrameTooShort, got {:?}", other),
        }
    }
}
