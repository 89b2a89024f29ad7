//! Parameter catalog for the text protocol.
//!
//! Text-mode telemetry arrives as `TAG<TAB>VALUE` lines. This table maps
//! each known tag to its value kind, scale, unit and output path. Values are
//! forwarded as raw strings; [`ParameterDefinition::scaled_value`] is the
//! helper consumers use to turn them into typed values.

use crate::constants::TERMINATOR_TAG;

/// How a raw text value is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Decimal number, scaled.
    Float,
    /// Integer, unscaled.
    Int,
    /// Boolean flag (`1`/`ON` is true).
    Bool,
    /// Opaque text.
    String,
}

/// A typed view of a raw text value, produced by
/// [`ParameterDefinition::scaled_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Scaled numeric value.
    Float(f64),
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Text value, copied through.
    Text(String),
}

/// One entry of the text-parameter catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDefinition {
    /// Protocol tag, matched exactly.
    pub tag: &'static str,
    /// Interpretation of the raw value.
    pub kind: ValueKind,
    /// Multiplier applied by [`scaled_value`] for float values.
    ///
    /// [`scaled_value`]: ParameterDefinition::scaled_value
    pub scale: f64,
    /// Display unit, empty if none.
    pub unit: &'static str,
    /// Key under which decoded samples are published.
    pub output_path: &'static str,
}

const fn param(
    tag: &'static str,
    kind: ValueKind,
    scale: f64,
    unit: &'static str,
    output_path: &'static str,
) -> ParameterDefinition {
    ParameterDefinition {
        tag,
        kind,
        scale,
        unit,
        output_path,
    }
}

use ValueKind::{Bool, Float, Int, String as Text};

/// The text-parameter catalog.
pub static PARAMETER_DEFS: &[ParameterDefinition] = &[
    // Electrical basic data
    param("V", Float, 0.001, "V", "Dc/0/Voltage"),
    param("I", Float, 0.001, "A", "Dc/0/Current"),
    param("P", Float, 1.0, "W", "Dc/0/Power"),
    param("VPV", Float, 0.001, "V", "Pv/0/Voltage"),
    param("PPV", Float, 1.0, "W", "Pv/0/Power"),
    param("IL", Float, 0.001, "A", "Load/0/Current"),
    param("LOAD", Bool, 1.0, "", "Load/0/State"),
    // Battery info
    param("SOC", Float, 0.1, "%", "Battery/Soc"),
    param("TTG", Float, 60.0, "s", "Battery/TimeToGo"),
    param("AR", Bool, 1.0, "", "Battery/AlarmActive"),
    param("CE", Float, 1.0, "Ah", "Battery/ConsumedAh"),
    param("H19", Float, 0.001, "kWh", "History/ChargedEnergy"),
    param("H20", Float, 0.001, "kWh", "History/DischargedEnergy"),
    param("H21", Float, 0.001, "kWh", "History/Solar/YieldToday"),
    param("H22", Float, 0.001, "kWh", "History/Solar/YieldYesterday"),
    // Temperature
    param("T", Float, 0.1, "°C", "Battery/Temperature"),
    // Relay & status
    param("Relay", Bool, 1.0, "", "Relay/0/State"),
    param("Alarm", Bool, 1.0, "", "Alarms/0/Active"),
    param("ERR", Int, 1.0, "", "Error/Code"),
    param("CS", Int, 1.0, "", "Charger/State"),
    param("MPPT", Int, 1.0, "", "Charger/MpptMode"),
    param("FW", Text, 1.0, "", "Device/Firmware"),
    param("PID", Text, 1.0, "", "Device/ProductId"),
    // History
    param("H1", Float, 0.1, "A", "History/MaxCurrent"),
    param("H3", Float, 0.1, "A", "History/MaxDischargeCurrent"),
    param("H4", Float, 0.1, "A", "History/MaxChargeCurrent"),
    // Additional info
    param("SER#", Text, 1.0, "", "Device/Serial"),
    param("MODE", Int, 1.0, "", "Charger/Mode"),
    param("BS", Int, 1.0, "", "Battery/Starter/Detected"),
    // Observed on newer firmware, mapping not fully pinned down yet
    param("OR", Text, 1.0, "", "Device/OffReason"),
    param("H23", Float, 0.001, "kWh", "History/Solar/YieldMax"),
    param("HSDS", Int, 1.0, "", "History/Solar/DaySequence"),
];

/// Look up a text-parameter definition by exact tag match.
///
/// The reserved terminator tag never resolves; it marks a block boundary and
/// is swallowed before lookup.
pub fn lookup_parameter(tag: &str) -> Option<&'static ParameterDefinition> {
    if tag == TERMINATOR_TAG {
        return None;
    }
    PARAMETER_DEFS.iter().find(|def| def.tag == tag)
}

impl ParameterDefinition {
    /// Interpret a raw text value according to the declared kind.
    ///
    /// Returns `None` when the raw value does not parse as the declared
    /// kind. Floats are scaled; integers, booleans and text pass through.
    pub fn scaled_value(&self, raw: &str) -> Option<ParamValue> {
        let raw = raw.trim();
        match self.kind {
            ValueKind::Float => raw
                .parse::<f64>()
                .ok()
                .map(|v| ParamValue::Float(v * self.scale)),
            ValueKind::Int => raw.parse::<i64>().ok().map(ParamValue::Int),
            ValueKind::Bool => Some(ParamValue::Bool(raw == "1" || raw == "ON")),
            ValueKind::String => Some(ParamValue::Text(raw.to_string())),
        }
    }
}
