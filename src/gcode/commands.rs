//! G-code command definitions

use serde::Serialize;
use std::fmt;

/// Command words
pub mod word {
    pub const RAPID_MOVE: &str = "G0";
    pub const LINEAR_MOVE: &str = "G1";
    pub const DWELL: &str = "G4";
    pub const UNITS_MM: &str = "G21";
    pub const HOME: &str = "G28";
    pub const ABSOLUTE: &str = "G90";
    pub const RELATIVE_EXTRUSION: &str = "M83";
    pub const DISABLE_MOTORS: &str = "M84";
    pub const HOTEND_TEMP: &str = "M104";
    pub const BED_TEMP: &str = "M140";
    pub const ACCELERATION: &str = "M204";
    pub const JERK: &str = "M205";
}

/// One command line of the output stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum GcodeCommand {
    /// G21: millimetre units
    UnitsMm,
    /// G90: absolute positioning
    AbsolutePositioning,
    /// M83: relative extrusion
    RelativeExtrusion,
    /// M104: hotend temperature
    HotendTemp { s: f64 },
    /// M140: bed temperature
    BedTemp { s: f64 },
    /// M204: acceleration limit (mm/s²)
    SetAcceleration { s: f64 },
    /// M205: jerk limit (mm/s)
    SetJerk { x: f64 },
    /// G28: home all axes
    Home,
    /// G4: pause in milliseconds
    Dwell { millis: u64 },
    /// G0: travel move
    RapidMove { x: f64, feed: u32 },
    /// G1: feed move
    LinearMove { x: f64, feed: u32 },
    /// M84: disable motors
    DisableMotors,
    /// Anything else read back from a stream
    Unknown { word: String, args: Vec<String> },
}

impl GcodeCommand {
    /// Target X and feed if this is a move
    pub fn move_target(&self) -> Option<(f64, u32)> {
        match self {
            GcodeCommand::RapidMove { x, feed } | GcodeCommand::LinearMove { x, feed } => {
                Some((*x, *feed))
            }
            _ => None,
        }
    }

    /// Pause length if this is a dwell
    pub fn dwell_millis(&self) -> Option<u64> {
        match self {
            GcodeCommand::Dwell { millis } => Some(*millis),
            _ => None,
        }
    }
}

/// Format a coordinate with three decimals, trailing zeros removed
pub fn format_coord(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

impl fmt::Display for GcodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcodeCommand::UnitsMm => f.write_str(word::UNITS_MM),
            GcodeCommand::AbsolutePositioning => f.write_str(word::ABSOLUTE),
            GcodeCommand::RelativeExtrusion => f.write_str(word::RELATIVE_EXTRUSION),
            GcodeCommand::HotendTemp { s } => write!(f, "{} S{}", word::HOTEND_TEMP, format_coord(*s)),
            GcodeCommand::BedTemp { s } => write!(f, "{} S{}", word::BED_TEMP, format_coord(*s)),
            GcodeCommand::SetAcceleration { s } => {
                write!(f, "{} S{}", word::ACCELERATION, format_coord(*s))
            }
            GcodeCommand::SetJerk { x } => write!(f, "{} X{}", word::JERK, format_coord(*x)),
            GcodeCommand::Home => f.write_str(word::HOME),
            GcodeCommand::Dwell { millis } => write!(f, "{} P{}", word::DWELL, millis),
            GcodeCommand::RapidMove { x, feed } => {
                write!(f, "{} X{} F{}", word::RAPID_MOVE, format_coord(*x), feed)
            }
            GcodeCommand::LinearMove { x, feed } => {
                write!(f, "{} X{} F{}", word::LINEAR_MOVE, format_coord(*x), feed)
            }
            GcodeCommand::DisableMotors => f.write_str(word::DISABLE_MOTORS),
            GcodeCommand::Unknown { word, args } => {
                f.write_str(word)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
        }
    }
}
