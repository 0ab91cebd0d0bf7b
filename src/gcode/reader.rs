//! G-code stream reader
//!
//! Reads a command stream back into [`GcodeCommand`]s, the way a preview
//! renderer consumes it. Only the dialect this crate writes is understood
//! in detail; other words are kept as [`GcodeCommand::Unknown`].

use super::commands::{word, GcodeCommand};
use crate::error::{Error, Result};
use serde::Serialize;

/// One straight X segment of the tool path
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: f64,
    pub to: f64,
    pub feed: u32,
    /// True for G0 travel, false for G1 feed moves
    pub rapid: bool,
}

impl Segment {
    pub fn length(&self) -> f64 {
        (self.to - self.from).abs()
    }
}

/// G-code text reader
pub struct GcodeReader<'a> {
    text: &'a str,
}

impl<'a> GcodeReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Parse every command line; comments and blank lines are skipped
    pub fn parse_commands(&self) -> Result<Vec<GcodeCommand>> {
        let mut commands = Vec::new();
        for (i, line) in self.text.lines().enumerate() {
            if let Some(cmd) = parse_line(i + 1, line)? {
                commands.push(cmd);
            }
        }
        Ok(commands)
    }

    /// Build the X tool path from the G0/G1 moves, starting at the origin
    pub fn toolpath(&self) -> Result<Vec<Segment>> {
        let mut x = 0.0;
        let mut segments = Vec::new();
        for cmd in self.parse_commands()? {
            if let Some((to, feed)) = cmd.move_target() {
                segments.push(Segment {
                    from: x,
                    to,
                    feed,
                    rapid: matches!(cmd, GcodeCommand::RapidMove { .. }),
                });
                x = to;
            }
        }
        Ok(segments)
    }
}

/// Parse a single line
fn parse_line(line_no: usize, line: &str) -> Result<Option<GcodeCommand>> {
    let code = match line.find(';') {
        Some(i) => &line[..i],
        None => line,
    };
    let mut tokens = code.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    let command_word = normalize_word(first);
    let args: Vec<&str> = tokens.collect();

    let param = |letter: char| -> Result<Option<f64>> {
        for arg in &args {
            let mut chars = arg.chars();
            if chars.next().map(|c| c.to_ascii_uppercase()) == Some(letter) {
                let value = chars.as_str();
                return value.parse::<f64>().map(Some).map_err(|_| Error::GcodeParse {
                    line: line_no,
                    message: format!("invalid number '{}' for {}", value, letter),
                });
            }
        }
        Ok(None)
    };

    let cmd = match command_word.as_str() {
        word::UNITS_MM => GcodeCommand::UnitsMm,
        word::ABSOLUTE => GcodeCommand::AbsolutePositioning,
        word::RELATIVE_EXTRUSION => GcodeCommand::RelativeExtrusion,
        word::HOME => GcodeCommand::Home,
        word::DISABLE_MOTORS => GcodeCommand::DisableMotors,
        word::HOTEND_TEMP => GcodeCommand::HotendTemp {
            s: param('S')?.unwrap_or(0.0),
        },
        word::BED_TEMP => GcodeCommand::BedTemp {
            s: param('S')?.unwrap_or(0.0),
        },
        word::ACCELERATION => match param('S')? {
            Some(s) => GcodeCommand::SetAcceleration { s },
            None => unknown(&command_word, &args),
        },
        word::JERK => match param('X')? {
            Some(x) => GcodeCommand::SetJerk { x },
            None => unknown(&command_word, &args),
        },
        word::DWELL => {
            let millis = match (param('P')?, param('S')?) {
                (Some(p), _) => p,
                (None, Some(s)) => s * 1000.0,
                (None, None) => 0.0,
            };
            GcodeCommand::Dwell {
                millis: millis.max(0.0) as u64,
            }
        }
        word::RAPID_MOVE | word::LINEAR_MOVE => match param('X')? {
            Some(x) => {
                let feed = param('F')?.unwrap_or(0.0).max(0.0) as u32;
                if command_word == word::RAPID_MOVE {
                    GcodeCommand::RapidMove { x, feed }
                } else {
                    GcodeCommand::LinearMove { x, feed }
                }
            }
            None => unknown(&command_word, &args),
        },
        _ => unknown(&command_word, &args),
    };

    Ok(Some(cmd))
}

fn unknown(command_word: &str, args: &[&str]) -> GcodeCommand {
    GcodeCommand::Unknown {
        word: command_word.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
    }
}

/// Uppercase and strip leading zeros from the number (`g01` -> `G1`)
fn normalize_word(token: &str) -> String {
    let upper = token.to_ascii_uppercase();
    let mut chars = upper.chars();
    match chars.next() {
        Some(letter @ ('G' | 'M')) => {
            let number = chars.as_str();
            let trimmed = number.trim_start_matches('0');
            if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                upper
            } else if trimmed.is_empty() {
                format!("{}0", letter)
            } else {
                format!("{}{}", letter, trimmed)
            }
        }
        _ => upper,
    }
}
