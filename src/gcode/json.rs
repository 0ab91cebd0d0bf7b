//! JSON serialization types for G-code streams

use super::commands::GcodeCommand;
use super::reader::GcodeReader;
use crate::error::Result;
use serde::Serialize;

/// Top-level JSON structure for a command stream
#[derive(Debug, Clone, Serialize)]
pub struct GcodeJson {
    pub summary: GcodeSummary,
    pub commands: Vec<GcodeCommand>,
}

/// Totals over a command stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GcodeSummary {
    /// Command lines
    pub commands: usize,
    /// G1 moves
    pub moves: usize,
    /// G0 moves
    pub rapid_moves: usize,
    /// G4 pauses
    pub dwells: usize,
    /// Sum of all pauses
    pub total_dwell_ms: u64,
    /// Total X travel of G1 moves (mm)
    pub travel: f64,
    /// Largest X position reached (mm)
    pub max_x: f64,
    /// Largest G1 feed rate (mm/min)
    pub max_feed: u32,
}

impl GcodeJson {
    /// Parse a stream and summarize it
    pub fn from_text(text: &str) -> Result<Self> {
        let reader = GcodeReader::new(text);
        let commands = reader.parse_commands()?;
        let mut summary = GcodeSummary {
            commands: commands.len(),
            ..GcodeSummary::default()
        };

        for cmd in &commands {
            match cmd {
                GcodeCommand::LinearMove { x, feed } => {
                    summary.moves += 1;
                    summary.max_x = summary.max_x.max(*x);
                    summary.max_feed = summary.max_feed.max(*feed);
                }
                GcodeCommand::RapidMove { x, .. } => {
                    summary.rapid_moves += 1;
                    summary.max_x = summary.max_x.max(*x);
                }
                GcodeCommand::Dwell { millis } => {
                    summary.dwells += 1;
                    summary.total_dwell_ms += millis;
                }
                _ => {}
            }
        }

        summary.travel = reader
            .toolpath()?
            .iter()
            .filter(|s| !s.rapid)
            .map(|s| s.length())
            .sum();

        Ok(Self { summary, commands })
    }
}
