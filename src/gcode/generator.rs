//! Timeline to G-code generation
//!
//! Each note becomes one feed move whose speed follows the note's pitch and
//! whose length is chosen so the move lasts as long as the note. Silences
//! become dwells. The axis runs forward until the next move would leave the
//! bed, then returns to the origin.

use super::commands::GcodeCommand;
use super::pitch::{feed_rate, frequency_to_speed, note_to_frequency};
use super::ramp::RampProfile;
use super::writer::GcodeWriter;
use crate::config::MotionConfig;
use crate::timeline::{Note, Timeline};
use tracing::{debug, warn};

/// Distances below this are treated as no travel
const TRAVEL_EPSILON: f64 = 1e-9;

/// Most full-bed legs a single note may sweep
pub const MAX_SWEEP_LEGS: usize = 64;

/// Axis position and clock carried through one generation pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    /// Current X position (mm)
    pub position: f64,
    /// Time covered by the commands emitted so far (s)
    pub elapsed: f64,
}

/// Counters for one generation pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationStats {
    pub notes: usize,
    pub dwells: usize,
    pub returns: usize,
    /// Notes that needed more travel than the bed allows
    pub split_moves: usize,
    /// Split moves whose sweep hit [`MAX_SWEEP_LEGS`]
    pub capped_moves: usize,
}

/// G-code generator
#[derive(Debug, Clone)]
pub struct MotionGenerator {
    config: MotionConfig,
}

impl MotionGenerator {
    /// The config must satisfy [`MotionConfig::validate`]
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Generate the full command stream for a timeline
    pub fn generate(&self, timeline: &Timeline) -> String {
        self.generate_with_stats(timeline).0
    }

    /// Generate the command stream and report what was emitted
    pub fn generate_with_stats(&self, timeline: &Timeline) -> (String, GenerationStats) {
        let mut writer = GcodeWriter::new();
        let mut state = MotionState::default();
        let mut stats = GenerationStats::default();

        self.write_setup(&mut writer);

        for note in timeline {
            self.write_note(&mut writer, &mut state, &mut stats, note);
        }

        writer.blank();
        self.write_return(&mut writer);
        writer.command_with_comment(&GcodeCommand::DisableMotors, "Disable motors");

        debug!(
            notes = stats.notes,
            dwells = stats.dwells,
            returns = stats.returns + 1,
            commands = writer.command_count(),
            "generated G-code"
        );

        (writer.finish(), stats)
    }

    fn write_setup(&self, writer: &mut GcodeWriter) {
        writer.command_with_comment(&GcodeCommand::UnitsMm, "Set units to millimeters");
        writer.command_with_comment(&GcodeCommand::AbsolutePositioning, "Use absolute coordinates");
        writer.command_with_comment(
            &GcodeCommand::RelativeExtrusion,
            "Use relative distances for extrusion",
        );
        writer.command_with_comment(&GcodeCommand::HotendTemp { s: 0.0 }, "Turn off hotend");
        writer.command_with_comment(&GcodeCommand::BedTemp { s: 0.0 }, "Turn off heated bed");
        if let Some(s) = self.config.acceleration {
            writer.command_with_comment(&GcodeCommand::SetAcceleration { s }, "Set acceleration");
        }
        if let Some(x) = self.config.jerk {
            writer.command_with_comment(&GcodeCommand::SetJerk { x }, "Set jerk limit");
        }
        writer.blank();
        writer.command_with_comment(&GcodeCommand::Home, "Home all axes");
        writer.blank();
    }

    fn write_return(&self, writer: &mut GcodeWriter) {
        writer.command_with_comment(
            &GcodeCommand::RapidMove {
                x: 0.0,
                feed: feed_rate(self.config.max_speed),
            },
            "Return to start",
        );
    }

    fn write_note(
        &self,
        writer: &mut GcodeWriter,
        state: &mut MotionState,
        stats: &mut GenerationStats,
        note: &Note,
    ) {
        stats.notes += 1;

        if note.onset > state.elapsed {
            let gap = note.onset - state.elapsed;
            let millis = (gap * 1000.0) as u64;
            if millis > 0 {
                writer.command_with_comment(
                    &GcodeCommand::Dwell { millis },
                    &format!("Pause for {:.3} seconds", gap),
                );
                stats.dwells += 1;
            }
            state.elapsed = note.onset;
        }

        let frequency = note_to_frequency(note.pitch);
        let speed = frequency_to_speed(frequency, self.config.speed_divisor, self.config.max_speed);
        let feed = feed_rate(speed);
        let distance = speed * note.duration;
        let bound = self.config.axis_bound;

        if state.position + distance > bound {
            self.write_return(writer);
            state.position = 0.0;
            stats.returns += 1;
        }

        if let Some(acceleration) = self.config.acceleration {
            let ramp = RampProfile::plan(speed, note.duration, acceleration, self.config.jerk);
            writer.comment(&ramp.describe());
        }

        let comment = format!("Play note {} at {:.2}Hz", note.pitch, frequency);

        if distance <= bound {
            state.position += distance;
            writer.command_with_comment(
                &GcodeCommand::LinearMove {
                    x: self.quantize(state.position),
                    feed,
                },
                &comment,
            );
        } else {
            // Longer than the bed: sweep back and forth at the same feed so
            // the move still lasts as long as the note
            stats.split_moves += 1;
            let max_travel = bound * MAX_SWEEP_LEGS as f64;
            let mut remaining = distance;
            if remaining > max_travel {
                warn!(
                    pitch = note.pitch,
                    duration = note.duration,
                    travel = distance,
                    max_travel,
                    "note too long for the bed, sweep cut short"
                );
                remaining = max_travel;
                stats.capped_moves += 1;
            }
            let mut forward = true;
            let mut first = true;
            while remaining > TRAVEL_EPSILON {
                let leg = if forward {
                    remaining.min(bound - state.position)
                } else {
                    remaining.min(state.position)
                };
                if forward {
                    state.position += leg;
                } else {
                    state.position -= leg;
                }
                remaining -= leg;
                let cmd = GcodeCommand::LinearMove {
                    x: self.quantize(state.position),
                    feed,
                };
                if first {
                    writer.command_with_comment(&cmd, &comment);
                    first = false;
                } else {
                    writer.command_with_comment(&cmd, &format!("Continue note {}", note.pitch));
                }
                forward = !forward;
            }
        }

        state.elapsed = note.end();
    }

    /// Round to the stepper grid, staying inside the bed
    fn quantize(&self, x: f64) -> f64 {
        let steps = self.config.steps_per_mm;
        ((x * steps).round() / steps).clamp(0.0, self.config.axis_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::reader::GcodeReader;

    fn timeline(notes: Vec<Note>) -> Timeline {
        Timeline::merge(vec![notes])
    }

    fn commands(text: &str) -> Vec<GcodeCommand> {
        GcodeReader::new(text).parse_commands().unwrap()
    }

    #[test]
    fn test_empty_timeline() {
        let text = MotionGenerator::new(MotionConfig::default()).generate(&Timeline::default());
        let cmds = commands(&text);
        assert_eq!(cmds[0], GcodeCommand::UnitsMm);
        assert!(cmds.contains(&GcodeCommand::Home));
        assert_eq!(
            &cmds[cmds.len() - 2..],
            &[
                GcodeCommand::RapidMove { x: 0.0, feed: 12000 },
                GcodeCommand::DisableMotors
            ]
        );
    }

    #[test]
    fn test_dwell_then_move() {
        let text = MotionGenerator::new(MotionConfig::default())
            .generate(&timeline(vec![Note::new(69, 100, 1.5, 0.5)]));
        let cmds = commands(&text);
        let home = cmds.iter().position(|c| *c == GcodeCommand::Home).unwrap();
        assert_eq!(cmds[home + 1], GcodeCommand::Dwell { millis: 1500 });
        // 440 Hz / 10 = 44 mm/s for 0.5 s
        assert_eq!(cmds[home + 2], GcodeCommand::LinearMove { x: 22.0, feed: 2640 });
        assert!(text.contains("Play note 69 at 440.00Hz"));
    }

    #[test]
    fn test_no_dwell_for_overlapping_notes() {
        let text = MotionGenerator::new(MotionConfig::default()).generate(&timeline(vec![
            Note::new(60, 100, 0.0, 1.0),
            Note::new(64, 100, 0.5, 1.0),
            Note::new(67, 100, 2.0, 0.25),
        ]));
        let dwells: Vec<u64> = commands(&text).iter().filter_map(|c| c.dwell_millis()).collect();
        // third note waits from the end of the second (1.5 s)
        assert_eq!(dwells, vec![500]);
    }

    #[test]
    fn test_speed_capped_at_max() {
        let config = MotionConfig {
            max_speed: 30.0,
            ..MotionConfig::default()
        };
        let text = MotionGenerator::new(config)
            .generate(&timeline(vec![Note::new(100, 100, 0.0, 0.1), Note::new(20, 100, 0.1, 0.1)]));
        for cmd in commands(&text) {
            if let GcodeCommand::LinearMove { feed, .. } = cmd {
                assert!(feed <= 1800);
            }
        }
    }

    #[test]
    fn test_return_before_exceeding_bound() {
        let config = MotionConfig {
            axis_bound: 50.0,
            ..MotionConfig::default()
        };
        // 44 mm per note
        let notes: Vec<Note> = (0..4).map(|i| Note::new(69, 100, i as f64, 1.0)).collect();
        let (text, stats) = MotionGenerator::new(config).generate_with_stats(&timeline(notes));
        assert_eq!(stats.returns, 3);
        let moves: Vec<(f64, u32)> = commands(&text).iter().filter_map(|c| c.move_target()).collect();
        assert_eq!(
            moves,
            vec![
                (44.0, 2640),
                (0.0, 12000),
                (44.0, 2640),
                (0.0, 12000),
                (44.0, 2640),
                (0.0, 12000),
                (44.0, 2640),
                (0.0, 12000),
            ]
        );
    }

    #[test]
    fn test_oversized_note_sweeps_within_bound() {
        let config = MotionConfig {
            axis_bound: 20.0,
            ..MotionConfig::default()
        };
        // 44 mm of travel on a 20 mm bed
        let (text, stats) = MotionGenerator::new(config)
            .generate_with_stats(&timeline(vec![Note::new(69, 100, 0.0, 1.0)]));
        assert_eq!(stats.split_moves, 1);
        let xs: Vec<f64> = commands(&text)
            .iter()
            .filter_map(|c| match c {
                GcodeCommand::LinearMove { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![20.0, 0.0, 4.0]);
    }

    #[test]
    fn test_sweep_is_capped_for_huge_notes() {
        let config = MotionConfig {
            axis_bound: 20.0,
            ..MotionConfig::default()
        };
        // about 134 million seconds, as from a maximum delta at 1 tpq
        let (text, stats) = MotionGenerator::new(config)
            .generate_with_stats(&timeline(vec![Note::new(69, 100, 0.0, 134_217_727.5)]));
        assert_eq!(stats.capped_moves, 1);
        let moves = commands(&text)
            .iter()
            .filter(|c| matches!(c, GcodeCommand::LinearMove { .. }))
            .count();
        assert!(moves <= MAX_SWEEP_LEGS + 1, "{} moves", moves);
        assert!(text.lines().count() < 200);
    }

    #[test]
    fn test_sub_millisecond_gap_has_no_dwell() {
        let (text, stats) = MotionGenerator::new(MotionConfig::default()).generate_with_stats(
            &timeline(vec![
                Note::new(69, 100, 0.0, 1.0),
                Note::new(69, 100, 1.0004, 0.5),
                Note::new(69, 100, 2.0, 0.25),
            ]),
        );
        let dwells: Vec<u64> = commands(&text).iter().filter_map(|c| c.dwell_millis()).collect();
        // second gap runs from 1.5004, the end of a note that started at its own onset
        assert_eq!(dwells, vec![499]);
        assert_eq!(stats.dwells, 1);
        assert!(!text.contains("Pause for 0.000"));
    }

    #[test]
    fn test_ramp_annotations() {
        let config = MotionConfig {
            acceleration: Some(1000.0),
            jerk: Some(8.0),
            ..MotionConfig::default()
        };
        let text = MotionGenerator::new(config).generate(&timeline(vec![Note::new(69, 100, 0.0, 1.0)]));
        let cmds = commands(&text);
        assert!(cmds.contains(&GcodeCommand::SetAcceleration { s: 1000.0 }));
        assert!(cmds.contains(&GcodeCommand::SetJerk { x: 8.0 }));
        assert!(text.contains("; ramp entry=8.00 peak=44.00"));
    }

    #[test]
    fn test_positions_quantized_to_steps() {
        let config = MotionConfig {
            steps_per_mm: 10.0,
            ..MotionConfig::default()
        };
        // 26.1626 mm/s for 1 s
        let text = MotionGenerator::new(config).generate(&timeline(vec![Note::new(60, 100, 0.0, 1.0)]));
        assert!(text.contains("G1 X26.2 F1569"));
    }
}
