//! Tick to seconds conversion

use super::header::{Timing, DEFAULT_TEMPO};

/// Convert a tick count to seconds at a fixed tempo
///
/// `tempo` is in microseconds per quarter note and is ignored for SMPTE
/// timing.
pub fn ticks_to_seconds(ticks: u64, timing: Timing, tempo: u32) -> f64 {
    match timing {
        Timing::Metrical(tpq) => (ticks as f64 * tempo as f64) / (tpq as f64 * 1_000_000.0),
        Timing::Timecode {
            fps,
            ticks_per_frame,
        } => ticks as f64 / (fps * ticks_per_frame as f64),
    }
}

/// Tempo changes seen so far in one track
///
/// Ticks only move forward while a track is decoded, so segments are
/// appended in order.
#[derive(Debug, Clone)]
pub struct TempoMap {
    timing: Timing,
    /// (start tick, microseconds per quarter note)
    segments: Vec<(u64, u32)>,
    /// Set Tempo events applied, including ones that share a tick
    changes: usize,
}

impl TempoMap {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            segments: vec![(0, DEFAULT_TEMPO)],
            changes: 0,
        }
    }

    /// Tempo currently in effect
    pub fn current(&self) -> u32 {
        self.segments.last().map(|&(_, t)| t).unwrap_or(DEFAULT_TEMPO)
    }

    /// Number of tempo changes applied
    pub fn change_count(&self) -> usize {
        self.changes
    }

    /// Apply a tempo change at `tick`
    pub fn set(&mut self, tick: u64, tempo: u32) {
        self.changes += 1;
        match self.segments.last_mut() {
            Some(last) if last.0 == tick => last.1 = tempo,
            _ => self.segments.push((tick, tempo)),
        }
    }

    /// Convert with the tempo currently in effect, regardless of the tempo
    /// that was active while those ticks elapsed
    pub fn seconds_at_current(&self, ticks: u64) -> f64 {
        ticks_to_seconds(ticks, self.timing, self.current())
    }

    /// Absolute time of `tick`, integrating every tempo segment before it
    pub fn seconds_at(&self, tick: u64) -> f64 {
        let mut seconds = 0.0;
        for (i, &(start, tempo)) in self.segments.iter().enumerate() {
            if start >= tick {
                break;
            }
            let end = self
                .segments
                .get(i + 1)
                .map(|&(next, _)| next.min(tick))
                .unwrap_or(tick);
            seconds += ticks_to_seconds(end - start, self.timing, tempo);
        }
        seconds
    }
}
