//! Timed note records

use serde::Serialize;

/// A note with its time span in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Note {
    /// MIDI pitch (0-127, 69 = A4)
    pub pitch: u8,
    /// Note-on velocity; 0 for notes closed by the end of their track
    pub velocity: u8,
    /// Start time in seconds
    pub onset: f64,
    /// Length in seconds
    pub duration: f64,
}

impl Note {
    pub fn new(pitch: u8, velocity: u8, onset: f64, duration: f64) -> Self {
        Self {
            pitch,
            velocity,
            onset: onset.max(0.0),
            duration: duration.max(0.0),
        }
    }

    /// Time at which the note stops sounding
    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }
}
