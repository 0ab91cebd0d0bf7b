//! JSON serialization types for decoded MIDI data

use super::header::MidiHeader;
use super::MidiFile;
use crate::timeline::{Note, Timeline};
use serde::Serialize;

/// Top-level JSON structure for a decoded MIDI file
#[derive(Debug, Clone, Serialize)]
pub struct MidiJson {
    /// Header fields
    pub header: MidiHeader,
    /// Per-track summaries in file order
    pub tracks: Vec<TrackJson>,
    /// Recovered decoding problems
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Length of the performance in seconds
    pub duration: f64,
    /// Merged timeline
    pub notes: Vec<Note>,
}

/// JSON summary of one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackJson {
    pub notes: usize,
    pub end_tick: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub tempo_changes: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl MidiJson {
    /// Create a MidiJson from a decoded file
    pub fn new(file: &MidiFile) -> Self {
        let timeline: Timeline = file.timeline();
        Self {
            header: file.header.clone(),
            tracks: file
                .tracks
                .iter()
                .map(|t| TrackJson {
                    notes: t.notes.len(),
                    end_tick: t.end_tick,
                    tempo_changes: t.tempo_changes,
                })
                .collect(),
            warnings: file.warnings.iter().map(|w| w.to_string()).collect(),
            duration: timeline.duration(),
            notes: timeline.notes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::DecodeOptions;

    #[test]
    fn test_json_shape() {
        let mut data = b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\x01\xE0MTrk\x00\x00\x00\x0D".to_vec();
        data.extend_from_slice(&[
            0x00, 0x90, 0x45, 0x64, //
            0x83, 0x60, 0x80, 0x45, 0x40, //
            0x00, 0xFF, 0x2F, 0x00,
        ]);
        let file = MidiFile::parse(&data, DecodeOptions::default()).unwrap();
        let value = serde_json::to_value(MidiJson::new(&file)).unwrap();

        assert_eq!(value["header"]["track_count"], 1);
        assert_eq!(value["header"]["timing"]["metrical"], 480);
        assert_eq!(value["tracks"][0]["notes"], 1);
        assert!(value["tracks"][0].get("tempo_changes").is_none());
        assert!(value.get("warnings").is_none());
        assert_eq!(value["notes"][0]["pitch"], 69);
        assert_eq!(value["notes"][0]["duration"], 0.5);
    }
}
