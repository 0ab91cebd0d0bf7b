//! Per-track event decoding and note reconstruction

use super::events::{read_event, RawEvent};
use super::header::Timing;
use super::reader::MidiReader;
use super::tempo::TempoMap;
use crate::error::Error;
use crate::timeline::Note;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// How tick positions become seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TempoMode {
    /// Convert with the tempo active when the note is resolved
    #[default]
    ActiveAtConversion,
    /// Integrate over every tempo segment of the track
    Integrated,
}

/// What a note on does to a pitch that is already sounding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetriggerPolicy {
    /// Replace the open onset and velocity; the earlier note on is dropped
    #[default]
    Overwrite,
    /// Close the sounding note at the retrigger tick, then open a new one
    Split,
}

/// Decoder settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub tempo_mode: TempoMode,
    pub retrigger: RetriggerPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNote {
    tick: u64,
    velocity: u8,
}

/// Notes that have started but not yet ended, keyed by pitch
///
/// Ordered so that draining at the end of a track is deterministic.
#[derive(Debug, Default)]
pub struct OpenNoteTable {
    notes: BTreeMap<u8, OpenNote>,
}

impl OpenNoteTable {
    /// Record an onset; returns the previous entry for the pitch, if any
    fn open(&mut self, pitch: u8, tick: u64, velocity: u8) -> Option<OpenNote> {
        self.notes.insert(pitch, OpenNote { tick, velocity })
    }

    fn close(&mut self, pitch: u8) -> Option<OpenNote> {
        self.notes.remove(&pitch)
    }

    fn drain(&mut self) -> impl Iterator<Item = (u8, OpenNote)> {
        std::mem::take(&mut self.notes).into_iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Result of decoding one track chunk
#[derive(Debug, Default)]
pub struct DecodedTrack {
    /// Notes in the order they were resolved
    pub notes: Vec<Note>,
    /// Absolute tick of the last event
    pub end_tick: u64,
    /// Tempo changes seen in the track
    pub tempo_changes: usize,
    /// Problem that stopped decoding before the chunk end
    pub error: Option<Error>,
}

/// State machine over one track's bytes
pub struct TrackDecoder<'a> {
    reader: MidiReader<'a>,
    options: DecodeOptions,
    tick: u64,
    running_status: Option<u8>,
    tempo: TempoMap,
    open: OpenNoteTable,
    notes: Vec<Note>,
}

impl<'a> TrackDecoder<'a> {
    /// `data` is the track chunk payload only
    pub fn new(data: &'a [u8], timing: Timing, options: DecodeOptions) -> Self {
        Self {
            reader: MidiReader::new(data),
            options,
            tick: 0,
            running_status: None,
            tempo: TempoMap::new(timing),
            open: OpenNoteTable::default(),
            notes: Vec::new(),
        }
    }

    /// Decode the whole track
    ///
    /// Never fails: an undecodable event ends the track early and is
    /// reported through [`DecodedTrack::error`]. Notes still open at the end
    /// are closed at the final tick with velocity 0.
    pub fn decode(mut self) -> DecodedTrack {
        let mut error = None;

        while !self.reader.is_eof() {
            let timed = match read_event(&mut self.reader, &mut self.running_status) {
                Ok(timed) => timed,
                Err(e) => {
                    warn!(offset = self.reader.position(), error = %e, "track decoding stopped early");
                    error = Some(e);
                    break;
                }
            };
            self.tick += timed.delta as u64;

            match timed.event {
                RawEvent::NoteOn { key, velocity } => self.note_on(key, velocity),
                RawEvent::NoteOff { key, velocity } => self.note_off(key, velocity),
                RawEvent::Tempo(tempo) => {
                    trace!(tick = self.tick, tempo, "tempo change");
                    self.tempo.set(self.tick, tempo);
                }
                RawEvent::EndOfTrack => break,
                RawEvent::Meta { .. } | RawEvent::SysEx { .. } | RawEvent::Other { .. } => {}
            }
        }

        self.flush();

        debug!(
            notes = self.notes.len(),
            end_tick = self.tick,
            tempo_changes = self.tempo.change_count(),
            "decoded track"
        );

        DecodedTrack {
            notes: self.notes,
            end_tick: self.tick,
            tempo_changes: self.tempo.change_count(),
            error,
        }
    }

    fn note_on(&mut self, pitch: u8, velocity: u8) {
        if self.options.retrigger == RetriggerPolicy::Split {
            if let Some(previous) = self.open.close(pitch) {
                self.resolve(pitch, previous, self.tick, previous.velocity);
            }
        }
        if let Some(previous) = self.open.open(pitch, self.tick, velocity) {
            trace!(pitch, onset_tick = previous.tick, "retrigger replaced open note");
        }
    }

    fn note_off(&mut self, pitch: u8, off_velocity: u8) {
        match self.open.close(pitch) {
            Some(open) => self.resolve(pitch, open, self.tick, open.velocity),
            None => trace!(pitch, off_velocity, tick = self.tick, "note off without open note"),
        }
    }

    fn flush(&mut self) {
        let end = self.tick;
        if !self.open.is_empty() {
            debug!(open = self.open.len(), tick = end, "closing notes still open at end of track");
        }
        let remaining: Vec<_> = self.open.drain().collect();
        for (pitch, open) in remaining {
            self.resolve(pitch, open, end, 0);
        }
    }

    fn resolve(&mut self, pitch: u8, open: OpenNote, close_tick: u64, velocity: u8) {
        let span = close_tick.saturating_sub(open.tick);
        let (onset, duration) = match self.options.tempo_mode {
            TempoMode::ActiveAtConversion => (
                self.tempo.seconds_at_current(open.tick),
                self.tempo.seconds_at_current(span),
            ),
            TempoMode::Integrated => {
                let onset = self.tempo.seconds_at(open.tick);
                (onset, self.tempo.seconds_at(close_tick) - onset)
            }
        };
        self.notes.push(Note::new(pitch, velocity, onset, duration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;
    const TPQ: Timing = Timing::Metrical(480);

    fn decode(data: &[u8]) -> DecodedTrack {
        TrackDecoder::new(data, TPQ, DecodeOptions::default()).decode()
    }

    #[test]
    fn test_note_on_off_pair() {
        let track = decode(&[
            0x00, 0x90, 0x3C, 0x64, //
            0x83, 0x60, 0x80, 0x3C, 0x40, // delta 480
            0x00, 0xFF, 0x2F, 0x00,
        ]);
        assert!(track.error.is_none());
        assert_eq!(track.notes.len(), 1);
        let note = track.notes[0];
        assert_eq!(note.pitch, 60);
        assert_eq!(note.velocity, 100);
        assert!((note.onset - 0.0).abs() < EPS);
        assert!((note.duration - 0.5).abs() < EPS);
        assert_eq!(track.end_tick, 480);
    }

    #[test]
    fn test_zero_velocity_note_on_closes() {
        let track = decode(&[
            0x81, 0x70, 0x90, 0x40, 0x50, // delta 240
            0x81, 0x70, 0x40, 0x00, // running status, velocity 0
        ]);
        assert_eq!(track.notes.len(), 1);
        let note = track.notes[0];
        assert_eq!(note.pitch, 64);
        assert_eq!(note.velocity, 80);
        assert!((note.onset - 0.25).abs() < EPS);
        assert!((note.duration - 0.25).abs() < EPS);
    }

    #[test]
    fn test_unmatched_note_off_is_ignored() {
        let track = decode(&[0x00, 0x80, 0x3C, 0x40, 0x10, 0x90, 0x3C, 0x00]);
        assert!(track.notes.is_empty());
        assert!(track.error.is_none());
    }

    #[test]
    fn test_open_notes_flushed_once_at_end() {
        let track = decode(&[
            0x00, 0x90, 0x3C, 0x64, //
            0x00, 0x90, 0x40, 0x64, //
            0x83, 0x60, 0x80, 0x40, 0x00, //
            0x83, 0x60, 0xFF, 0x2F, 0x00,
        ]);
        assert_eq!(track.notes.len(), 2);
        let closed = track.notes[0];
        assert_eq!(closed.pitch, 64);
        assert_eq!(closed.velocity, 100);
        let flushed = track.notes[1];
        assert_eq!(flushed.pitch, 60);
        assert_eq!(flushed.velocity, 0);
        assert!((flushed.duration - 1.0).abs() < EPS);
        assert_eq!(track.notes.iter().filter(|n| n.pitch == 60).count(), 1);
    }

    #[test]
    fn test_tempo_active_at_conversion() {
        // note at tick 480..960, tempo doubles at tick 480
        let track = decode(&[
            0x00, 0x90, 0x3C, 0x64, //
            0x83, 0x60, 0x80, 0x3C, 0x00, // first note 0..480
            0x00, 0xFF, 0x51, 0x03, 0x03, 0xD0, 0x90, // 250000 us/qn
            0x00, 0x90, 0x3E, 0x64, //
            0x83, 0x60, 0x80, 0x3E, 0x00,
        ]);
        assert_eq!(track.tempo_changes, 1);
        assert_eq!(track.notes.len(), 2);
        assert!((track.notes[0].duration - 0.5).abs() < EPS);
        // onset uses the tempo active at conversion: 480 ticks at 250000
        assert!((track.notes[1].onset - 0.25).abs() < EPS);
        assert!((track.notes[1].duration - 0.25).abs() < EPS);
    }

    #[test]
    fn test_tempo_at_first_tick_is_counted() {
        let track = decode(&[
            0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40, // 1000000 us/qn at tick 0
            0x00, 0x90, 0x3C, 0x64, //
            0x83, 0x60, 0x80, 0x3C, 0x00,
        ]);
        assert_eq!(track.tempo_changes, 1);
        assert!((track.notes[0].duration - 1.0).abs() < EPS);
    }

    #[test]
    fn test_tempo_integrated() {
        let data = [
            0x00, 0x90, 0x3C, 0x64, //
            0x83, 0x60, 0xFF, 0x51, 0x03, 0x03, 0xD0, 0x90, // tick 480
            0x83, 0x60, 0x80, 0x3C, 0x00, // tick 960
        ];
        let options = DecodeOptions {
            tempo_mode: TempoMode::Integrated,
            ..DecodeOptions::default()
        };
        let track = TrackDecoder::new(&data, TPQ, options).decode();
        assert_eq!(track.notes.len(), 1);
        assert!((track.notes[0].onset - 0.0).abs() < EPS);
        assert!((track.notes[0].duration - 0.75).abs() < EPS);

        // same data without integration uses the final tempo throughout
        let track = decode(&data);
        assert!((track.notes[0].duration - 0.5).abs() < EPS);
    }

    #[test]
    fn test_retrigger_overwrite() {
        let track = decode(&[
            0x00, 0x90, 0x3C, 0x40, //
            0x83, 0x60, 0x90, 0x3C, 0x70, // retrigger at 480
            0x83, 0x60, 0x80, 0x3C, 0x00, // off at 960
        ]);
        assert_eq!(track.notes.len(), 1);
        let note = track.notes[0];
        assert_eq!(note.velocity, 0x70);
        assert!((note.onset - 0.5).abs() < EPS);
        assert!((note.duration - 0.5).abs() < EPS);
    }

    #[test]
    fn test_retrigger_split() {
        let data = [
            0x00, 0x90, 0x3C, 0x40, //
            0x83, 0x60, 0x90, 0x3C, 0x70, //
            0x83, 0x60, 0x80, 0x3C, 0x00,
        ];
        let options = DecodeOptions {
            retrigger: RetriggerPolicy::Split,
            ..DecodeOptions::default()
        };
        let track = TrackDecoder::new(&data, TPQ, options).decode();
        assert_eq!(track.notes.len(), 2);
        assert_eq!(track.notes[0].velocity, 0x40);
        assert!((track.notes[0].onset - 0.0).abs() < EPS);
        assert!((track.notes[0].duration - 0.5).abs() < EPS);
        assert_eq!(track.notes[1].velocity, 0x70);
        assert!((track.notes[1].onset - 0.5).abs() < EPS);
    }

    #[test]
    fn test_truncated_event_keeps_decoded_notes() {
        let track = decode(&[
            0x00, 0x90, 0x3C, 0x64, //
            0x83, 0x60, 0x80, 0x3C, 0x00, //
            0x00, 0x90, 0x3E, 0x64, //
            0x60, 0x90, 0x40, // cut off mid-event
        ]);
        assert!(matches!(track.error, Some(Error::UnexpectedEof { .. })));
        assert_eq!(track.notes.len(), 2);
        assert_eq!(track.notes[1].pitch, 62);
        assert_eq!(track.notes[1].velocity, 0);
        // the failed event's delta was never applied
        assert_eq!(track.end_tick, 480);
    }

    #[test]
    fn test_events_after_end_of_track_ignored() {
        let track = decode(&[
            0x00, 0xFF, 0x2F, 0x00, //
            0x00, 0x90, 0x3C, 0x64,
        ]);
        assert!(track.notes.is_empty());
    }
}
