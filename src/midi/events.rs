//! MIDI event definitions and decoding

use super::reader::MidiReader;
use crate::error::{Error, Result};

/// Status bytes (high nibble for channel messages)
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_PRESSURE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;
    pub const SYSEX: u8 = 0xF0;
    pub const SONG_POSITION: u8 = 0xF2;
    pub const SONG_SELECT: u8 = 0xF3;
    pub const TIME_CODE: u8 = 0xF1;
    pub const SYSEX_ESCAPE: u8 = 0xF7;
    pub const META: u8 = 0xFF;
}

/// Meta event types
pub mod meta {
    pub const END_OF_TRACK: u8 = 0x2F;
    pub const SET_TEMPO: u8 = 0x51;
}

/// Number of data bytes that follow a status byte
///
/// SysEx and meta events carry their own length and report 0 here.
pub fn data_len(status: u8) -> usize {
    match status & 0xF0 {
        0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => 2,
        0xC0 | 0xD0 => 1,
        _ => match status {
            status::TIME_CODE | status::SONG_SELECT => 1,
            status::SONG_POSITION => 2,
            _ => 0,
        },
    }
}

/// A decoded event, valid only while the track is being decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    /// Note on with non-zero velocity
    NoteOn { key: u8, velocity: u8 },
    /// Note off, including note on with zero velocity
    NoteOff { key: u8, velocity: u8 },
    /// Set Tempo meta event (microseconds per quarter note)
    Tempo(u32),
    /// End of Track meta event
    EndOfTrack,
    /// Any other meta event, payload skipped
    Meta { kind: u8, len: usize },
    /// SysEx message, payload skipped
    SysEx { len: usize },
    /// Channel or system message without note semantics
    Other { status: u8 },
}

/// An event with its delta time in ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub delta: u32,
    pub event: RawEvent,
}

/// Read one event, applying and updating running status
///
/// A data byte in status position reuses `running_status`; if none has been
/// seen yet the track cannot be decoded further and a format error is
/// returned.
pub fn read_event(reader: &mut MidiReader<'_>, running_status: &mut Option<u8>) -> Result<TimedEvent> {
    let delta = reader.read_var_len()?;

    let mut status_byte = reader.read_u8()?;
    if status_byte & 0x80 == 0 {
        match *running_status {
            Some(rs) => {
                reader.rewind_one();
                status_byte = rs;
            }
            None => {
                return Err(Error::Format(format!(
                    "data byte 0x{:02X} at offset {} without running status",
                    status_byte,
                    reader.position() - 1
                )))
            }
        }
    } else if status_byte < status::SYSEX {
        *running_status = Some(status_byte);
    }

    let event = match status_byte {
        status::META => {
            let kind = reader.read_u8()?;
            let len = reader.read_var_len()? as usize;
            let payload = reader.read_bytes(len)?;
            match kind {
                meta::SET_TEMPO if len == 3 => RawEvent::Tempo(
                    ((payload[0] as u32) << 16) | ((payload[1] as u32) << 8) | payload[2] as u32,
                ),
                meta::END_OF_TRACK => RawEvent::EndOfTrack,
                _ => RawEvent::Meta { kind, len },
            }
        }
        status::SYSEX | status::SYSEX_ESCAPE => {
            let len = reader.read_var_len()? as usize;
            reader.skip(len)?;
            RawEvent::SysEx { len }
        }
        s if s & 0xF0 == status::NOTE_ON => {
            let key = reader.read_u8()? & 0x7F;
            let velocity = reader.read_u8()? & 0x7F;
            if velocity > 0 {
                RawEvent::NoteOn { key, velocity }
            } else {
                RawEvent::NoteOff { key, velocity }
            }
        }
        s if s & 0xF0 == status::NOTE_OFF => {
            let key = reader.read_u8()? & 0x7F;
            let velocity = reader.read_u8()? & 0x7F;
            RawEvent::NoteOff { key, velocity }
        }
        s => {
            reader.skip(data_len(s))?;
            RawEvent::Other { status: s }
        }
    };

    Ok(TimedEvent { delta, event })
}
