//! Standard MIDI File decoding

pub mod events;
pub mod header;
pub mod json;
pub mod reader;
pub mod tempo;
pub mod track;

pub use header::{MidiHeader, Timing};
pub use json::MidiJson;
pub use reader::MidiReader;
pub use track::{DecodeOptions, DecodedTrack, RetriggerPolicy, TempoMode, TrackDecoder};

use crate::error::{Error, Result};
use crate::timeline::Timeline;
use flate2::read::GzDecoder;
use header::TRACK_TAG;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, warn};

/// A decoded MIDI file
#[derive(Debug)]
pub struct MidiFile {
    pub header: MidiHeader,
    /// Tracks in file order
    pub tracks: Vec<DecodedTrack>,
    /// Problems that were recovered from while decoding
    pub warnings: Vec<Error>,
}

impl MidiFile {
    /// Decode a complete file
    ///
    /// Fails only if the header is invalid. Unknown chunks are skipped,
    /// truncated chunks are decoded up to the end of the buffer, and
    /// missing tracks are reported as warnings.
    pub fn parse(data: &[u8], options: DecodeOptions) -> Result<Self> {
        let mut reader = MidiReader::new(data);
        let header = reader.parse_header()?;
        debug!(
            format = header.format,
            tracks = header.track_count,
            timing = ?header.timing,
            "parsed MIDI header"
        );

        let mut tracks = Vec::new();
        let mut warnings = Vec::new();

        while tracks.len() < header.track_count as usize {
            let Some(chunk) = reader.next_chunk()? else {
                break;
            };

            if let Some(err) = chunk.truncation() {
                warn!(%err, "truncated chunk");
                warnings.push(err);
            }

            if &chunk.tag != TRACK_TAG {
                debug!(tag = %chunk.tag_str(), len = chunk.declared_len, "skipping chunk");
                continue;
            }

            let mut track =
                TrackDecoder::new(&data[chunk.start..chunk.end], header.timing, options).decode();
            if let Some(err) = track.error.take() {
                warnings.push(err);
            }
            tracks.push(track);
        }

        if tracks.len() < header.track_count as usize {
            warn!(
                declared = header.track_count,
                found = tracks.len(),
                "file has fewer tracks than declared"
            );
            warnings.push(Error::Format(format!(
                "header declares {} tracks but only {} were found",
                header.track_count,
                tracks.len()
            )));
        }

        Ok(Self {
            header,
            tracks,
            warnings,
        })
    }

    /// Merge the notes of all tracks into one sorted sequence
    pub fn timeline(&self) -> Timeline {
        Timeline::merge(self.tracks.iter().map(|t| t.notes.iter().copied()))
    }

    /// Consume the file and merge its notes
    pub fn into_timeline(self) -> Timeline {
        Timeline::merge(self.tracks.into_iter().map(|t| t.notes))
    }
}

/// Read a MIDI file, inflating it if it is gzip-compressed
pub fn read_midi_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {}", path.display(), e),
        ))
    })?;

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
        || (data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b);

    if is_gzip {
        let mut decoder = GzDecoder::new(Cursor::new(data));
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed)
    } else {
        Ok(data)
    }
}
