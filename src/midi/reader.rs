//! Byte cursor over MIDI data
//!
//! Every read is bounds-checked against the buffer the reader was created
//! with. Track decoding hands each track its own sub-slice, so a corrupt
//! length field can never move the cursor outside the chunk.

use super::header::{CHUNK_HEADER_SIZE, HEADER_MIN_SIZE, HEADER_TAG};
use super::header::{MidiHeader, Timing};
use crate::error::{Error, Result};

/// Longest variable-length quantity allowed by the MIDI file format
pub const MAX_VAR_LEN_BYTES: usize = 4;

/// A top-level chunk located inside the file buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Four-character chunk tag
    pub tag: [u8; 4],
    /// Offset of the first payload byte
    pub start: usize,
    /// Offset one past the last payload byte (clamped to the buffer)
    pub end: usize,
    /// Length declared in the chunk header
    pub declared_len: usize,
}

impl Chunk {
    /// True if the declared length ran past the end of the buffer
    pub fn is_truncated(&self) -> bool {
        self.end - self.start < self.declared_len
    }

    /// The chunk tag as text, for diagnostics
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }

    /// Recoverable error describing the truncation, if any
    pub fn truncation(&self) -> Option<Error> {
        self.is_truncated().then(|| Error::TruncatedChunk {
            tag: self.tag_str(),
            declared: self.declared_len,
            available: self.end - self.start,
        })
    }
}

/// MIDI data reader
pub struct MidiReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MidiReader<'a> {
    /// Create a new reader over raw bytes
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check if we've reached the end of data
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Seek to a position (clamped to the end of data)
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Move the cursor back one byte
    pub fn rewind_one(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    fn ensure(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(Error::UnexpectedEof { offset: self.pos });
        }
        Ok(())
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Read a 16-bit big-endian value
    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let v = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    /// Read a 24-bit big-endian value
    pub fn read_u24(&mut self) -> Result<u32> {
        self.ensure(3)?;
        let b = &self.data[self.pos..self.pos + 3];
        let v = ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | (b[2] as u32);
        self.pos += 3;
        Ok(v)
    }

    /// Read a 32-bit big-endian value
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let v = u32::from_be_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(v)
    }

    /// Read a variable-length quantity (base-128, high bit = continuation)
    pub fn read_var_len(&mut self) -> Result<u32> {
        let start = self.pos;
        let mut value = 0u32;
        for _ in 0..MAX_VAR_LEN_BYTES {
            let b = self.read_u8()?;
            value = (value << 7) | (b & 0x7F) as u32;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::Format(format!(
            "variable-length quantity at offset {} exceeds {} bytes",
            start, MAX_VAR_LEN_BYTES
        )))
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.ensure(len)?;
        self.pos += len;
        Ok(())
    }

    /// Validate the `MThd` chunk and parse the header fields
    ///
    /// Leaves the cursor on the first chunk after the header.
    pub fn parse_header(&mut self) -> Result<MidiHeader> {
        if self.data.len() < HEADER_MIN_SIZE {
            return Err(Error::Format(format!(
                "file too small for MIDI header ({} bytes)",
                self.data.len()
            )));
        }
        if &self.data[0..4] != HEADER_TAG {
            return Err(Error::Format("invalid MIDI magic (expected MThd)".into()));
        }

        self.seek(4);
        let header_len = self.read_u32()? as usize;
        if header_len < 6 {
            return Err(Error::Format(format!(
                "header chunk too short ({} bytes)",
                header_len
            )));
        }

        let format = self.read_u16()?;
        let track_count = self.read_u16()?;
        let timing = Timing::from_division(self.read_u16()?)?;

        // Extra header bytes are allowed by the format and ignored
        self.seek(CHUNK_HEADER_SIZE + header_len);

        Ok(MidiHeader {
            format,
            track_count,
            timing,
        })
    }

    /// Read the next top-level chunk header
    ///
    /// Returns `None` once fewer bytes than a chunk header remain. A length
    /// that overruns the buffer is clamped; callers check
    /// [`Chunk::is_truncated`]. The cursor is left after the chunk.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.remaining() < CHUNK_HEADER_SIZE {
            return Ok(None);
        }
        let tag_bytes = self.read_bytes(4)?;
        let tag = [tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]];
        let declared_len = self.read_u32()? as usize;
        let start = self.pos;
        let end = start.saturating_add(declared_len).min(self.data.len());
        self.seek(end);

        Ok(Some(Chunk {
            tag,
            start,
            end,
            declared_len,
        }))
    }
}

/// Encode a value as a MIDI variable-length quantity
pub fn encode_var_len(value: u32) -> Vec<u8> {
    let value = value & 0x0FFF_FFFF;
    let mut groups = vec![(value & 0x7F) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        groups.push(((rest & 0x7F) as u8) | 0x80);
        rest >>= 7;
    }
    groups.reverse();
    groups
}
