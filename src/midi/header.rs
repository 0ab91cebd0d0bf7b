//! MIDI file header definitions

use crate::error::{Error, Result};
use serde::Serialize;

/// Header chunk tag
pub const HEADER_TAG: &[u8; 4] = b"MThd";

/// Track chunk tag
pub const TRACK_TAG: &[u8; 4] = b"MTrk";

/// Tag plus 32-bit length
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Smallest buffer that can hold a complete header chunk
pub const HEADER_MIN_SIZE: usize = 14;

/// Tempo assumed until a Set Tempo meta event is seen (120 BPM)
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Time division declared in the header
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Ticks per quarter note; tempo-dependent
    Metrical(u16),
    /// SMPTE frames per second and ticks per frame; tempo-independent
    Timecode { fps: f64, ticks_per_frame: u8 },
}

impl Timing {
    /// Decode the 16-bit division word
    pub fn from_division(division: u16) -> Result<Self> {
        if division & 0x8000 != 0 {
            let frames = -(((division >> 8) as u8 as i8) as i32);
            let fps = match frames {
                24 | 25 | 30 => frames as f64,
                29 => 29.97,
                _ => {
                    return Err(Error::Format(format!(
                        "unsupported SMPTE frame rate {}",
                        frames
                    )))
                }
            };
            let ticks_per_frame = (division & 0xFF) as u8;
            if ticks_per_frame == 0 {
                return Err(Error::Format("zero ticks per SMPTE frame".into()));
            }
            Ok(Timing::Timecode {
                fps,
                ticks_per_frame,
            })
        } else if division == 0 {
            Err(Error::Format("zero ticks per quarter note".into()))
        } else {
            Ok(Timing::Metrical(division))
        }
    }
}

/// Parsed MIDI header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiHeader {
    /// File format (0, 1 or 2); informational only
    pub format: u16,
    /// Number of track chunks the header announces
    pub track_count: u16,
    /// Time division
    pub timing: Timing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrical_division() {
        assert_eq!(Timing::from_division(480).unwrap(), Timing::Metrical(480));
        assert!(Timing::from_division(0).is_err());
    }

    #[test]
    fn test_smpte_division() {
        // -25 fps, 40 ticks per frame
        let timing = Timing::from_division(0xE728).unwrap();
        assert_eq!(
            timing,
            Timing::Timecode {
                fps: 25.0,
                ticks_per_frame: 40
            }
        );

        // -29 is drop-frame 29.97
        match Timing::from_division(0xE350).unwrap() {
            Timing::Timecode { fps, ticks_per_frame } => {
                assert!((fps - 29.97).abs() < 1e-9);
                assert_eq!(ticks_per_frame, 80);
            }
            other => panic!("unexpected timing {:?}", other),
        }
    }

    #[test]
    fn test_smpte_invalid_rate() {
        assert!(Timing::from_division(0xF028).is_err());
    }
}
