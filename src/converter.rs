//! MIDI to G-code conversion pipeline
//!
//! bytes -> [`MidiFile`] -> [`Timeline`] -> [`MotionGenerator`] -> text

use crate::config::MotionConfig;
use crate::error::{Error, Result};
use crate::gcode::{GcodeWriter, GenerationStats, MotionGenerator};
use crate::midi::{self, DecodeOptions, MidiFile};
use crate::timeline::Timeline;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Output file extension
pub const GCODE_EXTENSION: &str = "gcode";

/// Result of one conversion
#[derive(Debug)]
pub struct Conversion {
    /// Notes that were played
    pub timeline: Timeline,
    /// Generated command stream
    pub gcode: String,
    pub stats: GenerationStats,
    /// Problems recovered from while decoding
    pub warnings: Vec<Error>,
}

/// Converter state
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: MotionConfig,
    options: DecodeOptions,
}

impl Converter {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Convert MIDI bytes
    pub fn convert(&self, data: &[u8]) -> Result<Conversion> {
        self.config.validate()?;

        let file = MidiFile::parse(data, self.options)?;
        for w in &file.warnings {
            warn!(warning = %w, "recovered while decoding");
        }
        let warnings = file.warnings;
        let timeline = Timeline::merge(file.tracks.into_iter().map(|t| t.notes));

        let (gcode, stats) = MotionGenerator::new(self.config.clone()).generate_with_stats(&timeline);

        Ok(Conversion {
            timeline,
            gcode,
            stats,
            warnings,
        })
    }

    /// Convert a MIDI file and write the command stream to `output`
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<Conversion> {
        let data = midi::read_midi_file(input)?;
        let conversion = self.convert(&data)?;
        GcodeWriter::save(&conversion.gcode, output)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            notes = conversion.timeline.len(),
            "converted"
        );
        Ok(conversion)
    }

    /// `dir/<input stem>.gcode`
    pub fn default_output_path(input: &Path, dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "output".into());
        let mut name = PathBuf::from(stem);
        name.set_extension(GCODE_EXTENSION);
        dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            Converter::default_output_path(Path::new("/music/song.mid"), Path::new("out")),
            PathBuf::from("out/song.gcode")
        );
        assert_eq!(
            Converter::default_output_path(Path::new("tune"), Path::new(".")),
            PathBuf::from("./tune.gcode")
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let converter = Converter::new(MotionConfig {
            axis_bound: 0.0,
            ..MotionConfig::default()
        });
        assert!(matches!(converter.convert(&[]), Err(Error::Config(_))));
    }

    #[test]
    fn test_format_error_gives_no_output() {
        let converter = Converter::default();
        assert!(matches!(
            converter.convert(b"not a midi file at all"),
            Err(Error::Format(_))
        ));
    }
}
