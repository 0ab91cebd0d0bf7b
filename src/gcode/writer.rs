//! G-code stream writer

use super::commands::GcodeCommand;
use crate::error::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Append-only G-code text buffer
#[derive(Debug, Default)]
pub struct GcodeWriter {
    text: String,
    /// Commands written so far (comments and blank lines excluded)
    count: usize,
}

impl GcodeWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a command line with a trailing comment
    pub fn command_with_comment(&mut self, cmd: &GcodeCommand, comment: &str) {
        let _ = writeln!(self.text, "{} ; {}", cmd, comment);
        self.count += 1;
    }

    /// Write a comment-only line
    pub fn comment(&mut self, comment: &str) {
        let _ = writeln!(self.text, "; {}", comment);
    }

    /// Write an empty line
    pub fn blank(&mut self) {
        self.text.push('\n');
    }

    /// Number of command lines written
    pub fn command_count(&self) -> usize {
        self.count
    }

    /// Finish and return the stream text
    pub fn finish(self) -> String {
        self.text
    }

    /// Write the stream to a file, creating parent directories
    pub fn save(text: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, text)?;
        Ok(())
    }
}
