//! Printer profiles
//!
//! Built-in presets for common printers plus custom profiles read from a
//! JSON file of the form `{"customPrinters": [ ... ]}`.

use crate::config::{MotionConfig, DEFAULT_SPEED_DIVISOR};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Machine description of one printer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterProfile {
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    /// Bed size along X (mm)
    pub bed_size_x: f64,
    /// Bed size along Y (mm)
    pub bed_size_y: f64,
    /// mm/s
    pub max_speed: f64,
    /// mm/s²
    pub acceleration: f64,
    /// mm/s
    pub jerk: f64,
    pub steps_per_mm: f64,
    #[serde(skip)]
    pub is_custom: bool,
}

impl PrinterProfile {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        name: &str,
        manufacturer: &str,
        bed_size_x: f64,
        bed_size_y: f64,
        max_speed: f64,
        acceleration: f64,
        jerk: f64,
        steps_per_mm: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            manufacturer: manufacturer.to_string(),
            bed_size_x,
            bed_size_y,
            max_speed,
            acceleration,
            jerk,
            steps_per_mm,
            is_custom: false,
        }
    }

    /// Motion limits for the X axis of this printer
    pub fn motion_config(&self) -> MotionConfig {
        MotionConfig {
            max_speed: self.max_speed,
            steps_per_mm: self.steps_per_mm,
            acceleration: Some(self.acceleration),
            jerk: Some(self.jerk),
            axis_bound: self.bed_size_x,
            speed_divisor: DEFAULT_SPEED_DIVISOR,
        }
    }
}

/// Presets shipped with the converter
pub fn builtin_profiles() -> Vec<PrinterProfile> {
    vec![
        PrinterProfile::builtin("Prusa MK3S+", "Prusa Research", 250.0, 210.0, 200.0, 1000.0, 8.0, 100.0),
        PrinterProfile::builtin("Prusa Mini+", "Prusa Research", 180.0, 180.0, 180.0, 1000.0, 8.0, 100.0),
        PrinterProfile::builtin("Ender 3", "Creality", 220.0, 220.0, 180.0, 500.0, 8.0, 80.0),
        PrinterProfile::builtin("Ender 3 V2", "Creality", 220.0, 220.0, 200.0, 500.0, 8.0, 80.0),
        PrinterProfile::builtin("Ender 5", "Creality", 220.0, 220.0, 200.0, 500.0, 8.0, 80.0),
        PrinterProfile::builtin("CR-10", "Creality", 300.0, 300.0, 180.0, 500.0, 8.0, 80.0),
        PrinterProfile::builtin("Voron 2.4", "Voron Design", 350.0, 350.0, 300.0, 3000.0, 10.0, 80.0),
        PrinterProfile::builtin("Rat Rig V-Core 3", "Rat Rig", 300.0, 300.0, 300.0, 3000.0, 10.0, 80.0),
        PrinterProfile::builtin("Artillery Sidewinder X1", "Artillery", 300.0, 300.0, 150.0, 1000.0, 8.0, 80.0),
        PrinterProfile::builtin("Flashforge Creator Pro", "Flashforge", 225.0, 145.0, 150.0, 1000.0, 8.0, 88.0),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileFile {
    #[serde(default)]
    custom_printers: Vec<PrinterProfile>,
}

/// Built-in and custom profiles
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: Vec<PrinterProfile>,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            profiles: builtin_profiles(),
        }
    }
}

impl ProfileSet {
    /// Built-in presets only
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in presets plus the custom printers in a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open '{}': {}", path.display(), e),
            ))
        })?;
        let mut set = Self::new();
        set.add_custom_json(&text)?;
        Ok(set)
    }

    /// Add custom printers from JSON text
    pub fn add_custom_json(&mut self, text: &str) -> Result<()> {
        let file: ProfileFile = serde_json::from_str(text)?;
        for mut profile in file.custom_printers {
            debug!(name = %profile.name, "loaded custom printer");
            profile.is_custom = true;
            self.profiles.push(profile);
        }
        Ok(())
    }

    pub fn profiles(&self) -> &[PrinterProfile] {
        &self.profiles
    }

    /// Find a profile by name, ignoring case; later entries win so custom
    /// printers can shadow presets
    pub fn find(&self, name: &str) -> Result<&PrinterProfile> {
        self.profiles
            .iter()
            .rev()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownPrinter(name.to_string()))
    }

    /// The profile used when none is named
    pub fn default_profile(&self) -> &PrinterProfile {
        &self.profiles[0]
    }
}
