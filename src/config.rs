//! Motion parameters consumed by the G-code generator

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default frequency-to-speed divisor (Hz per mm/s)
pub const DEFAULT_SPEED_DIVISOR: f64 = 10.0;

/// Machine limits for one linear axis
///
/// Passed by value into the generator; nothing reads global settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Maximum feed speed (mm/s)
    pub max_speed: f64,
    /// Stepper resolution (steps/mm); positions are rounded to this grid
    pub steps_per_mm: f64,
    /// Acceleration limit (mm/s²); enables ramp annotations
    pub acceleration: Option<f64>,
    /// Jerk limit (mm/s); caps ramp entry and exit speed
    pub jerk: Option<f64>,
    /// Usable axis travel (mm)
    pub axis_bound: f64,
    /// Note frequency divided by this gives the feed speed (mm/s)
    pub speed_divisor: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 200.0,
            steps_per_mm: 80.0,
            acceleration: None,
            jerk: None,
            axis_bound: 200.0,
            speed_divisor: DEFAULT_SPEED_DIVISOR,
        }
    }
}

impl MotionConfig {
    /// Check the generator's preconditions
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::Config(format!("{} must be positive, got {}", name, value)))
            }
        };
        positive("max speed", self.max_speed)?;
        if self.max_speed * 60.0 < 1.0 {
            return Err(Error::Config(format!(
                "max speed {} mm/s is below 1 mm/min",
                self.max_speed
            )));
        }
        positive("steps per mm", self.steps_per_mm)?;
        positive("axis bound", self.axis_bound)?;
        positive("speed divisor", self.speed_divisor)?;
        if let Some(a) = self.acceleration {
            positive("acceleration", a)?;
        }
        if let Some(j) = self.jerk {
            positive("jerk", j)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MotionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive() {
        let config = MotionConfig {
            max_speed: 0.0,
            ..MotionConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = MotionConfig {
            steps_per_mm: -80.0,
            ..MotionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = MotionConfig {
            max_speed: 0.01,
            ..MotionConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = MotionConfig {
            acceleration: Some(f64::NAN),
            ..MotionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
