//! Trapezoidal speed profiles for note moves

/// Speed profile of one move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampProfile {
    /// Speed at the start of the move (mm/s)
    pub entry_speed: f64,
    /// Highest speed reached (mm/s)
    pub peak_speed: f64,
    /// Speed at the end of the move (mm/s)
    pub exit_speed: f64,
    /// Seconds spent accelerating
    pub accel_time: f64,
    /// Seconds spent at peak speed
    pub cruise_time: f64,
    /// Seconds spent decelerating
    pub decel_time: f64,
}

impl RampProfile {
    /// Plan a symmetric profile for a move at `speed` lasting `duration`
    ///
    /// Entry and exit speed are limited by the jerk limit and by what the
    /// acceleration limit can shed in half the available time. If the move
    /// is too short to reach `speed`, the profile is triangular and peaks
    /// below it.
    pub fn plan(speed: f64, duration: f64, acceleration: f64, jerk: Option<f64>) -> Self {
        let duration = duration.max(0.0);
        let half = duration / 2.0;
        let entry = jerk
            .unwrap_or(0.0)
            .min(speed)
            .min(acceleration * half)
            .max(0.0);

        let ramp_time = (speed - entry) / acceleration;
        if ramp_time <= half {
            Self {
                entry_speed: entry,
                peak_speed: speed,
                exit_speed: entry,
                accel_time: ramp_time,
                cruise_time: duration - 2.0 * ramp_time,
                decel_time: ramp_time,
            }
        } else {
            Self {
                entry_speed: entry,
                peak_speed: entry + acceleration * half,
                exit_speed: entry,
                accel_time: half,
                cruise_time: 0.0,
                decel_time: half,
            }
        }
    }

    /// Annotation text for the stream
    pub fn describe(&self) -> String {
        format!(
            "ramp entry={:.2} peak={:.2} accel_time={:.3} cruise_time={:.3}",
            self.entry_speed, self.peak_speed, self.accel_time, self.cruise_time
        )
    }
}
