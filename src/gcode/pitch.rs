//! Pitch, frequency and feed speed

/// MIDI pitch of concert A
pub const A4_PITCH: u8 = 69;

/// Frequency of concert A (Hz)
pub const A4_FREQUENCY: f64 = 440.0;

/// Equal-tempered frequency of a MIDI pitch
pub fn note_to_frequency(pitch: u8) -> f64 {
    A4_FREQUENCY * 2.0_f64.powf((pitch as f64 - A4_PITCH as f64) / 12.0)
}

/// Feed speed (mm/s) for a frequency, saturating at `max_speed`
///
/// Monotonic in `frequency`.
pub fn frequency_to_speed(frequency: f64, divisor: f64, max_speed: f64) -> f64 {
    (frequency / divisor).min(max_speed)
}

/// Feed rate in mm/min as written to the stream, never below 1
pub fn feed_rate(speed: f64) -> u32 {
    ((speed * 60.0) as u32).max(1)
}
