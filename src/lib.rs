pub mod config;
pub mod converter;
pub mod error;
pub mod gcode;
pub mod midi;
pub mod profile;
pub mod timeline;

pub use config::MotionConfig;
pub use converter::Converter;
pub use error::Error;
pub use timeline::{Note, Timeline};
