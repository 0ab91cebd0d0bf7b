pub mod commands;
pub mod generator;
pub mod json;
pub mod pitch;
pub mod ramp;
pub mod reader;
pub mod writer;

pub use commands::GcodeCommand;
pub use generator::{GenerationStats, MotionGenerator};
pub use json::GcodeJson;
pub use reader::{GcodeReader, Segment};
pub use writer::GcodeWriter;
