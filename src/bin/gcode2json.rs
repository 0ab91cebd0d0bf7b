//! G-code to JSON converter

use clap::Parser;
use midi2gcode::gcode::GcodeJson;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gcode2json")]
#[command(version = "0.1.0")]
#[command(about = "Parse a G-code stream and dump commands and totals as JSON", long_about = None)]
struct Args {
    /// Input G-code file (reads from stdin if not specified)
    input: Option<PathBuf>,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,

    /// Print only the summary
    #[arg(short, long)]
    summary: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let gcode_json = GcodeJson::from_text(&text)?;

    let json_string = match (args.summary, args.compact) {
        (true, true) => serde_json::to_string(&gcode_json.summary)?,
        (true, false) => serde_json::to_string_pretty(&gcode_json.summary)?,
        (false, true) => serde_json::to_string(&gcode_json)?,
        (false, false) => serde_json::to_string_pretty(&gcode_json)?,
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
