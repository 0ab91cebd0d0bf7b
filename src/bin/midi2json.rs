//! MIDI to JSON converter

use clap::Parser;
use midi2gcode::midi::{self, DecodeOptions, MidiFile, MidiJson, RetriggerPolicy, TempoMode};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "midi2json")]
#[command(version = "0.1.0")]
#[command(about = "Dump the decoded notes of a MIDI file as JSON", long_about = None)]
struct Args {
    /// Input MIDI file (optionally gzip-compressed)
    input: PathBuf,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,

    /// Integrate tempo changes over each note
    #[arg(long)]
    integrate_tempo: bool,

    /// Split a re-struck sounding note into two notes
    #[arg(long)]
    split_retrigger: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let args = Args::parse();

    let data = midi::read_midi_file(&args.input)?;

    let mut options = DecodeOptions::default();
    if args.integrate_tempo {
        options.tempo_mode = TempoMode::Integrated;
    }
    if args.split_retrigger {
        options.retrigger = RetriggerPolicy::Split;
    }
    let file = MidiFile::parse(&data, options)?;

    let midi_json = MidiJson::new(&file);

    let json_string = if args.compact {
        serde_json::to_string(&midi_json)?
    } else {
        serde_json::to_string_pretty(&midi_json)?
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
