use clap::Parser;
use midi2gcode::midi::{DecodeOptions, RetriggerPolicy, TempoMode};
use midi2gcode::profile::ProfileSet;
use midi2gcode::Converter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "midi2gcode")]
#[command(version = "0.1.0")]
#[command(about = "Convert a MIDI file into G-code that plays it on a printer axis", long_about = None)]
struct Args {
    /// Input MIDI file (.mid, optionally gzip-compressed)
    #[arg(required_unless_present = "list_printers")]
    input: Option<PathBuf>,

    /// Output G-code file (defaults to <output-dir>/<input name>.gcode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the default output file
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Printer profile name
    #[arg(short, long)]
    printer: Option<String>,

    /// JSON file with custom printer profiles
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// List available printer profiles
    #[arg(short = 'L', long)]
    list_printers: bool,

    /// Override maximum speed (mm/s)
    #[arg(long)]
    max_speed: Option<f64>,

    /// Override acceleration limit (mm/s²)
    #[arg(long)]
    acceleration: Option<f64>,

    /// Override jerk limit (mm/s)
    #[arg(long)]
    jerk: Option<f64>,

    /// Override usable X travel (mm)
    #[arg(long)]
    bed_size: Option<f64>,

    /// Override steps per mm
    #[arg(long)]
    steps_per_mm: Option<f64>,

    /// Do not emit acceleration/jerk settings and ramp annotations
    #[arg(long)]
    no_ramps: bool,

    /// Integrate tempo changes instead of using the tempo active at each note's end
    #[arg(long)]
    integrate_tempo: bool,

    /// Split a re-struck sounding note into two notes instead of replacing it
    #[arg(long)]
    split_retrigger: bool,
}

fn main() -> Result<(), midi2gcode::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let args = Args::parse();

    let profiles = match &args.profiles {
        Some(path) => ProfileSet::load(path)?,
        None => ProfileSet::new(),
    };

    if args.list_printers {
        for p in profiles.profiles() {
            let custom = if p.is_custom { " (custom)" } else { "" };
            println!(
                "{} [{}] bed {}x{} mm, {} mm/s{}",
                p.name, p.manufacturer, p.bed_size_x, p.bed_size_y, p.max_speed, custom
            );
        }
        return Ok(());
    }

    let input = args.input.expect("input is required when not listing printers");

    let profile = match &args.printer {
        Some(name) => profiles.find(name)?,
        None => profiles.default_profile(),
    };

    let mut config = profile.motion_config();
    if let Some(v) = args.max_speed {
        config.max_speed = v;
    }
    if let Some(v) = args.acceleration {
        config.acceleration = Some(v);
    }
    if let Some(v) = args.jerk {
        config.jerk = Some(v);
    }
    if let Some(v) = args.bed_size {
        config.axis_bound = v;
    }
    if let Some(v) = args.steps_per_mm {
        config.steps_per_mm = v;
    }
    if args.no_ramps {
        config.acceleration = None;
        config.jerk = None;
    }

    let options = DecodeOptions {
        tempo_mode: if args.integrate_tempo {
            TempoMode::Integrated
        } else {
            TempoMode::ActiveAtConversion
        },
        retrigger: if args.split_retrigger {
            RetriggerPolicy::Split
        } else {
            RetriggerPolicy::Overwrite
        },
    };

    let output = args
        .output
        .unwrap_or_else(|| Converter::default_output_path(&input, &args.output_dir));

    let conversion = Converter::new(config)
        .with_options(options)
        .convert_file(&input, &output)?;

    println!(
        "Converted {} notes from {} to {} ({} warnings)",
        conversion.timeline.len(),
        input.display(),
        output.display(),
        conversion.warnings.len()
    );

    Ok(())
}
