use clap::Parser;
use sattypes::prelude::*;
use std::fs::File;
use std::io::{prelude::*, BufWriter};
use std::path::PathBuf;
use tools_lib::{parse_time, read_records, select_record};
use tracing_subscriber::EnvFilter;

/// Write the sub-satellite point over a span of time
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Record name, the first record in the file when not provided
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// RFC 3339 UTC start time, the element set epoch when not provided
    #[arg(short = 's', long, value_parser = parse_time)]
    start: Option<EpochTime>,

    /// Length of the track
    #[arg(short = 'd', long, default_value = "90m", value_parser = humantime::parse_duration)]
    duration: std::time::Duration,

    /// Time between points
    #[arg(long, default_value = "1m", value_parser = humantime::parse_duration)]
    step: std::time::Duration,

    /// Use seconds relative to the start instead of unix timestamps
    #[arg(short = 'r', long)]
    relative_time: bool,

    /// Output file path to write
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// TLE file to read
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let opts = Opts::parse();

    if opts.step.is_zero() {
        return Err("'step' must be greater than zero".into());
    }
    let step = chrono::Duration::from_std(opts.step)?;
    let duration = chrono::Duration::from_std(opts.duration)?;

    let record = select_record(read_records(&opts.input)?, opts.name.as_deref())?;
    let elements = tleproto::parse_record(&record)?;
    let sgp4 = propagator::Sgp4::new(&elements)?;

    let start = opts.start.unwrap_or(elements.epoch);
    let end = start + duration;
    let mut output = BufWriter::new(File::create(&opts.output)?);

    let mut t = start;
    let mut points = 0_usize;
    while t <= end {
        let state = sgp4.propagate_to(&t)?;
        let fix = propagator::frames::to_geodetic(&state, &t, &record.name);

        let timestamp = if opts.relative_time {
            t.minutes_since(&start) * 60.0
        } else {
            t.unix_seconds()
        };
        writeln!(
            &mut output,
            "{:.3} {:.6} {:.6} {:.4}",
            timestamp, fix.latitude_deg, fix.longitude_deg, fix.altitude_km
        )?;

        points += 1;
        t = t + step;
    }
    output.flush()?;

    tracing::info!(name = %record.name, points, output = %opts.output.display(), "Wrote ground track");

    Ok(())
}
