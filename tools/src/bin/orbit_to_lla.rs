use clap::Parser;
use sattypes::prelude::*;
use std::path::PathBuf;
use tools_lib::{parse_observer, parse_time, read_records, select_record};
use tracing_subscriber::EnvFilter;

/// Print the geodetic position of an object at one instant
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Record name, the first record in the file when not provided
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// RFC 3339 UTC time, now when not provided
    #[arg(short = 't', long, value_parser = parse_time)]
    at: Option<EpochTime>,

    /// Ground observer 'lat,lon,alt_m' (WGS-84), adds the look angle
    #[arg(short = 'o', long, value_parser = parse_observer, allow_hyphen_values = true)]
    observer: Option<ObserverSite>,

    /// Print the fix as JSON
    #[arg(long)]
    json: bool,

    /// TLE file to read
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let opts = Opts::parse();

    let record = select_record(read_records(&opts.input)?, opts.name.as_deref())?;
    let at = opts.at.unwrap_or_else(EpochTime::now);
    let point = propagator::track(&record, &at, opts.observer.as_ref())?;

    if opts.json {
        println!("{}", serde_json::to_string(&point)?);
    } else {
        let c = &point.coordinate;
        println!("{}", c.name);
        println!("  time       {}", point.timestamp);
        println!("  latitude   {:.5} deg", c.latitude_deg);
        println!("  longitude  {:.5} deg", c.longitude_deg);
        println!("  altitude   {:.3} km", c.altitude_km);
        println!(
            "  elements   {:.2} days from epoch ({:?})",
            point.element_age_days, point.model
        );
        if let Some(look) = point.look_angle {
            println!("  azimuth    {:.2} deg", look.azimuth_deg);
            println!("  elevation  {:.2} deg", look.elevation_deg);
            println!(
                "  range      {:.3} km ({:+.4} km/s)",
                look.range_km, look.range_rate_km_s
            );
        }
    }

    Ok(())
}
