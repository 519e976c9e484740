use clap::Parser;
use sattypes::prelude::EpochTime;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

use tracker_lib::{config::Config, source::FileSource, TickReport, Tracker};

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Tracker configuration toml file.
    ///
    /// Defaults are used when not provided.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TLE catalog file, overrides the configuration's 'catalog'
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// Print each fix as a line of JSON
    #[arg(long)]
    json: bool,
}

/// Granularity of the interrupt check while waiting for the next tick
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let opts = Opts::parse();

    let intr = interruptor::Interruptor::new();
    let intr_clone = intr.clone();
    ctrlc::set_handler(move || {
        if intr_clone.is_set() {
            let exit_code = if cfg!(target_family = "unix") {
                // 128 (fatal error signal "n") + 2 (control-c is fatal error signal 2)
                130
            } else {
                // Windows code 3221225786
                // -1073741510 == C000013A
                -1073741510
            };
            std::process::exit(exit_code);
        } else {
            intr_clone.set();
        }
    })?;

    let cfg = match opts.config.as_ref() {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    // A relative catalog path in the config file is relative to that file
    let config_dir = opts
        .config
        .as_ref()
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let catalog = opts
        .catalog
        .clone()
        .or_else(|| cfg.catalog.as_ref().map(|c| config_dir.join(c)))
        .ok_or("No TLE catalog file, use --catalog or set 'catalog' in the configuration")?;

    let mut tracker = Tracker::new(&cfg, FileSource::new(catalog))?;
    let stdout = io::stdout();

    loop {
        let tick_start = Instant::now();
        let report = tracker.tick(EpochTime::now());
        print_report(&mut stdout.lock(), &report, opts.json)?;

        if opts.once || intr.is_set() {
            break;
        }
        if tracker.catalog().is_empty() {
            tracing::warn!("Nothing left to track");
            break;
        }

        while tick_start.elapsed() < cfg.position_interval {
            if intr.is_set() {
                break;
            }
            std::thread::sleep(POLL_INTERVAL.min(cfg.position_interval));
        }
        if intr.is_set() {
            break;
        }
    }

    Ok(())
}

fn print_report<W: Write>(out: &mut W, report: &TickReport, json: bool) -> io::Result<()> {
    for p in report.points.iter() {
        if json {
            serde_json::to_writer(&mut *out, p)?;
            writeln!(out)?;
        } else {
            let c = &p.coordinate;
            write!(
                out,
                "{} {:<24} {:>9.4} {:>10.4} {:>10.3} km  age {:.2} d",
                p.timestamp, c.name, c.latitude_deg, c.longitude_deg, c.altitude_km, p.element_age_days
            )?;
            if let Some(look) = p.look_angle.as_ref() {
                write!(
                    out,
                    "  az {:.1} el {:.1} range {:.1} km",
                    look.azimuth_deg, look.elevation_deg, look.range_km
                )?;
            }
            writeln!(out)?;
        }
    }
    for name in report.decayed.iter() {
        writeln!(out, "{name} has decayed")?;
    }
    Ok(())
}

mod interruptor {
    use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    #[repr(transparent)]
    pub struct Interruptor(Arc<AtomicBool>);

    impl Interruptor {
        pub fn new() -> Self {
            Interruptor(Arc::new(AtomicBool::new(false)))
        }

        pub fn set(&self) {
            self.0.store(true, SeqCst);
        }

        pub fn is_set(&self) -> bool {
            self.0.load(SeqCst)
        }
    }

    impl Default for Interruptor {
        fn default() -> Self {
            Self::new()
        }
    }
}
