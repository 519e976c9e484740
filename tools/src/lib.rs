//! Argument parsing and catalog loading shared by the command-line tools

use chrono::{DateTime, Utc};
use sattypes::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to read TLE file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse TLE file '{}'. {msg}", path.display())]
    Parse { path: PathBuf, msg: String },
    #[error("TLE file '{}' contains no records", .0.display())]
    Empty(PathBuf),
    #[error("No record named '{0}'")]
    NotFound(String),
    #[error("Invalid observer '{0}', expected 'lat,lon,alt_m'")]
    InvalidObserver(String),
    #[error("Invalid time '{0}', expected RFC 3339 (e.g. 2022-11-18T06:00:00Z)")]
    InvalidTime(String),
}

/// Reads every record from a TLE file
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<TleRecord>, ToolError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_owned(),
        source,
    })?;
    let (_, records) = tleproto::parse_tle_set(&text).map_err(|e| ToolError::Parse {
        path: path.to_owned(),
        msg: e.to_string(),
    })?;
    if records.is_empty() {
        return Err(ToolError::Empty(path.to_owned()));
    }
    Ok(records)
}

/// The record named `name`, or the first one
pub fn select_record(
    mut records: Vec<TleRecord>,
    name: Option<&str>,
) -> Result<TleRecord, ToolError> {
    match name {
        Some(name) => {
            let name = name.trim();
            records
                .into_iter()
                .find(|r| r.name == name)
                .ok_or_else(|| ToolError::NotFound(name.to_owned()))
        }
        None if records.is_empty() => Err(ToolError::NotFound(String::new())),
        None => Ok(records.swap_remove(0)),
    }
}

/// Parses `lat,lon,alt_m`, the altitude may be left off
pub fn parse_observer(s: &str) -> Result<ObserverSite, ToolError> {
    let invalid = || ToolError::InvalidObserver(s.to_owned());
    let fields = s
        .split(',')
        .map(|f| f.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| invalid())?;
    match fields[..] {
        [lat, lon] => Ok(ObserverSite::new(lat, lon, 0.0)),
        [lat, lon, alt] => Ok(ObserverSite::new(lat, lon, alt)),
        _ => Err(invalid()),
    }
}

pub fn parse_time(s: &str) -> Result<EpochTime, ToolError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|t| EpochTime::from_utc(t.with_timezone(&Utc)))
        .map_err(|_| ToolError::InvalidTime(s.to_owned()))
}
