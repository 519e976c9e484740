use propagator::look_angle::is_valid_site;
use regex::Regex;
use sattypes::prelude::ObserverSite;
use serde::{Deserialize, Deserializer};
use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config file. {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Tracked entries must contain one of the fields 'id', 'name', or 'matches'")]
    MissingSelector,
    #[error("Tracked entry contains an invalid 'matches' regex '{pattern}'")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Duplicate configuration entry for tracked object (id='{id:?}', name='{name:?}', matches='{matches:?}')")]
    Duplicate {
        id: Option<u32>,
        name: Option<String>,
        matches: Option<String>,
    },
    #[error("'{0}' must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("'{0}' is out of range")]
    IntervalOutOfRange(&'static str),
    #[error("Observer latitude {0} is outside [-90, 90] degrees")]
    InvalidObserver(f64),
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub name: Option<String>,
    /// TLE catalog file, `FORMAT=TLE` layout
    pub catalog: Option<PathBuf>,
    /// Element sets older than this (by last update) are re-fetched
    #[serde(deserialize_with = "human_duration")]
    pub refresh_interval: Duration,
    /// Time between position fixes
    #[serde(deserialize_with = "human_duration")]
    pub position_interval: Duration,
    /// Element sets whose epoch is older than this are also re-fetched, 'none' to disable
    #[serde(deserialize_with = "optional_human_duration")]
    pub max_element_age: Option<Duration>,
    /// Least time between two fetches of the source, capped at `refresh-interval`
    #[serde(deserialize_with = "human_duration")]
    pub min_fetch_interval: Duration,
    /// Objects to track, everything in the catalog when empty
    #[serde(alias = "track")]
    pub tracked: Vec<Tracked>,
    pub observer: Option<Observer>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: None,
            catalog: None,
            refresh_interval: Duration::from_secs(24 * 60 * 60),
            position_interval: Duration::from_secs(5),
            max_element_age: None,
            min_fetch_interval: Duration::from_secs(60 * 60),
            tracked: Vec::new(),
            observer: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_str_checked(&content)
    }

    pub fn from_str_checked(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;

        if cfg.refresh_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("refresh-interval"));
        }
        if cfg.position_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("position-interval"));
        }
        if cfg.max_element_age.map_or(false, |d| d.is_zero()) {
            return Err(ConfigError::ZeroInterval("max-element-age"));
        }
        if cfg.min_fetch_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("min-fetch-interval"));
        }

        let mut entries = HashSet::new();
        for t in cfg.tracked.iter() {
            t.selector()?;
            if !entries.insert(t) {
                return Err(ConfigError::Duplicate {
                    id: t.id,
                    name: t.name.clone(),
                    matches: t.matches.clone(),
                });
            }
        }

        if let Some(site) = cfg.observer_site() {
            if !is_valid_site(&site) {
                return Err(ConfigError::InvalidObserver(site.latitude_deg));
            }
        }

        Ok(cfg)
    }

    /// Fetch rate limit actually applied
    pub fn fetch_interval(&self) -> Duration {
        self.min_fetch_interval.min(self.refresh_interval)
    }

    pub fn selectors(&self) -> Result<Vec<Selector>, ConfigError> {
        self.tracked.iter().map(Tracked::selector).collect()
    }

    pub fn observer_site(&self) -> Option<ObserverSite> {
        self.observer.as_ref().map(ObserverSite::from)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Tracked {
    /// NORAD catalog number
    pub id: Option<u32>,
    pub name: Option<String>,
    /// Regex tried against the name, then the catalog number
    pub matches: Option<String>,
}

impl Tracked {
    pub fn selector(&self) -> Result<Selector, ConfigError> {
        if let Some(id) = self.id {
            Ok(Selector::Id(id))
        } else if let Some(name) = self.name.as_ref() {
            Ok(Selector::Name(name.trim().to_owned()))
        } else if let Some(pattern) = self.matches.as_ref() {
            Regex::new(pattern)
                .map(Selector::Matches)
                .map_err(|source| ConfigError::InvalidRegex {
                    pattern: pattern.clone(),
                    source,
                })
        } else {
            Err(ConfigError::MissingSelector)
        }
    }
}

/// Compiled form of a [`Tracked`] entry
#[derive(Clone, Debug)]
pub enum Selector {
    Id(u32),
    Name(String),
    Matches(Regex),
}

impl Selector {
    pub fn matches(&self, name: &str, catalog_number: u32) -> bool {
        match self {
            Selector::Id(id) => *id == catalog_number,
            Selector::Name(n) => n == name.trim(),
            Selector::Matches(re) => {
                re.is_match(name) || re.is_match(&catalog_number.to_string())
            }
        }
    }
}

/// Ground observer, WGS-84 degrees and meters
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl From<&Observer> for ObserverSite {
    fn from(o: &Observer) -> Self {
        ObserverSite::new(o.latitude, o.longitude, o.altitude)
    }
}

fn human_duration<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let s = String::deserialize(d)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

fn optional_human_duration<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
    let s = String::deserialize(d)?;
    if s.trim().eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        humantime::parse_duration(&s)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
