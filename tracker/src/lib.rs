//! Keeps a set of tracked objects supplied with fresh element sets and
//! produces position fixes for them on every tick.

use crate::{
    catalog::Catalog,
    config::{Config, ConfigError, Selector},
    source::TleSource,
};
use propagator::{OrbitErrorKind, TrackPoint};
use sattypes::prelude::*;
use tracing::{info, warn};

pub mod catalog;
pub mod config;
pub mod source;

/// Outcome of one [`Tracker::tick`]
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TickReport {
    /// Whether the source was fetched this tick
    pub fetched: bool,
    /// Number of objects whose elements were replaced
    pub refreshed: usize,
    pub points: Vec<TrackPoint>,
    /// Objects dropped from tracking because they decayed
    pub decayed: Vec<String>,
}

pub struct Tracker<S> {
    source: S,
    selectors: Vec<Selector>,
    observer: Option<ObserverSite>,
    catalog: Catalog,
    loaded: bool,
    /// Least time between fetch attempts
    fetch_interval: chrono::Duration,
    last_fetch: Option<EpochTime>,
}

impl<S: TleSource> Tracker<S> {
    pub fn new(config: &Config, source: S) -> Result<Self, ConfigError> {
        let refresh_interval = chrono::Duration::from_std(config.refresh_interval)
            .map_err(|_| ConfigError::IntervalOutOfRange("refresh-interval"))?;
        let max_element_age = config
            .max_element_age
            .map(chrono::Duration::from_std)
            .transpose()
            .map_err(|_| ConfigError::IntervalOutOfRange("max-element-age"))?;
        let fetch_interval = chrono::Duration::from_std(config.fetch_interval())
            .map_err(|_| ConfigError::IntervalOutOfRange("min-fetch-interval"))?;

        Ok(Tracker {
            source,
            selectors: config.selectors()?,
            observer: config.observer_site(),
            catalog: Catalog::new(refresh_interval).with_max_element_age(max_element_age),
            loaded: false,
            fetch_interval,
            last_fetch: None,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn is_selected(&self, record: &TleRecord) -> bool {
        if self.selectors.is_empty() {
            return true;
        }
        let catalog_number = tleproto::catalog_number(&record.line1).unwrap_or(u32::MAX);
        self.selectors
            .iter()
            .any(|s| s.matches(&record.name, catalog_number))
    }

    /// Failed attempts count too, an unavailable source isn't retried every tick
    fn fetch_due(&self, now: &EpochTime) -> bool {
        self.last_fetch
            .map_or(true, |last| *now - last >= self.fetch_interval)
    }

    /// Fetches the catalog and returns the selected records, `None` when the
    /// source or the catalog text is unusable
    fn fetch(&mut self) -> Option<Vec<TleRecord>> {
        let text = match self.source.fetch() {
            Ok(text) => text,
            Err(e) => {
                warn!(err = %e, "TLE fetch failed");
                return None;
            }
        };
        match tleproto::parse_tle_set(&text) {
            Ok((rest, records)) => {
                if !rest.is_empty() {
                    warn!(trailing = rest.len(), "Ignoring unparsed catalog text");
                }
                Some(records.into_iter().filter(|r| self.is_selected(r)).collect())
            }
            Err(e) => {
                warn!(err = %e, "Failed to parse TLE catalog");
                None
            }
        }
    }

    /// Refreshes stale elements (at most one fetch, and none within the fetch
    /// interval of the previous attempt), then computes a fix for every
    /// tracked object.
    ///
    /// Decayed objects are dropped from tracking, any other failure is logged
    /// and the object is kept for the next tick.
    pub fn tick(&mut self, now: EpochTime) -> TickReport {
        let mut report = TickReport::default();

        let stale: Vec<String> = self
            .catalog
            .stale(&now)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if (!self.loaded || !stale.is_empty()) && self.fetch_due(&now) {
            self.last_fetch = Some(now);
            if let Some(records) = self.fetch() {
                report.fetched = true;
                if self.loaded {
                    let records: Vec<TleRecord> = records
                        .into_iter()
                        .filter(|r| stale.contains(&r.name))
                        .collect();
                    report.refreshed = self.catalog.refresh(&records, now);
                    info!(
                        stale = stale.len(),
                        refreshed = report.refreshed,
                        "Refreshed element sets"
                    );
                } else {
                    for record in records {
                        if self.catalog.insert(record, now).is_ok() {
                            report.refreshed += 1;
                        }
                    }
                    self.loaded = true;
                    info!(tracked = self.catalog.len(), "Loaded TLE catalog");
                }
            }
        }

        for obj in self.catalog.iter() {
            match propagator::track_elements(
                obj.name(),
                &obj.elements,
                &now,
                self.observer.as_ref(),
            ) {
                Ok(point) => report.points.push(point),
                Err(e) if e.kind() == OrbitErrorKind::Decay => {
                    warn!(name = obj.name(), err = %e, "Object decayed, no longer tracking");
                    report.decayed.push(obj.name().to_owned());
                }
                Err(e) => {
                    warn!(
                        name = obj.name(),
                        err = %e,
                        retryable = e.is_retryable(),
                        "No position fix"
                    );
                }
            }
        }
        for name in report.decayed.iter() {
            self.catalog.remove(name);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use chrono::TimeZone;
    use indoc::indoc;

    const CATALOG: &str = indoc! {r#"
        ISS (ZARYA)
        1 25544U 98067A   22321.90676521  .00009613  00000+0  17572-3 0  9999
        2 25544  51.6438 295.0836 0006994  86.3588   5.1970 15.50066990369021
        GEO1
        1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991
        2 37481   2.3847  40.6385 0001640  70.7486  43.7146  1.00272292 44578
        DECAYED
        1 99002U 24001A   24001.50000000  .00000000  00000-0  00000-0 0  9999
        2 99002  51.6000 100.0000 0001000  90.0000 270.0000 16.90000000    11
    "#};

    /// Counts fetches, fails when `text` is `None`
    struct Scripted {
        text: Option<String>,
        fetches: usize,
    }

    impl TleSource for Scripted {
        fn fetch(&mut self) -> Result<String, SourceError> {
            self.fetches += 1;
            self.text
                .clone()
                .ok_or_else(|| SourceError::Unavailable("offline".to_owned()))
        }
    }

    fn at(hour: u32) -> EpochTime {
        EpochTime::from_utc(chrono::Utc.with_ymd_and_hms(2022, 11, 18, hour, 0, 0).unwrap())
    }

    fn tracker(config: &str) -> Tracker<Scripted> {
        let cfg = Config::from_str_checked(config).unwrap();
        let source = Scripted {
            text: Some(CATALOG.to_owned()),
            fetches: 0,
        };
        Tracker::new(&cfg, source).unwrap()
    }

    #[test]
    fn first_tick_loads_and_drops_decayed() {
        let mut t = tracker("");
        let report = t.tick(at(0));
        assert!(report.fetched);
        assert_eq!(report.refreshed, 3);
        assert_eq!(report.points.len(), 2);
        assert_eq!(report.decayed, ["DECAYED"]);
        assert_eq!(t.catalog().len(), 2);

        // Nothing is stale, no fetch
        let report = t.tick(at(1));
        assert!(!report.fetched);
        assert_eq!(report.points.len(), 2);
        assert!(report.decayed.is_empty());
        assert_eq!(t.source.fetches, 1);
    }

    #[test]
    fn selection_by_config() {
        let mut t = tracker("[[tracked]]\nid = 25544\n[[tracked]]\nmatches = '^GEO'\n");
        let report = t.tick(at(0));
        let names: Vec<&str> = report.points.iter().map(|p| p.coordinate.name.as_str()).collect();
        assert_eq!(names, ["GEO1", "ISS (ZARYA)"]);
        assert!(report.decayed.is_empty());
    }

    #[test]
    fn stale_objects_refetched_once() {
        let mut t = tracker("refresh-interval = '2h'\n[[tracked]]\nname = 'ISS (ZARYA)'\n");
        t.tick(at(0));
        let report = t.tick(at(2));
        assert!(report.fetched);
        assert_eq!(report.refreshed, 1);
        assert_eq!(t.source.fetches, 2);
        assert_eq!(t.catalog().get("ISS (ZARYA)").unwrap().last_update, at(2));
    }

    #[test]
    fn source_outage_keeps_tracking() {
        let mut t = tracker("refresh-interval = '1h'\n[[tracked]]\nid = 25544\n");
        t.tick(at(0));
        t.source.text = None;
        let report = t.tick(at(3));
        assert!(!report.fetched);
        assert_eq!(report.points.len(), 1);
        assert_eq!(t.catalog().get("ISS (ZARYA)").unwrap().last_update, at(0));
    }

    #[test]
    fn old_elements_are_not_refetched_every_tick() {
        let mut t = tracker("max-element-age = '6h'\n[[tracked]]\nid = 25544\n");
        let start = at(0) + chrono::Duration::days(1);
        for i in 0..10 {
            let report = t.tick(start + chrono::Duration::seconds(5 * i));
            assert_eq!(report.points.len(), 1);
        }
        // The source still serves the same elements, so they stay stale
        assert_eq!(t.source.fetches, 1);
        assert_eq!(t.catalog().stale(&start).len(), 1);

        let report = t.tick(start + chrono::Duration::hours(1));
        assert!(report.fetched);
        assert_eq!(report.refreshed, 1);
        assert_eq!(t.source.fetches, 2);
    }

    #[test]
    fn failed_fetches_are_rate_limited() {
        let mut t = tracker("[[tracked]]\nid = 25544\n");
        t.source.text = None;
        t.tick(at(0));
        t.tick(at(0) + chrono::Duration::minutes(30));
        assert_eq!(t.source.fetches, 1);
        assert!(t.catalog().is_empty());

        t.source.text = Some(CATALOG.to_owned());
        let report = t.tick(at(1));
        assert!(report.fetched);
        assert_eq!(report.points.len(), 1);
        assert_eq!(t.source.fetches, 2);
    }

    #[test]
    fn alpha5_catalog_number_selection() {
        let alpha5 = |line: &str| tleproto::with_checksum(&line[..68].replacen("25544", "T0001", 1));
        let mut lines = CATALOG.lines().skip(1);
        let (line1, line2) = (lines.next().unwrap(), lines.next().unwrap());
        let text = format!("ISS (ZARYA)\n{}\n{}\n", alpha5(line1), alpha5(line2));

        let mut t = tracker("[[tracked]]\nid = 270001\n[[tracked]]\nname = 'GEO1'\n");
        t.source.text = Some(text);
        let report = t.tick(at(0));
        assert_eq!(report.points.len(), 1);
        assert_eq!(report.points[0].coordinate.name, "ISS (ZARYA)");
        assert_eq!(
            t.catalog().get("ISS (ZARYA)").unwrap().elements.catalog_number,
            270_001
        );
    }

    #[test]
    fn observer_look_angles() {
        let mut t = tracker(indoc! {r#"
            [[tracked]]
            id = 25544
            [observer]
            latitude = -45.0
            longitude = 125.0
        "#});
        let report = t.tick(at(0));
        let look = report.points[0].look_angle.unwrap();
        assert!(look.is_visible());
    }
}
