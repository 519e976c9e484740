use chrono::Duration;
use sattypes::prelude::*;
use std::collections::{btree_map, BTreeMap};
use tleproto::ElementsError;
use tracing::{debug, warn};

/// An object being tracked and the elements currently used for it
#[derive(Clone, PartialEq, Debug)]
pub struct TrackedObject {
    pub record: TleRecord,
    pub elements: TleElements,
    /// When the elements were last fetched
    pub last_update: EpochTime,
}

impl TrackedObject {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Time since the elements were fetched
    pub fn update_age(&self, now: &EpochTime) -> Duration {
        *now - self.last_update
    }

    /// Time since the element set epoch
    pub fn element_age(&self, now: &EpochTime) -> Duration {
        *now - self.elements.epoch
    }
}

/// Tracked objects keyed by name
#[derive(Clone, Debug)]
pub struct Catalog {
    objects: BTreeMap<String, TrackedObject>,
    refresh_interval: Duration,
    max_element_age: Option<Duration>,
}

impl Catalog {
    pub fn new(refresh_interval: Duration) -> Self {
        Catalog {
            objects: BTreeMap::new(),
            refresh_interval,
            max_element_age: None,
        }
    }

    pub fn with_max_element_age(mut self, max_element_age: Option<Duration>) -> Self {
        self.max_element_age = max_element_age;
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TrackedObject> {
        self.objects.get(name)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, TrackedObject> {
        self.objects.values()
    }

    /// Starts tracking `record`, replacing the elements of an object with the
    /// same name. Records that don't parse are rejected and never tracked.
    pub fn insert(
        &mut self,
        record: TleRecord,
        now: EpochTime,
    ) -> Result<Option<TrackedObject>, ElementsError> {
        let elements = tleproto::parse_record(&record).map_err(|e| {
            warn!(name = %record.name, err = %e, "Rejected TLE record");
            e
        })?;
        debug!(name = %record.name, %elements, "Tracking");
        Ok(self.objects.insert(
            record.name.clone(),
            TrackedObject {
                record,
                elements,
                last_update: now,
            },
        ))
    }

    pub fn remove(&mut self, name: &str) -> Option<TrackedObject> {
        self.objects.remove(name)
    }

    pub fn is_stale(&self, obj: &TrackedObject, now: &EpochTime) -> bool {
        obj.update_age(now) >= self.refresh_interval
            || self
                .max_element_age
                .map_or(false, |max| obj.element_age(now) > max)
    }

    /// Names of the objects due for fresh elements
    pub fn stale(&self, now: &EpochTime) -> Vec<&str> {
        self.objects
            .values()
            .filter(|obj| self.is_stale(obj, now))
            .map(TrackedObject::name)
            .collect()
    }

    /// Updates the objects already tracked under the names in `records`,
    /// returning how many were updated. Other records are ignored.
    pub fn refresh(&mut self, records: &[TleRecord], now: EpochTime) -> usize {
        let tracked: Vec<TleRecord> = records
            .iter()
            .filter(|r| self.contains(&r.name))
            .cloned()
            .collect();
        let mut updated = 0;
        for record in tracked {
            if self.insert(record, now).is_ok() {
                updated += 1;
            }
        }
        updated
    }
}
