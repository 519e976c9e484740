//! Orbit propagation from two-line element sets to geodetic positions.
//!
//! [`orbit_to_geodetic`] is the single-call entry point: it parses the two
//! element lines, propagates them with SGP4 (or SDP4 for deep-space orbits) to
//! the requested instant and returns the sub-satellite point. All entry points
//! are pure functions of their inputs.

pub extern crate nalgebra as na;

pub use crate::error::{DecayReason, OrbitError, OrbitErrorKind, PropagationError};
pub use crate::sgp4::Sgp4;

pub mod constants;
mod deep_space;
pub mod error;
pub mod frames;
pub mod kepler;
pub mod look_angle;
pub mod sgp4;

use sattypes::prelude::*;
use serde::Serialize;
use tracing::trace;

/// One tracked position fix
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct TrackPoint {
    pub timestamp: EpochTime,
    pub coordinate: GeoCoordinate,
    /// Signed days from the element set epoch to `timestamp`, for judging
    /// how far the elements have been extrapolated
    pub element_age_days: f64,
    pub model: PropagationModel,
    pub look_angle: Option<LookAngle>,
}

/// Propagates parsed elements to an absolute time
pub fn propagate(elements: &TleElements, at: &EpochTime) -> Result<OrbitalState, PropagationError> {
    Sgp4::new(elements)?.propagate_to(at)
}

/// Geodetic position of the object described by `line1`/`line2` at `at`.
///
/// The first failure of parsing, propagation or conversion is returned, there
/// is never a partial result.
pub fn orbit_to_geodetic(
    name: &str,
    line1: &str,
    line2: &str,
    at: &EpochTime,
) -> Result<GeoCoordinate, OrbitError> {
    let elements = tleproto::parse_elements(line1, line2)?;
    let state = propagate(&elements, at)?;
    Ok(frames::to_geodetic(&state, at, name))
}

pub fn orbit_to_geodetic_record(
    record: &TleRecord,
    at: &EpochTime,
) -> Result<GeoCoordinate, OrbitError> {
    orbit_to_geodetic(&record.name, &record.line1, &record.line2, at)
}

/// Position fix with the element age and, given an observer, the look angle
pub fn track(
    record: &TleRecord,
    at: &EpochTime,
    observer: Option<&ObserverSite>,
) -> Result<TrackPoint, OrbitError> {
    let elements = tleproto::parse_record(record)?;
    track_elements(&record.name, &elements, at, observer)
}

/// [`track`] for elements that were already parsed
pub fn track_elements(
    name: &str,
    elements: &TleElements,
    at: &EpochTime,
    observer: Option<&ObserverSite>,
) -> Result<TrackPoint, OrbitError> {
    let state = propagate(elements, at)?;
    let look_angle = observer
        .map(|site| look_angle::look_angle(site, &state, at))
        .transpose()?;
    let coordinate = frames::to_geodetic(&state, at, name);
    trace!(%state, %coordinate, "Tracked");

    Ok(TrackPoint {
        timestamp: *at,
        coordinate,
        element_age_days: at.days_since(&elements.epoch),
        model: state.model,
        look_angle,
    })
}
