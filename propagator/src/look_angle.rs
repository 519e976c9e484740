//! Topocentric azimuth, elevation and range from a ground observer

use crate::{constants::TWO_PI, frames, OrbitError};
use na::{Matrix3, Rotation3, Vector3};
use nav_types::{ECEF, WGS84};
use sattypes::prelude::{EpochTime, LookAngle, ObserverSite, OrbitalState};

/// Observer latitude must lie in [-90, 90] deg
pub fn is_valid_site(site: &ObserverSite) -> bool {
    (-90.0..=90.0).contains(&site.latitude_deg)
        && site.longitude_deg.is_finite()
        && site.altitude_m.is_finite()
}

/// Earth-fixed site position [km]
fn site_ecef_km(site: &ObserverSite) -> Vector3<f64> {
    let wgs = WGS84::from_degrees_and_meters(site.latitude_deg, site.longitude_deg, site.altitude_m);
    let ecef = ECEF::from(wgs);
    Vector3::new(ecef.x(), ecef.y(), ecef.z()) / 1000.0
}

/// Earth-fixed to local east-north-up
fn enu_rotation(site: &ObserverSite) -> Rotation3<f64> {
    let (sin_lat, cos_lat) = site.latitude_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = site.longitude_deg.to_radians().sin_cos();
    Rotation3::from_matrix_unchecked(Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    ))
}

/// Pointing from `site` to the object in `state` at `at`.
///
/// Sites failing [`is_valid_site`] are a range error.
pub fn look_angle(
    site: &ObserverSite,
    state: &OrbitalState,
    at: &EpochTime,
) -> Result<LookAngle, OrbitError> {
    if !is_valid_site(site) {
        return Err(OrbitError::Range {
            field: "observer latitude",
            value: site.latitude_deg,
        });
    }

    let ecef = frames::teme_to_ecef(state, at);
    let rho = ecef.position - site_ecef_km(site);
    let enu = enu_rotation(site) * rho;
    let range_km = rho.norm();

    Ok(LookAngle {
        azimuth_deg: enu.x.atan2(enu.y).rem_euclid(TWO_PI).to_degrees(),
        elevation_deg: enu.z.atan2(enu.x.hypot(enu.y)).to_degrees(),
        range_km,
        range_rate_km_s: rho.dot(&ecef.velocity) / range_km,
    })
}
