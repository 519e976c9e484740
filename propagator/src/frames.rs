//! TEME to earth-fixed rotation and geodetic conversion

use crate::constants::{Ellipsoid, EARTH_ROTATION_RAD_S, JD_J2000, TWO_PI};
use na::{Rotation3, Vector3};
use sattypes::prelude::{EpochTime, GeoCoordinate, OrbitalState};

const GEODETIC_MAX_ITERATIONS: usize = 10;
const GEODETIC_TOLERANCE: f64 = 1.0e-10;

/// Earth-fixed position [km] and velocity [km/s]
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EcefState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// Greenwich mean sidereal time (IAU-82) at a UT1 Julian date, [rad] in [0, 2pi)
pub fn gmst(jd: f64) -> f64 {
    let t = (jd - JD_J2000) / 36525.0;
    let seconds = -6.2e-6 * t * t * t
        + 0.093104 * t * t
        + (876600.0 * 3600.0 + 8640184.812866) * t
        + 67310.54841;
    // 240 seconds of time per degree
    (seconds.to_radians() / 240.0).rem_euclid(TWO_PI)
}

/// Rotates a TEME state into the earth-fixed frame at `at`
pub fn teme_to_ecef(state: &OrbitalState, at: &EpochTime) -> EcefState {
    let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), -gmst(at.julian_date()));
    let position = rot * state.position;
    let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RAD_S);
    EcefState {
        position,
        velocity: rot * state.velocity - omega.cross(&position),
    }
}

/// Returns geodetic (latitude [rad], longitude [rad], height [km]).
///
/// Latitude is found iteratively; the height formula stays well-conditioned
/// at the poles.
pub fn ecef_to_geodetic(r: &Vector3<f64>, ellipsoid: &Ellipsoid) -> (f64, f64, f64) {
    let a = ellipsoid.equatorial_radius_km;
    let e2 = ellipsoid.e2();
    let p = r.x.hypot(r.y);
    let longitude = r.y.atan2(r.x);

    let mut latitude = r.z.atan2(p);
    for _ in 0..GEODETIC_MAX_ITERATIONS {
        let previous = latitude;
        let sin_phi = previous.sin();
        let c = 1.0 / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        latitude = (r.z + a * c * e2 * sin_phi).atan2(p);
        if (latitude - previous).abs() < GEODETIC_TOLERANCE {
            break;
        }
    }

    let (sin_phi, cos_phi) = latitude.sin_cos();
    let height = p * cos_phi + r.z * sin_phi - a * (1.0 - e2 * sin_phi * sin_phi).sqrt();
    (latitude, longitude, height)
}

/// Wraps into [-180, 180)
pub fn normalize_longitude_deg(longitude: f64) -> f64 {
    let lon = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if lon >= 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Sub-satellite point on the WGS-72 ellipsoid
pub fn to_geodetic(state: &OrbitalState, at: &EpochTime, name: &str) -> GeoCoordinate {
    to_geodetic_on(state, at, name, &Ellipsoid::default())
}

pub fn to_geodetic_on(
    state: &OrbitalState,
    at: &EpochTime,
    name: &str,
    ellipsoid: &Ellipsoid,
) -> GeoCoordinate {
    let ecef = teme_to_ecef(state, at);
    let (lat, lon, alt) = ecef_to_geodetic(&ecef.position, ellipsoid);
    GeoCoordinate {
        name: name.to_string(),
        latitude_deg: lat.to_degrees().clamp(-90.0, 90.0),
        longitude_deg: normalize_longitude_deg(lon.to_degrees()),
        altitude_km: alt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use sattypes::prelude::PropagationModel;

    fn state_at(position: Vector3<f64>) -> OrbitalState {
        OrbitalState {
            minutes_since_epoch: 0.0,
            position,
            velocity: Vector3::zeros(),
            true_anomaly: 0.0,
            model: PropagationModel::NearEarth,
        }
    }

    #[test]
    fn sidereal_time_at_j2000() {
        assert_relative_eq!(gmst(JD_J2000).to_degrees(), 280.46061837, epsilon = 1e-8);
        // One solar day later the earth has turned a little more than once
        let advance = (gmst(JD_J2000 + 1.0) - gmst(JD_J2000)).rem_euclid(TWO_PI);
        assert_relative_eq!(advance.to_degrees(), 0.9856473, epsilon = 1e-6);
    }

    #[test]
    fn longitude_wrapping() {
        assert_eq!(normalize_longitude_deg(180.0), -180.0);
        assert_eq!(normalize_longitude_deg(-180.0), -180.0);
        assert_eq!(normalize_longitude_deg(540.0), -180.0);
        assert_relative_eq!(normalize_longitude_deg(359.0), -1.0);
        assert_relative_eq!(normalize_longitude_deg(-190.5), 169.5);
        assert_relative_eq!(normalize_longitude_deg(12.25), 12.25);
    }

    #[test]
    fn surface_points() {
        let e = Ellipsoid::WGS72;
        let a = e.equatorial_radius_km;
        let (lat, lon, h) = ecef_to_geodetic(&Vector3::new(a + 400.0, 0.0, 0.0), &e);
        assert_abs_diff_eq!(lat, 0.0);
        assert_abs_diff_eq!(lon, 0.0);
        assert_relative_eq!(h, 400.0, epsilon = 1e-9);

        let b = a * (1.0 - e.flattening);
        let (lat, _, h) = ecef_to_geodetic(&Vector3::new(0.0, 0.0, -b - 35.0), &e);
        assert_relative_eq!(lat.to_degrees(), -90.0, epsilon = 1e-9);
        assert_relative_eq!(h, 35.0, epsilon = 1e-6);
    }

    #[test]
    fn earth_fixed_velocity_of_a_stationary_point() {
        // A point at rest in the earth-fixed frame moves eastward in TEME
        let at = EpochTime::from_julian_date(JD_J2000).unwrap();
        let theta = gmst(JD_J2000);
        let r = 42164.0;
        let position = Vector3::new(r * theta.cos(), r * theta.sin(), 0.0);
        let velocity = Vector3::new(-theta.sin(), theta.cos(), 0.0) * (r * EARTH_ROTATION_RAD_S);
        let state = OrbitalState {
            velocity,
            ..state_at(position)
        };
        let ecef = teme_to_ecef(&state, &at);
        assert_relative_eq!(ecef.position, Vector3::new(r, 0.0, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.velocity.norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn conversion_is_repeatable() {
        let at = EpochTime::from_julian_date(2458827.362605).unwrap();
        let state = state_at(Vector3::new(-6102.44325, -986.33192, -2820.31316));
        let a = to_geodetic(&state, &at, "ISS");
        let b = to_geodetic(&state, &at, "ISS");
        assert_eq!(a, b);
        assert_eq!(a.name, "ISS");
    }
}
