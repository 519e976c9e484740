//! Earth models shared by propagation and coordinate conversion

use std::f64::consts::PI;

pub const TWO_PI: f64 = 2.0 * PI;
pub const TWO_THIRDS: f64 = 2.0 / 3.0;

/// Mean motion conversion, [rev/day] per [rad/min]
pub const REV_PER_DAY_PER_RAD_PER_MIN: f64 = 1440.0 / TWO_PI;

/// Objects whose mean perigee height falls below this are considered decayed [km]
pub const MIN_PERIGEE_ALTITUDE_KM: f64 = 100.0;

/// Perigee height below which the simplified drag model applies [km]
pub const SIMPLIFIED_DRAG_PERIGEE_KM: f64 = 220.0;

/// Earth rotation rate [rad/s]
pub const EARTH_ROTATION_RAD_S: f64 = 7.292115146706979e-5;

/// Julian date of 1949-12-31T00:00:00Z, the SGP4 epoch reference
pub const JD_1950_REFERENCE: f64 = 2433281.5;

/// Julian date of J2000.0
pub const JD_J2000: f64 = 2451545.0;

/// Zonal harmonics and gravitational parameter the element sets were fitted with
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GravityModel {
    /// [km^3/s^2]
    pub mu: f64,
    /// Equatorial radius [km]
    pub radius_km: f64,
    /// sqrt(mu) in earth radii^1.5 per minute
    pub xke: f64,
    /// Minutes per canonical time unit
    pub tumin: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j3oj2: f64,
}

impl GravityModel {
    /// The constants NORAD element sets are generated with
    pub fn wgs72() -> Self {
        Self::from_mu(398600.8, 6378.135, 0.001082616, -0.00000253881, -0.00000165597)
    }

    /// WGS-72 with the truncated `xke` of the original STR#3 code
    pub fn wgs72_old() -> Self {
        let xke = 0.0743669161;
        let j2 = 0.001082616;
        let j3 = -0.00000253881;
        GravityModel {
            mu: 398600.79964,
            radius_km: 6378.135,
            xke,
            tumin: 1.0 / xke,
            j2,
            j3,
            j4: -0.00000165597,
            j3oj2: j3 / j2,
        }
    }

    pub fn wgs84() -> Self {
        Self::from_mu(
            398600.5,
            6378.137,
            0.00108262998905,
            -0.00000253215306,
            -0.00000161098761,
        )
    }

    fn from_mu(mu: f64, radius_km: f64, j2: f64, j3: f64, j4: f64) -> Self {
        let xke = 60.0 / (radius_km * radius_km * radius_km / mu).sqrt();
        GravityModel {
            mu,
            radius_km,
            xke,
            tumin: 1.0 / xke,
            j2,
            j3,
            j4,
            j3oj2: j3 / j2,
        }
    }

    /// Canonical velocity unit [km/s]
    pub fn velocity_unit_km_s(&self) -> f64 {
        self.radius_km * self.xke / 60.0
    }
}

impl Default for GravityModel {
    fn default() -> Self {
        Self::wgs72()
    }
}

/// Reference ellipsoid for geodetic conversion
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Ellipsoid {
    /// [km]
    pub equatorial_radius_km: f64,
    pub flattening: f64,
}

impl Ellipsoid {
    pub const WGS72: Ellipsoid = Ellipsoid {
        equatorial_radius_km: 6378.135,
        flattening: 1.0 / 298.26,
    };

    pub const WGS84: Ellipsoid = Ellipsoid {
        equatorial_radius_km: 6378.137,
        flattening: 1.0 / 298.257223563,
    };

    /// First eccentricity squared
    pub fn e2(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS72
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_constants() {
        let wgs72 = GravityModel::wgs72();
        assert_relative_eq!(wgs72.xke, 0.07436691613317342, epsilon = 1e-15);
        assert_relative_eq!(wgs72.tumin * wgs72.xke, 1.0);
        assert_relative_eq!(wgs72.velocity_unit_km_s(), 7.905370510517634, epsilon = 1e-9);
        assert_relative_eq!(GravityModel::wgs72_old().xke, wgs72.xke, epsilon = 1e-9);
        assert_eq!(GravityModel::default(), wgs72);
        assert_relative_eq!(Ellipsoid::WGS84.e2(), 0.00669437999014, epsilon = 1e-12);
    }
}
