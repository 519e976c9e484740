use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Geodetic position of a named object
#[derive(Clone, PartialEq, Debug, Display, Serialize)]
#[display(
    fmt = "{{name: {}, lat: {}, lon: {}, alt: {}}}",
    "name",
    "latitude_deg",
    "longitude_deg",
    "altitude_km"
)]
pub struct GeoCoordinate {
    pub name: String,
    /// [deg], [-90, 90]
    pub latitude_deg: f64,
    /// [deg], [-180, 180)
    pub longitude_deg: f64,
    /// Height above the reference ellipsoid [km]
    pub altitude_km: f64,
}

/// Ground observer, WGS-84 geodetic (GPS) coordinates
#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize, Deserialize)]
#[display(
    fmt = "{{lat: {}, lon: {}, alt: {}}}",
    "latitude_deg",
    "longitude_deg",
    "altitude_m"
)]
pub struct ObserverSite {
    /// [deg]
    pub latitude_deg: f64,
    /// [deg]
    pub longitude_deg: f64,
    /// [m]
    pub altitude_m: f64,
}

impl ObserverSite {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }
}

/// Topocentric pointing from an observer to an object
#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize)]
#[display(
    fmt = "{{az: {}, el: {}, range: {}, range_rate: {}}}",
    "azimuth_deg",
    "elevation_deg",
    "range_km",
    "range_rate_km_s"
)]
pub struct LookAngle {
    /// Clockwise from true north [deg], [0, 360)
    pub azimuth_deg: f64,
    /// Above the local horizon [deg], [-90, 90]
    pub elevation_deg: f64,
    /// [km]
    pub range_km: f64,
    /// Positive when receding [km/s]
    pub range_rate_km_s: f64,
}

impl LookAngle {
    pub fn is_visible(&self) -> bool {
        self.elevation_deg > 0.0
    }
}
