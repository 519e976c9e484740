use derive_more::Display;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Serialize)]
pub enum PropagationModel {
    /// SGP4, period below 225 minutes
    #[display(fmt = "SGP4")]
    NearEarth,
    /// SDP4, lunar-solar and resonance terms
    #[display(fmt = "SDP4")]
    DeepSpace,
}

/// Osculating state produced by one propagation call
#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize)]
#[display(
    fmt = "{{t: {} min, model: {}, pos: {}, vel: {}}}",
    "minutes_since_epoch",
    "model",
    "position",
    "velocity"
)]
pub struct OrbitalState {
    /// Signed time from the element set epoch [min]
    pub minutes_since_epoch: f64,

    /// Position, [km], expressed in TEME
    pub position: na::Vector3<f64>,

    /// Velocity, [km/s], expressed in TEME
    pub velocity: na::Vector3<f64>,

    /// True anomaly of the long-period osculating orbit [rad], in [0, 2pi)
    pub true_anomaly: f64,

    pub model: PropagationModel,
}

impl OrbitalState {
    /// Geocentric distance [km]
    pub fn radius_km(&self) -> f64 {
        self.position.norm()
    }

    /// [km/s]
    pub fn speed_km_s(&self) -> f64 {
        self.velocity.norm()
    }
}
