pub use crate::elements::{Classification, TleElements, DEEP_SPACE_PERIOD_MINUTES};
pub use crate::geo::{GeoCoordinate, LookAngle, ObserverSite};
pub use crate::state::{OrbitalState, PropagationModel};
pub use crate::time::{EpochTime, UtcTimestamp, JD_UNIX_EPOCH, MINUTES_PER_DAY, SECONDS_PER_DAY};
pub use crate::tle::TleRecord;

pub type Vector3 = na::Vector3<f64>;
