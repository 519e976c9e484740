//! Newton-Raphson solutions of Kepler's equation

use crate::{constants::TWO_PI, error::PropagationError};
use std::f64::consts::PI;
use tracing::trace;

/// Iteration stops once the Newton step is below this [rad]
pub const TOLERANCE: f64 = 1.0e-12;

/// A final step larger than this after `MAX_ITERATIONS` is a convergence failure [rad]
pub const ACCEPTANCE: f64 = 1.0e-8;

pub const MAX_ITERATIONS: usize = 10;

/// Newton steps are clamped to this magnitude [rad]
pub const MAX_STEP: f64 = 0.95;

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct KeplerSolution {
    /// Eccentric longitude, E + omega [rad]
    pub eccentric_longitude: f64,
    /// Sine and cosine at the last evaluated iterate
    pub sin: f64,
    pub cos: f64,
    pub iterations: usize,
}

/// Solves the Lyddane form used by SGP4,
/// `U = Ew - axn sin(Ew) + ayn cos(Ew)` with `axn = e cos(w)`, `ayn = e sin(w)`.
pub fn solve(u: f64, axn: f64, ayn: f64) -> Result<KeplerSolution, PropagationError> {
    let mut ew = u;
    let mut sin = 0.0;
    let mut cos = 1.0;
    let mut step = f64::INFINITY;
    let mut iterations = 0;

    while step.abs() >= TOLERANCE && iterations < MAX_ITERATIONS {
        sin = ew.sin();
        cos = ew.cos();
        step = (u - ayn * cos + axn * sin - ew) / (1.0 - cos * axn - sin * ayn);
        if step.abs() >= MAX_STEP {
            step = MAX_STEP.copysign(step);
        }
        ew += step;
        iterations += 1;
    }

    trace!(iterations, step, "Kepler solve");
    if !(step.abs() < ACCEPTANCE) {
        return Err(PropagationError::Convergence {
            iterations,
            correction: step,
        });
    }

    Ok(KeplerSolution {
        eccentric_longitude: ew,
        sin,
        cos,
        iterations,
    })
}

/// Classical form `M = E - e sin(E)`, returns E in [0, 2pi)
pub fn eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> Result<f64, PropagationError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(PropagationError::Range {
            element: "eccentricity",
            value: eccentricity,
        });
    }

    let m = mean_anomaly.rem_euclid(TWO_PI);
    let mut e = if eccentricity > 0.8 { PI } else { m };
    let mut step = f64::INFINITY;
    let mut iterations = 0;

    while step.abs() >= TOLERANCE && iterations < MAX_ITERATIONS {
        step = (m - e + eccentricity * e.sin()) / (1.0 - eccentricity * e.cos());
        if step.abs() >= MAX_STEP {
            step = MAX_STEP.copysign(step);
        }
        e += step;
        iterations += 1;
    }

    if !(step.abs() < ACCEPTANCE) {
        return Err(PropagationError::Convergence {
            iterations,
            correction: step,
        });
    }
    Ok(e.rem_euclid(TWO_PI))
}

/// True anomaly from eccentric anomaly, in [0, 2pi)
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin_half, cos_half) = (eccentric_anomaly / 2.0).sin_cos();
    let nu = 2.0
        * ((1.0 + eccentricity).sqrt() * sin_half).atan2((1.0 - eccentricity).sqrt() * cos_half);
    nu.rem_euclid(TWO_PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn classical_residual() {
        for &e in &[0.0, 0.0007417, 0.1859667, 0.6877146, 0.95] {
            for k in 0..12 {
                let m = k as f64 * 0.5;
                let ea = eccentric_anomaly(m, e).unwrap();
                let residual = (ea - e * ea.sin() - m).rem_euclid(TWO_PI);
                let residual = residual.min(TWO_PI - residual);
                assert!(residual < 1e-10, "e={e} m={m} residual={residual}");
            }
        }
    }

    #[test]
    fn circular_orbit_is_identity() {
        let s = solve(1.234, 0.0, 0.0).unwrap();
        assert_relative_eq!(s.eccentric_longitude, 1.234);
        assert!(s.iterations <= 2);
    }

    #[test]
    fn lyddane_form_satisfied() {
        let e: f64 = 0.6877146;
        let w: f64 = 4.62;
        let (axn, ayn) = (e * w.cos(), e * w.sin());
        let u = 2.0;
        let s = solve(u, axn, ayn).unwrap();
        let ew = s.eccentric_longitude;
        assert_relative_eq!(ew - axn * ew.sin() + ayn * ew.cos(), u, epsilon = 1e-10);
    }

    #[test]
    fn rejects_hyperbolic() {
        assert!(matches!(
            eccentric_anomaly(1.0, 1.0),
            Err(PropagationError::Range { .. })
        ));
    }

    #[test]
    fn iteration_cap_is_reported() {
        // Non-finite input never settles
        assert!(matches!(
            solve(f64::NAN, 0.1, 0.1),
            Err(PropagationError::Convergence { .. })
        ));
    }

    #[test]
    fn anomaly_conversion() {
        assert_relative_eq!(true_anomaly(0.0, 0.5), 0.0);
        assert_relative_eq!(true_anomaly(PI, 0.5), PI);
        // Near-circular orbits barely distinguish the two
        assert_relative_eq!(true_anomaly(1.0, 1e-9), 1.0, epsilon = 1e-8);
    }
}
