//! SGP4 near-earth propagation, switching to SDP4 deep-space terms for
//! periods of 225 minutes and more

use crate::{
    constants::{
        GravityModel, JD_1950_REFERENCE, MIN_PERIGEE_ALTITUDE_KM, SIMPLIFIED_DRAG_PERIGEE_KM,
        TWO_PI, TWO_THIRDS,
    },
    deep_space::DeepSpace,
    error::{DecayReason, PropagationError},
    frames, kepler,
};
use sattypes::prelude::*;
use std::f64::consts::PI;
use tracing::debug;

/// Floor applied to the drag-adjusted mean eccentricity
const MIN_ECCENTRICITY: f64 = 1.0e-6;

/// Below this eccentricity the J3 perigee terms are dropped
const SMALL_ECCENTRICITY: f64 = 1.0e-4;

/// Density function parameter s for perigees above 156 km [km]
const DENSITY_S_KM: f64 = 78.0;
/// Density function parameter q0 [km]
const DENSITY_Q0_KM: f64 = 120.0;

/// Keeps the J3 long-period coefficient finite near 180 deg inclination
const RETROGRADE_GUARD: f64 = 1.5e-12;

/// Mean orbital elements, angles in radians and mean motion in rad/min
#[derive(Copy, Clone, PartialEq, Debug)]
pub(crate) struct MeanElements {
    pub eccentricity: f64,
    pub inclination: f64,
    pub raan: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    pub mean_motion: f64,
}

/// First-order secular rates from J2 and J4 [rad/min]
#[derive(Copy, Clone, PartialEq, Debug)]
pub(crate) struct SecularRates {
    pub mdot: f64,
    pub argpdot: f64,
    pub nodedot: f64,
}

/// Higher-order drag terms, only used when perigee is above 220 km on a
/// near-earth orbit
#[derive(Copy, Clone, PartialEq, Debug)]
struct FullDrag {
    d2: f64,
    d3: f64,
    d4: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
    omgcof: f64,
    xmcof: f64,
    eta: f64,
    delmo: f64,
    sinmao: f64,
}

/// An initialized propagator for one element set.
///
/// Immutable once built; [`Sgp4::propagate`] only reads it, so one instance
/// can be shared between threads.
#[derive(Clone, PartialEq, Debug)]
pub struct Sgp4 {
    catalog_number: u32,
    epoch: EpochTime,
    gravity: GravityModel,
    /// Epoch elements with the Brouwer (un-Kozai) mean motion
    mean: MeanElements,
    rates: SecularRates,
    bstar: f64,
    cc1: f64,
    cc4: f64,
    cc5: f64,
    t2cof: f64,
    nodecf: f64,
    xlcof: f64,
    aycof: f64,
    con41: f64,
    x1mth2: f64,
    x7thm1: f64,
    drag: Option<FullDrag>,
    deep_space: Option<DeepSpace>,
}

impl Sgp4 {
    pub fn new(elements: &TleElements) -> Result<Self, PropagationError> {
        Self::with_gravity_model(elements, GravityModel::default())
    }

    pub fn with_gravity_model(
        elements: &TleElements,
        gravity: GravityModel,
    ) -> Result<Self, PropagationError> {
        let ecco = elements.eccentricity;
        if !(0.0..1.0).contains(&ecco) {
            return Err(PropagationError::Range {
                element: "eccentricity",
                value: ecco,
            });
        }
        if !(elements.mean_motion > 0.0) {
            return Err(PropagationError::Range {
                element: "mean motion",
                value: elements.mean_motion,
            });
        }

        let GravityModel {
            radius_km: re,
            xke,
            j2,
            j4,
            j3oj2,
            ..
        } = gravity;

        let inclo = elements.inclination_deg.to_radians();
        let argpo = elements.argument_of_perigee_deg.to_radians();
        let mo = elements.mean_anomaly_deg.to_radians();
        let no_kozai = elements.mean_motion / crate::constants::REV_PER_DAY_PER_RAD_PER_MIN;

        let eccsq = ecco * ecco;
        let omeosq = 1.0 - eccsq;
        let rteosq = omeosq.sqrt();
        let (sinio, cosio) = inclo.sin_cos();
        let cosio2 = cosio * cosio;

        // Recover the Brouwer mean motion from the Kozai value in the element set
        let ak = (xke / no_kozai).powf(TWO_THIRDS);
        let d1 = 0.75 * j2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
        let del = d1 / (ak * ak);
        let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
        let del = d1 / (adel * adel);
        let no = no_kozai / (1.0 + del);

        let ao = (xke / no).powf(TWO_THIRDS);
        let po = ao * omeosq;
        let con42 = 1.0 - 5.0 * cosio2;
        let con41 = -con42 - cosio2 - cosio2;
        let posq = po * po;
        let rp = ao * (1.0 - ecco);

        let epoch_jd = elements.epoch.julian_date();
        let gsto = frames::gmst(epoch_jd);

        // Atmospheric density parameters, lowered for perigees below 156 km
        let perigee_km = (rp - 1.0) * re;
        let (sfour, qzms24) = if perigee_km < 156.0 {
            let s = if perigee_km < 98.0 {
                20.0
            } else {
                perigee_km - DENSITY_S_KM
            };
            (s / re + 1.0, ((DENSITY_Q0_KM - s) / re).powi(4))
        } else {
            (
                DENSITY_S_KM / re + 1.0,
                ((DENSITY_Q0_KM - DENSITY_S_KM) / re).powi(4),
            )
        };

        let pinvsq = 1.0 / posq;
        let tsi = 1.0 / (ao - sfour);
        let eta = ao * ecco * tsi;
        let etasq = eta * eta;
        let eeta = ecco * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qzms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);
        let cc2 = coef1
            * no
            * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.375 * j2 * tsi / psisq * con41 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let bstar = elements.bstar;
        let cc1 = bstar * cc2;
        let cc3 = if ecco > SMALL_ECCENTRICITY {
            -2.0 * coef * tsi * j3oj2 * no * sinio / ecco
        } else {
            0.0
        };
        let x1mth2 = 1.0 - cosio2;
        let cc4 = 2.0
            * no
            * coef1
            * ao
            * omeosq
            * (eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
                - j2 * tsi / (ao * psisq)
                    * (-3.0 * con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75
                            * x1mth2
                            * (2.0 * etasq - eeta * (1.0 + etasq))
                            * (2.0 * argpo).cos()));
        let cc5 = 2.0 * coef1 * ao * omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

        let cosio4 = cosio2 * cosio2;
        let temp1 = 1.5 * j2 * pinvsq * no;
        let temp2 = 0.5 * temp1 * j2 * pinvsq;
        let temp3 = -0.46875 * j4 * pinvsq * pinvsq * no;
        let xhdot1 = -temp1 * cosio;
        let rates = SecularRates {
            mdot: no
                + 0.5 * temp1 * rteosq * con41
                + 0.0625 * temp2 * rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4),
            argpdot: -0.5 * temp1 * con42
                + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
                + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4),
            nodedot: xhdot1
                + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2))
                    * cosio,
        };

        let mean = MeanElements {
            eccentricity: ecco,
            inclination: inclo,
            raan: elements.raan_deg.to_radians(),
            argument_of_perigee: argpo,
            mean_anomaly: mo,
            mean_motion: no,
        };

        let deep_space = if TWO_PI / no >= DEEP_SPACE_PERIOD_MINUTES {
            Some(DeepSpace::new(
                epoch_jd - JD_1950_REFERENCE,
                &mean,
                &rates,
                gsto,
                xke,
            ))
        } else {
            None
        };

        let simplified = deep_space.is_some() || rp < SIMPLIFIED_DRAG_PERIGEE_KM / re + 1.0;
        let drag = if simplified {
            None
        } else {
            let cc1sq = cc1 * cc1;
            let d2 = 4.0 * ao * tsi * cc1sq;
            let temp = d2 * tsi * cc1 / 3.0;
            let d3 = (17.0 * ao + sfour) * temp;
            let d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * cc1;
            Some(FullDrag {
                d2,
                d3,
                d4,
                t3cof: d2 + 2.0 * cc1sq,
                t4cof: 0.25 * (3.0 * d3 + cc1 * (12.0 * d2 + 10.0 * cc1sq)),
                t5cof: 0.2
                    * (3.0 * d4 + 12.0 * cc1 * d3 + 6.0 * d2 * d2 + 15.0 * cc1sq * (2.0 * d2 + cc1sq)),
                omgcof: bstar * cc3 * argpo.cos(),
                xmcof: if ecco > SMALL_ECCENTRICITY {
                    -TWO_THIRDS * coef * bstar / eeta
                } else {
                    0.0
                },
                eta,
                delmo: (1.0 + eta * mo.cos()).powi(3),
                sinmao: mo.sin(),
            })
        };

        let sgp4 = Sgp4 {
            catalog_number: elements.catalog_number,
            epoch: elements.epoch,
            gravity,
            mean,
            rates,
            bstar,
            cc1,
            cc4,
            cc5,
            t2cof: 1.5 * cc1,
            nodecf: 3.5 * omeosq * xhdot1 * cc1,
            xlcof: j3_long_period_coefficient(j3oj2, sinio, cosio),
            aycof: -0.5 * j3oj2 * sinio,
            con41,
            x1mth2,
            x7thm1: 7.0 * cosio2 - 1.0,
            drag,
            deep_space,
        };

        debug!(
            catalog_number = elements.catalog_number,
            model = %sgp4.model(),
            simplified_drag = simplified,
            resonant = sgp4.deep_space.as_ref().map_or(false, DeepSpace::is_resonant),
            perigee_km,
            "Initialized propagator"
        );

        // Element sets that are already decayed at epoch are refused up front
        sgp4.propagate(0.0)?;
        Ok(sgp4)
    }

    pub fn catalog_number(&self) -> u32 {
        self.catalog_number
    }

    pub fn epoch(&self) -> &EpochTime {
        &self.epoch
    }

    pub fn gravity_model(&self) -> &GravityModel {
        &self.gravity
    }

    pub fn model(&self) -> PropagationModel {
        if self.deep_space.is_some() {
            PropagationModel::DeepSpace
        } else {
            PropagationModel::NearEarth
        }
    }

    /// Brouwer mean motion at epoch [rad/min]
    pub fn mean_motion(&self) -> f64 {
        self.mean.mean_motion
    }

    /// Mean semi-major axis at epoch [km]
    pub fn semi_major_axis_km(&self) -> f64 {
        (self.gravity.xke / self.mean.mean_motion).powf(TWO_THIRDS) * self.gravity.radius_km
    }

    /// Propagates to an absolute time
    pub fn propagate_to(&self, at: &EpochTime) -> Result<OrbitalState, PropagationError> {
        self.propagate(at.minutes_since(&self.epoch))
    }

    /// Propagates `minutes` (signed) from the element set epoch
    pub fn propagate(&self, minutes: f64) -> Result<OrbitalState, PropagationError> {
        let t = minutes;
        let GravityModel {
            radius_km: re,
            xke,
            j2,
            j3oj2,
            ..
        } = self.gravity;
        let decay = |reason| PropagationError::Decay {
            reason,
            minutes_since_epoch: t,
        };

        // Secular gravity and drag
        let xmdf = self.mean.mean_anomaly + self.rates.mdot * t;
        let argpdf = self.mean.argument_of_perigee + self.rates.argpdot * t;
        let nodedf = self.mean.raan + self.rates.nodedot * t;
        let t2 = t * t;
        let mut mean = MeanElements {
            raan: nodedf + self.nodecf * t2,
            argument_of_perigee: argpdf,
            mean_anomaly: xmdf,
            ..self.mean
        };
        let mut tempa = 1.0 - self.cc1 * t;
        let mut tempe = self.bstar * self.cc4 * t;
        let mut templ = self.t2cof * t2;

        if let Some(drag) = &self.drag {
            let delomg = drag.omgcof * t;
            let delm = drag.xmcof * ((1.0 + drag.eta * xmdf.cos()).powi(3) - drag.delmo);
            let temp = delomg + delm;
            mean.mean_anomaly = xmdf + temp;
            mean.argument_of_perigee = argpdf - temp;
            let t3 = t2 * t;
            let t4 = t3 * t;
            tempa -= drag.d2 * t2 + drag.d3 * t3 + drag.d4 * t4;
            tempe += self.bstar * self.cc5 * (mean.mean_anomaly.sin() - drag.sinmao);
            templ += drag.t3cof * t3 + t4 * (drag.t4cof + t * drag.t5cof);
        }

        if let Some(ds) = &self.deep_space {
            mean = ds.secular(t, mean);
        }

        if mean.mean_motion <= 0.0 {
            return Err(decay(DecayReason::MeanMotionCollapse));
        }
        let am = (xke / mean.mean_motion).powf(TWO_THIRDS) * tempa * tempa;
        let nm = xke / am.powf(1.5);
        let em = mean.eccentricity - tempe;
        if em >= 1.0 {
            return Err(PropagationError::Range {
                element: "mean eccentricity",
                value: em,
            });
        }
        if em < -0.001 {
            return Err(decay(DecayReason::EccentricityCollapse(em)));
        }
        let perigee_km = (am * (1.0 - em) - 1.0) * re;
        if perigee_km < MIN_PERIGEE_ALTITUDE_KM {
            return Err(decay(DecayReason::PerigeeBelowMinimum(perigee_km)));
        }
        let em = em.max(MIN_ECCENTRICITY);

        let mm = mean.mean_anomaly + self.mean.mean_motion * templ;
        let xlm = (mm + mean.argument_of_perigee + mean.raan) % TWO_PI;
        let nodem = mean.raan % TWO_PI;
        let argpm = mean.argument_of_perigee % TWO_PI;
        let mut osc = MeanElements {
            eccentricity: em,
            raan: nodem,
            argument_of_perigee: argpm,
            mean_anomaly: (xlm - argpm - nodem) % TWO_PI,
            mean_motion: nm,
            ..mean
        };

        let mut aycof = self.aycof;
        let mut xlcof = self.xlcof;
        if let Some(ds) = &self.deep_space {
            osc = ds.long_period(t, osc);
            if osc.inclination < 0.0 {
                osc.inclination = -osc.inclination;
                osc.raan += PI;
                osc.argument_of_perigee -= PI;
            }
            if !(0.0..=1.0).contains(&osc.eccentricity) {
                return Err(PropagationError::Range {
                    element: "perturbed eccentricity",
                    value: osc.eccentricity,
                });
            }
            let (sinip, cosip) = osc.inclination.sin_cos();
            aycof = -0.5 * j3oj2 * sinip;
            xlcof = j3_long_period_coefficient(j3oj2, sinip, cosip);
        }

        // Long-period periodics
        let ep = osc.eccentricity;
        let axnl = ep * osc.argument_of_perigee.cos();
        let temp = 1.0 / (am * (1.0 - ep * ep));
        let aynl = ep * osc.argument_of_perigee.sin() + temp * aycof;
        let xl = osc.mean_anomaly + osc.argument_of_perigee + osc.raan + temp * xlcof * axnl;

        let u = (xl - osc.raan) % TWO_PI;
        let kepler::KeplerSolution {
            sin: sineo1,
            cos: coseo1,
            ..
        } = kepler::solve(u, axnl, aynl)?;

        // Short-period preliminary quantities
        let ecose = axnl * coseo1 + aynl * sineo1;
        let esine = axnl * sineo1 - aynl * coseo1;
        let el2 = axnl * axnl + aynl * aynl;
        let pl = am * (1.0 - el2);
        if pl < 0.0 {
            return Err(decay(DecayReason::NegativeSemiLatusRectum));
        }
        let rl = am * (1.0 - ecose);
        let rdotl = am.sqrt() * esine / rl;
        let rvdotl = pl.sqrt() / rl;
        let betal = (1.0 - el2).sqrt();
        let temp = esine / (1.0 + betal);
        let sinu = am / rl * (sineo1 - aynl - axnl * temp);
        let cosu = am / rl * (coseo1 - axnl + aynl * temp);
        let su = sinu.atan2(cosu);
        let true_anomaly = (su - aynl.atan2(axnl)).rem_euclid(TWO_PI);
        let sin2u = (cosu + cosu) * sinu;
        let cos2u = 1.0 - 2.0 * sinu * sinu;
        let temp = 1.0 / pl;
        let temp1 = 0.5 * j2 * temp;
        let temp2 = temp1 * temp;

        let (sinip, cosip) = osc.inclination.sin_cos();
        let (con41, x1mth2, x7thm1) = if self.deep_space.is_some() {
            let cosisq = cosip * cosip;
            (3.0 * cosisq - 1.0, 1.0 - cosisq, 7.0 * cosisq - 1.0)
        } else {
            (self.con41, self.x1mth2, self.x7thm1)
        };

        // Short-period periodics
        let mrt = rl * (1.0 - 1.5 * temp2 * betal * con41) + 0.5 * temp1 * x1mth2 * cos2u;
        if mrt < 1.0 {
            return Err(decay(DecayReason::Subsurface(mrt * re)));
        }
        let su = su - 0.25 * temp2 * x7thm1 * sin2u;
        let xnode = osc.raan + 1.5 * temp2 * cosip * sin2u;
        let xinc = osc.inclination + 1.5 * temp2 * cosip * sinip * cos2u;
        let mvt = rdotl - nm * temp1 * x1mth2 * sin2u / xke;
        let rvdot = rvdotl + nm * temp1 * (x1mth2 * cos2u + 1.5 * con41) / xke;

        // Orientation vectors
        let (sinsu, cossu) = su.sin_cos();
        let (snod, cnod) = xnode.sin_cos();
        let (sini, cosi) = xinc.sin_cos();
        let xmx = -snod * cosi;
        let xmy = cnod * cosi;
        let u = Vector3::new(xmx * sinsu + cnod * cossu, xmy * sinsu + snod * cossu, sini * sinsu);
        let v = Vector3::new(xmx * cossu - cnod * sinsu, xmy * cossu - snod * sinsu, sini * cossu);

        Ok(OrbitalState {
            minutes_since_epoch: t,
            position: u * (mrt * re),
            velocity: (u * mvt + v * rvdot) * self.gravity.velocity_unit_km_s(),
            true_anomaly,
            model: self.model(),
        })
    }
}

fn j3_long_period_coefficient(j3oj2: f64, sin_i: f64, cos_i: f64) -> f64 {
    let denominator = if (cos_i + 1.0).abs() > RETROGRADE_GUARD {
        1.0 + cos_i
    } else {
        RETROGRADE_GUARD
    };
    -0.25 * j3oj2 * sin_i * (3.0 + 5.0 * cos_i) / denominator
}
