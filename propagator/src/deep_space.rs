//! Deep-space (SDP4) terms: lunar-solar perturbations and the 12 and 24 hour
//! geopotential resonances, for orbits with periods of 225 minutes and more

use crate::{
    constants::{TWO_PI, TWO_THIRDS},
    sgp4::{MeanElements, SecularRates},
};
use std::f64::consts::PI;

const ZES: f64 = 0.01675;
const ZEL: f64 = 0.05490;
const C1SS: f64 = 2.9864797e-6;
const C1L: f64 = 4.7968065e-7;
const ZSINIS: f64 = 0.39785416;
const ZCOSIS: f64 = 0.91744867;
const ZCOSGS: f64 = 0.1945905;
const ZSINGS: f64 = -0.98088458;
const ZNS: f64 = 1.19459e-5;
const ZNL: f64 = 1.5835218e-4;

/// Earth rotation [rad/min]
const RPTIM: f64 = 4.37526908801129966e-3;

/// Node rate terms are dropped within this of an equatorial orbit [rad]
const NEAR_EQUATORIAL: f64 = 5.2359877e-2;

/// Below this the long-period node/inclination terms use the Lyddane form [rad]
const LYDDANE_INCLINATION: f64 = 0.2;

const Q22: f64 = 1.7891679e-6;
const Q31: f64 = 2.1460748e-6;
const Q33: f64 = 2.2123015e-7;
const ROOT22: f64 = 1.7891679e-6;
const ROOT32: f64 = 3.7393792e-7;
const ROOT44: f64 = 7.3636953e-9;
const ROOT52: f64 = 1.1428639e-7;
const ROOT54: f64 = 2.1765803e-9;

const FASX2: f64 = 0.13130908;
const FASX4: f64 = 2.8843198;
const FASX6: f64 = 0.37448087;
const G22: f64 = 5.7686396;
const G32: f64 = 0.95240898;
const G44: f64 = 1.8014998;
const G52: f64 = 1.0508330;
const G54: f64 = 4.4108898;

/// Resonance integrator step [min]
const STEP: f64 = 720.0;
const STEP2: f64 = STEP * STEP / 2.0;

/// Orbit quantities shared by the solar and lunar coefficient computation
struct OrbitGeometry {
    sinim: f64,
    cosim: f64,
    sinomm: f64,
    cosomm: f64,
    em: f64,
    emsq: f64,
    betasq: f64,
    rtemsq: f64,
    xnoi: f64,
}

/// Third-body coefficients of one perturbing body (sun or moon)
struct BodyTerms {
    s1: f64,
    s2: f64,
    s3: f64,
    s4: f64,
    s5: f64,
    s6: f64,
    s7: f64,
    z1: f64,
    z2: f64,
    z3: f64,
    z11: f64,
    z12: f64,
    z13: f64,
    z21: f64,
    z22: f64,
    z23: f64,
    z31: f64,
    z32: f64,
    z33: f64,
}

impl OrbitGeometry {
    #[allow(clippy::too_many_arguments)]
    fn body_terms(
        &self,
        zcosg: f64,
        zsing: f64,
        zcosi: f64,
        zsini: f64,
        zcosh: f64,
        zsinh: f64,
        cc: f64,
    ) -> BodyTerms {
        let Self {
            sinim,
            cosim,
            sinomm,
            cosomm,
            em,
            emsq,
            betasq,
            rtemsq,
            xnoi,
        } = *self;

        let a1 = zcosg * zcosh + zsing * zcosi * zsinh;
        let a3 = -zsing * zcosh + zcosg * zcosi * zsinh;
        let a7 = -zcosg * zsinh + zsing * zcosi * zcosh;
        let a8 = zsing * zsini;
        let a9 = zsing * zsinh + zcosg * zcosi * zcosh;
        let a10 = zcosg * zsini;
        let a2 = cosim * a7 + sinim * a8;
        let a4 = cosim * a9 + sinim * a10;
        let a5 = -sinim * a7 + cosim * a8;
        let a6 = -sinim * a9 + cosim * a10;

        let x1 = a1 * cosomm + a2 * sinomm;
        let x2 = a3 * cosomm + a4 * sinomm;
        let x3 = -a1 * sinomm + a2 * cosomm;
        let x4 = -a3 * sinomm + a4 * cosomm;
        let x5 = a5 * sinomm;
        let x6 = a6 * sinomm;
        let x7 = a5 * cosomm;
        let x8 = a6 * cosomm;

        let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
        let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
        let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
        let z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * emsq;
        let z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * emsq;
        let z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * emsq;
        let z11 = -6.0 * a1 * a5 + emsq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
        let z12 = -6.0 * (a1 * a6 + a3 * a5)
            + emsq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
        let z13 = -6.0 * a3 * a6 + emsq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
        let z21 = 6.0 * a2 * a5 + emsq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
        let z22 = 6.0 * (a4 * a5 + a2 * a6)
            + emsq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
        let z23 = 6.0 * a4 * a6 + emsq * (24.0 * x2 * x6 - 6.0 * x4 * x8);

        let s3 = cc * xnoi;
        let s2 = -0.5 * s3 / rtemsq;
        let s4 = s3 * rtemsq;

        BodyTerms {
            s1: -15.0 * em * s4,
            s2,
            s3,
            s4,
            s5: x1 * x3 + x2 * x4,
            s6: x2 * x3 + x1 * x4,
            s7: x2 * x4 - x1 * x3,
            z1: z1 + z1 + betasq * z31,
            z2: z2 + z2 + betasq * z32,
            z3: z3 + z3 + betasq * z33,
            z11,
            z12,
            z13,
            z21,
            z22,
            z23,
            z31,
            z32,
            z33,
        }
    }
}

/// Long-period periodic coefficients of one body
#[derive(Copy, Clone, PartialEq, Debug)]
struct Periodics {
    e2: f64,
    e3: f64,
    i2: f64,
    i3: f64,
    l2: f64,
    l3: f64,
    l4: f64,
    gh2: f64,
    gh3: f64,
    gh4: f64,
    h2: f64,
    h3: f64,
    /// Mean anomaly of the body at epoch [rad]
    zm0: f64,
    /// Mean motion of the body [rad/min]
    zn: f64,
    /// Eccentricity of the body's apparent orbit
    ze: f64,
}

/// Sums of the long-period terms at one instant
#[derive(Copy, Clone, Default, Debug)]
struct PeriodicTerms {
    pe: f64,
    pinc: f64,
    pl: f64,
    pgh: f64,
    ph: f64,
}

impl Periodics {
    fn new(b: &BodyTerms, emsq: f64, ze: f64, zm0: f64, zn: f64) -> Self {
        Periodics {
            e2: 2.0 * b.s1 * b.s6,
            e3: 2.0 * b.s1 * b.s7,
            i2: 2.0 * b.s2 * b.z12,
            i3: 2.0 * b.s2 * (b.z13 - b.z11),
            l2: -2.0 * b.s3 * b.z2,
            l3: -2.0 * b.s3 * (b.z3 - b.z1),
            l4: -2.0 * b.s3 * (-21.0 - 9.0 * emsq) * ze,
            gh2: 2.0 * b.s4 * b.z32,
            gh3: 2.0 * b.s4 * (b.z33 - b.z31),
            gh4: -18.0 * b.s4 * ze,
            h2: -2.0 * b.s2 * b.z22,
            h3: -2.0 * b.s2 * (b.z23 - b.z21),
            zm0,
            zn,
            ze,
        }
    }

    fn at(&self, t: f64) -> PeriodicTerms {
        let zm = self.zm0 + self.zn * t;
        let zf = zm + 2.0 * self.ze * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();
        PeriodicTerms {
            pe: self.e2 * f2 + self.e3 * f3,
            pinc: self.i2 * f2 + self.i3 * f3,
            pl: self.l2 * f2 + self.l3 * f3 + self.l4 * sinzf,
            pgh: self.gh2 * f2 + self.gh3 * f3 + self.gh4 * sinzf,
            ph: self.h2 * f2 + self.h3 * f3,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum ResonanceTerms {
    /// One revolution per sidereal day
    Synchronous { del1: f64, del2: f64, del3: f64 },
    /// Two revolutions per day at Molniya eccentricities
    HalfDay {
        d2201: f64,
        d2211: f64,
        d3210: f64,
        d3222: f64,
        d4410: f64,
        d4422: f64,
        d5220: f64,
        d5232: f64,
        d5421: f64,
        d5433: f64,
    },
}

#[derive(Copy, Clone, PartialEq, Debug)]
struct Resonance {
    terms: ResonanceTerms,
    xfact: f64,
    /// Resonance longitude at epoch [rad]
    xlamo: f64,
}

impl ResonanceTerms {
    /// Returns the mean motion rate and its derivative per unit of `xldot`
    fn rates(&self, xli: f64, xomi: f64) -> (f64, f64) {
        match *self {
            ResonanceTerms::Synchronous { del1, del2, del3 } => {
                let xndt = del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin();
                let xnddt = del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos();
                (xndt, xnddt)
            }
            ResonanceTerms::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
            } => {
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                let xndt = d2201 * (x2omi + xli - G22).sin()
                    + d2211 * (xli - G22).sin()
                    + d3210 * (xomi + xli - G32).sin()
                    + d3222 * (-xomi + xli - G32).sin()
                    + d4410 * (x2omi + x2li - G44).sin()
                    + d4422 * (x2li - G44).sin()
                    + d5220 * (xomi + xli - G52).sin()
                    + d5232 * (-xomi + xli - G52).sin()
                    + d5421 * (xomi + x2li - G54).sin()
                    + d5433 * (-xomi + x2li - G54).sin();
                let xnddt = d2201 * (x2omi + xli - G22).cos()
                    + d2211 * (xli - G22).cos()
                    + d3210 * (xomi + xli - G32).cos()
                    + d3222 * (-xomi + xli - G32).cos()
                    + d5220 * (xomi + xli - G52).cos()
                    + d5232 * (-xomi + xli - G52).cos()
                    + 2.0
                        * (d4410 * (x2omi + x2li - G44).cos()
                            + d4422 * (x2li - G44).cos()
                            + d5421 * (xomi + x2li - G54).cos()
                            + d5433 * (-xomi + x2li - G54).cos());
                (xndt, xnddt)
            }
        }
    }
}

/// Deep-space state fixed at initialization
#[derive(Copy, Clone, PartialEq, Debug)]
pub(crate) struct DeepSpace {
    solar: Periodics,
    lunar: Periodics,
    dedt: f64,
    didt: f64,
    dmdt: f64,
    dnodt: f64,
    domdt: f64,
    /// Greenwich sidereal angle at epoch [rad]
    gsto: f64,
    /// Brouwer mean motion at epoch [rad/min]
    no: f64,
    argpo: f64,
    argpdot: f64,
    resonance: Option<Resonance>,
}

impl DeepSpace {
    /// `epoch_days` counts from the 1950 reference epoch, `elements` are the
    /// epoch mean elements with the Brouwer mean motion
    pub(crate) fn new(
        epoch_days: f64,
        elements: &MeanElements,
        rates: &SecularRates,
        gsto: f64,
        xke: f64,
    ) -> Self {
        let (sinim, cosim) = elements.inclination.sin_cos();
        let (snodm, cnodm) = elements.raan.sin_cos();
        let (sinomm, cosomm) = elements.argument_of_perigee.sin_cos();
        let em = elements.eccentricity;
        let nm = elements.mean_motion;
        let emsq = em * em;
        let betasq = 1.0 - emsq;
        let geometry = OrbitGeometry {
            sinim,
            cosim,
            sinomm,
            cosomm,
            em,
            emsq,
            betasq,
            rtemsq: betasq.sqrt(),
            xnoi: 1.0 / nm,
        };

        // Lunar orbit orientation at epoch
        let day = epoch_days + 18261.5;
        let xnodce = (4.5236020 - 9.2422029e-4 * day) % TWO_PI;
        let (stem, ctem) = xnodce.sin_cos();
        let zcosil = 0.91375164 - 0.03568096 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089683511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let gam = 5.8351514 + 0.0019443680 * day;
        let zx = 0.39785416 * stem / zsinil;
        let zy = zcoshl * ctem + 0.91744867 * zsinhl * stem;
        let zx = gam + zx.atan2(zy) - xnodce;
        let (zsingl, zcosgl) = zx.sin_cos();

        let sun = geometry.body_terms(ZCOSGS, ZSINGS, ZCOSIS, ZSINIS, cnodm, snodm, C1SS);
        let moon = geometry.body_terms(
            zcosgl,
            zsingl,
            zcosil,
            zsinil,
            zcoshl * cnodm + zsinhl * snodm,
            snodm * zcoshl - cnodm * zsinhl,
            C1L,
        );

        let zmol = (4.7199672 + 0.22997150 * day - gam) % TWO_PI;
        let zmos = (6.2565837 + 0.017201977 * day) % TWO_PI;

        // Secular lunar-solar rates
        let near_equatorial = elements.inclination < NEAR_EQUATORIAL
            || elements.inclination > PI - NEAR_EQUATORIAL;
        let ses = sun.s1 * ZNS * sun.s5;
        let sis = sun.s2 * ZNS * (sun.z11 + sun.z13);
        let sls = -ZNS * sun.s3 * (sun.z1 + sun.z3 - 14.0 - 6.0 * emsq);
        let sghs = sun.s4 * ZNS * (sun.z31 + sun.z33 - 6.0);
        let mut shs = if near_equatorial {
            0.0
        } else {
            -ZNS * sun.s2 * (sun.z21 + sun.z23)
        };
        if sinim != 0.0 {
            shs /= sinim;
        }
        let sgs = sghs - cosim * shs;

        let dedt = ses + moon.s1 * ZNL * moon.s5;
        let didt = sis + moon.s2 * ZNL * (moon.z11 + moon.z13);
        let dmdt = sls - ZNL * moon.s3 * (moon.z1 + moon.z3 - 14.0 - 6.0 * emsq);
        let sghl = moon.s4 * ZNL * (moon.z31 + moon.z33 - 6.0);
        let shll = if near_equatorial {
            0.0
        } else {
            -ZNL * moon.s2 * (moon.z21 + moon.z23)
        };
        let mut domdt = sgs + sghl;
        let mut dnodt = shs;
        if sinim != 0.0 {
            domdt -= cosim / sinim * shll;
            dnodt += shll / sinim;
        }

        let mut ds = DeepSpace {
            solar: Periodics::new(&sun, emsq, ZES, zmos, ZNS),
            lunar: Periodics::new(&moon, emsq, ZEL, zmol, ZNL),
            dedt,
            didt,
            dmdt,
            dnodt,
            domdt,
            gsto,
            no: nm,
            argpo: elements.argument_of_perigee,
            argpdot: rates.argpdot,
            resonance: None,
        };
        ds.resonance = ds.resonance(elements, rates, xke);
        ds
    }

    fn resonance(
        &self,
        elements: &MeanElements,
        rates: &SecularRates,
        xke: f64,
    ) -> Option<Resonance> {
        let nm = elements.mean_motion;
        let em = elements.eccentricity;
        let emsq = em * em;
        let (sinim, cosim) = elements.inclination.sin_cos();
        let theta = self.gsto % TWO_PI;
        let aonv = (nm / xke).powf(TWO_THIRDS);

        if (8.26e-3..=9.24e-3).contains(&nm) && em >= 0.5 {
            let cosisq = cosim * cosim;
            let eoc = em * emsq;
            let g201 = -0.306 - (em - 0.64) * 0.440;
            let (g211, g310, g322, g410, g422, g520);
            if em <= 0.65 {
                g211 = 3.616 - 13.2470 * em + 16.2900 * emsq;
                g310 = -19.302 + 117.3900 * em - 228.4190 * emsq + 156.5910 * eoc;
                g322 = -18.9068 + 109.7927 * em - 214.6334 * emsq + 146.5816 * eoc;
                g410 = -41.122 + 242.6940 * em - 471.0940 * emsq + 313.9530 * eoc;
                g422 = -146.407 + 841.8800 * em - 1629.014 * emsq + 1083.4350 * eoc;
                g520 = -532.114 + 3017.977 * em - 5740.032 * emsq + 3708.2760 * eoc;
            } else {
                g211 = -72.099 + 331.819 * em - 508.738 * emsq + 266.724 * eoc;
                g310 = -346.844 + 1582.851 * em - 2415.925 * emsq + 1246.113 * eoc;
                g322 = -342.585 + 1554.908 * em - 2366.899 * emsq + 1215.972 * eoc;
                g410 = -1052.797 + 4758.686 * em - 7193.992 * emsq + 3651.957 * eoc;
                g422 = -3581.690 + 16178.110 * em - 24462.770 * emsq + 12422.520 * eoc;
                g520 = if em > 0.715 {
                    -5149.66 + 29936.92 * em - 54087.36 * emsq + 31324.56 * eoc
                } else {
                    1464.74 - 4664.75 * em + 3763.64 * emsq
                };
            }
            let (g533, g521, g532);
            if em < 0.7 {
                g533 = -919.22770 + 4988.6100 * em - 9064.7700 * emsq + 5542.21 * eoc;
                g521 = -822.71072 + 4568.6173 * em - 8491.4146 * emsq + 5337.524 * eoc;
                g532 = -853.66600 + 4690.2500 * em - 8624.7700 * emsq + 5341.4 * eoc;
            } else {
                g533 = -37995.780 + 161616.52 * em - 229838.20 * emsq + 109377.94 * eoc;
                g521 = -51752.104 + 218913.95 * em - 309468.16 * emsq + 146349.42 * eoc;
                g532 = -40023.880 + 170470.89 * em - 242699.48 * emsq + 115605.82 * eoc;
            }

            let sini2 = sinim * sinim;
            let f220 = 0.75 * (1.0 + 2.0 * cosim + cosisq);
            let f221 = 1.5 * sini2;
            let f321 = 1.875 * sinim * (1.0 - 2.0 * cosim - 3.0 * cosisq);
            let f322 = -1.875 * sinim * (1.0 + 2.0 * cosim - 3.0 * cosisq);
            let f441 = 35.0 * sini2 * f220;
            let f442 = 39.3750 * sini2 * sini2;
            let f522 = 9.84375
                * sinim
                * (sini2 * (1.0 - 2.0 * cosim - 5.0 * cosisq)
                    + 0.33333333 * (-2.0 + 4.0 * cosim + 6.0 * cosisq));
            let f523 = sinim
                * (4.92187512 * sini2 * (-2.0 - 4.0 * cosim + 10.0 * cosisq)
                    + 6.56250012 * (1.0 + 2.0 * cosim - 3.0 * cosisq));
            let f542 = 29.53125
                * sinim
                * (2.0 - 8.0 * cosim + cosisq * (-12.0 + 8.0 * cosim + 10.0 * cosisq));
            let f543 = 29.53125
                * sinim
                * (-2.0 - 8.0 * cosim + cosisq * (12.0 + 8.0 * cosim - 10.0 * cosisq));

            let xno2 = nm * nm;
            let ainv2 = aonv * aonv;
            let mut temp1 = 3.0 * xno2 * ainv2;
            let temp = temp1 * ROOT22;
            let d2201 = temp * f220 * g201;
            let d2211 = temp * f221 * g211;
            temp1 *= aonv;
            let temp = temp1 * ROOT32;
            let d3210 = temp * f321 * g310;
            let d3222 = temp * f322 * g322;
            temp1 *= aonv;
            let temp = 2.0 * temp1 * ROOT44;
            let d4410 = temp * f441 * g410;
            let d4422 = temp * f442 * g422;
            temp1 *= aonv;
            let temp = temp1 * ROOT52;
            let d5220 = temp * f522 * g520;
            let d5232 = temp * f523 * g532;
            let temp = 2.0 * temp1 * ROOT54;
            let d5421 = temp * f542 * g521;
            let d5433 = temp * f543 * g533;

            Some(Resonance {
                terms: ResonanceTerms::HalfDay {
                    d2201,
                    d2211,
                    d3210,
                    d3222,
                    d4410,
                    d4422,
                    d5220,
                    d5232,
                    d5421,
                    d5433,
                },
                xfact: rates.mdot + self.dmdt + 2.0 * (rates.nodedot + self.dnodt - RPTIM) - nm,
                xlamo: (elements.mean_anomaly + elements.raan + elements.raan - theta - theta)
                    % TWO_PI,
            })
        } else if nm > 0.0034906585 && nm < 0.0052359877 {
            let g200 = 1.0 + emsq * (-2.5 + 0.8125 * emsq);
            let g310 = 1.0 + 2.0 * emsq;
            let g300 = 1.0 + emsq * (-6.0 + 6.60937 * emsq);
            let f220 = 0.75 * (1.0 + cosim) * (1.0 + cosim);
            let f311 = 0.9375 * sinim * sinim * (1.0 + 3.0 * cosim) - 0.75 * (1.0 + cosim);
            let f330 = 1.875 * (1.0 + cosim).powi(3);
            let del1 = 3.0 * nm * nm * aonv * aonv;
            let xpidot = rates.argpdot + rates.nodedot;

            Some(Resonance {
                terms: ResonanceTerms::Synchronous {
                    del1: del1 * f311 * g310 * Q31 * aonv,
                    del2: 2.0 * del1 * f220 * g200 * Q22,
                    del3: 3.0 * del1 * f330 * g300 * Q33 * aonv,
                },
                xfact: rates.mdot + xpidot - RPTIM + self.dmdt + self.domdt + self.dnodt - nm,
                xlamo: (elements.mean_anomaly + elements.raan + elements.argument_of_perigee
                    - theta)
                    % TWO_PI,
            })
        } else {
            None
        }
    }

    pub(crate) fn is_resonant(&self) -> bool {
        self.resonance.is_some()
    }

    /// Secular lunar-solar drift plus the resonance integration, `mean` holds
    /// the near-earth secular elements at `t` minutes from epoch.
    ///
    /// The resonance integrator always restarts from epoch so the result only
    /// depends on `t`.
    pub(crate) fn secular(&self, t: f64, mean: MeanElements) -> MeanElements {
        let mut out = MeanElements {
            eccentricity: mean.eccentricity + self.dedt * t,
            inclination: mean.inclination + self.didt * t,
            raan: mean.raan + self.dnodt * t,
            argument_of_perigee: mean.argument_of_perigee + self.domdt * t,
            mean_anomaly: mean.mean_anomaly + self.dmdt * t,
            mean_motion: mean.mean_motion,
        };

        let Some(res) = self.resonance else {
            return out;
        };

        let theta = (self.gsto + t * RPTIM) % TWO_PI;
        let delt = if t > 0.0 { STEP } else { -STEP };
        let mut atime = 0.0;
        let mut xni = self.no;
        let mut xli = res.xlamo;

        let (xndt, xldot, xnddt, ft) = loop {
            let (xndt, xnddt) = res.terms.rates(xli, self.argpo + self.argpdot * atime);
            let xldot = xni + res.xfact;
            let xnddt = xnddt * xldot;
            if (t - atime).abs() >= STEP {
                xli += xldot * delt + xndt * STEP2;
                xni += xndt * delt + xnddt * STEP2;
                atime += delt;
            } else {
                break (xndt, xldot, xnddt, t - atime);
            }
        };

        out.mean_motion = xni + xndt * ft + xnddt * ft * ft * 0.5;
        let xl = xli + xldot * ft + xndt * ft * ft * 0.5;
        out.mean_anomaly = match res.terms {
            ResonanceTerms::Synchronous { .. } => {
                xl - out.raan - out.argument_of_perigee + theta
            }
            ResonanceTerms::HalfDay { .. } => xl - 2.0 * out.raan + 2.0 * theta,
        };
        out
    }

    /// Applies the lunar-solar long-period periodics to the secular elements
    pub(crate) fn long_period(&self, t: f64, mean: MeanElements) -> MeanElements {
        let sun = self.solar.at(t);
        let moon = self.lunar.at(t);
        let pe = sun.pe + moon.pe;
        let pinc = sun.pinc + moon.pinc;
        let pl = sun.pl + moon.pl;
        let mut pgh = sun.pgh + moon.pgh;
        let mut ph = sun.ph + moon.ph;

        let inclp = mean.inclination + pinc;
        let ep = mean.eccentricity + pe;
        let (sinip, cosip) = inclp.sin_cos();
        let mut nodep = mean.raan;
        let mut argpp = mean.argument_of_perigee;
        let mut mp = mean.mean_anomaly;

        if inclp >= LYDDANE_INCLINATION {
            ph /= sinip;
            pgh -= cosip * ph;
            argpp += pgh;
            nodep += ph;
            mp += pl;
        } else {
            // Lyddane modification, avoids the 1/sin(i) singularity
            let (sinop, cosop) = nodep.sin_cos();
            let dalf = ph * cosop + pinc * cosip * sinop;
            let dbet = -ph * sinop + pinc * cosip * cosop;
            let alfdp = sinip * sinop + dalf;
            let betdp = sinip * cosop + dbet;
            nodep %= TWO_PI;
            let xls = mp + argpp + cosip * nodep + pl + pgh - pinc * nodep * sinip;
            let xnoh = nodep;
            nodep = alfdp.atan2(betdp);
            if (xnoh - nodep).abs() > PI {
                if nodep < xnoh {
                    nodep += TWO_PI;
                } else {
                    nodep -= TWO_PI;
                }
            }
            mp += pl;
            argpp = xls - mp - cosip * nodep;
        }

        MeanElements {
            eccentricity: ep,
            inclination: inclp,
            raan: nodep,
            argument_of_perigee: argpp,
            mean_anomaly: mp,
            mean_motion: mean.mean_motion,
        }
    }
}
