//! Reference vectors from the SGP4 verification suite and published ISS fixes

use approx::assert_abs_diff_eq;
use chrono::{TimeZone, Utc};
use propagator::{
    constants::GravityModel, kepler, orbit_to_geodetic, orbit_to_geodetic_record, track,
    DecayReason, OrbitError, OrbitErrorKind, PropagationError, Sgp4,
};
use sattypes::prelude::*;

const VERIFICATION: &str = include_str!("../test_fixtures/verification.txt");

const POSITION_TOLERANCE_KM: f64 = 1e-3;
const VELOCITY_TOLERANCE_KM_S: f64 = 1e-6;

const ISS_2022: (&str, &str) = (
    "1 25544U 98067A   22321.90676521  .00009613  00000+0  17572-3 0  9999",
    "2 25544  51.6438 295.0836 0006994  86.3588   5.1970 15.50066990369021",
);

const GEO: (&str, &str) = (
    "1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991",
    "2 37481   2.3847  40.6385 0001640  70.7486  43.7146  1.00272292 44578",
);

/// High drag, decays within a week
const REENTRY: (&str, &str) = (
    "1 99001U 24001A   24001.50000000  .00500000  00000-0  10000-2 0  9996",
    "2 99001  51.6000 100.0000 0010000  90.0000 270.0000 16.30000000    14",
);

/// Mean perigee below 100 km at epoch
const DECAYED: (&str, &str) = (
    "1 99002U 24001A   24001.50000000  .00000000  00000-0  00000-0 0  9999",
    "2 99002  51.6000 100.0000 0001000  90.0000 270.0000 16.90000000    11",
);

fn records() -> Vec<TleRecord> {
    let (rest, records) = tleproto::parse_tle_set(VERIFICATION).unwrap();
    assert!(rest.is_empty());
    records
}

fn record(name: &str) -> TleRecord {
    records().into_iter().find(|r| r.name == name).unwrap()
}

fn sgp4(name: &str) -> Sgp4 {
    Sgp4::new(&tleproto::parse_record(&record(name)).unwrap()).unwrap()
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> EpochTime {
    EpochTime::from_utc(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
}

fn assert_state(state: &OrbitalState, r: [f64; 3], v: Option<[f64; 3]>) {
    assert_abs_diff_eq!(state.position, Vector3::from(r), epsilon = POSITION_TOLERANCE_KM);
    if let Some(v) = v {
        assert_abs_diff_eq!(state.velocity, Vector3::from(v), epsilon = VELOCITY_TOLERANCE_KM_S);
    }
}

#[test]
fn near_earth_vanguard() {
    let s = sgp4("00005");
    assert_eq!(s.model(), PropagationModel::NearEarth);

    let cases = [
        (
            0.0,
            [7022.46529266, -1400.08296755, 0.03995155],
            Some([1.893841015, 6.405893759, 4.534807250]),
        ),
        (
            360.0,
            [-7154.03120202, -3783.17682504, -3536.19412294],
            Some([4.741887409, -4.151817765, -2.093935425]),
        ),
        (
            720.0,
            [-7134.59340119, 6531.68641334, 3260.27186483],
            Some([-4.113793027, -2.911922039, -2.557327851]),
        ),
        (1440.0, [-938.55923943, -6268.18748831, -4294.02924751], None),
    ];
    for (t, r, v) in cases {
        assert_state(&s.propagate(t).unwrap(), r, v);
    }
}

#[test]
fn deep_space_half_day_resonance() {
    let s = sgp4("08195");
    assert_eq!(s.model(), PropagationModel::DeepSpace);

    assert_state(
        &s.propagate(0.0).unwrap(),
        [2349.89483350, -14785.93811562, 0.02119378],
        Some([2.721488096, -3.256811655, 4.498416672]),
    );
    assert_state(
        &s.propagate(120.0).unwrap(),
        [15223.91713658, -17852.95881713, 25280.39558224],
        None,
    );
    assert_state(
        &s.propagate(1440.0).unwrap(),
        [2890.80638268, -15446.43952300, 948.77010176],
        None,
    );

    let s = sgp4("09880");
    assert_state(
        &s.propagate(0.0).unwrap(),
        [13020.0675078, -2449.0719350, 1.1589603],
        None,
    );
}

#[test]
fn deep_space_synchronous_resonance() {
    let s = sgp4("28626");
    assert_eq!(s.model(), PropagationModel::DeepSpace);

    assert_state(
        &s.propagate(0.0).unwrap(),
        [42080.71852213, -2646.86387436, 0.81851294],
        Some([0.193105177, 3.068688251, 0.000438449]),
    );
    assert_state(
        &s.propagate(1440.0).unwrap(),
        [42119.96263499, -1925.77567263, -0.19827433],
        Some([0.140521206, 3.071541613, 0.000179561]),
    );
}

#[test]
fn published_iss_vector() {
    let iss = record("ISS (ZARYA)");
    let at = EpochTime::from_julian_date(2458827.362605).unwrap();
    let state = propagator::propagate(&tleproto::parse_record(&iss).unwrap(), &at).unwrap();

    // Published reference, within the usual cross-validation tolerance
    assert_abs_diff_eq!(
        state.position,
        Vector3::new(-6102.443276, -986.332016, -2820.313071),
        epsilon = 1e-3
    );
    assert_state(
        &state,
        [-6102.44325, -986.33192, -2820.31316],
        Some([-1.45525286, -5.52741386, 5.10104197]),
    );

    let fix = orbit_to_geodetic_record(&iss, &at).unwrap();
    assert_eq!(fix.name, "ISS (ZARYA)");
    assert_abs_diff_eq!(fix.latitude_deg, -24.6610, epsilon = 1e-4);
    assert_abs_diff_eq!(fix.longitude_deg, 160.3413, epsilon = 1e-4);
    assert_abs_diff_eq!(fix.altitude_km, 420.18, epsilon = 1e-2);
}

#[test]
fn geodetic_fixes() {
    let at = utc(2022, 11, 18, 0, 0);
    let fix = orbit_to_geodetic("ISS (ZARYA)", ISS_2022.0, ISS_2022.1, &at).unwrap();
    assert_abs_diff_eq!(fix.latitude_deg, -48.46942, epsilon = 1e-4);
    assert_abs_diff_eq!(fix.longitude_deg, 120.28777, epsilon = 1e-4);
    assert_abs_diff_eq!(fix.altitude_km, 437.592, epsilon = 1e-2);

    let at = utc(2022, 11, 18, 6, 0);
    let fix = orbit_to_geodetic("ISS (ZARYA)", ISS_2022.0, ISS_2022.1, &at).unwrap();
    assert_abs_diff_eq!(fix.latitude_deg, -21.95651, epsilon = 1e-4);
    assert_abs_diff_eq!(fix.longitude_deg, -15.39014, epsilon = 1e-4);
    assert_abs_diff_eq!(fix.altitude_km, 424.974, epsilon = 1e-2);
}

#[test]
fn epoch_state_matches_keplerian_orbit() {
    let gravity = GravityModel::default();
    for record in records() {
        let elements = tleproto::parse_record(&record).unwrap();
        let s = Sgp4::new(&elements).unwrap();
        let state = s.propagate(0.0).unwrap();

        let a = (gravity.xke / s.mean_motion()).powf(2.0 / 3.0) * gravity.radius_km;
        let e = elements.eccentricity;
        let ea = kepler::eccentric_anomaly(elements.mean_anomaly_deg.to_radians(), e).unwrap();
        let radius = a * (1.0 - e * ea.cos());

        let relative = (radius - state.radius_km()).abs() / state.radius_km();
        assert!(relative < 0.01, "{}: {relative}", record.name);
    }
}

#[test]
fn output_ranges_over_a_sweep() {
    let mut lines: Vec<(String, String)> = records()
        .into_iter()
        .map(|r| (r.line1, r.line2))
        .collect();
    lines.push((ISS_2022.0.into(), ISS_2022.1.into()));
    lines.push((GEO.0.into(), GEO.1.into()));

    for (line1, line2) in &lines {
        let epoch = tleproto::parse_elements(line1, line2).unwrap().epoch;
        for k in -20..=60 {
            let at = epoch + chrono::Duration::minutes(k * 97);
            let fix = orbit_to_geodetic("sweep", line1, line2, &at).unwrap();
            assert!((-180.0..180.0).contains(&fix.longitude_deg), "{fix}");
            assert!((-90.0..=90.0).contains(&fix.latitude_deg), "{fix}");
            assert!(fix.altitude_km.is_finite() && fix.altitude_km >= 0.0, "{fix}");
        }
    }
}

#[test]
fn geostationary_station_keeping() {
    let epoch = tleproto::parse_elements(GEO.0, GEO.1).unwrap().epoch;
    for k in -10..=100 {
        let at = epoch + chrono::Duration::minutes(k * 144);
        let fix = orbit_to_geodetic("GEO1", GEO.0, GEO.1, &at).unwrap();
        assert!(fix.latitude_deg.abs() < 2.5, "{fix}");
        assert!((65.6..65.9).contains(&fix.longitude_deg), "{fix}");
        assert!((35770.0..35800.0).contains(&fix.altitude_km), "{fix}");
    }
}

#[test]
fn decay_is_reported() {
    let elements = tleproto::parse_elements(REENTRY.0, REENTRY.1).unwrap();
    let s = Sgp4::new(&elements).unwrap();
    assert!(s.propagate(2880.0).is_ok());
    assert!(matches!(
        s.propagate(10080.0),
        Err(PropagationError::Decay {
            reason: DecayReason::EccentricityCollapse(_),
            ..
        })
    ));

    let elements = tleproto::parse_elements(DECAYED.0, DECAYED.1).unwrap();
    assert!(matches!(
        Sgp4::new(&elements),
        Err(PropagationError::Decay {
            reason: DecayReason::PerigeeBelowMinimum(h),
            ..
        }) if h < 100.0
    ));

    let err = orbit_to_geodetic("DECAYED", DECAYED.0, DECAYED.1, &elements.epoch).unwrap_err();
    assert_eq!(err.kind(), OrbitErrorKind::Decay);
    assert!(err.is_permanent());
}

#[test]
fn corrupted_line_is_refused() {
    // 22321.90676521 -> 22321.90676522
    let line1 = ISS_2022.0.replacen("90676521", "90676522", 1);
    let err = orbit_to_geodetic("ISS", &line1, ISS_2022.1, &EpochTime::now()).unwrap_err();
    assert_eq!(
        err,
        OrbitError::Checksum {
            line: 1,
            expected: 9,
            computed: 0
        }
    );
}

#[test]
fn track_reports_age_and_look_angle() {
    let iss = TleRecord::new("ISS (ZARYA)", ISS_2022.0, ISS_2022.1);
    let at = utc(2022, 11, 18, 0, 0);
    let observer = ObserverSite::new(-45.0, 125.0, 100.0);

    let point = track(&iss, &at, Some(&observer)).unwrap();
    assert_eq!(point.timestamp, at);
    assert_eq!(point.model, PropagationModel::NearEarth);
    assert_abs_diff_eq!(point.element_age_days, 134.25809763 / 1440.0, epsilon = 1e-8);
    let look = point.look_angle.unwrap();
    // A few hundred km from the sub-satellite point, well above the horizon
    assert!(look.elevation_deg > 20.0, "{look}");
    assert!(look.range_km < 1500.0, "{look}");

    assert!(track(&iss, &at, None).unwrap().look_angle.is_none());

    let bad_site = ObserverSite::new(95.0, 0.0, 0.0);
    assert!(matches!(
        track(&iss, &at, Some(&bad_site)),
        Err(OrbitError::Range {
            field: "observer latitude",
            ..
        })
    ));
}
