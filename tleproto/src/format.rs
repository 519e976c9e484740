//! Fixed-column encoding of an element set, the inverse of [`crate::parse_elements`]

use crate::{elements::alpha5_letter, with_checksum, ElementsError};
use sattypes::prelude::*;

/// Writes `elements` as element lines 1 and 2, checksums included.
///
/// Zero implied-decimal fields are written `00000-0`. Catalog numbers above
/// 99999 use the Alpha-5 letter prefix.
pub fn format_elements(elements: &TleElements) -> Result<(String, String), ElementsError> {
    let catalog = catalog_number(elements.catalog_number)?;
    if elements.mean_motion_dot.abs() >= 1.0 {
        return Err(ElementsError::Range {
            field: "first derivative of mean motion",
            value: elements.mean_motion_dot,
        });
    }

    let line1 = format!(
        "1 {catalog}{class} {designator:<8} {year:02}{day:012.8} {ndot} {nddot} {bstar} {ephemeris} {set:>4}",
        class = char::from(elements.classification),
        designator = elements.international_designator,
        year = elements.epoch_year.rem_euclid(100),
        day = elements.epoch_day,
        ndot = leading_point(elements.mean_motion_dot),
        nddot = implied_decimal(elements.mean_motion_ddot),
        bstar = implied_decimal(elements.bstar),
        ephemeris = elements.ephemeris_type,
        set = elements.element_set_number % 10_000,
    );
    let line2 = format!(
        "2 {catalog} {incl:8.4} {raan:8.4} {ecc:07} {argp:8.4} {ma:8.4} {n:11.8}{revs:5}",
        incl = elements.inclination_deg,
        raan = elements.raan_deg,
        ecc = (elements.eccentricity * 1e7).round() as u32,
        argp = elements.argument_of_perigee_deg,
        ma = elements.mean_anomaly_deg,
        n = elements.mean_motion,
        revs = elements.revolution_number % 100_000,
    );

    Ok((with_checksum(&line1), with_checksum(&line2)))
}

fn catalog_number(number: u32) -> Result<String, ElementsError> {
    if number < 100_000 {
        return Ok(format!("{number:05}"));
    }
    alpha5_letter(number / 10_000)
        .map(|letter| format!("{letter}{:04}", number % 10_000))
        .ok_or(ElementsError::Range {
            field: "catalog number",
            value: f64::from(number),
        })
}

/// `-.dddddddd` or ` .dddddddd`, magnitude below one
fn leading_point(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { ' ' };
    let digits = format!("{:.8}", value.abs());
    format!("{sign}{}", digits.trim_start_matches('0'))
}

/// Sign, five mantissa digits after an assumed decimal point, then a signed
/// exponent digit, e.g. -0.11606e-4 is "-11606-4"
fn implied_decimal(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { ' ' };
    let magnitude = value.abs();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return " 00000-0".to_string();
    }

    let mut exponent = magnitude.log10().floor() as i32 + 1;
    let mut mantissa = (magnitude / 10f64.powi(exponent) * 1e5).round() as u32;
    if mantissa >= 100_000 {
        mantissa /= 10;
        exponent += 1;
    }
    if mantissa == 0 || exponent < -9 {
        return " 00000-0".to_string();
    }
    // Larger magnitudes aren't representable, saturate
    let exponent = exponent.min(9);
    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{mantissa:05}{exponent_sign}{}", exponent.abs())
}
