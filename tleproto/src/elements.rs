//! Fixed-column decoding of a single element set

use crate::{checksum::checksum, LINE_LENGTH, TWO_DIGIT_YEAR_PIVOT};
use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{all_consuming, opt, recognize},
    sequence::{pair, tuple},
    IResult,
};
use sattypes::prelude::*;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ElementsError {
    #[error("TLE line {line} is malformed: {reason}")]
    Format { line: u8, reason: String },
    #[error("TLE line {line} checksum mismatch (expected {expected}, computed {computed})")]
    Checksum { line: u8, expected: u8, computed: u8 },
    #[error("TLE {field} out of range: {value}")]
    Range { field: &'static str, value: f64 },
}

/// Column span of one field, 1-indexed and inclusive as in the format documentation
#[derive(Copy, Clone, Debug)]
struct Field {
    line: u8,
    name: &'static str,
    first: usize,
    last: usize,
}

impl Field {
    const fn new(line: u8, name: &'static str, first: usize, last: usize) -> Self {
        Field {
            line,
            name,
            first,
            last,
        }
    }

    /// Lines are checked to be 69 ASCII columns before any field is read
    fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.first - 1..self.last]
    }

    fn invalid(&self, text: &str) -> ElementsError {
        ElementsError::Format {
            line: self.line,
            reason: format!(
                "{} (columns {}-{}) has invalid content '{}'",
                self.name, self.first, self.last, text
            ),
        }
    }
}

const CATALOG_NUMBER_1: Field = Field::new(1, "catalog number", 3, 7);
const CLASSIFICATION: Field = Field::new(1, "classification", 8, 8);
const INTERNATIONAL_DESIGNATOR: Field = Field::new(1, "international designator", 10, 17);
const EPOCH_YEAR: Field = Field::new(1, "epoch year", 19, 20);
const EPOCH_DAY: Field = Field::new(1, "epoch day", 21, 32);
const MEAN_MOTION_DOT: Field = Field::new(1, "first derivative of mean motion", 34, 43);
const MEAN_MOTION_DDOT: Field = Field::new(1, "second derivative of mean motion", 45, 52);
const BSTAR: Field = Field::new(1, "drag term", 54, 61);
const EPHEMERIS_TYPE: Field = Field::new(1, "ephemeris type", 63, 63);
const ELEMENT_SET_NUMBER: Field = Field::new(1, "element set number", 65, 68);

const CATALOG_NUMBER_2: Field = Field::new(2, "catalog number", 3, 7);
const INCLINATION: Field = Field::new(2, "inclination", 9, 16);
const RAAN: Field = Field::new(2, "right ascension of the ascending node", 18, 25);
const ECCENTRICITY: Field = Field::new(2, "eccentricity", 27, 33);
const ARGUMENT_OF_PERIGEE: Field = Field::new(2, "argument of perigee", 35, 42);
const MEAN_ANOMALY: Field = Field::new(2, "mean anomaly", 44, 51);
const MEAN_MOTION: Field = Field::new(2, "mean motion", 53, 63);
const REVOLUTION_NUMBER: Field = Field::new(2, "revolution number", 64, 68);

pub fn parse_record(record: &TleRecord) -> Result<TleElements, ElementsError> {
    parse_elements(&record.line1, &record.line2)
}

/// Decodes and validates one element set.
///
/// Surrounding whitespace (including a trailing CR) is ignored, the remaining
/// text must be exactly 69 ASCII columns per line with a matching checksum.
pub fn parse_elements(line1: &str, line2: &str) -> Result<TleElements, ElementsError> {
    let l1 = checked_line(line1, 1)?;
    let l2 = checked_line(line2, 2)?;

    let catalog_number = decode_catalog_number(CATALOG_NUMBER_1, l1)?;
    let catalog_number_2 = decode_catalog_number(CATALOG_NUMBER_2, l2)?;
    if catalog_number != catalog_number_2 {
        return Err(ElementsError::Format {
            line: 2,
            reason: format!(
                "catalog number {catalog_number_2} doesn't match line 1 catalog number {catalog_number}"
            ),
        });
    }

    let classification = CLASSIFICATION
        .text(l1)
        .chars()
        .next()
        .map(Classification::from)
        .unwrap_or(Classification::Unclassified);
    let international_designator = INTERNATIONAL_DESIGNATOR.text(l1).trim().to_string();

    let two_digit_year = unsigned(EPOCH_YEAR, l1, false)? as i32;
    let epoch_year = if two_digit_year >= TWO_DIGIT_YEAR_PIVOT {
        1900 + two_digit_year
    } else {
        2000 + two_digit_year
    };
    let epoch_day = decimal(EPOCH_DAY, l1)?;
    let epoch = EpochTime::from_year_and_day(epoch_year, epoch_day).ok_or(ElementsError::Range {
        field: EPOCH_DAY.name,
        value: epoch_day,
    })?;

    let mean_motion_dot = decimal(MEAN_MOTION_DOT, l1)?;
    let mean_motion_ddot = implied_decimal(MEAN_MOTION_DDOT, l1)?;
    let bstar = implied_decimal(BSTAR, l1)?;
    let ephemeris_type = unsigned(EPHEMERIS_TYPE, l1, true)? as u8;
    let element_set_number = unsigned(ELEMENT_SET_NUMBER, l1, true)?;

    let inclination_deg = decimal(INCLINATION, l2)?;
    let raan_deg = decimal(RAAN, l2)?;
    let eccentricity = decode_eccentricity(l2)?;
    let argument_of_perigee_deg = decimal(ARGUMENT_OF_PERIGEE, l2)?;
    let mean_anomaly_deg = decimal(MEAN_ANOMALY, l2)?;
    let mean_motion = decimal(MEAN_MOTION, l2)?;
    let revolution_number = unsigned(REVOLUTION_NUMBER, l2, true)?;

    if !(0.0..1.0).contains(&eccentricity) {
        return Err(ElementsError::Range {
            field: ECCENTRICITY.name,
            value: eccentricity,
        });
    }
    if !(0.0..=180.0).contains(&inclination_deg) {
        return Err(ElementsError::Range {
            field: INCLINATION.name,
            value: inclination_deg,
        });
    }
    if mean_motion <= 0.0 {
        return Err(ElementsError::Range {
            field: MEAN_MOTION.name,
            value: mean_motion,
        });
    }

    let elements = TleElements {
        catalog_number,
        classification,
        international_designator,
        epoch_year,
        epoch_day,
        epoch,
        mean_motion_dot,
        mean_motion_ddot,
        bstar,
        ephemeris_type,
        element_set_number,
        inclination_deg,
        raan_deg,
        eccentricity,
        argument_of_perigee_deg,
        mean_anomaly_deg,
        mean_motion,
        revolution_number,
    };
    trace!(%elements, "Decoded element set");
    Ok(elements)
}

/// Catalog number from the first element line alone, without checking the
/// rest of the line. Accepts plain and Alpha-5 numbers.
pub fn catalog_number(line1: &str) -> Option<u32> {
    let line = line1.trim();
    if !line.is_ascii() || line.len() < CATALOG_NUMBER_1.last {
        return None;
    }
    decode_catalog_number(CATALOG_NUMBER_1, line).ok()
}

/// Structural checks shared by both lines, returns the trimmed line
fn checked_line(raw: &str, number: u8) -> Result<&str, ElementsError> {
    let malformed = |reason: String| ElementsError::Format {
        line: number,
        reason,
    };

    let line = raw.trim();
    if !line.is_ascii() {
        return Err(malformed("contains non-ASCII characters".to_string()));
    }
    if line.len() != LINE_LENGTH {
        return Err(malformed(format!(
            "expected {LINE_LENGTH} columns, found {}",
            line.len()
        )));
    }

    let bytes = line.as_bytes();
    if bytes[0] != b'0' + number {
        return Err(malformed(format!(
            "expected line number '{number}' in column 1, found '{}'",
            char::from(bytes[0])
        )));
    }
    if bytes[1] != b' ' {
        return Err(malformed("column 2 must be blank".to_string()));
    }

    let last = bytes[LINE_LENGTH - 1];
    if !last.is_ascii_digit() {
        return Err(malformed(format!(
            "checksum column holds '{}'",
            char::from(last)
        )));
    }
    let expected = last - b'0';
    let computed = checksum(line);
    if expected != computed {
        return Err(ElementsError::Checksum {
            line: number,
            expected,
            computed,
        });
    }

    Ok(line)
}

/// Plain or Alpha-5 catalog number; letters skip I and O, so 'A' is 10 and 'Z' is 33
fn decode_catalog_number(field: Field, line: &str) -> Result<u32, ElementsError> {
    let raw = field.text(line);
    let text = raw.trim();
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            let rest = chars.as_str();
            let prefix = alpha5_value(c).ok_or_else(|| field.invalid(raw))?;
            if rest.len() != 4 || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(field.invalid(raw));
            }
            let low: u32 = rest.parse().map_err(|_| field.invalid(raw))?;
            Ok(prefix * 10_000 + low)
        }
        _ => unsigned(field, line, false),
    }
}

fn alpha5_value(c: char) -> Option<u32> {
    match c {
        'I' | 'O' => None,
        'A'..='H' => Some(10 + (c as u32 - 'A' as u32)),
        'J'..='N' => Some(18 + (c as u32 - 'J' as u32)),
        'P'..='Z' => Some(23 + (c as u32 - 'P' as u32)),
        _ => None,
    }
}

/// Inverse of [`alpha5_value`]
pub(crate) fn alpha5_letter(value: u32) -> Option<char> {
    let offset = |base: char, from: u32| char::from_u32(base as u32 + value - from);
    match value {
        10..=17 => offset('A', 10),
        18..=22 => offset('J', 18),
        23..=33 => offset('P', 23),
        _ => None,
    }
}

fn unsigned(field: Field, line: &str, blank_is_zero: bool) -> Result<u32, ElementsError> {
    let raw = field.text(line);
    let text = raw.trim();
    if text.is_empty() && blank_is_zero {
        return Ok(0);
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(field.invalid(raw));
    }
    text.parse().map_err(|_| field.invalid(raw))
}

/// `[+-]ddd.ddd`, `[+-].ddd` or `[+-]ddd`
fn decimal_literal(s: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
    )))(s)
}

fn decimal(field: Field, line: &str) -> Result<f64, ElementsError> {
    let raw = field.text(line);
    let (_, literal) = all_consuming(decimal_literal)(raw.trim()).map_err(|_| field.invalid(raw))?;
    literal.parse().map_err(|_| field.invalid(raw))
}

/// Mantissa with an assumed leading decimal point followed by a signed
/// power-of-ten exponent, e.g. "-11606-4" is -0.11606e-4
fn implied_decimal_literal(s: &str) -> IResult<&str, (Option<char>, &str, char, &str)> {
    tuple((opt(one_of("+-")), digit1, one_of("+-"), digit1))(s)
}

fn implied_decimal(field: Field, line: &str) -> Result<f64, ElementsError> {
    let raw = field.text(line);
    let text = raw.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    let (_, (sign, mantissa, exponent_sign, exponent)) =
        all_consuming(implied_decimal_literal)(text).map_err(|_| field.invalid(raw))?;
    let sign = if sign == Some('-') { "-" } else { "" };
    format!("{sign}0.{mantissa}e{exponent_sign}{exponent}")
        .parse()
        .map_err(|_| field.invalid(raw))
}

/// Seven digits with an assumed leading "0."
fn decode_eccentricity(line: &str) -> Result<f64, ElementsError> {
    let raw = ECCENTRICITY.text(line);
    let text = raw.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ECCENTRICITY.invalid(raw));
    }
    format!("0.{text}")
        .parse()
        .map_err(|_| ECCENTRICITY.invalid(raw))
}
