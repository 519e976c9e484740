//! Splits catalog text (`FORMAT=TLE` responses, files of element sets) into records

use nom::{
    branch::alt,
    character::complete::{line_ending, not_line_ending, space0},
    combinator::{eof, opt, verify},
    error::ErrorKind,
    multi::{fold_many0, many0_count},
    sequence::terminated,
    Err::{Failure, Incomplete},
    Needed,
};
use sattypes::prelude::*;
use tracing::debug;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("Record '{name}' is missing element line {line}")]
    MissingLine { name: String, line: u8 },
    #[error("Parse error")]
    Nom(I, ErrorKind),
}

pub trait ParseErrorExt {
    /// The text can't become a valid set by appending more input
    fn is_failure(&self) -> bool;
}

impl<I> ParseErrorExt for nom::Err<ParseError<I>> {
    fn is_failure(&self) -> bool {
        matches!(self, nom::Err::Failure(_))
    }
}

/// Parses every record in `set`, keeping catalog order.
///
/// Records are an optional name line followed by element lines 1 and 2,
/// separated by LF or CRLF. Blank lines between records and a missing final
/// line ending are accepted. Only the text structure is checked here, the
/// element lines themselves are validated by [`crate::parse_elements`].
///
/// A record cut short by the end of `set` is [`nom::Err::Incomplete`], one
/// followed by anything other than its element line is a failure.
pub fn parse_tle_set(set: &str) -> Result<&str, Vec<TleRecord>> {
    let (s, tle_set) = fold_many0(tle, Vec::new, |mut tle_set: Vec<TleRecord>, tle| {
        tle_set.push(tle);
        tle_set
    })(set)?;
    let (s, _) = many0_count(blank_line)(s)?;
    let (s, _) = space0(s)?;
    debug!(records = tle_set.len(), "Parsed TLE set");
    Ok((s, tle_set))
}

fn tle(s: &str) -> Result<&str, TleRecord> {
    let (s, _) = many0_count(blank_line)(s)?;
    let (s, name) = opt(name_line)(s)?;

    let (s, line1) = match (element_line('1')(s), name) {
        (Ok(res), _) => res,
        (Err(_), Some(_)) if at_end(s) => return Err(Incomplete(Needed::Unknown)),
        (Err(_), Some(name)) => {
            return Err(Failure(ParseError::MissingLine {
                name: name.to_string(),
                line: 1,
            }))
        }
        (Err(e), None) => return Err(e),
    };

    let name = match name {
        Some(name) => name.to_string(),
        // Two-line layout, fall back to the catalog number
        None => line1.get(2..7).unwrap_or(line1).trim().to_string(),
    };

    let (s, line2) = element_line('2')(s).map_err(|_| {
        if at_end(s) {
            Incomplete(Needed::Unknown)
        } else {
            Failure(ParseError::MissingLine {
                name: name.clone(),
                line: 2,
            })
        }
    })?;

    Ok((
        s,
        TleRecord {
            name,
            line1: line1.to_string(),
            line2: line2.to_string(),
        },
    ))
}

/// Nothing but whitespace left
fn at_end(s: &str) -> bool {
    s.trim().is_empty()
}

fn blank_line(s: &str) -> Result<&str, &str> {
    terminated(space0, line_ending)(s)
}

/// Any non-blank line that isn't line 1; three-line element sets from
/// space-track prefix the name with "0 "
fn name_line(s: &str) -> Result<&str, &str> {
    let (s, name) = verify(not_line_ending, |l: &str| {
        !l.trim().is_empty() && !is_element_line(l, '1')
    })(s)?;
    let (s, _) = line_ending(s)?;
    let name = name.trim();
    Ok((s, name.strip_prefix("0 ").unwrap_or(name).trim()))
}

fn element_line<'a>(number: char) -> impl FnMut(&'a str) -> Result<&'a str, &'a str> {
    move |s: &'a str| {
        let (s, line) = verify(not_line_ending, |l: &str| is_element_line(l, number))(s)?;
        let (s, _) = alt((line_ending, eof))(s)?;
        Ok((s, line.trim()))
    }
}

fn is_element_line(line: &str, number: char) -> bool {
    let mut chars = line.trim_start().chars();
    chars.next() == Some(number) && chars.next() == Some(' ')
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const TLE_SET: &str = indoc! {r#"
        GEO1
        1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991
        2 37481   2.3847  40.6385 0001640  70.7486  43.7146  1.00272292 44578

        GEO2
        1 39120U 13011A   23190.50177227 -.00000262  00000-0  00000+0 0  9997
        2 39120   2.3950  38.7964 0001772  68.0002 323.0070  1.00271163 37822
    "#};

    #[test]
    fn parse_tle() {
        let (s, tle_set) = parse_tle_set(TLE_SET).unwrap();
        assert!(s.is_empty());
        assert_eq!(tle_set.len(), 2);
        assert_eq!(tle_set[0].name, "GEO1");
        assert_eq!(tle_set[1].name, "GEO2");
        assert!(tle_set[1].line2.starts_with("2 39120"));
        assert!(crate::parse_record(&tle_set[0]).is_ok());
        assert!(crate::parse_record(&tle_set[1]).is_ok());
    }

    #[test]
    fn crlf_and_no_trailing_newline() {
        let crlf = TLE_SET.trim_end().replace('\n', "\r\n");
        let (s, tle_set) = parse_tle_set(&crlf).unwrap();
        assert_eq!(s, "");
        assert_eq!(tle_set.len(), 2);
        assert!(!tle_set[1].line2.ends_with('\r'));
        assert_eq!(tle_set[1].line2.len(), 69);
    }

    #[test]
    fn nameless_and_space_track_names() {
        let set = indoc! {r#"
            1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991
            2 37481   2.3847  40.6385 0001640  70.7486  43.7146  1.00272292 44578
            0 GEO2
            1 39120U 13011A   23190.50177227 -.00000262  00000-0  00000+0 0  9997
            2 39120   2.3950  38.7964 0001772  68.0002 323.0070  1.00271163 37822
        "#};
        let (s, tle_set) = parse_tle_set(set).unwrap();
        assert!(s.is_empty());
        assert_eq!(tle_set[0].name, "37481");
        assert_eq!(tle_set[1].name, "GEO2");
    }

    #[test]
    fn missing_element_line() {
        let truncated = indoc! {r#"
            GEO1
            1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991
            GEO2
        "#};
        let err = parse_tle_set(truncated).unwrap_err();
        assert!(err.is_failure());
        assert_eq!(
            err,
            Failure(ParseError::MissingLine {
                name: "GEO1".to_string(),
                line: 2
            })
        );
    }

    #[test]
    fn truncated_at_end_of_input() {
        let name_only = "GEO1\r\n";
        let err = parse_tle_set(name_only).unwrap_err();
        assert_eq!(err, Incomplete(Needed::Unknown));
        assert!(!err.is_failure());

        let first_line = indoc! {r#"
            GEO1
            1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991

        "#};
        let err = parse_tle_set(first_line).unwrap_err();
        assert_eq!(err, Incomplete(Needed::Unknown));
        assert!(!err.is_failure());

        let nameless = "1 37481U 11019A   23190.45078927 -.00000009  00000-0  00000+0 0  9991";
        assert_eq!(parse_tle_set(nameless), Err(Incomplete(Needed::Unknown)));
    }

    #[test]
    fn name_followed_by_name() {
        let err = parse_tle_set("GEO1\nGEO2\n").unwrap_err();
        assert!(err.is_failure());
        assert_eq!(
            err,
            Failure(ParseError::MissingLine {
                name: "GEO1".to_string(),
                line: 1
            })
        );
    }

    #[test]
    fn empty_input() {
        let (s, tle_set) = parse_tle_set("\r\n\n").unwrap();
        assert!(s.is_empty());
        assert!(tle_set.is_empty());
    }
}
