//! GenBank location string parser.
//!
//! ## Supported Forms
//!
//! ```text
//! 100..200                          simple range
//! 42                                single base
//! complement(100..200)              reverse strand
//! join(10..50,70..120)              spliced, listed order preserved
//! complement(join(10..50,70..120))  both
//! ```
//!
//! Partial markers (`<`, `>`) are stripped and treated as full boundaries.
//! Segments that are neither a range nor a bare position are skipped.

use thiserror::Error;

use crate::model::{Interval, IntervalList, InvalidInterval, Strand};

/// Errors that can occur while parsing a location string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Malformed location token: '{0}'")]
    MalformedToken(String),

    #[error(transparent)]
    InvalidInterval(#[from] InvalidInterval),
}

/// Result type for location parsing.
pub type LocationResult<T> = Result<T, LocationError>;

/// Strips `prefix(` ... `)` from `text`, if present.
fn strip_wrapper<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.strip_prefix(prefix)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Parses one comma-separated segment: `start..end` or a bare position.
fn parse_segment(part: &str) -> LocationResult<Interval> {
    let cleaned: String = part.chars().filter(|&c| c != '<' && c != '>').collect();
    let malformed = || LocationError::MalformedToken(part.to_string());

    if let Some((start, end)) = cleaned.split_once("..") {
        let start: i64 = start.trim().parse().map_err(|_| malformed())?;
        let end: i64 = end.trim().parse().map_err(|_| malformed())?;
        return Ok(Interval::new(start, end)?);
    }

    if !cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        let pos: i64 = cleaned.parse().map_err(|_| malformed())?;
        return Ok(Interval::position(pos)?);
    }

    Err(malformed())
}

/// Parses a GenBank location string into ordered intervals and a strand.
///
/// `complement(...)` is detected before `join(...)` since a join may sit
/// inside a complement. The returned list may be empty when every segment
/// was malformed; an interval with invalid bounds is an error.
///
/// # Examples
///
/// ```
/// use genbankx::formats::location::parse_location;
/// use genbankx::model::Strand;
///
/// let loc = parse_location("complement(join(10..50,70..120))").unwrap();
/// assert_eq!(loc.strand(), Strand::Reverse);
/// assert_eq!(loc.len(), 2);
/// assert_eq!(loc[0].start(), 10);
/// ```
pub fn parse_location(text: &str) -> LocationResult<IntervalList> {
    let mut body = text.trim();
    let mut strand = Strand::Forward;

    if let Some(inner) = strip_wrapper(body, "complement") {
        strand = Strand::Reverse;
        body = inner;
    }

    if let Some(inner) = strip_wrapper(body, "join") {
        body = inner;
    }

    let mut intervals = IntervalList::with_strand(strand);

    for part in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match parse_segment(part) {
            Ok(interval) => intervals.push(interval),
            Err(LocationError::MalformedToken(token)) => {
                log::debug!("Skipping malformed location token '{}' in '{}'", token, text);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(intervals)
}
