//! Data model for parsed GenBank records.
//!
//! This module contains all data structures for representing:
//! - Strands, intervals, and (possibly spliced) interval lists
//! - Features and coding sequences (CDS) with their qualifiers
//! - Complete GenBank records
//!
//! Coordinates follow GenBank conventions: 1-based, inclusive on both ends.

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use thiserror::Error;

use crate::genetic_code::reverse_complement;

/// Qualifier name to ordered list of values.
///
/// Insertion order is preserved for both names and values so that parsing the
/// same input twice always yields identical features.
pub type Qualifiers = IndexMap<String, Vec<String>>;

/// Error raised when interval bounds violate `start >= 1` and `end >= start`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid interval: {start}..{end}")]
pub struct InvalidInterval {
    pub start: i64,
    pub end: i64,
}

/// Reading orientation of a feature relative to the stored sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    /// Historical numeric encoding: +1, -1, 0.
    pub fn as_i8(self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
            Strand::Unknown => 0,
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Strand::Reverse
    }
}

impl TryFrom<i8> for Strand {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Strand::Forward),
            -1 => Ok(Strand::Reverse),
            0 => Ok(Strand::Unknown),
            other => Err(other),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// A closed genomic range, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: u64,
    end: u64,
}

impl Interval {
    /// Creates a new interval, validating `start >= 1` and `end >= start`.
    pub fn new(start: i64, end: i64) -> Result<Self, InvalidInterval> {
        if start < 1 || end < start {
            return Err(InvalidInterval { start, end });
        }
        Ok(Self {
            start: start as u64,
            end: end as u64,
        })
    }

    /// A single-base interval (`start == end`).
    pub fn position(pos: i64) -> Result<Self, InvalidInterval> {
        Self::new(pos, pos)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bases covered: `end - start + 1`.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Ordered intervals sharing one strand.
///
/// Order is the order written in the location string (5' to 3' reading order),
/// never re-sorted by coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalList {
    intervals: Vec<Interval>,
    strand: Strand,
}

impl IntervalList {
    pub fn new(intervals: Vec<Interval>, strand: Strand) -> Self {
        Self { intervals, strand }
    }

    /// Creates an empty list to be filled during parsing.
    pub fn with_strand(strand: Strand) -> Self {
        Self::new(Vec::new(), strand)
    }

    pub fn push(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    /// Sum of member lengths.
    pub fn total_length(&self) -> u64 {
        self.intervals.iter().map(Interval::length).sum()
    }
}

impl Index<usize> for IntervalList {
    type Output = Interval;

    fn index(&self, index: usize) -> &Interval {
        &self.intervals[index]
    }
}

impl<'a> IntoIterator for &'a IntervalList {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

fn first_value<'a>(qualifiers: &'a Qualifiers, name: &str) -> Option<&'a str> {
    qualifiers
        .get(name)
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// A GenBank feature table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature key (e.g. "CDS", "gene", "source")
    pub key: String,
    pub location: IntervalList,
    pub qualifiers: Qualifiers,
}

impl Feature {
    pub fn new(key: impl Into<String>, location: IntervalList, qualifiers: Qualifiers) -> Self {
        Self {
            key: key.into(),
            location,
            qualifiers,
        }
    }

    /// First value of a qualifier, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        first_value(&self.qualifiers, name)
    }

    pub fn is_cds(&self) -> bool {
        self.key == "CDS"
    }
}

/// A coding sequence: its location plus the qualifiers of the CDS feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdsFeature {
    location: IntervalList,
    qualifiers: Qualifiers,
}

impl CdsFeature {
    pub fn new(location: IntervalList, qualifiers: Qualifiers) -> Self {
        Self {
            location,
            qualifiers,
        }
    }

    pub fn location(&self) -> &IntervalList {
        &self.location
    }

    pub fn intervals(&self) -> &[Interval] {
        self.location.as_slice()
    }

    pub fn strand(&self) -> Strand {
        self.location.strand()
    }

    pub fn qualifiers(&self) -> &Qualifiers {
        &self.qualifiers
    }

    pub fn qualifier(&self, name: &str) -> Option<&str> {
        first_value(&self.qualifiers, name)
    }

    pub fn gene(&self) -> Option<&str> {
        self.qualifier("gene")
    }

    pub fn product(&self) -> Option<&str> {
        self.qualifier("product")
    }

    pub fn translation(&self) -> Option<&str> {
        self.qualifier("translation")
    }

    /// Extracts this CDS from the full record sequence.
    ///
    /// Fragments are concatenated in interval order; on the reverse strand the
    /// joined fragment is reverse-complemented once. Bounds past the end of
    /// `sequence` are clamped.
    pub fn extract_from(&self, sequence: &str) -> String {
        let len = sequence.len();
        let mut dna = String::with_capacity(self.location.total_length() as usize);
        for interval in &self.location {
            let start = ((interval.start() - 1) as usize).min(len);
            let end = (interval.end() as usize).min(len);
            if let Some(fragment) = sequence.get(start..end) {
                dna.push_str(fragment);
            }
        }

        if self.strand().is_reverse() {
            reverse_complement(&dna)
        } else {
            dna
        }
    }
}

/// A parsed GenBank record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub locus: String,
    /// Length declared on the LOCUS line (0 if absent)
    pub length: u64,
    pub definition: String,
    pub accession: Option<String>,
    /// Assembled ORIGIN sequence, uppercase
    pub sequence: String,
    pub features: Vec<Feature>,
    pub cds: Vec<CdsFeature>,
}

impl Record {
    /// Iterates over features with the given key.
    pub fn features_with_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features.iter().filter(move |f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualifiers(pairs: &[(&str, &str)]) -> Qualifiers {
        let mut q = Qualifiers::new();
        for (name, value) in pairs {
            q.entry(name.to_string()).or_default().push(value.to_string());
        }
        q
    }

    #[test]
    fn test_interval_creation() {
        let iv = Interval::new(10, 50).unwrap();
        assert_eq!(iv.start(), 10);
        assert_eq!(iv.end(), 50);
        assert_eq!(iv.length(), 41);

        let single = Interval::position(7).unwrap();
        assert_eq!(single.length(), 1);
        assert_eq!(single.to_string(), "7..7");
    }

    #[test]
    fn test_invalid_interval() {
        assert_eq!(
            Interval::new(0, 10),
            Err(InvalidInterval { start: 0, end: 10 })
        );
        assert_eq!(
            Interval::new(50, 10),
            Err(InvalidInterval { start: 50, end: 10 })
        );
        assert!(Interval::new(-3, 4).is_err());

        let err = Interval::new(5, 4).unwrap_err();
        assert_eq!(err.to_string(), "Invalid interval: 5..4");
    }

    #[test]
    fn test_interval_length_over_range() {
        for start in 1..20 {
            for end in start..40 {
                let iv = Interval::new(start, end).unwrap();
                assert_eq!(iv.length(), (end - start + 1) as u64);
            }
        }
    }

    #[test]
    fn test_strand_encoding() {
        assert_eq!(Strand::Forward.as_i8(), 1);
        assert_eq!(Strand::Reverse.as_i8(), -1);
        assert_eq!(Strand::Unknown.as_i8(), 0);
        assert_eq!(Strand::try_from(-1), Ok(Strand::Reverse));
        assert_eq!(Strand::try_from(2), Err(2));
        assert_eq!(Strand::default(), Strand::Forward);
        assert_eq!(Strand::Reverse.to_string(), "-");
    }

    #[test]
    fn test_interval_list_keeps_order() {
        let list = IntervalList::new(
            vec![Interval::new(70, 120).unwrap(), Interval::new(10, 50).unwrap()],
            Strand::Reverse,
        );
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], Interval::new(70, 120).unwrap());
        assert_eq!(list.get(1), Some(&Interval::new(10, 50).unwrap()));
        assert_eq!(list.total_length(), 92);
        assert_eq!(list.strand(), Strand::Reverse);
    }

    #[test]
    fn test_feature_get() {
        let feature = Feature::new(
            "gene",
            IntervalList::new(vec![Interval::new(1, 9).unwrap()], Strand::Forward),
            qualifiers(&[("gene", "abc"), ("gene", "def"), ("pseudo", "")]),
        );
        assert_eq!(feature.get("gene"), Some("abc"));
        assert_eq!(feature.get("pseudo"), Some(""));
        assert_eq!(feature.get("product"), None);
        assert!(!feature.is_cds());
    }

    #[test]
    fn test_cds_accessors() {
        let cds = CdsFeature::new(
            IntervalList::new(vec![Interval::new(1, 6).unwrap()], Strand::Forward),
            qualifiers(&[("gene", "geneA"), ("product", "protein A"), ("translation", "MK")]),
        );
        assert_eq!(cds.gene(), Some("geneA"));
        assert_eq!(cds.product(), Some("protein A"));
        assert_eq!(cds.translation(), Some("MK"));
        assert_eq!(cds.qualifier("note"), None);
        assert_eq!(cds.intervals().len(), 1);
    }

    #[test]
    fn test_extract_forward_spliced() {
        let cds = CdsFeature::new(
            IntervalList::new(
                vec![Interval::new(1, 3).unwrap(), Interval::new(7, 9).unwrap()],
                Strand::Forward,
            ),
            Qualifiers::new(),
        );
        assert_eq!(cds.extract_from("ATGCCCGGG"), "ATGGGG");
    }

    #[test]
    fn test_extract_reverse_complements_joined_fragment() {
        let cds = CdsFeature::new(
            IntervalList::new(
                vec![Interval::new(1, 2).unwrap(), Interval::new(5, 6).unwrap()],
                Strand::Reverse,
            ),
            Qualifiers::new(),
        );
        // "AA" + "GC" = "AAGC" -> reverse complement "GCTT"
        assert_eq!(cds.extract_from("AACCGC"), "GCTT");
    }

    #[test]
    fn test_extract_clamps_out_of_range() {
        let cds = CdsFeature::new(
            IntervalList::new(vec![Interval::new(3, 100).unwrap()], Strand::Forward),
            Qualifiers::new(),
        );
        assert_eq!(cds.extract_from("ACGT"), "GT");

        let past_end = CdsFeature::new(
            IntervalList::new(vec![Interval::new(10, 12).unwrap()], Strand::Forward),
            Qualifiers::new(),
        );
        assert_eq!(past_end.extract_from("ACGT"), "");
    }
}
