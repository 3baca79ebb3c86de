//! GenBank flat file parser.
//!
//! Records are assembled by a line-oriented state machine and yielded lazily:
//! each call to `next()` consumes input lines until one record is complete.
//!
//! ## GenBank Format
//!
//! ```text
//! LOCUS       example                  200 bp    DNA     linear
//! DEFINITION  This is a toy example GenBank record.
//! ACCESSION   TEST_ACC
//! FEATURES             Location/Qualifiers
//!      CDS             join(10..50,70..120)
//!                      /gene="geneA"
//! ORIGIN
//!         1 gctaaagaca tgtacataac atacacgtca gcacgaaact tgttggccca gtgtgaatcg
//! //
//! ```
//!
//! In the FEATURES table the key occupies columns 5-15 and the location and
//! qualifier text starts at column 21.

use std::iter::FusedIterator;
use std::mem;

use thiserror::Error;

use super::location::{parse_location, LocationError};
use crate::model::{CdsFeature, Feature, Qualifiers, Record};

/// Column where the feature key starts.
const FEATURE_KEY_COLUMN: usize = 5;
/// Column where the feature key field ends (exclusive).
const FEATURE_KEY_END: usize = 15;
/// Column where location and qualifier text starts.
const FEATURE_TEXT_COLUMN: usize = 21;
const DEFINITION_COLUMN: usize = 12;
const ACCESSION_COLUMN: usize = 10;

/// Characters whose presence marks an ORIGIN line as sequence data.
const NUCLEOTIDE_MARKERS: &str = "acgtnACGTN";

/// Errors raised while turning an accumulated feature into a `Feature`.
///
/// These never escape the parser: the feature is dropped and the error logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenbankError {
    #[error("Failed to parse feature '{key}' location '{location}': {source}")]
    FeatureParse {
        key: String,
        location: String,
        source: LocationError,
    },

    #[error("Feature '{key}' location '{location}' yielded no intervals")]
    EmptyLocation { key: String, location: String },
}

/// Result type for GenBank feature assembly.
pub type GenbankResult<T> = Result<T, GenbankError>;

/// File section the parser is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Idle,
    Features,
    Origin,
}

/// A classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Locus {
        name: Option<&'a str>,
        length: Option<u64>,
    },
    Definition(&'a str),
    Accession(Option<&'a str>),
    Features,
    Origin,
    Terminator,
    FeatureKey {
        key: &'a str,
        rest: &'a str,
    },
    Continuation(&'a str),
    Sequence(&'a str),
    Other,
}

/// Byte offset of character column `col`, or the line length past the end.
fn byte_offset(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map_or(line.len(), |(offset, _)| offset)
}

/// Text from character column `start` to the end of the line.
fn tail(line: &str, start: usize) -> &str {
    &line[byte_offset(line, start)..]
}

/// Text between character columns `start` and `end`.
fn columns(line: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(line, start);
    let end = byte_offset(line, end).max(start);
    &line[start..end]
}

fn indented_by(line: &str, width: usize) -> bool {
    line.len() >= width && line.bytes().take(width).all(|b| b == b' ')
}

/// Classifies one line (without its line terminator).
///
/// Keyword lines are recognized in any section; indentation and sequence
/// lines are interpreted according to `section`.
pub fn classify(line: &str, section: Section) -> LineKind<'_> {
    if line.starts_with("LOCUS") {
        let mut tokens = line.split_whitespace().skip(1);
        let name = tokens.next();
        let length = tokens
            .next()
            .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|t| t.parse().ok());
        return LineKind::Locus { name, length };
    }
    if line.starts_with("DEFINITION") {
        return LineKind::Definition(tail(line, DEFINITION_COLUMN).trim());
    }
    if line.starts_with("ACCESSION") {
        return LineKind::Accession(tail(line, ACCESSION_COLUMN).split_whitespace().next());
    }
    if line.starts_with("FEATURES") {
        return LineKind::Features;
    }
    if line.starts_with("ORIGIN") {
        return LineKind::Origin;
    }
    if line.starts_with("//") {
        return LineKind::Terminator;
    }

    match section {
        Section::Features => {
            if indented_by(line, FEATURE_TEXT_COLUMN) {
                LineKind::Continuation(tail(line, FEATURE_TEXT_COLUMN).trim())
            } else if indented_by(line, FEATURE_KEY_COLUMN) {
                LineKind::FeatureKey {
                    key: columns(line, FEATURE_KEY_COLUMN, FEATURE_KEY_END).trim(),
                    rest: tail(line, FEATURE_TEXT_COLUMN).trim(),
                }
            } else {
                LineKind::Other
            }
        }
        Section::Origin if line.chars().any(|c| NUCLEOTIDE_MARKERS.contains(c)) => {
            LineKind::Sequence(line)
        }
        _ => LineKind::Other,
    }
}

/// True if `text` ends a quoted value.
///
/// GenBank escapes an embedded quote as `""`, so only an odd run of trailing
/// quotes closes the value.
fn closes_quote(text: &str) -> bool {
    text.bytes().rev().take_while(|&b| b == b'"').count() % 2 == 1
}

fn unescape_quotes(text: &str) -> String {
    text.replace("\"\"", "\"")
}

/// A finished feature, plus its CDS view when the key is `CDS`.
struct ParsedFeature {
    feature: Feature,
    cds: Option<CdsFeature>,
}

/// Feature table entry being accumulated across lines.
#[derive(Debug, Default)]
struct FeatureAccumulator {
    key: Option<String>,
    location_fragments: Vec<String>,
    qualifiers: Qualifiers,
    /// Qualifier whose quoted value continues on the next line
    open_qualifier: Option<String>,
}

impl FeatureAccumulator {
    fn start(key: &str, location: &str) -> Self {
        Self {
            key: (!key.is_empty()).then(|| key.to_string()),
            location_fragments: vec![location.to_string()],
            ..Self::default()
        }
    }

    fn is_active(&self) -> bool {
        self.key.is_some()
    }

    /// Handles a line indented to the qualifier column.
    fn push_continuation(&mut self, text: &str) {
        if let Some(name) = &self.open_qualifier {
            let closes = closes_quote(text);
            let piece = unescape_quotes(if closes { &text[..text.len() - 1] } else { text });
            if !piece.is_empty() {
                if let Some(value) = self.qualifiers.get_mut(name).and_then(|v| v.last_mut()) {
                    // Protein sequences wrap without a word break
                    if name != "translation" && !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(&piece);
                }
            }
            if closes {
                self.open_qualifier = None;
            }
            return;
        }

        match text.strip_prefix('/') {
            Some(qualifier) => self.push_qualifier(qualifier),
            None => self.location_fragments.push(text.to_string()),
        }
    }

    fn push_qualifier(&mut self, qualifier: &str) {
        match qualifier.split_once('=') {
            Some((name, raw)) => {
                let value = match raw.strip_prefix('"') {
                    Some(body) if closes_quote(body) => unescape_quotes(&body[..body.len() - 1]),
                    Some(body) => {
                        self.open_qualifier = Some(name.to_string());
                        unescape_quotes(body)
                    }
                    None => raw.trim_matches('"').to_string(),
                };
                self.qualifiers
                    .entry(name.to_string())
                    .or_default()
                    .push(value);
            }
            // Valueless qualifier such as /pseudo
            None => self
                .qualifiers
                .entry(qualifier.to_string())
                .or_default()
                .push(String::new()),
        }
    }

    /// Parses the accumulated location and builds the feature.
    ///
    /// Returns `Ok(None)` when no feature was started.
    fn finish(self) -> GenbankResult<Option<ParsedFeature>> {
        let Some(key) = self.key else {
            return Ok(None);
        };
        let location: String = self
            .location_fragments
            .concat()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let intervals = match parse_location(&location) {
            Ok(intervals) => intervals,
            Err(source) => {
                return Err(GenbankError::FeatureParse {
                    key,
                    location,
                    source,
                })
            }
        };
        if intervals.is_empty() {
            return Err(GenbankError::EmptyLocation { key, location });
        }

        let cds = (key == "CDS").then(|| CdsFeature::new(intervals.clone(), self.qualifiers.clone()));
        Ok(Some(ParsedFeature {
            feature: Feature::new(key, intervals, self.qualifiers),
            cds,
        }))
    }
}

/// Per-record state accumulated between LOCUS and `//`.
#[derive(Debug, Default)]
struct RecordBuilder {
    locus: Option<String>,
    length: u64,
    definition: String,
    accession: Option<String>,
    sequence: String,
    features: Vec<Feature>,
    cds: Vec<CdsFeature>,
}

impl RecordBuilder {
    fn is_open(&self) -> bool {
        self.locus.is_some()
    }

    fn add_feature(&mut self, accumulator: FeatureAccumulator) {
        match accumulator.finish() {
            Ok(Some(parsed)) => {
                if let Some(cds) = parsed.cds {
                    self.cds.push(cds);
                }
                self.features.push(parsed.feature);
            }
            Ok(None) => {}
            Err(e) => log::warn!(
                "Dropping feature in record '{}': {}",
                self.locus.as_deref().unwrap_or("<no locus>"),
                e
            ),
        }
    }

    fn push_sequence(&mut self, line: &str) {
        self.sequence
            .extend(line.chars().filter(|c| c.is_ascii_alphabetic()));
    }

    fn build(self) -> Record {
        let record = Record {
            locus: self.locus.unwrap_or_default(),
            length: self.length,
            definition: self.definition,
            accession: self.accession,
            sequence: self.sequence.to_ascii_uppercase(),
            features: self.features,
            cds: self.cds,
        };
        log::debug!(
            "Parsed record '{}': {} bp, {} features, {} CDS",
            record.locus,
            record.sequence.len(),
            record.features.len(),
            record.cds.len()
        );
        record
    }
}

/// Lazy, single-pass iterator over the records in a sequence of lines.
///
/// Created by [`parse_genbank`].
#[derive(Debug)]
pub struct GenbankRecords<I> {
    lines: I,
    section: Section,
    builder: RecordBuilder,
    feature: FeatureAccumulator,
    finished: bool,
}

impl<I> GenbankRecords<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            section: Section::Idle,
            builder: RecordBuilder::default(),
            feature: FeatureAccumulator::default(),
            finished: false,
        }
    }

    fn flush_feature(&mut self) {
        let feature = mem::take(&mut self.feature);
        self.builder.add_feature(feature);
    }

    /// Takes the record being built, resetting per-record state.
    fn take_record(&mut self) -> Option<Record> {
        let builder = mem::take(&mut self.builder);
        builder.is_open().then(|| builder.build())
    }

    /// Feeds one line to the state machine, returning a record if it completed one.
    fn process_line(&mut self, raw: &str) -> Option<Record> {
        let line = raw.trim_end_matches(['\n', '\r']);

        match classify(line, self.section) {
            LineKind::Locus { name, length } => {
                let emitted = if self.builder.is_open() {
                    self.flush_feature();
                    self.take_record()
                } else {
                    None
                };
                self.section = Section::Idle;
                self.feature = FeatureAccumulator::default();

                if let Some(name) = name {
                    self.builder.locus = Some(name.to_string());
                    if let Some(length) = length {
                        self.builder.length = length;
                    }
                }
                return emitted;
            }
            LineKind::Definition(text) => self.builder.definition = text.to_string(),
            LineKind::Accession(token) => self.builder.accession = token.map(str::to_string),
            LineKind::Features => {
                self.section = Section::Features;
                self.feature = FeatureAccumulator::default();
            }
            LineKind::Origin => {
                self.flush_feature();
                self.section = Section::Origin;
            }
            LineKind::Terminator => {
                self.flush_feature();
                self.section = Section::Idle;
                return self.take_record();
            }
            LineKind::FeatureKey { key, rest } => {
                self.flush_feature();
                self.feature = FeatureAccumulator::start(key, rest);
            }
            LineKind::Continuation(text) => {
                if self.feature.is_active() {
                    self.feature.push_continuation(text);
                }
            }
            LineKind::Sequence(text) => self.builder.push_sequence(text),
            LineKind::Other => {}
        }

        None
    }
}

impl<I, S> Iterator for GenbankRecords<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.finished {
            return None;
        }

        while let Some(line) = self.lines.next() {
            if let Some(record) = self.process_line(line.as_ref()) {
                return Some(record);
            }
        }

        // Input ended without a terminator
        self.finished = true;
        self.flush_feature();
        self.take_record()
    }
}

impl<I, S> FusedIterator for GenbankRecords<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
}

/// Parses GenBank records from any source of lines.
///
/// Lines may keep their `\n` / `\r\n` terminators. Records are produced
/// lazily, in file order.
///
/// # Examples
///
/// ```
/// use genbankx::formats::genbank::parse_genbank;
///
/// let lines = ["LOCUS       tiny  6 bp", "ORIGIN", "        1 atgtaa", "//"];
/// let records: Vec<_> = parse_genbank(lines).collect();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].sequence, "ATGTAA");
/// ```
pub fn parse_genbank<I>(lines: I) -> GenbankRecords<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    GenbankRecords::new(lines.into_iter())
}

/// Parses GenBank records from an in-memory string.
pub fn parse_genbank_str(content: &str) -> GenbankRecords<std::str::Lines<'_>> {
    parse_genbank(content.lines())
}
