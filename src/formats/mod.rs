//! GenBank input and FASTA output.
//!
//! - `location`: GenBank location strings (`join`, `complement`, ranges)
//! - `genbank`: line classifier and record assembly state machine
//! - `fasta`: FASTA writer
//!
//! The parsing core never fails on malformed content; the errors here cover
//! file-level problems only (unreadable, empty, or without any record).

pub mod fasta;
pub mod genbank;
pub mod location;

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::model::Record;
use genbank::parse_genbank_str;

/// Errors that can occur when reading a GenBank file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("No GenBank records found")]
    NoRecords,
}

/// Result type for file-level parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Returns true if the path has a usual GenBank extension.
pub fn is_genbank_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "gb" | "gbk" | "gbff" | "genbank"))
}

/// Reads a GenBank file and parses every record in it.
///
/// The whole file is loaded into memory and parsed in a single pass.
pub fn read_genbank_file<P: AsRef<Path>>(path: P) -> ParseResult<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size = file.metadata()?.len() as usize;

    if file_size == 0 {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;

    if !is_genbank_extension(path) {
        log::debug!("{} has no GenBank extension; parsing anyway", path.display());
    }

    let records: Vec<Record> = parse_genbank_str(&content).collect();
    if records.is_empty() {
        return Err(ParseError::NoRecords);
    }

    Ok(records)
}
