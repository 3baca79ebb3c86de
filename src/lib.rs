//! # genbankx - GenBank CDS extraction
//!
//! A lightweight GenBank flat-file parser that keeps CDS locations as ordered
//! interval lists, translates coding sequences, and writes FASTA.
//!
//! ## Architecture
//!
//! - `model`: Intervals, strands, features, CDS and records
//! - `formats`: GenBank parsing (location grammar, record state machine) and FASTA output
//! - `genetic_code`: Codon tables, translation, reverse complement
//! - `controller`: CDS extraction and FASTA header construction
//!
//! ## Example
//!
//! ```
//! use genbankx::formats::genbank::parse_genbank_str;
//! use genbankx::genetic_code::{standard_table, translate};
//!
//! let gb = "LOCUS       tiny  9 bp\n\
//!           FEATURES             Location/Qualifiers\n\
//!           \x20    CDS             1..9\n\
//!           ORIGIN\n\
//!           \x20       1 atgaaataa\n\
//!           //\n";
//! let record = parse_genbank_str(gb).next().unwrap();
//! let dna = record.cds[0].extract_from(&record.sequence);
//! assert_eq!(translate(&dna, standard_table(), true), "MK");
//! ```

pub mod controller;
pub mod formats;
pub mod genetic_code;
pub mod model;
