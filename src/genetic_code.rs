//! Codon tables, translation, and reverse complement.
//!
//! This module provides:
//! - The NCBI standard genetic code (table 1)
//! - Codon tables built from any codon -> amino acid lookup
//! - Nucleotide to protein translation
//! - Reverse complement of DNA/RNA strings
//!
//! Both `translate` and `reverse_complement` are total: unknown codons become
//! `X` and unknown bases become `N`.

use std::collections::HashMap;
use std::sync::OnceLock;

/// NCBI amino acids for table 1, in TCAG codon order.
const STANDARD_NCBIEAA: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Symbol emitted for stop codons.
pub const STOP: char = '*';

/// Symbol emitted for codons absent from the table.
pub const UNKNOWN_AMINO_ACID: char = 'X';

/// A codon table mapping uppercase DNA codons to one-letter amino acids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonTable {
    /// Name of the table
    pub name: String,
    codons: HashMap<String, char>,
}

impl CodonTable {
    /// Creates a codon table from an NCBI `ncbieaa` string.
    ///
    /// # Arguments
    /// * `name` - Name of the genetic code
    /// * `ncbieaa` - 64-character string of amino acids (NCBI TCAG order)
    pub fn from_ncbieaa(name: &str, ncbieaa: &str) -> Self {
        let bases = ['T', 'C', 'A', 'G'];
        let mut amino_acids = ncbieaa.chars();
        let mut codons = HashMap::with_capacity(64);

        // NCBI order: TTT, TTC, TTA, TTG, TCT, TCC, ... (Base1, Base2, Base3)
        for &b1 in &bases {
            for &b2 in &bases {
                for &b3 in &bases {
                    let aa = amino_acids.next().unwrap_or(UNKNOWN_AMINO_ACID);
                    codons.insert(format!("{}{}{}", b1, b2, b3), aa);
                }
            }
        }

        Self {
            name: name.to_string(),
            codons,
        }
    }

    /// The standard genetic code (NCBI table 1).
    pub fn standard() -> Self {
        Self::from_ncbieaa("Standard", STANDARD_NCBIEAA)
    }

    /// Looks up an uppercase DNA codon.
    pub fn lookup(&self, codon: &str) -> Option<char> {
        self.codons.get(codon).copied()
    }

    /// Number of codons in the table.
    pub fn len(&self) -> usize {
        self.codons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }

    /// Translates a nucleotide sequence with this table.
    pub fn translate(&self, dna: &str, to_stop: bool) -> String {
        translate(dna, self, to_stop)
    }
}

impl Default for CodonTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builds a custom table from `(codon, amino acid)` pairs.
///
/// Codons are uppercased and `U` is read as `T`, matching how `translate`
/// normalizes its input.
impl<S: AsRef<str>> FromIterator<(S, char)> for CodonTable {
    fn from_iter<I: IntoIterator<Item = (S, char)>>(iter: I) -> Self {
        let codons = iter
            .into_iter()
            .map(|(codon, aa)| (codon.as_ref().to_uppercase().replace('U', "T"), aa))
            .collect();
        Self {
            name: "Custom".to_string(),
            codons,
        }
    }
}

/// Shared instance of the standard table.
pub fn standard_table() -> &'static CodonTable {
    static STANDARD: OnceLock<CodonTable> = OnceLock::new();
    STANDARD.get_or_init(CodonTable::standard)
}

/// Translates a nucleotide sequence to a protein sequence.
///
/// # Rules
/// - Input is uppercased and `U` is read as `T`
/// - Non-overlapping triplets are read from offset 0; 1-2 trailing bases are dropped
/// - Codons missing from `table` translate to `X`
/// - With `to_stop`, translation ends at the first stop codon, which is not emitted
pub fn translate(dna: &str, table: &CodonTable, to_stop: bool) -> String {
    let normalized: Vec<char> = dna
        .chars()
        .flat_map(char::to_uppercase)
        .map(|c| if c == 'U' { 'T' } else { c })
        .collect();

    let mut protein = String::with_capacity(normalized.len() / 3);
    let mut codon = String::with_capacity(3);

    for triplet in normalized.chunks_exact(3) {
        codon.clear();
        codon.extend(triplet);

        let aa = table.lookup(&codon).unwrap_or(UNKNOWN_AMINO_ACID);
        if to_stop && aa == STOP {
            break;
        }
        protein.push(aa);
    }

    protein
}

/// Complement of a single base; case is preserved, unknown bases become `N`.
fn complement(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        'C' => 'G',
        'N' => 'N',
        'U' => 'A',
        'a' => 't',
        't' => 'a',
        'g' => 'c',
        'c' => 'g',
        'n' => 'n',
        'u' => 'a',
        _ => 'N',
    }
}

/// Returns the reverse complement of a DNA (or RNA) sequence.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}
