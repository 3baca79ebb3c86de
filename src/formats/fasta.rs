//! FASTA writer.
//!
//! ## FASTA Format
//!
//! ```text
//! >geneA|example|protein_A
//! MYITYTSARNLLAHK
//! ```
//!
//! Sequences are wrapped at [`LINE_WIDTH`] characters per line.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

/// Maximum number of sequence characters per output line.
pub const LINE_WIDTH: usize = 60;

/// Splits a sequence into lines of at most `width` characters.
fn wrap(seq: &str, width: usize) -> impl Iterator<Item = &str> + '_ {
    let mut rest = seq;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let split = rest
            .char_indices()
            .nth(width)
            .map_or(rest.len(), |(offset, _)| offset);
        let (line, tail) = rest.split_at(split);
        rest = tail;
        Some(line)
    })
}

/// Writes `header -> sequence` entries in FASTA format to any writer.
pub fn write_fasta_to<W: Write>(writer: &mut W, records: &IndexMap<String, String>) -> io::Result<()> {
    for (header, seq) in records {
        writeln!(writer, ">{}", header)?;
        for line in wrap(seq, LINE_WIDTH) {
            writeln!(writer, "{}", line)?;
        }
    }
    Ok(())
}

/// Writes `header -> sequence` entries to a FASTA file.
///
/// # Examples
///
/// ```no_run
/// use indexmap::IndexMap;
/// use genbankx::formats::fasta::write_fasta;
///
/// let mut records = IndexMap::new();
/// records.insert("geneA".to_string(), "ATGAAATAA".to_string());
/// write_fasta("cds.fasta", &records).unwrap();
/// ```
pub fn write_fasta<P: AsRef<Path>>(path: P, records: &IndexMap<String, String>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_fasta_to(&mut writer, records)?;
    writer.flush()
}

/// Formats `header -> sequence` entries as a FASTA string.
///
/// Lines are joined with `\n`; there is no trailing newline.
pub fn write_fasta_string(records: &IndexMap<String, String>) -> String {
    let mut lines = Vec::new();
    for (header, seq) in records {
        lines.push(format!(">{}", header));
        lines.extend(wrap(seq, LINE_WIDTH).map(str::to_string));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(h, s)| (h.to_string(), s.to_string()))
            .collect()
    }

    #[test]
    fn test_wrap_at_line_width() {
        let seq = "A".repeat(130);
        let lines: Vec<&str> = wrap(&seq, LINE_WIDTH).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 60);
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 10);

        assert_eq!(wrap("", LINE_WIDTH).count(), 0);
        assert_eq!(wrap(&"C".repeat(60), LINE_WIDTH).count(), 1);
    }

    #[test]
    fn test_write_fasta_string() {
        let recs = records(&[("seq1", "ACGT"), ("seq2", "TTGGCC")]);
        assert_eq!(write_fasta_string(&recs), ">seq1\nACGT\n>seq2\nTTGGCC");
    }

    #[test]
    fn test_empty_sequence_writes_header_only() {
        let recs = records(&[("empty", ""), ("next", "AC")]);
        assert_eq!(write_fasta_string(&recs), ">empty\n>next\nAC");
    }

    #[test]
    fn test_write_fasta_to_buffer() {
        let seq = "ACGT".repeat(20);
        let recs = records(&[("long", seq.as_str())]);
        let mut buffer = Vec::new();
        write_fasta_to(&mut buffer, &recs).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let expected = format!(">long\n{}\n{}\n", &seq[..60], &seq[60..]);
        assert_eq!(text, expected);
    }

    #[test]
    fn test_write_fasta_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fasta");
        let recs = records(&[("a", "MK"), ("b", "MVL")]);

        write_fasta(&path, &recs).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, ">a\nMK\n>b\nMVL\n");
    }
}
