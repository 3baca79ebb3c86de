//! CDS export pipeline.
//!
//! Orchestrates the steps between parsed records and FASTA output:
//! extract each CDS from its record, optionally translate it, and label it
//! with a `gene|locus|product` header.

use indexmap::IndexMap;

use crate::genetic_code::{standard_table, translate, CodonTable};
use crate::model::{CdsFeature, Record};

/// Options controlling CDS export.
#[derive(Debug, Clone)]
pub struct ExportOptions<'a> {
    /// Emit protein sequences instead of DNA
    pub proteins: bool,
    /// Prepended to the gene name in each header
    pub prefix: String,
    /// Table used when `proteins` is set
    pub codon_table: &'a CodonTable,
}

impl Default for ExportOptions<'static> {
    fn default() -> Self {
        Self {
            proteins: false,
            prefix: String::new(),
            codon_table: standard_table(),
        }
    }
}

/// Builds the FASTA header for a CDS.
///
/// `index` is the 1-based position of the CDS within its record and names
/// CDS entries without a gene qualifier.
pub fn cds_header(record: &Record, cds: &CdsFeature, index: usize, prefix: &str) -> String {
    let gene = cds
        .gene()
        .filter(|g| !g.is_empty())
        .map_or_else(|| format!("CDS{}", index), str::to_string);

    let mut parts = vec![format!("{}{}", prefix, gene), record.locus.clone()];
    if let Some(product) = cds.product().filter(|p| !p.is_empty()) {
        parts.push(product.replace(' ', "_"));
    }
    parts.join("|")
}

/// Extracts every CDS of every record as `header -> sequence`.
///
/// Entries keep record and CDS order. A repeated header replaces the earlier
/// sequence in place.
pub fn export_cds(records: &[Record], options: &ExportOptions<'_>) -> IndexMap<String, String> {
    let mut output = IndexMap::new();

    for record in records {
        for (index, cds) in record.cds.iter().enumerate() {
            let index = index + 1;
            let dna = cds.extract_from(&record.sequence);
            if dna.is_empty() {
                log::warn!(
                    "CDS {} in record '{}' lies outside the record sequence",
                    index,
                    record.locus
                );
            }

            let header = cds_header(record, cds, index, &options.prefix);
            let sequence = if options.proteins {
                translate(&dna, options.codon_table, true)
            } else {
                dna
            };
            output.insert(header, sequence);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::genbank::parse_genbank_str;

    const EXAMPLE: &str = include_str!("../test_data/example.gb");

    const CDS1_DNA: &str = "ATGTACATAACATACACGTCAGCACGAAACTTGTTGGCCCATAAGTAAGTGTGATGCATACGCCTTTACTTGCTGTGTCCACCCCATCGGAC";
    const CDS2_DNA: &str = "AGGAGGGCGCGCCTCTGCGTGACCTGTCAAAATTACCCGAG";

    fn example_records() -> Vec<Record> {
        parse_genbank_str(EXAMPLE).collect()
    }

    #[test]
    fn test_export_dna() {
        let records = example_records();
        let output = export_cds(&records, &ExportOptions::default());

        let entries: Vec<(&str, &str)> = output
            .iter()
            .map(|(h, s)| (h.as_str(), s.as_str()))
            .collect();
        assert_eq!(
            entries,
            [
                ("geneA|example|protein_A", CDS1_DNA),
                ("geneB|example|protein_B", CDS2_DNA),
            ]
        );
    }

    #[test]
    fn test_export_proteins() {
        let records = example_records();
        let options = ExportOptions {
            proteins: true,
            prefix: "ex_".to_string(),
            ..ExportOptions::default()
        };
        let output = export_cds(&records, &options);

        assert_eq!(output["ex_geneA|example|protein_A"], "MYITYTSARNLLAHK");
        assert_eq!(output["ex_geneB|example|protein_B"], "RRARLCVTCQNYP");
    }

    #[test]
    fn test_header_without_gene_or_product() {
        let content = "LOCUS       bare  9 bp\n\
                       FEATURES             Location/Qualifiers\n\
                       \x20    CDS             1..9\n\
                       \x20    CDS             complement(1..9)\n\
                       \x20                    /gene=\"\"\n\
                       \x20                    /product=\"\"\n\
                       ORIGIN\n\
                       \x20       1 atgaaataa\n\
                       //\n";
        let records: Vec<Record> = parse_genbank_str(content).collect();
        let output = export_cds(&records, &ExportOptions::default());

        let headers: Vec<&String> = output.keys().collect();
        assert_eq!(headers, ["CDS1|bare", "CDS2|bare"]);
        assert_eq!(output["CDS1|bare"], "ATGAAATAA");
        assert_eq!(output["CDS2|bare"], "TTATTTCAT");
    }

    #[test]
    fn test_duplicate_headers_overwrite_in_place() {
        let content = "LOCUS       dup  6 bp\n\
                       FEATURES             Location/Qualifiers\n\
                       \x20    CDS             1..3\n\
                       \x20                    /gene=\"g\"\n\
                       \x20    CDS             4..6\n\
                       \x20                    /gene=\"h\"\n\
                       \x20    CDS             4..6\n\
                       \x20                    /gene=\"g\"\n\
                       ORIGIN\n\
                       \x20       1 atgccc\n\
                       //\n";
        let records: Vec<Record> = parse_genbank_str(content).collect();
        let output = export_cds(&records, &ExportOptions::default());

        assert_eq!(output.len(), 2);
        assert_eq!(output.get_index(0), Some((&"g|dup".to_string(), &"CCC".to_string())));
        assert_eq!(output["h|dup"], "CCC");
    }
}
