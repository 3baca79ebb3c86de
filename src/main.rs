//! genbankx - GenBank CDS extractor
//!
//! Extracts coding sequences from a GenBank file and writes them as FASTA.
//!
//! ## Usage
//!
//! ```bash
//! genbankx <file.gb>                    # CDS DNA to stdout
//! genbankx -p <file.gb> -o cds.faa      # translated CDS to a file
//! genbankx --prefix my_ <file.gb>       # prefix gene names in headers
//! ```
//!
//! Set `RUST_LOG` (or pass `-v`) for diagnostics about dropped features.

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use genbankx::controller::{export_cds, ExportOptions};
use genbankx::formats::fasta::{write_fasta, write_fasta_to};
use genbankx::formats::read_genbank_file;

/// genbankx - Extract CDS sequences from GenBank files
///
/// Without -o/--output, FASTA is written to stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input GenBank file
    input: PathBuf,

    /// Output FASTA file
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output protein sequences instead of DNA
    #[arg(short = 'p', long = "proteins")]
    proteins: bool,

    /// Prefix for sequence headers
    #[arg(long = "prefix", default_value = "")]
    prefix: String,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let records = read_genbank_file(&args.input)
        .with_context(|| format!("Error reading GenBank file {}", args.input.display()))?;
    log::info!("Read {} records from {}", records.len(), args.input.display());

    let options = ExportOptions {
        proteins: args.proteins,
        prefix: args.prefix,
        ..ExportOptions::default()
    };
    let sequences = export_cds(&records, &options);

    match args.output {
        Some(path) => {
            write_fasta(&path, &sequences)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Successfully wrote {} sequences to {}",
                sequences.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_fasta_to(&mut handle, &sequences)?;
            handle.flush()?;
        }
    }

    Ok(())
}
