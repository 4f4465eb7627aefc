//! elfscope: dump the structure of a 64-bit little-endian ELF file.
//!
//! Prints sections, the sections each segment contains, named symbols and
//! relocations with their resolved symbol names.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use elfscope::{analyze_path, logging, AnalyzerConfig};

/// Structural ELF64 analyzer.
#[derive(Parser)]
#[command(name = "elfscope", version, about)]
struct Cli {
    /// ELF file to analyze.
    file: PathBuf,
}

fn run(cli: &Cli) -> Result<()> {
    let report = analyze_path(&cli.file, &AnalyzerConfig::default())
        .with_context(|| format!("cannot analyze {}", cli.file.display()))?;
    print!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    logging::init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
