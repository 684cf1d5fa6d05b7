use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind as ClapErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use q16asm::{AsmConfig, Assembler};

/// Every failure exits with -1.
const FAILURE: u8 = 255;

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble Q16 source into a machine-code listing")]
struct Opts {
    /// Source file with `.data` and `.code` segments
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Output file (defaults to INPUT with a `.bin` extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON file overriding segment and label capacities
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print each instruction with its opcode and disassembly
    #[arg(long)]
    dump: bool,
    /// Also write the label-free intermediate source
    #[arg(long, value_name = "FILE")]
    intermediate: Option<PathBuf>,
}

fn output_path(opts: &Opts) -> PathBuf {
    opts.output.clone().unwrap_or_else(|| opts.input.with_extension("bin"))
}

fn write(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

/// Assembly errors are reported by line and yield `Ok(false)`.
fn run(opts: &Opts) -> Result<bool> {
    let cfg = match &opts.config {
        Some(path) => AsmConfig::load(path)?,
        None => AsmConfig::default(),
    };
    let src = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;

    let assembly = match Assembler::new(cfg).assemble(&src) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(false);
        }
    };

    if opts.dump {
        print!("{}", assembly.dump());
    }
    if let Some(path) = &opts.intermediate {
        write(path, &assembly.intermediate_source())?;
    }
    let out = output_path(opts);
    write(&out, &assembly.listing())?;
    println!("Wrote output to {}", out.display());
    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(FAILURE);
        }
    };

    match run(&opts) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(FAILURE),
        Err(e) => {
            eprintln!("error: {e:#}");
            let _ = Opts::command().print_help();
            ExitCode::from(FAILURE)
        }
    }
}
