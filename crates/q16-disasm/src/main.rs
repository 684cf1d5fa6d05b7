use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use q16asm::decoder::Decoder;
use q16asm::disasm::fmt_decoded;
use q16asm::emit::fmt_opcode;
use q16asm::isa::q16::Q16Decoder;

use q16_disasm::{analyze, load_listing, Image, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "Q16 listing disassembler", long_about = None)]
struct Cli {
    /// Listing written by q16asm
    #[arg(value_name = "LISTING")]
    input: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show code and data segment sizes
    Sections {
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Disassemble every instruction
    Listing {
        /// Show the grouped opcode bits
        #[arg(long)]
        show_bits: bool,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Control-flow edges and basic blocks
    Analyze {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn render_sections(img: &Image) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "{:<6} {:>5} {:>5} {:<5}", "name", "start", "len", "unit");
    for s in img.segments() {
        let _ = writeln!(buf, "{:<6} {:>5} {:>5} {:<5}", s.name, s.base, s.len, s.unit);
    }
    buf
}

fn render_listing(img: &Image, show_bits: bool) -> String {
    let dec = Q16Decoder::new();
    let mut buf = String::new();
    for (pc, &raw) in img.code.iter().enumerate() {
        let text = match dec.decode(raw) {
            Some(d) => fmt_decoded(&d),
            None => format!(".word {raw:#06x}"),
        };
        if show_bits {
            let _ = writeln!(buf, "{pc:02}: {}  {text}", fmt_opcode(raw));
        } else {
            let _ = writeln!(buf, "{pc:02}: {text}");
        }
    }
    if !img.data.is_empty() {
        let _ = writeln!(buf, "data: {:?}", img.data);
    }
    buf
}

fn render_report(report: &Report) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "Analysis summary:");
    let _ = writeln!(buf, "  insts     : {}", report.instructions);
    let _ = writeln!(buf, "  blocks    : {}", report.blocks.len());
    let _ = writeln!(buf, "  edges     : {}", report.edges.len());
    let _ = writeln!(buf, "Edges:");
    for e in &report.edges {
        let _ = writeln!(buf, "  {:02} -> {:02} ({})", e.from, e.to, e.kind.short());
    }
    let _ = writeln!(buf, "Blocks:");
    for b in &report.blocks {
        let _ = writeln!(buf, "  [{:02}, {:02})", b.start, b.end);
        for (pc, insn) in (b.start..).zip(&b.insns) {
            let _ = writeln!(buf, "    {pc:02}: {insn}");
        }
    }
    if !report.dangling.is_empty() {
        let _ = writeln!(buf, "Dangling branches: {:?}", report.dangling);
    }
    if !report.undecodable.is_empty() {
        let _ = writeln!(buf, "Undecodable words: {:?}", report.undecodable);
    }
    buf
}

fn write_out(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let img = load_listing(&cli.input)?;

    match cli.cmd {
        Command::Sections { out } => write_out(out.as_deref(), &render_sections(&img))?,
        Command::Listing { show_bits, out } => write_out(out.as_deref(), &render_listing(&img, show_bits))?,
        Command::Analyze { format, out } => {
            let report = analyze(&img);
            let text = match format {
                OutputFormat::Text => render_report(&report),
                OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
            };
            write_out(out.as_deref(), &text)?;
        }
    }

    Ok(())
}
