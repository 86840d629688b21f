use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use hovalaag_asm::disasm::fmt_with_labels;
use hovalaag_asm::PackedInstruction;
use hovalaag_disasm::{branch_targets, edges, import_source_labels, load_image, Edge, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hovalaag image disassembler", long_about = None)]
struct Cli {
    /// Input image (little-endian 32-bit words)
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Source the image was assembled from; its labels name the addresses
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Linear listing of every instruction
    List {
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Control-flow edges between instructions
    Analyze {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write analysis output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Serialize)]
struct InstructionOut<'a> {
    pc: u8,
    word: String,
    text: String,
    label: Option<&'a str>,
    fields: PackedInstruction,
}

#[derive(Serialize)]
struct Report<'a> {
    instructions: Vec<InstructionOut<'a>>,
    edges: Vec<Edge>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut img = load_image(&cli.input)?;
    let flow = edges(&img.program);

    match &cli.source {
        Some(src) => {
            if !import_source_labels(&mut img, src)? {
                warn!("'{}' does not assemble to this image; labels may be stale", src.display());
            }
        }
        None => {
            for pc in branch_targets(&flow) {
                img.labels.insert(pc, format!("L{pc}"));
            }
        }
    }

    match cli.cmd {
        Command::List { out } => emit(out, listing(&img)),
        Command::Analyze { format: OutputFormat::Text, out } => emit(out, edge_text(&img, &flow)),
        Command::Analyze { format: OutputFormat::Json, out } => {
            let text = serde_json::to_string_pretty(&Report { instructions: rows(&img), edges: flow.clone() })?;
            emit(out, text)
        }
    }
}

fn name_of(img: &Image, pc: u8) -> String {
    img.labels.get(&pc).cloned().unwrap_or_else(|| pc.to_string())
}

fn rows(img: &Image) -> Vec<InstructionOut<'_>> {
    img.program
        .instructions()
        .iter()
        .enumerate()
        .map(|(pc, ins)| {
            let pc = pc as u8;
            InstructionOut {
                pc,
                word: format!("{:08x}", ins.encode()),
                text: fmt_with_labels(ins, |t| img.labels.get(&t).cloned()),
                label: img.labels.get(&pc).map(String::as_str),
                fields: *ins,
            }
        })
        .collect()
}

fn listing(img: &Image) -> String {
    let mut s = String::new();
    for row in rows(img) {
        if let Some(l) = row.label {
            s.push_str(&format!("{l}:\n"));
        }
        s.push_str(&format!("  {:3}: {}  {}\n", row.pc, row.word, row.text));
    }
    s
}

fn edge_text(img: &Image, flow: &[Edge]) -> String {
    flow.iter()
        .map(|e| format!("{} -> {} ({:?})\n", name_of(img, e.from), name_of(img, e.to), e.kind))
        .collect()
}

fn emit(out: Option<PathBuf>, text: String) -> Result<()> {
    match out {
        Some(path) => std::fs::write(&path, text)
            .with_context(|| format!("couldn't write '{}'", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
