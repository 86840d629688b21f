use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hovalaag_asm::assemble;

#[derive(Parser, Debug)]
#[command(author, version, about = "Assembler for the Hovalaag CPU")]
struct Opts {
    /// Assembly source file
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
    /// Output file
    #[arg(short, long, default_value = "a.out")]
    output: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Bin)]
    format: Format,
    /// Print a listing of the assembled program to stdout
    #[arg(long)]
    listing: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// little-endian 32-bit words
    Bin,
    /// Verilog case statement rows
    Verilog,
    /// decoded fields as JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let source = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("couldn't open '{}'", opts.input.display()))?;

    let asm = assemble(&source)?;
    info!("assembled {} instructions", asm.program.len());

    if opts.listing {
        print!("{}", asm.listing());
    }

    let bytes = match opts.format {
        Format::Bin => asm.program.to_bytes(),
        Format::Verilog => asm.program.to_verilog().into_bytes(),
        Format::Json => serde_json::to_vec_pretty(asm.program.instructions())?,
    };
    std::fs::write(&opts.output, bytes)
        .with_context(|| format!("couldn't write '{}'", opts.output.display()))?;
    Ok(())
}
