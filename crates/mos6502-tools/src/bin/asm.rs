use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mos6502_rs::disasm::fmt_unit;
use mos6502_rs::Program;

#[derive(Parser, Debug)]
#[command(author, version, about = "6502 assembler: text source to flat binary")]
struct Opts {
    /// Input assembly file (one instruction, label or directive per line)
    #[arg(short, long)]
    input: PathBuf,
    /// Output binary file
    #[arg(short, long)]
    output: PathBuf,
    /// Buffer capacity in bytes
    #[arg(long, default_value_t = Program::DEFAULT_SIZE)]
    size: usize,
    /// Keep the whole buffer instead of cutting it at the last write
    #[arg(long)]
    no_clamp: bool,
    /// Print the parsed program back as text
    #[arg(long)]
    listing: bool,
    /// Export labels to JSON (Vec<{ addr, name }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct LabelKV {
    addr: u16,
    name: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let src = fs::read_to_string(&opts.input).with_context(|| format!("reading {}", opts.input.display()))?;
    let prg = mos6502_rs::Parser::with_size(opts.size)
        .parse(&src)
        .with_context(|| format!("assembling {}", opts.input.display()))?;

    if opts.listing {
        for unit in prg.assembly() {
            println!("    {}", fmt_unit(unit));
        }
    }

    let bytes = prg.build(!opts.no_clamp)?;
    fs::write(&opts.output, &bytes).with_context(|| format!("writing {}", opts.output.display()))?;

    if let Some(path) = &opts.labels_out {
        let labels: Vec<LabelKV> = prg
            .labels()
            .iter()
            .map(|(name, &addr)| LabelKV { addr, name: name.clone() })
            .collect();
        fs::write(path, serde_json::to_string_pretty(&labels)?)?;
    }

    eprintln!(
        "{} bytes, {} labels, origin {:#06x}",
        bytes.len(),
        prg.labels().len(),
        prg.origin()
    );
    Ok(())
}
