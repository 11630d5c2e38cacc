use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mos6502_rs::emulator::{Emulator, EmulatorConfig, StopReason};
use mos6502_rs::memory::{map_prg, Ram, TraceObserver};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a raw 6502 binary on the mos6502-rs emulator")]
struct Opts {
    /// Load address of the image. Ignored with --prg.
    #[arg(short, long, value_parser = parse_addr, default_value = "0x8000")]
    load: u16,
    /// Map the image as a cartridge PRG at 0x8000 (a 16 KiB bank is mirrored at 0xC000).
    #[arg(long)]
    prg: bool,
    /// Bytes of RAM mapped at 0x0000.
    #[arg(long, value_parser = parse_addr, default_value = "0x0800")]
    ram: u16,
    /// JSON file with an EmulatorConfig.
    #[arg(long)]
    config: Option<String>,
    /// Override the instruction cap; 0 disables it.
    #[arg(long)]
    max_instructions: Option<u64>,
    /// Print the per-PC execution counts after the run.
    #[arg(long)]
    heat: bool,
    #[arg(value_name = "BINFILE")]
    input: String,
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("bad address `{s}`: {e}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let mut cfg = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<EmulatorConfig>(&text).with_context(|| format!("parsing {path}"))?
        }
        None => EmulatorConfig::default(),
    };
    if let Some(cap) = opts.max_instructions {
        cfg.max_instructions = (cap != 0).then_some(cap);
    }
    cfg.count |= opts.heat;

    let bytes = std::fs::read(&opts.input).with_context(|| format!("reading {}", opts.input))?;

    let mut emu = Emulator::new(cfg);
    if opts.ram > 0 {
        emu.bus_mut().map(Ram::new(opts.ram as usize).with_observer(TraceObserver::new("ram")), 0)?;
    }
    if opts.prg {
        map_prg(emu.bus_mut(), bytes)?;
        emu.reset();
    } else {
        emu.load(bytes, opts.load)?;
    }

    match emu.run() {
        Ok(StopReason::Break) => {}
        Ok(StopReason::InstructionCap) => eprintln!("stopped: instruction cap reached"),
        Err(trap) => eprintln!("TRAP: {trap}"),
    }

    println!("{}", serde_json::to_string_pretty(&emu.status())?);
    if opts.heat {
        for entry in emu.heat_map() {
            println!("{:04x}  {:>8}  {}", entry.pc, entry.count, entry.name);
        }
    }
    Ok(())
}
