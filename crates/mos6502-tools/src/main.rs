use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use mos6502_rs::disasm::{decode_at, fmt_unit};
use mos6502_tools::{load_raw_bin, split_ines, Image, Segment};

#[derive(Parser, Debug)]
#[command(author, version, about = "6502 disassembler CLI", long_about = None)]
struct Cli {
    /// Load address for the binary in CPU address space
    #[arg(long, value_parser = parse_u16, default_value = "0x8000")]
    base: u16,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Treat the input as an iNES cartridge and map its PRG ROM
    #[arg(long)]
    ines: bool,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments
    Sections,
    /// Print the NMI, RESET and IRQ vectors
    Vectors,
    /// Disassemble a range [start, end)
    Range {
        /// Start address (hex with 0x or $, or decimal)
        #[arg(value_parser = parse_u16)]
        start: u16,
        /// End address, exclusive
        #[arg(value_parser = parse_u32)]
        end: u32,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct LineOut {
    addr: u16,
    bytes: Vec<u8>,
    text: String,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).or_else(|| s.strip_prefix('$')) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("bad address `{s}`: {e}"))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let v = parse_u32(s)?;
    u16::try_from(v).map_err(|_| format!("address `{s}` is outside the 16-bit space"))
}

fn segment_at(img: &Image, addr: u16) -> Option<&Segment> {
    img.segments
        .iter()
        .find(|s| addr >= s.base && ((addr - s.base) as usize) < s.bytes.len())
}

/// Linear sweep. Unknown opcodes are shown as `.byte` so addresses stay aligned.
fn listing(img: &Image, start: u16, end: u32) -> Vec<LineOut> {
    let mut out = Vec::new();
    let mut pc = start as u32;
    while pc < end {
        let addr = pc as u16;
        let Some(seg) = segment_at(img, addr) else {
            out.push(LineOut { addr, bytes: vec![], text: "<unmapped>".into() });
            break;
        };
        let off = (addr - seg.base) as usize;
        let (text, size) = match decode_at(&seg.bytes, off) {
            Some((unit, size)) => (fmt_unit(&unit), size),
            None => (format!(".byte ${:02x}", seg.bytes[off]), 1),
        };
        out.push(LineOut { addr, bytes: seg.bytes[off..off + size].to_vec(), text });
        pc += size as u32;
    }
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let img = if cli.ines {
        let file = std::fs::read(&cli.input).with_context(|| format!("reading {}", cli.input))?;
        let (hdr, img, _chr) = split_ines(&file)?;
        eprintln!(
            "iNES: {} PRG bank(s), {} CHR bank(s), mapper {}",
            hdr.prg_banks,
            hdr.chr_banks,
            hdr.mapper()
        );
        img
    } else {
        load_raw_bin(Path::new(&cli.input), cli.base, cli.skip, cli.len)?
    };

    match cli.cmd {
        Command::Sections => {
            println!("{:<12} {:<8} {:<8} {:<6}", "name", "start", "end", "kind");
            for s in &img.segments {
                let end = s.base as u32 + s.bytes.len() as u32;
                println!("{:<12} {:#06x}   {end:#07x}  {:<6}", s.name, s.base, s.kind);
            }
        }
        Command::Vectors => {
            for (name, at) in [("nmi", 0xFFFAu16), ("reset", 0xFFFC), ("irq", 0xFFFE)] {
                match mos6502_tools::read_u16(&img, at) {
                    Some(v) => println!("{name:<6} {v:#06x}"),
                    None => println!("{name:<6} <unmapped>"),
                }
            }
        }
        Command::Range { start, end, show_bytes, format, out } => {
            anyhow::ensure!(end >= start as u32, "end must be >= start");
            let lines = listing(&img, start, end);
            let buf = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&lines)?,
                OutputFormat::Text => {
                    let mut buf = String::new();
                    for l in &lines {
                        if show_bytes {
                            let hex: Vec<String> = l.bytes.iter().map(|b| format!("{b:02x}")).collect();
                            buf.push_str(&format!("{:04x}: {:<9} {}\n", l.addr, hex.join(" "), l.text));
                        } else {
                            buf.push_str(&format!("{:04x}: {}\n", l.addr, l.text));
                        }
                    }
                    buf
                }
            };
            match out {
                Some(path) => std::fs::write(&path, buf).with_context(|| format!("writing {path}"))?,
                None => print!("{buf}"),
            }
        }
    }
    Ok(())
}
