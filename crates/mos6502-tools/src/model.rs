use anyhow::Result;
use serde::Serialize;
use std::path::Path;

pub const PRG_BANK: usize = 0x4000;
pub const CHR_BANK: usize = 0x2000;

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub name: String,
    pub base: u16,
    pub bytes: Vec<u8>,
    pub kind: &'static str, // "raw" or "prg"
}

impl Segment {
    fn end(&self) -> u32 {
        self.base as u32 + self.bytes.len() as u32
    }
}

/// CPU-visible segments of a loaded file.
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub segments: Vec<Segment>,
}

pub fn load_raw_bin(path: &Path, base: u16, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    anyhow::ensure!(
        base as usize + payload.len() <= 0x1_0000,
        "image of {} bytes does not fit at {base:#06x}",
        payload.len()
    );
    let seg = Segment { name: "segment0".into(), base, bytes: payload.to_vec(), kind: "raw" };
    Ok(Image { segments: vec![seg] })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InesHeader {
    pub prg_banks: u8,
    pub chr_banks: u8,
    pub flags6: u8,
    pub flags7: u8,
}

impl InesHeader {
    pub fn mapper(&self) -> u8 {
        (self.flags7 & 0xF0) | (self.flags6 >> 4)
    }

    pub fn has_trainer(&self) -> bool {
        self.flags6 & 0x04 != 0
    }
}

/// Split an iNES cartridge into its header, the PRG image as the CPU sees it
/// (mirrored at 0xC000 for a single bank), and the raw CHR data.
pub fn split_ines(file: &[u8]) -> Result<(InesHeader, Image, Vec<u8>)> {
    anyhow::ensure!(file.len() >= 16 && &file[..4] == b"NES\x1a", "missing iNES signature");
    let hdr = InesHeader { prg_banks: file[4], chr_banks: file[5], flags6: file[6], flags7: file[7] };
    anyhow::ensure!(
        (1..=2).contains(&hdr.prg_banks),
        "{} PRG banks need a mapper; only 1 or 2 are supported",
        hdr.prg_banks
    );
    let prg_start = 16 + if hdr.has_trainer() { 512 } else { 0 };
    let prg_end = prg_start + hdr.prg_banks as usize * PRG_BANK;
    let chr_end = prg_end + hdr.chr_banks as usize * CHR_BANK;
    anyhow::ensure!(file.len() >= chr_end, "file truncated: {} bytes, header needs {chr_end}", file.len());

    let prg = &file[prg_start..prg_end];
    let mut segments = vec![Segment { name: "prg".into(), base: 0x8000, bytes: prg.to_vec(), kind: "prg" }];
    if hdr.prg_banks == 1 {
        segments.push(Segment { name: "prg_mirror".into(), base: 0xC000, bytes: prg.to_vec(), kind: "prg" });
    }
    Ok((hdr, Image { segments }, file[prg_end..chr_end].to_vec()))
}

pub fn read_u8(img: &Image, addr: u16) -> Option<u8> {
    img.segments
        .iter()
        .find(|s| (s.base as u32..s.end()).contains(&(addr as u32)))
        .map(|s| s.bytes[(addr - s.base) as usize])
}

pub fn read_u16(img: &Image, addr: u16) -> Option<u16> {
    let b0 = read_u8(img, addr)?;
    let b1 = read_u8(img, addr.wrapping_add(1))?;
    Some(u16::from_le_bytes([b0, b1]))
}

pub fn is_mapped(img: &Image, addr: u16) -> bool {
    read_u8(img, addr).is_some()
}
