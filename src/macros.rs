//! Small code generators built on `Program`. Every address argument is an
//! absolute address; helpers that loop allocate their own unique labels.

use crate::asm::{AsmError, Program};

/// `STA addr`, preceded by `LDA #value` when a value is given.
pub fn set_imm(prg: &mut Program, addr: u16, value: Option<u8>) -> Result<(), AsmError> {
    if let Some(v) = value {
        prg.add("LDA_IMM", v)?;
    }
    prg.add("STA_ABS", addr)
}

/// `STA addr`, preceded by `LDA src` when a source is given.
pub fn set_abs(prg: &mut Program, addr: u16, src: Option<u16>) -> Result<(), AsmError> {
    if let Some(src) = src {
        prg.add("LDA_ABS", src)?;
    }
    prg.add("STA_ABS", addr)
}

pub fn push(prg: &mut Program) -> Result<(), AsmError> {
    prg.add_implied("PHA")
}

pub fn push_imm(prg: &mut Program, value: u8) -> Result<(), AsmError> {
    prg.add("LDA_IMM", value)?;
    push(prg)
}

pub fn push_abs(prg: &mut Program, addr: u16) -> Result<(), AsmError> {
    prg.add("LDA_ABS", addr)?;
    push(prg)
}

pub fn pop(prg: &mut Program) -> Result<(), AsmError> {
    prg.add_implied("PLA")
}

pub fn pop_abs(prg: &mut Program, addr: u16) -> Result<(), AsmError> {
    pop(prg)?;
    prg.add("STA_ABS", addr)
}

pub fn jsr(prg: &mut Program, label: &str) -> Result<(), AsmError> {
    let target = prg.label(label);
    prg.add("JSR_ABS", target)
}

/// Copy `len` bytes from `src` to `dst` using X as the index. A `len` of 0
/// copies 256 bytes. Clobbers A and X.
pub fn copy(prg: &mut Program, dst: u16, src: u16, len: u8) -> Result<(), AsmError> {
    let lp = prg.create_unique_label_name("copy_loop");
    prg.add("LDX_IMM", 0u8)?;
    prg.set_label(&lp)?;
    prg.add("LDA_ABS_X", src)?;
    prg.add("STA_ABS_X", dst)?;
    prg.add_implied("INX")?;
    prg.add("CPX_IMM", len)?;
    let back = prg.relative_label(&lp);
    prg.add("BNE", back)
}

/// Unsigned 8-bit shift-and-subtract division. The quotient replaces the
/// byte at `numerator`; the remainder is left in A. Clobbers X.
pub fn div(prg: &mut Program, numerator: u16, denominator: u16) -> Result<(), AsmError> {
    let next_bit = prg.create_unique_label_name("div_bit");
    let no_sub = prg.create_unique_label_name("div_skip");
    prg.add("LDA_IMM", 0u8)?;
    prg.add("LDX_IMM", 8u8)?;
    prg.add("ASL_ABS", numerator)?;
    prg.set_label(&next_bit)?;
    prg.add_implied("ROL")?;
    prg.add("CMP_ABS", denominator)?;
    let skip = prg.relative_label(&no_sub);
    prg.add("BCC", skip)?;
    prg.add("SBC_ABS", denominator)?;
    prg.set_label(&no_sub)?;
    prg.add("ROL_ABS", numerator)?;
    prg.add_implied("DEX")?;
    let back = prg.relative_label(&next_bit);
    prg.add("BNE", back)
}
