use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::decoder::Op;
use crate::exec::MicroOp;
pub use crate::isa::nmos::TABLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddrMode {
    /// No operand bytes. Shifts and rotates in this mode act on the accumulator.
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddrMode {
    /// Total encoded size, opcode included.
    pub const fn size(self) -> u8 {
        match self {
            AddrMode::Implied => 1,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => 3,
            _ => 2,
        }
    }

    /// Suffix appended to the upper-case mnemonic to form a descriptor name.
    pub const fn suffix(self) -> &'static str {
        match self {
            AddrMode::Implied | AddrMode::Relative => "",
            AddrMode::Immediate => "_IMM",
            AddrMode::ZeroPage => "_ZP",
            AddrMode::ZeroPageX => "_ZP_X",
            AddrMode::ZeroPageY => "_ZP_Y",
            AddrMode::Absolute => "_ABS",
            AddrMode::AbsoluteX => "_ABS_X",
            AddrMode::AbsoluteY => "_ABS_Y",
            AddrMode::Indirect => "_IND",
            AddrMode::IndirectX => "_IND_X",
            AddrMode::IndirectY => "_IND_Y",
        }
    }

    /// Tests whether normalized operand text (lowercase, no whitespace) is
    /// written in this addressing mode.
    pub fn matches(self, operand: &str) -> bool {
        match self {
            AddrMode::Implied => operand.is_empty(),
            AddrMode::Immediate => operand.strip_prefix('#').is_some_and(is_immediate_literal),
            AddrMode::ZeroPage => is_hex(operand, 1, 2),
            AddrMode::ZeroPageX => operand.strip_suffix(",x").is_some_and(|o| is_hex(o, 1, 2)),
            AddrMode::ZeroPageY => operand.strip_suffix(",y").is_some_and(|o| is_hex(o, 1, 2)),
            AddrMode::Absolute => is_ident(operand) || is_hex(operand, 3, 4),
            AddrMode::AbsoluteX => operand
                .strip_suffix(",x")
                .is_some_and(|o| is_ident(o) || is_hex(o, 3, 4)),
            AddrMode::AbsoluteY => operand
                .strip_suffix(",y")
                .is_some_and(|o| is_ident(o) || is_hex(o, 3, 4)),
            AddrMode::Indirect => operand
                .strip_prefix('(')
                .and_then(|o| o.strip_suffix(')'))
                .is_some_and(|o| is_ident(o) || is_hex(o, 1, 4)),
            AddrMode::IndirectX => operand
                .strip_prefix('(')
                .and_then(|o| o.strip_suffix(",x)"))
                .is_some_and(|o| is_hex(o, 1, 2)),
            AddrMode::IndirectY => operand
                .strip_prefix('(')
                .and_then(|o| o.strip_suffix("),y"))
                .is_some_and(|o| is_hex(o, 1, 2)),
            AddrMode::Relative => is_ident(operand) || is_hex(operand, 1, 2),
        }
    }
}

/// `$` followed by `min..=max` hex digits.
fn is_hex(s: &str, min: usize, max: usize) -> bool {
    s.strip_prefix('$').is_some_and(|digits| {
        (min..=max).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

fn is_immediate_literal(s: &str) -> bool {
    if is_hex(s, 1, 2) {
        return true;
    }
    if let Some(bits) = s.strip_prefix('%') {
        return (1..=8).contains(&bits.len()) && bits.bytes().all(|b| b == b'0' || b == b'1');
    }
    (1..=3).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn is_ident(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[derive(Clone, Copy)]
pub struct InstrDesc {
    pub name: &'static str,
    pub opcode: u8,
    pub op: Op,
    pub mode: AddrMode,
    pub micro: MicroOp,
}

impl InstrDesc {
    pub const fn new(opcode: u8, name: &'static str, op: Op, mode: AddrMode, micro: MicroOp) -> Self {
        Self { name, opcode, op, mode, micro }
    }

    pub const fn size(&self) -> u8 {
        self.mode.size()
    }

    pub const fn mnemonic(&self) -> &'static str {
        self.op.mnemonic()
    }
}

impl fmt::Debug for InstrDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrDesc")
            .field("name", &self.name)
            .field("opcode", &format_args!("{:#04x}", self.opcode))
            .field("op", &self.op)
            .field("mode", &self.mode)
            .finish()
    }
}

impl PartialEq for InstrDesc {
    fn eq(&self, other: &Self) -> bool {
        self.opcode == other.opcode
    }
}

impl Eq for InstrDesc {}

static BY_NAME: Lazy<HashMap<&'static str, &'static InstrDesc>> =
    Lazy::new(|| TABLE.iter().map(|d| (d.name, d)).collect());

static BY_OPCODE: Lazy<[Option<&'static InstrDesc>; 256]> = Lazy::new(|| {
    let mut ops = [None; 256];
    for d in TABLE.iter() {
        ops[d.opcode as usize] = Some(d);
    }
    ops
});

pub fn lookup_by_name(name: &str) -> Option<&'static InstrDesc> {
    BY_NAME.get(name).copied()
}

pub fn lookup_by_opcode(opcode: u8) -> Option<&'static InstrDesc> {
    BY_OPCODE[opcode as usize]
}

/// All encodings of a mnemonic, in opcode order.
pub fn by_mnemonic(mnemonic: &str) -> impl Iterator<Item = &'static InstrDesc> + '_ {
    TABLE.iter().filter(move |d| d.mnemonic() == mnemonic)
}
