use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::decoder::Decoder;
use crate::exec::Regs;
use crate::instructions::InstrDesc;
use crate::memory::{Bus, BusError};

pub const STACK_BASE: u16 = 0x0100;
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status: u8 {
const C = 1 << 0; // Carry
const Z = 1 << 1; // Zero
const I = 1 << 2; // IRQ disable
const D = 1 << 3; // Decimal (stored, never acted on)
const B = 1 << 4; // Break
const U = 1 << 5; // Unused, always pushed set
const V = 1 << 6; // Overflow
const N = 1 << 7; // Negative
}
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalOpcode { pc: u16, opcode: u8 },
    #[error("bus error at {addr:#06x}: {source}")]
    Bus {
        addr: u16,
        #[source]
        source: BusError,
    },
}

/// Architectural registers plus the two scratch registers the micro-ops use:
/// `ad` holds the last effective address, `sir` the last signed intermediate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub ad: u16,
    pub sir: i8,
    pub status: Status,
    pub halted: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            ad: 0,
            sir: 0,
            status: Status::empty(),
            halted: true,
        }
    }

    pub fn reset(&mut self, reset_pc: u16) {
        *self = Self::new();
        self.pc = reset_pc;
    }

    pub fn flag(&self, f: Status) -> bool {
        self.status.contains(f)
    }

    /// Execute one instruction at `pc`. The opcode byte is consumed before
    /// the micro-op runs, so operand fetches start at the following byte.
    pub fn step<B: Bus, D: Decoder>(&mut self, bus: &mut B, dec: &D) -> Result<&'static InstrDesc, Trap> {
        let pc = self.pc;
        let opcode = bus.read(pc);
        let desc = dec.decode(opcode).ok_or(Trap::IllegalOpcode { pc, opcode })?;
        self.pc = pc.wrapping_add(1);
        self.halted = false;
        let mut regs = Regs::new(self, bus);
        (desc.micro)(&mut regs, desc.mode)?;
        Ok(desc)
    }
}
