pub mod asm;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod emulator;
pub mod exec;
pub mod instructions;
pub mod macros;
pub mod memory;
pub mod parser;

pub mod isa {
    pub mod nmos; // documented NMOS 6502 opcode set
}

pub use asm::{AsmError, AsmUnit, Label, Operand, Program, RelativeLabel};
pub use cpu::{Cpu, Status, Trap};
pub use emulator::{Emulator, EmulatorConfig, StopReason};
pub use memory::{Bus, BusError, Device, LinearMemory, MemoryBus, Ram, Rom};
pub use parser::Parser;
