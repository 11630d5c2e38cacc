use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::cpu::{Cpu, Status, Trap, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
use crate::exec::Regs;
use crate::instructions::InstrDesc;
use crate::isa::nmos::NmosDecoder;
use crate::memory::{Bus, BusError, Device, DeviceId, MemoryBus, Rom};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Force a halt after this many instructions in a single `run`.
    pub max_instructions: Option<u64>,
    /// Keep a per-PC execution count.
    pub count: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            max_instructions: Some(1_000_000),
            count: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Break,
    InstructionCap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vectors {
    pub nmi: u16,
    pub reset: u16,
    pub irq: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatEntry {
    pub pc: u16,
    pub count: u64,
    pub name: &'static str,
}

pub struct Emulator {
    cpu: Cpu,
    bus: MemoryBus,
    dec: NmosDecoder,
    cfg: EmulatorConfig,
    vectors: Vectors,
    cycles: u64,
    heat: BTreeMap<u16, (u64, &'static str)>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}

impl Emulator {
    pub fn new(cfg: EmulatorConfig) -> Self {
        Self::with_bus(MemoryBus::new(), cfg)
    }

    pub fn with_bus(bus: MemoryBus, cfg: EmulatorConfig) -> Self {
        Self {
            cpu: Cpu::new(),
            bus,
            dec: NmosDecoder,
            cfg,
            vectors: Vectors::default(),
            cycles: 0,
            heat: BTreeMap::new(),
        }
    }

    pub fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MemoryBus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.cfg
    }

    /// Map `rom` read-only from `offset` to the end of its extent and reset
    /// the CPU through the freshly mapped vectors.
    pub fn load(&mut self, rom: impl Into<Vec<u8>>, offset: u16) -> Result<DeviceId, BusError> {
        let rom = Rom::new(rom);
        let end = (offset as u32 + rom.len() as u32).min(0x1_0000);
        let id = self.bus.attach(rom);
        self.bus.connect(id, offset, end, offset)?;
        self.reset();
        Ok(id)
    }

    /// Zero the registers and latch the three vectors from the bus.
    /// Device contents are untouched; see `MemoryBus::reset`.
    pub fn reset(&mut self) {
        self.vectors = Vectors {
            nmi: self.bus.read_u16(NMI_VECTOR),
            reset: self.bus.read_u16(RESET_VECTOR),
            irq: self.bus.read_u16(IRQ_VECTOR),
        };
        self.cpu.reset(self.vectors.reset);
        self.cycles = 0;
        self.heat.clear();
        debug!(
            nmi = format_args!("{:#06x}", self.vectors.nmi),
            reset = format_args!("{:#06x}", self.vectors.reset),
            irq = format_args!("{:#06x}", self.vectors.irq),
            "reset"
        );
    }

    pub fn step(&mut self) -> Result<&'static InstrDesc, Trap> {
        let pc = self.cpu.pc;
        let desc = match self.cpu.step(&mut self.bus, &self.dec) {
            Ok(d) => d,
            Err(trap) => {
                self.cpu.halted = true;
                return Err(trap);
            }
        };
        self.cycles += 1;
        if self.cfg.count {
            self.heat.entry(pc).or_insert((0, desc.name)).0 += 1;
        }
        trace!(
            pc = format_args!("{pc:#06x}"),
            name = desc.name,
            a = self.cpu.a,
            x = self.cpu.x,
            y = self.cpu.y,
            sp = self.cpu.sp,
            p = self.cpu.status.bits(),
            "step"
        );
        Ok(desc)
    }

    /// Step until BRK halts the CPU or the configured instruction cap is hit.
    pub fn run(&mut self) -> Result<StopReason, Trap> {
        let mut executed = 0u64;
        loop {
            if self.cfg.max_instructions.is_some_and(|cap| executed >= cap) {
                warn!(pc = format_args!("{:#06x}", self.cpu.pc), executed, "instruction cap reached");
                self.cpu.halted = true;
                return Ok(StopReason::InstructionCap);
            }
            self.step()?;
            executed += 1;
            if self.cpu.halted {
                debug!(pc = format_args!("{:#06x}", self.cpu.pc), executed, "halted");
                return Ok(StopReason::Break);
            }
        }
    }

    /// Enter the NMI handler: push PC and P, mask IRQs, jump through the
    /// latched vector and run until the next halt.
    pub fn nmi(&mut self) -> Result<StopReason, Trap> {
        let pc = self.cpu.pc;
        let p = (self.cpu.status | Status::U) - Status::B;
        let mut regs = Regs::new(&mut self.cpu, &mut self.bus);
        regs.push((pc >> 8) as u8)?;
        regs.push(pc as u8)?;
        regs.push(p.bits())?;
        self.cpu.status.insert(Status::I);
        self.cpu.pc = self.vectors.nmi;
        debug!(vector = format_args!("{:#06x}", self.vectors.nmi), "nmi");
        self.run()
    }

    /// Snapshot of the register file, scratch registers included.
    pub fn status(&self) -> Cpu {
        self.cpu.clone()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn vectors(&self) -> Vectors {
        self.vectors
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.halted
    }

    /// Instructions executed since the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Execution counts per PC, ordered by address. Empty unless counting
    /// is enabled.
    pub fn heat_map(&self) -> Vec<HeatEntry> {
        self.heat
            .iter()
            .map(|(&pc, &(count, name))| HeatEntry { pc, count, name })
            .collect()
    }
}
