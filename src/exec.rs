//! Micro-operations. Each documented `Op` has one function here, shared by
//! every addressing mode of that mnemonic; the descriptor supplies the mode.

use crate::cpu::{Cpu, Status, Trap, STACK_BASE};
use crate::instructions::AddrMode;
use crate::memory::Bus;

pub type MicroOp = fn(&mut Regs<'_>, AddrMode) -> Result<(), Trap>;

/// Register and bus access for one executing instruction.
pub struct Regs<'a> {
    cpu: &'a mut Cpu,
    bus: &'a mut dyn Bus,
}

impl<'a> Regs<'a> {
    pub fn new(cpu: &'a mut Cpu, bus: &'a mut dyn Bus) -> Self {
        Self { cpu, bus }
    }

    pub fn flag(&self, f: Status) -> bool {
        self.cpu.status.contains(f)
    }

    pub fn set_flag(&mut self, f: Status, on: bool) {
        self.cpu.status.set(f, on);
    }

    pub fn set_nz(&mut self, v: u8) {
        self.cpu.status.set(Status::Z, v == 0);
        self.cpu.status.set(Status::N, v & 0x80 != 0);
    }

    /// SIR keeps the low byte of `v`, sign-extended.
    pub fn set_sir(&mut self, v: u16) {
        self.cpu.sir = v as u8 as i8;
    }

    pub fn adl(&self) -> u8 {
        self.cpu.ad as u8
    }

    pub fn adh(&self) -> u8 {
        (self.cpu.ad >> 8) as u8
    }

    pub fn set_adl(&mut self, v: u8) {
        self.cpu.ad = (self.cpu.ad & 0xFF00) | v as u16;
    }

    pub fn set_adh(&mut self, v: u8) {
        self.cpu.ad = (self.cpu.ad & 0x00FF) | ((v as u16) << 8);
    }

    pub fn halt(&mut self) {
        self.cpu.halted = true;
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        self.bus.read(addr)
    }

    pub fn write(&mut self, addr: u16, val: u8) -> Result<(), Trap> {
        self.bus
            .write(addr, val)
            .map_err(|source| Trap::Bus { addr, source })
    }

    pub fn fetch(&mut self) -> u8 {
        let v = self.bus.read(self.cpu.pc);
        self.cpu.pc = self.cpu.pc.wrapping_add(1);
        v
    }

    pub fn fetch16(&mut self) -> u16 {
        let lo = self.fetch();
        let hi = self.fetch();
        u16::from_le_bytes([lo, hi])
    }

    pub fn push(&mut self, v: u8) -> Result<(), Trap> {
        let addr = STACK_BASE | self.cpu.sp as u16;
        self.write(addr, v)?;
        self.cpu.sp = self.cpu.sp.wrapping_sub(1);
        Ok(())
    }

    pub fn pull(&mut self) -> u8 {
        self.cpu.sp = self.cpu.sp.wrapping_add(1);
        self.read(STACK_BASE | self.cpu.sp as u16)
    }

    fn read_zp16(&mut self, zp: u8) -> u16 {
        let lo = self.read(zp as u16);
        let hi = self.read(zp.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    /// Resolve the effective address for `mode`, consuming operand bytes.
    /// The result is also left in AD.
    pub fn address(&mut self, mode: AddrMode) -> u16 {
        let addr = match mode {
            AddrMode::Implied | AddrMode::Relative => self.cpu.pc,
            AddrMode::Immediate => {
                let pc = self.cpu.pc;
                self.cpu.pc = pc.wrapping_add(1);
                pc
            }
            AddrMode::ZeroPage => self.fetch() as u16,
            AddrMode::ZeroPageX => self.fetch().wrapping_add(self.cpu.x) as u16,
            AddrMode::ZeroPageY => self.fetch().wrapping_add(self.cpu.y) as u16,
            AddrMode::Absolute => self.fetch16(),
            AddrMode::AbsoluteX => self.fetch16().wrapping_add(self.cpu.x as u16),
            AddrMode::AbsoluteY => self.fetch16().wrapping_add(self.cpu.y as u16),
            AddrMode::Indirect => {
                // The pointer's high byte never carries into the next page.
                let ptr = self.fetch16();
                let lo = self.read(ptr);
                let hi = self.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
                u16::from_le_bytes([lo, hi])
            }
            AddrMode::IndirectX => {
                let zp = self.fetch().wrapping_add(self.cpu.x);
                self.read_zp16(zp)
            }
            AddrMode::IndirectY => {
                let zp = self.fetch();
                self.read_zp16(zp).wrapping_add(self.cpu.y as u16)
            }
        };
        self.cpu.ad = addr;
        addr
    }

    pub fn operand(&mut self, mode: AddrMode) -> u8 {
        let addr = self.address(mode);
        self.read(addr)
    }

    /// Read-modify-write on memory, or on A for the accumulator form.
    fn modify(&mut self, mode: AddrMode, f: impl FnOnce(&mut Self, u8) -> u8) -> Result<(), Trap> {
        if mode == AddrMode::Implied {
            let a = self.cpu.a;
            let r = f(self, a);
            self.cpu.a = r;
            self.set_nz(r);
            return Ok(());
        }
        let addr = self.address(mode);
        let v = self.read(addr);
        let r = f(self, v);
        self.set_nz(r);
        self.write(addr, r)
    }

    fn compare(&mut self, reg: u8, mode: AddrMode) {
        let m = self.operand(mode);
        let diff = reg.wrapping_sub(m);
        self.set_sir(diff as u16);
        self.set_flag(Status::C, reg >= m);
        self.set_nz(diff);
    }

    fn add_with_carry(&mut self, m: u8) {
        let a = self.cpu.a;
        let sum = a as u16 + m as u16 + self.flag(Status::C) as u16;
        let r = sum as u8;
        self.set_flag(Status::C, sum > 0xFF);
        self.set_flag(Status::V, (!(a ^ m) & (a ^ r) & 0x80) != 0);
        self.cpu.a = r;
        self.set_nz(r);
    }

    /// The offset byte is always consumed; PC moves only when `taken`.
    fn branch(&mut self, taken: bool) {
        let off = self.fetch();
        self.set_sir(off as u16);
        if taken {
            self.cpu.pc = self.cpu.pc.wrapping_add(self.cpu.sir as i16 as u16);
        }
    }
}

pub fn lda(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let v = r.operand(mode);
    r.cpu.a = v;
    r.set_nz(v);
    Ok(())
}

pub fn ldx(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let v = r.operand(mode);
    r.cpu.x = v;
    r.set_nz(v);
    Ok(())
}

pub fn ldy(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let v = r.operand(mode);
    r.cpu.y = v;
    r.set_nz(v);
    Ok(())
}

pub fn sta(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let addr = r.address(mode);
    r.write(addr, r.cpu.a)
}

pub fn stx(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let addr = r.address(mode);
    r.write(addr, r.cpu.x)
}

pub fn sty(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let addr = r.address(mode);
    r.write(addr, r.cpu.y)
}

pub fn tax(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.x = r.cpu.a;
    r.set_nz(r.cpu.x);
    Ok(())
}

pub fn tay(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.y = r.cpu.a;
    r.set_nz(r.cpu.y);
    Ok(())
}

pub fn txa(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.a = r.cpu.x;
    r.set_nz(r.cpu.a);
    Ok(())
}

pub fn tya(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.a = r.cpu.y;
    r.set_nz(r.cpu.a);
    Ok(())
}

pub fn tsx(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.x = r.cpu.sp;
    r.set_nz(r.cpu.x);
    Ok(())
}

pub fn txs(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.sp = r.cpu.x;
    Ok(())
}

pub fn inx(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.x = r.cpu.x.wrapping_add(1);
    r.set_nz(r.cpu.x);
    Ok(())
}

pub fn iny(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.y = r.cpu.y.wrapping_add(1);
    r.set_nz(r.cpu.y);
    Ok(())
}

pub fn dex(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.x = r.cpu.x.wrapping_sub(1);
    r.set_nz(r.cpu.x);
    Ok(())
}

pub fn dey(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.cpu.y = r.cpu.y.wrapping_sub(1);
    r.set_nz(r.cpu.y);
    Ok(())
}

pub fn inc(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.modify(mode, |_, v| v.wrapping_add(1))
}

pub fn dec(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.modify(mode, |_, v| v.wrapping_sub(1))
}

pub fn adc(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let m = r.operand(mode);
    r.add_with_carry(m);
    Ok(())
}

pub fn sbc(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let m = r.operand(mode);
    r.add_with_carry(!m);
    Ok(())
}

pub fn and(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let m = r.operand(mode);
    r.cpu.a &= m;
    r.set_nz(r.cpu.a);
    Ok(())
}

pub fn ora(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let m = r.operand(mode);
    r.cpu.a |= m;
    r.set_nz(r.cpu.a);
    Ok(())
}

pub fn eor(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let m = r.operand(mode);
    r.cpu.a ^= m;
    r.set_nz(r.cpu.a);
    Ok(())
}

pub fn bit(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let m = r.operand(mode);
    r.set_flag(Status::Z, r.cpu.a & m == 0);
    r.set_flag(Status::N, m & 0x80 != 0);
    r.set_flag(Status::V, m & 0x40 != 0);
    Ok(())
}

pub fn cmp(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.compare(r.cpu.a, mode);
    Ok(())
}

pub fn cpx(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.compare(r.cpu.x, mode);
    Ok(())
}

pub fn cpy(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.compare(r.cpu.y, mode);
    Ok(())
}

pub fn asl(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.modify(mode, |r, v| {
        r.set_flag(Status::C, v & 0x80 != 0);
        v << 1
    })
}

pub fn lsr(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.modify(mode, |r, v| {
        r.set_flag(Status::C, v & 0x01 != 0);
        v >> 1
    })
}

pub fn rol(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.modify(mode, |r, v| {
        let carry_in = r.flag(Status::C) as u8;
        r.set_flag(Status::C, v & 0x80 != 0);
        (v << 1) | carry_in
    })
}

pub fn ror(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.modify(mode, |r, v| {
        let carry_in = if r.flag(Status::C) { 0x80 } else { 0 };
        r.set_flag(Status::C, v & 0x01 != 0);
        (v >> 1) | carry_in
    })
}

pub fn bpl(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(!r.flag(Status::N));
    Ok(())
}

pub fn bmi(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(r.flag(Status::N));
    Ok(())
}

pub fn bvc(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(!r.flag(Status::V));
    Ok(())
}

pub fn bvs(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(r.flag(Status::V));
    Ok(())
}

pub fn bcc(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(!r.flag(Status::C));
    Ok(())
}

pub fn bcs(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(r.flag(Status::C));
    Ok(())
}

pub fn bne(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(!r.flag(Status::Z));
    Ok(())
}

pub fn beq(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.branch(r.flag(Status::Z));
    Ok(())
}

pub fn jmp(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    r.cpu.pc = r.address(mode);
    Ok(())
}

/// Pushes the address of the last operand byte, high byte first.
pub fn jsr(r: &mut Regs<'_>, mode: AddrMode) -> Result<(), Trap> {
    let target = r.address(mode);
    let ret = r.cpu.pc.wrapping_sub(1);
    r.push((ret >> 8) as u8)?;
    r.push(ret as u8)?;
    r.cpu.pc = target;
    Ok(())
}

pub fn rts(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    let lo = r.pull();
    r.set_adl(lo);
    let hi = r.pull();
    r.set_adh(hi);
    r.cpu.pc = r.cpu.ad.wrapping_add(1);
    Ok(())
}

pub fn rti(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    let p = r.pull();
    r.cpu.status = Status::from_bits_retain(p) - Status::B;
    let lo = r.pull();
    r.set_adl(lo);
    let hi = r.pull();
    r.set_adh(hi);
    r.cpu.pc = r.cpu.ad;
    Ok(())
}

pub fn pha(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.push(r.cpu.a)
}

pub fn pla(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    let v = r.pull();
    r.cpu.a = v;
    r.set_nz(v);
    Ok(())
}

pub fn php(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    let p = r.cpu.status | Status::B | Status::U;
    r.push(p.bits())
}

pub fn plp(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    let p = r.pull();
    r.cpu.status = Status::from_bits_retain(p) - Status::B;
    Ok(())
}

/// Execution stops here; the emulator treats BRK as the end of a program.
pub fn brk(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::B, true);
    r.halt();
    Ok(())
}

pub fn nop(_: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    Ok(())
}

pub fn clc(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::C, false);
    Ok(())
}

pub fn sec(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::C, true);
    Ok(())
}

pub fn cli(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::I, false);
    Ok(())
}

pub fn sei(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::I, true);
    Ok(())
}

pub fn cld(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::D, false);
    Ok(())
}

pub fn sed(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::D, true);
    Ok(())
}

pub fn clv(r: &mut Regs<'_>, _: AddrMode) -> Result<(), Trap> {
    r.set_flag(Status::V, false);
    Ok(())
}
