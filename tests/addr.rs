use mos6502_rs::isa::nmos::NmosDecoder;
use mos6502_rs::{Cpu, LinearMemory};

fn machine(code: &[u8]) -> (Cpu, LinearMemory) {
    let mut mem = LinearMemory::new(0x10000);
    mem.load(0x0200, code);
    let mut cpu = Cpu::new();
    cpu.reset(0x0200);
    (cpu, mem)
}

fn steps(cpu: &mut Cpu, mem: &mut LinearMemory, n: usize) {
    for _ in 0..n {
        cpu.step(mem, &NmosDecoder).unwrap();
    }
}

#[test]
fn zero_page_indexed_wraps_within_page_zero() {
    // LDX #$10; LDA $F8,X
    let (mut cpu, mut mem) = machine(&[0xA2, 0x10, 0xB5, 0xF8]);
    mem.mem[0x0008] = 0x11;
    mem.mem[0x0108] = 0x22;
    steps(&mut cpu, &mut mem, 2);
    assert_eq!(cpu.a, 0x11);
    assert_eq!(cpu.ad, 0x0008);
}

#[test]
fn absolute_indexed() {
    // LDY #4; LDA $1000,Y; LDX #1; STA $2000,X
    let (mut cpu, mut mem) = machine(&[0xA0, 0x04, 0xB9, 0x00, 0x10, 0xA2, 0x01, 0x9D, 0x00, 0x20]);
    mem.mem[0x1004] = 0x33;
    steps(&mut cpu, &mut mem, 4);
    assert_eq!(cpu.a, 0x33);
    assert_eq!(mem.mem[0x2001], 0x33);
}

#[test]
fn indexed_indirect() {
    // LDX #2; LDA ($20,X)
    let (mut cpu, mut mem) = machine(&[0xA2, 0x02, 0xA1, 0x20]);
    mem.mem[0x22] = 0x34;
    mem.mem[0x23] = 0x12;
    mem.mem[0x1234] = 0x44;
    steps(&mut cpu, &mut mem, 2);
    assert_eq!(cpu.a, 0x44);
}

#[test]
fn indirect_indexed() {
    // LDY #1; LDA ($30),Y
    let (mut cpu, mut mem) = machine(&[0xA0, 0x01, 0xB1, 0x30]);
    mem.mem[0x30] = 0x00;
    mem.mem[0x31] = 0x20;
    mem.mem[0x2001] = 0x55;
    steps(&mut cpu, &mut mem, 2);
    assert_eq!(cpu.a, 0x55);
    assert_eq!(cpu.ad, 0x2001);
}

#[test]
fn jmp_indirect_pointer_does_not_cross_page() {
    // JMP ($10FF)
    let (mut cpu, mut mem) = machine(&[0x6C, 0xFF, 0x10]);
    mem.mem[0x10FF] = 0x34;
    mem.mem[0x1000] = 0x12;
    mem.mem[0x1100] = 0x99;
    steps(&mut cpu, &mut mem, 1);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn jmp_absolute() {
    let (mut cpu, mut mem) = machine(&[0x4C, 0x00, 0x30]);
    steps(&mut cpu, &mut mem, 1);
    assert_eq!(cpu.pc, 0x3000);
}

#[test]
fn stx_zero_page_y() {
    // LDY #1; LDX #7; STX $40,Y
    let (mut cpu, mut mem) = machine(&[0xA0, 0x01, 0xA2, 0x07, 0x96, 0x40]);
    steps(&mut cpu, &mut mem, 3);
    assert_eq!(mem.mem[0x41], 7);
}
