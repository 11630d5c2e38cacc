use mos6502_rs::isa::nmos::NmosDecoder;
use mos6502_rs::{Cpu, LinearMemory, Status};

// Runs `code` from 0x0200 until BRK.
fn exec(code: &[u8], setup: impl FnOnce(&mut Cpu, &mut LinearMemory)) -> (Cpu, LinearMemory) {
    let mut mem = LinearMemory::new(0x10000);
    mem.load(0x0200, code);
    let mut cpu = Cpu::new();
    cpu.reset(0x0200);
    setup(&mut cpu, &mut mem);
    let dec = NmosDecoder;
    for _ in 0..1000 {
        cpu.step(&mut mem, &dec).unwrap();
        if cpu.halted {
            break;
        }
    }
    assert!(cpu.halted, "program did not reach BRK");
    (cpu, mem)
}

#[test]
fn lda_sets_n_and_z() {
    for (v, n, z) in [(0x00, false, true), (0x79, false, false), (0x80, true, false), (0xFF, true, false)] {
        let (cpu, _) = exec(&[0xA9, v], |_, _| {});
        assert_eq!(cpu.a, v);
        assert_eq!(cpu.flag(Status::N), n, "N after LDA #{v:#04x}");
        assert_eq!(cpu.flag(Status::Z), z, "Z after LDA #{v:#04x}");
    }
}

#[test]
fn cpy_against_0x10() {
    // (operand, C, Z, N)
    let cases = [
        (0x00, true, false, false),
        (0x10, true, true, false),
        (0x80, false, false, true),
        (0xFF, false, false, false),
    ];
    for (m, c, z, n) in cases {
        let (cpu, _) = exec(&[0xC0, m], |cpu, _| cpu.y = 0x10);
        assert_eq!(cpu.flag(Status::C), c, "C for CPY #{m:#04x}");
        assert_eq!(cpu.flag(Status::Z), z, "Z for CPY #{m:#04x}");
        assert_eq!(cpu.flag(Status::N), n, "N for CPY #{m:#04x}");
        assert_eq!(cpu.y, 0x10);
    }
}

#[test]
fn compare_records_signed_difference() {
    let (cpu, _) = exec(&[0xC0, 0x02], |cpu, _| cpu.y = 1); // CPY #2
    assert_eq!(cpu.sir, -1);
    assert!(!cpu.flag(Status::C));
    assert!(cpu.flag(Status::N));

    // CMP $10 with A = 5, [$10] = 3
    let (cpu, _) = exec(&[0xA9, 0x05, 0xC5, 0x10], |_, mem| mem.mem[0x10] = 3);
    assert_eq!(cpu.sir, 2);
    assert!(cpu.flag(Status::C));
}

#[test]
fn asl_accumulator() {
    // (in, out, C, N)
    for (v, out, c, n) in [(0x01, 0x02, false, false), (0x7F, 0xFE, false, true), (0xFE, 0xFC, true, true)] {
        let (cpu, _) = exec(&[0xA9, v, 0x0A], |_, _| {});
        assert_eq!(cpu.a, out);
        assert_eq!(cpu.flag(Status::C), c);
        assert_eq!(cpu.flag(Status::N), n);
    }
}

#[test]
fn lsr_accumulator() {
    let (cpu, _) = exec(&[0xA9, 0x01, 0x4A], |_, _| {});
    assert_eq!(cpu.a, 0);
    assert!(cpu.flag(Status::C));
    assert!(cpu.flag(Status::Z));

    let (cpu, _) = exec(&[0xA9, 0xFF, 0x4A], |_, _| {});
    assert_eq!(cpu.a, 0x7F);
    assert!(cpu.flag(Status::C));
    assert!(!cpu.flag(Status::N));
}

#[test]
fn rol_abs_doubles_memory() {
    let (_, mem) = exec(&[0x2E, 0x00, 0x10], |_, mem| mem.mem[0x1000] = 1); // ROL $1000
    assert_eq!(mem.mem[0x1000], 2);

    // Eight rotations push the bit out into carry.
    let code: Vec<u8> = [0x2E, 0x00, 0x10].repeat(8);
    let (cpu, mem) = exec(&code, |_, mem| mem.mem[0x1000] = 1);
    assert_eq!(mem.mem[0x1000], 0);
    assert!(cpu.flag(Status::C));
}

#[test]
fn rotates_feed_carry_in() {
    // SEC; LDA #$80; ROL
    let (cpu, _) = exec(&[0x38, 0xA9, 0x80, 0x2A], |_, _| {});
    assert_eq!(cpu.a, 0x01);
    assert!(cpu.flag(Status::C));

    // SEC; LDA #$02; ROR
    let (cpu, _) = exec(&[0x38, 0xA9, 0x02, 0x6A], |_, _| {});
    assert_eq!(cpu.a, 0x81);
    assert!(!cpu.flag(Status::C));
    assert!(cpu.flag(Status::N));
}

#[test]
fn adc_carry_and_overflow() {
    // CLC; LDA #$50; ADC #$50
    let (cpu, _) = exec(&[0x18, 0xA9, 0x50, 0x69, 0x50], |_, _| {});
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.flag(Status::V));
    assert!(cpu.flag(Status::N));
    assert!(!cpu.flag(Status::C));

    // CLC; LDA #$FF; ADC #$01
    let (cpu, _) = exec(&[0x18, 0xA9, 0xFF, 0x69, 0x01], |_, _| {});
    assert_eq!(cpu.a, 0);
    assert!(cpu.flag(Status::C));
    assert!(cpu.flag(Status::Z));
    assert!(!cpu.flag(Status::V));
}

#[test]
fn sbc_borrow_and_overflow() {
    // SEC; LDA #$50; SBC #$F0
    let (cpu, _) = exec(&[0x38, 0xA9, 0x50, 0xE9, 0xF0], |_, _| {});
    assert_eq!(cpu.a, 0x60);
    assert!(!cpu.flag(Status::C));
    assert!(!cpu.flag(Status::V));

    // SEC; LDA #$50; SBC #$B0
    let (cpu, _) = exec(&[0x38, 0xA9, 0x50, 0xE9, 0xB0], |_, _| {});
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.flag(Status::V));
    assert!(cpu.flag(Status::N));

    // SEC; LDA #$10; SBC #$01
    let (cpu, _) = exec(&[0x38, 0xA9, 0x10, 0xE9, 0x01], |_, _| {});
    assert_eq!(cpu.a, 0x0F);
    assert!(cpu.flag(Status::C));
}

#[test]
fn bitwise_ops() {
    // LDA #$F0; AND #$3C
    let (cpu, _) = exec(&[0xA9, 0xF0, 0x29, 0x3C], |_, _| {});
    assert_eq!(cpu.a, 0x30);
    // LDA #$30; ORA #$0F; EOR #$FF
    let (cpu, _) = exec(&[0xA9, 0x30, 0x09, 0x0F, 0x49, 0xFF], |_, _| {});
    assert_eq!(cpu.a, 0xC0);
    assert!(cpu.flag(Status::N));
}

#[test]
fn bit_copies_high_bits_of_memory() {
    // LDA #$01; BIT $10
    let (cpu, _) = exec(&[0xA9, 0x01, 0x24, 0x10], |_, mem| mem.mem[0x10] = 0xC0);
    assert!(cpu.flag(Status::Z));
    assert!(cpu.flag(Status::N));
    assert!(cpu.flag(Status::V));
    assert_eq!(cpu.a, 0x01);
}

#[test]
fn increments_wrap() {
    // DEC $10; INC $11; LDX #$FF; INX
    let (cpu, mem) = exec(&[0xC6, 0x10, 0xE6, 0x11, 0xA2, 0xFF, 0xE8], |_, _| {});
    assert_eq!(mem.mem[0x10], 0xFF);
    assert_eq!(mem.mem[0x11], 0x01);
    assert_eq!(cpu.x, 0);
    assert!(cpu.flag(Status::Z));
}

#[test]
fn transfers_and_flag_ops() {
    // LDA #$80; TAX; TAY; LDA #0; TXA; SED; SEI; CLV
    let (cpu, _) = exec(&[0xA9, 0x80, 0xAA, 0xA8, 0xA9, 0x00, 0x8A, 0xF8, 0x78, 0xB8], |_, _| {});
    assert_eq!((cpu.a, cpu.x, cpu.y), (0x80, 0x80, 0x80));
    assert!(cpu.flag(Status::N));
    assert!(cpu.flag(Status::D));
    assert!(cpu.flag(Status::I));
    assert!(!cpu.flag(Status::V));
}
