use pretty_assertions::assert_eq;

use mos6502_rs::emulator::HeatEntry;
use mos6502_rs::{Bus, BusError, Emulator, EmulatorConfig, Program, Ram, StopReason, Trap};

/// Assemble at 0x8000 with vectors at the top of the 32 KiB image. The NMI
/// vector points at `nmi` when `body` defines it and at `reset` otherwise.
fn boot(cfg: EmulatorConfig, body: impl FnOnce(&mut Program)) -> Emulator {
    let mut prg = Program::new(0x8000);
    prg.set_origin(0x8000);
    prg.set_label("reset").unwrap();
    body(&mut prg);
    let nmi = if prg.label_address("nmi").is_some() { "nmi" } else { "reset" };
    prg.move_to(0xFFFA).unwrap();
    prg.put_label(prg.label(nmi));
    prg.put_label(prg.label("reset"));
    prg.put_label(prg.label(nmi));

    let mut emu = Emulator::new(cfg);
    emu.bus_mut().map(Ram::new(0x800), 0).unwrap();
    emu.load(prg.build(false).unwrap(), 0x8000).unwrap();
    emu
}

fn store_answer(prg: &mut Program) {
    prg.add("LDX_IMM", 0xFFu8).unwrap();
    prg.add_implied("TXS").unwrap();
    prg.add("LDA_IMM", 0x2Au8).unwrap();
    prg.add("STA_ABS", 0x0200u16).unwrap();
    prg.add_implied("BRK").unwrap();
    prg.add_implied("BRK").unwrap();
}

#[test]
fn load_latches_vectors_and_runs_to_brk() {
    let mut emu = boot(EmulatorConfig::default(), store_answer);
    let v = emu.vectors();
    assert_eq!((v.nmi, v.reset, v.irq), (0x8000, 0x8000, 0x8000));
    assert_eq!(emu.cpu().pc, 0x8000);
    assert!(emu.is_halted());

    assert_eq!(emu.run().unwrap(), StopReason::Break);
    let st = emu.status();
    assert_eq!(st.a, 0x2A);
    assert_eq!(st.sp, 0xFF);
    assert_eq!(st.ad, 0x0200);
    assert_eq!(st.pc, 0x8009);
    assert_eq!(emu.cycles(), 5);
    assert_eq!(emu.bus_mut().read(0x0200), 0x2A);
}

#[test]
fn nmi_runs_handler_and_returns() {
    let mut emu = boot(EmulatorConfig::default(), |prg| {
        store_answer(prg);
        prg.set_label("nmi").unwrap();
        prg.add("INC_ABS", 0x0201u16).unwrap();
        prg.add_implied("RTI").unwrap();
    });
    assert_eq!(emu.vectors().nmi, 0x800A);
    assert_eq!(emu.run().unwrap(), StopReason::Break);

    assert_eq!(emu.nmi().unwrap(), StopReason::Break);
    assert_eq!(emu.bus_mut().read(0x0201), 1);
    let st = emu.status();
    assert_eq!(st.sp, 0xFF);
    assert_eq!(st.pc, 0x800A);
    // handler saw B clear in the pushed copy of P
    assert_eq!(emu.bus_mut().read(0x01FD) & 0x30, 0x20);
}

#[test]
fn instruction_cap_stops_a_spin_loop() {
    let cfg = EmulatorConfig {
        max_instructions: Some(100),
        count: false,
    };
    let mut emu = boot(cfg, |prg| {
        let spin = prg.label("reset");
        prg.add("JMP_ABS", spin).unwrap();
    });
    assert_eq!(emu.run().unwrap(), StopReason::InstructionCap);
    assert!(emu.is_halted());
    assert_eq!(emu.cycles(), 100);
    assert_eq!(emu.run().unwrap(), StopReason::InstructionCap);
    assert_eq!(emu.cycles(), 200);
}

#[test]
fn zero_cap_runs_nothing() {
    let cfg = EmulatorConfig {
        max_instructions: Some(0),
        count: false,
    };
    let mut emu = boot(cfg, store_answer);
    assert_eq!(emu.run().unwrap(), StopReason::InstructionCap);
    assert_eq!(emu.cycles(), 0);
    assert_eq!(emu.cpu().pc, 0x8000);
    assert_eq!(emu.bus_mut().read(0x0200), 0);
}

#[test]
fn heat_map_counts_per_pc() {
    let cfg = EmulatorConfig {
        count: true,
        ..EmulatorConfig::default()
    };
    let mut emu = boot(cfg, |prg| {
        prg.add("LDX_IMM", 3u8).unwrap();
        prg.set_label("loop").unwrap();
        prg.add_implied("DEX").unwrap();
        let back = prg.relative_label("loop");
        prg.add("BNE", back).unwrap();
        prg.add_implied("BRK").unwrap();
    });
    emu.run().unwrap();
    assert_eq!(
        emu.heat_map(),
        vec![
            HeatEntry { pc: 0x8000, count: 1, name: "LDX_IMM" },
            HeatEntry { pc: 0x8002, count: 3, name: "DEX" },
            HeatEntry { pc: 0x8003, count: 3, name: "BNE" },
            HeatEntry { pc: 0x8005, count: 1, name: "BRK" },
        ]
    );
    emu.reset();
    assert!(emu.heat_map().is_empty());
}

#[test]
fn heat_map_is_empty_without_counting() {
    let mut emu = boot(EmulatorConfig::default(), store_answer);
    emu.run().unwrap();
    assert!(emu.heat_map().is_empty());
}

#[test]
fn illegal_opcode_halts() {
    let mut emu = boot(EmulatorConfig::default(), |prg| prg.put(0x02).unwrap());
    let err = emu.run().unwrap_err();
    assert!(matches!(err, Trap::IllegalOpcode { pc: 0x8000, opcode: 0x02 }));
    assert!(emu.is_halted());
}

#[test]
fn store_into_rom_traps() {
    let mut emu = boot(EmulatorConfig::default(), |prg| {
        prg.add("LDA_IMM", 7u8).unwrap();
        prg.add("STA_ABS", 0x8000u16).unwrap();
    });
    match emu.run().unwrap_err() {
        Trap::Bus { addr, source } => {
            assert_eq!(addr, 0x8000);
            assert_eq!(source, BusError::ReadOnlyViolation { offset: 0, value: 7 });
        }
        other => panic!("unexpected trap {other:?}"),
    }
}

#[test]
fn reset_keeps_memory() {
    let mut emu = boot(EmulatorConfig::default(), store_answer);
    emu.run().unwrap();
    emu.reset();
    assert_eq!(emu.cpu().a, 0);
    assert_eq!(emu.cpu().pc, 0x8000);
    assert_eq!(emu.cycles(), 0);
    assert_eq!(emu.bus_mut().read(0x0200), 0x2A);
}

#[test]
fn config_reads_from_json() {
    let cfg: EmulatorConfig = serde_json::from_str(r#"{ "count": true }"#).unwrap();
    assert_eq!(cfg.max_instructions, Some(1_000_000));
    assert!(cfg.count);
    assert!(Emulator::new(cfg).config().count);
}

#[test]
fn reset_reads_the_vector_from_ram() {
    let mut emu = Emulator::default();
    emu.bus_mut().map(Ram::new(0x1_0000), 0).unwrap();
    emu.bus_mut().write(0xFFFC, 0x04).unwrap();
    emu.bus_mut().write(0xFFFD, 0x00).unwrap();
    emu.reset();
    assert_eq!(emu.cpu().pc, 0x0004);
    assert_eq!(emu.vectors().reset, 0x0004);
}
