use pretty_assertions::assert_eq;

use mos6502_rs::disasm::{decode_at, disassemble, fmt_unit};
use mos6502_rs::instructions::TABLE;
use mos6502_rs::{AsmUnit, Operand, Parser, Program};

fn insn(name: &'static str, operand: Operand) -> AsmUnit {
    AsmUnit::Instruction { name, operand }
}

#[test]
fn build_then_disassemble_matches_assembly() {
    let mut prg = Program::default();
    for v in [0x01u8, 0x10, 0x80, 0xFF] {
        prg.add("LDA_IMM", v).unwrap();
    }
    let bytes = prg.build(true).unwrap();
    assert_eq!(disassemble(&bytes, 0), prg.assembly().to_vec());
}

#[test]
fn every_opcode_survives_build_and_disassemble() {
    let mut prg = Program::default();
    for d in TABLE.iter() {
        let operand = match d.size() {
            1 => Operand::None,
            2 => Operand::Value(d.opcode as u16),
            _ => Operand::Value(0x1200 | d.opcode as u16),
        };
        prg.add(d.name, operand).unwrap();
    }
    let bytes = prg.build(true).unwrap();
    assert_eq!(bytes.len(), TABLE.iter().map(|d| d.size() as usize).sum::<usize>());
    assert_eq!(disassemble(&bytes, 0), prg.assembly().to_vec());
}

#[test]
fn absolute_operands_are_little_endian() {
    assert_eq!(
        disassemble(&[0xAD, 0x01, 0x44], 0),
        vec![insn("LDA_ABS", Operand::Value(0x4401))]
    );
}

#[test]
fn unknown_bytes_are_skipped() {
    assert_eq!(
        disassemble(&[0x02, 0xEA, 0xFF, 0x0A], 0),
        vec![insn("NOP", Operand::None), insn("ASL", Operand::None)]
    );
}

#[test]
fn truncated_tail_is_dropped() {
    assert_eq!(disassemble(&[0xEA, 0xAD, 0x01], 0), vec![insn("NOP", Operand::None)]);
    assert_eq!(decode_at(&[0xAD, 0x01], 0), None);
}

#[test]
fn start_offset_is_honoured() {
    assert_eq!(
        disassemble(&[0xFF, 0xFF, 0xA2, 0x03], 2),
        vec![insn("LDX_IMM", Operand::Value(3))]
    );
}

#[test]
fn listing_text() {
    let cases = [
        (insn("LDA_IMM", Operand::Value(0x10)), "lda #$10"),
        (insn("LDA_ABS_X", Operand::Value(0x1234)), "lda $1234,x"),
        (insn("LDA_IND_Y", Operand::Value(0x05)), "lda ($05),y"),
        (insn("STA_IND_X", Operand::Value(0x20)), "sta ($20,x)"),
        (insn("JMP_IND", Operand::Value(0xAA01)), "jmp ($aa01)"),
        (insn("LDX_ZP_Y", Operand::Value(0x40)), "ldx $40,y"),
        (insn("BNE", Operand::Value(0xFC)), "bne $fc"),
        (insn("ASL", Operand::None), "asl"),
    ];
    for (unit, text) in cases {
        assert_eq!(fmt_unit(&unit), text);
    }
}

#[test]
fn listing_parses_back_to_the_same_bytes() {
    let src = "
        ldx #$00
    loop:
        lda $9000,x
        sta ($10),y
        inx
        cpx #$08
        bne loop
        jmp ($fffc)
    ";
    let bytes = Parser::new().parse(src).unwrap().build(true).unwrap();
    let text: Vec<String> = disassemble(&bytes, 0).iter().map(fmt_unit).collect();
    let again = Parser::new().parse(&text.join("\n")).unwrap().build(true).unwrap();
    assert_eq!(again, bytes);
}
