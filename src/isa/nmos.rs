//! The 151 documented NMOS 6502 encodings.

use crate::decoder::{Decoder, Op};
use crate::exec;
use crate::instructions::AddrMode::*;
use crate::instructions::{lookup_by_opcode, AddrMode, InstrDesc};

const fn d(opcode: u8, name: &'static str, op: Op, mode: AddrMode, micro: exec::MicroOp) -> InstrDesc {
    InstrDesc::new(opcode, name, op, mode, micro)
}

/// Ordered by opcode.
pub static TABLE: [InstrDesc; 151] = [
    d(0x00, "BRK", Op::Brk, Implied, exec::brk),
    d(0x01, "ORA_IND_X", Op::Ora, IndirectX, exec::ora),
    d(0x05, "ORA_ZP", Op::Ora, ZeroPage, exec::ora),
    d(0x06, "ASL_ZP", Op::Asl, ZeroPage, exec::asl),
    d(0x08, "PHP", Op::Php, Implied, exec::php),
    d(0x09, "ORA_IMM", Op::Ora, Immediate, exec::ora),
    d(0x0A, "ASL", Op::Asl, Implied, exec::asl),
    d(0x0D, "ORA_ABS", Op::Ora, Absolute, exec::ora),
    d(0x0E, "ASL_ABS", Op::Asl, Absolute, exec::asl),
    d(0x10, "BPL", Op::Bpl, Relative, exec::bpl),
    d(0x11, "ORA_IND_Y", Op::Ora, IndirectY, exec::ora),
    d(0x15, "ORA_ZP_X", Op::Ora, ZeroPageX, exec::ora),
    d(0x16, "ASL_ZP_X", Op::Asl, ZeroPageX, exec::asl),
    d(0x18, "CLC", Op::Clc, Implied, exec::clc),
    d(0x19, "ORA_ABS_Y", Op::Ora, AbsoluteY, exec::ora),
    d(0x1D, "ORA_ABS_X", Op::Ora, AbsoluteX, exec::ora),
    d(0x1E, "ASL_ABS_X", Op::Asl, AbsoluteX, exec::asl),
    d(0x20, "JSR_ABS", Op::Jsr, Absolute, exec::jsr),
    d(0x21, "AND_IND_X", Op::And, IndirectX, exec::and),
    d(0x24, "BIT_ZP", Op::Bit, ZeroPage, exec::bit),
    d(0x25, "AND_ZP", Op::And, ZeroPage, exec::and),
    d(0x26, "ROL_ZP", Op::Rol, ZeroPage, exec::rol),
    d(0x28, "PLP", Op::Plp, Implied, exec::plp),
    d(0x29, "AND_IMM", Op::And, Immediate, exec::and),
    d(0x2A, "ROL", Op::Rol, Implied, exec::rol),
    d(0x2C, "BIT_ABS", Op::Bit, Absolute, exec::bit),
    d(0x2D, "AND_ABS", Op::And, Absolute, exec::and),
    d(0x2E, "ROL_ABS", Op::Rol, Absolute, exec::rol),
    d(0x30, "BMI", Op::Bmi, Relative, exec::bmi),
    d(0x31, "AND_IND_Y", Op::And, IndirectY, exec::and),
    d(0x35, "AND_ZP_X", Op::And, ZeroPageX, exec::and),
    d(0x36, "ROL_ZP_X", Op::Rol, ZeroPageX, exec::rol),
    d(0x38, "SEC", Op::Sec, Implied, exec::sec),
    d(0x39, "AND_ABS_Y", Op::And, AbsoluteY, exec::and),
    d(0x3D, "AND_ABS_X", Op::And, AbsoluteX, exec::and),
    d(0x3E, "ROL_ABS_X", Op::Rol, AbsoluteX, exec::rol),
    d(0x40, "RTI", Op::Rti, Implied, exec::rti),
    d(0x41, "EOR_IND_X", Op::Eor, IndirectX, exec::eor),
    d(0x45, "EOR_ZP", Op::Eor, ZeroPage, exec::eor),
    d(0x46, "LSR_ZP", Op::Lsr, ZeroPage, exec::lsr),
    d(0x48, "PHA", Op::Pha, Implied, exec::pha),
    d(0x49, "EOR_IMM", Op::Eor, Immediate, exec::eor),
    d(0x4A, "LSR", Op::Lsr, Implied, exec::lsr),
    d(0x4C, "JMP_ABS", Op::Jmp, Absolute, exec::jmp),
    d(0x4D, "EOR_ABS", Op::Eor, Absolute, exec::eor),
    d(0x4E, "LSR_ABS", Op::Lsr, Absolute, exec::lsr),
    d(0x50, "BVC", Op::Bvc, Relative, exec::bvc),
    d(0x51, "EOR_IND_Y", Op::Eor, IndirectY, exec::eor),
    d(0x55, "EOR_ZP_X", Op::Eor, ZeroPageX, exec::eor),
    d(0x56, "LSR_ZP_X", Op::Lsr, ZeroPageX, exec::lsr),
    d(0x58, "CLI", Op::Cli, Implied, exec::cli),
    d(0x59, "EOR_ABS_Y", Op::Eor, AbsoluteY, exec::eor),
    d(0x5D, "EOR_ABS_X", Op::Eor, AbsoluteX, exec::eor),
    d(0x5E, "LSR_ABS_X", Op::Lsr, AbsoluteX, exec::lsr),
    d(0x60, "RTS", Op::Rts, Implied, exec::rts),
    d(0x61, "ADC_IND_X", Op::Adc, IndirectX, exec::adc),
    d(0x65, "ADC_ZP", Op::Adc, ZeroPage, exec::adc),
    d(0x66, "ROR_ZP", Op::Ror, ZeroPage, exec::ror),
    d(0x68, "PLA", Op::Pla, Implied, exec::pla),
    d(0x69, "ADC_IMM", Op::Adc, Immediate, exec::adc),
    d(0x6A, "ROR", Op::Ror, Implied, exec::ror),
    d(0x6C, "JMP_IND", Op::Jmp, Indirect, exec::jmp),
    d(0x6D, "ADC_ABS", Op::Adc, Absolute, exec::adc),
    d(0x6E, "ROR_ABS", Op::Ror, Absolute, exec::ror),
    d(0x70, "BVS", Op::Bvs, Relative, exec::bvs),
    d(0x71, "ADC_IND_Y", Op::Adc, IndirectY, exec::adc),
    d(0x75, "ADC_ZP_X", Op::Adc, ZeroPageX, exec::adc),
    d(0x76, "ROR_ZP_X", Op::Ror, ZeroPageX, exec::ror),
    d(0x78, "SEI", Op::Sei, Implied, exec::sei),
    d(0x79, "ADC_ABS_Y", Op::Adc, AbsoluteY, exec::adc),
    d(0x7D, "ADC_ABS_X", Op::Adc, AbsoluteX, exec::adc),
    d(0x7E, "ROR_ABS_X", Op::Ror, AbsoluteX, exec::ror),
    d(0x81, "STA_IND_X", Op::Sta, IndirectX, exec::sta),
    d(0x84, "STY_ZP", Op::Sty, ZeroPage, exec::sty),
    d(0x85, "STA_ZP", Op::Sta, ZeroPage, exec::sta),
    d(0x86, "STX_ZP", Op::Stx, ZeroPage, exec::stx),
    d(0x88, "DEY", Op::Dey, Implied, exec::dey),
    d(0x8A, "TXA", Op::Txa, Implied, exec::txa),
    d(0x8C, "STY_ABS", Op::Sty, Absolute, exec::sty),
    d(0x8D, "STA_ABS", Op::Sta, Absolute, exec::sta),
    d(0x8E, "STX_ABS", Op::Stx, Absolute, exec::stx),
    d(0x90, "BCC", Op::Bcc, Relative, exec::bcc),
    d(0x91, "STA_IND_Y", Op::Sta, IndirectY, exec::sta),
    d(0x94, "STY_ZP_X", Op::Sty, ZeroPageX, exec::sty),
    d(0x95, "STA_ZP_X", Op::Sta, ZeroPageX, exec::sta),
    d(0x96, "STX_ZP_Y", Op::Stx, ZeroPageY, exec::stx),
    d(0x98, "TYA", Op::Tya, Implied, exec::tya),
    d(0x99, "STA_ABS_Y", Op::Sta, AbsoluteY, exec::sta),
    d(0x9A, "TXS", Op::Txs, Implied, exec::txs),
    d(0x9D, "STA_ABS_X", Op::Sta, AbsoluteX, exec::sta),
    d(0xA0, "LDY_IMM", Op::Ldy, Immediate, exec::ldy),
    d(0xA1, "LDA_IND_X", Op::Lda, IndirectX, exec::lda),
    d(0xA2, "LDX_IMM", Op::Ldx, Immediate, exec::ldx),
    d(0xA4, "LDY_ZP", Op::Ldy, ZeroPage, exec::ldy),
    d(0xA5, "LDA_ZP", Op::Lda, ZeroPage, exec::lda),
    d(0xA6, "LDX_ZP", Op::Ldx, ZeroPage, exec::ldx),
    d(0xA8, "TAY", Op::Tay, Implied, exec::tay),
    d(0xA9, "LDA_IMM", Op::Lda, Immediate, exec::lda),
    d(0xAA, "TAX", Op::Tax, Implied, exec::tax),
    d(0xAC, "LDY_ABS", Op::Ldy, Absolute, exec::ldy),
    d(0xAD, "LDA_ABS", Op::Lda, Absolute, exec::lda),
    d(0xAE, "LDX_ABS", Op::Ldx, Absolute, exec::ldx),
    d(0xB0, "BCS", Op::Bcs, Relative, exec::bcs),
    d(0xB1, "LDA_IND_Y", Op::Lda, IndirectY, exec::lda),
    d(0xB4, "LDY_ZP_X", Op::Ldy, ZeroPageX, exec::ldy),
    d(0xB5, "LDA_ZP_X", Op::Lda, ZeroPageX, exec::lda),
    d(0xB6, "LDX_ZP_Y", Op::Ldx, ZeroPageY, exec::ldx),
    d(0xB8, "CLV", Op::Clv, Implied, exec::clv),
    d(0xB9, "LDA_ABS_Y", Op::Lda, AbsoluteY, exec::lda),
    d(0xBA, "TSX", Op::Tsx, Implied, exec::tsx),
    d(0xBC, "LDY_ABS_X", Op::Ldy, AbsoluteX, exec::ldy),
    d(0xBD, "LDA_ABS_X", Op::Lda, AbsoluteX, exec::lda),
    d(0xBE, "LDX_ABS_Y", Op::Ldx, AbsoluteY, exec::ldx),
    d(0xC0, "CPY_IMM", Op::Cpy, Immediate, exec::cpy),
    d(0xC1, "CMP_IND_X", Op::Cmp, IndirectX, exec::cmp),
    d(0xC4, "CPY_ZP", Op::Cpy, ZeroPage, exec::cpy),
    d(0xC5, "CMP_ZP", Op::Cmp, ZeroPage, exec::cmp),
    d(0xC6, "DEC_ZP", Op::Dec, ZeroPage, exec::dec),
    d(0xC8, "INY", Op::Iny, Implied, exec::iny),
    d(0xC9, "CMP_IMM", Op::Cmp, Immediate, exec::cmp),
    d(0xCA, "DEX", Op::Dex, Implied, exec::dex),
    d(0xCC, "CPY_ABS", Op::Cpy, Absolute, exec::cpy),
    d(0xCD, "CMP_ABS", Op::Cmp, Absolute, exec::cmp),
    d(0xCE, "DEC_ABS", Op::Dec, Absolute, exec::dec),
    d(0xD0, "BNE", Op::Bne, Relative, exec::bne),
    d(0xD1, "CMP_IND_Y", Op::Cmp, IndirectY, exec::cmp),
    d(0xD5, "CMP_ZP_X", Op::Cmp, ZeroPageX, exec::cmp),
    d(0xD6, "DEC_ZP_X", Op::Dec, ZeroPageX, exec::dec),
    d(0xD8, "CLD", Op::Cld, Implied, exec::cld),
    d(0xD9, "CMP_ABS_Y", Op::Cmp, AbsoluteY, exec::cmp),
    d(0xDD, "CMP_ABS_X", Op::Cmp, AbsoluteX, exec::cmp),
    d(0xDE, "DEC_ABS_X", Op::Dec, AbsoluteX, exec::dec),
    d(0xE0, "CPX_IMM", Op::Cpx, Immediate, exec::cpx),
    d(0xE1, "SBC_IND_X", Op::Sbc, IndirectX, exec::sbc),
    d(0xE4, "CPX_ZP", Op::Cpx, ZeroPage, exec::cpx),
    d(0xE5, "SBC_ZP", Op::Sbc, ZeroPage, exec::sbc),
    d(0xE6, "INC_ZP", Op::Inc, ZeroPage, exec::inc),
    d(0xE8, "INX", Op::Inx, Implied, exec::inx),
    d(0xE9, "SBC_IMM", Op::Sbc, Immediate, exec::sbc),
    d(0xEA, "NOP", Op::Nop, Implied, exec::nop),
    d(0xEC, "CPX_ABS", Op::Cpx, Absolute, exec::cpx),
    d(0xED, "SBC_ABS", Op::Sbc, Absolute, exec::sbc),
    d(0xEE, "INC_ABS", Op::Inc, Absolute, exec::inc),
    d(0xF0, "BEQ", Op::Beq, Relative, exec::beq),
    d(0xF1, "SBC_IND_Y", Op::Sbc, IndirectY, exec::sbc),
    d(0xF5, "SBC_ZP_X", Op::Sbc, ZeroPageX, exec::sbc),
    d(0xF6, "INC_ZP_X", Op::Inc, ZeroPageX, exec::inc),
    d(0xF8, "SED", Op::Sed, Implied, exec::sed),
    d(0xF9, "SBC_ABS_Y", Op::Sbc, AbsoluteY, exec::sbc),
    d(0xFD, "SBC_ABS_X", Op::Sbc, AbsoluteX, exec::sbc),
    d(0xFE, "INC_ABS_X", Op::Inc, AbsoluteX, exec::inc),
];

/// Decodes documented NMOS opcodes; everything else is illegal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NmosDecoder;

impl Decoder for NmosDecoder {
    fn decode(&self, opcode: u8) -> Option<&'static InstrDesc> {
        lookup_by_opcode(opcode)
    }
}
