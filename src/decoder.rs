use serde::{Deserialize, Serialize};

use crate::instructions::InstrDesc;

/// Documented NMOS 6502 operations. Addressing is carried separately by the
/// descriptor, so one `Op` covers every encoding of a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl Op {
    /// Lowercase assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Op::Adc => "adc",
            Op::And => "and",
            Op::Asl => "asl",
            Op::Bcc => "bcc",
            Op::Bcs => "bcs",
            Op::Beq => "beq",
            Op::Bit => "bit",
            Op::Bmi => "bmi",
            Op::Bne => "bne",
            Op::Bpl => "bpl",
            Op::Brk => "brk",
            Op::Bvc => "bvc",
            Op::Bvs => "bvs",
            Op::Clc => "clc",
            Op::Cld => "cld",
            Op::Cli => "cli",
            Op::Clv => "clv",
            Op::Cmp => "cmp",
            Op::Cpx => "cpx",
            Op::Cpy => "cpy",
            Op::Dec => "dec",
            Op::Dex => "dex",
            Op::Dey => "dey",
            Op::Eor => "eor",
            Op::Inc => "inc",
            Op::Inx => "inx",
            Op::Iny => "iny",
            Op::Jmp => "jmp",
            Op::Jsr => "jsr",
            Op::Lda => "lda",
            Op::Ldx => "ldx",
            Op::Ldy => "ldy",
            Op::Lsr => "lsr",
            Op::Nop => "nop",
            Op::Ora => "ora",
            Op::Pha => "pha",
            Op::Php => "php",
            Op::Pla => "pla",
            Op::Plp => "plp",
            Op::Rol => "rol",
            Op::Ror => "ror",
            Op::Rti => "rti",
            Op::Rts => "rts",
            Op::Sbc => "sbc",
            Op::Sec => "sec",
            Op::Sed => "sed",
            Op::Sei => "sei",
            Op::Sta => "sta",
            Op::Stx => "stx",
            Op::Sty => "sty",
            Op::Tax => "tax",
            Op::Tay => "tay",
            Op::Tsx => "tsx",
            Op::Txa => "txa",
            Op::Txs => "txs",
            Op::Tya => "tya",
        }
    }

    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Op::Bcc | Op::Bcs | Op::Beq | Op::Bmi | Op::Bne | Op::Bpl | Op::Bvc | Op::Bvs
        )
    }
}

pub trait Decoder {
    fn decode(&self, opcode: u8) -> Option<&'static InstrDesc>;
}
