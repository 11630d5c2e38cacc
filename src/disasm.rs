use tracing::debug;

use crate::asm::{AsmUnit, Data, Operand};
use crate::instructions::{lookup_by_name, lookup_by_opcode, AddrMode};

/// Decode the instruction at `offset`, returning it with its encoded size.
/// `None` for an unknown opcode or an operand running past the end.
pub fn decode_at(bytes: &[u8], offset: usize) -> Option<(AsmUnit, usize)> {
    let desc = lookup_by_opcode(*bytes.get(offset)?)?;
    let size = desc.size() as usize;
    let operand = match bytes.get(offset..offset + size)? {
        [_, lo] => Operand::Value(*lo as u16),
        [_, lo, hi] => Operand::Value(u16::from_le_bytes([*lo, *hi])),
        _ => Operand::None,
    };
    Some((
        AsmUnit::Instruction {
            name: desc.name,
            operand,
        },
        size,
    ))
}

/// Decode `bytes` from `start` into instruction units with literal operands.
/// Bytes that are not a documented opcode are skipped; a trailing
/// instruction whose operand runs past the end is dropped.
pub fn disassemble(bytes: &[u8], start: usize) -> Vec<AsmUnit> {
    let mut out = Vec::new();
    let mut i = start;
    while i < bytes.len() {
        match decode_at(bytes, i) {
            Some((unit, size)) => {
                out.push(unit);
                i += size;
            }
            None if lookup_by_opcode(bytes[i]).is_some() => break,
            None => {
                debug!(offset = i, opcode = bytes[i], "skipping unknown opcode");
                i += 1;
            }
        }
    }
    out
}

/// Render a unit in the syntax the parser accepts.
pub fn fmt_unit(unit: &AsmUnit) -> String {
    match unit {
        AsmUnit::Instruction { name, operand } => {
            let Some(desc) = lookup_by_name(name) else {
                return format!("; {name}?");
            };
            let arg = match operand {
                Operand::None => return desc.mnemonic().to_string(),
                Operand::Value(v) if desc.size() == 2 => format!("${v:02x}"),
                Operand::Value(v) => format!("${v:04x}"),
                Operand::Label(l) => l.name().to_string(),
                Operand::Relative(l) => l.name().to_string(),
            };
            let text = match desc.mode {
                AddrMode::Immediate => format!("#{arg}"),
                AddrMode::ZeroPageX | AddrMode::AbsoluteX => format!("{arg},x"),
                AddrMode::ZeroPageY | AddrMode::AbsoluteY => format!("{arg},y"),
                AddrMode::Indirect => format!("({arg})"),
                AddrMode::IndirectX => format!("({arg},x)"),
                AddrMode::IndirectY => format!("({arg}),y"),
                _ => arg,
            };
            format!("{} {text}", desc.mnemonic())
        }
        AsmUnit::Data(Data::Bytes(b)) => {
            let list: Vec<String> = b.iter().map(|x| format!("${x:02x}")).collect();
            format!(".byte {}", list.join(", "))
        }
        AsmUnit::Data(Data::Label(l)) => format!(".word {}", l.name()),
        AsmUnit::Data(Data::Relative(l)) => format!("; rel {}", l.name()),
        AsmUnit::MoveCursor(p) => format!("; seek {p:#06x}"),
    }
}
