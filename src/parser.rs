//! Line-oriented text front end for `Program`.
//!
//! ```text
//! ; comment
//! .org $8000
//! start:  lda #$01
//!         sta $0200,x
//! loop:   dex
//!         bne loop
//! .word start
//! ```

use tracing::debug;

use crate::asm::{AsmError, Operand, Program};
use crate::instructions::{is_ident, AddrMode, TABLE};

#[derive(Debug, Clone, Copy)]
pub struct Parser {
    size: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            size: Program::DEFAULT_SIZE,
        }
    }
}

/// A literal or a label reference, as written in an operand.
#[derive(Debug, PartialEq, Eq)]
enum Value<'a> {
    Number(u32),
    Label(&'a str),
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity of the programs this parser produces.
    pub fn with_size(size: usize) -> Self {
        Self { size }
    }

    pub fn parse(&self, source: &str) -> Result<Program, AsmError> {
        self.parse_lines(source.lines())
    }

    pub fn parse_lines<I, S>(&self, lines: I) -> Result<Program, AsmError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prg = Program::new(self.size);
        for (idx, raw) in lines.into_iter().enumerate() {
            let line_no = idx + 1;
            let line = raw.as_ref();
            let line = line.split(';').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('.') {
                directive(&mut prg, line_no, line)?;
                continue;
            }
            let mut line = line;
            if let Some((head, rest)) = line.split_once(':') {
                let head = head.trim();
                if is_ident(head) {
                    prg.set_label(&head.to_ascii_lowercase())?;
                    line = rest.trim();
                }
            }
            if !line.is_empty() {
                instruction(&mut prg, line_no, line)?;
            }
        }
        debug!(units = prg.assembly().len(), labels = prg.labels().len(), "parsed");
        Ok(prg)
    }
}

fn instruction(prg: &mut Program, line_no: usize, line: &str) -> Result<(), AsmError> {
    let no_match = || AsmError::NoMatchingInstruction {
        line: line_no,
        text: line.to_string(),
    };
    let (mnemonic, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let mnemonic = mnemonic.to_ascii_lowercase();
    let operand: String = rest
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let desc = TABLE
        .iter()
        .find(|d| d.mnemonic() == mnemonic && d.mode.matches(&operand))
        .ok_or_else(no_match)?;

    let value = if operand.is_empty() {
        Operand::None
    } else {
        match operand_value(&operand).ok_or_else(no_match)? {
            Value::Label(name) if desc.mode == AddrMode::Relative => prg.relative_label(name).into(),
            Value::Label(name) => prg.label(name).into(),
            Value::Number(n) => {
                let mask = if desc.size() == 2 { 0xFF } else { 0xFFFF };
                Operand::Value((n & mask) as u16)
            }
        }
    };
    prg.add(desc.name, value)
}

fn directive(prg: &mut Program, line_no: usize, line: &str) -> Result<(), AsmError> {
    let unknown = || AsmError::UnknownDirective {
        line: line_no,
        text: line.to_string(),
    };
    let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let args: Vec<String> = args
        .split(',')
        .map(|a| a.trim().to_ascii_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    match name.to_ascii_lowercase().as_str() {
        ".org" => {
            let [arg] = args.as_slice() else {
                return Err(unknown());
            };
            match parse_value(arg) {
                Some(Value::Number(n)) => prg.set_origin((n & 0xFFFF) as u16),
                _ => return Err(unknown()),
            }
        }
        ".byte" => {
            for arg in &args {
                match parse_value(arg) {
                    Some(Value::Number(n)) => prg.put(n as i32)?,
                    _ => return Err(unknown()),
                }
            }
        }
        ".word" => {
            for arg in &args {
                match parse_value(arg).ok_or_else(unknown)? {
                    Value::Number(n) => prg.put16((n & 0xFFFF) as u16),
                    Value::Label(l) => {
                        let label = prg.label(l);
                        prg.put_label(label);
                    }
                }
            }
        }
        _ => return Err(unknown()),
    }
    Ok(())
}

/// Pull the value token out of a normalized operand: drop the `#` or `(`
/// prefix and anything from the first `,` or `)` on.
fn operand_value(operand: &str) -> Option<Value<'_>> {
    let token = operand.trim_start_matches(['#', '(']);
    let end = token.find([',', ')']).unwrap_or(token.len());
    parse_value(&token[..end])
}

fn parse_value(token: &str) -> Option<Value<'_>> {
    if let Some(hex) = token.strip_prefix('$') {
        return u32::from_str_radix(hex, 16).ok().map(Value::Number);
    }
    if let Some(bin) = token.strip_prefix('%') {
        return u32::from_str_radix(bin, 2).ok().map(Value::Number);
    }
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return token.parse().ok().map(Value::Number);
    }
    is_ident(token).then_some(Value::Label(token))
}
