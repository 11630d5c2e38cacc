use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::instructions::lookup_by_name;

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),
    #[error("label `{0}` is already defined")]
    LabelRedefinition(String),
    #[error("label `{0}` is never defined")]
    UndefinedLabel(String),
    #[error("value {0} does not fit in a byte")]
    OutOfRange(i64),
    #[error("branch to `{label}` spans {distance} bytes")]
    BranchOutOfRange { label: String, distance: i64 },
    #[error("write at offset {pos:#06x} overflows the {size}-byte program")]
    ProgramOverflow { pos: usize, size: usize },
    #[error("cursor {addr:#06x} lies before origin {origin:#06x}")]
    CursorBeforeOrigin { addr: u16, origin: u16 },
    #[error("zero page has no free slot for `{0}`")]
    ZeroPageFull(String),
    #[error("line {line}: no instruction matches `{text}`")]
    NoMatchingInstruction { line: usize, text: String },
    #[error("line {line}: unknown directive `{text}`")]
    UnknownDirective { line: usize, text: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reference to a label that resolves to its absolute 16-bit address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub String);

/// Reference to a label that resolves to a signed branch displacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelativeLabel(pub String);

impl Label {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl RelativeLabel {
    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    #[default]
    None,
    Value(u16),
    Label(Label),
    Relative(RelativeLabel),
}

impl From<u8> for Operand {
    fn from(v: u8) -> Self {
        Operand::Value(v as u16)
    }
}

impl From<u16> for Operand {
    fn from(v: u16) -> Self {
        Operand::Value(v)
    }
}

impl From<Label> for Operand {
    fn from(l: Label) -> Self {
        Operand::Label(l)
    }
}

impl From<RelativeLabel> for Operand {
    fn from(l: RelativeLabel) -> Self {
        Operand::Relative(l)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Data {
    Bytes(Vec<u8>),
    /// Two bytes, little-endian.
    Label(Label),
    /// One displacement byte.
    Relative(RelativeLabel),
}

impl Data {
    fn len(&self) -> usize {
        match self {
            Data::Bytes(b) => b.len(),
            Data::Label(_) => 2,
            Data::Relative(_) => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AsmUnit {
    Instruction { name: &'static str, operand: Operand },
    Data(Data),
    /// Absolute buffer position (origin already subtracted).
    MoveCursor(usize),
}

/// Append-only assembly stream. Labels are resolved only by `build`, so
/// forward references are free.
#[derive(Debug, Clone)]
pub struct Program {
    size: usize,
    origin: u16,
    pos: usize,
    labels: BTreeMap<String, u16>,
    label_counter: usize,
    vars: BTreeMap<String, u8>,
    units: Vec<AsmUnit>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl Program {
    pub const DEFAULT_SIZE: usize = 0x4000;
    /// BRK, so running off the end of emitted code halts.
    pub const FILL_BYTE: u8 = 0x00;

    pub fn new(size: usize) -> Self {
        Self {
            size,
            origin: 0,
            pos: 0,
            labels: BTreeMap::new(),
            label_counter: 0,
            vars: BTreeMap::new(),
            units: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    /// Address the buffer's first byte will be loaded at. Only affects
    /// label addresses and displacements, not where bytes land in the output.
    pub fn set_origin(&mut self, origin: u16) {
        self.origin = origin;
    }

    /// Logical write position relative to the origin.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn assembly(&self) -> &[AsmUnit] {
        &self.units
    }

    pub fn add(&mut self, name: &str, operand: impl Into<Operand>) -> Result<(), AsmError> {
        let desc = lookup_by_name(name).ok_or_else(|| AsmError::UnknownInstruction(name.to_string()))?;
        let operand = operand.into();
        if let Operand::Value(v) = operand {
            if desc.size() == 2 && v > 0xFF {
                return Err(AsmError::OutOfRange(v as i64));
            }
        }
        self.pos += desc.size() as usize;
        self.units.push(AsmUnit::Instruction {
            name: desc.name,
            operand,
        });
        Ok(())
    }

    pub fn add_implied(&mut self, name: &str) -> Result<(), AsmError> {
        self.add(name, Operand::None)
    }

    fn push_data(&mut self, data: Data) {
        self.pos += data.len();
        self.units.push(AsmUnit::Data(data));
    }

    pub fn put(&mut self, value: i32) -> Result<(), AsmError> {
        let byte = u8::try_from(value).map_err(|_| AsmError::OutOfRange(value as i64))?;
        self.push_data(Data::Bytes(vec![byte]));
        Ok(())
    }

    pub fn put16(&mut self, value: u16) {
        self.push_data(Data::Bytes(value.to_le_bytes().to_vec()));
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.push_data(Data::Bytes(bytes.to_vec()));
    }

    /// One byte per character.
    pub fn put_str(&mut self, text: &str) -> Result<(), AsmError> {
        let bytes = text
            .chars()
            .map(|c| u8::try_from(c as u32).map_err(|_| AsmError::OutOfRange(c as i64)))
            .collect::<Result<Vec<_>, _>>()?;
        self.push_data(Data::Bytes(bytes));
        Ok(())
    }

    pub fn put_label(&mut self, label: Label) {
        self.push_data(Data::Label(label));
    }

    pub fn put_relative(&mut self, label: RelativeLabel) {
        self.push_data(Data::Relative(label));
    }

    /// Insert an opaque blob such as tile graphics.
    pub fn include(&mut self, bytes: impl Into<Vec<u8>>) {
        self.push_data(Data::Bytes(bytes.into()));
    }

    pub fn include_file(&mut self, path: impl AsRef<Path>) -> Result<(), AsmError> {
        let bytes = std::fs::read(path)?;
        self.include(bytes);
        Ok(())
    }

    /// Run a code generator against this program, e.g. a shared library of
    /// subroutines.
    pub fn import<F>(&mut self, f: F) -> Result<(), AsmError>
    where
        F: FnOnce(&mut Program) -> Result<(), AsmError>,
    {
        f(self)
    }

    pub fn set_label(&mut self, name: &str) -> Result<(), AsmError> {
        if self.labels.contains_key(name) {
            return Err(AsmError::LabelRedefinition(name.to_string()));
        }
        let addr = (self.origin as usize + self.pos) as u16;
        self.labels.insert(name.to_string(), addr);
        Ok(())
    }

    pub fn label(&self, name: &str) -> Label {
        Label(name.to_string())
    }

    pub fn relative_label(&self, name: &str) -> RelativeLabel {
        RelativeLabel(name.to_string())
    }

    pub fn create_unique_label_name(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}_{}", self.label_counter);
        self.label_counter += 1;
        name
    }

    pub fn label_address(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> &BTreeMap<String, u16> {
        &self.labels
    }

    /// Seek to an absolute address, e.g. to place the vector table.
    pub fn move_to(&mut self, addr: u16) -> Result<(), AsmError> {
        let pos = addr
            .checked_sub(self.origin)
            .ok_or(AsmError::CursorBeforeOrigin { addr, origin: self.origin })? as usize;
        self.pos = pos;
        self.units.push(AsmUnit::MoveCursor(pos));
        Ok(())
    }

    /// Give `name` the next free zero-page byte. Asking again for the same
    /// name returns the slot it already has.
    pub fn set_var(&mut self, name: &str) -> Result<u8, AsmError> {
        if let Some(&slot) = self.vars.get(name) {
            return Ok(slot);
        }
        let slot = u8::try_from(self.vars.len()).map_err(|_| AsmError::ZeroPageFull(name.to_string()))?;
        self.vars.insert(name.to_string(), slot);
        Ok(slot)
    }

    pub fn var(&self, name: &str) -> Option<u8> {
        self.vars.get(name).copied()
    }

    fn resolve(&self, label: &str) -> Result<u16, AsmError> {
        self.label_address(label)
            .ok_or_else(|| AsmError::UndefinedLabel(label.to_string()))
    }

    fn displacement(&self, label: &str, cursor: usize) -> Result<u8, AsmError> {
        let target = self.resolve(label)? as i64;
        let distance = target - self.origin as i64 - cursor as i64 - 2;
        if !(-128..=127).contains(&distance) {
            return Err(AsmError::BranchOutOfRange {
                label: label.to_string(),
                distance,
            });
        }
        Ok(distance as i8 as u8)
    }

    /// Replay the stream into a `size`-byte buffer pre-filled with
    /// `FILL_BYTE`. With `clamp` the result is cut at the final cursor.
    pub fn build(&self, clamp: bool) -> Result<Vec<u8>, AsmError> {
        let mut out = vec![Self::FILL_BYTE; self.size];
        let mut cursor = 0usize;
        for unit in &self.units {
            match unit {
                AsmUnit::Instruction { name, operand } => {
                    let desc = lookup_by_name(name).ok_or_else(|| AsmError::UnknownInstruction(name.to_string()))?;
                    let value = match operand {
                        Operand::None => 0,
                        Operand::Value(v) => *v,
                        Operand::Label(l) => self.resolve(l.name())?,
                        Operand::Relative(l) => self.displacement(l.name(), cursor)? as u16,
                    };
                    let [lo, hi] = value.to_le_bytes();
                    let bytes = [desc.opcode, lo, hi];
                    emit(&mut out, &mut cursor, &bytes[..desc.size() as usize])?;
                }
                AsmUnit::Data(Data::Bytes(b)) => emit(&mut out, &mut cursor, b)?,
                AsmUnit::Data(Data::Label(l)) => {
                    let addr = self.resolve(l.name())?;
                    emit(&mut out, &mut cursor, &addr.to_le_bytes())?;
                }
                AsmUnit::Data(Data::Relative(l)) => {
                    let d = self.displacement(l.name(), cursor)?;
                    emit(&mut out, &mut cursor, &[d])?;
                }
                AsmUnit::MoveCursor(p) => cursor = *p,
            }
        }
        if clamp {
            out.truncate(cursor);
        }
        debug!(units = self.units.len(), labels = self.labels.len(), bytes = out.len(), "build");
        Ok(out)
    }

    pub fn write_file(&self, path: impl AsRef<Path>, clamp: bool) -> Result<(), AsmError> {
        std::fs::write(path, self.build(clamp)?)?;
        Ok(())
    }
}

fn emit(out: &mut [u8], cursor: &mut usize, bytes: &[u8]) -> Result<(), AsmError> {
    let end = *cursor + bytes.len();
    let size = out.len();
    let dst = out
        .get_mut(*cursor..end)
        .ok_or(AsmError::ProgramOverflow { pos: *cursor, size })?;
    dst.copy_from_slice(bytes);
    *cursor = end;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_label_names_count_up() {
        let mut prg = Program::default();
        assert_eq!(prg.create_unique_label_name("loop"), "loop_0");
        assert_eq!(prg.create_unique_label_name("loop"), "loop_1");
    }

    #[test]
    fn zero_page_vars_allocate_in_order() {
        let mut prg = Program::default();
        assert_eq!(prg.set_var("ptr").unwrap(), 0);
        assert_eq!(prg.set_var("count").unwrap(), 1);
        assert_eq!(prg.set_var("ptr").unwrap(), 0);
        assert_eq!(prg.var("count"), Some(1));
        assert_eq!(prg.var("missing"), None);
    }

    #[test]
    fn overflow_is_reported() {
        let mut prg = Program::new(2);
        prg.add("LDA_ABS", 0x1234u16).unwrap();
        assert!(matches!(prg.build(true), Err(AsmError::ProgramOverflow { pos: 0, size: 2 })));
    }
}
