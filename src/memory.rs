use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("write of {value:#04x} to unmapped address {addr:#06x}")]
    UnmappedWrite { addr: u16, value: u8 },
    #[error("write of {value:#04x} to read-only offset {offset:#06x}")]
    ReadOnlyViolation { offset: u16, value: u8 },
    #[error("offset {offset:#06x} outside device of {len} bytes")]
    DeviceOutOfRange { offset: u16, len: usize },
    #[error("no device with id {0}")]
    UnknownDevice(usize),
}

/// The CPU's view of the 16-bit address space.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusError>;

    fn read_u16(&mut self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }
}

/// Something that can sit behind a bus binding. Offsets are device-relative.
pub trait Device {
    fn read(&mut self, offset: u16) -> u8;
    fn write(&mut self, offset: u16, val: u8) -> Result<(), BusError>;
    fn reset(&mut self) {}
    fn len(&self) -> usize;
    fn as_bytes(&self) -> &[u8];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hook for watching RAM traffic. Both methods default to doing nothing.
pub trait AccessObserver {
    fn on_read(&mut self, _offset: u16, _val: u8) {}
    fn on_write(&mut self, _offset: u16, _val: u8) {}
}

/// Logs every access at trace level under the given label.
#[derive(Debug, Clone)]
pub struct TraceObserver {
    pub label: String,
}

impl TraceObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl AccessObserver for TraceObserver {
    fn on_read(&mut self, offset: u16, val: u8) {
        trace!(device = %self.label, offset = format_args!("{offset:#06x}"), val, "read");
    }

    fn on_write(&mut self, offset: u16, val: u8) {
        trace!(device = %self.label, offset = format_args!("{offset:#06x}"), val, "write");
    }
}

/// Read-only storage. Writes fail, reset leaves contents alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl Device for Rom {
    fn read(&mut self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u16, value: u8) -> Result<(), BusError> {
        Err(BusError::ReadOnlyViolation { offset, value })
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Read/write storage, zero-filled on reset.
pub struct Ram {
    data: Vec<u8>,
    observer: Option<Box<dyn AccessObserver>>,
}

impl Ram {
    pub const DEFAULT_SIZE: usize = 0x2000;

    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl AccessObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl std::fmt::Debug for Ram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ram")
            .field("len", &self.data.len())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Device for Ram {
    fn read(&mut self, offset: u16) -> u8 {
        let val = self.data.get(offset as usize).copied().unwrap_or(0);
        if let Some(obs) = self.observer.as_mut() {
            obs.on_read(offset, val);
        }
        val
    }

    fn write(&mut self, offset: u16, val: u8) -> Result<(), BusError> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(offset as usize)
            .ok_or(BusError::DeviceOutOfRange { offset, len })?;
        *slot = val;
        if let Some(obs) = self.observer.as_mut() {
            obs.on_write(offset, val);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.data.fill(0);
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(usize);

/// A device mapped over `[start, end)`; bus addresses have `offset`
/// subtracted before they reach the device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Binding {
    pub device: DeviceId,
    pub start: u32,
    pub end: u32,
    pub offset: u16,
}

impl Binding {
    fn contains(&self, addr: u16) -> bool {
        (self.start..self.end).contains(&(addr as u32))
    }
}

/// Address decoder over a set of owned devices. A device may be bound more
/// than once (mirroring); writes reach every binding that covers the address,
/// reads come from the first one in connection order.
#[derive(Default)]
pub struct MemoryBus {
    devices: Vec<Box<dyn Device>>,
    bindings: Vec<Binding>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, device: impl Device + 'static) -> DeviceId {
        self.devices.push(Box::new(device));
        DeviceId(self.devices.len() - 1)
    }

    pub fn connect(&mut self, device: DeviceId, start: u16, end: u32, offset: u16) -> Result<(), BusError> {
        if device.0 >= self.devices.len() {
            return Err(BusError::UnknownDevice(device.0));
        }
        debug!(
            device = device.0,
            start = format_args!("{start:#06x}"),
            end = format_args!("{end:#07x}"),
            offset = format_args!("{offset:#06x}"),
            "connect"
        );
        self.bindings.push(Binding {
            device,
            start: start as u32,
            end,
            offset,
        });
        Ok(())
    }

    /// Attach a device and map its whole extent at `start`.
    pub fn map(&mut self, device: impl Device + 'static, start: u16) -> Result<DeviceId, BusError> {
        let end = start as u32 + device.len() as u32;
        let id = self.attach(device);
        self.connect(id, start, end.min(0x1_0000), start)?;
        Ok(id)
    }

    pub fn device(&self, id: DeviceId) -> Option<&dyn Device> {
        self.devices.get(id.0).map(|d| d.as_ref())
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut (dyn Device + 'static)> {
        self.devices.get_mut(id.0).map(|d| d.as_mut())
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn reset(&mut self) {
        for d in &mut self.devices {
            d.reset();
        }
    }
}

impl Bus for MemoryBus {
    fn read(&mut self, addr: u16) -> u8 {
        let hit = self.bindings.iter().find(|b| b.contains(addr)).copied();
        match hit {
            Some(b) => self.devices[b.device.0].read(addr.wrapping_sub(b.offset)),
            None => 0,
        }
    }

    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusError> {
        let mut mapped = false;
        for b in self.bindings.iter().filter(|b| b.contains(addr)) {
            self.devices[b.device.0].write(addr.wrapping_sub(b.offset), val)?;
            mapped = true;
        }
        if !mapped {
            return Err(BusError::UnmappedWrite { addr, value: val });
        }
        Ok(())
    }
}

/// Maps a cartridge PRG image at 0x8000. A single 16 KiB bank is mirrored
/// at 0xC000 so the vectors land at the top of memory.
pub fn map_prg(bus: &mut MemoryBus, prg: impl Into<Vec<u8>>) -> Result<DeviceId, BusError> {
    let rom = Rom::new(prg);
    let single_bank = rom.len() == 0x4000;
    let id = bus.map(rom, 0x8000)?;
    if single_bank {
        bus.connect(id, 0xC000, 0x1_0000, 0xC000)?;
    }
    Ok(id)
}

/// Flat memory covering `base..base + len`. Reads outside return 0 and
/// writes outside fail.
#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
    pub base: u16,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size],
            base: 0,
        }
    }

    /// Copy `bytes` in starting at absolute address `addr`.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr.wrapping_sub(self.base) as usize;
        let end = (start + bytes.len()).min(self.mem.len());
        if start < end {
            self.mem[start..end].copy_from_slice(&bytes[..end - start]);
        }
    }

    fn index(&self, addr: u16) -> Option<usize> {
        let off = addr.checked_sub(self.base)? as usize;
        (off < self.mem.len()).then_some(off)
    }
}

impl Bus for LinearMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.index(addr).map(|i| self.mem[i]).unwrap_or(0)
    }

    fn write(&mut self, addr: u16, val: u8) -> Result<(), BusError> {
        let i = self
            .index(addr)
            .ok_or(BusError::UnmappedWrite { addr, value: val })?;
        self.mem[i] = val;
        Ok(())
    }
}
