use crate::error::Fault;

pub const START_ROM: usize = 0x200;
pub const FONT_ADDR: usize = 0x050;

const MEMORY_SIZE: usize = 4096;

const FONT_DATA: &'static [u8] = &[
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Flat 4 KiB byte store. The built-in hexadecimal font lives at `FONT_ADDR`,
/// program images load at `START_ROM`, and every access is bounds checked so
/// a runaway program surfaces a fault instead of indexing past the array.
#[derive(Debug)]
pub struct Memory([u8; MEMORY_SIZE]);

impl Memory {
    pub fn new() -> Self {
        let mut memory = Memory([0; MEMORY_SIZE]);
        memory.0[FONT_ADDR..FONT_ADDR + FONT_DATA.len()].copy_from_slice(FONT_DATA);

        memory
    }

    /// Copies a program image into memory starting at `offset`.
    pub fn load(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Fault> {
        let end = offset + bytes.len();
        if end > MEMORY_SIZE {
            return Err(Fault::OutOfBounds {
                address: end.min(u16::MAX as usize) as u16,
            });
        }

        self.0[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn read(&self, address: u16) -> Result<u8, Fault> {
        self.0
            .get(address as usize)
            .copied()
            .ok_or(Fault::OutOfBounds { address })
    }

    pub fn write(&mut self, address: u16, value: u8) -> Result<(), Fault> {
        let slot = self
            .0
            .get_mut(address as usize)
            .ok_or(Fault::OutOfBounds { address })?;
        *slot = value;

        Ok(())
    }

    /// Reads the two-byte instruction word at `pc`, high byte first.
    pub fn fetch_instruction(&self, pc: u16) -> Result<u16, Fault> {
        let first_byte = self.read(pc)?;
        let second_byte = self.read(pc + 1)?;

        Ok(u16::from_be_bytes([first_byte, second_byte]))
    }
}
