/// CPU-visible register file.
#[derive(Debug, Default)]
pub struct Registers {
    /// Chip-8 has 16 general purpose 8-bit registers, usually referred to as Vx, where x is a hexadecimal digit (0 through F).
    /// The VF register should not be used by any program, as it is used as a flag by some instructions.
    pub vx: [u8; 16],

    /// The I register is generally used to store memory addresses, so usually only the lowest (rightmost) 12 bits are used.
    pub i: u16,
    /// The program counter (PC) should be 16-bit, and is used to store the currently executing address.
    pub pc: u16,
    /// The stack pointer (SP) can be 8-bit, it is used to point to the topmost level of the stack.
    pub sp: u8,

    /// The stack is an array of 16 16-bit values, used to store the address that the interpreter shoud return to when finished with a subroutine. Chip-8 allows for up to 16 levels of nested subroutines.
    stack: [u16; 16],
}

impl Registers {
    /// Pushes a return address onto the call stack. Returns `None` when all
    /// 16 levels are already occupied.
    pub fn push(&mut self, address: u16) -> Option<()> {
        if self.sp as usize == self.stack.len() {
            return None;
        }

        self.stack[self.sp as usize] = address;
        self.sp += 1;

        Some(())
    }

    /// Pops the most recently pushed return address. Returns `None` when the
    /// stack is empty.
    pub fn pop(&mut self) -> Option<u16> {
        if self.sp == 0 {
            return None;
        }

        self.sp -= 1;

        Some(self.stack[self.sp as usize])
    }
}
