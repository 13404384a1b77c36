use thiserror::Error;

/// Fatal interpreter faults. Every one of them halts the run; none are
/// recoverable from inside the machine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// An address or the program counter left the 4 KiB address space.
    #[error("memory access out of bounds at address {address:#06X}")]
    OutOfBounds { address: u16 },

    /// The fetched instruction word decodes to nothing the machine defines.
    #[error("invalid opcode {opcode:#06X} at address {pc:#06X}")]
    InvalidOpcode { pc: u16, opcode: u16 },

    /// A subroutine call was issued with all 16 stack slots occupied.
    #[error("call stack overflow at address {pc:#06X}")]
    StackOverflow { pc: u16 },

    /// A return was issued with an empty call stack.
    #[error("call stack underflow at address {pc:#06X}")]
    StackUnderflow { pc: u16 },
}

/// Outcome of a single interpreter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleResult {
    /// The instruction retired; `cycles` is its machine-cycle cost.
    Continue { cycles: u32 },
    /// A blocking key-wait is unsatisfied; no further work is possible until
    /// the frontend delivers a key.
    WaitForKey,
}
