pub mod display;
pub mod emulator;
pub mod error;
pub mod interpreter;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod timers;

pub use emulator::{Emulator, Frame, FRAME_CYCLES};
pub use error::{CycleResult, Fault};
