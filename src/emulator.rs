use crate::{
    display::Display,
    error::{CycleResult, Fault},
    interpreter::Interpreter,
    keyboard::Keyboard,
};

/// Machine cycles available to the CPU in one 60 Hz frame.
pub const FRAME_CYCLES: u32 = 16_666;

/// Report of one scheduler frame, handed to the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// The display buffer changed this frame and should be presented.
    pub redraw: bool,
    /// The sound timer is running; the buzzer should be audible.
    pub sound_active: bool,
    /// Machine cycles actually consumed by the CPU this frame.
    pub cycles: u32,
}

/// Drives the interpreter at a fixed real-time cadence: one timer tick and a
/// bounded number of machine cycles per frame, which decouples CPU speed from
/// the display refresh rate.
pub struct Emulator {
    interpreter: Interpreter,
    keyboard: Keyboard,
    budget: u32,
}

impl Emulator {
    pub fn with_rom(bytes: &[u8]) -> Result<Self, Fault> {
        Ok(Emulator {
            interpreter: Interpreter::with_rom(bytes)?,
            keyboard: Keyboard::new(),
            budget: FRAME_CYCLES,
        })
    }

    /// Overrides the per-frame machine-cycle budget.
    pub fn with_budget(mut self, budget: u32) -> Self {
        self.budget = budget;
        self
    }

    /// Replaces the interpreter's random source with a seeded one, for
    /// reproducible runs.
    pub fn seed_rng(&mut self, seed: u64) {
        self.interpreter.seed_rng(seed);
    }

    /// Runs one frame: ticks the timers once, then executes instructions
    /// until the cycle budget is spent or the interpreter suspends on a
    /// key-wait. A fault stops the frame immediately.
    pub fn run_frame(&mut self) -> Result<Frame, Fault> {
        self.interpreter.timers_mut().tick();

        let mut spent: u32 = 0;
        while spent < self.budget {
            match self.interpreter.step(&self.keyboard)? {
                CycleResult::Continue { cycles } => spent += cycles,
                CycleResult::WaitForKey => break,
            }
        }

        Ok(Frame {
            redraw: self.interpreter.display_mut().consume_dirty(),
            sound_active: self.interpreter.timers().is_sound_active(),
            cycles: spent,
        })
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn display(&self) -> &Display {
        self.interpreter.display()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }
}
