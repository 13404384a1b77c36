use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    display::Display,
    error::{CycleResult, Fault},
    keyboard::InputSource,
    memory::{Memory, FONT_ADDR, START_ROM},
    registers::Registers,
    timers::Timers,
};

/// Fetch-decode-execute core. Every step retires at most one instruction and
/// reports its machine-cycle cost, so the frame scheduler can pace the CPU
/// independently of the display refresh.
#[derive(Debug)]
pub struct Interpreter {
    registers: Registers,
    memory: Memory,
    display: Display,
    timers: Timers,
    rng: ChaCha8Rng,
    /// Destination register of an unsatisfied key-wait. While this is set the
    /// interpreter fetches nothing and burns no cycles.
    waiting_for_key: Option<u8>,
}

impl Interpreter {
    pub fn with_rom(bytes: &[u8]) -> Result<Self, Fault> {
        let mut memory = Memory::new();
        memory.load(START_ROM, bytes)?;

        let mut registers = Registers::default();
        registers.pc = START_ROM as u16;

        Ok(Interpreter {
            registers,
            memory,
            display: Display::new(),
            timers: Timers::new(),
            rng: ChaCha8Rng::from_entropy(),
            waiting_for_key: None,
        })
    }

    /// Replaces the random source with a deterministic, seeded one.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn step(&mut self, input: &impl InputSource) -> Result<CycleResult, Fault> {
        if let Some(x) = self.waiting_for_key {
            match input.wait_for_any_key() {
                Some(key) => {
                    self.registers.vx[x as usize] = key;
                    self.waiting_for_key = None;
                }
                None => return Ok(CycleResult::WaitForKey),
            }
        }

        let pc = self.registers.pc;
        let cur = self.memory.fetch_instruction(pc)?;

        let first_nibble = ((cur & 0xF000) >> 12) as u8;
        let second_nibble = ((cur & 0x0F00) >> 8) as u8;
        let third_nibble = ((cur & 0x00F0) >> 4) as u8;
        let fourth_nibble = (cur & 0x000F) as u8;

        let second_byte = (cur & 0x00FF) as u8;
        let bottom_tribble = cur & 0x0FFF;

        trace!("{:#06X}: {:#06X}", pc, cur);

        // pc moves past the instruction before it executes; jumps, calls,
        // returns and skips overwrite or extend it from there.
        self.registers.pc = pc + 2;

        let cycles = if cur == 0x00E0 {
            self.handle_clear()
        } else if cur == 0x00EE {
            self.handle_ret(pc)?
        } else {
            match first_nibble {
                0x1 => self.handle_jump(bottom_tribble),
                0x2 => self.handle_call(bottom_tribble, pc)?,
                0x3 => self.handle_skip_if_equal_immediate(second_nibble as usize, second_byte),
                0x4 => self.handle_skip_if_not_equal_immediate(second_nibble as usize, second_byte),
                0x5 if fourth_nibble == 0 => {
                    self.handle_skip_if_equal_register(second_nibble as usize, third_nibble as usize)
                }
                0x6 => self.handle_load_register_immediate(second_nibble as usize, second_byte),
                0x7 => self.handle_add_register_immediate(second_nibble as usize, second_byte),
                0x8 if fourth_nibble == 0 => {
                    self.handle_load_register_register(second_nibble as usize, third_nibble as usize)
                }
                0x8 if fourth_nibble == 1 => {
                    self.handle_or_register_register(second_nibble as usize, third_nibble as usize)
                }
                0x8 if fourth_nibble == 2 => {
                    self.handle_and_register_register(second_nibble as usize, third_nibble as usize)
                }
                0x8 if fourth_nibble == 3 => {
                    self.handle_xor_register_register(second_nibble as usize, third_nibble as usize)
                }
                0x8 if fourth_nibble == 4 => {
                    self.handle_add_register_register(second_nibble as usize, third_nibble as usize)
                }
                0x8 if fourth_nibble == 5 => {
                    self.handle_sub_register_register(second_nibble as usize, third_nibble as usize)
                }
                0x8 if fourth_nibble == 6 => {
                    self.handle_shift_right_register_one(second_nibble as usize, third_nibble as usize)
                }
                0x8 if fourth_nibble == 7 => self
                    .handle_sub_register_register_negated(
                        second_nibble as usize,
                        third_nibble as usize,
                    ),
                0x8 if fourth_nibble == 0xE => {
                    self.handle_shift_left_register_one(second_nibble as usize, third_nibble as usize)
                }
                0x9 if fourth_nibble == 0 => self
                    .handle_skip_if_not_equal_register(second_nibble as usize, third_nibble as usize),
                0xA => self.handle_load_immediate(bottom_tribble),
                0xB => self.handle_jump_with_offset(bottom_tribble),
                0xC => self.handle_random(second_nibble as usize, second_byte),
                0xD => self.handle_draw_sprite(second_nibble, third_nibble, fourth_nibble)?,
                0xE if second_byte == 0x9E => {
                    self.handle_skip_if_key_down(second_nibble as usize, input)
                }
                0xE if second_byte == 0xA1 => {
                    self.handle_skip_if_key_up(second_nibble as usize, input)
                }
                0xF if second_byte == 0x07 => self.handle_load_delay(second_nibble as usize),
                0xF if second_byte == 0x0A => self.handle_wait_for_key(second_nibble),
                0xF if second_byte == 0x15 => self.handle_store_delay(second_nibble as usize),
                0xF if second_byte == 0x18 => self.handle_store_sound(second_nibble as usize),
                0xF if second_byte == 0x1E => self.handle_add_index(second_nibble as usize),
                0xF if second_byte == 0x29 => self.handle_load_font_address(second_nibble as usize),
                0xF if second_byte == 0x33 => self.handle_store_bcd(second_nibble as usize)?,
                0xF if second_byte == 0x55 => self.handle_store_registers(second_nibble as usize)?,
                0xF if second_byte == 0x65 => self.handle_load_registers(second_nibble as usize)?,

                _ => return Err(Fault::InvalidOpcode { pc, opcode: cur }),
            }
        };

        Ok(CycleResult::Continue { cycles })
    }

    fn handle_clear(&mut self) -> u32 {
        self.display.clear();
        109
    }

    /// 00EE - RET
    /// Return from a subroutine.
    ///
    /// The interpreter sets the program counter to the address at the top of the stack, then subtracts 1 from the stack pointer.
    fn handle_ret(&mut self, pc: u16) -> Result<u32, Fault> {
        self.registers.pc = self.registers.pop().ok_or(Fault::StackUnderflow { pc })?;
        Ok(105)
    }

    /// 1nnn - JP addr
    /// Jump to location nnn.
    ///
    /// The interpreter sets the program counter to nnn.
    fn handle_jump(&mut self, n: u16) -> u32 {
        self.registers.pc = n;
        105
    }

    /// 2nnn - CALL addr
    /// Call subroutine at nnn.
    ///
    /// The interpreter increments the stack pointer, then puts the current PC on the top of the stack. The PC is then set to nnn.
    fn handle_call(&mut self, n: u16, pc: u16) -> Result<u32, Fault> {
        self.registers
            .push(self.registers.pc)
            .ok_or(Fault::StackOverflow { pc })?;
        self.registers.pc = n;
        Ok(105)
    }

    /// 3xkk - SE Vx, byte
    /// Skip next instruction if Vx = kk.
    ///
    /// The interpreter compares register Vx to kk, and if they are equal, increments the program counter by 2.
    fn handle_skip_if_equal_immediate(&mut self, x: usize, k: u8) -> u32 {
        let mut cycles = 55;
        if self.registers.vx[x] == k {
            self.registers.pc += 2;
        } else {
            cycles += 9;
        }
        cycles
    }

    /// 4xkk - SNE Vx, byte
    /// Skip next instruction if Vx != kk.
    ///
    /// The interpreter compares register Vx to kk, and if they are not equal, increments the program counter by 2.
    fn handle_skip_if_not_equal_immediate(&mut self, x: usize, k: u8) -> u32 {
        let mut cycles = 55;
        if self.registers.vx[x] != k {
            self.registers.pc += 2;
        } else {
            cycles += 9;
        }
        cycles
    }

    /// 5xy0 - SE Vx, Vy
    /// Skip next instruction if Vx = Vy.
    ///
    /// The interpreter compares register Vx to register Vy, and if they are equal, increments the program counter by 2.
    fn handle_skip_if_equal_register(&mut self, x: usize, y: usize) -> u32 {
        let mut cycles = 55;
        if self.registers.vx[x] == self.registers.vx[y] {
            self.registers.pc += 2;
        } else {
            cycles += 9;
        }
        cycles
    }

    /// 6xkk - LD Vx, byte
    /// Set Vx = kk.
    ///
    /// The interpreter puts the value kk into register Vx.
    fn handle_load_register_immediate(&mut self, x: usize, k: u8) -> u32 {
        self.registers.vx[x] = k;
        27
    }

    /// 7xkk - ADD Vx, byte
    /// Set Vx = Vx + kk.
    ///
    /// Adds the value kk to the value of register Vx, then stores the result in Vx. The carry flag is left untouched.
    fn handle_add_register_immediate(&mut self, x: usize, k: u8) -> u32 {
        let result = self.registers.vx[x].wrapping_add(k);
        self.registers.vx[x] = result;
        45
    }

    /// 8xy0 - LD Vx, Vy
    /// Set Vx = Vy.
    ///
    /// Stores the value of register Vy in register Vx.
    fn handle_load_register_register(&mut self, x: usize, y: usize) -> u32 {
        self.registers.vx[x] = self.registers.vx[y];
        200
    }

    /// 8xy1 - OR Vx, Vy
    /// Set Vx = Vx OR Vy.
    ///
    /// Performs a bitwise OR on the values of Vx and Vy, then stores the result in Vx.
    fn handle_or_register_register(&mut self, x: usize, y: usize) -> u32 {
        self.registers.vx[x] |= self.registers.vx[y];
        200
    }

    /// 8xy2 - AND Vx, Vy
    /// Set Vx = Vx AND Vy.
    ///
    /// Performs a bitwise AND on the values of Vx and Vy, then stores the result in Vx.
    fn handle_and_register_register(&mut self, x: usize, y: usize) -> u32 {
        self.registers.vx[x] &= self.registers.vx[y];
        200
    }

    /// 8xy3 - XOR Vx, Vy
    /// Set Vx = Vx XOR Vy.
    ///
    /// Performs a bitwise XOR on the values of Vx and Vy, then stores the result in Vx.
    fn handle_xor_register_register(&mut self, x: usize, y: usize) -> u32 {
        self.registers.vx[x] ^= self.registers.vx[y];
        200
    }

    /// 8xy4 - ADD Vx, Vy
    /// Set Vx = Vx + Vy, set VF = carry.
    ///
    /// The values of Vx and Vy are added together. If the result is greater than 8 bits
    /// (i.e., > 255,) VF is set to 1, otherwise 0. Only the lowest 8 bits of the result are kept, and stored in Vx.
    fn handle_add_register_register(&mut self, x: usize, y: usize) -> u32 {
        let a = self.registers.vx[x];
        let b = self.registers.vx[y];

        let (result, overflow) = a.overflowing_add(b);
        self.registers.vx[x] = result;

        if overflow {
            self.registers.vx[0xF] = 1;
        } else {
            self.registers.vx[0xF] = 0;
        }
        200
    }

    /// 8xy5 - SUB Vx, Vy
    /// Set Vx = Vx - Vy, set VF = NOT borrow.
    ///
    /// If Vx >= Vy, then VF is set to 1, otherwise 0. Then Vy is subtracted from Vx, and the results stored in Vx.
    fn handle_sub_register_register(&mut self, x: usize, y: usize) -> u32 {
        let a = self.registers.vx[x];
        let b = self.registers.vx[y];

        let (result, underflow) = a.overflowing_sub(b);
        self.registers.vx[x] = result;

        if underflow {
            self.registers.vx[0xF] = 0;
        } else {
            self.registers.vx[0xF] = 1;
        }
        200
    }

    /// 8xy6 - SHR Vx {, Vy}
    /// Set Vx = Vx SHR 1.
    ///
    /// If the least-significant bit of Vx is 1, then VF is set to 1, otherwise 0. Then Vx is divided by 2.
    fn handle_shift_right_register_one(&mut self, x: usize, _y: usize) -> u32 {
        let a = self.registers.vx[x];

        let underflow = a & 1 == 1;
        let result = a >> 1;

        self.registers.vx[x] = result;

        if underflow {
            self.registers.vx[0xF] = 1;
        } else {
            self.registers.vx[0xF] = 0;
        }
        200
    }

    /// 8xy7 - SUBN Vx, Vy
    /// Set Vx = Vy - Vx, set VF = NOT borrow.
    ///
    /// If Vy >= Vx, then VF is set to 1, otherwise 0. Then Vx is subtracted from Vy, and the results stored in Vx.
    fn handle_sub_register_register_negated(&mut self, x: usize, y: usize) -> u32 {
        let a = self.registers.vx[x];
        let b = self.registers.vx[y];

        let (result, underflow) = b.overflowing_sub(a);
        self.registers.vx[x] = result;

        if underflow {
            self.registers.vx[0xF] = 0;
        } else {
            self.registers.vx[0xF] = 1;
        }
        200
    }

    /// 8xyE - SHL Vx {, Vy}
    /// Set Vx = Vx SHL 1.
    ///
    /// If the most-significant bit of Vx is 1, then VF is set to 1, otherwise to 0. Then Vx is multiplied by 2.
    fn handle_shift_left_register_one(&mut self, x: usize, _y: usize) -> u32 {
        let a = self.registers.vx[x];

        let overflow = a & 0b1000_0000 != 0;
        let result = a << 1;

        self.registers.vx[x] = result;

        if overflow {
            self.registers.vx[0xF] = 1;
        } else {
            self.registers.vx[0xF] = 0;
        }
        200
    }

    /// 9xy0 - SNE Vx, Vy
    /// Skip next instruction if Vx != Vy.
    ///
    /// The values of Vx and Vy are compared, and if they are not equal, the program counter is increased by 2.
    fn handle_skip_if_not_equal_register(&mut self, x: usize, y: usize) -> u32 {
        let mut cycles = 73;
        if self.registers.vx[x] != self.registers.vx[y] {
            self.registers.pc += 2;
        } else {
            cycles += 9;
        }
        cycles
    }

    /// Annn - LD I, addr
    /// Set I = nnn.
    ///
    /// The value of register I is set to nnn.
    fn handle_load_immediate(&mut self, n: u16) -> u32 {
        self.registers.i = n;
        55
    }

    /// Bnnn - JP V0, addr
    /// Jump to location nnn + V0.
    ///
    /// The program counter is set to nnn plus the value of V0, wrapped into the 12-bit address space.
    fn handle_jump_with_offset(&mut self, n: u16) -> u32 {
        self.registers.pc = (n + self.registers.vx[0] as u16) & 0x0FFF;
        105
    }

    /// Cxkk - RND Vx, byte
    /// Set Vx = random byte AND kk.
    ///
    /// The interpreter generates a random number from 0 to 255, which is then ANDed with the value kk. The results are stored in Vx.
    fn handle_random(&mut self, x: usize, k: u8) -> u32 {
        let random: u8 = self.rng.gen();
        self.registers.vx[x] = random & k;
        164
    }

    /// Dxyn - DRW Vx, Vy, nibble
    /// Display n-byte sprite starting at memory location I at (Vx, Vy), set VF = collision.
    ///
    /// The interpreter reads n bytes from memory, starting at the address stored in I. These bytes
    /// are then displayed as sprites on screen at coordinates (Vx, Vy). Sprites are XORed onto the
    /// existing screen. If this causes any pixels to be erased, VF is set to 1, otherwise it is set
    /// to 0. If the sprite is positioned so part of it is outside the coordinates of the display, it
    /// wraps around to the opposite side of the screen.
    fn handle_draw_sprite(&mut self, x: u8, y: u8, n: u8) -> Result<u32, Fault> {
        let mut was_set = false;

        let mut row: usize = self.registers.vx[y as usize].into();

        trace!(
            "drawing {} sprite rows from {:#06X} at ({}, {})",
            n,
            self.registers.i,
            self.registers.vx[x as usize],
            row
        );

        for offset in 0..n {
            let sprite = self.memory.read(self.registers.i.wrapping_add(offset.into()))?;

            let mut mask: u8 = 0b1000_0000;

            let mut col: usize = self.registers.vx[x as usize].into();

            for _ in 0..8 {
                if sprite & mask > 0 && self.display.toggle_pixel(col, row) {
                    was_set = true;
                }

                mask >>= 1;

                col += 1;
            }

            row += 1;
        }

        if was_set {
            self.registers.vx[0xF] = 1;
        } else {
            self.registers.vx[0xF] = 0;
        }

        self.display.mark_dirty();

        Ok(22734)
    }

    /// Ex9E - SKP Vx
    /// Skip next instruction if key with the value of Vx is pressed.
    ///
    /// Checks the keyboard, and if the key corresponding to the value of Vx is currently in the down position, PC is increased by 2.
    fn handle_skip_if_key_down(&mut self, x: usize, input: &impl InputSource) -> u32 {
        if input.is_key_down(self.registers.vx[x]) {
            self.registers.pc += 2;
        }
        73
    }

    /// ExA1 - SKNP Vx
    /// Skip next instruction if key with the value of Vx is not pressed.
    ///
    /// Checks the keyboard, and if the key corresponding to the value of Vx is currently in the up position, PC is increased by 2.
    fn handle_skip_if_key_up(&mut self, x: usize, input: &impl InputSource) -> u32 {
        if !input.is_key_down(self.registers.vx[x]) {
            self.registers.pc += 2;
        }
        73
    }

    /// Fx07 - LD Vx, DT
    /// Set Vx = delay timer value.
    ///
    /// The value of DT is placed into Vx.
    fn handle_load_delay(&mut self, x: usize) -> u32 {
        self.registers.vx[x] = self.timers.delay();
        45
    }

    /// Fx0A - LD Vx, K
    /// Wait for a key press, store the value of the key in Vx.
    ///
    /// All execution stops until a key is pressed, then the value of that key is stored in Vx.
    fn handle_wait_for_key(&mut self, x: u8) -> u32 {
        debug!("waiting for a key press into V{:X}", x);
        self.waiting_for_key = Some(x);
        1
    }

    /// Fx15 - LD DT, Vx
    /// Set delay timer = Vx.
    fn handle_store_delay(&mut self, x: usize) -> u32 {
        self.timers.set_delay(self.registers.vx[x]);
        45
    }

    /// Fx18 - LD ST, Vx
    /// Set sound timer = Vx.
    fn handle_store_sound(&mut self, x: usize) -> u32 {
        self.timers.set_sound(self.registers.vx[x]);
        45
    }

    /// Fx1E - ADD I, Vx
    /// Set I = I + Vx.
    ///
    /// The values of I and Vx are added, and the results are stored in I.
    fn handle_add_index(&mut self, x: usize) -> u32 {
        self.registers.i = self.registers.i.wrapping_add(self.registers.vx[x] as u16);
        86
    }

    /// Fx29 - LD F, Vx
    /// Set I = location of sprite for digit Vx.
    ///
    /// The value of I is set to the location for the hexadecimal sprite corresponding to the value of Vx. Each glyph is five bytes tall.
    fn handle_load_font_address(&mut self, x: usize) -> u32 {
        self.registers.i = (FONT_ADDR + self.registers.vx[x] as usize * 5) as u16;
        91
    }

    /// Fx33 - LD B, Vx
    /// Store BCD representation of Vx in memory locations I, I+1, and I+2.
    ///
    /// The interpreter takes the decimal value of Vx, and places the hundreds digit in memory at location in I,
    /// the tens digit at location I+1, and the ones digit at location I+2.
    fn handle_store_bcd(&mut self, x: usize) -> Result<u32, Fault> {
        let value = self.registers.vx[x];
        let i = self.registers.i;

        self.memory.write(i, value / 100)?;
        self.memory.write(i.wrapping_add(1), (value / 10) % 10)?;
        self.memory.write(i.wrapping_add(2), value % 10)?;

        Ok(927)
    }

    /// Fx55 - LD [I], Vx
    /// Store registers V0 through Vx in memory starting at location I.
    ///
    /// The interpreter copies the values of registers V0 through Vx into memory, starting at the address in I. I itself is left unmodified.
    fn handle_store_registers(&mut self, x: usize) -> Result<u32, Fault> {
        for offset in 0..=x {
            let address = self.registers.i.wrapping_add(offset as u16);
            self.memory.write(address, self.registers.vx[offset])?;
        }

        Ok(605 + x as u32 * 64)
    }

    /// Fx65 - LD Vx, [I]
    /// Read registers V0 through Vx from memory starting at location I.
    ///
    /// The interpreter reads values from memory starting at location I into registers V0 through Vx. I itself is left unmodified.
    fn handle_load_registers(&mut self, x: usize) -> Result<u32, Fault> {
        for offset in 0..=x {
            let address = self.registers.i.wrapping_add(offset as u16);
            self.registers.vx[offset] = self.memory.read(address)?;
        }

        Ok(605 + x as u32 * 64)
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }
}
