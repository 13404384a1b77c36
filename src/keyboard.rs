use std::fmt;

/// Capability interface for the 16-key hexadecimal pad. The interpreter only
/// ever queries a snapshot of key state; collecting input events stays on the
/// frontend side of this boundary.
pub trait InputSource {
    /// Whether the key `0x0..=0xF` named by `key` is currently held.
    fn is_key_down(&self, key: u8) -> bool;

    /// The key a blocking key-wait should resolve to, if any is held.
    fn wait_for_any_key(&self) -> Option<u8>;
}

/// Boolean snapshot of the hexadecimal pad, refreshed by the frontend once
/// per frame.
pub struct Keyboard {
    pressed_keys: [bool; 16],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            pressed_keys: [false; 16],
        }
    }

    pub fn press_key(&mut self, key: u8) {
        self.pressed_keys[(key & 0x0F) as usize] = true;
    }

    pub fn release_key(&mut self, key: u8) {
        self.pressed_keys[(key & 0x0F) as usize] = false;
    }

    pub fn clear(&mut self) {
        for key in 0..16 {
            self.pressed_keys[key as usize] = false;
        }
    }
}

impl InputSource for Keyboard {
    fn is_key_down(&self, key: u8) -> bool {
        self.pressed_keys[(key & 0x0F) as usize]
    }

    /// Resolves to the lowest-numbered held key, matching the original
    /// hardware scan order.
    fn wait_for_any_key(&self) -> Option<u8> {
        (0u8..16).find(|&key| self.pressed_keys[key as usize])
    }
}

impl fmt::Display for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.pressed_keys.map(|k| if k { "o" } else { " " }).join("")
        )
    }
}
