const DISPLAY_WIDTH: usize = 64;
const DISPLAY_HEIGHT: usize = 32;

/// The original implementation of the Chip-8 language used a 64x32-pixel monochrome display with this format:
/// ( 0, 0)   (63, 0)
/// ( 0,31)   (63,31)
///
/// Both coordinates wrap, so drawing past an edge re-enters on the opposite
/// side. The buffer also carries a dirty flag that tells the frontend whether
/// anything changed since the last render handoff.
#[derive(Debug)]
pub struct Display {
    pixels: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
    dirty: bool,
}

impl Display {
    pub fn new() -> Self {
        Display {
            pixels: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    /// Blanks the whole buffer and flags it for redraw.
    pub fn clear(&mut self) {
        for pixel in &mut self.pixels {
            *pixel = false
        }

        self.dirty = true;
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[self.compute_idx(x, y)]
    }

    /// Toggles the pixel at position (`x`, `y`) and returns `true` if the
    /// pixel was set before the toggle, which sprite drawing reports as a
    /// collision.
    pub fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        let idx = self.compute_idx(x, y);
        let last_value = self.pixels[idx];
        self.pixels[idx] = !last_value;

        last_value
    }

    fn compute_idx(&self, x: usize, y: usize) -> usize {
        (y % self.height()) * self.width() + (x % self.width())
    }

    /// Flags the buffer as changed since the last render handoff.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the buffer changed since the last call and lowers the
    /// flag, so handing the same frame to the renderer twice is a no-op.
    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;

        was_dirty
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }
}
