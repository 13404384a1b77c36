/// The delay and sound countdown pair. Both run at the frame rate, not the
/// CPU rate: the scheduler decrements them once per displayed frame and they
/// stop at zero instead of wrapping.
#[derive(Debug)]
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Timers { delay: 0, sound: 0 }
    }

    /// Decrements both counters by one, floored at zero.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// The buzzer should be audible while the sound timer is running.
    pub fn is_sound_active(&self) -> bool {
        self.sound > 0
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_down_to_zero() {
        let mut timers = Timers::new();
        timers.set_delay(2);

        timers.tick();
        assert_eq!(timers.delay(), 1);

        timers.tick();
        assert_eq!(timers.delay(), 0);

        timers.tick();
        assert_eq!(timers.delay(), 0);
    }

    #[test]
    fn test_sound_is_active_until_the_counter_expires() {
        let mut timers = Timers::new();

        assert!(!timers.is_sound_active());

        timers.set_sound(2);
        assert!(timers.is_sound_active());

        timers.tick();
        assert!(timers.is_sound_active());

        timers.tick();
        assert!(!timers.is_sound_active());
    }
}
