//! Per-question countdown driven by external one-second ticks.
//!
//! The countdown never schedules anything itself: the event loop owns the
//! interval and calls [`Countdown::tick`] once per elapsed second.

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is stopped; nothing happened.
    Idle,
    /// One second elapsed and time is left.
    Running(u32),
    /// Time ran out on this tick. Reported exactly once.
    Expired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    /// Begin counting down from `seconds`.
    ///
    /// Must only be called on a stopped countdown; a fresh question gets a
    /// fresh countdown rather than restarting a live one.
    pub fn start(&mut self, seconds: u32) {
        debug_assert!(!self.running, "countdown restarted while running");
        self.remaining = seconds;
        self.running = true;
    }

    /// Halt ticking. Calling it on a stopped countdown is a no-op.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
