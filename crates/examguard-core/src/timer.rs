//! One-second countdown for the quiz session.
//!
//! The timer is driven by explicit [`CountdownTimer::tick`] calls from the
//! single event loop; it never schedules anything itself. It reports expiry
//! exactly once, never goes negative, and becomes inert once stopped.

/// Outcome of a single timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The timer is stopped or already expired; nothing changed.
    Idle,
    /// One second consumed; this many seconds remain.
    Running(u32),
    /// The countdown just reached zero. Reported exactly once.
    Expired,
}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    total_seconds: u32,
    remaining: u32,
    running: bool,
    expiry_reported: bool,
}

impl CountdownTimer {
    /// A stopped timer holding the full duration. Call [`Self::start`] when
    /// the session enters InProgress.
    pub fn new(total_seconds: u32) -> Self {
        Self {
            total_seconds,
            remaining: total_seconds,
            running: false,
            expiry_reported: false,
        }
    }

    /// Begin (or resume) ticking. Has no effect after expiry.
    pub fn start(&mut self) {
        if !self.expiry_reported {
            self.running = true;
        }
    }

    /// Stop ticking. Later ticks return [`Tick::Idle`].
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume one second of session time.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            self.expiry_reported = true;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining
    }

    /// Remaining time as `M:SS`.
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining)
    }
}

/// Format a second count as `M:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
