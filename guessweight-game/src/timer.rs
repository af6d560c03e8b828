//! Per-animal countdown.
//!
//! The countdown does not own a clock. The host calls [`Countdown::tick`] once
//! per second with the token it got from [`Countdown::start`]; ticks carrying an
//! older token are ignored, so a callback scheduled before a restart can never
//! fire a timeout for the wrong animal.
use serde::{Deserialize, Serialize};

/// Identifies one started countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "remaining", rename_all = "lowercase")]
pub enum TimerEvent {
    /// Seconds left after this tick.
    Tick(u32),
    Expired,
    /// Stale token or no countdown running.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct Countdown {
    generation: u64,
    remaining: Option<u32>,
}

impl Countdown {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: 0,
            remaining: None,
        }
    }

    /// Start a fresh countdown, cancelling any running one.
    pub fn start(&mut self, duration: u32) -> TimerToken {
        self.generation = self.generation.wrapping_add(1);
        self.remaining = Some(duration);
        TimerToken(self.generation)
    }

    /// Cancel the running countdown. Stopping twice is harmless.
    pub fn stop(&mut self) {
        if self.remaining.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Advance one second.
    ///
    /// Remaining time counts down to zero inclusive; the tick after zero
    /// expires the countdown exactly once.
    pub fn tick(&mut self, token: TimerToken) -> TimerEvent {
        if token.0 != self.generation {
            return TimerEvent::Ignored;
        }
        match self.remaining {
            None => TimerEvent::Ignored,
            Some(0) => {
                self.remaining = None;
                TimerEvent::Expired
            }
            Some(left) => {
                self.remaining = Some(left - 1);
                TimerEvent::Tick(left - 1)
            }
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    /// Token of the running countdown, if any.
    #[must_use]
    pub const fn token(&self) -> Option<TimerToken> {
        if self.remaining.is_some() {
            Some(TimerToken(self.generation))
        } else {
            None
        }
    }
}

/// Render seconds as `MM:SS`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_zero_then_expires_once() {
        let mut countdown = Countdown::new();
        let token = countdown.start(3);
        assert_eq!(countdown.remaining(), Some(3));
        assert_eq!(countdown.tick(token), TimerEvent::Tick(2));
        assert_eq!(countdown.tick(token), TimerEvent::Tick(1));
        assert_eq!(countdown.tick(token), TimerEvent::Tick(0));
        assert_eq!(countdown.tick(token), TimerEvent::Expired);
        assert_eq!(countdown.tick(token), TimerEvent::Ignored);
        assert!(!countdown.is_running());
    }

    #[test]
    fn restart_invalidates_old_token() {
        let mut countdown = Countdown::new();
        let old = countdown.start(10);
        let fresh = countdown.start(5);
        assert_ne!(old, fresh);
        assert_eq!(countdown.tick(old), TimerEvent::Ignored);
        assert_eq!(countdown.tick(fresh), TimerEvent::Tick(4));
        assert_eq!(countdown.token(), Some(fresh));
    }

    #[test]
    fn stop_is_idempotent_and_silences_ticks() {
        let mut countdown = Countdown::new();
        let token = countdown.start(2);
        countdown.stop();
        countdown.stop();
        assert_eq!(countdown.tick(token), TimerEvent::Ignored);
        assert_eq!(countdown.token(), None);
        let next = countdown.start(2);
        assert_eq!(countdown.tick(next), TimerEvent::Tick(1));
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(45), "00:45");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(605), "10:05");
    }
}
