//! Throttle state machine
//!
//! Coalesces a burst of triggers into at most one invocation per interval.
//! The first trigger in a clear window runs immediately; triggers landing
//! inside the cooldown arm a single trailing run at the end of the window,
//! so the last trigger of a burst is never lost.
//!
//! The struct holds no callback and schedules nothing itself: callers act on
//! the returned [`ThrottleFire`] and use their own timer queue for the
//! trailing deadline.

use std::time::{Duration, Instant};

/// What the caller should do about a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleFire {
    /// The window is clear: invoke now.
    Now,
    /// Inside the cooldown with no trailing run armed yet: schedule one at
    /// the contained deadline, then report it via
    /// [`Throttle::trailing_elapsed`].
    ArmTrailing(Instant),
    /// Inside the cooldown with a trailing run already armed: nothing to do.
    Coalesced,
}

/// Burst coalescer with a leading run and one armed trailing run.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use overmark_scheduler::{Throttle, ThrottleFire};
///
/// let mut throttle = Throttle::new(Duration::from_millis(50));
/// let start = Instant::now();
///
/// assert_eq!(throttle.fire(start), ThrottleFire::Now);
/// assert_eq!(
///     throttle.fire(start + Duration::from_millis(10)),
///     ThrottleFire::ArmTrailing(start + Duration::from_millis(50)),
/// );
/// assert_eq!(
///     throttle.fire(start + Duration::from_millis(20)),
///     ThrottleFire::Coalesced,
/// );
/// ```
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    trailing_armed: bool,
}

impl Throttle {
    /// Create a throttle with the given minimum interval between runs.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            trailing_armed: false,
        }
    }

    /// Report a trigger at `now` and learn what to do with it.
    pub fn fire(&mut self, now: Instant) -> ThrottleFire {
        match self.last_run {
            Some(last) if now < last + self.interval => {
                if self.trailing_armed {
                    ThrottleFire::Coalesced
                } else {
                    self.trailing_armed = true;
                    ThrottleFire::ArmTrailing(last + self.interval)
                }
            }
            _ => {
                self.last_run = Some(now);
                ThrottleFire::Now
            }
        }
    }

    /// Report that an armed trailing deadline has elapsed.
    ///
    /// Returns `true` when a trailing run was armed; the caller must then
    /// perform the invocation. Records the run, restarting the cooldown.
    pub fn trailing_elapsed(&mut self, now: Instant) -> bool {
        if !self.trailing_armed {
            return false;
        }
        self.trailing_armed = false;
        self.last_run = Some(now);
        true
    }

    /// The configured minimum interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
