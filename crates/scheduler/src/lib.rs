//! Overmark Scheduler Library
//!
//! Deadline queue, throttle, and cancellation primitives for the overlay
//! annotator.
//!
//! This crate provides the cooperative timing machinery the annotator relies
//! on: a typed timer queue drained by an explicit pump, a throttle state
//! machine that coalesces event bursts, and cancellation tokens for deferred
//! work. Nothing here spawns threads or sleeps; the host decides when time
//! advances and pumps due work.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use overmark_scheduler::{Clock, ManualClock, TimerQueue};
//!
//! let clock = ManualClock::new();
//! let mut timers: TimerQueue<&str> = TimerQueue::new();
//!
//! timers.schedule(clock.now() + Duration::from_millis(10), "reveal");
//!
//! // Nothing is due yet.
//! assert!(timers.advance(clock.now()).is_empty());
//!
//! // Move time forward and pump.
//! clock.advance(Duration::from_millis(10));
//! assert_eq!(timers.advance(clock.now()), vec!["reveal"]);
//! ```

mod cancel;
mod clock;
mod throttle;
mod timer;

// Re-export public API
pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use throttle::{Throttle, ThrottleFire};
pub use timer::TimerQueue;
