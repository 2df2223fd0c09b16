//! Monotonic time and bounded waits.
//!
//! Both time-sensitive parts of the appliance go through this module:
//!
//! - The connectivity state machine charges a 20 s budget to every Joining
//!   episode (a [`Deadline`] created on entry).
//! - The RPC probe bounds each of its two response reads to 3 s
//!   ([`with_deadline`]).
//!
//! # Why a `Clock` trait? (for beginners)
//!
//! Code that calls `Instant::now()` directly is hard to test: a test that
//! wants to observe "20 seconds later" would have to actually sleep for 20
//! seconds.  Taking time from a [`Clock`] lets tests substitute a
//! [`ManualClock`] and advance it by hand.

pub mod clock;
pub mod deadline;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use deadline::{with_deadline, Deadline, Waited};
