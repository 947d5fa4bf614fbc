//! # BASILISK Event
//!
//! The input side of the engine: raw browser events arrive at a canvas
//! handler, are normalized into a tagged event union, and flow through a
//! bounded FIFO queue that the application drains once per frame.
//!
//! ## Architecture Rules
//!
//! 1. **Never block** - the browser dispatches synchronously and cannot
//!    be backpressured; the queue is lossy under flooding instead
//! 2. **Reentrancy over locking** - a single-threaded drain guard with an
//!    overflow buffer, not a mutex
//! 3. **Silent drops are contractual** - posting a blocked type and
//!    overflow compaction are no-ops by design

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatch;
pub mod event;
pub mod keyboard;
pub mod mouse;
pub mod queue;

pub use dispatch::{InputDispatcher, RawInput};
pub use event::{Event, EventKind, Payload, UserData, UserValue};
pub use keyboard::{InputError, KeyCode, KeyRepeat, KeyState};
pub use mouse::MouseState;
pub use queue::{DrainGuard, EventQueue};
