//! # BASILISK
//!
//! A browser-hosted 2D sprite/input engine core. Raw canvas events are
//! normalized into a bounded event queue; the application drains the
//! queue once per frame, moves its sprites, and the group machinery hands
//! the compositor a minimal list of screen regions to repaint.
//!
//! ```rust,ignore
//! let mut rt = Runtime::new(RuntimeConfig::default(), clock);
//! // per frame:
//! for event in rt.queue_mut().get(None) {
//!     // react to input
//! }
//! stage.clear_group(group, rt.canvas_mut().surface_mut(), background);
//! let changed = stage.draw_group(group, rt.canvas_mut().surface_mut()).to_vec();
//! rt.canvas().update(&changed);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod canvas;
pub mod config;
pub mod runtime;
pub mod time;

pub use basilisk_core::{BitSet, BufferSurface, Color, Mask, Rect, RectPool, Surface};
pub use basilisk_event::{
    Event, EventKind, EventQueue, InputDispatcher, KeyRepeat, KeyState, MouseState, Payload,
    RawInput,
};
pub use basilisk_sprite::{Background, Group, GroupId, GroupKind, SpriteData, SpriteId, Stage};

pub use canvas::Canvas;
pub use config::{ConfigError, RuntimeConfig};
pub use runtime::Runtime;
pub use time::{Clock, FrameTimer, ManualClock};
