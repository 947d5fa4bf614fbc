//! # BASILISK Sprite
//!
//! The repaint side of the engine: a stage of sprite records, polymorphic
//! group containers, and the dirty-rect diff that lets the compositor
//! repaint only the pixels that actually changed.
//!
//! ## Architecture Rules
//!
//! 1. **Membership is many-to-many** - groups hold back-references, never
//!    sprite lifetime
//! 2. **Repaint is incremental** - previous and current rects are diffed
//!    into a minimal changed-region list
//! 3. **Layer ranges stay contiguous** - the layered index is an
//!    invariant-checked data structure, not scattered bookkeeping

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod collide;
pub mod group;
pub mod stage;

pub use collide::{
    collide_circle, collide_circle_ratio, collide_mask, collide_rect, collide_rect_ratio,
    groupcollide, spritecollide, spritecollideany,
};
pub use group::{Background, Group, GroupKind};
pub use stage::{GroupId, SpriteData, SpriteId, Stage};
