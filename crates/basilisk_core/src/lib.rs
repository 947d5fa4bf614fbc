//! # BASILISK Core
//!
//! Geometry and bit-level primitives for the BASILISK engine:
//! - Integer rectangles with derived-point accessors and collide scans
//! - A freelist rect pool to keep per-frame diffing allocation-free
//! - Bitset rows and the pixel-accurate collision `Mask`
//! - The `Surface` collaborator contract plus a software implementation
//!
//! ## Architecture Rules
//!
//! 1. **No browser dependencies** - this crate is pure data structures
//! 2. **Hot paths do not allocate** - pooled rects, word-level bit scans
//! 3. **Lossy-safe** - degenerate inputs (zero-area masks, empty clips)
//!    produce inert values, never panics

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bitset;
pub mod mask;
pub mod pool;
pub mod rect;
pub mod surface;

pub use bitset::BitSet;
pub use mask::Mask;
pub use pool::RectPool;
pub use rect::Rect;
pub use surface::{BufferSurface, Color, Surface};
