//! # Rect Pool
//!
//! Freelist of [`Rect`] values for the per-frame collision and repaint
//! paths.
//!
//! `Rect` is `Copy`, so checkout moves a value out of the pool and return
//! moves it back; a caller cannot retain a pooled rect past its return.
//! Forgetting to return a rect is a soft failure: the pool shrinks and the
//! next `get` allocates a fresh value, nothing is corrupted.
//!
//! # Thread Safety
//!
//! This pool is NOT thread-safe. The engine runs a single-threaded
//! cooperative callback model; each stage owns its own pool.

use crate::rect::Rect;

/// A freelist pool of rect values.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = RectPool::new();
/// let r = pool.get(0, 0, 32, 32);
/// // ... use r for a collision scan ...
/// pool.append(r);
/// ```
#[derive(Debug, Default)]
pub struct RectPool {
    free: Vec<Rect>,
}

impl RectPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool pre-seeded with `capacity` zero rects.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: vec![Rect::ZERO; capacity],
        }
    }

    /// Returns the number of rects currently pooled.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Returns `true` if the pool holds no rects.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Checks out a rect with the given fields.
    ///
    /// Pops from the freelist when possible, allocates otherwise.
    #[inline]
    #[must_use]
    pub fn get(&mut self, x: i32, y: i32, w: i32, h: i32) -> Rect {
        match self.free.pop() {
            Some(mut r) => {
                r.x = x;
                r.y = y;
                r.w = w;
                r.h = h;
                r
            }
            None => Rect::new(x, y, w, h),
        }
    }

    /// Checks out a copy of `rect`.
    #[inline]
    #[must_use]
    pub fn copy(&mut self, rect: Rect) -> Rect {
        self.get(rect.x, rect.y, rect.w, rect.h)
    }

    /// Returns a rect to the pool.
    #[inline]
    pub fn append(&mut self, rect: Rect) {
        self.free.push(rect);
    }

    /// Returns every rect in `rects` to the pool.
    pub fn extend(&mut self, rects: impl IntoIterator<Item = Rect>) {
        self.free.extend(rects);
    }
}
