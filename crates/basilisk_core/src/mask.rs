//! # Collision Mask
//!
//! Per-pixel boolean bitmap derived from a surface, used for
//! pixel-accurate (non-rectangular) collision testing. One [`BitSet`] row
//! per scanline; the offset overlap test scans only the overlapping
//! sub-rectangle and short-circuits on the first intersecting row.

use bytemuck::cast_slice;

use crate::bitset::BitSet;
use crate::rect::Rect;
use crate::surface::{Color, Surface};

/// A 2D bit grid with one bitset per row.
///
/// Invariant: `rows.len() == height` and every row holds `width` bits.
/// A mask constructed with a non-positive dimension has no rows and every
/// operation on it is inert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    rows: Vec<BitSet>,
}

impl Mask {
    /// Creates a cleared mask of the given size.
    ///
    /// Non-positive dimensions yield an empty mask.
    #[must_use]
    pub fn new(size: (i32, i32)) -> Self {
        let width = size.0.max(0) as usize;
        let height = size.1.max(0) as usize;
        let (width, height) = if width == 0 || height == 0 {
            (0, 0)
        } else {
            (width, height)
        };
        Self {
            width,
            height,
            rows: (0..height).map(|_| BitSet::new(width)).collect(),
        }
    }

    /// Builds a mask from a surface's alpha channel.
    ///
    /// A pixel is set where `alpha > threshold`. Returns `None` for a
    /// zero-area surface.
    #[must_use]
    pub fn from_surface(surface: &impl Surface, threshold: u8) -> Option<Self> {
        let (w, h) = (surface.width(), surface.height());
        let mut mask = Self::new((w as i32, h as i32));
        if mask.rows.is_empty() {
            return None;
        }
        let data = surface.image_data(0, 0, w, h);
        let pixels: &[[u8; 4]] = cast_slice(&data);
        for y in 0..mask.height {
            let row = &mut mask.rows[y];
            for x in 0..mask.width {
                if pixels[y * mask.width + x][3] > threshold {
                    row.set(x, true);
                }
            }
        }
        Some(mask)
    }

    /// Builds a mask from a surface by color membership.
    ///
    /// With the default sentinel threshold `(0, 0, 0, 255)` a pixel is set
    /// on an exact RGB match with alpha at least 255 (the fast path).
    /// Otherwise a pixel is set when each channel is within the matching
    /// threshold component of `color` and alpha reaches `threshold.3`.
    ///
    /// Returns `None` for a zero-area surface.
    #[must_use]
    pub fn from_threshold(
        surface: &impl Surface,
        color: Color,
        threshold: (u8, u8, u8, u8),
    ) -> Option<Self> {
        let (w, h) = (surface.width(), surface.height());
        let mut mask = Self::new((w as i32, h as i32));
        if mask.rows.is_empty() {
            return None;
        }
        let data = surface.image_data(0, 0, w, h);
        let pixels: &[[u8; 4]] = cast_slice(&data);
        let exact = threshold == (0, 0, 0, 255);
        for y in 0..mask.height {
            let row = &mut mask.rows[y];
            for x in 0..mask.width {
                let [r, g, b, a] = pixels[y * mask.width + x];
                let hit = if exact {
                    r == color.r && g == color.g && b == color.b && a >= threshold.3
                } else {
                    r.abs_diff(color.r) <= threshold.0
                        && g.abs_diff(color.g) <= threshold.1
                        && b.abs_diff(color.b) <= threshold.2
                        && a >= threshold.3
                };
                if hit {
                    row.set(x, true);
                }
            }
        }
        Some(mask)
    }

    /// Mask size as `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn get_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the bit at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the mask.
    #[must_use]
    pub fn get_at(&self, pos: (usize, usize)) -> bool {
        assert!(
            pos.0 < self.width && pos.1 < self.height,
            "mask position {pos:?} out of range"
        );
        self.rows[pos.1].get(pos.0)
    }

    /// Sets the bit at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the mask.
    pub fn set_at(&mut self, pos: (usize, usize), value: bool) {
        assert!(pos.1 < self.height, "mask row {} out of range", pos.1);
        self.rows[pos.1].set(pos.0, value);
    }

    /// Sets every bit.
    pub fn fill(&mut self) {
        for row in &mut self.rows {
            row.fill();
        }
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear_all();
        }
    }

    /// Inverts every bit.
    pub fn invert(&mut self) {
        for row in &mut self.rows {
            row.flip_range(0, self.width);
        }
    }

    /// Returns the total number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.iter().map(BitSet::cardinality).sum()
    }

    /// Tests whether `other`, shifted by `offset`, shares any set bit with
    /// this mask.
    ///
    /// Only the overlapping sub-rectangle is scanned, row by row, stopping
    /// at the first intersecting row. Symmetric under offset negation:
    /// `a.overlap(b, (dx, dy)) == b.overlap(a, (-dx, -dy))`.
    #[must_use]
    pub fn overlap(&self, other: &Self, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;
        let (x1, x2) = if dx > 0 {
            (dx as usize, 0)
        } else {
            (0, (-dx) as usize)
        };
        let (y1, y2) = if dy > 0 {
            (dy as usize, 0)
        } else {
            (0, (-dy) as usize)
        };
        if x1 >= self.width || x2 >= other.width || y1 >= self.height || y2 >= other.height {
            return false;
        }
        let w = (self.width - x1).min(other.width - x2);
        let h = (self.height - y1).min(other.height - y2);
        for y in 0..h {
            if self.rows[y1 + y].intersects_range(x1, &other.rows[y2 + y], x2, w) {
                return true;
            }
        }
        false
    }

    /// Bounding rect of the mask at the origin.
    #[must_use]
    pub fn get_rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

impl std::fmt::Display for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            writeln!(f)?;
            for x in 0..self.width {
                f.write_str(if row.get(x) { "1" } else { "0" })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BufferSurface;

    #[test]
    fn test_zero_area_mask_is_inert() {
        let mut m = Mask::new((0, 5));
        assert_eq!(m.get_size(), (0, 0));
        assert_eq!(m.count(), 0);
        m.fill();
        m.invert();
        assert_eq!(m.count(), 0);

        let s = BufferSurface::new(0, 4);
        assert!(Mask::from_surface(&s, 127).is_none());
    }

    #[test]
    fn test_from_surface_threshold_boundary() {
        let s = BufferSurface::filled(6, 4, Color::rgba(0, 0, 0, 200));
        let m = Mask::from_surface(&s, 127).unwrap();
        assert_eq!(m.count(), 24);
        let m = Mask::from_surface(&s, 255).unwrap();
        assert_eq!(m.count(), 0);
        // alpha == threshold is not set
        let m = Mask::from_surface(&s, 200).unwrap();
        assert_eq!(m.count(), 0);
    }

    #[test]
    fn test_from_threshold_exact_and_range() {
        let mut s = BufferSurface::filled(3, 1, Color::rgb(100, 100, 100));
        s.set_at(1, 0, Color::rgb(104, 100, 100));
        s.set_at(2, 0, Color::rgb(120, 100, 100));

        let exact = Mask::from_threshold(&s, Color::rgb(100, 100, 100), (0, 0, 0, 255)).unwrap();
        assert_eq!(exact.count(), 1);
        assert!(exact.get_at((0, 0)));

        let near = Mask::from_threshold(&s, Color::rgb(100, 100, 100), (5, 5, 5, 255)).unwrap();
        assert_eq!(near.count(), 2);
        assert!(!near.get_at((2, 0)));
    }

    #[test]
    fn test_overlap_offsets() {
        let mut a = Mask::new((8, 8));
        let mut b = Mask::new((8, 8));
        a.set_at((7, 7), true);
        b.set_at((0, 0), true);
        // b shifted by (7,7) puts its origin bit on a's set bit.
        assert!(a.overlap(&b, (7, 7)));
        assert!(!a.overlap(&b, (6, 7)));
        // No overlap region at all.
        assert!(!a.overlap(&b, (8, 0)));
        assert!(!a.overlap(&b, (-8, 0)));
    }

    #[test]
    fn test_overlap_symmetry() {
        let mut a = Mask::new((16, 4));
        let mut b = Mask::new((10, 6));
        a.set_at((12, 1), true);
        b.set_at((3, 2), true);
        for offset in [(9, -1), (0, 0), (-3, 2), (15, 3), (-9, -5)] {
            assert_eq!(
                a.overlap(&b, offset),
                b.overlap(&a, (-offset.0, -offset.1)),
                "offset {offset:?}"
            );
        }
        assert!(a.overlap(&b, (9, -1)));
    }

    #[test]
    fn test_fill_invert_count() {
        let mut m = Mask::new((5, 3));
        m.fill();
        assert_eq!(m.count(), 15);
        m.set_at((2, 1), false);
        m.invert();
        assert_eq!(m.count(), 1);
        assert!(m.get_at((2, 1)));
    }
}
