//! # Group Family
//!
//! Polymorphic sprite containers. A group records *which* sprites it
//! holds and in what paint order; the sprite records themselves live in
//! the stage arena. The dirty-draw variants additionally remember the
//! rect every sprite occupied at the previous draw and diff it against
//! the current rect to produce a minimal changed-region list.

use std::collections::{HashMap, HashSet};

use basilisk_core::{BufferSurface, Rect, RectPool, Surface};

use crate::stage::{SpriteEntry, SpriteId};

/// Behavior variant of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// Plain container; iteration order unspecified.
    Plain,
    /// Holds at most one sprite; adding replaces the occupant.
    Single,
    /// Tracks dirty rects across draws; iteration order unspecified.
    RenderUpdates,
    /// Dirty-rect tracking with deterministic insertion order.
    OrderedUpdates,
    /// Dirty-rect tracking with layer-then-insertion paint order.
    LayeredUpdates,
}

impl GroupKind {
    /// Whether this kind keeps the explicit ordered sprite list.
    pub(crate) const fn is_ordered(self) -> bool {
        matches!(self, Self::OrderedUpdates | Self::LayeredUpdates)
    }

    /// Whether draw produces a changed-region list.
    pub(crate) const fn tracks_dirty(self) -> bool {
        matches!(
            self,
            Self::RenderUpdates | Self::OrderedUpdates | Self::LayeredUpdates
        )
    }
}

/// Background used by [`Group`] clear.
pub enum Background<'a, S: ?Sized> {
    /// Static background surface aligned with the screen.
    Surface(&'a BufferSurface),
    /// Paint callback invoked once per vacated rect.
    Callback(&'a mut dyn FnMut(&mut S, Rect)),
}

/// A sprite container.
///
/// Owned by the stage; all mutation goes through stage methods so the
/// sprite-side membership back-references stay in sync.
#[derive(Debug)]
pub struct Group {
    kind: GroupKind,
    members: HashSet<SpriteId>,
    /// Paint order for the ordered kinds.
    ordered: Vec<SpriteId>,
    /// Layer spans over `ordered`, for LayeredUpdates.
    layer_index: LayerIndex,
    /// Recorded layer of each member, for LayeredUpdates.
    sprite_layers: HashMap<SpriteId, i32>,
    /// Layer used when neither the add call nor the sprite names one.
    default_layer: i32,
    /// Rect each sprite occupied at the previous draw.
    sprites_drawn: HashMap<SpriteId, Rect>,
    /// Changed regions produced by the previous draw.
    changed_areas: Vec<Rect>,
    /// Set once `clear` has been called; enables draw tracking.
    clear_active: bool,
}

impl Group {
    pub(crate) fn new(kind: GroupKind, default_layer: i32) -> Self {
        Self {
            kind,
            members: HashSet::new(),
            ordered: Vec::new(),
            layer_index: LayerIndex::default(),
            sprite_layers: HashMap::new(),
            default_layer,
            sprites_drawn: HashMap::new(),
            changed_areas: Vec::new(),
            clear_active: false,
        }
    }

    /// Behavior variant of this group.
    #[must_use]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Number of member sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` when the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Checks membership.
    #[must_use]
    pub fn has(&self, sprite: SpriteId) -> bool {
        self.members.contains(&sprite)
    }

    /// Member sprites in paint order.
    ///
    /// Ordered kinds return insertion (or layer-then-insertion) order;
    /// the rest return an unspecified order.
    #[must_use]
    pub fn sprites(&self) -> Vec<SpriteId> {
        if self.kind.is_ordered() {
            self.ordered.clone()
        } else {
            self.members.iter().copied().collect()
        }
    }

    /// Default layer for sprites added without one.
    #[must_use]
    pub fn default_layer(&self) -> i32 {
        self.default_layer
    }

    /// Sorted list of occupied layers.
    #[must_use]
    pub fn layers(&self) -> Vec<i32> {
        self.layer_index.layers()
    }

    /// Recorded layer of a member sprite.
    #[must_use]
    pub fn layer_of(&self, sprite: SpriteId) -> Option<i32> {
        self.sprite_layers.get(&sprite).copied()
    }

    /// Member sprites of one layer, in insertion order.
    #[must_use]
    pub fn sprites_from_layer(&self, layer: i32) -> Vec<SpriteId> {
        match self.layer_index.span(layer) {
            Some((start, end)) => self.ordered[start..end].to_vec(),
            None => Vec::new(),
        }
    }

    /// Topmost layer, if any sprite is present.
    #[must_use]
    pub fn top_layer(&self) -> Option<i32> {
        self.layer_index.layers().last().copied()
    }

    /// Bottommost layer, if any sprite is present.
    #[must_use]
    pub fn bottom_layer(&self) -> Option<i32> {
        self.layer_index.layers().first().copied()
    }

    /// Topmost sprite in paint order.
    #[must_use]
    pub fn top_sprite(&self) -> Option<SpriteId> {
        self.ordered.last().copied()
    }

    /// Changed regions produced by the previous draw.
    #[must_use]
    pub fn changed_areas(&self) -> &[Rect] {
        &self.changed_areas
    }

    /// Adds a sprite. Idempotent: re-adding a member is a no-op.
    ///
    /// `layer` resolution happened at the stage level; ordered kinds
    /// append, the layered kind inserts at the end of its layer span and
    /// shifts the spans above it.
    pub(crate) fn add_sprite(&mut self, sprite: SpriteId, layer: i32) {
        if !self.members.insert(sprite) {
            return;
        }
        match self.kind {
            GroupKind::LayeredUpdates => {
                let pos = self.layer_index.insert_into_layer(layer);
                self.ordered.insert(pos, sprite);
                self.sprite_layers.insert(sprite, layer);
                self.layer_index.debug_check(self.ordered.len());
            }
            _ if self.kind.is_ordered() => self.ordered.push(sprite),
            _ => {}
        }
    }

    /// Removes a sprite. Removing a non-member is a no-op.
    pub(crate) fn remove_sprite(&mut self, sprite: SpriteId) {
        if !self.members.remove(&sprite) {
            return;
        }
        if self.kind == GroupKind::LayeredUpdates {
            if let Some(layer) = self.sprite_layers.remove(&sprite) {
                if let Some(pos) = self.ordered.iter().position(|s| *s == sprite) {
                    self.ordered.remove(pos);
                    self.layer_index.remove_from_layer(layer);
                    self.layer_index.debug_check(self.ordered.len());
                }
            }
        } else if self.kind.is_ordered() {
            self.ordered.retain(|s| *s != sprite);
        }
    }

    /// Drops every member, returning the removed ids.
    pub(crate) fn take_members(&mut self) -> Vec<SpriteId> {
        let out: Vec<SpriteId> = self.members.drain().collect();
        self.ordered.clear();
        self.layer_index = LayerIndex::default();
        self.sprite_layers.clear();
        out
    }

    /// Blits every member and, for the dirty-tracking kinds, diffs
    /// previous against current rects.
    ///
    /// Returns the changed-region list (empty for non-tracking kinds).
    /// For each sprite drawn last frame whose new rect overlaps its old
    /// one, the two are unioned into a single region; disjoint moves and
    /// newly added sprites contribute separate regions, and rects vacated
    /// by removed sprites are included as-is.
    pub(crate) fn draw<S: Surface + ?Sized>(
        &mut self,
        sprites: &HashMap<SpriteId, SpriteEntry>,
        pool: &mut RectPool,
        surface: &mut S,
    ) -> &[Rect] {
        let Self {
            kind,
            members,
            ordered,
            sprites_drawn,
            changed_areas,
            clear_active,
            ..
        } = self;
        // Paint order: the explicit list for the ordered kinds, map order
        // for the rest.
        let order: Vec<SpriteId> = if kind.is_ordered() {
            ordered.clone()
        } else {
            members.iter().copied().collect()
        };
        for sid in &order {
            if let Some(entry) = sprites.get(sid) {
                let _ = surface.blit(&entry.data.image, entry.data.rect, None);
            }
        }
        if kind.tracks_dirty() {
            pool.extend(changed_areas.drain(..));
            if *clear_active {
                for sid in &order {
                    let Some(entry) = sprites.get(sid) else { continue };
                    let current = entry.data.rect;
                    match sprites_drawn.get_mut(sid) {
                        Some(old) if old.intersects(current) => old.union_ip(current),
                        _ => changed_areas.push(pool.copy(current)),
                    }
                }
                changed_areas.extend(sprites_drawn.drain().map(|(_, r)| r));
            } else {
                for sid in &order {
                    if let Some(entry) = sprites.get(sid) {
                        changed_areas.push(pool.copy(entry.data.rect));
                    }
                }
            }
        }
        if *clear_active {
            pool.extend(sprites_drawn.drain().map(|(_, r)| r));
            for sid in &order {
                if let Some(entry) = sprites.get(sid) {
                    sprites_drawn.insert(*sid, pool.copy(entry.data.rect));
                }
            }
        }
        &self.changed_areas
    }

    /// Restores the background under every rect recorded by the previous
    /// draw, and activates clear tracking.
    ///
    /// Must run before the next draw so stale pixels from sprites that
    /// moved or were removed are erased first.
    pub(crate) fn clear<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        background: Background<'_, S>,
    ) {
        self.clear_active = true;
        match background {
            Background::Surface(bg) => {
                let rects: Vec<Rect> = self.sprites_drawn.values().copied().collect();
                surface.blit_clear(bg, &rects);
            }
            Background::Callback(paint) => {
                for rect in self.sprites_drawn.values() {
                    paint(surface, *rect);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_layer_invariants(&self) {
        self.layer_index.assert_contiguous(self.ordered.len());
        for (sprite, layer) in &self.sprite_layers {
            let (start, end) = self.layer_index.span(*layer).expect("layer missing");
            let pos = self
                .ordered
                .iter()
                .position(|s| s == sprite)
                .expect("sprite missing from ordered list");
            assert!(
                (start..end).contains(&pos),
                "sprite {sprite:?} at {pos} outside layer {layer} span {start}..{end}"
            );
        }
    }
}

/// Sorted layer spans over the ordered sprite list.
///
/// Each layer owns a contiguous half-open range `[start, end)`; inserting
/// into a layer shifts every span above it by +1, removing shifts by -1,
/// and a span that becomes empty is dropped.
#[derive(Debug, Default)]
struct LayerIndex {
    spans: Vec<LayerSpan>,
}

#[derive(Clone, Copy, Debug)]
struct LayerSpan {
    layer: i32,
    start: usize,
    end: usize,
}

impl LayerIndex {
    /// Reserves a slot at the end of `layer`'s span, creating the span
    /// if needed. Returns the insertion position in the ordered list.
    fn insert_into_layer(&mut self, layer: i32) -> usize {
        match self.spans.binary_search_by_key(&layer, |s| s.layer) {
            Ok(i) => {
                let pos = self.spans[i].end;
                self.spans[i].end += 1;
                for span in &mut self.spans[i + 1..] {
                    span.start += 1;
                    span.end += 1;
                }
                pos
            }
            Err(i) => {
                let start = if i > 0 { self.spans[i - 1].end } else { 0 };
                self.spans.insert(
                    i,
                    LayerSpan {
                        layer,
                        start,
                        end: start + 1,
                    },
                );
                for span in &mut self.spans[i + 1..] {
                    span.start += 1;
                    span.end += 1;
                }
                start
            }
        }
    }

    /// Releases one slot from `layer`'s span, dropping it when empty.
    fn remove_from_layer(&mut self, layer: i32) {
        let Ok(i) = self.spans.binary_search_by_key(&layer, |s| s.layer) else {
            return;
        };
        self.spans[i].end -= 1;
        for span in &mut self.spans[i + 1..] {
            span.start -= 1;
            span.end -= 1;
        }
        if self.spans[i].start == self.spans[i].end {
            self.spans.remove(i);
        }
    }

    fn span(&self, layer: i32) -> Option<(usize, usize)> {
        self.spans
            .binary_search_by_key(&layer, |s| s.layer)
            .ok()
            .map(|i| (self.spans[i].start, self.spans[i].end))
    }

    fn layers(&self) -> Vec<i32> {
        self.spans.iter().map(|s| s.layer).collect()
    }

    fn debug_check(&self, total: usize) {
        debug_assert!(self.contiguous(total), "layer spans not contiguous");
    }

    fn contiguous(&self, total: usize) -> bool {
        let mut cursor = 0;
        let mut prev_layer: Option<i32> = None;
        for span in &self.spans {
            if span.start != cursor || span.end <= span.start {
                return false;
            }
            if let Some(prev) = prev_layer {
                if span.layer <= prev {
                    return false;
                }
            }
            prev_layer = Some(span.layer);
            cursor = span.end;
        }
        cursor == total
    }

    #[cfg(test)]
    fn assert_contiguous(&self, total: usize) {
        assert!(self.contiguous(total), "layer spans not contiguous: {self:?}");
    }
}
