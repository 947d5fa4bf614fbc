//! # Sprite Stage
//!
//! The stage is the explicit application context for sprites: an arena of
//! sprite records plus the registry of groups that reference them.
//! Membership is many-to-many - a group holds sprite ids and every sprite
//! record keeps a back-reference set of the groups it belongs to, so
//! `kill` can remove a sprite from all of them in one call.
//!
//! Identities are monotonic and never reused.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use basilisk_core::{BufferSurface, Mask, Rect, RectPool, Surface};

use crate::group::{Background, Group, GroupKind};

/// Unique identifier for a sprite. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SpriteId(u64);

/// Unique identifier for a group. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct GroupId(u64);

/// Application-supplied sprite fields.
#[derive(Clone, Debug)]
pub struct SpriteData {
    /// Position and size on screen.
    pub rect: Rect,
    /// Image blitted at `rect`.
    pub image: Rc<BufferSurface>,
    /// Paint layer for layered groups; `None` uses the group default.
    pub layer: Option<i32>,
    /// Circle-collision radius; `None` circumscribes `rect`.
    pub radius: Option<f32>,
    /// Collision mask; `None` derives one from the image alpha on demand.
    pub mask: Option<Mask>,
}

impl SpriteData {
    /// Creates sprite data from an image and its on-screen rect.
    #[must_use]
    pub fn new(image: Rc<BufferSurface>, rect: Rect) -> Self {
        Self {
            rect,
            image,
            layer: None,
            radius: None,
            mask: None,
        }
    }

    /// Sets the paint layer.
    #[must_use]
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Sets the circle-collision radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Sets a precomputed collision mask.
    #[must_use]
    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// A sprite record plus its group back-references.
#[derive(Debug)]
pub(crate) struct SpriteEntry {
    pub(crate) data: SpriteData,
    pub(crate) memberships: HashSet<GroupId>,
}

/// Arena of sprites and registry of groups.
#[derive(Debug, Default)]
pub struct Stage {
    sprites: HashMap<SpriteId, SpriteEntry>,
    groups: HashMap<GroupId, Group>,
    next_sprite: u64,
    next_group: u64,
    pool: RectPool,
}

impl Stage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sprite and returns its identity.
    pub fn spawn(&mut self, data: SpriteData) -> SpriteId {
        let id = SpriteId(self.next_sprite);
        self.next_sprite += 1;
        self.sprites.insert(
            id,
            SpriteEntry {
                data,
                memberships: HashSet::new(),
            },
        );
        id
    }

    /// Read access to a sprite record.
    #[must_use]
    pub fn sprite(&self, id: SpriteId) -> Option<&SpriteData> {
        self.sprites.get(&id).map(|e| &e.data)
    }

    /// Write access to a sprite record.
    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut SpriteData> {
        self.sprites.get_mut(&id).map(|e| &mut e.data)
    }

    /// Checks whether the sprite belongs to at least one group.
    #[must_use]
    pub fn alive(&self, id: SpriteId) -> bool {
        self.sprites
            .get(&id)
            .is_some_and(|e| !e.memberships.is_empty())
    }

    /// Groups the sprite currently belongs to.
    #[must_use]
    pub fn groups_of(&self, id: SpriteId) -> Vec<GroupId> {
        match self.sprites.get(&id) {
            Some(e) => e.memberships.iter().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Removes the sprite from every group it belongs to.
    ///
    /// The identity stays valid - a killed sprite can be re-added.
    pub fn kill(&mut self, id: SpriteId) {
        let Some(entry) = self.sprites.get_mut(&id) else {
            return;
        };
        tracing::trace!(?id, groups = entry.memberships.len(), "sprite killed");
        for gid in entry.memberships.drain() {
            if let Some(group) = self.groups.get_mut(&gid) {
                group.remove_sprite(id);
            }
        }
    }

    /// Creates a group of the given kind with default layer 0.
    pub fn new_group(&mut self, kind: GroupKind) -> GroupId {
        self.new_group_with_default_layer(kind, 0)
    }

    /// Creates a group with an explicit default layer.
    pub fn new_group_with_default_layer(&mut self, kind: GroupKind, default_layer: i32) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        self.groups.insert(id, Group::new(kind, default_layer));
        id
    }

    /// Read access to a group.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Adds sprites to a group, resolving each sprite's layer from its
    /// own `layer` field or the group default.
    ///
    /// Idempotent per sprite. A Single group keeps only the last sprite.
    pub fn add(&mut self, gid: GroupId, sprites: &[SpriteId]) {
        for sid in sprites {
            self.add_one(gid, *sid, None);
        }
    }

    /// Adds sprites to an explicit layer, overriding sprite layers.
    pub fn add_to_layer(&mut self, gid: GroupId, sprites: &[SpriteId], layer: i32) {
        for sid in sprites {
            self.add_one(gid, *sid, Some(layer));
        }
    }

    /// Removes sprites from a group.
    pub fn remove(&mut self, gid: GroupId, sprites: &[SpriteId]) {
        for sid in sprites {
            if let Some(group) = self.groups.get_mut(&gid) {
                group.remove_sprite(*sid);
            }
            if let Some(entry) = self.sprites.get_mut(sid) {
                entry.memberships.remove(&gid);
            }
        }
    }

    /// Removes every sprite from a group.
    pub fn empty_group(&mut self, gid: GroupId) {
        let Some(group) = self.groups.get_mut(&gid) else {
            return;
        };
        for sid in group.take_members() {
            if let Some(entry) = self.sprites.get_mut(&sid) {
                entry.memberships.remove(&gid);
            }
        }
    }

    /// Calls `f` for every sprite in the group, in paint order.
    pub fn update_group(&mut self, gid: GroupId, mut f: impl FnMut(SpriteId, &mut SpriteData)) {
        let Some(group) = self.groups.get(&gid) else {
            return;
        };
        for sid in group.sprites() {
            if let Some(entry) = self.sprites.get_mut(&sid) {
                f(sid, &mut entry.data);
            }
        }
    }

    /// Draws a group onto `surface`.
    ///
    /// For the dirty-tracking kinds, returns the minimal changed-region
    /// list for the compositor; plain groups return an empty slice.
    pub fn draw_group<S: Surface + ?Sized>(&mut self, gid: GroupId, surface: &mut S) -> &[Rect] {
        let Self {
            sprites,
            groups,
            pool,
            ..
        } = self;
        match groups.get_mut(&gid) {
            Some(group) => group.draw(sprites, pool, surface),
            None => &[],
        }
    }

    /// Restores the background under the rects a group drew last frame.
    ///
    /// Must run before the next `draw_group` call.
    pub fn clear_group<S: Surface + ?Sized>(
        &mut self,
        gid: GroupId,
        surface: &mut S,
        background: Background<'_, S>,
    ) {
        if let Some(group) = self.groups.get_mut(&gid) {
            group.clear(surface, background);
        }
    }

    /// Moves a sprite to the group's top layer.
    pub fn move_to_front(&mut self, gid: GroupId, sid: SpriteId) {
        let Some(top) = self.groups.get(&gid).and_then(Group::top_layer) else {
            return;
        };
        self.remove(gid, &[sid]);
        self.add_to_layer(gid, &[sid], top);
    }

    /// Moves a sprite to a new layer under the group's bottom layer.
    pub fn move_to_back(&mut self, gid: GroupId, sid: SpriteId) {
        let Some(bottom) = self.groups.get(&gid).and_then(Group::bottom_layer) else {
            return;
        };
        self.remove(gid, &[sid]);
        self.add_to_layer(gid, &[sid], bottom - 1);
    }

    /// Moves a sprite to `layer`, keeping its insertion position last.
    pub fn change_layer(&mut self, gid: GroupId, sid: SpriteId, layer: i32) {
        self.remove(gid, &[sid]);
        self.add_to_layer(gid, &[sid], layer);
    }

    /// Removes and returns the sprites of one layer.
    pub fn remove_sprites_of_layer(&mut self, gid: GroupId, layer: i32) -> Vec<SpriteId> {
        let removed = match self.groups.get(&gid) {
            Some(group) => group.sprites_from_layer(layer),
            None => Vec::new(),
        };
        self.remove(gid, &removed);
        removed
    }

    /// Swaps the sprites of two layers.
    pub fn switch_layer(&mut self, gid: GroupId, layer1: i32, layer2: i32) {
        let first = self.remove_sprites_of_layer(gid, layer1);
        let second = self.remove_sprites_of_layer(gid, layer2);
        self.add_to_layer(gid, &first, layer2);
        self.add_to_layer(gid, &second, layer1);
    }

    /// Sprites of a group whose rects contain `pos`, in paint order.
    #[must_use]
    pub fn sprites_at(&self, gid: GroupId, pos: (i32, i32)) -> Vec<SpriteId> {
        let Some(group) = self.groups.get(&gid) else {
            return Vec::new();
        };
        group
            .sprites()
            .into_iter()
            .filter(|sid| {
                self.sprite(*sid)
                    .is_some_and(|d| d.rect.collidepoint(pos.0, pos.1))
            })
            .collect()
    }

    /// The stage-wide rect pool.
    pub fn pool_mut(&mut self) -> &mut RectPool {
        &mut self.pool
    }

    fn add_one(&mut self, gid: GroupId, sid: SpriteId, layer: Option<i32>) {
        let Some(entry) = self.sprites.get_mut(&sid) else {
            return;
        };
        let Some(group) = self.groups.get_mut(&gid) else {
            return;
        };
        if group.has(sid) {
            return;
        }
        // A Single group keeps one occupant; adding evicts the previous.
        if group.kind() == GroupKind::Single {
            for old in group.take_members() {
                if old != sid {
                    if let Some(old_entry) = self.sprites.get_mut(&old) {
                        old_entry.memberships.remove(&gid);
                    }
                }
            }
            // Re-borrow after touching the sprite arena.
            let entry = self.sprites.get_mut(&sid).expect("sprite vanished");
            let group = self.groups.get_mut(&gid).expect("group vanished");
            let resolved = layer.or(entry.data.layer).unwrap_or(group.default_layer());
            group.add_sprite(sid, resolved);
            entry.memberships.insert(gid);
            return;
        }
        let resolved = layer.or(entry.data.layer).unwrap_or(group.default_layer());
        group.add_sprite(sid, resolved);
        entry.memberships.insert(gid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basilisk_core::Color;

    fn image(w: u32, h: u32) -> Rc<BufferSurface> {
        Rc::new(BufferSurface::filled(w, h, Color::WHITE))
    }

    fn spawn_at(stage: &mut Stage, x: i32, y: i32) -> SpriteId {
        let img = image(8, 8);
        stage.spawn(SpriteData::new(img, Rect::new(x, y, 8, 8)))
    }

    #[test]
    fn test_multi_group_membership_and_kill() {
        let mut stage = Stage::new();
        let s = spawn_at(&mut stage, 0, 0);
        let g1 = stage.new_group(GroupKind::Plain);
        let g2 = stage.new_group(GroupKind::Plain);

        stage.add(g1, &[s]);
        stage.add(g2, &[s]);
        assert!(stage.group(g1).unwrap().has(s));
        assert!(stage.group(g2).unwrap().has(s));
        assert!(stage.alive(s));
        assert_eq!(stage.groups_of(s).len(), 2);

        stage.kill(s);
        assert!(!stage.group(g1).unwrap().has(s));
        assert!(!stage.group(g2).unwrap().has(s));
        assert!(!stage.alive(s));

        // Identity survives a kill; the sprite can rejoin.
        stage.add(g1, &[s]);
        assert!(stage.alive(s));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut stage = Stage::new();
        let s = spawn_at(&mut stage, 0, 0);
        let g = stage.new_group(GroupKind::OrderedUpdates);
        stage.add(g, &[s]);
        stage.add(g, &[s]);
        assert_eq!(stage.group(g).unwrap().len(), 1);
        assert_eq!(stage.group(g).unwrap().sprites(), vec![s]);
    }

    #[test]
    fn test_single_group_replaces() {
        let mut stage = Stage::new();
        let a = spawn_at(&mut stage, 0, 0);
        let b = spawn_at(&mut stage, 1, 1);
        let g = stage.new_group(GroupKind::Single);

        stage.add(g, &[a]);
        stage.add(g, &[b]);
        assert_eq!(stage.group(g).unwrap().len(), 1);
        assert!(stage.group(g).unwrap().has(b));
        assert!(!stage.alive(a));
        assert!(stage.alive(b));
    }

    #[test]
    fn test_ordered_iteration_is_insertion_order() {
        let mut stage = Stage::new();
        let ids: Vec<SpriteId> = (0..5).map(|i| spawn_at(&mut stage, i, 0)).collect();
        let g = stage.new_group(GroupKind::OrderedUpdates);
        stage.add(g, &ids);
        assert_eq!(stage.group(g).unwrap().sprites(), ids);

        stage.remove(g, &[ids[2]]);
        let expect = vec![ids[0], ids[1], ids[3], ids[4]];
        assert_eq!(stage.group(g).unwrap().sprites(), expect);
    }

    #[test]
    fn test_identities_never_reused() {
        let mut stage = Stage::new();
        let a = spawn_at(&mut stage, 0, 0);
        stage.kill(a);
        let b = spawn_at(&mut stage, 0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_group_mutates_in_order() {
        let mut stage = Stage::new();
        let ids: Vec<SpriteId> = (0..3).map(|i| spawn_at(&mut stage, i, 0)).collect();
        let g = stage.new_group(GroupKind::OrderedUpdates);
        stage.add(g, &ids);

        let mut seen = Vec::new();
        stage.update_group(g, |sid, data| {
            data.rect.move_ip(0, 10);
            seen.push(sid);
        });
        assert_eq!(seen, ids);
        assert_eq!(stage.sprite(ids[0]).unwrap().rect.y, 10);
    }

    #[test]
    fn test_sprites_at() {
        let mut stage = Stage::new();
        let a = spawn_at(&mut stage, 0, 0);
        let b = spawn_at(&mut stage, 4, 4);
        let c = spawn_at(&mut stage, 100, 100);
        let g = stage.new_group(GroupKind::OrderedUpdates);
        stage.add(g, &[a, b, c]);
        assert_eq!(stage.sprites_at(g, (5, 5)), vec![a, b]);
        assert_eq!(stage.sprites_at(g, (200, 200)), Vec::<SpriteId>::new());
    }
}
