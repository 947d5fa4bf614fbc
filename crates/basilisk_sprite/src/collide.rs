//! Collision functions.
//!
//! Pairwise tests between sprites plus the group-wise scans built on
//! them. The default test is the strict AABB rect intersection; callbacks
//! swap in ratio-scaled rects, center circles, or pixel-accurate masks.
//! `dokill` scans collect every match first and kill afterwards, so
//! killing never perturbs a scan in progress.

use std::collections::HashMap;

use basilisk_core::Mask;

use crate::stage::{GroupId, SpriteId, Stage};

/// Pairwise collision test used by the group scans.
pub type CollideTest<'a> = &'a dyn Fn(&Stage, SpriteId, SpriteId) -> bool;

/// Sprites in `group` that collide with `sprite`.
///
/// With `dokill`, every collider is removed from all its groups after the
/// scan completes. An optional `collided` callback replaces the default
/// rect test.
pub fn spritecollide(
    stage: &mut Stage,
    sprite: SpriteId,
    group: GroupId,
    dokill: bool,
    collided: Option<CollideTest<'_>>,
) -> Vec<SpriteId> {
    let members = match stage.group(group) {
        Some(g) => g.sprites(),
        None => Vec::new(),
    };
    let mut hits = Vec::new();
    for other in members {
        if rects_collide(stage, sprite, other) {
            if let Some(test) = collided {
                if !test(stage, sprite, other) {
                    continue;
                }
            }
            hits.push(other);
        }
    }
    if dokill {
        for hit in &hits {
            stage.kill(*hit);
        }
    }
    hits
}

/// Checks whether `sprite` collides with any sprite in `group`.
#[must_use]
pub fn spritecollideany(stage: &Stage, sprite: SpriteId, group: GroupId) -> bool {
    let Some(g) = stage.group(group) else {
        return false;
    };
    g.sprites()
        .into_iter()
        .any(|other| rects_collide(stage, sprite, other))
}

/// Map of sprites in `group1` to the sprites of `group2` they intersect.
///
/// `dokill1`/`dokill2` remove the matched sprites of the respective group
/// from all their groups, after the full scan.
pub fn groupcollide(
    stage: &mut Stage,
    group1: GroupId,
    group2: GroupId,
    dokill1: bool,
    dokill2: bool,
) -> HashMap<SpriteId, Vec<SpriteId>> {
    let first = match stage.group(group1) {
        Some(g) => g.sprites(),
        None => Vec::new(),
    };
    let second = match stage.group(group2) {
        Some(g) => g.sprites(),
        None => Vec::new(),
    };
    let mut collide: HashMap<SpriteId, Vec<SpriteId>> = HashMap::new();
    for s1 in &first {
        for s2 in &second {
            if rects_collide(stage, *s1, *s2) {
                collide.entry(*s1).or_default().push(*s2);
            }
        }
    }
    if dokill1 {
        for s1 in collide.keys().copied().collect::<Vec<_>>() {
            stage.kill(s1);
        }
    }
    if dokill2 {
        let hit: Vec<SpriteId> = collide.values().flatten().copied().collect();
        for s2 in hit {
            stage.kill(s2);
        }
    }
    collide
}

/// Rect-intersection test; the default for the group scans.
#[must_use]
pub fn collide_rect(stage: &Stage, s1: SpriteId, s2: SpriteId) -> bool {
    rects_collide(stage, s1, s2)
}

/// Returns a rect test with both rects scaled by `ratio` around their
/// centers; 1.0 is the plain test.
pub fn collide_rect_ratio(ratio: f32) -> impl Fn(&Stage, SpriteId, SpriteId) -> bool {
    move |stage, s1, s2| {
        let (Some(d1), Some(d2)) = (stage.sprite(s1), stage.sprite(s2)) else {
            return false;
        };
        let r1 = scaled(d1.rect, ratio);
        let r2 = scaled(d2.rect, ratio);
        r1.intersects(r2)
    }
}

/// Circle test around the sprite centers.
///
/// Uses the sprite's `radius` field when set; otherwise the circle
/// circumscribes the rect.
#[must_use]
pub fn collide_circle(stage: &Stage, s1: SpriteId, s2: SpriteId) -> bool {
    circles_collide(stage, s1, s2, 1.0)
}

/// Returns a circle test with both radii scaled by `ratio`.
pub fn collide_circle_ratio(ratio: f32) -> impl Fn(&Stage, SpriteId, SpriteId) -> bool {
    move |stage, s1, s2| circles_collide(stage, s1, s2, ratio)
}

/// Pixel-accurate mask test.
///
/// Uses each sprite's `mask` field when set, otherwise derives a mask
/// from the image alpha channel, and tests overlap at the offset between
/// the two rect origins.
#[must_use]
pub fn collide_mask(stage: &Stage, s1: SpriteId, s2: SpriteId) -> bool {
    let (Some(d1), Some(d2)) = (stage.sprite(s1), stage.sprite(s2)) else {
        return false;
    };
    let derived1;
    let mask1 = match &d1.mask {
        Some(m) => m,
        None => match Mask::from_surface(&*d1.image, 127) {
            Some(m) => {
                derived1 = m;
                &derived1
            }
            None => return false,
        },
    };
    let derived2;
    let mask2 = match &d2.mask {
        Some(m) => m,
        None => match Mask::from_surface(&*d2.image, 127) {
            Some(m) => {
                derived2 = m;
                &derived2
            }
            None => return false,
        },
    };
    mask1.overlap(mask2, (d2.rect.x - d1.rect.x, d2.rect.y - d1.rect.y))
}

fn rects_collide(stage: &Stage, s1: SpriteId, s2: SpriteId) -> bool {
    match (stage.sprite(s1), stage.sprite(s2)) {
        (Some(d1), Some(d2)) => d1.rect.intersects(d2.rect),
        _ => false,
    }
}

fn scaled(r: basilisk_core::Rect, ratio: f32) -> basilisk_core::Rect {
    let dx = (r.w as f32 * ratio) as i32 - r.w;
    let dy = (r.h as f32 * ratio) as i32 - r.h;
    r.inflate(dx, dy)
}

fn circles_collide(stage: &Stage, s1: SpriteId, s2: SpriteId, ratio: f32) -> bool {
    let (Some(d1), Some(d2)) = (stage.sprite(s1), stage.sprite(s2)) else {
        return false;
    };
    let r1 = radius_of(d1) * ratio;
    let r2 = radius_of(d2) * ratio;
    let (cx1, cy1) = d1.rect.center();
    let (cx2, cy2) = d2.rect.center();
    let dx = (cx1 - cx2) as f32;
    let dy = (cy1 - cy2) as f32;
    // Sum-of-squares form, matching the reference behavior rather than
    // the (r1 + r2)^2 textbook test.
    dx * dx + dy * dy < r1 * r1 + r2 * r2
}

fn radius_of(data: &crate::stage::SpriteData) -> f32 {
    match data.radius {
        Some(r) => r,
        None => {
            let w = data.rect.w as f32;
            let h = data.rect.h as f32;
            (w * w + h * h).sqrt() * 0.5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupKind;
    use crate::stage::SpriteData;
    use basilisk_core::{BufferSurface, Color, Rect};
    use std::rc::Rc;

    fn opaque(w: u32, h: u32) -> Rc<BufferSurface> {
        Rc::new(BufferSurface::filled(w, h, Color::WHITE))
    }

    fn spawn(stage: &mut Stage, rect: Rect) -> SpriteId {
        let img = opaque(rect.w as u32, rect.h as u32);
        stage.spawn(SpriteData::new(img, rect))
    }

    #[test]
    fn test_spritecollide_rect_default() {
        let mut stage = Stage::new();
        let player = spawn(&mut stage, Rect::new(0, 0, 10, 10));
        let g = stage.new_group(GroupKind::Plain);
        let near = spawn(&mut stage, Rect::new(5, 5, 10, 10));
        let far = spawn(&mut stage, Rect::new(50, 50, 10, 10));
        stage.add(g, &[near, far]);

        let hits = spritecollide(&mut stage, player, g, false, None);
        assert_eq!(hits, vec![near]);
        assert!(spritecollideany(&stage, player, g));
    }

    #[test]
    fn test_spritecollide_dokill_collects_first() {
        let mut stage = Stage::new();
        let player = spawn(&mut stage, Rect::new(0, 0, 20, 20));
        let g = stage.new_group(GroupKind::OrderedUpdates);
        let a = spawn(&mut stage, Rect::new(0, 0, 5, 5));
        let b = spawn(&mut stage, Rect::new(10, 10, 5, 5));
        stage.add(g, &[a, b]);

        let hits = spritecollide(&mut stage, player, g, true, None);
        assert_eq!(hits.len(), 2);
        assert!(!stage.alive(a));
        assert!(!stage.alive(b));
        assert!(stage.group(g).unwrap().is_empty());
    }

    #[test]
    fn test_collide_rect_ratio() {
        let mut stage = Stage::new();
        let a = spawn(&mut stage, Rect::new(0, 0, 10, 10));
        let g = stage.new_group(GroupKind::Plain);
        let b = spawn(&mut stage, Rect::new(12, 0, 10, 10));
        stage.add(g, &[b]);

        // Disjoint at ratio 1, touching at ratio 1.5.
        let plain = spritecollide(&mut stage, a, g, false, Some(&collide_rect));
        assert!(plain.is_empty());
        let test = collide_rect_ratio(1.5);
        let ratio_hits = spritecollide(&mut stage, a, g, false, Some(&test));
        assert!(ratio_hits.is_empty(), "callback cannot widen the rect prefilter");
        // The ratio test itself sees the contact.
        assert!(test(&stage, a, b));
    }

    #[test]
    fn test_collide_circle() {
        let mut stage = Stage::new();
        let a = spawn(&mut stage, Rect::new(0, 0, 10, 10));
        let b = spawn(&mut stage, Rect::new(6, 6, 10, 10));
        let c = spawn(&mut stage, Rect::new(40, 40, 10, 10));
        // Centers 8.5 apart, circumscribed radii ~7.07 each.
        assert!(collide_circle(&stage, a, b));
        assert!(!collide_circle(&stage, a, c));

        // An explicit radius overrides the circumscribed default.
        stage.sprite_mut(a).unwrap().radius = Some(1.0);
        stage.sprite_mut(b).unwrap().radius = Some(1.0);
        assert!(!collide_circle(&stage, a, b));
        assert!(collide_circle_ratio(20.0)(&stage, a, b));
    }

    #[test]
    fn test_collide_mask_uses_pixels() {
        let mut stage = Stage::new();
        // Two 4x4 images, each opaque only in one corner.
        let mut img_a = BufferSurface::new(4, 4);
        img_a.set_at(3, 3, Color::WHITE);
        let mut img_b = BufferSurface::new(4, 4);
        img_b.set_at(0, 0, Color::WHITE);

        let a = stage.spawn(SpriteData::new(Rc::new(img_a), Rect::new(0, 0, 4, 4)));
        let b = stage.spawn(SpriteData::new(Rc::new(img_b), Rect::new(3, 3, 4, 4)));
        // Rects overlap and the opaque pixels coincide at (3,3).
        assert!(collide_mask(&stage, a, b));

        stage.sprite_mut(b).unwrap().rect.move_ip(1, 0);
        assert!(!collide_mask(&stage, a, b));
    }

    #[test]
    fn test_groupcollide() {
        let mut stage = Stage::new();
        let g1 = stage.new_group(GroupKind::Plain);
        let g2 = stage.new_group(GroupKind::Plain);
        let a = spawn(&mut stage, Rect::new(0, 0, 10, 10));
        let b = spawn(&mut stage, Rect::new(100, 100, 10, 10));
        stage.add(g1, &[a, b]);
        let x = spawn(&mut stage, Rect::new(5, 5, 10, 10));
        let y = spawn(&mut stage, Rect::new(8, 8, 10, 10));
        stage.add(g2, &[x, y]);

        let hits = groupcollide(&mut stage, g1, g2, false, true);
        assert_eq!(hits.len(), 1);
        let mut matched = hits.get(&a).unwrap().clone();
        matched.sort();
        let mut expect = vec![x, y];
        expect.sort();
        assert_eq!(matched, expect);
        assert!(stage.alive(a));
        assert!(!stage.alive(x));
        assert!(!stage.alive(y));
    }
}
