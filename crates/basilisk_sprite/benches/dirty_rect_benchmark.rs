//! Dirty-rect diff benchmark.
//!
//! The RenderUpdates diff runs once per frame per group; it must stay
//! linear in sprite count with pooled rects only.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

use basilisk_core::{BufferSurface, Color, Rect};
use basilisk_sprite::{Background, GroupKind, SpriteData, Stage};

fn bench_render_updates(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x51FE);
    let mut stage = Stage::new();
    let group = stage.new_group(GroupKind::RenderUpdates);
    let image = Rc::new(BufferSurface::filled(16, 16, Color::WHITE));

    let ids: Vec<_> = (0..500)
        .map(|_| {
            let x = rng.gen_range(0..600);
            let y = rng.gen_range(0..400);
            stage.spawn(SpriteData::new(Rc::clone(&image), Rect::new(x, y, 16, 16)))
        })
        .collect();
    stage.add(group, &ids);

    let background = BufferSurface::filled(640, 480, Color::BLACK);
    let mut screen = background.clone();
    stage.clear_group(group, &mut screen, Background::Surface(&background));
    let _ = stage.draw_group(group, &mut screen);

    c.bench_function("render_updates_500_sprites_frame", |bench| {
        bench.iter(|| {
            for sid in &ids {
                // Small jitter so most moves overlap the previous rect.
                let data = stage.sprite_mut(*sid).unwrap();
                data.rect.move_ip(1, 0);
                if data.rect.x > 620 {
                    data.rect.x = 0;
                }
            }
            stage.clear_group(group, &mut screen, Background::Surface(&background));
            stage.draw_group(group, &mut screen).len()
        });
    });
}

criterion_group!(benches, bench_render_updates);
criterion_main!(benches);
