//! Mask overlap benchmark.
//!
//! Overlap is checked every frame for every sprite pair; the word-level
//! row scan must stay cheap even for full-sprite bitmaps.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use basilisk_core::Mask;

fn sparse_mask(rng: &mut StdRng, w: i32, h: i32, fill: f64) -> Mask {
    let mut m = Mask::new((w, h));
    for y in 0..h as usize {
        for x in 0..w as usize {
            if rng.gen_bool(fill) {
                m.set_at((x, y), true);
            }
        }
    }
    m
}

fn bench_overlap(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBA51);
    let a = sparse_mask(&mut rng, 128, 128, 0.02);
    let b = sparse_mask(&mut rng, 128, 128, 0.02);

    c.bench_function("overlap_128x128_sparse", |bench| {
        bench.iter(|| {
            let mut hits = 0u32;
            for dx in -8..8 {
                if a.overlap(&b, (dx, 3)) {
                    hits += 1;
                }
            }
            hits
        });
    });

    let full = {
        let mut m = Mask::new((128, 128));
        m.fill();
        m
    };
    c.bench_function("overlap_128x128_worst_case_miss", |bench| {
        let empty = Mask::new((128, 128));
        bench.iter(|| full.overlap(&empty, (1, 1)));
    });
}

criterion_group!(benches, bench_overlap);
criterion_main!(benches);
