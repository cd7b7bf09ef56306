// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_spatial::backends::GridF32;
use understory_spatial::{GenericIndex, Index, Point, Rect};

type GridIndex = GenericIndex<f32, u32, GridF32>;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
}

fn gen_grid_rects(n: usize, cell: f32) -> Vec<Rect<f32>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Rect::from_xywh(x as f32 * cell, y as f32 * cell, cell, cell));
        }
    }
    out
}

fn gen_random_rects(count: usize, extent: f32, size: f32) -> Vec<Rect<f32>> {
    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    (0..count)
        .map(|_| {
            let x = rng.next_f32() * (extent - size);
            let y = rng.next_f32() * (extent - size);
            Rect::from_xywh(x, y, size, size)
        })
        .collect()
}

fn gen_points(count: usize, extent: f32) -> Vec<Point<f32>> {
    let mut rng = Rng::new(0x0DDB_A11C_0FFE_E000);
    (0..count)
        .map(|_| Point::new(rng.next_f32() * extent, rng.next_f32() * extent))
        .collect()
}

fn fill_reference(rects: &[Rect<f32>]) -> Index<f32, u32> {
    let mut idx = Index::new();
    for (i, r) in rects.iter().copied().enumerate() {
        idx.add(r, i as u32);
    }
    idx
}

fn fill_grid(rects: &[Rect<f32>], cell: f32) -> GridIndex {
    let mut idx = GridIndex::with_grid(cell);
    for (i, r) in rects.iter().copied().enumerate() {
        idx.add(r, i as u32);
    }
    idx
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("reference_n{n}"), |b| {
            b.iter_batched(
                Index::<f32, u32>::new,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        black_box(idx.add(r, i as u32));
                    }
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("grid_n{n}"), |b| {
            b.iter_batched(
                || GridIndex::with_grid(32.0),
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        black_box(idx.add(r, i as u32));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_add_delete_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    let rects = gen_random_rects(4096, 2000.0, 12.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("reference", |b| {
        b.iter_batched(
            || fill_reference(&rects),
            |mut idx| {
                for (i, r) in rects.iter().enumerate().step_by(2) {
                    black_box(idx.delete(*r, &(i as u32)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("grid", |b| {
        b.iter_batched(
            || fill_grid(&rects, 64.0),
            |mut idx| {
                for (i, r) in rects.iter().enumerate().step_by(2) {
                    black_box(idx.delete(*r, &(i as u32)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_intersects(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersects");
    let rects = gen_random_rects(16_384, 4000.0, 12.0);
    let reference = fill_reference(&rects);
    let grid = fill_grid(&rects, 64.0);
    let queries: Vec<Rect<f32>> = gen_points(256, 3800.0)
        .into_iter()
        .map(|p| Rect::from_xywh(p.x, p.y, 200.0, 200.0))
        .collect();
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("reference", |b| {
        b.iter(|| {
            let mut hits = 0;
            for q in &queries {
                hits += reference.intersects(*q).len();
            }
            black_box(hits);
        })
    });
    group.bench_function("grid", |b| {
        b.iter(|| {
            let mut hits = 0;
            for q in &queries {
                hits += grid.intersects(*q).len();
            }
            black_box(hits);
        })
    });
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    let rects = gen_random_rects(16_384, 4000.0, 12.0);
    let reference = fill_reference(&rects);
    let grid = fill_grid(&rects, 64.0);
    let points = gen_points(256, 4000.0);
    group.throughput(Throughput::Elements(points.len() as u64));
    for (name, max) in [("bounded", 100.0_f32), ("unbounded", f32::INFINITY)] {
        group.bench_function(format!("reference_{name}"), |b| {
            b.iter(|| {
                for p in &points {
                    black_box(reference.nearest(*p, max));
                }
            })
        });
        group.bench_function(format!("grid_{name}"), |b| {
            b.iter(|| {
                for p in &points {
                    black_box(grid.nearest(*p, max));
                }
            })
        });
    }
    group.finish();
}

fn bench_nearest_n(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_n");
    let rects = gen_random_rects(16_384, 4000.0, 12.0);
    let reference = fill_reference(&rects);
    let grid = fill_grid(&rects, 64.0);
    let points = gen_points(256, 4000.0);
    group.throughput(Throughput::Elements(points.len() as u64));
    for &n in &[1usize, 8, 64] {
        group.bench_function(format!("reference_n{n}"), |b| {
            b.iter(|| {
                for p in &points {
                    black_box(reference.nearest_n(*p, n, 150.0));
                }
            })
        });
        group.bench_function(format!("grid_n{n}"), |b| {
            b.iter(|| {
                for p in &points {
                    black_box(grid.nearest_n(*p, n, 150.0));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_add,
    bench_add_delete_churn,
    bench_intersects,
    bench_nearest,
    bench_nearest_n
);
criterion_main!(benches);
