// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks for frame throughput and broadphase candidate collection
//!
//! These benchmarks measure:
//! - Full-frame cost (integration + geometry caches + grid maintenance)
//!   at different sprite counts
//! - Broadphase pair collection over a populated grid

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sprite_engine::math::{Position, Velocity};
use sprite_engine::{ImageHandle, SpatialGrid, Sprite, SpriteConfig, World};

fn populated_world(sprite_count: usize) -> World {
    let mut world = World::new(SpatialGrid::new(64, 64, 60.0));
    for i in 0..sprite_count {
        let mut sprite =
            Sprite::new(SpriteConfig::new("Car", 20.0, 20.0, ImageHandle(0))).unwrap();
        sprite.set_visible(true);
        sprite.set_collidable(true);
        // scatter deterministically, keep everything inside the extent
        let x = 30.0 + (i * 97 % 3700) as f64;
        let y = 30.0 + (i * 389 % 3700) as f64;
        sprite.pos = Position::new(x, y, 0.0);
        // slow drift so cell transitions occur but nothing escapes
        sprite.vel = Velocity::new(((i % 7) as f64 - 3.0) * 2.0, ((i % 5) as f64 - 2.0) * 2.0, 15.0);
        world.spawn(sprite);
    }
    world.run_frame(0.0); // establish grid membership
    world
}

fn bench_run_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_frame");
    for &count in &[100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut world = populated_world(count);
            b.iter(|| {
                world.run_frame(black_box(1.0 / 60.0));
            });
        });
    }
    group.finish();
}

fn bench_collision_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_candidates");
    for &count in &[1_000usize, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let world = populated_world(count);
            b.iter(|| black_box(world.grid().collision_candidates()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_run_frame, bench_collision_candidates);
criterion_main!(benches);
