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
//! Basic example demonstrating the simulation loop
//!
//! This example spawns a few sprites on a small grid, steps the
//! simulation, and prints grid membership and proximity queries.

use sprite_engine::math::{Acceleration, Position, Velocity};
use sprite_engine::{
    Behavior, Event, ImageHandle, Payload, SpatialGrid, Sprite, SpriteConfig, TickContext, World,
};

// A sprite that announces every cell change on the event bus
struct Wanderer {
    last_cell: Option<sprite_engine::NodeId>,
}

impl Behavior for Wanderer {
    fn post_move(&mut self, sprite: &mut Sprite, _delta: f64, ctx: &mut TickContext<'_>) {
        let cell = sprite.current_node();
        if cell != self.last_cell {
            self.last_cell = cell;
            if let Some(id) = sprite.id() {
                ctx.queue(Event::new("cell change", Payload::Sprite(id)));
            }
        }
    }
}

fn main() -> Result<(), sprite_engine::ConfigError> {
    println!("Sprite Engine - Basic Example");
    println!("=============================\n");

    let mut world = World::new(SpatialGrid::new(16, 16, 60.0));
    println!(
        "Created a {}x{} grid of {}-unit cells",
        world.grid().cols(),
        world.grid().rows(),
        world.grid().cell_size()
    );

    // a drifting car
    let mut car = Sprite::with_behavior(
        SpriteConfig::new("Car", 20.0, 40.0, ImageHandle(0)),
        Box::new(Wanderer { last_cell: None }),
    )?;
    car.set_visible(true);
    car.set_collidable(true);
    car.pos = Position::new(100.0, 100.0, 0.0);
    car.vel = Velocity::new(45.0, 10.0, 30.0);
    let car = world.spawn(car);

    // a stationary obstacle one cell to the east
    let mut pump = Sprite::new(SpriteConfig::new("GasPump", 20.0, 20.0, ImageHandle(1)))?;
    pump.set_visible(true);
    pump.set_collidable(true);
    pump.pos = Position::new(190.0, 100.0, 0.0);
    let pump = world.spawn(pump);

    // a braking crate sharing the car's starting cell
    let mut krate = Sprite::new(SpriteConfig::new("Crate", 20.0, 20.0, ImageHandle(2)))?;
    krate.set_visible(true);
    krate.pos = Position::new(110.0, 110.0, 0.0);
    krate.vel = Velocity::new(20.0, 0.0, 0.0);
    krate.acc = Acceleration::new(-10.0, 0.0, 0.0);
    world.spawn(krate);

    fn report(sprite: &mut Sprite, _event: &Event) {
        println!(
            "  [event] {} now in cell {:?}",
            sprite.name(),
            sprite.current_node().map(|n| n.index())
        );
    }
    world.events_mut().subscribe("cell change", car, report);

    println!("\nSimulating 120 frames at 60 FPS:");
    for frame in 0..120 {
        world.run_frame(1.0 / 60.0);
        if frame % 30 == 29 {
            let sprite = world.get(car).unwrap();
            println!(
                "  frame {:3}: Car at ({:6.1}, {:6.1}) rot {:5.1}",
                frame + 1,
                sprite.pos.x,
                sprite.pos.y,
                sprite.pos.rot
            );
        }
    }

    println!("\nProximity queries:");
    println!("  Car cellmates: {}", world.nearby(car).len());
    println!("  Car clear of obstacles: {}", world.is_clear(car, None));
    println!(
        "  Car-to-pump distance: {:.1}",
        world.get(car).unwrap().distance(world.get(pump).unwrap())
    );
    println!(
        "  Broadphase candidate pairs: {}",
        world.grid().collision_candidates().len()
    );

    let removed = world.reap_sweep();
    println!("\nSwept {removed} reaped sprites; {} remain", world.sprite_count());
    println!("\nExample completed successfully!");
    Ok(())
}
