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
//! # Sprite Engine
//!
//! A 2D entity-simulation engine: per-frame kinematic integration,
//! cached affine geometry, a spatial-partition grid for neighborhood
//! collision and proximity queries, and a synchronous event bus.
//!
//! ## Features
//!
//! - **Kinematics**: Semi-implicit Euler integration of position,
//!   velocity, and acceleration, with an auxiliary rotation channel
//! - **Cached Geometry**: World-space box corners and face normals
//!   recomputed once per tick through a pure affine operator
//! - **Spatial Grid**: Fixed-size cells with precomputed 8-neighbor
//!   links backing clearance probes and proximity queries
//! - **Events**: Synchronous publish/subscribe between sprites and from
//!   the input layer, with deterministic teardown
//! - **Parallelization**: Optional Rayon integration for the read-only
//!   broadphase pass
//!
//! ## Example
//!
//! ```rust
//! use sprite_engine::{ImageHandle, SpatialGrid, Sprite, SpriteConfig, World};
//!
//! let mut world = World::new(SpatialGrid::new(64, 64, 60.0));
//!
//! let mut car = Sprite::new(SpriteConfig::new("Car", 20.0, 40.0, ImageHandle(0)))?;
//! car.set_visible(true);
//! car.pos.x = 125.0;
//! car.pos.y = 40.0;
//!
//! let id = world.spawn(car);
//! world.run_frame(1.0 / 60.0);
//! assert_eq!(world.get(id).unwrap().current_node(), world.grid().node_at(2, 0));
//! # Ok::<(), sprite_engine::ConfigError>(())
//! ```
//!
//! The engine is single-threaded and frame-stepped: an external driver
//! calls [`World::run_frame`] once per frame, and each sprite's tick
//! runs to completion before the next sprite is processed. Rendering
//! and asset ownership stay outside the crate behind the
//! [`render::DrawSurface`] contract.

#![warn(missing_docs)]

/// 2D math primitives and the affine transform operator
pub mod math;

/// Sprite entities, behaviors, and lifecycle
pub mod sprite;

/// Spatial-partition grid
pub mod grid;

/// Synchronous event bus
pub mod events;

/// Sprite registry and frame driver
pub mod world;

/// Minimal drawing contract
pub mod render;

/// Map tile attributes with change notification
pub mod tile;

pub use events::{Event, EventBus, Payload};
pub use grid::{NodeId, SpatialGrid};
pub use math::{Transform, Vector};
pub use render::{DrawSurface, ImageHandle};
pub use sprite::{Behavior, ConfigError, Sprite, SpriteConfig, TickContext};
pub use world::{SpriteId, World};
