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
//! Simulated entities
//!
//! A [`Sprite`] owns kinematic state, box geometry in local space, cached
//! derived geometry, and lifecycle flags. Specialization happens through
//! the [`Behavior`] trait: variants supply only the `pre_move`,
//! `post_move`, `on_die`, and `draw` override points, while the
//! bookkeeping sequence in [`Sprite::run`] stays fixed so cached geometry
//! and grid membership can never drift out of step.
//!
//! # Lifecycle
//!
//! A sprite is constructed inert from a validated [`SpriteConfig`]. Some
//! external collaborator must then mark it visible
//! ([`Sprite::set_visible`]) before it participates in integration, grid
//! membership, or rendering; construction deliberately never does this
//! itself. [`Sprite::die`] is the terminal transition: idempotent, and
//! never left half-applied -- the flags, the grid cell, and the event
//! subscriptions all release together.

use crate::events::{Event, EventBus};
use crate::grid::{NodeId, SpatialGrid};
use crate::math::{wrap_degrees, Acceleration, Position, Transform, Vector, Velocity};
use crate::render::{DrawSurface, ImageHandle, Rect, TransformScope};
use crate::world::SpriteId;
use std::cell::Cell;
use std::mem;

mod config;
mod snapshot;

pub use config::{ConfigError, SpriteConfig};
pub use snapshot::{ParseSnapshotError, SpriteSnapshot};

/// Predicate selecting which occupants count as obstacles for a query
pub type CollisionFilter = fn(&Sprite) -> bool;

/// Default collision filter: anything flagged collidable is an obstacle
pub fn collides_with_collidable(sprite: &Sprite) -> bool {
    sprite.collidable()
}

/// Mutable simulation state handed to a sprite for one tick
///
/// Events queued during a tick are dispatched by the frame driver right
/// after the sprite's `run` completes, in queue order.
pub struct TickContext<'a> {
    /// The spatial grid the sprite maintains membership in
    pub grid: &'a mut SpatialGrid,
    /// The event bus, for subscription changes during a tick
    pub events: &'a mut EventBus,
    /// Events to dispatch once this sprite's tick completes
    pub queued: &'a mut Vec<Event>,
}

impl TickContext<'_> {
    /// Queue an event for dispatch after the current tick
    pub fn queue(&mut self, event: Event) {
        self.queued.push(event);
    }
}

/// Override points for specialized sprites
///
/// All hooks default to no-ops; a variant implements only what it
/// needs. `run` and the integration step are not override points.
pub trait Behavior {
    /// Called before motion integration each tick
    fn pre_move(&mut self, sprite: &mut Sprite, delta: f64, ctx: &mut TickContext<'_>) {
        let _ = (sprite, delta, ctx);
    }

    /// Called after motion integration each tick
    fn post_move(&mut self, sprite: &mut Sprite, delta: f64, ctx: &mut TickContext<'_>) {
        let _ = (sprite, delta, ctx);
    }

    /// Called exactly once when the sprite reaches its terminal state
    fn on_die(&mut self, sprite: &mut Sprite) {
        let _ = sprite;
    }

    /// Draw the sprite; the surface transform is already positioned at
    /// the sprite's origin, rotated and scaled
    fn draw(&self, sprite: &Sprite, surface: &mut dyn DrawSurface, delta: f64) {
        let _ = (sprite, surface, delta);
    }
}

/// Behavior with no overrides; the default for plain sprites
pub struct Idle;

impl Behavior for Idle {}

impl Default for Box<dyn Behavior> {
    fn default() -> Self {
        Box::new(Idle)
    }
}

/// A simulated 2D entity with box geometry
pub struct Sprite {
    name: String,
    image: ImageHandle,
    tile_width: f64,
    tile_height: f64,

    /// Kinematic state; position carries orientation in degrees
    pub pos: Position,
    /// Kinematic state; `rot` is angular velocity
    pub vel: Velocity,
    /// Kinematic state; `rot` is angular acceleration
    pub acc: Acceleration,

    // local box corners, counter-clockwise from top-left
    points: [Vector; 4],
    // local face normals; boxes only need the +x and +y axes
    normals: [Vector; 2],
    current_normals: [Vector; 2],
    // world-space corner cache, valid only within the tick that filled it
    trans_points: Cell<Option<[Vector; 4]>>,

    scale: f64,
    visible: bool,
    reap: bool,
    collidable: bool,
    collision_filter: CollisionFilter,

    current_node: Option<NodeId>,
    id: Option<SpriteId>,

    behavior: Box<dyn Behavior>,
    in_tick: bool,
    die_notified: bool,
}

impl Sprite {
    /// Build an inert sprite from a validated configuration
    ///
    /// Geometry comes from the config half-extents; kinematics start
    /// zeroed. The sprite is not visible until a collaborator makes it
    /// so.
    pub fn new(config: SpriteConfig) -> Result<Self, ConfigError> {
        Sprite::with_behavior(config, Box::new(Idle))
    }

    /// Build an inert sprite with a specialized behavior
    pub fn with_behavior(
        config: SpriteConfig,
        behavior: Box<dyn Behavior>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let half_width = config.width / 2.0;
        let half_height = config.height / 2.0;

        Ok(Sprite {
            name: config.name,
            image: config.image,
            tile_width: config.width,
            tile_height: config.height,
            pos: Position::zero(),
            vel: Velocity::zero(),
            acc: Acceleration::zero(),
            points: [
                Vector::new(-half_width, -half_height),
                Vector::new(half_width, -half_height),
                Vector::new(half_width, half_height),
                Vector::new(-half_width, half_height),
            ],
            normals: [Vector::new(1.0, 0.0), Vector::new(0.0, 1.0)],
            current_normals: [Vector::new(1.0, 0.0), Vector::new(0.0, 1.0)],
            trans_points: Cell::new(None),
            scale: 1.0,
            visible: false,
            reap: false,
            collidable: false,
            collision_filter: collides_with_collidable,
            current_node: None,
            id: None,
            behavior,
            in_tick: false,
            die_notified: false,
        })
    }

    /// Sprite type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to the sprite's tile-strip image
    pub fn image(&self) -> ImageHandle {
        self.image
    }

    /// Registry id, assigned when the sprite is spawned into a world
    pub fn id(&self) -> Option<SpriteId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: SpriteId) {
        self.id = Some(id);
    }

    /// Whether the sprite participates in integration, grid membership,
    /// and rendering
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Make the sprite visible or invisible
    ///
    /// Visibility after construction is an explicit collaborator
    /// responsibility; nothing inside the engine flips this on.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the sprite has reached its terminal state
    pub fn reaped(&self) -> bool {
        self.reap
    }

    /// Whether other sprites treat this one as an obstacle by default
    pub fn collidable(&self) -> bool {
        self.collidable
    }

    /// Set the collidable flag
    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    /// The predicate this sprite queries occupancy with
    pub fn collision_filter(&self) -> CollisionFilter {
        self.collision_filter
    }

    /// Replace the collision filter predicate
    pub fn set_collision_filter(&mut self, filter: CollisionFilter) {
        self.collision_filter = filter;
    }

    /// Uniform render/geometry scale factor
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale factor
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// The grid cell the sprite currently occupies, if any
    pub fn current_node(&self) -> Option<NodeId> {
        self.current_node
    }

    /// The sprite's local box corners
    pub fn points(&self) -> &[Vector; 4] {
        &self.points
    }

    /// Run one simulation tick
    ///
    /// The sequence is fixed: invalidate the corner cache, `pre_move`,
    /// integrate, `post_move`, refresh world normals, update grid
    /// membership. Behaviors extend the hooks; they cannot reorder the
    /// bookkeeping.
    pub fn run(&mut self, delta: f64, ctx: &mut TickContext<'_>) {
        self.trans_points.set(None);
        self.in_tick = true;

        let mut behavior = mem::take(&mut self.behavior);
        behavior.pre_move(self, delta, ctx);
        self.integrate(delta);
        behavior.post_move(self, delta, ctx);
        self.behavior = behavior;

        self.transform_normals();
        self.update_grid(ctx.grid, ctx.events);

        self.in_tick = false;
        if self.reap {
            self.notify_die();
        }
    }

    /// Integrate motion for one tick
    ///
    /// Semi-implicit Euler, independently for x, y, and rotation:
    /// velocity first, then position from the new velocity. Rotation is
    /// wrapped into `[0, 360)`. No-op when the sprite is not visible.
    pub fn integrate(&mut self, delta: f64) {
        if !self.visible {
            return;
        }

        self.vel.x += self.acc.x * delta;
        self.vel.y += self.acc.y * delta;
        self.vel.rot += self.acc.rot * delta;
        self.pos.x += self.vel.x * delta;
        self.pos.y += self.vel.y * delta;
        self.pos.rot = wrap_degrees(self.pos.rot + self.vel.rot * delta);
    }

    /// Recompute the cached world-space face normals
    ///
    /// Uses a rotation-only transform, so the normals are usable for
    /// axis tests independent of position and scale.
    pub fn transform_normals(&mut self) {
        let rotation = Transform::rotation(self.pos.rot);
        for (world, local) in self.current_normals.iter_mut().zip(self.normals) {
            *world = rotation.apply(local);
        }
    }

    /// The cached world-space face normals
    pub fn world_normals(&self) -> [Vector; 2] {
        self.current_normals
    }

    /// The sprite's corners in world space
    ///
    /// Computed lazily through the full rotate-scale-translate transform
    /// and cached for the remainder of the tick, so repeated same-tick
    /// queries cost one transform pass.
    pub fn transformed_points(&self) -> [Vector; 4] {
        if let Some(cached) = self.trans_points.get() {
            return cached;
        }
        let transform = Transform::new(self.pos.rot, self.scale, self.pos.x, self.pos.y);
        let points = self.points.map(|p| transform.apply(p));
        self.trans_points.set(Some(points));
        points
    }

    /// Update grid membership from the current position
    ///
    /// A position outside the loaded extent terminates the sprite; there
    /// is nothing for it to exist in. No-op when not visible.
    pub fn update_grid(&mut self, grid: &mut SpatialGrid, events: &mut EventBus) {
        if !self.visible {
            return;
        }

        let Some(new_node) = grid.node_at_world(self.pos.x, self.pos.y) else {
            log::debug!(
                "{} left the loaded extent at ({:.1}, {:.1})",
                self.name,
                self.pos.x,
                self.pos.y
            );
            self.die(grid, events);
            return;
        };

        if self.current_node != Some(new_node) {
            if let Some(id) = self.id {
                if let Some(old) = self.current_node {
                    grid.leave(old, id);
                }
                grid.enter(new_node, id);
                log::trace!("{} moved to cell {}", self.name, new_node.index());
            }
            self.current_node = Some(new_node);
        }
    }

    /// Terminal transition out of the simulation
    ///
    /// Idempotent: clears visibility, sets the reap flag, leaves the
    /// current grid cell, and removes every event subscription so no
    /// handler can run against reaped state. The behavior's `on_die`
    /// hook fires exactly once, after any in-progress tick completes.
    pub fn die(&mut self, grid: &mut SpatialGrid, events: &mut EventBus) {
        if self.reap {
            return;
        }
        self.visible = false;
        self.reap = true;
        if let Some(node) = self.current_node.take() {
            if let Some(id) = self.id {
                grid.leave(node, id);
            }
        }
        if let Some(id) = self.id {
            events.unsubscribe_all(id);
        }
        if !self.in_tick {
            self.notify_die();
        }
    }

    pub(crate) fn notify_die(&mut self) {
        if self.die_notified {
            return;
        }
        self.die_notified = true;
        let mut behavior = mem::take(&mut self.behavior);
        behavior.on_die(self);
        self.behavior = behavior;
    }

    /// Approximate occupancy test over a 3×3 cell neighborhood
    ///
    /// Resolves a cell from the candidate position if given, otherwise
    /// from the sprite's current cell (falling back to its position),
    /// then requires that cell and all 8 neighbors contain no occupant
    /// matching `matches`. The candidate only selects which cell to
    /// inspect; no geometry is re-tested against it, so this is a cheap
    /// clearance probe, not a collision check.
    pub fn is_clear<F>(&self, grid: &SpatialGrid, candidate: Option<Vector>, matches: F) -> bool
    where
        F: Fn(SpriteId) -> bool,
    {
        let node = match (candidate, self.current_node) {
            (None, Some(node)) => node,
            (candidate, _) => {
                let probe = candidate.unwrap_or_else(|| self.pos.vector());
                grid.clamped_node_at_world(probe.x, probe.y)
            }
        };
        grid.neighborhood(node)
            .iter()
            .all(|&cell| grid.is_empty(cell, &matches))
    }

    /// Occupants of the sprite's current cell, excluding itself
    ///
    /// Empty when the sprite has no current cell.
    pub fn nearby(&self, grid: &SpatialGrid) -> Vec<SpriteId> {
        let Some(node) = self.current_node else {
            return Vec::new();
        };
        grid.nearby(node).filter(|&id| Some(id) != self.id).collect()
    }

    /// Euclidean distance to another sprite's world position
    pub fn distance(&self, other: &Sprite) -> f64 {
        (other.pos.vector() - self.pos.vector()).magnitude()
    }

    /// Rotate a local-space vector into world orientation
    pub fn relative_to_world(&self, relative: Vector) -> Vector {
        Transform::rotation(self.pos.rot).apply(relative)
    }

    /// Rotate a world-space vector into the sprite's local orientation
    ///
    /// Exact inverse of [`Sprite::relative_to_world`].
    pub fn world_to_relative(&self, world: Vector) -> Vector {
        Transform::rotation(-self.pos.rot).apply(world)
    }

    /// Render through the drawing contract
    ///
    /// No-op when not visible. Otherwise the surface transform is saved,
    /// translated to the sprite's position relative to the world origin,
    /// rotated, and scaled; the behavior's `draw` hook then runs and the
    /// transform is restored on every exit path.
    pub fn render(&self, delta: f64, surface: &mut dyn DrawSurface, origin: Vector) {
        if !self.visible {
            return;
        }
        let mut scope = TransformScope::new(surface);
        scope.translate(self.pos.x - origin.x, self.pos.y - origin.y);
        scope.rotate(self.pos.rot.to_radians());
        scope.scale(self.scale, self.scale);
        self.behavior.draw(self, &mut *scope, delta);
    }

    /// Blit one tile of the sprite's horizontal tile strip
    ///
    /// Meant to be called from a behavior's `draw` hook, where the
    /// surface is already in sprite-local coordinates.
    pub fn draw_tile(&self, index: u32, flipped: bool, surface: &mut dyn DrawSurface) {
        let src = Rect::new(
            f64::from(index) * self.tile_width,
            0.0,
            self.tile_width,
            self.tile_height,
        );
        let dst = Rect::new(
            self.points[0].x,
            self.points[0].y,
            self.tile_width,
            self.tile_height,
        );
        if flipped {
            let mut scope = TransformScope::new(surface);
            scope.scale(-1.0, 1.0);
            scope.blit(self.image, src, dst);
        } else {
            surface.blit(self.image, src, dst);
        }
    }

    /// Capture the sprite's placement
    pub fn snapshot(&self) -> SpriteSnapshot {
        SpriteSnapshot::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawOp, RecordingSurface};
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sprite(name: &str) -> Sprite {
        Sprite::new(SpriteConfig::new(name, 20.0, 20.0, ImageHandle(0))).unwrap()
    }

    fn fixture() -> (SpatialGrid, EventBus) {
        (SpatialGrid::new(8, 8, 60.0), EventBus::new())
    }

    macro_rules! ctx {
        ($grid:expr, $events:expr, $queued:expr) => {
            TickContext {
                grid: &mut $grid,
                events: &mut $events,
                queued: &mut $queued,
            }
        };
    }

    #[test]
    fn test_construction_is_inert() {
        let s = sprite("Car");
        assert!(!s.visible());
        assert!(!s.reaped());
        assert!(!s.collidable());
        assert_eq!(s.pos, Position::zero());
        assert_eq!(s.vel, Velocity::zero());
        assert_eq!(s.acc, Acceleration::zero());
        assert_eq!(s.current_node(), None);
    }

    #[test]
    fn test_rejects_bad_config() {
        let err = Sprite::new(SpriteConfig::new("Car", -1.0, 20.0, ImageHandle(0)));
        assert!(err.is_err());
    }

    #[test]
    fn test_rest_sprite_stays_put() {
        let (mut grid, mut events) = fixture();
        let mut queued = Vec::new();
        let mut s = sprite("Car");
        s.set_visible(true);
        s.pos = Position::new(100.0, 100.0, 45.0);

        for delta in [0.0, 0.016, 1.0] {
            s.run(delta, &mut ctx!(grid, events, queued));
            assert_eq!(s.pos, Position::new(100.0, 100.0, 45.0));
        }
    }

    #[test]
    fn test_constant_acceleration_closed_form() {
        let (mut grid, mut events) = fixture();
        let mut queued = Vec::new();
        let mut s = sprite("Car");
        s.set_visible(true);
        s.pos = Position::new(60.0, 60.0, 0.0);
        s.acc = Acceleration::new(2.0, -3.0, 0.0);

        let delta = 0.5;
        s.run(delta, &mut ctx!(grid, events, queued));

        assert_eq!(s.vel, Velocity::new(2.0 * delta, -3.0 * delta, 0.0));
        assert_eq!(s.pos.x, 60.0 + 2.0 * delta * delta);
        assert_eq!(s.pos.y, 60.0 - 3.0 * delta * delta);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut s = sprite("Car");
        s.set_visible(true);
        s.pos.rot = 350.0;
        s.vel.rot = 20.0;
        s.integrate(1.0);
        assert_eq!(s.pos.rot, 10.0);
    }

    #[test]
    fn test_invisible_sprite_does_not_integrate() {
        let mut s = sprite("Car");
        s.vel = Velocity::new(10.0, 0.0, 0.0);
        s.integrate(1.0);
        assert_eq!(s.pos, Position::zero());
    }

    #[test]
    fn test_transformed_points_box_corners() {
        let mut s = sprite("Car");
        s.pos = Position::new(100.0, 100.0, 0.0);
        let corners = s.transformed_points();
        assert_eq!(corners[0], Vector::new(90.0, 90.0));
        assert_eq!(corners[1], Vector::new(110.0, 90.0));
        assert_eq!(corners[2], Vector::new(110.0, 110.0));
        assert_eq!(corners[3], Vector::new(90.0, 110.0));
    }

    #[test]
    fn test_corner_cache_invalidated_each_tick() {
        let (mut grid, mut events) = fixture();
        let mut queued = Vec::new();
        let mut s = sprite("Car");
        s.set_visible(true);
        s.pos = Position::new(100.0, 100.0, 0.0);
        s.vel = Velocity::new(10.0, 0.0, 0.0);

        let before = s.transformed_points();
        assert_eq!(s.transformed_points(), before); // same-tick reuse

        s.run(1.0, &mut ctx!(grid, events, queued));
        let after = s.transformed_points();
        assert_eq!(after[0], Vector::new(100.0, 90.0));
        assert_ne!(after, before);
    }

    #[test]
    fn test_world_normals_follow_rotation() {
        let mut s = sprite("Car");
        s.pos.rot = 90.0;
        s.transform_normals();
        let [nx, ny] = s.world_normals();
        assert!((nx.x).abs() < 1e-9 && (nx.y - 1.0).abs() < 1e-9);
        assert!((ny.x + 1.0).abs() < 1e-9 && (ny.y).abs() < 1e-9);
    }

    #[test]
    fn test_frame_conversion_round_trip() {
        let mut s = sprite("Car");
        s.pos.rot = 123.0;
        let v = Vector::new(3.0, -7.0);
        let out = s.world_to_relative(s.relative_to_world(v));
        assert!((out.x - v.x).abs() < 1e-9);
        assert!((out.y - v.y).abs() < 1e-9);
    }

    #[test]
    fn test_update_grid_tracks_cell_membership() {
        let (mut grid, mut events) = fixture();
        let mut s = sprite("Car");
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(125.0, 40.0, 0.0);

        s.update_grid(&mut grid, &mut events);
        let first = s.current_node().unwrap();
        assert_eq!(Some(first), grid.node_at(2, 0));
        assert_eq!(grid.node(first).occupant_count(), 1);

        s.pos.x = 305.0;
        s.update_grid(&mut grid, &mut events);
        let second = s.current_node().unwrap();
        assert_eq!(Some(second), grid.node_at(5, 0));
        assert_eq!(grid.node(first).occupant_count(), 0);
        assert_eq!(grid.node(second).occupant_count(), 1);
    }

    #[test]
    fn test_out_of_extent_position_reaps() {
        let (mut grid, mut events) = fixture();
        let mut s = sprite("Car");
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(-10.0, 40.0, 0.0);

        s.update_grid(&mut grid, &mut events);
        assert!(s.reaped());
        assert!(!s.visible());
        assert_eq!(s.current_node(), None);
    }

    #[test]
    fn test_die_is_idempotent() {
        let (mut grid, mut events) = fixture();
        let mut s = sprite("Car");
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(30.0, 30.0, 0.0);
        s.update_grid(&mut grid, &mut events);

        s.die(&mut grid, &mut events);
        let first = (s.visible(), s.reaped(), s.current_node());
        s.die(&mut grid, &mut events);
        assert_eq!((s.visible(), s.reaped(), s.current_node()), first);
        assert_eq!(first, (false, true, None));
    }

    #[test]
    fn test_is_clear_checks_nine_cells() {
        let (mut grid, mut events) = fixture();
        let mut s = sprite("Car");
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(150.0, 150.0, 0.0); // cell (2, 2)
        s.update_grid(&mut grid, &mut events);

        let blocker = SpriteId::new(1, 0);
        assert!(s.is_clear(&grid, None, |id| id == blocker));

        // a diagonal neighbor is still inside the 3x3 neighborhood
        grid.enter(grid.node_at(3, 3).unwrap(), blocker);
        assert!(!s.is_clear(&grid, None, |id| id == blocker));

        // two cells away is outside it
        grid.leave(grid.node_at(3, 3).unwrap(), blocker);
        grid.enter(grid.node_at(4, 2).unwrap(), blocker);
        assert!(s.is_clear(&grid, None, |id| id == blocker));
    }

    #[test]
    fn test_is_clear_candidate_selects_cell() {
        let (mut grid, mut events) = fixture();
        let mut s = sprite("Car");
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(30.0, 30.0, 0.0);
        s.update_grid(&mut grid, &mut events);

        let blocker = SpriteId::new(1, 0);
        grid.enter(grid.node_at(6, 6).unwrap(), blocker);

        assert!(s.is_clear(&grid, None, |id| id == blocker));
        let candidate = Some(Vector::new(390.0, 390.0)); // cell (6, 6)
        assert!(!s.is_clear(&grid, candidate, |id| id == blocker));
    }

    #[test]
    fn test_nearby_excludes_self() {
        let (mut grid, mut events) = fixture();
        let mut s = sprite("Car");
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(30.0, 30.0, 0.0);
        s.update_grid(&mut grid, &mut events);

        assert!(s.nearby(&grid).is_empty());

        let node = s.current_node().unwrap();
        grid.enter(node, SpriteId::new(1, 0));
        grid.enter(node, SpriteId::new(2, 0));
        let mut neighbors = s.nearby(&grid);
        neighbors.sort_by_key(|id| id.index());
        assert_eq!(neighbors, vec![SpriteId::new(1, 0), SpriteId::new(2, 0)]);
    }

    #[test]
    fn test_nearby_without_cell_is_empty() {
        let (grid, _) = fixture();
        let s = sprite("Car");
        assert!(s.nearby(&grid).is_empty());
    }

    #[test]
    fn test_distance() {
        let mut a = sprite("A");
        let mut b = sprite("B");
        a.pos = Position::new(0.0, 0.0, 0.0);
        b.pos = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_render_invisible_is_noop() {
        let s = sprite("Car");
        let mut surface = RecordingSurface::new();
        s.render(0.016, &mut surface, Vector::zero());
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn test_render_scopes_transform() {
        let mut s = sprite("Car");
        s.set_visible(true);
        s.pos = Position::new(100.0, 80.0, 90.0);
        s.set_scale(2.0);

        let mut surface = RecordingSurface::new();
        s.render(0.016, &mut surface, Vector::new(10.0, 20.0));

        assert!(surface.balanced());
        assert_eq!(surface.ops[0], DrawOp::Save);
        assert_eq!(surface.ops[1], DrawOp::Translate(90.0, 60.0));
        assert_eq!(surface.ops[2], DrawOp::Rotate(90.0_f64.to_radians()));
        assert_eq!(surface.ops[3], DrawOp::Scale(2.0, 2.0));
        assert_eq!(*surface.ops.last().unwrap(), DrawOp::Restore);
    }

    #[test]
    fn test_draw_tile_flipped_is_scoped() {
        let s = sprite("Car");
        let mut surface = RecordingSurface::new();
        s.draw_tile(2, true, &mut surface);

        assert!(surface.balanced());
        assert_eq!(surface.ops[0], DrawOp::Save);
        assert_eq!(surface.ops[1], DrawOp::Scale(-1.0, 1.0));
        assert!(matches!(surface.ops[2], DrawOp::Blit(_, src, _) if src.x == 40.0));
        assert_eq!(surface.ops[3], DrawOp::Restore);
    }

    struct HookRecorder {
        order: Rc<std::cell::RefCell<Vec<&'static str>>>,
    }

    impl Behavior for HookRecorder {
        fn pre_move(&mut self, sprite: &mut Sprite, _delta: f64, _ctx: &mut TickContext<'_>) {
            assert_eq!(sprite.pos.x, 60.0); // not yet integrated
            self.order.borrow_mut().push("pre");
        }

        fn post_move(&mut self, sprite: &mut Sprite, _delta: f64, _ctx: &mut TickContext<'_>) {
            assert!(sprite.pos.x > 60.0); // integrated
            self.order.borrow_mut().push("post");
        }

        fn on_die(&mut self, _sprite: &mut Sprite) {
            self.order.borrow_mut().push("die");
        }
    }

    #[test]
    fn test_hooks_bracket_integration() {
        let (mut grid, mut events) = fixture();
        let mut queued = Vec::new();
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut s = Sprite::with_behavior(
            SpriteConfig::new("Car", 20.0, 20.0, ImageHandle(0)),
            Box::new(HookRecorder { order: Rc::clone(&order) }),
        )
        .unwrap();
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(60.0, 60.0, 0.0);
        s.vel = Velocity::new(5.0, 0.0, 0.0);

        s.run(1.0, &mut ctx!(grid, events, queued));
        assert_eq!(*order.borrow(), vec!["pre", "post"]);
    }

    #[test]
    fn test_on_die_fires_once_after_tick() {
        static DIED: AtomicUsize = AtomicUsize::new(0);

        struct Doomed;
        impl Behavior for Doomed {
            fn post_move(&mut self, sprite: &mut Sprite, _delta: f64, ctx: &mut TickContext<'_>) {
                sprite.die(ctx.grid, ctx.events);
            }
            fn on_die(&mut self, _sprite: &mut Sprite) {
                DIED.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (mut grid, mut events) = fixture();
        let mut queued = Vec::new();
        let mut s = Sprite::with_behavior(
            SpriteConfig::new("Car", 20.0, 20.0, ImageHandle(0)),
            Box::new(Doomed),
        )
        .unwrap();
        s.assign_id(SpriteId::new(0, 0));
        s.set_visible(true);
        s.pos = Position::new(60.0, 60.0, 0.0);

        s.run(1.0, &mut ctx!(grid, events, queued));
        assert!(s.reaped());
        assert_eq!(DIED.load(Ordering::SeqCst), 1);

        s.die(&mut grid, &mut events);
        assert_eq!(DIED.load(Ordering::SeqCst), 1);
    }
}
