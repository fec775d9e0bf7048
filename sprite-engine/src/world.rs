//! Sprite registry and frame driver
//!
//! The World owns the sprite slots, the spatial grid, and the event
//! bus, and drives the per-frame update in a stable spawn order.
//!
//! Ordering within a frame is deliberate and documented rather than
//! hidden: a sprite processed early observes its neighbors' prior-frame
//! cells in grid queries, while a sprite processed later may observe
//! neighbors that already advanced this frame. Each sprite's tick runs
//! to completion before the next begins.

use crate::events::{Event, EventBus};
use crate::grid::SpatialGrid;
use crate::math::Vector;
use crate::render::DrawSurface;
use crate::sprite::{Sprite, TickContext};
use std::fmt;

/// Handle to a spawned sprite with generational index support
///
/// Stale handles from a reaped slot never resolve: the sweep bumps the
/// slot generation, invalidating old references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId {
    index: usize,
    generation: u32,
}

impl SpriteId {
    /// Create an id from raw parts
    pub fn new(index: usize, generation: u32) -> Self {
        SpriteId { index, generation }
    }

    /// Slot index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Slot generation at the time of spawn
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sprite({}, gen: {})", self.index, self.generation)
    }
}

/// Central container driving the simulation
pub struct World {
    slots: Vec<Option<Sprite>>,
    generations: Vec<u32>,
    free: Vec<usize>,
    order: Vec<SpriteId>,
    grid: SpatialGrid,
    events: EventBus,
}

impl World {
    /// Create a world over the given grid
    pub fn new(grid: SpatialGrid) -> Self {
        World {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            grid,
            events: EventBus::new(),
        }
    }

    /// Register a sprite and assign its id
    pub fn spawn(&mut self, mut sprite: Sprite) -> SpriteId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(None);
                self.generations.push(0);
                self.slots.len() - 1
            }
        };
        let id = SpriteId::new(index, self.generations[index]);
        sprite.assign_id(id);
        self.slots[index] = Some(sprite);
        self.order.push(id);
        id
    }

    /// Borrow a sprite, if the handle is still live
    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        if self.generations.get(id.index) != Some(&id.generation) {
            return None;
        }
        self.slots[id.index].as_ref()
    }

    /// Mutably borrow a sprite, if the handle is still live
    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        if self.generations.get(id.index) != Some(&id.generation) {
            return None;
        }
        self.slots[id.index].as_mut()
    }

    /// Whether the handle still resolves to a sprite
    pub fn contains(&self, id: SpriteId) -> bool {
        self.get(id).is_some()
    }

    /// Number of registered sprites, reaped ones included until the sweep
    pub fn sprite_count(&self) -> usize {
        self.order.len()
    }

    /// The spatial grid
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Mutable access to the spatial grid
    pub fn grid_mut(&mut self) -> &mut SpatialGrid {
        &mut self.grid
    }

    /// The event bus
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Mutable access to the event bus, e.g. for subscriptions
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Iterate over live sprite ids in spawn order
    pub fn ids(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.order.iter().copied().filter(|&id| self.contains(id))
    }

    /// Advance the simulation one frame
    ///
    /// Runs every live sprite's tick in spawn order, dispatching any
    /// events a sprite queued as soon as its tick completes.
    pub fn run_frame(&mut self, delta: f64) {
        let ids: Vec<SpriteId> = self.order.clone();
        for id in ids {
            let Some(mut sprite) = self.take(id) else {
                continue;
            };
            let mut queued = Vec::new();
            sprite.run(
                delta,
                &mut TickContext {
                    grid: &mut self.grid,
                    events: &mut self.events,
                    queued: &mut queued,
                },
            );
            self.slots[id.index] = Some(sprite);
            for event in queued {
                self.fire_event(&event);
            }
        }
    }

    /// Dispatch an event synchronously, in subscription order
    ///
    /// Handlers whose owner no longer resolves are skipped, so reaped
    /// state is never touched even if teardown missed an unsubscribe.
    pub fn fire_event(&mut self, event: &Event) {
        for (owner, handler) in self.events.snapshot(&event.name) {
            if let Some(sprite) = self.get_mut(owner) {
                handler(sprite, event);
            }
        }
    }

    /// Terminate a sprite now
    pub fn kill(&mut self, id: SpriteId) {
        if let Some(mut sprite) = self.take(id) {
            sprite.die(&mut self.grid, &mut self.events);
            self.slots[id.index] = Some(sprite);
        }
    }

    /// Drop every reaped sprite and invalidate its handles
    ///
    /// Returns the number of sprites removed. The registry owner decides
    /// when to sweep; queries between a death and the sweep already skip
    /// reaped sprites.
    pub fn reap_sweep(&mut self) -> usize {
        let mut removed = 0;
        let mut kept = Vec::with_capacity(self.order.len());
        for &id in &self.order {
            let reaped = self.slots[id.index]
                .as_ref()
                .is_some_and(|sprite| sprite.reaped());
            if reaped {
                self.slots[id.index] = None;
                self.generations[id.index] = self.generations[id.index].wrapping_add(1);
                self.free.push(id.index);
                removed += 1;
            } else {
                kept.push(id);
            }
        }
        self.order = kept;
        removed
    }

    /// Occupancy test for a sprite's 3×3 cell neighborhood
    ///
    /// Applies the sprite's collision filter to every other occupant of
    /// the nine cells around the resolved position; the sprite itself is
    /// never an obstacle. Unknown handles report clear.
    pub fn is_clear(&self, id: SpriteId, candidate: Option<Vector>) -> bool {
        let Some(sprite) = self.get(id) else {
            return true;
        };
        let filter = sprite.collision_filter();
        sprite.is_clear(&self.grid, candidate, |other| {
            other != id && self.get(other).is_some_and(|o| filter(o))
        })
    }

    /// Occupants sharing a cell with the sprite, excluding itself
    pub fn nearby(&self, id: SpriteId) -> Vec<SpriteId> {
        self.get(id)
            .map(|sprite| sprite.nearby(&self.grid))
            .unwrap_or_default()
    }

    /// Render every visible sprite through the drawing contract
    pub fn render_all(&self, delta: f64, surface: &mut dyn DrawSurface) {
        let origin = self.grid.origin_offset();
        for &id in &self.order {
            if let Some(sprite) = self.get(id) {
                sprite.render(delta, surface, origin);
            }
        }
    }

    fn take(&mut self, id: SpriteId) -> Option<Sprite> {
        if self.generations.get(id.index) != Some(&id.generation) {
            return None;
        }
        self.slots[id.index].take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Position, Velocity};
    use crate::render::ImageHandle;
    use crate::sprite::SpriteConfig;

    fn world() -> World {
        World::new(SpatialGrid::new(8, 8, 60.0))
    }

    fn spawn_at(world: &mut World, x: f64, y: f64) -> SpriteId {
        let mut sprite =
            Sprite::new(SpriteConfig::new("Car", 20.0, 20.0, ImageHandle(0))).unwrap();
        sprite.set_visible(true);
        sprite.pos = Position::new(x, y, 0.0);
        world.spawn(sprite)
    }

    #[test]
    fn test_spawn_and_lookup() {
        let mut w = world();
        let a = spawn_at(&mut w, 30.0, 30.0);
        let b = spawn_at(&mut w, 90.0, 30.0);

        assert_eq!(w.sprite_count(), 2);
        assert!(w.contains(a));
        assert_eq!(w.get(b).unwrap().pos.x, 90.0);
        assert_eq!(w.ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_run_frame_moves_sprites() {
        let mut w = world();
        let id = spawn_at(&mut w, 30.0, 30.0);
        w.get_mut(id).unwrap().vel = Velocity::new(60.0, 0.0, 0.0);

        w.run_frame(1.0);
        let sprite = w.get(id).unwrap();
        assert_eq!(sprite.pos.x, 90.0);
        assert_eq!(sprite.current_node(), w.grid().node_at(1, 0));
    }

    #[test]
    fn test_sweep_invalidates_handles() {
        let mut w = world();
        let a = spawn_at(&mut w, 30.0, 30.0);
        let b = spawn_at(&mut w, 90.0, 30.0);

        w.kill(a);
        assert!(w.get(a).unwrap().reaped());

        assert_eq!(w.reap_sweep(), 1);
        assert!(!w.contains(a));
        assert!(w.contains(b));

        // the slot is reused under a new generation
        let c = spawn_at(&mut w, 150.0, 30.0);
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert!(!w.contains(a));
    }

    #[test]
    fn test_kill_leaves_grid() {
        let mut w = world();
        let id = spawn_at(&mut w, 30.0, 30.0);
        w.run_frame(0.0);
        let node = w.get(id).unwrap().current_node().unwrap();
        assert_eq!(w.grid().node(node).occupant_count(), 1);

        w.kill(id);
        assert_eq!(w.grid().node(node).occupant_count(), 0);
    }

    #[test]
    fn test_is_clear_applies_collision_filter() {
        let mut w = world();
        let a = spawn_at(&mut w, 150.0, 150.0);
        let b = spawn_at(&mut w, 160.0, 160.0);
        w.run_frame(0.0);

        // the neighbor shares the cell but is not collidable
        assert!(w.is_clear(a, None));

        w.get_mut(b).unwrap().set_collidable(true);
        assert!(!w.is_clear(a, None));

        // a sprite never obstructs itself
        w.get_mut(a).unwrap().set_collidable(true);
        assert!(!w.is_clear(a, None));
        w.get_mut(b).unwrap().set_collidable(false);
        assert!(w.is_clear(a, None));
    }

    #[test]
    fn test_nearby_two_cellmates() {
        let mut w = world();
        let a = spawn_at(&mut w, 150.0, 150.0);
        let b = spawn_at(&mut w, 155.0, 150.0);
        let c = spawn_at(&mut w, 150.0, 155.0);
        let far = spawn_at(&mut w, 400.0, 400.0);
        w.run_frame(0.0);

        let mut neighbors = w.nearby(a);
        neighbors.sort_by_key(|id| id.index());
        assert_eq!(neighbors, vec![b, c]);
        assert!(w.nearby(far).is_empty());
    }

    #[test]
    fn test_fire_event_reaches_live_sprites_only() {
        fn tag(sprite: &mut Sprite, _event: &Event) {
            sprite.set_scale(9.0);
        }

        let mut w = world();
        let a = spawn_at(&mut w, 30.0, 30.0);
        let b = spawn_at(&mut w, 90.0, 30.0);
        w.events_mut().subscribe("ping", a, tag);
        w.events_mut().subscribe("ping", b, tag);

        w.kill(a);
        w.reap_sweep();

        w.fire_event(&Event::new("ping", crate::events::Payload::None));
        assert_eq!(w.get(b).unwrap().scale(), 9.0);
    }
}
