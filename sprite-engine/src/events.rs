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
//! Synchronous publish/subscribe event bus
//!
//! Sprites communicate without direct references by subscribing named
//! handlers to the bus; external input (e.g. pointer events) enters the
//! simulation the same way. Dispatch is synchronous and runs in
//! subscription order over a snapshot of the current subscriber list, so
//! a handler that subscribes or unsubscribes during dispatch only takes
//! effect on the next fire. Every sprite must unsubscribe all of its
//! handlers when it dies; [`crate::World`] additionally skips handlers
//! whose owner id no longer resolves, so reaped state is never touched.

use crate::math::Vector;
use crate::sprite::Sprite;
use crate::world::SpriteId;
use std::collections::HashMap;

/// Event handler invoked with the owning sprite and the fired event
pub type Handler = fn(&mut Sprite, &Event);

/// Token identifying one subscription, returned by [`EventBus::subscribe`]
///
/// Function pointers compare unreliably across codegen units, so
/// subscriptions are identified by token rather than by handler address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Payload carried by an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    /// No payload
    None,
    /// A sprite, e.g. the subject of a state-change broadcast
    Sprite(SpriteId),
    /// A world-space point, e.g. a pointer location
    Point(Vector),
    /// A scalar value
    Scalar(f64),
}

/// A named event with its payload
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name, e.g. `"mouseup"`
    pub name: String,
    /// Payload delivered to every handler
    pub payload: Payload,
}

impl Event {
    /// Create a new event
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Event {
            name: name.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    id: SubscriptionId,
    owner: SpriteId,
    handler: Handler,
}

/// Subscriber registry keyed by event name
///
/// The bus only stores subscriptions; invoking handlers against sprite
/// state is done by the owner of that state (see [`crate::World::fire_event`]).
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: HashMap<String, Vec<Subscription>>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        EventBus::default()
    }

    /// Subscribe a handler owned by `owner` to the named event
    ///
    /// Handlers fire in subscription order.
    pub fn subscribe(&mut self, event: &str, owner: SpriteId, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(event.to_string())
            .or_default()
            .push(Subscription { id, owner, handler });
        id
    }

    /// Remove one subscription from the named event
    ///
    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, event: &str, id: SubscriptionId) -> bool {
        match self.subscribers.get_mut(event) {
            Some(subs) => {
                let before = subs.len();
                subs.retain(|s| s.id != id);
                subs.len() != before
            }
            None => false,
        }
    }

    /// Remove every subscription owned by `owner`, across all events
    ///
    /// Called as part of sprite teardown so no handler can be invoked
    /// against reaped state.
    pub fn unsubscribe_all(&mut self, owner: SpriteId) {
        for subs in self.subscribers.values_mut() {
            subs.retain(|s| s.owner != owner);
        }
    }

    /// Snapshot the current subscribers of the named event, in
    /// subscription order
    pub fn snapshot(&self, event: &str) -> Vec<(SpriteId, Handler)> {
        self.subscribers
            .get(event)
            .map(|subs| subs.iter().map(|s| (s.owner, s.handler)).collect())
            .unwrap_or_default()
    }

    /// Number of subscriptions currently registered for the named event
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.subscribers.get(event).map_or(0, Vec::len)
    }
}
