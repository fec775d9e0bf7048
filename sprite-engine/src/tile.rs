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
//! Map tile attributes with change notification
//!
//! A tile's display state (sheet offset, flip, quarter-turn rotation,
//! collidability) is mutated through explicit setters that invoke a
//! registered change callback, so a view layer can mirror the data
//! without the model knowing anything about it. There is no generic
//! property interception; every observable mutation goes through a
//! named method.

/// One observed tile mutation, delivered to the change callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileChange {
    /// Sheet offset changed
    Offset(u32),
    /// Horizontal flip toggled
    Flip(bool),
    /// Rotation changed, in quarter turns (0-3)
    Rotate(u8),
    /// Collidable flag toggled
    Collidable(bool),
}

/// Callback invoked after every attribute mutation
pub type TileCallback = Box<dyn FnMut(&TileChange)>;

/// One map tile: display attributes plus an optional change observer
#[derive(Default)]
pub struct Tile {
    offset: u32,
    flip: bool,
    rotate: u8,
    collidable: bool,
    callback: Option<TileCallback>,
}

impl Tile {
    /// Create a tile with default attributes and no observer
    pub fn new() -> Self {
        Tile::default()
    }

    /// Register the change callback, replacing any previous one
    pub fn on_change(&mut self, callback: TileCallback) {
        self.callback = Some(callback);
    }

    fn notify(&mut self, change: TileChange) {
        if let Some(callback) = &mut self.callback {
            callback(&change);
        }
    }

    /// Index into the tile sheet
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Set the tile-sheet offset
    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
        self.notify(TileChange::Offset(offset));
    }

    /// Whether the tile renders mirrored horizontally
    pub fn flip(&self) -> bool {
        self.flip
    }

    /// Set the horizontal flip
    pub fn set_flip(&mut self, flip: bool) {
        self.flip = flip;
        self.notify(TileChange::Flip(flip));
    }

    /// Toggle the horizontal flip
    pub fn toggle_flip(&mut self) {
        self.set_flip(!self.flip);
    }

    /// Rotation in quarter turns (0-3)
    pub fn rotate(&self) -> u8 {
        self.rotate
    }

    /// Set the rotation in quarter turns; values reduce modulo 4
    pub fn set_rotate(&mut self, quarter_turns: u8) {
        self.rotate = quarter_turns % 4;
        self.notify(TileChange::Rotate(self.rotate));
    }

    /// Advance the rotation one quarter turn
    pub fn cycle_rotate(&mut self) {
        self.set_rotate(self.rotate + 1);
    }

    /// Whether sprites collide with this tile
    pub fn collidable(&self) -> bool {
        self.collidable
    }

    /// Set the collidable flag
    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
        self.notify(TileChange::Collidable(collidable));
    }

    /// Toggle the collidable flag
    pub fn toggle_collidable(&mut self) {
        self.set_collidable(!self.collidable);
    }
}
