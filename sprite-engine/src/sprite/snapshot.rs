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
//! Sprite placement snapshots
//!
//! Map files record sprite placements as `name,x,y,rot` lines; the same
//! data serializes through serde for richer containers. A snapshot
//! captures only placement, not kinematics or lifecycle flags.

use crate::math::wrap_degrees;
use crate::sprite::Sprite;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;
use thiserror::Error;

/// Error from parsing the `name,x,y,rot` text form
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseSnapshotError {
    /// Wrong number of comma-separated fields
    #[error("expected `name,x,y,rot`, got {0} fields")]
    FieldCount(usize),
    /// The name field was empty
    #[error("sprite name must not be empty")]
    EmptyName,
    /// A numeric field failed to parse
    #[error("invalid {field} value: {source}")]
    BadNumber {
        /// Which field was malformed
        field: &'static str,
        /// Underlying parse failure
        source: ParseFloatError,
    },
}

/// Placement of one sprite: type name, world position, and rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSnapshot {
    /// Sprite type name
    pub name: String,
    /// World-space x coordinate
    pub x: f64,
    /// World-space y coordinate
    pub y: f64,
    /// Rotation in degrees
    pub rot: f64,
}

impl SpriteSnapshot {
    /// Capture the placement of a sprite
    pub fn of(sprite: &Sprite) -> Self {
        SpriteSnapshot {
            name: sprite.name().to_string(),
            x: sprite.pos.x,
            y: sprite.pos.y,
            rot: sprite.pos.rot,
        }
    }

    /// Apply this placement to a sprite, normalizing the rotation
    pub fn apply(&self, sprite: &mut Sprite) {
        sprite.pos.x = self.x;
        sprite.pos.y = self.y;
        sprite.pos.rot = wrap_degrees(self.rot);
    }
}

impl fmt::Display for SpriteSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.name, self.x, self.y, self.rot)
    }
}

impl FromStr for SpriteSnapshot {
    type Err = ParseSnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 4 {
            return Err(ParseSnapshotError::FieldCount(fields.len()));
        }
        let name = fields[0].trim();
        if name.is_empty() {
            return Err(ParseSnapshotError::EmptyName);
        }
        let number = |field: &'static str, text: &str| {
            text.trim()
                .parse::<f64>()
                .map_err(|source| ParseSnapshotError::BadNumber { field, source })
        };
        Ok(SpriteSnapshot {
            name: name.to_string(),
            x: number("x", fields[1])?,
            y: number("y", fields[2])?,
            rot: number("rot", fields[3])?,
        })
    }
}
