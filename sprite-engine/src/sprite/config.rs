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
//! Sprite construction configuration

use crate::render::ImageHandle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error produced by validating a [`SpriteConfig`]
///
/// Construction fails fast on malformed configuration instead of
/// producing degenerate geometry silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The sprite name was empty
    #[error("sprite name must not be empty")]
    EmptyName,
    /// Width or height was not a positive finite number
    #[error("sprite dimensions must be positive and finite, got {width}x{height}")]
    BadDimensions {
        /// Offending width
        width: f64,
        /// Offending height
        height: f64,
    },
}

/// Configuration establishing a sprite's geometry and artwork
///
/// Width and height are the full extents of the sprite's axis-aligned
/// box in local space; the box is centered on the sprite's origin. They
/// double as the tile dimensions of a horizontal tile strip in the
/// referenced image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// Sprite type name, e.g. `"GasPump"`
    pub name: String,
    /// Full width of the local box
    pub width: f64,
    /// Full height of the local box
    pub height: f64,
    /// Handle to the sprite's tile-strip image
    pub image: ImageHandle,
}

impl SpriteConfig {
    /// Create a new configuration
    pub fn new(name: impl Into<String>, width: f64, height: f64, image: ImageHandle) -> Self {
        SpriteConfig {
            name: name.into(),
            width,
            height,
            image,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !(self.width > 0.0 && self.width.is_finite())
            || !(self.height > 0.0 && self.height.is_finite())
        {
            return Err(ConfigError::BadDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
