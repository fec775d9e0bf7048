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
//! Minimal drawing contract
//!
//! The engine does not own a rendering surface. It only requires the
//! scoped save/restore plus translate/rotate/scale/blit primitives
//! declared here; a real backend (canvas, framebuffer, GPU quad batcher)
//! implements [`DrawSurface`] outside the crate. [`RecordingSurface`] is
//! a reference implementation that captures the call stream for tests.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Opaque handle to an image owned by the caller's asset store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub u32);

/// Axis-aligned rectangle used for blit source and destination regions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub w: f64,
    /// Height
    pub h: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }
}

/// Drawing primitives the engine requires from a rendering backend
///
/// `save`/`restore` must nest: each `restore` undoes the transform
/// changes made since the matching `save`.
pub trait DrawSurface {
    /// Push the current transform state
    fn save(&mut self);
    /// Pop back to the most recently saved transform state
    fn restore(&mut self);
    /// Translate the coordinate system
    fn translate(&mut self, x: f64, y: f64);
    /// Rotate the coordinate system, in radians
    fn rotate(&mut self, radians: f64);
    /// Scale the coordinate system
    fn scale(&mut self, sx: f64, sy: f64);
    /// Copy a region of an image to a region of the surface
    fn blit(&mut self, image: ImageHandle, src: Rect, dst: Rect);
}

/// RAII guard over a saved transform state
///
/// Calls `save` on construction and `restore` when dropped, so the
/// surface state is rewound on every exit path, including early returns
/// and unwinding.
pub struct TransformScope<'a> {
    surface: &'a mut dyn DrawSurface,
}

impl<'a> TransformScope<'a> {
    /// Save the surface state and begin a scope
    pub fn new(surface: &'a mut dyn DrawSurface) -> Self {
        surface.save();
        TransformScope { surface }
    }
}

impl<'a> Deref for TransformScope<'a> {
    type Target = dyn DrawSurface + 'a;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<'a> DerefMut for TransformScope<'a> {
    fn deref_mut(&mut self) -> &mut (dyn DrawSurface + 'a) {
        self.surface
    }
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// One captured drawing call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    /// Transform state pushed
    Save,
    /// Transform state popped
    Restore,
    /// Coordinate system translated
    Translate(f64, f64),
    /// Coordinate system rotated, in radians
    Rotate(f64),
    /// Coordinate system scaled
    Scale(f64, f64),
    /// Image region copied to the surface
    Blit(ImageHandle, Rect, Rect),
}

/// Surface that records the drawing call stream instead of rasterizing
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Captured calls, in order
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    /// Create an empty recording surface
    pub fn new() -> Self {
        RecordingSurface::default()
    }

    /// Check that every `save` has a matching later `restore`
    pub fn balanced(&self) -> bool {
        let mut depth: i64 = 0;
        for op in &self.ops {
            match op {
                DrawOp::Save => depth += 1,
                DrawOp::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl DrawSurface for RecordingSurface {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Translate(x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.ops.push(DrawOp::Scale(sx, sy));
    }

    fn blit(&mut self, image: ImageHandle, src: Rect, dst: Rect) {
        self.ops.push(DrawOp::Blit(image, src, dst));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_restores_on_drop() {
        let mut surface = RecordingSurface::new();
        {
            let mut scope = TransformScope::new(&mut surface);
            scope.translate(1.0, 2.0);
        }
        assert_eq!(
            surface.ops,
            vec![DrawOp::Save, DrawOp::Translate(1.0, 2.0), DrawOp::Restore]
        );
        assert!(surface.balanced());
    }

    #[test]
    fn test_scope_restores_on_unwind() {
        let mut surface = RecordingSurface::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = TransformScope::new(&mut surface);
            scope.rotate(1.0);
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert!(surface.balanced());
    }

    #[test]
    fn test_unbalanced_detected() {
        let mut surface = RecordingSurface::new();
        surface.save();
        assert!(!surface.balanced());
        surface.restore();
        surface.restore();
        assert!(!surface.balanced());
    }
}
