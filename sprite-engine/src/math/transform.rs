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
//! Rotate-scale-translate affine operator

use crate::math::Vector;

/// Affine operator mapping local-space points into world space
///
/// `apply` computes `R(θ) · scale · p + t`: rotation and scale always
/// precede translation. The operator is a pure value built once from its
/// inputs, so it is safe to construct and apply from any path --
/// simulation, render, or a parallel query -- without shared state.
///
/// # Examples
///
/// ```
/// use sprite_engine::math::{Transform, Vector};
///
/// let t = Transform::new(0.0, 1.0, 100.0, 100.0);
/// assert_eq!(t.apply(Vector::new(-10.0, -10.0)), Vector::new(90.0, 90.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    cos: f64,
    sin: f64,
    scale: f64,
    tx: f64,
    ty: f64,
}

impl Transform {
    /// Build an operator from a rotation in degrees, a uniform scale
    /// factor, and a translation
    pub fn new(rot_degrees: f64, scale: f64, tx: f64, ty: f64) -> Self {
        let rad = rot_degrees.to_radians();
        Transform {
            cos: rad.cos(),
            sin: rad.sin(),
            scale,
            tx,
            ty,
        }
    }

    /// Build a rotation-only operator (scale 1, no translation)
    ///
    /// Used for axis tests and frame conversions that are independent of
    /// position.
    pub fn rotation(rot_degrees: f64) -> Self {
        Transform::new(rot_degrees, 1.0, 0.0, 0.0)
    }

    /// Map a local-space point into world space
    pub fn apply(&self, v: Vector) -> Vector {
        Vector::new(
            (self.cos * v.x - self.sin * v.y) * self.scale + self.tx,
            (self.sin * v.x + self.cos * v.y) * self.scale + self.ty,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector, b: Vector) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_identity() {
        let t = Transform::new(0.0, 1.0, 0.0, 0.0);
        assert_eq!(t.apply(Vector::new(3.0, -2.0)), Vector::new(3.0, -2.0));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let t = Transform::rotation(90.0);
        assert!(approx(t.apply(Vector::new(1.0, 0.0)), Vector::new(0.0, 1.0)));
        assert!(approx(t.apply(Vector::new(0.0, 1.0)), Vector::new(-1.0, 0.0)));
    }

    #[test]
    fn test_scale_precedes_translation() {
        let t = Transform::new(0.0, 2.0, 5.0, 5.0);
        assert_eq!(t.apply(Vector::new(1.0, 1.0)), Vector::new(7.0, 7.0));
    }

    #[test]
    fn test_rotation_then_translation() {
        // (1, 0) rotated 90 degrees is (0, 1); translation applies last
        let t = Transform::new(90.0, 1.0, 10.0, 20.0);
        assert!(approx(t.apply(Vector::new(1.0, 0.0)), Vector::new(10.0, 21.0)));
    }

    #[test]
    fn test_negative_rotation_inverts() {
        let fwd = Transform::rotation(37.0);
        let back = Transform::rotation(-37.0);
        let v = Vector::new(4.0, -3.0);
        assert!(approx(back.apply(fwd.apply(v)), v));
    }
}
