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
//! 2D math primitives
//!
//! This module provides the vector value type and the kinematic state
//! components used by sprites. Positions, velocities, and accelerations
//! carry an extra rotation scalar in degrees; the rotation rides along
//! with the linear components through integration but is not a geometric
//! attribute of the vector itself.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

mod transform;

pub use transform::Transform;

/// 2D vector with double-precision components
///
/// # Examples
///
/// ```
/// use sprite_engine::math::Vector;
///
/// let v = Vector::new(3.0, 4.0);
/// assert_eq!(v.magnitude(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Vector {
    /// Create a new vector with the given components
    pub fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    /// Create a zero vector
    pub fn zero() -> Self {
        Vector::new(0.0, 0.0)
    }

    /// Dot product with another vector
    pub fn dot(&self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Length of the vector
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Check that both components are finite (not NaN or infinite)
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

/// Normalize an angle in degrees into the range `[0, 360)`
///
/// # Examples
///
/// ```
/// use sprite_engine::math::wrap_degrees;
///
/// assert_eq!(wrap_degrees(370.0), 10.0);
/// assert_eq!(wrap_degrees(-90.0), 270.0);
/// ```
pub fn wrap_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// World-space position with an auxiliary rotation scalar in degrees
///
/// The rotation is always kept normalized to `[0, 360)` by the
/// integration step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// X coordinate in world space
    pub x: f64,
    /// Y coordinate in world space
    pub y: f64,
    /// Orientation in degrees, normalized to `[0, 360)`
    pub rot: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64, rot: f64) -> Self {
        Position { x, y, rot }
    }

    /// Create a position at the origin with no rotation
    pub fn zero() -> Self {
        Position::new(0.0, 0.0, 0.0)
    }

    /// The linear part of the position as a vector
    pub fn vector(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    /// Check that all components are finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.rot.is_finite()
    }
}

/// Rate of change of position, in world units per second
///
/// The `rot` component is angular velocity in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Angular velocity in degrees per second
    pub rot: f64,
}

impl Velocity {
    /// Create a new velocity
    pub fn new(x: f64, y: f64, rot: f64) -> Self {
        Velocity { x, y, rot }
    }

    /// Create a zero velocity (at rest)
    pub fn zero() -> Self {
        Velocity::new(0.0, 0.0, 0.0)
    }

    /// Check that all components are finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.rot.is_finite()
    }
}

/// Rate of change of velocity, in world units per second squared
///
/// The `rot` component is angular acceleration in degrees per second
/// squared.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Angular acceleration in degrees per second squared
    pub rot: f64,
}

impl Acceleration {
    /// Create a new acceleration
    pub fn new(x: f64, y: f64, rot: f64) -> Self {
        Acceleration { x, y, rot }
    }

    /// Create a zero acceleration
    pub fn zero() -> Self {
        Acceleration::new(0.0, 0.0, 0.0)
    }

    /// Check that all components are finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.rot.is_finite()
    }
}
