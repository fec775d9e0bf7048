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
//! Spatial-partition grid
//!
//! The loaded world is partitioned into a fixed 2D array of square
//! cells. Each cell tracks its occupants and precomputes direct links to
//! its 8 neighbors at construction, so neighborhood queries never do
//! index arithmetic on the hot path. Cells on the boundary link to
//! themselves where a neighbor would fall outside the loaded extent, so
//! an edge neighborhood degrades to fewer distinct cells rather than
//! failing.

use crate::math::Vector;
use crate::world::SpriteId;
use std::collections::HashSet;

mod broadphase;

/// Index of a grid cell, valid for the grid that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw index into the grid's cell array
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Compass direction to one of a cell's 8 neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Up
    North,
    /// Up-right
    NorthEast,
    /// Right
    East,
    /// Down-right
    SouthEast,
    /// Down
    South,
    /// Down-left
    SouthWest,
    /// Left
    West,
    /// Up-left
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }
}

/// One grid cell: an occupant set plus fixed neighbor links
#[derive(Debug)]
pub struct Node {
    occupants: HashSet<SpriteId>,
    neighbors: [NodeId; 8],
}

impl Node {
    /// The neighbor in the given direction
    ///
    /// Boundary cells return themselves for directions that leave the
    /// loaded extent.
    pub fn neighbor(&self, dir: Direction) -> NodeId {
        self.neighbors[dir as usize]
    }

    /// Iterate over the cell's occupants
    ///
    /// Iteration order is unspecified.
    pub fn occupants(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.occupants.iter().copied()
    }

    /// Number of occupants in the cell
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }
}

/// Fixed 2D array of cells partitioning the loaded world
///
/// Cells are `cell_size` world units square; cell `(col, row)` covers
/// `[col·s, (col+1)·s) × [row·s, (row+1)·s)`. The origin offset is the
/// world-space position of the loaded extent's top-left corner, used by
/// the render step.
#[derive(Debug)]
pub struct SpatialGrid {
    cells: Vec<Node>,
    cols: usize,
    rows: usize,
    cell_size: f64,
    origin_offset: Vector,
}

impl SpatialGrid {
    /// Create a grid of `cols` × `rows` cells of the given size
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or the cell size is not
    /// positive and finite.
    pub fn new(cols: usize, rows: usize, cell_size: f64) -> Self {
        assert!(cols > 0 && rows > 0, "Grid dimensions must be non-zero");
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "Cell size must be positive and finite"
        );

        let clamp = |col: i64, row: i64| -> NodeId {
            let c = col.clamp(0, cols as i64 - 1) as usize;
            let r = row.clamp(0, rows as i64 - 1) as usize;
            NodeId(r * cols + c)
        };

        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows as i64 {
            for col in 0..cols as i64 {
                let mut neighbors = [NodeId(0); 8];
                for dir in Direction::ALL {
                    let (dc, dr) = dir.offset();
                    neighbors[dir as usize] = clamp(col + dc, row + dr);
                }
                cells.push(Node {
                    occupants: HashSet::new(),
                    neighbors,
                });
            }
        }

        SpatialGrid {
            cells,
            cols,
            rows,
            cell_size,
            origin_offset: Vector::zero(),
        }
    }

    /// Set the world-space origin offset of the loaded extent
    pub fn with_origin_offset(mut self, offset: Vector) -> Self {
        self.origin_offset = offset;
        self
    }

    /// Number of cell columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cell rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Side length of a cell in world units
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// World-space origin of the loaded extent
    pub fn origin_offset(&self) -> Vector {
        self.origin_offset
    }

    /// Borrow a cell
    ///
    /// # Panics
    ///
    /// Panics if the id came from a different grid and is out of range.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.cells[id.0]
    }

    /// The cell at the given column and row, if inside the grid
    pub fn node_at(&self, col: usize, row: usize) -> Option<NodeId> {
        if col < self.cols && row < self.rows {
            Some(NodeId(row * self.cols + col))
        } else {
            None
        }
    }

    fn cell_coords(&self, x: f64, y: f64) -> (i64, i64) {
        ((x / self.cell_size).floor() as i64, (y / self.cell_size).floor() as i64)
    }

    /// Resolve a world position to a cell, or `None` outside the loaded
    /// extent
    pub fn node_at_world(&self, x: f64, y: f64) -> Option<NodeId> {
        let (col, row) = self.cell_coords(x, y);
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            None
        } else {
            Some(NodeId(row as usize * self.cols + col as usize))
        }
    }

    /// Resolve a world position to a cell, wrapping out-of-range indices
    /// to 0
    ///
    /// This mirrors the legacy fallback used by occupancy queries on
    /// positions with no resolved cell: each out-of-range axis index
    /// falls back to cell index 0 rather than reporting the position as
    /// unresolvable. Kept for compatibility with existing map data; new
    /// callers should prefer [`SpatialGrid::node_at_world`].
    pub fn clamped_node_at_world(&self, x: f64, y: f64) -> NodeId {
        let (col, row) = self.cell_coords(x, y);
        let col = if col < 0 || col >= self.cols as i64 { 0 } else { col as usize };
        let row = if row < 0 || row >= self.rows as i64 { 0 } else { row as usize };
        NodeId(row * self.cols + col)
    }

    /// Add a sprite to a cell's occupant set
    pub fn enter(&mut self, node: NodeId, sprite: SpriteId) {
        self.cells[node.0].occupants.insert(sprite);
    }

    /// Remove a sprite from a cell's occupant set
    pub fn leave(&mut self, node: NodeId, sprite: SpriteId) {
        self.cells[node.0].occupants.remove(&sprite);
    }

    /// True iff no occupant of the cell matches the collision filter
    pub fn is_empty<F>(&self, node: NodeId, filter: F) -> bool
    where
        F: Fn(SpriteId) -> bool,
    {
        !self.cells[node.0].occupants.iter().any(|&id| filter(id))
    }

    /// The cell's full occupant set
    pub fn nearby(&self, node: NodeId) -> impl Iterator<Item = SpriteId> + '_ {
        self.cells[node.0].occupants()
    }

    /// The cell plus its 8 neighbors
    ///
    /// On the boundary some entries repeat, since edge cells link to
    /// themselves.
    pub fn neighborhood(&self, node: NodeId) -> [NodeId; 9] {
        let n = &self.cells[node.0];
        [
            node,
            n.neighbor(Direction::North),
            n.neighbor(Direction::South),
            n.neighbor(Direction::East),
            n.neighbor(Direction::West),
            n.neighbor(Direction::NorthEast),
            n.neighbor(Direction::NorthWest),
            n.neighbor(Direction::SouthEast),
            n.neighbor(Direction::SouthWest),
        ]
    }
}
