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
//! Broadphase candidate collection
//!
//! Collects sprite pairs that share a cell or occupy adjacent cells.
//! The pass is read-only over the grid, so with the `parallel` feature
//! it fans out over cells with Rayon; narrow-phase geometry tests are
//! left to the caller.

use super::{Direction, NodeId, SpatialGrid};
use crate::world::SpriteId;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Forward half of the neighborhood. Visiting only these directions from
// each cell yields every adjacent-cell pair exactly once.
const FORWARD: [Direction; 4] = [
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
];

impl SpatialGrid {
    /// Collect candidate collision pairs from cell occupancy
    ///
    /// A pair is reported when both sprites occupy the same cell or
    /// directly adjacent cells. Pairs are unordered and unique; the
    /// order of the returned vector is unspecified.
    pub fn collision_candidates(&self) -> Vec<(SpriteId, SpriteId)> {
        #[cfg(feature = "parallel")]
        {
            (0..self.cells.len())
                .into_par_iter()
                .flat_map_iter(|i| self.cell_candidates(NodeId(i)))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            (0..self.cells.len())
                .flat_map(|i| self.cell_candidates(NodeId(i)))
                .collect()
        }
    }

    fn cell_candidates(&self, id: NodeId) -> Vec<(SpriteId, SpriteId)> {
        let node = self.node(id);
        let occupants: Vec<SpriteId> = node.occupants().collect();
        let mut pairs = Vec::new();

        for (i, &a) in occupants.iter().enumerate() {
            for &b in &occupants[i + 1..] {
                pairs.push((a, b));
            }
        }

        // boundary cells clamp neighbor links, so a forward direction can
        // resolve to the cell itself or to the same cell as another
        // direction; cross-pair each distinct neighbor once
        let mut forward: Vec<NodeId> = FORWARD
            .iter()
            .map(|&dir| node.neighbor(dir))
            .filter(|&other| other != id)
            .collect();
        forward.sort_unstable_by_key(|n| n.index());
        forward.dedup();

        for other in forward {
            for &a in &occupants {
                for b in self.node(other).occupants() {
                    pairs.push((a, b));
                }
            }
        }

        pairs
    }
}
