/*
 * Hash Grid Module
 *
 * This module defines the HashGrid struct, an unbounded uniform grid for
 * neighbor lookups. Cells are keyed by their integer coordinates
 * floor(position / cell_size) and only non-empty cells are stored.
 *
 * Unlike the quadtree, the grid supports incremental maintenance: a reverse
 * index from particle id to cell lets `remove` and `update` find a particle
 * without scanning, and `update` does nothing while a particle stays in its cell.
 *
 * A neighbor query returns the 3x3 block of cells around a point. It only finds
 * every overlapping pair if `cell_size` is at least the largest particle
 * diameter, which `for_max_radius` guarantees.
 */

use std::collections::HashMap;

use nannou::prelude::*;

use crate::error::{Result, SimulationError};
use crate::particle::ParticleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
}

impl CellKey {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone)]
pub struct HashGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<ParticleId>>,
    // Where each stored particle currently lives
    particle_cells: HashMap<ParticleId, CellKey>,
}

impl HashGrid {
    pub fn new(cell_size: f32) -> Result<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(SimulationError::parameter("cell_size", cell_size));
        }

        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            particle_cells: HashMap::new(),
        })
    }

    // Grid whose 3x3 query finds every overlap among particles up to `max_radius`
    pub fn for_max_radius(max_radius: f32) -> Result<Self> {
        Self::new(2.0 * max_radius)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    // Cell containing a position
    #[inline]
    pub fn cell_key(&self, position: Vec2) -> CellKey {
        CellKey::new(
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.particle_cells.contains_key(&id)
    }

    pub fn cell_of(&self, id: ParticleId) -> Option<CellKey> {
        self.particle_cells.get(&id).copied()
    }

    // Store a particle. Returns false if it is already in the grid.
    pub fn insert(&mut self, id: ParticleId, position: Vec2) -> bool {
        if self.particle_cells.contains_key(&id) {
            return false;
        }

        let key = self.cell_key(position);
        self.cells.entry(key).or_default().push(id);
        self.particle_cells.insert(id, key);
        true
    }

    pub fn batch_insert<I>(&mut self, particles: I) -> usize
    where
        I: IntoIterator<Item = (ParticleId, Vec2)>,
    {
        particles
            .into_iter()
            .filter(|&(id, position)| self.insert(id, position))
            .count()
    }

    // Forget a particle. Returns false if it was not in the grid.
    pub fn remove(&mut self, id: ParticleId) -> bool {
        let key = match self.particle_cells.remove(&id) {
            Some(key) => key,
            None => return false,
        };

        let Some(cell) = self.cells.get_mut(&key) else {
            log::error!("hash grid reverse index points particle {} at missing cell {:?}", id, key);
            debug_assert!(false, "reverse index out of sync with cells");
            return false;
        };

        // Swap with the last entry and pop, order inside a cell does not matter
        if let Some(slot) = cell.iter().position(|&other| other == id) {
            cell.swap_remove(slot);
        }

        if cell.is_empty() {
            self.cells.remove(&key);
        }

        true
    }

    // Move a particle to the cell matching its new position, if it changed.
    // Returns true if the particle changed cell.
    pub fn update(&mut self, id: ParticleId, position: Vec2) -> bool {
        let Some(old_key) = self.cell_of(id) else {
            return false;
        };

        if self.cell_key(position) == old_key {
            return false;
        }

        self.remove(id);
        self.insert(id, position)
    }

    // Particles in the 3x3 block of cells around `position`
    pub fn query(&self, position: Vec2) -> Vec<ParticleId> {
        let center = self.cell_key(position);
        let mut found = Vec::new();

        for dy in -1..=1 {
            for dx in -1..=1 {
                let key = CellKey::new(center.x + dx, center.y + dy);
                if let Some(cell) = self.cells.get(&key) {
                    found.extend_from_slice(cell);
                }
            }
        }

        found
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.particle_cells.clear();
    }

    // Number of stored particles, summed over non-empty cells
    pub fn count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
