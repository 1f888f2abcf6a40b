/*
 * Physics Module
 *
 * This module runs the simulation frame. Every frame is split into substeps and
 * each substep goes through the same cycle:
 * 1. Rebuild the quadtree from the current particle positions
 * 2. Apply external forces (pointer attraction/repulsion) to the particles
 *    found in each force's window
 * 3. For every particle: apply gravity, query its neighborhood, resolve
 *    overlaps with its neighbors, clamp it to the world border and integrate
 *
 * Step 3 can run in parallel with rayon. A particle's own state is only touched
 * while holding its lock, and resolving a collision locks both particles of the
 * pair in ascending index order so two threads can never wait on each other.
 * The quadtree is read-only during the pass and only stores particle indices
 * with the positions they had when it was built.
 */

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use nannou::prelude::*;
use rayon::prelude::*;

use crate::error::{Result, SimulationError};
use crate::params::SimulationParams;
use crate::particle::{Particle, ParticleId};
use crate::quadtree::{Locatable, QuadTree};
use crate::region::{Bounds, Region};

// What the quadtree stores: an index into the particle list and where it was at build time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    pub id: ParticleId,
    pub position: Vec2,
}

impl Locatable for IndexedPoint {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}

// A force applied to every particle inside a window for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExternalForce {
    // Toward the window center when strength is positive, away from it when negative
    Radial { window: Region, strength: f32 },
    // Same force for every particle in the window
    Uniform { window: Region, force: Vec2 },
}

impl ExternalForce {
    // Pointer interaction: attract (or repel) particles within `radius` of `center`
    pub fn pointer(center: Vec2, radius: f32, strength: f32, attract: bool) -> Self {
        ExternalForce::Radial {
            window: Region::around(center, radius),
            strength: if attract { strength } else { -strength },
        }
    }

    pub fn window(&self) -> &Region {
        match self {
            ExternalForce::Radial { window, .. } | ExternalForce::Uniform { window, .. } => window,
        }
    }

    pub fn force_on(&self, position: Vec2) -> Vec2 {
        match *self {
            ExternalForce::Radial { window, strength } => {
                let mut axis = window.center() - position;
                let length = axis.length();
                if length != 0.0 {
                    axis /= length;
                }
                axis * strength
            }
            ExternalForce::Uniform { force, .. } => force,
        }
    }
}

// Everything one frame needs from the outside
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub world: Region,
    pub dt: f32,
    pub substeps: u32,
    pub forces: Vec<ExternalForce>,
}

// Counters gathered while running a frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub collisions: usize,
    // Most particles left out of the index in any substep of the frame
    pub outside_index: usize,
    pub node_count: usize,
    pub tree_depth: usize,
    pub elapsed: Duration,
}

pub struct Simulation {
    particles: Vec<Particle>,
    quadtree: QuadTree<IndexedPoint>,
    world: Region,
    params: SimulationParams,
    max_radius: f32,
    last_stats: FrameStats,
}

fn validate_world(world: &Region) -> Result<()> {
    if world.is_finite() && world.width() > 0.0 && world.height() > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidRegion)
    }
}

fn validate_particles(particles: &[Particle]) -> Result<()> {
    for (index, particle) in particles.iter().enumerate() {
        if let Some(reason) = particle.validate() {
            return Err(SimulationError::InvalidParticle { index, reason });
        }
    }
    Ok(())
}

fn max_radius(particles: &[Particle]) -> f32 {
    particles.iter().map(Particle::radius).fold(0.0, f32::max)
}

impl Simulation {
    pub fn new(particles: Vec<Particle>, world: Region, params: SimulationParams) -> Result<Self> {
        validate_world(&world)?;
        validate_particles(&particles)?;
        params.validate()?;

        log::info!(
            "Simulation created with {} particles in a {:.1}x{:.1} world",
            particles.len(),
            world.width(),
            world.height()
        );

        Ok(Self {
            max_radius: max_radius(&particles),
            quadtree: QuadTree::with_capacity(world, params.node_capacity),
            particles,
            world,
            params,
            last_stats: FrameStats::default(),
        })
    }

    // Read-only view for rendering
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    // Index built during the last substep, for debug overlays and culling
    pub fn quadtree(&self) -> &QuadTree<IndexedPoint> {
        &self.quadtree
    }

    pub fn world(&self) -> Region {
        self.world
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SimulationParams {
        &mut self.params
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn total_kinetic_energy(&self) -> f32 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    pub fn set_world(&mut self, world: Region) -> Result<()> {
        validate_world(&world)?;
        self.world = world;
        Ok(())
    }

    // Replace the whole population
    pub fn reset(&mut self, particles: Vec<Particle>) -> Result<()> {
        validate_particles(&particles)?;
        self.max_radius = max_radius(&particles);
        self.particles = particles;
        self.quadtree.clear();
        log::info!("Simulation reset with {} particles", self.particles.len());
        Ok(())
    }

    // Frame input from the stored parameters and world
    pub fn frame_input(&self, forces: Vec<ExternalForce>) -> FrameInput {
        FrameInput {
            world: self.world,
            dt: self.params.dt,
            substeps: self.params.substeps,
            forces,
        }
    }

    // Advance by one frame with the stored parameters
    pub fn update(&mut self, forces: Vec<ExternalForce>) -> FrameStats {
        let input = self.frame_input(forces);
        self.step(&input)
    }

    // Advance by one frame of `input.dt`, split into `input.substeps` substeps
    pub fn step(&mut self, input: &FrameInput) -> FrameStats {
        let start = Instant::now();

        if !(input.dt >= 0.0 && input.dt.is_finite()) || validate_world(&input.world).is_err() {
            log::warn!("Skipping frame with invalid input: dt={} world={:?}", input.dt, input.world);
            return self.last_stats;
        }

        // Parameters may have been changed through `params_mut` since construction
        if let Err(err) = self.params.validate() {
            log::warn!("Skipping frame with invalid parameters: {}", err);
            return self.last_stats;
        }

        let substeps = input.substeps.max(1);
        let sub_dt = input.dt / substeps as f32;
        let mut stats = FrameStats::default();

        if self.quadtree.capacity() != self.params.node_capacity.max(1) {
            self.quadtree = QuadTree::with_capacity(input.world, self.params.node_capacity);
        }

        for _ in 0..substeps {
            self.substep(&input.world, sub_dt, &input.forces, &mut stats);
        }

        if stats.outside_index > 0 {
            log::warn!(
                "{} particles outside the world border were left out of the index",
                stats.outside_index
            );
        }

        stats.node_count = self.quadtree.node_count();
        stats.tree_depth = self.quadtree.depth();
        stats.elapsed = start.elapsed();

        log::debug!(
            "Frame: {} collisions, {} nodes (depth {}), {} outside index, {:.2} ms",
            stats.collisions,
            stats.node_count,
            stats.tree_depth,
            stats.outside_index,
            stats.elapsed.as_secs_f64() * 1000.0
        );

        self.last_stats = stats;
        stats
    }

    fn substep(&mut self, world: &Region, dt: f32, forces: &[ExternalForce], stats: &mut FrameStats) {
        // 1. Spatial index from scratch
        let inserted = self.rebuild_index(world);
        let outside = self.particles.len() - inserted;
        if outside > 0 {
            log::debug!("{} particles outside the world border during rebuild", outside);
        }
        stats.outside_index = stats.outside_index.max(outside);

        // 2. External forces on the particles inside each window
        self.apply_external_forces(forces);

        // 3. Independent per-particle update
        stats.collisions += self.update_particles(world.bounds(), dt);
    }

    fn rebuild_index(&mut self, world: &Region) -> usize {
        let points = self
            .particles
            .iter()
            .enumerate()
            .map(|(id, p)| IndexedPoint { id, position: p.position() });
        self.quadtree.rebuild(*world, points)
    }

    fn apply_external_forces(&mut self, forces: &[ExternalForce]) {
        let mut hits = Vec::new();

        for force in forces {
            hits.clear();
            self.quadtree.query_into(force.window(), &mut hits);

            for hit in &hits {
                let particle = &mut self.particles[hit.id];
                let f = force.force_on(particle.position());
                particle.apply_force(f);
            }
        }
    }

    fn update_particles(&mut self, bounds: Bounds, dt: f32) -> usize {
        // Give each particle its own lock for the duration of the pass
        let cells: Vec<Mutex<Particle>> = std::mem::take(&mut self.particles)
            .into_iter()
            .map(Mutex::new)
            .collect();

        let pass = ParticlePass {
            cells: &cells,
            tree: &self.quadtree,
            bounds,
            dt,
            gravity: self.params.gravity(),
            wall_damping: self.params.wall_damping,
            particle_damping: self.params.particle_damping,
            pressure: self.params.pressure,
            max_radius: self.max_radius,
        };

        let collisions: usize = if self.params.enable_parallel {
            (0..cells.len()).into_par_iter().map(|i| pass.update_particle(i)).sum()
        } else {
            (0..cells.len()).map(|i| pass.update_particle(i)).sum()
        };

        self.particles = cells
            .into_iter()
            .map(|cell| cell.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect();

        collisions
    }
}

// Shared, read-only context of one per-particle pass
struct ParticlePass<'a> {
    cells: &'a [Mutex<Particle>],
    tree: &'a QuadTree<IndexedPoint>,
    bounds: Bounds,
    dt: f32,
    gravity: Vec2,
    wall_damping: f32,
    particle_damping: f32,
    pressure: f32,
    max_radius: f32,
}

#[inline]
fn lock(cell: &Mutex<Particle>) -> MutexGuard<'_, Particle> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

// Lock two distinct particles in ascending index order, returned as (i, j)
fn lock_pair(
    cells: &[Mutex<Particle>],
    i: ParticleId,
    j: ParticleId,
) -> (MutexGuard<'_, Particle>, MutexGuard<'_, Particle>) {
    debug_assert_ne!(i, j);
    if i < j {
        let first = lock(&cells[i]);
        let second = lock(&cells[j]);
        (first, second)
    } else {
        let second = lock(&cells[j]);
        let first = lock(&cells[i]);
        (first, second)
    }
}

// Pressure pushing `p` away from `other`, falling off with the squared distance
fn pressure_force(p: &Particle, other: &Particle, pressure: f32) -> Vec2 {
    let axis = p.position() - other.position();
    let distance_squared = axis.length_squared();
    if distance_squared == 0.0 {
        return Vec2::ZERO;
    }
    axis * (pressure / distance_squared)
}

impl ParticlePass<'_> {
    // Returns the number of collisions resolved for this particle
    fn update_particle(&self, i: ParticleId) -> usize {
        // Environment forces and the neighborhood window
        let window = {
            let mut p = lock(&self.cells[i]);
            p.apply_force(self.gravity);
            p.neighborhood(self.max_radius)
        };

        let mut neighbors = Vec::new();
        self.tree.query_into(&window, &mut neighbors);

        // Pairwise interactions, never holding more than this pair's locks
        let mut collisions = 0;
        for neighbor in neighbors {
            if neighbor.id == i {
                continue;
            }

            let (mut p, mut other) = lock_pair(self.cells, i, neighbor.id);

            if self.pressure != 0.0 {
                let f = pressure_force(&p, &other, self.pressure);
                p.apply_force(f);
            }

            if p.is_colliding(&other) && p.solve_collision(&mut *other, self.particle_damping) {
                collisions += 1;
            }
        }

        // Border and integration
        let mut p = lock(&self.cells[i]);
        p.handle_boundaries(&self.bounds, self.wall_damping);
        p.update(self.dt);

        collisions
    }
}
