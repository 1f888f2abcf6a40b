/*
 * Particle Simulation - Module Definitions
 *
 * This file defines the module structure for the particle simulation.
 * The core (regions, quadtree, hash grid, particles, physics pipeline) has no
 * dependency on the window; the nannou application is built on top of it.
 */

// Re-export key components for easier access
pub use error::{Result, SimulationError};
pub use generator::PopulationParams;
pub use hash_grid::{CellKey, HashGrid};
pub use params::SimulationParams;
pub use particle::{Particle, ParticleId};
pub use physics::{ExternalForce, FrameInput, FrameStats, IndexedPoint, Simulation};
pub use quadtree::{Locatable, QuadTree, DEFAULT_NODE_CAPACITY};
pub use region::{Bounds, Region};

// Core
pub mod error;
pub mod generator;
pub mod hash_grid;
pub mod params;
pub mod particle;
pub mod physics;
pub mod quadtree;
pub mod region;

// Application
pub mod app;
pub mod camera;
pub mod config;
pub mod culling;
pub mod debug;
pub mod input;
pub mod renderer;
pub mod ui;
