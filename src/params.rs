/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains all the
 * adjustable parameters of the particle simulation. They can be loaded from a
 * scenario file and modified through the UI. It also provides parameter
 * validation, slider ranges and change detection for the UI.
 */

use nannou::prelude::*;
use serde::Deserialize;

use crate::error::{Result, SimulationError};
use crate::quadtree::DEFAULT_NODE_CAPACITY;

// Parameters for the simulation that can be adjusted via UI
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub dt: f32,
    pub substeps: u32,
    pub gravity: [f32; 2],
    pub wall_damping: f32,
    pub particle_damping: f32,
    pub pressure: f32,
    pub node_capacity: usize,
    // Pointer interaction window half size and force magnitude
    pub pointer_radius: f32,
    pub pointer_strength: f32,
    // Performance settings
    pub enable_parallel: bool,
    // Display settings
    pub show_quadtree: bool,
    pub show_debug: bool,
    pub pause_simulation: bool,

    // Internal state for tracking changes
    #[serde(skip)]
    pub previous_values: Option<ParamSnapshot>,
}

// A snapshot of parameter values used for change detection
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSnapshot {
    substeps: u32,
    gravity: [f32; 2],
    wall_damping: f32,
    particle_damping: f32,
    pressure: f32,
    node_capacity: usize,
    pointer_radius: f32,
    pointer_strength: f32,
    enable_parallel: bool,
    show_quadtree: bool,
    show_debug: bool,
    pause_simulation: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            dt: 1.0 / 144.0,
            substeps: 8,
            gravity: [0.0, -50.0],
            wall_damping: 0.1,
            particle_damping: 0.3,
            pressure: 0.0,
            node_capacity: DEFAULT_NODE_CAPACITY,
            pointer_radius: 100.0,
            pointer_strength: 250.0,
            enable_parallel: true,
            show_quadtree: false,
            show_debug: false,
            pause_simulation: false,
            previous_values: None,
        }
    }
}

impl SimulationParams {
    pub fn gravity(&self) -> Vec2 {
        vec2(self.gravity[0], self.gravity[1])
    }

    // Check every value the physics relies on
    pub fn validate(&self) -> Result<()> {
        if !(self.dt >= 0.0 && self.dt.is_finite()) {
            return Err(SimulationError::parameter("dt", self.dt));
        }
        if self.substeps == 0 {
            return Err(SimulationError::parameter("substeps", self.substeps));
        }
        if !(0.0..=1.0).contains(&self.wall_damping) {
            return Err(SimulationError::parameter("wall_damping", self.wall_damping));
        }
        if !(0.0..=1.0).contains(&self.particle_damping) {
            return Err(SimulationError::parameter("particle_damping", self.particle_damping));
        }
        if self.node_capacity == 0 {
            return Err(SimulationError::parameter("node_capacity", self.node_capacity as f64));
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(SimulationError::parameter("gravity", self.gravity[0] + self.gravity[1]));
        }
        if !self.pressure.is_finite() {
            return Err(SimulationError::parameter("pressure", self.pressure));
        }
        if !(self.pointer_radius >= 0.0 && self.pointer_radius.is_finite()) {
            return Err(SimulationError::parameter("pointer_radius", self.pointer_radius));
        }
        Ok(())
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(self.snapshot());
    }

    // Check if any parameters have changed since the last snapshot.
    // Returns (rebuild_needed, any_ui_changed): a rebuild is needed when the
    // quadtree capacity changed.
    pub fn detect_changes(&self) -> (bool, bool) {
        match &self.previous_values {
            Some(prev) => {
                let current = self.snapshot();
                (current.node_capacity != prev.node_capacity, &current != prev)
            }
            None => (false, false),
        }
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            substeps: self.substeps,
            gravity: self.gravity,
            wall_damping: self.wall_damping,
            particle_damping: self.particle_damping,
            pressure: self.pressure,
            node_capacity: self.node_capacity,
            pointer_radius: self.pointer_radius,
            pointer_strength: self.pointer_strength,
            enable_parallel: self.enable_parallel,
            show_quadtree: self.show_quadtree,
            show_debug: self.show_debug,
            pause_simulation: self.pause_simulation,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn get_substeps_range() -> std::ops::RangeInclusive<u32> {
        1..=16
    }

    pub fn get_gravity_range() -> std::ops::RangeInclusive<f32> {
        -200.0..=200.0
    }

    pub fn get_damping_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1.0
    }

    pub fn get_pressure_range() -> std::ops::RangeInclusive<f32> {
        0.0..=5.0
    }

    pub fn get_node_capacity_range() -> std::ops::RangeInclusive<usize> {
        1..=64
    }

    pub fn get_pointer_radius_range() -> std::ops::RangeInclusive<f32> {
        10.0..=300.0
    }

    pub fn get_pointer_strength_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1000.0
    }
}
