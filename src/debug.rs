/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and other debug information to be displayed in the UI.
 *
 * Includes metrics for:
 * - FPS (frames per second) and frame time
 * - Time spent in the physics step
 * - Number of visible particles after culling
 * - Quadtree size and the collisions resolved during the last frame
 */

use std::cell::Cell;
use std::time::Duration;

use crate::physics::FrameStats;

#[derive(Debug, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub step_time: Duration,
    // Written by the view, which only gets a shared reference to the model
    pub visible_particles: Cell<usize>,
    pub node_count: usize,
    pub tree_depth: usize,
    pub collisions: usize,
    pub outside_index: usize,
}

impl DebugInfo {
    pub fn record_frame(&mut self, stats: &FrameStats) {
        self.step_time = stats.elapsed;
        self.node_count = stats.node_count;
        self.tree_depth = stats.tree_depth;
        self.collisions = stats.collisions;
        self.outside_index = stats.outside_index;
    }

    pub fn lines(&self, total_particles: usize, zoom: f32) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Physics step: {:.2} ms", self.step_time.as_secs_f64() * 1000.0),
            format!("Particles: {} ({} visible)", total_particles, self.visible_particles.get()),
            format!("Quadtree: {} nodes, depth {}", self.node_count, self.tree_depth),
            format!("Collisions: {}", self.collisions),
            format!("Zoom: {:.2}x", zoom),
        ]
    }
}
