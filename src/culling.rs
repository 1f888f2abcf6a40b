/*
 * Culling Module
 *
 * This module determines which particles are visible in the current view and
 * should be rendered.
 *
 * The quadtree built during the last substep answers the range query for the
 * camera's view. It holds positions from before the final integration, so the
 * query window is widened by the largest one-step displacement plus room for
 * collision corrections, and the candidates are then filtered on their live
 * positions. When the tree is empty (before the first frame) or left some
 * particles out (they were past the border when it was built), every particle
 * is checked directly.
 */

use crate::particle::{Particle, ParticleId};
use crate::physics::Simulation;
use crate::region::Region;

// Region grown by `margin` on every side
fn expand(region: &Region, margin: f32) -> Region {
    let b = region.bounds();
    Region::from_bounds(b.xmin - margin, b.xmax + margin, b.ymin - margin, b.ymax + margin)
}

// How far any particle may be from where the quadtree last saw it
pub fn index_lag(sim: &Simulation) -> f32 {
    let max_step = sim.particles().iter().map(Particle::speed).fold(0.0, f32::max);
    max_step + sim.max_radius() * 2.0
}

pub fn visible_particles(sim: &Simulation, visible_area: &Region) -> Vec<ParticleId> {
    // Discs partly inside the view are drawn too
    let window = expand(visible_area, sim.max_radius());

    if sim.quadtree().is_empty() || sim.last_stats().outside_index > 0 {
        return cull_brute_force(sim, &window);
    }

    let particles = sim.particles();
    let mut indices: Vec<ParticleId> = sim
        .quadtree()
        .query(&expand(&window, index_lag(sim)))
        .into_iter()
        .map(|point| point.id)
        .filter(|&id| window.contains(particles[id].position()))
        .collect();
    indices.sort_unstable();
    indices
}

pub fn cull_brute_force(sim: &Simulation, window: &Region) -> Vec<ParticleId> {
    sim.particles()
        .iter()
        .enumerate()
        .filter(|(_, p)| window.contains(p.position()))
        .map(|(i, _)| i)
        .collect()
}
