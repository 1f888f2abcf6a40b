/*
 * Particle Simulation
 *
 * Thousands of particles fall under gravity, bounce off the world border and
 * collide with each other. Collisions are found with a quadtree rebuilt every
 * substep. Hold the left mouse button to attract particles, the right one to
 * repel them.
 *
 * Usage: particles [--config scenario.yaml] [--particles N] [--seed S]
 * Set RUST_LOG=debug for per-frame statistics.
 */

use particles::app::{model, update};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    nannou::app(model).update(update).run();
}
