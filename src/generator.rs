/*
 * Generator Module
 *
 * Builds the initial particle population: uniformly random positions inside
 * the world border, random per-step velocities, radii and masses. A seed makes
 * the population reproducible.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::particle::Particle;
use crate::region::Region;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PopulationParams {
    pub count: usize,
    pub velocity: [f32; 2],
    pub radius: [f32; 2],
    pub mass: [f32; 2],
    pub seed: Option<u64>,
}

impl Default for PopulationParams {
    fn default() -> Self {
        Self {
            count: 2000,
            velocity: [-0.5, 0.5],
            radius: [1.0, 1.0],
            mass: [1.0, 5.0],
            seed: None,
        }
    }
}

impl PopulationParams {
    pub fn get_count_range() -> std::ops::RangeInclusive<usize> {
        0..=20000
    }
}

// Uniform sample in [min, max], tolerating an empty range
fn sample(rng: &mut StdRng, [min, max]: [f32; 2]) -> f32 {
    if min < max {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

pub fn generate(params: &PopulationParams, world: &Region) -> Vec<Particle> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let b = world.bounds();

    (0..params.count)
        .map(|_| {
            let position = vec2(sample(&mut rng, [b.xmin, b.xmax]), sample(&mut rng, [b.ymin, b.ymax]));
            let velocity = vec2(sample(&mut rng, params.velocity), sample(&mut rng, params.velocity));
            let radius = sample(&mut rng, params.radius).max(f32::EPSILON);
            let mass = sample(&mut rng, params.mass).max(f32::EPSILON);

            // Heavier particles are drawn bigger
            Particle::new(position, velocity, radius * mass.sqrt(), mass)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_respects_ranges() {
        let world = Region::new(Vec2::ZERO, vec2(50.0, 20.0));
        let params = PopulationParams {
            count: 500,
            seed: Some(7),
            ..Default::default()
        };

        let particles = generate(&params, &world);
        assert_eq!(particles.len(), 500);

        let b = world.bounds();
        for p in &particles {
            assert!(p.validate().is_none());
            assert!(p.position().x >= b.xmin && p.position().x <= b.xmax);
            assert!(p.position().y >= b.ymin && p.position().y <= b.ymax);
            assert!(p.mass() >= 1.0 && p.mass() <= 5.0);
            assert!(p.velocity().x.abs() <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn seed_makes_population_reproducible() {
        let world = Region::new(Vec2::ZERO, vec2(10.0, 10.0));
        let params = PopulationParams {
            count: 20,
            seed: Some(42),
            ..Default::default()
        };
        assert_eq!(generate(&params, &world), generate(&params, &world));
    }
}
