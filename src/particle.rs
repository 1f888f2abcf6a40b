/*
 * Particle Module
 *
 * This module defines the Particle struct and its physics.
 * Particles are point masses with a radius, integrated with position Verlet:
 * velocity is never stored, it is the difference between the current and the
 * previous position. Every step:
 * 1. Forces are accumulated into the acceleration
 * 2. Overlaps with neighbors are corrected by moving both particles apart
 * 3. The disc is clamped inside the world border with a damped bounce
 * 4. The position is integrated and the acceleration cleared
 */

use nannou::prelude::*;

use crate::region::{Bounds, Region};

// Index of a particle in the simulation's particle list
pub type ParticleId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vec2,
    position_old: Vec2,
    acceleration: Vec2,
    radius: f32,
    mass: f32,
    color: Rgb<u8>,
}

impl Particle {
    // Create a particle at `position` moving by `velocity` per step
    // Radius and mass must be positive, see `validate`
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, mass: f32) -> Self {
        Self {
            position,
            position_old: position - velocity,
            acceleration: Vec2::ZERO,
            radius,
            mass,
            color: rgb(255, 255, 255),
        }
    }

    // Particle at rest
    pub fn at_rest(position: Vec2, radius: f32, mass: f32) -> Self {
        Self::new(position, Vec2::ZERO, radius, mass)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn position_old(&self) -> Vec2 {
        self.position_old
    }

    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    // Display color, recomputed from speed on every integration step
    #[inline]
    pub fn color(&self) -> Rgb<u8> {
        self.color
    }

    // Displacement over the last step
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.position - self.position_old
    }

    pub fn speed(&self) -> f32 {
        self.velocity().length()
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity().length_squared()
    }

    // Move the particle, keeping its current velocity
    pub fn set_position(&mut self, position: Vec2) {
        let velocity = self.velocity();
        self.position = position;
        self.position_old = position - velocity;
    }

    // Reason why this particle cannot take part in a simulation, if any
    pub fn validate(&self) -> Option<String> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Some(format!("radius must be positive and finite, got {}", self.radius));
        }
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return Some(format!("mass must be positive and finite, got {}", self.mass));
        }
        if !self.position.is_finite() || !self.position_old.is_finite() {
            return Some("position must be finite".to_string());
        }
        None
    }

    // Accumulate a force, consumed by the next call to `update`
    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    pub fn reset_acceleration(&mut self) {
        self.acceleration = Vec2::ZERO;
    }

    // Verlet step: x' = x + (x - x_old) + a * dt²
    pub fn update(&mut self, dt: f32) {
        // Velocity must be read before position_old is overwritten
        let velocity = self.velocity();

        self.position_old = self.position;
        self.position += velocity + self.acceleration * dt * dt;
        self.reset_acceleration();

        self.change_color();
    }

    // Tangent discs count as colliding
    pub fn is_colliding(&self, other: &Particle) -> bool {
        let distance = self.position.distance(other.position);
        distance <= self.radius + other.radius
    }

    // Push two overlapping particles apart along the line between their centers.
    // The correction is split by mass (the heavier particle moves less) and scaled
    // by `damping` so that a single call never separates them completely.
    // Returns whether a correction was applied.
    pub fn solve_collision(&mut self, other: &mut Particle, damping: f32) -> bool {
        let axis = self.position - other.position;
        let distance = axis.length();
        let overlap = (self.radius + other.radius) - distance;

        if overlap <= 0.0 {
            return false;
        }

        // Coincident centers have no normal, separate them along +x
        let normal = if distance > f32::EPSILON {
            axis / distance
        } else {
            vec2(1.0, 0.0)
        };

        let total_mass = self.mass + other.mass;
        let ratio_other = other.mass / total_mass;
        let ratio_self = self.mass / total_mass;

        self.position += normal * (overlap * ratio_other * damping);
        other.position -= normal * (overlap * ratio_self * damping);

        true
    }

    // Keep the whole disc inside the border, one axis at a time.
    // A clamped axis gets its previous position rewritten so that the next step
    // moves back from the wall at `wall_damping` times the incoming speed.
    pub fn handle_boundaries(&mut self, bounds: &Bounds, wall_damping: f32) {
        let velocity = self.velocity();

        if self.position.x - self.radius < bounds.xmin {
            self.position.x = bounds.xmin + self.radius;
            self.position_old.x = self.position.x + velocity.x * wall_damping;
        } else if self.position.x + self.radius > bounds.xmax {
            self.position.x = bounds.xmax - self.radius;
            self.position_old.x = self.position.x + velocity.x * wall_damping;
        }

        if self.position.y - self.radius < bounds.ymin {
            self.position.y = bounds.ymin + self.radius;
            self.position_old.y = self.position.y + velocity.y * wall_damping;
        } else if self.position.y + self.radius > bounds.ymax {
            self.position.y = bounds.ymax - self.radius;
            self.position_old.y = self.position.y + velocity.y * wall_damping;
        }
    }

    // Window containing every particle this one may overlap, given the largest radius in the population
    pub fn neighborhood(&self, max_radius: f32) -> Region {
        Region::around(self.position, self.radius + max_radius)
    }

    // Blue when still, red at one unit per step or faster
    fn change_color(&mut self) {
        let speed = self.speed().clamp(0.0, 1.0);

        let r = (255.0 * speed) as u8;
        let b = (255.0 * (1.0 - speed)) as u8;

        self.color = rgb(r, 0, b);
    }
}
