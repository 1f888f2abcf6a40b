/*
 * Error Module
 *
 * Errors reported when a simulation is built from invalid input. The per-frame
 * physics and index operations never fail: they either succeed or are silent
 * no-ops by contract, so only construction and configuration can return these.
 */

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("particle {index} is invalid: {reason}")]
    InvalidParticle { index: usize, reason: String },

    #[error("parameter `{name}` has invalid value {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("world region must be finite with a non-zero area")]
    InvalidRegion,
}

impl SimulationError {
    pub(crate) fn parameter(name: &'static str, value: impl Into<f64>) -> Self {
        SimulationError::InvalidParameter {
            name,
            value: value.into() as f32,
        }
    }
}
