/*
 * Configuration Module
 *
 * Scenario files and command line arguments. A scenario is a YAML file with
 * three optional sections; anything left out keeps its default:
 *
 * world:
 *   center: [0.0, 0.0]
 *   half_extent: [250.0, 140.625]
 * simulation:
 *   substeps: 8
 *   gravity: [0.0, -50.0]
 *   wall_damping: 0.1
 *   particle_damping: 0.3
 * population:
 *   count: 2000
 *   mass: [1.0, 5.0]
 *   seed: 42
 */

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use nannou::prelude::*;
use serde::Deserialize;

use crate::generator::PopulationParams;
use crate::params::SimulationParams;
use crate::region::Region;

// Default world: 500 units wide with a 16:9 aspect ratio
pub const WORLD_WIDTH: f32 = 500.0;
pub const ASPECT_RATIO: f32 = 16.0 / 9.0;

#[derive(Parser, Debug, Default)]
#[command(about = "Verlet particle simulation with quadtree collision detection")]
pub struct Args {
    /// Scenario file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of particles
    #[arg(short, long)]
    pub particles: Option<usize>,

    /// Seed for a reproducible population
    #[arg(short, long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub center: [f32; 2],
    pub half_extent: [f32; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            half_extent: [WORLD_WIDTH / 2.0, WORLD_WIDTH / (2.0 * ASPECT_RATIO)],
        }
    }
}

impl WorldConfig {
    pub fn region(&self) -> Region {
        Region::new(
            vec2(self.center[0], self.center[1]),
            vec2(self.half_extent[0], self.half_extent[1]),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub world: WorldConfig,
    pub simulation: SimulationParams,
    pub population: PopulationParams,
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open scenario {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).with_context(|| format!("invalid scenario {}", path.display()))
    }

    // Command line overrides on top of the scenario
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(count) = args.particles {
            self.population.count = count;
        }
        if args.seed.is_some() {
            self.population.seed = args.seed;
        }
    }
}

// Scenario from the command line, falling back to defaults when the file is unusable
pub fn load_scenario(args: &Args) -> ScenarioConfig {
    let mut scenario = match &args.config {
        Some(path) => match ScenarioConfig::load(path) {
            Ok(scenario) => {
                log::info!("Loaded scenario from {}", path.display());
                scenario
            }
            Err(err) => {
                log::warn!("{:#}, using the default scenario", err);
                ScenarioConfig::default()
            }
        },
        None => ScenarioConfig::default(),
    };

    scenario.apply_args(args);
    scenario
}
