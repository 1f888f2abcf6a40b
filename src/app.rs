/*
 * Application Module
 *
 * This module defines the main application model and logic for the particle
 * simulation. It handles the initialization, update, and rendering of the
 * simulation.
 *
 * The scenario (world border, physics parameters, initial population) comes
 * from the command line and an optional YAML file. Every nannou update runs one
 * simulation frame with the pointer force built from the mouse buttons.
 */

use clap::Parser;
use nannou::prelude::*;
use nannou_egui::Egui;

use crate::camera::Camera;
use crate::config::{self, Args, ScenarioConfig};
use crate::debug::DebugInfo;
use crate::generator::{self, PopulationParams};
use crate::input::{key_pressed, mouse_moved, mouse_pressed, mouse_released, mouse_wheel, raw_window_event};
use crate::physics::{ExternalForce, Simulation};
use crate::renderer::view;
use crate::ui;

// Main model for the application
pub struct Model {
    pub simulation: Simulation,
    pub population: PopulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
    // Pointer force state, set by the mouse buttons
    pub attract: bool,
    pub repel: bool,
    pub reset_requested: bool,
}

pub fn build_simulation(scenario: &ScenarioConfig) -> crate::Result<Simulation> {
    let world = scenario.world.region();
    let particles = generator::generate(&scenario.population, &world);
    Simulation::new(particles, world, scenario.simulation.clone())
}

// Simulation for `scenario`, or for the whole default scenario when any part of it is invalid
pub fn build_simulation_or_default(scenario: ScenarioConfig) -> (Simulation, ScenarioConfig) {
    match build_simulation(&scenario) {
        Ok(simulation) => (simulation, scenario),
        Err(err) => {
            log::error!("Invalid scenario ({}), using the default scenario", err);
            let scenario = ScenarioConfig::default();
            let simulation = build_simulation(&scenario).expect("default scenario is valid");
            (simulation, scenario)
        }
    }
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let args = Args::parse();
    let (simulation, scenario) = build_simulation_or_default(config::load_scenario(&args));

    // 80% of the primary monitor when it is known
    let (window_width, window_height) = app
        .primary_monitor()
        .map(|monitor| {
            let size = monitor.size();
            (size.width as f32 * 0.8, size.height as f32 * 0.8)
        })
        .unwrap_or((1280.0, 720.0));

    let window_id = app
        .new_window()
        .title("Particle Simulation")
        .size(window_width as u32, window_height as u32)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_wheel(mouse_wheel)
        .key_pressed(key_pressed)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to create the main window");

    let window = app.window(window_id).expect("main window was just created");
    let egui = Egui::from_window(&window);

    let mut camera = Camera::new();
    camera.fit(&simulation.world(), window.rect());

    Model {
        simulation,
        population: scenario.population,
        egui,
        debug_info: DebugInfo::default(),
        camera,
        mouse_position: Vec2::ZERO,
        attract: false,
        repel: false,
        reset_requested: false,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let response = ui::update_ui(
        &mut model.egui,
        model.simulation.params_mut(),
        &mut model.population,
        &model.debug_info,
    );

    if response.rebuild_needed {
        log::info!("Quadtree node capacity set to {}", model.simulation.params().node_capacity);
    }

    if response.reset_particles || model.reset_requested {
        reset_particles(model);
        model.reset_requested = false;
    }

    if model.simulation.params().pause_simulation {
        return;
    }

    let forces = pointer_forces(app, model);
    let stats = model.simulation.update(forces);
    model.debug_info.record_frame(&stats);
}

// Attraction and/or repulsion around the mouse, in world coordinates
fn pointer_forces(app: &App, model: &Model) -> Vec<ExternalForce> {
    let params = model.simulation.params();
    let center = model.camera.screen_to_world(model.mouse_position, app.window_rect());

    let mut forces = Vec::new();
    if model.attract {
        forces.push(ExternalForce::pointer(center, params.pointer_radius, params.pointer_strength, true));
    }
    if model.repel {
        forces.push(ExternalForce::pointer(center, params.pointer_radius, params.pointer_strength, false));
    }
    forces
}

// Replace the population with a freshly generated one
fn reset_particles(model: &mut Model) {
    let particles = generator::generate(&model.population, &model.simulation.world());
    if let Err(err) = model.simulation.reset(particles) {
        log::error!("Failed to reset particles: {}", err);
    }
}
