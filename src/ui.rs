/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It provides controls for adjusting simulation parameters.
 * Parameter change detection is handled by the SimulationParams struct.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::generator::PopulationParams;
use crate::params::SimulationParams;

// What the UI asked for during this frame
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct UiResponse {
    pub reset_particles: bool,
    pub rebuild_needed: bool,
    pub ui_changed: bool,
}

pub fn update_ui(
    egui: &mut Egui,
    params: &mut SimulationParams,
    population: &mut PopulationParams,
    debug_info: &DebugInfo,
) -> UiResponse {
    let mut reset_particles = false;
    let count_before = population.count;

    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Particles", |ui| {
                ui.add(
                    egui::Slider::new(&mut population.count, PopulationParams::get_count_range())
                        .text("Number of Particles"),
                );
                if ui.button("Reset Particles").clicked() {
                    reset_particles = true;
                }
            });

            ui.collapsing("Physics", |ui| {
                ui.add(egui::Slider::new(&mut params.substeps, SimulationParams::get_substeps_range()).text("Substeps"));
                ui.add(egui::Slider::new(&mut params.gravity[0], SimulationParams::get_gravity_range()).text("Gravity X"));
                ui.add(egui::Slider::new(&mut params.gravity[1], SimulationParams::get_gravity_range()).text("Gravity Y"));
                ui.add(
                    egui::Slider::new(&mut params.wall_damping, SimulationParams::get_damping_range())
                        .text("Wall Damping"),
                );
                ui.add(
                    egui::Slider::new(&mut params.particle_damping, SimulationParams::get_damping_range())
                        .text("Collision Damping"),
                );
                ui.add(egui::Slider::new(&mut params.pressure, SimulationParams::get_pressure_range()).text("Pressure"));
            });

            ui.collapsing("Pointer", |ui| {
                ui.label("Left button: attract, right button: repel");
                ui.add(
                    egui::Slider::new(&mut params.pointer_radius, SimulationParams::get_pointer_radius_range())
                        .text("Radius"),
                );
                ui.add(
                    egui::Slider::new(&mut params.pointer_strength, SimulationParams::get_pointer_strength_range())
                        .text("Strength"),
                );
            });

            ui.collapsing("Performance Tuning", |ui| {
                ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
                ui.add(
                    egui::Slider::new(&mut params.node_capacity, SimulationParams::get_node_capacity_range())
                        .text("Quadtree Node Capacity"),
                );

                ui.separator();

                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Physics step: {:.2} ms", debug_info.step_time.as_secs_f64() * 1000.0));
                ui.label(format!("Visible Particles: {}", debug_info.visible_particles.get()));
                ui.label(format!("Quadtree Nodes: {}", debug_info.node_count));
            });

            ui.collapsing("Controls", |ui| {
                ui.label("Zoom: mouse wheel");
                ui.label("Pan: arrow keys or middle mouse drag");
                ui.label("Space: pause, Q: quadtree, R: reset, F: fit world");
            });

            ui.checkbox(&mut params.show_quadtree, "Show Quadtree");
            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    let (rebuild_needed, ui_changed) = params.detect_changes();

    UiResponse {
        reset_particles: reset_particles || population.count != count_before,
        rebuild_needed,
        ui_changed,
    }
}

// Draw debug information on the screen
pub fn draw_debug_info(
    draw: &nannou::Draw,
    debug_info: &DebugInfo,
    window_rect: nannou::geom::Rect,
    total_particles: usize,
    camera_zoom: f32,
) {
    let lines = debug_info.lines(total_particles, camera_zoom);

    // Background panel in the top-right corner, clear of the egui window
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 240.0;
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = panel_x;
    let text_y = window_rect.top() - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(text)
            .x_y(text_x, y)
            .w(panel_width - margin)
            .left_justify()
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
