/*
 * Renderer Module
 *
 * This module handles the rendering of the particle simulation.
 * It draws the particles, the world border, the quadtree overlay, the pointer
 * window and debug information.
 *
 * Only particles inside the camera's view are drawn (see the culling module).
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::camera::Camera;
use crate::culling;
use crate::region::Region;
use crate::ui;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let sim = &model.simulation;
    let params = sim.params();

    // Quadtree overlay under the particles
    if params.show_quadtree {
        for boundary in sim.quadtree().boundaries() {
            draw_region(&draw, &model.camera, window_rect, boundary, rgba(0.0, 0.6, 0.2, 0.6), 1.0);
        }
    }

    // World border
    draw_region(&draw, &model.camera, window_rect, &sim.world(), rgba(0.6, 0.6, 0.6, 1.0), 1.0);

    let visible_area = model.camera.visible_area(window_rect);
    let visible = culling::visible_particles(sim, &visible_area);
    model.debug_info.visible_particles.set(visible.len());

    let particles = sim.particles();
    for &i in &visible {
        let particle = &particles[i];
        let screen_pos = model.camera.world_to_screen(particle.position(), window_rect);
        // Never thinner than a pixel when zoomed out
        let radius = (particle.radius() * model.camera.zoom).max(0.5);

        draw.ellipse().xy(screen_pos).radius(radius).color(particle.color());
    }

    // Pointer window while a force is active
    if model.attract || model.repel {
        let center = model.camera.screen_to_world(model.mouse_position, window_rect);
        let window = Region::around(center, params.pointer_radius);
        let color = if model.attract {
            rgba(0.3, 0.8, 1.0, 0.8)
        } else {
            rgba(1.0, 0.4, 0.2, 0.8)
        };
        draw_region(&draw, &model.camera, window_rect, &window, color, 1.5);
    }

    if params.show_debug {
        ui::draw_debug_info(&draw, &model.debug_info, window_rect, sim.len(), model.camera.zoom);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        log::error!("Failed to draw frame: {:?}", err);
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        log::error!("Failed to draw UI: {:?}", err);
    }
}

// Outline of a world-space region
fn draw_region(draw: &Draw, camera: &Camera, window_rect: Rect, region: &Region, color: Rgba, weight: f32) {
    let center = camera.world_to_screen(region.center(), window_rect);
    let size = vec2(region.width(), region.height()) * camera.zoom;

    draw.rect()
        .xy(center)
        .wh(size)
        .no_fill()
        .stroke_weight(weight)
        .stroke(color);
}
