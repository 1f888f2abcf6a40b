/*
 * Input Module
 *
 * This module handles user input events for the particle simulation.
 *
 * Features:
 * - Left mouse button attracts particles toward the pointer, right button repels them
 * - Camera panning with middle mouse drag or the arrow keys
 * - Camera zooming with mouse wheel
 * - Space pauses, Q toggles the quadtree overlay, R resets the population,
 *   F fits the world into the window
 * - Events over the egui window are left to the UI
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};

use crate::app::Model;

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    if model.camera.is_dragging {
        model.camera.drag(pos);
    }
    model.mouse_position = pos;
}

// Mouse pressed event handler
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    match button {
        MouseButton::Left => model.attract = true,
        MouseButton::Right => model.repel = true,
        MouseButton::Middle => model.camera.start_drag(model.mouse_position),
        _ => {}
    }
}

// Mouse released event handler
pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    match button {
        MouseButton::Left => model.attract = false,
        MouseButton::Right => model.repel = false,
        MouseButton::Middle => model.camera.end_drag(),
        _ => {}
    }
}

// Mouse wheel event handler for zooming
pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let window_rect = app.window_rect();
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            model.camera.zoom(vec2(x, y), model.mouse_position, window_rect);
        }
        MouseScrollDelta::PixelDelta(pos) => {
            model.camera.zoom(vec2(pos.x as f32, pos.y as f32) * 0.01, model.mouse_position, window_rect);
        }
    }
}

// Keyboard shortcuts
pub fn key_pressed(app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }

    match key {
        Key::Left => model.camera.pan(vec2(-1.0, 0.0)),
        Key::Right => model.camera.pan(vec2(1.0, 0.0)),
        Key::Up => model.camera.pan(vec2(0.0, 1.0)),
        Key::Down => model.camera.pan(vec2(0.0, -1.0)),
        Key::Space => {
            let params = model.simulation.params_mut();
            params.pause_simulation = !params.pause_simulation;
        }
        Key::Q => {
            let params = model.simulation.params_mut();
            params.show_quadtree = !params.show_quadtree;
        }
        Key::R => model.reset_requested = true,
        Key::F => {
            let world = model.simulation.world();
            model.camera.fit(&world, app.window_rect());
        }
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
