/*
 * Camera Module
 *
 * This module defines the Camera struct that handles zooming and panning
 * in the simulation. It provides coordinate transformations between
 * world space and screen space.
 */

use nannou::prelude::*;

use crate::region::Region;

// World units moved by one arrow key press at zoom 1
const PAN_STEP: f32 = 20.0;

pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 20.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    // Zoom so that `world` fills the window
    pub fn fit(&mut self, world: &Region, window_rect: Rect) {
        self.position = world.center();
        let zoom = (window_rect.w() / world.width()).min(window_rect.h() / world.height());
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = (zoom * 0.95).clamp(self.min_zoom, self.max_zoom);
        }
    }

    // Convert a point from world space to screen space
    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.position) * self.zoom + window_rect.xy()
    }

    // Convert a point from screen space to world space
    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.position
    }

    // Part of the world currently shown in the window
    pub fn visible_area(&self, window_rect: Rect) -> Region {
        let bottom_left = self.screen_to_world(pt2(window_rect.left(), window_rect.bottom()), window_rect);
        let top_right = self.screen_to_world(pt2(window_rect.right(), window_rect.top()), window_rect);
        Region::from_bounds(bottom_left.x, top_right.x, bottom_left.y, top_right.y)
    }

    // Handle mouse wheel events for zooming
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let zoom_factor = 1.0 + scroll_delta.y * 0.1;

        let cursor_world_before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
        let cursor_world_after = self.screen_to_world(cursor_position, window_rect);

        // Keep the cursor over the same world point
        self.position += cursor_world_before - cursor_world_after;
    }

    // Move the view by whole steps, e.g. (-1, 0) for one step left
    pub fn pan(&mut self, direction: Vec2) {
        self.position += direction * PAN_STEP / self.zoom;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.position -= delta / self.zoom;
                self.last_cursor_pos = position;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}
