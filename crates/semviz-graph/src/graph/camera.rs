//! Pan/zoom camera for the collapsible tree view
//!
//! World coordinates are the tree layout's coordinates; the camera maps them
//! to the widget rect. Center and zoom are spring-animated so fit/reset and
//! wheel zoom glide instead of jumping. Call `update(dt)` once per frame.

use egui::{Pos2, Rect, Vec2};

use super::animation::{SpringConfig, SpringF32, SpringVec2};

#[derive(Debug, Clone)]
pub struct Camera2D {
    center: SpringVec2,
    zoom: SpringF32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        let config = SpringConfig::from_preset("camera");
        Self {
            center: SpringVec2::with_config(Pos2::ZERO, config),
            zoom: SpringF32::with_config(1.0, config),
            min_zoom: 0.1,
            max_zoom: 4.0,
        }
    }
}

impl Camera2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(&self) -> Pos2 {
        self.center.get()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom.get()
    }

    pub fn update(&mut self, dt: f32) {
        self.center.tick(dt);
        self.zoom.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.center.is_animating() || self.zoom.is_animating()
    }

    pub fn snap_to_target(&mut self) {
        self.center.set_immediate(self.center.target());
        self.zoom.set_immediate(self.zoom.target());
    }

    /// Pan by a screen-space delta (drag)
    pub fn pan(&mut self, screen_delta: Vec2) {
        let world_delta = screen_delta / self.zoom.get().max(f32::EPSILON);
        let target = self.center.target() - world_delta;
        self.center.set_target(target);
        // Dragging should track the pointer exactly
        self.center.set_immediate(target);
    }

    /// Zoom by `factor`, keeping the world point under `screen_pos` fixed
    pub fn zoom_at(&mut self, factor: f32, screen_pos: Pos2, screen_rect: Rect) {
        let old_zoom = self.zoom.target();
        let new_zoom = (old_zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return;
        }
        let offset = screen_pos - screen_rect.center();
        let shift = offset / old_zoom - offset / new_zoom;
        self.center.set_target(self.center.target() + shift);
        self.zoom.set_target(new_zoom);
    }

    /// Center on `bounds` and zoom so it fits inside `screen_rect` minus padding
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen_rect: Rect, padding: f32) {
        if !bounds.is_finite() || bounds.is_negative() {
            return;
        }
        let available = (screen_rect.size() - Vec2::splat(2.0 * padding)).max(Vec2::splat(1.0));
        let size = bounds.size().max(Vec2::splat(1.0));
        let zoom = (available.x / size.x)
            .min(available.y / size.y)
            .clamp(self.min_zoom, 1.0);
        self.center.set_target(bounds.center());
        self.zoom.set_target(zoom);
    }

    pub fn world_to_screen(&self, world: Pos2, screen_rect: Rect) -> Pos2 {
        screen_rect.center() + (world - self.center()) * self.zoom()
    }

    pub fn screen_to_world(&self, screen: Pos2, screen_rect: Rect) -> Pos2 {
        self.center() + (screen - screen_rect.center()) / self.zoom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_round_trip_transform() {
        let mut camera = Camera2D::new();
        camera.fit_to_bounds(
            Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(400.0, 300.0)),
            screen(),
            20.0,
        );
        camera.snap_to_target();
        let world = Pos2::new(123.0, 77.0);
        let back = camera.screen_to_world(camera.world_to_screen(world, screen()), screen());
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn test_fit_centers_bounds() {
        let mut camera = Camera2D::new();
        let bounds = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(2000.0, 100.0));
        camera.fit_to_bounds(bounds, screen(), 20.0);
        camera.snap_to_target();
        assert_eq!(camera.center(), bounds.center());
        assert!((camera.zoom() - 760.0 / 2000.0).abs() < 1e-4);
    }

    #[test]
    fn test_fit_never_magnifies_small_trees() {
        let mut camera = Camera2D::new();
        camera.fit_to_bounds(
            Rect::from_min_size(Pos2::ZERO, Vec2::new(10.0, 10.0)),
            screen(),
            20.0,
        );
        camera.snap_to_target();
        assert_eq!(camera.zoom(), 1.0);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = Camera2D::new();
        let pointer = Pos2::new(600.0, 200.0);
        let before = camera.screen_to_world(pointer, screen());
        camera.zoom_at(2.0, pointer, screen());
        camera.snap_to_target();
        let after = camera.screen_to_world(pointer, screen());
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn test_pan_moves_opposite_to_drag() {
        let mut camera = Camera2D::new();
        camera.pan(Vec2::new(10.0, 0.0));
        assert_eq!(camera.center(), Pos2::new(-10.0, 0.0));
    }
}
