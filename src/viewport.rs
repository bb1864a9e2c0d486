//! Pan/zoom state of the editing surface.

use kurbo::{Point, Size, Vec2};

pub const MIN_ZOOM: f64 = 0.01;
pub const MAX_ZOOM: f64 = 20.0;
/// Per-wheel-unit zoom base; negative deltas zoom in.
pub const WHEEL_ZOOM_BASE: f64 = 0.999;

/// Current view transform: scene coordinates map to container coordinates
/// as `container = scene * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Vec2,
    pub container: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            container: Size::ZERO,
        }
    }
}

impl Viewport {
    /// Fit `content` inside `container` and center it. A degenerate
    /// container keeps the previous zoom and pan.
    pub fn fit_to_container(&mut self, content: Size, container: Size) {
        if !(container.width > 0.0 && container.height > 0.0) {
            tracing::warn!(?container, "skipping fit for degenerate container");
            return;
        }
        self.container = container;
        self.zoom = (container.width / content.width).min(container.height / content.height);
        self.pan = Vec2::new(
            (container.width - content.width * self.zoom) / 2.0,
            (container.height - content.height * self.zoom) / 2.0,
        );
    }

    /// Exponential wheel zoom anchored at `cursor` (container coordinates):
    /// the scene point under the cursor stays under it.
    pub fn wheel_zoom(&mut self, delta_y: f64, cursor: Point) {
        let old = self.zoom;
        let new = (old * WHEEL_ZOOM_BASE.powf(delta_y)).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = new / old;
        self.pan = cursor.to_vec2() - (cursor.to_vec2() - self.pan) * ratio;
        self.zoom = new;
    }

    /// Scene point currently shown at a container point.
    pub fn to_scene(&self, container_pt: Point) -> Point {
        ((container_pt.to_vec2() - self.pan) / self.zoom).to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_centers_and_scales() {
        let mut vp = Viewport::default();
        vp.fit_to_container(Size::new(1000.0, 800.0), Size::new(500.0, 500.0));
        assert!((vp.zoom - 0.5).abs() < 1e-12);
        assert!((vp.pan.x - 0.0).abs() < 1e-12);
        assert!((vp.pan.y - 50.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_container_keeps_previous_view() {
        let mut vp = Viewport::default();
        vp.fit_to_container(Size::new(100.0, 100.0), Size::new(200.0, 200.0));
        let before = vp;
        vp.fit_to_container(Size::new(100.0, 100.0), Size::new(0.0, 150.0));
        assert_eq!(vp, before);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut vp = Viewport::default();
        vp.wheel_zoom(1e6, Point::ZERO);
        assert_eq!(vp.zoom, MIN_ZOOM);
        vp.wheel_zoom(-1e7, Point::ZERO);
        assert_eq!(vp.zoom, MAX_ZOOM);
    }

    #[test]
    fn cursor_point_is_invariant_under_wheel_zoom() {
        let mut vp = Viewport::default();
        vp.fit_to_container(Size::new(1000.0, 800.0), Size::new(500.0, 400.0));
        let cursor = Point::new(123.0, 77.0);
        let scene_before = vp.to_scene(cursor);
        vp.wheel_zoom(-250.0, cursor);
        let scene_after = vp.to_scene(cursor);
        assert!((scene_before.x - scene_after.x).abs() < 1e-9);
        assert!((scene_before.y - scene_after.y).abs() < 1e-9);
    }
}
