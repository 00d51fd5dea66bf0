use serde::Deserialize;

use super::vector::{Vector, vector};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Graph units added to or removed from each axis per wheel notch.
    pub zoom_step: f64,
    /// Smallest graph-space extent either axis may shrink to.
    pub min_size: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_step: 10.0,
            min_size: 10.0,
        }
    }
}

/// Graph-space window `origin..origin + size` stretched over a device surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    origin: Vector,
    size: Vector,
    device: Vector,
    config: ViewportConfig,
}

impl Viewport {
    /// Centers the graph origin on a `width x height` surface at 1:1 scale.
    pub fn new(width: f64, height: f64) -> Self {
        let device = device_extent(width, height);
        Self::with_window(device * -0.5, device, device)
    }

    pub fn with_window(origin: Vector, size: Vector, device: Vector) -> Self {
        let config = ViewportConfig::default();
        Self {
            origin,
            size: vector(size.x.max(config.min_size), size.y.max(config.min_size)),
            device: device_extent(device.x, device.y),
            config,
        }
    }

    pub fn with_config(mut self, config: ViewportConfig) -> Self {
        self.config = config;
        self.size = self.clamped(self.size);
        self
    }

    pub fn origin(&self) -> Vector {
        self.origin
    }

    pub fn size(&self) -> Vector {
        self.size
    }

    pub fn device(&self) -> Vector {
        self.device
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Device pixels per graph unit on each axis.
    pub fn scale(&self) -> Vector {
        self.device.unscale(self.size)
    }

    /// Smaller of the two axis scales, for lengths that must stay round.
    pub fn uniform_scale(&self) -> f64 {
        let scale = self.scale();
        scale.x.min(scale.y)
    }

    pub fn device_to_graph(&self, point: Vector) -> Vector {
        self.origin + point.scale(self.size.unscale(self.device))
    }

    pub fn graph_to_device(&self, point: Vector) -> Vector {
        (point - self.origin).scale(self.scale())
    }

    /// Moves the window opposite to a device-space drag delta, one graph unit per pixel.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.origin -= vector(dx, dy);
    }

    /// Grows (`direction > 0`) or shrinks the window by one step while keeping
    /// the graph point under `point` fixed.
    pub fn zoom_at(&mut self, point: Vector, direction: f64) {
        if direction == 0.0 || direction.is_nan() || !point.is_finite() {
            return;
        }

        let step = self.config.zoom_step * direction.signum();
        let anchor = self.device_to_graph(point);
        self.size = self.clamped(self.size + vector(step, step));
        let moved = self.device_to_graph(point);
        self.origin -= moved - anchor;
    }

    /// Adopts a new device surface; the graph-space window is unchanged.
    pub fn resize_device(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            self.device = vector(width, height);
        }
    }

    fn clamped(&self, size: Vector) -> Vector {
        vector(
            size.x.max(self.config.min_size),
            size.y.max(self.config.min_size),
        )
    }
}

fn device_extent(width: f64, height: f64) -> Vector {
    let sanitize = |value: f64| {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            1.0
        }
    };
    vector(sanitize(width), sanitize(height))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn assert_close(a: Vector, b: Vector, tolerance: f64) {
        assert!(
            (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn default_window_centers_graph_origin() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.origin(), vector(-400.0, -300.0));
        assert_eq!(viewport.scale(), vector(1.0, 1.0));
        assert_eq!(viewport.graph_to_device(Vector::ZERO), vector(400.0, 300.0));
    }

    #[test]
    fn maps_device_point_into_window() {
        let viewport = Viewport::with_window(
            vector(-50.0, -50.0),
            vector(400.0, 400.0),
            vector(400.0, 400.0),
        );
        assert_eq!(viewport.device_to_graph(vector(100.0, 100.0)), vector(50.0, 50.0));

        let stretched = Viewport::with_window(
            vector(0.0, 0.0),
            vector(200.0, 100.0),
            vector(400.0, 400.0),
        );
        assert_eq!(stretched.device_to_graph(vector(100.0, 100.0)), vector(50.0, 25.0));
    }

    #[test]
    fn pan_is_unscaled_and_inverted() {
        let mut viewport = Viewport::with_window(
            vector(0.0, 0.0),
            vector(100.0, 100.0),
            vector(400.0, 400.0),
        );
        viewport.pan(10.0, -4.0);
        assert_eq!(viewport.origin(), vector(-10.0, 4.0));
        assert_eq!(viewport.size(), vector(100.0, 100.0));
    }

    #[test]
    fn zoom_steps_size_and_clamps() {
        let mut viewport = Viewport::new(400.0, 400.0);
        viewport.zoom_at(vector(200.0, 200.0), 3.5);
        assert_eq!(viewport.size(), vector(410.0, 410.0));

        viewport.zoom_at(vector(200.0, 200.0), 0.0);
        assert_eq!(viewport.size(), vector(410.0, 410.0));

        let mut tight = Viewport::with_window(
            Vector::ZERO,
            vector(15.0, 40.0),
            vector(100.0, 100.0),
        );
        tight.zoom_at(vector(10.0, 10.0), -1.0);
        assert_eq!(tight.size(), vector(10.0, 30.0));
        tight.zoom_at(vector(10.0, 10.0), -1.0);
        assert_eq!(tight.size(), vector(10.0, 20.0));
    }

    #[test]
    fn resize_keeps_window_and_ignores_bad_sizes() {
        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.resize_device(800.0, 600.0);
        assert_eq!(viewport.device(), vector(800.0, 600.0));
        assert_eq!(viewport.size(), vector(400.0, 300.0));
        assert_eq!(viewport.scale(), vector(2.0, 2.0));

        viewport.resize_device(0.0, 600.0);
        viewport.resize_device(100.0, -1.0);
        assert_eq!(viewport.device(), vector(800.0, 600.0));

        let degenerate = Viewport::new(0.0, -5.0);
        assert_eq!(degenerate.device(), vector(1.0, 1.0));
    }

    proptest! {
        #[test]
        fn zoom_keeps_cursor_anchor(
            origin_x in -2_000.0f64..2_000.0,
            origin_y in -2_000.0f64..2_000.0,
            width in 10.0f64..5_000.0,
            height in 10.0f64..5_000.0,
            device_w in 50.0f64..4_000.0,
            device_h in 50.0f64..4_000.0,
            fx in 0.0f64..1.0,
            fy in 0.0f64..1.0,
            delta in -500.0f64..500.0,
        ) {
            let mut viewport = Viewport::with_window(
                vector(origin_x, origin_y),
                vector(width, height),
                vector(device_w, device_h),
            );
            let cursor = vector(fx * device_w, fy * device_h);
            let before = viewport.device_to_graph(cursor);
            viewport.zoom_at(cursor, delta);
            let after = viewport.device_to_graph(cursor);

            prop_assert!((before.x - after.x).abs() < 1e-6);
            prop_assert!((before.y - after.y).abs() < 1e-6);
            prop_assert!(viewport.size().x >= 10.0 && viewport.size().y >= 10.0);
        }

        #[test]
        fn device_and_graph_transforms_are_inverse(
            origin_x in -2_000.0f64..2_000.0,
            origin_y in -2_000.0f64..2_000.0,
            width in 10.0f64..5_000.0,
            height in 10.0f64..5_000.0,
            px in -1_000.0f64..5_000.0,
            py in -1_000.0f64..5_000.0,
        ) {
            let viewport = Viewport::with_window(
                vector(origin_x, origin_y),
                vector(width, height),
                vector(1_280.0, 720.0),
            );
            let device = vector(px, py);
            let round_trip = viewport.graph_to_device(viewport.device_to_graph(device));
            prop_assert!((round_trip.x - device.x).abs() < 1e-6);
            prop_assert!((round_trip.y - device.y).abs() < 1e-6);
        }
    }

    #[test]
    fn repeated_zoom_in_stays_anchored() {
        let mut viewport = Viewport::new(640.0, 480.0);
        let cursor = vector(17.0, 401.0);
        let before = viewport.device_to_graph(cursor);
        for _ in 0..25 {
            viewport.zoom_at(cursor, -1.0);
        }
        assert_close(before, viewport.device_to_graph(cursor), 1e-6);
    }
}
