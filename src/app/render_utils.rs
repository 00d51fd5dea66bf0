use depgraph_view::layout::{Rgb, Vector, Viewport, vector};
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

const GRID_STEP: f64 = 50.0;

pub(super) fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Device-space point relative to `rect` into an absolute screen position.
pub(super) fn to_screen(rect: Rect, point: Vector) -> Pos2 {
    Pos2::new(rect.left() + point.x as f32, rect.top() + point.y as f32)
}

pub(super) fn to_device(rect: Rect, position: Pos2) -> Vector {
    vector(
        (position.x - rect.left()) as f64,
        (position.y - rect.top()) as f64,
    )
}

/// Dark fill with a grid fixed in graph space, so panning and zooming move it.
pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: &Viewport) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let scale = viewport.scale();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));
    let origin = viewport.origin();
    let size = viewport.size();

    let mut x = (origin.x / GRID_STEP).ceil() * GRID_STEP;
    while x < origin.x + size.x {
        let screen_x = rect.left() + ((x - origin.x) * scale.x) as f32;
        painter.line_segment(
            [
                Pos2::new(screen_x, rect.top()),
                Pos2::new(screen_x, rect.bottom()),
            ],
            stroke,
        );
        x += GRID_STEP;
    }

    let mut y = (origin.y / GRID_STEP).ceil() * GRID_STEP;
    while y < origin.y + size.y {
        let screen_y = rect.top() + ((y - origin.y) * scale.y) as f32;
        painter.line_segment(
            [
                Pos2::new(rect.left(), screen_y),
                Pos2::new(rect.right(), screen_y),
            ],
            stroke,
        );
        y += GRID_STEP;
    }
}
