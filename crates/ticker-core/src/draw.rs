// File: crates/ticker-core/src/draw.rs
// Summary: Stateless drawing primitives (rounded rects, progress bars, clipped images, dividers).
// Notes:
// - Every primitive saves the canvas state on entry and restores it on exit, so
//   clip, paint and line width never leak into sibling draws.
// - Images arrive already decoded; resolve URLs through `ImageCache` first.

use skia_safe as skia;

use crate::geometry::{progress_overlay, rounded_outline, to_skia_path, CircleSpec, RectangleSpec};

/// Line width set on the fill path; covers hairline seams where arcs meet edges.
const FILL_SEAM_WIDTH: f32 = 6.0;
const BORDER_WIDTH: f32 = 1.0;
const DEFAULT_OUTLINE_WIDTH: f32 = 10.0;
/// `#231E2B`
pub const PROGRESS_TRACK: skia::Color = skia::Color::from_argb(255, 0x23, 0x1e, 0x2b);
/// `#918d8d`
pub const DIVIDER_COLOR: skia::Color = skia::Color::from_argb(255, 0x91, 0x8d, 0x8d);

/// Restores the canvas to its saved state when dropped.
struct SavedState<'a> {
    canvas: &'a skia::Canvas,
    count: usize,
}

impl<'a> SavedState<'a> {
    fn new(canvas: &'a skia::Canvas) -> Self {
        let count = canvas.save();
        Self { canvas, count }
    }
}

impl Drop for SavedState<'_> {
    fn drop(&mut self) {
        self.canvas.restore_to_count(self.count);
    }
}

/// Fill and/or outline a rounded rectangle.
pub fn draw_rounded_rectangle(
    canvas: &skia::Canvas,
    rect: &RectangleSpec,
    fill: Option<skia::Color>,
    border: Option<skia::Color>,
) {
    let _state = SavedState::new(canvas);
    let path = to_skia_path(&rounded_outline(rect));

    if let Some(color) = fill {
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Fill);
        paint.set_stroke_width(FILL_SEAM_WIDTH);
        paint.set_color(color);
        canvas.draw_path(&path, &paint);
    }
    if let Some(color) = border {
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Stroke);
        paint.set_stroke_width(BORDER_WIDTH);
        paint.set_color(color);
        canvas.draw_path(&path, &paint);
    }
}

/// Track plus filled portion. `progress` is clamped to `[0, 1]`.
pub fn draw_progress_bar(canvas: &skia::Canvas, container: &RectangleSpec, progress: f32) {
    let _state = SavedState::new(canvas);
    draw_rounded_rectangle(canvas, container, Some(container.fill.unwrap_or(PROGRESS_TRACK)), container.overlay);
    if let Some(overlay) = progress_overlay(container, progress) {
        draw_rounded_rectangle(canvas, &overlay, overlay.fill, None);
    }
}

/// Clip to a circle and draw `image` scaled over the circle's bounding square.
/// With an outline color set, the circle is stroked before clipping.
pub fn draw_clipped_circle_image(canvas: &skia::Canvas, circle: &CircleSpec, image: Option<&skia::Image>) {
    let Some(image) = image else { return };
    let _state = SavedState::new(canvas);

    let mut path = skia::Path::new();
    path.add_circle((circle.x, circle.y), circle.radius, None);

    if let Some(color) = circle.outline_color {
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Stroke);
        paint.set_stroke_width(circle.outline_width.unwrap_or(DEFAULT_OUTLINE_WIDTH));
        paint.set_color(color);
        canvas.draw_path(&path, &paint);
    }
    canvas.clip_path(&path, skia::ClipOp::Intersect, true);
    draw_image_into(canvas, image, circle.bounds());
}

/// Clip to a rounded rectangle built from four corner arc-to segments and draw
/// the avatar scaled into the rectangle's padded content area.
pub fn draw_clipped_rounded_avatar(canvas: &skia::Canvas, rect: &RectangleSpec, avatar: Option<&skia::Image>) {
    let _state = SavedState::new(canvas);
    let (l, t, r, b, rad) = (rect.x.from, rect.y.from, rect.x.to, rect.y.to, rect.radius);

    let mut path = skia::Path::new();
    path.move_to((l + rad, t));
    path.arc_to_tangent((r, t), (r, t + rad), rad);
    path.arc_to_tangent((r, b), (r - rad, b), rad);
    path.arc_to_tangent((l, b), (l, b - rad), rad);
    path.arc_to_tangent((l, t), (l + rad, t), rad);
    path.close();
    canvas.clip_path(&path, skia::ClipOp::Intersect, true);

    if let Some(avatar) = avatar {
        draw_image_into(canvas, avatar, rect.content_rect());
    }
}

/// One horizontal line from `from_x` to `to_x` at `y`.
pub fn draw_divider(canvas: &skia::Canvas, from_x: f32, to_x: f32, y: f32, color: Option<skia::Color>) {
    let _state = SavedState::new(canvas);
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(1.0);
    paint.set_color(color.unwrap_or(DIVIDER_COLOR));
    canvas.draw_line((from_x, y), (to_x, y), &paint);
}

/// Draw the whole of `image` stretched into `dst`.
pub fn draw_image_into(canvas: &skia::Canvas, image: &skia::Image, dst: skia::Rect) {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    canvas.draw_image_rect(image, None, dst, &paint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Spacing;
    use crate::raster::Raster;

    fn solid_image(w: i32, h: i32, color: skia::Color) -> skia::Image {
        let mut r = Raster::new(w, h).unwrap();
        r.canvas().clear(color);
        r.snapshot()
    }

    fn pixel(px: &[u8], width: i32, x: i32, y: i32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [px[i], px[i + 1], px[i + 2], px[i + 3]]
    }

    #[test]
    fn rounded_rectangle_fills_inside_and_leaves_corners() {
        let mut raster = Raster::new(100, 60).unwrap();
        let rect = RectangleSpec::from_ltwh(10.0, 10.0, 80.0, 40.0, 10.0);
        draw_rounded_rectangle(raster.canvas(), &rect, Some(skia::Color::RED), None);
        let px = raster.to_rgba8().unwrap();
        assert_eq!(pixel(&px, 100, 50, 30), [255, 0, 0, 255]);
        // Outside the corner arc.
        assert_eq!(pixel(&px, 100, 11, 11)[3], 0);
        // Outside the rectangle.
        assert_eq!(pixel(&px, 100, 5, 30)[3], 0);
    }

    #[test]
    fn progress_bar_overlay_stops_at_progress() {
        let mut raster = Raster::new(220, 40).unwrap();
        let bar = RectangleSpec::from_ltwh(10.0, 10.0, 200.0, 20.0, 10.0).with_overlay(skia::Color::GREEN);
        draw_progress_bar(raster.canvas(), &bar, 0.5);
        let px = raster.to_rgba8().unwrap();
        assert_eq!(pixel(&px, 220, 60, 20), [0, 255, 0, 255]);
        assert_eq!(pixel(&px, 220, 160, 20), [0x23, 0x1e, 0x2b, 255]);
    }

    #[test]
    fn clip_does_not_leak_between_primitives() {
        let mut raster = Raster::new(60, 60).unwrap();
        let img = solid_image(8, 8, skia::Color::BLUE);
        draw_clipped_circle_image(raster.canvas(), &CircleSpec::new(10.0, 10.0, 5.0), Some(&img));
        draw_divider(raster.canvas(), 0.0, 60.0, 40.5, Some(skia::Color::WHITE));
        let px = raster.to_rgba8().unwrap();
        assert_eq!(pixel(&px, 60, 10, 10), [0, 0, 255, 255]);
        // Divider far outside the earlier circle clip still lands.
        assert_eq!(pixel(&px, 60, 50, 40), [255, 255, 255, 255]);
        // Image did not spill outside the circle.
        assert_eq!(pixel(&px, 60, 30, 10)[3], 0);
    }

    #[test]
    fn missing_images_draw_nothing() {
        let mut raster = Raster::new(20, 20).unwrap();
        draw_clipped_circle_image(raster.canvas(), &CircleSpec::new(10.0, 10.0, 8.0), None);
        let rect = RectangleSpec::from_ltwh(0.0, 0.0, 20.0, 20.0, 4.0);
        draw_clipped_rounded_avatar(raster.canvas(), &rect, None);
        draw_rounded_rectangle(raster.canvas(), &rect, Some(skia::Color::WHITE), None);
        let px = raster.to_rgba8().unwrap();
        // Avatar clip was released, so the later fill covers the center.
        assert_eq!(pixel(&px, 20, 10, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn circle_outline_is_stroked_outside_the_image() {
        let mut raster = Raster::new(60, 60).unwrap();
        let img = solid_image(8, 8, skia::Color::BLUE);
        let circle = CircleSpec::new(30.0, 30.0, 10.0).with_outline(skia::Color::RED, 4.0);
        draw_clipped_circle_image(raster.canvas(), &circle, Some(&img));
        let px = raster.to_rgba8().unwrap();
        assert_eq!(pixel(&px, 60, 30, 30), [0, 0, 255, 255]);
        // The image covers the inner half of the stroke.
        assert_eq!(pixel(&px, 60, 38, 30), [0, 0, 255, 255]);
        // Just outside the radius only the stroke shows.
        assert_eq!(pixel(&px, 60, 41, 30), [255, 0, 0, 255]);
        assert_eq!(pixel(&px, 60, 30, 18), [255, 0, 0, 255]);
        assert_eq!(pixel(&px, 60, 46, 30)[3], 0);
    }

    #[test]
    fn avatar_respects_padding() {
        let mut raster = Raster::new(40, 40).unwrap();
        let img = solid_image(4, 4, skia::Color::RED);
        let mut rect = RectangleSpec::from_ltwh(0.0, 0.0, 40.0, 40.0, 4.0);
        rect.padding = Spacing { left: 10.0, right: 10.0, top: 10.0, bottom: 10.0 };
        draw_clipped_rounded_avatar(raster.canvas(), &rect, Some(&img));
        let px = raster.to_rgba8().unwrap();
        assert_eq!(pixel(&px, 40, 20, 20), [255, 0, 0, 255]);
        assert_eq!(pixel(&px, 40, 5, 20)[3], 0);
    }

    #[test]
    fn avatar_is_clipped_to_rounded_corners() {
        let mut raster = Raster::new(40, 40).unwrap();
        let img = solid_image(4, 4, skia::Color::RED);
        let rect = RectangleSpec::from_ltwh(0.0, 0.0, 40.0, 40.0, 12.0);
        draw_clipped_rounded_avatar(raster.canvas(), &rect, Some(&img));
        let px = raster.to_rgba8().unwrap();
        assert_eq!(pixel(&px, 40, 20, 20), [255, 0, 0, 255]);
        assert_eq!(pixel(&px, 40, 0, 0)[3], 0);
    }
}
