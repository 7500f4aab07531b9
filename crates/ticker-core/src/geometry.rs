// File: crates/ticker-core/src/geometry.rs
// Summary: Shape specs (rectangles, circles), rounded outlines and progress-bar math.

use skia_safe as skia;

use crate::error::{Error, Result};

/// Closed interval along one axis, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub from: f32,
    pub to: f32,
}

impl Interval {
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }
    pub fn len(&self) -> f32 {
        self.to - self.from
    }
}

/// Optional margin/padding offsets carried with a rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spacing {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Rounded rectangle.
/// Contract: `from <= to` on both axes and `radius <= min(w, h) / 2`
/// (checked by [`RectangleSpec::validate`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectangleSpec {
    pub x: Interval,
    pub y: Interval,
    pub radius: f32,
    pub fill: Option<skia::Color>,
    /// Border color for plain rectangles, progress color for progress bars.
    pub overlay: Option<skia::Color>,
    pub margin: Spacing,
    pub padding: Spacing,
}

impl RectangleSpec {
    pub fn new(x: Interval, y: Interval, radius: f32) -> Self {
        Self {
            x,
            y,
            radius,
            fill: None,
            overlay: None,
            margin: Spacing::default(),
            padding: Spacing::default(),
        }
    }

    pub fn from_ltwh(left: f32, top: f32, width: f32, height: f32, radius: f32) -> Self {
        Self::new(Interval::new(left, left + width), Interval::new(top, top + height), radius)
    }

    pub fn with_fill(mut self, color: skia::Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn with_overlay(mut self, color: skia::Color) -> Self {
        self.overlay = Some(color);
        self
    }

    pub fn width(&self) -> f32 { self.x.len() }
    pub fn height(&self) -> f32 { self.y.len() }

    pub fn to_rect(&self) -> skia::Rect {
        skia::Rect::from_ltrb(self.x.from, self.y.from, self.x.to, self.y.to)
    }

    /// Area inside the padding offsets.
    pub fn content_rect(&self) -> skia::Rect {
        skia::Rect::from_ltrb(
            self.x.from + self.padding.left,
            self.y.from + self.padding.top,
            self.x.to - self.padding.right,
            self.y.to - self.padding.bottom,
        )
    }

    /// Check the rectangle invariants. Degenerate geometry is rejected here
    /// rather than drawn distorted.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.x.from, self.x.to, self.y.from, self.y.to, self.radius]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::config("rectangle has non-finite coordinates"));
        }
        if self.x.from > self.x.to || self.y.from > self.y.to {
            return Err(Error::config(format!(
                "rectangle intervals must satisfy from <= to (x: {}..{}, y: {}..{})",
                self.x.from, self.x.to, self.y.from, self.y.to
            )));
        }
        let max_radius = (self.width() / 2.0).min(self.height() / 2.0);
        if self.radius < 0.0 || self.radius > max_radius {
            return Err(Error::config(format!(
                "corner radius {} outside 0..={}",
                self.radius, max_radius
            )));
        }
        Ok(())
    }
}

/// Circle with optional outline stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleSpec {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub outline_color: Option<skia::Color>,
    pub outline_width: Option<f32>,
}

impl CircleSpec {
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius, outline_color: None, outline_width: None }
    }

    pub fn with_outline(mut self, color: skia::Color, width: f32) -> Self {
        self.outline_color = Some(color);
        self.outline_width = Some(width);
        self
    }

    /// Square circumscribing the circle.
    pub fn bounds(&self) -> skia::Rect {
        skia::Rect::from_ltrb(
            self.x - self.radius,
            self.y - self.radius,
            self.x + self.radius,
            self.y + self.radius,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(Error::config(format!("circle radius must be > 0, got {}", self.radius)));
        }
        Ok(())
    }
}

/// One segment of an outline path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    /// Arc along the circle at `center` with `radius`, angles in degrees
    /// (0 = +x, clockwise in screen space).
    Arc { center: (f32, f32), radius: f32, start_deg: f32, sweep_deg: f32 },
    Close,
}

/// Outline of a rounded rectangle: four edges and four quarter-circle
/// corners, clockwise from the top-left.
pub fn rounded_outline(rect: &RectangleSpec) -> Vec<PathSegment> {
    let r = rect.radius;
    let (l, t, rt, b) = (rect.x.from, rect.y.from, rect.x.to, rect.y.to);
    vec![
        PathSegment::MoveTo(l + r, t),
        PathSegment::LineTo(rt - r, t),
        PathSegment::Arc { center: (rt - r, t + r), radius: r, start_deg: 270.0, sweep_deg: 90.0 },
        PathSegment::LineTo(rt, b - r),
        PathSegment::Arc { center: (rt - r, b - r), radius: r, start_deg: 0.0, sweep_deg: 90.0 },
        PathSegment::LineTo(l + r, b),
        PathSegment::Arc { center: (l + r, b - r), radius: r, start_deg: 90.0, sweep_deg: 90.0 },
        PathSegment::LineTo(l, t + r),
        PathSegment::Arc { center: (l + r, t + r), radius: r, start_deg: 180.0, sweep_deg: 90.0 },
        PathSegment::Close,
    ]
}

/// Convert outline segments into a Skia path.
pub fn to_skia_path(segments: &[PathSegment]) -> skia::Path {
    let mut path = skia::Path::new();
    for seg in segments {
        match *seg {
            PathSegment::MoveTo(x, y) => {
                path.move_to((x, y));
            }
            PathSegment::LineTo(x, y) => {
                path.line_to((x, y));
            }
            PathSegment::Arc { center: (cx, cy), radius, start_deg, sweep_deg } => {
                let oval = skia::Rect::from_ltrb(cx - radius, cy - radius, cx + radius, cy + radius);
                path.arc_to(oval, start_deg, sweep_deg, false);
            }
            PathSegment::Close => {
                path.close();
            }
        }
    }
    path
}

/// Axis-aligned bounds of an outline, counting full arc extents only where
/// the arc actually sweeps through them.
#[cfg(test)]
fn outline_bounds(segments: &[PathSegment]) -> Option<skia::Rect> {
    let mut pts: Vec<(f32, f32)> = Vec::new();
    for seg in segments {
        match *seg {
            PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y) => pts.push((x, y)),
            PathSegment::Arc { center: (cx, cy), radius, start_deg, sweep_deg } => {
                let at = |deg: f32| {
                    let rad = deg.to_radians();
                    (cx + radius * rad.cos(), cy + radius * rad.sin())
                };
                pts.push(at(start_deg));
                pts.push(at(start_deg + sweep_deg));
                // Cardinal extremes crossed by the sweep.
                let mut k = (start_deg / 90.0).ceil() * 90.0;
                while k < start_deg + sweep_deg {
                    pts.push(at(k));
                    k += 90.0;
                }
            }
            PathSegment::Close => {}
        }
    }
    let (first, rest) = pts.split_first()?;
    let mut r = skia::Rect::from_ltrb(first.0, first.1, first.0, first.1);
    for &(x, y) in rest {
        r.left = r.left.min(x);
        r.top = r.top.min(y);
        r.right = r.right.max(x);
        r.bottom = r.bottom.max(y);
    }
    Some(r)
}

/// Filled portion of a progress bar, or `None` when nothing is filled.
/// The right edge never comes closer to the left edge than `2 * radius`.
pub fn progress_overlay(container: &RectangleSpec, progress: f32) -> Option<RectangleSpec> {
    let progress = clamp(if progress.is_nan() { 0.0 } else { progress }, 0.0, 1.0);
    if progress == 0.0 {
        return None;
    }
    let mut overlay = *container;
    overlay.x.to = (container.x.from + container.radius * 2.0)
        .max(container.x.from + container.width() * progress);
    overlay.fill = container.overlay;
    Some(overlay)
}

#[inline]
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo { lo } else if v > hi { hi } else { v }
}
