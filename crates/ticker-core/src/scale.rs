// File: crates/ticker-core/src/scale.rs
// Summary: Index (X) and value (Y) scale transforms for the plot area.

/// Horizontal scale spreading `count` evenly spaced points across `[left, right]`.
#[derive(Clone, Copy, Debug)]
pub struct IndexScale {
    pub left_px: f32,
    pub right_px: f32,
    pub count: usize,
}

impl IndexScale {
    pub fn new(left_px: f32, right_px: f32, count: usize) -> Self {
        Self { left_px, right_px, count }
    }

    /// Pixel x of point `i`. A single point sits at the left edge.
    #[inline]
    pub fn to_px(&self, i: f64) -> f32 {
        if self.count < 2 {
            return self.left_px;
        }
        let step = (self.right_px - self.left_px) / (self.count - 1) as f32;
        self.left_px + i as f32 * step
    }
}

/// Vertical value scale mapping `[vmin, vmax]` to `[bottom, top]` pixels.
#[derive(Clone, Copy, Debug)]
pub struct ValueScale {
    pub top_px: f32,
    pub bottom_px: f32,
    pub vmin: f64,
    pub vmax: f64,
}

impl ValueScale {
    pub fn new_linear(top_px: f32, bottom_px: f32, vmin: f64, vmax: f64) -> Self {
        let mut s = Self { top_px, bottom_px, vmin, vmax };
        if (s.vmax - s.vmin).abs() < 1e-12 { s.vmax = s.vmin + 1.0; }
        s
    }

    #[inline]
    pub fn to_px(&self, y: f64) -> f32 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.bottom_px - ((y - self.vmin) / span) as f32 * (self.bottom_px - self.top_px)
    }

    #[inline]
    pub fn from_px(&self, py: f32) -> f64 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.vmin + ((self.bottom_px - py) / (self.bottom_px - self.top_px)) as f64 * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_scale_maps_extremes() {
        let s = ValueScale::new_linear(10.0, 110.0, 50.0, 150.0);
        assert_eq!(s.to_px(50.0), 110.0);
        assert_eq!(s.to_px(150.0), 10.0);
        assert!((s.from_px(60.0) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn flat_range_is_widened() {
        let s = ValueScale::new_linear(0.0, 100.0, 5.0, 5.0);
        assert_eq!(s.vmax, 6.0);
    }

    #[test]
    fn index_scale_spans_plot() {
        let s = IndexScale::new(0.0, 90.0, 4);
        assert_eq!(s.to_px(0.0), 0.0);
        assert_eq!(s.to_px(3.0), 90.0);
        assert_eq!(IndexScale::new(5.0, 90.0, 1).to_px(0.0), 5.0);
    }
}
