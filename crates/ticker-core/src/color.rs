// File: crates/ticker-core/src/color.rs
// Summary: CSS color parsing, sentiment hues and two-color linear gradients.

use skia_safe as skia;

use crate::error::{Error, Result};

/// Ascending hue (`#56c9ac`).
pub const ASC_COLOR: skia::Color = skia::Color::from_argb(255, 0x56, 0xc9, 0xac);
/// Descending hue (`#ed5565`).
pub const DESC_COLOR: skia::Color = skia::Color::from_argb(255, 0xed, 0x55, 0x65);

/// Direction of a value's change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Ascending,
    Descending,
}

impl Sentiment {
    /// Non-negative changes are ascending.
    pub fn of_change(change: f64) -> Self {
        if change >= 0.0 { Sentiment::Ascending } else { Sentiment::Descending }
    }

    /// Trend of a series: last value compared with the first. Empty and
    /// single-point series count as ascending.
    pub fn of_series(values: &[f64]) -> Self {
        match (values.first(), values.last()) {
            (Some(first), Some(last)) => Self::of_change(last - first),
            _ => Sentiment::Ascending,
        }
    }

    pub fn color(&self) -> skia::Color {
        match self {
            Sentiment::Ascending => ASC_COLOR,
            Sentiment::Descending => DESC_COLOR,
        }
    }

    /// Faint vertical wash under a sparkline, in the sentiment hue.
    pub fn fill_gradient(&self) -> Gradient {
        let c = self.color();
        Gradient::vertical(with_alpha(c, 0.08), with_alpha(c, 0.02))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientDirection {
    TopToBottom,
    LeftToRight,
}

/// Two-stop linear gradient, resolved to a shader against concrete bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    pub start: skia::Color,
    pub end: skia::Color,
    pub direction: GradientDirection,
}

impl Gradient {
    pub fn new(start: skia::Color, end: skia::Color, direction: GradientDirection) -> Self {
        Self { start, end, direction }
    }

    pub fn vertical(start: skia::Color, end: skia::Color) -> Self {
        Self::new(start, end, GradientDirection::TopToBottom)
    }

    pub fn shader(&self, bounds: skia::Rect) -> Option<skia::Shader> {
        let (p0, p1) = match self.direction {
            GradientDirection::TopToBottom => (
                skia::Point::new(bounds.left, bounds.top),
                skia::Point::new(bounds.left, bounds.bottom),
            ),
            GradientDirection::LeftToRight => (
                skia::Point::new(bounds.left, bounds.top),
                skia::Point::new(bounds.right, bounds.top),
            ),
        };
        let colors = [self.start, self.end];
        skia::Shader::linear_gradient((p0, p1), &colors[..], None, skia::TileMode::Clamp, None, None)
    }
}

/// Solid color or gradient used to fill an area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    Solid(skia::Color),
    Gradient(Gradient),
}

impl Fill {
    /// Configure `paint` to use this fill over `bounds`.
    pub fn apply(&self, paint: &mut skia::Paint, bounds: skia::Rect) {
        match self {
            Fill::Solid(c) => {
                paint.set_color(*c);
            }
            Fill::Gradient(g) => {
                paint.set_color(skia::Color::BLACK);
                paint.set_shader(g.shader(bounds));
            }
        }
    }
}

/// Replace the alpha channel with `alpha` in `0.0..=1.0`.
pub fn with_alpha(c: skia::Color, alpha: f32) -> skia::Color {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    skia::Color::from_argb(a, c.r(), c.g(), c.b())
}

/// Parse a CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`,
/// `rgba(r,g,b,a)` or one of `white`, `black`, `transparent`.
pub fn parse_css_color(input: &str) -> Result<skia::Color> {
    let s = input.trim();
    let bad = || Error::config(format!("unparsable color '{input}'"));

    match s.to_ascii_lowercase().as_str() {
        "white" => return Ok(skia::Color::WHITE),
        "black" => return Ok(skia::Color::BLACK),
        "transparent" => return Ok(skia::Color::TRANSPARENT),
        _ => {}
    }

    if let Some(hex) = s.strip_prefix('#') {
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| bad());
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        if !hex.is_ascii() {
            return Err(bad());
        }
        return match hex.len() {
            3 => Ok(skia::Color::from_rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            6 => Ok(skia::Color::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(skia::Color::from_argb(byte(6)?, byte(0)?, byte(2)?, byte(4)?)),
            _ => Err(bad()),
        };
    }

    let lower = s.to_ascii_lowercase();
    let body = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(bad)?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let channel = |p: &str| -> Result<u8> {
        let v: f32 = p.parse().map_err(|_| bad())?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };
    match parts.as_slice() {
        [r, g, b] => Ok(skia::Color::from_rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha: f32 = a.parse().map_err(|_| bad())?;
            Ok(with_alpha(skia::Color::from_rgb(channel(r)?, channel(g)?, channel(b)?), alpha))
        }
        _ => Err(bad()),
    }
}
