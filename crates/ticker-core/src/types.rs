// File: crates/ticker-core/src/types.rs
// Summary: Shared types and constants (chart sizes, card sizes, insets, theme/size selectors).

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Large chart surface, used for the full ticker card.
pub const LARGE_WIDTH: i32 = 660;
pub const LARGE_HEIGHT: i32 = 500;

/// Small chart surface, used for sparklines.
pub const SMALL_WIDTH: i32 = 456;
pub const SMALL_HEIGHT: i32 = 200;

/// Compact ticker card surface.
pub const COMPACT_WIDTH: i32 = 236;
pub const COMPACT_HEIGHT: i32 = 133;

/// Screen margins, in pixels.
/// Contract: all fields are non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
    /// Uniform inset on every side.
    pub const fn uniform(v: u32) -> Self {
        Self::new(v, v, v, v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

impl ThemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
        }
    }
}

impl FromStr for ThemeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(ThemeKind::Dark),
            "light" => Ok(ThemeKind::Light),
            other => Err(Error::config(format!("unknown theme '{other}'"))),
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ChartSize {
    #[default]
    Large,
    Small,
}

impl ChartSize {
    /// Pixel dimensions (width, height) of the chart surface.
    pub const fn dimensions(&self) -> (i32, i32) {
        match self {
            ChartSize::Large => (LARGE_WIDTH, LARGE_HEIGHT),
            ChartSize::Small => (SMALL_WIDTH, SMALL_HEIGHT),
        }
    }

    /// Tick and legend font size.
    pub const fn font_size(&self) -> f32 {
        match self {
            ChartSize::Large => 16.0,
            ChartSize::Small => 12.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartSize::Large => "large",
            ChartSize::Small => "small",
        }
    }
}

impl FromStr for ChartSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "large" => Ok(ChartSize::Large),
            "small" => Ok(ChartSize::Small),
            other => Err(Error::config(format!("unknown size '{other}'"))),
        }
    }
}

impl fmt::Display for ChartSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_theme_and_size() {
        assert_eq!("Dark".parse::<ThemeKind>().unwrap(), ThemeKind::Dark);
        assert_eq!(" light ".parse::<ThemeKind>().unwrap(), ThemeKind::Light);
        assert!("sepia".parse::<ThemeKind>().is_err());
        assert_eq!("small".parse::<ChartSize>().unwrap().dimensions(), (456, 200));
        assert_eq!(ChartSize::Large.dimensions(), (660, 500));
    }
}
