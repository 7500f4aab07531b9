// File: crates/ticker-core/src/theme.rs
// Summary: Light/Dark palettes for charts and ticker cards.

use skia_safe as skia;

use crate::types::ThemeKind;

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub kind: ThemeKind,
    /// Compact card container background.
    pub card_background: skia::Color,
    /// Tick labels, legend text and axis border.
    pub text: skia::Color,
    /// Card headline text (symbol and price).
    pub headline: skia::Color,
    pub grid: skia::Color,
    pub line_stroke: skia::Color,
    pub line_fill: skia::Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
            card_background: skia::Color::from_argb(255, 0x19, 0x19, 0x19),
            text: skia::Color::from_argb(255, 0x87, 0x8c, 0xa1),
            headline: skia::Color::WHITE,
            grid: skia::Color::from_argb(255, 40, 40, 45),
            line_stroke: skia::Color::from_argb(255, 96, 196, 136),
            line_fill: skia::Color::from_argb(26, 96, 196, 136),
        }
    }

    pub fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
            card_background: skia::Color::from_argb(255, 0xfa, 0xf4, 0xf2),
            text: skia::Color::from_argb(255, 0x51, 0x51, 0x51),
            headline: skia::Color::from_argb(255, 0x51, 0x51, 0x51),
            grid: skia::Color::from_argb(255, 230, 230, 235),
            line_stroke: skia::Color::from_argb(255, 96, 196, 136),
            line_fill: skia::Color::from_argb(26, 96, 196, 136),
        }
    }

    pub fn for_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self::dark(),
            ThemeKind::Light => Self::light(),
        }
    }
}
