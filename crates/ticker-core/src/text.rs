// File: crates/ticker-core/src/text.rs
// Summary: Paragraph text shaper over Skia textlayout with an optionally registered font family.

use std::path::Path;
use std::sync::Arc;

use skia_safe as skia;
use skia::textlayout::{
    FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextAlign, TextStyle,
    TypefaceFontProvider,
};
use tracing::{debug, warn};

/// Font family loaded once at startup. Cheap to clone and shareable across
/// threads; each render builds its own [`TextShaper`] from it.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    family: Option<String>,
    data: Option<Arc<[u8]>>,
}

impl FontRegistry {
    /// No registered family; system fonts only.
    pub fn system() -> Self {
        Self::default()
    }

    /// Read the font file at `path` for `family`. A missing file degrades to
    /// system fonts with a warning.
    pub fn from_file(path: impl AsRef<Path>, family: &str) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(bytes, family),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "font file unavailable; using system fonts");
                Self::system()
            }
        }
    }

    pub fn from_bytes(bytes: Vec<u8>, family: &str) -> Self {
        Self { family: Some(family.to_string()), data: Some(Arc::from(bytes)) }
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Fresh shaper with this registry's family installed.
    pub fn shaper(&self) -> TextShaper {
        match (&self.data, &self.family) {
            (Some(data), Some(family)) => TextShaper::with_font_bytes(data, family),
            _ => TextShaper::new(),
        }
    }
}

/// Font request for one run of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub const fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }
    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }
}

/// Shapes, measures and paints text. Registered families take priority,
/// then common sans-serif families from the system font manager.
pub struct TextShaper {
    fonts: FontCollection,
    families: Vec<String>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    /// Shaper backed by system fonts only.
    pub fn new() -> Self {
        let mut fc = FontCollection::new();
        fc.set_default_font_manager(skia::FontMgr::default(), None);
        Self { fonts: fc, families: Self::fallback_families() }
    }

    pub fn with_font_bytes(bytes: &[u8], family: &str) -> Self {
        let mut shaper = Self::new();
        let Some(typeface) = skia::FontMgr::default().new_from_data(bytes, None) else {
            warn!(family, "font data could not be decoded; using system fonts");
            return shaper;
        };
        let mut provider = TypefaceFontProvider::new();
        provider.register_typeface(typeface, Some(family));
        let mgr: skia::FontMgr = provider.into();
        shaper.fonts.set_asset_font_manager(Some(mgr));
        shaper.families.insert(0, family.to_string());
        debug!(family, "registered font family");
        shaper
    }

    fn fallback_families() -> Vec<String> {
        ["Inter", "Segoe UI", "Arial", "Helvetica", "Roboto", "DejaVu Sans", "sans-serif"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn make_style(&self, font: FontSpec, color: skia::Color) -> TextStyle {
        let mut ts = TextStyle::new();
        ts.set_font_size(font.size.max(1.0));
        ts.set_color(color);
        ts.set_font_families(&self.families);
        if font.bold {
            ts.set_font_style(skia::FontStyle::bold());
        }
        ts
    }

    pub fn layout(&self, text: &str, font: FontSpec, color: skia::Color) -> Paragraph {
        let mut pstyle = ParagraphStyle::new();
        pstyle.set_text_align(TextAlign::Left);
        let mut builder = ParagraphBuilder::new(&pstyle, &self.fonts);
        let style = self.make_style(font, color);
        builder.push_style(&style);
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    /// Advance width of the longest line.
    pub fn measure_width(&self, text: &str, font: FontSpec) -> f32 {
        self.layout(text, font, skia::Color::TRANSPARENT).longest_line()
    }

    /// Paint with the alphabetic baseline at `y`.
    pub fn draw_left(&self, canvas: &skia::Canvas, text: &str, x: f32, y: f32, font: FontSpec, color: skia::Color) {
        let mut p = self.layout(text, font, color);
        let baseline = p.alphabetic_baseline();
        p.paint(canvas, (x, y - baseline));
    }

    /// Paint so the text ends at `right`, baseline at `y`.
    pub fn draw_right(&self, canvas: &skia::Canvas, text: &str, right: f32, y: f32, font: FontSpec, color: skia::Color) {
        let w = self.measure_width(text, font);
        self.draw_left(canvas, text, right - w, y, font, color);
    }

    /// Paint horizontally centered on `cx`, baseline at `y`.
    pub fn draw_centered(&self, canvas: &skia::Canvas, text: &str, cx: f32, y: f32, font: FontSpec, color: skia::Color) {
        let w = self.measure_width(text, font);
        self.draw_left(canvas, text, cx - w / 2.0, y, font, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_falls_back() {
        let registry = FontRegistry::from_file("does/not/exist.ttf", "Inter");
        assert!(registry.family().is_none());
        let shaper = registry.shaper();
        assert_eq!(shaper.families[0], "Inter");
        assert!(shaper.measure_width("", FontSpec::regular(14.0)) >= 0.0);
    }

    #[test]
    fn undecodable_font_bytes_fall_back() {
        let shaper = FontRegistry::from_bytes(vec![0, 1, 2, 3], "Broken").shaper();
        assert_ne!(shaper.families[0], "Broken");
    }

    #[test]
    fn longer_text_is_not_narrower() {
        let shaper = TextShaper::new();
        let short = shaper.measure_width("1", FontSpec::bold(18.0));
        let long = shaper.measure_width("$64,000.00", FontSpec::bold(18.0));
        assert!(long >= short);
    }
}
