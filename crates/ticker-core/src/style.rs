// File: crates/ticker-core/src/style.rs
// Summary: Layered chart style resolution (theme -> sentiment -> token override -> caller override).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use skia_safe as skia;

use crate::color::{parse_css_color, with_alpha, Fill, Sentiment};
use crate::error::{Error, Result};
use crate::theme::Theme;

/// Opacity of the area wash under a sentiment-colored line.
const SENTIMENT_FILL_ALPHA: f32 = 0.1;

/// Resolved colors for one chart render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleConfig {
    /// Tick labels, legend text, axis border.
    pub text: skia::Color,
    pub border: skia::Color,
    pub fill: Option<Fill>,
    pub background: skia::Color,
    pub grid: skia::Color,
}

impl StyleConfig {
    /// Theme defaults. Sparklines carry no fill unless a later layer adds one.
    /// Charts are transparent unless an override sets a background.
    pub fn from_theme(theme: &Theme, line_only: bool) -> Self {
        Self {
            text: theme.text,
            border: theme.line_stroke,
            fill: if line_only { None } else { Some(Fill::Solid(theme.line_fill)) },
            background: skia::Color::TRANSPARENT,
            grid: theme.grid,
        }
    }
}

/// Partial style. Unset fields fall through to lower-precedence layers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StyleOverride {
    pub text: Option<skia::Color>,
    pub border: Option<skia::Color>,
    pub fill: Option<Fill>,
    pub background: Option<skia::Color>,
}

impl StyleOverride {
    pub fn border(color: skia::Color) -> Self {
        Self { border: Some(color), ..Self::default() }
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    fn apply(&self, base: &mut StyleConfig) {
        if let Some(c) = self.text { base.text = c; }
        if let Some(c) = self.border { base.border = c; }
        if let Some(f) = self.fill { base.fill = Some(f); }
        if let Some(c) = self.background { base.background = c; }
    }
}

/// Sources of style, lowest precedence first.
#[derive(Clone, Copy, Debug)]
pub enum StyleLayer<'a> {
    Theme(&'a Theme, bool),
    Sentiment(Sentiment),
    Token(Option<&'a StyleOverride>),
    Caller(Option<&'a StyleOverride>),
}

impl StyleLayer<'_> {
    fn rank(&self) -> u8 {
        match self {
            StyleLayer::Theme(..) => 0,
            StyleLayer::Sentiment(_) => 1,
            StyleLayer::Token(_) => 2,
            StyleLayer::Caller(_) => 3,
        }
    }
}

/// Fold style layers in precedence order, regardless of the order given.
/// Without a theme layer the dark theme is the base.
pub fn resolve(layers: &[StyleLayer<'_>]) -> StyleConfig {
    let mut ordered: Vec<&StyleLayer<'_>> = layers.iter().collect();
    ordered.sort_by_key(|l| l.rank());

    let dark = Theme::dark();
    let mut style = StyleConfig::from_theme(&dark, false);
    for layer in ordered {
        match layer {
            StyleLayer::Theme(theme, line_only) => style = StyleConfig::from_theme(theme, *line_only),
            StyleLayer::Sentiment(s) => {
                style.border = s.color();
                // Recolor an existing area wash; sparklines stay unfilled.
                if style.fill.is_some() {
                    style.fill = Some(Fill::Solid(with_alpha(s.color(), SENTIMENT_FILL_ALPHA)));
                }
            }
            StyleLayer::Token(Some(o)) | StyleLayer::Caller(Some(o)) => o.apply(&mut style),
            StyleLayer::Token(None) | StyleLayer::Caller(None) => {}
        }
    }
    style
}

/// Color overrides in configuration form (CSS color strings).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct StyleOverrideConfig {
    pub text_color: Option<String>,
    pub border_color: Option<String>,
    pub background_color: Option<String>,
}

impl StyleOverrideConfig {
    pub fn parse(&self) -> Result<StyleOverride> {
        let parse = |v: &Option<String>| v.as_deref().map(parse_css_color).transpose();
        Ok(StyleOverride {
            text: parse(&self.text_color)?,
            border: parse(&self.border_color)?,
            fill: parse(&self.background_color)?.map(Fill::Solid),
            background: None,
        })
    }
}

/// Per-token style overrides keyed by token identifier (case-insensitive).
#[derive(Clone, Debug, Default)]
pub struct TokenPalette {
    entries: HashMap<String, StyleOverride>,
}

impl TokenPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token_id: &str, style: StyleOverride) {
        self.entries.insert(token_id.to_ascii_lowercase(), style);
    }

    pub fn get(&self, token_id: &str) -> Option<&StyleOverride> {
        self.entries.get(&token_id.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse `{ "<token id>": { "border_color": "...", ... }, ... }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, StyleOverrideConfig> =
            serde_json::from_str(json).map_err(|e| Error::config(format!("token palette: {e}")))?;
        let mut palette = Self::new();
        for (id, cfg) in raw {
            palette.insert(&id, cfg.parse()?);
        }
        Ok(palette)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ASC_COLOR, DESC_COLOR};

    #[test]
    fn precedence_is_fixed_regardless_of_layer_order() {
        let theme = Theme::light();
        let token = StyleOverride::border(skia::Color::from_rgb(247, 147, 26));
        let style = resolve(&[
            StyleLayer::Token(Some(&token)),
            StyleLayer::Sentiment(Sentiment::Descending),
            StyleLayer::Theme(&theme, false),
        ]);
        assert_eq!(style.border, skia::Color::from_rgb(247, 147, 26));
        assert_eq!(style.text, theme.text);
    }

    #[test]
    fn caller_beats_token_and_sentiment_beats_theme() {
        let theme = Theme::dark();
        let token = StyleOverride::border(skia::Color::BLACK);
        let caller = StyleOverride::border(skia::Color::WHITE);
        let style = resolve(&[
            StyleLayer::Theme(&theme, false),
            StyleLayer::Caller(Some(&caller)),
            StyleLayer::Token(Some(&token)),
        ]);
        assert_eq!(style.border, skia::Color::WHITE);

        let style = resolve(&[StyleLayer::Theme(&theme, false), StyleLayer::Sentiment(Sentiment::Ascending)]);
        assert_eq!(style.border, ASC_COLOR);
        let style = resolve(&[StyleLayer::Sentiment(Sentiment::Descending)]);
        assert_eq!(style.border, DESC_COLOR);
    }

    #[test]
    fn line_only_theme_has_no_fill() {
        let style = resolve(&[StyleLayer::Theme(&Theme::dark(), true)]);
        assert!(style.fill.is_none());
        let style = resolve(&[StyleLayer::Theme(&Theme::dark(), true), StyleLayer::Sentiment(Sentiment::Descending)]);
        assert!(style.fill.is_none());
    }

    #[test]
    fn sentiment_recolors_the_area_wash() {
        let style = resolve(&[StyleLayer::Theme(&Theme::dark(), false), StyleLayer::Sentiment(Sentiment::Descending)]);
        assert_eq!(style.fill, Some(Fill::Solid(with_alpha(DESC_COLOR, 0.1))));

        // A token fill still wins over the sentiment wash.
        let token = StyleOverride::default().with_fill(Fill::Solid(skia::Color::BLUE));
        let style = resolve(&[
            StyleLayer::Theme(&Theme::light(), false),
            StyleLayer::Sentiment(Sentiment::Descending),
            StyleLayer::Token(Some(&token)),
        ]);
        assert_eq!(style.fill, Some(Fill::Solid(skia::Color::BLUE)));
    }

    #[test]
    fn charts_are_transparent_unless_overridden() {
        let style = resolve(&[StyleLayer::Theme(&Theme::dark(), false)]);
        assert_eq!(style.background, skia::Color::TRANSPARENT);
        let caller = StyleOverride { background: Some(skia::Color::WHITE), ..StyleOverride::default() };
        let style = resolve(&[StyleLayer::Theme(&Theme::dark(), false), StyleLayer::Caller(Some(&caller))]);
        assert_eq!(style.background, skia::Color::WHITE);
    }

    #[test]
    fn palette_from_json() {
        let palette = TokenPalette::from_json(
            r##"{ "Bitcoin": { "border_color": "#f7931a", "background_color": "rgba(247,147,26,0.1)" } }"##,
        )
        .unwrap();
        let o = palette.get("bitcoin").unwrap();
        assert_eq!(o.border, Some(skia::Color::from_rgb(0xf7, 0x93, 0x1a)));
        assert!(matches!(o.fill, Some(Fill::Solid(_))));
        assert!(TokenPalette::from_json(r#"{ "x": { "border_color": "nope" } }"#).is_err());
    }
}
