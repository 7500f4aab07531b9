// File: crates/ticker-core/src/card.rs
// Summary: Composite renderer; assembles full and compact ticker cards into PNG bytes.
// Notes:
// - Avatars are resolved through the shared `ImageCache` before any drawing;
//   after that the render is synchronous and owns its canvas.
// - Each element is drawn under its own save/restore, so order only sets z-order.

use std::sync::Arc;
use std::time::Instant;

use skia_safe as skia;
use tracing::debug;

use crate::chart::{render_line_chart, ChartRequest, LineChart, RenderOptions};
use crate::color::{Fill, Sentiment};
use crate::config::RenderConfig;
use crate::draw::{draw_clipped_circle_image, draw_image_into, draw_rounded_rectangle};
use crate::error::{Error, Result};
use crate::format::{format_currency, format_percent};
use crate::geometry::{CircleSpec, RectangleSpec};
use crate::image_cache::{HttpFetcher, ImageCache};
use crate::raster::Raster;
use crate::series::Series;
use crate::style::{resolve, StyleConfig, StyleLayer, StyleOverride, TokenPalette};
use crate::text::{FontRegistry, FontSpec, TextShaper};
use crate::theme::Theme;
use crate::types::{ChartSize, ThemeKind, COMPACT_HEIGHT, COMPACT_WIDTH};

const CARD_RADIUS: f32 = 2.0;
const SYMBOL_FONT: FontSpec = FontSpec::bold(18.0);
const PRICE_FONT: FontSpec = FontSpec::bold(18.0);
const PERCENT_FONT: FontSpec = FontSpec::regular(14.0);
const TEXT_RIGHT_MARGIN: f32 = 10.0;
const HEADLINE_BASELINE: f32 = 26.0;
const PERCENT_BASELINE: f32 = 46.0;
const SUB_CHART_TOP: f32 = 50.0;

/// Input of the full ticker card.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenChartData {
    /// Palette lookup key.
    pub token_id: String,
    pub symbol: String,
    pub currency: String,
    /// Start and end of the charted window, as display text.
    pub from: String,
    pub to: String,
    pub series: Series,
    /// Caller override, the highest style layer.
    pub style: Option<StyleOverride>,
}

impl TokenChartData {
    /// `"{SYMBOL}/{CURRENCY} | {from} → {to}"`
    pub fn chart_label(&self) -> String {
        format!(
            "{}/{} | {} → {}",
            self.symbol.to_uppercase(),
            self.currency.to_uppercase(),
            self.from,
            self.to
        )
    }
}

/// Input of the compact ticker card.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactCardData {
    pub symbol: String,
    /// Avatar URL; blank or missing skips the avatar.
    pub image: Option<String>,
    pub current_price: f64,
    /// Percentage change over the sparkline window, e.g. `-3.2`.
    pub change_percent: f64,
    pub sparkline: Series,
}

impl CompactCardData {
    fn validate(&self) -> Result<()> {
        if !self.current_price.is_finite() {
            return Err(Error::config(format!("current price {} is not finite", self.current_price)));
        }
        if !self.change_percent.is_finite() {
            return Err(Error::config(format!("change {} is not finite", self.change_percent)));
        }
        Ok(())
    }
}

/// Element placement and text of one compact card, computed before drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactLayout {
    pub container: RectangleSpec,
    pub avatar: CircleSpec,
    pub symbol: String,
    pub symbol_origin: (f32, f32),
    pub headline_color: skia::Color,
    pub price: String,
    /// Price and percentage text end here.
    pub text_right: f32,
    pub price_baseline: f32,
    pub percent: String,
    pub percent_baseline: f32,
    pub sentiment: Sentiment,
    pub chart_rect: skia::Rect,
}

impl CompactLayout {
    pub fn new(data: &CompactCardData, theme: &Theme) -> Self {
        let container = RectangleSpec::from_ltwh(0.0, 0.0, COMPACT_WIDTH as f32, COMPACT_HEIGHT as f32, CARD_RADIUS)
            .with_fill(theme.card_background);
        Self {
            avatar: CircleSpec::new(20.0, 20.0, 12.0),
            symbol: data.symbol.to_uppercase(),
            symbol_origin: (36.0, HEADLINE_BASELINE),
            headline_color: theme.headline,
            price: format_currency(data.current_price),
            text_right: container.x.to - TEXT_RIGHT_MARGIN,
            price_baseline: HEADLINE_BASELINE,
            percent: format_percent(data.change_percent),
            percent_baseline: PERCENT_BASELINE,
            sentiment: Sentiment::of_change(data.change_percent),
            chart_rect: skia::Rect::from_ltrb(container.x.from, SUB_CHART_TOP, container.x.to, container.y.to),
            container,
        }
    }

    pub fn percent_color(&self) -> skia::Color {
        self.sentiment.color()
    }
}

/// Shared rendering context: fonts, the remote image cache and token colors.
pub struct Compositor {
    fonts: FontRegistry,
    images: Arc<ImageCache>,
    palette: TokenPalette,
}

impl Compositor {
    pub fn new(fonts: FontRegistry, images: Arc<ImageCache>, palette: TokenPalette) -> Self {
        Self { fonts, images, palette }
    }

    /// Fonts, HTTP image fetching and the optional token palette from `cfg`.
    pub fn from_config(cfg: &RenderConfig) -> Result<Self> {
        let fonts = FontRegistry::from_file(&cfg.font_path, &cfg.font_family);
        let fetcher = Arc::new(HttpFetcher::new(cfg.fetch_timeout)?);
        let images = Arc::new(ImageCache::new(fetcher, cfg.image_cache_capacity));
        let palette = match &cfg.token_palette {
            Some(path) => TokenPalette::from_file(path)?,
            None => TokenPalette::new(),
        };
        debug!(tokens = palette.len(), family = ?fonts.family(), "compositor ready");
        Ok(Self::new(fonts, images, palette))
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    pub fn palette(&self) -> &TokenPalette {
        &self.palette
    }

    /// Style of the full card: theme, series trend, token palette, caller.
    pub fn token_style(&self, data: &TokenChartData, theme: ThemeKind) -> StyleConfig {
        let theme = Theme::for_kind(theme);
        resolve(&[
            StyleLayer::Theme(&theme, false),
            StyleLayer::Sentiment(data.series.sentiment()),
            StyleLayer::Token(self.palette.get(&data.token_id)),
            StyleLayer::Caller(data.style.as_ref()),
        ])
    }

    /// Line chart of the token's series with its pair/window label.
    pub fn render_token_card(&self, data: &TokenChartData, theme: ThemeKind, size: ChartSize) -> Result<Vec<u8>> {
        let style = self.token_style(data, theme);
        let request = ChartRequest { label: Some(data.chart_label()), theme, size, line_only: false };
        render_line_chart(&data.series, &style, &request, &self.fonts.shaper())
    }

    /// 236x133 card: avatar, symbol, price, change and a sparkline strip.
    pub async fn render_compact_token_card(&self, data: &CompactCardData, theme: ThemeKind) -> Result<Vec<u8>> {
        data.validate()?;
        let avatar = self.images.get_optional(data.image.as_deref()).await?;
        self.draw_compact_token_card(data, theme, avatar.as_ref())
    }

    /// Synchronous half of [`Compositor::render_compact_token_card`] with the
    /// avatar already decoded.
    pub fn draw_compact_token_card(
        &self,
        data: &CompactCardData,
        theme: ThemeKind,
        avatar: Option<&skia::Image>,
    ) -> Result<Vec<u8>> {
        data.validate()?;
        let started = Instant::now();
        let theme = Theme::for_kind(theme);
        let layout = CompactLayout::new(data, &theme);
        layout.container.validate()?;

        let shaper = self.fonts.shaper();
        let chart = sparkline_image(&data.sparkline, &theme, layout.sentiment, &shaper)?;

        let mut raster = Raster::from_f32(layout.container.width(), layout.container.height())?;
        let canvas = raster.canvas();
        draw_rounded_rectangle(canvas, &layout.container, layout.container.fill, None);

        let (sx, sy) = layout.symbol_origin;
        shaper.draw_left(canvas, &layout.symbol, sx, sy, SYMBOL_FONT, layout.headline_color);
        draw_clipped_circle_image(canvas, &layout.avatar, avatar);
        shaper.draw_right(canvas, &layout.price, layout.text_right, layout.price_baseline, PRICE_FONT, layout.headline_color);
        shaper.draw_right(canvas, &layout.percent, layout.text_right, layout.percent_baseline, PERCENT_FONT, layout.percent_color());
        draw_image_into(canvas, &chart, layout.chart_rect);

        let png = raster.into_png()?;
        debug!(
            symbol = %layout.symbol,
            bytes = png.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "rendered compact card"
        );
        Ok(png)
    }
}

/// Small line-only chart on a transparent background, colored by `sentiment`
/// with a faint gradient wash.
fn sparkline_image(series: &Series, theme: &Theme, sentiment: Sentiment, shaper: &TextShaper) -> Result<skia::Image> {
    let wash = StyleOverride {
        fill: Some(Fill::Gradient(sentiment.fill_gradient())),
        ..StyleOverride::border(sentiment.color())
    };
    let style = resolve(&[
        StyleLayer::Theme(theme, true),
        StyleLayer::Sentiment(sentiment),
        StyleLayer::Caller(Some(&wash)),
    ]);
    let request = ChartRequest { label: None, theme: theme.kind, size: ChartSize::Small, line_only: true };
    LineChart::new(series).render_image(&RenderOptions::for_request(&request, style), shaper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ASC_COLOR, DESC_COLOR};
    use crate::raster::Raster;

    fn compact(change: f64, values: Vec<f64>) -> CompactCardData {
        CompactCardData {
            symbol: "btc".into(),
            image: None,
            current_price: 64123.4,
            change_percent: change,
            sparkline: Series::from_values(values).unwrap(),
        }
    }

    fn compositor() -> Compositor {
        let fetcher = Arc::new(HttpFetcher::new(std::time::Duration::from_secs(1)).unwrap());
        let images = Arc::new(ImageCache::new(fetcher, std::num::NonZeroUsize::new(4).unwrap()));
        Compositor::new(FontRegistry::system(), images, TokenPalette::new())
    }

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory(png).unwrap().to_rgba8()
    }

    fn is_reddish(px: &image::Rgba<u8>) -> bool {
        let [r, g, b, _] = px.0.map(i32::from);
        r > g + 80 && r > b + 60
    }

    #[test]
    fn compact_layout_places_elements() {
        let layout = CompactLayout::new(&compact(-3.2, vec![3.0, 2.0]), &Theme::dark());
        assert_eq!(layout.symbol, "BTC");
        assert_eq!(layout.percent, "-3.20%");
        assert_eq!(layout.price, "$64,123.40");
        assert_eq!(layout.percent_color(), DESC_COLOR);
        assert_eq!(layout.avatar.bounds().width(), 24.0);
        assert_eq!(layout.text_right, 226.0);
        assert_eq!(layout.chart_rect, skia::Rect::from_ltrb(0.0, 50.0, 236.0, 133.0));
        assert_eq!(layout.chart_rect.height(), 83.0);
        assert_eq!(layout.container.fill, Some(skia::Color::from_rgb(0x19, 0x19, 0x19)));

        let light = CompactLayout::new(&compact(0.0, vec![]), &Theme::light());
        assert_eq!(light.percent_color(), ASC_COLOR);
        assert_eq!(light.container.fill, Some(skia::Color::from_rgb(0xfa, 0xf4, 0xf2)));
    }

    #[test]
    fn chart_label_format() {
        let data = TokenChartData {
            token_id: "bitcoin".into(),
            symbol: "btc".into(),
            currency: "usd".into(),
            from: "March 1".into(),
            to: "March 8".into(),
            series: Series::empty(),
            style: None,
        };
        assert_eq!(data.chart_label(), "BTC/USD | March 1 → March 8");
    }

    #[test]
    fn token_palette_beats_sentiment_and_caller_beats_palette() {
        let mut c = compositor();
        c.palette.insert("bitcoin", StyleOverride::border(skia::Color::from_rgb(247, 147, 26)));
        let mut data = TokenChartData {
            token_id: "Bitcoin".into(),
            symbol: "btc".into(),
            currency: "usd".into(),
            from: String::new(),
            to: String::new(),
            series: Series::from_values(vec![5.0, 1.0]).unwrap(),
            style: None,
        };
        assert_eq!(c.token_style(&data, ThemeKind::Dark).border, skia::Color::from_rgb(247, 147, 26));
        data.token_id = "eth".into();
        assert_eq!(c.token_style(&data, ThemeKind::Dark).border, DESC_COLOR);
        data.token_id = "bitcoin".into();
        data.style = Some(StyleOverride::border(skia::Color::WHITE));
        assert_eq!(c.token_style(&data, ThemeKind::Dark).border, skia::Color::WHITE);
    }

    #[test]
    fn descending_card_washes_the_area_red() {
        let c = compositor();
        let data = TokenChartData {
            token_id: "eth".into(),
            symbol: "eth".into(),
            currency: "usd".into(),
            from: String::new(),
            to: String::new(),
            series: Series::from_values(vec![5.0, 4.0, 1.0]).unwrap(),
            style: None,
        };
        for theme in [ThemeKind::Dark, ThemeKind::Light] {
            let style = c.token_style(&data, theme);
            assert_eq!(style.border, DESC_COLOR);
            match style.fill {
                Some(Fill::Solid(f)) => assert_eq!((f.r(), f.g(), f.b()), (DESC_COLOR.r(), DESC_COLOR.g(), DESC_COLOR.b())),
                other => panic!("expected a solid red wash, got {other:?}"),
            }
            assert_eq!(style.background, skia::Color::TRANSPARENT);
        }
    }

    #[test]
    fn full_card_has_a_transparent_background() {
        let c = compositor();
        let data = TokenChartData {
            token_id: "btc".into(),
            symbol: "btc".into(),
            currency: "usd".into(),
            from: "Mar 1".into(),
            to: "Mar 4".into(),
            series: Series::from_values(vec![1.0, 3.0, 2.0, 4.0]).unwrap(),
            style: None,
        };
        let img = decode(&c.render_token_card(&data, ThemeKind::Dark, ChartSize::Small).unwrap());
        assert_eq!(img.get_pixel(0, 0).0[3], 0);

        let mut opaque = data.clone();
        opaque.style = Some(StyleOverride { background: Some(skia::Color::WHITE), ..StyleOverride::default() });
        let img = decode(&c.render_token_card(&opaque, ThemeKind::Dark, ChartSize::Small).unwrap());
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn compact_card_is_236_by_133_with_sub_chart_below_50() {
        let c = compositor();
        let png = c
            .draw_compact_token_card(&compact(-3.2, vec![10.0, 9.0, 9.5, 8.0, 7.0]), ThemeKind::Dark, None)
            .unwrap();
        let img = decode(&png);
        assert_eq!(img.dimensions(), (236, 133));

        let red_in_chart = (50..133)
            .flat_map(|y| (0..236).map(move |x| (x, y)))
            .any(|(x, y)| is_reddish(img.get_pixel(x, y)));
        assert!(red_in_chart);
        // The avatar is skipped and the card background shows through.
        assert_eq!(img.get_pixel(20, 20).0, [0x19, 0x19, 0x19, 255]);
    }

    #[test]
    fn compact_card_draws_avatar_circle() {
        let c = compositor();
        let mut avatar = Raster::new(8, 8).unwrap();
        avatar.canvas().clear(skia::Color::from_rgb(0, 0, 255));
        let avatar = avatar.snapshot();
        let png = c
            .draw_compact_token_card(&compact(1.0, vec![1.0, 2.0]), ThemeKind::Dark, Some(&avatar))
            .unwrap();
        let img = decode(&png);
        assert_eq!(img.get_pixel(20, 20).0, [0, 0, 255, 255]);
        // Outside the 12px radius the background remains.
        assert_eq!(img.get_pixel(20, 34).0, [0x19, 0x19, 0x19, 255]);
    }

    #[test]
    fn compact_card_with_no_data_still_renders() {
        let c = compositor();
        let png = c.draw_compact_token_card(&compact(0.0, vec![]), ThemeKind::Light, None).unwrap();
        let img = decode(&png);
        assert_eq!(img.dimensions(), (236, 133));
        assert_eq!(img.get_pixel(118, 120).0, [0xfa, 0xf4, 0xf2, 255]);
    }

    #[test]
    fn non_finite_price_is_rejected_before_drawing() {
        let c = compositor();
        let mut data = compact(1.0, vec![1.0]);
        data.current_price = f64::NAN;
        assert!(matches!(c.draw_compact_token_card(&data, ThemeKind::Dark, None), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn compact_card_resolves_data_uri_avatar() {
        use base64::Engine;
        let c = compositor();
        let mut avatar = Raster::new(4, 4).unwrap();
        avatar.canvas().clear(skia::Color::from_rgb(255, 0, 255));
        let uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(avatar.into_png().unwrap())
        );
        let mut data = compact(2.0, vec![1.0, 3.0]);
        data.image = Some(uri.clone());
        let img = decode(&c.render_compact_token_card(&data, ThemeKind::Dark).await.unwrap());
        assert_eq!(img.get_pixel(20, 20).0, [255, 0, 255, 255]);
        assert!(c.images().contains(&uri));
    }

    #[tokio::test]
    async fn broken_avatar_is_an_image_fetch_error() {
        let c = compositor();
        let mut data = compact(2.0, vec![1.0, 3.0]);
        data.image = Some("data:image/png;base64,AAAA".into());
        let err = c.render_compact_token_card(&data, ThemeKind::Dark).await.unwrap_err();
        assert!(matches!(err, Error::ImageFetch { .. }));
    }
}
