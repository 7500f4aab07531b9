// File: crates/ticker-core/src/lib.rs
// Summary: Core library entry point; exports primitives, the line chart adapter, the card compositor and caches.

pub mod card;
pub mod chart;
pub mod color;
pub mod config;
pub mod downsample;
pub mod draw;
pub mod error;
pub mod format;
pub mod geometry;
pub mod grid;
pub mod image_cache;
pub mod raster;
pub mod response_cache;
pub mod scale;
pub mod series;
pub mod style;
pub mod text;
pub mod theme;
pub mod ticker;
pub mod types;

pub use card::{CompactCardData, CompactLayout, Compositor, TokenChartData};
pub use chart::{render_line_chart, ChartMode, ChartRequest, LineChart, RenderOptions};
pub use color::{parse_css_color, Fill, Gradient, GradientDirection, Sentiment};
pub use config::RenderConfig;
pub use draw::{
    draw_clipped_circle_image, draw_clipped_rounded_avatar, draw_divider, draw_progress_bar,
    draw_rounded_rectangle,
};
pub use error::{Error, Result};
pub use geometry::{CircleSpec, Interval, RectangleSpec};
pub use image_cache::{HttpFetcher, ImageCache, ImageFetcher, ImageSource};
pub use response_cache::{response_key, ResponseCache};
pub use series::Series;
pub use style::{resolve, StyleConfig, StyleLayer, StyleOverride, TokenPalette};
pub use text::{FontRegistry, TextShaper};
pub use theme::Theme;
pub use ticker::{BaseCoin, MarketData, TickerParams, TickerQuote, TickerResponse, TickerService};
pub use types::{ChartSize, ThemeKind};
