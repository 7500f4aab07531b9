// File: crates/ticker-core/src/ticker.rs
// Summary: Ticker service; response caches in front of the compositor plus the JSON response envelope.

use std::future::Future;
use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::card::{CompactCardData, Compositor, TokenChartData};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::response_cache::{response_key, ResponseCache};
use crate::series::Series;
use crate::style::StyleOverride;
use crate::types::{ChartSize, ThemeKind};

/// Market figures reported alongside the chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub current_price: f64,
    pub market_cap: Option<f64>,
    pub percentage_1h: Option<f64>,
    pub percentage_24h: Option<f64>,
    pub percentage_7d: Option<f64>,
}

/// Summary of the quoted token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_platform_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub market_data: MarketData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickerResponse {
    /// `![](data:image/png;base64,...)`
    pub markdown: String,
    pub base_coin: BaseCoin,
}

/// Normalized price history for one token against a currency.
#[derive(Clone, Debug, PartialEq)]
pub struct TickerQuote {
    pub base_coin: BaseCoin,
    /// Window start and end as display text.
    pub from: String,
    pub to: String,
    /// Time labels paired with `ratios`.
    pub times: Vec<String>,
    pub ratios: Vec<f64>,
}

/// Render parameters of a full ticker request; all of them are part of the cache key.
#[derive(Clone, Debug, PartialEq)]
pub struct TickerParams {
    pub theme: ThemeKind,
    pub size: ChartSize,
    /// Window length in days.
    pub time_step: u32,
    pub currency: String,
    pub style: Option<StyleOverride>,
}

impl Default for TickerParams {
    fn default() -> Self {
        Self { theme: ThemeKind::Dark, size: ChartSize::Large, time_step: 7, currency: "usd".to_string(), style: None }
    }
}

/// Markdown image embedding `png` as a base64 data URI.
pub fn markdown_image(png: &[u8]) -> String {
    format!("![](data:image/png;base64,{})", base64::engine::general_purpose::STANDARD.encode(png))
}

/// Process-lifetime context owning the compositor and both response caches.
pub struct TickerService {
    compositor: Arc<Compositor>,
    tickers: ResponseCache<TickerResponse>,
    compact: ResponseCache<Bytes>,
}

impl TickerService {
    pub fn new(compositor: Arc<Compositor>, cfg: &RenderConfig) -> Self {
        Self {
            compositor,
            tickers: ResponseCache::new(cfg.response_cache_capacity, cfg.response_cache_ttl),
            compact: ResponseCache::new(cfg.response_cache_capacity, cfg.response_cache_ttl),
        }
    }

    pub fn from_config(cfg: &RenderConfig) -> Result<Self> {
        let compositor = Arc::new(Compositor::from_config(cfg)?);
        info!(
            capacity = cfg.response_cache_capacity.get(),
            ttl_secs = cfg.response_cache_ttl.as_secs(),
            "ticker service ready"
        );
        Ok(Self::new(compositor, cfg))
    }

    pub fn compositor(&self) -> &Arc<Compositor> {
        &self.compositor
    }

    pub fn ticker_cache(&self) -> &ResponseCache<TickerResponse> {
        &self.tickers
    }

    pub fn compact_cache(&self) -> &ResponseCache<Bytes> {
        &self.compact
    }

    /// Full ticker response for `token`. `load` runs only on a cache miss.
    pub async fn ticker<F, Fut>(&self, token: &str, params: &TickerParams, load: F) -> Result<TickerResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TickerQuote>>,
    {
        self.ticker_at(token, params, Utc::now(), load).await
    }

    /// [`TickerService::ticker`] keyed on the minute bucket of `now`.
    pub(crate) async fn ticker_at<F, Fut>(
        &self,
        token: &str,
        params: &TickerParams,
        now: DateTime<Utc>,
        load: F,
    ) -> Result<TickerResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TickerQuote>>,
    {
        let time_step = params.time_step.to_string();
        let key = response_key(
            token,
            now,
            &[params.theme.as_str(), &time_step, params.size.as_str(), &params.currency.to_lowercase()],
        );
        self.tickers
            .get_or_compute(&key, || async {
                let quote = load().await?;
                let data = TokenChartData {
                    token_id: quote.base_coin.id.clone(),
                    symbol: token.to_string(),
                    currency: params.currency.clone(),
                    from: quote.from,
                    to: quote.to,
                    series: Series::new(quote.times, quote.ratios)?,
                    style: params.style,
                };
                let png = self.compositor.render_token_card(&data, params.theme, params.size)?;
                debug!(key = %key, bytes = png.len(), "rendered ticker");
                Ok(TickerResponse { markdown: markdown_image(&png), base_coin: quote.base_coin })
            })
            .await
    }

    /// Compact card PNG for `token`. `load` runs only on a cache miss.
    pub async fn ticker_compact<F, Fut>(&self, token: &str, theme: ThemeKind, load: F) -> Result<Bytes>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CompactCardData>>,
    {
        let key = response_key(token, Utc::now(), &[theme.as_str()]);
        self.compact
            .get_or_compute(&key, || async {
                let data = load().await?;
                let png = self.compositor.render_compact_token_card(&data, theme).await?;
                Ok(Bytes::from(png))
            })
            .await
    }
}
