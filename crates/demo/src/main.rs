// File: crates/demo/src/main.rs
// Summary: Demo loads a time,price CSV and renders full and compact ticker cards plus the JSON envelope.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ticker_core::{
    BaseCoin, ChartSize, CompactCardData, MarketData, RenderConfig, Series, ThemeKind, TickerParams, TickerQuote,
    TickerService, TokenChartData,
};

/// One price observation.
struct Point {
    time: Option<DateTime<Utc>>,
    price: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Usage: ticker-demo [CSV] [SYMBOL] [AVATAR_URL]
    let mut args = std::env::args().skip(1);
    let raw = args.next().unwrap_or_else(|| "crates/demo/data/btc_usd_7d.csv".to_string());
    let symbol = args.next().unwrap_or_else(|| "btc".to_string());
    let avatar = args.next();

    let (path, used_alt) = resolve_path(&raw)?;
    info!(path = %path.display(), used_alt, "using input file");

    let points = load_price_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?;
    if points.is_empty() {
        anyhow::bail!("no prices loaded; check headers/delimiter.");
    }
    info!(rows = points.len(), "loaded prices");

    let cfg = RenderConfig::from_env().context("reading TICKER_* configuration")?;
    let service = TickerService::from_config(&cfg).context("building ticker service")?;

    let labels: Vec<String> = points.iter().enumerate().map(|(i, p)| time_label(p.time, i)).collect();
    let values: Vec<f64> = points.iter().map(|p| p.price).collect();
    let first = values[0];
    let last = values[values.len() - 1];
    let change = if first != 0.0 { (last - first) / first * 100.0 } else { 0.0 };
    let from = labels[0].clone();
    let to = labels[labels.len() - 1].clone();

    // 1) Full ticker cards, both sizes and themes
    for theme in [ThemeKind::Dark, ThemeKind::Light] {
        for size in [ChartSize::Large, ChartSize::Small] {
            let data = TokenChartData {
                token_id: symbol.clone(),
                symbol: symbol.clone(),
                currency: "usd".into(),
                from: from.clone(),
                to: to.clone(),
                series: Series::new(labels.clone(), values.clone())?,
                style: None,
            };
            let png = service.compositor().render_token_card(&data, theme, size)?;
            let out = out_name_with(&path, &format!("ticker_{theme}_{size}"));
            std::fs::write(&out, png).with_context(|| format!("writing {}", out.display()))?;
            info!(out = %out.display(), "wrote ticker card");
        }
    }

    // 2) Compact cards through the response cache
    for theme in [ThemeKind::Dark, ThemeKind::Light] {
        let data = CompactCardData {
            symbol: symbol.clone(),
            image: avatar.clone(),
            current_price: last,
            change_percent: change,
            sparkline: Series::from_values(values.clone())?,
        };
        let png = service.ticker_compact(&symbol, theme, || async { Ok(data) }).await?;
        let out = out_name_with(&path, &format!("compact_{theme}"));
        std::fs::write(&out, &png).with_context(|| format!("writing {}", out.display()))?;
        info!(out = %out.display(), bytes = png.len(), "wrote compact card");
    }

    // 3) JSON envelope with the image embedded as markdown
    let quote = TickerQuote {
        base_coin: BaseCoin {
            id: symbol.clone(),
            symbol: symbol.clone(),
            name: symbol.to_uppercase(),
            image: avatar.clone(),
            market_data: MarketData { current_price: last, percentage_7d: Some(change), ..MarketData::default() },
            ..BaseCoin::default()
        },
        from,
        to,
        times: labels,
        ratios: values,
    };
    let response = service.ticker(&symbol, &TickerParams::default(), || async { Ok(quote) }).await?;
    let out = out_name_with(&path, "ticker").with_extension("json");
    std::fs::write(&out, serde_json::to_vec_pretty(&response)?).with_context(|| format!("writing {}", out.display()))?;
    info!(out = %out.display(), markdown_len = response.markdown.len(), "wrote ticker response");

    Ok(())
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

/// Produce output file name like target/out/<stem>_<suffix>.png
fn out_name_with(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("prices");
    let short = stem.split('_').take(2).collect::<Vec<_>>().join("_");
    let mut out = PathBuf::from("target/out");
    std::fs::create_dir_all(&out).ok();
    if short.is_empty() {
        out.push(format!("{suffix}.png"));
    } else {
        out.push(format!("{short}_{suffix}.png"));
    }
    out
}

/// Load a `time,price` CSV. Rows without a parsable price are skipped.
fn load_price_csv(path: &Path) -> Result<Vec<Point>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect::<Vec<_>>();
    info!(?headers, "csv headers");

    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let i_time = idx(&["time", "timestamp", "date", "datetime"]);
    let i_price = idx(&["price", "close", "c", "value"])
        .with_context(|| format!("no price column in {headers:?}"))?;

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let Some(price) = rec.get(i_price).and_then(|s| s.trim().parse::<f64>().ok()) else { continue };
        let time = i_time.and_then(|ix| rec.get(ix)).and_then(parse_time);
        out.push(Point { time, price });
    }
    Ok(out)
}

/// Epoch seconds or milliseconds, or RFC 3339.
fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        // epoch ms -> sec
        let secs = if n > 10_i64.pow(12) { n / 1000 } else { n };
        return DateTime::from_timestamp(secs, 0);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc))
}

fn time_label(time: Option<DateTime<Utc>>, index: usize) -> String {
    match time {
        Some(t) => t.format("%b %d %H:%M").to_string(),
        None => index.to_string(),
    }
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => {
            alt.set_extension("csv");
            Some(alt)
        }
        "csv" => {
            alt.set_extension("cvs");
            Some(alt)
        }
        _ => None,
    }
}
