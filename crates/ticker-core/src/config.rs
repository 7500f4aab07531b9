// File: crates/ticker-core/src/config.rs
// Summary: Runtime configuration (fonts, cache sizing, fetch timeout) loaded from the environment.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::response_cache;

pub const ENV_FONT_PATH: &str = "TICKER_FONT_PATH";
pub const ENV_FONT_FAMILY: &str = "TICKER_FONT_FAMILY";
pub const ENV_IMAGE_CACHE_CAPACITY: &str = "TICKER_IMAGE_CACHE_CAPACITY";
pub const ENV_RESPONSE_CACHE_CAPACITY: &str = "TICKER_RESPONSE_CACHE_CAPACITY";
pub const ENV_RESPONSE_CACHE_TTL_SECS: &str = "TICKER_RESPONSE_CACHE_TTL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "TICKER_FETCH_TIMEOUT_SECS";
pub const ENV_TOKEN_PALETTE: &str = "TICKER_TOKEN_PALETTE";

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub font_path: PathBuf,
    pub font_family: String,
    pub image_cache_capacity: NonZeroUsize,
    pub response_cache_capacity: NonZeroUsize,
    pub response_cache_ttl: Duration,
    pub fetch_timeout: Duration,
    /// JSON file of per-token color overrides.
    pub token_palette: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("assets/fonts/inter/Inter-Regular.ttf"),
            font_family: "Inter".to_string(),
            image_cache_capacity: NonZeroUsize::new(256).unwrap_or(NonZeroUsize::MIN),
            response_cache_capacity: NonZeroUsize::new(response_cache::DEFAULT_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            response_cache_ttl: response_cache::DEFAULT_TTL,
            fetch_timeout: Duration::from_secs(10),
            token_palette: None,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by `TICKER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RenderConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_FONT_PATH) {
            cfg.font_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_FONT_FAMILY) {
            cfg.font_family = v;
        }
        if let Some(v) = get(ENV_IMAGE_CACHE_CAPACITY) {
            cfg.image_cache_capacity = parse_var(ENV_IMAGE_CACHE_CAPACITY, &v)?;
        }
        if let Some(v) = get(ENV_RESPONSE_CACHE_CAPACITY) {
            cfg.response_cache_capacity = parse_var(ENV_RESPONSE_CACHE_CAPACITY, &v)?;
        }
        if let Some(v) = get(ENV_RESPONSE_CACHE_TTL_SECS) {
            cfg.response_cache_ttl = Duration::from_secs(parse_var(ENV_RESPONSE_CACHE_TTL_SECS, &v)?);
        }
        if let Some(v) = get(ENV_FETCH_TIMEOUT_SECS) {
            cfg.fetch_timeout = Duration::from_secs(parse_var(ENV_FETCH_TIMEOUT_SECS, &v)?);
        }
        if let Some(v) = get(ENV_TOKEN_PALETTE) {
            cfg.token_palette = Some(PathBuf::from(v));
        }
        Ok(cfg)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| Error::config(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = RenderConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, RenderConfig::default());
        assert_eq!(cfg.font_family, "Inter");
        assert_eq!(cfg.image_cache_capacity.get(), 256);
        assert_eq!(cfg.response_cache_capacity.get(), 500);
        assert_eq!(cfg.response_cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides() {
        let cfg = RenderConfig::from_lookup(lookup(&[
            (ENV_FONT_FAMILY, "Roboto"),
            (ENV_RESPONSE_CACHE_TTL_SECS, "60"),
            (ENV_IMAGE_CACHE_CAPACITY, " 32 "),
            (ENV_TOKEN_PALETTE, "palette.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.font_family, "Roboto");
        assert_eq!(cfg.response_cache_ttl, Duration::from_secs(60));
        assert_eq!(cfg.image_cache_capacity.get(), 32);
        assert_eq!(cfg.token_palette, Some(PathBuf::from("palette.json")));
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = RenderConfig::from_lookup(lookup(&[(ENV_RESPONSE_CACHE_CAPACITY, "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains(ENV_RESPONSE_CACHE_CAPACITY)));
        assert!(RenderConfig::from_lookup(lookup(&[(ENV_FETCH_TIMEOUT_SECS, "ten")])).is_err());
    }
}
