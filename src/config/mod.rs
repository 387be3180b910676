//! Configuration management for TokenView
//!
//! Loads store limits from an optional config file + environment variables
//! via .env

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::types::Timeframe;

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub store: StoreLimits,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreLimits {
    /// Maximum candles kept per timeframe
    pub max_candles: usize,
    /// Maximum recent trades kept (most-recent-first ring)
    pub max_recent_trades: usize,
    /// Swap-quote validity window in milliseconds
    pub quote_ttl_ms: i64,
    /// Default chart timeframe (1s, 15s, 1m, 5m, 15m, 1h)
    pub default_timeframe: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Feed silence threshold before the view is considered stale, in milliseconds
    pub heartbeat_timeout_ms: i64,
    /// Broadcast channel capacity for store update subscribers
    pub broadcast_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store: StoreLimits {
                max_candles: 500,
                max_recent_trades: 100,
                quote_ttl_ms: 1000,
                default_timeframe: "1m".to_string(),
            },
            feed: FeedConfig {
                heartbeat_timeout_ms: 15_000,
                broadcast_capacity: 256,
            },
        }
    }
}

impl StoreConfig {
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Store defaults
            .set_default("store.max_candles", 500)?
            .set_default("store.max_recent_trades", 100)?
            .set_default("store.quote_ttl_ms", 1000)?
            .set_default("store.default_timeframe", "1m")?
            // Feed defaults
            .set_default("feed.heartbeat_timeout_ms", 15_000)?
            .set_default("feed.broadcast_capacity", 256)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (TOKENVIEW_*)
            .add_source(Environment::with_prefix("TOKENVIEW").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let store_config: StoreConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        store_config.validate()?;
        Ok(store_config)
    }

    /// Default timeframe as a typed value
    pub fn default_timeframe(&self) -> Timeframe {
        Timeframe::from_str(&self.store.default_timeframe).unwrap_or_default()
    }

    /// Validate limits that would silently break buffer invariants
    pub fn validate(&self) -> Result<()> {
        if self.store.max_candles == 0 {
            bail!("store.max_candles must be at least 1");
        }
        if self.store.max_recent_trades == 0 {
            bail!("store.max_recent_trades must be at least 1");
        }
        if self.store.quote_ttl_ms <= 0 {
            bail!("store.quote_ttl_ms must be positive");
        }
        if Timeframe::from_str(&self.store.default_timeframe).is_none() {
            bail!(
                "store.default_timeframe '{}' is not a supported timeframe",
                self.store.default_timeframe
            );
        }
        Ok(())
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "max_candles={} max_trades={} quote_ttl_ms={} tf={} hb_timeout_ms={}",
            self.store.max_candles,
            self.store.max_recent_trades,
            self.store.quote_ttl_ms,
            self.store.default_timeframe,
            self.feed.heartbeat_timeout_ms
        )
    }
}

impl std::fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
