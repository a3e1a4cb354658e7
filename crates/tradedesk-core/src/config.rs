//! Service configuration: provider credentials, time budget and the tracked
//! index set used by sentiment scoring.
//!
//! # Environment Variables
//!
//! | Provider | Primary Env Var | Fallback Env Var |
//! |----------|----------------|------------------|
//! | Alpha Vantage | `TRADEDESK_ALPHAVANTAGE_API_KEY` | `ALPHA_VANTAGE_KEY` |
//! | Finnhub | `TRADEDESK_FINNHUB_API_KEY` | `FINNHUB_API_KEY` |
//! | NewsAPI | `TRADEDESK_NEWSAPI_API_KEY` | `NEWS_API_KEY` |
//! | Polygon | `TRADEDESK_POLYGON_API_KEY` | `POLYGON_API_KEY` |
//! | Twelve Data | `TRADEDESK_TWELVEDATA_API_KEY` | `TWELVEDATA_API_KEY` |
//! | FMP | `TRADEDESK_FMP_API_KEY` | `FMP_API_KEY` |
//! | Yahoo | (no key required) | - |
//!
//! Unset keys fall back to `demo`, which every provider accepts with reduced
//! quota.

use std::env;
use std::time::Duration;

use crate::{IndexRole, Symbol, ValidationError};

pub const DEMO_KEY: &str = "demo";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_HISTORY_WINDOW: usize = 30;
pub const DEFAULT_NEWS_LIMIT: usize = 10;

/// API keys for keyed providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderKeys {
    pub alphavantage: String,
    pub finnhub: String,
    pub newsapi: String,
    pub polygon: String,
    pub twelvedata: String,
    pub fmp: String,
}

impl Default for ProviderKeys {
    fn default() -> Self {
        Self {
            alphavantage: String::from(DEMO_KEY),
            finnhub: String::from(DEMO_KEY),
            newsapi: String::from(DEMO_KEY),
            polygon: String::from(DEMO_KEY),
            twelvedata: String::from(DEMO_KEY),
            fmp: String::from(DEMO_KEY),
        }
    }
}

impl ProviderKeys {
    /// Reads keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads keys through `lookup`, trying the prefixed name first.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |primary: &str, fallback: &str| {
            lookup(primary)
                .or_else(|| lookup(fallback))
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| String::from(DEMO_KEY))
        };

        Self {
            alphavantage: read("TRADEDESK_ALPHAVANTAGE_API_KEY", "ALPHA_VANTAGE_KEY"),
            finnhub: read("TRADEDESK_FINNHUB_API_KEY", "FINNHUB_API_KEY"),
            newsapi: read("TRADEDESK_NEWSAPI_API_KEY", "NEWS_API_KEY"),
            polygon: read("TRADEDESK_POLYGON_API_KEY", "POLYGON_API_KEY"),
            twelvedata: read("TRADEDESK_TWELVEDATA_API_KEY", "TWELVEDATA_API_KEY"),
            fmp: read("TRADEDESK_FMP_API_KEY", "FMP_API_KEY"),
        }
    }
}

/// One index tracked for sentiment scoring.
///
/// `symbol` is the display ticker; `provider_symbol` is what Yahoo expects
/// (`^VIX` for the volatility index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub symbol: String,
    pub provider_symbol: String,
    pub role: IndexRole,
}

impl IndexSpec {
    pub fn new(symbol: impl Into<String>, role: IndexRole) -> Self {
        let symbol = symbol.into();
        Self {
            provider_symbol: symbol.clone(),
            symbol,
            role,
        }
    }

    /// Builds an index entry from the ticker providers expect. A caret index ticker
    /// such as `^VIX` is displayed without its caret.
    pub fn parse(ticker: &str, role: IndexRole) -> Result<Self, ValidationError> {
        let ticker = Symbol::parse_index(ticker)?;
        Ok(Self {
            symbol: ticker.display_ticker().to_owned(),
            provider_symbol: ticker.into(),
            role,
        })
    }

    pub fn default_set() -> Vec<Self> {
        [
            ("SPY", IndexRole::Broad),
            ("QQQ", IndexRole::Tech),
            ("DIA", IndexRole::BlueChip),
            ("^VIX", IndexRole::Volatility),
        ]
        .into_iter()
        .map(|(ticker, role)| Self::parse(ticker, role).expect("static index ticker"))
        .collect()
    }
}

/// Runtime settings for [`MarketDataService`](crate::MarketDataService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub keys: ProviderKeys,
    pub timeout: Duration,
    pub history_window: usize,
    pub news_limit: usize,
    pub indices: Vec<IndexSpec>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            keys: ProviderKeys::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            history_window: DEFAULT_HISTORY_WINDOW,
            news_limit: DEFAULT_NEWS_LIMIT,
            indices: IndexSpec::default_set(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            keys: ProviderKeys::from_env(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.max(2);
        self
    }

    pub fn with_news_limit(mut self, limit: usize) -> Self {
        self.news_limit = limit.clamp(1, DEFAULT_NEWS_LIMIT);
        self
    }

    pub fn with_indices(mut self, indices: Vec<IndexSpec>) -> Self {
        self.indices = indices;
        self
    }
}
