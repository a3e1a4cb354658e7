//! Provider adapters.
//!
//! | Adapter | Quantity | Upstream |
//! |---------|----------|----------|
//! | [`YahooQuoteProvider`] | quote | Yahoo v8 chart, intraday |
//! | [`YahooIndexProvider`] | index sample | Yahoo v8 chart, 5 days |
//! | [`YahooHistoryProvider`] | history | Yahoo v8 chart, 3 months |
//! | [`YahooRssProvider`] | news | Yahoo Finance headline RSS |
//! | [`AlphaVantageQuoteProvider`] | quote | `GLOBAL_QUOTE` |
//! | [`AlphaVantageNewsProvider`] | news | `NEWS_SENTIMENT` |
//! | [`AlphaVantageIndexProvider`] | index sample | `TIME_SERIES_DAILY` |
//! | [`AlphaVantageHistoryProvider`] | history | `TIME_SERIES_DAILY` |
//! | [`PolygonQuoteProvider`] | quote | previous-day aggregate |
//! | [`TwelveDataQuoteProvider`] | quote | `price` |
//! | [`FmpQuoteProvider`] | quote | `quote-short` |
//! | [`FinnhubNewsProvider`] | news | general news |
//! | [`NewsApiProvider`] | news | top business headlines |

mod alphavantage;
mod finnhub;
mod fmp;
mod newsapi;
mod polygon;
mod twelvedata;
mod yahoo;
mod yahoo_rss;

use std::sync::Arc;
use std::time::Duration;

pub use alphavantage::{
    AlphaVantageHistoryProvider, AlphaVantageIndexProvider, AlphaVantageNewsProvider,
    AlphaVantageQuoteProvider,
};
pub use finnhub::FinnhubNewsProvider;
pub use fmp::FmpQuoteProvider;
pub use newsapi::NewsApiProvider;
pub use polygon::PolygonQuoteProvider;
pub use twelvedata::TwelveDataQuoteProvider;
pub use yahoo::{YahooHistoryProvider, YahooIndexProvider, YahooQuoteProvider};
pub use yahoo_rss::YahooRssProvider;

use crate::config::DEFAULT_TIMEOUT_MS;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::provider::execute;
use crate::{ProviderId, SourceError};

/// HTTP client plus the per-call time budget shared by every adapter.
#[derive(Clone)]
pub struct Transport {
    client: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl Transport {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) async fn get(
        &self,
        provider: ProviderId,
        request: HttpRequest,
    ) -> Result<HttpResponse, SourceError> {
        execute(
            self.client.as_ref(),
            provider,
            request.with_timeout(self.timeout),
        )
        .await
    }
}

pub(crate) fn parse_decimal(value: Option<&str>) -> Option<f64> {
    value
        .map(|raw| raw.trim().trim_end_matches('%'))
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|parsed| parsed.is_finite())
}
