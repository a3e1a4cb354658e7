use std::sync::Arc;

use serde::Deserialize;

use super::Transport;
use crate::fallback::RandomSource;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::normalize::{quote_from_fields, QuoteFields};
use crate::provider::{parse_json, Endpoint, FetchFuture, HistoryRequest, Provider, QuoteRequest};
use crate::{
    IndexSample, IndexSpec, PriceHistory, ProviderId, Quote, SourceError, UtcDateTime,
};

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

fn chart_url(symbol: &str, interval: &str, range: &str) -> String {
    format!(
        "{CHART_BASE_URL}/{}?region=US&lang=en-US&includePrePost=false&interval={interval}&range={range}",
        urlencoding::encode(symbol)
    )
}

fn chart_request(symbol: &str, interval: &str, range: &str) -> HttpRequest {
    HttpRequest::get(chart_url(symbol, interval, range))
        .with_header("accept", "application/json")
        .with_header("referer", "https://finance.yahoo.com/")
}

/// Intraday chart metadata as the quote source.
#[derive(Clone)]
pub struct YahooQuoteProvider {
    transport: Transport,
    random: Arc<dyn RandomSource>,
}

impl YahooQuoteProvider {
    pub fn new(transport: Transport, random: Arc<dyn RandomSource>) -> Self {
        Self { transport, random }
    }
}

impl Provider for YahooQuoteProvider {
    type Request = QuoteRequest;
    type Output = Quote;

    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Quote
    }

    fn fetch<'a>(&'a self, request: &'a QuoteRequest) -> FetchFuture<'a> {
        let http_request = chart_request(request.symbol.as_str(), "1m", "1d");
        Box::pin(self.transport.get(self.id(), http_request))
    }

    fn validate(&self, request: &QuoteRequest, response: HttpResponse) -> Result<Quote, SourceError> {
        let meta = parse_chart(&response)?.meta;

        let fields = QuoteFields {
            price: meta.regular_market_price.or(meta.previous_close),
            name: meta.long_name.or(meta.short_name),
            change: None,
            change_percent: None,
            previous_close: meta.previous_close.or(meta.chart_previous_close),
            open: meta.regular_market_open,
            high: meta.regular_market_day_high,
            low: meta.regular_market_day_low,
            volume: meta.regular_market_volume,
            as_of: meta
                .regular_market_time
                .and_then(|seconds| UtcDateTime::from_unix_timestamp(seconds).ok()),
        };

        quote_from_fields(self.id(), &request.symbol, fields, self.random.as_ref())
    }
}

/// Five-day daily chart; the last two non-null closes give the sample.
#[derive(Clone)]
pub struct YahooIndexProvider {
    transport: Transport,
}

impl YahooIndexProvider {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

impl Provider for YahooIndexProvider {
    type Request = IndexSpec;
    type Output = IndexSample;

    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::IndexSample
    }

    fn fetch<'a>(&'a self, request: &'a IndexSpec) -> FetchFuture<'a> {
        let http_request = chart_request(&request.provider_symbol, "1d", "5d");
        Box::pin(self.transport.get(self.id(), http_request))
    }

    fn validate(
        &self,
        request: &IndexSpec,
        response: HttpResponse,
    ) -> Result<IndexSample, SourceError> {
        let result = parse_chart(&response)?;
        let volume = result
            .meta
            .regular_market_volume
            .filter(|volume| volume.is_finite() && *volume >= 0.0)
            .map_or(0, |volume| volume as u64);
        let closes = result.closes();

        match closes.as_slice() {
            [.., previous, current] => Ok(IndexSample::from_closes(
                request.symbol.clone(),
                request.role,
                *previous,
                *current,
                volume,
            )?),
            _ => Err(SourceError::invalid_response(format!(
                "yahoo chart for {} has fewer than two closes",
                request.provider_symbol
            ))),
        }
    }
}

/// Three-month daily chart as a closing-price history.
#[derive(Clone)]
pub struct YahooHistoryProvider {
    transport: Transport,
}

impl YahooHistoryProvider {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

impl Provider for YahooHistoryProvider {
    type Request = HistoryRequest;
    type Output = PriceHistory;

    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::History
    }

    fn fetch<'a>(&'a self, request: &'a HistoryRequest) -> FetchFuture<'a> {
        let http_request = chart_request(request.symbol.as_str(), "1d", "3mo");
        Box::pin(self.transport.get(self.id(), http_request))
    }

    fn validate(
        &self,
        request: &HistoryRequest,
        response: HttpResponse,
    ) -> Result<PriceHistory, SourceError> {
        let closes = parse_chart(&response)?.closes();
        if closes.len() < 2 {
            return Err(SourceError::invalid_response(format!(
                "yahoo chart for {} has fewer than two closes",
                request.symbol
            )));
        }

        let skip = closes.len().saturating_sub(request.window);
        let prices = closes.into_iter().skip(skip).collect();
        Ok(PriceHistory::new(request.symbol.as_str(), prices)?)
    }
}

fn parse_chart(response: &HttpResponse) -> Result<ChartResult, SourceError> {
    let envelope: ChartEnvelope = parse_json(ProviderId::Yahoo, &response.body)?;

    if let Some(error) = envelope.chart.error {
        return Err(SourceError::invalid_response(format!(
            "yahoo chart error: {}",
            error.description.unwrap_or_else(|| String::from("unknown"))
        )));
    }

    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::invalid_response("yahoo chart response has no result"))
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

impl ChartResult {
    fn closes(&self) -> Vec<f64> {
        self.indicators
            .as_ref()
            .and_then(|indicators| indicators.quote.first())
            .map(|quote| {
                quote
                    .close
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|close| close.is_finite() && *close > 0.0)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    regular_market_day_high: Option<f64>,
    #[serde(default)]
    regular_market_day_low: Option<f64>,
    #[serde(default)]
    regular_market_open: Option<f64>,
    #[serde(default)]
    regular_market_volume: Option<f64>,
    #[serde(default)]
    regular_market_time: Option<i64>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
