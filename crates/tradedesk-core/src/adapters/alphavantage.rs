use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use super::{parse_decimal, Transport};
use crate::fallback::RandomSource;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::normalize::{collect_articles, parse_provider_timestamp, quote_from_fields, QuoteFields};
use crate::provider::{
    parse_json, Endpoint, FetchFuture, HistoryRequest, NewsRequest, Provider, QuoteRequest,
};
use crate::{
    IndexSample, IndexSpec, NewsArticle, NewsBatch, PriceHistory, ProviderId, Quote, SourceError,
};

const BASE_URL: &str = "https://www.alphavantage.co/query";

fn query_url(function: &str, symbol: Option<&str>, api_key: &str) -> String {
    let mut url = format!("{BASE_URL}?function={function}");
    if let Some(symbol) = symbol {
        url.push_str("&symbol=");
        url.push_str(&urlencoding::encode(symbol));
    }
    url.push_str("&apikey=");
    url.push_str(&urlencoding::encode(api_key));
    url
}

/// Throttle and error notices Alpha Vantage returns with HTTP 200.
#[derive(Debug, Default, Deserialize)]
struct Notice {
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

impl Notice {
    fn check(&self) -> Result<(), SourceError> {
        if let Some(message) = self.note.as_ref().or(self.information.as_ref()) {
            return Err(SourceError::rate_limited(format!(
                "alphavantage quota notice: {message}"
            )));
        }

        if let Some(message) = &self.error_message {
            return Err(SourceError::invalid_response(format!(
                "alphavantage error: {message}"
            )));
        }

        Ok(())
    }
}

/// `GLOBAL_QUOTE`; reports change natively.
#[derive(Clone)]
pub struct AlphaVantageQuoteProvider {
    transport: Transport,
    api_key: String,
    random: Arc<dyn RandomSource>,
}

impl AlphaVantageQuoteProvider {
    pub fn new(
        transport: Transport,
        api_key: impl Into<String>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            random,
        }
    }
}

impl Provider for AlphaVantageQuoteProvider {
    type Request = QuoteRequest;
    type Output = Quote;

    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Quote
    }

    fn fetch<'a>(&'a self, request: &'a QuoteRequest) -> FetchFuture<'a> {
        let url = query_url("GLOBAL_QUOTE", Some(request.symbol.as_str()), &self.api_key);
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(&self, request: &QuoteRequest, response: HttpResponse) -> Result<Quote, SourceError> {
        let payload: GlobalQuoteResponse = parse_json(self.id(), &response.body)?;
        payload.notice.check()?;

        let quote = payload
            .quote
            .filter(|quote| quote.price.is_some())
            .ok_or_else(|| SourceError::invalid_response("alphavantage response has no Global Quote"))?;

        let fields = QuoteFields {
            price: parse_decimal(quote.price.as_deref()),
            name: None,
            change: parse_decimal(quote.change.as_deref()),
            change_percent: parse_decimal(quote.change_percent.as_deref()),
            previous_close: parse_decimal(quote.previous_close.as_deref()),
            open: parse_decimal(quote.open.as_deref()),
            high: parse_decimal(quote.high.as_deref()),
            low: parse_decimal(quote.low.as_deref()),
            volume: parse_decimal(quote.volume.as_deref()),
            as_of: None,
        };

        quote_from_fields(self.id(), &request.symbol, fields, self.random.as_ref())
    }
}

/// `NEWS_SENTIMENT` feed.
#[derive(Clone)]
pub struct AlphaVantageNewsProvider {
    transport: Transport,
    api_key: String,
}

impl AlphaVantageNewsProvider {
    pub fn new(transport: Transport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
        }
    }
}

impl Provider for AlphaVantageNewsProvider {
    type Request = NewsRequest;
    type Output = NewsBatch;

    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::News
    }

    fn fetch<'a>(&'a self, _request: &'a NewsRequest) -> FetchFuture<'a> {
        let url = query_url("NEWS_SENTIMENT", None, &self.api_key);
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(&self, request: &NewsRequest, response: HttpResponse) -> Result<NewsBatch, SourceError> {
        let payload: NewsSentimentResponse = parse_json(self.id(), &response.body)?;
        payload.notice.check()?;

        let candidates = payload.feed.into_iter().map(|item| {
            NewsArticle::new(
                item.title.unwrap_or_default(),
                item.summary.unwrap_or_default(),
                item.source.unwrap_or_else(|| String::from("Alpha Vantage")),
            )
            .map(|article| {
                article.with_url(item.url).with_published_at(
                    item.time_published
                        .as_deref()
                        .and_then(parse_provider_timestamp),
                )
            })
        });

        collect_articles(self.id(), candidates, request.limit)
    }
}

/// `TIME_SERIES_DAILY` as an index sample source.
#[derive(Clone)]
pub struct AlphaVantageIndexProvider {
    transport: Transport,
    api_key: String,
}

impl AlphaVantageIndexProvider {
    pub fn new(transport: Transport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
        }
    }
}

impl Provider for AlphaVantageIndexProvider {
    type Request = IndexSpec;
    type Output = IndexSample;

    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::IndexSample
    }

    fn fetch<'a>(&'a self, request: &'a IndexSpec) -> FetchFuture<'a> {
        let url = query_url("TIME_SERIES_DAILY", Some(&request.symbol), &self.api_key);
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(&self, request: &IndexSpec, response: HttpResponse) -> Result<IndexSample, SourceError> {
        let series = parse_daily(self.id(), &response)?;
        let mut recent = series.values().rev();

        match (recent.next(), recent.next()) {
            (Some(current), Some(previous)) => {
                let current_close = current.close().ok_or_else(missing_close)?;
                let previous_close = previous.close().ok_or_else(missing_close)?;
                let volume = parse_decimal(current.volume.as_deref())
                    .filter(|volume| *volume >= 0.0)
                    .map_or(0, |volume| volume as u64);

                Ok(IndexSample::from_closes(
                    request.symbol.clone(),
                    request.role,
                    previous_close,
                    current_close,
                    volume,
                )?)
            }
            _ => Err(SourceError::invalid_response(format!(
                "alphavantage daily series for {} has fewer than two days",
                request.symbol
            ))),
        }
    }
}

/// `TIME_SERIES_DAILY` (compact, 100 days) as a closing-price history.
#[derive(Clone)]
pub struct AlphaVantageHistoryProvider {
    transport: Transport,
    api_key: String,
}

impl AlphaVantageHistoryProvider {
    pub fn new(transport: Transport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
        }
    }
}

impl Provider for AlphaVantageHistoryProvider {
    type Request = HistoryRequest;
    type Output = PriceHistory;

    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::History
    }

    fn fetch<'a>(&'a self, request: &'a HistoryRequest) -> FetchFuture<'a> {
        let url = format!(
            "{}&outputsize=compact",
            query_url("TIME_SERIES_DAILY", Some(request.symbol.as_str()), &self.api_key)
        );
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(
        &self,
        request: &HistoryRequest,
        response: HttpResponse,
    ) -> Result<PriceHistory, SourceError> {
        let series = parse_daily(self.id(), &response)?;

        // Keys are ISO dates, so map order is chronological.
        let mut prices = series
            .values()
            .rev()
            .take(request.window)
            .map(|bar| bar.close().ok_or_else(missing_close))
            .collect::<Result<Vec<_>, _>>()?;
        prices.reverse();

        if prices.len() < 2 {
            return Err(SourceError::invalid_response(format!(
                "alphavantage daily series for {} has fewer than two days",
                request.symbol
            )));
        }

        Ok(PriceHistory::new(request.symbol.as_str(), prices)?)
    }
}

fn parse_daily(
    provider: ProviderId,
    response: &HttpResponse,
) -> Result<BTreeMap<String, DailyBar>, SourceError> {
    let payload: DailySeriesResponse = parse_json(provider, &response.body)?;
    payload.notice.check()?;

    payload
        .series
        .filter(|series| !series.is_empty())
        .ok_or_else(|| SourceError::invalid_response("alphavantage response has no daily series"))
}

fn missing_close() -> SourceError {
    SourceError::invalid_response("alphavantage daily bar has no parseable close")
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<GlobalQuote>,
    #[serde(flatten)]
    notice: Notice,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "02. open", default)]
    open: Option<String>,
    #[serde(rename = "03. high", default)]
    high: Option<String>,
    #[serde(rename = "04. low", default)]
    low: Option<String>,
    #[serde(rename = "05. price", default)]
    price: Option<String>,
    #[serde(rename = "06. volume", default)]
    volume: Option<String>,
    #[serde(rename = "08. previous close", default)]
    previous_close: Option<String>,
    #[serde(rename = "09. change", default)]
    change: Option<String>,
    #[serde(rename = "10. change percent", default)]
    change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsSentimentResponse {
    #[serde(default)]
    feed: Vec<FeedItem>,
    #[serde(flatten)]
    notice: Notice,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    time_published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    series: Option<BTreeMap<String, DailyBar>>,
    #[serde(flatten)]
    notice: Notice,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close", default)]
    close: Option<String>,
    #[serde(rename = "5. volume", default)]
    volume: Option<String>,
}

impl DailyBar {
    fn close(&self) -> Option<f64> {
        parse_decimal(self.close.as_deref()).filter(|close| *close > 0.0)
    }
}
