//! Public operations. Every operation is total: callers always receive data,
//! tagged with its provenance.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::{join, join_all};
use tracing::{info, warn};

use crate::adapters::{
    AlphaVantageHistoryProvider, AlphaVantageIndexProvider, AlphaVantageNewsProvider,
    AlphaVantageQuoteProvider, FinnhubNewsProvider, FmpQuoteProvider, NewsApiProvider,
    PolygonQuoteProvider, Transport, TwelveDataQuoteProvider, YahooHistoryProvider,
    YahooIndexProvider, YahooQuoteProvider, YahooRssProvider,
};
use crate::analytics::CorrelationReport;
use crate::fallback::{RandomSource, ReferencePrices, SeededRandom, SyntheticGenerator, ThreadRandom};
use crate::http_client::{HttpClient, OfflineHttpClient, ReqwestHttpClient};
use crate::provider::{Endpoint, HistoryRequest, NewsRequest, QuoteRequest};
use crate::resolver::{Resolved, RouteFailure, SourceChain};
use crate::{
    sentiment, EnvelopeError, IndexSample, IndexSpec, NewsBatch, PriceHistory, ProviderId,
    Provenance, Quote, SentimentReading, ServiceConfig, Symbol, UtcDateTime,
};

pub type QuoteChain = SourceChain<QuoteRequest, Quote>;
pub type NewsChain = SourceChain<NewsRequest, NewsBatch>;
pub type IndexChain = SourceChain<IndexSpec, IndexSample>;
pub type HistoryChain = SourceChain<HistoryRequest, PriceHistory>;

/// Market data facade over the provider chains and the synthetic generator.
#[derive(Clone)]
pub struct MarketDataService {
    config: ServiceConfig,
    generator: SyntheticGenerator,
    quotes: QuoteChain,
    news: NewsChain,
    index: IndexChain,
    history: HistoryChain,
}

impl MarketDataService {
    pub fn builder() -> MarketDataServiceBuilder {
        MarketDataServiceBuilder::new()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Latest quote. Input that does not parse as a ticker skips the
    /// providers and is simulated under its uppercased form.
    pub async fn quote(&self, symbol: &str) -> Resolved<Quote> {
        match Symbol::parse(symbol) {
            Ok(parsed) => {
                let request = QuoteRequest::new(parsed);
                self.quotes
                    .resolve_or_else(&request, || self.generator.quote(request.symbol.as_str()))
                    .await
            }
            Err(error) => {
                warn!(input = symbol, %error, "invalid symbol; skipping providers");
                Resolved::fallback(self.generator.quote(symbol), invalid_input(&error))
            }
        }
    }

    /// Up to `news_limit` market headlines.
    pub async fn news(&self) -> Resolved<NewsBatch> {
        let limit = self.config.news_limit;
        self.news
            .resolve_or_else(&NewsRequest::new(limit), || self.generator.news(limit))
            .await
    }

    /// Fear & Greed reading. Index samples are fetched concurrently, each
    /// through its own chain; the fixed fallback reading is used when the
    /// sample set is not scorable.
    pub async fn sentiment(&self) -> Resolved<SentimentReading> {
        let started = Instant::now();
        let results = join_all(
            self.config
                .indices
                .iter()
                .map(|spec| self.index.resolve(spec)),
        )
        .await;

        let mut samples = Vec::with_capacity(results.len());
        let mut source_chain = Vec::new();
        let mut errors = Vec::new();
        let mut selected_source = None;

        for result in results {
            match result {
                Ok(success) => {
                    selected_source = selected_source.or(Some(success.selected_source));
                    source_chain.extend(success.source_chain);
                    errors.extend(success.errors);
                    samples.push(success.data);
                }
                Err(failure) => {
                    source_chain.extend(failure.source_chain);
                    errors.extend(failure.errors);
                }
            }
        }

        let source_chain = dedupe_chain(&source_chain);
        let latency_ms = elapsed_ms(started);

        match sentiment::reading(&samples, UtcDateTime::now()) {
            Ok(reading) => Resolved {
                data: reading,
                provenance: Provenance::Live,
                selected_source,
                source_chain,
                errors,
                latency_ms,
            },
            Err(reason) => {
                info!(
                    samples = samples.len(),
                    %reason,
                    "sentiment samples not scorable; using fallback reading"
                );
                errors.push(EnvelopeError {
                    code: reason.code().to_owned(),
                    message: reason.to_string(),
                    retryable: Some(true),
                    source: None,
                });
                Resolved::fallback(
                    self.generator.sentiment(),
                    RouteFailure {
                        source_chain,
                        errors,
                        latency_ms,
                    },
                )
            }
        }
    }

    /// Most recent `history_window` closes, oldest first.
    pub async fn history(&self, symbol: &str) -> Resolved<PriceHistory> {
        let window = self.config.history_window;
        match Symbol::parse(symbol) {
            Ok(parsed) => {
                let request = HistoryRequest::new(parsed, window);
                self.history
                    .resolve_or_else(&request, || {
                        self.generator.history(request.symbol.as_str(), request.window)
                    })
                    .await
            }
            Err(error) => {
                warn!(input = symbol, %error, "invalid symbol; skipping providers");
                Resolved::fallback(self.generator.history(symbol, window), invalid_input(&error))
            }
        }
    }

    /// Return volatility and correlation of two symbols. Both histories are
    /// fetched concurrently; the result is `fallback` if either side is.
    pub async fn correlation(&self, left: &str, right: &str) -> Resolved<CorrelationReport> {
        let (left, right) = join(self.history(left), self.history(right)).await;

        let provenance = if left.is_live() && right.is_live() {
            Provenance::Live
        } else {
            Provenance::Fallback
        };
        let selected_source = if provenance.is_live() {
            left.selected_source
        } else {
            None
        };

        let mut source_chain = left.source_chain;
        source_chain.extend(right.source_chain);
        let mut errors = left.errors;
        errors.extend(right.errors);

        Resolved {
            data: CorrelationReport::from_histories(left.data, right.data),
            provenance,
            selected_source,
            source_chain: dedupe_chain(&source_chain),
            errors,
            latency_ms: left.latency_ms.max(right.latency_ms),
        }
    }
}

/// Builder wiring configuration, transport, randomness and reference prices.
///
/// # Example
///
/// ```rust,ignore
/// use tradedesk_core::MarketDataService;
///
/// let service = MarketDataService::builder()
///     .with_env_keys()
///     .with_seed(7)
///     .build();
/// let quote = service.quote("AAPL").await;
/// println!("{} {} ({})", quote.data.symbol, quote.data.price, quote.provenance);
/// ```
#[derive(Default)]
pub struct MarketDataServiceBuilder {
    config: ServiceConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    random: Option<Arc<dyn RandomSource>>,
    reference_prices: Option<ReferencePrices>,
    quote_chain: Option<QuoteChain>,
    news_chain: Option<NewsChain>,
    index_chain: Option<IndexChain>,
    history_chain: Option<HistoryChain>,
}

impl MarketDataServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Reads provider keys from the environment.
    pub fn with_env_keys(mut self) -> Self {
        self.config.keys = crate::ProviderKeys::from_env();
        self
    }

    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Every provider call fails, so every operation returns synthetic data.
    pub fn with_offline_mode(self) -> Self {
        self.with_http_client(Arc::new(OfflineHttpClient))
    }

    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_random_source(Arc::new(SeededRandom::new(seed)))
    }

    pub fn with_reference_prices(mut self, prices: ReferencePrices) -> Self {
        self.reference_prices = Some(prices);
        self
    }

    pub fn with_quote_chain(mut self, chain: QuoteChain) -> Self {
        self.quote_chain = Some(chain);
        self
    }

    pub fn with_news_chain(mut self, chain: NewsChain) -> Self {
        self.news_chain = Some(chain);
        self
    }

    pub fn with_index_chain(mut self, chain: IndexChain) -> Self {
        self.index_chain = Some(chain);
        self
    }

    pub fn with_history_chain(mut self, chain: HistoryChain) -> Self {
        self.history_chain = Some(chain);
        self
    }

    pub fn build(self) -> MarketDataService {
        let config = self.config;
        let client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let random = self.random.unwrap_or_else(|| Arc::new(ThreadRandom));
        let prices = Arc::new(self.reference_prices.unwrap_or_default());
        let transport = Transport::new(client).with_timeout(config.timeout);
        let keys = &config.keys;

        let quotes = self.quote_chain.unwrap_or_else(|| {
            QuoteChain::new(Endpoint::Quote)
                .with_provider(Arc::new(YahooQuoteProvider::new(
                    transport.clone(),
                    random.clone(),
                )))
                .with_provider(Arc::new(AlphaVantageQuoteProvider::new(
                    transport.clone(),
                    keys.alphavantage.clone(),
                    random.clone(),
                )))
                .with_provider(Arc::new(PolygonQuoteProvider::new(
                    transport.clone(),
                    keys.polygon.clone(),
                    random.clone(),
                )))
                .with_provider(Arc::new(TwelveDataQuoteProvider::new(
                    transport.clone(),
                    keys.twelvedata.clone(),
                    random.clone(),
                )))
                .with_provider(Arc::new(FmpQuoteProvider::new(
                    transport.clone(),
                    keys.fmp.clone(),
                    random.clone(),
                )))
        });

        let news = self.news_chain.unwrap_or_else(|| {
            NewsChain::new(Endpoint::News)
                .with_provider(Arc::new(AlphaVantageNewsProvider::new(
                    transport.clone(),
                    keys.alphavantage.clone(),
                )))
                .with_provider(Arc::new(FinnhubNewsProvider::new(
                    transport.clone(),
                    keys.finnhub.clone(),
                )))
                .with_provider(Arc::new(NewsApiProvider::new(
                    transport.clone(),
                    keys.newsapi.clone(),
                )))
                .with_provider(Arc::new(YahooRssProvider::new(transport.clone())))
        });

        let index = self.index_chain.unwrap_or_else(|| {
            IndexChain::new(Endpoint::IndexSample)
                .with_provider(Arc::new(YahooIndexProvider::new(transport.clone())))
                .with_provider(Arc::new(AlphaVantageIndexProvider::new(
                    transport.clone(),
                    keys.alphavantage.clone(),
                )))
        });

        let history = self.history_chain.unwrap_or_else(|| {
            HistoryChain::new(Endpoint::History)
                .with_provider(Arc::new(AlphaVantageHistoryProvider::new(
                    transport.clone(),
                    keys.alphavantage.clone(),
                )))
                .with_provider(Arc::new(YahooHistoryProvider::new(transport.clone())))
        });

        let timeout = config.timeout;
        MarketDataService {
            generator: SyntheticGenerator::new(prices, random),
            quotes: quotes.with_timeout(timeout),
            news: news.with_timeout(timeout),
            index: index.with_timeout(timeout),
            history: history.with_timeout(timeout),
            config,
        }
    }
}

fn invalid_input(error: &crate::ValidationError) -> RouteFailure {
    RouteFailure {
        source_chain: Vec::new(),
        errors: vec![EnvelopeError {
            code: String::from("input.invalid_symbol"),
            message: error.to_string(),
            retryable: Some(false),
            source: None,
        }],
        latency_ms: 0,
    }
}

fn dedupe_chain(chain: &[ProviderId]) -> Vec<ProviderId> {
    let mut seen = HashSet::new();
    let mut output = Vec::with_capacity(chain.len());

    for provider in chain {
        if seen.insert(*provider) {
            output.push(*provider);
        }
    }

    output
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
