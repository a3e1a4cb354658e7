//! Contract every provider adapter must honour, whatever its quantity type:
//! one outbound call per fetch, and the same error classification for
//! throttling, transport failure, timeouts and unusable bodies.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use support::{Reply, RoutedHttpClient};
use tradedesk_core::adapters::{
    AlphaVantageHistoryProvider, AlphaVantageIndexProvider, AlphaVantageNewsProvider,
    AlphaVantageQuoteProvider, FinnhubNewsProvider, FmpQuoteProvider, NewsApiProvider,
    PolygonQuoteProvider, Transport, TwelveDataQuoteProvider, YahooHistoryProvider,
    YahooIndexProvider, YahooQuoteProvider, YahooRssProvider,
};
use tradedesk_core::{
    DynProvider, Endpoint, FixedRandom, HistoryRequest, HttpError, IndexRole, IndexSample,
    IndexSpec, NewsBatch, NewsRequest, PriceHistory, Provider, ProviderId, Quote, QuoteRequest,
    RandomSource, SourceErrorKind, Symbol,
};

fn random() -> Arc<dyn RandomSource> {
    Arc::new(FixedRandom(0.5))
}

type QuoteProvider = DynProvider<QuoteRequest, Quote>;
type NewsProvider = DynProvider<NewsRequest, NewsBatch>;
type IndexProvider = DynProvider<IndexSpec, IndexSample>;
type HistoryProvider = DynProvider<HistoryRequest, PriceHistory>;

fn quote_providers(transport: &Transport) -> Vec<QuoteProvider> {
    vec![
        Arc::new(YahooQuoteProvider::new(transport.clone(), random())) as QuoteProvider,
        Arc::new(AlphaVantageQuoteProvider::new(transport.clone(), "key", random())) as QuoteProvider,
        Arc::new(PolygonQuoteProvider::new(transport.clone(), "key", random())) as QuoteProvider,
        Arc::new(TwelveDataQuoteProvider::new(transport.clone(), "key", random())) as QuoteProvider,
        Arc::new(FmpQuoteProvider::new(transport.clone(), "key", random())) as QuoteProvider,
    ]
}

fn news_providers(transport: &Transport) -> Vec<NewsProvider> {
    vec![
        Arc::new(AlphaVantageNewsProvider::new(transport.clone(), "key")) as NewsProvider,
        Arc::new(FinnhubNewsProvider::new(transport.clone(), "key")) as NewsProvider,
        Arc::new(NewsApiProvider::new(transport.clone(), "key")) as NewsProvider,
        Arc::new(YahooRssProvider::new(transport.clone())) as NewsProvider,
    ]
}

fn index_providers(transport: &Transport) -> Vec<IndexProvider> {
    vec![
        Arc::new(YahooIndexProvider::new(transport.clone())) as IndexProvider,
        Arc::new(AlphaVantageIndexProvider::new(transport.clone(), "key")) as IndexProvider,
    ]
}

fn history_providers(transport: &Transport) -> Vec<HistoryProvider> {
    vec![
        Arc::new(AlphaVantageHistoryProvider::new(transport.clone(), "key")) as HistoryProvider,
        Arc::new(YahooHistoryProvider::new(transport.clone())) as HistoryProvider,
    ]
}

fn quote_request() -> QuoteRequest {
    QuoteRequest::new(Symbol::parse("AAPL").expect("valid"))
}

fn history_request() -> HistoryRequest {
    HistoryRequest::new(Symbol::parse("AAPL").expect("valid"), 30)
}

fn index_request() -> IndexSpec {
    IndexSpec::parse("^VIX", IndexRole::Volatility).expect("index ticker")
}

/// Fetches and validates through every provider against one scripted reply,
/// returning the error kind each produced.
macro_rules! outcomes {
    ($providers:expr, $request:expr, $reply:expr) => {{
        let client = RoutedHttpClient::new().route("https://", $reply).shared();
        let transport = Transport::new(client.clone());
        let request = $request;
        let mut kinds = Vec::new();
        for provider in $providers(&transport) {
            let result = match provider.fetch(&request).await {
                Ok(response) => provider.validate(&request, response).map(|_| ()),
                Err(error) => Err(error),
            };
            kinds.push((provider.id(), result.err().map(|error| error.kind())));
        }
        (kinds, client)
    }};
}

fn assert_all(kinds: &[(ProviderId, Option<SourceErrorKind>)], expected: SourceErrorKind) {
    for (id, kind) in kinds {
        assert_eq!(*kind, Some(expected), "provider {id} misclassified");
    }
}

// =============================================================================
// Throttling
// =============================================================================

#[tokio::test]
async fn status_429_is_rate_limited_for_every_provider() {
    let reply = || Reply::Status(429, String::new());

    let (quotes, _) = outcomes!(quote_providers, quote_request(), reply());
    let (news, _) = outcomes!(news_providers, NewsRequest::new(10), reply());
    let (index, _) = outcomes!(index_providers, index_request(), reply());
    let (history, _) = outcomes!(history_providers, history_request(), reply());

    assert_all(&quotes, SourceErrorKind::RateLimited);
    assert_all(&news, SourceErrorKind::RateLimited);
    assert_all(&index, SourceErrorKind::RateLimited);
    assert_all(&history, SourceErrorKind::RateLimited);
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn connection_failure_is_unavailable_and_timeout_is_timeout() {
    let (refused, _) = outcomes!(
        quote_providers,
        quote_request(),
        Reply::Fail(HttpError::new("connection refused"))
    );
    assert_all(&refused, SourceErrorKind::Unavailable);

    let (slow, _) = outcomes!(
        news_providers,
        NewsRequest::new(5),
        Reply::Fail(HttpError::timeout("deadline elapsed"))
    );
    assert_all(&slow, SourceErrorKind::Timeout);
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let (history, _) = outcomes!(
        history_providers,
        history_request(),
        Reply::Status(502, String::from("bad gateway"))
    );
    assert_all(&history, SourceErrorKind::Unavailable);
}

// =============================================================================
// Unusable bodies
// =============================================================================

#[tokio::test]
async fn empty_object_body_is_invalid_response() {
    let reply = || Reply::ok("{}");

    let (quotes, _) = outcomes!(quote_providers, quote_request(), reply());
    let (news, _) = outcomes!(news_providers, NewsRequest::new(10), reply());
    let (index, _) = outcomes!(index_providers, index_request(), reply());
    let (history, _) = outcomes!(history_providers, history_request(), reply());

    assert_all(&quotes, SourceErrorKind::InvalidResponse);
    assert_all(&news, SourceErrorKind::InvalidResponse);
    assert_all(&index, SourceErrorKind::InvalidResponse);
    assert_all(&history, SourceErrorKind::InvalidResponse);
}

// =============================================================================
// Identity and call count
// =============================================================================

#[tokio::test]
async fn each_fetch_makes_exactly_one_call() {
    let (quotes, client) = outcomes!(quote_providers, quote_request(), Reply::ok("{}"));
    assert_eq!(client.requested().len(), quotes.len());

    let ids = quotes.iter().map(|(id, _)| *id).collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            ProviderId::Yahoo,
            ProviderId::Alphavantage,
            ProviderId::Polygon,
            ProviderId::Twelvedata,
            ProviderId::Fmp,
        ]
    );
}

#[test]
fn providers_declare_their_quantity_type() {
    let client = RoutedHttpClient::new().shared();
    let transport = Transport::new(client);

    assert!(quote_providers(&transport)
        .iter()
        .all(|provider| provider.endpoint() == Endpoint::Quote));
    assert!(news_providers(&transport)
        .iter()
        .all(|provider| provider.endpoint() == Endpoint::News));
    assert!(index_providers(&transport)
        .iter()
        .all(|provider| provider.endpoint() == Endpoint::IndexSample));
    assert!(history_providers(&transport)
        .iter()
        .all(|provider| provider.endpoint() == Endpoint::History));
}
