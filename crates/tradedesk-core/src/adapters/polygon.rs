use std::sync::Arc;

use serde::Deserialize;

use super::Transport;
use crate::fallback::RandomSource;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::normalize::{quote_from_fields, QuoteFields};
use crate::provider::{parse_json, Endpoint, FetchFuture, Provider, QuoteRequest};
use crate::{ProviderId, Quote, SourceError, UtcDateTime};

const BASE_URL: &str = "https://api.polygon.io/v2/aggs/ticker";

/// Previous-day aggregate. Carries OHLCV but no change, so change fields
/// are synthesized.
#[derive(Clone)]
pub struct PolygonQuoteProvider {
    transport: Transport,
    api_key: String,
    random: Arc<dyn RandomSource>,
}

impl PolygonQuoteProvider {
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

impl Provider for PolygonQuoteProvider {
    type Request = QuoteRequest;
    type Output = Quote;

    fn id(&self) -> ProviderId {
        ProviderId::Polygon
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Quote
    }

    fn fetch<'a>(&'a self, request: &'a QuoteRequest) -> FetchFuture<'a> {
        let url = format!(
            "{BASE_URL}/{}/prev?adjusted=true&apiKey={}",
            urlencoding::encode(request.symbol.as_str()),
            urlencoding::encode(&self.api_key)
        );
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(&self, request: &QuoteRequest, response: HttpResponse) -> Result<Quote, SourceError> {
        let payload: PrevResponse = parse_json(self.id(), &response.body)?;

        if let Some(message) = payload.error.or(payload.message) {
            let lowered = message.to_ascii_lowercase();
            if lowered.contains("maximum requests") || lowered.contains("rate limit") {
                return Err(SourceError::rate_limited(format!("polygon: {message}")));
            }
            if payload.results.is_empty() {
                return Err(SourceError::invalid_response(format!("polygon: {message}")));
            }
        }

        let bar = payload
            .results
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::invalid_response("polygon response has no results"))?;

        let fields = QuoteFields {
            price: bar.c,
            open: bar.o,
            high: bar.h,
            low: bar.l,
            volume: bar.v,
            as_of: bar
                .t
                .and_then(|millis| UtcDateTime::from_unix_millis(millis).ok()),
            ..QuoteFields::default()
        };

        quote_from_fields(self.id(), &request.symbol, fields, self.random.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct PrevResponse {
    #[serde(default)]
    results: Vec<PrevBar>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrevBar {
    #[serde(default)]
    c: Option<f64>,
    #[serde(default)]
    o: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    l: Option<f64>,
    #[serde(default)]
    v: Option<f64>,
    #[serde(default)]
    t: Option<i64>,
}
