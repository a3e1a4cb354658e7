use std::sync::Arc;

use serde::Deserialize;

use super::Transport;
use crate::fallback::RandomSource;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::normalize::{quote_from_fields, QuoteFields};
use crate::provider::{parse_json, Endpoint, FetchFuture, Provider, QuoteRequest};
use crate::{ProviderId, Quote, SourceError};

const BASE_URL: &str = "https://financialmodelingprep.com/api/v3/quote-short";

/// `quote-short`: price and volume only.
#[derive(Clone)]
pub struct FmpQuoteProvider {
    transport: Transport,
    api_key: String,
    random: Arc<dyn RandomSource>,
}

impl FmpQuoteProvider {
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

impl Provider for FmpQuoteProvider {
    type Request = QuoteRequest;
    type Output = Quote;

    fn id(&self) -> ProviderId {
        ProviderId::Fmp
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Quote
    }

    fn fetch<'a>(&'a self, request: &'a QuoteRequest) -> FetchFuture<'a> {
        let url = format!(
            "{BASE_URL}/{}?apikey={}",
            urlencoding::encode(request.symbol.as_str()),
            urlencoding::encode(&self.api_key)
        );
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(&self, request: &QuoteRequest, response: HttpResponse) -> Result<Quote, SourceError> {
        let quotes = match parse_json::<ShortQuotePayload>(self.id(), &response.body)? {
            ShortQuotePayload::Quotes(quotes) => quotes,
            ShortQuotePayload::Error { message } => {
                return Err(if message.to_ascii_lowercase().contains("limit reach") {
                    SourceError::rate_limited(format!("fmp: {message}"))
                } else {
                    SourceError::invalid_response(format!("fmp: {message}"))
                });
            }
        };

        let quote = quotes
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::invalid_response("fmp response has no quotes"))?;

        let fields = QuoteFields {
            price: quote.price,
            volume: quote.volume,
            ..QuoteFields::default()
        };

        quote_from_fields(self.id(), &request.symbol, fields, self.random.as_ref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ShortQuotePayload {
    Quotes(Vec<ShortQuote>),
    Error {
        #[serde(rename = "Error Message")]
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct ShortQuote {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{transport, RecordingHttpClient};
    use crate::fallback::FixedRandom;
    use crate::{SourceErrorKind, Symbol};

    fn provider() -> FmpQuoteProvider {
        FmpQuoteProvider::new(
            transport(RecordingHttpClient::ok("")),
            "demo",
            Arc::new(FixedRandom(0.5)),
        )
    }

    fn request() -> QuoteRequest {
        QuoteRequest::new(Symbol::parse("KO").expect("valid symbol"))
    }

    #[test]
    fn short_quote_maps_price_and_volume() {
        let body = r#"[{"symbol":"KO","price":62.84,"volume":11234567}]"#;
        let quote = provider()
            .validate(&request(), HttpResponse::ok(body))
            .expect("quote");
        assert_eq!(quote.price, 62.84);
        assert_eq!(quote.volume, 11_234_567);
        assert_eq!(quote.change, 0.0);
    }

    #[test]
    fn empty_array_is_invalid() {
        let error = provider()
            .validate(&request(), HttpResponse::ok("[]"))
            .expect_err("no quotes");
        assert_eq!(error.kind(), SourceErrorKind::InvalidResponse);
    }

    #[test]
    fn limit_reach_message_is_rate_limited() {
        let body = r#"{"Error Message":"Limit Reach . Please upgrade your plan or visit our documentation"}"#;
        let error = provider()
            .validate(&request(), HttpResponse::ok(body))
            .expect_err("limit");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    }
}
