use std::sync::Arc;

use serde::Deserialize;

use super::{parse_decimal, Transport};
use crate::fallback::RandomSource;
use crate::http_client::{HttpRequest, HttpResponse};
use crate::normalize::{quote_from_fields, QuoteFields};
use crate::provider::{parse_json, Endpoint, FetchFuture, Provider, QuoteRequest};
use crate::{ProviderId, Quote, SourceError};

const BASE_URL: &str = "https://api.twelvedata.com/price";

/// Price-only endpoint.
#[derive(Clone)]
pub struct TwelveDataQuoteProvider {
    transport: Transport,
    api_key: String,
    random: Arc<dyn RandomSource>,
}

impl TwelveDataQuoteProvider {
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

impl Provider for TwelveDataQuoteProvider {
    type Request = QuoteRequest;
    type Output = Quote;

    fn id(&self) -> ProviderId {
        ProviderId::Twelvedata
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Quote
    }

    fn fetch<'a>(&'a self, request: &'a QuoteRequest) -> FetchFuture<'a> {
        let url = format!(
            "{BASE_URL}?symbol={}&apikey={}",
            urlencoding::encode(request.symbol.as_str()),
            urlencoding::encode(&self.api_key)
        );
        Box::pin(self.transport.get(self.id(), HttpRequest::get(url)))
    }

    fn validate(&self, request: &QuoteRequest, response: HttpResponse) -> Result<Quote, SourceError> {
        let payload: PriceResponse = parse_json(self.id(), &response.body)?;

        if payload.status.as_deref() == Some("error") {
            let message = payload.message.unwrap_or_else(|| String::from("unknown error"));
            return Err(if payload.code == Some(429) {
                SourceError::rate_limited(format!("twelvedata: {message}"))
            } else {
                SourceError::invalid_response(format!("twelvedata: {message}"))
            });
        }

        let fields = QuoteFields {
            price: parse_decimal(payload.price.as_deref()),
            ..QuoteFields::default()
        };

        quote_from_fields(self.id(), &request.symbol, fields, self.random.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}
