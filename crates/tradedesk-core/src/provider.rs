//! Provider contract and request types.
//!
//! Every upstream source implements [`Provider`]: a `fetch` step that talks to
//! the network and a `validate` step that turns the raw response into a
//! canonical value or rejects it. The [`SourceChain`](crate::SourceChain)
//! iterates providers of one quantity type through this single contract.
//!
//! # Endpoints
//!
//! | Endpoint | Request | Output |
//! |----------|---------|--------|
//! | Quote | [`QuoteRequest`] | [`Quote`](crate::Quote) |
//! | News | [`NewsRequest`] | [`NewsBatch`](crate::NewsBatch) |
//! | IndexSample | [`IndexSpec`] | [`IndexSample`](crate::IndexSample) |
//! | History | [`HistoryRequest`] | [`PriceHistory`](crate::PriceHistory) |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::{IndexSpec, ProviderId, Symbol, ValidationError};

/// Quantity type a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Quote,
    News,
    IndexSample,
    History,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::News => "news",
            Self::IndexSample => "index_sample",
            Self::History => "history",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-level failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure or non-success status.
    Unavailable,
    /// Provider reported a quota or rate-limit signal.
    RateLimited,
    /// The call exceeded its time budget.
    Timeout,
    /// The response parsed but failed shape or quality checks.
    InvalidResponse,
}

/// Structured provider error used by the source chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_response(error.to_string())
    }
}

/// Request payload for quote providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub symbol: Symbol,
}

impl QuoteRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

/// Request payload for news providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsRequest {
    pub limit: usize,
}

impl NewsRequest {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }
}

/// Request payload for closing-price history providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub window: usize,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, window: usize) -> Self {
        Self {
            symbol,
            window: window.max(2),
        }
    }
}

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, SourceError>> + Send + 'a>>;

/// Upstream data source contract.
///
/// `fetch` performs exactly one outbound call. `validate` is pure: it maps the
/// provider's schema to the canonical output and rejects responses that are
/// malformed, empty, rate-limited or carry a non-positive price.
pub trait Provider: Send + Sync {
    type Request: Send + Sync;
    type Output: Send;

    fn id(&self) -> ProviderId;

    fn endpoint(&self) -> Endpoint;

    fn fetch<'a>(&'a self, request: &'a Self::Request) -> FetchFuture<'a>;

    fn validate(
        &self,
        request: &Self::Request,
        response: HttpResponse,
    ) -> Result<Self::Output, SourceError>;
}

/// Shared, type-erased provider handle.
pub type DynProvider<R, T> = Arc<dyn Provider<Request = R, Output = T>>;

/// Executes one GET and classifies transport failures and HTTP statuses.
pub(crate) async fn execute(
    client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<HttpResponse, SourceError> {
    let response = client.execute(request).await.map_err(|error| {
        if error.timed_out() {
            SourceError::timeout(format!("{provider} timed out: {}", error.message()))
        } else {
            SourceError::unavailable(format!("{provider} transport error: {}", error.message()))
        }
    })?;

    if response.is_rate_limited() {
        return Err(SourceError::rate_limited(format!(
            "{provider} returned status 429"
        )));
    }

    if !response.is_success() {
        return Err(SourceError::unavailable(format!(
            "{provider} returned status {}",
            response.status
        )));
    }

    Ok(response)
}

pub(crate) fn parse_json<T: DeserializeOwned>(
    provider: ProviderId,
    body: &str,
) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| {
        SourceError::invalid_response(format!("failed to parse {provider} response: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpError;

    struct FixedClient(Result<HttpResponse, HttpError>);

    impl HttpClient for FixedClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self.0.clone();
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        let client = FixedClient(Ok(HttpResponse::new(429, "slow down")));
        let error = execute(&client, ProviderId::Finnhub, HttpRequest::get("https://x.test"))
            .await
            .expect_err("429 must fail");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
        assert_eq!(error.code(), "source.rate_limited");
    }

    #[tokio::test]
    async fn transport_timeout_keeps_timeout_kind() {
        let client = FixedClient(Err(HttpError::timeout("deadline elapsed")));
        let error = execute(&client, ProviderId::Yahoo, HttpRequest::get("https://x.test"))
            .await
            .expect_err("timeout must fail");
        assert_eq!(error.kind(), SourceErrorKind::Timeout);
    }

    #[test]
    fn malformed_json_is_invalid_response() {
        let error = parse_json::<serde_json::Value>(ProviderId::Polygon, "<html>")
            .expect_err("not json");
        assert_eq!(error.kind(), SourceErrorKind::InvalidResponse);
        assert!(error.message().contains("polygon"));
    }
}
