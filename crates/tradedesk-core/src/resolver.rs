//! Ordered provider iteration with short-circuit on the first valid result.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_TIMEOUT_MS;
use crate::provider::{DynProvider, Endpoint, SourceError};
use crate::{EnvelopeError, ProviderId, Provenance};

/// Successful resolution.
#[derive(Debug, Clone)]
pub struct RouteSuccess<T> {
    pub data: T,
    pub selected_source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
}

/// Every candidate failed.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
}

pub type RouteResult<T> = Result<RouteSuccess<T>, RouteFailure>;

/// Operation result with provenance; what the public operations return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub data: T,
    pub provenance: Provenance,
    pub selected_source: Option<ProviderId>,
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
}

impl<T> Resolved<T> {
    pub fn live(success: RouteSuccess<T>) -> Self {
        Self {
            data: success.data,
            provenance: Provenance::Live,
            selected_source: Some(success.selected_source),
            source_chain: success.source_chain,
            errors: success.errors,
            latency_ms: success.latency_ms,
        }
    }

    pub fn fallback(data: T, failure: RouteFailure) -> Self {
        Self {
            data,
            provenance: Provenance::Fallback,
            selected_source: None,
            source_chain: failure.source_chain,
            errors: failure.errors,
            latency_ms: failure.latency_ms,
        }
    }

    /// Value derived from caller input alone; no provider was consulted and
    /// nothing was simulated.
    pub fn computed(data: T) -> Self {
        Self {
            data,
            provenance: Provenance::Live,
            selected_source: None,
            source_chain: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.provenance.is_live()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            data: f(self.data),
            provenance: self.provenance,
            selected_source: self.selected_source,
            source_chain: self.source_chain,
            errors: self.errors,
            latency_ms: self.latency_ms,
        }
    }
}

/// Ordered candidates for one quantity type.
pub struct SourceChain<R, T> {
    endpoint: Endpoint,
    providers: Vec<DynProvider<R, T>>,
    timeout: Duration,
}

impl<R, T> Clone for SourceChain<R, T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint,
            providers: self.providers.clone(),
            timeout: self.timeout,
        }
    }
}

impl<R, T> SourceChain<R, T>
where
    R: Send + Sync,
    T: Send,
{
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            providers: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_provider(mut self, provider: DynProvider<R, T>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|provider| provider.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Tries each provider once, in order. Later providers are never invoked
    /// once one succeeds.
    pub async fn resolve(&self, request: &R) -> RouteResult<T> {
        let started = Instant::now();
        let mut source_chain = Vec::with_capacity(self.providers.len());
        let mut errors = Vec::new();

        for provider in &self.providers {
            let id = provider.id();
            source_chain.push(id);
            debug!(endpoint = %self.endpoint, provider = %id, "attempting provider");

            match self.attempt(provider, request).await {
                Ok(data) => {
                    if !errors.is_empty() {
                        info!(
                            endpoint = %self.endpoint,
                            provider = %id,
                            failed_attempts = errors.len(),
                            "provider succeeded after earlier failures"
                        );
                    }

                    return Ok(RouteSuccess {
                        data,
                        selected_source: id,
                        source_chain,
                        errors,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    warn!(
                        endpoint = %self.endpoint,
                        provider = %id,
                        code = error.code(),
                        message = error.message(),
                        "provider attempt failed"
                    );
                    errors.push(EnvelopeError::from_source(id, &error));
                }
            }
        }

        if errors.is_empty() {
            errors.push(EnvelopeError {
                code: String::from("source.no_candidate"),
                message: format!(
                    "no source candidates available for endpoint '{}'",
                    self.endpoint
                ),
                retryable: Some(false),
                source: None,
            });
        }

        Err(RouteFailure {
            source_chain,
            errors,
            latency_ms: elapsed_ms(started),
        })
    }

    /// Resolves, or builds the result with `fallback` when every provider
    /// failed. Never fails.
    pub async fn resolve_or_else<F>(&self, request: &R, fallback: F) -> Resolved<T>
    where
        F: FnOnce() -> T,
    {
        match self.resolve(request).await {
            Ok(success) => Resolved::live(success),
            Err(failure) => {
                info!(
                    endpoint = %self.endpoint,
                    attempts = failure.source_chain.len(),
                    "all providers failed; using synthetic data"
                );
                Resolved::fallback(fallback(), failure)
            }
        }
    }

    async fn attempt(&self, provider: &DynProvider<R, T>, request: &R) -> Result<T, SourceError> {
        let call = async {
            let response = provider.fetch(request).await?;
            provider.validate(request, response)
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::timeout(format!(
                "{} exceeded {} ms",
                provider.id(),
                self.timeout.as_millis()
            ))),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
