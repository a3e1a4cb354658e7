//! # Tradedesk Core
//!
//! Market data aggregation for the tradedesk dashboard: quotes, headlines,
//! a Fear & Greed reading and price history, each resolved through an
//! ordered chain of upstream providers with a synthetic fallback.
//!
//! ## Overview
//!
//! - **Source chains** try providers in a fixed order and stop at the first
//!   valid result
//! - **Normalization** maps each provider schema onto one canonical shape
//! - **Synthetic fallback** produces clearly labelled simulated data when
//!   every provider fails, so no operation ever surfaces an error
//! - **Sentiment scoring** turns index moves and the volatility index into
//!   a 0-100 score
//! - **Calculators** plan stop-loss, take-profit, position size and
//!   trailing stops
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo, Alpha Vantage, Polygon, Twelve Data, FMP, Finnhub, NewsAPI, Yahoo RSS) |
//! | [`analytics`] | Daily returns, volatility and correlation |
//! | [`calculators`] | Stop-loss, take-profit, position size and trailing stop arithmetic |
//! | [`config`] | API keys, timeouts and tracked indices |
//! | [`domain`] | Canonical models (Quote, NewsArticle, SentimentReading, PriceHistory) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`fallback`] | Synthetic data generator and reference prices |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Shared field normalization and RSS parsing |
//! | [`provider`] | Provider trait and request types |
//! | [`resolver`] | Ordered source chains |
//! | [`sentiment`] | Fear & Greed scoring |
//! | [`service`] | Public operations |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tradedesk_core::MarketDataService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = MarketDataService::builder().with_env_keys().build();
//!
//!     let quote = service.quote("AAPL").await;
//!     println!("AAPL ${:.2} via {} ({})", quote.data.price, quote.data.source, quote.provenance);
//!
//!     let sentiment = service.sentiment().await;
//!     println!("{} ({})", sentiment.data.score, sentiment.data.label);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ MarketData      │────▶│ Sentiment Scorer │
//! │ Service         │     └──────────────────┘
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Source Chain    │────▶│ Synthetic        │
//! │ (ordered)       │     │ Generator        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Provider        │────▶│ HTTP Client      │
//! │ (fetch+validate)│     │ (reqwest/offline)│
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Provider failures never reach the caller; they are recorded on the
//! result instead:
//!
//! ```rust,ignore
//! let resolved = service.quote("MSFT").await;
//! for error in &resolved.errors {
//!     eprintln!("{:?}: {} ({})", error.source, error.message, error.code);
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from environment variables only and never logged
//! - All HTTP requests use TLS via rustls

pub mod adapters;
pub mod analytics;
pub mod calculators;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod http_client;
pub mod normalize;
pub mod provider;
pub mod resolver;
pub mod sentiment;
pub mod service;
pub mod source;

// Analytics
pub use analytics::{CorrelationReport, CorrelationStrength};

// Calculators
pub use calculators::{
    AtrLevel, AtrLevels, AtrPlan, PercentLevel, PositionSize, Side, TradeLevels, Trail,
    TrailingPoint, TrailingStop,
};

// Configuration
pub use config::{IndexSpec, ProviderKeys, ServiceConfig};

// Domain models
pub use domain::{
    DataQuality, IndexReading, IndexRole, IndexSample, NewsArticle, NewsBatch, PriceHistory,
    Provenance, Quote, SentimentLabel, SentimentReading, Symbol, UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Error types
pub use error::{CoreError, SentimentError, ValidationError};

// Fallback generation
pub use fallback::{
    FixedRandom, RandomSource, ReferencePrices, SeededRandom, SyntheticGenerator, ThreadRandom,
};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, OfflineHttpClient,
    ReqwestHttpClient,
};

// Provider contract
pub use provider::{
    DynProvider, Endpoint, FetchFuture, HistoryRequest, NewsRequest, Provider, QuoteRequest,
    SourceError, SourceErrorKind,
};

// Resolution
pub use resolver::{Resolved, RouteFailure, RouteResult, RouteSuccess, SourceChain};

// Service
pub use service::{MarketDataService, MarketDataServiceBuilder};

// Source identifiers
pub use source::ProviderId;
