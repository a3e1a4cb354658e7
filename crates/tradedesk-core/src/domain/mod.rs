//! # Domain Models
//!
//! Canonical, request-scoped value types shared by every provider, the
//! fallback generator and the sentiment scorer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Quote`] | Latest price with change, day range and provenance label |
//! | [`NewsArticle`] | Headline with non-empty title and description |
//! | [`SentimentReading`] | 0-100 Fear & Greed score with factors |
//! | [`IndexSample`] | One tracked index reading used for scoring |
//! | [`PriceHistory`] | Closing prices, oldest first |
//! | [`Symbol`] | Validated ticker |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Nothing here is persisted; values are built per request and dropped after
//! the response is produced.

mod models;
mod symbol;
mod timestamp;

pub use models::{
    DataQuality, IndexReading, IndexRole, IndexSample, NewsArticle, NewsBatch, PriceHistory,
    Provenance, Quote, SentimentLabel, SentimentReading,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
