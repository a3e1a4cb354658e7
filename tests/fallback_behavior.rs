//! Behaviour tests for synthetic fallback data.
//!
//! Every provider is unreachable in these tests, so each operation must
//! still answer with clearly labelled simulated values.

use std::collections::HashMap;
use std::sync::Arc;

use tradedesk_core::fallback::{SIMULATED_QUOTE_SOURCE, SIMULATED_SENTIMENT_SOURCE};
use tradedesk_core::{
    CoreError, DataQuality, FixedRandom, MarketDataService, Provenance, ReferencePrices,
    SentimentLabel, ServiceConfig, ValidationError,
};

fn offline_with(prices: ReferencePrices, seed: u64) -> MarketDataService {
    MarketDataService::builder()
        .with_offline_mode()
        .with_reference_prices(prices)
        .with_seed(seed)
        .build()
}

// =============================================================================
// Quotes
// =============================================================================

#[tokio::test]
async fn when_symbol_has_reference_price_simulated_quote_stays_near_it() {
    // Given: An offline service with the built-in reference snapshot
    let prices = ReferencePrices::default();
    let base = prices.get("AAPL").expect("AAPL is in the snapshot");

    for seed in 0..20 {
        // When: A quote is requested
        let quote = offline_with(prices.clone(), seed).quote("AAPL").await.data;

        // Then: Price is within 1.5% of the reference and the range is consistent
        assert!(
            (quote.price - base).abs() <= base * 0.015 + 0.01,
            "seed {seed}: {} too far from {base}",
            quote.price
        );
        assert!(quote.high >= quote.price);
        assert!(quote.low <= quote.price);
        assert!((1_000_000..6_000_000).contains(&quote.volume));
        assert_eq!(quote.source, SIMULATED_QUOTE_SOURCE);
        assert_eq!(quote.data_quality, DataQuality::Simulated);
        assert_eq!(quote.name, "AAPL Corporation");
    }
}

#[tokio::test]
async fn when_symbol_is_unknown_base_is_drawn_from_fixed_range() {
    let resolved = offline_with(ReferencePrices::empty(), 3).quote("ZZZZ").await;

    assert_eq!(resolved.provenance, Provenance::Fallback);
    let price = resolved.data.price;
    assert!((50.0 * 0.985..=250.0 * 1.015).contains(&price), "price {price}");
}

#[tokio::test]
async fn when_randomness_is_fixed_simulated_quote_is_reproducible() {
    // Given: Two services with the same seed
    let first = offline_with(ReferencePrices::default(), 42).quote("NVDA").await.data;
    let second = offline_with(ReferencePrices::default(), 42).quote("NVDA").await.data;

    // Then: Values match field for field, apart from the timestamp
    assert_eq!(first.price, second.price);
    assert_eq!(first.change_percent, second.change_percent);
    assert_eq!(first.volume, second.volume);
}

#[tokio::test]
async fn when_midpoint_randomness_is_used_price_equals_reference() {
    // Given: A random source that always returns the midpoint
    let service = MarketDataService::builder()
        .with_offline_mode()
        .with_reference_prices(ReferencePrices::empty().with_price("ACME", 100.0))
        .with_random_source(Arc::new(FixedRandom(0.5)))
        .build();

    // When: A quote is requested
    let quote = service.quote("acme").await.data;

    // Then: Zero jitter leaves the reference price and the fixed factors
    assert_eq!(quote.price, 100.0);
    assert_eq!(quote.change, 0.0);
    assert_eq!(quote.high, 101.5);
    assert_eq!(quote.low, 98.5);
    assert_eq!(quote.open, 99.8);
}

#[tokio::test]
async fn when_reference_price_is_sub_cent_simulated_quote_stays_positive() {
    // Given: A penny stock whose reference price rounds to zero cents
    let prices = ReferencePrices::from_json_str(r#"{"PENNY": 0.004}"#).expect("positive price");

    for seed in 0..10 {
        // When: A quote is requested offline
        let quote = offline_with(prices.clone(), seed).quote("PENNY").await.data;

        // Then: The quote is still a valid canonical quote
        assert!(quote.price > 0.0, "seed {seed}: price {}", quote.price);
        assert!(quote.high >= quote.price && quote.price >= quote.low);
        assert!(quote.validate().is_ok());
    }
}

#[tokio::test]
async fn when_builder_is_given_negative_price_it_is_ignored() {
    // Given: A builder entry that could never be a market price
    let prices = ReferencePrices::empty().with_price("NEG", -10.0);
    assert!(prices.is_empty());

    // When: A quote is requested for that symbol
    let quote = offline_with(prices, 4).quote("NEG").await.data;

    // Then: The unknown-symbol range is used instead
    assert!(quote.price >= 50.0 * 0.985);
    assert!(quote.validate().is_ok());
}

// =============================================================================
// Reference price loading
// =============================================================================

#[test]
fn reference_prices_load_from_json_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prices.json");
    std::fs::write(&path, r#"{"aapl": 200.5, "TSLA": 310.0}"#).expect("write");

    let prices = ReferencePrices::from_path(&path).expect("loads");

    assert_eq!(prices.len(), 2);
    assert_eq!(prices.get("AAPL"), Some(200.5));
}

#[test]
fn reference_prices_reject_non_positive_values() {
    let error = ReferencePrices::from_json_str(r#"{"BAD": -1.0}"#).expect_err("rejected");
    assert!(matches!(
        error,
        CoreError::Validation(ValidationError::NonPositiveValue { .. })
    ));

    let prices = HashMap::from([(String::from("ZERO"), 0.0)]);
    assert!(ReferencePrices::from_map(prices).is_err());
}

#[test]
fn missing_reference_file_reports_path() {
    let error = ReferencePrices::from_path("/definitely/not/here.json").expect_err("missing");
    assert!(matches!(error, CoreError::Io { .. }));
    assert!(error.to_string().contains("/definitely/not/here.json"));
}

// =============================================================================
// News, sentiment and history
// =============================================================================

#[tokio::test]
async fn when_news_falls_back_six_fixed_headlines_are_available() {
    let service = offline_with(ReferencePrices::default(), 1);

    let news = service.news().await;

    assert_eq!(news.provenance, Provenance::Fallback);
    assert_eq!(news.data.articles.len(), 6);
    assert!(news
        .data
        .articles
        .iter()
        .all(|article| !article.title.is_empty() && !article.description.is_empty()));
}

#[tokio::test]
async fn when_sentiment_falls_back_fixed_fearful_reading_is_returned() {
    let reading = offline_with(ReferencePrices::default(), 9).sentiment().await.data;

    assert_eq!(reading.score, 35);
    assert_eq!(reading.label, SentimentLabel::Fear);
    assert_eq!(reading.provenance, Provenance::Fallback);
    assert_eq!(reading.source, SIMULATED_SENTIMENT_SOURCE);
    assert_eq!(reading.factors.len(), 4);
    assert_eq!(reading.source_indices.len(), 4);
}

#[tokio::test]
async fn when_history_falls_back_walk_has_window_points_above_floor() {
    // Given: A sixty-point window and a known reference price
    let service = MarketDataService::builder()
        .with_config(ServiceConfig::default().with_history_window(60))
        .with_offline_mode()
        .with_reference_prices(ReferencePrices::empty().with_price("SPY", 500.0))
        .with_seed(17)
        .build();

    // When: History is requested
    let history = service.history("spy").await;

    // Then: Every point stays at or above 80% of the reference
    assert_eq!(history.provenance, Provenance::Fallback);
    assert_eq!(history.data.symbol, "SPY");
    assert_eq!(history.data.prices.len(), 60);
    assert!(history.data.prices.iter().all(|price| *price >= 400.0));
}

#[tokio::test]
async fn when_either_history_falls_back_correlation_is_fallback() {
    let service = offline_with(ReferencePrices::default(), 23);

    let resolved = service.correlation("SPY", "QQQ").await;

    assert_eq!(resolved.provenance, Provenance::Fallback);
    let report = resolved.data;
    assert_eq!(report.left.symbol, "SPY");
    assert_eq!(report.right.symbol, "QQQ");
    let coefficient = report.correlation.expect("random walks are not constant");
    assert!((-1.0..=1.0).contains(&coefficient));
    assert!(report.left_volatility.expect("defined") >= 0.0);
}
