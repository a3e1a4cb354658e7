//! Synthetic data used when every live provider for a quantity has failed.
//!
//! All randomness flows through one [`RandomSource`]; reference prices come
//! from an injectable [`ReferencePrices`] table. Given a fixed random source
//! every generated value is reproducible.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::{
    CoreError, DataQuality, IndexReading, NewsArticle, NewsBatch, PriceHistory, Provenance, Quote,
    SentimentLabel, SentimentReading, UtcDateTime, ValidationError,
};

pub const SIMULATED_QUOTE_SOURCE: &str = "Simulated (providers unavailable)";
pub const SIMULATED_SENTIMENT_SOURCE: &str = "Market-Aware Simulation (providers unavailable)";

const QUOTE_JITTER_PERCENT: f64 = 1.5;
const UNKNOWN_BASE_MIN: f64 = 50.0;
const UNKNOWN_BASE_MAX: f64 = 250.0;
const HIGH_FACTOR: f64 = 1.015;
const LOW_FACTOR: f64 = 0.985;
const OPEN_FACTOR: f64 = 0.998;
const VOLUME_MIN: u64 = 1_000_000;
const VOLUME_SPAN: u64 = 5_000_000;
const HISTORY_DEFAULT_BASE: f64 = 150.0;
const HISTORY_STEP: f64 = 2.5;
const HISTORY_FLOOR_RATIO: f64 = 0.8;
const MIN_PRICE: f64 = 0.01;

/// Source of uniform values in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Uniform value in `[low, high)` drawn from `random`.
pub fn uniform(random: &dyn RandomSource, low: f64, high: f64) -> f64 {
    low + random.next_unit().clamp(0.0, 1.0) * (high - low)
}

/// Thread-local generator; non-reproducible.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        fastrand::f64()
    }
}

/// Seeded generator producing the same sequence for the same seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<fastrand::Rng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.f64(),
            Err(poisoned) => poisoned.into_inner().f64(),
        }
    }
}

/// Always returns the same value. Useful for pinning outputs in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Ticker → recent reference price.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePrices {
    prices: HashMap<String, f64>,
}

impl Default for ReferencePrices {
    fn default() -> Self {
        const SNAPSHOT: [(&str, f64); 25] = [
            ("AAPL", 252.31),
            ("GOOGL", 165.42),
            ("MSFT", 416.67),
            ("TSLA", 258.85),
            ("AMZN", 178.92),
            ("META", 486.73),
            ("NVDA", 892.15),
            ("NFLX", 678.43),
            ("SPY", 563.28),
            ("QQQ", 478.64),
            ("JPM", 218.37),
            ("JNJ", 162.85),
            ("V", 289.74),
            ("PG", 168.29),
            ("MA", 534.82),
            ("ORCL", 142.35),
            ("WMT", 78.44),
            ("UNH", 548.92),
            ("HD", 385.76),
            ("BAC", 42.18),
            ("DIS", 96.43),
            ("ADBE", 512.88),
            ("CRM", 287.65),
            ("VZ", 41.29),
            ("KO", 62.84),
        ];

        Self {
            prices: SNAPSHOT
                .iter()
                .map(|(symbol, price)| ((*symbol).to_owned(), *price))
                .collect(),
        }
    }
}

impl ReferencePrices {
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    pub fn from_map(prices: HashMap<String, f64>) -> Result<Self, ValidationError> {
        let mut normalized = HashMap::with_capacity(prices.len());
        for (symbol, price) in prices {
            check_reference_price(price)?;
            normalized.insert(symbol.trim().to_ascii_uppercase(), price);
        }
        Ok(Self { prices: normalized })
    }

    /// Parses a JSON object such as `{"AAPL": 252.31}`.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let prices: HashMap<String, f64> = serde_json::from_str(json)?;
        Ok(Self::from_map(prices)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Adds or replaces one entry. Non-finite and non-positive prices are
    /// ignored, leaving the table as it was.
    pub fn with_price(mut self, symbol: impl AsRef<str>, price: f64) -> Self {
        if check_reference_price(price).is_ok() {
            self.prices
                .insert(symbol.as_ref().trim().to_ascii_uppercase(), price);
        }
        self
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(&symbol.to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

const FALLBACK_HEADLINES: [(&str, &str, &str); 6] = [
    (
        "Stock Market Shows Resilience Amid Economic Uncertainty",
        "Major indices maintain stability as investors weigh economic indicators and corporate earnings. Technology and healthcare sectors lead market performance.",
        "Market Analytics",
    ),
    (
        "Federal Reserve Signals Measured Approach to Interest Rates",
        "Central bank officials indicate continued monitoring of inflation trends while maintaining flexibility in monetary policy decisions.",
        "Fed Watch",
    ),
    (
        "Corporate Earnings Season Reveals Mixed Results",
        "Companies report varied quarterly performance with some sectors outperforming expectations while others face headwinds from supply chain challenges.",
        "Earnings Report",
    ),
    (
        "Energy Sector Volatility Continues to Impact Markets",
        "Oil and gas prices fluctuate based on geopolitical developments and supply chain dynamics, affecting broader market sentiment.",
        "Energy Markets",
    ),
    (
        "Tech Stocks Rally on Innovation and Growth Prospects",
        "Technology companies benefit from continued digital transformation trends and strong consumer demand for innovative products and services.",
        "Tech Analysis",
    ),
    (
        "Global Trade Patterns Shift Amid Economic Realignment",
        "International commerce adapts to new economic realities with emerging markets playing increasingly important roles in global supply chains.",
        "Global Markets",
    ),
];

/// Builds clearly labelled simulated values for each quantity type.
#[derive(Clone)]
pub struct SyntheticGenerator {
    prices: Arc<ReferencePrices>,
    random: Arc<dyn RandomSource>,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ReferencePrices::default()), Arc::new(ThreadRandom))
    }
}

impl SyntheticGenerator {
    pub fn new(prices: Arc<ReferencePrices>, random: Arc<dyn RandomSource>) -> Self {
        Self { prices, random }
    }

    pub fn random(&self) -> &Arc<dyn RandomSource> {
        &self.random
    }

    pub fn reference_prices(&self) -> &ReferencePrices {
        &self.prices
    }

    /// Simulated quote. `symbol` is the caller's raw input; it is uppercased
    /// but not otherwise validated.
    pub fn quote(&self, symbol: &str) -> Quote {
        let symbol = display_symbol(symbol);
        let base = self.prices.get(&symbol).unwrap_or_else(|| {
            uniform(self.random.as_ref(), UNKNOWN_BASE_MIN, UNKNOWN_BASE_MAX)
        });

        let change_percent = uniform(
            self.random.as_ref(),
            -QUOTE_JITTER_PERCENT,
            QUOTE_JITTER_PERCENT,
        );
        let change = base * change_percent / 100.0;
        let price = round_cents(base + change).max(MIN_PRICE);
        let volume = VOLUME_MIN + (self.random.next_unit().clamp(0.0, 0.999_999) * VOLUME_SPAN as f64) as u64;

        Quote {
            name: format!("{symbol} Corporation"),
            symbol,
            price,
            change: round_cents(change),
            change_percent: round_cents(change_percent),
            high: round_cents(price * HIGH_FACTOR),
            low: round_cents(price * LOW_FACTOR),
            open: round_cents(price * OPEN_FACTOR),
            previous_close: Some(round_cents(base).max(MIN_PRICE)),
            volume,
            last_updated: UtcDateTime::now(),
            source: String::from(SIMULATED_QUOTE_SOURCE),
            data_quality: DataQuality::Simulated,
        }
    }

    /// Up to six fixed headlines one hour apart, most recent first.
    pub fn news(&self, limit: usize) -> NewsBatch {
        let now = UtcDateTime::now();
        let articles = FALLBACK_HEADLINES
            .iter()
            .enumerate()
            .filter_map(|(index, (title, description, source))| {
                NewsArticle::new(title, description, *source)
                    .map(|article| article.with_published_at(Some(now.hours_before(index as i64))))
            })
            .take(limit)
            .collect();

        NewsBatch { articles }
    }

    /// Fixed, non-random reading representing a mildly fearful market.
    pub fn sentiment(&self) -> SentimentReading {
        let source_indices = [
            ("SPY", 542.30, -0.8),
            ("QQQ", 467.80, -1.1),
            ("DIA", 418.90, -0.6),
            ("VIX", 28.5, 0.0),
        ]
        .iter()
        .map(|(symbol, current_price, change_percent)| IndexReading {
            symbol: (*symbol).to_owned(),
            current_price: *current_price,
            change_percent: *change_percent,
        })
        .collect();

        SentimentReading {
            score: 35,
            label: SentimentLabel::Fear,
            factors: vec![
                String::from("Market decline (-0.8%)"),
                String::from("Elevated volatility (VIX: 28.5)"),
                String::from("Tech sector weakness"),
                String::from("Risk-off sentiment"),
            ],
            source_indices,
            source: String::from(SIMULATED_SENTIMENT_SOURCE),
            provenance: Provenance::Fallback,
            as_of: UtcDateTime::now(),
        }
    }

    /// Random walk of `window` closes starting at the reference price, never
    /// dropping below 80% of it.
    pub fn history(&self, symbol: &str, window: usize) -> PriceHistory {
        let symbol = display_symbol(symbol);
        let base = self.prices.get(&symbol).unwrap_or(HISTORY_DEFAULT_BASE);
        let floor = base * HISTORY_FLOOR_RATIO;

        let mut price = base;
        let mut prices = Vec::with_capacity(window);
        for _ in 0..window {
            price += uniform(self.random.as_ref(), -HISTORY_STEP, HISTORY_STEP);
            price = price.max(floor);
            prices.push(round_cents(price).max(MIN_PRICE));
        }

        PriceHistory { symbol, prices }
    }
}

fn check_reference_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() {
        return Err(ValidationError::NonFiniteValue { field: "reference_price" });
    }
    if price <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field: "reference_price" });
    }
    Ok(())
}

fn display_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        String::from("UNKNOWN")
    } else {
        trimmed.to_ascii_uppercase()
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(unit: f64) -> SyntheticGenerator {
        SyntheticGenerator::new(
            Arc::new(ReferencePrices::default()),
            Arc::new(FixedRandom(unit)),
        )
    }

    #[test]
    fn known_symbol_stays_within_jitter_of_reference() {
        let quote = generator(0.9).quote("aapl");
        assert_eq!(quote.symbol, "AAPL");
        assert!(quote.price >= 252.31 * 0.985 - 0.01);
        assert!(quote.price <= 252.31 * 1.015 + 0.01);
        assert_eq!(quote.data_quality, DataQuality::Simulated);
        assert_eq!(quote.source, SIMULATED_QUOTE_SOURCE);
    }

    #[test]
    fn unknown_symbol_keeps_range_consistent() {
        let quote = generator(0.0).quote("ZZZZ");
        assert_eq!(quote.name, "ZZZZ Corporation");
        assert!(quote.high >= quote.price);
        assert!(quote.price >= quote.low);
        assert!(quote.price >= 50.0 * 0.985 - 0.01);
        assert!(quote.validate().is_ok());
    }

    #[test]
    fn fixed_random_pins_exact_output() {
        let prices = ReferencePrices::empty().with_price("TEST", 100.0);
        let generator = SyntheticGenerator::new(Arc::new(prices), Arc::new(FixedRandom(0.5)));
        let quote = generator.quote("TEST");
        assert_eq!(quote.price, 100.0);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.high, 101.5);
        assert_eq!(quote.low, 98.5);
        assert_eq!(quote.open, 99.8);
        assert_eq!(quote.volume, 3_500_000);
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        let left = (0..4).map(|_| a.next_unit()).collect::<Vec<_>>();
        let right = (0..4).map(|_| b.next_unit()).collect::<Vec<_>>();
        assert_eq!(left, right);
    }

    #[test]
    fn news_is_six_articles_newest_first() {
        let batch = generator(0.5).news(10);
        assert_eq!(batch.articles.len(), 6);
        let stamps = batch
            .articles
            .iter()
            .map(|article| article.published_at.expect("timestamped"))
            .collect::<Vec<_>>();
        assert!(stamps.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn sentiment_is_fixed_fear_reading() {
        let reading = generator(0.1).sentiment();
        assert_eq!(reading.score, 35);
        assert_eq!(reading.label, SentimentLabel::Fear);
        assert_eq!(reading.provenance, Provenance::Fallback);
        assert_eq!(reading.factors[0], "Market decline (-0.8%)");
        assert_eq!(reading.source_indices.len(), 4);
    }

    #[test]
    fn history_walk_respects_floor() {
        let history = generator(0.0).history("ZZZZ", 30);
        assert_eq!(history.len(), 30);
        assert!(history.prices.iter().all(|price| *price >= 120.0));
        assert_eq!(*history.prices.last().expect("non-empty"), 120.0);
    }

    #[test]
    fn sub_cent_reference_price_still_yields_valid_quote() {
        let prices = ReferencePrices::from_json_str(r#"{"PENNY": 0.004}"#).expect("positive");
        let generator = SyntheticGenerator::new(Arc::new(prices), Arc::new(FixedRandom(0.0)));

        let quote = generator.quote("PENNY");

        assert_eq!(quote.price, 0.01);
        assert!(quote.high >= quote.price && quote.price >= quote.low);
        assert!(quote.validate().is_ok());
        assert!(generator.history("PENNY", 5).prices.iter().all(|price| *price > 0.0));
    }

    #[test]
    fn builder_ignores_unusable_reference_prices() {
        let prices = ReferencePrices::empty()
            .with_price("NEG", -10.0)
            .with_price("NAN", f64::NAN)
            .with_price("OK", 10.0)
            .with_price("OK", 0.0);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get("NEG"), None);
        assert_eq!(prices.get("OK"), Some(10.0));

        let generator = SyntheticGenerator::new(Arc::new(prices), Arc::new(FixedRandom(0.5)));
        let quote = generator.quote("NEG");
        assert!(quote.price > 0.0);
        assert!(quote.validate().is_ok());
    }

    #[test]
    fn news_honours_zero_limit() {
        assert!(generator(0.5).news(0).articles.is_empty());
        assert_eq!(generator(0.5).news(2).articles.len(), 2);
    }

    #[test]
    fn rejects_non_positive_reference_price() {
        let error = ReferencePrices::from_json_str(r#"{"AAPL": -1.0}"#).expect_err("negative");
        assert!(matches!(
            error,
            CoreError::Validation(ValidationError::NonPositiveValue { .. })
        ));
    }
}
