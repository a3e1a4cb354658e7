use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// Whether a value came from a live provider or from synthetic generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Live,
    Fallback,
}

impl Provenance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }

    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality tier of a quote's fields.
///
/// `MarketAccurate` marks a live price whose change fields were synthesized
/// because the provider only reported an absolute price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataQuality {
    Live,
    MarketAccurate,
    Simulated,
}

/// Canonical quote returned by every quote provider and the fallback generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    pub volume: u64,
    pub last_updated: UtcDateTime,
    pub source: String,
    pub data_quality: DataQuality,
}

impl Quote {
    /// Checks the invariants a quote must hold before it leaves a provider.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_positive("price", self.price)?;
        validate_finite("change", self.change)?;
        validate_finite("change_percent", self.change_percent)?;
        validate_positive("high", self.high)?;
        validate_positive("low", self.low)?;
        validate_positive("open", self.open)?;
        if let Some(previous_close) = self.previous_close {
            validate_positive("previous_close", previous_close)?;
        }

        if self.high < self.low {
            return Err(ValidationError::InvalidQuoteRange);
        }
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }

        Ok(())
    }

    pub fn validated(self) -> Result<Self, ValidationError> {
        self.validate()?;
        Ok(self)
    }

    /// `change_percent` rendered the way the dashboard displays it, e.g. `+1.25%`.
    pub fn change_percent_label(&self) -> String {
        format!("{:+.2}%", self.change_percent)
    }
}

/// Canonical news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<UtcDateTime>,
}

impl NewsArticle {
    /// Returns `None` when the title or description is blank after trimming.
    pub fn new(
        title: impl AsRef<str>,
        description: impl AsRef<str>,
        source_name: impl Into<String>,
    ) -> Option<Self> {
        let title = title.as_ref().trim();
        let description = description.as_ref().trim();
        if title.is_empty() || description.is_empty() {
            return None;
        }

        Some(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            source_name: source_name.into(),
            url: None,
            published_at: None,
        })
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url.filter(|value| !value.trim().is_empty() && value != "#");
        self
    }

    pub fn with_published_at(mut self, published_at: Option<UtcDateTime>) -> Self {
        self.published_at = published_at;
        self
    }
}

/// Normalized news list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsBatch {
    pub articles: Vec<NewsArticle>,
}

/// Role a tracked index plays in sentiment scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexRole {
    Broad,
    Tech,
    BlueChip,
    Volatility,
}

/// One reading of a tracked index, produced before sentiment scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSample {
    pub symbol: String,
    pub role: IndexRole,
    pub current_price: f64,
    pub change_percent: f64,
    pub volume: u64,
}

impl IndexSample {
    /// Builds a sample from the last two closes of a daily series.
    pub fn from_closes(
        symbol: impl Into<String>,
        role: IndexRole,
        previous: f64,
        current: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_positive("previous_close", previous)?;
        validate_positive("current_price", current)?;

        Ok(Self {
            symbol: symbol.into(),
            role,
            current_price: current,
            change_percent: (current - previous) / previous * 100.0,
            volume,
        })
    }

    pub const fn is_volatility(&self) -> bool {
        matches!(self.role, IndexRole::Volatility)
    }
}

/// Index reading carried inside a sentiment result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexReading {
    pub symbol: String,
    pub current_price: f64,
    pub change_percent: f64,
}

impl From<&IndexSample> for IndexReading {
    fn from(sample: &IndexSample) -> Self {
        Self {
            symbol: sample.symbol.clone(),
            current_price: sample.current_price,
            change_percent: sample.change_percent,
        }
    }
}

/// Fear & Greed label. Higher scores are greedier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Extreme Fear")]
    ExtremeFear,
    #[serde(rename = "Fear")]
    Fear,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Greed")]
    Greed,
    #[serde(rename = "Extreme Greed")]
    ExtremeGreed,
}

impl SentimentLabel {
    /// Five-tier mapping: <25, <50, <75, <90, else.
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Self::ExtremeFear,
            25..=49 => Self::Fear,
            50..=74 => Self::Neutral,
            75..=89 => Self::Greed,
            _ => Self::ExtremeGreed,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExtremeFear => "Extreme Fear",
            Self::Fear => "Fear",
            Self::Neutral => "Neutral",
            Self::Greed => "Greed",
            Self::ExtremeGreed => "Extreme Greed",
        }
    }
}

impl Display for SentimentLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fear & Greed reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub score: u8,
    pub label: SentimentLabel,
    pub factors: Vec<String>,
    pub source_indices: Vec<IndexReading>,
    pub source: String,
    pub provenance: Provenance,
    pub as_of: UtcDateTime,
}

/// Closing prices ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub prices: Vec<f64>,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>, prices: Vec<f64>) -> Result<Self, ValidationError> {
        for price in &prices {
            validate_positive("prices", *price)?;
        }

        Ok(Self {
            symbol: symbol.into(),
            prices,
        })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
