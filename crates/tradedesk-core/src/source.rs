use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers used in source chains and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
    Alphavantage,
    Polygon,
    Twelvedata,
    Fmp,
    Finnhub,
    Newsapi,
    YahooRss,
    Synthetic,
}

impl ProviderId {
    pub const ALL: [Self; 9] = [
        Self::Yahoo,
        Self::Alphavantage,
        Self::Polygon,
        Self::Twelvedata,
        Self::Fmp,
        Self::Finnhub,
        Self::Newsapi,
        Self::YahooRss,
        Self::Synthetic,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Alphavantage => "alphavantage",
            Self::Polygon => "polygon",
            Self::Twelvedata => "twelvedata",
            Self::Fmp => "fmp",
            Self::Finnhub => "finnhub",
            Self::Newsapi => "newsapi",
            Self::YahooRss => "yahoorss",
            Self::Synthetic => "synthetic",
        }
    }

    /// Human-readable provider name used in quote `source` labels.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Yahoo => "Yahoo Finance",
            Self::Alphavantage => "Alpha Vantage",
            Self::Polygon => "Polygon.io",
            Self::Twelvedata => "Twelve Data",
            Self::Fmp => "Financial Modeling Prep",
            Self::Finnhub => "Finnhub",
            Self::Newsapi => "NewsAPI",
            Self::YahooRss => "Yahoo Finance RSS",
            Self::Synthetic => "Synthetic",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == normalized)
            .ok_or(ValidationError::InvalidSource { value: normalized })
    }
}
