//! Rule-based Fear & Greed scoring.
//!
//! The score starts at 50, moves by the average change of the equity
//! indices, then by the level of the volatility index, and is clamped to
//! `0..=100`. Labels use the five-tier scale of [`SentimentLabel::from_score`].
//!
//! | Input | Threshold | Adjustment |
//! |-------|-----------|------------|
//! | mean change | > +2% | +25 |
//! | mean change | > +0.5% | +15 |
//! | mean change | < -2% | -25 |
//! | mean change | < -0.5% | -15 |
//! | volatility level | > 30 | -20 |
//! | volatility level | > 20 | -10 |
//! | volatility level | < 15 | +10 |

use crate::{
    IndexReading, IndexSample, Provenance, SentimentError, SentimentLabel, SentimentReading,
    UtcDateTime,
};

pub const LIVE_SENTIMENT_SOURCE: &str = "Live Stock Market Data";
pub const MIN_SAMPLES: usize = 2;

const NEUTRAL_SCORE: i32 = 50;

/// Score, label and factors computed from index samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentScore {
    pub score: u8,
    pub label: SentimentLabel,
    pub factors: Vec<String>,
}

/// Checks the sample set is scorable: at least two samples, one of them the
/// volatility index.
pub fn check_samples(samples: &[IndexSample]) -> Result<&IndexSample, SentimentError> {
    if samples.len() < MIN_SAMPLES {
        return Err(SentimentError::InsufficientSamples {
            required: MIN_SAMPLES,
            actual: samples.len(),
        });
    }

    samples
        .iter()
        .find(|sample| sample.is_volatility())
        .ok_or(SentimentError::MissingVolatility)
}

/// Pure: the same samples always give the same score, label and factors.
pub fn score(samples: &[IndexSample]) -> Result<SentimentScore, SentimentError> {
    let volatility = check_samples(samples)?;

    let changes = samples
        .iter()
        .filter(|sample| !sample.is_volatility())
        .map(|sample| sample.change_percent)
        .collect::<Vec<_>>();
    let mean_change = if changes.is_empty() {
        0.0
    } else {
        changes.iter().sum::<f64>() / changes.len() as f64
    };

    let mut score = NEUTRAL_SCORE;
    let mut factors = Vec::with_capacity(2);

    if mean_change > 2.0 {
        score += 25;
        factors.push(format!("Strong market gains ({mean_change:+.1}%)"));
    } else if mean_change > 0.5 {
        score += 15;
        factors.push(format!("Moderate market gains ({mean_change:+.1}%)"));
    } else if mean_change < -2.0 {
        score -= 25;
        factors.push(format!("Significant market decline ({mean_change:+.1}%)"));
    } else if mean_change < -0.5 {
        score -= 15;
        factors.push(format!("Market decline ({mean_change:+.1}%)"));
    }

    let level = volatility.current_price;
    let symbol = &volatility.symbol;
    if level > 30.0 {
        score -= 20;
        factors.push(format!("High volatility ({symbol}: {level:.1})"));
    } else if level > 20.0 {
        score -= 10;
        factors.push(format!("Elevated volatility ({symbol}: {level:.1})"));
    } else if level < 15.0 {
        score += 10;
        factors.push(format!("Low volatility ({symbol}: {level:.1})"));
    }

    let score = score.clamp(0, 100) as u8;
    Ok(SentimentScore {
        score,
        label: SentimentLabel::from_score(score),
        factors,
    })
}

/// Live reading built from scored samples.
pub fn reading(
    samples: &[IndexSample],
    as_of: UtcDateTime,
) -> Result<SentimentReading, SentimentError> {
    let SentimentScore {
        score,
        label,
        factors,
    } = score(samples)?;

    Ok(SentimentReading {
        score,
        label,
        factors,
        source_indices: samples.iter().map(IndexReading::from).collect(),
        source: String::from(LIVE_SENTIMENT_SOURCE),
        provenance: Provenance::Live,
        as_of,
    })
}
