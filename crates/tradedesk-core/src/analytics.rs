//! Return statistics for the volatility/correlation view.

use serde::{Deserialize, Serialize};

use crate::PriceHistory;

/// Simple daily returns: `(p[i] - p[i-1]) / p[i-1]`.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation. `None` for an empty series.
pub fn volatility(returns: &[f64]) -> Option<f64> {
    let mean = mean(returns)?;
    let variance =
        returns.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    Some(variance.sqrt())
}

/// Pearson correlation over the overlapping tail of both series. `None`
/// when fewer than two points overlap or either series is constant.
pub fn correlation(left: &[f64], right: &[f64]) -> Option<f64> {
    let len = left.len().min(right.len());
    if len < 2 {
        return None;
    }
    let left = &left[left.len() - len..];
    let right = &right[right.len() - len..];

    let left_mean = mean(left)?;
    let right_mean = mean(right)?;

    let mut covariance = 0.0;
    let mut left_spread = 0.0;
    let mut right_spread = 0.0;
    for (l, r) in left.iter().zip(right) {
        let dl = l - left_mean;
        let dr = r - right_mean;
        covariance += dl * dr;
        left_spread += dl * dl;
        right_spread += dr * dr;
    }

    let denominator = (left_spread * right_spread).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((covariance / denominator).clamp(-1.0, 1.0))
}

/// Strength bucket shown next to a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    High,
    Moderate,
    Low,
}

impl CorrelationStrength {
    pub fn from_coefficient(coefficient: f64) -> Self {
        let magnitude = coefficient.abs();
        if magnitude > 0.7 {
            Self::High
        } else if magnitude > 0.3 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Volatility of each series and the correlation of their daily returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub left: PriceHistory,
    pub right: PriceHistory,
    pub left_volatility: Option<f64>,
    pub right_volatility: Option<f64>,
    pub correlation: Option<f64>,
    pub strength: Option<CorrelationStrength>,
}

impl CorrelationReport {
    pub fn from_histories(left: PriceHistory, right: PriceHistory) -> Self {
        let left_returns = daily_returns(&left.prices);
        let right_returns = daily_returns(&right.prices);
        let correlation = correlation(&left_returns, &right_returns);

        Self {
            left_volatility: volatility(&left_returns),
            right_volatility: volatility(&right_returns),
            strength: correlation.map(CorrelationStrength::from_coefficient),
            correlation,
            left,
            right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_are_relative_changes() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn constant_series_has_zero_volatility() {
        let returns = daily_returns(&[50.0; 10]);
        assert_eq!(volatility(&returns), Some(0.0));
        assert_eq!(volatility(&[]), None);
    }

    #[test]
    fn series_correlates_perfectly_with_itself() {
        let prices = [100.0, 102.0, 101.0, 105.0, 103.0, 108.0];
        let returns = daily_returns(&prices);
        let coefficient = correlation(&returns, &returns).expect("defined");
        assert!((coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mirrored_moves_are_negatively_correlated() {
        let left = [0.01, -0.02, 0.03, -0.01];
        let right = [-0.01, 0.02, -0.03, 0.01];
        let coefficient = correlation(&left, &right).expect("defined");
        assert!((coefficient + 1.0).abs() < 1e-12);
        assert_eq!(
            CorrelationStrength::from_coefficient(coefficient),
            CorrelationStrength::High
        );
    }

    #[test]
    fn report_uses_overlapping_tail() {
        let left = PriceHistory::new("AAA", vec![10.0, 11.0, 12.0, 11.5]).expect("valid");
        let right = PriceHistory::new("BBB", vec![20.0, 22.0, 24.0, 23.0, 25.0]).expect("valid");

        let report = CorrelationReport::from_histories(left, right);
        assert!(report.correlation.is_some());
        assert!(report.left_volatility.expect("defined") > 0.0);
    }
}
