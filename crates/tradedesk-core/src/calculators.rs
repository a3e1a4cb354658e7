//! Trade planning calculators: stop-loss and take-profit levels, position
//! size, and trailing stops.
//!
//! Everything here is pure arithmetic on caller-supplied numbers. Prices are
//! rounded to cents the way the dashboard displays them. Stop prices are
//! floored at zero; a stop below zero cannot be placed.

use serde::Serialize;

use crate::fallback::round_cents;
use crate::ValidationError;

pub const STOP_PERCENT_CHOICES: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 7.0, 10.0, 15.0, 20.0];
pub const ATR_MULTIPLE_CHOICES: [f64; 6] = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0];
pub const DEFAULT_STOP_PERCENT: f64 = 2.0;
pub const DEFAULT_TARGET_PERCENT: f64 = 4.0;
pub const DEFAULT_ATR_STOP_MULTIPLE: f64 = 2.0;
pub const TRAILING_SERIES_POINTS: usize = 20;

/// Which side of the entry a level sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    StopLoss,
    TakeProfit,
}

/// `entry * (1 ∓ percent / 100)`.
pub fn percent_level(entry: f64, percent: f64, side: Side) -> Result<f64, ValidationError> {
    positive("entry", entry)?;
    non_negative("percent", percent)?;
    if side == Side::StopLoss && percent > 100.0 {
        return Err(ValidationError::PercentOutOfRange { field: "percent" });
    }

    let level = match side {
        Side::StopLoss => entry * (1.0 - percent / 100.0),
        Side::TakeProfit => entry * (1.0 + percent / 100.0),
    };
    Ok(round_cents(level.max(0.0)))
}

/// `entry ∓ atr * multiple`.
pub fn atr_level(entry: f64, atr: f64, multiple: f64, side: Side) -> Result<f64, ValidationError> {
    positive("entry", entry)?;
    non_negative("atr", atr)?;
    non_negative("atr_multiple", multiple)?;

    let level = match side {
        Side::StopLoss => entry - atr * multiple,
        Side::TakeProfit => entry + atr * multiple,
    };
    Ok(round_cents(level.max(0.0)))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentLevel {
    pub percent: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtrLevel {
    pub multiple: f64,
    pub price: f64,
}

/// ATR inputs. A `None` multiple means that side is not planned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtrPlan {
    pub atr: f64,
    pub stop_multiple: Option<f64>,
    pub target_multiple: Option<f64>,
}

impl AtrPlan {
    pub fn new(atr: f64) -> Self {
        Self {
            atr,
            stop_multiple: Some(DEFAULT_ATR_STOP_MULTIPLE),
            target_multiple: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtrLevels {
    pub atr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<AtrLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<AtrLevel>,
}

/// Percentage and optional ATR levels around one entry price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop_loss: PercentLevel,
    pub take_profit: PercentLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<AtrLevels>,
}

impl TradeLevels {
    pub fn compute(
        entry: f64,
        stop_percent: f64,
        target_percent: f64,
        atr: Option<AtrPlan>,
    ) -> Result<Self, ValidationError> {
        let atr = atr
            .map(|plan| -> Result<AtrLevels, ValidationError> {
                let level = |multiple: Option<f64>, side| {
                    multiple
                        .map(|multiple| {
                            atr_level(entry, plan.atr, multiple, side)
                                .map(|price| AtrLevel { multiple, price })
                        })
                        .transpose()
                };
                Ok(AtrLevels {
                    atr: plan.atr,
                    stop_loss: level(plan.stop_multiple, Side::StopLoss)?,
                    take_profit: level(plan.target_multiple, Side::TakeProfit)?,
                })
            })
            .transpose()?;

        Ok(Self {
            entry,
            stop_loss: PercentLevel {
                percent: stop_percent,
                price: percent_level(entry, stop_percent, Side::StopLoss)?,
            },
            take_profit: PercentLevel {
                percent: target_percent,
                price: percent_level(entry, target_percent, Side::TakeProfit)?,
            },
            atr,
        })
    }
}

/// Shares to buy so that hitting the stop loses at most `risk`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSize {
    pub risk: f64,
    pub entry: f64,
    pub stop: f64,
    pub risk_per_share: f64,
    pub shares: u64,
}

impl PositionSize {
    /// A stop at or above the entry leaves no risk per share and sizes to 0.
    pub fn compute(risk: f64, entry: f64, stop: f64) -> Result<Self, ValidationError> {
        non_negative("risk", risk)?;
        non_negative("entry", entry)?;
        non_negative("stop", stop)?;

        let risk_per_share = (entry - stop).max(0.0);
        let shares = if risk_per_share > 0.0 {
            (risk / risk_per_share).floor() as u64
        } else {
            0
        };

        Ok(Self {
            risk,
            entry,
            stop,
            risk_per_share: round_cents(risk_per_share),
            shares,
        })
    }
}

/// Distance kept between the price and its trailing stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Trail {
    Amount(f64),
    Percent(f64),
}

impl Trail {
    fn validate(self) -> Result<Self, ValidationError> {
        match self {
            Self::Amount(amount) => non_negative("trail_amount", amount)?,
            Self::Percent(percent) => {
                non_negative("trail_percent", percent)?;
                if percent > 100.0 {
                    return Err(ValidationError::PercentOutOfRange {
                        field: "trail_percent",
                    });
                }
            }
        }
        Ok(self)
    }

    /// Gap below `price`; a percentage trail scales with the price.
    pub fn gap_at(self, price: f64) -> f64 {
        match self {
            Self::Amount(amount) => amount,
            Self::Percent(percent) => price * percent / 100.0,
        }
    }

    pub fn stop_at(self, price: f64) -> f64 {
        (price - self.gap_at(price)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailingPoint {
    pub price: f64,
    pub stop: f64,
}

/// Trailing stop at the current price, plus the stop's path along a straight
/// move from entry to current.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailingStop {
    pub entry: f64,
    pub current: f64,
    pub trail: Trail,
    pub trail_value: f64,
    pub stop: f64,
    pub series: Vec<TrailingPoint>,
}

impl TrailingStop {
    pub fn compute(entry: f64, current: f64, trail: Trail) -> Result<Self, ValidationError> {
        positive("entry", entry)?;
        positive("current", current)?;
        let trail = trail.validate()?;

        let step = (current - entry) / (TRAILING_SERIES_POINTS - 1) as f64;
        let series = (0..TRAILING_SERIES_POINTS)
            .map(|index| {
                let price = entry + index as f64 * step;
                TrailingPoint {
                    price: round_cents(price),
                    stop: round_cents(trail.stop_at(price)),
                }
            })
            .collect();

        Ok(Self {
            entry,
            current,
            trail,
            trail_value: round_cents(trail.gap_at(current)),
            stop: round_cents(trail.stop_at(current)),
            series,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    non_negative(field, value)?;
    if value == 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
