use serde::Serialize;
use serde_json::Value;
use tradedesk_core::{CorrelationReport, CorrelationStrength, Envelope};

use crate::cli::{Cli, CorrelateArgs};
use crate::error::CliError;

use super::{base_config, envelope, service};

/// Report without the raw price series, which can run to hundreds of points.
#[derive(Debug, Serialize)]
struct CorrelationSummary {
    left: String,
    right: String,
    points: usize,
    left_volatility: Option<f64>,
    right_volatility: Option<f64>,
    correlation: Option<f64>,
    strength: Option<CorrelationStrength>,
}

impl From<CorrelationReport> for CorrelationSummary {
    fn from(report: CorrelationReport) -> Self {
        Self {
            points: report.left.len().min(report.right.len()),
            left: report.left.symbol,
            right: report.right.symbol,
            left_volatility: report.left_volatility,
            right_volatility: report.right_volatility,
            correlation: report.correlation,
            strength: report.strength,
        }
    }
}

pub async fn run(args: &CorrelateArgs, cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let service = service(cli, base_config().with_history_window(args.window))?;
    let resolved = service.correlation(&args.left, &args.right).await;
    envelope(resolved.map(CorrelationSummary::from))
}
