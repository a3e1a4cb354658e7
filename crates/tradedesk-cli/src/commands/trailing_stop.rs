use serde_json::Value;
use tradedesk_core::{Envelope, Resolved, Trail, TrailingStop};

use crate::cli::TrailingStopArgs;
use crate::error::CliError;

use super::envelope;

const DEFAULT_TRAIL_AMOUNT: f64 = 5.0;

pub fn run(args: &TrailingStopArgs) -> Result<Envelope<Value>, CliError> {
    let trail = match (args.amount, args.percent) {
        (_, Some(percent)) => Trail::Percent(percent),
        (amount, None) => Trail::Amount(amount.unwrap_or(DEFAULT_TRAIL_AMOUNT)),
    };
    let trailing = TrailingStop::compute(args.entry, args.current, trail)?;
    envelope(Resolved::computed(trailing))
}
