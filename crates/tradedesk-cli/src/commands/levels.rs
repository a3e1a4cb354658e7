use serde::Serialize;
use serde_json::Value;
use tradedesk_core::{AtrPlan, Envelope, Resolved, TradeLevels, ValidationError};

use crate::cli::{Cli, LevelsArgs};
use crate::error::CliError;

use super::{base_config, envelope, service};

#[derive(Debug, Serialize)]
struct LevelsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    #[serde(flatten)]
    levels: TradeLevels,
}

/// A quoted entry carries the quote's provenance, so `--strict` still
/// rejects levels built on a simulated price.
pub async fn run(args: &LevelsArgs, cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let (entry, symbol) = match (args.entry, args.symbol.as_deref()) {
        (Some(entry), _) => (Resolved::computed(entry), None),
        (None, Some(symbol)) => {
            let quote = service(cli, base_config())?.quote(symbol).await;
            let symbol = quote.data.symbol.clone();
            (quote.map(|quote| quote.price), Some(symbol))
        }
        (None, None) => return Err(ValidationError::EmptySymbol.into()),
    };

    let atr = args.atr.map(|atr| AtrPlan {
        atr,
        stop_multiple: Some(args.atr_stop),
        target_multiple: args.atr_target,
    });
    let levels = TradeLevels::compute(entry.data, args.stop_percent, args.target_percent, atr)?;
    envelope(entry.map(|_| LevelsOutput { symbol, levels }))
}
