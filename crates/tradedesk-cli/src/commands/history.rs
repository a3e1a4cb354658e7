use serde_json::Value;
use tradedesk_core::Envelope;

use crate::cli::{Cli, HistoryArgs};
use crate::error::CliError;

use super::{base_config, envelope, service};

pub async fn run(args: &HistoryArgs, cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let service = service(cli, base_config().with_history_window(args.window))?;
    envelope(service.history(&args.symbol).await)
}
