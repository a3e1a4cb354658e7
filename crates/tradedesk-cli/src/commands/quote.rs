use serde_json::Value;
use tradedesk_core::Envelope;

use crate::cli::{Cli, QuoteArgs};
use crate::error::CliError;

use super::{base_config, envelope, service};

pub async fn run(args: &QuoteArgs, cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let service = service(cli, base_config())?;
    envelope(service.quote(&args.symbol).await)
}
