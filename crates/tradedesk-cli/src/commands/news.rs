use serde_json::Value;
use tradedesk_core::Envelope;

use crate::cli::{Cli, NewsArgs};
use crate::error::CliError;

use super::{base_config, envelope, service};

pub async fn run(args: &NewsArgs, cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let service = service(cli, base_config().with_news_limit(args.limit))?;
    envelope(service.news().await)
}
