use serde_json::Value;
use tradedesk_core::{Envelope, PositionSize, Resolved};

use crate::cli::PositionSizeArgs;
use crate::error::CliError;

use super::envelope;

pub fn run(args: &PositionSizeArgs) -> Result<Envelope<Value>, CliError> {
    let size = PositionSize::compute(args.risk, args.entry, args.stop)?;
    envelope(Resolved::computed(size))
}
