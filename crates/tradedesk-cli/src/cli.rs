//! CLI argument definitions for tradedesk.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Latest quote for a symbol |
//! | `news` | Market headlines |
//! | `sentiment` | Fear & Greed reading |
//! | `history` | Recent closing prices |
//! | `correlate` | Volatility and return correlation of two symbols |
//! | `levels` | Percentage and ATR stop-loss / take-profit levels |
//! | `position-size` | Shares to buy for a fixed dollar risk |
//! | `trailing-stop` | Trailing stop by amount or percent, with its path |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit with code 5 unless the result is live |
//! | `--offline` | `false` | Never reach a provider; serve simulated data |
//! | `--timeout-ms` | `10000` | Per-provider time budget in ms |
//! | `--seed` | none | Seed for deterministic simulated values |
//!
//! # Examples
//!
//! ```bash
//! tradedesk quote AAPL --pretty
//! tradedesk sentiment --strict
//! tradedesk correlate SPY QQQ --window 60
//! tradedesk --offline --seed 7 history MSFT
//! tradedesk levels --symbol AAPL --atr 4.8 --atr-target 3
//! tradedesk trailing-stop --entry 100 --current 110 --percent 2
//! ```

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use tradedesk_core::calculators::{
    DEFAULT_ATR_STOP_MULTIPLE, DEFAULT_STOP_PERCENT, DEFAULT_TARGET_PERCENT,
};
use tradedesk_core::config::{DEFAULT_HISTORY_WINDOW, DEFAULT_NEWS_LIMIT, DEFAULT_TIMEOUT_MS};

/// Tradedesk - market data with provider fallback
///
/// Every command answers: when all upstream providers fail, the result is
/// simulated and marked `"provenance": "fallback"` in the output metadata.
#[derive(Debug, Parser)]
#[command(
    name = "tradedesk",
    author,
    version,
    about = "Market data with provider fallback",
    long_about = "Tradedesk fetches quotes, headlines, market sentiment and price history \
from an ordered list of providers per data type:\n\
\n\
  • Quotes: Yahoo, Alpha Vantage, Polygon, Twelve Data, FMP\n\
  • News: Alpha Vantage, Finnhub, NewsAPI, Yahoo RSS\n\
  • Sentiment: SPY, QQQ, DIA and VIX via Yahoo, then Alpha Vantage\n\
  • History: Alpha Vantage, then Yahoo\n\
\n\
API keys are read from TRADEDESK_<PROVIDER>_API_KEY or the provider's usual \
variable. Set RUST_LOG=info to see provider attempts on stderr."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Fail with exit code 5 when the result is simulated.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Skip the network entirely; every command serves simulated data.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Time budget for each provider attempt in milliseconds.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Seed for the simulated-data generator.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// JSON file of `{"SYMBOL": price}` used as simulated-quote baselines.
    #[arg(long, global = true)]
    pub reference_prices: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Field/value table of the data section.
    Table,
    /// Single JSON envelope.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 💰 Fetch the latest quote for a symbol.
    ///
    /// # Examples
    ///
    ///   tradedesk quote AAPL
    ///   tradedesk quote msft --pretty
    Quote(QuoteArgs),

    /// 📰 Fetch market headlines.
    ///
    /// # Examples
    ///
    ///   tradedesk news
    ///   tradedesk news --limit 5
    News(NewsArgs),

    /// 🌡️ Compute the Fear & Greed reading from index moves.
    Sentiment,

    /// 📊 Fetch recent daily closing prices.
    ///
    /// # Examples
    ///
    ///   tradedesk history AAPL
    ///   tradedesk history SPY --window 90
    History(HistoryArgs),

    /// 🔗 Compare volatility and return correlation of two symbols.
    ///
    /// # Examples
    ///
    ///   tradedesk correlate SPY QQQ
    Correlate(CorrelateArgs),

    /// 🎯 Stop-loss and take-profit levels around an entry price.
    ///
    /// # Examples
    ///
    ///   tradedesk levels --entry 100
    ///   tradedesk levels --symbol AAPL --stop-percent 3 --atr 4.8
    Levels(LevelsArgs),

    /// ⚖️ Shares to buy so a stop-out loses at most the given risk.
    ///
    /// # Examples
    ///
    ///   tradedesk position-size --risk 250 --entry 48.5 --stop 46
    PositionSize(PositionSizeArgs),

    /// 📉 Trailing stop at the current price and its path from entry.
    ///
    /// # Examples
    ///
    ///   tradedesk trailing-stop --entry 100 --current 110 --amount 5
    ///   tradedesk trailing-stop --entry 100 --current 110 --percent 2
    TrailingStop(TrailingStopArgs),
}

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Market symbol (e.g., AAPL, MSFT).
    pub symbol: String,
}

/// Arguments for the `news` command.
#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Maximum number of headlines (1-10).
    #[arg(long, default_value_t = DEFAULT_NEWS_LIMIT)]
    pub limit: usize,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Market symbol.
    pub symbol: String,

    /// Number of most recent closes to return.
    #[arg(long, default_value_t = DEFAULT_HISTORY_WINDOW)]
    pub window: usize,
}

/// Arguments for the `correlate` command.
#[derive(Debug, Args)]
pub struct CorrelateArgs {
    /// First symbol.
    pub left: String,

    /// Second symbol.
    pub right: String,

    /// Number of most recent closes per symbol.
    #[arg(long, default_value_t = DEFAULT_HISTORY_WINDOW)]
    pub window: usize,
}

/// Arguments for the `levels` command. The entry is either given or taken
/// from the latest quote for `--symbol`.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("entry_source").required(true).args(["entry", "symbol"])))]
pub struct LevelsArgs {
    /// Entry price.
    #[arg(long)]
    pub entry: Option<f64>,

    /// Use the latest quote for this symbol as the entry price.
    #[arg(long)]
    pub symbol: Option<String>,

    /// Stop-loss distance below entry, in percent.
    #[arg(long, default_value_t = DEFAULT_STOP_PERCENT)]
    pub stop_percent: f64,

    /// Take-profit distance above entry, in percent.
    #[arg(long, default_value_t = DEFAULT_TARGET_PERCENT)]
    pub target_percent: f64,

    /// Average true range; enables ATR-based levels.
    #[arg(long)]
    pub atr: Option<f64>,

    /// ATR multiple for the stop-loss.
    #[arg(long, default_value_t = DEFAULT_ATR_STOP_MULTIPLE, requires = "atr")]
    pub atr_stop: f64,

    /// ATR multiple for the take-profit (omitted when not given).
    #[arg(long, requires = "atr")]
    pub atr_target: Option<f64>,
}

/// Arguments for the `position-size` command.
#[derive(Debug, Args)]
pub struct PositionSizeArgs {
    /// Dollars at risk on this trade.
    #[arg(long, default_value_t = 100.0)]
    pub risk: f64,

    /// Entry price.
    #[arg(long, default_value_t = 100.0)]
    pub entry: f64,

    /// Stop-loss price.
    #[arg(long, default_value_t = 95.0)]
    pub stop: f64,
}

/// Arguments for the `trailing-stop` command. Without `--amount` or
/// `--percent` the trail is a fixed 5.
#[derive(Debug, Args)]
pub struct TrailingStopArgs {
    /// Entry price.
    #[arg(long, default_value_t = 100.0)]
    pub entry: f64,

    /// Current price.
    #[arg(long, default_value_t = 110.0)]
    pub current: f64,

    /// Trail by a fixed amount.
    #[arg(long, conflicts_with = "percent")]
    pub amount: Option<f64>,

    /// Trail by a percentage of the price.
    #[arg(long)]
    pub percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tradedesk", "history", "aapl", "--window", "10", "--offline", "--seed", "3",
        ])
        .expect("parses");

        assert!(cli.offline);
        assert_eq!(cli.seed, Some(3));
        assert_eq!(cli.timeout_ms, DEFAULT_TIMEOUT_MS);
        match cli.command {
            Command::History(args) => {
                assert_eq!(args.symbol, "aapl");
                assert_eq!(args.window, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn correlate_requires_two_symbols() {
        assert!(Cli::try_parse_from(["tradedesk", "correlate", "SPY"]).is_err());
    }

    #[test]
    fn levels_needs_exactly_one_entry_source() {
        assert!(Cli::try_parse_from(["tradedesk", "levels"]).is_err());
        assert!(
            Cli::try_parse_from(["tradedesk", "levels", "--entry", "100", "--symbol", "AAPL"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["tradedesk", "levels", "--entry", "100", "--atr-target", "2"])
            .is_err());

        let cli = Cli::try_parse_from(["tradedesk", "levels", "--symbol", "aapl"]).expect("parses");
        match cli.command {
            Command::Levels(args) => {
                assert_eq!(args.symbol.as_deref(), Some("aapl"));
                assert_eq!(args.stop_percent, DEFAULT_STOP_PERCENT);
                assert_eq!(args.atr, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn trailing_stop_takes_amount_or_percent() {
        assert!(Cli::try_parse_from([
            "tradedesk",
            "trailing-stop",
            "--amount",
            "5",
            "--percent",
            "2",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["tradedesk", "trailing-stop", "--percent", "2"]).is_ok());
    }
}
