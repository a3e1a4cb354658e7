mod correlate;
mod history;
mod levels;
mod news;
mod position_size;
mod quote;
mod sentiment;
mod trailing_stop;

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tradedesk_core::{
    Envelope, MarketDataService, ReferencePrices, Resolved, ServiceConfig,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::RequestId;

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    match &cli.command {
        Command::Quote(args) => quote::run(args, cli).await,
        Command::News(args) => news::run(args, cli).await,
        Command::Sentiment => sentiment::run(cli).await,
        Command::History(args) => history::run(args, cli).await,
        Command::Correlate(args) => correlate::run(args, cli).await,
        Command::Levels(args) => levels::run(args, cli).await,
        Command::PositionSize(args) => position_size::run(args),
        Command::TrailingStop(args) => trailing_stop::run(args),
    }
}

/// Builds the service from global flags and command-specific settings.
fn service(cli: &Cli, config: ServiceConfig) -> Result<MarketDataService, CliError> {
    let config = config.with_timeout(Duration::from_millis(cli.timeout_ms.max(1)));
    let mut builder = MarketDataService::builder().with_config(config);

    if cli.offline {
        builder = builder.with_offline_mode();
    }
    if let Some(seed) = cli.seed {
        builder = builder.with_seed(seed);
    }
    if let Some(path) = &cli.reference_prices {
        builder = builder.with_reference_prices(ReferencePrices::from_path(path)?);
    }

    Ok(builder.build())
}

fn base_config() -> ServiceConfig {
    ServiceConfig::from_env()
}

/// Wraps a resolved result into the JSON envelope printed on stdout.
fn envelope<T: Serialize>(resolved: Resolved<T>) -> Result<Envelope<Value>, CliError> {
    let data = serde_json::to_value(&resolved.data)?;
    let envelope = Envelope::from_resolved(RequestId::new_v4().to_string(), resolved.map(|_| data))?;
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tradedesk_core::{ProviderId, Provenance};

    use super::*;

    fn offline(args: &[&str]) -> Cli {
        let mut argv = vec!["tradedesk", "--offline", "--seed", "5"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parses")
    }

    #[tokio::test]
    async fn offline_quote_envelope_is_fallback() {
        let envelope = run(&offline(&["quote", "aapl"])).await.expect("envelope");

        assert_eq!(envelope.meta.provenance, Provenance::Fallback);
        assert_eq!(envelope.meta.source_chain.last(), Some(&ProviderId::Synthetic));
        assert_eq!(envelope.data["symbol"], "AAPL");
        assert_eq!(envelope.data["data_quality"], "simulated");
        assert!(!envelope.meta.warnings.is_empty());
    }

    #[tokio::test]
    async fn offline_news_respects_limit() {
        let envelope = run(&offline(&["news", "--limit", "3"])).await.expect("envelope");
        assert_eq!(envelope.data["articles"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn levels_from_entry_are_computed_without_sources() {
        let envelope = run(&offline(&["levels", "--entry", "100", "--atr", "4.8"]))
            .await
            .expect("envelope");

        assert_eq!(envelope.meta.provenance, Provenance::Live);
        assert!(envelope.meta.source_chain.is_empty());
        assert_eq!(envelope.data["stop_loss"]["price"], 98.0);
        assert_eq!(envelope.data["take_profit"]["price"], 104.0);
        assert_eq!(envelope.data["atr"]["stop_loss"]["price"], 90.4);
        assert!(envelope.data.get("symbol").is_none());
    }

    #[tokio::test]
    async fn levels_from_simulated_quote_keep_fallback_provenance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prices.json");
        std::fs::write(&path, r#"{"ZZZ": 100.0}"#).expect("write prices");
        let path = path.to_string_lossy().into_owned();

        let cli = offline(&["--reference-prices", &path, "levels", "--symbol", "zzz"]);
        let envelope = run(&cli).await.expect("envelope");

        assert_eq!(envelope.meta.provenance, Provenance::Fallback);
        assert_eq!(envelope.data["symbol"], "ZZZ");
        let entry = envelope.data["entry"].as_f64().expect("entry");
        assert!((98.5..=101.5).contains(&entry));
    }

    #[tokio::test]
    async fn invalid_calculator_input_is_validation_error() {
        let error = run(&offline(&["position-size", "--risk=-5"]))
            .await
            .expect_err("negative risk");
        assert_eq!(error.exit_code(), 2);

        let error = run(&offline(&["levels", "--entry", "100", "--stop-percent", "120"]))
            .await
            .expect_err("stop below zero");
        assert_eq!(error.exit_code(), 2);
    }

    #[tokio::test]
    async fn position_size_and_trailing_stop_use_dashboard_defaults() {
        let size = run(&offline(&["position-size"])).await.expect("envelope");
        assert_eq!(size.data["shares"], 20);
        assert_eq!(size.data["risk_per_share"], 5.0);

        let trailing = run(&offline(&["trailing-stop", "--percent", "2"]))
            .await
            .expect("envelope");
        assert_eq!(trailing.data["stop"], 107.8);
        assert_eq!(trailing.data["trail"]["type"], "percent");
        assert_eq!(trailing.data["series"].as_array().map(Vec::len), Some(20));

        let by_amount = run(&offline(&["trailing-stop"])).await.expect("envelope");
        assert_eq!(by_amount.data["stop"], 105.0);
    }

    #[tokio::test]
    async fn missing_reference_file_is_io_error() {
        let cli = offline(&["--reference-prices", "/nonexistent/prices.json", "quote", "AAPL"]);
        let error = run(&cli).await.expect_err("file missing");
        assert_eq!(error.exit_code(), 10);
    }

    #[tokio::test]
    async fn reference_file_sets_simulated_baseline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prices.json");
        std::fs::write(&path, r#"{"ZZZ": 100.0}"#).expect("write prices");

        let path = path.to_string_lossy().into_owned();
        let cli = offline(&["--reference-prices", &path, "quote", "ZZZ"]);
        let envelope = run(&cli).await.expect("envelope");

        let price = envelope.data["price"].as_f64().expect("price");
        assert!((98.5..=101.5).contains(&price));
    }
}
