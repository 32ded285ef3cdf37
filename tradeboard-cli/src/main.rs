//! TradeBoard CLI: headless access to the backtest server.
//!
//! Commands:
//! - `symbols` list the symbols the server offers
//! - `run` backtest a symbol over the last N months
//! - `params` run the parameterized strategy, optionally on a CSV
//! - `upload` send a CSV file and simulate it

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use tradeboard_core::gateway::symbols_or_default;
use tradeboard_core::ledger::{export_ledger_csv, ledger_rows, LEDGER_COLUMNS};
use tradeboard_core::logging::{init_logging, LogTarget};
use tradeboard_core::pipeline::{run_action, Action};
use tradeboard_core::request::{BackendMode, FormState};
use tradeboard_core::{
    BacktestResult, HttpGateway, Interval, Locale, RunError, TradeboardConfig,
};

#[derive(Parser)]
#[command(name = "tradeboard", about = "TradeBoard CLI: backtests against a remote server")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server base URL. Overrides the config file and TRADEBOARD_URL.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Message language: ar or en.
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Log filter, e.g. info or tradeboard_core=debug. RUST_LOG wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the symbols the server offers.
    Symbols,
    /// Backtest a symbol over the last N months.
    Run {
        #[arg(long)]
        symbol: Option<String>,

        /// Lookback in months.
        #[arg(long)]
        months: Option<u32>,

        /// Bar interval, e.g. 1m, 15m, 4h, 1d, 1w, 1M.
        #[arg(long)]
        interval: Option<Interval>,

        /// Initial balance in USD.
        #[arg(long)]
        balance: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run the parameterized strategy.
    Params {
        /// CSV file to run on instead of the server's own data.
        #[arg(long)]
        csv: Option<PathBuf>,

        #[command(flatten)]
        strategy: StrategyArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Upload a CSV file and simulate it.
    Upload {
        file: PathBuf,

        /// Send the file to the parameterized backend instead.
        #[arg(long, default_value_t = false)]
        params: bool,

        #[command(flatten)]
        strategy: StrategyArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Default)]
struct StrategyArgs {
    /// Initial balance in USD.
    #[arg(long)]
    balance: Option<f64>,

    /// Nearest neighbours considered.
    #[arg(long)]
    k: Option<u32>,

    /// Bars of history per decision.
    #[arg(long)]
    lookback: Option<u32>,

    /// Stop distance in ATR multiples.
    #[arg(long)]
    stop_atr: Option<f64>,

    /// Risk per trade, percent of balance.
    #[arg(long)]
    risk: Option<f64>,
}

#[derive(Args, Default)]
struct OutputArgs {
    /// Write the normalized result as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write every trade as CSV.
    #[arg(long)]
    trades_csv: Option<PathBuf>,

    /// Ledger rows to print. 0 prints none.
    #[arg(long, default_value_t = 20)]
    rows: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TradeboardConfig::load(cli.config.as_deref())?;
    config.apply_env_override(cli.url.clone());
    init_logging(log_filter(&cli, &config), LogTarget::Stderr)?;
    tracing::debug!(config = ?cli.config, server = %config.server.base_url, "configuration loaded");
    let locale = cli.locale.unwrap_or(config.ui.locale);

    let gateway = HttpGateway::new(&config.server.base_url, config.server.timeout())?;
    let candle_limit = config.defaults.candle_limit;
    let mut form = config.initial_form();

    let (action, upload, output) = match cli.command {
        Commands::Symbols => {
            for symbol in symbols_or_default(&gateway) {
                println!("{symbol}");
            }
            return Ok(());
        }
        Commands::Run {
            symbol,
            months,
            interval,
            balance,
            output,
        } => {
            apply_market(&mut form, symbol, months, interval, balance);
            (Action::Run, None, output)
        }
        Commands::Params {
            csv,
            strategy,
            output,
        } => {
            form.mode = BackendMode::Params;
            apply_strategy(&mut form, &strategy);
            (Action::Run, csv, output)
        }
        Commands::Upload {
            file,
            params,
            strategy,
            output,
        } => {
            if params {
                form.mode = BackendMode::Params;
                apply_strategy(&mut form, &strategy);
            }
            (Action::Upload, Some(file), output)
        }
    };

    tracing::info!(server = %config.server.base_url, ?action, mode = form.mode.label(), "submitting");
    match run_action(&gateway, action, &form, upload.as_deref(), candle_limit) {
        Ok(result) => {
            print_result(locale, &result, output.rows);
            if action == Action::Upload {
                println!("{}", locale.upload_done());
            }
            write_outputs(&result, &output)
        }
        Err(RunError::Input(e)) => bail!("{}", locale.prompt_text(&e)),
        Err(e) => bail!("{}", locale.error_status(&e)),
    }
}

/// `--log-level` if given, else the config's `[ui] log_level`.
fn log_filter<'a>(cli: &'a Cli, config: &'a TradeboardConfig) -> &'a str {
    cli.log_level.as_deref().unwrap_or(&config.ui.log_level)
}

fn apply_market(
    form: &mut FormState,
    symbol: Option<String>,
    months: Option<u32>,
    interval: Option<Interval>,
    balance: Option<f64>,
) {
    form.mode = BackendMode::Symbol;
    if let Some(symbol) = symbol {
        form.symbol = symbol;
    }
    if let Some(months) = months {
        form.months = months;
    }
    if let Some(interval) = interval {
        form.interval = interval;
    }
    if let Some(balance) = balance {
        form.initial_balance = balance;
    }
}

fn apply_strategy(form: &mut FormState, args: &StrategyArgs) {
    let p = &mut form.params;
    if let Some(v) = args.balance {
        p.initial_balance = v;
    }
    if let Some(v) = args.k {
        p.k_neighbors = v;
    }
    if let Some(v) = args.lookback {
        p.lookback = v;
    }
    if let Some(v) = args.stop_atr {
        p.stop_atr_mult = v;
    }
    if let Some(v) = args.risk {
        p.risk_pct = v;
    }
}

fn print_result(locale: Locale, result: &BacktestResult, max_rows: usize) {
    println!("{}", locale.summary_line(&result.stats));
    println!("{}", locale.balance_line(&result.stats));
    if max_rows == 0 || result.trades.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<19} {:>12} {:>12} {:>12} {:>13} {}",
        LEDGER_COLUMNS[0],
        LEDGER_COLUMNS[1],
        LEDGER_COLUMNS[2],
        LEDGER_COLUMNS[3],
        LEDGER_COLUMNS[4],
        LEDGER_COLUMNS[5]
    );
    println!("{}", "-".repeat(80));
    for row in ledger_rows(&result.trades).iter().take(max_rows) {
        let [time, entry, exit, profit, balance, reason] = row.cells();
        println!("{time:<19} {entry:>12} {exit:>12} {profit:>12} {balance:>13} {reason}");
    }
    if result.trades.len() > max_rows {
        println!("... {} more", result.trades.len() - max_rows);
    }
}

fn write_outputs(result: &BacktestResult, output: &OutputArgs) -> Result<()> {
    if let Some(path) = &output.json {
        let json = serde_json::to_string_pretty(result)?;
        write_file(path, &json)?;
        println!("Result saved to: {}", path.display());
    }
    if let Some(path) = &output.trades_csv {
        write_file(path, &export_ledger_csv(&result.trades)?)?;
        println!("Trades saved to: {}", path.display());
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_override_form() {
        let cli = Cli::try_parse_from([
            "tradeboard", "--locale", "en", "run", "--symbol", "BTCUSDT", "--months", "3",
            "--interval", "4h",
        ])
        .unwrap();
        assert_eq!(cli.locale, Some(Locale::En));
        let Commands::Run {
            symbol,
            months,
            interval,
            balance,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        let mut form = FormState {
            mode: BackendMode::Params,
            ..FormState::default()
        };
        apply_market(&mut form, symbol, months, interval, balance);
        assert_eq!(form.mode, BackendMode::Symbol);
        assert_eq!(form.symbol, "BTCUSDT");
        assert_eq!(form.months, 3);
        assert_eq!(form.interval, Interval::H4);
        assert_eq!(form.initial_balance, 10.0);
    }

    #[test]
    fn bad_interval_is_rejected() {
        assert!(Cli::try_parse_from(["tradeboard", "run", "--interval", "7m"]).is_err());
    }

    #[test]
    fn strategy_flags() {
        let cli = Cli::try_parse_from([
            "tradeboard", "upload", "eth.csv", "--params", "--k", "12", "--risk", "1.5",
        ])
        .unwrap();
        let Commands::Upload {
            file,
            params,
            strategy,
            ..
        } = cli.command
        else {
            panic!("expected upload");
        };
        assert_eq!(file, PathBuf::from("eth.csv"));
        assert!(params);
        let mut form = FormState::default();
        apply_strategy(&mut form, &strategy);
        assert_eq!(form.params.k_neighbors, 12);
        assert_eq!(form.params.risk_pct, 1.5);
        assert_eq!(form.params.lookback, 200);
    }

    #[test]
    fn log_level_falls_back_to_config() {
        let mut config = TradeboardConfig::from_toml("[ui]\nlog_level = \"debug\"").unwrap();
        let cli = Cli::try_parse_from(["tradeboard", "symbols"]).unwrap();
        assert_eq!(log_filter(&cli, &config), "debug");

        let cli = Cli::try_parse_from(["tradeboard", "--log-level", "trace", "symbols"]).unwrap();
        assert_eq!(log_filter(&cli, &config), "trace");

        config.ui.log_level = "warn".into();
        let cli = Cli::try_parse_from(["tradeboard", "symbols"]).unwrap();
        assert_eq!(log_filter(&cli, &config), "warn");
    }

    #[test]
    fn named_config_that_is_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = Cli::try_parse_from([
            OsStr::new("tradeboard"),
            OsStr::new("--config"),
            missing.as_os_str(),
            OsStr::new("symbols"),
        ])
        .unwrap();
        assert!(TradeboardConfig::load(cli.config.as_deref()).is_err());
    }

    #[test]
    fn outputs_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let result = BacktestResult {
            stats: tradeboard_core::Stats::from_tally(10.0, 11.0, 1, 0, None).unwrap(),
            trades: vec![],
            equity: vec![],
            candles: None,
        };
        let output = OutputArgs {
            json: Some(dir.path().join("out").join("result.json")),
            trades_csv: Some(dir.path().join("trades.csv")),
            rows: 0,
        };
        write_outputs(&result, &output).unwrap();

        let json = std::fs::read_to_string(dir.path().join("out/result.json")).unwrap();
        let back: BacktestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        let csv = std::fs::read_to_string(dir.path().join("trades.csv")).unwrap();
        assert!(csv.starts_with("time,entry"));
    }
}
