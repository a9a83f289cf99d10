//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_ledger_adapter::CsvLedgerAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::LedgerError;
use crate::domain::params::{self, ParamSpec, ParamType, ParamValue, Parameters};
use crate::domain::strategy::{all_strategies, get_strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stockledger", about = "Deterministic investment-strategy ledger calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a strategy and write its day-by-day ledger
    Calculate {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the [report] output path (stdout if neither is set)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the [strategy] id from the config
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// List available strategies and their parameters
    ListStrategies,
    /// Validate a configuration without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the stored data range for a ticker
    Info {
        #[arg(long)]
        ticker: String,
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Calculate {
            config,
            output,
            strategy,
        } => run_calculate(&config, output, strategy.as_deref()),
        Command::ListStrategies => run_list_strategies(),
        Command::Validate { config } => run_validate(&config),
        Command::Info { ticker, config } => run_info(&ticker, &config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &LedgerError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_calculate(
    config_path: &PathBuf,
    output_override: Option<PathBuf>,
    strategy_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let strategy = match resolve_strategy(strategy_override, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    eprintln!("Using strategy: {}", strategy.name());

    let params = match build_parameters(&strategy.parameter_schema(), &config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let data = match price_adapter(&config) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let rows = match strategy.calculate(&data, &params) {
        Ok(rows) => rows,
        Err(e) => return fail(&e),
    };
    eprintln!("Computed {} ledger rows", rows.len());
    if let Some(last) = rows.last() {
        eprintln!(
            "Final: account ${:.2}, profit ${:.2}, principal ${:.2}",
            last.account_value, last.profit_loss, last.principal_invested
        );
    }

    let output = output_override.or_else(|| config.get_string("report", "output").map(PathBuf::from));
    let destination = output.clone();
    let report = CsvLedgerAdapter::new(output);
    if let Err(e) = report.write_ledger(&rows, strategy.extra_column()) {
        return fail(&e);
    }

    match destination {
        Some(path) => eprintln!("Ledger written to {}", path.display()),
        None => eprintln!("Ledger written to stdout"),
    }
    ExitCode::SUCCESS
}

fn run_list_strategies() -> ExitCode {
    for strategy in all_strategies() {
        println!("{}: {}", strategy.id(), strategy.name());
        println!("    {}", strategy.description());
        for spec in strategy.parameter_schema() {
            let required = if spec.required { "required" } else { "optional" };
            println!("    - {} ({})", spec.name, required);
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let strategy = match resolve_strategy(None, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    eprintln!("Strategy: {}", strategy.name());

    let schema = strategy.parameter_schema();
    let built = match build_parameters(&schema, &config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    if let Err(e) = params::validate(&schema, &built) {
        return fail(&e);
    }

    if config.get_string("data", "path").is_none() {
        return fail(&LedgerError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        });
    }

    eprintln!("Configuration is valid");
    ExitCode::SUCCESS
}

fn run_info(ticker: &str, config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = match price_adapter(&config) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let ticker = ticker.trim().to_uppercase();
    match crate::ports::data_port::PriceDataPort::get_data_range(&data, &ticker) {
        Ok(Some((first, last, count))) => {
            println!("{}: {} points, {} to {}", ticker, count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", ticker);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn resolve_strategy(
    id_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Box<dyn crate::domain::strategy::Strategy>, LedgerError> {
    let id = match id_override {
        Some(id) => id.to_string(),
        None => config
            .get_string("strategy", "id")
            .ok_or_else(|| LedgerError::ConfigMissing {
                section: "strategy".into(),
                key: "id".into(),
            })?,
    };
    get_strategy(id.trim())
}

fn price_adapter(config: &dyn ConfigPort) -> Result<CsvPriceAdapter, LedgerError> {
    let path = config
        .get_string("data", "path")
        .ok_or_else(|| LedgerError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvPriceAdapter::new(PathBuf::from(path)))
}

/// Read the `[strategy]` section into typed parameters. Keys absent from the
/// config fall back to schema defaults; required keys with no default are
/// left out for schema validation to report.
pub fn build_parameters(
    schema: &[ParamSpec],
    config: &dyn ConfigPort,
) -> Result<Parameters, LedgerError> {
    let mut params = Parameters::new();
    for spec in schema {
        let value = match config.get_string("strategy", spec.name) {
            Some(raw) => Some(parse_param(spec, raw.trim())?),
            None => spec.default.clone(),
        };
        if let Some(value) = value {
            params.set(spec.name, value);
        }
    }
    Ok(params)
}

fn parse_param(spec: &ParamSpec, raw: &str) -> Result<ParamValue, LedgerError> {
    match spec.param_type {
        ParamType::Text | ParamType::Select => Ok(ParamValue::Text(raw.to_string())),
        ParamType::Number => raw
            .parse()
            .map(ParamValue::Number)
            .map_err(|_| LedgerError::ConfigInvalid {
                section: "strategy".into(),
                key: spec.name.into(),
                reason: "expected a number".into(),
            }),
        ParamType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(ParamValue::Date)
            .map_err(|_| LedgerError::ConfigInvalid {
                section: "strategy".into(),
                key: spec.name.into(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            }),
    }
}
