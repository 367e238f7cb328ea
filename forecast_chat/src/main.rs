//! # forecast-chat
//!
//! Loads a monthly series from CSV, fits an ARIMA model once and then either
//! answers `--predict` dates directly or starts the interactive prompt.

use clap::Parser;
use forecast_chat::{answer_json, ChatSession, ChatSettings};
use production_forecast::{ArimaConfig, ArimaModel, ArimaOrder, CsvLoader, Forecaster};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "forecast-chat", version, about = "Monthly ARIMA forecasting chatbot")]
struct Cli {
    /// CSV file with a date column and a value column
    #[arg(short, long, env = "FORECAST_DATA")]
    data: PathBuf,

    /// Name of the date column (detected from the header when omitted)
    #[arg(long)]
    date_column: Option<String>,

    /// Name of the value column (first non-date column when omitted)
    #[arg(long)]
    value_column: Option<String>,

    /// Model order as p,d,q
    #[arg(long, default_value = "1,1,1")]
    order: ArimaOrder,

    /// Estimate a drift term for the differenced series
    #[arg(long)]
    drift: bool,

    /// Optimizer iteration budget
    #[arg(long)]
    max_iter: Option<usize>,

    /// Optimizer convergence tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Minimum number of observations required for training
    #[arg(long)]
    min_observations: Option<usize>,

    /// Name of the forecast quantity shown in messages
    #[arg(long, default_value = "Electric Production")]
    label: String,

    /// Word that ends the interactive session
    #[arg(long, default_value = "exit")]
    exit_keyword: String,

    /// Answer these dates and exit instead of starting the prompt
    #[arg(short, long = "predict", value_name = "DATE")]
    predict: Vec<String>,

    /// Print --predict answers as a JSON array
    #[arg(long)]
    json: bool,

    /// Print the fitted model summary before answering
    #[arg(long)]
    show_model: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn model(&self) -> production_forecast::Result<ArimaModel> {
        let mut config = ArimaConfig {
            order: self.order,
            include_drift: self.drift,
            ..Default::default()
        };
        if let Some(max_iter) = self.max_iter {
            config.optimizer.max_iterations = max_iter;
        }
        if let Some(tolerance) = self.tolerance {
            config.optimizer.tolerance = tolerance;
        }
        if let Some(min) = self.min_observations {
            config.min_observations = min;
        }
        ArimaModel::new(config)
    }

    fn loader(&self) -> CsvLoader {
        let mut loader = CsvLoader::new();
        if let Some(column) = &self.date_column {
            loader = loader.date_column(column);
        }
        if let Some(column) = &self.value_column {
            loader = loader.value_column(column);
        }
        loader
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let model = cli.model()?;
    let series = cli.loader().load(&cli.data)?;
    info!(path = %cli.data.display(), observations = series.len(), "series loaded");

    let forecaster = Forecaster::build(series, model);
    if let Some(err) = forecaster.training_error() {
        warn!(error = %err, "continuing without a fitted model");
    }

    if cli.show_model {
        match forecaster.model() {
            Some(fitted) => println!("{}\n", fitted),
            None => println!("No fitted model available\n"),
        }
    }

    if !cli.predict.is_empty() {
        if cli.json {
            println!("{}", answer_json(&forecaster, &cli.predict)?);
            return Ok(());
        }

        for date in &cli.predict {
            match forecaster.predict(date) {
                Ok(value) => println!("Predicted {} for {}: {}", cli.label, date, value),
                Err(err) => println!("Could not predict {} for {}: {}", cli.label, date, err),
            }
        }
        return Ok(());
    }

    let settings = ChatSettings {
        label: cli.label.clone(),
        exit_keyword: cli.exit_keyword.clone(),
    };
    let session = ChatSession::new(&forecaster, settings);
    let stdin = io::stdin();
    session.run(stdin.lock(), io::stdout())?;
    Ok(())
}
