//! # Forecast Chat
//!
//! `forecast_chat` is a small read-eval-print loop on top of a
//! [`production_forecast::Forecaster`]. It prompts for a date, answers with
//! the forecast value or an error message, and stops on an exit keyword or
//! at end of input.
//!
//! ## Usage Example
//!
//! ```no_run
//! use forecast_chat::{ChatSession, ChatSettings};
//! use production_forecast::{CsvLoader, Forecaster};
//! use std::io;
//!
//! let series = CsvLoader::new().load("Electric_Production.csv").unwrap();
//! let forecaster = Forecaster::from_series(series).unwrap();
//!
//! let session = ChatSession::new(&forecaster, ChatSettings::default());
//! let stdin = io::stdin();
//! session.run(stdin.lock(), io::stdout()).unwrap();
//! ```

use chrono::NaiveDate;
use production_forecast::{ForecastError, Forecaster, Prediction};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

/// Prompt shown before every query
pub const PROMPT: &str = "Enter a future date (YYYY-MM-DD) for prediction: ";

/// Message for input that is not a `YYYY-MM-DD` date
pub const INVALID_FORMAT: &str = "Invalid date format. Please use YYYY-MM-DD format.";

const SEPARATOR_WIDTH: usize = 50;

/// Presentation settings for a chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    /// Name of the forecast quantity, e.g. "Electric Production"
    pub label: String,
    /// Case-insensitive word that ends the session
    pub exit_keyword: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            label: "Electric Production".to_string(),
            exit_keyword: "exit".to_string(),
        }
    }
}

/// What the session does with one line of input
#[derive(Debug)]
pub enum Reply {
    /// The exit keyword was entered
    Exit,
    /// Blank line
    Empty,
    /// Input is not a `YYYY-MM-DD` date
    InvalidFormat,
    /// A prediction was attempted
    Answer {
        /// Date as typed by the user
        date: String,
        /// Forecast value or the reason there is none
        result: Result<f64, ForecastError>,
    },
}

/// Counters for a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Queries answered with a value
    pub answered: usize,
    /// Queries that produced an error
    pub failed: usize,
    /// Lines rejected by the format check
    pub invalid: usize,
}

/// Interactive session bound to one forecaster
#[derive(Debug)]
pub struct ChatSession<'a> {
    forecaster: &'a Forecaster,
    settings: ChatSettings,
}

impl<'a> ChatSession<'a> {
    /// Create a session
    pub fn new(forecaster: &'a Forecaster, settings: ChatSettings) -> Self {
        Self {
            forecaster,
            settings,
        }
    }

    /// Settings in use
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Decide how to answer a single line of input
    pub fn respond(&self, line: &str) -> Reply {
        let input = line.trim();
        if input.is_empty() {
            return Reply::Empty;
        }
        if input.eq_ignore_ascii_case(&self.settings.exit_keyword) {
            return Reply::Exit;
        }
        if NaiveDate::parse_from_str(input, "%Y-%m-%d").is_err() {
            return Reply::InvalidFormat;
        }

        Reply::Answer {
            date: input.to_string(),
            result: self.forecaster.predict(input),
        }
    }

    /// Run the prompt loop until the exit keyword or end of input
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<SessionStats> {
        self.write_banner(&mut output)?;

        let mut stats = SessionStats::default();
        let mut line = String::new();
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                debug!("end of input");
                break;
            }

            match self.respond(&line) {
                Reply::Exit => {
                    writeln!(
                        output,
                        "Thank you for using the {} Forecasting Chatbot!",
                        self.settings.label
                    )?;
                    break;
                }
                Reply::Empty => {}
                Reply::InvalidFormat => {
                    stats.invalid += 1;
                    writeln!(output, "\n{}\n", INVALID_FORMAT)?;
                }
                Reply::Answer { date, result } => {
                    match result {
                        Ok(value) => {
                            stats.answered += 1;
                            writeln!(output, "\nPredicted {} for {}: {}", self.settings.label, date, value)?;
                        }
                        Err(err) => {
                            stats.failed += 1;
                            debug!(%date, error = %err, "query failed");
                            writeln!(
                                output,
                                "\nCould not predict {} for {}: {}",
                                self.settings.label, date, err
                            )?;
                        }
                    }
                    writeln!(output, "\n{}\n", "=".repeat(SEPARATOR_WIDTH))?;
                }
            }
        }

        info!(
            answered = stats.answered,
            failed = stats.failed,
            invalid = stats.invalid,
            "session finished"
        );
        Ok(stats)
    }

    fn write_banner<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let label = &self.settings.label;
        writeln!(output, "\n--- {} Forecasting Chatbot ---", label)?;
        writeln!(
            output,
            "I can help you predict {} for future dates!",
            label.to_lowercase()
        )?;
        writeln!(
            output,
            "Last known data point is: {}",
            self.forecaster.last_known_date().date()
        )?;
        if let Some(err) = self.forecaster.training_error() {
            writeln!(output, "Warning: no model is available ({})", err)?;
        }
        writeln!(
            output,
            "Type '{}' to quit the chat.\n",
            self.settings.exit_keyword
        )?;
        Ok(())
    }
}

/// One answered date in machine-readable form
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JsonAnswer<'a> {
    /// Query answered with a forecast
    Predicted {
        query: &'a str,
        prediction: Prediction,
    },
    /// Query rejected
    Failed { query: &'a str, error: String },
}

/// Answer every date in `dates` and render the answers as a pretty JSON array
pub fn answer_json<S: AsRef<str>>(forecaster: &Forecaster, dates: &[S]) -> serde_json::Result<String> {
    let answers: Vec<JsonAnswer<'_>> = dates
        .iter()
        .map(|date| {
            let query = date.as_ref();
            match forecaster.predict_detailed(query) {
                Ok(prediction) => JsonAnswer::Predicted { query, prediction },
                Err(err) => JsonAnswer::Failed {
                    query,
                    error: err.to_string(),
                },
            }
        })
        .collect();
    serde_json::to_string_pretty(&answers)
}
