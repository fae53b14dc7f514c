//! CSV file data adapter.
//!
//! Expects a header row naming `Time` (or `Date`), `Open`, `High`, `Low`,
//! `Close` and optionally `Volume`, in any order and any letter case. Rows
//! with an empty OHLC cell are dropped, rows are sorted by date and repeated
//! dates keep their first row.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    path: PathBuf,
}

struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, TraderError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |name: &str, aliases: &[&str]| {
            find(aliases).ok_or_else(|| TraderError::DataSource {
                reason: format!("missing required column '{name}'"),
            })
        };
        Ok(Columns {
            time: require("Time", &["time", "date", "datetime"])?,
            open: require("Open", &["open"])?,
            high: require("High", &["high"])?,
            low: require("Low", &["low"])?,
            close: require("Close", &["close"])?,
            volume: find(&["volume"]),
        })
    }
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parse CSV text; `line` numbers in errors count the header as line 1.
    pub fn parse(content: &str) -> Result<Vec<OhlcvBar>, TraderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| TraderError::DataSource {
            reason: format!("CSV header error: {e}"),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let line = i + 2;
            let record = result.map_err(|e| TraderError::DataSource {
                reason: format!("CSV parse error on line {line}: {e}"),
            })?;
            let cell = |index: usize| record.get(index).unwrap_or("");

            let prices = [
                cell(columns.open),
                cell(columns.high),
                cell(columns.low),
                cell(columns.close),
            ];
            if prices.iter().any(|p| p.is_empty()) {
                debug!(line, "dropping row with missing OHLC value");
                continue;
            }

            let date = parse_date(cell(columns.time)).ok_or_else(|| TraderError::DataSource {
                reason: format!("invalid date '{}' on line {line}", cell(columns.time)),
            })?;
            let [open, high, low, close] = prices.map(|p| p.parse::<f64>());
            let number = |value: Result<f64, _>, name: &str| {
                value.map_err(|e: std::num::ParseFloatError| TraderError::DataSource {
                    reason: format!("invalid {name} value on line {line}: {e}"),
                })
            };
            let volume = match columns.volume.map(cell) {
                Some(v) if !v.is_empty() => Some(number(v.parse::<f64>(), "volume")?),
                _ => None,
            };

            bars.push(OhlcvBar {
                date,
                open: number(open, "open")?,
                high: number(high, "high")?,
                low: number(low, "low")?,
                close: number(close, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        bars.dedup_by_key(|b| b.date);
        if bars.len() < before {
            debug!(dropped = before - bars.len(), "dropped rows with duplicate dates");
        }
        Ok(bars)
    }
}

/// `YYYY-MM-DD`, optionally followed by a time of day.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, TraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TraderError::DataSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        Self::parse(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
