#![allow(dead_code)]

use chrono::NaiveDate;
use hybridtrader::domain::backtest::BacktestConfig;
use hybridtrader::domain::error::TraderError;
use hybridtrader::domain::execution::ContractSpec;
pub use hybridtrader::domain::ohlcv::OhlcvBar;
use hybridtrader::ports::data_port::DataPort;
use std::path::Path;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, TraderError> {
        match &self.error {
            Some(reason) => Err(TraderError::DataSource {
                reason: reason.clone(),
            }),
            None => Ok(self.bars.clone()),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 2.0,
        low: close - 2.0,
        close,
        volume: Some(1000.0),
    }
}

/// Daily bars following `closes`, starting at `start`.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: Some(1000.0),
        })
        .collect()
}

/// A wavy, deterministic series around `base` that triggers entries and exits
/// in both lanes with small windows.
pub fn generate_bars(count: usize, base: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            base + 60.0 * (t / 9.0).sin() + 15.0 * (t / 2.3).cos() + 0.2 * t
        })
        .collect();
    bars_from_closes(date(2020, 1, 1), &closes)
}

/// Small windows, unit contracts and capital sized so every entry is
/// affordable.
pub fn small_window_config() -> BacktestConfig {
    let mut config = BacktestConfig {
        initial_capital: 1_000_000.0,
        contract: ContractSpec::unit(),
        ..BacktestConfig::default()
    };
    for lane in [&mut config.momentum, &mut config.reversion] {
        lane.trend_fast_window = 3;
        lane.trend_slow_window = 6;
        lane.trend_signal_window = 3;
        lane.momentum_window = 5;
        lane.volatility_window = 5;
        lane.adaptive.short_window = 3;
        lane.adaptive.long_window = 8;
    }
    config.momentum.momentum_threshold = 20.0;
    config
}

pub fn write_bars_csv(path: &Path, bars: &[OhlcvBar]) {
    let mut content = String::from("time,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date,
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume.unwrap_or(0.0)
        ));
    }
    std::fs::write(path, content).unwrap();
}
