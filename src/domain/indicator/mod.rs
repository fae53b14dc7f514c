//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values, aligned to the bars
//!
//! Every calculator is a single forward pass, so the value at bar `i` only
//! depends on bars `0..=i`.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use atr::calculate_atr;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

impl IndicatorValue {
    /// The value the strategy reads: the number itself for simple series, the
    /// histogram for MACD.
    pub fn primary(&self) -> f64 {
        match *self {
            IndicatorValue::Simple(v) => v,
            IndicatorValue::Macd { histogram, .. } => histogram,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    Atr(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Primary value at `index`, or `None` while the series is warming up or
    /// when it is shorter than the bar sequence.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value.primary())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(valid: bool, value: IndicatorValue) -> IndicatorPoint {
        IndicatorPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            valid,
            value,
        }
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_atr() {
        assert_eq!(IndicatorType::Atr(14).to_string(), "ATR(14)");
    }

    #[test]
    fn primary_of_macd_is_histogram() {
        let v = IndicatorValue::Macd {
            line: 3.0,
            signal: 1.0,
            histogram: 2.0,
        };
        assert!((v.primary() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn value_at_skips_invalid_and_out_of_range() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Rsi(2),
            values: vec![
                point(false, IndicatorValue::Simple(0.0)),
                point(true, IndicatorValue::Simple(55.0)),
            ],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(55.0));
        assert_eq!(series.value_at(2), None);
    }
}
