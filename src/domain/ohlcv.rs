//! OHLC bar representation and input validation.

use chrono::NaiveDate;

use super::error::TraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Carried through from the data file; the engine never reads it.
    pub volume: Option<f64>,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Reject bar sequences the engine must not run on: empty input, non-finite
/// prices, inverted high/low, and timestamps that are not strictly increasing.
pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), TraderError> {
    if bars.is_empty() {
        return Err(TraderError::DataValidation {
            index: 0,
            reason: "bar sequence is empty".into(),
        });
    }

    for (i, bar) in bars.iter().enumerate() {
        let prices = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() {
                return Err(TraderError::DataValidation {
                    index: i,
                    reason: format!("{name} is not a finite number"),
                });
            }
        }
        if bar.high < bar.low {
            return Err(TraderError::DataValidation {
                index: i,
                reason: format!("high {} is below low {}", bar.high, bar.low),
            });
        }
        if i > 0 {
            let prev = bars[i - 1].date;
            if bar.date == prev {
                return Err(TraderError::DataValidation {
                    index: i,
                    reason: format!("duplicate timestamp {}", bar.date),
                });
            }
            if bar.date < prev {
                return Err(TraderError::DataValidation {
                    index: i,
                    reason: format!("timestamp {} precedes {}", bar.date, prev),
                });
            }
        }
    }

    Ok(())
}

/// Split at `split_date`: in-sample is strictly before it, out-of-sample is on
/// or after it.
pub fn split_sample(bars: &[OhlcvBar], split_date: NaiveDate) -> (Vec<OhlcvBar>, Vec<OhlcvBar>) {
    let pivot = bars.partition_point(|b| b.date < split_date);
    (bars[..pivot].to_vec(), bars[pivot..].to_vec())
}
