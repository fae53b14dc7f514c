//! Per-lane indicator rows: the bulk pass that turns bars into the values the
//! signal evaluator reads.

use crate::domain::indicator::{calculate_atr, calculate_macd, calculate_rsi, IndicatorSeries};
use crate::domain::lane::LaneConfig;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::risk::MultiplierPolicy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityBand {
    pub short: f64,
    pub long: f64,
}

/// Derived values for one lane at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    /// MACD histogram.
    pub trend_diff: f64,
    /// RSI, 0..=100.
    pub momentum: f64,
    /// ATR over the lane's volatility window.
    pub volatility: f64,
    /// Present only under the adaptive policy.
    pub volatility_band: Option<VolatilityBand>,
}

/// One optional row per bar; `None` marks warm-up.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneIndicators {
    pub rows: Vec<Option<IndicatorRow>>,
}

impl LaneIndicators {
    pub fn row(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index).and_then(|r| r.as_ref())
    }

    /// Index of the first defined row.
    pub fn first_defined(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.is_some())
    }
}

pub fn compute_lane_indicators(
    bars: &[OhlcvBar],
    config: &LaneConfig,
    policy: &MultiplierPolicy,
) -> LaneIndicators {
    let macd = calculate_macd(
        bars,
        config.trend_fast_window,
        config.trend_slow_window,
        config.trend_signal_window,
    );
    let rsi = calculate_rsi(bars, config.momentum_window);
    let atr = calculate_atr(bars, config.volatility_window);
    let band: Option<(IndicatorSeries, IndicatorSeries)> = policy
        .band_windows()
        .map(|(short, long)| (calculate_atr(bars, short), calculate_atr(bars, long)));

    let rows = (0..bars.len())
        .map(|i| {
            let volatility_band = match &band {
                Some((short, long)) => Some(VolatilityBand {
                    short: short.value_at(i)?,
                    long: long.value_at(i)?,
                }),
                None => None,
            };
            Some(IndicatorRow {
                trend_diff: macd.value_at(i)?,
                momentum: rsi.value_at(i)?,
                volatility: atr.value_at(i)?,
                volatility_band,
            })
        })
        .collect();

    LaneIndicators { rows }
}
