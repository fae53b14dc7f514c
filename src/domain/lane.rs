//! Strategy lanes and their per-run parameter sets.
//!
//! A run trades two lanes side by side, each with its own half of the starting
//! capital and its own indicator windows.

use std::fmt;

/// RSI band used by the reversion lane; the momentum lane's band is configurable.
pub const REVERSION_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lane {
    Momentum,
    Reversion,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::Momentum, Lane::Reversion];

    /// INI section / display name.
    pub fn name(self) -> &'static str {
        match self {
            Lane::Momentum => "momentum",
            Lane::Reversion => "reversion",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Lane::Momentum => 0,
            Lane::Reversion => 1,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of the short-vs-long volatility comparison used by the adaptive
/// multiplier policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveMultiplier {
    pub short_window: usize,
    pub long_window: usize,
    /// Used when short-window volatility exceeds long-window volatility.
    pub wide: f64,
    pub narrow: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneConfig {
    pub trend_fast_window: usize,
    pub trend_slow_window: usize,
    pub trend_signal_window: usize,
    pub momentum_window: usize,
    /// Momentum lane only; the reversion lane always uses [`REVERSION_THRESHOLD`].
    pub momentum_threshold: f64,
    pub volatility_window: usize,
    pub static_multiplier: f64,
    pub adaptive: AdaptiveMultiplier,
}

impl LaneConfig {
    pub fn default_for(lane: Lane) -> Self {
        match lane {
            Lane::Momentum => LaneConfig {
                trend_fast_window: 12,
                trend_slow_window: 26,
                trend_signal_window: 9,
                momentum_window: 14,
                momentum_threshold: 30.0,
                volatility_window: 14,
                static_multiplier: 2.0,
                adaptive: AdaptiveMultiplier {
                    short_window: 10,
                    long_window: 20,
                    wide: 2.0,
                    narrow: 1.5,
                },
            },
            Lane::Reversion => LaneConfig {
                trend_fast_window: 12,
                trend_slow_window: 26,
                trend_signal_window: 9,
                momentum_window: 14,
                momentum_threshold: REVERSION_THRESHOLD,
                volatility_window: 14,
                static_multiplier: 1.5,
                adaptive: AdaptiveMultiplier {
                    short_window: 7,
                    long_window: 14,
                    wide: 2.0,
                    narrow: 1.5,
                },
            },
        }
    }

    /// The band `x` of the entry/exit tables for `lane`.
    pub fn threshold_for(&self, lane: Lane) -> f64 {
        match lane {
            Lane::Momentum => self.momentum_threshold,
            Lane::Reversion => REVERSION_THRESHOLD,
        }
    }
}
