//! Stop-loss / take-profit distance multiplier policies.

use std::fmt;
use std::str::FromStr;

use super::indicator_helpers::IndicatorRow;
use super::lane::{AdaptiveMultiplier, LaneConfig};

/// Run-wide choice of policy; both lanes use the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    Static,
    Adaptive,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Static => f.write_str("static"),
            PolicyKind::Adaptive => f.write_str("adaptive"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(PolicyKind::Static),
            "adaptive" | "dynamic" => Ok(PolicyKind::Adaptive),
            other => Err(format!("unknown multiplier policy '{other}' (expected static or adaptive)")),
        }
    }
}

/// A lane's resolved policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MultiplierPolicy {
    Static(f64),
    Adaptive(AdaptiveMultiplier),
}

impl MultiplierPolicy {
    pub fn for_lane(kind: PolicyKind, config: &LaneConfig) -> Self {
        match kind {
            PolicyKind::Static => MultiplierPolicy::Static(config.static_multiplier),
            PolicyKind::Adaptive => MultiplierPolicy::Adaptive(config.adaptive),
        }
    }

    /// Short/long volatility windows the indicator engine must also compute.
    pub fn band_windows(&self) -> Option<(usize, usize)> {
        match self {
            MultiplierPolicy::Static(_) => None,
            MultiplierPolicy::Adaptive(a) => Some((a.short_window, a.long_window)),
        }
    }

    /// Multiplier for a position opened on this row's bar.
    pub fn resolve(&self, row: &IndicatorRow) -> f64 {
        match self {
            MultiplierPolicy::Static(m) => *m,
            MultiplierPolicy::Adaptive(a) => match row.volatility_band {
                Some(band) if band.short > band.long => a.wide,
                _ => a.narrow,
            },
        }
    }
}
