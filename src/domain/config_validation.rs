//! Parameter validation.
//!
//! Runs on a fully built [`BacktestConfig`] before any bar is processed, so
//! INI-loaded configs and search candidates are held to the same rules.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::TraderError;
use crate::domain::lane::{Lane, LaneConfig};
use crate::domain::risk::PolicyKind;

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), TraderError> {
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    validate_tax(config)?;
    validate_short_slot_fraction(config)?;
    validate_contract(config)?;
    for lane in Lane::ALL {
        validate_lane_config(lane, config.lane(lane), config.policy)?;
    }
    Ok(())
}

pub fn validate_lane_config(
    lane: Lane,
    config: &LaneConfig,
    policy: PolicyKind,
) -> Result<(), TraderError> {
    let section = lane.name();
    let windows = [
        ("fast_window", config.trend_fast_window),
        ("slow_window", config.trend_slow_window),
        ("signal_window", config.trend_signal_window),
        ("momentum_window", config.momentum_window),
        ("volatility_window", config.volatility_window),
    ];
    for (key, value) in windows {
        if value == 0 {
            return Err(TraderError::invalid(section, key, format!("{key} must be at least 1")));
        }
    }
    if config.trend_fast_window >= config.trend_slow_window {
        return Err(TraderError::invalid(
            section,
            "fast_window",
            format!(
                "fast_window ({}) must be below slow_window ({})",
                config.trend_fast_window, config.trend_slow_window
            ),
        ));
    }

    if lane == Lane::Momentum {
        let x = config.momentum_threshold;
        if !(x > 0.0 && x < 50.0) {
            return Err(TraderError::invalid(
                section,
                "momentum_threshold",
                "momentum_threshold must be strictly between 0 and 50",
            ));
        }
    }

    match policy {
        PolicyKind::Static => positive(section, "multiplier", config.static_multiplier),
        PolicyKind::Adaptive => validate_adaptive(section, config),
    }
}

fn validate_adaptive(section: &str, config: &LaneConfig) -> Result<(), TraderError> {
    let a = &config.adaptive;
    if a.short_window == 0 {
        return Err(TraderError::invalid(
            section,
            "short_volatility_window",
            "short_volatility_window must be at least 1",
        ));
    }
    if a.short_window >= a.long_window {
        return Err(TraderError::invalid(
            section,
            "short_volatility_window",
            format!(
                "short_volatility_window ({}) must be below long_volatility_window ({})",
                a.short_window, a.long_window
            ),
        ));
    }
    positive(section, "wide_multiplier", a.wide)?;
    positive(section, "narrow_multiplier", a.narrow)?;
    if a.wide < a.narrow {
        return Err(TraderError::invalid(
            section,
            "wide_multiplier",
            "wide_multiplier must not be below narrow_multiplier",
        ));
    }
    Ok(())
}

fn positive(section: &str, key: &str, value: f64) -> Result<(), TraderError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TraderError::invalid(section, key, format!("{key} must be positive")))
    }
}

fn validate_initial_capital(config: &BacktestConfig) -> Result<(), TraderError> {
    positive("backtest", "initial_capital", config.initial_capital)
}

fn validate_risk_free_rate(config: &BacktestConfig) -> Result<(), TraderError> {
    let value = config.risk_free_rate;
    if !(0.0..1.0).contains(&value) {
        return Err(TraderError::invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_tax(config: &BacktestConfig) -> Result<(), TraderError> {
    if !(0.0..1.0).contains(&config.tax.rate) {
        return Err(TraderError::invalid(
            "backtest",
            "tax_rate",
            "tax_rate must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_short_slot_fraction(config: &BacktestConfig) -> Result<(), TraderError> {
    let value = config.short_slot_fraction;
    if !(value > 0.0 && value <= 1.0) {
        return Err(TraderError::invalid(
            "backtest",
            "short_slot_fraction",
            "short_slot_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_contract(config: &BacktestConfig) -> Result<(), TraderError> {
    positive("contract", "multiplier", config.contract.multiplier)?;
    positive("contract", "margin_ratio", config.contract.margin_ratio)?;
    positive("contract", "account_ratio", config.contract.account_ratio)
}
