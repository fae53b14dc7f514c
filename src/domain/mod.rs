//! Core domain types and logic: indicators, lanes, positions, the portfolio
//! ledger, the backtest driver and the searches built on it.

pub mod ohlcv;
pub mod lane;
pub mod indicator;
pub mod indicator_helpers;
pub mod risk;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod signal;
pub mod backtest;
pub mod config_validation;
pub mod metrics;
pub mod search;
pub mod error;
