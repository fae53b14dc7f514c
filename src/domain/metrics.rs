//! Performance metrics computed from a finished run's NAV curve and trade log.

use super::error::TraderError;
use super::portfolio::NavPoint;
use super::position::ClosedTrade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annual risk-free rate used when none is configured.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03093;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Holding-period return, percent.
    pub hpr: f64,
    /// Maximum drawdown, percent, ≤ 0.
    pub mdd: f64,
    /// Longest run of bars spent below the running peak.
    pub ldd: usize,
    pub sharpe: f64,
    pub sortino: f64,
    pub score: f64,
    pub trades: TradeStats,
}

impl Metrics {
    pub fn compute(
        nav_curve: &[NavPoint],
        trades: &[ClosedTrade],
        risk_free_rate: f64,
    ) -> Result<Self, TraderError> {
        let returns = defined_returns(nav_curve);
        let hpr = holding_period_return(nav_curve)?;
        let mdd = maximum_drawdown(&returns)?;
        let ldd = longest_drawdown(&returns)?;
        let sharpe = sharpe_ratio(&returns, risk_free_rate)?;
        let sortino = sortino_ratio(&returns, risk_free_rate)?;

        Ok(Metrics {
            hpr,
            mdd,
            ldd,
            sharpe,
            sortino,
            score: composite_score(hpr, mdd, ldd, sharpe, sortino),
            trades: TradeStats::compute(trades),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeStats {
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_holding_days: f64,
    pub total_tax: f64,
}

impl TradeStats {
    /// Wins and losses are judged on P&L net of close tax.
    pub fn compute(trades: &[ClosedTrade]) -> Self {
        let mut stats = TradeStats {
            total: trades.len(),
            ..TradeStats::default()
        };
        let mut gross_win = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut holding_days = 0i64;

        for trade in trades {
            let pnl = trade.net_pnl();
            stats.total_tax += trade.tax;
            holding_days += trade.holding_days();
            if pnl > 0.0 {
                stats.won += 1;
                gross_win += pnl;
                stats.largest_win = stats.largest_win.max(pnl);
            } else if pnl < 0.0 {
                stats.lost += 1;
                gross_loss += pnl.abs();
                stats.largest_loss = stats.largest_loss.max(pnl.abs());
            } else {
                stats.breakeven += 1;
            }
        }

        if stats.total > 0 {
            stats.win_rate = stats.won as f64 / stats.total as f64;
            stats.avg_holding_days = holding_days as f64 / stats.total as f64;
        }
        if stats.won > 0 {
            stats.avg_win = gross_win / stats.won as f64;
        }
        if stats.lost > 0 {
            stats.avg_loss = gross_loss / stats.lost as f64;
        }
        stats.profit_factor = if gross_loss > 0.0 {
            gross_win / gross_loss
        } else if gross_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        stats
    }
}

pub fn defined_returns(nav_curve: &[NavPoint]) -> Vec<f64> {
    nav_curve.iter().filter_map(|p| p.ret).collect()
}

/// (NAV_last / NAV_first − 1) × 100.
pub fn holding_period_return(nav_curve: &[NavPoint]) -> Result<f64, TraderError> {
    match (nav_curve.first(), nav_curve.last()) {
        (Some(first), Some(last)) if first.nav > 0.0 => Ok((last.nav / first.nav - 1.0) * 100.0),
        (Some(_), Some(_)) => Err(metrics_error("first NAV is not positive")),
        _ => Err(metrics_error("NAV curve is empty")),
    }
}

fn check_returns(returns: &[f64]) -> Result<(), TraderError> {
    if returns.is_empty() {
        return Err(metrics_error("return series is empty"));
    }
    if returns.iter().any(|&r| r == -1.0) {
        return Err(metrics_error("all capital of the portfolio is lost"));
    }
    Ok(())
}

/// Compounds the returns from 1.0 and reports the worst fall from a peak, in
/// percent (≤ 0).
pub fn maximum_drawdown(returns: &[f64]) -> Result<f64, TraderError> {
    check_returns(returns)?;
    let mut asset = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut mdd = 0.0_f64;
    for r in returns {
        asset *= 1.0 + r;
        peak = peak.max(asset);
        mdd = mdd.min(-(1.0 - asset / peak));
    }
    Ok(mdd * 100.0)
}

pub fn longest_drawdown(returns: &[f64]) -> Result<usize, TraderError> {
    check_returns(returns)?;
    let mut asset = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut run = 0usize;
    let mut longest = 0usize;
    for r in returns {
        asset *= 1.0 + r;
        if asset >= peak {
            peak = asset;
            longest = longest.max(run);
            run = 0;
        } else {
            run += 1;
        }
    }
    Ok(longest.max(run))
}

/// (252 × mean − rf) / (√252 × sample std). Zero when the returns do not vary.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Result<f64, TraderError> {
    if returns.is_empty() {
        return Err(metrics_error("return series is empty"));
    }
    if returns.len() < 2 {
        return Ok(0.0);
    }
    let mean = mean(returns);
    let n = returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std == 0.0 {
        return Ok(0.0);
    }
    Ok((TRADING_DAYS_PER_YEAR * mean - risk_free_rate) / (TRADING_DAYS_PER_YEAR.sqrt() * std))
}

/// (√252 × mean − rf) / downside risk, where downside risk only counts returns
/// at or below rf.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> Result<f64, TraderError> {
    if returns.is_empty() {
        return Err(metrics_error("return series is empty"));
    }
    let downside = returns
        .iter()
        .map(|&r| {
            if r > risk_free_rate {
                0.0
            } else {
                (r - risk_free_rate).powi(2)
            }
        })
        .sum::<f64>()
        / returns.len() as f64;
    let downside = downside.sqrt();
    if downside == 0.0 {
        return Ok(0.0);
    }
    Ok((TRADING_DAYS_PER_YEAR.sqrt() * mean(returns) - risk_free_rate) / downside)
}

/// hpr + mdd/10 − ldd/100 + ((sharpe + sortino)/2)³
pub fn composite_score(hpr: f64, mdd: f64, ldd: usize, sharpe: f64, sortino: f64) -> f64 {
    hpr + mdd / 10.0 - ldd as f64 / 100.0 + ((sharpe + sortino) / 2.0).powi(3)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn metrics_error(reason: &str) -> TraderError {
    TraderError::Metrics {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lane::Lane;
    use crate::domain::position::{ExitReason, PositionId, Side};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn curve(values: &[f64]) -> Vec<NavPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut out: Vec<NavPoint> = Vec::new();
        for (i, &nav) in values.iter().enumerate() {
            let ret = out.last().map(|p: &NavPoint| nav / p.nav - 1.0);
            out.push(NavPoint {
                date: start + chrono::Duration::days(i as i64),
                nav,
                ret,
            });
        }
        out
    }

    fn trade(pnl: f64, tax: f64, days: i64) -> ClosedTrade {
        let entry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ClosedTrade {
            id: PositionId(1),
            lane: Lane::Momentum,
            side: Side::Long,
            quantity: 1,
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            entry_date,
            exit_date: entry_date + chrono::Duration::days(days),
            pnl,
            tax,
            reason: ExitReason::Trend,
        }
    }

    #[test]
    fn hpr_percent() {
        assert_relative_eq!(
            holding_period_return(&curve(&[100.0, 90.0, 125.0])).unwrap(),
            25.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn hpr_empty_curve_is_error() {
        assert!(matches!(
            holding_period_return(&[]),
            Err(TraderError::Metrics { .. })
        ));
    }

    #[test]
    fn mdd_from_compounded_returns() {
        let returns = defined_returns(&curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]));
        let mdd = maximum_drawdown(&returns).unwrap();
        assert_relative_eq!(mdd, -(1.0 - 80.0 / 110.0) * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn mdd_zero_when_monotonic() {
        let returns = defined_returns(&curve(&[100.0, 101.0, 102.0]));
        assert!(maximum_drawdown(&returns).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn ldd_counts_bars_below_peak() {
        let returns = defined_returns(&curve(&[100.0, 110.0, 100.0, 90.0, 85.0, 95.0]));
        assert_eq!(longest_drawdown(&returns).unwrap(), 4);
    }

    #[test]
    fn ldd_resets_on_new_peak() {
        let returns = defined_returns(&curve(&[100.0, 90.0, 101.0, 95.0, 96.0, 97.0, 102.0]));
        assert_eq!(longest_drawdown(&returns).unwrap(), 3);
    }

    #[test]
    fn wiped_out_capital_is_error() {
        let returns = vec![0.1, -1.0];
        assert!(maximum_drawdown(&returns).is_err());
        assert!(longest_drawdown(&returns).is_err());
    }

    #[test]
    fn empty_returns_are_error() {
        assert!(maximum_drawdown(&[]).is_err());
        assert!(sharpe_ratio(&[], 0.0).is_err());
        assert!(sortino_ratio(&[], 0.0).is_err());
    }

    #[test]
    fn sharpe_uses_sample_std() {
        let returns = [0.01, 0.02, 0.03];
        let mean = 0.02;
        let std = ((0.0001 + 0.0 + 0.0001) / 2.0_f64).sqrt();
        let expected = (252.0 * mean - 0.03) / (252.0_f64.sqrt() * std);
        assert_relative_eq!(sharpe_ratio(&returns, 0.03).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn sharpe_zero_for_flat_returns() {
        assert!(sharpe_ratio(&[0.0, 0.0, 0.0], 0.03).unwrap().abs() < f64::EPSILON);
        assert!(sharpe_ratio(&[0.01], 0.03).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn sortino_downside_only_below_rf() {
        let returns = [0.05, -0.01, 0.02];
        let rf = 0.03;
        let downside = (((-0.01_f64 - rf).powi(2) + (0.02_f64 - rf).powi(2)) / 3.0).sqrt();
        let expected = (252.0_f64.sqrt() * (0.06 / 3.0) - rf) / downside;
        assert_relative_eq!(sortino_ratio(&returns, rf).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn sortino_zero_without_downside() {
        assert!(sortino_ratio(&[0.5, 0.6], 0.03).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn score_formula() {
        let score = composite_score(12.0, -5.0, 30, 1.0, 3.0);
        assert_relative_eq!(score, 12.0 - 0.5 - 0.3 + 8.0, epsilon = 1e-12);
    }

    #[test]
    fn trade_stats_net_of_tax() {
        let stats = TradeStats::compute(&[
            trade(100.0, 0.0, 5),
            trade(-50.0, 0.0, 3),
            trade(200.0, 0.0, 10),
            trade(1.0, 1.0, 2),
        ]);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.won, 2);
        assert_eq!(stats.lost, 1);
        assert_eq!(stats.breakeven, 1);
        assert!((stats.win_rate - 0.5).abs() < f64::EPSILON);
        assert!((stats.profit_factor - 6.0).abs() < 1e-9);
        assert!((stats.avg_win - 150.0).abs() < 1e-9);
        assert!((stats.largest_loss - 50.0).abs() < 1e-9);
        assert!((stats.avg_holding_days - 5.0).abs() < 1e-9);
        assert!((stats.total_tax - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trade_stats_empty() {
        let stats = TradeStats::compute(&[]);
        assert_eq!(stats, TradeStats::default());
    }

    #[test]
    fn compute_needs_returns() {
        let single = curve(&[100.0]);
        assert!(Metrics::compute(&single, &[], DEFAULT_RISK_FREE_RATE).is_err());
    }

    #[test]
    fn compute_full() {
        let nav = curve(&[100.0, 102.0, 101.0, 104.0]);
        let m = Metrics::compute(&nav, &[], DEFAULT_RISK_FREE_RATE).unwrap();
        assert_relative_eq!(m.hpr, 4.0, epsilon = 1e-9);
        assert!(m.mdd < 0.0);
        assert_eq!(m.ldd, 1);
        assert_relative_eq!(
            m.score,
            composite_score(m.hpr, m.mdd, m.ldd, m.sharpe, m.sortino),
            epsilon = 1e-12
        );
    }
}
