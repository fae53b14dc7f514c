//! Backtest driver: one chronological pass over the bars for both lanes.
//!
//! Per bar: exits for both lanes (settling cash), then entries for both
//! lanes, then the NAV at the bar's close. No lane is evaluated until every
//! lane's indicators are past warm-up, and a lane that closed anything on a
//! bar does not open on that bar. Positions still open after the last bar
//! stay open and are marked to market in the final NAV.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::config_validation::validate_backtest_config;
use super::error::TraderError;
use super::execution::{size_long, size_short, ContractSpec, TaxPolicy};
use super::indicator_helpers::{compute_lane_indicators, IndicatorRow, LaneIndicators};
use super::lane::{Lane, LaneConfig};
use super::metrics::DEFAULT_RISK_FREE_RATE;
use super::ohlcv::{validate_bars, OhlcvBar};
use super::portfolio::{NavPoint, Portfolio, TradeEvent};
use super::position::{exit_levels, ClosedTrade, Position, PositionRequest, Side};
use super::risk::{MultiplierPolicy, PolicyKind};
use super::signal::SignalEvaluator;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 2e8;
pub const DEFAULT_SHORT_SLOT_FRACTION: f64 = 1.0 / 3.0;

/// Everything one run needs. Built once, never mutated by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub risk_free_rate: f64,
    pub contract: ContractSpec,
    pub tax: TaxPolicy,
    /// Share of lane cash each SHORT slot may use.
    pub short_slot_fraction: f64,
    pub policy: PolicyKind,
    pub momentum: LaneConfig,
    pub reversion: LaneConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            contract: ContractSpec::default(),
            tax: TaxPolicy::default(),
            short_slot_fraction: DEFAULT_SHORT_SLOT_FRACTION,
            policy: PolicyKind::Static,
            momentum: LaneConfig::default_for(Lane::Momentum),
            reversion: LaneConfig::default_for(Lane::Reversion),
        }
    }
}

impl BacktestConfig {
    pub fn lane(&self, lane: Lane) -> &LaneConfig {
        match lane {
            Lane::Momentum => &self.momentum,
            Lane::Reversion => &self.reversion,
        }
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut LaneConfig {
        match lane {
            Lane::Momentum => &mut self.momentum,
            Lane::Reversion => &mut self.reversion,
        }
    }

    pub fn validate(&self) -> Result<(), TraderError> {
        validate_backtest_config(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    /// One point per input bar.
    pub nav_curve: Vec<NavPoint>,
    pub closed_trades: Vec<ClosedTrade>,
    pub events: Vec<TradeEvent>,
    pub open_positions: Vec<Position>,
    pub final_cash: f64,
}

impl BacktestResult {
    pub fn terminal_nav(&self) -> f64 {
        self.nav_curve
            .last()
            .map(|p| p.nav)
            .unwrap_or(self.initial_capital)
    }
}

struct LaneRun {
    lane: Lane,
    evaluator: SignalEvaluator,
    policy: MultiplierPolicy,
    indicators: LaneIndicators,
}

pub fn run_backtest(bars: &[OhlcvBar], config: &BacktestConfig) -> Result<BacktestResult, TraderError> {
    config.validate()?;
    validate_bars(bars)?;

    let lanes: Vec<LaneRun> = Lane::ALL
        .into_iter()
        .map(|lane| {
            let lane_config = config.lane(lane);
            let policy = MultiplierPolicy::for_lane(config.policy, lane_config);
            LaneRun {
                lane,
                evaluator: SignalEvaluator::new(lane, lane_config.threshold_for(lane)),
                policy,
                indicators: compute_lane_indicators(bars, lane_config, &policy),
            }
        })
        .collect();

    let mut portfolio = Portfolio::new(config.initial_capital, config.tax);
    let point_value = config.contract.point_value();
    let start = warm_up_end(lanes.iter().map(|run| &run.indicators)).unwrap_or(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i < start {
            portfolio.record_nav(bar.date, bar.close);
            continue;
        }
        let mut closed_on_bar = [false; 2];

        for run in &lanes {
            let Some(row) = run.indicators.row(i) else {
                continue;
            };
            let exits = run.evaluator.exits(portfolio.book(run.lane), row, bar.close);
            for (id, reason) in exits {
                let trade = portfolio.close_position(run.lane, id, bar.close, bar.date, reason)?;
                debug!(
                    lane = %run.lane,
                    date = %bar.date,
                    id = %id,
                    side = %trade.side,
                    price = bar.close,
                    quantity = trade.quantity,
                    pnl = trade.pnl,
                    tax = trade.tax,
                    reason = %reason,
                    "closed position"
                );
                closed_on_bar[run.lane.index()] = true;
            }
        }

        for run in &lanes {
            if closed_on_bar[run.lane.index()] {
                continue;
            }
            let Some(row) = run.indicators.row(i) else {
                continue;
            };
            try_enter(&mut portfolio, run, row, bar, point_value, config.short_slot_fraction)?;
        }

        portfolio.record_nav(bar.date, bar.close);
    }

    let result = BacktestResult {
        initial_capital: config.initial_capital,
        final_cash: portfolio.cash(),
        open_positions: portfolio.open_positions().cloned().collect(),
        nav_curve: portfolio.nav_curve,
        closed_trades: portfolio.closed_trades,
        events: portfolio.events,
    };
    info!(
        bars = bars.len(),
        trades = result.closed_trades.len(),
        open = result.open_positions.len(),
        terminal_nav = result.terminal_nav(),
        "backtest finished"
    );
    Ok(result)
}

fn try_enter(
    portfolio: &mut Portfolio,
    run: &LaneRun,
    row: &IndicatorRow,
    bar: &OhlcvBar,
    point_value: f64,
    short_slot_fraction: f64,
) -> Result<(), TraderError> {
    let book = portfolio.book(run.lane);
    let Some(side) = run.evaluator.entry(book, row) else {
        return Ok(());
    };

    let price = bar.close;
    let lane_cash = portfolio.lane_cash(run.lane);
    let quantity = match side {
        Side::Long => size_long(lane_cash, price, point_value),
        Side::Short => size_short(
            lane_cash,
            book.committed_notional(),
            short_slot_fraction,
            price,
            point_value,
        ),
    };
    if quantity == 0 {
        debug!(lane = %run.lane, date = %bar.date, %side, price, lane_cash, "entry skipped, no affordable contracts");
        return Ok(());
    }

    let multiplier = run.policy.resolve(row);
    let (stop_loss, take_profit) = exit_levels(side, price, row.volatility, multiplier);
    let id = portfolio.open_position(
        run.lane,
        PositionRequest {
            side,
            price,
            quantity,
            point_value,
            stop_loss,
            take_profit,
            date: bar.date,
            multiplier,
            volatility: row.volatility,
        },
    )?;
    debug!(
        lane = %run.lane,
        date = %bar.date,
        id = %id,
        %side,
        price,
        quantity,
        stop_loss,
        take_profit,
        multiplier,
        "opened position"
    );
    Ok(())
}

/// Index of the first bar at which every lane has a defined row. Neither
/// lane is evaluated before it.
fn warm_up_end<'a>(lanes: impl Iterator<Item = &'a LaneIndicators>) -> Option<usize> {
    lanes.map(LaneIndicators::first_defined).try_fold(0usize, |acc, first| first.map(|f| acc.max(f)))
}

/// First date on which every lane has a defined indicator row.
pub fn first_tradable_date(bars: &[OhlcvBar], config: &BacktestConfig) -> Option<NaiveDate> {
    let indicators: Vec<LaneIndicators> = Lane::ALL
        .into_iter()
        .map(|lane| {
            let lane_config = config.lane(lane);
            let policy = MultiplierPolicy::for_lane(config.policy, lane_config);
            compute_lane_indicators(bars, lane_config, &policy)
        })
        .collect();
    warm_up_end(indicators.iter())
        .and_then(|i| bars.get(i))
        .map(|bar| bar.date)
}
