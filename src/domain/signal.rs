//! Entry and exit rules for the two lanes.
//!
//! `x` is the lane's momentum band: configurable for the momentum lane, fixed
//! at 30 for reversion.
//!
//! | lane      | side  | entry (all)                 | exit (any)                         |
//! |-----------|-------|-----------------------------|------------------------------------|
//! | momentum  | long  | diff > 0, 50 < rsi < 100-x  | tp, sl, rsi >= 100-x, diff < 0     |
//! | momentum  | short | diff < 0, x < rsi < 50      | tp, sl, rsi <= x, diff > 0         |
//! | reversion | long  | diff > 0, rsi < x           | tp, sl, diff < 0, rsi >= 50        |
//! | reversion | short | diff < 0, rsi > 100-x       | tp, sl, diff > 0, rsi <= 50        |

use super::indicator_helpers::IndicatorRow;
use super::lane::Lane;
use super::position::{ExitReason, LaneState, Position, PositionBook, PositionId, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalEvaluator {
    lane: Lane,
    threshold: f64,
}

impl SignalEvaluator {
    pub fn new(lane: Lane, threshold: f64) -> Self {
        SignalEvaluator { lane, threshold }
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn entry_holds(&self, side: Side, row: &IndicatorRow) -> bool {
        let x = self.threshold;
        let (diff, rsi) = (row.trend_diff, row.momentum);
        match (self.lane, side) {
            (Lane::Momentum, Side::Long) => diff > 0.0 && rsi > 50.0 && rsi < 100.0 - x,
            (Lane::Momentum, Side::Short) => diff < 0.0 && rsi > x && rsi < 50.0,
            (Lane::Reversion, Side::Long) => diff > 0.0 && rsi < x,
            (Lane::Reversion, Side::Short) => diff < 0.0 && rsi > 100.0 - x,
        }
    }

    /// First exit condition that fires for `position` at `price`, checked in
    /// the order take-profit, stop-loss, momentum, trend.
    pub fn exit_reason(&self, position: &Position, row: &IndicatorRow, price: f64) -> Option<ExitReason> {
        if position.should_take_profit(price) {
            return Some(ExitReason::TakeProfit);
        }
        if position.should_stop_loss(price) {
            return Some(ExitReason::StopLoss);
        }

        let x = self.threshold;
        let (diff, rsi) = (row.trend_diff, row.momentum);
        let (momentum_exit, trend_exit) = match (self.lane, position.side) {
            (Lane::Momentum, Side::Long) => (rsi >= 100.0 - x, diff < 0.0),
            (Lane::Momentum, Side::Short) => (rsi <= x, diff > 0.0),
            (Lane::Reversion, Side::Long) => (rsi >= 50.0, diff < 0.0),
            (Lane::Reversion, Side::Short) => (rsi <= 50.0, diff > 0.0),
        };

        if momentum_exit {
            Some(ExitReason::Momentum)
        } else if trend_exit {
            Some(ExitReason::Trend)
        } else {
            None
        }
    }

    /// Positions to close this bar, in opening order.
    pub fn exits(&self, book: &PositionBook, row: &IndicatorRow, price: f64) -> Vec<(PositionId, ExitReason)> {
        book.list_open()
            .iter()
            .filter_map(|p| self.exit_reason(p, row, price).map(|r| (p.id, r)))
            .collect()
    }

    /// Side to open this bar, if any. A flat lane tries long first, then
    /// short; a short lane with spare capacity only tries short; a long lane
    /// never adds.
    pub fn entry(&self, book: &PositionBook, row: &IndicatorRow) -> Option<Side> {
        match book.state() {
            LaneState::Flat => [Side::Long, Side::Short]
                .into_iter()
                .find(|&side| self.entry_holds(side, row)),
            LaneState::Short if book.has_capacity(Side::Short) => {
                self.entry_holds(Side::Short, row).then_some(Side::Short)
            }
            LaneState::Short | LaneState::Long => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{exit_levels, PositionRequest};
    use chrono::NaiveDate;

    fn row(trend_diff: f64, momentum: f64) -> IndicatorRow {
        IndicatorRow {
            trend_diff,
            momentum,
            volatility: 10.0,
            volatility_band: None,
        }
    }

    fn momentum() -> SignalEvaluator {
        SignalEvaluator::new(Lane::Momentum, 25.0)
    }

    fn reversion() -> SignalEvaluator {
        SignalEvaluator::new(Lane::Reversion, 30.0)
    }

    fn book_with(lane: Lane, side: Side, count: u64) -> PositionBook {
        let mut book = PositionBook::new(lane);
        for id in 1..=count {
            let (stop_loss, take_profit) = exit_levels(side, 1000.0, 10.0, 2.0);
            book.open(
                PositionId(id),
                PositionRequest {
                    side,
                    price: 1000.0,
                    quantity: 1,
                    point_value: 1.0,
                    stop_loss,
                    take_profit,
                    date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    multiplier: 2.0,
                    volatility: 10.0,
                },
            )
            .unwrap();
        }
        book
    }

    mod entries {
        use super::*;

        #[test]
        fn momentum_long_band() {
            let e = momentum();
            assert!(e.entry_holds(Side::Long, &row(1.0, 60.0)));
            assert!(!e.entry_holds(Side::Long, &row(1.0, 50.0)));
            assert!(!e.entry_holds(Side::Long, &row(1.0, 75.0)));
            assert!(!e.entry_holds(Side::Long, &row(-1.0, 60.0)));
        }

        #[test]
        fn momentum_short_band() {
            let e = momentum();
            assert!(e.entry_holds(Side::Short, &row(-1.0, 40.0)));
            assert!(!e.entry_holds(Side::Short, &row(-1.0, 25.0)));
            assert!(!e.entry_holds(Side::Short, &row(0.0, 40.0)));
        }

        #[test]
        fn reversion_long_needs_oversold() {
            let e = reversion();
            assert!(e.entry_holds(Side::Long, &row(0.5, 20.0)));
            assert!(!e.entry_holds(Side::Long, &row(0.5, 30.0)));
        }

        #[test]
        fn reversion_short_needs_overbought() {
            let e = reversion();
            assert!(e.entry_holds(Side::Short, &row(-0.5, 80.0)));
            assert!(!e.entry_holds(Side::Short, &row(-0.5, 70.0)));
        }

        #[test]
        fn flat_lane_picks_matching_side() {
            let book = PositionBook::new(Lane::Momentum);
            assert_eq!(momentum().entry(&book, &row(1.0, 60.0)), Some(Side::Long));
            assert_eq!(momentum().entry(&book, &row(-1.0, 40.0)), Some(Side::Short));
            assert_eq!(momentum().entry(&book, &row(0.0, 50.0)), None);
        }

        #[test]
        fn long_lane_never_adds() {
            let book = book_with(Lane::Momentum, Side::Long, 1);
            assert_eq!(momentum().entry(&book, &row(1.0, 60.0)), None);
            assert_eq!(momentum().entry(&book, &row(-1.0, 40.0)), None);
        }

        #[test]
        fn short_lane_adds_until_capacity() {
            let two = book_with(Lane::Reversion, Side::Short, 2);
            assert_eq!(reversion().entry(&two, &row(-1.0, 85.0)), Some(Side::Short));
            assert_eq!(reversion().entry(&two, &row(1.0, 10.0)), None);

            let three = book_with(Lane::Reversion, Side::Short, 3);
            assert_eq!(reversion().entry(&three, &row(-1.0, 85.0)), None);
        }
    }

    mod exits {
        use super::*;

        #[test]
        fn take_profit_beats_other_reasons() {
            let book = book_with(Lane::Momentum, Side::Long, 1);
            let pos = &book.list_open()[0];
            assert_eq!(
                momentum().exit_reason(pos, &row(-1.0, 90.0), 1021.0),
                Some(ExitReason::TakeProfit)
            );
        }

        #[test]
        fn stop_loss_at_exact_level() {
            let book = book_with(Lane::Momentum, Side::Long, 1);
            let pos = &book.list_open()[0];
            assert_eq!(
                momentum().exit_reason(pos, &row(1.0, 60.0), 980.0),
                Some(ExitReason::StopLoss)
            );
        }

        #[test]
        fn momentum_long_exits_on_overbought_or_trend_flip() {
            let book = book_with(Lane::Momentum, Side::Long, 1);
            let pos = &book.list_open()[0];
            let e = momentum();
            assert_eq!(e.exit_reason(pos, &row(1.0, 75.0), 1000.0), Some(ExitReason::Momentum));
            assert_eq!(e.exit_reason(pos, &row(-0.1, 60.0), 1000.0), Some(ExitReason::Trend));
            assert_eq!(e.exit_reason(pos, &row(0.0, 60.0), 1000.0), None);
        }

        #[test]
        fn momentum_short_exits() {
            let book = book_with(Lane::Momentum, Side::Short, 1);
            let pos = &book.list_open()[0];
            let e = momentum();
            assert_eq!(e.exit_reason(pos, &row(-1.0, 25.0), 1000.0), Some(ExitReason::Momentum));
            assert_eq!(e.exit_reason(pos, &row(0.1, 40.0), 1000.0), Some(ExitReason::Trend));
            assert_eq!(e.exit_reason(pos, &row(-1.0, 40.0), 1000.0), None);
        }

        #[test]
        fn reversion_long_exits_at_midline() {
            let book = book_with(Lane::Reversion, Side::Long, 1);
            let pos = &book.list_open()[0];
            let e = reversion();
            assert_eq!(e.exit_reason(pos, &row(1.0, 50.0), 1000.0), Some(ExitReason::Momentum));
            assert_eq!(e.exit_reason(pos, &row(-1.0, 20.0), 1000.0), Some(ExitReason::Trend));
            assert_eq!(e.exit_reason(pos, &row(1.0, 49.0), 1000.0), None);
        }

        #[test]
        fn reversion_short_exits_at_midline() {
            let book = book_with(Lane::Reversion, Side::Short, 1);
            let pos = &book.list_open()[0];
            let e = reversion();
            assert_eq!(e.exit_reason(pos, &row(-1.0, 50.0), 1000.0), Some(ExitReason::Momentum));
            assert_eq!(e.exit_reason(pos, &row(0.5, 70.0), 1000.0), Some(ExitReason::Trend));
            assert_eq!(e.exit_reason(pos, &row(-1.0, 70.0), 1000.0), None);
        }

        #[test]
        fn exits_scan_in_opening_order() {
            let book = book_with(Lane::Reversion, Side::Short, 3);
            let hits = reversion().exits(&book, &row(1.0, 70.0), 1000.0);
            let ids: Vec<PositionId> = hits.iter().map(|(id, _)| *id).collect();
            assert_eq!(ids, vec![PositionId(1), PositionId(2), PositionId(3)]);
        }
    }
}
