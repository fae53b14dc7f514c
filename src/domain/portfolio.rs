//! Portfolio ledger: per-lane cash, open positions, trade log and NAV curve.
//!
//! Opening a position reserves notional but moves no cash (apart from
//! open-time tax when configured). Cash changes on close by realized P&L
//! minus tax.

use chrono::NaiveDate;

use super::error::TraderError;
use super::execution::TaxPolicy;
use super::lane::Lane;
use super::position::{ClosedTrade, ExitReason, Position, PositionBook, PositionId, PositionRequest, Side};

#[derive(Debug, Clone, PartialEq)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: f64,
    /// Simple return against the previous point; `None` on the first.
    pub ret: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeEventKind {
    Open,
    Close(ExitReason),
}

/// One line of the trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub date: NaiveDate,
    pub lane: Lane,
    pub id: PositionId,
    pub side: Side,
    pub kind: TradeEventKind,
    pub price: f64,
    pub quantity: u64,
    /// Realized P&L before tax; closes only.
    pub pnl: Option<f64>,
    pub tax: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_capital: f64,
    lane_cash: [f64; 2],
    books: [PositionBook; 2],
    tax: TaxPolicy,
    next_id: u64,
    pub closed_trades: Vec<ClosedTrade>,
    pub events: Vec<TradeEvent>,
    pub nav_curve: Vec<NavPoint>,
}

impl Portfolio {
    /// Split `initial_capital` evenly between the lanes.
    pub fn new(initial_capital: f64, tax: TaxPolicy) -> Self {
        let half = initial_capital / 2.0;
        Portfolio {
            initial_capital,
            lane_cash: [half, half],
            books: [
                PositionBook::new(Lane::Momentum),
                PositionBook::new(Lane::Reversion),
            ],
            tax,
            next_id: 1,
            closed_trades: Vec::new(),
            events: Vec::new(),
            nav_curve: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.lane_cash.iter().sum()
    }

    pub fn lane_cash(&self, lane: Lane) -> f64 {
        self.lane_cash[lane.index()]
    }

    pub fn book(&self, lane: Lane) -> &PositionBook {
        &self.books[lane.index()]
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.books.iter().flat_map(|b| b.list_open().iter())
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.books.iter().map(|b| b.unrealized_pnl(price)).sum()
    }

    /// cash + Σ unrealized P&L at `price`.
    pub fn nav(&self, price: f64) -> f64 {
        self.cash() + self.unrealized_pnl(price)
    }

    pub fn open_position(
        &mut self,
        lane: Lane,
        request: PositionRequest,
    ) -> Result<PositionId, TraderError> {
        let id = PositionId(self.next_id);
        let tax = self
            .tax
            .on_open(request.quantity, request.price, request.point_value);
        let (date, side, price, quantity) =
            (request.date, request.side, request.price, request.quantity);

        self.books[lane.index()].open(id, request)?;
        self.next_id += 1;
        self.lane_cash[lane.index()] -= tax;

        self.events.push(TradeEvent {
            date,
            lane,
            id,
            side,
            kind: TradeEventKind::Open,
            price,
            quantity,
            pnl: None,
            tax,
        });
        Ok(id)
    }

    pub fn close_position(
        &mut self,
        lane: Lane,
        id: PositionId,
        price: f64,
        date: NaiveDate,
        reason: ExitReason,
    ) -> Result<&ClosedTrade, TraderError> {
        let book = &mut self.books[lane.index()];
        let point_value = book.get(id).map(|p| p.point_value).unwrap_or(0.0);
        let mut trade = book.close(id, price, date, reason)?;
        trade.tax = self.tax.on_close(trade.quantity, price, point_value);

        let cash = &mut self.lane_cash[lane.index()];
        *cash += trade.pnl - trade.tax;
        if *cash < 0.0 {
            return Err(TraderError::invariant(
                lane,
                date,
                format!("lane cash {:.2} went negative closing position {id}", *cash),
            ));
        }

        self.events.push(TradeEvent {
            date,
            lane,
            id,
            side: trade.side,
            kind: TradeEventKind::Close(reason),
            price,
            quantity: trade.quantity,
            pnl: Some(trade.pnl),
            tax: trade.tax,
        });
        self.closed_trades.push(trade);
        let index = self.closed_trades.len() - 1;
        Ok(&self.closed_trades[index])
    }

    /// Append the NAV at `price` for `date`. Once the NAV has reached zero or
    /// below, every later return is -1 (capital lost) rather than undefined.
    pub fn record_nav(&mut self, date: NaiveDate, price: f64) -> &NavPoint {
        let nav = self.nav(price);
        let ret = self.nav_curve.last().map(|prev| {
            if prev.nav > 0.0 {
                nav / prev.nav - 1.0
            } else {
                -1.0
            }
        });
        self.nav_curve.push(NavPoint { date, nav, ret });
        let index = self.nav_curve.len() - 1;
        &self.nav_curve[index]
    }
}
