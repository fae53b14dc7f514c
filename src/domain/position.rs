//! Positions and the per-lane position book.

use std::fmt;

use chrono::NaiveDate;

use super::error::TraderError;
use super::lane::Lane;

/// Concurrent SHORT positions a lane may hold.
pub const MAX_SHORT_POSITIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("long"),
            Side::Short => f.write_str("short"),
        }
    }
}

/// Lane state as seen by the signal evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
    Flat,
    Long,
    Short,
}

/// Identity of a position within one run. Unique across both lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionId(pub u64);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub id: PositionId,
    pub lane: Lane,
    pub side: Side,
    pub entry_price: f64,
    /// Contracts; fixed for the life of the position.
    pub quantity: u64,
    /// Currency value of one price point per contract.
    pub point_value: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub entry_date: NaiveDate,
    /// Multiplier and volatility frozen at entry.
    pub multiplier: f64,
    pub volatility: f64,
}

impl Position {
    pub fn notional(&self) -> f64 {
        self.notional_at(self.entry_price)
    }

    pub fn notional_at(&self, price: f64) -> f64 {
        self.quantity as f64 * price * self.point_value
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.side.sign() * (price - self.entry_price) * self.quantity as f64 * self.point_value
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price <= self.stop_loss,
            Side::Short => price >= self.stop_loss,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price >= self.take_profit,
            Side::Short => price <= self.take_profit,
        }
    }
}

/// (stop_loss, take_profit) for an entry at `price`, `volatility × multiplier`
/// away on either side.
pub fn exit_levels(side: Side, price: f64, volatility: f64, multiplier: f64) -> (f64, f64) {
    let distance = volatility * multiplier;
    match side {
        Side::Long => (price - distance, price + distance),
        Side::Short => (price + distance, price - distance),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Momentum,
    Trend,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::Momentum => "momentum",
            ExitReason::Trend => "trend",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub id: PositionId,
    pub lane: Lane,
    pub side: Side,
    pub quantity: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Realized P&L before tax.
    pub pnl: f64,
    /// Tax charged on close (open-time tax is not included).
    pub tax: f64,
    pub reason: ExitReason,
}

impl ClosedTrade {
    pub fn net_pnl(&self) -> f64 {
        self.pnl - self.tax
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

/// A position about to be opened; the book assigns its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRequest {
    pub side: Side,
    pub price: f64,
    pub quantity: u64,
    pub point_value: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub date: NaiveDate,
    pub multiplier: f64,
    pub volatility: f64,
}

/// Open positions of one lane, in opening order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionBook {
    lane: Lane,
    open: Vec<Position>,
}

impl PositionBook {
    pub fn new(lane: Lane) -> Self {
        PositionBook {
            lane,
            open: Vec::new(),
        }
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn state(&self) -> LaneState {
        match self.open.first().map(|p| p.side) {
            None => LaneState::Flat,
            Some(Side::Long) => LaneState::Long,
            Some(Side::Short) => LaneState::Short,
        }
    }

    pub fn count(&self) -> usize {
        self.open.len()
    }

    pub fn is_flat(&self) -> bool {
        self.open.is_empty()
    }

    /// Whether another position on `side` fits the lane's capacity rules.
    pub fn has_capacity(&self, side: Side) -> bool {
        match (self.state(), side) {
            (LaneState::Flat, _) => true,
            (LaneState::Short, Side::Short) => self.open.len() < MAX_SHORT_POSITIONS,
            _ => false,
        }
    }

    /// Insertion order is opening order.
    pub fn list_open(&self) -> &[Position] {
        &self.open
    }

    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.open.iter().find(|p| p.id == id)
    }

    /// Notional at entry of everything currently open.
    pub fn committed_notional(&self) -> f64 {
        self.open.iter().map(Position::notional).sum()
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.open.iter().map(|p| p.unrealized_pnl(price)).sum()
    }

    /// Callers check [`has_capacity`](Self::has_capacity) first; a refusal here
    /// means the state machine is broken.
    pub fn open(&mut self, id: PositionId, request: PositionRequest) -> Result<&Position, TraderError> {
        if !self.has_capacity(request.side) {
            return Err(TraderError::invariant(
                self.lane,
                request.date,
                format!(
                    "cannot open {} position {id}: lane holds {} open {:?} position(s)",
                    request.side,
                    self.open.len(),
                    self.state()
                ),
            ));
        }
        if request.quantity == 0 {
            return Err(TraderError::invariant(
                self.lane,
                request.date,
                format!("position {id} opened with zero quantity"),
            ));
        }
        if self.get(id).is_some() {
            return Err(TraderError::invariant(
                self.lane,
                request.date,
                format!("position {id} is already open"),
            ));
        }

        self.open.push(Position {
            id,
            lane: self.lane,
            side: request.side,
            entry_price: request.price,
            quantity: request.quantity,
            point_value: request.point_value,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            entry_date: request.date,
            multiplier: request.multiplier,
            volatility: request.volatility,
        });
        let index = self.open.len() - 1;
        Ok(&self.open[index])
    }

    /// Remove position `id` and realize its P&L at `exit_price`. Tax is left at
    /// zero for the ledger to fill in.
    pub fn close(
        &mut self,
        id: PositionId,
        exit_price: f64,
        exit_date: NaiveDate,
        reason: ExitReason,
    ) -> Result<ClosedTrade, TraderError> {
        let index = self.open.iter().position(|p| p.id == id).ok_or_else(|| {
            TraderError::invariant(self.lane, exit_date, format!("position {id} is not open"))
        })?;
        let position = self.open.remove(index);
        let pnl = position.unrealized_pnl(exit_price);

        Ok(ClosedTrade {
            id: position.id,
            lane: position.lane,
            side: position.side,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price,
            entry_date: position.entry_date,
            exit_date,
            pnl,
            tax: 0.0,
            reason,
        })
    }
}
