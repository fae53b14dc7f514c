//! Contract economics, transaction tax and entry sizing.

/// Futures contract terms. One price point of one contract is worth
/// `multiplier × margin_ratio / account_ratio` in currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractSpec {
    pub multiplier: f64,
    pub margin_ratio: f64,
    pub account_ratio: f64,
}

impl Default for ContractSpec {
    fn default() -> Self {
        ContractSpec {
            multiplier: 100_000.0,
            margin_ratio: 0.175,
            account_ratio: 0.8,
        }
    }
}

impl ContractSpec {
    /// Plain units: one contract is one unit of the price.
    pub fn unit() -> Self {
        ContractSpec {
            multiplier: 1.0,
            margin_ratio: 1.0,
            account_ratio: 1.0,
        }
    }

    pub fn point_value(&self) -> f64 {
        self.multiplier * self.margin_ratio / self.account_ratio
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxPolicy {
    /// Fraction of notional.
    pub rate: f64,
    /// Also charge on open. Close is always taxed.
    pub on_open: bool,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy {
            rate: 0.0,
            on_open: false,
        }
    }
}

impl TaxPolicy {
    pub fn on_close(&self, quantity: u64, price: f64, point_value: f64) -> f64 {
        calculate_tax(self.rate, quantity, price, point_value)
    }

    pub fn on_open(&self, quantity: u64, price: f64, point_value: f64) -> f64 {
        if self.on_open {
            calculate_tax(self.rate, quantity, price, point_value)
        } else {
            0.0
        }
    }
}

pub fn calculate_tax(rate: f64, quantity: u64, price: f64, point_value: f64) -> f64 {
    rate * quantity as f64 * price * point_value
}

/// Whole contracts affordable with `capital` at `price`.
pub fn contracts_for(capital: f64, price: f64, point_value: f64) -> u64 {
    let unit_cost = price * point_value;
    if capital <= 0.0 || unit_cost <= 0.0 || !unit_cost.is_finite() {
        return 0;
    }
    (capital / unit_cost).floor() as u64
}

/// LONG takes the whole lane cash.
pub fn size_long(lane_cash: f64, price: f64, point_value: f64) -> u64 {
    contracts_for(lane_cash, price, point_value)
}

/// Each SHORT slot gets `lane_cash × slot_fraction`, capped by what the lane's
/// open positions have not already committed.
pub fn size_short(
    lane_cash: f64,
    committed: f64,
    slot_fraction: f64,
    price: f64,
    point_value: f64,
) -> u64 {
    let slot = (lane_cash * slot_fraction).min(lane_cash - committed);
    contracts_for(slot, price, point_value)
}
