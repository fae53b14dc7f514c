//! Bar supply port.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Bars in ascending date order with unique dates.
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, TraderError>;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}
