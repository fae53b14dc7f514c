//! Report output port.

use std::path::Path;

use crate::domain::error::TraderError;
use crate::domain::portfolio::{NavPoint, TradeEvent};
use crate::domain::search::SearchReport;

pub trait ReportPort {
    fn write_nav(&self, nav: &[NavPoint], output_path: &Path) -> Result<(), TraderError>;

    fn write_trades(&self, events: &[TradeEvent], output_path: &Path) -> Result<(), TraderError>;

    /// The best `top` outcomes, ranked.
    fn write_search(
        &self,
        report: &SearchReport,
        top: usize,
        output_path: &Path,
    ) -> Result<(), TraderError>;
}
