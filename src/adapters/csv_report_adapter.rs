//! CSV report writer: NAV curve, trade log and ranked search results.

use std::fs::File;
use std::path::Path;

use crate::domain::error::TraderError;
use crate::domain::portfolio::{NavPoint, TradeEvent, TradeEventKind};
use crate::domain::search::SearchReport;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

fn writer(path: &Path) -> Result<csv::Writer<File>, TraderError> {
    Ok(csv::Writer::from_writer(File::create(path)?))
}

fn csv_err(err: csv::Error) -> TraderError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => TraderError::Io(io),
        other => TraderError::Io(std::io::Error::other(format!("{other:?}"))),
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write_nav(&self, nav: &[NavPoint], output_path: &Path) -> Result<(), TraderError> {
        let mut w = writer(output_path)?;
        w.write_record(["date", "nav", "return"]).map_err(csv_err)?;
        for point in nav {
            w.write_record([point.date.to_string(), point.nav.to_string(), opt(point.ret)])
                .map_err(csv_err)?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_trades(&self, events: &[TradeEvent], output_path: &Path) -> Result<(), TraderError> {
        let mut w = writer(output_path)?;
        w.write_record([
            "date", "lane", "id", "side", "event", "reason", "price", "quantity", "pnl", "tax",
        ])
        .map_err(csv_err)?;
        for e in events {
            let (event, reason) = match e.kind {
                TradeEventKind::Open => ("open", String::new()),
                TradeEventKind::Close(reason) => ("close", reason.to_string()),
            };
            w.write_record([
                e.date.to_string(),
                e.lane.to_string(),
                e.id.0.to_string(),
                e.side.to_string(),
                event.to_string(),
                reason,
                e.price.to_string(),
                e.quantity.to_string(),
                opt(e.pnl),
                e.tax.to_string(),
            ])
            .map_err(csv_err)?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_search(
        &self,
        report: &SearchReport,
        top: usize,
        output_path: &Path,
    ) -> Result<(), TraderError> {
        let mut w = writer(output_path)?;
        let mut header: Vec<String> = vec!["rank".into()];
        for lane in ["momentum", "reversion"] {
            for field in [
                "fast_window",
                "slow_window",
                "signal_window",
                "momentum_window",
                "momentum_threshold",
                "volatility_window",
                "multiplier",
            ] {
                header.push(format!("{lane}_{field}"));
            }
        }
        header.extend(
            ["terminal_nav", "hpr", "mdd", "ldd", "sharpe", "sortino", "score", "objective"]
                .map(String::from),
        );
        w.write_record(&header).map_err(csv_err)?;

        for (rank, outcome) in report.top(top).iter().enumerate() {
            let mut row = vec![(rank + 1).to_string()];
            for lane in [&outcome.config.momentum, &outcome.config.reversion] {
                row.extend([
                    lane.trend_fast_window.to_string(),
                    lane.trend_slow_window.to_string(),
                    lane.trend_signal_window.to_string(),
                    lane.momentum_window.to_string(),
                    lane.momentum_threshold.to_string(),
                    lane.volatility_window.to_string(),
                    lane.static_multiplier.to_string(),
                ]);
            }
            let eval = &outcome.evaluation;
            let m = eval.metrics.as_ref();
            row.extend([
                eval.terminal_nav.to_string(),
                opt(m.map(|m| m.hpr)),
                opt(m.map(|m| m.mdd)),
                m.map(|m| m.ldd.to_string()).unwrap_or_default(),
                opt(m.map(|m| m.sharpe)),
                opt(m.map(|m| m.sortino)),
                opt(m.map(|m| m.score)),
                eval.value.to_string(),
            ]);
            w.write_record(&row).map_err(csv_err)?;
        }
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::BacktestConfig;
    use crate::domain::lane::Lane;
    use crate::domain::position::{ExitReason, PositionId, Side};
    use crate::domain::search::{Evaluation, Objective, SearchOutcome};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn nav_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nav.csv");
        let nav = vec![
            NavPoint {
                date: day(1),
                nav: 100.0,
                ret: None,
            },
            NavPoint {
                date: day(2),
                nav: 101.0,
                ret: Some(0.01),
            },
        ];
        CsvReportAdapter.write_nav(&nav, &path).unwrap();
        assert_eq!(
            lines(&path),
            vec!["date,nav,return", "2024-05-01,100,", "2024-05-02,101,0.01"]
        );
    }

    #[test]
    fn trades_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let open = TradeEvent {
            date: day(1),
            lane: Lane::Momentum,
            id: PositionId(1),
            side: Side::Long,
            kind: TradeEventKind::Open,
            price: 1000.0,
            quantity: 3,
            pnl: None,
            tax: 0.0,
        };
        let close = TradeEvent {
            date: day(4),
            kind: TradeEventKind::Close(ExitReason::TakeProfit),
            price: 1021.0,
            pnl: Some(63.0),
            ..open.clone()
        };
        CsvReportAdapter.write_trades(&[open, close], &path).unwrap();
        let out = lines(&path);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], "2024-05-01,momentum,1,long,open,,1000,3,,0");
        assert_eq!(out[2], "2024-05-04,momentum,1,long,close,take_profit,1021,3,63,0");
    }

    #[test]
    fn search_csv_ranks_top_n() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search.csv");
        let outcome = |value: f64| SearchOutcome {
            config: BacktestConfig::default(),
            evaluation: Evaluation {
                value,
                terminal_nav: value,
                metrics: None,
            },
        };
        let report = SearchReport {
            objective: Objective::TerminalNav,
            outcomes: vec![outcome(3.0), outcome(2.0), outcome(1.0)],
            failed: 0,
        };
        CsvReportAdapter.write_search(&report, 2, &path).unwrap();
        let out = lines(&path);
        assert_eq!(out.len(), 3);
        assert!(out[0].starts_with("rank,momentum_fast_window"));
        assert!(out[1].starts_with("1,12,26,9,14,30,14,2,"));
        assert!(out[2].starts_with("2,"));
        assert!(out[2].ends_with(",2"));
    }
}
