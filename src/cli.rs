//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{first_tradable_date, run_backtest, BacktestConfig, BacktestResult};
use crate::domain::error::TraderError;
use crate::domain::lane::{Lane, LaneConfig};
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::{split_sample, OhlcvBar};
use crate::domain::risk::PolicyKind;
use crate::domain::search::{grid_search, Objective, ParamGrid, RandomSearch, SearchReport};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "hybridtrader",
    about = "Momentum / mean-reversion futures backtester"
)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sample {
    /// Bars before the split date
    In,
    /// Bars on or after the split date
    Out,
    All,
}

impl FromStr for Sample {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(Sample::In),
            "out" => Ok(Sample::Out),
            "all" => Ok(Sample::All),
            other => Err(format!("unknown sample '{other}' (expected in, out or all)")),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one backtest and print its metrics
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Overrides [data] sample
        #[arg(long, value_enum)]
        sample: Option<Sample>,
        #[arg(long)]
        nav_out: Option<PathBuf>,
        #[arg(long)]
        trades_out: Option<PathBuf>,
    },
    /// Grid search on the in-sample bars, ranked by composite score
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Seeded random search on the in-sample bars for terminal NAV
    Search {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        trials: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a configuration file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            sample,
            nav_out,
            trades_out,
        } => run_backtest_command(
            &config,
            data.as_deref(),
            sample,
            nav_out.as_deref(),
            trades_out.as_deref(),
        ),
        Command::Optimize {
            config,
            data,
            output,
            top,
        } => run_optimize(&config, data.as_deref(), output.as_deref(), top),
        Command::Search {
            config,
            data,
            trials,
            seed,
        } => run_search(&config, data.as_deref(), trials, seed),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TraderError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn run_backtest_command(
    config_path: &Path,
    data_override: Option<&Path>,
    sample_override: Option<Sample>,
    nav_out: Option<&Path>,
    trades_out: Option<&Path>,
) -> Result<(), TraderError> {
    let adapter = load_config(config_path)?;
    let config = build_backtest_config(&adapter)?;
    config.validate()?;

    let data = build_data_settings(&adapter)?;
    let sample = sample_override.unwrap_or(data.sample);
    let bars = load_bars(&data, data_override)?;
    let bars = select_sample(bars, data.split_date, sample)?;

    let result = run_backtest(&bars, &config)?;

    let report = CsvReportAdapter;
    if let Some(path) = nav_out {
        report.write_nav(&result.nav_curve, path)?;
        info!(path = %path.display(), "NAV written");
    }
    if let Some(path) = trades_out {
        report.write_trades(&result.events, path)?;
        info!(path = %path.display(), "trade log written");
    }

    let metrics = Metrics::compute(&result.nav_curve, &result.closed_trades, config.risk_free_rate)?;
    print_backtest_summary(&bars, &config, &result, &metrics);
    Ok(())
}

fn run_optimize(
    config_path: &Path,
    data_override: Option<&Path>,
    output: Option<&Path>,
    top: usize,
) -> Result<(), TraderError> {
    let adapter = load_config(config_path)?;
    let base = build_backtest_config(&adapter)?;
    base.validate()?;
    let grid = build_param_grid(&adapter, &base)?;

    let data = build_data_settings(&adapter)?;
    let bars = load_bars(&data, data_override)?;
    let bars = select_sample(bars, data.split_date, Sample::In)?;

    let report = grid_search(&bars, &base, &grid, Objective::CompositeScore);
    if let Some(path) = output {
        CsvReportAdapter.write_search(&report, report.outcomes.len(), path)?;
        info!(path = %path.display(), "search results written");
    }
    print_search_table(&report, top);
    Ok(())
}

fn run_search(
    config_path: &Path,
    data_override: Option<&Path>,
    trials: Option<usize>,
    seed: Option<u64>,
) -> Result<(), TraderError> {
    let adapter = load_config(config_path)?;
    let base = build_backtest_config(&adapter)?;
    base.validate()?;
    let mut search = build_random_search(&adapter)?;
    if let Some(trials) = trials {
        search.trials = trials;
    }
    if let Some(seed) = seed {
        search.seed = seed;
    }

    let data = build_data_settings(&adapter)?;
    let bars = load_bars(&data, data_override)?;
    let bars = select_sample(bars, data.split_date, Sample::In)?;

    let report = search.run(&bars, &base, Objective::TerminalNav);
    match report.best() {
        Some(best) => {
            println!("Best in-sample terminal NAV: {:.2}", best.evaluation.terminal_nav);
            println!("Trials: {} ({} failed)", report.evaluated(), report.failed);
            for lane in Lane::ALL {
                println!("{}", format_lane(lane, best.config.lane(lane)));
            }
            Ok(())
        }
        None => Err(TraderError::Metrics {
            reason: format!("all {} search trials failed", report.evaluated()),
        }),
    }
}

fn run_validate(config_path: &Path) -> Result<(), TraderError> {
    let adapter = load_config(config_path)?;
    let config = build_backtest_config(&adapter)?;
    config.validate()?;
    build_data_settings(&adapter)?;
    let grid = build_param_grid(&adapter, &config)?;
    let search = build_random_search(&adapter)?;

    println!("Configuration is valid.");
    println!("  policy:          {}", config.policy);
    println!("  initial capital: {:.0}", config.initial_capital);
    println!("  point value:     {}", config.contract.point_value());
    for lane in Lane::ALL {
        println!("  {}", format_lane(lane, config.lane(lane)));
    }
    println!("  grid candidates: {}", grid.configs(&config).len());
    println!("  search trials:   {} (seed {})", search.trials, search.seed);
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: Option<PathBuf>,
    pub split_date: Option<NaiveDate>,
    pub sample: Sample,
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, TraderError> {
    let split_date = match config.get_string("data", "split_date") {
        Some(s) => Some(NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            TraderError::invalid("data", "split_date", "invalid date format (expected YYYY-MM-DD)")
        })?),
        None => None,
    };
    Ok(DataSettings {
        path: config.get_string("data", "path").map(PathBuf::from),
        split_date,
        sample: read_parsed(config, "data", "sample", Sample::All)?,
    })
}

fn load_bars(data: &DataSettings, data_override: Option<&Path>) -> Result<Vec<OhlcvBar>, TraderError> {
    let path = data_override
        .map(Path::to_path_buf)
        .or_else(|| data.path.clone())
        .ok_or_else(|| TraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    let source: &dyn DataPort = &CsvAdapter::new(path);
    let bars = source.fetch_bars()?;
    info!(source = %source.describe(), bars = bars.len(), "loaded bars");
    Ok(bars)
}

pub fn select_sample(
    bars: Vec<OhlcvBar>,
    split_date: Option<NaiveDate>,
    sample: Sample,
) -> Result<Vec<OhlcvBar>, TraderError> {
    match (sample, split_date) {
        (Sample::All, _) => Ok(bars),
        (_, None) => {
            warn!("no [data] split_date configured, using every bar");
            Ok(bars)
        }
        (Sample::In, Some(split)) => Ok(split_sample(&bars, split).0),
        (Sample::Out, Some(split)) => Ok(split_sample(&bars, split).1),
    }
}

/// Parse `[section] key`, or `default` when absent. Present but unparseable
/// values are errors.
fn read_parsed<T>(config: &dyn ConfigPort, section: &str, key: &str, default: T) -> Result<T, TraderError>
where
    T: FromStr,
    T::Err: Display,
{
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| TraderError::invalid(section, key, format!("'{raw}': {e}"))),
    }
}

fn read_bool(config: &dyn ConfigPort, section: &str, key: &str, default: bool) -> Result<bool, TraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(TraderError::invalid(section, key, format!("'{raw}' is not a boolean"))),
        },
    }
}

fn read_list<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<Vec<T>>, TraderError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(items) = config.get_list(section, key) else {
        return Ok(None);
    };
    if items.is_empty() {
        return Err(TraderError::invalid(section, key, "list is empty"));
    }
    items
        .iter()
        .map(|item| {
            item.parse::<T>()
                .map_err(|e| TraderError::invalid(section, key, format!("'{item}': {e}")))
        })
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TraderError> {
    let defaults = BacktestConfig::default();
    let mut out = BacktestConfig {
        initial_capital: read_parsed(config, "backtest", "initial_capital", defaults.initial_capital)?,
        risk_free_rate: read_parsed(config, "backtest", "risk_free_rate", defaults.risk_free_rate)?,
        short_slot_fraction: read_parsed(
            config,
            "backtest",
            "short_slot_fraction",
            defaults.short_slot_fraction,
        )?,
        policy: read_parsed(config, "backtest", "multiplier_policy", PolicyKind::Static)?,
        ..defaults
    };
    out.tax.rate = read_parsed(config, "backtest", "tax_rate", out.tax.rate)?;
    out.tax.on_open = read_bool(config, "backtest", "tax_on_open", out.tax.on_open)?;
    out.contract.multiplier = read_parsed(config, "contract", "multiplier", out.contract.multiplier)?;
    out.contract.margin_ratio = read_parsed(config, "contract", "margin_ratio", out.contract.margin_ratio)?;
    out.contract.account_ratio =
        read_parsed(config, "contract", "account_ratio", out.contract.account_ratio)?;
    out.momentum = build_lane_config(config, Lane::Momentum)?;
    out.reversion = build_lane_config(config, Lane::Reversion)?;
    Ok(out)
}

pub fn build_lane_config(config: &dyn ConfigPort, lane: Lane) -> Result<LaneConfig, TraderError> {
    let s = lane.name();
    let d = LaneConfig::default_for(lane);
    Ok(LaneConfig {
        trend_fast_window: read_parsed(config, s, "fast_window", d.trend_fast_window)?,
        trend_slow_window: read_parsed(config, s, "slow_window", d.trend_slow_window)?,
        trend_signal_window: read_parsed(config, s, "signal_window", d.trend_signal_window)?,
        momentum_window: read_parsed(config, s, "momentum_window", d.momentum_window)?,
        momentum_threshold: match lane {
            Lane::Momentum => read_parsed(config, s, "momentum_threshold", d.momentum_threshold)?,
            Lane::Reversion => d.momentum_threshold,
        },
        volatility_window: read_parsed(config, s, "volatility_window", d.volatility_window)?,
        static_multiplier: read_parsed(config, s, "multiplier", d.static_multiplier)?,
        adaptive: crate::domain::lane::AdaptiveMultiplier {
            short_window: read_parsed(config, s, "short_volatility_window", d.adaptive.short_window)?,
            long_window: read_parsed(config, s, "long_volatility_window", d.adaptive.long_window)?,
            wide: read_parsed(config, s, "wide_multiplier", d.adaptive.wide)?,
            narrow: read_parsed(config, s, "narrow_multiplier", d.adaptive.narrow)?,
        },
    })
}

/// `[grid]` holds `<lane>_<field>` lists; fields left out stay at the base
/// config's value.
pub fn build_param_grid(config: &dyn ConfigPort, base: &BacktestConfig) -> Result<ParamGrid, TraderError> {
    let mut grid = ParamGrid::fixed(base);
    for lane in Lane::ALL {
        let key = |field: &str| format!("{}_{}", lane.name(), field);
        let g = grid.lane_mut(lane);
        if let Some(v) = read_list(config, "grid", &key("fast_window"))? {
            g.fast_windows = v;
        }
        if let Some(v) = read_list(config, "grid", &key("slow_window"))? {
            g.slow_windows = v;
        }
        if let Some(v) = read_list(config, "grid", &key("signal_window"))? {
            g.signal_windows = v;
        }
        if let Some(v) = read_list(config, "grid", &key("momentum_window"))? {
            g.momentum_windows = v;
        }
        if let Some(v) = read_list(config, "grid", &key("momentum_threshold"))? {
            g.momentum_thresholds = v;
        }
        if let Some(v) = read_list(config, "grid", &key("volatility_window"))? {
            g.volatility_windows = v;
        }
        if let Some(v) = read_list(config, "grid", &key("multiplier"))? {
            g.multipliers = v;
        }
    }
    Ok(grid)
}

pub fn build_random_search(config: &dyn ConfigPort) -> Result<RandomSearch, TraderError> {
    let defaults = RandomSearch::default();
    let search = RandomSearch {
        trials: read_parsed(config, "search", "trials", defaults.trials)?,
        seed: read_parsed(config, "search", "seed", defaults.seed)?,
        ..defaults
    };
    if search.trials == 0 {
        return Err(TraderError::invalid("search", "trials", "trials must be at least 1"));
    }
    Ok(search)
}

fn format_lane(lane: Lane, c: &LaneConfig) -> String {
    format!(
        "{:<9} fast={} slow={} signal={} rsi={} threshold={} atr={} multiplier={} adaptive=({}/{}, {}/{})",
        lane.name(),
        c.trend_fast_window,
        c.trend_slow_window,
        c.trend_signal_window,
        c.momentum_window,
        c.threshold_for(lane),
        c.volatility_window,
        c.static_multiplier,
        c.adaptive.short_window,
        c.adaptive.long_window,
        c.adaptive.wide,
        c.adaptive.narrow,
    )
}

fn print_backtest_summary(bars: &[OhlcvBar], config: &BacktestConfig, result: &BacktestResult, m: &Metrics) {
    println!("=== Backtest Results ===");
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("Period:           {} to {} ({} bars)", first.date, last.date, bars.len());
    }
    if let Some(date) = first_tradable_date(bars, config) {
        println!("First signal bar: {}", date);
    }
    println!("Policy:           {}", config.policy);
    println!("Initial capital:  {:.2}", config.initial_capital);
    println!("Terminal NAV:     {:.2}", result.terminal_nav());
    println!("HPR:              {:.4}%", m.hpr);
    println!("Max drawdown:     {:.4}%", m.mdd);
    println!("Longest drawdown: {} bars", m.ldd);
    println!("Sharpe ratio:     {:.4}", m.sharpe);
    println!("Sortino ratio:    {:.4}", m.sortino);
    println!("Score:            {:.4}", m.score);
    println!("Closed trades:    {}", m.trades.total);
    println!("Win rate:         {:.1}%", m.trades.win_rate * 100.0);
    println!("Profit factor:    {:.2}", m.trades.profit_factor);
    println!("Tax paid:         {:.2}", m.trades.total_tax);
    println!("Open at end:      {}", result.open_positions.len());
}

fn print_search_table(report: &SearchReport, top: usize) {
    println!(
        "=== Top {} of {} ({} failed) ===",
        report.top(top).len(),
        report.evaluated(),
        report.failed
    );
    for (rank, outcome) in report.top(top).iter().enumerate() {
        println!("#{:<3} objective={:.4} nav={:.2}", rank + 1, outcome.evaluation.value, outcome.evaluation.terminal_nav);
        for lane in Lane::ALL {
            println!("     {}", format_lane(lane, outcome.config.lane(lane)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_gives_defaults() {
        let config = build_backtest_config(&adapter("[backtest]\n")).unwrap();
        assert_eq!(config, BacktestConfig::default());
    }

    #[test]
    fn reads_backtest_and_contract_sections() {
        let config = build_backtest_config(&adapter(
            "[backtest]\ninitial_capital = 1000000\nmultiplier_policy = adaptive\ntax_rate = 0.001\ntax_on_open = true\nshort_slot_fraction = 0.5\n\
             [contract]\nmultiplier = 100\nmargin_ratio = 1\naccount_ratio = 1\n",
        ))
        .unwrap();
        assert!((config.initial_capital - 1_000_000.0).abs() < f64::EPSILON);
        assert_eq!(config.policy, PolicyKind::Adaptive);
        assert!((config.tax.rate - 0.001).abs() < f64::EPSILON);
        assert!(config.tax.on_open);
        assert!((config.short_slot_fraction - 0.5).abs() < f64::EPSILON);
        assert!((config.contract.point_value() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reads_lane_sections() {
        let config = build_backtest_config(&adapter(
            "[momentum]\nfast_window = 9\nslow_window = 21\nmomentum_threshold = 20\nmultiplier = 2.5\n\
             [reversion]\nmomentum_threshold = 10\nlong_volatility_window = 30\nwide_multiplier = 3\n",
        ))
        .unwrap();
        assert_eq!(config.momentum.trend_fast_window, 9);
        assert_eq!(config.momentum.trend_slow_window, 21);
        assert!((config.momentum.momentum_threshold - 20.0).abs() < f64::EPSILON);
        assert!((config.momentum.static_multiplier - 2.5).abs() < f64::EPSILON);
        assert!((config.reversion.momentum_threshold - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.reversion.adaptive.long_window, 30);
        assert!((config.reversion.adaptive.wide - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_number_is_invalid() {
        let err = build_backtest_config(&adapter("[momentum]\nfast_window = twelve\n")).unwrap_err();
        assert!(matches!(err, TraderError::ConfigInvalid { ref section, ref key, .. }
            if section == "momentum" && key == "fast_window"));
    }

    #[test]
    fn negative_window_is_invalid() {
        assert!(build_backtest_config(&adapter("[reversion]\nslow_window = -3\n")).is_err());
    }

    #[test]
    fn unknown_policy_is_invalid() {
        let err = build_backtest_config(&adapter("[backtest]\nmultiplier_policy = fancy\n")).unwrap_err();
        assert!(err.to_string().contains("multiplier_policy"));
    }

    #[test]
    fn bad_bool_is_invalid() {
        assert!(build_backtest_config(&adapter("[backtest]\ntax_on_open = sometimes\n")).is_err());
    }

    #[test]
    fn data_settings() {
        let data = build_data_settings(&adapter(
            "[data]\npath = bars.csv\nsplit_date = 2024-01-01\nsample = out\n",
        ))
        .unwrap();
        assert_eq!(data.path, Some(PathBuf::from("bars.csv")));
        assert_eq!(data.split_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(data.sample, Sample::Out);
    }

    #[test]
    fn data_settings_bad_date() {
        assert!(build_data_settings(&adapter("[data]\nsplit_date = 01/01/2024\n")).is_err());
    }

    #[test]
    fn grid_lists() {
        let cfg = adapter(
            "[grid]\nmomentum_fast_window = 7,8,9\nmomentum_multiplier = 2.0, 2.5, 3.0\nreversion_volatility_window = 8,10\n",
        );
        let base = build_backtest_config(&cfg).unwrap();
        let grid = build_param_grid(&cfg, &base).unwrap();
        assert_eq!(grid.momentum.fast_windows, vec![7, 8, 9]);
        assert_eq!(grid.momentum.multipliers, vec![2.0, 2.5, 3.0]);
        assert_eq!(grid.momentum.slow_windows, vec![26]);
        assert_eq!(grid.reversion.volatility_windows, vec![8, 10]);
        assert_eq!(grid.configs(&base).len(), 18);
    }

    #[test]
    fn grid_bad_item_is_invalid() {
        let cfg = adapter("[grid]\nreversion_slow_window = 20, x\n");
        let base = BacktestConfig::default();
        let err = build_param_grid(&cfg, &base).unwrap_err();
        assert!(err.to_string().contains("reversion_slow_window"));
    }

    #[test]
    fn random_search_settings() {
        let search = build_random_search(&adapter("[search]\ntrials = 50\nseed = 11\n")).unwrap();
        assert_eq!(search.trials, 50);
        assert_eq!(search.seed, 11);
        assert!(build_random_search(&adapter("[search]\ntrials = 0\n")).is_err());
    }

    #[test]
    fn sample_selection() {
        let bars: Vec<OhlcvBar> = (1..=4)
            .map(|d| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: None,
            })
            .collect();
        let split = NaiveDate::from_ymd_opt(2024, 1, 3);
        assert_eq!(select_sample(bars.clone(), split, Sample::In).unwrap().len(), 2);
        assert_eq!(select_sample(bars.clone(), split, Sample::Out).unwrap().len(), 2);
        assert_eq!(select_sample(bars.clone(), split, Sample::All).unwrap().len(), 4);
        assert_eq!(select_sample(bars, None, Sample::In).unwrap().len(), 4);
    }

    #[test]
    fn cli_parses_backtest() {
        let cli = Cli::try_parse_from([
            "hybridtrader",
            "backtest",
            "-c",
            "hybrid.ini",
            "--sample",
            "out",
            "--nav-out",
            "nav.csv",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Backtest { sample, nav_out, .. } => {
                assert_eq!(sample, Some(Sample::Out));
                assert_eq!(nav_out, Some(PathBuf::from("nav.csv")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_optimize_default_top() {
        let cli = Cli::try_parse_from(["hybridtrader", "optimize", "-c", "hybrid.ini"]).unwrap();
        assert!(matches!(cli.command, Command::Optimize { top: 10, .. }));
    }
}
