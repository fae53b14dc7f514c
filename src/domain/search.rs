//! Parameter search over the backtest driver.
//!
//! Every candidate is a fresh [`BacktestConfig`] evaluated by an independent
//! [`run_backtest`] call, so candidates run in parallel on rayon's pool with
//! nothing shared but the read-only bars. Candidates that fail (bad
//! parameters, invariant violations, undefined metrics) are logged and
//! skipped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{info, warn};

use super::backtest::{run_backtest, BacktestConfig};
use super::error::TraderError;
use super::lane::{Lane, LaneConfig};
use super::metrics::Metrics;
use super::ohlcv::OhlcvBar;
use super::risk::PolicyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    /// hpr + mdd/10 − ldd/100 + ((sharpe + sortino)/2)³
    #[default]
    CompositeScore,
    TerminalNav,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The objective's value; higher is better.
    pub value: f64,
    pub terminal_nav: f64,
    /// Only computed for [`Objective::CompositeScore`].
    pub metrics: Option<Metrics>,
}

impl Objective {
    pub fn evaluate(&self, bars: &[OhlcvBar], config: &BacktestConfig) -> Result<Evaluation, TraderError> {
        let result = run_backtest(bars, config)?;
        let terminal_nav = result.terminal_nav();
        match self {
            Objective::TerminalNav => Ok(Evaluation {
                value: terminal_nav,
                terminal_nav,
                metrics: None,
            }),
            Objective::CompositeScore => {
                let metrics = Metrics::compute(&result.nav_curve, &result.closed_trades, config.risk_free_rate)?;
                Ok(Evaluation {
                    value: metrics.score,
                    terminal_nav,
                    metrics: Some(metrics),
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub config: BacktestConfig,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub objective: Objective,
    /// Sorted by descending objective value; ties keep candidate order.
    pub outcomes: Vec<SearchOutcome>,
    pub failed: usize,
}

impl SearchReport {
    pub fn best(&self) -> Option<&SearchOutcome> {
        self.outcomes.first()
    }

    pub fn top(&self, n: usize) -> &[SearchOutcome] {
        &self.outcomes[..n.min(self.outcomes.len())]
    }

    pub fn evaluated(&self) -> usize {
        self.outcomes.len() + self.failed
    }
}

fn evaluate_all(bars: &[OhlcvBar], candidates: Vec<BacktestConfig>, objective: Objective) -> SearchReport {
    let total = candidates.len();
    info!(candidates = total, ?objective, "starting parameter search");

    let results: Vec<Option<SearchOutcome>> = candidates
        .into_par_iter()
        .enumerate()
        .map(|(index, config)| match objective.evaluate(bars, &config) {
            Ok(evaluation) => Some(SearchOutcome { config, evaluation }),
            Err(err) => {
                warn!(candidate = index, error = %err, "skipping candidate");
                None
            }
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_none()).count();
    let mut outcomes: Vec<SearchOutcome> = results.into_iter().flatten().collect();
    outcomes.sort_by(|a, b| b.evaluation.value.total_cmp(&a.evaluation.value));

    info!(
        evaluated = total,
        failed,
        best = outcomes.first().map(|o| o.evaluation.value),
        "parameter search finished"
    );
    SearchReport {
        objective,
        outcomes,
        failed,
    }
}

/// Candidate values for one lane's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneGrid {
    pub fast_windows: Vec<usize>,
    pub slow_windows: Vec<usize>,
    pub signal_windows: Vec<usize>,
    pub momentum_windows: Vec<usize>,
    /// Ignored for the reversion lane.
    pub momentum_thresholds: Vec<f64>,
    pub volatility_windows: Vec<usize>,
    /// Static multiplier candidates.
    pub multipliers: Vec<f64>,
}

impl LaneGrid {
    /// A one-point grid holding `config`'s own values.
    pub fn fixed(config: &LaneConfig) -> Self {
        LaneGrid {
            fast_windows: vec![config.trend_fast_window],
            slow_windows: vec![config.trend_slow_window],
            signal_windows: vec![config.trend_signal_window],
            momentum_windows: vec![config.momentum_window],
            momentum_thresholds: vec![config.momentum_threshold],
            volatility_windows: vec![config.volatility_window],
            multipliers: vec![config.static_multiplier],
        }
    }

    /// Upper bound on the expansion; fast ≥ slow pairs are dropped later.
    pub fn size(&self) -> usize {
        self.fast_windows.len()
            * self.slow_windows.len()
            * self.signal_windows.len()
            * self.momentum_windows.len()
            * self.momentum_thresholds.len()
            * self.volatility_windows.len()
            * self.multipliers.len()
    }

    pub fn expand(&self, lane: Lane, base: &LaneConfig) -> Vec<LaneConfig> {
        let thresholds: &[f64] = match lane {
            Lane::Momentum => &self.momentum_thresholds,
            Lane::Reversion => &self.momentum_thresholds[..self.momentum_thresholds.len().min(1)],
        };
        let mut out = Vec::new();
        for &fast in &self.fast_windows {
            for &slow in &self.slow_windows {
                if fast >= slow {
                    continue;
                }
                for &signal in &self.signal_windows {
                    for &momentum in &self.momentum_windows {
                        for &threshold in thresholds {
                            for &volatility in &self.volatility_windows {
                                for &multiplier in &self.multipliers {
                                    out.push(LaneConfig {
                                        trend_fast_window: fast,
                                        trend_slow_window: slow,
                                        trend_signal_window: signal,
                                        momentum_window: momentum,
                                        momentum_threshold: threshold,
                                        volatility_window: volatility,
                                        static_multiplier: multiplier,
                                        adaptive: base.adaptive,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub momentum: LaneGrid,
    pub reversion: LaneGrid,
}

impl ParamGrid {
    pub fn fixed(base: &BacktestConfig) -> Self {
        ParamGrid {
            momentum: LaneGrid::fixed(&base.momentum),
            reversion: LaneGrid::fixed(&base.reversion),
        }
    }

    pub fn lane(&self, lane: Lane) -> &LaneGrid {
        match lane {
            Lane::Momentum => &self.momentum,
            Lane::Reversion => &self.reversion,
        }
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut LaneGrid {
        match lane {
            Lane::Momentum => &mut self.momentum,
            Lane::Reversion => &mut self.reversion,
        }
    }

    /// Cross product of both lanes' expansions over `base`.
    pub fn configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let momentum = self.momentum.expand(Lane::Momentum, &base.momentum);
        let reversion = self.reversion.expand(Lane::Reversion, &base.reversion);
        let mut out = Vec::with_capacity(momentum.len() * reversion.len());
        for m in &momentum {
            for r in &reversion {
                out.push(BacktestConfig {
                    momentum: m.clone(),
                    reversion: r.clone(),
                    ..base.clone()
                });
            }
        }
        out
    }
}

pub fn grid_search(
    bars: &[OhlcvBar],
    base: &BacktestConfig,
    grid: &ParamGrid,
    objective: Objective,
) -> SearchReport {
    evaluate_all(bars, grid.configs(base), objective)
}

/// Inclusive sampling bounds for one lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneRanges {
    pub fast_window: (usize, usize),
    pub slow_window: (usize, usize),
    pub signal_window: (usize, usize),
    pub momentum_window: (usize, usize),
    /// Sampled as whole numbers; momentum lane only.
    pub momentum_threshold: (usize, usize),
    pub volatility_window: (usize, usize),
    /// `None` keeps the base multiplier; the adaptive policy never reads it.
    pub multiplier: Option<(f64, f64)>,
}

impl LaneRanges {
    /// Wide bounds shared by both lanes under the static policy.
    pub fn fixed_multiplier() -> Self {
        LaneRanges {
            fast_window: (1, 25),
            slow_window: (1, 40),
            signal_window: (1, 20),
            momentum_window: (1, 50),
            momentum_threshold: (1, 30),
            volatility_window: (1, 20),
            multiplier: Some((0.5, 10.0)),
        }
    }

    /// Narrower, lane-specific bounds for the adaptive policy.
    pub fn adaptive(lane: Lane) -> Self {
        match lane {
            Lane::Momentum => LaneRanges {
                fast_window: (5, 20),
                slow_window: (21, 50),
                signal_window: (5, 15),
                momentum_window: (5, 14),
                momentum_threshold: (20, 49),
                volatility_window: (5, 20),
                multiplier: None,
            },
            Lane::Reversion => LaneRanges {
                fast_window: (5, 20),
                slow_window: (20, 60),
                signal_window: (5, 20),
                momentum_window: (5, 20),
                momentum_threshold: (20, 49),
                volatility_window: (5, 20),
                multiplier: None,
            },
        }
    }

    pub fn for_policy(kind: PolicyKind, lane: Lane) -> Self {
        match kind {
            PolicyKind::Static => LaneRanges::fixed_multiplier(),
            PolicyKind::Adaptive => LaneRanges::adaptive(lane),
        }
    }

    /// Draws one lane config. The fast window is capped below the slow
    /// window's upper bound and the slow window is drawn above the fast one,
    /// so every draw has fast < slow.
    fn sample(&self, rng: &mut StdRng, lane: Lane, base: &LaneConfig) -> LaneConfig {
        let int = |rng: &mut StdRng, (lo, hi): (usize, usize)| rng.gen_range(lo..=hi.max(lo));
        let (fast_lo, fast_hi) = self.fast_window;
        let (slow_lo, slow_hi) = self.slow_window;
        let fast = int(rng, (fast_lo, fast_hi.min(slow_hi.saturating_sub(1))));
        let slow = int(rng, (slow_lo.max(fast + 1), slow_hi));
        let signal = int(rng, self.signal_window);
        let momentum = int(rng, self.momentum_window);
        let threshold = int(rng, self.momentum_threshold) as f64;
        let volatility = int(rng, self.volatility_window);
        let multiplier = match self.multiplier {
            Some((lo, hi)) => rng.gen_range(lo..=hi),
            None => base.static_multiplier,
        };
        LaneConfig {
            trend_fast_window: fast,
            trend_slow_window: slow,
            trend_signal_window: signal,
            momentum_window: momentum,
            momentum_threshold: match lane {
                Lane::Momentum => threshold,
                Lane::Reversion => base.momentum_threshold,
            },
            volatility_window: volatility,
            static_multiplier: multiplier,
            adaptive: base.adaptive,
        }
    }
}

/// Seeded random search; the same seed always yields the same candidates.
/// Sampling bounds follow the base config's multiplier policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSearch {
    pub trials: usize,
    pub seed: u64,
}

impl Default for RandomSearch {
    fn default() -> Self {
        RandomSearch { trials: 1000, seed: 42 }
    }
}

impl RandomSearch {
    pub fn candidates(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let momentum_ranges = LaneRanges::for_policy(base.policy, Lane::Momentum);
        let reversion_ranges = LaneRanges::for_policy(base.policy, Lane::Reversion);
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.trials)
            .map(|_| {
                let momentum = momentum_ranges.sample(&mut rng, Lane::Momentum, &base.momentum);
                let reversion = reversion_ranges.sample(&mut rng, Lane::Reversion, &base.reversion);
                BacktestConfig {
                    momentum,
                    reversion,
                    ..base.clone()
                }
            })
            .collect()
    }

    pub fn run(&self, bars: &[OhlcvBar], base: &BacktestConfig, objective: Objective) -> SearchReport {
        evaluate_all(bars, self.candidates(base), objective)
    }
}
