use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::analytics::metrics::DailyReturnStats;
use crate::error::AnalyticsError;

/// 模拟次数与天数的允许范围，用来限制最坏情况下的计算量（O(N·D)）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationBounds {
    pub min_simulations: usize,
    pub max_simulations: usize,
    pub min_horizon_days: usize,
    pub max_horizon_days: usize,
}

impl Default for SimulationBounds {
    fn default() -> Self {
        Self {
            min_simulations: 100,
            max_simulations: 5000,
            min_horizon_days: 30,
            max_horizon_days: 365,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloParams {
    /// 起点净值（最近一个已知净值）
    pub seed_nav: f64,
    pub daily_mean: f64,
    pub daily_volatility: f64,
    pub num_simulations: usize,
    pub horizon_days: usize,
}

impl MonteCarloParams {
    pub fn from_daily_stats(
        seed_nav: f64,
        daily: &DailyReturnStats,
        num_simulations: usize,
        horizon_days: usize,
    ) -> Self {
        Self {
            seed_nav,
            daily_mean: daily.mean,
            daily_volatility: daily.volatility,
            num_simulations,
            horizon_days,
        }
    }

    pub fn validate(&self, bounds: &SimulationBounds) -> Result<(), AnalyticsError> {
        if !self.seed_nav.is_finite() || self.seed_nav <= 0.0 {
            return Err(AnalyticsError::invalid(
                "seed_nav",
                self.seed_nav,
                "must be positive and finite",
            ));
        }
        if !self.daily_mean.is_finite() {
            return Err(AnalyticsError::invalid(
                "daily_mean",
                self.daily_mean,
                "must be finite",
            ));
        }
        if !self.daily_volatility.is_finite() || self.daily_volatility < 0.0 {
            return Err(AnalyticsError::invalid(
                "daily_volatility",
                self.daily_volatility,
                "must be finite and non-negative",
            ));
        }
        if !(bounds.min_simulations..=bounds.max_simulations).contains(&self.num_simulations) {
            return Err(AnalyticsError::invalid(
                "num_simulations",
                self.num_simulations,
                format!(
                    "must be within {}..={}",
                    bounds.min_simulations, bounds.max_simulations
                ),
            ));
        }
        if !(bounds.min_horizon_days..=bounds.max_horizon_days).contains(&self.horizon_days) {
            return Err(AnalyticsError::invalid(
                "horizon_days",
                self.horizon_days,
                format!(
                    "must be within {}..={}",
                    bounds.min_horizon_days, bounds.max_horizon_days
                ),
            ));
        }
        Ok(())
    }
}

/// 终值分布摘要（只看每条路径最后一天）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerminalStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationBatch {
    /// 每条路径长度为 horizon_days + 1，第 0 个元素是起点净值
    pub paths: Vec<Vec<f64>>,
    pub terminal: TerminalStats,
}

impl SimulationBatch {
    pub fn num_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn horizon_days(&self) -> usize {
        self.paths.first().map(|p| p.len() - 1).unwrap_or(0)
    }

    pub fn terminal_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.paths.iter().filter_map(|p| p.last().copied())
    }
}

pub fn run_monte_carlo(
    params: &MonteCarloParams,
    rng_seed: Option<u64>,
) -> Result<SimulationBatch, AnalyticsError> {
    run_monte_carlo_bounded(params, &SimulationBounds::default(), rng_seed)
}

/// 未指定种子时每次调用都用新的随机状态。
pub fn run_monte_carlo_bounded(
    params: &MonteCarloParams,
    bounds: &SimulationBounds,
    rng_seed: Option<u64>,
) -> Result<SimulationBatch, AnalyticsError> {
    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_monte_carlo_with_rng(params, bounds, &mut rng)
}

pub fn run_monte_carlo_with_rng<R: Rng + ?Sized>(
    params: &MonteCarloParams,
    bounds: &SimulationBounds,
    rng: &mut R,
) -> Result<SimulationBatch, AnalyticsError> {
    params.validate(bounds)?;

    let dist = Normal::new(params.daily_mean, params.daily_volatility).map_err(|e| {
        AnalyticsError::invalid("daily_volatility", params.daily_volatility, e.to_string())
    })?;

    tracing::info!(
        num_simulations = params.num_simulations,
        horizon_days = params.horizon_days,
        seed_nav = params.seed_nav,
        "running monte carlo projection"
    );

    // 路径之间互不依赖；按顺序从同一个 rng 抽样，保证种子固定时结果可复现
    let mut paths: Vec<Vec<f64>> = Vec::with_capacity(params.num_simulations);
    for _ in 0..params.num_simulations {
        let mut path = Vec::with_capacity(params.horizon_days + 1);
        let mut price = params.seed_nav;
        path.push(price);
        for _ in 0..params.horizon_days {
            let drawn: f64 = dist.sample(rng);
            price *= 1.0 + drawn;
            path.push(price);
        }
        paths.push(path);
    }

    let terminal = terminal_stats(&paths)?;
    Ok(SimulationBatch { paths, terminal })
}

fn terminal_stats(paths: &[Vec<f64>]) -> Result<TerminalStats, AnalyticsError> {
    let finals: Vec<f64> = paths.iter().filter_map(|p| p.last().copied()).collect();
    if finals.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            usable: 0,
            required: 1,
        });
    }

    let mean = finals.iter().sum::<f64>() / finals.len() as f64;
    let min = finals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(TerminalStats { mean, min, max })
}
