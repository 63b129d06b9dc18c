use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics::metrics::{DEFAULT_RISK_FREE_RATE, EstimatorParams, TRADING_DAYS_PER_YEAR};
use crate::analytics::monte_carlo::SimulationBounds;
use crate::analytics::risk_tier::{DEFAULT_RISK_TIER_BOUNDS, RiskTierTable};
use crate::error::AnalyticsError;

pub const CONFIG_PATH_ENV: &str = "MFDASH_CONFIG";

#[derive(Debug, Clone, Copy)]
enum EnvKind {
    Float,
    Int,
    Text,
}

/// 环境变量 -> 配置键
const ENV_OVERRIDES: [(&str, &str, EnvKind); 7] = [
    ("RISK_FREE_RATE", "risk_free_rate", EnvKind::Float),
    ("TRADING_DAYS_PER_YEAR", "trading_days_per_year", EnvKind::Int),
    ("MC_MIN_SIMULATIONS", "min_simulations", EnvKind::Int),
    ("MC_MAX_SIMULATIONS", "max_simulations", EnvKind::Int),
    ("MC_MIN_HORIZON_DAYS", "min_horizon_days", EnvKind::Int),
    ("MC_MAX_HORIZON_DAYS", "max_horizon_days", EnvKind::Int),
    ("AUM_PERIOD", "aum_period", EnvKind::Text),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub risk_free_rate: f64,
    pub trading_days_per_year: u32,
    pub risk_tier_bounds: [f64; 5],
    pub min_simulations: usize,
    pub max_simulations: usize,
    pub min_horizon_days: usize,
    pub max_horizon_days: usize,
    pub default_simulations: usize,
    pub default_horizon_days: usize,
    pub default_amc: String,
    pub aum_period: String,
    /// 平均增长展示窗口（天），30 即“月均”
    pub growth_window_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let bounds = SimulationBounds::default();
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            risk_tier_bounds: DEFAULT_RISK_TIER_BOUNDS,
            min_simulations: bounds.min_simulations,
            max_simulations: bounds.max_simulations,
            min_horizon_days: bounds.min_horizon_days,
            max_horizon_days: bounds.max_horizon_days,
            default_simulations: 1000,
            default_horizon_days: 252,
            default_amc: "ICICI".to_string(),
            aum_period: "July - September 2024".to_string(),
            growth_window_days: 30,
        }
    }
}

impl AnalyticsConfig {
    /// 默认值 -> 配置文件 -> 环境变量（含 .env）
    pub fn load() -> Result<Self, AnalyticsError> {
        dotenvy::dotenv().ok();
        let path = detect_config_path();
        Self::load_from(&path, |key| std::env::var(key).ok())
    }

    pub fn load_from(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AnalyticsError> {
        let mut data = default_config();

        if path.exists() {
            match fs::read(path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).map_err(|e| e.to_string()))
            {
                Ok(Value::Object(map)) => {
                    for (k, v) in map {
                        data.insert(k, v);
                    }
                }
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "config file is not a JSON object, ignored");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read config file");
                }
            }
        }

        for (var, key, kind) in ENV_OVERRIDES {
            let Some(raw) = env(var) else { continue };
            match env_value(raw.trim(), kind) {
                Some(v) => {
                    data.insert(key.to_string(), v);
                }
                None => {
                    tracing::warn!(var, value = %raw, "ignoring unparseable env override");
                }
            }
        }

        let config: AnalyticsConfig = serde_json::from_value(Value::Object(data.into_iter().collect()))
            .map_err(|e| AnalyticsError::invalid("config", path.display(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !self.risk_free_rate.is_finite() {
            return Err(AnalyticsError::invalid(
                "risk_free_rate",
                self.risk_free_rate,
                "must be finite",
            ));
        }
        if self.trading_days_per_year == 0 {
            return Err(AnalyticsError::invalid(
                "trading_days_per_year",
                self.trading_days_per_year,
                "must be positive",
            ));
        }
        RiskTierTable::new(self.risk_tier_bounds)?;

        if self.min_simulations == 0 || self.min_simulations > self.max_simulations {
            return Err(AnalyticsError::invalid(
                "min_simulations",
                self.min_simulations,
                format!("must be within 1..={}", self.max_simulations),
            ));
        }
        if self.min_horizon_days == 0 || self.min_horizon_days > self.max_horizon_days {
            return Err(AnalyticsError::invalid(
                "min_horizon_days",
                self.min_horizon_days,
                format!("must be within 1..={}", self.max_horizon_days),
            ));
        }
        if !(self.min_simulations..=self.max_simulations).contains(&self.default_simulations) {
            return Err(AnalyticsError::invalid(
                "default_simulations",
                self.default_simulations,
                "must lie within the simulation bounds",
            ));
        }
        if !(self.min_horizon_days..=self.max_horizon_days).contains(&self.default_horizon_days) {
            return Err(AnalyticsError::invalid(
                "default_horizon_days",
                self.default_horizon_days,
                "must lie within the horizon bounds",
            ));
        }
        Ok(())
    }

    pub fn risk_tiers(&self) -> Result<RiskTierTable, AnalyticsError> {
        RiskTierTable::new(self.risk_tier_bounds)
    }

    pub fn estimator_params(&self) -> Result<EstimatorParams, AnalyticsError> {
        Ok(EstimatorParams {
            trading_days_per_year: self.trading_days_per_year,
            risk_free_rate: self.risk_free_rate,
            tiers: self.risk_tiers()?,
        })
    }

    pub fn simulation_bounds(&self) -> SimulationBounds {
        SimulationBounds {
            min_simulations: self.min_simulations,
            max_simulations: self.max_simulations,
            min_horizon_days: self.min_horizon_days,
            max_horizon_days: self.max_horizon_days,
        }
    }
}

fn default_config() -> BTreeMap<String, Value> {
    match serde_json::to_value(AnalyticsConfig::default()) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    }
}

fn env_value(raw: &str, kind: EnvKind) -> Option<Value> {
    match kind {
        EnvKind::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        EnvKind::Int => raw.parse::<u64>().ok().map(|n| Value::Number(n.into())),
        EnvKind::Text if raw.is_empty() => None,
        EnvKind::Text => Some(Value::String(raw.to_string())),
    }
}

fn detect_config_path() -> PathBuf {
    if let Ok(p) = std::env::var(CONFIG_PATH_ENV)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p.trim());
    }
    PathBuf::from("config.json")
}
