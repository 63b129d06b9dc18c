use serde::Serialize;

use crate::analytics::risk_tier::{RiskTier, RiskTierTable};
use crate::error::AnalyticsError;
use crate::nav::NavSeries;

pub const TRADING_DAYS_PER_YEAR: u32 = 252;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorParams {
    pub trading_days_per_year: u32,
    /// 年化无风险利率（比例，0.06 表示 6%）
    pub risk_free_rate: f64,
    pub tiers: RiskTierTable,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            tiers: RiskTierTable::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyReturnStats {
    pub mean: f64,
    /// 样本标准差（n - 1）
    pub volatility: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub risk_tier: RiskTier,
    pub daily: DailyReturnStats,
}

pub fn daily_return_stats(returns: &[f64]) -> Result<DailyReturnStats, AnalyticsError> {
    if returns.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            usable: 0,
            required: 1,
        });
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    // 单个收益没有离散度，按 0 处理
    let volatility = if returns.len() < 2 {
        0.0
    } else {
        let var = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    };

    Ok(DailyReturnStats {
        mean,
        volatility,
        count: returns.len(),
    })
}

pub fn annualized_return(daily_mean: f64, trading_days_per_year: u32) -> f64 {
    (1.0 + daily_mean).powi(trading_days_per_year as i32) - 1.0
}

pub fn annualized_volatility(daily_volatility: f64, trading_days_per_year: u32) -> f64 {
    daily_volatility * (trading_days_per_year as f64).sqrt()
}

pub fn sharpe_ratio(
    annualized_return: f64,
    risk_free_rate: f64,
    annualized_volatility: f64,
) -> Result<f64, AnalyticsError> {
    if annualized_volatility == 0.0 {
        return Err(AnalyticsError::DivisionByZero {
            quantity: "annualized volatility",
        });
    }
    Ok((annualized_return - risk_free_rate) / annualized_volatility)
}

pub fn compute_risk_metrics(
    series: &NavSeries,
    risk_free_rate: f64,
) -> Result<RiskMetrics, AnalyticsError> {
    let params = EstimatorParams {
        risk_free_rate,
        ..EstimatorParams::default()
    };
    compute_risk_metrics_with(series, &params)
}

pub fn compute_risk_metrics_with(
    series: &NavSeries,
    params: &EstimatorParams,
) -> Result<RiskMetrics, AnalyticsError> {
    if params.trading_days_per_year == 0 {
        return Err(AnalyticsError::invalid(
            "trading_days_per_year",
            params.trading_days_per_year,
            "must be positive",
        ));
    }
    if !params.risk_free_rate.is_finite() {
        return Err(AnalyticsError::invalid(
            "risk_free_rate",
            params.risk_free_rate,
            "must be finite",
        ));
    }

    let returns = series.daily_returns()?;
    let daily = daily_return_stats(&returns)?;

    let ann_return = annualized_return(daily.mean, params.trading_days_per_year);
    let ann_vol = annualized_volatility(daily.volatility, params.trading_days_per_year);
    let sharpe = sharpe_ratio(ann_return, params.risk_free_rate, ann_vol)?;

    Ok(RiskMetrics {
        annualized_return: ann_return,
        annualized_volatility: ann_vol,
        sharpe_ratio: sharpe,
        risk_tier: params.tiers.classify(ann_vol),
        daily,
    })
}

/// 平均日收益按窗口放大，比如 window_days = 30 近似月度增长。
pub fn average_period_growth(series: &NavSeries, window_days: u32) -> Result<f64, AnalyticsError> {
    let returns = series.daily_returns()?;
    let daily = daily_return_stats(&returns)?;
    Ok(daily.mean * window_days as f64)
}
