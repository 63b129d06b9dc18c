//! 共同基金看板的分析核心：净值清洗、收益/风险指标、风险分档与蒙特卡洛净值推演。
//!
//! 数据获取与渲染都在外部；这里只做纯计算，外加一个按视图分发的 [`dashboard::Dashboard`]。

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod nav;
pub mod sources;

pub use analytics::metrics::{DailyReturnStats, EstimatorParams, RiskMetrics};
pub use analytics::monte_carlo::{MonteCarloParams, SimulationBatch, SimulationBounds, TerminalStats};
pub use analytics::risk_tier::{RiskTier, RiskTierTable, classify};
pub use analytics::{compute_risk_metrics, compute_risk_metrics_with, run_monte_carlo};
pub use config::AnalyticsConfig;
pub use dashboard::{AnalysisRequest, Dashboard};
pub use error::{AnalyticsError, DashboardError};
pub use nav::{NavObservation, NavSeries, RawNavRow};
