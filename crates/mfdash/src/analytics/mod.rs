pub mod aum;
pub mod heatmap;
pub mod metrics;
pub mod monte_carlo;
pub mod risk_tier;

pub use metrics::{RiskMetrics, compute_risk_metrics, compute_risk_metrics_with};
pub use monte_carlo::{SimulationBatch, run_monte_carlo};
pub use risk_tier::{RiskTier, classify};
