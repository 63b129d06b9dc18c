use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// 年化波动率的分档上界（含上界）。超过最后一档同样归为 UltraHigh。
pub const DEFAULT_RISK_TIER_BOUNDS: [f64; 5] = [0.01, 0.03, 0.07, 0.15, 0.25];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    NoRisk,
    Low,
    Moderate,
    High,
    UltraHigh,
}

impl RiskTier {
    pub const ALL: [RiskTier; 5] = [
        RiskTier::NoRisk,
        RiskTier::Low,
        RiskTier::Moderate,
        RiskTier::High,
        RiskTier::UltraHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::NoRisk => "no_risk",
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::UltraHigh => "ultra_high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::NoRisk => "Little or No Risk",
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
            RiskTier::UltraHigh => "Ultra High Risk",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::NoRisk => "#4CAF50",
            RiskTier::Low => "#2196F3",
            RiskTier::Moderate => "#FFC107",
            RiskTier::High => "#FF9800",
            RiskTier::UltraHigh => "#F44336",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RiskTier::NoRisk => "🛡️",
            RiskTier::Low => "🌊",
            RiskTier::Moderate => "⚖️",
            RiskTier::High => "🔥",
            RiskTier::UltraHigh => "💥",
        }
    }

    /// (label, color, icon)，供渲染层直接使用
    pub fn display(&self) -> (&'static str, &'static str, &'static str) {
        (self.label(), self.color(), self.icon())
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskTierTable {
    bounds: [f64; 5],
}

impl Default for RiskTierTable {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_RISK_TIER_BOUNDS,
        }
    }
}

impl RiskTierTable {
    pub fn new(bounds: [f64; 5]) -> Result<Self, AnalyticsError> {
        if bounds.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(AnalyticsError::invalid(
                "risk_tier_bounds",
                format!("{bounds:?}"),
                "bounds must be finite and non-negative",
            ));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::invalid(
                "risk_tier_bounds",
                format!("{bounds:?}"),
                "bounds must be strictly increasing",
            ));
        }
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &[f64; 5] {
        &self.bounds
    }

    pub fn upper_bound(&self, tier: RiskTier) -> f64 {
        self.bounds[tier.index()]
    }

    /// 分类是全覆盖的：落不进前四档（包括 NaN）一律归为 UltraHigh。
    pub fn classify(&self, volatility: f64) -> RiskTier {
        RiskTier::ALL[..4]
            .iter()
            .copied()
            .find(|tier| volatility <= self.upper_bound(*tier))
            .unwrap_or(RiskTier::UltraHigh)
    }
}

pub fn classify(volatility: f64) -> RiskTier {
    RiskTierTable::default().classify(volatility)
}
