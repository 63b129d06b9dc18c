use thiserror::Error;

/// 分析核心的错误：数据不足、夏普分母为零、模拟参数越界。
///
/// 这些情况一律显式返回，不用 0 或无穷大替代。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("insufficient data: {usable} usable points, need at least {required}")]
    InsufficientData { usable: usize, required: usize },

    #[error("division by zero: {quantity} is zero")]
    DivisionByZero { quantity: &'static str },

    #[error("invalid parameter {name}={value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        constraint: String,
    },
}

impl AnalyticsError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        AnalyticsError::InvalidParameter {
            name,
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// 数据源返回的错误（与各数据源模块一致，使用字符串描述）
    #[error("data source error: {0}")]
    Source(String),

    #[error("unknown scheme: {0}")]
    UnknownScheme(String),
}
