use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// 数据源给出的日期格式：mfapi 风格为 `dd-mm-YYYY`，其余为 ISO。
const DATE_FORMATS: [&str; 3] = ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y"];

pub const MIN_NAV_POINTS: usize = 2;

/// 数据源原样返回的一行净值（尚未清洗）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNavRow {
    pub date: String,
    pub nav: String,
    #[serde(default, alias = "dayChange")]
    pub day_change: Option<String>,
}

impl RawNavRow {
    pub fn new(date: impl Into<String>, nav: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            nav: nav.into(),
            day_change: None,
        }
    }

    pub fn with_day_change(mut self, day_change: impl Into<String>) -> Self {
        self.day_change = Some(day_change.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavObservation {
    pub date: NaiveDate,
    pub nav: f64,
    pub day_change: Option<f64>,
}

/// 清洗后的净值序列：日期严格递增，nav 全部为正数。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavSeries {
    observations: Vec<NavObservation>,
}

#[derive(Debug, Clone, Copy)]
struct Point {
    date: NaiveDate,
    nav: Option<f64>,
    day_change: Option<f64>,
}

impl NavSeries {
    /// 从原始行构建：解析日期与净值，排序、去重、线性插值补缺口。
    pub fn clean(rows: &[RawNavRow]) -> Result<Self, AnalyticsError> {
        let mut points: Vec<Point> = Vec::with_capacity(rows.len());
        let mut bad_dates = 0usize;
        for row in rows {
            let Some(date) = parse_date(&row.date) else {
                bad_dates += 1;
                continue;
            };
            points.push(Point {
                date,
                nav: parse_nav(&row.nav),
                day_change: row.day_change.as_deref().and_then(parse_decimal),
            });
        }
        if bad_dates > 0 {
            tracing::debug!(bad_dates, "dropped nav rows with unparseable dates");
        }
        normalize(points)
    }

    /// 从已解析的 (日期, 净值) 构建；非正数或非有限值视为缺口。
    pub fn from_points(points: &[(NaiveDate, f64)]) -> Result<Self, AnalyticsError> {
        let points = points
            .iter()
            .map(|&(date, nav)| Point {
                date,
                nav: Some(nav).filter(|v| v.is_finite() && *v > 0.0),
                day_change: None,
            })
            .collect();
        normalize(points)
    }

    pub fn observations(&self) -> &[NavObservation] {
        &self.observations
    }

    pub fn navs(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.nav).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn last_nav(&self) -> Option<f64> {
        self.observations.last().map(|o| o.nav)
    }

    /// 日收益 `r[i] = nav[i] / nav[i-1] - 1`，丢弃非有限值。
    pub fn daily_returns(&self) -> Result<Vec<f64>, AnalyticsError> {
        let returns: Vec<f64> = self
            .observations
            .windows(2)
            .map(|w| w[1].nav / w[0].nav - 1.0)
            .filter(|r| r.is_finite())
            .collect();
        if returns.is_empty() {
            return Err(AnalyticsError::InsufficientData {
                usable: 0,
                required: 1,
            });
        }
        Ok(returns)
    }
}

fn normalize(mut points: Vec<Point>) -> Result<NavSeries, AnalyticsError> {
    points.sort_by_key(|p| p.date);

    // 同一日期出现多次时保留最后一条
    let mut uniq: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        match uniq.last_mut() {
            Some(last) if last.date == p.date => *last = p,
            _ => uniq.push(p),
        }
    }

    let valid: Vec<usize> = uniq
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.nav.map(|_| i))
        .collect();
    if valid.len() < MIN_NAV_POINTS {
        return Err(AnalyticsError::InsufficientData {
            usable: valid.len(),
            required: MIN_NAV_POINTS,
        });
    }

    let mut interpolated = 0usize;
    for w in valid.windows(2) {
        let (a, b) = (w[0], w[1]);
        if b - a < 2 {
            continue;
        }
        let (Some(va), Some(vb)) = (uniq[a].nav, uniq[b].nav) else {
            continue;
        };
        let span = (b - a) as f64;
        for k in (a + 1)..b {
            let t = (k - a) as f64 / span;
            uniq[k].nav = Some(va + (vb - va) * t);
            interpolated += 1;
        }
    }

    let first = valid[0];
    let last = valid[valid.len() - 1];
    let edge_dropped = first + (uniq.len() - 1 - last);

    let observations: Vec<NavObservation> = uniq[first..=last]
        .iter()
        .filter_map(|p| {
            p.nav.map(|nav| NavObservation {
                date: p.date,
                nav,
                day_change: p.day_change,
            })
        })
        .collect();

    tracing::debug!(
        points = observations.len(),
        interpolated,
        edge_dropped,
        "nav series normalized"
    );

    Ok(NavSeries { observations })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    let d = raw.trim().parse::<Decimal>().ok()?;
    d.to_f64().filter(|v| v.is_finite())
}

/// 净值必须为正；0、负数、"N.A." 之类都当作缺失。
pub fn parse_nav(raw: &str) -> Option<f64> {
    parse_decimal(raw).filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_nav};
    use chrono::NaiveDate;

    #[test]
    fn parse_date_accepts_provider_and_iso_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("05-03-2024"), expected);
        assert_eq!(parse_date(" 2024-03-05 "), expected);
        assert_eq!(parse_date("not-a-date"), None);
    }

    #[test]
    fn parse_nav_rejects_zero_and_garbage() {
        let v = parse_nav("12.3456").expect("numeric nav");
        assert!((v - 12.3456).abs() < 1e-12);
        assert_eq!(parse_nav("0"), None);
        assert_eq!(parse_nav("0.00000"), None);
        assert_eq!(parse_nav("-1.5"), None);
        assert_eq!(parse_nav("N.A."), None);
        assert_eq!(parse_nav(""), None);
    }
}
