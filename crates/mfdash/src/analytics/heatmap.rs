use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::nav::NavSeries;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyCell {
    /// 1..=12，跨年份合并
    pub month: u32,
    pub mean_day_change: f64,
    pub samples: usize,
}

/// 按自然月聚合日涨跌的均值。数据源没给 day_change 时用相邻净值差补上。
pub fn monthly_day_change(series: &NavSeries) -> Vec<MonthlyCell> {
    let obs = series.observations();
    let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for (i, o) in obs.iter().enumerate() {
        let change = match o.day_change {
            Some(v) => Some(v),
            None if i > 0 => Some(o.nav - obs[i - 1].nav),
            None => None,
        };
        let Some(change) = change.filter(|v| v.is_finite()) else {
            continue;
        };
        let entry = buckets.entry(o.date.month()).or_insert((0.0, 0));
        entry.0 += change;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(month, (sum, n))| MonthlyCell {
            month,
            mean_day_change: sum / n as f64,
            samples: n,
        })
        .collect()
}
