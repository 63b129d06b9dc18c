use serde::{Deserialize, Serialize};

use crate::nav::parse_decimal;

/// 平均 AUM 报表的一行，金额保持数据源给出的字符串形式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AumRow {
    #[serde(rename = "Fund Name", alias = "fund_name")]
    pub fund_name: String,
    #[serde(rename = "AAUM Overseas", alias = "aaum_overseas", default)]
    pub aaum_overseas: Option<String>,
    #[serde(rename = "AAUM Domestic", alias = "aaum_domestic", default)]
    pub aaum_domestic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AumTotal {
    pub fund_name: String,
    pub total_aum: f64,
}

fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let cleaned = raw?.replace(',', "");
    parse_decimal(&cleaned)
}

/// 海外 + 国内；无法解析的部分按缺失跳过。
pub fn total_aum(rows: &[AumRow]) -> Vec<AumTotal> {
    rows.iter()
        .map(|r| {
            let total = [r.aaum_overseas.as_deref(), r.aaum_domestic.as_deref()]
                .into_iter()
                .filter_map(parse_amount)
                .sum::<f64>();
            AumTotal {
                fund_name: r.fund_name.clone(),
                total_aum: total,
            }
        })
        .collect()
}

/// 百分位排名（并列取平均名次），范围 (0, 1]。
pub fn percentile_rank(values: &[f64], idx: usize) -> Option<f64> {
    let target = *values.get(idx)?;
    if !target.is_finite() {
        return None;
    }
    let finite = values.iter().filter(|v| v.is_finite());
    let (mut below, mut equal, mut n) = (0usize, 0usize, 0usize);
    for &v in finite {
        n += 1;
        if v < target {
            below += 1;
        } else if v == target {
            equal += 1;
        }
    }
    // 平均名次 = below + (equal + 1) / 2
    let avg_rank = below as f64 + (equal as f64 + 1.0) / 2.0;
    Some(avg_rank / n as f64)
}

/// “规模排名前 X%”
pub fn top_percent(values: &[f64], idx: usize) -> Option<u32> {
    let pct = percentile_rank(values, idx)?;
    Some((100.0 * (1.0 - pct)).floor().max(0.0) as u32)
}
