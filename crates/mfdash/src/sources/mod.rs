use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;

use crate::analytics::aum::AumRow;
use crate::nav::RawNavRow;

pub mod fixture;

pub use fixture::StaticSource;

/// 外部基金数据源（只读）。各方法的错误沿用字符串描述。
pub trait FundDataSource {
    /// scheme_code -> scheme_name
    fn scheme_codes(
        &self,
    ) -> impl Future<Output = Result<BTreeMap<String, String>, String>> + Send;

    fn available_schemes(
        &self,
        amc: &str,
    ) -> impl Future<Output = Result<BTreeMap<String, String>, String>> + Send;

    fn scheme_details(
        &self,
        scheme_code: &str,
    ) -> impl Future<Output = Result<BTreeMap<String, Value>, String>> + Send;

    /// 可能为空；顺序不保证
    fn historical_nav(
        &self,
        scheme_code: &str,
    ) -> impl Future<Output = Result<Vec<RawNavRow>, String>> + Send;

    fn average_aum(
        &self,
        period: &str,
    ) -> impl Future<Output = Result<Vec<AumRow>, String>> + Send;
}

pub fn normalize_scheme_code(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(s.to_string())
}
