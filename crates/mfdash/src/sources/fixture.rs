use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::analytics::aum::AumRow;
use crate::nav::RawNavRow;
use crate::sources::FundDataSource;

/// 内存数据源：从 JSON 夹具或构建器组装，便于离线跑分析。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticSource {
    schemes: BTreeMap<String, String>,
    details: BTreeMap<String, BTreeMap<String, Value>>,
    navs: BTreeMap<String, Vec<RawNavRow>>,
    aum: BTreeMap<String, Vec<AumRow>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("fixture JSON parse failed: {e}"))
    }

    pub fn with_scheme(mut self, code: &str, name: &str) -> Self {
        self.schemes.insert(code.to_string(), name.to_string());
        self
    }

    pub fn with_details(mut self, code: &str, details: BTreeMap<String, Value>) -> Self {
        self.details.insert(code.to_string(), details);
        self
    }

    pub fn with_nav(mut self, code: &str, rows: Vec<RawNavRow>) -> Self {
        self.navs.insert(code.to_string(), rows);
        self
    }

    pub fn with_aum(mut self, period: &str, rows: Vec<AumRow>) -> Self {
        self.aum.insert(period.to_string(), rows);
        self
    }
}

impl FundDataSource for StaticSource {
    async fn scheme_codes(&self) -> Result<BTreeMap<String, String>, String> {
        Ok(self.schemes.clone())
    }

    async fn available_schemes(&self, amc: &str) -> Result<BTreeMap<String, String>, String> {
        // 与上游行为一致：按名称包含 AMC 关键字过滤（忽略大小写）
        let needle = amc.trim().to_lowercase();
        Ok(self
            .schemes
            .iter()
            .filter(|(_, name)| !needle.is_empty() && name.to_lowercase().contains(&needle))
            .map(|(code, name)| (code.clone(), name.clone()))
            .collect())
    }

    async fn scheme_details(&self, scheme_code: &str) -> Result<BTreeMap<String, Value>, String> {
        self.details
            .get(scheme_code)
            .cloned()
            .ok_or_else(|| format!("no details for scheme {scheme_code}"))
    }

    async fn historical_nav(&self, scheme_code: &str) -> Result<Vec<RawNavRow>, String> {
        Ok(self.navs.get(scheme_code).cloned().unwrap_or_default())
    }

    async fn average_aum(&self, period: &str) -> Result<Vec<AumRow>, String> {
        Ok(self.aum.get(period).cloned().unwrap_or_default())
    }
}
