use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::analytics::aum::{top_percent, total_aum};
use crate::analytics::heatmap::monthly_day_change;
use crate::analytics::metrics::{
    EstimatorParams, average_period_growth, compute_risk_metrics_with, daily_return_stats,
};
use crate::analytics::monte_carlo::{MonteCarloParams, run_monte_carlo_bounded};
use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, DashboardError};
use crate::nav::{NavSeries, RawNavRow};
use crate::sources::{FundDataSource, normalize_scheme_code};

pub mod widgets;

use widgets::{ChartSeries, HeatCell, NoticeLevel, Page, Widget, fmt_2dp, fmt_percent};

/// 一次分析请求，只携带该视图需要的参数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum AnalysisRequest {
    ViewSchemes {
        #[serde(default)]
        amc: Option<String>,
    },
    SchemeDetails {
        scheme_code: String,
    },
    HistoricalNav {
        scheme_code: String,
    },
    CompareNavs {
        #[serde(default)]
        scheme_codes: Vec<String>,
    },
    AverageAum {
        #[serde(default)]
        period: Option<String>,
    },
    RiskAnalysis {
        scheme_code: String,
        #[serde(default)]
        risk_free_rate: Option<f64>,
    },
    Heatmap {
        scheme_code: String,
        #[serde(default)]
        num_simulations: Option<usize>,
        #[serde(default)]
        horizon_days: Option<usize>,
        #[serde(default)]
        rng_seed: Option<u64>,
    },
}

impl AnalysisRequest {
    pub fn view_name(&self) -> &'static str {
        match self {
            AnalysisRequest::ViewSchemes { .. } => "view_schemes",
            AnalysisRequest::SchemeDetails { .. } => "scheme_details",
            AnalysisRequest::HistoricalNav { .. } => "historical_nav",
            AnalysisRequest::CompareNavs { .. } => "compare_navs",
            AnalysisRequest::AverageAum { .. } => "average_aum",
            AnalysisRequest::RiskAnalysis { .. } => "risk_analysis",
            AnalysisRequest::Heatmap { .. } => "heatmap",
        }
    }
}

/// 请求分发：持有只读配置与数据源，请求之间不共享可变状态。
pub struct Dashboard<S> {
    source: S,
    config: AnalyticsConfig,
}

fn source_error(err: String) -> DashboardError {
    tracing::warn!(error = %err, "data source call failed");
    DashboardError::Source(err)
}

/// 数据不足/夏普无定义渲染成明确提示；参数错误继续向上抛。
fn explain(err: AnalyticsError) -> Result<Widget, DashboardError> {
    match err {
        AnalyticsError::InsufficientData { usable, .. } => Ok(Widget::notice(
            NoticeLevel::Warning,
            format!("Not enough NAV data for analysis ({usable} usable points)."),
        )),
        AnalyticsError::DivisionByZero { quantity } => Ok(Widget::notice(
            NoticeLevel::Warning,
            format!("Sharpe ratio is undefined: {quantity} is zero."),
        )),
        other => Err(other.into()),
    }
}

const NO_NAV_DATA: &str = "No historical NAV data available.";

impl<S: FundDataSource> Dashboard<S> {
    pub fn new(source: S, config: AnalyticsConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn handle(&self, request: &AnalysisRequest) -> Result<Page, DashboardError> {
        tracing::info!(view = request.view_name(), "handling analysis request");
        match request {
            AnalysisRequest::ViewSchemes { amc } => self.view_schemes(amc.as_deref()).await,
            AnalysisRequest::SchemeDetails { scheme_code } => self.scheme_details(scheme_code).await,
            AnalysisRequest::HistoricalNav { scheme_code } => self.historical_nav(scheme_code).await,
            AnalysisRequest::CompareNavs { scheme_codes } => self.compare_navs(scheme_codes).await,
            AnalysisRequest::AverageAum { period } => self.average_aum(period.as_deref()).await,
            AnalysisRequest::RiskAnalysis {
                scheme_code,
                risk_free_rate,
            } => self.risk_analysis(scheme_code, *risk_free_rate).await,
            AnalysisRequest::Heatmap {
                scheme_code,
                num_simulations,
                horizon_days,
                rng_seed,
            } => {
                self.heatmap(scheme_code, *num_simulations, *horizon_days, *rng_seed)
                    .await
            }
        }
    }

    /// 校验代码并返回 (code, scheme_name)
    async fn resolve_scheme(&self, raw_code: &str) -> Result<(String, String), DashboardError> {
        let code = normalize_scheme_code(raw_code)
            .ok_or_else(|| DashboardError::UnknownScheme(raw_code.to_string()))?;
        let codes = self.source.scheme_codes().await.map_err(source_error)?;
        let name = codes
            .get(&code)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownScheme(code.clone()))?;
        Ok((code, name))
    }

    async fn fetch_nav(&self, code: &str) -> Result<Vec<RawNavRow>, DashboardError> {
        self.source.historical_nav(code).await.map_err(source_error)
    }

    async fn view_schemes(&self, amc: Option<&str>) -> Result<Page, DashboardError> {
        let amc = amc
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.config.default_amc.as_str());
        let schemes = self
            .source
            .available_schemes(amc)
            .await
            .map_err(source_error)?;

        let mut page = Page::new("View Available Schemes");
        if schemes.is_empty() {
            page.push(Widget::notice(NoticeLevel::Info, "No schemes found."));
            return Ok(page);
        }

        let rows = schemes
            .iter()
            .map(|(code, name)| vec![json!(code), json!(name)])
            .collect();
        page.push(Widget::table(&["Scheme Code", "Scheme Name"], rows));
        page.push(Widget::badge(
            "🏦",
            format!("{} schemes available in {amc}", schemes.len()),
            "#2196F3",
        ));
        Ok(page)
    }

    async fn scheme_details(&self, raw_code: &str) -> Result<Page, DashboardError> {
        let (code, _) = self.resolve_scheme(raw_code).await?;
        let details = self
            .source
            .scheme_details(&code)
            .await
            .map_err(source_error)?;

        let rows = details
            .into_iter()
            .map(|(k, v)| vec![Value::String(k), v])
            .collect();
        let mut page = Page::new("Scheme Details");
        page.push(Widget::table(&["Field", "Value"], rows));
        Ok(page)
    }

    async fn historical_nav(&self, raw_code: &str) -> Result<Page, DashboardError> {
        let (code, _) = self.resolve_scheme(raw_code).await?;
        let rows = self.fetch_nav(&code).await?;

        let mut page = Page::new("Historical NAV");
        if rows.is_empty() {
            page.push(Widget::notice(NoticeLevel::Info, NO_NAV_DATA));
            return Ok(page);
        }

        let series = match NavSeries::clean(&rows) {
            Ok(s) => s,
            Err(e) => {
                page.push(explain(e)?);
                return Ok(page);
            }
        };

        let table_rows = series
            .observations()
            .iter()
            .map(|o| {
                vec![
                    json!(o.date.format("%Y-%m-%d").to_string()),
                    json!(o.nav),
                    o.day_change.map(|v| json!(v)).unwrap_or(Value::Null),
                ]
            })
            .collect();
        page.push(Widget::table(&["date", "nav", "dayChange"], table_rows));

        match average_period_growth(&series, self.config.growth_window_days) {
            Ok(growth) => page.push(Widget::badge(
                "📅",
                format!("Average monthly growth: {}", fmt_percent(growth)),
                "#FF9800",
            )),
            Err(e) => page.push(explain(e)?),
        }
        Ok(page)
    }

    async fn compare_navs(&self, raw_codes: &[String]) -> Result<Page, DashboardError> {
        let mut page = Page::new("Compare NAVs");
        if raw_codes.is_empty() {
            page.push(Widget::notice(NoticeLevel::Info, "Select at least one scheme."));
            return Ok(page);
        }

        let mut series_out: Vec<ChartSeries> = Vec::with_capacity(raw_codes.len());
        for raw in raw_codes {
            let (code, name) = self.resolve_scheme(raw).await?;
            let rows = self.fetch_nav(&code).await?;
            let series = match NavSeries::clean(&rows) {
                Ok(s) => s,
                Err(AnalyticsError::InsufficientData { .. }) => {
                    page.push(Widget::notice(
                        NoticeLevel::Warning,
                        format!("Not enough NAV data for {name}."),
                    ));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let obs = series.observations();
            series_out.push(ChartSeries {
                name,
                x: obs
                    .iter()
                    .map(|o| json!(o.date.format("%Y-%m-%d").to_string()))
                    .collect(),
                y: obs.iter().map(|o| o.nav).collect(),
            });
        }

        if !series_out.is_empty() {
            page.push(Widget::LineChart {
                title: "Comparison of NAVs".to_string(),
                x_label: "date".to_string(),
                y_label: "nav".to_string(),
                series: series_out,
            });
        }
        Ok(page)
    }

    async fn average_aum(&self, period: Option<&str>) -> Result<Page, DashboardError> {
        let period = period
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.config.aum_period.as_str());
        let rows = self.source.average_aum(period).await.map_err(source_error)?;

        let mut page = Page::new("Average AUM");
        if rows.is_empty() {
            page.push(Widget::notice(NoticeLevel::Info, "No AUM data available."));
            return Ok(page);
        }

        let totals = total_aum(&rows);
        let table_rows = totals
            .iter()
            .map(|t| vec![json!(t.fund_name), json!(t.total_aum)])
            .collect();
        page.push(Widget::table(&["Fund Name", "Total AUM"], table_rows));

        let values: Vec<f64> = totals.iter().map(|t| t.total_aum).collect();
        if let Some(top) = top_percent(&values, 0) {
            page.push(Widget::badge(
                "📊",
                format!("Ranked in top {top}% by AUM size"),
                "#9C27B0",
            ));
        }
        Ok(page)
    }

    async fn risk_analysis(
        &self,
        raw_code: &str,
        risk_free_rate: Option<f64>,
    ) -> Result<Page, DashboardError> {
        let (code, name) = self.resolve_scheme(raw_code).await?;
        let rows = self.fetch_nav(&code).await?;

        let mut page = Page::new("Risk and Volatility Analysis");
        if rows.is_empty() {
            page.push(Widget::notice(NoticeLevel::Info, NO_NAV_DATA));
            return Ok(page);
        }

        let params = EstimatorParams {
            risk_free_rate: risk_free_rate.unwrap_or(self.config.risk_free_rate),
            ..self.config.estimator_params()?
        };
        let metrics = match NavSeries::clean(&rows)
            .and_then(|series| compute_risk_metrics_with(&series, &params))
        {
            Ok(m) => m,
            Err(e) => {
                page.push(explain(e)?);
                return Ok(page);
            }
        };

        tracing::debug!(
            scheme = %name,
            ann_vol = metrics.annualized_volatility,
            tier = metrics.risk_tier.as_str(),
            "risk metrics computed"
        );

        page.push(Widget::metric(
            "Annualized Volatility",
            fmt_percent(metrics.annualized_volatility),
        ));
        page.push(Widget::metric(
            "Annualized Return",
            fmt_percent(metrics.annualized_return),
        ));
        page.push(Widget::metric("Sharpe Ratio", fmt_2dp(metrics.sharpe_ratio)));

        let (label, color, icon) = metrics.risk_tier.display();
        page.push(Widget::badge(icon, label.to_string(), color));
        Ok(page)
    }

    async fn heatmap(
        &self,
        raw_code: &str,
        num_simulations: Option<usize>,
        horizon_days: Option<usize>,
        rng_seed: Option<u64>,
    ) -> Result<Page, DashboardError> {
        let (code, name) = self.resolve_scheme(raw_code).await?;
        let rows = self.fetch_nav(&code).await?;

        let mut page = Page::new("Performance Heatmap");
        if rows.is_empty() {
            page.push(Widget::notice(NoticeLevel::Info, NO_NAV_DATA));
            return Ok(page);
        }

        let series = match NavSeries::clean(&rows) {
            Ok(s) => s,
            Err(e) => {
                page.push(explain(e)?);
                return Ok(page);
            }
        };

        let cells = monthly_day_change(&series)
            .into_iter()
            .map(|c| HeatCell {
                x: c.month.to_string(),
                y: c.mean_day_change,
                samples: c.samples,
            })
            .collect();
        page.push(Widget::Heatmap {
            title: "NAV Performance Heatmap".to_string(),
            x_label: "month".to_string(),
            y_label: "dayChange".to_string(),
            cells,
        });

        let daily = match series.daily_returns().and_then(|r| daily_return_stats(&r)) {
            Ok(d) => d,
            Err(e) => {
                page.push(explain(e)?);
                return Ok(page);
            }
        };
        let Some(seed_nav) = series.last_nav() else {
            page.push(Widget::notice(NoticeLevel::Info, NO_NAV_DATA));
            return Ok(page);
        };

        let params = MonteCarloParams::from_daily_stats(
            seed_nav,
            &daily,
            num_simulations.unwrap_or(self.config.default_simulations),
            horizon_days.unwrap_or(self.config.default_horizon_days),
        );
        let batch = run_monte_carlo_bounded(&params, &self.config.simulation_bounds(), rng_seed)?;

        let days: Vec<Value> = (0..=params.horizon_days).map(|d| json!(d)).collect();
        let series_out = batch
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| ChartSeries {
                name: format!("Simulation {}", i + 1),
                x: days.clone(),
                y: path.clone(),
            })
            .collect();
        page.push(Widget::LineChart {
            title: format!("Monte Carlo Simulation for {name} NAV Projection"),
            x_label: "Day".to_string(),
            y_label: "Projected NAV".to_string(),
            series: series_out,
        });

        page.push(Widget::metric(
            "Expected Final NAV",
            fmt_2dp(batch.terminal.mean),
        ));
        page.push(Widget::metric("Minimum Final NAV", fmt_2dp(batch.terminal.min)));
        page.push(Widget::metric("Maximum Final NAV", fmt_2dp(batch.terminal.max)));
        Ok(page)
    }
}
