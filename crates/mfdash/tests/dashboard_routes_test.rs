use std::collections::BTreeMap;

use mfdash::analytics::aum::AumRow;
use mfdash::dashboard::widgets::Widget;
use mfdash::sources::StaticSource;
use mfdash::{AnalysisRequest, AnalyticsConfig, Dashboard, DashboardError, RawNavRow, RiskTier};
use serde_json::json;

fn nav_rows(navs: &[&str]) -> Vec<RawNavRow> {
    // 倒序给出，模拟上游返回顺序
    navs.iter()
        .enumerate()
        .rev()
        .map(|(i, nav)| RawNavRow::new(format!("{:02}-01-2024", i + 1), *nav))
        .collect()
}

fn source() -> StaticSource {
    let mut details = BTreeMap::new();
    details.insert("fund_house".to_string(), json!("ICICI Prudential Mutual Fund"));
    details.insert("scheme_type".to_string(), json!("Open Ended Schemes"));

    StaticSource::new()
        .with_scheme("120586", "ICICI Prudential Bluechip Fund - Direct Plan - Growth")
        .with_scheme("119551", "Aditya Birla Sun Life Liquid Fund - Growth")
        .with_scheme("100001", "Flat Fund")
        .with_scheme("100002", "Empty Fund")
        .with_details("120586", details)
        .with_nav(
            "120586",
            nav_rows(&["100", "101", "99", "102", "100", "103", "104", "0", "106", "105"]),
        )
        .with_nav("119551", nav_rows(&["10.0", "10.1", "10.05", "10.2", "10.25"]))
        .with_nav("100001", nav_rows(&["20", "20", "20"]))
        .with_aum(
            "July - September 2024",
            vec![
                AumRow {
                    fund_name: "Small Fund".to_string(),
                    aaum_overseas: Some("10.5".to_string()),
                    aaum_domestic: Some("1,000".to_string()),
                },
                AumRow {
                    fund_name: "Big Fund".to_string(),
                    aaum_overseas: None,
                    aaum_domestic: Some("50000".to_string()),
                },
            ],
        )
}

fn dashboard() -> Dashboard<StaticSource> {
    Dashboard::new(source(), AnalyticsConfig::default())
}

#[tokio::test]
async fn view_schemes_filters_by_amc() {
    let page = dashboard()
        .handle(&AnalysisRequest::ViewSchemes { amc: None })
        .await
        .expect("page");
    let Some(Widget::Table { rows, .. }) = page.widgets.first() else {
        panic!("expected table, got {:?}", page.widgets);
    };
    assert_eq!(rows.len(), 1);
    assert!(page.widgets.iter().any(|w| matches!(
        w,
        Widget::Badge { text, .. } if text == "1 schemes available in ICICI"
    )));

    let empty = dashboard()
        .handle(&AnalysisRequest::ViewSchemes {
            amc: Some("Nippon".to_string()),
        })
        .await
        .expect("page");
    assert_eq!(empty.notices().collect::<Vec<_>>(), vec!["No schemes found."]);
}

#[tokio::test]
async fn scheme_details_renders_key_value_table() {
    let page = dashboard()
        .handle(&AnalysisRequest::SchemeDetails {
            scheme_code: "120586".to_string(),
        })
        .await
        .expect("page");
    let Some(Widget::Table { columns, rows }) = page.widgets.first() else {
        panic!("expected table");
    };
    assert_eq!(columns, &vec!["Field".to_string(), "Value".to_string()]);
    assert_eq!(rows[0], vec![json!("fund_house"), json!("ICICI Prudential Mutual Fund")]);
}

#[tokio::test]
async fn unknown_scheme_is_an_error() {
    let err = dashboard()
        .handle(&AnalysisRequest::RiskAnalysis {
            scheme_code: "999999".to_string(),
            risk_free_rate: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::UnknownScheme(code) if code == "999999"));
}

#[tokio::test]
async fn historical_nav_shows_cleaned_table_and_growth_badge() {
    let page = dashboard()
        .handle(&AnalysisRequest::HistoricalNav {
            scheme_code: "119551".to_string(),
        })
        .await
        .expect("page");
    let Some(Widget::Table { rows, .. }) = page.widgets.first() else {
        panic!("expected table");
    };
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0][0], json!("2024-01-01"));
    assert!(page.widgets.iter().any(|w| matches!(
        w,
        Widget::Badge { text, .. } if text.starts_with("Average monthly growth: ")
    )));
}

#[tokio::test]
async fn risk_analysis_renders_metrics_and_badge() {
    let page = dashboard()
        .handle(&AnalysisRequest::RiskAnalysis {
            scheme_code: "120586".to_string(),
            risk_free_rate: Some(0.06),
        })
        .await
        .expect("page");
    assert!(page.metric("Annualized Volatility").is_some_and(|v| v.ends_with('%')));
    assert!(page.metric("Annualized Return").is_some());
    assert!(page.metric("Sharpe Ratio").is_some());
    let (label, color, icon) = RiskTier::UltraHigh.display();
    assert!(page.widgets.iter().any(|w| w
        == &Widget::Badge {
            icon: icon.to_string(),
            text: label.to_string(),
            color: color.to_string(),
        }));
}

#[tokio::test]
async fn flat_nav_renders_undefined_sharpe_notice() {
    let page = dashboard()
        .handle(&AnalysisRequest::RiskAnalysis {
            scheme_code: "100001".to_string(),
            risk_free_rate: None,
        })
        .await
        .expect("page");
    let notices: Vec<&str> = page.notices().collect();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Sharpe ratio is undefined"));
    assert!(page.metric("Sharpe Ratio").is_none());
}

#[tokio::test]
async fn empty_history_renders_no_data_notice() {
    let page = dashboard()
        .handle(&AnalysisRequest::Heatmap {
            scheme_code: "100002".to_string(),
            num_simulations: None,
            horizon_days: None,
            rng_seed: Some(1),
        })
        .await
        .expect("page");
    assert_eq!(
        page.notices().collect::<Vec<_>>(),
        vec!["No historical NAV data available."]
    );
}

#[tokio::test]
async fn compare_navs_builds_one_series_per_scheme() {
    let page = dashboard()
        .handle(&AnalysisRequest::CompareNavs {
            scheme_codes: vec!["120586".to_string(), "119551".to_string()],
        })
        .await
        .expect("page");
    let Some(Widget::LineChart { series, .. }) = page.widgets.last() else {
        panic!("expected chart");
    };
    assert_eq!(series.len(), 2);
    // 0 净值被插值，不会出现在图里
    assert!(series[0].y.iter().all(|v| *v > 0.0));
    assert!((series[0].y[7] - 105.0).abs() < 1e-9);

    let empty = dashboard()
        .handle(&AnalysisRequest::CompareNavs {
            scheme_codes: vec![],
        })
        .await
        .expect("page");
    assert_eq!(
        empty.notices().collect::<Vec<_>>(),
        vec!["Select at least one scheme."]
    );
}

#[tokio::test]
async fn average_aum_sums_and_ranks() {
    let page = dashboard()
        .handle(&AnalysisRequest::AverageAum { period: None })
        .await
        .expect("page");
    let Some(Widget::Table { rows, .. }) = page.widgets.first() else {
        panic!("expected table");
    };
    assert_eq!(rows[0], vec![json!("Small Fund"), json!(1010.5)]);
    assert_eq!(rows[1], vec![json!("Big Fund"), json!(50000.0)]);
    assert!(page.widgets.iter().any(|w| matches!(
        w,
        Widget::Badge { text, .. } if text == "Ranked in top 50% by AUM size"
    )));

    let none = dashboard()
        .handle(&AnalysisRequest::AverageAum {
            period: Some("January - March 2020".to_string()),
        })
        .await
        .expect("page");
    assert_eq!(none.notices().collect::<Vec<_>>(), vec!["No AUM data available."]);
}

#[tokio::test]
async fn heatmap_includes_projection_and_summary() {
    let req = AnalysisRequest::Heatmap {
        scheme_code: "120586".to_string(),
        num_simulations: Some(200),
        horizon_days: Some(60),
        rng_seed: Some(42),
    };
    let page = dashboard().handle(&req).await.expect("page");

    assert!(matches!(page.widgets.first(), Some(Widget::Heatmap { cells, .. }) if cells.len() == 1));
    let chart = page.widgets.iter().find_map(|w| match w {
        Widget::LineChart { series, .. } => Some(series),
        _ => None,
    });
    let series = chart.expect("projection chart");
    assert_eq!(series.len(), 200);
    assert_eq!(series[0].name, "Simulation 1");
    assert_eq!(series[0].y.len(), 61);
    assert_eq!(series[0].y[0], 105.0);

    for label in ["Expected Final NAV", "Minimum Final NAV", "Maximum Final NAV"] {
        assert!(page.metric(label).is_some(), "{label}");
    }

    let again = dashboard().handle(&req).await.expect("page");
    assert_eq!(page, again);
}

#[tokio::test]
async fn heatmap_rejects_out_of_range_simulation_count() {
    let err = dashboard()
        .handle(&AnalysisRequest::Heatmap {
            scheme_code: "120586".to_string(),
            num_simulations: Some(10),
            horizon_days: None,
            rng_seed: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Analytics(_)));
}

#[test]
fn requests_deserialize_from_tagged_json() {
    let req: AnalysisRequest =
        serde_json::from_str(r#"{"view":"risk_analysis","scheme_code":"120586"}"#).expect("req");
    assert_eq!(
        req,
        AnalysisRequest::RiskAnalysis {
            scheme_code: "120586".to_string(),
            risk_free_rate: None,
        }
    );
    assert_eq!(req.view_name(), "risk_analysis");
}
