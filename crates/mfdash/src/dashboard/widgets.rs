use serde::Serialize;
use serde_json::Value;

/// 交给渲染层的一页内容；渲染层只负责画，不做计算。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub widgets: Vec<Widget>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            widgets: Vec::new(),
        }
    }

    pub fn push(&mut self, widget: Widget) {
        self.widgets.push(widget);
    }

    pub fn metric(&self, label: &str) -> Option<&str> {
        self.widgets.iter().find_map(|w| match w {
            Widget::Metric { label: l, value } if l == label => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.widgets.iter().filter_map(|w| match w {
            Widget::Notice { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub x: Vec<Value>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub x: String,
    pub y: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    LineChart {
        title: String,
        x_label: String,
        y_label: String,
        series: Vec<ChartSeries>,
    },
    Heatmap {
        title: String,
        x_label: String,
        y_label: String,
        cells: Vec<HeatCell>,
    },
    Metric {
        label: String,
        value: String,
    },
    Badge {
        icon: String,
        text: String,
        color: String,
    },
    Notice {
        level: NoticeLevel,
        text: String,
    },
}

impl Widget {
    pub fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Widget::Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn metric(label: &str, value: String) -> Self {
        Widget::Metric {
            label: label.to_string(),
            value,
        }
    }

    pub fn badge(icon: &str, text: String, color: &str) -> Self {
        Widget::Badge {
            icon: icon.to_string(),
            text,
            color: color.to_string(),
        }
    }

    pub fn notice(level: NoticeLevel, text: impl Into<String>) -> Self {
        Widget::Notice {
            level,
            text: text.into(),
        }
    }
}

/// 0.1234 -> "12.34%"
pub fn fmt_percent(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

pub fn fmt_2dp(v: f64) -> String {
    format!("{v:.2}")
}
