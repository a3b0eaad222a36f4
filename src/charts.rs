//! Plotly figure specifications.
//!
//! Each builder takes rows in query order (largest first) and returns a
//! `{data, layout}` figure the browser hands straight to `Plotly.newPlot`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::models::GenrePlatformTotal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Lollipop,
    Donut,
    Pie,
    Treemap,
    Sunburst,
    Bubble,
    GroupedBar,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub figure: Value,
}

/// Labels and values in query order.
#[derive(Debug, Clone, Default)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Extra line per point shown on hover.
    pub hover: Vec<String>,
}

impl Series {
    pub fn new<I, L>(points: I) -> Self
    where
        I: IntoIterator<Item = (L, f64)>,
        L: Into<String>,
    {
        let (labels, values) = points
            .into_iter()
            .map(|(label, value)| (label.into(), value))
            .unzip();
        Self {
            labels,
            values,
            hover: Vec::new(),
        }
    }

    pub fn with_hover(mut self, hover: Vec<String>) -> Self {
        self.hover = hover;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Smallest first, so horizontal bars put the leader on top.
    fn ascending(&self) -> (Vec<&String>, Vec<f64>, Vec<&String>) {
        let labels = self.labels.iter().rev().collect();
        let values = self.values.iter().rev().copied().collect();
        let hover = self.hover.iter().rev().collect();
        (labels, values, hover)
    }
}

fn layout(title: &str, height: u32) -> Value {
    json!({
        "title": { "text": title },
        "height": height,
        "margin": { "l": 160, "r": 40, "t": 60, "b": 40 },
    })
}

fn axis_label(value_title: &str) -> Value {
    json!({ "title": { "text": value_title } })
}

/// Horizontal ranking bars, coloured by value.
pub fn ranked_bar(title: &str, series: &Series, colorscale: &str) -> Chart {
    let (labels, values, hover) = series.ascending();
    let mut trace = json!({
        "type": "bar",
        "orientation": "h",
        "x": values,
        "y": labels,
        "text": values.iter().map(|v| format!("${v:.2}M")).collect::<Vec<_>>(),
        "textposition": "outside",
        "marker": { "color": values, "colorscale": colorscale },
        "hovertemplate": "<b>%{y}</b><br>Sales: $%{x:.2f}M<extra></extra>",
    });
    if !hover.is_empty() {
        trace["customdata"] = json!(hover);
        trace["hovertemplate"] =
            json!("<b>%{y}</b><br>%{customdata}<br>Sales: $%{x:.2f}M<extra></extra>");
    }

    let mut figure_layout = layout(title, bar_height(series.labels.len()));
    figure_layout["xaxis"] = axis_label("Sales (millions)");
    figure_layout["showlegend"] = json!(false);

    Chart {
        kind: ChartKind::Bar,
        title: title.to_string(),
        figure: json!({ "data": [trace], "layout": figure_layout }),
    }
}

/// Dot-and-stem ranking for long title lists.
pub fn lollipop(title: &str, series: &Series) -> Chart {
    let (labels, values, hover) = series.ascending();

    let stems: Vec<Value> = labels
        .iter()
        .zip(&values)
        .map(|(label, value)| {
            json!({
                "type": "scatter",
                "mode": "lines",
                "x": [0.0, value],
                "y": [label, label],
                "line": { "color": "darkred", "width": 2 },
                "hoverinfo": "skip",
                "showlegend": false,
            })
        })
        .collect();

    let dots = json!({
        "type": "scatter",
        "mode": "markers",
        "x": values,
        "y": labels,
        "customdata": hover,
        "marker": { "size": 12, "color": values, "colorscale": "Reds", "showscale": true },
        "hovertemplate": "<b>%{y}</b><br>%{customdata}<br>Sales: $%{x:.2f}M<extra></extra>",
        "showlegend": false,
    });

    let mut data = stems;
    data.push(dots);

    let mut figure_layout = layout(title, bar_height(series.labels.len()));
    figure_layout["xaxis"] = axis_label("Sales (millions)");
    figure_layout["hovermode"] = json!("closest");

    Chart {
        kind: ChartKind::Lollipop,
        title: title.to_string(),
        figure: json!({ "data": data, "layout": figure_layout }),
    }
}

/// Pie with a hole; `hole` of zero draws a plain pie.
pub fn donut(title: &str, series: &Series, hole: f64) -> Chart {
    let trace = json!({
        "type": "pie",
        "labels": series.labels,
        "values": series.values,
        "hole": hole,
        "sort": false,
        "textposition": "inside",
        "textinfo": "percent+label",
    });

    Chart {
        kind: if hole > 0.0 { ChartKind::Donut } else { ChartKind::Pie },
        title: title.to_string(),
        figure: json!({ "data": [trace], "layout": layout(title, 450) }),
    }
}

pub fn treemap(title: &str, series: &Series) -> Chart {
    let trace = json!({
        "type": "treemap",
        "labels": series.labels,
        "parents": vec![""; series.labels.len()],
        "values": series.values,
        "marker": { "colorscale": "RdYlGn", "colors": series.values },
        "textposition": "middle center",
        "hovertemplate": "<b>%{label}</b><br>Sales: $%{value:.2f}M<extra></extra>",
    });

    Chart {
        kind: ChartKind::Treemap,
        title: title.to_string(),
        figure: json!({ "data": [trace], "layout": layout(title, 500) }),
    }
}

/// Every slice hangs off a single `root` whose value is the total.
pub fn sunburst(title: &str, root: &str, series: &Series) -> Chart {
    let total: f64 = series.values.iter().sum();

    let mut labels = vec![root.to_string()];
    labels.extend(series.labels.iter().cloned());
    let mut parents = vec![String::new()];
    parents.extend(std::iter::repeat_n(root.to_string(), series.labels.len()));
    let mut values = vec![total];
    values.extend(series.values.iter().copied());

    let trace = json!({
        "type": "sunburst",
        "labels": labels,
        "parents": parents,
        "values": values,
        "branchvalues": "total",
        "marker": { "colorscale": "Blues" },
    });

    Chart {
        kind: ChartKind::Sunburst,
        title: title.to_string(),
        figure: json!({ "data": [trace], "layout": layout(title, 500) }),
    }
}

/// Bubble per category: x against sales, bubble area tracks sales.
pub fn bubble(
    title: &str,
    labels: &[String],
    x: &[f64],
    sales: &[f64],
    x_title: &str,
    colorscale: &str,
) -> Chart {
    let peak = sales.iter().copied().fold(0.0_f64, f64::max);
    // Plotly's recommended sizeref for a 60px maximum bubble.
    let sizeref = if peak > 0.0 { 2.0 * peak / (60.0 * 60.0) } else { 1.0 };

    let trace = json!({
        "type": "scatter",
        "mode": "markers+text",
        "x": x,
        "y": sales,
        "text": labels,
        "textposition": "top center",
        "marker": {
            "size": sales,
            "sizemode": "area",
            "sizeref": sizeref,
            "color": sales,
            "colorscale": colorscale,
            "showscale": true,
        },
        "hovertemplate": "<b>%{text}</b><br>%{x}<br>Sales: $%{y:.2f}M<extra></extra>",
    });

    let mut figure_layout = layout(title, 500);
    figure_layout["xaxis"] = axis_label(x_title);
    figure_layout["yaxis"] = axis_label("Sales (millions)");
    figure_layout["hovermode"] = json!("closest");

    Chart {
        kind: ChartKind::Bubble,
        title: title.to_string(),
        figure: json!({ "data": [trace], "layout": figure_layout }),
    }
}

/// One bar group per platform, one trace per genre.
pub fn grouped_bar(title: &str, rows: &[GenrePlatformTotal]) -> Chart {
    let mut platforms: Vec<&str> = Vec::new();
    let mut by_genre: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for row in rows {
        if !platforms.contains(&row.platform.as_str()) {
            platforms.push(row.platform.as_str());
        }
        by_genre
            .entry(row.genre.as_str())
            .or_default()
            .insert(row.platform.as_str(), row.total_sales);
    }

    let data: Vec<Value> = by_genre
        .into_iter()
        .map(|(genre, per_platform)| {
            let values: Vec<Value> = platforms
                .iter()
                .map(|p| per_platform.get(p).map_or(Value::Null, |v| json!(v)))
                .collect();
            json!({
                "type": "bar",
                "name": genre,
                "x": platforms,
                "y": values,
            })
        })
        .collect();

    let mut figure_layout = layout(title, 600);
    figure_layout["barmode"] = json!("group");
    figure_layout["hovermode"] = json!("x unified");
    figure_layout["yaxis"] = axis_label("Sales (millions)");
    figure_layout["legend"] = json!({ "title": { "text": "Genre" } });

    Chart {
        kind: ChartKind::GroupedBar,
        title: title.to_string(),
        figure: json!({ "data": data, "layout": figure_layout }),
    }
}

fn bar_height(rows: usize) -> u32 {
    let rows = u32::try_from(rows).unwrap_or(u32::MAX);
    rows.saturating_mul(28).saturating_add(120).clamp(320, 900)
}
