//! HTML rendering of a [`PageView`].
//!
//! The page is a single document: a navigation sidebar, the sections in
//! order and a footer. Charts are drawn client-side by Plotly from the
//! figure JSON embedded next to each chart container.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::charts::Chart;
use crate::constants::PLOTLY_CDN;
use crate::insights::format_count;
use crate::pages::{Cell, Insight, Metric, Page, PageView, PlatformSelector, Section, Table};

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; display: flex; color: #222; }
nav { width: 220px; min-height: 100vh; background: #1f2937; padding: 1rem; box-sizing: border-box; }
nav a { display: block; color: #d1d5db; text-decoration: none; padding: .4rem .6rem; border-radius: 4px; }
nav a.active, nav a:hover { background: #374151; color: #fff; }
main { flex: 1; padding: 1.5rem 2rem; }
.question { color: #555; font-style: italic; }
.metrics, .charts { display: flex; gap: 1rem; flex-wrap: wrap; margin: 1rem 0; }
.metric { flex: 1; min-width: 160px; border: 1px solid #e5e7eb; border-radius: 6px; padding: .8rem; }
.metric .value { font-size: 1.6rem; font-weight: 600; }
.metric .caption { color: #6b7280; font-size: .85rem; }
.chart { flex: 1; min-width: 420px; }
.warning { background: #fff7ed; border: 1px solid #fdba74; padding: .8rem; border-radius: 6px; margin: 1rem 0; }
table { border-collapse: collapse; width: 100%; margin: .5rem 0 1.5rem; }
th, td { border-bottom: 1px solid #e5e7eb; padding: .35rem .6rem; text-align: left; }
th { cursor: pointer; background: #f9fafb; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
.insights li { margin: .3rem 0; }
footer { margin-top: 2rem; color: #9ca3af; font-size: .8rem; }
"#;

// Sorts by data-value when present so numbers compare numerically.
const SORT_SCRIPT: &str = r#"
document.querySelectorAll("table.sortable th").forEach(function (th, _) {
  th.addEventListener("click", function () {
    var table = th.closest("table");
    var body = table.tBodies[0];
    var col = Array.prototype.indexOf.call(th.parentNode.children, th);
    var asc = th.dataset.order !== "asc";
    th.dataset.order = asc ? "asc" : "desc";
    var key = function (row) {
      var cell = row.children[col];
      var v = cell.dataset.value;
      return v === undefined ? cell.textContent : parseFloat(v);
    };
    Array.from(body.rows)
      .sort(function (a, b) {
        var x = key(a), y = key(b);
        var c = typeof x === "number" ? x - y : String(x).localeCompare(String(y));
        return asc ? c : -c;
      })
      .forEach(function (row) { body.appendChild(row); });
  });
});
"#;

/// Escapes text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Figure JSON safe to inline in a `<script>` element.
fn script_json(chart: &Chart) -> String {
    chart.figure.to_string().replace("</", "<\\/")
}

pub fn render_page(view: &PageView, generated_at: DateTime<Utc>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let page = view.page;

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} · Video Game Sales</title>\n<script src=\"{PLOTLY_CDN}\"></script>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n",
        escape(page.title())
    );

    render_nav(&mut html, page);

    html.push_str("<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(page.title()));
    if let Some(question) = page.question() {
        let _ = writeln!(html, "<p class=\"question\">{}</p>", escape(question));
    }

    let mut chart_id = 0usize;
    for section in &view.sections {
        match section {
            Section::Metrics(metrics) => render_metrics(&mut html, metrics),
            Section::Charts(charts) => render_charts(&mut html, charts, &mut chart_id),
            Section::Table(table) => render_table(&mut html, table),
            Section::Insights(insights) => render_insights(&mut html, insights),
            Section::Warning(message) => {
                let _ = writeln!(html, "<div class=\"warning\">{}</div>", escape(message));
            }
            Section::Selector(selector) => render_selector(&mut html, page, selector),
        }
    }

    let _ = write!(
        html,
        "<footer>Generated {}</footer>\n</main>\n<script>{SORT_SCRIPT}</script>\n</body>\n</html>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    html
}

fn render_nav(html: &mut String, current: Page) {
    html.push_str("<nav>\n<h2 style=\"color:#fff\">Game Sales</h2>\n");
    for page in Page::ALL {
        let class = if page == current { " class=\"active\"" } else { "" };
        let _ = writeln!(
            html,
            "<a href=\"/pages/{}\"{class}>{}</a>",
            page.slug(),
            escape(page.title())
        );
    }
    html.push_str("</nav>\n");
}

fn render_metrics(html: &mut String, metrics: &[Metric]) {
    html.push_str("<div class=\"metrics\">\n");
    for metric in metrics {
        let _ = writeln!(
            html,
            "<div class=\"metric\"><div>{}</div><div class=\"value\">{}</div>\
             <div class=\"caption\">{}</div></div>",
            escape(metric.label),
            escape(&metric.value),
            escape(metric.caption)
        );
    }
    html.push_str("</div>\n");
}

fn render_charts(html: &mut String, charts: &[Chart], next_id: &mut usize) {
    html.push_str("<div class=\"charts\">\n");
    for chart in charts {
        let id = *next_id;
        *next_id += 1;
        let _ = writeln!(
            html,
            "<div class=\"chart\" id=\"chart-{id}\" data-kind=\"{}\"></div>\n\
             <script>(function () {{ var f = {}; \
             Plotly.newPlot(\"chart-{id}\", f.data, f.layout, {{responsive: true}}); }})();</script>",
            chart_kind_name(chart),
            script_json(chart)
        );
    }
    html.push_str("</div>\n");
}

fn chart_kind_name(chart: &Chart) -> String {
    serde_json::to_value(chart.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => format!("<td>{}</td>", escape(text)),
        Cell::Count(n) => format!("<td class=\"num\" data-value=\"{n}\">{}</td>", format_count(*n)),
        Cell::Sales(v) => format!("<td class=\"num\" data-value=\"{v}\">{v:.2}</td>"),
        Cell::Percent(v) => format!("<td class=\"num\" data-value=\"{v}\">{v:.2}</td>"),
    }
}

fn render_table(html: &mut String, table: &Table) {
    let _ = writeln!(html, "<h3>{}</h3>", escape(&table.title));
    html.push_str("<table class=\"sortable\">\n<thead><tr>");
    for column in &table.columns {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&render_cell(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
}

fn render_insights(html: &mut String, insights: &[Insight]) {
    html.push_str("<h3>Key insights</h3>\n<ul class=\"insights\">\n");
    for insight in insights {
        let _ = writeln!(
            html,
            "<li><strong>{}:</strong> {}</li>",
            escape(&insight.label),
            escape(&insight.value)
        );
    }
    html.push_str("</ul>\n");
}

fn render_selector(html: &mut String, page: Page, selector: &PlatformSelector) {
    let _ = write!(
        html,
        "<form method=\"get\" action=\"/pages/{}\">\n<label>Platform \
         <select name=\"platform\" onchange=\"this.form.submit()\">",
        page.slug()
    );
    for option in &selector.options {
        let selected = if selector.selected.as_deref() == Some(option.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape(option)
        );
    }
    let checked = if selector.show_all { " checked" } else { "" };
    let _ = writeln!(
        html,
        "</select></label>\n<label><input type=\"checkbox\" name=\"all\" value=\"true\"{checked} \
         onchange=\"this.form.submit()\"> Show all platforms</label>\n</form>"
    );
}
