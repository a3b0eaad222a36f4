//! Dashboard pages.
//!
//! A page runs its queries, turns each result into charts, a table and a few
//! insights, and returns a [`PageView`] for the renderer. Query failures and
//! empty results become warnings so the rest of the page still renders.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::charts::{self, Chart, Series};
use crate::constants::{
    DEFAULT_TOP_LIMIT, MAX_TOP_LIMIT, OVERVIEW_TOP_LIMIT, SELECTOR_PLATFORMS, SHARE_HEAD,
};
use crate::error::DashboardError;
use crate::insights::{
    fold_others, format_count, format_millions, head_sum, most_diverse_platform,
    most_efficient_publisher, round2, shares, summarize, top_platforms,
};
use crate::models::{
    GenrePlatformTotal, GenreTotal, PlatformTotal, PublisherTotal, RegionTotal, TopGame,
};
use crate::store::SalesStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Regional,
    TopGames,
    Genres,
    Platforms,
    GenrePlatform,
    Publishers,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Overview,
        Page::Regional,
        Page::TopGames,
        Page::Genres,
        Page::Platforms,
        Page::GenrePlatform,
        Page::Publishers,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Regional => "regional",
            Page::TopGames => "top-games",
            Page::Genres => "genres",
            Page::Platforms => "platforms",
            Page::GenrePlatform => "genre-platform",
            Page::Publishers => "publishers",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Regional => "Regional Sales",
            Page::TopGames => "Top Selling Games",
            Page::Genres => "Genre Trends",
            Page::Platforms => "Platform Performance",
            Page::GenrePlatform => "Genre × Platform",
            Page::Publishers => "Publisher Performance",
        }
    }

    /// Analytical question answered by the page.
    pub fn question(self) -> Option<&'static str> {
        match self {
            Page::Overview => None,
            Page::Regional => Some("How are total sales distributed across regions?"),
            Page::TopGames => Some("Which games earned the most worldwide?"),
            Page::Genres => Some("Which genres sell best globally?"),
            Page::Platforms => Some("Which platforms dominate the market?"),
            Page::GenrePlatform => Some("Which genres sell best on a given platform?"),
            Page::Publishers => Some("Which publishers move the most units?"),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Page {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.slug() == s)
            .ok_or_else(|| DashboardError::BadRequest(format!("unknown page `{s}`")))
    }
}

/// Query-string controls shared by all pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub platform: Option<String>,
    #[serde(default)]
    pub all: bool,
}

impl PageParams {
    pub fn validate(&self) -> Result<(), DashboardError> {
        match self.limit {
            Some(limit) if limit == 0 || limit > MAX_TOP_LIMIT => Err(DashboardError::BadRequest(
                format!("limit must be between 1 and {MAX_TOP_LIMIT}"),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub caption: &'static str,
}

#[derive(Debug, Clone)]
pub struct Insight {
    pub label: String,
    pub value: String,
}

impl Insight {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Count(i64),
    /// Millions, shown with two decimals.
    Sales(f64),
    /// Percentage already rounded to two decimals.
    Percent(f64),
}

#[derive(Debug, Clone)]
pub struct Table {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone)]
pub struct PlatformSelector {
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub show_all: bool,
}

#[derive(Debug, Clone)]
pub enum Section {
    Metrics(Vec<Metric>),
    /// Charts laid out side by side.
    Charts(Vec<Chart>),
    Table(Table),
    Insights(Vec<Insight>),
    Warning(String),
    Selector(PlatformSelector),
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub page: Page,
    pub sections: Vec<Section>,
}

impl PageView {
    fn new(page: Page) -> Self {
        Self {
            page,
            sections: Vec::new(),
        }
    }

    fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.sections.push(Section::Warning(message.into()));
    }

    /// Rows of a successful, non-empty result. Anything else becomes a warning.
    fn rows<T>(
        &mut self,
        what: &str,
        result: Result<Vec<T>, DashboardError>,
    ) -> Option<Vec<T>> {
        match result {
            Ok(rows) if rows.is_empty() => {
                self.warn(format!("No {what} data found."));
                None
            }
            Ok(rows) => Some(rows),
            Err(e) => {
                self.warn(format!("Could not load {what}: {e}"));
                None
            }
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().filter_map(|s| match s {
            Section::Warning(w) => Some(w.as_str()),
            _ => None,
        })
    }

    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.sections.iter().flat_map(|s| match s {
            Section::Charts(charts) => charts.as_slice(),
            _ => &[],
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.sections.iter().filter_map(|s| match s {
            Section::Table(table) => Some(table),
            _ => None,
        })
    }
}

pub fn build(page: Page, store: &dyn SalesStore, params: &PageParams) -> PageView {
    match page {
        Page::Overview => overview(store),
        Page::Regional => regional(store),
        Page::TopGames => top_games(store, params.limit.unwrap_or(DEFAULT_TOP_LIMIT)),
        Page::Genres => genres(store),
        Page::Platforms => platforms(store),
        Page::GenrePlatform => genre_platform(store, params.platform.as_deref(), params.all),
        Page::Publishers => publishers(store, params.limit.unwrap_or(DEFAULT_TOP_LIMIT)),
    }
}

fn with_shares(rows: Vec<Vec<Cell>>, totals: &[f64]) -> Vec<Vec<Cell>> {
    rows.into_iter()
        .zip(shares(totals))
        .map(|(mut row, share)| {
            row.push(Cell::Percent(share));
            row
        })
        .collect()
}

fn ranked(rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    rows.into_iter()
        .zip(1i64..)
        .map(|(mut row, rank)| {
            row.insert(0, Cell::Count(rank));
            row
        })
        .collect()
}

fn overview(store: &dyn SalesStore) -> PageView {
    let mut view = PageView::new(Page::Overview);

    match store.overview() {
        Ok(o) => view.push(Section::Metrics(vec![
            Metric {
                label: "Global sales",
                value: format_millions(o.total_sales),
                caption: "millions of units",
            },
            Metric {
                label: "Games",
                value: format_count(o.total_games),
                caption: "unique titles",
            },
            Metric {
                label: "Publishers",
                value: format_count(o.total_publishers),
                caption: "publishing companies",
            },
            Metric {
                label: "Platforms",
                value: format_count(o.total_platforms),
                caption: "consoles and PC",
            },
        ])),
        Err(e) => view.warn(format!("Could not load summary figures: {e}")),
    }

    if let Some(games) = view.rows("game", store.top_games(OVERVIEW_TOP_LIMIT)) {
        view.push(Section::Table(top_games_table(
            format!("Top {OVERVIEW_TOP_LIMIT} games"),
            &games,
        )));
    }

    let regions = store.sales_by_region().map(|mut rows| {
        rows.truncate(OVERVIEW_TOP_LIMIT as usize);
        rows
    });
    if let Some(regions) = view.rows("regional sales", regions) {
        view.push(Section::Table(Table {
            title: format!("Top {OVERVIEW_TOP_LIMIT} regions"),
            columns: vec!["Region", "Total Sales (Millions)"],
            rows: regions
                .iter()
                .map(|r| vec![Cell::Text(r.region.clone()), Cell::Sales(r.total_sales)])
                .collect(),
        }));
    }

    view
}

fn regional(store: &dyn SalesStore) -> PageView {
    let mut view = PageView::new(Page::Regional);
    let Some(regions) = view.rows("regional sales", store.sales_by_region()) else {
        return view;
    };

    let series = Series::new(regions.iter().map(|r| (r.region.as_str(), r.total_sales)));
    view.push(Section::Charts(vec![
        charts::ranked_bar("Total sales per region", &series, "Blues"),
        charts::donut("Market share per region", &series, 0.4),
    ]));
    view.push(Section::Charts(vec![charts::sunburst(
        "Regional sales hierarchy",
        "Total",
        &series,
    )]));

    view.push(Section::Table(region_table(&regions)));

    let totals = series.values.clone();
    if let (Some(top), Some(summary)) = (regions.first(), summarize(totals)) {
        view.push(Section::Insights(vec![
            Insight::new(
                "Dominant region",
                format!("{} with {}", top.region, format_millions(top.total_sales)),
            ),
            Insight::new("Global sales", format_millions(summary.sum)),
            Insight::new("Mean per region", format_millions(summary.mean)),
        ]));
    }

    view
}

fn region_table(regions: &[RegionTotal]) -> Table {
    let totals: Vec<f64> = regions.iter().map(|r| r.total_sales).collect();
    Table {
        title: "Regional sales detail".into(),
        columns: vec!["Region", "Total Sales (Millions)", "Share (%)"],
        rows: with_shares(
            regions
                .iter()
                .map(|r| vec![Cell::Text(r.region.clone()), Cell::Sales(r.total_sales)])
                .collect(),
            &totals,
        ),
    }
}

fn top_games_table(title: String, games: &[TopGame]) -> Table {
    Table {
        title,
        columns: vec!["Rank", "Game", "Publisher", "Total Sales (Millions)"],
        rows: ranked(
            games
                .iter()
                .map(|g| {
                    vec![
                        Cell::Text(g.game.clone()),
                        Cell::Text(g.publisher.clone()),
                        Cell::Sales(g.total_sales),
                    ]
                })
                .collect(),
        ),
    }
}

fn top_games(store: &dyn SalesStore, limit: u32) -> PageView {
    let mut view = PageView::new(Page::TopGames);
    let Some(games) = view.rows("game", store.top_games(limit)) else {
        return view;
    };

    let series = Series::new(games.iter().map(|g| (g.game.as_str(), g.total_sales)))
        .with_hover(games.iter().map(|g| format!("Publisher: {}", g.publisher)).collect());

    view.push(Section::Charts(vec![charts::lollipop(
        &format!("Top {} games (lollipop)", games.len()),
        &series,
    )]));
    view.push(Section::Charts(vec![charts::ranked_bar(
        &format!("Sales of the top {} games", games.len()),
        &series,
        "Reds",
    )]));
    view.push(Section::Table(top_games_table(
        format!("Top {} games detail", games.len()),
        &games,
    )));

    let summary = summarize(series.values.iter().copied());
    if let (Some(top), Some(summary)) = (games.first(), summary) {
        view.push(Section::Insights(vec![
            Insight::new(
                "Best seller",
                format!("{} with {}", top.game, format_millions(top.total_sales)),
            ),
            Insight::new("Publisher", top.publisher.clone()),
            Insight::new(
                format!("Top {SHARE_HEAD} combined"),
                format_millions(head_sum(&series.values, SHARE_HEAD)),
            ),
            Insight::new(
                format!("Mean of top {}", summary.count),
                format_millions(summary.mean),
            ),
        ]));
    }

    view
}

fn genres(store: &dyn SalesStore) -> PageView {
    let mut view = PageView::new(Page::Genres);
    let Some(genres) = view.rows("genre", store.sales_by_genre()) else {
        return view;
    };

    let series = Series::new(genres.iter().map(|g| (g.genre.as_str(), g.total_sales)))
        .with_hover(genres.iter().map(|g| format!("Games: {}", g.game_count)).collect());
    view.push(Section::Charts(vec![
        charts::donut("Genre market share", &series, 0.4),
        charts::treemap("Genre sales distribution", &series),
    ]));
    view.push(Section::Charts(vec![charts::ranked_bar(
        "Genres ranked by sales",
        &series,
        "Viridis",
    )]));

    view.push(Section::Table(genre_table(&genres)));

    let summary = summarize(series.values.iter().copied());
    if let (Some(top), Some(summary)) = (genres.first(), summary) {
        view.push(Section::Insights(vec![
            Insight::new(
                "Most popular genre",
                format!("{} with {}", top.genre, format_millions(top.total_sales)),
            ),
            Insight::new("Games in genre", format!("{} games", format_count(top.game_count))),
            Insight::new("Sales across all genres", format_millions(summary.sum)),
            Insight::new("Mean per genre", format_millions(summary.mean)),
        ]));
    }

    view
}

fn genre_table(genres: &[GenreTotal]) -> Table {
    let totals: Vec<f64> = genres.iter().map(|g| g.total_sales).collect();
    Table {
        title: "Sales per genre".into(),
        columns: vec!["Genre", "Game Count", "Total Sales (Millions)", "Share (%)"],
        rows: with_shares(
            genres
                .iter()
                .map(|g| {
                    vec![
                        Cell::Text(g.genre.clone()),
                        Cell::Count(g.game_count),
                        Cell::Sales(g.total_sales),
                    ]
                })
                .collect(),
            &totals,
        ),
    }
}

fn platforms(store: &dyn SalesStore) -> PageView {
    let mut view = PageView::new(Page::Platforms);
    let Some(platforms) = view.rows("platform", store.sales_by_platform()) else {
        return view;
    };

    let series = Series::new(platforms.iter().map(|p| (p.platform.as_str(), p.total_sales)))
        .with_hover(
            platforms
                .iter()
                .map(|p| format!("{} · {} games", p.code, p.game_count))
                .collect(),
        );
    let game_counts: Vec<f64> = platforms.iter().map(|p| p.game_count as f64).collect();

    view.push(Section::Charts(vec![
        charts::ranked_bar("Platform market performance", &series, "Blues"),
        charts::bubble(
            "Platform efficiency: games vs sales",
            &series.labels,
            &game_counts,
            &series.values,
            "Number of games",
            "Blues",
        ),
    ]));

    view.push(Section::Table(platform_table(&platforms)));

    let summary = summarize(series.values.iter().copied());
    if let (Some(top), Some(summary)) = (platforms.first(), summary) {
        view.push(Section::Insights(vec![
            Insight::new(
                "Dominant platform",
                format!("{} with {}", top.platform, format_millions(top.total_sales)),
            ),
            Insight::new("Games on platform", format!("{} games", format_count(top.game_count))),
            Insight::new("Sales across all platforms", format_millions(summary.sum)),
            Insight::new("Mean per platform", format_millions(summary.mean)),
        ]));
    }

    view
}

fn platform_table(platforms: &[PlatformTotal]) -> Table {
    let totals: Vec<f64> = platforms.iter().map(|p| p.total_sales).collect();
    Table {
        title: "Platform performance detail".into(),
        columns: vec![
            "Platform",
            "Code",
            "Game Count",
            "Total Sales (Millions)",
            "Share (%)",
        ],
        rows: with_shares(
            platforms
                .iter()
                .map(|p| {
                    vec![
                        Cell::Text(p.platform.clone()),
                        Cell::Text(p.code.clone()),
                        Cell::Count(p.game_count),
                        Cell::Sales(p.total_sales),
                    ]
                })
                .collect(),
            &totals,
        ),
    }
}

fn genre_platform(store: &dyn SalesStore, requested: Option<&str>, show_all: bool) -> PageView {
    let mut view = PageView::new(Page::GenrePlatform);
    let Some(rows) = view.rows("genre-platform", store.genre_platform_sales()) else {
        return view;
    };

    // A submitted form with nothing chosen is the same as no choice.
    let requested = requested.map(str::trim).filter(|wanted| !wanted.is_empty());
    let mut options = top_platforms(&rows, SELECTOR_PLATFORMS);
    let selected = requested
        .filter(|wanted| rows.iter().any(|r| r.platform == *wanted))
        .map(str::to_string)
        .or_else(|| options.first().cloned());
    if let Some(platform) = selected.as_ref().filter(|p| !options.contains(p)) {
        options.push(platform.clone());
    }

    if let Some(wanted) = requested.filter(|w| Some(*w) != selected.as_deref()) {
        view.warn(format!(
            "Platform `{wanted}` has no sales; showing {} instead.",
            selected.as_deref().unwrap_or("nothing")
        ));
    }

    view.push(Section::Selector(PlatformSelector {
        options,
        selected: selected.clone(),
        show_all,
    }));

    let (shown, suffix): (Vec<GenrePlatformTotal>, String) = if show_all {
        (rows.clone(), "all platforms".to_string())
    } else {
        let platform = selected.clone().unwrap_or_default();
        (
            rows.iter().filter(|r| r.platform == platform).cloned().collect(),
            platform,
        )
    };
    view.push(Section::Charts(vec![charts::grouped_bar(
        &format!("Genre sales distribution – {suffix}"),
        &shown,
    )]));

    if let Some(platform) = &selected {
        let mut per_genre: Vec<&GenrePlatformTotal> =
            rows.iter().filter(|r| &r.platform == platform).collect();
        per_genre.sort_by(|a, b| {
            b.total_sales
                .total_cmp(&a.total_sales)
                .then(a.genre.cmp(&b.genre))
        });

        let series = Series::new(per_genre.iter().map(|r| (r.genre.as_str(), r.total_sales)));
        if !series.is_empty() {
            view.push(Section::Charts(vec![
                charts::ranked_bar(&format!("Genre ranking on {platform}"), &series, "Purples"),
                charts::donut(&format!("Genre share on {platform}"), &series, 0.4),
            ]));
        }
    }

    let mut by_total = rows.clone();
    by_total.sort_by(|a, b| {
        b.total_sales
            .total_cmp(&a.total_sales)
            .then(a.platform.cmp(&b.platform))
            .then(a.genre.cmp(&b.genre))
    });
    view.push(Section::Table(Table {
        title: "Genre-platform sales detail".into(),
        columns: vec!["Platform", "Genre", "Total Sales (Millions)"],
        rows: by_total
            .iter()
            .map(|r| {
                vec![
                    Cell::Text(r.platform.clone()),
                    Cell::Text(r.genre.clone()),
                    Cell::Sales(r.total_sales),
                ]
            })
            .collect(),
    }));

    let mut insights = Vec::new();
    if let Some(best) = by_total.first() {
        insights.push(Insight::new(
            "Best genre-platform combination",
            format!(
                "{} on {} with {}",
                best.genre,
                best.platform,
                format_millions(best.total_sales)
            ),
        ));
    }
    insights.push(Insight::new(
        "Unique combinations",
        format!("{} combinations", format_count(rows.len() as i64)),
    ));
    if let Some((platform, count)) = most_diverse_platform(&rows) {
        insights.push(Insight::new(
            "Widest genre spread",
            format!("{platform} ({count} genres)"),
        ));
    }
    view.push(Section::Insights(insights));

    view
}

fn publishers(store: &dyn SalesStore, limit: u32) -> PageView {
    let mut view = PageView::new(Page::Publishers);
    let Some(publishers) = view.rows("publisher", store.top_publishers(limit)) else {
        return view;
    };

    let series = Series::new(publishers.iter().map(|p| (p.publisher.as_str(), p.total_sales)))
        .with_hover(
            publishers
                .iter()
                .map(|p| {
                    format!(
                        "{} · {} games",
                        p.country.as_deref().unwrap_or("unknown country"),
                        p.game_count
                    )
                })
                .collect(),
        );
    let game_counts: Vec<f64> = publishers.iter().map(|p| p.game_count as f64).collect();

    view.push(Section::Charts(vec![charts::ranked_bar(
        &format!("Top {} publishers by sales volume", publishers.len()),
        &series,
        "Greens",
    )]));

    let slices: Vec<(String, f64)> = series
        .labels
        .iter()
        .cloned()
        .zip(series.values.iter().copied())
        .collect();
    view.push(Section::Charts(vec![
        charts::bubble(
            "Publisher efficiency: games vs sales",
            &series.labels,
            &game_counts,
            &series.values,
            "Games released",
            "Greens",
        ),
        charts::donut(
            &format!("Market share: top {SHARE_HEAD} vs others"),
            &Series::new(fold_others(&slices, SHARE_HEAD)),
            0.0,
        ),
    ]));

    view.push(Section::Table(publisher_table(&publishers)));

    let summary = summarize(series.values.iter().copied());
    if let (Some(top), Some(summary)) = (publishers.first(), summary) {
        let mut insights = vec![
            Insight::new(
                "Best publisher",
                format!(
                    "{} ({}) with {}",
                    top.publisher,
                    top.country.as_deref().unwrap_or("unknown country"),
                    format_millions(top.total_sales)
                ),
            ),
            Insight::new("Games released", format!("{} games", format_count(top.game_count))),
            Insight::new(
                format!("Top {SHARE_HEAD} combined"),
                format_millions(head_sum(&series.values, SHARE_HEAD)),
            ),
            Insight::new("Mean per publisher", format_millions(summary.mean)),
        ];
        if let Some((name, ratio)) = most_efficient_publisher(&publishers) {
            insights.push(Insight::new(
                "Highest sales per game",
                format!("{name} ({} per game)", format_millions(round2(ratio))),
            ));
        }
        view.push(Section::Insights(insights));
    }

    view
}

fn publisher_table(publishers: &[PublisherTotal]) -> Table {
    let totals: Vec<f64> = publishers.iter().map(|p| p.total_sales).collect();
    Table {
        title: format!("Top {} publishers detail", publishers.len()),
        columns: vec![
            "Rank",
            "Publisher",
            "Country",
            "Game Count",
            "Total Sales (Millions)",
            "Share (%)",
        ],
        rows: with_shares(
            ranked(
                publishers
                    .iter()
                    .map(|p| {
                        vec![
                            Cell::Text(p.publisher.clone()),
                            Cell::Text(p.country.clone().unwrap_or_default()),
                            Cell::Count(p.game_count),
                            Cell::Sales(p.total_sales),
                        ]
                    })
                    .collect(),
            ),
            &totals,
        ),
    }
}
