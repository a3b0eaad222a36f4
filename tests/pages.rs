mod support;

use chrono::Utc;
use rstest::rstest;

use game_sales_dashboard::charts::ChartKind;
use game_sales_dashboard::pages::{self, Cell, Page, PageParams, Section};
use game_sales_dashboard::render::render_page;

use support::{Dataset, FailingStore, InMemoryStore};

fn params() -> PageParams {
    PageParams::default()
}

#[rstest]
#[case(Page::Overview)]
#[case(Page::Regional)]
#[case(Page::TopGames)]
#[case(Page::Genres)]
#[case(Page::Platforms)]
#[case(Page::GenrePlatform)]
#[case(Page::Publishers)]
fn empty_results_warn_instead_of_charting(#[case] page: Page) {
    let store = InMemoryStore::new(Dataset::empty());
    let view = pages::build(page, &store, &params());

    assert!(view.warnings().any(|w| w.starts_with("No ")));
    assert_eq!(view.charts().count(), 0);

    let html = render_page(&view, Utc::now());
    assert!(html.contains("class=\"warning\""));
    assert!(!html.contains("Plotly.newPlot"));
}

#[rstest]
#[case(Page::Overview)]
#[case(Page::Regional)]
#[case(Page::TopGames)]
#[case(Page::Genres)]
#[case(Page::Platforms)]
#[case(Page::GenrePlatform)]
#[case(Page::Publishers)]
fn query_failures_become_warnings(#[case] page: Page) {
    let view = pages::build(page, &FailingStore, &params());

    assert!(view.warnings().any(|w| w.starts_with("Could not load")));
    assert_eq!(view.charts().count(), 0);
    assert_eq!(view.tables().count(), 0);
}

#[test]
fn regional_page_orders_regions_and_shares_sum_to_one_hundred() {
    let store = InMemoryStore::new(Dataset::regional_example());
    let view = pages::build(Page::Regional, &store, &params());

    assert_eq!(view.warnings().count(), 0);
    assert_eq!(view.charts().count(), 3);

    let table = view.tables().next().unwrap();
    let regions: Vec<&Cell> = table.rows.iter().map(|r| &r[0]).collect();
    assert_eq!(
        regions,
        vec![
            &Cell::Text("North America".into()),
            &Cell::Text("Europe".into()),
            &Cell::Text("Japan".into()),
        ]
    );

    let shares: Vec<f64> = table
        .rows
        .iter()
        .filter_map(|r| match r.last() {
            Some(Cell::Percent(p)) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(shares, vec![57.14, 28.57, 14.29]);
    let hundredths: i64 = shares.iter().map(|s| (s * 100.0).round() as i64).sum();
    assert_eq!(hundredths, 10_000);
}

#[test]
fn top_games_page_honours_limit_and_ranks_from_one() {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(
        Page::TopGames,
        &store,
        &PageParams {
            limit: Some(2),
            ..Default::default()
        },
    );

    let table = view.tables().next().unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0], Cell::Count(1));
    assert_eq!(table.rows[0][1], Cell::Text("Wii Sports".into()));
    assert_eq!(table.rows[1][1], Cell::Text("Grand Theft Auto V".into()));
}

#[test]
fn overview_shows_metric_cards() {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(Page::Overview, &store, &params());

    let metrics = view
        .sections
        .iter()
        .find_map(|s| match s {
            Section::Metrics(m) => Some(m),
            _ => None,
        })
        .unwrap();
    let labels: Vec<&str> = metrics.iter().map(|m| m.label).collect();
    assert_eq!(labels, vec!["Global sales", "Games", "Publishers", "Platforms"]);
    assert_eq!(metrics[1].value, "5");
    assert_eq!(view.tables().count(), 2);
}

// Rankings draw as bars, shares as donuts/pies/treemaps, two measures as
// bubbles and the platform × genre cross-tab as grouped bars.
#[rstest]
#[case(Page::Overview, vec![])]
#[case(Page::Regional, vec![ChartKind::Bar, ChartKind::Donut, ChartKind::Sunburst])]
#[case(Page::TopGames, vec![ChartKind::Lollipop, ChartKind::Bar])]
#[case(Page::Genres, vec![ChartKind::Donut, ChartKind::Treemap, ChartKind::Bar])]
#[case(Page::Platforms, vec![ChartKind::Bar, ChartKind::Bubble])]
#[case(
    Page::GenrePlatform,
    vec![ChartKind::GroupedBar, ChartKind::Bar, ChartKind::Donut]
)]
#[case(Page::Publishers, vec![ChartKind::Bar, ChartKind::Bubble, ChartKind::Pie])]
fn each_page_draws_encodings_matching_its_data(
    #[case] page: Page,
    #[case] expected: Vec<ChartKind>,
) {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(page, &store, &params());

    let kinds: Vec<ChartKind> = view.charts().map(|c| c.kind).collect();
    assert_eq!(kinds, expected);
}

fn selected_platform(view: &pages::PageView) -> Option<String> {
    view.sections.iter().find_map(|s| match s {
        Section::Selector(selector) => selector.selected.clone(),
        _ => None,
    })
}

#[test]
fn genre_platform_defaults_to_best_selling_platform() {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(Page::GenrePlatform, &store, &params());

    assert_eq!(selected_platform(&view).as_deref(), Some("Nintendo Wii"));
    assert_eq!(view.warnings().count(), 0);
}

#[test]
fn genre_platform_follows_requested_platform() {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(
        Page::GenrePlatform,
        &store,
        &PageParams {
            platform: Some("PlayStation 4".into()),
            ..Default::default()
        },
    );

    assert_eq!(selected_platform(&view).as_deref(), Some("PlayStation 4"));
    assert!(
        view.charts()
            .any(|c| c.title == "Genre ranking on PlayStation 4")
    );
}

#[test]
fn unknown_platform_falls_back_with_a_warning() {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(
        Page::GenrePlatform,
        &store,
        &PageParams {
            platform: Some("Dreamcast".into()),
            ..Default::default()
        },
    );

    assert_eq!(selected_platform(&view).as_deref(), Some("Nintendo Wii"));
    assert!(view.warnings().any(|w| w.contains("Dreamcast")));
}

#[test]
fn platform_outside_the_top_ten_stays_selectable() {
    let store = InMemoryStore::new(Dataset::many_platforms(12));
    let view = pages::build(
        Page::GenrePlatform,
        &store,
        &PageParams {
            platform: Some("Console 12".into()),
            ..Default::default()
        },
    );

    let selector = view
        .sections
        .iter()
        .find_map(|s| match s {
            Section::Selector(selector) => Some(selector),
            _ => None,
        })
        .unwrap();
    assert_eq!(selector.options.len(), 11);
    assert_eq!(selector.options[0], "Console 1");
    assert_eq!(selector.options.last().map(String::as_str), Some("Console 12"));
    assert_eq!(selector.selected.as_deref(), Some("Console 12"));
    assert_eq!(view.warnings().count(), 0);

    let html = render_page(&view, Utc::now());
    assert!(html.contains("<option value=\"Console 12\" selected>"));
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_platform_is_treated_as_no_choice(#[case] platform: &str) {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(
        Page::GenrePlatform,
        &store,
        &PageParams {
            platform: Some(platform.into()),
            ..Default::default()
        },
    );

    assert_eq!(selected_platform(&view).as_deref(), Some("Nintendo Wii"));
    assert_eq!(view.warnings().count(), 0);
}

#[test]
fn publisher_page_folds_tail_into_others() {
    let store = InMemoryStore::new(Dataset::sample());
    let view = pages::build(Page::Publishers, &store, &params());

    let table = view.tables().next().unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0][1], Cell::Text("Nintendo".into()));
    // Three publishers fit under the head, so no "Others" slice.
    let pie = view
        .charts()
        .find(|c| c.title.starts_with("Market share"))
        .unwrap();
    assert!(!pie.figure.to_string().contains("Others"));
}
