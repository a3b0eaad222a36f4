use std::sync::Arc;

use actix_cors::Cors;
use actix_web::web::{self, Data, Path, Query};
use actix_web::{HttpResponse, get};
use chrono::Utc;
use log::{debug, warn};
use serde::Serialize;
use serde_json::json;

use crate::constants::{DEFAULT_TOP_LIMIT, TEXT_HTML};
use crate::error::DashboardError;
use crate::metrics::metrics_endpoint;
use crate::pages::{self, Page, PageParams};
use crate::render::{escape, render_page};
use crate::store::{CatalogStore, SalesStore};

/// Sample size of the raw regional sales listing when no `limit` is given.
const CATALOG_SALES_LIMIT: u32 = 100;

/// Shared application state. Aggregations may sit behind a memo layer,
/// catalog listings always hit the store.
#[derive(Clone)]
pub struct AppState {
    pub sales: Arc<dyn SalesStore>,
    pub catalog: Arc<dyn CatalogStore>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(dashboard_page)
        .service(health)
        .service(metrics_endpoint)
        .service(
            web::scope("/api")
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allowed_methods(vec!["GET"])
                        .max_age(3600),
                )
                .service(overview)
                .service(regions)
                .service(top_games)
                .service(genres)
                .service(platforms)
                .service(genre_platform)
                .service(publishers)
                .service(catalog),
        );
}

fn html_page(state: &AppState, page: Page, params: &PageParams) -> HttpResponse {
    let view = pages::build(page, state.sales.as_ref(), params);
    for warning in view.warnings() {
        debug!("Page {page}: {warning}");
    }

    HttpResponse::Ok()
        .content_type(TEXT_HTML)
        .body(render_page(&view, Utc::now()))
}

#[get("/")]
pub async fn index(
    state: Data<AppState>,
    params: Query<PageParams>,
) -> Result<HttpResponse, DashboardError> {
    params.validate()?;
    Ok(html_page(&state, Page::Overview, &params))
}

#[get("/pages/{slug}")]
pub async fn dashboard_page(
    state: Data<AppState>,
    slug: Path<String>,
    params: Query<PageParams>,
) -> Result<HttpResponse, DashboardError> {
    let Ok(page) = slug.parse::<Page>() else {
        warn!("Unknown page requested: {slug}");
        return Ok(HttpResponse::NotFound().content_type(TEXT_HTML).body(format!(
            "<h1>Page not found</h1><p>No page named `{}`. <a href=\"/\">Back to overview</a></p>",
            escape(&slug)
        )));
    };

    params.validate()?;
    Ok(html_page(&state, page, &params))
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

fn limit_of(params: &PageParams, default: u32) -> Result<u32, DashboardError> {
    params.validate()?;
    Ok(params.limit.unwrap_or(default))
}

#[get("/overview")]
pub async fn overview(state: Data<AppState>) -> Result<HttpResponse, DashboardError> {
    Ok(HttpResponse::Ok().json(state.sales.overview()?))
}

#[get("/regions")]
pub async fn regions(state: Data<AppState>) -> Result<HttpResponse, DashboardError> {
    Ok(HttpResponse::Ok().json(state.sales.sales_by_region()?))
}

#[get("/top-games")]
pub async fn top_games(
    state: Data<AppState>,
    params: Query<PageParams>,
) -> Result<HttpResponse, DashboardError> {
    let limit = limit_of(&params, DEFAULT_TOP_LIMIT)?;
    Ok(HttpResponse::Ok().json(state.sales.top_games(limit)?))
}

#[get("/genres")]
pub async fn genres(state: Data<AppState>) -> Result<HttpResponse, DashboardError> {
    Ok(HttpResponse::Ok().json(state.sales.sales_by_genre()?))
}

#[get("/platforms")]
pub async fn platforms(state: Data<AppState>) -> Result<HttpResponse, DashboardError> {
    Ok(HttpResponse::Ok().json(state.sales.sales_by_platform()?))
}

#[get("/genre-platform")]
pub async fn genre_platform(state: Data<AppState>) -> Result<HttpResponse, DashboardError> {
    Ok(HttpResponse::Ok().json(state.sales.genre_platform_sales()?))
}

#[get("/publishers")]
pub async fn publishers(
    state: Data<AppState>,
    params: Query<PageParams>,
) -> Result<HttpResponse, DashboardError> {
    let limit = limit_of(&params, DEFAULT_TOP_LIMIT)?;
    Ok(HttpResponse::Ok().json(state.sales.top_publishers(limit)?))
}

fn listing<T: Serialize>(
    rows: Result<Vec<T>, DashboardError>,
) -> Result<HttpResponse, DashboardError> {
    Ok(HttpResponse::Ok().json(rows?))
}

#[get("/catalog/{table}")]
pub async fn catalog(
    state: Data<AppState>,
    table: Path<String>,
    params: Query<PageParams>,
) -> Result<HttpResponse, DashboardError> {
    let store = state.catalog.as_ref();
    match table.as_str() {
        "games" => listing(store.games()),
        "games-with-genres" => listing(store.games_with_genres()),
        "releases" => listing(store.game_releases()),
        "regional-sales" => {
            let limit = limit_of(&params, CATALOG_SALES_LIMIT)?;
            listing(store.regional_sales(limit))
        }
        "publishers" => listing(store.publishers()),
        "platforms" => listing(store.platforms()),
        "genres" => listing(store.genres()),
        "counts" => listing(store.table_counts()),
        "tables" => listing(store.public_tables()),
        other => Err(DashboardError::BadRequest(format!(
            "unknown catalog table `{other}`"
        ))),
    }
}
