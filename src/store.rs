//! Query layer: one parameterized aggregation per analytical question.
//!
//! Every operation is read-only. Aggregations are written as raw SQL with
//! `QueryableByName` row structs; plain listings and counts go through the
//! `schema` DSL.

use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{BigInt, Integer, Nullable, Numeric, Text};
use num_traits::ToPrimitive;

use crate::db::DBPool;
use crate::error::DashboardError;
use crate::metrics::observe_query;
use crate::models::{
    GameEntry, GameWithGenres, Genre, GenrePlatformTotal, GenreTotal, Overview, Platform,
    PlatformTotal, Publisher, PublisherTotal, RegionTotal, ReleaseEntry, SaleEntry, TableCount,
    TopGame,
};
use crate::schema::{
    game_genres, game_releases, games, genres, platforms, publishers, regional_sales, regions,
};

/// Aggregations behind the dashboard pages.
pub trait SalesStore: Send + Sync {
    fn overview(&self) -> Result<Overview, DashboardError>;

    /// Total per region, largest first.
    fn sales_by_region(&self) -> Result<Vec<RegionTotal>, DashboardError>;

    /// At most `limit` games, largest total first.
    fn top_games(&self, limit: u32) -> Result<Vec<TopGame>, DashboardError>;

    fn sales_by_genre(&self) -> Result<Vec<GenreTotal>, DashboardError>;

    fn sales_by_platform(&self) -> Result<Vec<PlatformTotal>, DashboardError>;

    /// Cross tab ordered by platform name, then total descending.
    fn genre_platform_sales(&self) -> Result<Vec<GenrePlatformTotal>, DashboardError>;

    fn top_publishers(&self, limit: u32) -> Result<Vec<PublisherTotal>, DashboardError>;
}

/// Plain listings of the reference tables.
pub trait CatalogStore: Send + Sync {
    fn games(&self) -> Result<Vec<GameEntry>, DashboardError>;
    fn games_with_genres(&self) -> Result<Vec<GameWithGenres>, DashboardError>;
    fn game_releases(&self) -> Result<Vec<ReleaseEntry>, DashboardError>;
    fn regional_sales(&self, limit: u32) -> Result<Vec<SaleEntry>, DashboardError>;
    fn publishers(&self) -> Result<Vec<Publisher>, DashboardError>;
    fn platforms(&self) -> Result<Vec<Platform>, DashboardError>;
    fn genres(&self) -> Result<Vec<Genre>, DashboardError>;
    fn table_counts(&self) -> Result<Vec<TableCount>, DashboardError>;
    fn public_tables(&self) -> Result<Vec<String>, DashboardError>;
}

pub struct PgSalesStore {
    pool: DBPool,
}

type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

impl PgSalesStore {
    pub fn new(pool: DBPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PgPooled, DashboardError> {
        Ok(self.pool.get()?)
    }
}

fn millions(value: Option<BigDecimal>, query: &'static str) -> Result<f64, DashboardError> {
    value
        .and_then(|v| v.to_f64())
        .ok_or(DashboardError::NullAggregate(query))
}

fn limit_param(limit: u32) -> i64 {
    i64::from(limit)
}

#[derive(QueryableByName)]
struct TotalRow {
    #[diesel(sql_type = Nullable<Numeric>)]
    total_sales: Option<BigDecimal>,
}

#[derive(QueryableByName)]
struct RegionRow {
    #[diesel(sql_type = Text)]
    region: String,

    #[diesel(sql_type = Nullable<Numeric>)]
    total_sales: Option<BigDecimal>,
}

#[derive(QueryableByName)]
struct TopGameRow {
    #[diesel(sql_type = Text)]
    game: String,

    #[diesel(sql_type = Text)]
    publisher: String,

    #[diesel(sql_type = Nullable<Numeric>)]
    total_sales: Option<BigDecimal>,
}

#[derive(QueryableByName)]
struct GenreRow {
    #[diesel(sql_type = Text)]
    genre: String,

    #[diesel(sql_type = BigInt)]
    game_count: i64,

    #[diesel(sql_type = Nullable<Numeric>)]
    total_sales: Option<BigDecimal>,
}

#[derive(QueryableByName)]
struct PlatformRow {
    #[diesel(sql_type = Text)]
    platform: String,

    #[diesel(sql_type = Text)]
    code: String,

    #[diesel(sql_type = BigInt)]
    game_count: i64,

    #[diesel(sql_type = Nullable<Numeric>)]
    total_sales: Option<BigDecimal>,
}

#[derive(QueryableByName)]
struct GenrePlatformRow {
    #[diesel(sql_type = Text)]
    platform: String,

    #[diesel(sql_type = Text)]
    genre: String,

    #[diesel(sql_type = Nullable<Numeric>)]
    total_sales: Option<BigDecimal>,
}

#[derive(QueryableByName)]
struct PublisherRow {
    #[diesel(sql_type = Text)]
    publisher: String,

    #[diesel(sql_type = Nullable<Text>)]
    country: Option<String>,

    #[diesel(sql_type = BigInt)]
    game_count: i64,

    #[diesel(sql_type = Nullable<Numeric>)]
    total_sales: Option<BigDecimal>,
}

// Cast so a `double precision` sales column still decodes as Numeric.
const OVERVIEW_TOTAL: &str = r#"
    SELECT SUM(sales_in_millions)::numeric AS total_sales
    FROM regional_sales
"#;

const SALES_BY_REGION: &str = r#"
    SELECT
        r.region_name AS region,
        SUM(rs.sales_in_millions)::numeric AS total_sales
    FROM regional_sales rs
    JOIN regions r ON rs.region_id = r.region_id
    GROUP BY r.region_id, r.region_name
    ORDER BY total_sales DESC, r.region_name ASC, r.region_id ASC
"#;

const TOP_GAMES: &str = r#"
    SELECT
        g.game_name AS game,
        p.publisher_name AS publisher,
        SUM(rs.sales_in_millions)::numeric AS total_sales
    FROM regional_sales rs
    JOIN game_releases gr ON rs.game_release_id = gr.game_release_id
    JOIN games g ON gr.game_id = g.game_id
    JOIN publishers p ON g.publisher_id = p.publisher_id
    GROUP BY g.game_id, g.game_name, p.publisher_id, p.publisher_name
    ORDER BY total_sales DESC, g.game_name ASC, g.game_id ASC
    LIMIT $1
"#;

const SALES_BY_GENRE: &str = r#"
    SELECT
        ge.genre_name AS genre,
        COUNT(DISTINCT g.game_id) AS game_count,
        SUM(rs.sales_in_millions)::numeric AS total_sales
    FROM regional_sales rs
    JOIN game_releases gr ON rs.game_release_id = gr.game_release_id
    JOIN games g ON gr.game_id = g.game_id
    JOIN game_genres gg ON g.game_id = gg.game_id
    JOIN genres ge ON gg.genre_id = ge.genre_id
    GROUP BY ge.genre_id, ge.genre_name
    ORDER BY total_sales DESC, ge.genre_name ASC, ge.genre_id ASC
"#;

const SALES_BY_PLATFORM: &str = r#"
    SELECT
        pl.platform_name AS platform,
        pl.platform_code AS code,
        COUNT(DISTINCT gr.game_id) AS game_count,
        SUM(rs.sales_in_millions)::numeric AS total_sales
    FROM regional_sales rs
    JOIN game_releases gr ON rs.game_release_id = gr.game_release_id
    JOIN platforms pl ON gr.platform_id = pl.platform_id
    GROUP BY pl.platform_id, pl.platform_name, pl.platform_code
    ORDER BY total_sales DESC, pl.platform_name ASC, pl.platform_id ASC
"#;

const GENRE_PLATFORM_SALES: &str = r#"
    SELECT
        pl.platform_name AS platform,
        ge.genre_name AS genre,
        SUM(rs.sales_in_millions)::numeric AS total_sales
    FROM regional_sales rs
    JOIN game_releases gr ON rs.game_release_id = gr.game_release_id
    JOIN games g ON gr.game_id = g.game_id
    JOIN platforms pl ON gr.platform_id = pl.platform_id
    JOIN game_genres gg ON g.game_id = gg.game_id
    JOIN genres ge ON gg.genre_id = ge.genre_id
    GROUP BY pl.platform_id, pl.platform_name, ge.genre_id, ge.genre_name
    ORDER BY pl.platform_name ASC, total_sales DESC, ge.genre_name ASC
"#;

const TOP_PUBLISHERS: &str = r#"
    SELECT
        p.publisher_name AS publisher,
        p.country AS country,
        COUNT(DISTINCT g.game_id) AS game_count,
        SUM(rs.sales_in_millions)::numeric AS total_sales
    FROM regional_sales rs
    JOIN game_releases gr ON rs.game_release_id = gr.game_release_id
    JOIN games g ON gr.game_id = g.game_id
    JOIN publishers p ON g.publisher_id = p.publisher_id
    GROUP BY p.publisher_id, p.publisher_name, p.country
    ORDER BY total_sales DESC, p.publisher_name ASC, p.publisher_id ASC
    LIMIT $1
"#;

impl SalesStore for PgSalesStore {
    fn overview(&self) -> Result<Overview, DashboardError> {
        observe_query("overview", || {
            let conn = &mut self.conn()?;

            let total = diesel::sql_query(OVERVIEW_TOTAL).get_result::<TotalRow>(conn)?;

            Ok(Overview {
                // An empty sales table is a legitimate zero, not a failure.
                total_sales: total.total_sales.and_then(|t| t.to_f64()).unwrap_or(0.0),
                total_games: games::table.count().get_result(conn)?,
                total_publishers: publishers::table.count().get_result(conn)?,
                total_platforms: platforms::table.count().get_result(conn)?,
            })
        })
    }

    fn sales_by_region(&self) -> Result<Vec<RegionTotal>, DashboardError> {
        observe_query("sales_by_region", || {
            let conn = &mut self.conn()?;
            diesel::sql_query(SALES_BY_REGION)
                .load::<RegionRow>(conn)?
                .into_iter()
                .map(|row| {
                    Ok(RegionTotal {
                        region: row.region,
                        total_sales: millions(row.total_sales, "sales_by_region")?,
                    })
                })
                .collect()
        })
    }

    fn top_games(&self, limit: u32) -> Result<Vec<TopGame>, DashboardError> {
        observe_query("top_games", || {
            let conn = &mut self.conn()?;
            diesel::sql_query(TOP_GAMES)
                .bind::<BigInt, _>(limit_param(limit))
                .load::<TopGameRow>(conn)?
                .into_iter()
                .map(|row| {
                    Ok(TopGame {
                        game: row.game,
                        publisher: row.publisher,
                        total_sales: millions(row.total_sales, "top_games")?,
                    })
                })
                .collect()
        })
    }

    fn sales_by_genre(&self) -> Result<Vec<GenreTotal>, DashboardError> {
        observe_query("sales_by_genre", || {
            let conn = &mut self.conn()?;
            diesel::sql_query(SALES_BY_GENRE)
                .load::<GenreRow>(conn)?
                .into_iter()
                .map(|row| {
                    Ok(GenreTotal {
                        genre: row.genre,
                        game_count: row.game_count,
                        total_sales: millions(row.total_sales, "sales_by_genre")?,
                    })
                })
                .collect()
        })
    }

    fn sales_by_platform(&self) -> Result<Vec<PlatformTotal>, DashboardError> {
        observe_query("sales_by_platform", || {
            let conn = &mut self.conn()?;
            diesel::sql_query(SALES_BY_PLATFORM)
                .load::<PlatformRow>(conn)?
                .into_iter()
                .map(|row| {
                    Ok(PlatformTotal {
                        platform: row.platform,
                        code: row.code,
                        game_count: row.game_count,
                        total_sales: millions(row.total_sales, "sales_by_platform")?,
                    })
                })
                .collect()
        })
    }

    fn genre_platform_sales(&self) -> Result<Vec<GenrePlatformTotal>, DashboardError> {
        observe_query("genre_platform_sales", || {
            let conn = &mut self.conn()?;
            diesel::sql_query(GENRE_PLATFORM_SALES)
                .load::<GenrePlatformRow>(conn)?
                .into_iter()
                .map(|row| {
                    Ok(GenrePlatformTotal {
                        platform: row.platform,
                        genre: row.genre,
                        total_sales: millions(row.total_sales, "genre_platform_sales")?,
                    })
                })
                .collect()
        })
    }

    fn top_publishers(&self, limit: u32) -> Result<Vec<PublisherTotal>, DashboardError> {
        observe_query("top_publishers", || {
            let conn = &mut self.conn()?;
            diesel::sql_query(TOP_PUBLISHERS)
                .bind::<BigInt, _>(limit_param(limit))
                .load::<PublisherRow>(conn)?
                .into_iter()
                .map(|row| {
                    Ok(PublisherTotal {
                        publisher: row.publisher,
                        country: row.country,
                        game_count: row.game_count,
                        total_sales: millions(row.total_sales, "top_publishers")?,
                    })
                })
                .collect()
        })
    }
}

#[derive(QueryableByName)]
struct GameWithGenresRow {
    #[diesel(sql_type = Integer)]
    game_id: i32,

    #[diesel(sql_type = Text)]
    game: String,

    #[diesel(sql_type = Nullable<Text>)]
    genres: Option<String>,

    #[diesel(sql_type = Text)]
    publisher: String,
}

#[derive(QueryableByName)]
struct SaleRow {
    #[diesel(sql_type = Integer)]
    sale_id: i32,

    #[diesel(sql_type = Text)]
    game: String,

    #[diesel(sql_type = Text)]
    platform_code: String,

    #[diesel(sql_type = Text)]
    region: String,

    #[diesel(sql_type = Numeric)]
    sales_in_millions: BigDecimal,

    #[diesel(sql_type = Nullable<Integer>)]
    release_year: Option<i32>,
}

#[derive(QueryableByName)]
struct TableNameRow {
    #[diesel(sql_type = Text)]
    table_name: String,
}

const GAMES_WITH_GENRES: &str = r#"
    SELECT
        g.game_id AS game_id,
        g.game_name AS game,
        STRING_AGG(ge.genre_name, ', ' ORDER BY ge.genre_name) AS genres,
        p.publisher_name AS publisher
    FROM games g
    JOIN publishers p ON g.publisher_id = p.publisher_id
    LEFT JOIN game_genres gg ON g.game_id = gg.game_id
    LEFT JOIN genres ge ON gg.genre_id = ge.genre_id
    GROUP BY g.game_id, g.game_name, p.publisher_name
    ORDER BY g.game_name ASC, g.game_id ASC
"#;

const REGIONAL_SALES: &str = r#"
    SELECT
        rs.sale_id AS sale_id,
        g.game_name AS game,
        pl.platform_code AS platform_code,
        r.region_name AS region,
        rs.sales_in_millions::numeric AS sales_in_millions,
        gr.release_year AS release_year
    FROM regional_sales rs
    JOIN game_releases gr ON rs.game_release_id = gr.game_release_id
    JOIN games g ON gr.game_id = g.game_id
    JOIN platforms pl ON gr.platform_id = pl.platform_id
    JOIN regions r ON rs.region_id = r.region_id
    ORDER BY rs.sales_in_millions DESC, rs.sale_id ASC
    LIMIT $1
"#;

const PUBLIC_TABLES: &str = r#"
    SELECT table_name::text AS table_name
    FROM information_schema.tables
    WHERE table_schema = 'public'
    ORDER BY table_name ASC
"#;

impl CatalogStore for PgSalesStore {
    fn games(&self) -> Result<Vec<GameEntry>, DashboardError> {
        observe_query("catalog_games", || {
            let conn = &mut self.conn()?;
            let rows = games::table
                .inner_join(publishers::table)
                .select((games::game_id, games::game_name, publishers::publisher_name))
                .order((games::game_name.asc(), games::game_id.asc()))
                .load::<(i32, String, String)>(conn)?;

            Ok(rows
                .into_iter()
                .map(|(game_id, game, publisher)| GameEntry { game_id, game, publisher })
                .collect())
        })
    }

    fn games_with_genres(&self) -> Result<Vec<GameWithGenres>, DashboardError> {
        observe_query("catalog_games_with_genres", || {
            let conn = &mut self.conn()?;
            let rows = diesel::sql_query(GAMES_WITH_GENRES).load::<GameWithGenresRow>(conn)?;

            Ok(rows
                .into_iter()
                .map(|row| GameWithGenres {
                    game_id: row.game_id,
                    game: row.game,
                    genres: row.genres,
                    publisher: row.publisher,
                })
                .collect())
        })
    }

    fn game_releases(&self) -> Result<Vec<ReleaseEntry>, DashboardError> {
        observe_query("catalog_game_releases", || {
            let conn = &mut self.conn()?;
            let rows = game_releases::table
                .inner_join(games::table.inner_join(publishers::table))
                .inner_join(platforms::table)
                .select((
                    game_releases::game_release_id,
                    games::game_name,
                    platforms::platform_name,
                    platforms::platform_code,
                    game_releases::release_year,
                    publishers::publisher_name,
                ))
                .order((game_releases::release_year.desc(), games::game_name.asc()))
                .load::<(i32, String, String, String, Option<i32>, String)>(conn)?;

            Ok(rows
                .into_iter()
                .map(
                    |(release_id, game, platform, platform_code, release_year, publisher)| {
                        ReleaseEntry {
                            release_id,
                            game,
                            platform,
                            platform_code,
                            release_year,
                            publisher,
                        }
                    },
                )
                .collect())
        })
    }

    fn regional_sales(&self, limit: u32) -> Result<Vec<SaleEntry>, DashboardError> {
        observe_query("catalog_regional_sales", || {
            let conn = &mut self.conn()?;
            diesel::sql_query(REGIONAL_SALES)
                .bind::<BigInt, _>(limit_param(limit))
                .load::<SaleRow>(conn)?
                .into_iter()
                .map(|row| {
                    Ok(SaleEntry {
                        sale_id: row.sale_id,
                        game: row.game,
                        platform_code: row.platform_code,
                        region: row.region,
                        sales_in_millions: millions(
                            Some(row.sales_in_millions),
                            "catalog_regional_sales",
                        )?,
                        release_year: row.release_year,
                    })
                })
                .collect()
        })
    }

    fn publishers(&self) -> Result<Vec<Publisher>, DashboardError> {
        observe_query("catalog_publishers", || {
            let conn = &mut self.conn()?;
            let rows = publishers::table
                .select((
                    publishers::publisher_id,
                    publishers::publisher_name,
                    publishers::country,
                    publishers::founded_year,
                ))
                .order(publishers::publisher_name.asc())
                .load::<(i32, String, Option<String>, Option<i32>)>(conn)?;

            Ok(rows
                .into_iter()
                .map(|(publisher_id, name, country, founded_year)| Publisher {
                    publisher_id,
                    name,
                    country,
                    founded_year,
                })
                .collect())
        })
    }

    fn platforms(&self) -> Result<Vec<Platform>, DashboardError> {
        observe_query("catalog_platforms", || {
            let conn = &mut self.conn()?;
            let rows = platforms::table
                .select((
                    platforms::platform_id,
                    platforms::platform_code,
                    platforms::platform_name,
                    platforms::manufacturer,
                    platforms::release_year,
                ))
                .order(platforms::platform_name.asc())
                .load::<(i32, String, String, Option<String>, Option<i32>)>(conn)?;

            Ok(rows
                .into_iter()
                .map(
                    |(platform_id, code, name, manufacturer, release_year)| Platform {
                        platform_id,
                        code,
                        name,
                        manufacturer,
                        release_year,
                    },
                )
                .collect())
        })
    }

    fn genres(&self) -> Result<Vec<Genre>, DashboardError> {
        observe_query("catalog_genres", || {
            let conn = &mut self.conn()?;
            let rows = genres::table
                .select((genres::genre_id, genres::genre_name, genres::description))
                .order(genres::genre_name.asc())
                .load::<(i32, String, Option<String>)>(conn)?;

            Ok(rows
                .into_iter()
                .map(|(genre_id, name, description)| Genre {
                    genre_id,
                    name,
                    description,
                })
                .collect())
        })
    }

    fn table_counts(&self) -> Result<Vec<TableCount>, DashboardError> {
        observe_query("table_counts", || {
            let conn = &mut self.conn()?;
            let counts = [
                ("games", games::table.count().get_result::<i64>(conn)?),
                ("publishers", publishers::table.count().get_result::<i64>(conn)?),
                ("platforms", platforms::table.count().get_result::<i64>(conn)?),
                ("genres", genres::table.count().get_result::<i64>(conn)?),
                ("game_genres", game_genres::table.count().get_result::<i64>(conn)?),
                ("game_releases", game_releases::table.count().get_result::<i64>(conn)?),
                ("regions", regions::table.count().get_result::<i64>(conn)?),
                ("regional_sales", regional_sales::table.count().get_result::<i64>(conn)?),
            ];

            Ok(counts
                .into_iter()
                .map(|(table, rows)| TableCount {
                    table: table.to_string(),
                    rows,
                })
                .collect())
        })
    }

    fn public_tables(&self) -> Result<Vec<String>, DashboardError> {
        observe_query("public_tables", || {
            let conn = &mut self.conn()?;
            let rows = diesel::sql_query(PUBLIC_TABLES).load::<TableNameRow>(conn)?;
            Ok(rows.into_iter().map(|row| row.table_name).collect())
        })
    }
}
