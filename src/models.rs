//! Row types returned by the query layer.
//!
//! Sales figures are millions of units, carried as `f64` at the precision the
//! database aggregated them with. Rounding is left to the presentation layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_sales: f64,
    pub total_games: i64,
    pub total_publishers: i64,
    pub total_platforms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTotal {
    pub region: String,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopGame {
    pub game: String,
    pub publisher: String,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreTotal {
    pub genre: String,
    pub game_count: i64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformTotal {
    pub platform: String,
    pub code: String,
    pub game_count: i64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenrePlatformTotal {
    pub platform: String,
    pub genre: String,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherTotal {
    pub publisher: String,
    pub country: Option<String>,
    pub game_count: i64,
    pub total_sales: f64,
}

// Catalog listings.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    pub game_id: i32,
    pub game: String,
    pub publisher: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameWithGenres {
    pub game_id: i32,
    pub game: String,
    /// Comma separated, `None` when the game has no genre.
    pub genres: Option<String>,
    pub publisher: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub release_id: i32,
    pub game: String,
    pub platform: String,
    pub platform_code: String,
    pub release_year: Option<i32>,
    pub publisher: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEntry {
    pub sale_id: i32,
    pub game: String,
    pub platform_code: String,
    pub region: String,
    pub sales_in_millions: f64,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub publisher_id: i32,
    pub name: String,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub platform_id: i32,
    pub code: String,
    pub name: String,
    pub manufacturer: Option<String>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}
