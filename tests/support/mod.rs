#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use game_sales_dashboard::error::DashboardError;
use game_sales_dashboard::models::{
    GameEntry, GameWithGenres, Genre, GenrePlatformTotal, GenreTotal, Overview, Platform,
    PlatformTotal, Publisher, PublisherTotal, RegionTotal, ReleaseEntry, SaleEntry, TableCount,
    TopGame,
};
use game_sales_dashboard::routes::AppState;
use game_sales_dashboard::store::{CatalogStore, SalesStore};

/// Raw rows of the eight tables. Aggregations are computed the way the SQL
/// joins them: only sales rows reachable through every join count.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub publishers: Vec<Publisher>,
    pub platforms: Vec<Platform>,
    pub genres: Vec<Genre>,
    /// (game_id, name, publisher_id)
    pub games: Vec<(i32, String, i32)>,
    /// (game_id, genre_id)
    pub game_genres: Vec<(i32, i32)>,
    /// (release_id, game_id, platform_id, release_year)
    pub releases: Vec<(i32, i32, i32, Option<i32>)>,
    /// (region_id, name)
    pub regions: Vec<(i32, String)>,
    /// (sale_id, release_id, region_id, millions)
    pub sales: Vec<(i32, i32, i32, f64)>,
}

fn publisher(id: i32, name: &str, country: &str) -> Publisher {
    Publisher {
        publisher_id: id,
        name: name.into(),
        country: Some(country.into()),
        founded_year: None,
    }
}

fn platform(id: i32, code: &str, name: &str) -> Platform {
    Platform {
        platform_id: id,
        code: code.into(),
        name: name.into(),
        manufacturer: None,
        release_year: None,
    }
}

fn genre(id: i32, name: &str) -> Genre {
    Genre {
        genre_id: id,
        name: name.into(),
        description: None,
    }
}

impl Dataset {
    /// Small catalogue with a multi-genre game, a tie in total sales and a
    /// game that never sold.
    pub fn sample() -> Self {
        Self {
            publishers: vec![
                publisher(1, "Nintendo", "Japan"),
                publisher(2, "Rockstar Games", "USA"),
                publisher(3, "Ubisoft", "France"),
            ],
            platforms: vec![
                platform(1, "Wii", "Nintendo Wii"),
                platform(2, "PS4", "PlayStation 4"),
                platform(3, "PC", "Personal Computer"),
            ],
            genres: vec![genre(1, "Sports"), genre(2, "Action"), genre(3, "Adventure")],
            games: vec![
                (1, "Wii Sports".into(), 1),
                (2, "Grand Theft Auto V".into(), 2),
                (3, "Assassin's Creed".into(), 3),
                (4, "Anno".into(), 3),
                (5, "Unreleased".into(), 3),
            ],
            game_genres: vec![(1, 1), (2, 2), (2, 3), (3, 2), (4, 3), (5, 2)],
            releases: vec![
                (1, 1, 1, Some(2006)),
                (2, 2, 2, Some(2014)),
                (3, 2, 3, Some(2015)),
                (4, 3, 2, Some(2014)),
                (5, 4, 3, Some(2019)),
                (6, 5, 3, None),
            ],
            regions: vec![
                (1, "North America".into()),
                (2, "Europe".into()),
                (3, "Japan".into()),
            ],
            sales: vec![
                (1, 1, 1, 41.49),
                (2, 1, 2, 29.02),
                (3, 1, 3, 3.77),
                (4, 2, 1, 6.06),
                (5, 2, 2, 9.71),
                (6, 3, 2, 1.5),
                (7, 4, 1, 3.0),
                (8, 4, 2, 2.0),
                (9, 5, 2, 5.0),
            ],
        }
    }

    /// Three regions totalling 20, 10 and 5 million.
    pub fn regional_example() -> Self {
        Self {
            publishers: vec![publisher(1, "Nintendo", "Japan")],
            platforms: vec![platform(1, "Wii", "Nintendo Wii")],
            genres: vec![genre(1, "Sports")],
            games: vec![(1, "Wii Sports".into(), 1)],
            game_genres: vec![(1, 1)],
            releases: vec![(1, 1, 1, Some(2006))],
            regions: vec![
                (1, "Europe".into()),
                (2, "North America".into()),
                (3, "Japan".into()),
            ],
            sales: vec![(1, 1, 1, 10.0), (2, 1, 2, 20.0), (3, 1, 3, 5.0)],
        }
    }

    /// `count` platforms named "Console 1".."Console N", each with one
    /// Action release, selling `count`, `count - 1`, ... 1 million.
    pub fn many_platforms(count: i32) -> Self {
        Self {
            publishers: vec![publisher(1, "Sega", "Japan")],
            platforms: (1..=count)
                .map(|id| platform(id, &format!("C{id}"), &format!("Console {id}")))
                .collect(),
            genres: vec![genre(1, "Action")],
            games: vec![(1, "Sonic".into(), 1)],
            game_genres: vec![(1, 1)],
            releases: (1..=count).map(|id| (id, 1, id, Some(1991))).collect(),
            regions: vec![(1, "Europe".into())],
            sales: (1..=count)
                .map(|id| (id, id, 1, f64::from(count - id + 1)))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn grand_total(&self) -> f64 {
        self.joined().iter().map(|s| s.millions).sum()
    }

    fn publisher_of(&self, game_id: i32) -> Option<&Publisher> {
        let (_, _, publisher_id) = self.games.iter().find(|g| g.0 == game_id)?;
        self.publishers.iter().find(|p| p.publisher_id == *publisher_id)
    }

    fn genres_of(&self, game_id: i32) -> Vec<&Genre> {
        self.game_genres
            .iter()
            .filter(|(g, _)| *g == game_id)
            .filter_map(|(_, genre_id)| self.genres.iter().find(|ge| ge.genre_id == *genre_id))
            .collect()
    }

    /// Sales rows with every foreign key resolved.
    fn joined(&self) -> Vec<JoinedSale<'_>> {
        self.sales
            .iter()
            .filter_map(|&(sale_id, release_id, region_id, millions)| {
                let release = self.releases.iter().find(|r| r.0 == release_id)?;
                let game = self.games.iter().find(|g| g.0 == release.1)?;
                Some(JoinedSale {
                    sale_id,
                    game_id: game.0,
                    game: &game.1,
                    publisher: self.publisher_of(game.0)?,
                    platform: self.platforms.iter().find(|p| p.platform_id == release.2)?,
                    region: self.regions.iter().find(|r| r.0 == region_id)?,
                    release_year: release.3,
                    millions,
                })
            })
            .collect()
    }
}

struct JoinedSale<'a> {
    sale_id: i32,
    game_id: i32,
    game: &'a str,
    publisher: &'a Publisher,
    platform: &'a Platform,
    region: &'a (i32, String),
    release_year: Option<i32>,
    millions: f64,
}

fn by_total_then_name<T>(
    rows: &mut [T],
    total: impl Fn(&T) -> f64,
    name: impl Fn(&T) -> &str,
) {
    rows.sort_by(|a, b| {
        total(b)
            .total_cmp(&total(a))
            .then_with(|| name(a).cmp(name(b)))
    });
}

pub struct InMemoryStore {
    pub data: Dataset,
}

impl InMemoryStore {
    pub fn new(data: Dataset) -> Self {
        Self { data }
    }
}

impl SalesStore for InMemoryStore {
    fn overview(&self) -> Result<Overview, DashboardError> {
        Ok(Overview {
            total_sales: self.data.grand_total(),
            total_games: self.data.games.len() as i64,
            total_publishers: self.data.publishers.len() as i64,
            total_platforms: self.data.platforms.len() as i64,
        })
    }

    fn sales_by_region(&self) -> Result<Vec<RegionTotal>, DashboardError> {
        let mut totals: BTreeMap<i32, RegionTotal> = BTreeMap::new();
        for sale in self.data.joined() {
            totals
                .entry(sale.region.0)
                .or_insert_with(|| RegionTotal {
                    region: sale.region.1.clone(),
                    total_sales: 0.0,
                })
                .total_sales += sale.millions;
        }

        let mut rows: Vec<RegionTotal> = totals.into_values().collect();
        by_total_then_name(&mut rows, |r| r.total_sales, |r| &r.region);
        Ok(rows)
    }

    fn top_games(&self, limit: u32) -> Result<Vec<TopGame>, DashboardError> {
        let mut totals: BTreeMap<i32, TopGame> = BTreeMap::new();
        for sale in self.data.joined() {
            totals
                .entry(sale.game_id)
                .or_insert_with(|| TopGame {
                    game: sale.game.to_string(),
                    publisher: sale.publisher.name.clone(),
                    total_sales: 0.0,
                })
                .total_sales += sale.millions;
        }

        let mut rows: Vec<TopGame> = totals.into_values().collect();
        by_total_then_name(&mut rows, |g| g.total_sales, |g| &g.game);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    fn sales_by_genre(&self) -> Result<Vec<GenreTotal>, DashboardError> {
        let mut totals: BTreeMap<i32, (String, BTreeSet<i32>, f64)> = BTreeMap::new();
        for sale in self.data.joined() {
            for genre in self.data.genres_of(sale.game_id) {
                let entry = totals
                    .entry(genre.genre_id)
                    .or_insert_with(|| (genre.name.clone(), BTreeSet::new(), 0.0));
                entry.1.insert(sale.game_id);
                entry.2 += sale.millions;
            }
        }

        let mut rows: Vec<GenreTotal> = totals
            .into_values()
            .map(|(genre, games, total_sales)| GenreTotal {
                genre,
                game_count: games.len() as i64,
                total_sales,
            })
            .collect();
        by_total_then_name(&mut rows, |g| g.total_sales, |g| &g.genre);
        Ok(rows)
    }

    fn sales_by_platform(&self) -> Result<Vec<PlatformTotal>, DashboardError> {
        let mut totals: BTreeMap<i32, (&Platform, BTreeSet<i32>, f64)> = BTreeMap::new();
        for sale in self.data.joined() {
            let entry = totals
                .entry(sale.platform.platform_id)
                .or_insert_with(|| (sale.platform, BTreeSet::new(), 0.0));
            entry.1.insert(sale.game_id);
            entry.2 += sale.millions;
        }

        let mut rows: Vec<PlatformTotal> = totals
            .into_values()
            .map(|(platform, games, total_sales)| PlatformTotal {
                platform: platform.name.clone(),
                code: platform.code.clone(),
                game_count: games.len() as i64,
                total_sales,
            })
            .collect();
        by_total_then_name(&mut rows, |p| p.total_sales, |p| &p.platform);
        Ok(rows)
    }

    fn genre_platform_sales(&self) -> Result<Vec<GenrePlatformTotal>, DashboardError> {
        let mut totals: BTreeMap<(i32, i32), GenrePlatformTotal> = BTreeMap::new();
        for sale in self.data.joined() {
            for genre in self.data.genres_of(sale.game_id) {
                totals
                    .entry((sale.platform.platform_id, genre.genre_id))
                    .or_insert_with(|| GenrePlatformTotal {
                        platform: sale.platform.name.clone(),
                        genre: genre.name.clone(),
                        total_sales: 0.0,
                    })
                    .total_sales += sale.millions;
            }
        }

        let mut rows: Vec<GenrePlatformTotal> = totals.into_values().collect();
        rows.sort_by(|a, b| {
            a.platform
                .cmp(&b.platform)
                .then(b.total_sales.total_cmp(&a.total_sales))
                .then_with(|| a.genre.cmp(&b.genre))
        });
        Ok(rows)
    }

    fn top_publishers(&self, limit: u32) -> Result<Vec<PublisherTotal>, DashboardError> {
        let mut totals: BTreeMap<i32, (&Publisher, BTreeSet<i32>, f64)> = BTreeMap::new();
        for sale in self.data.joined() {
            let entry = totals
                .entry(sale.publisher.publisher_id)
                .or_insert_with(|| (sale.publisher, BTreeSet::new(), 0.0));
            entry.1.insert(sale.game_id);
            entry.2 += sale.millions;
        }

        let mut rows: Vec<PublisherTotal> = totals
            .into_values()
            .map(|(publisher, games, total_sales)| PublisherTotal {
                publisher: publisher.name.clone(),
                country: publisher.country.clone(),
                game_count: games.len() as i64,
                total_sales,
            })
            .collect();
        by_total_then_name(&mut rows, |p| p.total_sales, |p| &p.publisher);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

impl CatalogStore for InMemoryStore {
    fn games(&self) -> Result<Vec<GameEntry>, DashboardError> {
        let mut rows: Vec<GameEntry> = self
            .data
            .games
            .iter()
            .filter_map(|(game_id, game, _)| {
                Some(GameEntry {
                    game_id: *game_id,
                    game: game.clone(),
                    publisher: self.data.publisher_of(*game_id)?.name.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.game.cmp(&b.game).then(a.game_id.cmp(&b.game_id)));
        Ok(rows)
    }

    fn games_with_genres(&self) -> Result<Vec<GameWithGenres>, DashboardError> {
        Ok(self
            .games()?
            .into_iter()
            .map(|entry| {
                let mut names: Vec<&str> = self
                    .data
                    .genres_of(entry.game_id)
                    .into_iter()
                    .map(|g| g.name.as_str())
                    .collect();
                names.sort();
                GameWithGenres {
                    game_id: entry.game_id,
                    game: entry.game,
                    genres: (!names.is_empty()).then(|| names.join(", ")),
                    publisher: entry.publisher,
                }
            })
            .collect())
    }

    fn game_releases(&self) -> Result<Vec<ReleaseEntry>, DashboardError> {
        let mut rows: Vec<ReleaseEntry> = self
            .data
            .releases
            .iter()
            .filter_map(|&(release_id, game_id, platform_id, release_year)| {
                let game = self.data.games.iter().find(|g| g.0 == game_id)?;
                let platform = self
                    .data
                    .platforms
                    .iter()
                    .find(|p| p.platform_id == platform_id)?;
                Some(ReleaseEntry {
                    release_id,
                    game: game.1.clone(),
                    platform: platform.name.clone(),
                    platform_code: platform.code.clone(),
                    release_year,
                    publisher: self.data.publisher_of(game_id)?.name.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.release_year.cmp(&a.release_year).then(a.game.cmp(&b.game)));
        Ok(rows)
    }

    fn regional_sales(&self, limit: u32) -> Result<Vec<SaleEntry>, DashboardError> {
        let mut rows: Vec<SaleEntry> = self
            .data
            .joined()
            .into_iter()
            .map(|sale| SaleEntry {
                sale_id: sale.sale_id,
                game: sale.game.to_string(),
                platform_code: sale.platform.code.clone(),
                region: sale.region.1.clone(),
                sales_in_millions: sale.millions,
                release_year: sale.release_year,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.sales_in_millions
                .total_cmp(&a.sales_in_millions)
                .then(a.sale_id.cmp(&b.sale_id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }

    fn publishers(&self) -> Result<Vec<Publisher>, DashboardError> {
        let mut rows = self.data.publishers.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn platforms(&self) -> Result<Vec<Platform>, DashboardError> {
        let mut rows = self.data.platforms.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn genres(&self) -> Result<Vec<Genre>, DashboardError> {
        let mut rows = self.data.genres.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn table_counts(&self) -> Result<Vec<TableCount>, DashboardError> {
        let counts = [
            ("games", self.data.games.len()),
            ("publishers", self.data.publishers.len()),
            ("platforms", self.data.platforms.len()),
            ("genres", self.data.genres.len()),
            ("game_genres", self.data.game_genres.len()),
            ("game_releases", self.data.releases.len()),
            ("regions", self.data.regions.len()),
            ("regional_sales", self.data.sales.len()),
        ];
        Ok(counts
            .into_iter()
            .map(|(table, rows)| TableCount {
                table: table.to_string(),
                rows: rows as i64,
            })
            .collect())
    }

    fn public_tables(&self) -> Result<Vec<String>, DashboardError> {
        let mut names: Vec<String> = self
            .table_counts()?
            .into_iter()
            .map(|count| count.table)
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Every query fails as if the database went away mid-request.
pub struct FailingStore;

fn unavailable<T>() -> Result<T, DashboardError> {
    Err(DashboardError::Query(diesel::result::Error::BrokenTransactionManager))
}

impl SalesStore for FailingStore {
    fn overview(&self) -> Result<Overview, DashboardError> {
        unavailable()
    }

    fn sales_by_region(&self) -> Result<Vec<RegionTotal>, DashboardError> {
        unavailable()
    }

    fn top_games(&self, _limit: u32) -> Result<Vec<TopGame>, DashboardError> {
        unavailable()
    }

    fn sales_by_genre(&self) -> Result<Vec<GenreTotal>, DashboardError> {
        unavailable()
    }

    fn sales_by_platform(&self) -> Result<Vec<PlatformTotal>, DashboardError> {
        unavailable()
    }

    fn genre_platform_sales(&self) -> Result<Vec<GenrePlatformTotal>, DashboardError> {
        unavailable()
    }

    fn top_publishers(&self, _limit: u32) -> Result<Vec<PublisherTotal>, DashboardError> {
        unavailable()
    }
}

pub fn state_for(data: Dataset) -> AppState {
    let store = Arc::new(InMemoryStore::new(data));
    AppState {
        sales: store.clone(),
        catalog: store,
    }
}
