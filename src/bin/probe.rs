//! Connectivity check: connects with the dashboard's settings, lists the
//! public tables with their row counts and prints the five best sellers.

use std::process::ExitCode;

use log::error;

use game_sales_dashboard::config::Config;
use game_sales_dashboard::constants::{DEFAULT_LOG_FILTER, OVERVIEW_TOP_LIMIT};
use game_sales_dashboard::db::{check_connectivity, create_pool};
use game_sales_dashboard::error::DashboardError;
use game_sales_dashboard::insights::{format_count, format_millions};
use game_sales_dashboard::store::{CatalogStore, PgSalesStore, SalesStore};

fn run() -> Result<(), DashboardError> {
    let config = Config::from_env()?;
    let pool = create_pool(&config.database)?;
    check_connectivity(&pool)?;

    let store = PgSalesStore::new(pool);

    let tables = store.public_tables()?;
    println!("Public tables ({}):", tables.len());
    for table in &tables {
        println!("  - {table}");
    }

    println!("\nRow counts:");
    for count in store.table_counts()? {
        println!("  {:<16} {:>10}", count.table, format_count(count.rows));
    }

    println!("\nTop {OVERVIEW_TOP_LIMIT} games by global sales:");
    for (rank, game) in store.top_games(OVERVIEW_TOP_LIMIT)?.iter().enumerate() {
        println!(
            "  {}. {} ({}) {}",
            rank + 1,
            game.game,
            game.publisher,
            format_millions(game.total_sales)
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    env_logger::Builder::from_env(env).init();

    match run() {
        Ok(()) => {
            println!("\nConnection OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Probe failed: {e}");
            eprintln!("Connection FAILED: {e}");
            ExitCode::FAILURE
        }
    }
}
