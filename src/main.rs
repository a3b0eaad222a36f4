use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web::Data};
use log::{error, info};

use game_sales_dashboard::cache::MemoStore;
use game_sales_dashboard::config::Config;
use game_sales_dashboard::constants::DEFAULT_LOG_FILTER;
use game_sales_dashboard::db::{check_connectivity, create_pool};
use game_sales_dashboard::metrics_middleware::RequestMetrics;
use game_sales_dashboard::routes::{self, AppState};
use game_sales_dashboard::store::{PgSalesStore, SalesStore};

#[actix_rt::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    env_logger::Builder::from_env(env).init();

    let config = Config::from_env().map_err(|e| {
        error!("{e}");
        io::Error::other(e.to_string())
    })?;

    let pool = create_pool(&config.database)
        .and_then(|pool| check_connectivity(&pool).map(|_| pool))
        .map_err(|e| {
            error!("{e}");
            io::Error::other(e.to_string())
        })?;

    let store = Arc::new(PgSalesStore::new(pool.clone()));
    let sales: Arc<dyn SalesStore> = if config.cache_ttl.is_zero() {
        info!("Query memoization disabled");
        store.clone() as Arc<dyn SalesStore>
    } else {
        info!("Memoizing query results for {:?}", config.cache_ttl);
        Arc::new(MemoStore::new(PgSalesStore::new(pool), config.cache_ttl))
    };
    let state = AppState {
        sales,
        catalog: store,
    };

    info!("Starting dashboard on http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(state.clone()))
            .configure(routes::configure)
            .wrap(RequestMetrics)
            // enable logger - always register actix-web Logger middleware last
            .wrap(middleware::Logger::default())
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
