use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use diesel::{RunQueryDsl, sql_query};
use log::{error, info};

use crate::config::DatabaseConfig;
use crate::error::DashboardError;

pub type DBPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Opens the process-wide pool. Fails with `Connectivity` when no connection
/// can be established within the configured timeout.
pub fn create_pool(config: &DatabaseConfig) -> Result<DBPool, DashboardError> {
    info!(
        "Connecting to {}:{}/{} as {} (sslmode={})",
        config.host, config.port, config.name, config.user, config.sslmode
    );

    let manager = ConnectionManager::<PgConnection>::new(config.connection_string());
    r2d2::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.connect_timeout)
        .test_on_check_out(true)
        .build(manager)
        .map_err(|e| {
            error!("Failed to create database pool: {e}");
            DashboardError::Connectivity(e.to_string())
        })
}

/// Round-trips a trivial statement through the pool.
pub fn check_connectivity(pool: &DBPool) -> Result<(), DashboardError> {
    let conn = &mut pool
        .get()
        .map_err(|e| DashboardError::Connectivity(e.to_string()))?;

    sql_query("SELECT 1")
        .execute(conn)
        .map(|_| info!("Database connection verified"))
        .map_err(|e| DashboardError::Connectivity(e.to_string()))
}
