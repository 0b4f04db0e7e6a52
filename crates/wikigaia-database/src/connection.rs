//! PostgreSQL pool backing [`Stores::postgres`](crate::Stores::postgres).

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use wikigaia_core::config::DatabaseConfig;
use wikigaia_core::error::{AppError, ErrorKind};
use wikigaia_core::result::AppResult;

use crate::migration::run_migrations;

/// Pool settings from configuration. The pool keeps at least one connection
/// slot and never warms more connections than it may hold.
fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    let max = config.max_connections.max(1);
    PgPoolOptions::new()
        .max_connections(max)
        .min_connections(config.min_connections.min(max))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

/// Open the store pool, applying migrations first when `run_migrations` is
/// set.
pub async fn open_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = pool_options(config)
        .connect(&config.url)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to open store pool", e)
        })?;
    info!(
        target_db = url_target(&config.url),
        max_connections = config.max_connections,
        "Store pool open"
    );

    if config.run_migrations {
        run_migrations(&pool).await?;
    }
    Ok(pool)
}

/// Whether the pool answers a trivial query.
pub async fn ping(pool: &PgPool) -> AppResult<bool> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|v| v == 1)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Store ping failed", e))
}

/// `host[:port]/database` of a connection URL; credentials never appear.
fn url_target(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = rest.rsplit_once('@').map_or(rest, |(_, host)| host);
    rest.split_once('?').map_or(rest, |(target, _)| target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_target_hides_credentials() {
        assert_eq!(
            url_target("postgres://wikigaia:s3cr@t@db:5432/wikigaia?sslmode=require"),
            "db:5432/wikigaia"
        );
        assert_eq!(url_target("postgres://localhost/wikigaia"), "localhost/wikigaia");
    }

    #[test]
    fn test_pool_options_clamp_connection_counts() {
        let config = DatabaseConfig {
            max_connections: 0,
            min_connections: 5,
            ..DatabaseConfig::default()
        };
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);

        let options = pool_options(&DatabaseConfig::default());
        assert_eq!(options.get_max_connections(), 20);
        assert_eq!(options.get_min_connections(), 2);
    }
}
