use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub struct DatabaseManager;

impl DatabaseManager {
    /// Build the application pool from `DATABASE_URL`.
    ///
    /// The pool connects lazily, so the server starts even while the database
    /// is unreachable; requests then fail with a server error until it is back.
    pub fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Self::connect_url(&database_url, config)
    }

    pub fn connect_url(database_url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let target = Self::describe_target(database_url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(database_url)?;

        info!(
            "Created database pool for {} (max_connections={})",
            target, config.max_connections
        );
        Ok(pool)
    }

    /// `host:port/database` for logging; never includes credentials.
    fn describe_target(database_url: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        let host = url.host_str().ok_or(DatabaseError::InvalidDatabaseUrl)?;
        let port = url.port().unwrap_or(5432);
        Ok(format!("{}:{}{}", host, port, url.path()))
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}
