use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StorageBackend};
use crate::database::memory_store::MemoryStore;
use crate::database::pg_store::PgStore;
use crate::database::store::DocumentStore;
use crate::filter::FilterError;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Maps PostgreSQL unique violations (SQLSTATE 23505) to `Conflict`.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.code().as_deref() == Some("23505") {
                let constraint = db.constraint().unwrap_or("unique").to_string();
                return DatabaseError::Conflict(constraint);
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Opens the configured document store
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory document store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let pool = Self::connect(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!(
            "Created database pool (max {} connections) for: {}",
            config.max_connections,
            Self::redacted(&connection_string)
        );
        Ok(pool)
    }

    /// Applies the embedded migrations under `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        let base = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        if url.path().trim_start_matches('/').is_empty() {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url.into())
    }

    /// Connection string with the password removed, for logs
    fn redacted(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
