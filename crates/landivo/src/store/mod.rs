//! SQLite-backed implementations of the repository traits, plus the shared
//! pool/migration plumbing.

pub mod buyers;
pub mod lists;
pub mod offers;
pub mod outbox;
pub mod properties;
pub mod qualification;

pub use buyers::SqliteBuyerRepository;
pub use lists::SqliteListRepository;
pub use offers::SqliteOfferRepository;
pub use outbox::SqliteOutboxRepository;
pub use properties::SqlitePropertyRepository;
pub use qualification::SqliteSessionRepository;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sqlx::SqlitePool;

pub type Pool = SqlitePool;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
            other => RepositoryError::Unavailable(other.to_string()),
        }
    }
}

/// Map a repository failure onto an HTTP response. Driver details stay in the
/// log line, not the body.
pub fn storage_response(err: &RepositoryError) -> Response {
    match err {
        RepositoryError::Conflict => (
            StatusCode::CONFLICT,
            axum::Json(json!({ "error": "record already exists" })),
        )
            .into_response(),
        RepositoryError::NotFound => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": "record not found" })),
        )
            .into_response(),
        RepositoryError::Unavailable(detail) => {
            tracing::error!(%detail, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "storage unavailable" })),
            )
                .into_response()
        }
    }
}

/// Open a pool against `database_url` with WAL and stricter durability.
/// File-backed databases are created on first boot; in-memory URLs are
/// pinned to a single connection so every query sees the same database.
pub async fn init_pool(database_url: &str) -> Result<Pool, RepositoryError> {
    let pool = if database_url.contains(":memory:") {
        sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?
    } else {
        let options = database_url
            .parse::<sqlx::sqlite::SqliteConnectOptions>()?
            .create_if_missing(true);
        SqlitePool::connect_with(options).await?
    };

    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=FULL;").execute(&pool).await?;
    sqlx::query("PRAGMA foreign_keys=ON;").execute(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &Pool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
