use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{ConnectOptions, SqlitePool};
use std::{str::FromStr, time::Duration};
use tracing::log::LevelFilter;
use userhub_shared::State;

/// Connection options shared by every pool
///
/// WAL journal, busy timeout, NORMAL synchronous, foreign keys on, temp
/// tables in memory. Set per connection so every pooled connection gets them.
fn connect_options(database_url: &str) -> Result<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000))
        .synchronous(SqliteSynchronous::Normal)
        .pragma("cache_size", "-20000")
        .foreign_keys(true)
        .pragma("temp_store", "memory")
        .log_statements(LevelFilter::Debug))
}

/// Create a read-only connection pool for lookups
///
/// The database file must already exist.
pub async fn create_read_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = connect_options(database_url)?.read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        "Created read-only pool with {} max connections",
        max_connections
    );

    Ok(pool)
}

/// Create a read-write connection pool
///
/// Limited to 1 connection to avoid SQLITE_BUSY on writes. Creates the
/// database file when missing.
pub async fn create_write_pool(database_url: &str) -> Result<SqlitePool> {
    let options = connect_options(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    tracing::info!("Created read-write pool with 1 max connection");

    Ok(pool)
}

/// Build the shared [`State`], write pool first so the file exists for readers.
pub async fn create_state(database_url: &str, max_connections: u32) -> Result<State> {
    let write_db = create_write_pool(database_url).await?;
    let read_db = create_read_pool(database_url, max_connections).await?;

    Ok(State { read_db, write_db })
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    #[tokio::test]
    async fn test_create_state_applies_pragmas() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let url = format!("sqlite:{}", dir.child("db.sqlite3").display());

        let state = create_state(&url, 2).await?;

        let journal_mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&state.write_db)
            .await?;
        assert_eq!(journal_mode.0, "wal");

        let foreign_keys: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&state.read_db)
            .await?;
        assert_eq!(foreign_keys.0, 1);

        let temp_store: (i32,) = sqlx::query_as("PRAGMA temp_store")
            .fetch_one(&state.read_db)
            .await?;
        assert_eq!(temp_store.0, 2); // 2 = memory

        let result = sqlx::query("CREATE TABLE t (id INTEGER)")
            .execute(&state.read_db)
            .await;
        assert!(result.is_err());

        Ok(())
    }
}
