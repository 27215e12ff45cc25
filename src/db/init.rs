// Database initialization and migration handling
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;

use crate::db::migrations::MIGRATION_001;
use crate::error::Result;

/// Open (creating if needed) the contest log at `db_path`
pub async fn init_db(db_path: &Path) -> Result<Pool<Sqlite>> {
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    log::info!("Initializing database at: {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;

    run_migrations(&pool).await?;

    log::info!("Database initialization complete");

    Ok(pool)
}

/// Run all pending migrations
pub(crate) async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let applied: bool =
        sqlx::query("SELECT COUNT(*) as count FROM _migrations WHERE name = 'migration_001'")
            .fetch_one(pool)
            .await
            .map(|row| row.get::<i64, _>("count") > 0)
            .unwrap_or(false);

    if !applied {
        log::info!("Applying migration_001...");

        // One statement per execute
        let mut tx = pool.begin().await?;
        for statement in MIGRATION_001.split(';') {
            let mut stmt = statement.trim();
            while stmt.starts_with("--") {
                if let Some(idx) = stmt.find('\n') {
                    stmt = stmt[idx + 1..].trim();
                } else {
                    stmt = "";
                    break;
                }
            }

            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&mut *tx).await?;
            }
        }

        sqlx::query(
            "INSERT INTO _migrations (name, applied_at) VALUES ('migration_001', datetime('now'))",
        )
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        log::info!("Migration 001 applied successfully");
    }

    Ok(())
}

/// Get database stats for the startup banner
pub async fn get_db_stats(pool: &Pool<Sqlite>) -> Result<DbStats> {
    let row = sqlx::query(
        "SELECT COUNT(*) as contact_count, COUNT(DISTINCT band) as band_count FROM contacts",
    )
    .fetch_one(pool)
    .await?;

    Ok(DbStats {
        contact_count: row.get("contact_count"),
        band_count: row.get("band_count"),
    })
}

#[derive(Debug, serde::Serialize)]
pub struct DbStats {
    pub contact_count: i64,
    pub band_count: i64,
}
