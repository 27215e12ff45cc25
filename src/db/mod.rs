pub mod schema;
pub mod qso;
pub mod migrations;
pub mod init;

pub use init::{init_db, get_db_stats, DbStats};
pub use schema::{Contact, ContactEdit, NewContact};

/// In-memory pool with the schema applied, for unit tests
#[cfg(test)]
pub async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    init::run_migrations(&pool)
        .await
        .expect("Failed to apply migrations");
    pool
}
