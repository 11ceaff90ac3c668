//! Test utilities for database operations.
//!
//! Provides an in-memory SQLite database with the full schema applied, so
//! tests can exercise real foreign keys, cascades and transactions without
//! an external server.

use std::sync::Arc;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// In-memory SQLite URL. Every connection to it opens a fresh database.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// A migrated, throwaway test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a new in-memory database and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(MEMORY_URL);
        // A single pooled connection: the schema lives in it
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        conn.execute(Statement::from_string(
            conn.get_database_backend(),
            "PRAGMA foreign_keys = ON".to_string(),
        ))
        .await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get a shareable handle to the connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Count rows in a table.
    pub async fn count_rows(&self, table: &str) -> Result<i64, DbErr> {
        let row = self
            .conn
            .query_one(Statement::from_string(
                self.conn.get_database_backend(),
                format!("SELECT COUNT(*) AS n FROM \"{table}\""),
            ))
            .await?
            .ok_or_else(|| DbErr::Custom(format!("no count returned for {table}")))?;

        row.try_get::<i64>("", "n")
    }
}
