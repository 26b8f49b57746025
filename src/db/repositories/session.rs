//! Session store
//!
//! Sessions live in the `sessions` table; their attributes are a JSON object
//! in the `data` column.
//!
//! This module provides:
//! - `SessionStore` trait, a read-only get-by-token contract
//! - `SqlxSessionStore` implementing it for SQLite and MySQL
//!
//! Sessions are written by the login flow; this crate only reads them.

use crate::config::DatabaseDriver;
use crate::db::pool::driver_mismatch;
use crate::db::DynDatabasePool;
use crate::models::{Session, SessionData};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Session store trait
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get session by ID (token).
    ///
    /// `Ok(None)` when no session has that token. An error means the store
    /// could not be reached or the stored record could not be decoded.
    async fn get(&self, id: &str) -> Result<Option<Session>>;
}

/// SQLx-based session store
pub struct SqlxSessionStore {
    pool: DynDatabasePool,
}

impl SqlxSessionStore {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed store for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionStore> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionStore for SqlxSessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>> {
        let driver = self.pool.driver();
        match driver {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.as_sqlite().ok_or_else(|| driver_mismatch(driver))?;
                get_session_sqlite(pool, id).await
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.as_mysql().ok_or_else(|| driver_mismatch(driver))?;
                get_session_mysql(pool, id).await
            }
        }
    }
}

fn decode_session_data(raw: &str) -> Result<SessionData> {
    serde_json::from_str(raw).context("Failed to decode session data")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_session_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        r#"
        SELECT id, data, expires_at, created_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get session by ID")?;

    row.map(|row| row_to_session_sqlite(&row)).transpose()
}

fn row_to_session_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
    let raw: String = row.try_get("data").context("Failed to read session data")?;
    Ok(Session {
        id: row.try_get("id")?,
        data: decode_session_data(&raw)?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_session_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        r#"
        SELECT id, data, expires_at, created_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get session by ID")?;

    row.map(|row| row_to_session_mysql(&row)).transpose()
}

fn row_to_session_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Session> {
    let raw: String = row.try_get("data").context("Failed to read session data")?;
    Ok(Session {
        id: row.try_get("id")?,
        data: decode_session_data(&raw)?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}
