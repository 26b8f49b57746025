//! User repository
//!
//! Resolves session identities to users.

use crate::config::DatabaseDriver;
use crate::db::pool::driver_mismatch;
use crate::db::DynDatabasePool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let driver = self.pool.driver();
        match driver {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.as_sqlite().ok_or_else(|| driver_mismatch(driver))?;
                get_user_by_username_sqlite(pool, username).await
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.as_mysql().ok_or_else(|| driver_mismatch(driver))?;
                get_user_by_username_mysql(pool, username).await
            }
        }
    }
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT user_id, username FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    match row {
        Some(row) => Ok(Some(User {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
        })),
        None => Ok(None),
    }
}

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT user_id, username FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    match row {
        Some(row) => Ok(Some(User {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
        })),
        None => Ok(None),
    }
}
