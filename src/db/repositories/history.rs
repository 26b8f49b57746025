//! Device history repository
//!
//! Reads a user's `riwayat_perangkat` rows joined with `kategori` in a
//! single statement. Rows are streamed and decoded one by one; the stream
//! is owned by the query function, so the cursor and its pooled connection
//! are released on every return path.

use crate::config::DatabaseDriver;
use crate::db::pool::driver_mismatch;
use crate::db::DynDatabasePool;
use crate::models::{Category, UsageRecord, UsageWithCategory};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Failure modes of the history query, in the order they can occur.
#[derive(Debug, thiserror::Error)]
pub enum HistoryQueryError {
    /// The statement could not be executed
    #[error("history query failed: {0:#}")]
    Query(#[source] anyhow::Error),

    /// A returned row did not have the expected shape
    #[error("failed to decode history row: {0:#}")]
    Scan(#[source] anyhow::Error),

    /// The cursor reported an error after rows had been read
    #[error("history cursor failed mid-iteration: {0:#}")]
    Iteration(#[source] anyhow::Error),
}

/// History repository trait
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// All usage records owned by `user_id` that have a matching category,
    /// in the order the database returns them.
    async fn list_for_user(&self, user_id: i64)
        -> Result<Vec<UsageWithCategory>, HistoryQueryError>;
}

/// SQLx-based history repository
pub struct SqlxHistoryRepository {
    pool: DynDatabasePool,
}

impl SqlxHistoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn HistoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl HistoryRepository for SqlxHistoryRepository {
    async fn list_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<UsageWithCategory>, HistoryQueryError> {
        let driver = self.pool.driver();
        match driver {
            DatabaseDriver::Sqlite => {
                let pool = self
                    .pool
                    .as_sqlite()
                    .ok_or_else(|| HistoryQueryError::Query(driver_mismatch(driver)))?;
                list_history_sqlite(pool, user_id).await
            }
            DatabaseDriver::Mysql => {
                let pool = self
                    .pool
                    .as_mysql()
                    .ok_or_else(|| HistoryQueryError::Query(driver_mismatch(driver)))?;
                list_history_mysql(pool, user_id).await
            }
        }
    }
}

/// Drain a row stream into decoded history entries.
///
/// An error before the first row means the statement itself failed; an
/// error after it is a cursor failure. Either way nothing collected so far
/// is returned.
async fn drain_rows<S, R, F>(
    mut rows: S,
    decode: F,
) -> Result<Vec<UsageWithCategory>, HistoryQueryError>
where
    S: Stream<Item = Result<R, sqlx::Error>> + Unpin,
    F: Fn(&R) -> Result<UsageWithCategory, sqlx::Error>,
{
    let mut history = Vec::new();

    while let Some(next) = rows.next().await {
        let row = match next {
            Ok(row) => row,
            Err(e) if history.is_empty() => return Err(HistoryQueryError::Query(e.into())),
            Err(e) => return Err(HistoryQueryError::Iteration(e.into())),
        };
        let entry = decode(&row).map_err(|e| HistoryQueryError::Scan(e.into()))?;
        history.push(entry);
    }

    Ok(history)
}

// ============================================================================
// SQLite implementations
// ============================================================================

const HISTORY_SQLITE: &str = r#"
    SELECT rp.id, rp.user_id, rp.nama_perangkat, rp.merek, rp.daya, rp.durasi,
           rp.tanggal_input, k.kategori_id, k.nama_kategori
    FROM riwayat_perangkat rp
    JOIN kategori k ON rp.kategori_id = k.kategori_id
    WHERE rp.user_id = ?
"#;

async fn list_history_sqlite(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<UsageWithCategory>, HistoryQueryError> {
    let rows = sqlx::query(HISTORY_SQLITE).bind(user_id).fetch(pool);
    drain_rows(rows, row_to_entry_sqlite).await
}

fn row_to_entry_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<UsageWithCategory, sqlx::Error> {
    let kategori_id: i64 = row.try_get("kategori_id")?;
    Ok(UsageWithCategory {
        record: UsageRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            nama_perangkat: row.try_get("nama_perangkat")?,
            merek: row.try_get("merek")?,
            daya: row.try_get("daya")?,
            durasi: row.try_get("durasi")?,
            tanggal_input: row.try_get("tanggal_input")?,
            kategori_id,
        },
        category: Category::new(kategori_id, row.try_get::<String, _>("nama_kategori")?),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

// DATETIME is formatted server-side so it decodes as a plain string.
const HISTORY_MYSQL: &str = r#"
    SELECT rp.id, rp.user_id, rp.nama_perangkat, rp.merek, rp.daya, rp.durasi,
           DATE_FORMAT(rp.tanggal_input, '%Y-%m-%d %H:%i:%s') AS tanggal_input,
           k.kategori_id, k.nama_kategori
    FROM riwayat_perangkat rp
    JOIN kategori k ON rp.kategori_id = k.kategori_id
    WHERE rp.user_id = ?
"#;

async fn list_history_mysql(
    pool: &MySqlPool,
    user_id: i64,
) -> Result<Vec<UsageWithCategory>, HistoryQueryError> {
    let rows = sqlx::query(HISTORY_MYSQL).bind(user_id).fetch(pool);
    drain_rows(rows, row_to_entry_mysql).await
}

fn row_to_entry_mysql(row: &sqlx::mysql::MySqlRow) -> Result<UsageWithCategory, sqlx::Error> {
    let kategori_id: i64 = row.try_get("kategori_id")?;
    Ok(UsageWithCategory {
        record: UsageRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            nama_perangkat: row.try_get("nama_perangkat")?,
            merek: row.try_get("merek")?,
            daya: row.try_get("daya")?,
            durasi: row.try_get("durasi")?,
            tanggal_input: row.try_get("tanggal_input")?,
            kategori_id,
        },
        category: Category::new(kategori_id, row.try_get::<String, _>("nama_kategori")?),
    })
}
