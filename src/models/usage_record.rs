//! Device usage record model

use serde::{Deserialize, Serialize};

use super::Category;

/// One logged instance of a device's power usage (`riwayat_perangkat` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Primary key
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Device name
    pub nama_perangkat: String,
    /// Brand
    pub merek: String,
    /// Power draw in watts
    pub daya: f64,
    /// Usage duration in hours
    pub durasi: f64,
    /// Date/time the record was entered, as stored
    pub tanggal_input: String,
    /// Referenced category
    pub kategori_id: i64,
}

/// A usage record joined with its category, as produced by the history query.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageWithCategory {
    pub record: UsageRecord,
    pub category: Category,
}
