//! Category model

use serde::{Deserialize, Serialize};

/// Classification bucket for devices ("Kitchen", "Lighting", ...).
///
/// Categories are static reference data seeded by migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Primary key (`kategori.kategori_id`)
    pub kategori_id: i64,
    /// Display name (`kategori.nama_kategori`)
    pub nama_kategori: String,
}

impl Category {
    pub fn new(kategori_id: i64, nama_kategori: impl Into<String>) -> Self {
        Self {
            kategori_id,
            nama_kategori: nama_kategori.into(),
        }
    }
}
