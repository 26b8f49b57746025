//! Shared API response types

use serde::{Deserialize, Serialize};

use crate::models::UsageWithCategory;

// ============================================================================
// History Response Types
// ============================================================================

/// One device usage entry as returned by `GET /history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponseItem {
    pub id: i64,
    /// Device brand (`merek`)
    pub brand: String,
    pub nama_perangkat: String,
    /// Power draw in watts
    pub daya: f64,
    /// Usage duration in hours
    pub durasi: f64,
    pub tanggal_input: String,
    pub category_id: i64,
    pub category_name: String,
}

impl From<UsageWithCategory> for HistoryResponseItem {
    fn from(entry: UsageWithCategory) -> Self {
        let UsageWithCategory { record, category } = entry;
        Self {
            id: record.id,
            brand: record.merek,
            nama_perangkat: record.nama_perangkat,
            daya: record.daya,
            durasi: record.durasi,
            tanggal_input: record.tanggal_input,
            category_id: category.kategori_id,
            category_name: category.nama_kategori,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, UsageRecord};
    use proptest::prelude::*;

    fn entry(daya: f64, durasi: f64, merek: &str, nama_kategori: &str) -> UsageWithCategory {
        UsageWithCategory {
            record: UsageRecord {
                id: 12,
                user_id: 3,
                nama_perangkat: "Kulkas".to_string(),
                merek: merek.to_string(),
                daya,
                durasi,
                tanggal_input: "2025-06-01 08:30:00".to_string(),
                kategori_id: 5,
            },
            category: Category::new(5, nama_kategori),
        }
    }

    #[test]
    fn test_projection_maps_every_field() {
        let item = HistoryResponseItem::from(entry(150.0, 24.0, "Sharp", "Kitchen"));

        assert_eq!(
            item,
            HistoryResponseItem {
                id: 12,
                brand: "Sharp".to_string(),
                nama_perangkat: "Kulkas".to_string(),
                daya: 150.0,
                durasi: 24.0,
                tanggal_input: "2025-06-01 08:30:00".to_string(),
                category_id: 5,
                category_name: "Kitchen".to_string(),
            }
        );
    }

    #[test]
    fn test_wire_field_names() {
        let item = HistoryResponseItem::from(entry(9.5, 1.5, "Philips", "Lighting"));
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "id": 12,
                "brand": "Philips",
                "nama_perangkat": "Kulkas",
                "daya": 9.5,
                "durasi": 1.5,
                "tanggal_input": "2025-06-01 08:30:00",
                "category_id": 5,
                "category_name": "Lighting"
            })
        );
        assert!(value.get("merek").is_none());
        assert!(value.get("user_id").is_none());
    }

    fn finite_f64() -> impl Strategy<Value = f64> {
        proptest::num::f64::NORMAL | proptest::num::f64::ZERO | proptest::num::f64::SUBNORMAL
    }

    #[test]
    fn test_large_float_keeps_every_bit() {
        let daya = 2.3487106935367575e100;
        let item = HistoryResponseItem::from(entry(daya, 0.1, "Sharp", "Kitchen"));
        let encoded = serde_json::to_string(&item).unwrap();
        let decoded: HistoryResponseItem = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.daya.to_bits(), daya.to_bits());
        assert_eq!(decoded.durasi.to_bits(), 0.1f64.to_bits());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_projection_survives_json(
            daya in finite_f64(),
            durasi in finite_f64(),
            merek in "[A-Za-z0-9 ]{0,20}",
            nama_kategori in "[A-Za-z]{1,15}",
        ) {
            let item = HistoryResponseItem::from(entry(daya, durasi, &merek, &nama_kategori));
            let encoded = serde_json::to_string(&item).unwrap();
            let decoded: HistoryResponseItem = serde_json::from_str(&encoded).unwrap();

            prop_assert_eq!(decoded.daya.to_bits(), daya.to_bits());
            prop_assert_eq!(decoded.durasi.to_bits(), durasi.to_bits());
            prop_assert_eq!(decoded.brand, merek);
            prop_assert_eq!(decoded.category_name, nama_kategori);
        }
    }
}
