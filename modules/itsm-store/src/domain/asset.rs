use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

pub const ASSET_CODE_PREFIX: &str = "AST";

text_enum! {
    pub enum AssetStatus: "asset status" {
        InStock => "in_stock",
        InUse => "in_use",
        Maintenance => "maintenance",
        Retired => "retired",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub asset_type: String,
    pub status: AssetStatus,
    pub serial_number: Option<String>,
    pub department_id: Option<i64>,
    pub filiale_id: i64,
    pub owner_id: Option<Uuid>,
    pub purchased_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: String,
    #[serde(default = "default_asset_status")]
    pub status: AssetStatus,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
    pub filiale_id: i64,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub purchased_at: Option<NaiveDate>,
}

fn default_asset_status() -> AssetStatus {
    AssetStatus::InStock
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub status: Option<AssetStatus>,
    pub serial_number: Option<Option<String>>,
    pub department_id: Option<Option<i64>>,
    pub filiale_id: Option<i64>,
    pub purchased_at: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetFilter {
    pub asset_type: Option<String>,
    pub statuses: Vec<AssetStatus>,
    pub filiale_id: Option<i64>,
    pub department_id: Option<i64>,
    pub owner_id: Option<Uuid>,
    /// Substring of the name.
    pub search: Option<String>,
    pub include_deleted: bool,
}
