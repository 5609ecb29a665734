//! Points store models: products, redemptions, and manual adjustments.

use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `store_products` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct StoreProduct {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub point_cost: i32,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub point_cost: i32,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// DTO for updating a product. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub point_cost: Option<i32>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

/// A row from the `store_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct StoreTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub product_id: Option<DbId>,
    pub product_name: String,
    pub points_spent: i32,
    pub created_at: Timestamp,
}

/// Result of a committed redemption.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Redemption {
    pub transaction: StoreTransaction,
    pub remaining_points: i32,
    pub remaining_stock: i32,
}

/// A row from the `point_adjustments` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct PointAdjustment {
    pub id: DbId,
    pub user_id: DbId,
    pub delta: i32,
    pub reason: String,
    pub adjusted_by: Option<DbId>,
    pub created_at: Timestamp,
}
