use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::generate_id;

/// One member's watch on one product. Deleted exactly when its alert fires.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TrackedProduct {
    pub id: String,
    pub member_id: String,
    pub name: String,
    pub url: String,

    // Prices are normalized integers; raw currency strings are never stored.
    pub current_price: i64,
    pub target_price: i64,

    /// Naive local time in the configured fixed timezone. Set only by the
    /// monitor; non-decreasing per record across sweeps.
    pub last_checked: Option<NaiveDateTime>,

    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrackedProduct {
    pub member_id: String,
    pub name: String,
    pub url: String,
    pub current_price: i64,
    pub target_price: i64,
    pub image_url: Option<String>,
}

impl TrackedProduct {
    pub fn new(new_product: NewTrackedProduct) -> Self {
        Self {
            id: generate_id(),
            member_id: new_product.member_id,
            name: new_product.name,
            url: new_product.url,
            current_price: new_product.current_price,
            target_price: new_product.target_price,
            last_checked: None,
            image_url: new_product.image_url,
        }
    }
}
