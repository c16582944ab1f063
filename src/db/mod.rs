use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{Member, TrackedProduct};
use crate::utils::error::Result;

pub mod sqlite;

pub use sqlite::SqliteRepository;

/// Persistence capability consumed by the monitor and the watch flows.
///
/// `list_products` returns a snapshot; mutations report a vanished row as
/// [`crate::AppError::NotFound`] so callers can treat it as benign.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn list_products(&self) -> Result<Vec<TrackedProduct>>;
    async fn get_product(&self, product_id: &str) -> Result<TrackedProduct>;
    async fn insert_product(&self, product: &TrackedProduct) -> Result<()>;
    async fn update_product(&self, product: &TrackedProduct) -> Result<()>;
    async fn update_price(
        &self,
        product_id: &str,
        price: i64,
        checked_at: NaiveDateTime,
    ) -> Result<()>;
    async fn touch_last_checked(&self, product_id: &str, checked_at: NaiveDateTime) -> Result<()>;
    async fn delete_product(&self, product_id: &str) -> Result<()>;

    async fn get_member(&self, member_id: &str) -> Result<Member>;
    async fn insert_member(&self, member: &Member) -> Result<()>;
}
