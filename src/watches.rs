use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::db::Repository;
use crate::models::{NewTrackedProduct, TrackedProduct};
use crate::price::{alert_condition, normalize_price};
use crate::sources::PriceSource;
use crate::utils::error::Result;

/// A member's request to start or change a watch. The target price arrives
/// as raw user input and goes through the same normalization as the sweep.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WatchRequest {
    #[validate(length(min = 1, message = "product name must not be empty"))]
    pub name: String,
    #[validate(url(message = "product url must be a valid URL"))]
    pub url: String,
    #[validate(length(min = 1, message = "target price must not be empty"))]
    pub target_price: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    /// The watch was persisted and will be swept.
    Tracked(TrackedProduct),
    /// The live price already satisfies the target; nothing is persisted.
    AlreadyAvailable { url: String, price: i64 },
}

/// Add/update/remove flows used by the request-handling collaborators.
/// Shares `alert_condition` with the monitor so a product that is already
/// cheap enough is never stored only to alert on the very next sweep.
pub struct WatchManager {
    repo: Arc<dyn Repository>,
    source: Arc<dyn PriceSource>,
}

impl WatchManager {
    pub fn new(repo: Arc<dyn Repository>, source: Arc<dyn PriceSource>) -> Self {
        Self { repo, source }
    }

    pub async fn add_watch(&self, member_id: &str, request: WatchRequest) -> Result<WatchOutcome> {
        request.validate()?;
        let target = normalize_price(&request.target_price)?;
        let owner = self.repo.get_member(member_id).await?;

        let fetched = self.source.fetch(&request.url).await?;
        let current = normalize_price(&fetched.price)?;

        if alert_condition(current, target) {
            return Ok(WatchOutcome::AlreadyAvailable {
                url: request.url,
                price: current,
            });
        }

        let product = TrackedProduct::new(NewTrackedProduct {
            member_id: owner.id,
            name: request.name,
            url: request.url,
            current_price: current,
            target_price: target,
            image_url: fetched.image_url,
        });
        self.repo.insert_product(&product).await?;
        info!(product_id = %product.id, member_id = %product.member_id, "watch added");

        Ok(WatchOutcome::Tracked(product))
    }

    pub async fn update_watch(
        &self,
        product_id: &str,
        request: WatchRequest,
    ) -> Result<WatchOutcome> {
        request.validate()?;
        let target = normalize_price(&request.target_price)?;
        let mut product = self.repo.get_product(product_id).await?;

        let fetched = self.source.fetch(&request.url).await?;
        let current = normalize_price(&fetched.price)?;

        if alert_condition(current, target) {
            // Same policy as the sweep's alert path: the watch ends here
            self.repo.delete_product(product_id).await?;
            return Ok(WatchOutcome::AlreadyAvailable {
                url: request.url,
                price: current,
            });
        }

        product.name = request.name;
        product.url = request.url;
        product.current_price = current;
        product.target_price = target;
        product.image_url = fetched.image_url;
        self.repo.update_product(&product).await?;
        info!(product_id = %product.id, "watch updated");

        Ok(WatchOutcome::Tracked(product))
    }

    pub async fn remove_watch(&self, product_id: &str) -> Result<()> {
        self.repo.delete_product(product_id).await?;
        info!(product_id = %product_id, "watch removed");
        Ok(())
    }
}
