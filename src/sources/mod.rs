use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

pub mod http;

pub use http::HttpPriceSource;

/// The currently displayed price for a product page, as shown to shoppers.
/// Normalization into an integer happens at the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchedPrice {
    pub price: String,
    pub image_url: Option<String>,
}

/// Capability interface for retrieving live prices, so alternate retailers
/// can be substituted without touching the monitor.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPrice>;
}
