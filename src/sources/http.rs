use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use crate::config::FetcherConfig;
use crate::sources::{FetchedPrice, PriceSource};
use crate::utils::error::{AppError, Result};

/// Fetches product pages over HTTP and extracts the displayed price with a
/// configured CSS selector. The request timeout bounds how long a single
/// item can stall a sweep.
pub struct HttpPriceSource {
    client: reqwest::Client,
    price_selector: String,
    image_selector: String,
    price_regex: Regex,
}

impl HttpPriceSource {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            price_selector: config.price_selector.clone(),
            image_selector: config.image_selector.clone(),
            price_regex: Regex::new(r"[₹$£€¥]?\s*\d[\d,]*(?:\.\d+)?").unwrap(),
        })
    }

    fn fetch_error(url: &str, message: impl ToString) -> AppError {
        AppError::Fetch {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    fn extract_error(&self, url: &str) -> AppError {
        AppError::Extract {
            url: url.to_string(),
            selector: self.price_selector.clone(),
        }
    }

    // Kept synchronous: `Html` is not Send and must not live across an await.
    fn extract(&self, url: &str, body: &str) -> Result<FetchedPrice> {
        let document = Html::parse_document(body);

        let price_selector =
            Selector::parse(&self.price_selector).map_err(|_| self.extract_error(url))?;
        let element = document
            .select(&price_selector)
            .next()
            .ok_or_else(|| self.extract_error(url))?;
        let text = element.text().collect::<String>();
        let price = self
            .price_regex
            .find(text.trim())
            .ok_or_else(|| self.extract_error(url))?
            .as_str()
            .trim()
            .to_string();

        // The image is an add-flow nicety; its absence is not an error.
        let image_url = Selector::parse(&self.image_selector)
            .ok()
            .and_then(|selector| {
                document
                    .select(&selector)
                    .next()
                    .and_then(|el| el.value().attr("src"))
                    .map(|src| resolve_image_url(url, src))
            });

        Ok(FetchedPrice { price, image_url })
    }
}

/// Image `src` attributes are often page-relative; store them absolute.
fn resolve_image_url(page_url: &str, src: &str) -> String {
    match Url::parse(page_url).and_then(|base| base.join(src)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => src.to_string(),
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPrice> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::fetch_error(url, e))?
            .error_for_status()
            .map_err(|e| Self::fetch_error(url, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| Self::fetch_error(url, e))?;

        self.extract(url, &body)
    }
}
