//! End-to-end sweep behavior against a real SQLite store and a stubbed
//! retailer page.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropwatch::config::{DatabaseConfig, FetcherConfig, MonitorConfig};
use dropwatch::db::{Repository, SqliteRepository};
use dropwatch::models::{Member, NewTrackedProduct, TrackedProduct};
use dropwatch::monitor::PriceMonitor;
use dropwatch::notifiers::Notifier;
use dropwatch::scheduler::shutdown_channel;
use dropwatch::sources::HttpPriceSource;
use dropwatch::Result;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push((
            to_email.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

fn monitor_config() -> MonitorConfig {
    MonitorConfig {
        sweep_interval_secs: 3600,
        item_delay_min_ms: 0,
        item_delay_max_ms: 0,
        utc_offset_minutes: 330,
    }
}

fn fetcher_config() -> FetcherConfig {
    FetcherConfig {
        request_timeout: 5,
        user_agent: "DropwatchTest/1.0".to_string(),
        price_selector: ".price".to_string(),
        image_selector: ".gallery img".to_string(),
    }
}

async fn test_repo() -> Arc<SqliteRepository> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        acquire_timeout: 5,
    };
    Arc::new(SqliteRepository::connect(&config).await.unwrap())
}

async fn seed(repo: &SqliteRepository, url: &str, current: i64, target: i64) -> (Member, TrackedProduct) {
    let member = Member::new(
        "Ravi".to_string(),
        "ravi@example.com".to_string(),
        "pbkdf2$fake".to_string(),
    );
    repo.insert_member(&member).await.unwrap();

    let product = TrackedProduct::new(NewTrackedProduct {
        member_id: member.id.clone(),
        name: "Headphones".to_string(),
        url: url.to_string(),
        current_price: current,
        target_price: target,
        image_url: None,
    });
    repo.insert_product(&product).await.unwrap();
    (member, product)
}

async fn serve_price(server: &MockServer, route: &str, price_html: &str) {
    let page = format!(
        r#"<html><body><span class="price">{}</span></body></html>"#,
        price_html
    );
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(server)
        .await;
}

#[tokio::test]
async fn alert_path_notifies_and_removes_the_watch() {
    let server = MockServer::start().await;
    serve_price(&server, "/item", "₹4,400").await;

    let repo = test_repo().await;
    let url = format!("{}/item", server.uri());
    let (member, _product) = seed(&repo, &url, 5000, 4500).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let (_tx, rx) = shutdown_channel();
    let mut monitor = PriceMonitor::new(
        repo.clone(),
        Arc::new(HttpPriceSource::new(&fetcher_config()).unwrap()),
        notifier.clone(),
        monitor_config(),
        rx,
    );

    let summary = monitor.run_sweep().await.unwrap();
    assert_eq!(summary.alerts_sent, 1);
    assert!(repo.list_products().await.unwrap().is_empty());

    let deliveries = notifier.sent.lock().unwrap().clone();
    assert_eq!(deliveries.len(), 1);
    let (to, subject, body) = &deliveries[0];
    assert_eq!(to, &member.email);
    assert_eq!(subject, "Low price alert for Headphones");
    assert!(body.contains("₹4,400"));
    assert!(body.contains(&url));

    // Nothing left for a second sweep to do
    let summary = monitor.run_sweep().await.unwrap();
    assert_eq!(summary.checked, 0);
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn changed_price_is_persisted_with_timestamp() {
    let server = MockServer::start().await;
    serve_price(&server, "/item", "₹4,800").await;

    let repo = test_repo().await;
    let url = format!("{}/item", server.uri());
    let (_member, product) = seed(&repo, &url, 5000, 4500).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let (_tx, rx) = shutdown_channel();
    let mut monitor = PriceMonitor::new(
        repo.clone(),
        Arc::new(HttpPriceSource::new(&fetcher_config()).unwrap()),
        notifier.clone(),
        monitor_config(),
        rx,
    );

    let summary = monitor.run_sweep().await.unwrap();
    assert_eq!(summary.price_changes, 1);
    assert!(notifier.sent.lock().unwrap().is_empty());

    let stored = repo.get_product(&product.id).await.unwrap();
    assert_eq!(stored.current_price, 4800);
    assert!(stored.last_checked.is_some());
}

#[tokio::test]
async fn unchanged_price_touches_only_the_timestamp() {
    let server = MockServer::start().await;
    serve_price(&server, "/item", "₹5,000").await;

    let repo = test_repo().await;
    let url = format!("{}/item", server.uri());
    let (_member, product) = seed(&repo, &url, 5000, 4500).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let (_tx, rx) = shutdown_channel();
    let mut monitor = PriceMonitor::new(
        repo.clone(),
        Arc::new(HttpPriceSource::new(&fetcher_config()).unwrap()),
        notifier.clone(),
        monitor_config(),
        rx,
    );

    let summary = monitor.run_sweep().await.unwrap();
    assert_eq!(summary.unchanged, 1);
    assert!(notifier.sent.lock().unwrap().is_empty());

    let stored = repo.get_product(&product.id).await.unwrap();
    assert_eq!(stored.current_price, 5000);
    assert!(stored.last_checked.is_some());
}

#[tokio::test]
async fn a_page_redesign_on_one_item_leaves_the_rest_of_the_sweep_intact() {
    let server = MockServer::start().await;
    // First item's selector is gone; second item still serves a price
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>redesigned</body></html>"))
        .mount(&server)
        .await;
    serve_price(&server, "/ok", "₹4,800").await;

    let repo = test_repo().await;
    let gone_url = format!("{}/gone", server.uri());
    let ok_url = format!("{}/ok", server.uri());

    let (member, _broken) = seed(&repo, &gone_url, 5000, 4500).await;
    let healthy = TrackedProduct::new(NewTrackedProduct {
        member_id: member.id.clone(),
        name: "Speakers".to_string(),
        url: ok_url,
        current_price: 5000,
        target_price: 4500,
        image_url: None,
    });
    repo.insert_product(&healthy).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let (_tx, rx) = shutdown_channel();
    let mut monitor = PriceMonitor::new(
        repo.clone(),
        Arc::new(HttpPriceSource::new(&fetcher_config()).unwrap()),
        notifier,
        monitor_config(),
        rx,
    );

    let summary = monitor.run_sweep().await.unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.price_changes, 1);

    let stored = repo.get_product(&healthy.id).await.unwrap();
    assert_eq!(stored.current_price, 4800);
}
