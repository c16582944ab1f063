use async_trait::async_trait;

use crate::utils::error::Result;

pub mod email;

pub use email::SmtpNotifier;

/// Capability interface for delivering alerts, so delivery channels can be
/// substituted without touching the monitor.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<()>;
}
