mod email_client;

pub use email_client::EmailClient;

use async_trait::async_trait;

use crate::core::error::Result;

/// Transport seam for sending a single email. The dispatcher only depends on
/// this, so tests can substitute the provider client.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()>;
}
