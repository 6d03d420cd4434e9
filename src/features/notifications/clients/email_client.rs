use async_trait::async_trait;
use serde::Serialize;

use crate::core::config::EmailConfig;
use crate::core::error::{AppError, Result};
use crate::features::notifications::clients::Mailer;

/// HTTP client for a Postmark-style transactional email API
pub struct EmailClient {
    http: reqwest::Client,
    api_base_url: String,
    sender: String,
    authorization_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
}

impl EmailClient {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create email HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.clone(),
            sender: config.sender.clone(),
            authorization_token: config.authorization_token.clone(),
        })
    }
}

#[async_trait]
impl Mailer for EmailClient {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        let url = format!("{}/email", self.api_base_url);
        let body = SendEmailRequest {
            from: &self.sender,
            to: recipient,
            subject,
            html_body,
        };

        let response = self
            .http
            .post(&url)
            .header("X-Server-Token", &self.authorization_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Email provider request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Email provider returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
