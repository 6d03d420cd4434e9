use std::sync::Arc;

use futures::{stream, StreamExt};
use minijinja::{context, Environment};
use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::features::newsletters::models::Newsletter;
use crate::features::notifications::clients::Mailer;
use crate::features::notifications::dtos::SendSummaryDto;
use crate::features::subscribers::models::Subscriber;

/// HTML body sent to every subscriber when a newsletter goes out
const NEWSLETTER_TEMPLATE: &str = r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #fea434;">New Newsletter Available!</h2>
  <p>We're excited to share our latest newsletter with you:</p>
  <h3>{{ title }}</h3>
  {% if description %}<p>{{ description }}</p>{% endif %}
  <div style="text-align: center; margin: 20px 0;">
    <a href="{{ download_url }}"
       style="background-color: #fea434; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;">
      Download Newsletter
    </a>
  </div>
  <p>Thank you for being part of our community!</p>
  <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">
  <p style="font-size: 12px; color: #777;">
    If you no longer wish to receive these emails, you can
    <a href="{{ unsubscribe_url }}">unsubscribe here</a>.
  </p>
</div>"#;

/// Fans a newsletter announcement out to subscribers.
///
/// Each send is attempted independently with bounded concurrency; failures
/// are collected into the summary and never abort the remaining sends. The
/// dispatcher does not deduplicate across invocations; callers gate repeat
/// sends on the newsletter's `subscribers_notified` flag.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    env: Environment<'static>,
    public_base_url: String,
    concurrency: usize,
}

impl NotificationDispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        public_base_url: impl Into<String>,
        concurrency: usize,
    ) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("newsletter", NEWSLETTER_TEMPLATE)
            .map_err(|e| AppError::Internal(format!("Invalid newsletter email template: {}", e)))?;

        Ok(Self {
            mailer,
            env,
            public_base_url: public_base_url.into(),
            concurrency: concurrency.max(1),
        })
    }

    fn render_body(&self, newsletter: &Newsletter) -> Result<String> {
        let template = self
            .env
            .get_template("newsletter")
            .map_err(|e| AppError::Internal(format!("Newsletter email template missing: {}", e)))?;

        template
            .render(context! {
                title => newsletter.title,
                description => newsletter.description,
                download_url => format!(
                    "{}/api/newsletters/{}/download",
                    self.public_base_url, newsletter.id
                ),
                unsubscribe_url => format!("{}/unsubscribe", self.public_base_url),
            })
            .map_err(|e| AppError::Internal(format!("Failed to render newsletter email: {}", e)))
    }

    /// Send the newsletter announcement to every given subscriber and
    /// report the aggregate outcome.
    pub async fn dispatch(
        &self,
        newsletter: &Newsletter,
        subscribers: &[Subscriber],
    ) -> Result<SendSummaryDto> {
        let subject = format!("New Newsletter: {}", newsletter.title);
        let html_body = self.render_body(newsletter)?;

        let subject = subject.as_str();
        let html_body = html_body.as_str();

        let results: Vec<(String, Result<()>)> = stream::iter(subscribers.iter().map(|s| {
            let mailer = Arc::clone(&self.mailer);
            async move {
                let outcome = mailer.send(&s.email, subject, html_body).await;
                (s.email.clone(), outcome)
            }
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut sent = 0usize;
        let mut failed_recipients = Vec::new();
        for (email, outcome) in results {
            match outcome {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!("Newsletter send failed for {}: {}", email, e);
                    failed_recipients.push(email);
                }
            }
        }

        let summary = SendSummaryDto {
            total: subscribers.len(),
            sent,
            failed: failed_recipients.len(),
            failed_recipients,
        };

        info!(
            "Newsletter {} dispatched: sent={}, failed={}",
            newsletter.id, summary.sent, summary.failed
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct StubMailer {
        fail_for: HashSet<String>,
        sent: Mutex<Vec<String>>,
    }

    impl StubMailer {
        fn new(fail_for: impl IntoIterator<Item = String>) -> Self {
            Self {
                fail_for: fail_for.into_iter().collect(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for StubMailer {
        async fn send(&self, recipient: &str, _subject: &str, _html_body: &str) -> Result<()> {
            if self.fail_for.contains(recipient) {
                return Err(AppError::ExternalService("provider rejected".to_string()));
            }
            self.sent.lock().unwrap().push(recipient.to_string());
            Ok(())
        }
    }

    fn newsletter_fixture(description: Option<&str>) -> Newsletter {
        Newsletter {
            id: Uuid::new_v4(),
            title: "June Update".to_string(),
            description: description.map(str::to_string),
            template_index: None,
            pdf_url: Some("http://localhost:4000/uploads/newsletters/x.pdf".to_string()),
            pdf_filename: Some("june.pdf".to_string()),
            pdf_storage_path: Some("newsletters/x.pdf".to_string()),
            published: true,
            subscribers_notified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn subscriber_fixture(email: String) -> Subscriber {
        Subscriber {
            id: Uuid::new_v4(),
            email,
            active: true,
            subscribed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_aggregates_failures_without_aborting() {
        let emails: Vec<String> = (0..5).map(|_| SafeEmail().fake()).collect();
        let failing = emails[1].clone();

        let mailer = Arc::new(StubMailer::new([failing.clone()]));
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            "http://localhost:4000",
            2,
        )
        .unwrap();

        let subscribers: Vec<Subscriber> =
            emails.iter().cloned().map(subscriber_fixture).collect();
        let summary = dispatcher
            .dispatch(&newsletter_fixture(None), &subscribers)
            .await
            .unwrap();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.sent, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failed_recipients, vec![failing]);
        assert_eq!(mailer.sent.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_dispatch_with_no_subscribers_sends_nothing() {
        let mailer = Arc::new(StubMailer::new([]));
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            "http://localhost:4000",
            2,
        )
        .unwrap();

        let summary = dispatcher
            .dispatch(&newsletter_fixture(None), &[])
            .await
            .unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.sent, 0);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_render_body_includes_download_link_and_title() {
        let mailer = Arc::new(StubMailer::new([]));
        let dispatcher =
            NotificationDispatcher::new(mailer, "http://localhost:4000", 2).unwrap();

        let newsletter = newsletter_fixture(Some("Fresh stories"));
        let body = dispatcher.render_body(&newsletter).unwrap();

        assert!(body.contains("June Update"));
        assert!(body.contains("Fresh stories"));
        assert!(body.contains(&format!(
            "http://localhost:4000/api/newsletters/{}/download",
            newsletter.id
        )));
        assert!(body.contains("http://localhost:4000/unsubscribe"));
    }

    #[test]
    fn test_render_body_omits_missing_description() {
        let mailer = Arc::new(StubMailer::new([]));
        let dispatcher =
            NotificationDispatcher::new(mailer, "http://localhost:4000", 2).unwrap();

        let body = dispatcher.render_body(&newsletter_fixture(None)).unwrap();
        assert!(!body.contains("<p></p>"));
    }
}
