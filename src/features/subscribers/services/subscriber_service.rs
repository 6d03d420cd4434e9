use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::subscribers::dtos::SubscriberResponseDto;
use crate::features::subscribers::models::Subscriber;

/// Service for subscriber storage
pub struct SubscriberService {
    pool: PgPool,
}

impl SubscriberService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Emails are stored trimmed and lowercased so the unique index also
    /// catches case variants of an existing subscription.
    fn normalize_email(email: &str) -> String {
        email.trim().to_ascii_lowercase()
    }

    /// Subscribe a new email address. Duplicates are rejected with a
    /// conflict and leave the store untouched.
    pub async fn subscribe(&self, email: &str) -> Result<SubscriberResponseDto> {
        let email = Self::normalize_email(email);

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subscribers WHERE email = $1",
        )
        .bind(&email)
        .fetch_one(&self.pool)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict("Email already subscribed.".to_string()));
        }

        // The unique index still guards against a concurrent duplicate
        // slipping past the pre-check.
        let subscriber = sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO subscribers (email)
            VALUES ($1)
            RETURNING id, email, active, subscribed_at
            "#,
        )
        .bind(&email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db) = e {
                if db.is_unique_violation() {
                    return AppError::Conflict("Email already subscribed.".to_string());
                }
            }
            AppError::Database(e)
        })?;

        info!("Subscriber added: id={}", subscriber.id);

        Ok(subscriber.into())
    }

    /// List every subscriber, newest first
    pub async fn list(&self) -> Result<Vec<SubscriberResponseDto>> {
        let subscribers = sqlx::query_as::<_, Subscriber>(
            r#"
            SELECT id, email, active, subscribed_at
            FROM subscribers
            ORDER BY subscribed_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers.into_iter().map(Into::into).collect())
    }

    /// Active subscribers, the notification dispatcher's input
    pub async fn list_active(&self) -> Result<Vec<Subscriber>> {
        let subscribers = sqlx::query_as::<_, Subscriber>(
            r#"
            SELECT id, email, active, subscribed_at
            FROM subscribers
            WHERE active = TRUE
            ORDER BY subscribed_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers)
    }

    /// Remove a subscriber record entirely
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Subscriber not found.".to_string()));
        }

        info!("Subscriber removed: id={}", id);
        Ok(())
    }

    /// Deactivate a subscription by email. Idempotent: unknown or
    /// already-inactive emails are not an error.
    pub async fn unsubscribe(&self, email: &str) -> Result<()> {
        let email = Self::normalize_email(email);

        let result = sqlx::query("UPDATE subscribers SET active = FALSE WHERE email = $1")
            .bind(&email)
            .execute(&self.pool)
            .await?;

        debug!(
            "Unsubscribe for {}: {} row(s) updated",
            email,
            result.rows_affected()
        );
        Ok(())
    }
}
