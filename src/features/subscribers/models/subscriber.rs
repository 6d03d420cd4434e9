use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::subscribers::dtos::SubscriberResponseDto;

/// Database model for a newsletter subscriber
#[derive(Debug, Clone, FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    /// Stored trimmed and lowercased; unique index in the schema
    pub email: String,
    pub active: bool,
    pub subscribed_at: DateTime<Utc>,
}

impl From<Subscriber> for SubscriberResponseDto {
    fn from(s: Subscriber) -> Self {
        Self {
            id: s.id,
            email: s.email,
            active: s.active,
            subscribed_at: s.subscribed_at,
        }
    }
}
