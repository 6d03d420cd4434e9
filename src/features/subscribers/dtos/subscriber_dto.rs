use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::shared::validation::EMAIL_REGEX;

/// Request DTO for subscribing an email address
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscribeDto {
    /// Email address to subscribe
    #[schema(example = "a@example.com")]
    #[validate(
        length(min = 3, max = 320, message = "Invalid email address"),
        regex(path = *EMAIL_REGEX, message = "Invalid email address")
    )]
    pub email: String,
}

/// Request DTO for unsubscribing an email address
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UnsubscribeDto {
    #[validate(
        length(min = 3, max = 320, message = "Invalid email address"),
        regex(path = *EMAIL_REGEX, message = "Invalid email address")
    )]
    pub email: String,
}

/// Response DTO for subscriber records
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriberResponseDto {
    pub id: Uuid,
    pub email: String,
    pub active: bool,
    pub subscribed_at: DateTime<Utc>,
}

/// Response DTO for subscriber removal
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemoveSubscriberResponseDto {
    pub deleted: bool,
}
