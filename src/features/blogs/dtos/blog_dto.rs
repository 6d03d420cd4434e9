use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::modules::storage::UploadedFile;

/// Fields extracted from a blog post create/update multipart request
#[derive(Debug, Default)]
pub struct BlogForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<UploadedFile>,
}

/// Multipart request body for blog post create/update.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers use axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateBlogPostDto {
    pub title: String,
    pub content: String,
    /// Optional cover image
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Response DTO for blog posts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BlogPostResponseDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response DTO for blog post deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteBlogPostResponseDto {
    pub deleted: bool,
}
