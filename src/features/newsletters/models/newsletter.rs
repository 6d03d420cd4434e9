use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a newsletter.
///
/// Either the `pdf_*` columns are set (single-document newsletter) or the
/// newsletter is composed of `newsletter_sections` rows referencing this id;
/// both may be present after an update adds the other form.
#[derive(Debug, Clone, FromRow)]
pub struct Newsletter {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub template_index: Option<i32>,
    pub pdf_url: Option<String>,
    /// Original filename of the uploaded PDF, kept for download disposition
    pub pdf_filename: Option<String>,
    pub pdf_storage_path: Option<String>,
    pub published: bool,
    pub subscribers_notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
