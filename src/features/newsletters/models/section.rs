use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for one content block of a newsletter. Sections have no
/// lifecycle of their own; deleting the newsletter cascades here.
#[derive(Debug, Clone, FromRow)]
pub struct Section {
    pub id: Uuid,
    pub newsletter_id: Uuid,
    pub position: i32,
    pub title: String,
    pub section_date: NaiveDate,
    pub body: String,
    pub writer: Option<String>,
    pub alignment: String,
}

/// Database model for an image belonging to a section
#[derive(Debug, Clone, FromRow)]
pub struct SectionImage {
    pub id: Uuid,
    pub section_id: Uuid,
    pub position: i32,
    pub url: String,
    pub filename: String,
    pub storage_path: String,
}
