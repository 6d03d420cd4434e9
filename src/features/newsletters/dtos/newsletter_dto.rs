use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::modules::storage::UploadedFile;

/// Upper bound on section body text
pub const MAX_SECTION_BODY_CHARS: usize = 20_000;

/// Fields extracted from a newsletter create/update multipart request
#[derive(Debug, Default)]
pub struct NewsletterForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub template_index: Option<i32>,
    pub published: Option<bool>,
    /// Raw JSON of the `sections` form field, deserialized by the service
    pub sections_raw: Option<String>,
    pub pdf: Option<UploadedFile>,
    pub images: Vec<UploadedFile>,
}

/// Text/image alignment of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SectionAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl SectionAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionAlignment::Left => "left",
            SectionAlignment::Center => "center",
            SectionAlignment::Right => "right",
        }
    }

    /// Parse the stored column value; anything unexpected falls back to left
    pub fn from_column(value: &str) -> Self {
        match value {
            "center" => SectionAlignment::Center,
            "right" => SectionAlignment::Right,
            _ => SectionAlignment::Left,
        }
    }
}

/// One section as submitted in the `sections` multipart form field
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SectionInput {
    pub title: String,
    /// `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used
    pub date: String,
    pub content: String,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub alignment: Option<SectionAlignment>,
    #[serde(default)]
    pub images: Vec<SectionImageInput>,
}

/// Image entry within a submitted section: either a reference to an image
/// that is already stored (kept as-is on update), or the original filename
/// of a file uploaded in the same request's `images` field.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SectionImageInput {
    Existing { url: String, filename: String },
    Upload(String),
}

/// A section that passed validation, ready for persistence
#[derive(Debug, Clone)]
pub struct ParsedSection {
    pub title: String,
    pub date: NaiveDate,
    pub content: String,
    pub writer: Option<String>,
    pub alignment: SectionAlignment,
    pub images: Vec<SectionImageInput>,
}

/// Deserialize and validate the raw `sections` form field. Malformed input
/// is a client error; nothing is persisted before this passes.
pub fn parse_sections(raw: &str) -> Result<Vec<ParsedSection>, AppError> {
    let inputs: Vec<SectionInput> = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid sections JSON: {}", e)))?;

    if inputs.is_empty() {
        return Err(AppError::Validation(
            "Sections must contain at least one entry.".to_string(),
        ));
    }

    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let title = input.title.trim();
            if title.is_empty() {
                return Err(AppError::Validation(format!(
                    "Section {} is missing a title.",
                    index + 1
                )));
            }
            if input.content.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "Section {} is missing content.",
                    index + 1
                )));
            }
            if input.content.chars().count() > MAX_SECTION_BODY_CHARS {
                return Err(AppError::Validation(format!(
                    "Section {} content exceeds {} characters.",
                    index + 1,
                    MAX_SECTION_BODY_CHARS
                )));
            }

            let date = parse_section_date(&input.date).ok_or_else(|| {
                AppError::Validation(format!(
                    "Section {} has an invalid date: {}",
                    index + 1,
                    input.date
                ))
            })?;

            Ok(ParsedSection {
                title: title.to_string(),
                date,
                content: input.content,
                writer: input
                    .writer
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty()),
                alignment: input.alignment.unwrap_or_default(),
                images: input.images,
            })
        })
        .collect()
}

fn parse_section_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Reference to a stored artifact in API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileRefDto {
    /// Public URL under the uploads mount
    pub url: String,
    /// Original filename as uploaded
    pub filename: String,
}

/// Response DTO for a newsletter section
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SectionResponseDto {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub content: String,
    pub writer: Option<String>,
    pub alignment: SectionAlignment,
    pub images: Vec<FileRefDto>,
}

/// Response DTO for newsletters
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsletterResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub template_index: Option<i32>,
    pub pdf: Option<FileRefDto>,
    pub published: bool,
    pub subscribers_notified: bool,
    pub sections: Vec<SectionResponseDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Multipart request body for newsletter create/update.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers use axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateNewsletterDto {
    pub title: String,
    pub description: Option<String>,
    /// The newsletter PDF document
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub pdf: Option<String>,
    /// Index of the layout template the sections render with
    #[schema(example = 0)]
    pub template_index: Option<i32>,
    /// JSON array of sections; image entries name files from `images`
    pub sections: Option<String>,
    /// Section image file (field repeats once per image), matched by original filename
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub images: Option<String>,
    /// Whether the newsletter is publicly listed (defaults to true)
    pub published: Option<bool>,
}

/// Query parameters for the newsletter list endpoint
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListNewslettersQuery {
    /// Filter on the publish flag; omit for all newsletters
    pub published: Option<bool>,
}

/// Query parameters for the send endpoint
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SendNewsletterQuery {
    /// Re-send even when subscribers were already notified
    #[serde(default)]
    pub force: bool,
}

/// Response DTO for newsletter deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteNewsletterResponseDto {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_happy_path() {
        let raw = r#"[
            {
                "title": "Community news",
                "date": "2025-06-01",
                "content": "We opened a new office.",
                "writer": "Ada",
                "alignment": "center",
                "images": ["office.png", {"url": "http://x/uploads/sections/a.png", "filename": "old.png"}]
            }
        ]"#;

        let sections = parse_sections(raw).unwrap();
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.title, "Community news");
        assert_eq!(section.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(section.alignment, SectionAlignment::Center);
        assert_eq!(section.writer.as_deref(), Some("Ada"));
        assert_eq!(section.images.len(), 2);
        assert!(matches!(section.images[0], SectionImageInput::Upload(_)));
        assert!(matches!(section.images[1], SectionImageInput::Existing { .. }));
    }

    #[test]
    fn test_parse_sections_defaults_alignment_to_left() {
        let raw = r#"[{"title": "T", "date": "2025-01-02", "content": "C"}]"#;
        let sections = parse_sections(raw).unwrap();
        assert_eq!(sections[0].alignment, SectionAlignment::Left);
        assert!(sections[0].images.is_empty());
    }

    #[test]
    fn test_parse_sections_accepts_rfc3339_dates() {
        let raw = r#"[{"title": "T", "date": "2025-01-02T10:30:00Z", "content": "C"}]"#;
        let sections = parse_sections(raw).unwrap();
        assert_eq!(
            sections[0].date,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_parse_sections_rejects_malformed_json() {
        assert!(matches!(
            parse_sections("not json"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_sections(r#"{"title": "object, not array"}"#),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_sections_rejects_empty_array() {
        assert!(matches!(parse_sections("[]"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_sections_rejects_missing_fields() {
        let missing_title = r#"[{"title": "  ", "date": "2025-01-02", "content": "C"}]"#;
        assert!(parse_sections(missing_title).is_err());

        let missing_content = r#"[{"title": "T", "date": "2025-01-02", "content": ""}]"#;
        assert!(parse_sections(missing_content).is_err());

        let bad_date = r#"[{"title": "T", "date": "June 1st", "content": "C"}]"#;
        assert!(parse_sections(bad_date).is_err());
    }

    #[test]
    fn test_parse_sections_bounds_content_length() {
        let long = "x".repeat(MAX_SECTION_BODY_CHARS + 1);
        let raw = format!(
            r#"[{{"title": "T", "date": "2025-01-02", "content": "{}"}}]"#,
            long
        );
        assert!(parse_sections(&raw).is_err());
    }
}
