use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::newsletters::dtos::{
    parse_sections, FileRefDto, NewsletterForm, NewsletterResponseDto, ParsedSection,
    SectionAlignment, SectionImageInput, SectionResponseDto,
};
use crate::features::newsletters::models::{Newsletter, Section, SectionImage};
use crate::modules::storage::{is_image_mime_allowed, LocalStore, StoredFile, UploadedFile, PDF_MIME_TYPE};

const NEWSLETTER_COLUMNS: &str = "id, title, description, template_index, pdf_url, pdf_filename, \
     pdf_storage_path, published, subscribers_notified, created_at, updated_at";

/// A section whose image references all point at stored artifacts
struct ResolvedSection {
    section: ParsedSection,
    images: Vec<StoredFile>,
}

/// Service for newsletter storage, keeping database records and upload
/// artifacts consistent. Files are always written before the record that
/// references them; cleanup in the other direction is best-effort.
pub struct NewsletterService {
    pool: PgPool,
    store: Arc<LocalStore>,
}

impl NewsletterService {
    pub fn new(pool: PgPool, store: Arc<LocalStore>) -> Self {
        Self { pool, store }
    }

    /// Create a newsletter from a parsed multipart form
    pub async fn create(&self, form: NewsletterForm) -> Result<NewsletterResponseDto> {
        let NewsletterForm {
            title,
            description,
            template_index,
            published,
            sections_raw,
            pdf,
            images,
        } = form;

        let title = title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("Title is required.".to_string()))?
            .to_string();
        let published = published.unwrap_or(true);

        let parsed_sections = sections_raw.as_deref().map(parse_sections).transpose()?;

        if pdf.is_none() && parsed_sections.is_none() {
            return Err(AppError::Validation(
                "A PDF file or sections are required.".to_string(),
            ));
        }
        if parsed_sections.is_some() && template_index.is_none() {
            return Err(AppError::Validation(
                "templateIndex is required for section newsletters.".to_string(),
            ));
        }

        // A published newsletter must end up with something to show. Checked
        // before anything touches the disk.
        let planned_images: usize = parsed_sections
            .as_ref()
            .map(|sections| sections.iter().map(|s| s.images.len()).sum())
            .unwrap_or(0);
        if published && pdf.is_none() && planned_images == 0 {
            return Err(AppError::Validation(
                "A published newsletter needs a PDF or at least one section image.".to_string(),
            ));
        }

        let mut uploads = index_uploads(images);
        let mut stored_paths: Vec<String> = Vec::new();

        let stored_pdf = match pdf {
            Some(file) => {
                let stored = self.store_pdf(file).await?;
                stored_paths.push(stored.storage_path.clone());
                Some(stored)
            }
            None => None,
        };

        let resolved = match parsed_sections {
            Some(sections) => {
                match self
                    .resolve_sections(sections, &mut uploads, None, &mut stored_paths)
                    .await
                {
                    Ok(resolved) => Some(resolved),
                    Err(e) => {
                        self.cleanup(&stored_paths).await;
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        let inserted = self
            .insert_newsletter(
                &title,
                description.as_deref(),
                template_index,
                stored_pdf.as_ref(),
                published,
                resolved.as_deref().unwrap_or(&[]),
            )
            .await;

        let newsletter = match inserted {
            Ok(newsletter) => newsletter,
            Err(e) => {
                // Never leave a file behind for a record that was not created.
                self.cleanup(&stored_paths).await;
                return Err(e);
            }
        };

        info!(
            "Newsletter created: id={}, title={}, published={}",
            newsletter.id, newsletter.title, newsletter.published
        );

        self.compose(newsletter).await
    }

    /// List newsletters, newest first, optionally filtered on the publish flag
    pub async fn list(&self, published: Option<bool>) -> Result<Vec<NewsletterResponseDto>> {
        let newsletters = match published {
            Some(flag) => {
                sqlx::query_as::<_, Newsletter>(&format!(
                    "SELECT {} FROM newsletters WHERE published = $1 ORDER BY created_at DESC",
                    NEWSLETTER_COLUMNS
                ))
                .bind(flag)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Newsletter>(&format!(
                    "SELECT {} FROM newsletters ORDER BY created_at DESC",
                    NEWSLETTER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        self.compose_many(newsletters).await
    }

    /// Fetch one newsletter as a response DTO
    pub async fn get(&self, id: Uuid) -> Result<NewsletterResponseDto> {
        let newsletter = self.get_model(id).await?;
        self.compose(newsletter).await
    }

    /// Fetch the raw newsletter row. `NotFound` when absent, including a
    /// record deleted by a concurrent request.
    pub async fn get_model(&self, id: Uuid) -> Result<Newsletter> {
        let newsletter = sqlx::query_as::<_, Newsletter>(&format!(
            "SELECT {} FROM newsletters WHERE id = $1",
            NEWSLETTER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        newsletter.ok_or_else(|| AppError::NotFound("Newsletter not found".to_string()))
    }

    /// Partial update. Fields that are absent from the form keep their
    /// current value; a new PDF or a new sections payload replaces the prior
    /// one, whose artifacts are removed once the update has committed.
    pub async fn update(&self, id: Uuid, form: NewsletterForm) -> Result<NewsletterResponseDto> {
        let existing = self.get_model(id).await?;

        let NewsletterForm {
            title,
            description,
            template_index,
            published,
            sections_raw,
            pdf,
            images,
        } = form;

        if let Some(title) = title.as_deref() {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title cannot be empty.".to_string()));
            }
        }

        let parsed_sections = sections_raw.as_deref().map(parse_sections).transpose()?;
        let current_images = self.fetch_images(id).await?;

        let mut uploads = index_uploads(images);
        let mut stored_paths: Vec<String> = Vec::new();

        let new_pdf = match pdf {
            Some(file) => {
                let stored = self.store_pdf(file).await?;
                stored_paths.push(stored.storage_path.clone());
                Some(stored)
            }
            None => None,
        };

        let resolved = match parsed_sections {
            Some(sections) => {
                match self
                    .resolve_sections(
                        sections,
                        &mut uploads,
                        Some(&current_images),
                        &mut stored_paths,
                    )
                    .await
                {
                    Ok(resolved) => Some(resolved),
                    Err(e) => {
                        self.cleanup(&stored_paths).await;
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        // Publish invariant evaluated against the state the update produces
        let final_published = published.unwrap_or(existing.published);
        let final_has_pdf = new_pdf.is_some() || existing.pdf_storage_path.is_some();
        let final_image_count = resolved
            .as_ref()
            .map(|sections| sections.iter().map(|s| s.images.len()).sum::<usize>())
            .unwrap_or(current_images.len());
        if final_published && !final_has_pdf && final_image_count == 0 {
            self.cleanup(&stored_paths).await;
            return Err(AppError::Validation(
                "A published newsletter needs a PDF or at least one section image.".to_string(),
            ));
        }

        let applied = self
            .apply_update(
                id,
                title.as_deref(),
                description.as_deref(),
                template_index,
                published,
                new_pdf.as_ref(),
                resolved.as_deref(),
            )
            .await;

        let updated = match applied {
            Ok(updated) => updated,
            Err(e) => {
                self.cleanup(&stored_paths).await;
                return Err(e);
            }
        };

        // Replaced artifacts are deleted only after the record update
        // committed, so a failed update never loses the previous files.
        if new_pdf.is_some() {
            if let Some(old) = existing.pdf_storage_path.as_deref() {
                self.store.delete_best_effort(old).await;
            }
        }
        if let Some(resolved) = &resolved {
            let retained: HashSet<&str> = resolved
                .iter()
                .flat_map(|s| s.images.iter().map(|i| i.storage_path.as_str()))
                .collect();
            for image in &current_images {
                if !retained.contains(image.storage_path.as_str()) {
                    self.store.delete_best_effort(&image.storage_path).await;
                }
            }
        }

        info!("Newsletter updated: id={}", id);

        self.compose(updated).await
    }

    /// Delete the record, then best-effort remove every associated artifact.
    /// An artifact that cannot be removed is logged, never a request failure.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let newsletter = self.get_model(id).await?;
        let images = self.fetch_images(id).await?;

        sqlx::query("DELETE FROM newsletters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let mut artifacts = 0usize;
        if let Some(path) = newsletter.pdf_storage_path.as_deref() {
            self.store.delete_best_effort(path).await;
            artifacts += 1;
        }
        for image in &images {
            self.store.delete_best_effort(&image.storage_path).await;
            artifacts += 1;
        }

        info!("Newsletter deleted: id={}, artifacts={}", id, artifacts);
        Ok(())
    }

    /// Read the stored PDF back for the download endpoint
    pub async fn download(&self, id: Uuid) -> Result<(String, Vec<u8>)> {
        let newsletter = self.get_model(id).await?;

        let path = newsletter.pdf_storage_path.as_deref().ok_or_else(|| {
            AppError::NotFound("Newsletter has no PDF document".to_string())
        })?;

        let data = self.store.read(path).await?;
        let filename = newsletter
            .pdf_filename
            .unwrap_or_else(|| "newsletter.pdf".to_string());

        Ok((filename, data))
    }

    /// Record that subscribers were notified for this newsletter
    pub async fn mark_notified(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE newsletters SET subscribers_notified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn validate_pdf_mime(file: &UploadedFile) -> Result<()> {
        if file.content_type != PDF_MIME_TYPE {
            return Err(AppError::Validation(format!(
                "File type '{}' is not allowed for the newsletter document. Expected {}.",
                file.content_type, PDF_MIME_TYPE
            )));
        }
        Ok(())
    }

    async fn store_pdf(&self, file: UploadedFile) -> Result<StoredFile> {
        Self::validate_pdf_mime(&file)?;
        self.store
            .store("newsletters", &file.original_filename, &file.content_type, file.data)
            .await
    }

    /// Turn submitted image references into stored artifacts: `Upload`
    /// entries consume a file from this request, `Existing` entries must
    /// match an image already owned by the newsletter being updated.
    async fn resolve_sections(
        &self,
        sections: Vec<ParsedSection>,
        uploads: &mut HashMap<String, UploadedFile>,
        existing_images: Option<&[SectionImage]>,
        stored_paths: &mut Vec<String>,
    ) -> Result<Vec<ResolvedSection>> {
        let mut resolved = Vec::with_capacity(sections.len());

        for section in sections {
            let mut images = Vec::with_capacity(section.images.len());

            for image in &section.images {
                match image {
                    SectionImageInput::Upload(name) => {
                        let file = uploads.remove(name).ok_or_else(|| {
                            AppError::Validation(format!("Image '{}' was not uploaded.", name))
                        })?;
                        if !is_image_mime_allowed(&file.content_type) {
                            return Err(AppError::Validation(format!(
                                "File type '{}' is not allowed for images.",
                                file.content_type
                            )));
                        }
                        let stored = self
                            .store
                            .store("sections", &file.original_filename, &file.content_type, file.data)
                            .await?;
                        stored_paths.push(stored.storage_path.clone());
                        images.push(stored);
                    }
                    SectionImageInput::Existing { url, filename } => {
                        let existing = existing_images
                            .and_then(|imgs| imgs.iter().find(|i| &i.url == url))
                            .ok_or_else(|| {
                                AppError::Validation(format!("Unknown image reference: {}", url))
                            })?;
                        images.push(StoredFile {
                            url: existing.url.clone(),
                            filename: filename.clone(),
                            storage_path: existing.storage_path.clone(),
                        });
                    }
                }
            }

            resolved.push(ResolvedSection { section, images });
        }

        Ok(resolved)
    }

    async fn insert_newsletter(
        &self,
        title: &str,
        description: Option<&str>,
        template_index: Option<i32>,
        pdf: Option<&StoredFile>,
        published: bool,
        sections: &[ResolvedSection],
    ) -> Result<Newsletter> {
        let mut tx = self.pool.begin().await?;

        let newsletter = sqlx::query_as::<_, Newsletter>(&format!(
            r#"
            INSERT INTO newsletters
                (title, description, template_index, pdf_url, pdf_filename, pdf_storage_path, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            NEWSLETTER_COLUMNS
        ))
        .bind(title)
        .bind(description)
        .bind(template_index)
        .bind(pdf.map(|p| p.url.clone()))
        .bind(pdf.map(|p| p.filename.clone()))
        .bind(pdf.map(|p| p.storage_path.clone()))
        .bind(published)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_sections(&mut tx, newsletter.id, sections).await?;

        tx.commit().await?;
        Ok(newsletter)
    }

    #[allow(clippy::too_many_arguments)]
    async fn apply_update(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        template_index: Option<i32>,
        published: Option<bool>,
        new_pdf: Option<&StoredFile>,
        sections: Option<&[ResolvedSection]>,
    ) -> Result<Newsletter> {
        let mut tx = self.pool.begin().await?;

        let newsletter = sqlx::query_as::<_, Newsletter>(&format!(
            r#"
            UPDATE newsletters SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                template_index = COALESCE($4, template_index),
                pdf_url = COALESCE($5, pdf_url),
                pdf_filename = COALESCE($6, pdf_filename),
                pdf_storage_path = COALESCE($7, pdf_storage_path),
                published = COALESCE($8, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            NEWSLETTER_COLUMNS
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(template_index)
        .bind(new_pdf.map(|p| p.url.clone()))
        .bind(new_pdf.map(|p| p.filename.clone()))
        .bind(new_pdf.map(|p| p.storage_path.clone()))
        .bind(published)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Newsletter not found".to_string()))?;

        if let Some(sections) = sections {
            // Sections are replaced wholesale; images cascade with them.
            sqlx::query("DELETE FROM newsletter_sections WHERE newsletter_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_sections(&mut tx, id, sections).await?;
        }

        tx.commit().await?;
        Ok(newsletter)
    }

    async fn insert_sections(
        tx: &mut Transaction<'_, Postgres>,
        newsletter_id: Uuid,
        sections: &[ResolvedSection],
    ) -> Result<()> {
        for (position, resolved) in sections.iter().enumerate() {
            let section = &resolved.section;
            let section_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO newsletter_sections
                    (newsletter_id, position, title, section_date, body, writer, alignment)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(newsletter_id)
            .bind(position as i32)
            .bind(&section.title)
            .bind(section.date)
            .bind(&section.content)
            .bind(&section.writer)
            .bind(section.alignment.as_str())
            .fetch_one(&mut **tx)
            .await?;

            for (image_position, image) in resolved.images.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO section_images (section_id, position, url, filename, storage_path)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(section_id)
                .bind(image_position as i32)
                .bind(&image.url)
                .bind(&image.filename)
                .bind(&image.storage_path)
                .execute(&mut **tx)
                .await?;
            }
        }

        Ok(())
    }

    /// All image rows owned by a newsletter, in section/image order
    async fn fetch_images(&self, newsletter_id: Uuid) -> Result<Vec<SectionImage>> {
        let images = sqlx::query_as::<_, SectionImage>(
            r#"
            SELECT si.id, si.section_id, si.position, si.url, si.filename, si.storage_path
            FROM section_images si
            JOIN newsletter_sections ns ON si.section_id = ns.id
            WHERE ns.newsletter_id = $1
            ORDER BY ns.position, si.position
            "#,
        )
        .bind(newsletter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn compose(&self, newsletter: Newsletter) -> Result<NewsletterResponseDto> {
        let mut composed = self.compose_many(vec![newsletter]).await?;
        composed
            .pop()
            .ok_or_else(|| AppError::Internal("Composed newsletter went missing".to_string()))
    }

    async fn compose_many(&self, newsletters: Vec<Newsletter>) -> Result<Vec<NewsletterResponseDto>> {
        if newsletters.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = newsletters.iter().map(|n| n.id).collect();

        let sections = sqlx::query_as::<_, Section>(
            r#"
            SELECT id, newsletter_id, position, title, section_date, body, writer, alignment
            FROM newsletter_sections
            WHERE newsletter_id = ANY($1)
            ORDER BY position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let images = sqlx::query_as::<_, SectionImage>(
            r#"
            SELECT si.id, si.section_id, si.position, si.url, si.filename, si.storage_path
            FROM section_images si
            JOIN newsletter_sections ns ON si.section_id = ns.id
            WHERE ns.newsletter_id = ANY($1)
            ORDER BY si.position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut images_by_section: HashMap<Uuid, Vec<FileRefDto>> = HashMap::new();
        for image in images {
            images_by_section
                .entry(image.section_id)
                .or_default()
                .push(FileRefDto {
                    url: image.url,
                    filename: image.filename,
                });
        }

        let mut sections_by_newsletter: HashMap<Uuid, Vec<SectionResponseDto>> = HashMap::new();
        for section in sections {
            let images = images_by_section.remove(&section.id).unwrap_or_default();
            sections_by_newsletter
                .entry(section.newsletter_id)
                .or_default()
                .push(SectionResponseDto {
                    id: section.id,
                    title: section.title,
                    date: section.section_date,
                    content: section.body,
                    writer: section.writer,
                    alignment: SectionAlignment::from_column(&section.alignment),
                    images,
                });
        }

        Ok(newsletters
            .into_iter()
            .map(|n| {
                let sections = sections_by_newsletter.remove(&n.id).unwrap_or_default();
                let pdf = match (n.pdf_url, n.pdf_filename) {
                    (Some(url), filename) => Some(FileRefDto {
                        url,
                        filename: filename.unwrap_or_else(|| "newsletter.pdf".to_string()),
                    }),
                    _ => None,
                };
                NewsletterResponseDto {
                    id: n.id,
                    title: n.title,
                    description: n.description,
                    template_index: n.template_index,
                    pdf,
                    published: n.published,
                    subscribers_notified: n.subscribers_notified,
                    sections,
                    created_at: n.created_at,
                    updated_at: n.updated_at,
                }
            })
            .collect())
    }

    async fn cleanup(&self, stored_paths: &[String]) {
        for path in stored_paths {
            self.store.delete_best_effort(path).await;
        }
    }
}

fn index_uploads(files: Vec<UploadedFile>) -> HashMap<String, UploadedFile> {
    files
        .into_iter()
        .map(|f| (f.original_filename.clone(), f))
        .collect()
}
