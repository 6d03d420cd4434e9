use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::blogs::dtos::{BlogForm, BlogPostResponseDto};
use crate::features::blogs::models::BlogPost;
use crate::modules::storage::{LocalStore, StoredFile};

const BLOG_COLUMNS: &str =
    "id, title, content, image_url, image_filename, image_storage_path, created_at, updated_at";

/// Service for blog post storage. Cover images follow the same
/// file-before-record discipline as newsletter artifacts.
pub struct BlogService {
    pool: PgPool,
    store: Arc<LocalStore>,
}

impl BlogService {
    pub fn new(pool: PgPool, store: Arc<LocalStore>) -> Self {
        Self { pool, store }
    }

    pub async fn create(&self, form: BlogForm) -> Result<BlogPostResponseDto> {
        let title = form
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("Title is required.".to_string()))?
            .to_string();
        let content = form
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("Content is required.".to_string()))?
            .to_string();

        let image = match form.image {
            Some(file) => Some(
                self.store
                    .store("blogs", &file.original_filename, &file.content_type, file.data)
                    .await?,
            ),
            None => None,
        };

        let inserted = self.insert_post(&title, &content, image.as_ref()).await;
        let post = match inserted {
            Ok(post) => post,
            Err(e) => {
                if let Some(image) = &image {
                    self.store.delete_best_effort(&image.storage_path).await;
                }
                return Err(e);
            }
        };

        info!("Blog post created: id={}, title={}", post.id, post.title);
        Ok(post.into())
    }

    pub async fn list(&self) -> Result<Vec<BlogPostResponseDto>> {
        let posts = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {} FROM blog_posts ORDER BY created_at DESC",
            BLOG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<BlogPostResponseDto> {
        Ok(self.get_model(id).await?.into())
    }

    async fn get_model(&self, id: Uuid) -> Result<BlogPost> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {} FROM blog_posts WHERE id = $1",
            BLOG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        post.ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))
    }

    /// Partial update; a new cover image replaces the prior one, which is
    /// removed once the update has committed.
    pub async fn update(&self, id: Uuid, form: BlogForm) -> Result<BlogPostResponseDto> {
        let existing = self.get_model(id).await?;

        if let Some(title) = form.title.as_deref() {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title cannot be empty.".to_string()));
            }
        }
        if let Some(content) = form.content.as_deref() {
            if content.trim().is_empty() {
                return Err(AppError::Validation("Content cannot be empty.".to_string()));
            }
        }

        let new_image = match form.image {
            Some(file) => Some(
                self.store
                    .store("blogs", &file.original_filename, &file.content_type, file.data)
                    .await?,
            ),
            None => None,
        };

        let updated = self
            .apply_update(
                id,
                form.title.as_deref(),
                form.content.as_deref(),
                new_image.as_ref(),
            )
            .await;

        let post = match updated {
            Ok(post) => post,
            Err(e) => {
                if let Some(image) = &new_image {
                    self.store.delete_best_effort(&image.storage_path).await;
                }
                return Err(e);
            }
        };

        if new_image.is_some() {
            if let Some(old) = existing.image_storage_path.as_deref() {
                self.store.delete_best_effort(old).await;
            }
        }

        info!("Blog post updated: id={}", id);
        Ok(post.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let post = self.get_model(id).await?;

        sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if let Some(path) = post.image_storage_path.as_deref() {
            self.store.delete_best_effort(path).await;
        }

        info!("Blog post deleted: id={}", id);
        Ok(())
    }

    async fn insert_post(
        &self,
        title: &str,
        content: &str,
        image: Option<&StoredFile>,
    ) -> Result<BlogPost> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            INSERT INTO blog_posts (title, content, image_url, image_filename, image_storage_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            BLOG_COLUMNS
        ))
        .bind(title)
        .bind(content)
        .bind(image.map(|i| i.url.clone()))
        .bind(image.map(|i| i.filename.clone()))
        .bind(image.map(|i| i.storage_path.clone()))
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn apply_update(
        &self,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
        new_image: Option<&StoredFile>,
    ) -> Result<BlogPost> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            UPDATE blog_posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                image_url = COALESCE($4, image_url),
                image_filename = COALESCE($5, image_filename),
                image_storage_path = COALESCE($6, image_storage_path),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BLOG_COLUMNS
        ))
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(new_image.map(|i| i.url.clone()))
        .bind(new_image.map(|i| i.filename.clone()))
        .bind(new_image.map(|i| i.storage_path.clone()))
        .fetch_optional(&self.pool)
        .await?;

        post.ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))
    }
}
