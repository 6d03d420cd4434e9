//! Blog post endpoints

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::blogs::dtos::{
    BlogForm, BlogPostResponseDto, CreateBlogPostDto, DeleteBlogPostResponseDto,
};
use crate::features::blogs::services::BlogService;
use crate::modules::storage::{is_image_mime_allowed, UploadedFile};
use crate::shared::types::{ApiResponse, Meta};

/// State for blog handlers
#[derive(Clone)]
pub struct BlogState {
    pub blogs: Arc<BlogService>,
    pub max_file_size: usize,
}

/// Create a blog post
#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body(
        content = CreateBlogPostDto,
        content_type = "multipart/form-data",
        description = "Blog post fields plus an optional cover image"
    ),
    responses(
        (status = 201, description = "Blog post created", body = ApiResponse<BlogPostResponseDto>),
        (status = 400, description = "Missing title/content or invalid image")
    ),
    tag = "blogs"
)]
pub async fn create_blog_post(
    State(state): State<BlogState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<BlogPostResponseDto>>)> {
    let form = parse_blog_form(multipart, state.max_file_size).await?;
    let post = state.blogs.create(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(post),
            Some("Blog post created successfully.".to_string()),
            None,
        )),
    ))
}

/// List blog posts, newest first
#[utoipa::path(
    get,
    path = "/api/blogs",
    responses(
        (status = 200, description = "List of blog posts", body = ApiResponse<Vec<BlogPostResponseDto>>)
    ),
    tag = "blogs"
)]
pub async fn list_blog_posts(
    State(state): State<BlogState>,
) -> Result<Json<ApiResponse<Vec<BlogPostResponseDto>>>> {
    let posts = state.blogs.list().await?;
    let total = posts.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(posts),
        None,
        Some(Meta { total }),
    )))
}

/// Fetch a blog post by id
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    responses(
        (status = 200, description = "Blog post", body = ApiResponse<BlogPostResponseDto>),
        (status = 404, description = "Blog post not found")
    ),
    tag = "blogs"
)]
pub async fn get_blog_post(
    State(state): State<BlogState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BlogPostResponseDto>>> {
    let post = state.blogs.get(id).await?;
    Ok(Json(ApiResponse::success(Some(post), None, None)))
}

/// Update a blog post
#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    request_body(
        content = CreateBlogPostDto,
        content_type = "multipart/form-data",
        description = "Partial blog post fields"
    ),
    responses(
        (status = 200, description = "Blog post updated", body = ApiResponse<BlogPostResponseDto>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Blog post not found")
    ),
    tag = "blogs"
)]
pub async fn update_blog_post(
    State(state): State<BlogState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BlogPostResponseDto>>> {
    let form = parse_blog_form(multipart, state.max_file_size).await?;
    let post = state.blogs.update(id, form).await?;

    Ok(Json(ApiResponse::success(
        Some(post),
        Some("Blog post updated successfully.".to_string()),
        None,
    )))
}

/// Delete a blog post and its cover image
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    responses(
        (status = 200, description = "Blog post deleted", body = ApiResponse<DeleteBlogPostResponseDto>),
        (status = 404, description = "Blog post not found")
    ),
    tag = "blogs"
)]
pub async fn delete_blog_post(
    State(state): State<BlogState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteBlogPostResponseDto>>> {
    state.blogs.delete(id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteBlogPostResponseDto { deleted: true }),
        Some("Blog post deleted successfully.".to_string()),
        None,
    )))
}

async fn parse_blog_form(mut multipart: Multipart, max_file_size: usize) -> Result<BlogForm> {
    let mut form = BlogForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "title" => {
                form.title = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field 'title': {}", e))
                })?);
            }
            "content" => {
                form.content = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field 'content': {}", e))
                })?);
            }
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let original_filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                if data.len() > max_file_size {
                    return Err(AppError::BadRequest(format!(
                        "File too large. Maximum size is {} bytes ({} MB)",
                        max_file_size,
                        max_file_size / 1024 / 1024
                    )));
                }
                if !is_image_mime_allowed(&content_type) {
                    return Err(AppError::BadRequest(format!(
                        "File type '{}' is not allowed for images.",
                        content_type
                    )));
                }

                form.image = Some(UploadedFile {
                    original_filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            other => debug!("Ignoring unknown field: {}", other),
        }
    }

    Ok(form)
}
