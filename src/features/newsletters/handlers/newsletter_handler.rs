//! Newsletter endpoints

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::newsletters::dtos::{
    CreateNewsletterDto, DeleteNewsletterResponseDto, ListNewslettersQuery, NewsletterForm,
    NewsletterResponseDto, SendNewsletterQuery,
};
use crate::features::newsletters::services::NewsletterService;
use crate::features::notifications::dtos::SendSummaryDto;
use crate::features::notifications::NotificationDispatcher;
use crate::features::subscribers::services::SubscriberService;
use crate::modules::storage::{is_image_mime_allowed, UploadedFile, PDF_MIME_TYPE};
use crate::shared::types::{ApiResponse, Meta};

/// State for newsletter handlers
#[derive(Clone)]
pub struct NewsletterState {
    pub newsletters: Arc<NewsletterService>,
    pub subscribers: Arc<SubscriberService>,
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Per-file size cap applied while reading multipart fields
    pub max_file_size: usize,
}

/// Create a newsletter
///
/// Multipart: `title`, optional `description`, and either a `pdf` file or
/// `templateIndex` + `sections` (JSON) + `images` files.
#[utoipa::path(
    post,
    path = "/api/newsletters",
    request_body(
        content = CreateNewsletterDto,
        content_type = "multipart/form-data",
        description = "Newsletter fields plus the PDF or section images"
    ),
    responses(
        (status = 201, description = "Newsletter created", body = ApiResponse<NewsletterResponseDto>),
        (status = 400, description = "Missing file, invalid sections JSON, or invalid upload"),
        (status = 500, description = "Storage or database failure")
    ),
    tag = "newsletters"
)]
pub async fn create_newsletter(
    State(state): State<NewsletterState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<NewsletterResponseDto>>)> {
    let form = parse_newsletter_form(multipart, state.max_file_size).await?;
    let newsletter = state.newsletters.create(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(newsletter),
            Some("Newsletter created successfully.".to_string()),
            None,
        )),
    ))
}

/// List newsletters, newest first
#[utoipa::path(
    get,
    path = "/api/newsletters",
    params(ListNewslettersQuery),
    responses(
        (status = 200, description = "List of newsletters", body = ApiResponse<Vec<NewsletterResponseDto>>)
    ),
    tag = "newsletters"
)]
pub async fn list_newsletters(
    State(state): State<NewsletterState>,
    Query(query): Query<ListNewslettersQuery>,
) -> Result<Json<ApiResponse<Vec<NewsletterResponseDto>>>> {
    let newsletters = state.newsletters.list(query.published).await?;
    let total = newsletters.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(newsletters),
        None,
        Some(Meta { total }),
    )))
}

/// Fetch a newsletter by id
#[utoipa::path(
    get,
    path = "/api/newsletters/{id}",
    params(
        ("id" = Uuid, Path, description = "Newsletter ID")
    ),
    responses(
        (status = 200, description = "Newsletter", body = ApiResponse<NewsletterResponseDto>),
        (status = 404, description = "Newsletter not found")
    ),
    tag = "newsletters"
)]
pub async fn get_newsletter(
    State(state): State<NewsletterState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NewsletterResponseDto>>> {
    let newsletter = state.newsletters.get(id).await?;
    Ok(Json(ApiResponse::success(Some(newsletter), None, None)))
}

/// Update a newsletter
///
/// Multipart with any subset of the create fields; a new PDF or sections
/// payload replaces the prior one.
#[utoipa::path(
    put,
    path = "/api/newsletters/{id}",
    params(
        ("id" = Uuid, Path, description = "Newsletter ID")
    ),
    request_body(
        content = CreateNewsletterDto,
        content_type = "multipart/form-data",
        description = "Partial newsletter fields"
    ),
    responses(
        (status = 200, description = "Newsletter updated", body = ApiResponse<NewsletterResponseDto>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Newsletter not found")
    ),
    tag = "newsletters"
)]
pub async fn update_newsletter(
    State(state): State<NewsletterState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<NewsletterResponseDto>>> {
    let form = parse_newsletter_form(multipart, state.max_file_size).await?;
    let newsletter = state.newsletters.update(id, form).await?;

    Ok(Json(ApiResponse::success(
        Some(newsletter),
        Some("Newsletter updated successfully.".to_string()),
        None,
    )))
}

/// Delete a newsletter and its stored artifacts
#[utoipa::path(
    delete,
    path = "/api/newsletters/{id}",
    params(
        ("id" = Uuid, Path, description = "Newsletter ID")
    ),
    responses(
        (status = 200, description = "Newsletter deleted", body = ApiResponse<DeleteNewsletterResponseDto>),
        (status = 404, description = "Newsletter not found")
    ),
    tag = "newsletters"
)]
pub async fn delete_newsletter(
    State(state): State<NewsletterState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteNewsletterResponseDto>>> {
    state.newsletters.delete(id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteNewsletterResponseDto { deleted: true }),
        Some("Newsletter deleted successfully.".to_string()),
        None,
    )))
}

/// Download the newsletter's PDF document
#[utoipa::path(
    get,
    path = "/api/newsletters/{id}/download",
    params(
        ("id" = Uuid, Path, description = "Newsletter ID")
    ),
    responses(
        (status = 200, description = "PDF document"),
        (status = 404, description = "Newsletter or PDF not found")
    ),
    tag = "newsletters"
)]
pub async fn download_newsletter(
    State(state): State<NewsletterState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let (filename, data) = state.newsletters.download(id).await?;
    let safe_name = filename.replace(['"', '\r', '\n'], "_");

    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", safe_name),
        )
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// Notify active subscribers about a newsletter
///
/// Refuses a repeat send unless `force=true`; the per-recipient outcome is
/// aggregated into the response.
#[utoipa::path(
    post,
    path = "/api/newsletters/{id}/send",
    params(
        ("id" = Uuid, Path, description = "Newsletter ID"),
        SendNewsletterQuery
    ),
    responses(
        (status = 200, description = "Send summary", body = ApiResponse<SendSummaryDto>),
        (status = 400, description = "No active subscribers"),
        (status = 404, description = "Newsletter not found"),
        (status = 409, description = "Subscribers already notified")
    ),
    tag = "newsletters"
)]
pub async fn send_newsletter(
    State(state): State<NewsletterState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SendNewsletterQuery>,
) -> Result<Json<ApiResponse<SendSummaryDto>>> {
    let newsletter = state.newsletters.get_model(id).await?;

    if newsletter.subscribers_notified && !query.force {
        return Err(AppError::Conflict(
            "Subscribers have already been notified for this newsletter.".to_string(),
        ));
    }

    let subscribers = state.subscribers.list_active().await?;
    if subscribers.is_empty() {
        return Err(AppError::BadRequest(
            "No active subscribers to notify.".to_string(),
        ));
    }

    let summary = state.dispatcher.dispatch(&newsletter, &subscribers).await?;

    if summary.sent > 0 {
        state.newsletters.mark_notified(id).await?;
    }

    let message = format!("Notified {} of {} subscribers.", summary.sent, summary.total);
    Ok(Json(ApiResponse::success(Some(summary), Some(message), None)))
}

/// Pull the known fields out of a newsletter multipart request, enforcing
/// the per-file MIME and size constraints before anything is persisted.
async fn parse_newsletter_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<NewsletterForm> {
    let mut form = NewsletterForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "title" => form.title = Some(read_text(field, "title").await?),
            "description" => form.description = Some(read_text(field, "description").await?),
            "templateIndex" | "template_index" => {
                let raw = read_text(field, "templateIndex").await?;
                let index = raw.trim().parse::<i32>().map_err(|_| {
                    AppError::BadRequest(format!("templateIndex must be a number, got '{}'", raw))
                })?;
                form.template_index = Some(index);
            }
            "published" => {
                let raw = read_text(field, "published").await?;
                let flag = raw.trim().parse::<bool>().map_err(|_| {
                    AppError::BadRequest(format!("published must be true or false, got '{}'", raw))
                })?;
                form.published = Some(flag);
            }
            "sections" => form.sections_raw = Some(read_text(field, "sections").await?),
            "pdf" => {
                let file = read_file(field, max_file_size).await?;
                if file.content_type != PDF_MIME_TYPE {
                    return Err(AppError::BadRequest(format!(
                        "File type '{}' is not allowed for the newsletter document. Expected {}.",
                        file.content_type, PDF_MIME_TYPE
                    )));
                }
                form.pdf = Some(file);
            }
            "images" => {
                let file = read_file(field, max_file_size).await?;
                if !is_image_mime_allowed(&file.content_type) {
                    return Err(AppError::BadRequest(format!(
                        "File type '{}' is not allowed for images.",
                        file.content_type
                    )));
                }
                form.images.push(file);
            }
            other => debug!("Ignoring unknown field: {}", other),
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field.text().await.map_err(|e| {
        debug!("Failed to read field {}: {}", name, e);
        AppError::BadRequest(format!("Failed to read field '{}': {}", name, e))
    })
}

async fn read_file(
    field: axum::extract::multipart::Field<'_>,
    max_file_size: usize,
) -> Result<UploadedFile> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let original_filename = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unnamed".to_string());

    let data = field.bytes().await.map_err(|e| {
        debug!("Failed to read file bytes: {}", e);
        AppError::BadRequest(format!("Failed to read file data: {}", e))
    })?;

    if data.len() > max_file_size {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            max_file_size,
            max_file_size / 1024 / 1024
        )));
    }

    Ok(UploadedFile {
        original_filename,
        content_type,
        data: data.to_vec(),
    })
}
