//! Subscriber endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::subscribers::dtos::{
    RemoveSubscriberResponseDto, SubscribeDto, SubscriberResponseDto, UnsubscribeDto,
};
use crate::features::subscribers::services::SubscriberService;
use crate::shared::types::{ApiResponse, Meta};

/// Subscribe an email address
///
/// Public endpoint used by the site footer form.
#[utoipa::path(
    post,
    path = "/api/subscribers",
    request_body = SubscribeDto,
    responses(
        (status = 201, description = "Subscribed successfully", body = ApiResponse<SubscriberResponseDto>),
        (status = 400, description = "Invalid email address"),
        (status = 409, description = "Email already subscribed")
    ),
    tag = "subscribers"
)]
pub async fn subscribe(
    State(service): State<Arc<SubscriberService>>,
    AppJson(dto): AppJson<SubscribeDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriberResponseDto>>)> {
    dto.validate()
        .map_err(|_| AppError::Validation("Invalid email address.".to_string()))?;

    let subscriber = service.subscribe(&dto.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(subscriber),
            Some("Subscribed successfully!".to_string()),
            None,
        )),
    ))
}

/// List all subscribers
#[utoipa::path(
    get,
    path = "/api/subscribers",
    responses(
        (status = 200, description = "List of subscribers", body = ApiResponse<Vec<SubscriberResponseDto>>)
    ),
    tag = "subscribers"
)]
pub async fn list_subscribers(
    State(service): State<Arc<SubscriberService>>,
) -> Result<Json<ApiResponse<Vec<SubscriberResponseDto>>>> {
    let subscribers = service.list().await?;
    let total = subscribers.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(subscribers),
        None,
        Some(Meta { total }),
    )))
}

/// Remove a subscriber by id
#[utoipa::path(
    delete,
    path = "/api/subscribers/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscriber ID")
    ),
    responses(
        (status = 200, description = "Subscriber removed", body = ApiResponse<RemoveSubscriberResponseDto>),
        (status = 404, description = "Subscriber not found")
    ),
    tag = "subscribers"
)]
pub async fn remove_subscriber(
    State(service): State<Arc<SubscriberService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RemoveSubscriberResponseDto>>> {
    service.remove(id).await?;

    Ok(Json(ApiResponse::success(
        Some(RemoveSubscriberResponseDto { deleted: true }),
        Some("Subscriber removed successfully.".to_string()),
        None,
    )))
}

/// Deactivate a subscription by email
///
/// Target of the unsubscribe link in newsletter emails. Idempotent.
#[utoipa::path(
    post,
    path = "/api/subscribers/unsubscribe",
    request_body = UnsubscribeDto,
    responses(
        (status = 200, description = "Unsubscribed"),
        (status = 400, description = "Invalid email address")
    ),
    tag = "subscribers"
)]
pub async fn unsubscribe(
    State(service): State<Arc<SubscriberService>>,
    AppJson(dto): AppJson<UnsubscribeDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|_| AppError::Validation("Invalid email address.".to_string()))?;

    service.unsubscribe(&dto.email).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Unsubscribed successfully.".to_string()),
        None,
    )))
}
