use crate::api::AppState;
use crate::api::schemas::messages::{DeletedResponse, MessageRequest};
use crate::error::{AppError, Result};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

fn parse_message_id(raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| AppError::BadRequest("message id should be a number".into()))
}

/// Fetches a single message.
///
/// # Errors
/// Returns `AppError::BadRequest` if the id is not a number.
/// Returns `AppError::NotFound` if the message does not exist.
pub async fn get_message(State(state): State<AppState>, Path(message_id): Path<String>) -> Result<impl IntoResponse> {
    let id = parse_message_id(&message_id)?;
    let message = state.message_service.get_message(id).await?;
    Ok(Json(message))
}

/// Lists every message.
///
/// # Errors
/// Returns `AppError::NotFound` if there are no messages.
pub async fn get_all_messages(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let messages = state.message_service.get_all_messages().await?;
    Ok(Json(messages))
}

/// Creates a message.
///
/// # Errors
/// Returns `AppError::InvalidRequest` if the body is malformed or fails validation.
/// Returns `AppError::ServerError` if the title is already taken.
pub async fn create_message(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let request = MessageRequest::from_json(&body)?;
    let message = state.message_service.create_message(request.into()).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Replaces the title and body of a message.
///
/// # Errors
/// Returns `AppError::BadRequest` if the id is not a number.
/// Returns `AppError::InvalidRequest` if the body is malformed or fails validation.
/// Returns `AppError::NotFound` if the message does not exist.
pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let id = parse_message_id(&message_id)?;
    let request = MessageRequest::from_json(&body)?;
    let message = state.message_service.update_message(id, request.into()).await?;
    Ok(Json(message))
}

/// Deletes a message.
///
/// # Errors
/// Returns `AppError::BadRequest` if the id is not a number.
/// Returns `AppError::NotFound` if the message does not exist.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_message_id(&message_id)?;
    state.message_service.delete_message(id).await?;
    Ok(Json(DeletedResponse::deleted()))
}
