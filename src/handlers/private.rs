//! Private API handlers, scoped to `/users/{userId}`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crate::handlers::extract::{PathParams, QueryParams, ValidJson};
use crate::models::comment::{CommentDto, NewCommentRequest, UpdateCommentRequest};
use crate::models::event::{EventFullDto, EventShortDto, NewEventRequest, UpdateEventUserRequest};
use crate::models::request::{EventRequestStatusUpdateRequest, EventRequestStatusUpdateResult, ParticipationRequestDto};
use crate::server::AppState;
use crate::utils::errors::Result;

pub async fn list_events(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<i64>,
    params: QueryParams,
) -> Result<Json<Vec<EventShortDto>>> {
    let page = params.page()?;
    let events = state.services.event_service.list_own(user_id, page).await?;
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<i64>,
    ValidJson(request): ValidJson<NewEventRequest>,
) -> Result<(StatusCode, Json<EventFullDto>)> {
    let event = state.services.event_service.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(state): State<AppState>,
    PathParams((user_id, event_id)): PathParams<(i64, i64)>,
) -> Result<Json<EventFullDto>> {
    let event = state.services.event_service.get_own(user_id, event_id).await?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    PathParams((user_id, event_id)): PathParams<(i64, i64)>,
    ValidJson(request): ValidJson<UpdateEventUserRequest>,
) -> Result<Json<EventFullDto>> {
    let event = state.services.event_service.update_own(user_id, event_id, request).await?;
    Ok(Json(event))
}

pub async fn list_event_requests(
    State(state): State<AppState>,
    PathParams((user_id, event_id)): PathParams<(i64, i64)>,
) -> Result<Json<Vec<ParticipationRequestDto>>> {
    let requests = state.services.request_service.list_for_event(user_id, event_id).await?;
    Ok(Json(requests))
}

pub async fn update_event_requests(
    State(state): State<AppState>,
    PathParams((user_id, event_id)): PathParams<(i64, i64)>,
    ValidJson(request): ValidJson<EventRequestStatusUpdateRequest>,
) -> Result<Json<EventRequestStatusUpdateResult>> {
    let result = state
        .services
        .request_service
        .update_statuses(user_id, event_id, request)
        .await?;
    Ok(Json(result))
}

pub async fn list_requests(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<i64>,
) -> Result<Json<Vec<ParticipationRequestDto>>> {
    let requests = state.services.request_service.list_own(user_id).await?;
    Ok(Json(requests))
}

pub async fn create_request(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<i64>,
    params: QueryParams,
) -> Result<(StatusCode, Json<ParticipationRequestDto>)> {
    let event_id: i64 = params.required("eventId")?;
    let request = state.services.request_service.join(user_id, event_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn cancel_request(
    State(state): State<AppState>,
    PathParams((user_id, request_id)): PathParams<(i64, i64)>,
) -> Result<Json<ParticipationRequestDto>> {
    let request = state.services.request_service.cancel(user_id, request_id).await?;
    Ok(Json(request))
}

pub async fn list_comments(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<i64>,
    params: QueryParams,
) -> Result<Json<Vec<CommentDto>>> {
    let page = params.page()?;
    let comments = state.services.comment_service.list_own(user_id, page).await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<i64>,
    params: QueryParams,
    ValidJson(request): ValidJson<NewCommentRequest>,
) -> Result<(StatusCode, Json<CommentDto>)> {
    let event_id: i64 = params.required("eventId")?;
    let comment = state.services.comment_service.create(user_id, event_id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    PathParams((user_id, comment_id)): PathParams<(i64, i64)>,
    ValidJson(request): ValidJson<UpdateCommentRequest>,
) -> Result<Json<CommentDto>> {
    let comment = state.services.comment_service.update_own(user_id, comment_id, request).await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    PathParams((user_id, comment_id)): PathParams<(i64, i64)>,
) -> Result<StatusCode> {
    state.services.comment_service.delete_own(user_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
