//! Admin API handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crate::handlers::extract::{PathParams, QueryParams, ValidJson};
use crate::models::category::{CategoryDto, NewCategoryRequest, UpdateCategoryRequest};
use crate::models::comment::{CommentDto, ModerateCommentRequest};
use crate::models::compilation::{CompilationDto, NewCompilationRequest, UpdateCompilationRequest};
use crate::models::event::{AdminEventFilter, EventFullDto, EventState, UpdateEventAdminRequest};
use crate::models::user::{NewUserRequest, UserDto};
use crate::server::AppState;
use crate::utils::errors::Result;

pub async fn create_category(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<NewCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>)> {
    let category = state.services.category_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    PathParams(category_id): PathParams<i64>,
    ValidJson(request): ValidJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryDto>> {
    let category = state.services.category_service.update(category_id, request).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    PathParams(category_id): PathParams<i64>,
) -> Result<StatusCode> {
    state.services.category_service.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(State(state): State<AppState>, params: QueryParams) -> Result<Json<Vec<UserDto>>> {
    let ids: Vec<i64> = params.list("ids")?;
    let page = params.page()?;
    let users = state.services.user_service.list(&ids, page).await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<NewUserRequest>,
) -> Result<(StatusCode, Json<UserDto>)> {
    let user = state.services.user_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn delete_user(State(state): State<AppState>, PathParams(user_id): PathParams<i64>) -> Result<StatusCode> {
    state.services.user_service.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_compilation(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<NewCompilationRequest>,
) -> Result<(StatusCode, Json<CompilationDto>)> {
    let compilation = state.services.compilation_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(compilation)))
}

pub async fn update_compilation(
    State(state): State<AppState>,
    PathParams(compilation_id): PathParams<i64>,
    ValidJson(request): ValidJson<UpdateCompilationRequest>,
) -> Result<Json<CompilationDto>> {
    let compilation = state.services.compilation_service.update(compilation_id, request).await?;
    Ok(Json(compilation))
}

pub async fn delete_compilation(
    State(state): State<AppState>,
    PathParams(compilation_id): PathParams<i64>,
) -> Result<StatusCode> {
    state.services.compilation_service.delete(compilation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_events(State(state): State<AppState>, params: QueryParams) -> Result<Json<Vec<EventFullDto>>> {
    let filter = AdminEventFilter {
        users: params.list("users")?,
        states: params.list_by("states", EventState::parse)?,
        categories: params.list("categories")?,
        range_start: params.timestamp("rangeStart")?,
        range_end: params.timestamp("rangeEnd")?,
    };
    let page = params.page()?;

    let events = state.services.event_service.search_admin(filter, page).await?;
    Ok(Json(events))
}

pub async fn update_event(
    State(state): State<AppState>,
    PathParams(event_id): PathParams<i64>,
    ValidJson(request): ValidJson<UpdateEventAdminRequest>,
) -> Result<Json<EventFullDto>> {
    let event = state.services.event_service.update_admin(event_id, request).await?;
    Ok(Json(event))
}

pub async fn list_comments(State(state): State<AppState>, params: QueryParams) -> Result<Json<Vec<CommentDto>>> {
    let page = params.page()?;
    let comments = state.services.comment_service.moderation_queue(page).await?;
    Ok(Json(comments))
}

pub async fn moderate_comment(
    State(state): State<AppState>,
    PathParams(comment_id): PathParams<i64>,
    ValidJson(request): ValidJson<ModerateCommentRequest>,
) -> Result<Json<CommentDto>> {
    let comment = state.services.comment_service.moderate(comment_id, request.status).await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    PathParams(comment_id): PathParams<i64>,
) -> Result<StatusCode> {
    state.services.comment_service.delete_admin(comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
