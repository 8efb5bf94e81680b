//! Public API handlers

use axum::extract::State;
use axum::Json;
use crate::handlers::extract::{ClientIp, PathParams, QueryParams};
use crate::models::category::CategoryDto;
use crate::models::comment::CommentDto;
use crate::models::compilation::CompilationDto;
use crate::models::event::{EventFullDto, EventShortDto, EventSort, PublicEventFilter};
use crate::server::AppState;
use crate::utils::errors::Result;

pub async fn list_categories(State(state): State<AppState>, params: QueryParams) -> Result<Json<Vec<CategoryDto>>> {
    let page = params.page()?;
    let categories = state.services.category_service.list(page).await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    PathParams(category_id): PathParams<i64>,
) -> Result<Json<CategoryDto>> {
    let category = state.services.category_service.get(category_id).await?;
    Ok(Json(category))
}

fn parse_sort(raw: &str) -> Option<EventSort> {
    match raw {
        "EVENT_DATE" => Some(EventSort::EventDate),
        "VIEWS" => Some(EventSort::Views),
        _ => None,
    }
}

/// Parse the public search filters
pub fn public_filter(params: &QueryParams) -> Result<PublicEventFilter> {
    Ok(PublicEventFilter {
        text: params.get("text").map(str::to_string),
        categories: params.list("categories")?,
        paid: params.value("paid")?,
        range_start: params.timestamp("rangeStart")?,
        range_end: params.timestamp("rangeEnd")?,
        only_available: params.value("onlyAvailable")?.unwrap_or(false),
        sort: params.parse_by("sort", parse_sort)?.unwrap_or_default(),
    })
}

pub async fn search_events(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    params: QueryParams,
) -> Result<Json<Vec<EventShortDto>>> {
    let filter = public_filter(&params)?;
    let page = params.page()?;

    let events = state.services.event_service.search_public(filter, page, &ip).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    PathParams(event_id): PathParams<i64>,
) -> Result<Json<EventFullDto>> {
    let event = state.services.event_service.get_public(event_id, &ip).await?;
    Ok(Json(event))
}

pub async fn list_compilations(State(state): State<AppState>, params: QueryParams) -> Result<Json<Vec<CompilationDto>>> {
    let pinned: Option<bool> = params.value("pinned")?;
    let page = params.page()?;
    let compilations = state.services.compilation_service.list(pinned, page).await?;
    Ok(Json(compilations))
}

pub async fn get_compilation(
    State(state): State<AppState>,
    PathParams(compilation_id): PathParams<i64>,
) -> Result<Json<CompilationDto>> {
    let compilation = state.services.compilation_service.get(compilation_id).await?;
    Ok(Json(compilation))
}

pub async fn list_event_comments(
    State(state): State<AppState>,
    PathParams(event_id): PathParams<i64>,
    params: QueryParams,
) -> Result<Json<Vec<CommentDto>>> {
    let page = params.page()?;
    let comments = state.services.comment_service.list_public(event_id, page).await?;
    Ok(Json(comments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_filter_defaults() {
        let filter = public_filter(&QueryParams::parse("")).unwrap();
        assert_eq!(filter, PublicEventFilter::default());
    }

    #[test]
    fn test_public_filter_parses_every_field() {
        let filter = public_filter(&QueryParams::parse(
            "text=swing&categories=1,2&paid=true&onlyAvailable=true&sort=VIEWS&rangeStart=2030-01-01%2000%3A00%3A00",
        ))
        .unwrap();
        assert_eq!(filter.text.as_deref(), Some("swing"));
        assert_eq!(filter.categories, vec![1, 2]);
        assert_eq!(filter.paid, Some(true));
        assert!(filter.only_available);
        assert_eq!(filter.sort, EventSort::Views);
        assert!(filter.range_start.is_some());
        assert!(filter.range_end.is_none());
    }

    #[test]
    fn test_public_filter_rejects_unknown_sort() {
        assert!(public_filter(&QueryParams::parse("sort=POPULAR")).is_err());
    }
}
