//! Router configuration for both services

use axum::routing::{delete, get, patch, post};
use axum::Router;
use crate::handlers::{admin, health, private, public, stats};
use crate::middleware::http_trace_layer;
use crate::server::{AppState, StatsState};

/// Admin, private and public API of the main service
pub fn main_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/categories", post(admin::create_category))
        .route(
            "/categories/:cat_id",
            patch(admin::update_category).delete(admin::delete_category),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/:user_id", delete(admin::delete_user))
        .route("/compilations", post(admin::create_compilation))
        .route(
            "/compilations/:comp_id",
            patch(admin::update_compilation).delete(admin::delete_compilation),
        )
        .route("/events", get(admin::search_events))
        .route("/events/:event_id", patch(admin::update_event))
        .route("/comments", get(admin::list_comments))
        .route(
            "/comments/:comment_id",
            patch(admin::moderate_comment).delete(admin::delete_comment),
        );

    let private_routes = Router::new()
        .route("/events", get(private::list_events).post(private::create_event))
        .route(
            "/events/:event_id",
            get(private::get_event).patch(private::update_event),
        )
        .route(
            "/events/:event_id/requests",
            get(private::list_event_requests).patch(private::update_event_requests),
        )
        .route("/requests", get(private::list_requests).post(private::create_request))
        .route("/requests/:request_id/cancel", patch(private::cancel_request))
        .route("/comments", get(private::list_comments).post(private::create_comment))
        .route(
            "/comments/:comment_id",
            patch(private::update_comment).delete(private::delete_comment),
        );

    Router::new()
        .route("/health", get(health::main_health))
        .route("/categories", get(public::list_categories))
        .route("/categories/:cat_id", get(public::get_category))
        .route("/events", get(public::search_events))
        .route("/events/:id", get(public::get_event))
        .route("/compilations", get(public::list_compilations))
        .route("/compilations/:comp_id", get(public::get_compilation))
        .route("/comments/:event_id", get(public::list_event_comments))
        .nest("/admin", admin_routes)
        .nest("/users/:user_id", private_routes)
        .with_state(state)
        .layer(http_trace_layer())
}

/// Hit recording and aggregation API of the stats service
pub fn stats_router(state: StatsState) -> Router {
    Router::new()
        .route("/health", get(health::stats_health))
        .route("/hit", post(stats::record_hit))
        .route("/stats", get(stats::get_stats))
        .with_state(state)
        .layer(http_trace_layer())
}
