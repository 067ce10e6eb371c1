use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{self, auth, calendar, items, outfits};
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/me", get(auth::me))
        // Wardrobe items
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/summary", get(items::summary))
        .route(
            "/items/:id",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        // Outfits
        .route("/outfits", get(outfits::list_outfits).post(outfits::create_outfit))
        .route("/outfits/generate", post(outfits::generate))
        // Calendar
        .route(
            "/calendar",
            get(calendar::list_entries).post(calendar::create_entry),
        )
        .route("/calendar/:id", delete(calendar::delete_entry))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
