//! HTTP surface of the catalog.
//!
//! [`ticket_routes`] exposes the catalog endpoints at its root so it can be mounted
//! anywhere; [`build_router`] mounts it at `/api/event-tickets` next to `/health`.

pub mod error;
pub mod handlers;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::catalog::TicketCatalog;

pub use error::ApiError;

/// Mount point of the ticket routes in [`build_router`].
pub const TICKETS_PATH: &str = "/api/event-tickets";

/// The catalog endpoints, relative to wherever they are mounted.
pub fn ticket_routes() -> Router<TicketCatalog> {
    Router::new()
        .route("/", get(handlers::list_tickets))
        .route("/trending", get(handlers::list_trending))
        .route("/category/", get(handlers::list_by_category))
        .route("/category/:category", get(handlers::list_by_category))
}

/// Build the complete router, with request tracing.
///
/// # Arguments
///
/// - `catalog`: shared with every handler
pub fn build_router(catalog: TicketCatalog) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // a nested "/" route does not match the trailing slash
        .route(&format!("{TICKETS_PATH}/"), get(handlers::list_tickets))
        .nest(TICKETS_PATH, ticket_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}
