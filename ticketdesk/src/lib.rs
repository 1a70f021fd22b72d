//! Read-only event ticket catalog served over HTTP.
//!
//! This crate ties the document store abstraction to the ticket domain: the stored
//! [`EventTicket`](model::EventTicket), the [`TicketCatalog`](catalog::TicketCatalog)
//! query layer, the response projection and the axum router.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ticketdesk::{prelude::*, memory::InMemoryStore, api::build_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = DocumentStore::new(InMemoryStore::new()).into_dyn();
//!     let catalog = TicketCatalog::new(Arc::new(store));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, build_router(catalog)).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - in-memory storage for development and testing
//! - [`mongodb`] - MongoDB storage (requires the `mongodb` feature)

pub mod prelude;
pub mod model;
pub mod presenter;
pub mod catalog;
pub mod api;
pub mod config;
pub mod bootstrap;

pub use ticketdesk_core::{backend, collection, document, error, id, page, query, store};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use ticketdesk_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use ticketdesk_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
