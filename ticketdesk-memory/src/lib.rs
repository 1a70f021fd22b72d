//! In-memory document storage backend for ticketdesk.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It backs the catalog in development and in tests, and is the default store when no
//! MongoDB deployment is configured.
//!
//! # Features
//!
//! - **Concurrent reads** - count and page queries share an async-aware RwLock
//! - **Stable ordering** - documents keep insertion order, so equal sort keys never reshuffle
//! - **Full query support** - filtering, multi-key sorting, offset and limit
//!
//! # Quick Start
//!
//! ```ignore
//! use ticketdesk_core::{backend::StoreBackendBuilder, store::DocumentStore};
//! use ticketdesk_memory::InMemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder().build().await?;
//!     let store = DocumentStore::new(backend);
//!     let tickets = store.typed_collection::<EventTicket>();
//!
//!     tickets.insert(vec![ticket]).await?;
//!     assert_eq!(tickets.count(None).await?, 1);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as ticketdesk_memory;

pub mod store;
mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
