//! MongoDB backend implementation for ticketdesk.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait, so the
//! catalog can serve tickets from a real deployment. Filters, sorting, offsets and counts
//! are all pushed down to the server.
//!
//! To use this backend, enable the `mongodb` feature of the `ticketdesk` crate:
//!
//! ```toml
//! [dependencies]
//! ticketdesk = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ticketdesk_core::backend::StoreBackendBuilder;
//! use ticketdesk_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "ticketdesk")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as ticketdesk_mongodb;

pub mod store;
mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
