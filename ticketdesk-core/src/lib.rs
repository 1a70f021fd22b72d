//! Document store abstraction underneath the ticketdesk catalog.
//!
//! This crate carries everything the catalog needs from a storage layer and nothing
//! the catalog never asks for:
//!
//! - **Documents** ([`document`]) - The [`Document`](document::Document) trait and BSON conversion
//! - **Identity** ([`id`]) - [`DocumentId`](id::DocumentId), an ObjectId or UUID kept in `_id`
//! - **Backends** ([`backend`]) - The async [`StoreBackend`](backend::StoreBackend) seam and its dynamic twin
//! - **Queries** ([`query`]) - Filter expressions, multi-key sorting, limit and offset
//! - **Collections** ([`collection`]) - Typed views that decode documents on the way out
//! - **Stores** ([`store`]) - Owning handles over a backend, static or dynamically dispatched
//! - **Pagination** ([`page`]) - Page requests with clamping and offset arithmetic
//! - **Errors** ([`error`]) - [`DocumentStoreError`](error::DocumentStoreError) and its result alias
//!
//! # Example
//!
//! ```ignore
//! use ticketdesk_core::{document::Document, query::{Filter, Query, SortDirection}};
//!
//! let tickets = store.typed_collection::<EventTicket>();
//! let upcoming = tickets
//!     .query(
//!         Query::builder()
//!             .filter(Filter::eq_ignore_case("eventCategory", "web3"))
//!             .sort("eventDate", SortDirection::Asc)
//!             .limit(8)
//!             .build(),
//!     )
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as ticketdesk_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod id;
pub mod page;
pub mod query;
pub mod store;
