//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the seam between the catalog and a concrete store
//! (in-memory or MongoDB). [`DynStoreBackend`] is its object-safe twin, implemented
//! for every `StoreBackend`, so the backend can be picked at runtime from configuration.
//!
//! # Example
//!
//! ```ignore
//! use ticketdesk_core::{backend::StoreBackend, id::DocumentId, query::Query};
//! use bson::{Bson, doc};
//!
//! let backend = MyBackendImpl::new();
//!
//! let doc = Bson::Document(doc! { "name": "Rust Meetup", "soldTickets": 12 });
//! backend.insert_documents(vec![(DocumentId::new(), doc)], "eventtickets").await?;
//!
//! let total = backend.count_documents(None, "eventtickets").await?;
//! assert_eq!(total, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Bson;
use std::{any::Any, fmt::Debug};

use crate::{
    error::DocumentStoreResult,
    id::DocumentId,
    query::{Expr, Query},
};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the HTTP layer shares a single backend
/// across all in-flight requests, and a request may issue several calls to it
/// concurrently (a count and a page fetch, for instance).
///
/// # Consistency
///
/// No call is transactional with respect to any other. Two reads issued together may
/// observe different states of a collection if writes land in between.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts new documents into a collection.
    ///
    /// The collection is created on first insert. Each document is stored with its id
    /// written to [`ID_FIELD`](crate::id::ID_FIELD), replacing any value already there,
    /// and reads return that field. Inserting an ID that already exists
    /// fails with [`DocumentAlreadyExists`](crate::error::DocumentStoreError::DocumentAlreadyExists)
    /// on backends that can detect it.
    async fn insert_documents(
        &self,
        documents: Vec<(DocumentId, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Returns the documents matching `query`, sorted, skipped and limited as requested.
    ///
    /// Querying a collection that does not exist yields an empty result.
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Counts the documents matching `filter`, or every document when `filter` is `None`.
    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> DocumentStoreResult<u64>;

    /// Creates an empty collection. Creating an existing collection is not an error
    /// for the in-memory backend; other backends document their own behavior.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Creates an ascending index on `field`. Backends without indexes treat this as a no-op.
    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()>;

    /// Releases connections and other resources held by the backend.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn insert_documents(
        &self,
        documents: Vec<(DocumentId, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()>;
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;
    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> DocumentStoreResult<u64>;
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;
    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()>;
    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()>;

    fn as_any(&self) -> &dyn Any;
}

#[async_trait]
impl<B: StoreBackend + Send + Sync + 'static> DynStoreBackend for B {
    async fn insert_documents(
        &self,
        documents: Vec<(DocumentId, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        StoreBackend::insert_documents(self, documents, collection).await
    }

    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        StoreBackend::query_documents(self, query, collection).await
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> DocumentStoreResult<u64> {
        StoreBackend::count_documents(self, filter, collection).await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        StoreBackend::create_collection(self, name).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        StoreBackend::list_collections(self).await
    }

    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()> {
        StoreBackend::add_index(self, collection, field, unique).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()> {
        StoreBackend::shutdown(*self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
