//! Typed collection views over a storage backend.
//!
//! A collection view knows its name and its document type, and decodes whatever the
//! backend returns into that type. Two flavours exist:
//!
//! - [`TypedCollection`] - statically dispatched over a concrete backend
//! - [`DynTypedCollection`] - dynamically dispatched over a [`DynStoreBackend`]
//!
//! # Example
//!
//! ```ignore
//! let tickets = store.typed_collection::<EventTicket>();
//! let newest = tickets
//!     .query(Query::builder().sort("createdAt", SortDirection::Desc).limit(8).build())
//!     .await?;
//! let total = tickets.count(None).await?;
//! ```

use bson::Bson;
use std::marker::PhantomData;

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    document::{Document, DocumentExt},
    error::DocumentStoreResult,
    id::DocumentId,
    query::{Expr, Query},
};

fn encode_all<D: Document>(documents: Vec<D>) -> DocumentStoreResult<Vec<(DocumentId, Bson)>> {
    documents
        .into_iter()
        .map(|d| {
            d.to_bson()
                .map(|b| (*d.id(), b))
        })
        .collect()
}

fn decode_all<D: Document>(documents: Vec<Bson>) -> DocumentStoreResult<Vec<D>> {
    documents
        .into_iter()
        .map(D::from_bson)
        .collect()
}

#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts new documents into the collection.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if serialization or insertion fails.
    pub async fn insert(&self, documents: Vec<D>) -> DocumentStoreResult<()> {
        self.backend
            .insert_documents(encode_all(documents)?, self.name())
            .await
    }

    /// Queries documents in the collection and decodes them.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the query or decoding fails.
    pub async fn query(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        decode_all(
            self.backend
                .query_documents(query, self.name())
                .await?,
        )
    }

    /// Counts documents matching `filter`, or all documents when `filter` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the backend fails.
    pub async fn count(&self, filter: Option<Expr>) -> DocumentStoreResult<u64> {
        self.backend
            .count_documents(filter, self.name())
            .await
    }
}

#[derive(Debug)]
pub struct DynTypedCollection<'a, D: Document> {
    name: String,
    backend: &'a dyn DynStoreBackend,
    _marker: PhantomData<D>,
}

impl<'a, D: Document> DynTypedCollection<'a, D> {
    pub(crate) fn new(name: String, backend: &'a dyn DynStoreBackend) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts new documents into the collection.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if serialization or insertion fails.
    pub async fn insert(&self, documents: Vec<D>) -> DocumentStoreResult<()> {
        self.backend
            .insert_documents(encode_all(documents)?, self.name())
            .await
    }

    /// Queries documents in the collection and decodes them.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the query or decoding fails.
    pub async fn query(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        decode_all(
            self.backend
                .query_documents(query, self.name())
                .await?,
        )
    }

    /// Counts documents matching `filter`, or all documents when `filter` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the backend fails.
    pub async fn count(&self, filter: Option<Expr>) -> DocumentStoreResult<u64> {
        self.backend
            .count_documents(filter, self.name())
            .await
    }
}
