//! Owning store handles over a backend.
//!
//! - [`DocumentStore`] - bound to a concrete backend type known at compile time
//! - [`DynDocumentStore`] - holds a boxed [`DynStoreBackend`], for backends chosen at runtime
//!
//! # Example
//!
//! ```ignore
//! use ticketdesk_core::store::{DocumentStore, IntoDynDocumentStore};
//!
//! let store = DocumentStore::new(backend).into_dyn();
//! let tickets = store.typed_collection::<EventTicket>();
//! ```

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::{DynTypedCollection, TypedCollection},
    document::Document,
    error::DocumentStoreResult,
};

#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Gets a typed collection named after the document type.
    pub fn typed_collection<'a, D: Document>(&'a self) -> TypedCollection<'a, B, D> {
        TypedCollection::new(D::collection_name().to_string(), &self.backend)
    }

    /// Creates a new collection with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the collection.
    pub async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.backend
            .create_collection(name)
            .await
    }

    /// Lists all collections in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Adds an index to a field in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be created.
    pub async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()> {
        self.backend
            .add_index(collection, field, unique)
            .await
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to shut down cleanly.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }
}

#[derive(Debug)]
pub struct DynDocumentStore {
    backend: Box<dyn DynStoreBackend>,
}

impl DynDocumentStore {
    /// Creates a dynamic store over an already boxed backend.
    pub fn new(backend: Box<dyn DynStoreBackend>) -> Self {
        Self { backend }
    }

    /// Gets a typed collection named after the document type.
    pub fn typed_collection<'a, D: Document>(&'a self) -> DynTypedCollection<'a, D> {
        DynTypedCollection::new(D::collection_name().to_string(), &*self.backend)
    }

    /// Creates a new collection with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the collection.
    pub async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.backend
            .create_collection(name)
            .await
    }

    /// Lists all collections in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Adds an index to a field in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be created.
    pub async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()> {
        self.backend
            .add_index(collection, field, unique)
            .await
    }

    /// Borrows the backend as a concrete type, if it is one.
    pub fn downcast_backend<B: StoreBackend + 'static>(&self) -> Option<&B> {
        self.backend
            .as_any()
            .downcast_ref::<B>()
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to shut down cleanly.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown_boxed().await
    }
}

/// Conversion into a [`DynDocumentStore`].
pub trait IntoDynDocumentStore {
    /// Converts this store into a dynamic owned store.
    fn into_dyn(self) -> DynDocumentStore;
}

impl<B: StoreBackend + 'static> IntoDynDocumentStore for DocumentStore<B> {
    fn into_dyn(self) -> DynDocumentStore {
        DynDocumentStore::new(Box::new(self.backend))
    }
}

impl IntoDynDocumentStore for DynDocumentStore {
    fn into_dyn(self) -> DynDocumentStore {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::{Bson, doc};
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    use crate::{id::DocumentId, query::{Expr, Query}};

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Venue {
        #[serde(rename = "_id")]
        id: DocumentId,
        name: String,
    }

    impl Document for Venue {
        fn id(&self) -> &DocumentId {
            &self.id
        }

        fn collection_name() -> &'static str {
            "venues"
        }
    }

    /// Keeps inserted documents and reports which collection each call targeted.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        documents: Mutex<Vec<Bson>>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn record(&self, call: &str, collection: &str) {
            self.calls.lock().unwrap().push(format!("{call}:{collection}"));
        }
    }

    #[async_trait]
    impl StoreBackend for RecordingBackend {
        async fn insert_documents(&self, documents: Vec<(DocumentId, Bson)>, collection: &str) -> DocumentStoreResult<()> {
            self.record("insert", collection);
            self.documents
                .lock()
                .unwrap()
                .extend(documents.into_iter().map(|(_, doc)| doc));
            Ok(())
        }

        async fn query_documents(&self, _: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
            self.record("query", collection);
            Ok(self.documents.lock().unwrap().clone())
        }

        async fn count_documents(&self, _: Option<Expr>, collection: &str) -> DocumentStoreResult<u64> {
            self.record("count", collection);
            Ok(self.documents.lock().unwrap().len() as u64)
        }

        async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
            self.record("create", name);
            Ok(())
        }

        async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
            Ok(vec!["venues".to_string()])
        }

        async fn add_index(&self, collection: &str, field: &str, _: bool) -> DocumentStoreResult<()> {
            self.record(&format!("index({field})"), collection);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_typed_collection_round_trips_through_backend() {
        let store = DocumentStore::new(RecordingBackend::default());
        let venues = store.typed_collection::<Venue>();
        let venue = Venue { id: DocumentId::new(), name: "Hall".to_string() };

        venues.insert(vec![venue.clone()]).await.unwrap();

        assert_eq!(venues.name(), "venues");
        assert_eq!(venues.query(Query::new()).await.unwrap(), vec![venue]);
        assert_eq!(venues.count(None).await.unwrap(), 1);
        assert_eq!(
            *store.backend().calls.lock().unwrap(),
            vec!["insert:venues", "query:venues", "count:venues"],
        );
    }

    #[tokio::test]
    async fn test_dyn_store_dispatches_and_downcasts() {
        let store = DocumentStore::new(RecordingBackend::default()).into_dyn();

        store.create_collection("venues").await.unwrap();
        store.add_index("venues", "name", false).await.unwrap();
        assert_eq!(store.list_collections().await.unwrap(), vec!["venues"]);

        let backend = store.downcast_backend::<RecordingBackend>().unwrap();
        assert_eq!(
            *backend.calls.lock().unwrap(),
            vec!["create:venues", "index(name):venues"],
        );

        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_dyn_collection_rejects_undecodable_documents() {
        let backend = RecordingBackend::default();
        backend.documents.lock().unwrap().push(Bson::Document(doc! { "name": 3 }));
        let store = DocumentStore::new(backend).into_dyn();

        assert!(store.typed_collection::<Venue>().query(Query::new()).await.is_err());
    }
}
