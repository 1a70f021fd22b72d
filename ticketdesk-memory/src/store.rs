//! In-memory storage implementation for document stores.
//!
//! Documents live as BSON values in insertion order inside each collection, guarded
//! by an async-aware read-write lock. Reads take the shared lock, so concurrent
//! count and page queries from the catalog never wait on each other.

use std::{collections::HashMap, sync::Arc, cmp::Ordering};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document};

use ticketdesk_core::{
    query::{Expr, Query, Sort, SortDirection},
    error::{DocumentStoreError, DocumentStoreResult},
    backend::{StoreBackend, StoreBackendBuilder},
    id::{DocumentId, ID_FIELD},
};

use crate::evaluator::{DocumentEvaluator, compare_field};

/// One collection: documents in insertion order plus an id index.
#[derive(Default, Debug)]
struct StoredCollection {
    ids: HashMap<String, usize>,
    documents: Vec<Bson>,
}

impl StoredCollection {
    fn matching<'a>(&'a self, filter: Option<&'a Expr>) -> impl Iterator<Item = DocumentStoreResult<&'a Bson>> + 'a {
        self.documents
            .iter()
            .filter_map(move |doc| match DocumentEvaluator::matches(doc, filter) {
                Ok(true) => Some(Ok(doc)),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            })
    }
}

type StoreMap = HashMap<String, StoredCollection>;

fn compare_documents(left: &Bson, right: &Bson, sort: &[Sort]) -> Ordering {
    let (Some(left), Some(right)) = (left.as_document(), right.as_document()) else {
        return Ordering::Equal;
    };

    sort.iter()
        .map(|key| ordered(left, right, key))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn ordered(left: &Document, right: &Document, key: &Sort) -> Ordering {
    match key.direction {
        SortDirection::Asc => compare_field(left, right, &key.field),
        SortDirection::Desc => compare_field(right, left, &key.field),
    }
}


/// Thread-safe in-memory document storage backend.
///
/// Clones share the same underlying data.
///
/// # Performance
///
/// Queries scan the whole collection; there are no indexes. This is intended for
/// development, demos and tests.
///
/// # Example
///
/// ```ignore
/// use ticketdesk_memory::InMemoryStore;
/// use ticketdesk_core::backend::StoreBackend;
/// use ticketdesk_core::id::DocumentId;
/// use bson::{Bson, doc};
///
/// let store = InMemoryStore::new();
/// store.insert_documents(vec![(DocumentId::new(), Bson::Document(doc! { "name": "Rust Meetup" }))], "eventtickets").await?;
/// assert_eq!(store.count_documents(None, "eventtickets").await?, 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> collection
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_documents(&self, documents: Vec<(DocumentId, Bson)>, collection: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let stored = store
            .entry(collection.to_string())
            .or_default();

        for (id, doc) in documents {
            let key = id.to_string();

            if stored.ids.contains_key(&key) {
                return Err(DocumentStoreError::DocumentAlreadyExists(key, collection.to_string()));
            }
            let Bson::Document(mut doc) = doc else {
                return Err(DocumentStoreError::InvalidDocument(
                    format!("document {key} is not a BSON document"),
                ));
            };

            doc.insert(ID_FIELD, id);
            stored.ids.insert(key, stored.documents.len());
            stored.documents.push(Bson::Document(doc));
        }

        Ok(())
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let Some(stored) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched = stored
            .matching(query.filter.as_ref())
            .collect::<DocumentStoreResult<Vec<&Bson>>>()?;

        // sort_by is stable, so ties keep insertion order
        if !query.sort.is_empty() {
            matched.sort_by(|a, b| compare_documents(a, b, &query.sort));
        }

        Ok(
            matched
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .cloned()
                .collect()
        )
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> DocumentStoreResult<u64> {
        let store = self.store.read().await;
        let Some(stored) = store.get(collection) else {
            return Ok(0);
        };

        let mut count = 0_u64;
        for matched in stored.matching(filter.as_ref()) {
            matched?;
            count += 1;
        }

        Ok(count)
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        let mut names = self.store
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();

        Ok(names)
    }

    async fn add_index(&self, _collection: &str, _field: &str, _unique: bool) -> DocumentStoreResult<()> {
        // In-memory store does not support indexing (no-op)
        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use ticketdesk_core::query::Filter;

    const COLLECTION: &str = "eventtickets";

    async fn seeded(rows: Vec<Document>) -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert_documents(
                rows.into_iter()
                    .map(|row| (DocumentId::new(), Bson::Document(row)))
                    .collect(),
                COLLECTION,
            )
            .await
            .unwrap();
        store
    }

    fn names(docs: &[Bson]) -> Vec<String> {
        docs.iter()
            .map(|d| d.as_document().unwrap().get_str("name").unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = InMemoryStore::new();
        let id = DocumentId::new();
        let doc = Bson::Document(doc! { "name": "a" });

        store.insert_documents(vec![(id, doc.clone())], COLLECTION).await.unwrap();
        let err = store.insert_documents(vec![(id, doc)], COLLECTION).await.unwrap_err();

        assert!(matches!(err, DocumentStoreError::DocumentAlreadyExists(_, _)));
    }

    #[tokio::test]
    async fn test_insert_records_id_in_document() {
        let store = InMemoryStore::new();
        let id: DocumentId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();

        store
            .insert_documents(
                vec![(id, Bson::Document(doc! { "_id": "stale", "name": "a" }))],
                COLLECTION,
            )
            .await
            .unwrap();

        let docs = store.query_documents(Query::new(), COLLECTION).await.unwrap();
        let stored = docs[0].as_document().unwrap();
        assert_eq!(stored.get(ID_FIELD), Some(&Bson::from(id)));
        assert_eq!(stored.get_str("name").unwrap(), "a");
    }

    #[tokio::test]
    async fn test_non_document_is_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .insert_documents(vec![(DocumentId::new(), Bson::Int32(1))], COLLECTION)
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentStoreError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_query_missing_collection_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.query_documents(Query::new(), "nothing").await.unwrap().is_empty());
        assert_eq!(store.count_documents(None, "nothing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_multi_key_sort_breaks_ties() {
        let store = seeded(vec![
            doc! { "name": "a", "soldTickets": 150_i64, "updatedAt": 1_i64 },
            doc! { "name": "b", "soldTickets": 300_i64, "updatedAt": 1_i64 },
            doc! { "name": "c", "soldTickets": 150_i64, "updatedAt": 9_i64 },
        ])
        .await;

        let docs = store
            .query_documents(
                Query::builder()
                    .sort("soldTickets", SortDirection::Desc)
                    .sort("updatedAt", SortDirection::Desc)
                    .build(),
                COLLECTION,
            )
            .await
            .unwrap();

        assert_eq!(names(&docs), vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_unsorted_query_keeps_insertion_order_with_offset_and_limit() {
        let store = seeded(
            (0..6).map(|i| doc! { "name": format!("t{i}") }).collect()
        )
        .await;

        let docs = store
            .query_documents(Query::builder().offset(2).limit(3).build(), COLLECTION)
            .await
            .unwrap();

        assert_eq!(names(&docs), vec!["t2", "t3", "t4"]);
    }

    #[tokio::test]
    async fn test_count_applies_filter() {
        let store = seeded(vec![
            doc! { "name": "a", "eventCategory": "Web3" },
            doc! { "name": "b", "eventCategory": "web3" },
            doc! { "name": "c", "eventCategory": "Music" },
        ])
        .await;

        let web3 = store
            .count_documents(Some(Filter::eq_ignore_case("eventCategory", "WEB3")), COLLECTION)
            .await
            .unwrap();

        assert_eq!(web3, 2);
        assert_eq!(store.count_documents(None, COLLECTION).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_invalid_filter_surfaces_error() {
        let store = seeded(vec![doc! { "name": "a", "eventCategory": "Web3" }]).await;

        let result = store
            .query_documents(
                Query::builder()
                    .filter(Filter::any_of("eventCategory", "Web3"))
                    .build(),
                COLLECTION,
            )
            .await;

        assert!(matches!(result, Err(DocumentStoreError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_list_collections_sorted() {
        let store = InMemoryStore::new();
        store.create_collection("b").await.unwrap();
        store.create_collection("a").await.unwrap();
        store.create_collection("a").await.unwrap();

        assert_eq!(store.list_collections().await.unwrap(), vec!["a", "b"]);
    }
}
