//! Read-side query layer over the ticket collection.
//!
//! [`TicketCatalog`] turns page requests into store queries and store documents into
//! [`EventTicketResponse`]s. It holds no state besides a shared handle to the store and
//! the presentation time zone, so it is cheap to clone into every request.

use std::sync::Arc;

use futures::try_join;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ticketdesk_core::{
    error::DocumentStoreError,
    page::{PageRequest, Pagination},
    query::{Expr, Filter, Query, SortDirection},
    store::DynDocumentStore,
};

use crate::{
    model::EventTicket,
    presenter::{DisplayZone, EventTicketResponse},
};

/// Page size when the caller does not ask for one.
pub const DEFAULT_LIMIT: i64 = 8;
/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 50;
/// How many tickets the trending list holds at most.
pub const TRENDING_LIMIT: usize = 5;
/// Sales above this count make a ticket trending even when it is not flagged.
pub const TRENDING_SOLD_THRESHOLD: i64 = 100;

/// One page of tickets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PaginatedEventTickets {
    pub page: u64,
    pub limit: u64,
    /// Matching tickets across all pages.
    pub total: u64,
    pub tickets: Vec<EventTicketResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrendingEventTickets {
    pub count: usize,
    pub tickets: Vec<EventTicketResponse>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A request parameter is out of range. `error` is a short title, `message` the detail.
    #[error("{error}: {message}")]
    InvalidParameter {
        parameter: &'static str,
        error: &'static str,
        message: &'static str,
    },
    /// The store could not answer.
    #[error("{0}")]
    QueryFailed(String),
}

impl CatalogError {
    pub fn invalid_page() -> Self {
        CatalogError::InvalidParameter {
            parameter: "page",
            error: "Invalid page number",
            message: "Page number must be greater than 0",
        }
    }

    pub fn invalid_limit() -> Self {
        CatalogError::InvalidParameter {
            parameter: "limit",
            error: "Invalid limit",
            message: "Limit must be between 1 and 50",
        }
    }

    pub fn invalid_category() -> Self {
        CatalogError::InvalidParameter {
            parameter: "category",
            error: "Invalid category",
            message: "Category parameter is required",
        }
    }

    /// Logged where the error is turned into a response.
    fn query_failed(context: &str, err: DocumentStoreError) -> Self {
        CatalogError::QueryFailed(format!("{context}: {err}"))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Trending means flagged by hand or selling well.
fn trending_filter() -> Expr {
    Filter::or([
        Filter::eq("isTrending", true),
        Filter::gt("soldTickets", TRENDING_SOLD_THRESHOLD),
    ])
}

#[derive(Debug, Clone)]
pub struct TicketCatalog {
    store: Arc<DynDocumentStore>,
    zone: DisplayZone,
}

impl TicketCatalog {
    /// Creates a catalog presenting dates in the process local time zone.
    pub fn new(store: Arc<DynDocumentStore>) -> Self {
        Self { store, zone: DisplayZone::Local }
    }

    /// Presents dates in `zone` instead.
    pub fn with_display_zone(mut self, zone: impl Into<DisplayZone>) -> Self {
        self.zone = zone.into();
        self
    }

    /// Newest tickets first.
    ///
    /// `page` and `limit` are clamped into range, never rejected; the HTTP layer is
    /// responsible for turning out-of-range input into client errors.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::QueryFailed`] if the count or the page fetch fails.
    pub async fn list(&self, page: i64, limit: i64) -> CatalogResult<PaginatedEventTickets> {
        self.paginate(
            None,
            "createdAt",
            SortDirection::Desc,
            PageRequest::new(page, limit).normalized(MAX_LIMIT),
        )
        .await
        .map_err(|e| CatalogError::query_failed("Failed to fetch event tickets", e))
    }

    /// Tickets whose category equals `category` ignoring case, soonest event first.
    ///
    /// The category is compared as literal text; no pattern syntax applies.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::QueryFailed`] if the count or the page fetch fails.
    pub async fn list_by_category(
        &self,
        category: &str,
        page: i64,
        limit: i64,
    ) -> CatalogResult<PaginatedEventTickets> {
        self.paginate(
            Some(Filter::eq_ignore_case("eventCategory", category)),
            "eventDate",
            SortDirection::Asc,
            PageRequest::new(page, limit).normalized(MAX_LIMIT),
        )
        .await
        .map_err(|e| CatalogError::query_failed("Failed to fetch event tickets by category", e))
    }

    /// Up to five trending tickets, best sellers first, most recently updated on ties.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::QueryFailed`] if the fetch fails.
    pub async fn trending(&self) -> CatalogResult<TrendingEventTickets> {
        let query = Query::builder()
            .filter(trending_filter())
            .sort("soldTickets", SortDirection::Desc)
            .sort("updatedAt", SortDirection::Desc)
            .limit(TRENDING_LIMIT)
            .build();

        debug!(?query, "fetching trending tickets");

        let tickets = self.store
            .typed_collection::<EventTicket>()
            .query(query)
            .await
            .map_err(|e| CatalogError::query_failed("Failed to fetch trending event tickets", e))?;

        let tickets = self.present_all(&tickets);
        Ok(TrendingEventTickets { count: tickets.len(), tickets })
    }

    async fn paginate(
        &self,
        filter: Option<Expr>,
        sort_field: &str,
        direction: SortDirection,
        window: Pagination,
    ) -> Result<PaginatedEventTickets, DocumentStoreError> {
        let collection = self.store.typed_collection::<EventTicket>();
        let query = Query::builder()
            .filter_opt(filter.clone())
            .sort(sort_field, direction)
            .offset(window.offset())
            .limit(window.take())
            .build();

        debug!(?query, page = window.page, limit = window.limit, "fetching ticket page");

        // count and page may observe different states of the collection
        let (total, tickets) = try_join!(
            collection.count(filter),
            collection.query(query),
        )?;

        Ok(PaginatedEventTickets {
            page: window.page,
            limit: window.limit,
            total,
            tickets: self.present_all(&tickets),
        })
    }

    fn present_all(&self, tickets: &[EventTicket]) -> Vec<EventTicketResponse> {
        tickets
            .iter()
            .map(|ticket| self.zone.present(ticket))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bson::Bson;
    use chrono::{Duration, TimeZone, Utc};
    use ticketdesk_core::{
        backend::StoreBackend,
        error::DocumentStoreResult,
        id::DocumentId,
        store::{DocumentStore, IntoDynDocumentStore},
    };
    use ticketdesk_memory::InMemoryStore;

    use crate::model::EventTicketBuilder;

    /// A backend whose every call fails.
    #[derive(Debug, Default)]
    pub(crate) struct FailingStore;

    #[async_trait]
    impl StoreBackend for FailingStore {
        async fn insert_documents(&self, _: Vec<(DocumentId, Bson)>, _: &str) -> DocumentStoreResult<()> {
            Err(DocumentStoreError::Backend("connection refused".to_string()))
        }

        async fn query_documents(&self, _: Query, _: &str) -> DocumentStoreResult<Vec<Bson>> {
            Err(DocumentStoreError::Backend("connection refused".to_string()))
        }

        async fn count_documents(&self, _: Option<Expr>, _: &str) -> DocumentStoreResult<u64> {
            Err(DocumentStoreError::Backend("connection refused".to_string()))
        }

        async fn create_collection(&self, _: &str) -> DocumentStoreResult<()> {
            Err(DocumentStoreError::Backend("connection refused".to_string()))
        }

        async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
            Err(DocumentStoreError::Backend("connection refused".to_string()))
        }

        async fn add_index(&self, _: &str, _: &str, _: bool) -> DocumentStoreResult<()> {
            Err(DocumentStoreError::Backend("connection refused".to_string()))
        }
    }

    /// Wraps an in-memory store and counts reads.
    #[derive(Debug, Default)]
    pub(crate) struct CountingStore {
        pub(crate) inner: InMemoryStore,
        pub(crate) reads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StoreBackend for CountingStore {
        async fn insert_documents(&self, documents: Vec<(DocumentId, Bson)>, collection: &str) -> DocumentStoreResult<()> {
            self.inner.insert_documents(documents, collection).await
        }

        async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.query_documents(query, collection).await
        }

        async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> DocumentStoreResult<u64> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.count_documents(filter, collection).await
        }

        async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
            self.inner.create_collection(name).await
        }

        async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
            self.inner.list_collections().await
        }

        async fn add_index(&self, collection: &str, field: &str, unique: bool) -> DocumentStoreResult<()> {
            self.inner.add_index(collection, field, unique).await
        }
    }

    pub(crate) fn ticket(name: &str) -> EventTicketBuilder {
        EventTicket::builder()
            .name(name)
            .about("about")
            .event_category("Tech")
            .event_date(Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap())
            .ticket_type(["General"])
            .total_tickets(1000)
            .available_tickets(100)
            .image_url("https://example.com/t.png")
    }

    /// Ten tickets `t1`..`t10`, each created one minute after the previous.
    pub(crate) fn ten_tickets() -> Vec<EventTicket> {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        (1..=10)
            .map(|i| {
                ticket(&format!("t{i}"))
                    .created_at(base + Duration::minutes(i))
                    .build()
                    .unwrap()
            })
            .collect()
    }

    pub(crate) async fn catalog_with(tickets: Vec<EventTicket>) -> TicketCatalog {
        let store = DocumentStore::new(InMemoryStore::new()).into_dyn();
        store
            .typed_collection::<EventTicket>()
            .insert(tickets)
            .await
            .unwrap();

        TicketCatalog::new(Arc::new(store)).with_display_zone(Utc)
    }

    fn titles(tickets: &[EventTicketResponse]) -> Vec<&str> {
        tickets.iter().map(|t| t.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_second_page_of_three() {
        let catalog = catalog_with(ten_tickets()).await;
        let page = catalog.list(2, 3).await.unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 3);
        assert_eq!(page.total, 10);
        // newest first: t10, t9, t8 | t7, t6, t5
        assert_eq!(titles(&page.tickets), vec!["t7", "t6", "t5"]);
    }

    #[tokio::test]
    async fn test_list_page_length_matches_window() {
        let catalog = catalog_with(ten_tickets()).await;

        for (page, limit) in [(1, 8), (2, 8), (3, 8), (4, 3), (5, 3), (1, 50), (11, 1)] {
            let result = catalog.list(page, limit).await.unwrap();
            let skip = ((page - 1) * limit) as u64;
            let expected = 10_u64.saturating_sub(skip).min(limit as u64) as usize;

            assert_eq!(result.tickets.len(), expected, "page {page} limit {limit}");
            assert_eq!(
                PageRequest::new(page, limit).normalized(MAX_LIMIT).len_for_total(result.total),
                expected,
            );
        }
    }

    #[tokio::test]
    async fn test_list_clamps_out_of_range_values() {
        let catalog = catalog_with(ten_tickets()).await;
        let page = catalog.list(-3, 500).await.unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 50);
        assert_eq!(page.tickets.len(), 10);
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let catalog = catalog_with(ten_tickets()).await;
        assert_eq!(catalog.list(1, 4).await.unwrap(), catalog.list(1, 4).await.unwrap());
    }

    #[tokio::test]
    async fn test_category_match_is_exact_and_case_insensitive() {
        let catalog = catalog_with(vec![
            ticket("a").event_category("Web3").build().unwrap(),
            ticket("b").event_category("Music").build().unwrap(),
            ticket("c").event_category("Web3 Summit").build().unwrap(),
        ])
        .await;

        for category in ["web3", "WEB3", "Web3"] {
            let page = catalog.list_by_category(category, 1, DEFAULT_LIMIT).await.unwrap();
            assert_eq!(page.total, 1, "{category}");
            assert_eq!(titles(&page.tickets), vec!["a"]);
        }
        for category in ["web", "web3x", ".*"] {
            let page = catalog.list_by_category(category, 1, DEFAULT_LIMIT).await.unwrap();
            assert_eq!(page.total, 0, "{category}");
            assert!(page.tickets.is_empty());
        }
    }

    #[tokio::test]
    async fn test_category_sorted_by_event_date() {
        let day = |d| Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap();
        let catalog = catalog_with(vec![
            ticket("late").event_date(day(20)).build().unwrap(),
            ticket("early").event_date(day(2)).build().unwrap(),
            ticket("middle").event_date(day(10)).build().unwrap(),
        ])
        .await;

        let page = catalog.list_by_category("tech", 1, DEFAULT_LIMIT).await.unwrap();
        assert_eq!(titles(&page.tickets), vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn test_trending_selection_and_order() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let catalog = catalog_with(vec![
            ticket("flagged").is_trending(true).sold_tickets(10).build().unwrap(),
            ticket("quiet").sold_tickets(100).build().unwrap(),
            ticket("hit").sold_tickets(300).build().unwrap(),
            ticket("tie-old").sold_tickets(150).updated_at(base).build().unwrap(),
            ticket("tie-new").sold_tickets(150).updated_at(base + Duration::hours(1)).build().unwrap(),
            ticket("seller").sold_tickets(101).build().unwrap(),
            ticket("also").sold_tickets(120).build().unwrap(),
        ])
        .await;

        let trending = catalog.trending().await.unwrap();

        assert_eq!(trending.count, 5);
        assert_eq!(trending.count, trending.tickets.len());
        assert_eq!(
            titles(&trending.tickets),
            vec!["hit", "tie-new", "tie-old", "also", "seller"],
        );
        assert!(trending.tickets.windows(2).all(|w| w[0].participants_count >= w[1].participants_count));
    }

    #[tokio::test]
    async fn test_trending_includes_flagged_low_sellers() {
        let catalog = catalog_with(vec![
            ticket("flagged").is_trending(true).sold_tickets(3).build().unwrap(),
            ticket("at-threshold").sold_tickets(TRENDING_SOLD_THRESHOLD).build().unwrap(),
            ticket("over-threshold").sold_tickets(TRENDING_SOLD_THRESHOLD + 1).build().unwrap(),
            ticket("flagged-at-threshold").is_trending(true).sold_tickets(TRENDING_SOLD_THRESHOLD).build().unwrap(),
        ])
        .await;

        let trending = catalog.trending().await.unwrap();

        assert_eq!(trending.count, 3);
        assert_eq!(
            titles(&trending.tickets),
            vec!["over-threshold", "flagged-at-threshold", "flagged"],
        );
    }

    #[tokio::test]
    async fn test_trending_empty() {
        let catalog = catalog_with(vec![ticket("quiet").sold_tickets(5).build().unwrap()]).await;
        let trending = catalog.trending().await.unwrap();

        assert_eq!(trending.count, 0);
        assert!(trending.tickets.is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_carry_context() {
        let catalog = TicketCatalog::new(Arc::new(DocumentStore::new(FailingStore).into_dyn()));

        assert_eq!(
            catalog.list(1, 8).await.unwrap_err(),
            CatalogError::QueryFailed("Failed to fetch event tickets: Backend error: connection refused".to_string()),
        );
        assert_eq!(
            catalog.list_by_category("Tech", 1, 8).await.unwrap_err(),
            CatalogError::QueryFailed("Failed to fetch event tickets by category: Backend error: connection refused".to_string()),
        );
        assert_eq!(
            catalog.trending().await.unwrap_err(),
            CatalogError::QueryFailed("Failed to fetch trending event tickets: Backend error: connection refused".to_string()),
        );
    }
}
