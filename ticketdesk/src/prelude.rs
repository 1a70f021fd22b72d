//! Convenient re-exports of commonly used types from ticketdesk.
//!
//! ```ignore
//! use ticketdesk::prelude::*;
//! ```

pub use ticketdesk_core::{
    store::{DocumentStore, DynDocumentStore, IntoDynDocumentStore},
    document::{Document, DocumentExt},
    id::DocumentId,
    backend::{StoreBackend, DynStoreBackend, StoreBackendBuilder},
    query::{Query, QueryVisitor, Expr, Sort, SortDirection, FieldOp, QueryBuilder, Filter},
    page::{PageRequest, Pagination},
    error::{DocumentStoreError, DocumentStoreResult},
};

pub use crate::{
    model::{EventStatus, EventTicket, EventTicketBuilder, TicketValidationError},
    presenter::{DisplayZone, EventTicketResponse},
    catalog::{CatalogError, PaginatedEventTickets, TicketCatalog, TrendingEventTickets},
    api::ApiError,
};
