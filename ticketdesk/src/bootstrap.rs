//! Store preparation at startup: indexes and optional seeding from a JSON file.
//!
//! A seed file holds a JSON array of ticket drafts using the stored camelCase field
//! names. Ids and timestamps are assigned on insert, and every draft is validated
//! before anything is written. `organizedBy`, when present, is an ObjectId in hex or
//! a UUID.
//!
//! ```json
//! [{
//!     "name": "Rust Meetup",
//!     "about": "Monthly meetup",
//!     "eventCategory": "Tech",
//!     "eventDate": "2025-01-05T15:00:00Z",
//!     "ticketType": ["General"],
//!     "totalTickets": 100,
//!     "availableTickets": 80,
//!     "soldTickets": 20,
//!     "imageUrl": "https://example.com/rust.png"
//! }]
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use ticketdesk_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    id::DocumentId,
    store::DynDocumentStore,
};

use crate::model::{EventStatus, EventTicket, TicketValidationError, EVENT_TICKETS};

/// Fields the catalog filters or sorts on.
pub const INDEXED_FIELDS: [&str; 4] = ["eventCategory", "eventDate", "createdAt", "soldTickets"];

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file is not a JSON array of tickets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("seed ticket #{index} ({name}) is invalid: {source}")]
    Invalid {
        index: usize,
        name: String,
        #[source]
        source: TicketValidationError,
    },
    #[error("seed ticket #{index} has an invalid organizedBy id {value:?}")]
    InvalidOrganizer { index: usize, value: String },
    #[error(transparent)]
    Store(#[from] DocumentStoreError),
}

/// A ticket as written in a seed file.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TicketDraft {
    pub name: String,
    pub about: String,
    #[serde(default)]
    pub price: f64,
    pub privacy_level: Option<i32>,
    pub event_category: String,
    pub organized_by: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    pub ticket_type: Vec<String>,
    pub total_tickets: i64,
    pub available_tickets: i64,
    #[serde(default)]
    pub sold_tickets: i64,
    #[serde(default)]
    pub event_status: EventStatus,
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_trending: bool,
}

impl TicketDraft {
    fn into_ticket(self, index: usize) -> Result<EventTicket, SeedError> {
        let name = self.name.clone();
        let mut builder = EventTicket::builder()
            .name(self.name)
            .about(self.about)
            .price(self.price)
            .event_category(self.event_category)
            .event_date(self.event_date)
            .ticket_type(self.ticket_type)
            .total_tickets(self.total_tickets)
            .available_tickets(self.available_tickets)
            .sold_tickets(self.sold_tickets)
            .event_status(self.event_status)
            .image_url(self.image_url)
            .tags(self.tags)
            .is_trending(self.is_trending);

        if let Some(level) = self.privacy_level {
            builder = builder.privacy_level(level);
        }
        if let Some(location) = self.location {
            builder = builder.location(location);
        }
        if let Some(value) = self.organized_by {
            let organizer = value
                .parse::<DocumentId>()
                .map_err(|_| SeedError::InvalidOrganizer { index, value })?;
            builder = builder.organized_by(organizer);
        }

        builder
            .build()
            .map_err(|source| SeedError::Invalid { index, name, source })
    }
}

/// Parses and validates a seed file's contents.
///
/// # Errors
///
/// Fails on malformed JSON or on the first draft that does not validate.
pub fn parse_seed(json: &str) -> Result<Vec<EventTicket>, SeedError> {
    serde_json::from_str::<Vec<TicketDraft>>(json)?
        .into_iter()
        .enumerate()
        .map(|(index, draft)| draft.into_ticket(index))
        .collect()
}

/// Reads `path`, validates every ticket, then inserts them all.
///
/// Returns how many tickets were inserted. Nothing is written if any ticket is invalid.
///
/// # Errors
///
/// Returns a [`SeedError`] if the file cannot be read, parsed or stored.
pub async fn seed_from_file(store: &DynDocumentStore, path: &Path) -> Result<usize, SeedError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io { path: path.to_path_buf(), source })?;

    let tickets = parse_seed(&json)?;
    let count = tickets.len();

    store
        .typed_collection::<EventTicket>()
        .insert(tickets)
        .await?;

    info!(count, path = %path.display(), "seeded event tickets");
    Ok(count)
}

/// Creates the ticket collection if missing and indexes the fields the catalog queries.
///
/// # Errors
///
/// Returns an error if the backend rejects the collection or an index.
pub async fn ensure_indexes(store: &DynDocumentStore) -> DocumentStoreResult<()> {
    if !store.list_collections().await?.iter().any(|name| name == EVENT_TICKETS) {
        store.create_collection(EVENT_TICKETS).await?;
    }

    for field in INDEXED_FIELDS {
        store.add_index(EVENT_TICKETS, field, false).await?;
        debug!(collection = EVENT_TICKETS, field, "index ensured");
    }

    Ok(())
}
