//! The persisted event ticket.
//!
//! [`EventTicket`] mirrors the stored document field for field (camelCase names in the
//! `eventtickets` collection, identity in `_id`). The read path deserializes whatever
//! the store returns, including documents other clients wrote with ObjectId keys;
//! invariants are only checked when a ticket is written, through
//! [`EventTicket::validate`] or [`EventTicketBuilder::build`].

use bson::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ticketdesk_core::{document::Document, id::DocumentId};

/// Collection holding event tickets.
pub const EVENT_TICKETS: &str = "eventtickets";

/// Lifecycle state of an event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

/// An event offering tickets, as stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTicket {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    /// Free-text description.
    pub about: String,
    /// 0 means free.
    pub price: f64,
    /// 0 = anonymous, 1 = wallet required, 2 = verified access.
    #[serde(default = "default_privacy_level")]
    pub privacy_level: i32,
    pub event_category: String,
    /// Id of the organizing user.
    pub organized_by: DocumentId,
    pub event_date: DateTime,
    #[serde(default = "default_location")]
    pub location: String,
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
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_privacy_level() -> i32 {
    1
}

fn default_location() -> String {
    "Virtual".to_string()
}

impl Document for EventTicket {
    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn collection_name() -> &'static str {
        EVENT_TICKETS
    }
}

/// A ticket that breaks one of the write-time invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TicketValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("price must be zero or positive, got {0}")]
    InvalidPrice(f64),
    #[error("privacyLevel must be 0, 1 or 2, got {0}")]
    InvalidPrivacyLevel(i32),
    #[error("{field} must not be negative, got {value}")]
    NegativeCount { field: &'static str, value: i64 },
    #[error("ticketType must contain at least one entry")]
    EmptyTicketType,
    #[error("soldTickets ({sold}) plus availableTickets ({available}) exceeds totalTickets ({total})")]
    Oversold { sold: i64, available: i64, total: i64 },
}

impl EventTicket {
    /// Creates a builder with the stored defaults applied.
    pub fn builder() -> EventTicketBuilder {
        EventTicketBuilder::default()
    }

    /// Checks the invariants a ticket must satisfy before it is written.
    ///
    /// # Errors
    ///
    /// Returns the first [`TicketValidationError`] found.
    pub fn validate(&self) -> Result<(), TicketValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("about", &self.about),
            ("eventCategory", &self.event_category),
            ("imageUrl", &self.image_url),
        ] {
            if value.trim().is_empty() {
                return Err(TicketValidationError::MissingField(field));
            }
        }

        // also rejects NaN
        if !(self.price >= 0.0) {
            return Err(TicketValidationError::InvalidPrice(self.price));
        }
        if !(0..=2).contains(&self.privacy_level) {
            return Err(TicketValidationError::InvalidPrivacyLevel(self.privacy_level));
        }

        for (field, value) in [
            ("totalTickets", self.total_tickets),
            ("availableTickets", self.available_tickets),
            ("soldTickets", self.sold_tickets),
        ] {
            if value < 0 {
                return Err(TicketValidationError::NegativeCount { field, value });
            }
        }

        if self.ticket_type.is_empty() {
            return Err(TicketValidationError::EmptyTicketType);
        }
        if self.sold_tickets.saturating_add(self.available_tickets) > self.total_tickets {
            return Err(TicketValidationError::Oversold {
                sold: self.sold_tickets,
                available: self.available_tickets,
                total: self.total_tickets,
            });
        }

        Ok(())
    }
}

/// Builds validated [`EventTicket`]s.
///
/// Unset optional fields take the stored defaults: privacy level 1, location
/// `"Virtual"`, status `upcoming`, no tags, not trending. A fresh id is assigned and
/// both timestamps default to the moment [`build`](Self::build) runs.
///
/// # Example
///
/// ```ignore
/// let ticket = EventTicket::builder()
///     .name("Rust Meetup")
///     .about("Monthly meetup")
///     .event_category("Tech")
///     .event_date(Utc::now())
///     .ticket_type(["General"])
///     .total_tickets(100)
///     .available_tickets(100)
///     .image_url("https://example.com/rust.png")
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct EventTicketBuilder {
    id: Option<DocumentId>,
    name: Option<String>,
    about: Option<String>,
    price: f64,
    privacy_level: i32,
    event_category: Option<String>,
    organized_by: Option<DocumentId>,
    event_date: Option<chrono::DateTime<Utc>>,
    location: String,
    ticket_type: Vec<String>,
    total_tickets: i64,
    available_tickets: i64,
    sold_tickets: i64,
    event_status: EventStatus,
    image_url: Option<String>,
    tags: Vec<String>,
    is_trending: bool,
    created_at: Option<chrono::DateTime<Utc>>,
    updated_at: Option<chrono::DateTime<Utc>>,
}

impl Default for EventTicketBuilder {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            about: None,
            price: 0.0,
            privacy_level: default_privacy_level(),
            event_category: None,
            organized_by: None,
            event_date: None,
            location: default_location(),
            ticket_type: Vec::new(),
            total_tickets: 0,
            available_tickets: 0,
            sold_tickets: 0,
            event_status: EventStatus::default(),
            image_url: None,
            tags: Vec::new(),
            is_trending: false,
            created_at: None,
            updated_at: None,
        }
    }
}

impl EventTicketBuilder {
    pub fn id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn privacy_level(mut self, privacy_level: i32) -> Self {
        self.privacy_level = privacy_level;
        self
    }

    pub fn event_category(mut self, category: impl Into<String>) -> Self {
        self.event_category = Some(category.into());
        self
    }

    pub fn organized_by(mut self, organizer: impl Into<DocumentId>) -> Self {
        self.organized_by = Some(organizer.into());
        self
    }

    pub fn event_date(mut self, date: chrono::DateTime<Utc>) -> Self {
        self.event_date = Some(date);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn ticket_type<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ticket_type = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn total_tickets(mut self, total: i64) -> Self {
        self.total_tickets = total;
        self
    }

    pub fn available_tickets(mut self, available: i64) -> Self {
        self.available_tickets = available;
        self
    }

    pub fn sold_tickets(mut self, sold: i64) -> Self {
        self.sold_tickets = sold;
        self
    }

    pub fn event_status(mut self, status: EventStatus) -> Self {
        self.event_status = status;
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_trending(mut self, trending: bool) -> Self {
        self.is_trending = trending;
        self
    }

    pub fn created_at(mut self, at: chrono::DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn updated_at(mut self, at: chrono::DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Assembles the ticket and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`TicketValidationError::MissingField`] when `name`, `about`,
    /// `eventCategory`, `eventDate` or `imageUrl` were never set, or whatever
    /// [`EventTicket::validate`] reports.
    pub fn build(self) -> Result<EventTicket, TicketValidationError> {
        let now = Utc::now();
        let created_at = self.created_at.unwrap_or(now);

        let ticket = EventTicket {
            id: self.id.unwrap_or_default(),
            name: self.name.ok_or(TicketValidationError::MissingField("name"))?,
            about: self.about.ok_or(TicketValidationError::MissingField("about"))?,
            price: self.price,
            privacy_level: self.privacy_level,
            event_category: self.event_category.ok_or(TicketValidationError::MissingField("eventCategory"))?,
            organized_by: self.organized_by.unwrap_or_default(),
            event_date: DateTime::from_chrono(
                self.event_date.ok_or(TicketValidationError::MissingField("eventDate"))?,
            ),
            location: self.location,
            ticket_type: self.ticket_type,
            total_tickets: self.total_tickets,
            available_tickets: self.available_tickets,
            sold_tickets: self.sold_tickets,
            event_status: self.event_status,
            image_url: self.image_url.ok_or(TicketValidationError::MissingField("imageUrl"))?,
            tags: self.tags,
            is_trending: self.is_trending,
            created_at: DateTime::from_chrono(created_at),
            updated_at: DateTime::from_chrono(self.updated_at.unwrap_or(created_at)),
        };

        ticket.validate()?;
        Ok(ticket)
    }
}
