//! Projection of stored tickets into the shape the catalog API returns.
//!
//! Dates are rendered in a presentation time zone. The service uses the process local
//! zone unless a fixed offset is configured; tests pin a [`FixedOffset`] so output
//! does not depend on the machine running them.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::EventTicket;

/// Shown for every ticket until per-event anonymity is tracked.
pub const ANONYMITY_PERCENTAGE: &str = "60%";

/// A ticket as returned by the catalog API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTicketResponse {
    pub title: String,
    pub status: String,
    pub participants_count: i64,
    pub anonymity_percentage: String,
    /// e.g. `"Jan 05, 2025"`
    pub date: String,
    /// e.g. `"3 PM"`
    pub time: String,
    /// e.g. `"(UTC +05:30)"`
    pub timezone: String,
    pub location: String,
    pub price: f64,
    pub image_url: String,
}

/// Access label for a privacy level.
pub fn status_label(privacy_level: i32) -> &'static str {
    match privacy_level {
        0 => "Anonymous",
        1 => "Wallet-Required",
        2 => "Verified Access",
        _ => "Unknown",
    }
}

/// `"Jan 05, 2025"`
pub fn format_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%b %d, %Y").to_string()
}

/// Hour on a 12-hour clock without minutes: `"3 PM"`, `"12 AM"`.
pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-I %p").to_string()
}

/// `"(UTC +05:30)"`, taken from the offset in effect at `at`.
pub fn format_timezone<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    let offset = at.offset().fix().local_minus_utc();
    let sign = if offset >= 0 { '+' } else { '-' };
    let minutes = offset.unsigned_abs() / 60;

    format!("(UTC {sign}{:02}:{:02})", minutes / 60, minutes % 60)
}

/// Projects a stored ticket, rendering its event date in `tz`.
pub fn present<Tz: TimeZone>(ticket: &EventTicket, tz: &Tz) -> EventTicketResponse
where
    Tz::Offset: std::fmt::Display,
{
    let event_date = ticket.event_date.to_chrono().with_timezone(tz);

    EventTicketResponse {
        title: ticket.name.clone(),
        status: status_label(ticket.privacy_level).to_string(),
        participants_count: ticket.sold_tickets,
        anonymity_percentage: ANONYMITY_PERCENTAGE.to_string(),
        date: format_date(&event_date),
        time: format_time(&event_date),
        timezone: format_timezone(&event_date),
        location: ticket.location.clone(),
        price: ticket.price,
        image_url: ticket.image_url.clone(),
    }
}

/// Time zone used when presenting tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// Whatever zone the process runs in.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn present(&self, ticket: &EventTicket) -> EventTicketResponse {
        match self {
            DisplayZone::Local => present(ticket, &Local),
            DisplayZone::Fixed(offset) => present(ticket, offset),
        }
    }
}

impl From<FixedOffset> for DisplayZone {
    fn from(offset: FixedOffset) -> Self {
        DisplayZone::Fixed(offset)
    }
}

impl From<Utc> for DisplayZone {
    fn from(_: Utc) -> Self {
        DisplayZone::Fixed(Utc.fix())
    }
}
