use serde::{Deserialize, Serialize};

use crate::models::event::{Event, EventStatus};
use crate::models::money::Money;

/// Form body for creating or editing an event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub location: String,
    pub city: String,
    pub venue: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
    pub ticket_types: Vec<TicketTypeDraft>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketTypeDraft {
    /// Present when editing an existing tier.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub price: Money,
    pub total: u32,
}

/// Dashboard row for one event.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub date: chrono::NaiveDate,
    pub city: String,
    pub category: String,
    pub price: Money,
    pub sold_tickets: u32,
    pub total_capacity: u32,
    pub revenue: Money,
    pub status: EventStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub events: usize,
    /// Whole percent of all events in scope.
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_events: usize,
    pub total_revenue: Money,
    pub total_attendees: u64,
    pub average_ticket_price: Money,
    pub upcoming: Vec<EventSummary>,
    pub past: Vec<EventSummary>,
    pub categories: Vec<CategoryShare>,
}

/// A validated draft that the organizer would publish.
#[derive(Debug, Clone, Serialize)]
pub struct EventPreview {
    pub event: Event,
    pub total_tickets: u32,
}
