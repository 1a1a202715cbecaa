use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingTicket {
    pub ticket_type_id: String,
    pub ticket_type_name: String,
    pub quantity: u32,
    pub price: Money,
}

/// A purchase of one or more ticket quantities for a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub event_id: String,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub event_location: String,
    pub tickets: Vec<BookingTicket>,
    pub total_amount: Money,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
    pub qr_code: String,
}

impl Booking {
    pub fn ticket_count(&self) -> u64 {
        self.tickets.iter().map(|t| u64::from(t.quantity)).sum()
    }

    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        self.event_date > now && self.status != BookingStatus::Cancelled
    }
}
