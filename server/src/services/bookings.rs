//! In-memory booking ledger behind the "my bookings" view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::data;
use crate::models::{Booking, BookingStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Confirmed,
    Pending,
    Cancelled,
}

impl StatusFilter {
    fn accepts(self, status: BookingStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Confirmed => status == BookingStatus::Confirmed,
            StatusFilter::Pending => status == BookingStatus::Pending,
            StatusFilter::Cancelled => status == BookingStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum BookingSort {
    #[default]
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "date-asc")]
    DateAsc,
    #[serde(rename = "amount-desc")]
    AmountDesc,
    #[serde(rename = "amount-asc")]
    AmountAsc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort: BookingSort,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingList {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
}

impl BookingList {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Filters, sorts and splits `bookings` around `now`.
///
/// A booking is upcoming when its event is still ahead and it was not
/// cancelled; everything else is past.
pub fn list(bookings: &[Booking], query: &BookingQuery, now: DateTime<Utc>) -> BookingList {
    let needle = query.q.trim().to_lowercase();
    let mut matched: Vec<Booking> = bookings
        .iter()
        .filter(|b| query.status.accepts(b.status))
        .filter(|b| needle.is_empty() || b.event_title.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    matched.sort_by(|a, b| match query.sort {
        BookingSort::DateDesc => b.event_date.cmp(&a.event_date),
        BookingSort::DateAsc => a.event_date.cmp(&b.event_date),
        BookingSort::AmountDesc => b.total_amount.cmp(&a.total_amount),
        BookingSort::AmountAsc => a.total_amount.cmp(&b.total_amount),
    });

    let (upcoming, past) = matched.into_iter().partition(|b| b.is_upcoming_at(now));
    BookingList { upcoming, past }
}

#[derive(Debug)]
pub struct BookingLedger {
    bookings: RwLock<Vec<Booking>>,
}

impl BookingLedger {
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: RwLock::new(bookings),
        }
    }

    pub fn seeded() -> Self {
        Self::new(data::seed_bookings())
    }

    pub async fn record(&self, booking: Booking) {
        info!(
            booking_id = %booking.id,
            event_id = %booking.event_id,
            total = %booking.total_amount,
            "Booking recorded"
        );
        self.bookings.write().await.push(booking);
    }

    pub async fn get(&self, id: &str) -> Option<Booking> {
        self.bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub async fn list(&self, query: &BookingQuery, now: DateTime<Utc>) -> BookingList {
        list(&self.bookings.read().await, query, now)
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }
}
