use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::money::Money;
use crate::models::ticket::TicketType;

/// A bookable listing. Events are immutable once loaded into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub city: String,
    pub venue: String,
    pub image: String,
    pub category: String,
    pub price: Money,
    pub organizer_id: String,
    pub organizer_name: String,
    pub ticket_types: Vec<TicketType>,
    pub total_capacity: u32,
    pub sold_tickets: u32,
    pub featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Completed,
}

impl Event {
    pub fn ticket_type(&self, ticket_type_id: &str) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| t.id == ticket_type_id)
    }

    /// Case-insensitive match over title, description and city.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.city]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.total_capacity.saturating_sub(self.sold_tickets)
    }

    /// Upcoming only when the event day is strictly after `today`.
    pub fn status_on(&self, today: NaiveDate) -> EventStatus {
        if self.date > today {
            EventStatus::Upcoming
        } else {
            EventStatus::Completed
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::data::seed_events;

    use super::*;

    #[test]
    fn test_matches_text_is_case_insensitive() {
        let events = seed_events();
        let jazz = &events[1];
        assert!(jazz.matches_text("jazz"));
        assert!(jazz.matches_text("new york"));
        assert!(!jazz.matches_text("workshop"));
    }

    #[test]
    fn test_status_relative_to_today() {
        let events = seed_events();
        let summit = &events[0];
        let before = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        assert_eq!(summit.status_on(before), EventStatus::Upcoming);
        // The event day itself counts as completed.
        assert_eq!(summit.status_on(summit.date), EventStatus::Completed);
    }

    #[test]
    fn test_ticket_lookup_and_capacity() {
        let events = seed_events();
        let summit = &events[0];
        assert_eq!(summit.ticket_type("vip").map(|t| t.available), Some(45));
        assert!(summit.ticket_type("backstage").is_none());
        assert_eq!(summit.remaining_capacity(), 345);
    }
}
