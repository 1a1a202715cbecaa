//! Organizer analytics and event draft handling.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::models::organizer::{
    CategoryShare, DashboardSummary, EventDraft, EventPreview, EventSummary,
};
use crate::models::{Event, EventStatus, Money, TicketType};
use crate::services::catalog::Catalog;
use crate::utils::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("{0}")]
    InvalidFields(FieldErrors),

    #[error("Event '{0}' was not found")]
    EventNotFound(String),

    #[error("Revenue figures overflowed")]
    AmountOverflow,
}

fn revenue(event: &Event) -> Option<Money> {
    event.price.checked_mul(u64::from(event.sold_tickets))
}

fn summarize(event: &Event, today: NaiveDate) -> Result<EventSummary, OrganizerError> {
    Ok(EventSummary {
        id: event.id.clone(),
        title: event.title.clone(),
        date: event.date,
        city: event.city.clone(),
        category: event.category.clone(),
        price: event.price,
        sold_tickets: event.sold_tickets,
        total_capacity: event.total_capacity,
        revenue: revenue(event).ok_or(OrganizerError::AmountOverflow)?,
        status: event.status_on(today),
    })
}

/// Category counts, largest first; ties by name. Percent is rounded down.
fn category_shares(events: &[&Event]) -> Vec<CategoryShare> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in events {
        *counts.entry(event.category.as_str()).or_default() += 1;
    }

    let total = events.len().max(1);
    let mut shares: Vec<CategoryShare> = counts
        .into_iter()
        .map(|(name, count)| CategoryShare {
            name: name.to_string(),
            events: count,
            percent: u32::try_from(count * 100 / total).unwrap_or(100),
        })
        .collect();
    shares.sort_by(|a, b| b.events.cmp(&a.events).then_with(|| a.name.cmp(&b.name)));
    shares
}

/// Sales overview across the catalog, or one organizer's events when scoped.
pub fn dashboard(
    catalog: &Catalog,
    organizer_id: Option<&str>,
    today: NaiveDate,
) -> Result<DashboardSummary, OrganizerError> {
    let events: Vec<&Event> = match organizer_id {
        Some(id) => catalog.by_organizer(id),
        None => catalog.events().iter().collect(),
    };

    let total_revenue = events
        .iter()
        .try_fold(Money::ZERO, |acc, event| {
            revenue(event).and_then(|r| acc.checked_add(r))
        })
        .ok_or(OrganizerError::AmountOverflow)?;
    let total_attendees: u64 = events.iter().map(|e| u64::from(e.sold_tickets)).sum();
    let average_ticket_price = total_revenue
        .checked_div(total_attendees)
        .unwrap_or(Money::ZERO);

    let mut upcoming = Vec::new();
    let mut past = Vec::new();
    for event in &events {
        let summary = summarize(event, today)?;
        match summary.status {
            EventStatus::Upcoming => upcoming.push(summary),
            EventStatus::Completed => past.push(summary),
        }
    }

    Ok(DashboardSummary {
        total_events: events.len(),
        total_revenue,
        total_attendees,
        average_ticket_price,
        upcoming,
        past,
        categories: category_shares(&events),
    })
}

struct ValidDraft {
    date: NaiveDate,
    time: NaiveTime,
}

fn validate(catalog: &Catalog, draft: &EventDraft) -> Result<ValidDraft, FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require("title", &draft.title, "Title is required");
    errors.require("description", &draft.description, "Description is required");
    errors.require("location", &draft.location, "Location is required");
    errors.require("venue", &draft.venue, "Venue is required");

    if !catalog.is_known_category(draft.category.trim()) {
        errors.add("category", "Please select a category");
    }
    if !catalog.is_known_city(draft.city.trim()) {
        errors.add("city", "Please select a city");
    }

    let date = NaiveDate::parse_from_str(draft.date.trim(), "%Y-%m-%d").ok();
    if date.is_none() {
        errors.add("date", "Date must be YYYY-MM-DD");
    }
    let time = NaiveTime::parse_from_str(draft.time.trim(), "%H:%M").ok();
    if time.is_none() {
        errors.add("time", "Time must be HH:MM");
    }

    if draft.ticket_types.is_empty() {
        errors.add("ticket_types", "At least one ticket type is required");
    }
    let capacity = draft
        .ticket_types
        .iter()
        .try_fold(0u32, |acc, tier| acc.checked_add(tier.total));
    if capacity.is_none() {
        errors.add("ticket_types", "Total ticket count is too large");
    }
    for tier in &draft.ticket_types {
        if tier.name.trim().is_empty() {
            errors.add("ticket_types", "Every ticket type needs a name");
        } else if tier.price.is_negative() {
            errors.add("ticket_types", "Ticket prices cannot be negative");
        } else if tier.total == 0 {
            errors.add("ticket_types", "Every ticket type needs a quantity above zero");
        }
    }

    match (date, time) {
        (Some(date), Some(time)) if errors.is_empty() => Ok(ValidDraft { date, time }),
        _ => Err(errors),
    }
}

fn build_event(
    id: String,
    organizer: (&str, &str),
    draft: &EventDraft,
    valid: ValidDraft,
    tiers: Vec<TicketType>,
) -> EventPreview {
    // Capacity was bounded by validation; sold never exceeds a tier's total.
    let total_capacity = tiers.iter().fold(0u32, |acc, t| acc.saturating_add(t.total));
    let sold_tickets = tiers.iter().fold(0u32, |acc, t| acc.saturating_add(t.sold()));
    // The listing price is the cheapest tier.
    let price = tiers.iter().map(|t| t.price).min().unwrap_or(Money::ZERO);

    EventPreview {
        total_tickets: total_capacity,
        event: Event {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            date: valid.date,
            time: valid.time,
            location: draft.location.trim().to_string(),
            city: draft.city.trim().to_string(),
            venue: draft.venue.trim().to_string(),
            image: draft.image.trim().to_string(),
            category: draft.category.trim().to_string(),
            price,
            organizer_id: organizer.0.to_string(),
            organizer_name: organizer.1.to_string(),
            ticket_types: tiers,
            total_capacity,
            sold_tickets,
            featured: draft.featured,
        },
    }
}

/// Validates a new event. New tiers start fully available.
pub fn preview_new(
    catalog: &Catalog,
    organizer: (&str, &str),
    draft: &EventDraft,
) -> Result<EventPreview, OrganizerError> {
    let valid = validate(catalog, draft).map_err(OrganizerError::InvalidFields)?;
    let tiers = draft
        .ticket_types
        .iter()
        .enumerate()
        .map(|(index, tier)| {
            let id = tier
                .id
                .clone()
                .unwrap_or_else(|| format!("ticket-{}", index + 1));
            TicketType::new(&id, tier.name.trim(), tier.price, tier.total, tier.total)
        })
        .collect();

    Ok(build_event(
        Uuid::new_v4().to_string(),
        organizer,
        draft,
        valid,
        tiers,
    ))
}

/// Applies a draft to an existing event. Tiers matched by id keep their sold
/// count; unmatched tiers start fully available.
pub fn preview_edit(
    catalog: &Catalog,
    event_id: &str,
    draft: &EventDraft,
) -> Result<EventPreview, OrganizerError> {
    let existing = catalog
        .find(event_id)
        .ok_or_else(|| OrganizerError::EventNotFound(event_id.to_string()))?;
    let valid = validate(catalog, draft).map_err(OrganizerError::InvalidFields)?;

    let tiers = draft
        .ticket_types
        .iter()
        .enumerate()
        .map(|(index, tier)| {
            let current = tier.id.as_deref().and_then(|id| existing.ticket_type(id));
            match current {
                Some(current) => {
                    let mut updated = current.clone();
                    updated.name = tier.name.trim().to_string();
                    updated.price = tier.price;
                    updated.resize(tier.total);
                    updated
                }
                None => {
                    let id = tier
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("ticket-{}", index + 1));
                    TicketType::new(&id, tier.name.trim(), tier.price, tier.total, tier.total)
                }
            }
        })
        .collect();

    Ok(build_event(
        existing.id.clone(),
        (existing.organizer_id.as_str(), existing.organizer_name.as_str()),
        draft,
        valid,
        tiers,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::organizer::TicketTypeDraft;

    fn draft() -> EventDraft {
        EventDraft {
            title: "Rust Meetup".into(),
            description: "Talks and pizza.".into(),
            category: "Technology".into(),
            date: "2024-05-02".into(),
            time: "18:30".into(),
            location: "Pioneer Square Labs".into(),
            city: "Seattle".into(),
            venue: "Loft".into(),
            image: String::new(),
            featured: false,
            ticket_types: vec![
                TicketTypeDraft {
                    id: None,
                    name: "General".into(),
                    price: Money::from_dollars(15),
                    total: 80,
                },
                TicketTypeDraft {
                    id: None,
                    name: "Supporter".into(),
                    price: Money::from_dollars(40),
                    total: 20,
                },
            ],
        }
    }

    #[test]
    fn test_dashboard_totals_for_seed_catalog() {
        let catalog = Catalog::seeded();
        let today = NaiveDate::from_ymd_opt(2024, 3, 25).unwrap();
        let summary = dashboard(&catalog, None, today).unwrap();

        assert_eq!(summary.total_events, 6);
        assert_eq!(summary.total_revenue, Money::from_dollars(79_210));
        assert_eq!(summary.total_attendees, 522);
        // 7_921_000 cents / 522 attendees, truncated.
        assert_eq!(summary.average_ticket_price, Money::from_cents(15_174));

        let past: Vec<&str> = summary.past.iter().map(|e| e.id.as_str()).collect();
        let upcoming: Vec<&str> = summary.upcoming.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(past, vec!["1", "2"]);
        assert_eq!(upcoming, vec!["3", "4", "5", "6"]);
        assert_eq!(summary.categories.len(), 6);
        assert!(summary.categories.iter().all(|c| c.events == 1 && c.percent == 16));
    }

    #[test]
    fn test_dashboard_scoped_to_organizer() {
        let catalog = Catalog::seeded();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let summary = dashboard(&catalog, Some("org-1"), today).unwrap();
        assert_eq!(summary.total_events, 2);
        assert_eq!(summary.total_attendees, 240);
        assert_eq!(summary.categories[0].name, "Business");
        assert_eq!(summary.categories[0].percent, 50);
    }

    #[test]
    fn test_empty_scope_has_zero_average() {
        let catalog = Catalog::seeded();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let summary = dashboard(&catalog, Some("org-unknown"), today).unwrap();
        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.average_ticket_price, Money::ZERO);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn test_preview_new_event() {
        let catalog = Catalog::seeded();
        let preview = preview_new(&catalog, ("org-9", "Rustaceans"), &draft()).unwrap();
        assert_eq!(preview.total_tickets, 100);
        assert_eq!(preview.event.price, Money::from_dollars(15));
        assert_eq!(preview.event.sold_tickets, 0);
        assert_eq!(preview.event.ticket_types[1].id, "ticket-2");
        // The catalog itself is untouched.
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_draft_validation_reports_fields() {
        let catalog = Catalog::seeded();
        let mut bad = draft();
        bad.title = " ".into();
        bad.city = "Atlantis".into();
        bad.time = "6pm".into();
        bad.ticket_types[0].total = 0;

        let Err(OrganizerError::InvalidFields(errors)) = preview_new(&catalog, ("o", "O"), &bad) else {
            panic!("expected field errors");
        };
        for field in ["title", "city", "time", "ticket_types"] {
            assert!(errors.contains(field), "missing {field}");
        }
        assert!(!errors.contains("date"));
    }

    #[test]
    fn test_oversized_ticket_totals_rejected() {
        let catalog = Catalog::seeded();
        let mut huge = draft();
        for tier in &mut huge.ticket_types {
            tier.total = 3_000_000_000;
        }

        let Err(OrganizerError::InvalidFields(errors)) = preview_new(&catalog, ("o", "O"), &huge) else {
            panic!("expected field errors");
        };
        assert_eq!(errors.get("ticket_types"), Some("Total ticket count is too large"));

        assert!(matches!(
            preview_edit(&catalog, "1", &huge),
            Err(OrganizerError::InvalidFields(_))
        ));
    }

    #[test]
    fn test_preview_edit_preserves_sold_tickets() {
        let catalog = Catalog::seeded();
        let mut edit = draft();
        edit.ticket_types = vec![TicketTypeDraft {
            id: Some("regular".into()),
            name: "Regular".into(),
            price: Money::from_dollars(279),
            total: 350,
        }];

        let preview = preview_edit(&catalog, "1", &edit).unwrap();
        let regular = &preview.event.ticket_types[0];
        assert_eq!(regular.sold(), 100);
        assert_eq!(regular.available, 250);
        assert_eq!(preview.event.id, "1");
        assert_eq!(preview.event.organizer_id, "org-1");
        assert_eq!(preview.event.sold_tickets, 100);

        assert!(matches!(
            preview_edit(&catalog, "77", &edit),
            Err(OrganizerError::EventNotFound(_))
        ));
    }
}
