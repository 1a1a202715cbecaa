use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::money::Money;

/// A priced tier of admission with its own inventory counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub available: u32,
    pub total: u32,
}

impl TicketType {
    pub fn new(id: &str, name: &str, price: Money, available: u32, total: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            available: available.min(total),
            total,
        }
    }

    pub fn sold(&self) -> u32 {
        self.total.saturating_sub(self.available)
    }

    pub fn is_sold_out(&self) -> bool {
        self.available == 0
    }

    /// Changes the tier size while keeping the tickets already sold.
    pub fn resize(&mut self, new_total: u32) {
        let sold = self.sold();
        self.total = new_total;
        self.available = new_total.saturating_sub(sold);
    }
}

/// Requested quantity per ticket type id. Zero quantities are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketSelection(BTreeMap<String, u32>);

impl TicketSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, ticket_type_id: impl Into<String>, quantity: u32) {
        let id = ticket_type_id.into();
        if quantity == 0 {
            self.0.remove(&id);
        } else {
            self.0.insert(id, quantity);
        }
    }

    /// Adds `delta` to the current quantity, clamping at zero.
    pub fn adjust(&mut self, ticket_type_id: &str, delta: i64) {
        let current = i64::from(self.quantity(ticket_type_id));
        let next = current.saturating_add(delta).clamp(0, i64::from(u32::MAX));
        self.set(ticket_type_id, next as u32);
    }

    pub fn quantity(&self, ticket_type_id: &str) -> u32 {
        self.0.get(ticket_type_id).copied().unwrap_or(0)
    }

    pub fn total_quantity(&self) -> u64 {
        self.0.values().map(|q| u64::from(*q)).sum()
    }

    /// Drops zero entries a client may have sent.
    pub fn normalized(self) -> Self {
        Self(self.0.into_iter().filter(|(_, q)| *q > 0).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|q| *q == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(id, q)| (id.as_str(), *q))
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for TicketSelection {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut selection = TicketSelection::new();
        for (id, quantity) in iter {
            selection.set(id, quantity);
        }
        selection
    }
}
