//! The checkout wizard as a pure state machine.
//!
//! `ContactInfo -> Payment -> Confirmation`, with `Payment -> ContactInfo` allowed
//! while no payment attempt is in flight. Payment itself is asynchronous: the
//! machine hands out a numbered [`PaymentRequest`] and only accepts a settlement
//! for that same attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::payment::{PaymentError, PaymentReceipt, PaymentRequest};
use super::CheckoutError;
use crate::models::checkout::{ContactForm, PaymentForm};
use crate::models::{Booking, BookingStatus, BookingTicket, Event, Money, TicketSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    ContactInfo,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    pub fn number(self) -> u8 {
        match self {
            CheckoutStep::ContactInfo => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Confirmation => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub ticket_type_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub ticket_count: u64,
    pub total: Money,
}

impl OrderSummary {
    /// Prices `selection` against the event's ticket tiers.
    pub fn price(event: &Event, selection: &TicketSelection) -> Result<Self, CheckoutError> {
        if selection.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        let mut lines = Vec::new();
        for (ticket_type_id, quantity) in selection.iter() {
            let tier = event
                .ticket_type(ticket_type_id)
                .ok_or_else(|| CheckoutError::UnknownTicketType(ticket_type_id.to_string()))?;
            if quantity > tier.available {
                return Err(CheckoutError::InsufficientInventory {
                    ticket_type: tier.name.clone(),
                    requested: quantity,
                    available: tier.available,
                });
            }
            let subtotal = tier
                .price
                .checked_mul(u64::from(quantity))
                .ok_or(CheckoutError::AmountOverflow)?;
            lines.push(OrderLine {
                ticket_type_id: tier.id.clone(),
                name: tier.name.clone(),
                unit_price: tier.price,
                quantity,
                subtotal,
            });
        }

        let total = Money::checked_sum(lines.iter().map(|l| l.subtotal))
            .ok_or(CheckoutError::AmountOverflow)?;
        Ok(Self {
            ticket_count: selection.total_quantity(),
            lines,
            total,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub booking_id: String,
    pub receipt: PaymentReceipt,
}

/// What a settlement did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Confirmed,
    Failed,
    /// Stale or unexpected attempt; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    id: Uuid,
    event_id: String,
    event_title: String,
    event_date: DateTime<Utc>,
    event_location: String,
    step: CheckoutStep,
    processing: bool,
    attempts: u32,
    contact: Option<ContactForm>,
    order: OrderSummary,
    confirmation: Option<Confirmation>,
    last_error: Option<String>,
    opened_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn open(event: &Event, selection: &TicketSelection) -> Result<Self, CheckoutError> {
        let order = OrderSummary::price(event, selection)?;
        Ok(Self {
            id: Uuid::new_v4(),
            event_id: event.id.clone(),
            event_title: event.title.clone(),
            event_date: event.date.and_time(event.time).and_utc(),
            event_location: event.location.clone(),
            step: CheckoutStep::ContactInfo,
            processing: false,
            attempts: 0,
            contact: None,
            order,
            confirmation: None,
            last_error: None,
            opened_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn order(&self) -> &OrderSummary {
        &self.order
    }

    pub fn contact(&self) -> Option<&ContactForm> {
        self.contact.as_ref()
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn expect_step(&self, expected: CheckoutStep, action: &'static str) -> Result<(), CheckoutError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CheckoutError::InvalidTransition {
                from: self.step,
                action,
            })
        }
    }

    pub fn submit_contact(&mut self, form: ContactForm) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::ContactInfo, "submit contact details")?;
        form.validate().map_err(CheckoutError::InvalidFields)?;
        self.contact = Some(form);
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), CheckoutError> {
        if self.processing {
            return Err(CheckoutError::PaymentInProgress);
        }
        self.expect_step(CheckoutStep::Payment, "go back")?;
        self.step = CheckoutStep::ContactInfo;
        Ok(())
    }

    /// Starts a payment attempt. Nothing changes unless every gate passes.
    pub fn begin_payment(&mut self, form: &PaymentForm) -> Result<PaymentRequest, CheckoutError> {
        if self.processing {
            return Err(CheckoutError::PaymentInProgress);
        }
        self.expect_step(CheckoutStep::Payment, "submit payment")?;
        if !form.agree_to_terms {
            return Err(CheckoutError::TermsNotAccepted);
        }
        form.validate().map_err(CheckoutError::InvalidFields)?;

        self.attempts += 1;
        self.processing = true;
        self.last_error = None;
        Ok(PaymentRequest {
            session_id: self.id,
            attempt: self.attempts,
            amount: self.order.total,
            card_last4: form.card_last4(),
        })
    }

    pub fn settle(
        &mut self,
        attempt: u32,
        outcome: Result<PaymentReceipt, PaymentError>,
    ) -> Settlement {
        if !self.processing || attempt != self.attempts || self.step != CheckoutStep::Payment {
            return Settlement::Ignored;
        }
        self.processing = false;

        match outcome {
            Ok(receipt) => {
                self.confirmation = Some(Confirmation {
                    booking_id: booking_id(),
                    receipt,
                });
                self.step = CheckoutStep::Confirmation;
                Settlement::Confirmed
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Settlement::Failed
            }
        }
    }

    /// The booking produced by a confirmed checkout.
    pub fn booking(&self) -> Option<Booking> {
        let confirmation = self.confirmation.as_ref()?;
        Some(Booking {
            id: confirmation.booking_id.clone(),
            event_id: self.event_id.clone(),
            event_title: self.event_title.clone(),
            event_date: self.event_date,
            event_location: self.event_location.clone(),
            tickets: self
                .order
                .lines
                .iter()
                .map(|line| BookingTicket {
                    ticket_type_id: line.ticket_type_id.clone(),
                    ticket_type_name: line.name.clone(),
                    quantity: line.quantity,
                    price: line.unit_price,
                })
                .collect(),
            total_amount: self.order.total,
            status: BookingStatus::Confirmed,
            booking_date: confirmation.receipt.settled_at,
            qr_code: format!("QR-{}", confirmation.receipt.reference),
        })
    }
}

fn booking_id() -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("BK{}", &raw[..8])
}
