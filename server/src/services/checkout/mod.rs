pub mod machine;
pub mod payment;
pub mod service;

use thiserror::Error;
use uuid::Uuid;

use crate::utils::validation::FieldErrors;

pub use machine::{CheckoutSession, CheckoutStep, OrderSummary, Settlement};
pub use payment::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedGateway};
pub use service::CheckoutService;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    InvalidFields(FieldErrors),

    #[error("You must agree to the terms and conditions")]
    TermsNotAccepted,

    #[error("Cannot {action} while at step {from:?}")]
    InvalidTransition {
        from: CheckoutStep,
        action: &'static str,
    },

    #[error("A payment is already being processed")]
    PaymentInProgress,

    #[error("Select at least one ticket")]
    EmptySelection,

    #[error("Unknown ticket type '{0}'")]
    UnknownTicketType(String),

    #[error("Only {available} '{ticket_type}' tickets left, {requested} requested")]
    InsufficientInventory {
        ticket_type: String,
        requested: u32,
        available: u32,
    },

    #[error("Order total is too large")]
    AmountOverflow,

    #[error("Event '{0}' was not found")]
    EventNotFound(String),

    #[error("Checkout session '{0}' was not found")]
    SessionNotFound(Uuid),
}
