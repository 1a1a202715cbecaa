use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::Money;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment service unavailable: {0}")]
    Unavailable(String),
}

/// One charge attempt for a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub session_id: Uuid,
    pub attempt: u32,
    pub amount: Money,
    pub card_last4: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub reference: String,
    pub amount: Money,
    pub card_last4: String,
    pub settled_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Stand-in gateway: waits out a fixed round trip, then always approves.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        debug!(
            session_id = %request.session_id,
            attempt = request.attempt,
            amount = %request.amount,
            delay_ms = self.delay.as_millis() as u64,
            "Simulating payment round trip"
        );
        tokio::time::sleep(self.delay).await;

        let reference = Uuid::new_v4().simple().to_string().to_uppercase();
        Ok(PaymentReceipt {
            reference: format!("SIM-{}", &reference[..12]),
            amount: request.amount,
            card_last4: request.card_last4.clone(),
            settled_at: Utc::now(),
        })
    }
}
