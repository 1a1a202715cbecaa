//! Owns live checkout sessions and drives their payment attempts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::machine::{CheckoutSession, Settlement};
use super::payment::{PaymentGateway, PaymentRequest};
use super::CheckoutError;
use crate::models::checkout::{ContactForm, OpenCheckoutRequest, PaymentForm};
use crate::services::bookings::BookingLedger;
use crate::services::catalog::Catalog;

struct SessionSlot {
    session: CheckoutSession,
    /// Set while a payment attempt is in flight.
    pending: Option<CancellationToken>,
    last_active: Instant,
}

impl SessionSlot {
    fn new(session: CheckoutSession) -> Self {
        Self {
            session,
            pending: None,
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        self.pending.is_none() && now.saturating_duration_since(self.last_active) >= ttl
    }
}

type Sessions = Arc<RwLock<HashMap<Uuid, SessionSlot>>>;

/// A session lives from `open` until `cancel` (the shopper navigated away),
/// until it sits idle for the session TTL, or until server shutdown.
/// Cancelling also cancels any in-flight payment, so a late gateway response
/// never lands on a session that is gone.
#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<Catalog>,
    bookings: Arc<BookingLedger>,
    gateway: Arc<dyn PaymentGateway>,
    sessions: Sessions,
    ttl: Duration,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<Catalog>,
        bookings: Arc<BookingLedger>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            gateway,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Self::DEFAULT_TTL,
        }
    }

    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    /// Idle time after which a session without a payment in flight is dropped.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn open(&self, request: OpenCheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        let event = self
            .catalog
            .find(&request.event_id)
            .ok_or_else(|| CheckoutError::EventNotFound(request.event_id.clone()))?;
        let session = CheckoutSession::open(event, &request.tickets.normalized())?;

        info!(
            session_id = %session.id(),
            event_id = %event.id,
            total = %session.order().total,
            tickets = session.order().ticket_count,
            "Checkout opened"
        );

        let mut sessions = self.sessions.write().await;
        Self::evict_idle(&mut sessions, self.ttl);
        sessions.insert(session.id(), SessionSlot::new(session.clone()));
        Ok(session)
    }

    pub async fn get(&self, id: Uuid) -> Result<CheckoutSession, CheckoutError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|slot| slot.session.clone())
            .ok_or(CheckoutError::SessionNotFound(id))
    }

    async fn update<T>(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut CheckoutSession) -> Result<T, CheckoutError>,
    ) -> Result<(T, CheckoutSession), CheckoutError> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(&id)
            .ok_or(CheckoutError::SessionNotFound(id))?;
        slot.touch();
        let value = apply(&mut slot.session)?;
        Ok((value, slot.session.clone()))
    }

    pub async fn submit_contact(
        &self,
        id: Uuid,
        form: ContactForm,
    ) -> Result<CheckoutSession, CheckoutError> {
        let ((), session) = self
            .update(id, |session| session.submit_contact(form))
            .await
            .map_err(|err| {
                debug!(session_id = %id, error = %err, "Contact step rejected");
                err
            })?;
        info!(session_id = %id, step = ?session.step(), "Checkout advanced");
        Ok(session)
    }

    pub async fn back(&self, id: Uuid) -> Result<CheckoutSession, CheckoutError> {
        let ((), session) = self.update(id, CheckoutSession::back).await?;
        info!(session_id = %id, step = ?session.step(), "Checkout stepped back");
        Ok(session)
    }

    /// Validates the payment step and starts the charge in the background.
    /// The returned snapshot is in the processing state.
    pub async fn submit_payment(
        &self,
        id: Uuid,
        form: PaymentForm,
    ) -> Result<CheckoutSession, CheckoutError> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(&id)
            .ok_or(CheckoutError::SessionNotFound(id))?;
        slot.touch();
        let request = slot
            .session
            .begin_payment(&form)
            .map_err(|err| {
                debug!(session_id = %id, error = %err, "Payment step rejected");
                err
            })?;

        let token = CancellationToken::new();
        slot.pending = Some(token.clone());
        let snapshot = slot.session.clone();
        drop(sessions);

        info!(
            session_id = %id,
            attempt = request.attempt,
            amount = %request.amount,
            "Payment started"
        );
        self.spawn_settlement(request, token);
        Ok(snapshot)
    }

    fn spawn_settlement(&self, request: PaymentRequest, token: CancellationToken) {
        let gateway = Arc::clone(&self.gateway);
        let sessions = Arc::clone(&self.sessions);
        let bookings = Arc::clone(&self.bookings);

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    info!(session_id = %request.session_id, attempt = request.attempt, "Payment cancelled");
                    return;
                }
                outcome = gateway.charge(&request) => outcome,
            };

            let booking = {
                let mut sessions = sessions.write().await;
                // Cancellation can race the gateway; re-check under the lock.
                if token.is_cancelled() {
                    return;
                }
                let Some(slot) = sessions.get_mut(&request.session_id) else {
                    return;
                };
                slot.pending = None;
                slot.touch();

                match slot.session.settle(request.attempt, outcome) {
                    Settlement::Confirmed => {
                        info!(session_id = %request.session_id, "Payment settled");
                        slot.session.booking()
                    }
                    Settlement::Failed => {
                        warn!(
                            session_id = %request.session_id,
                            error = slot.session.last_error().unwrap_or_default(),
                            "Payment failed"
                        );
                        None
                    }
                    Settlement::Ignored => {
                        debug!(session_id = %request.session_id, attempt = request.attempt, "Stale settlement ignored");
                        None
                    }
                }
            };

            if let Some(booking) = booking {
                bookings.record(booking).await;
            }
        });
    }

    /// Ends a session. Any in-flight payment is cancelled and its result dropped.
    pub async fn cancel(&self, id: Uuid) -> Result<(), CheckoutError> {
        let slot = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(CheckoutError::SessionNotFound(id))?;

        let had_pending = slot.pending.is_some();
        if let Some(token) = slot.pending {
            token.cancel();
        }
        info!(session_id = %id, had_pending, "Checkout cancelled");
        Ok(())
    }

    /// Drops every session and cancels every pending payment.
    pub async fn shutdown(&self) {
        let drained: Vec<SessionSlot> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, slot)| slot)
            .collect();

        let mut cancelled = 0usize;
        for token in drained.into_iter().filter_map(|slot| slot.pending) {
            token.cancel();
            cancelled += 1;
        }
        info!(cancelled, "Checkout sessions closed");
    }

    fn evict_idle(sessions: &mut HashMap<Uuid, SessionSlot>, ttl: Duration) -> usize {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, slot| !slot.is_idle(now, ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, "Idle checkout sessions dropped");
        }
        evicted
    }

    /// Drops sessions idle for longer than the TTL. Returns how many went.
    pub async fn evict_expired(&self) -> usize {
        Self::evict_idle(&mut *self.sessions.write().await, self.ttl)
    }

    /// Sweeps idle sessions every `period` until `shutdown` fires.
    pub fn spawn_sweeper(&self, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            // `interval` panics on a zero period.
            let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        service.evict_expired().await;
                    }
                }
            }
        })
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{Money, TicketSelection};
    use crate::services::checkout::{
        CheckoutStep, PaymentError, PaymentReceipt, SimulatedGateway,
    };

    const DELAY: Duration = Duration::from_millis(2000);

    struct DecliningGateway;

    #[async_trait]
    impl PaymentGateway for DecliningGateway {
        async fn charge(&self, _request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
            tokio::time::sleep(DELAY).await;
            Err(PaymentError::Declined("insufficient funds".into()))
        }
    }

    fn service_with(gateway: Arc<dyn PaymentGateway>) -> (CheckoutService, Arc<BookingLedger>) {
        let bookings = Arc::new(BookingLedger::seeded());
        let service = CheckoutService::new(
            Arc::new(Catalog::seeded()),
            Arc::clone(&bookings),
            gateway,
        );
        (service, bookings)
    }

    fn service() -> (CheckoutService, Arc<BookingLedger>) {
        service_with(Arc::new(SimulatedGateway::new(DELAY)))
    }

    fn open_request() -> OpenCheckoutRequest {
        OpenCheckoutRequest {
            event_id: "1".into(),
            tickets: [("early-bird", 2)].into_iter().collect::<TicketSelection>(),
        }
    }

    fn contact() -> ContactForm {
        ContactForm {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: "john.smith@example.com".into(),
            phone: Some("555-0100".into()),
        }
    }

    fn payment() -> PaymentForm {
        PaymentForm {
            card_number: "4242 4242 4242 4242".into(),
            expiry: "10/30".into(),
            cvv: "987".into(),
            name_on_card: "John Smith".into(),
            billing_address: Some("123 Main St".into()),
            city: Some("San Francisco".into()),
            zip_code: Some("94102".into()),
            agree_to_terms: true,
            ..PaymentForm::default()
        }
    }

    async fn at_payment(service: &CheckoutService) -> Uuid {
        let session = service.open(open_request()).await.unwrap();
        service.submit_contact(session.id(), contact()).await.unwrap();
        session.id()
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_settles_after_delay_and_records_booking() {
        let (service, bookings) = service();
        let id = at_payment(&service).await;

        let snapshot = service.submit_payment(id, payment()).await.unwrap();
        assert!(snapshot.is_processing());
        assert_eq!(snapshot.step(), CheckoutStep::Payment);

        tokio::time::sleep(DELAY / 2).await;
        assert_eq!(service.get(id).await.unwrap().step(), CheckoutStep::Payment);

        tokio::time::sleep(DELAY).await;
        let session = service.get(id).await.unwrap();
        assert_eq!(session.step(), CheckoutStep::Confirmation);
        assert_eq!(
            session.confirmation().map(|c| c.receipt.amount),
            Some(Money::from_dollars(398))
        );

        assert_eq!(bookings.len().await, 3);
        let booking_id = &session.confirmation().unwrap().booking_id;
        let booking = bookings.get(booking_id).await.unwrap();
        assert_eq!(booking.total_amount, Money::from_dollars(398));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_pending_payment() {
        let (service, bookings) = service();
        let id = at_payment(&service).await;
        service.submit_payment(id, payment()).await.unwrap();

        service.cancel(id).await.unwrap();
        tokio::time::sleep(DELAY * 2).await;

        assert!(matches!(
            service.get(id).await,
            Err(CheckoutError::SessionNotFound(_))
        ));
        assert_eq!(bookings.len().await, 2);
        assert_eq!(service.active_sessions().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_payment_returns_to_payment_step() {
        let (service, bookings) = service_with(Arc::new(DecliningGateway));
        let id = at_payment(&service).await;
        service.submit_payment(id, payment()).await.unwrap();

        tokio::time::sleep(DELAY * 2).await;
        let session = service.get(id).await.unwrap();
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert!(!session.is_processing());
        assert!(session.last_error().unwrap().contains("insufficient funds"));
        assert_eq!(bookings.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_while_processing_conflicts() {
        let (service, _) = service();
        let id = at_payment(&service).await;
        service.submit_payment(id, payment()).await.unwrap();

        let err = service.submit_payment(id, payment()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentInProgress));
        let err = service.back(id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentInProgress));
    }

    #[tokio::test]
    async fn test_open_unknown_event() {
        let (service, _) = service();
        let err = service
            .open(OpenCheckoutRequest {
                event_id: "404".into(),
                tickets: open_request().tickets,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EventNotFound(id) if id == "404"));
        assert_eq!(service.active_sessions().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let (service, _) = service();
        let service = service.with_ttl(Duration::from_secs(60));
        let stale = service.open(open_request()).await.unwrap().id();

        tokio::time::sleep(Duration::from_secs(45)).await;
        let fresh = at_payment(&service).await;

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(service.evict_expired().await, 1);
        assert!(matches!(
            service.get(stale).await,
            Err(CheckoutError::SessionNotFound(_))
        ));
        assert!(service.get(fresh).await.is_ok());

        // Opening a new session also prunes.
        tokio::time::sleep(Duration::from_secs(61)).await;
        service.open(open_request()).await.unwrap();
        assert_eq!(service.active_sessions().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_payment_is_not_evicted() {
        let (service, bookings) = service();
        let service = service.with_ttl(Duration::from_millis(500));
        let id = at_payment(&service).await;
        service.submit_payment(id, payment()).await.unwrap();

        tokio::time::sleep(DELAY / 2).await;
        assert_eq!(service.evict_expired().await, 0);

        tokio::time::sleep(DELAY).await;
        assert_eq!(service.get(id).await.unwrap().step(), CheckoutStep::Confirmation);
        assert_eq!(bookings.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_until_shutdown() {
        let (service, _) = service();
        let service = service.with_ttl(Duration::from_secs(10));
        let shutdown = CancellationToken::new();
        let sweeper = service.spawn_sweeper(Duration::from_secs(5), shutdown.clone());
        service.open(open_request()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(service.active_sessions().await, 0);

        shutdown.cancel();
        sweeper.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_everything() {
        let (service, bookings) = service();
        let first = at_payment(&service).await;
        service.submit_payment(first, payment()).await.unwrap();
        service.open(open_request()).await.unwrap();

        service.shutdown().await;
        tokio::time::sleep(DELAY * 2).await;

        assert_eq!(service.active_sessions().await, 0);
        assert_eq!(bookings.len().await, 2);
    }
}
