use std::sync::Arc;

use crate::config::Config;
use crate::services::bookings::BookingLedger;
use crate::services::catalog::Catalog;
use crate::services::checkout::{CheckoutService, PaymentGateway, SimulatedGateway};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub bookings: Arc<BookingLedger>,
    pub checkout: CheckoutService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Seeded catalog and bookings with the simulated gateway.
    pub fn new(config: Config) -> Self {
        let gateway = Arc::new(SimulatedGateway::new(config.payment_delay));
        Self::with_gateway(config, gateway)
    }

    pub fn with_gateway(config: Config, gateway: Arc<dyn PaymentGateway>) -> Self {
        let catalog = Arc::new(Catalog::seeded());
        let bookings = Arc::new(BookingLedger::seeded());
        let checkout = CheckoutService::new(
            Arc::clone(&catalog),
            Arc::clone(&bookings),
            gateway,
        )
        .with_ttl(config.checkout_ttl);
        Self {
            catalog,
            bookings,
            checkout,
            config: Arc::new(config),
        }
    }
}
