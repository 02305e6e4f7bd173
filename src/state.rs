use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::order::OrderCommandHandler;
use crate::metrics::Metrics;
use crate::store::{InMemoryCatalog, InMemoryOrderStore, InMemoryProfileDirectory};

/// Shared application state handed to every HTTP worker
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderCommandHandler>,
    pub metrics: Arc<Metrics>,
}

/// The in-memory stores backing a running service
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    pub catalog: Arc<InMemoryCatalog>,
    pub profiles: Arc<InMemoryProfileDirectory>,
    pub orders: Arc<InMemoryOrderStore>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the order engine over these stores
    pub fn app_state(&self, clock: Arc<dyn Clock>) -> anyhow::Result<AppState> {
        let metrics = Arc::new(Metrics::new()?);

        let orders = Arc::new(OrderCommandHandler::new(
            self.orders.clone(),
            self.catalog.clone(),
            self.profiles.clone(),
            clock,
            metrics.clone(),
        ));

        Ok(AppState { orders, metrics })
    }
}
