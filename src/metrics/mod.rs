// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

use crate::domain::order::{OrderError, OrderStatus};

// Re-export for public API
pub use server::configure;

// ============================================================================
// Metrics Module - Prometheus metrics for the order engine
// ============================================================================
//
// Provides metrics for:
// - Engine operations (outcome, latency)
// - Orders placed
// - Status transitions
// - Stock handed back on cancellation
// - Courier telemetry and delivery ratings
//
// Scraped via GET /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Operation Metrics
    pub operations_total: IntCounterVec,
    pub operation_duration: HistogramVec,

    // Order Lifecycle Metrics
    pub orders_created: IntCounter,
    pub status_transitions: IntCounterVec,
    pub stock_units_restored: IntCounter,

    // Delivery Metrics
    pub delivery_updates: IntCounter,
    pub ratings: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let operations_total = IntCounterVec::new(
            Opts::new("order_operations_total", "Order engine operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Order engine operation duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let orders_created = IntCounter::new("orders_created_total", "Total orders placed")?;
        registry.register(Box::new(orders_created.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status transitions"),
            &["from_status", "to_status"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let stock_units_restored = IntCounter::new(
            "stock_units_restored_total",
            "Units of stock handed back to the catalog by cancellations",
        )?;
        registry.register(Box::new(stock_units_restored.clone()))?;

        let delivery_updates = IntCounter::new(
            "delivery_updates_total",
            "Courier telemetry updates applied",
        )?;
        registry.register(Box::new(delivery_updates.clone()))?;

        let ratings = IntCounterVec::new(
            Opts::new("delivery_ratings_total", "Delivery ratings by score"),
            &["rating"],
        )?;
        registry.register(Box::new(ratings.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            operation_duration,
            orders_created,
            status_transitions,
            stock_units_restored,
            delivery_updates,
            ratings,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record an engine operation outcome and latency
    pub fn record_operation(&self, operation: &str, duration_secs: f64, error: Option<&OrderError>) {
        let outcome = error.map_or("ok", OrderError::reason);
        self.operations_total.with_label_values(&[operation, outcome]).inc();
        self.operation_duration.with_label_values(&[operation]).observe(duration_secs);
    }

    pub fn record_order_created(&self) {
        self.orders_created.inc();
    }

    pub fn record_status_transition(&self, from: OrderStatus, to: OrderStatus) {
        self.status_transitions.with_label_values(&[from.as_str(), to.as_str()]).inc();
    }

    pub fn record_stock_restored(&self, units: u64) {
        self.stock_units_restored.inc_by(units);
    }

    pub fn record_delivery_update(&self) {
        self.delivery_updates.inc();
    }

    pub fn record_rating(&self, rating: u8) {
        let label = rating.to_string();
        self.ratings.with_label_values(&[label.as_str()]).inc();
    }
}
