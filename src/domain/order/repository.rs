use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::storage::StoreError;
use crate::journal::EventEnvelope;
use super::aggregate::Order;
use super::events::OrderEvent;
use super::value_objects::OrderLine;

// ============================================================================
// Order Repository - Persistence port for orders
// ============================================================================
//
// Every write carries the journal entry describing it; implementations must
// commit the record and its journal entry together or not at all.
//
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order with its join records
    async fn insert(
        &self,
        order: &Order,
        lines: Vec<OrderLine>,
        event: EventEnvelope<OrderEvent>,
    ) -> Result<(), StoreError>;

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Full-record replace guarded by `expected_version`.
    ///
    /// Returns the stored record with its bumped version.
    async fn replace(
        &self,
        order: &Order,
        expected_version: i64,
        event: EventEnvelope<OrderEvent>,
    ) -> Result<Order, StoreError>;

    /// Newest first
    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// Newest first
    async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// Newest first
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    async fn lines_for_order(&self, order_id: Uuid) -> Result<Vec<OrderLine>, StoreError>;

    async fn history(&self, order_id: Uuid) -> Result<Vec<EventEnvelope<OrderEvent>>, StoreError>;

    /// Administrative removal of an order, its lines and its journal
    async fn delete(&self, order_id: Uuid) -> Result<bool, StoreError>;
}
