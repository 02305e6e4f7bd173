use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{Order, OrderEvent, OrderLine, OrderRepository};
use crate::domain::storage::StoreError;
use crate::journal::EventEnvelope;

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Orders, their lines and their journal live behind one lock so that a
// record and the journal entry describing it are always committed together.
//
// ============================================================================

const ENTITY: &str = "order";

#[derive(Default)]
struct Tables {
    orders: HashMap<Uuid, Order>,
    lines: HashMap<Uuid, Vec<OrderLine>>,
    journal: HashMap<Uuid, Vec<EventEnvelope<OrderEvent>>>,
}

impl Tables {
    fn append(&mut self, order_id: Uuid, mut event: EventEnvelope<OrderEvent>) {
        let entries = self.journal.entry(order_id).or_default();
        event.sequence_number = entries.len() as i64 + 1;
        entries.push(event);
    }

    fn newest_first(&self, filter: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|order| filter(order))
            .cloned()
            .collect();
        // v7 ids break ties between orders placed in the same instant
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        orders
    }
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    tables: RwLock<Tables>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn insert(
        &self,
        order: &Order,
        lines: Vec<OrderLine>,
        event: EventEnvelope<OrderEvent>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if tables.orders.contains_key(&order.id) {
            return Err(StoreError::AlreadyExists {
                entity: ENTITY,
                id: order.id,
            });
        }

        tables.orders.insert(order.id, order.clone());
        tables.lines.insert(order.id, lines);
        tables.append(order.id, event);

        Ok(())
    }

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.read().await.orders.get(&order_id).cloned())
    }

    async fn replace(
        &self,
        order: &Order,
        expected_version: i64,
        event: EventEnvelope<OrderEvent>,
    ) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;

        let current = tables
            .orders
            .get(&order.id)
            .map(|stored| stored.version)
            .ok_or(StoreError::Missing {
                entity: ENTITY,
                id: order.id,
            })?;

        if current != expected_version {
            return Err(StoreError::VersionConflict {
                entity: ENTITY,
                id: order.id,
                expected: expected_version,
                actual: current,
            });
        }

        let mut stored = order.clone();
        stored.version = expected_version + 1;
        tables.orders.insert(order.id, stored.clone());
        tables.append(order.id, event);

        Ok(stored)
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(move |order| order.customer_id == customer_id))
    }

    async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(move |order| order.profile_id == profile_id))
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(|_| true))
    }

    async fn lines_for_order(&self, order_id: Uuid) -> Result<Vec<OrderLine>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .lines
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn history(&self, order_id: Uuid) -> Result<Vec<EventEnvelope<OrderEvent>>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .journal
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete(&self, order_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        tables.lines.remove(&order_id);
        tables.journal.remove(&order_id);
        Ok(tables.orders.remove(&order_id).is_some())
    }
}
