use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::journal::DomainEvent;
use super::value_objects::{OrderItem, OrderStatus};

// ============================================================================
// Order Events - Journal entries for the order aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    StatusChanged(OrderStatusChanged),
    Cancelled(OrderCancelled),
    DeliveryUpdated(OrderDeliveryUpdated),
    Rated(OrderRated),
    RestockPending(OrderRestockPending),
    RestockRetried(OrderRestockRetried),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => "OrderCreated",
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderEvent::Cancelled(_) => "OrderCancelled",
            OrderEvent::DeliveryUpdated(_) => "OrderDeliveryUpdated",
            OrderEvent::Rated(_) => "OrderRated",
            OrderEvent::RestockPending(_) => "OrderRestockPending",
            OrderEvent::RestockRetried(_) => "OrderRestockRetried",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order placed and stock reserved
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreated {
    pub customer_id: Uuid,
    pub profile_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderStatusChanged {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Order cancelled; `restock` lists the quantities handed back to the catalog
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCancelled {
    pub from: OrderStatus,
    pub restock: Vec<Restock>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Restock {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Courier telemetry changed; only the fields that were supplied
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct OrderDeliveryUpdated {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub route_progress: Option<f64>,
    pub route_geometry_set: bool,
    pub route_duration_secs: Option<i64>,
    pub route_started: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderRated {
    pub rating: u8,
}

/// Restoration failed for these lines after a cancellation
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderRestockPending {
    pub pending: Vec<Restock>,
}

/// A repeated cancellation claimed the pending lines for another attempt
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderRestockRetried {
    pub restock: Vec<Restock>,
}
