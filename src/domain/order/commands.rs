use uuid::Uuid;

use super::value_objects::{DeliveryDetails, TelemetryPatch};

// ============================================================================
// Order Commands - Represent caller intent
// ============================================================================

/// A product and the quantity the customer asked for. The quantity is kept
/// as received so that zero and negative values can be rejected explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedItem {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer_id: Uuid,
    pub profile_id: Uuid,
    pub items: Vec<RequestedItem>,
    pub delivery: DeliveryDetails,
    pub requested_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ChangeStatus {
    pub order_id: Uuid,
    /// Raw status name, validated by the engine
    pub target: String,
    /// When set, the order's profile must belong to this company
    pub company_id: Option<Uuid>,
    pub requested_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdateDelivery {
    pub order_id: Uuid,
    pub patch: TelemetryPatch,
    pub requested_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct RateDelivery {
    pub order_id: Uuid,
    pub rating: i64,
    pub requested_by: Option<Uuid>,
}
