use serde::Deserialize;
use uuid::Uuid;

use crate::domain::order::{DeliveryDetails, PlaceOrder, RequestedItem};

// ============================================================================
// Request Bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "perfilComercialId")]
    pub profile_id: Uuid,
    /// Only honoured for administrators; customers always order for themselves
    #[serde(rename = "clienteId", default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<CreateOrderItem>,
    #[serde(flatten)]
    pub delivery: DeliveryDetails,
}

/// Client-side prices and names may be present in the body; they are ignored
#[derive(Debug, Deserialize)]
pub struct CreateOrderItem {
    #[serde(rename = "productoId")]
    pub product_id: Uuid,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
}

impl CreateOrderRequest {
    pub fn into_command(self, customer_id: Uuid, requested_by: Uuid) -> PlaceOrder {
        PlaceOrder {
            customer_id,
            profile_id: self.profile_id,
            items: self
                .items
                .into_iter()
                .map(|item| RequestedItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            delivery: self.delivery,
            requested_by: Some(requested_by),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(rename = "estado")]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RateDeliveryRequest {
    #[serde(rename = "puntuacion")]
    pub rating: i64,
}
