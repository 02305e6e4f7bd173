use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::storage::StoreError;

// ============================================================================
// Catalog - Products offered by commercial profiles
// ============================================================================
//
// The order engine reads prices and stock from here and moves stock up and
// down as orders are placed and cancelled. The product lifecycle itself is
// owned elsewhere.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[serde(rename = "perfilComercialId")]
    pub profile_id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(rename = "disponible")]
    pub available: bool,
}

impl Product {
    /// Whether `quantity` units could be sold right now
    pub fn can_supply(&self, quantity: u32) -> bool {
        self.available && self.stock >= quantity
    }
}

/// Product catalog port
///
/// Stock mutations must be atomic per product: implementations never expose
/// a read-then-write window to callers.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get(&self, product_id: Uuid) -> Result<Option<Product>, StoreError>;

    /// Take `quantity` units if the product exists, is available and has
    /// enough stock. Availability is switched off when stock hits zero.
    ///
    /// Returns `None` (and changes nothing) when the condition does not hold.
    async fn reserve_stock(&self, product_id: Uuid, quantity: u32) -> Result<Option<Product>, StoreError>;

    /// Give `quantity` units back. Availability is switched on when the
    /// resulting stock is positive. Returns `None` for unknown products.
    async fn restore_stock(&self, product_id: Uuid, quantity: u32) -> Result<Option<Product>, StoreError>;

    async fn upsert(&self, product: Product) -> Result<(), StoreError>;
}
