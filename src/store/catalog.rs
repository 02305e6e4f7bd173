use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::catalog::{Product, ProductCatalog};
use crate::domain::storage::StoreError;

// ============================================================================
// In-Memory Catalog
// ============================================================================
//
// Every stock mutation happens under the write lock, which makes the
// check-and-decrement a single step.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn get(&self, product_id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn reserve_stock(&self, product_id: Uuid, quantity: u32) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;

        let Some(product) = products.get_mut(&product_id) else {
            return Ok(None);
        };
        if !product.can_supply(quantity) {
            return Ok(None);
        }

        product.stock -= quantity;
        if product.stock == 0 {
            product.available = false;
        }

        Ok(Some(product.clone()))
    }

    async fn restore_stock(&self, product_id: Uuid, quantity: u32) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;

        let Some(product) = products.get_mut(&product_id) else {
            return Ok(None);
        };

        product.stock = product.stock.saturating_add(quantity);
        if product.stock > 0 {
            product.available = true;
        }

        Ok(Some(product.clone()))
    }

    async fn upsert(&self, product: Product) -> Result<(), StoreError> {
        self.products.write().await.insert(product.id, product);
        Ok(())
    }
}
