use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::domain::catalog::{Product, ProductCatalog};
use crate::domain::profile::{CommercialProfile, ProfileDirectory};

// ============================================================================
// Fixtures - Seed data for the in-memory catalog and profile directory
// ============================================================================
//
// File format:
// {
//   "profiles": [{ "id", "empresaId", "nombre", "ciudadId"?, "activo"? }],
//   "products": [{ "id", "perfilComercialId", "nombre", "precio", "stock", "disponible" }]
// }
//
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub profiles: Vec<CommercialProfile>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Fixtures {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Fixture file is not valid JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write every profile and product into the given stores
    pub async fn seed(self, profiles: &dyn ProfileDirectory, catalog: &dyn ProductCatalog) -> Result<()> {
        let profile_count = self.profiles.len();
        let product_count = self.products.len();

        for profile in self.profiles {
            let id = profile.id;
            profiles
                .upsert(profile)
                .await
                .with_context(|| format!("Failed to seed profile {id}"))?;
        }

        for product in self.products {
            let id = product.id;
            catalog
                .upsert(product)
                .await
                .with_context(|| format!("Failed to seed product {id}"))?;
        }

        tracing::info!(profiles = profile_count, products = product_count, "Fixtures loaded");
        Ok(())
    }
}
