use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::storage::StoreError;

// ============================================================================
// Commercial Profiles - Storefronts owned by companies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialProfile {
    pub id: Uuid,
    #[serde(rename = "empresaId")]
    pub company_id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ciudadId", default)]
    pub city_id: Option<Uuid>,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CommercialProfile {
    pub fn is_owned_by(&self, company_id: Uuid) -> bool {
        self.company_id == company_id
    }
}

/// Read side of the profile directory used by the order engine
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn get(&self, profile_id: Uuid) -> Result<Option<CommercialProfile>, StoreError>;

    async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<CommercialProfile>, StoreError>;

    async fn upsert(&self, profile: CommercialProfile) -> Result<(), StoreError>;
}
