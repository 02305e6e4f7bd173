use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::profile::{CommercialProfile, ProfileDirectory};
use crate::domain::storage::StoreError;

#[derive(Default)]
pub struct InMemoryProfileDirectory {
    profiles: RwLock<HashMap<Uuid, CommercialProfile>>,
}

impl InMemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn get(&self, profile_id: Uuid) -> Result<Option<CommercialProfile>, StoreError> {
        Ok(self.profiles.read().await.get(&profile_id).cloned())
    }

    async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<CommercialProfile>, StoreError> {
        let mut profiles: Vec<CommercialProfile> = self
            .profiles
            .read()
            .await
            .values()
            .filter(|profile| profile.is_owned_by(company_id))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn upsert(&self, profile: CommercialProfile) -> Result<(), StoreError> {
        self.profiles.write().await.insert(profile.id, profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(company_id: Uuid, name: &str) -> CommercialProfile {
        CommercialProfile {
            id: Uuid::new_v4(),
            company_id,
            name: name.to_string(),
            city_id: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_list_by_company() {
        let directory = InMemoryProfileDirectory::new();
        let company = Uuid::new_v4();

        directory.upsert(profile(company, "Sucursal Sur")).await.unwrap();
        directory.upsert(profile(company, "Sucursal Centro")).await.unwrap();
        directory.upsert(profile(Uuid::new_v4(), "Otra Empresa")).await.unwrap();

        let names: Vec<String> = directory
            .list_by_company(company)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Sucursal Centro", "Sucursal Sur"]);
        assert_eq!(directory.len().await, 3);
    }

    #[tokio::test]
    async fn test_get_missing_profile() {
        let directory = InMemoryProfileDirectory::new();
        assert!(directory.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
