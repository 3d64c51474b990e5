use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::memory::{
    MemoryIdentityProvider, MemoryOrderStore, MemoryStatusVocabulary, Role, DEFAULT_STATUSES,
};
use crate::domain::order::OrderRecord;

// ============================================================================
// Host Seed - JSON document that populates the in-memory host
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostSeed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
}

fn default_statuses() -> Vec<String> {
    DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect()
}

impl Default for HostSeed {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            orders: Vec::new(),
            statuses: default_statuses(),
        }
    }
}

impl HostSeed {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid host seed document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read host seed {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn identity_provider(&self) -> Result<MemoryIdentityProvider> {
        let mut provider = MemoryIdentityProvider::new();
        for user in &self.users {
            provider.add_user(&user.username, &user.password, user.role)?;
        }
        Ok(provider)
    }

    pub fn order_store(&self) -> MemoryOrderStore {
        MemoryOrderStore::with_orders(self.orders.iter().cloned())
    }

    pub fn status_vocabulary(&self) -> MemoryStatusVocabulary {
        MemoryStatusVocabulary::new(self.statuses.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{IdentityProvider, OrderStore, StatusVocabulary};

    const SEED: &str = r#"{
        "users": [{"username": "shop", "password": "secret", "role": "shop_manager"}],
        "orders": [
            {"id": 123, "status": "processing"},
            {"id": 124, "status": "pending", "metadata": {"_order_number": "WC-124"}}
        ]
    }"#;

    #[tokio::test]
    async fn test_seed_builds_host() {
        let seed = HostSeed::from_json(SEED).unwrap();

        let identity = seed
            .identity_provider()
            .unwrap()
            .authenticate("shop", "secret")
            .await
            .unwrap();
        assert!(identity.has_capability("manage_woocommerce"));

        let store = seed.order_store();
        assert!(store.find_by_id(123).await.unwrap().is_some());
        assert_eq!(store.find_by_custom_number("WC-124").await.unwrap().unwrap().id, 124);

        let statuses = seed.status_vocabulary().list_valid_statuses().await.unwrap();
        assert_eq!(statuses.len(), DEFAULT_STATUSES.len());
    }

    #[test]
    fn test_seed_rejects_unknown_role() {
        let json = r#"{"users": [{"username": "x", "password": "y", "role": "owner"}]}"#;
        assert!(HostSeed::from_json(json).is_err());
    }
}
