use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{anyhow, bail, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{CallObserver, Identity, IdentityProvider, OrderStore, StatusVocabulary};
use crate::domain::order::{MetaValue, OrderRecord};
use crate::rpc::RpcFault;

// ============================================================================
// In-memory Host - Stand-ins for the platform collaborators
// ============================================================================

/// Fault the platform reports for bad credentials.
pub fn bad_login() -> RpcFault {
    RpcFault::new(403, "Incorrect username or password.")
}

/// Platform roles and the capabilities they grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    ShopManager,
    Editor,
    Author,
    Contributor,
    Subscriber,
}

impl Role {
    pub fn capabilities(self) -> &'static [&'static str] {
        match self {
            Role::Administrator => &[
                "read",
                "edit_posts",
                "publish_posts",
                "edit_others_posts",
                "manage_woocommerce",
                "manage_options",
            ],
            Role::ShopManager => &[
                "read",
                "edit_posts",
                "publish_posts",
                "edit_others_posts",
                "manage_woocommerce",
            ],
            Role::Editor => &["read", "edit_posts", "publish_posts", "edit_others_posts"],
            Role::Author => &["read", "edit_posts", "publish_posts"],
            Role::Contributor => &["read", "edit_posts"],
            Role::Subscriber => &["read"],
        }
    }
}

struct Account {
    user_id: u64,
    password_hash: String,
    role: Role,
}

/// Username/password accounts with argon2 password hashes.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: HashMap<String, Account>,
    next_user_id: u64,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            next_user_id: 1,
        }
    }

    /// Hash `password` and add the account.
    pub fn add_user(&mut self, username: &str, password: &str, role: Role) -> Result<u64> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password for {}: {}", username, e))?
            .to_string();

        let user_id = self.next_user_id.max(1);
        self.next_user_id = user_id + 1;

        self.accounts.insert(
            username.to_string(),
            Account {
                user_id,
                password_hash,
                role,
            },
        );

        Ok(user_id)
    }

    pub fn with_user(mut self, username: &str, password: &str, role: Role) -> Result<Self> {
        self.add_user(username, password, role)?;
        Ok(self)
    }

    fn verify(account: &Account, password: &str) -> bool {
        match PasswordHash::new(&account.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!(user_id = account.user_id, error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, RpcFault> {
        let account = self.accounts.get(username).ok_or_else(bad_login)?;

        if !Self::verify(account, password) {
            tracing::warn!(username = %username, "Rejected login");
            return Err(bad_login());
        }

        Ok(Identity::new(
            account.user_id,
            username,
            account.role.capabilities().iter().copied(),
        ))
    }
}

// ============================================================================
// Order Store
// ============================================================================

/// One write the store accepted, kept so callers can audit mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Metadata {
        order_id: u64,
        key: String,
        value: MetaValue,
    },
    Transition {
        order_id: u64,
        from: String,
        to: String,
    },
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<BTreeMap<u64, OrderRecord>>,
    writes: RwLock<Vec<StoreWrite>>,
}

impl MemoryOrderStore {
    pub fn with_orders(orders: impl IntoIterator<Item = OrderRecord>) -> Self {
        Self {
            orders: RwLock::new(orders.into_iter().map(|o| (o.id, o)).collect()),
            writes: RwLock::new(Vec::new()),
        }
    }

    pub async fn get(&self, id: u64) -> Option<OrderRecord> {
        self.orders.read().await.get(&id).cloned()
    }

    pub async fn writes(&self) -> Vec<StoreWrite> {
        self.writes.read().await.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.writes.read().await.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<OrderRecord>> {
        Ok(self.get(id).await)
    }

    async fn find_by_custom_number(&self, number: &str) -> Result<Option<OrderRecord>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|o| o.published && o.custom_number() == Some(number))
            .cloned())
    }

    async fn update_metadata(&self, order_id: u64, entries: &[(&str, MetaValue)]) -> Result<()> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&order_id) else {
            bail!("Order {} does not exist", order_id);
        };

        let mut writes = self.writes.write().await;
        for (key, value) in entries {
            order.metadata.insert(key.to_string(), value.clone());
            writes.push(StoreWrite::Metadata {
                order_id,
                key: key.to_string(),
                value: value.clone(),
            });
        }

        Ok(())
    }

    async fn transition_status(&self, order_id: u64, status: &str, note: &str) -> Result<()> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&order_id) else {
            bail!("Order {} does not exist", order_id);
        };

        let from = std::mem::replace(&mut order.status, status.to_string());
        let mut entry = format!("Order status changed from {} to {}.", from, status);
        if !note.is_empty() {
            entry.push(' ');
            entry.push_str(note);
        }
        order.notes.push(entry);

        tracing::info!(order_id = order_id, from = %from, to = %status, "Order status changed");

        self.writes.write().await.push(StoreWrite::Transition {
            order_id,
            from,
            to: status.to_string(),
        });

        Ok(())
    }
}

// ============================================================================
// Status Vocabulary
// ============================================================================

pub const DEFAULT_STATUSES: &[&str] = &[
    "pending",
    "failed",
    "on-hold",
    "processing",
    "completed",
    "refunded",
    "cancelled",
];

pub struct MemoryStatusVocabulary {
    statuses: RwLock<BTreeSet<String>>,
}

impl MemoryStatusVocabulary {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statuses: RwLock::new(statuses.into_iter().map(Into::into).collect()),
        }
    }

    /// Register an extra status, as a shop extension would.
    pub async fn add(&self, status: impl Into<String>) {
        self.statuses.write().await.insert(status.into());
    }
}

impl Default for MemoryStatusVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_STATUSES.iter().copied())
    }
}

#[async_trait]
impl StatusVocabulary for MemoryStatusVocabulary {
    async fn list_valid_statuses(&self) -> Result<BTreeSet<String>> {
        Ok(self.statuses.read().await.clone())
    }
}

/// Logs every dispatched call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCallObserver;

impl CallObserver for TracingCallObserver {
    fn on_call(&self, method: &str) {
        tracing::debug!(method = %method, "xmlrpc_call");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EDIT_POSTS;

    #[tokio::test]
    async fn test_authenticate_grants_role_capabilities() {
        let provider = MemoryIdentityProvider::new()
            .with_user("shop", "secret", Role::Contributor)
            .unwrap();

        let identity = provider.authenticate("shop", "secret").await.unwrap();
        assert_eq!(identity.username, "shop");
        assert!(identity.has_capability(EDIT_POSTS));
        assert!(!identity.has_capability("manage_woocommerce"));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_password_and_unknown_user() {
        let provider = MemoryIdentityProvider::new()
            .with_user("shop", "secret", Role::Administrator)
            .unwrap();

        assert_eq!(provider.authenticate("shop", "wrong").await.unwrap_err(), bad_login());
        assert_eq!(provider.authenticate("nobody", "secret").await.unwrap_err(), bad_login());
    }

    #[test]
    fn test_subscriber_cannot_edit_posts() {
        assert!(!Role::Subscriber.capabilities().contains(&EDIT_POSTS));
        assert!(Role::Contributor.capabilities().contains(&EDIT_POSTS));
    }

    #[tokio::test]
    async fn test_custom_number_lookup_skips_unpublished() {
        let store = MemoryOrderStore::with_orders(vec![
            OrderRecord::new(1, "pending").with_custom_number("A-1").unpublished(),
            OrderRecord::new(2, "pending").with_custom_number("B-2"),
        ]);

        assert!(store.find_by_custom_number("A-1").await.unwrap().is_none());
        assert_eq!(store.find_by_custom_number("B-2").await.unwrap().unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_transition_records_note_and_write() {
        let store = MemoryOrderStore::with_orders(vec![OrderRecord::new(5, "processing")]);

        store.transition_status(5, "completed", "Delivered").await.unwrap();

        let order = store.get(5).await.unwrap();
        assert_eq!(order.status, "completed");
        assert_eq!(
            order.notes,
            vec!["Order status changed from processing to completed. Delivered".to_string()]
        );
        assert_eq!(
            store.writes().await,
            vec![StoreWrite::Transition {
                order_id: 5,
                from: "processing".to_string(),
                to: "completed".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_update_metadata_on_missing_order_fails() {
        let store = MemoryOrderStore::default();
        let entries: [(&str, MetaValue); 2] =
            [("_tracking_provider", "ups".into()), ("_tracking_number", "x".into())];
        let result = store.update_metadata(9, &entries).await;
        assert!(result.is_err());
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_vocabulary_defaults_and_extension() {
        let vocabulary = MemoryStatusVocabulary::default();
        assert!(vocabulary.list_valid_statuses().await.unwrap().contains("completed"));

        vocabulary.add("awaiting-shipment").await;
        assert!(vocabulary
            .list_valid_statuses()
            .await
            .unwrap()
            .contains("awaiting-shipment"));
    }
}
