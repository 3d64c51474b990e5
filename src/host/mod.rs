// ============================================================================
// Host Platform Collaborators
// ============================================================================
//
// The plugin owns no storage and no accounts. Everything it reads or writes
// goes through these traits:
// - IdentityProvider  - credential check, yields an Identity
// - OrderStore        - order lookup and mutation
// - StatusVocabulary  - the current set of valid order statuses
// - CallObserver      - fire-and-forget notification per dispatched call
//
// `memory` provides in-process implementations for the demo host and tests.
//
// ============================================================================

pub mod memory;
pub mod seed;

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::order::{MetaValue, OrderRecord};
use crate::rpc::RpcFault;

pub use memory::{
    MemoryIdentityProvider, MemoryOrderStore, MemoryStatusVocabulary, Role, StoreWrite,
    TracingCallObserver,
};
pub use seed::HostSeed;

/// Capability required to call any `wc.` method.
pub const EDIT_POSTS: &str = "edit_posts";

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: u64,
    pub username: String,
    capabilities: BTreeSet<String>,
}

impl Identity {
    pub fn new<I, S>(user_id: u64, username: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            username: username.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check credentials. The returned fault is passed to the caller verbatim.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, RpcFault>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<OrderRecord>>;

    /// The single published order whose custom number equals `number`.
    async fn find_by_custom_number(&self, number: &str) -> Result<Option<OrderRecord>>;

    /// Write every entry to one order. Either all entries land or none do.
    async fn update_metadata(&self, order_id: u64, entries: &[(&str, MetaValue)]) -> Result<()>;

    async fn transition_status(&self, order_id: u64, status: &str, note: &str) -> Result<()>;
}

#[async_trait]
pub trait StatusVocabulary: Send + Sync {
    async fn list_valid_statuses(&self) -> Result<BTreeSet<String>>;
}

pub trait CallObserver: Send + Sync {
    fn on_call(&self, method: &str);
}
