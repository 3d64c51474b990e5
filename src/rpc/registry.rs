use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::fault::{RpcFault, RpcResponse};
use super::value::{CallParams, RpcValue};

/// Prefix of every method this crate exposes.
pub const NAMESPACE: &str = "wc";

// ============================================================================
// Handler Table - The statically known set of exposed operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    UpdateOrderTracking,
    UpdateOrderStatus,
}

impl ApiMethod {
    pub const ALL: [ApiMethod; 2] = [ApiMethod::UpdateOrderTracking, ApiMethod::UpdateOrderStatus];

    /// Name without namespace, as callers spell it after `wc.`.
    pub fn name(self) -> &'static str {
        match self {
            ApiMethod::UpdateOrderTracking => "updateOrderTracking",
            ApiMethod::UpdateOrderStatus => "updateOrderStatus",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn qualified_name(self) -> String {
        format!("{}.{}", NAMESPACE, self.name())
    }
}

// ============================================================================
// Method Table - What the transport looks calls up in
// ============================================================================

/// Anything the transport can route a named call to.
#[async_trait]
pub trait RpcMethod: Send + Sync {
    /// `method_name` is the full name the caller used, e.g. `wc.updateOrderStatus`.
    async fn call(&self, method_name: &str, params: CallParams) -> RpcResponse;
}

/// A method that always answers with the same value.
pub struct StaticMethod(pub RpcValue);

#[async_trait]
impl RpcMethod for StaticMethod {
    async fn call(&self, _method_name: &str, _params: CallParams) -> RpcResponse {
        Ok(self.0.clone())
    }
}

#[derive(Clone, Default)]
pub struct MethodTable {
    methods: BTreeMap<String, Arc<dyn RpcMethod>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, method: Arc<dyn RpcMethod>) {
        self.methods.insert(name.into(), method);
    }

    pub fn with(mut self, name: impl Into<String>, method: Arc<dyn RpcMethod>) -> Self {
        self.insert(name, method);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn RpcMethod>> {
        self.methods.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    /// Route a call by its full name.
    pub async fn invoke(&self, name: &str, params: CallParams) -> RpcResponse {
        match self.get(name) {
            Some(method) => method.call(name, params).await,
            None => {
                tracing::warn!(method = %name, "Call to unknown method");
                Err(RpcFault::unknown_method(name))
            }
        }
    }
}

// ============================================================================
// Registrar - One-time composition into the host table
// ============================================================================

/// Points every `wc.<name>` entry at one dispatch entry point.
pub struct Registrar {
    entry: Arc<dyn RpcMethod>,
}

impl Registrar {
    pub fn new(entry: Arc<dyn RpcMethod>) -> Self {
        Self { entry }
    }

    /// Merge the `wc.` methods into `table`. Unrelated entries are kept.
    pub fn register(&self, mut table: MethodTable) -> MethodTable {
        for method in ApiMethod::ALL {
            let name = method.qualified_name();
            tracing::debug!(method = %name, "Registering RPC method");
            table.insert(name, self.entry.clone());
        }
        table
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
