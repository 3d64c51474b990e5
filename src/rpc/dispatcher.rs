use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;
use uuid::Uuid;

use super::fault::{RpcFault, RpcResponse};
use super::registry::{ApiMethod, RpcMethod};
use super::value::{CallParams, RpcValue};
use crate::domain::order::OrderCommandHandler;
use crate::host::{CallObserver, IdentityProvider, OrderStore, StatusVocabulary, EDIT_POSTS};
use crate::metrics::Metrics;

// ============================================================================
// Request Dispatcher - Single entry point behind every `wc.` method
// ============================================================================
//
// Per call:
// 1. Authenticate username/password with the host
// 2. Require the edit_posts capability
// 3. Resolve `wc.<method>` to a registered handler
// 4. Notify the host call hook
// 5. Run the handler, turning its error into a fault
//
// Nothing past step 2 runs for a caller that fails steps 1 or 2.
//
// ============================================================================

pub struct RequestDispatcher {
    identity: Arc<dyn IdentityProvider>,
    orders: OrderCommandHandler,
    observer: Arc<dyn CallObserver>,
    metrics: Arc<Metrics>,
}

impl RequestDispatcher {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn OrderStore>,
        vocabulary: Arc<dyn StatusVocabulary>,
        observer: Arc<dyn CallObserver>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            identity,
            orders: OrderCommandHandler::new(store, vocabulary),
            observer,
            metrics,
        }
    }

    /// Handle one call made under the full name `method_name`.
    pub async fn handle(&self, method_name: &str, params: &CallParams) -> RpcResponse {
        let call_id = Uuid::new_v4();
        let span = tracing::info_span!("rpc_call", call_id = %call_id, method = %method_name);
        let started = Instant::now();

        let response = self.dispatch(method_name, params).instrument(span.clone()).await;

        let elapsed = started.elapsed();
        self.metrics.record_call(method_name, elapsed.as_secs_f64(), &response);

        span.in_scope(|| match &response {
            Ok(_) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "RPC call succeeded"),
            Err(fault) => tracing::warn!(
                code = fault.code,
                message = %fault.message,
                elapsed_ms = elapsed.as_millis() as u64,
                "RPC call failed"
            ),
        });

        response
    }

    async fn dispatch(&self, method_name: &str, params: &CallParams) -> RpcResponse {
        let (username, password) = params.credentials();
        let identity = self.identity.authenticate(&username, &password).await?;

        if !identity.has_capability(EDIT_POSTS) {
            tracing::warn!(user_id = identity.user_id, "Caller lacks {}", EDIT_POSTS);
            return Err(RpcFault::forbidden());
        }

        let called = called_method(method_name);
        let method = ApiMethod::from_name(called).ok_or_else(|| RpcFault::method_not_allowed(called))?;

        self.observer.on_call(&method.qualified_name());

        tracing::debug!(user_id = identity.user_id, params = params.len(), "Invoking handler");

        let result = match method {
            ApiMethod::UpdateOrderTracking => self.orders.update_order_tracking(params).await,
            ApiMethod::UpdateOrderStatus => self.orders.update_order_status(params).await,
        };

        result.map(RpcValue::from).map_err(RpcFault::from)
    }
}

#[async_trait]
impl RpcMethod for RequestDispatcher {
    async fn call(&self, method_name: &str, params: CallParams) -> RpcResponse {
        self.handle(method_name, &params).await
    }
}

/// Right-hand side of `<namespace>.<method>`; empty when there is no dot.
fn called_method(method_name: &str) -> &str {
    method_name
        .split_once('.')
        .map(|(_, method)| method)
        .unwrap_or("")
}

// ============================================================================
// Unit Tests
// ============================================================================
