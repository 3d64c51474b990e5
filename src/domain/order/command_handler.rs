use std::sync::Arc;

use crate::host::{OrderStore, StatusVocabulary};
use crate::rpc::CallParams;

use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::{OrderRecord, OrderReference, ResolvedBy, StatusUpdate};

/// Returned by every handler on success.
pub const SUCCESS_MESSAGE: &str = "OK";

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Params → Command → Vocabulary check → Order lookup → Writes
//
// Every check runs before the first write, so a failed call leaves the
// order untouched. `test_mode` stops right before the writes.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn OrderStore>,
    vocabulary: Arc<dyn StatusVocabulary>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn OrderStore>, vocabulary: Arc<dyn StatusVocabulary>) -> Self {
        Self { store, vocabulary }
    }

    /// `wc.updateOrderTracking`
    pub async fn update_order_tracking(&self, params: &CallParams) -> Result<&'static str, OrderError> {
        let command = OrderCommand::update_tracking(params)?;
        self.handle(command, params.flag("test_mode")).await
    }

    /// `wc.updateOrderStatus`
    pub async fn update_order_status(&self, params: &CallParams) -> Result<&'static str, OrderError> {
        let command = OrderCommand::update_status(params)?;
        self.handle(command, params.flag("test_mode")).await
    }

    /// Validate, resolve and apply one command.
    ///
    /// Tracking metadata goes to the store in a single call. A tracking call
    /// that also changes the status makes a second store call for the
    /// transition, so a store failure there leaves the metadata written.
    pub async fn handle(&self, command: OrderCommand, test_mode: bool) -> Result<&'static str, OrderError> {
        if let Some(update) = command.status_update() {
            self.ensure_valid_status(&update.status).await?;
        }

        let (order, resolved_by) = self.resolve_order(command.order()).await?;

        if test_mode {
            tracing::info!(
                order_id = order.id,
                reference = %command.order(),
                "Test mode, skipping order writes"
            );
            return Ok(SUCCESS_MESSAGE);
        }

        match &command {
            OrderCommand::UpdateTracking { tracking, .. } => {
                self.store
                    .update_metadata(order.id, &tracking.metadata_writes())
                    .await?;

                tracing::info!(
                    order_id = order.id,
                    resolved_by = ?resolved_by,
                    provider = %tracking.provider,
                    tracking_number = %tracking.number,
                    "✅ Updated order tracking"
                );

                if let Some(update) = &tracking.status {
                    self.apply_status(&order, update).await?;
                }
            }
            OrderCommand::UpdateStatus { update, .. } => {
                self.apply_status(&order, update).await?;
            }
        }

        Ok(SUCCESS_MESSAGE)
    }

    /// Find an order by host id first, then by custom order number.
    ///
    /// A reference that is both a valid id and some other order's custom
    /// number always resolves to the id.
    pub async fn resolve_order(&self, reference: &OrderReference) -> Result<(OrderRecord, ResolvedBy), OrderError> {
        if let Some(id) = reference.as_id() {
            if let Some(order) = self.store.find_by_id(id).await? {
                tracing::debug!(reference = %reference, order_id = order.id, "Resolved order by id");
                return Ok((order, ResolvedBy::Id));
            }
        }

        if let Some(order) = self.store.find_by_custom_number(reference.as_str()).await? {
            tracing::debug!(
                reference = %reference,
                order_id = order.id,
                "Resolved order by custom order number"
            );
            return Ok((order, ResolvedBy::CustomNumber));
        }

        tracing::warn!(reference = %reference, "Order not found");
        Err(OrderError::NotFound(reference.to_string()))
    }

    async fn ensure_valid_status(&self, status: &str) -> Result<(), OrderError> {
        let valid = self.vocabulary.list_valid_statuses().await?;
        if valid.contains(status) {
            Ok(())
        } else {
            Err(OrderError::InvalidStatus(status.to_string()))
        }
    }

    async fn apply_status(&self, order: &OrderRecord, update: &StatusUpdate) -> Result<(), OrderError> {
        if order.status == update.status {
            tracing::debug!(order_id = order.id, status = %order.status, "Order already in requested status");
            return Ok(());
        }

        self.store
            .transition_status(order.id, &update.status, &update.note)
            .await?;

        tracing::info!(
            order_id = order.id,
            from = %order.status,
            to = %update.status,
            "✅ Updated order status"
        );

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
