use crate::rpc::CallParams;

use super::errors::OrderError;
use super::value_objects::{parse_ship_date, OrderReference, StatusUpdate, TrackingUpdate};

// ============================================================================
// Order Commands - Validated caller intent
// ============================================================================
//
// Parsing never touches the host; it only checks that the call carries what
// the command needs. Required keys are checked in the order listed.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCommand {
    UpdateTracking {
        order: OrderReference,
        tracking: TrackingUpdate,
    },
    UpdateStatus {
        order: OrderReference,
        update: StatusUpdate,
    },
}

impl OrderCommand {
    pub fn update_tracking(params: &CallParams) -> Result<Self, OrderError> {
        let order = require(params, "order_number")?;
        let provider = require(params, "tracking_provider")?;
        let number = require(params, "tracking_number")?;

        let date_shipped = params
            .supplied_text("date_shipped")
            .map(|raw| parse_ship_date(&raw))
            .transpose()?;

        let status = params.text("order_status").map(|status| StatusUpdate {
            status,
            note: note(params),
        });

        Ok(OrderCommand::UpdateTracking {
            order: OrderReference::new(order),
            tracking: TrackingUpdate {
                provider,
                number,
                date_shipped,
                custom_provider: params.supplied_text("custom_tracking_provider"),
                custom_link: params.supplied_text("custom_tracking_link"),
                status,
            },
        })
    }

    pub fn update_status(params: &CallParams) -> Result<Self, OrderError> {
        let order = require(params, "order_number")?;
        let status = require(params, "order_status")?;

        Ok(OrderCommand::UpdateStatus {
            order: OrderReference::new(order),
            update: StatusUpdate {
                status,
                note: note(params),
            },
        })
    }

    pub fn order(&self) -> &OrderReference {
        match self {
            OrderCommand::UpdateTracking { order, .. } | OrderCommand::UpdateStatus { order, .. } => order,
        }
    }

    /// The status change this command asks for, if any.
    pub fn status_update(&self) -> Option<&StatusUpdate> {
        match self {
            OrderCommand::UpdateTracking { tracking, .. } => tracking.status.as_ref(),
            OrderCommand::UpdateStatus { update, .. } => Some(update),
        }
    }
}

fn require(params: &CallParams, key: &'static str) -> Result<String, OrderError> {
    params.text(key).ok_or(OrderError::MissingParameter(key))
}

fn note(params: &CallParams) -> String {
    params.supplied_text("message").unwrap_or_default()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking_params() -> CallParams {
        CallParams::new()
            .with("order_number", "123")
            .with("tracking_provider", "ups")
            .with("tracking_number", "1Z999")
    }

    #[test]
    fn test_update_tracking_minimal() {
        let cmd = OrderCommand::update_tracking(&tracking_params()).unwrap();

        match cmd {
            OrderCommand::UpdateTracking { order, tracking } => {
                assert_eq!(order.as_str(), "123");
                assert_eq!(tracking.provider, "ups");
                assert_eq!(tracking.number, "1Z999");
                assert_eq!(tracking.date_shipped, None);
                assert_eq!(tracking.custom_provider, None);
                assert_eq!(tracking.custom_link, None);
                assert_eq!(tracking.status, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_update_tracking_missing_fields_in_order() {
        let err = OrderCommand::update_tracking(&CallParams::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter, \"order_number\"");

        let params = CallParams::new().with("order_number", "1");
        let err = OrderCommand::update_tracking(&params).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter, \"tracking_provider\"");

        let params = params.with("tracking_provider", "ups");
        let err = OrderCommand::update_tracking(&params).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter, \"tracking_number\"");
        assert_eq!(err.code(), 500);
    }

    #[test]
    fn test_update_tracking_with_status_and_note() {
        let params = tracking_params()
            .with("order_status", "completed")
            .with("message", "Shipped via UPS");

        let cmd = OrderCommand::update_tracking(&params).unwrap();
        let status = cmd.status_update().unwrap();
        assert_eq!(status.status, "completed");
        assert_eq!(status.note, "Shipped via UPS");
    }

    #[test]
    fn test_update_tracking_bad_date() {
        let params = tracking_params().with("date_shipped", "31/12/2013");
        let err = OrderCommand::update_tracking(&params).unwrap_err();
        assert!(matches!(err, OrderError::InvalidDate(_)));
    }

    #[test]
    fn test_update_status() {
        let params = CallParams::new()
            .with("order_number", "WC-42")
            .with("order_status", "completed");

        let cmd = OrderCommand::update_status(&params).unwrap();
        assert_eq!(cmd.order().as_str(), "WC-42");
        assert_eq!(cmd.status_update().unwrap().note, "");
    }

    #[test]
    fn test_update_status_missing_status() {
        let params = CallParams::new().with("order_number", "1");
        let err = OrderCommand::update_status(&params).unwrap_err();
        assert!(err.to_string().contains("order_status"));
    }
}
