use serde::{Deserialize, Serialize};

use super::value::RpcValue;
use crate::domain::order::OrderError;

// ============================================================================
// Wire-level Faults
// ============================================================================

pub const FORBIDDEN: i32 = 403;
pub const NOT_FOUND: i32 = 404;
pub const METHOD_NOT_ALLOWED: i32 = 405;
pub const SERVER_ERROR: i32 = 500;

/// Host-level code for a method name missing from the method table.
pub const UNKNOWN_METHOD: i32 = -32601;

/// Error returned to the remote caller: an integer code and a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct RpcFault {
    #[serde(rename = "faultCode")]
    pub code: i32,
    #[serde(rename = "faultString")]
    pub message: String,
}

impl RpcFault {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden() -> Self {
        Self::new(FORBIDDEN, "You are not allowed access to details about orders.")
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(METHOD_NOT_ALLOWED, format!("Method \"{}\" not allowed", method))
    }

    pub fn unknown_method(method: &str) -> Self {
        Self::new(
            UNKNOWN_METHOD,
            format!("server error. requested method {} does not exist.", method),
        )
    }
}

impl From<OrderError> for RpcFault {
    fn from(err: OrderError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Outcome of one remote call.
pub type RpcResponse = Result<RpcValue, RpcFault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_keeps_code_and_message() {
        let fault = RpcFault::from(OrderError::NotFound("999".to_string()));
        assert_eq!(fault.code, 404);
        assert_eq!(fault.message, "Order with number \"999\" not found");
    }

    #[test]
    fn test_fault_serializes_with_wire_names() {
        let json = serde_json::to_value(RpcFault::forbidden()).unwrap();
        assert_eq!(json["faultCode"], 403);
        assert_eq!(
            json["faultString"],
            "You are not allowed access to details about orders."
        );
    }

    #[test]
    fn test_method_not_allowed_names_method() {
        let fault = RpcFault::method_not_allowed("deleteOrder");
        assert_eq!(fault.code, 405);
        assert!(fault.message.contains("deleteOrder"));
    }
}
