use crate::rpc::{NOT_FOUND, SERVER_ERROR};

// ============================================================================
// Order Handler Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Missing required parameter, \"{0}\"")]
    MissingParameter(&'static str),

    #[error("\"{0}\" is not a valid order status.")]
    InvalidStatus(String),

    #[error("\"{0}\" is not a valid ship date, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Order with number \"{0}\" not found")]
    NotFound(String),

    #[error("Order store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl OrderError {
    /// Fault code reported to the caller.
    pub fn code(&self) -> i32 {
        match self {
            OrderError::NotFound(_) => NOT_FOUND,
            OrderError::MissingParameter(_)
            | OrderError::InvalidStatus(_)
            | OrderError::InvalidDate(_)
            | OrderError::Store(_) => SERVER_ERROR,
        }
    }
}
