// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order-specific rules live here. The domain only talks to the host through
// the traits in `crate::host` and never sees the transport.
//
// ============================================================================

pub mod order;
