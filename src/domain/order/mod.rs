// ============================================================================
// Order Domain - Tracking and status updates for host orders
// ============================================================================
//
// - Value objects (OrderReference, OrderRecord, TrackingUpdate, StatusUpdate)
// - Commands (OrderCommand, parsed from call parameters)
// - Errors (OrderError enum, each with a fault code)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod command_handler;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
