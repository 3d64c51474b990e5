// ============================================================================
// RPC Layer
// ============================================================================
//
// - value      - CallParams / RpcValue, what the transport hands over
// - fault      - RpcFault, what the caller gets back on failure
// - registry   - ApiMethod table, MethodTable, Registrar
// - dispatcher - RequestDispatcher, the shared `wc.` entry point
//
// ============================================================================

mod dispatcher;
mod fault;
mod registry;
mod value;

pub use dispatcher::RequestDispatcher;
pub use fault::{RpcFault, RpcResponse, FORBIDDEN, METHOD_NOT_ALLOWED, NOT_FOUND, SERVER_ERROR, UNKNOWN_METHOD};
pub use registry::{ApiMethod, MethodTable, Registrar, RpcMethod, StaticMethod, NAMESPACE};
pub use value::{CallParams, RpcValue};
