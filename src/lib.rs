//! Order tracking and status RPC methods for a shop platform.
//!
//! Exposes `wc.updateOrderTracking` and `wc.updateOrderStatus` behind one
//! authenticated dispatch entry point. The platform itself (accounts, order
//! storage, the order status vocabulary) is reached through the traits in
//! [`host`].
//!
//! ```ignore
//! let dispatcher = Arc::new(RequestDispatcher::new(identity, store, vocabulary, observer, metrics));
//! let table = Registrar::new(dispatcher).register(host_table);
//! let reply = table.invoke("wc.updateOrderStatus", params).await;
//! ```

pub mod config;
pub mod domain;
pub mod host;
pub mod metrics;
pub mod rpc;
pub mod server;

pub use config::Config;
pub use rpc::{CallParams, MethodTable, Registrar, RequestDispatcher, RpcFault, RpcValue};
