use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wc_order_rpc::host::{HostSeed, TracingCallObserver};
use wc_order_rpc::metrics::Metrics;
use wc_order_rpc::server::{self, AppState};
use wc_order_rpc::{Config, Registrar, RequestDispatcher};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wc_order_rpc=debug")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(environment = %config.environment, "🚀 Starting order RPC host");

    // === 1. Host collaborators ===
    let seed = match &config.seed_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading host seed");
            HostSeed::load(path)?
        }
        None => {
            tracing::warn!("HOST_SEED_PATH not set, starting with an empty host");
            HostSeed::default()
        }
    };

    let identity = Arc::new(seed.identity_provider()?);
    let store = Arc::new(seed.order_store());
    let vocabulary = Arc::new(seed.status_vocabulary());
    tracing::info!(
        users = seed.users.len(),
        orders = seed.orders.len(),
        statuses = seed.statuses.len(),
        "Host ready"
    );

    // === 2. Metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 3. Dispatcher and method table ===
    let dispatcher = Arc::new(RequestDispatcher::new(
        identity,
        store,
        vocabulary,
        Arc::new(TracingCallObserver),
        metrics.clone(),
    ));
    let methods = server::compose_method_table(&Registrar::new(dispatcher));
    tracing::info!(methods = ?methods.names(), "Method table composed");

    // === 4. Serve ===
    let state = Arc::new(AppState { methods, metrics });
    server::start_server(state, &config.http_host, config.http_port).await?;

    tracing::info!("Server stopped");
    Ok(())
}
