use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;
use crate::rpc::{CallParams, MethodTable, Registrar, RpcFault, RpcResponse, RpcValue, StaticMethod};

// ============================================================================
// Demo Host Transport - JSON envelope over HTTP
// ============================================================================
//
// POST /rpc      {"methodName": "...", "params": {...}}
//                → {"result": ...} or {"fault": {"faultCode": n, "faultString": "..."}}
// GET  /metrics  Prometheus text exposition
// GET  /health   liveness
//
// Faults are answered with 200, like any other RPC reply.
//
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(rename = "methodName")]
    pub method_name: String,
    #[serde(default)]
    pub params: CallParams,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RpcReply {
    Result(RpcValue),
    Fault(RpcFault),
}

impl From<RpcResponse> for RpcReply {
    fn from(response: RpcResponse) -> Self {
        match response {
            Ok(value) => RpcReply::Result(value),
            Err(fault) => RpcReply::Fault(fault),
        }
    }
}

pub struct AppState {
    pub methods: MethodTable,
    pub metrics: Arc<Metrics>,
}

/// Host built-ins, then the `wc.` methods, then `system.listMethods`.
pub fn compose_method_table(registrar: &Registrar) -> MethodTable {
    let host = MethodTable::new().with("demo.sayHello", Arc::new(StaticMethod(RpcValue::from("Hello!"))));

    let mut table = registrar.register(host);

    let mut names: Vec<RpcValue> = table.names().into_iter().map(RpcValue::from).collect();
    names.push(RpcValue::from("system.listMethods"));
    names.sort_by_key(|v| v.to_string());
    table.insert("system.listMethods", Arc::new(StaticMethod(RpcValue::Array(names))));

    table
}

/// Route every endpoint onto `cfg`, shared by the server and its tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/rpc", web::post().to(rpc_handler))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler));
}

/// Start the HTTP server and run until shutdown.
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
    tracing::info!("🚀 Starting RPC server on http://{}:{}/rpc", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(state.clone()))
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}

async fn rpc_handler(state: web::Data<AppState>, request: web::Json<RpcRequest>) -> impl Responder {
    let RpcRequest { method_name, params } = request.into_inner();
    let response = state.methods.invoke(&method_name, params).await;
    HttpResponse::Ok().json(RpcReply::from(response))
}

async fn metrics_handler(state: web::Data<AppState>) -> impl Responder {
    match state.metrics.render() {
        Ok(buffer) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buffer),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "wc-order-rpc"
    }))
}

// ============================================================================
// Unit Tests
// ============================================================================
