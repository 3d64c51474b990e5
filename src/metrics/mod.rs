use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::rpc::RpcResponse;

// ============================================================================
// Metrics Module - Prometheus metrics for the RPC surface
// ============================================================================
//
// Provides:
// - Calls per method and outcome
// - Faults per method and code
// - Call latency per method
//
// Exposed via GET /metrics on the HTTP server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub rpc_calls: IntCounterVec,
    pub rpc_faults: IntCounterVec,
    pub rpc_call_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let rpc_calls = IntCounterVec::new(
            Opts::new("rpc_calls_total", "Total RPC calls dispatched"),
            &["method", "outcome"],
        )?;
        registry.register(Box::new(rpc_calls.clone()))?;

        let rpc_faults = IntCounterVec::new(
            Opts::new("rpc_faults_total", "Total RPC calls answered with a fault"),
            &["method", "code"],
        )?;
        registry.register(Box::new(rpc_faults.clone()))?;

        let rpc_call_duration = HistogramVec::new(
            HistogramOpts::new("rpc_call_duration_seconds", "RPC call duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["method"],
        )?;
        registry.register(Box::new(rpc_call_duration.clone()))?;

        Ok(Self {
            registry,
            rpc_calls,
            rpc_faults,
            rpc_call_duration,
        })
    }

    /// Record one finished call
    pub fn record_call(&self, method: &str, duration_secs: f64, response: &RpcResponse) {
        match response {
            Ok(_) => {
                self.rpc_calls.with_label_values(&[method, "ok"]).inc();
            }
            Err(fault) => {
                self.rpc_calls.with_label_values(&[method, "fault"]).inc();
                self.rpc_faults
                    .with_label_values(&[method, &fault.code.to_string()])
                    .inc();
            }
        }
        self.rpc_call_duration.with_label_values(&[method]).observe(duration_secs);
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> anyhow::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
