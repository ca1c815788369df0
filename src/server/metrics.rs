//! Prometheus metrics for the API server
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `deployconfig_requests_total` | Counter | `surface`, `operation`, `result` |
//! | `deployconfig_defaulting_total` | Counter | `policy` |
//! | `deployconfig_dispatch_rejections_total` | Counter | |

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::crd::DefaultingPolicy;

pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    defaulting: IntCounterVec,
    dispatch_rejections: IntCounter,
}

pub type SharedMetrics = Arc<Metrics>;

/// Build a fresh registry with every metric registered
pub fn create_metrics() -> Result<SharedMetrics, prometheus::Error> {
    let registry = Registry::new();

    let requests = IntCounterVec::new(
        Opts::new(
            "deployconfig_requests_total",
            "DeploymentConfig requests by API surface, operation and result",
        ),
        &["surface", "operation", "result"],
    )?;
    let defaulting = IntCounterVec::new(
        Opts::new(
            "deployconfig_defaulting_total",
            "Objects passed through the defaulter, by policy",
        ),
        &["policy"],
    )?;
    let dispatch_rejections = IntCounter::new(
        "deployconfig_dispatch_rejections_total",
        "Requests rejected because their API surface was not recognized",
    )?;

    registry.register(Box::new(requests.clone()))?;
    registry.register(Box::new(defaulting.clone()))?;
    registry.register(Box::new(dispatch_rejections.clone()))?;

    Ok(Arc::new(Metrics {
        registry,
        requests,
        defaulting,
        dispatch_rejections,
    }))
}

impl Metrics {
    pub fn record_request(&self, surface: &str, operation: &str, result: &str) {
        self.requests
            .with_label_values(&[surface, operation, result])
            .inc();
    }

    pub fn record_defaulting(&self, policy: DefaultingPolicy) {
        self.defaulting.with_label_values(&[policy.as_str()]).inc();
    }

    pub fn record_dispatch_rejection(&self) {
        self.dispatch_rejections.inc();
    }

    /// Render every metric in Prometheus text format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
