//! Logging and metrics
//!
//! - **Tracing**: `tracing-subscriber` fmt layer on stderr, `RUST_LOG` aware
//! - **Metrics**: `metrics` facade exported through Prometheus

use crate::utils::config::{LogFormat, ObservabilityConfig};
use crate::utils::errors::{ReplayError, Result};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const EVENTS_CAPTURED: &str = "session_replay_events_captured_total";
pub const EVENTS_DROPPED: &str = "session_replay_events_dropped_total";
pub const EVENTS_EXCLUDED: &str = "session_replay_events_excluded_total";
pub const DELIVERY_ATTEMPTS: &str = "session_replay_delivery_attempts_total";
pub const BATCHES_DELIVERED: &str = "session_replay_batches_delivered_total";
pub const EVENTS_PERSISTED: &str = "session_replay_events_persisted_total";
pub const EVENTS_LOST: &str = "session_replay_events_lost_total";
pub const BEACON_FLUSHES: &str = "session_replay_beacon_flushes_total";
pub const PAYLOAD_BYTES: &str = "session_replay_payload_bytes";

/// Install the global tracing subscriber
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ReplayError::Observability(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    result.map_err(|e| ReplayError::Observability(e.to_string()))
}

/// Install the Prometheus recorder
///
/// With `metrics_listen` set the exporter serves `/metrics` itself and no
/// handle is returned; otherwise the caller renders through the handle.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    let builder = PrometheusBuilder::new();

    let handle = match config.metrics_listen {
        Some(addr) => {
            builder
                .with_http_listener(addr)
                .install()
                .map_err(|e| ReplayError::Observability(e.to_string()))?;
            info!("Prometheus metrics listening on {}", addr);
            None
        }
        None => Some(
            builder
                .install_recorder()
                .map_err(|e| ReplayError::Observability(e.to_string()))?,
        ),
    };

    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!(EVENTS_CAPTURED, "Events admitted into the queue");
    describe_counter!(EVENTS_DROPPED, "Events dropped by the rate limiter");
    describe_counter!(EVENTS_EXCLUDED, "Events skipped for replay-exclude targets");
    describe_counter!(DELIVERY_ATTEMPTS, "Batch send attempts");
    describe_counter!(BATCHES_DELIVERED, "Batches accepted by the collector");
    describe_counter!(EVENTS_PERSISTED, "Events written to the fallback store");
    describe_counter!(EVENTS_LOST, "Events lost after every recovery step failed");
    describe_counter!(BEACON_FLUSHES, "Teardown flushes handed to the beacon");
    describe_histogram!(PAYLOAD_BYTES, "Serialized batch size in bytes");
}
