//! Session Replay Client
//!
//! Plays the host page: reads JSON-lines `DomEvent`s from stdin, feeds them
//! to the capture listener, and delivers batches to the configured collector.
//!
//! ```text
//! {"type":"click","target":{"tagName":"BUTTON","id":"buy"},"clientX":1,"clientY":2,"pageX":1,"pageY":2}
//! {"type":"beforeunload"}
//! ```

use anyhow::Result;
use futures::StreamExt;
use session_replay::observability::{init_metrics, init_tracing};
use session_replay::utils::config::ReplayConfig;
use session_replay::{BuildInfo, DomEvent, ReplayClient};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ReplayConfig::load()?;

    // Initialize observability (tracing, metrics)
    init_tracing(&config.observability)?;
    let metrics = init_metrics(&config.observability)?;

    let build = BuildInfo::current();
    info!(
        "Starting session replay client v{} ({})",
        build.version, build.git_hash
    );
    debug!("Configuration loaded: {:?}", config);

    let client = ReplayClient::from_config(&config)?;
    let listener = client.start()?;

    let mut lines = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => match serde_json::from_str::<DomEvent>(&line) {
                    Ok(event) => {
                        listener.dispatch(event);
                    }
                    Err(e) => warn!("Skipping malformed event: {}", e),
                },
                Some(Err(e)) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
                None => {
                    info!("Input closed");
                    break;
                }
            },
            _ = &mut shutdown => {
                info!("Received shutdown signal, flushing...");
                break;
            }
        }
    }

    let outcome = client.stop().await;
    info!("Final flush: {:?}", outcome);
    info!("Client stats: {:?}", client.stats());

    if let Some(handle) = metrics {
        debug!("Metrics:\n{}", handle.render());
    }

    Ok(())
}
