//! Outbound transports
//!
//! - `EventTransport`: awaited JSON POST, success means a 2xx status
//! - `BeaconTransport`: fire-and-forget send used during teardown

use crate::utils::errors::{ReplayError, Result};
use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

/// Awaited delivery of a serialized batch
pub trait EventTransport: Send + Sync {
    fn send(&self, body: Bytes) -> BoxFuture<'_, Result<()>>;
}

/// Best-effort send with no delivery confirmation
pub trait BeaconTransport: Send + Sync {
    /// Returns whether the payload was handed off
    fn send_beacon(&self, body: Bytes) -> bool;
}

/// Resolve the endpoint against the origin unless it is already absolute
pub fn resolve_endpoint(origin: &str, api_endpoint: &str) -> String {
    if api_endpoint.starts_with("http://") || api_endpoint.starts_with("https://") {
        return api_endpoint.to_string();
    }

    let origin = origin.trim_end_matches('/');
    if api_endpoint.starts_with('/') {
        format!("{}{}", origin, api_endpoint)
    } else {
        format!("{}/{}", origin, api_endpoint)
    }
}

/// JSON POST over hyper's pooled client, plain HTTP or TLS by scheme
#[derive(Clone)]
pub struct HttpTransport {
    endpoint: Uri,
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpTransport {
    pub fn new(origin: &str, api_endpoint: &str) -> Result<Self> {
        let url = resolve_endpoint(origin, api_endpoint);
        let endpoint: Uri = url.parse().map_err(|e| {
            ReplayError::InvalidConfig(format!("Invalid endpoint '{}': {}", url, e))
        })?;

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// POST the body and map non-2xx responses to errors
    pub async fn post(&self, body: Bytes) -> Result<()> {
        let len = body.len();
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .map_err(|e| ReplayError::DeliveryFailed(format!("Request build error: {}", e)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ReplayError::DeliveryFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        // drain so the connection returns to the pool
        let _ = response.into_body().collect().await;

        debug!("POST {} ({} bytes) -> {}", self.endpoint, len, status);

        if status.is_success() {
            Ok(())
        } else {
            Err(ReplayError::HttpStatus(status.as_u16()))
        }
    }
}

impl EventTransport for HttpTransport {
    fn send(&self, body: Bytes) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.post(body))
    }
}

/// Beacon built on a detached POST
///
/// The request is spawned on the current runtime and never awaited, so the
/// caller cannot observe the outcome.
#[derive(Clone)]
pub struct HttpBeacon {
    transport: HttpTransport,
}

impl HttpBeacon {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

impl BeaconTransport for HttpBeacon {
    fn send_beacon(&self, body: Bytes) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return false;
        };

        let transport = self.transport.clone();
        handle.spawn(async move {
            if let Err(e) = transport.post(body).await {
                debug!("Beacon delivery failed: {}", e);
            }
        });
        true
    }
}
