// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport to the ComLine API.
//!
//! Performs exactly one GET per call and hands back the raw status and body.
//! Concurrency is capped by a semaphore sized to the configured connection
//! limit; waiting for a slot, sending the request and reading the body are
//! each bounded by their own timeout. Bodies larger than [`MAX_BODY_BYTES`] are
//! rejected.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::{DnsResolver, HttpClientConfig};
use crate::error::TransportError;

/// Largest upstream body accepted for a single product record.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Status and body of a completed upstream exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Anything that can perform the single GET a lookup needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, TransportError>;
}

/// reqwest-backed transport used in production.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    slots: Arc<Semaphore>,
    acquire_timeout: Duration,
    response_timeout: Duration,
    read_timeout: Duration,
    max_body_bytes: usize,
}

impl HttpUpstream {
    /// Construct a new upstream client using the provided configuration.
    pub fn try_new(config: &HttpClientConfig) -> Result<Self, TransportError> {
        let builder = Client::builder()
            .connect_timeout(config.connection_timeout)
            .pool_max_idle_per_host(config.max_connections);

        let builder = match config.dns_resolver {
            DnsResolver::Native => builder.hickory_dns(true),
            DnsResolver::System => builder.hickory_dns(false),
        };

        let client = builder.build()?;

        match config.dns_resolver {
            DnsResolver::Native => tracing::info!("using bundled DNS resolver for upstream"),
            DnsResolver::System => tracing::info!("using system DNS resolver for upstream"),
        }
        tracing::debug!(
            connect_timeout_ms = config.connection_timeout.as_millis() as u64,
            read_timeout_ms = config.read_timeout.as_millis() as u64,
            write_timeout_ms = config.write_timeout.as_millis() as u64,
            max_connections = config.max_connections,
            pending_acquire_timeout_ms = config.pending_acquire_timeout.as_millis() as u64,
            "upstream client configured"
        );

        Ok(Self {
            client,
            slots: Arc::new(Semaphore::new(config.max_connections)),
            acquire_timeout: config.pending_acquire_timeout,
            // Sending covers writing the request and waiting for the response head.
            response_timeout: config.write_timeout + config.read_timeout,
            read_timeout: config.read_timeout,
            max_body_bytes: MAX_BODY_BYTES,
        })
    }
}

#[async_trait]
impl UpstreamTransport for HttpUpstream {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, TransportError> {
        let _slot = timeout(self.acquire_timeout, self.slots.acquire())
            .await
            .map_err(|_| TransportError::PoolTimeout(self.acquire_timeout))?
            .map_err(|_| TransportError::PoolClosed)?;

        let response = timeout(self.response_timeout, self.client.get(url).send())
            .await
            .map_err(|_| TransportError::ResponseTimeout(self.response_timeout))??;

        let status = response.status().as_u16();

        let body = timeout(self.read_timeout, read_body(response, self.max_body_bytes))
            .await
            .map_err(|_| TransportError::BodyTimeout(self.read_timeout))??;

        Ok(UpstreamResponse { status, body })
    }
}

async fn read_body(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, TransportError> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(TransportError::BodyTooLarge(limit));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(TransportError::BodyTooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
