// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Product lookup against the ComLine API.
//!
//! One lookup is one upstream GET: build the URL, classify the response, check
//! that upstream answered for the product that was asked for, and map it.
//! Every lookup records exactly one outcome in [`Metrics`].

use std::sync::Arc;

use tokio::time::Instant;

use crate::classify::classify;
use crate::error::ProductError;
use crate::metrics::{Metrics, Outcome};
use crate::model::PublicProduct;
use crate::upstream::UpstreamTransport;
use crate::url_builder::{sanitize_for_logging, ProductUrlBuilder};

#[derive(Clone)]
pub struct ProductService {
    transport: Arc<dyn UpstreamTransport>,
    urls: ProductUrlBuilder,
    metrics: Metrics,
}

impl ProductService {
    pub fn new(
        transport: Arc<dyn UpstreamTransport>,
        urls: ProductUrlBuilder,
        metrics: Metrics,
    ) -> Self {
        Self {
            transport,
            urls,
            metrics,
        }
    }

    /// Fetch one product by identifier on behalf of the caller's access token.
    pub async fn lookup(
        &self,
        identifier: &str,
        access_token: &str,
    ) -> Result<PublicProduct, ProductError> {
        let start = Instant::now();
        let result = self.fetch(identifier, access_token, start).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                self.metrics
                    .record_lookup(Outcome::Success, elapsed.as_secs_f64());
                tracing::info!(
                    identifier,
                    duration_ms = elapsed.as_millis() as u64,
                    "mapped upstream product"
                );
            }
            Err(err) => {
                self.metrics
                    .record_lookup(Outcome::Failure, elapsed.as_secs_f64());
                tracing::error!(
                    identifier,
                    error_kind = err.kind(),
                    http_status = err.status(),
                    duration_ms = elapsed.as_millis() as u64,
                    error = %err,
                    "product lookup failed"
                );
            }
        }

        result
    }

    async fn fetch(
        &self,
        identifier: &str,
        access_token: &str,
        start: Instant,
    ) -> Result<PublicProduct, ProductError> {
        let url = self.urls.build(identifier, access_token);
        tracing::info!(identifier, url = %sanitize_for_logging(&url), "calling upstream for product");

        let response = self.transport.get(&url).await?;
        tracing::debug!(
            identifier,
            http_status = response.status,
            duration_ms = start.elapsed().as_millis() as u64,
            "upstream responded"
        );

        let record = classify(identifier, &response)?;

        if record.identifier.as_deref() != Some(identifier) {
            tracing::warn!(
                requested = identifier,
                returned = record.identifier.as_deref().unwrap_or_default(),
                "identifier mismatch between request and upstream response"
            );
            return Err(ProductError::not_found(identifier));
        }

        Ok(PublicProduct::from(record))
    }
}
