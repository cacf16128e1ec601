// Copyright 2025 Memophor Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP API handlers for the product edge service.
//!
//! - `GET /healthz` - Service health check
//! - `GET /metrics` - Prometheus metrics export
//! - `GET /api/v1/products/:identifier?accessToken=...` - Product lookup
//!
//! Failures leave through [`AppError`], which renders the JSON error envelope.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::metrics::Metrics;
use crate::model::{ProductQuery, PublicProduct};
use crate::service::ProductService;

#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub metrics: Metrics,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .route("/api/v1/products/:identifier", get(get_product))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health() -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "comline-edge",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state.metrics.export()
}

/// Fetch a single product from upstream
pub async fn get_product(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<PublicProduct>, AppError> {
    if identifier.trim().is_empty() {
        return Err(AppError::bad_request("product identifier is required"));
    }

    let Some(access_token) = query.access_token.filter(|t| !t.trim().is_empty()) else {
        return Err(AppError::bad_request("accessToken query parameter is required"));
    };

    tracing::info!(identifier = %identifier, "received product request");

    let product = state.products.lookup(&identifier, &access_token).await?;

    Ok(Json(product))
}
