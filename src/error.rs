use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Failure of the upstream call itself, before any status code is seen.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no upstream connection slot became free within {0:?}")]
    PoolTimeout(Duration),
    #[error("upstream connection pool is closed")]
    PoolClosed,
    #[error("upstream did not answer within {0:?}")]
    ResponseTimeout(Duration),
    #[error("upstream body was not received within {0:?}")]
    BodyTimeout(Duration),
    #[error("upstream body exceeded {0} bytes")]
    BodyTooLarge(usize),
    #[error("upstream request failed: {0}")]
    Request(reqwest::Error),
}

// The request URL carries `pwd` and `accesstoken`; it must not survive into
// messages or logs.
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.without_url())
    }
}

/// Typed outcome of a failed product lookup.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product with identifier {identifier} not found{}", http_suffix(.status))]
    ProductNotFound {
        identifier: String,
        status: Option<u16>,
    },
    #[error("Malformed response from upstream: {reason}")]
    MalformedUpstreamResponse {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },
    #[error("Upstream server error (HTTP {status})")]
    UpstreamServerError { status: u16 },
    #[error("Unexpected HTTP status from upstream: {status}")]
    UnexpectedUpstreamStatus { status: u16 },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl ProductError {
    pub fn not_found<T: Into<String>>(identifier: T) -> Self {
        Self::ProductNotFound {
            identifier: identifier.into(),
            status: None,
        }
    }

    pub fn malformed<T: Into<String>>(reason: T) -> Self {
        Self::MalformedUpstreamResponse {
            reason: reason.into(),
            source: None,
        }
    }

    /// Stable code exposed in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ProductError::ProductNotFound { .. } => "PRODUCT_NOT_FOUND",
            ProductError::MalformedUpstreamResponse { .. } => "MALFORMED_UPSTREAM_RESPONSE",
            ProductError::UpstreamServerError { .. } => "UPSTREAM_SERVER_ERROR",
            ProductError::UnexpectedUpstreamStatus { .. } => "UNEXPECTED_UPSTREAM_STATUS",
            ProductError::Transport(_) => "UPSTREAM_UNAVAILABLE",
        }
    }

    /// Short name used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProductError::ProductNotFound { .. } => "product_not_found",
            ProductError::MalformedUpstreamResponse { .. } => "malformed_upstream_response",
            ProductError::UpstreamServerError { .. } => "upstream_server_error",
            ProductError::UnexpectedUpstreamStatus { .. } => "unexpected_upstream_status",
            ProductError::Transport(_) => "transport",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProductError::ProductNotFound { status, .. } => *status,
            ProductError::UpstreamServerError { status }
            | ProductError::UnexpectedUpstreamStatus { status } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::BadRequest(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Product(ProductError::ProductNotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Product(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, message) = match self {
            AppError::BadRequest(message) => ("BAD_REQUEST", message.clone()),
            AppError::Product(err @ ProductError::ProductNotFound { .. }) => {
                (err.code(), err.to_string())
            }
            AppError::Product(err) => (
                err.code(),
                format!("An unexpected error occurred: {err}"),
            ),
            AppError::Internal(_) => ("INTERNAL_SERVER_ERROR", self.to_string()),
        };

        ErrorBody {
            error,
            message,
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Product(ProductError::ProductNotFound { .. }) => {
                tracing::info!(error = %self, "product not found");
            }
            AppError::BadRequest(_) => tracing::debug!(error = %self, "rejected request"),
            _ => tracing::error!(error = ?self, "request failed"),
        }

        (status, Json(self.body())).into_response()
    }
}
