// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Interpretation of one upstream HTTP exchange.
//!
//! Turns a status code and raw body into either the decoded product record or a
//! typed [`ProductError`]. Error bodies are only ever logged, never returned.

use crate::error::ProductError;
use crate::model::{UpstreamEnvelope, UpstreamProductRecord};
use crate::upstream::UpstreamResponse;

/// Longest body excerpt written to the logs.
const MAX_LOGGED_BODY_CHARS: usize = 1024;

/// Classify the exchange by status class and decode the product record on success.
pub fn classify(
    identifier: &str,
    response: &UpstreamResponse,
) -> Result<UpstreamProductRecord, ProductError> {
    let status = response.status;

    match status {
        200..=299 => decode_record(&response.body),
        400..=499 => {
            tracing::warn!(
                identifier,
                http_status = status,
                body = %body_excerpt(&response.body),
                "upstream returned client error"
            );
            Err(ProductError::ProductNotFound {
                identifier: identifier.to_string(),
                status: Some(status),
            })
        }
        500..=599 => {
            tracing::error!(
                identifier,
                http_status = status,
                body = %body_excerpt(&response.body),
                "upstream returned server error"
            );
            Err(ProductError::UpstreamServerError { status })
        }
        _ => {
            tracing::warn!(identifier, http_status = status, "upstream returned unexpected status");
            Err(ProductError::UnexpectedUpstreamStatus { status })
        }
    }
}

/// Decode a success body into the product record it must carry.
pub fn decode_record(body: &[u8]) -> Result<UpstreamProductRecord, ProductError> {
    let envelope: UpstreamEnvelope =
        serde_json::from_slice(body).map_err(|e| ProductError::MalformedUpstreamResponse {
            reason: format!("failed to decode upstream payload: {e}"),
            source: Some(e),
        })?;

    envelope
        .artikeldaten
        .ok_or_else(|| ProductError::malformed("missing artikeldaten"))
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut chars = text.chars();
    let excerpt: String = chars.by_ref().take(MAX_LOGGED_BODY_CHARS).collect();

    if chars.next().is_some() {
        format!("{excerpt}…")
    } else {
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> UpstreamResponse {
        UpstreamResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_yields_record() {
        let record = classify(
            "X1",
            &response(200, r#"{"artikeldaten":{"comline_artikelnummer":"X1"}}"#),
        )
        .unwrap();

        assert_eq!(record.identifier.as_deref(), Some("X1"));
    }

    #[test]
    fn any_2xx_is_decoded() {
        let record = classify("X1", &response(203, r#"{"artikeldaten":{}}"#)).unwrap();

        assert!(record.identifier.is_none());
    }

    #[test]
    fn missing_record_is_malformed() {
        let err = classify("X1", &response(200, r#"{"checksum":"c"}"#)).unwrap_err();

        match err {
            ProductError::MalformedUpstreamResponse { reason, source } => {
                assert_eq!(reason, "missing artikeldaten");
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_malformed_with_cause() {
        let err = classify("X1", &response(200, "<html>oops</html>")).unwrap_err();

        match err {
            ProductError::MalformedUpstreamResponse { source, .. } => assert!(source.is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_success_body_is_malformed() {
        let err = classify("X1", &response(204, "")).unwrap_err();

        assert_eq!(err.kind(), "malformed_upstream_response");
    }

    #[test]
    fn type_mismatch_is_malformed() {
        let err = classify(
            "X1",
            &response(200, r#"{"artikeldaten":{"artikel_laenge":"long"}}"#),
        )
        .unwrap_err();

        assert_eq!(err.kind(), "malformed_upstream_response");
    }

    #[test]
    fn client_error_is_not_found_regardless_of_body() {
        let err = classify("X", &response(404, "")).unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, ProductError::ProductNotFound { status: Some(404), .. }));
        assert!(message.contains('X'));
        assert!(message.contains("404"));

        let err = classify("X", &response(400, r#"{"artikeldaten":{}}"#)).unwrap_err();
        assert!(matches!(err, ProductError::ProductNotFound { status: Some(400), .. }));
    }

    #[test]
    fn server_error_carries_status() {
        let err = classify("X", &response(503, "maintenance")).unwrap_err();

        assert!(matches!(err, ProductError::UpstreamServerError { status: 503 }));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn other_status_classes_are_unexpected() {
        for status in [101, 302, 304, 600, 999] {
            let err = classify("X", &response(status, "")).unwrap_err();
            assert!(
                matches!(err, ProductError::UnexpectedUpstreamStatus { status: s } if s == status),
                "status {status}"
            );
        }
    }

    #[test]
    fn body_excerpt_is_bounded() {
        let long = "a".repeat(MAX_LOGGED_BODY_CHARS + 10);
        let excerpt = body_excerpt(long.as_bytes());

        assert_eq!(excerpt.chars().count(), MAX_LOGGED_BODY_CHARS + 1);
        assert_eq!(body_excerpt(b"short"), "short");
    }
}
