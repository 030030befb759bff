use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Construction-time validation errors for client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown endpoint '{value}', expected one of phases, structures, calculations, entries")]
    UnknownEndpoint { value: String },
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("max in-flight page fetches must be greater than zero")]
    ZeroMaxInFlight,
    #[error("base URL for '{family}' must not be empty")]
    EmptyBaseUrl { family: &'static str },
}

/// Classification of a failed catalog API call.
///
/// The classes drive the retry policy: only `ServerTransient` is retried by
/// default, `Unclassified` retries behind a config knob, `ClientRejected`
/// never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP 500/502/503 — the server hiccuped, the same request may succeed later.
    ServerTransient,
    /// HTTP 403/404/406 — the server rejected the request itself.
    ClientRejected,
    /// Any other status, or a connection-level failure with no status at all.
    Unclassified,
}

/// A classified catalog API failure, carrying the status code (when one was
/// received) and a snippet of the response body for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ApiErrorKind,
    status: Option<u16>,
    snippet: String,
}

/// Response bodies can be whole HTML error pages; keep only the head.
const SNIPPET_MAX: usize = 256;

impl ApiError {
    /// Classify a non-2xx HTTP status into an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            500 | 502 | 503 => ApiErrorKind::ServerTransient,
            403 | 404 | 406 => ApiErrorKind::ClientRejected,
            _ => ApiErrorKind::Unclassified,
        };
        Self {
            kind,
            status: Some(status),
            snippet: truncate_snippet(body),
        }
    }

    /// Connection-level failure that never produced a status code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Unclassified,
            status: None,
            snippet: truncate_snippet(&message.into()),
        }
    }

    pub const fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub const fn retryable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::ServerTransient)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ApiErrorKind::ServerTransient => "api.server_transient",
            ApiErrorKind::ClientRejected => "api.client_rejected",
            ApiErrorKind::Unclassified => "api.unclassified",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "catalog API status {status} ({}): {}", self.code(), self.snippet),
            None => write!(f, "catalog API transport failure ({}): {}", self.code(), self.snippet),
        }
    }
}

impl std::error::Error for ApiError {}

fn truncate_snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(SNIPPET_MAX) {
        Some((index, _)) => format!("{}...", &trimmed[..index]),
        None => trimmed.to_owned(),
    }
}

/// Top-level error for a logical fetch. A failed fetch never yields a partial
/// result: the caller gets either a complete ordered record set or one of
/// these.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response JSON did not carry the field the endpoint descriptor
    /// declares for records. Never silently coerced to an empty page.
    #[error("response envelope missing expected field '{field}'")]
    MalformedEnvelope { field: String },

    #[error("invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("deadline exceeded before the fetch completed")]
    DeadlineExceeded,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FetchError {
    pub fn malformed(field: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_statuses_classify_as_transient() {
        for status in [500, 502, 503] {
            let error = ApiError::from_status(status, "boom");
            assert_eq!(error.kind(), ApiErrorKind::ServerTransient, "status {status}");
            assert!(error.retryable());
        }
    }

    #[test]
    fn client_statuses_classify_as_rejected() {
        for status in [403, 404, 406] {
            let error = ApiError::from_status(status, "denied");
            assert_eq!(error.kind(), ApiErrorKind::ClientRejected, "status {status}");
            assert!(!error.retryable());
        }
    }

    #[test]
    fn other_statuses_classify_as_unclassified() {
        for status in [301, 400, 418, 429, 504] {
            let error = ApiError::from_status(status, "");
            assert_eq!(error.kind(), ApiErrorKind::Unclassified, "status {status}");
            assert!(!error.retryable());
        }
    }

    #[test]
    fn snippet_is_truncated() {
        let body = "x".repeat(1000);
        let error = ApiError::from_status(500, &body);
        assert!(error.snippet().len() < body.len());
        assert!(error.snippet().ends_with("..."));
    }

    #[test]
    fn display_includes_status_and_code() {
        let error = ApiError::from_status(404, "not found");
        let rendered = error.to_string();
        assert!(rendered.contains("404"));
        assert!(rendered.contains("api.client_rejected"));
    }
}
