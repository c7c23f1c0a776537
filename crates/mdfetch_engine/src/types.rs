use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::Serialize;

/// Bytes returned by a backend for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    pub target: String,
    pub bytes: Bytes,
    /// `Content-Type` as declared by the transport, when it reports one.
    pub content_type: Option<String>,
}

impl RawContent {
    pub fn new(target: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            target: target.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Html,
    PlainText,
    Json,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Html => write!(f, "html"),
            ContentKind::PlainText => write!(f, "text"),
            ContentKind::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported browser type: {0}")]
    UnsupportedBackend(String),
    #[error("no browser executable found for {backend}: tried {candidates:?}")]
    BackendUnavailable {
        backend: String,
        candidates: Vec<String>,
    },
    #[error("no supported browsers found{}", last_error_suffix(.last))]
    NoBackendAvailable { last: Option<Box<FetchError>> },
    #[error("failed to fetch content: {0}")]
    FetchFailed(String),
    #[error("error formatting JSON: {0}")]
    MalformedJson(String),
}

fn last_error_suffix(last: &Option<Box<FetchError>>) -> String {
    match last {
        Some(err) => format!(": {err}"),
        None => String::new(),
    }
}

impl FetchError {
    pub(crate) fn fetch_failed(message: impl Into<String>) -> Self {
        FetchError::FetchFailed(message.into())
    }

    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        FetchError::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result for one target of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub target: String,
    pub result: Result<String, FetchError>,
}

/// Aggregate of a batch: every target lands in exactly one of the two maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResponse {
    pub results: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl BatchResponse {
    /// Records an outcome, replacing any earlier entry for the same target in
    /// either map.
    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome.result {
            Ok(content) => {
                self.errors.remove(&outcome.target);
                self.results.insert(outcome.target, content);
            }
            Err(err) => {
                self.results.remove(&outcome.target);
                self.errors.insert(outcome.target, err.to_string());
            }
        }
    }

    pub fn contains(&self, target: &str) -> bool {
        self.results.contains_key(target) || self.errors.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.results.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_moves_target_between_maps() {
        let mut response = BatchResponse::default();
        response.record(FetchOutcome {
            target: "a".into(),
            result: Err(FetchError::fetch_failed("boom")),
        });
        response.record(FetchOutcome {
            target: "a".into(),
            result: Ok("content".into()),
        });
        assert_eq!(response.results.get("a").map(String::as_str), Some("content"));
        assert!(response.errors.is_empty());
        assert_eq!(response.len(), 1);
    }

    #[test]
    fn no_backend_message_carries_last_error() {
        let err = FetchError::NoBackendAvailable {
            last: Some(Box::new(FetchError::BackendUnavailable {
                backend: "curl".into(),
                candidates: vec!["curl".into()],
            })),
        };
        let message = err.to_string();
        assert!(message.starts_with("no supported browsers found: "));
        assert!(message.contains("curl"));
    }

    #[test]
    fn empty_errors_are_not_serialized() {
        let json = serde_json::to_value(BatchResponse::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "results": {} }));
    }
}
