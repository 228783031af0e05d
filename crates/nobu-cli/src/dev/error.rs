//! Request-time errors.
//!
//! A failing stage aborts the pipeline; the error is logged with its full
//! chain and the client gets a plain-text status with a generic body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nobu_sfc::SfcError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a body stream into text.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The upstream stream yielded an error; kept as-is
    #[error("failed to read body stream: {0}")]
    Stream(#[source] axum::BoxError),

    /// The body was not valid UTF-8
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Failure to map a virtual module path to a package entry.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Package name is empty or tries to leave the dependency directory
    #[error("invalid package name '{0}'")]
    InvalidName(String),

    /// No manifest for the package
    #[error("package '{package}' is not installed (no {})", .path.display())]
    NotInstalled {
        /// Requested package
        package: String,
        /// Manifest path that was tried
        path: PathBuf,
    },

    /// Manifest could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Manifest exceeds the size limit
    #[error("manifest of '{package}' is {size} bytes (limit {max})")]
    ManifestTooLarge {
        /// Requested package
        package: String,
        /// Actual size
        size: u64,
        /// Limit
        max: u64,
    },

    /// Manifest is not valid JSON
    #[error("invalid package.json for '{package}': {source}")]
    InvalidManifest {
        /// Requested package
        package: String,
        /// Parse error
        source: serde_json::Error,
    },

    /// Manifest has no ES module entry
    #[error("package '{package}' has no \"module\" entry{}", main_hint(.main))]
    NoModuleEntry {
        /// Requested package
        package: String,
        /// The CommonJS `main` entry, if declared
        main: Option<String>,
    },
}

fn main_hint(main: &Option<String>) -> String {
    match main {
        Some(main) => format!(" (only CommonJS \"main\": {main})"),
        None => String::new(),
    }
}

/// Failure to turn a component into a module.
#[derive(Debug, Error)]
pub enum TransformError {
    /// `type` query names an unknown sub-request
    #[error("unsupported component request type '{0}'")]
    UnsupportedType(String),

    /// Component uses a feature the server cannot transform
    #[error("{path}: {feature} is not supported")]
    Unsupported {
        /// Component path
        path: String,
        /// What was found
        feature: &'static str,
    },

    /// Template requested for a component without one
    #[error("{0}: component has no <template> block")]
    MissingTemplate(String),

    /// Component has neither script nor template
    #[error("{0}: component has no <script> or <template> block")]
    EmptyComponent(String),

    /// Component compiler failed
    #[error("{path}: {source}")]
    Compile {
        /// Component path
        path: String,
        /// Compiler error
        source: SfcError,
    },
}

/// Error that aborts request processing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Package entry resolution failed
    #[error("resolve failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Component transformation failed
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    /// Body could not be read as text
    #[error("read failed: {0}")]
    Read(#[from] ReadError),

    /// Internal request to the static file service could not be built
    #[error("invalid static file request: {0}")]
    Request(#[from] axum::http::Error),
}

impl PipelineError {
    /// Status sent to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Resolve(ResolveError::InvalidName(_))
            | PipelineError::Transform(TransformError::UnsupportedType(_)) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = status.as_u16(), "request failed");
        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_name_is_bad_request() {
        let err = PipelineError::from(ResolveError::InvalidName("..".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_type_is_bad_request() {
        let err = PipelineError::from(TransformError::UnsupportedType("style".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_entry_is_server_error() {
        let err = PipelineError::from(ResolveError::NoModuleEntry {
            package: "lodash".to_string(),
            main: Some("index.js".to_string()),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("only CommonJS \"main\": index.js"));
    }

    #[tokio::test]
    async fn test_response_body_is_generic() {
        let err = PipelineError::from(TransformError::EmptyComponent("/secret/App.vue".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }
}
