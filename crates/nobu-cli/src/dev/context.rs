//! Per-request state threaded through the pipeline stages.

use crate::dev::error::ReadError;
use crate::dev::stream;
use axum::body::Body;
use axum::extract::Query;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;

/// Content types served as JavaScript modules.
const JAVASCRIPT_TYPES: &[&str] = &[
    "application/javascript",
    "text/javascript",
    "application/x-javascript",
];

/// Content type of generated modules.
pub const JAVASCRIPT: &str = "application/javascript";

/// How later stages should treat the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// JavaScript module source, eligible for import rewriting
    JavaScript,
    /// Anything else; passed through
    Opaque,
}

/// Response body: still streaming from disk, or already materialized.
#[derive(Debug)]
pub enum ResponseBody {
    /// Untouched body from the static file service
    Stream(Body),
    /// Text produced or rewritten by a stage
    Text(String),
}

impl ResponseBody {
    /// Materializes the body as text.
    pub async fn into_text(self) -> Result<String, ReadError> {
        match self {
            ResponseBody::Stream(body) => stream::body_to_text(body).await,
            ResponseBody::Text(text) => Ok(text),
        }
    }

    /// Converts back into a streaming body for the response.
    pub fn into_body(self) -> Body {
        match self {
            ResponseBody::Stream(body) => body,
            ResponseBody::Text(text) => stream::text_to_body(text),
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Stream(Body::empty())
    }
}

/// Mutable request/response state shared by the stages of one request.
#[derive(Debug)]
pub struct RequestContext {
    /// Request method, forwarded to the static file service
    pub method: Method,
    /// Path as requested by the browser
    pub original_path: String,
    /// Path used to load the file; differs from `original_path` after
    /// package resolution
    pub path: String,
    /// Value of the `type` query parameter
    pub request_type: Option<String>,
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: ResponseBody,
}

impl RequestContext {
    /// Builds the initial context for a request.
    pub fn new(method: Method, uri: &Uri) -> Self {
        let request_type = Query::<HashMap<String, String>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(mut params)| params.remove("type"));
        let path = uri.path().to_string();

        Self {
            method,
            original_path: path.clone(),
            path,
            request_type,
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: ResponseBody::default(),
        }
    }

    /// True once a file was loaded that a stage may transform.
    pub fn is_found(&self) -> bool {
        self.status.is_success()
    }

    /// HEAD responses carry headers only; stages adjust those and skip the body.
    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Classifies the response by its content type.
    pub fn content_kind(&self) -> ContentKind {
        let essence = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase());

        match essence {
            Some(essence) if JAVASCRIPT_TYPES.contains(&essence.as_str()) => ContentKind::JavaScript,
            _ => ContentKind::Opaque,
        }
    }

    /// Replaces the body with generated text.
    ///
    /// Headers describing the file on disk no longer apply and are removed.
    pub fn set_text(&mut self, text: String) {
        self.clear_file_headers();
        self.body = ResponseBody::Text(text);
    }

    /// Replaces the body with a generated JavaScript module.
    pub fn set_javascript(&mut self, code: String) {
        self.mark_javascript();
        self.body = ResponseBody::Text(code);
    }

    /// Sets the headers a generated JavaScript module is sent with, leaving
    /// the body alone.
    pub fn mark_javascript(&mut self) {
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(JAVASCRIPT));
        self.clear_file_headers();
    }

    /// Drops headers that describe the file on disk rather than the
    /// generated body.
    pub fn clear_file_headers(&mut self) {
        self.headers.remove(header::CONTENT_LENGTH);
        self.headers.remove(header::ETAG);
        self.headers.remove(header::LAST_MODIFIED);
        self.headers.remove(header::ACCEPT_RANGES);
    }

    /// Takes the body out, leaving an empty one behind.
    pub fn take_body(&mut self) -> ResponseBody {
        std::mem::take(&mut self.body)
    }
}

impl IntoResponse for RequestContext {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body.into_body());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(uri: &str) -> RequestContext {
        RequestContext::new(Method::GET, &uri.parse::<Uri>().unwrap())
    }

    #[test]
    fn test_new_splits_path_and_type() {
        let ctx = context("/src/App.vue?type=template&t=1");
        assert_eq!(ctx.path, "/src/App.vue");
        assert_eq!(ctx.original_path, "/src/App.vue");
        assert_eq!(ctx.request_type.as_deref(), Some("template"));
        assert_eq!(ctx.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_new_without_query() {
        let ctx = context("/index.html");
        assert!(ctx.request_type.is_none());
    }

    #[test]
    fn test_content_kind() {
        let mut ctx = context("/main.js");
        assert_eq!(ctx.content_kind(), ContentKind::Opaque);

        ctx.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/javascript; charset=utf-8"),
        );
        assert_eq!(ctx.content_kind(), ContentKind::JavaScript);

        ctx.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("Application/JavaScript"));
        assert_eq!(ctx.content_kind(), ContentKind::JavaScript);

        ctx.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert_eq!(ctx.content_kind(), ContentKind::Opaque);
    }

    #[test]
    fn test_is_found_and_is_head() {
        let mut ctx = context("/a.js");
        assert!(!ctx.is_found());
        assert!(!ctx.is_head());
        ctx.status = StatusCode::OK;
        assert!(ctx.is_found());
        ctx.method = Method::HEAD;
        assert!(ctx.is_found());
        assert!(ctx.is_head());
    }

    #[test]
    fn test_mark_javascript_keeps_body() {
        let mut ctx = context("/App.vue");
        ctx.method = Method::HEAD;
        ctx.headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from_static("120"));
        ctx.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        ctx.body = ResponseBody::Text(String::new());

        ctx.mark_javascript();
        assert!(ctx.headers.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(ctx.headers[header::CONTENT_TYPE], JAVASCRIPT);
        assert!(matches!(ctx.body, ResponseBody::Text(ref t) if t.is_empty()));
    }

    #[test]
    fn test_set_javascript_drops_file_headers() {
        let mut ctx = context("/App.vue");
        ctx.headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from_static("120"));
        ctx.headers
            .insert(header::ETAG, HeaderValue::from_static("\"abc\""));
        ctx.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );

        ctx.set_javascript("export default {}".to_string());
        assert!(ctx.headers.get(header::CONTENT_LENGTH).is_none());
        assert!(ctx.headers.get(header::ETAG).is_none());
        assert_eq!(ctx.headers[header::CONTENT_TYPE], JAVASCRIPT);
        assert!(matches!(ctx.body, ResponseBody::Text(ref t) if t == "export default {}"));
    }

    #[tokio::test]
    async fn test_into_response_sets_no_cache() {
        let mut ctx = context("/a.js");
        ctx.status = StatusCode::OK;
        ctx.set_text("x".to_string());

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"x");
    }

    #[tokio::test]
    async fn test_response_body_into_text() {
        let body = ResponseBody::Stream(Body::from("streamed"));
        assert_eq!(body.into_text().await.unwrap(), "streamed");
        let body = ResponseBody::Text("ready".to_string());
        assert_eq!(body.into_text().await.unwrap(), "ready");
    }
}
