//! Static file loading through `tower-http`'s `ServeDir`.

use crate::dev::context::{RequestContext, ResponseBody};
use crate::dev::error::PipelineError;
use crate::dev::pipeline::Stage;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use std::path::Path;
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Stage (b): loads the file at the effective path from the project root.
///
/// `ServeDir` owns path sanitizing, MIME types, `index.html` for
/// directories and the 404 response. Its body is kept as a stream; only
/// later stages that transform content read it.
#[derive(Debug, Clone)]
pub struct StaticFileStage {
    serve_dir: ServeDir,
}

impl StaticFileStage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            serve_dir: ServeDir::new(root),
        }
    }
}

#[async_trait]
impl Stage for StaticFileStage {
    fn name(&self) -> &'static str {
        "static"
    }

    fn applies(&self, _ctx: &RequestContext) -> bool {
        true
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<(), PipelineError> {
        let request = Request::builder()
            .method(ctx.method.clone())
            .uri(ctx.path.as_str())
            .body(Body::empty())?;

        let response = match self.serve_dir.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let (parts, body) = response.into_parts();

        ctx.status = parts.status;
        ctx.headers = parts.headers;
        ctx.body = ResponseBody::Stream(Body::new(body));
        Ok(())
    }
}
