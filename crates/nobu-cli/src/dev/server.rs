//! Development server.
//!
//! Every request goes through the fallback handler, which runs the
//! transform pipeline and writes the resulting context as the response.

use crate::config::DevConfig;
use crate::dev::context::RequestContext;
use crate::dev::pipeline::Pipeline;
use crate::error::{Result, ResultExt};
use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use nobu_sfc::SfcCompiler;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Development server.
pub struct DevServer {
    /// Server configuration
    config: DevConfig,
    /// Stages shared by all request tasks
    pipeline: Arc<Pipeline>,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevConfig, compiler: Arc<dyn SfcCompiler>) -> Self {
        let pipeline = Arc::new(Pipeline::new(&config, compiler));
        Self { config, pipeline }
    }

    /// Build the router: a single fallback handler behind CORS and request
    /// tracing layers.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(handle_request)
            .layer(
                // Allow all origins in development
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.pipeline))
    }

    /// Start the development server and run until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error if server cannot bind to configured address
    pub async fn start(self) -> Result<()> {
        let addr = self.config.addr();
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .while_serving(format!("Failed to bind to {addr}"))?;

        crate::ui::server_banner(&self.config);
        tracing::info!(%addr, root = %self.config.root.display(), "listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .while_serving("Server loop failed")?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

async fn handle_request(
    State(pipeline): State<Arc<Pipeline>>,
    method: Method,
    uri: Uri,
) -> Response {
    let ctx = RequestContext::new(method, &uri);
    match pipeline.process(ctx).await {
        Ok(ctx) => ctx.into_response(),
        Err(err) => err.into_response(),
    }
}
