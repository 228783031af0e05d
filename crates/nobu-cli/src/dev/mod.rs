//! Development server and its request transform pipeline.

pub mod component;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod rewrite;
pub mod server;
pub mod static_files;
pub mod stream;

pub use context::{ContentKind, RequestContext, ResponseBody};
pub use error::{PipelineError, ReadError, ResolveError, TransformError};
pub use pipeline::{Pipeline, Stage};
pub use server::DevServer;
