//! Request transform pipeline.
//!
//! ```text
//! request ─► package-entry ─► static ─► component ─► bare-import ─► response
//!            /@modules/x       ServeDir   *.vue         JavaScript
//! ```
//!
//! Stages run in this fixed order and each checks its own guard against the
//! current context, so a component's generated module still passes through
//! import rewriting. The first stage error aborts the request.

use crate::config::DevConfig;
use crate::dev::component::ComponentStage;
use crate::dev::context::RequestContext;
use crate::dev::error::PipelineError;
use crate::dev::resolver::{PackageEntryStage, PackageResolver};
use crate::dev::rewrite::{BareImportStage, ImportRewriter};
use crate::dev::static_files::StaticFileStage;
use async_trait::async_trait;
use nobu_sfc::SfcCompiler;
use std::sync::Arc;

/// One step of request processing.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this stage should run for the current request state.
    fn applies(&self, ctx: &RequestContext) -> bool;

    /// Transforms the request state.
    async fn run(&self, ctx: &mut RequestContext) -> Result<(), PipelineError>;
}

/// Ordered stages shared by all requests.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Builds the standard stage sequence for `config`.
    pub fn new(config: &DevConfig, compiler: Arc<dyn SfcCompiler>) -> Self {
        Self::with_stages(vec![
            Box::new(PackageEntryStage::new(PackageResolver::new(config))),
            Box::new(StaticFileStage::new(&config.root)),
            Box::new(ComponentStage::new(compiler, config.component_suffix())),
            Box::new(BareImportStage::new(ImportRewriter::from_config(config))),
        ])
    }

    /// Builds a pipeline from explicit stages, run in the given order.
    pub fn with_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every applicable stage against `ctx`.
    pub async fn process(&self, mut ctx: RequestContext) -> Result<RequestContext, PipelineError> {
        for stage in &self.stages {
            if !stage.applies(&ctx) {
                continue;
            }
            tracing::debug!(stage = stage.name(), path = %ctx.path, "applying stage");
            stage.run(&mut ctx).await?;
        }
        Ok(ctx)
    }
}
