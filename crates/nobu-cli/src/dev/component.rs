//! Single-file component to ES module transformation.
//!
//! A component is requested twice by the browser:
//!
//! ```text
//! GET /App.vue                -> script module, imports "/App.vue?type=template"
//! GET /App.vue?type=template  -> template module, exports `render`
//! ```
//!
//! The script module's import must name exactly the second request, so both
//! are derived from the same request path.

use crate::dev::context::RequestContext;
use crate::dev::error::{PipelineError, TransformError};
use crate::dev::pipeline::Stage;
use async_trait::async_trait;
use nobu_sfc::{SfcCompiler, SfcDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static EXPORT_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"export\s+default\s+").expect("valid export default regex"));

/// Binding the component options object is renamed to.
const SCRIPT_BINDING: &str = "const __script = ";

/// Which module a component request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRequest {
    /// No `type`: the script module
    Script,
    /// `type=template`: the render function module
    Template,
}

impl ComponentRequest {
    /// Selects the request kind from the `type` query value. An empty value
    /// counts as absent.
    pub fn from_type(value: Option<&str>) -> Result<Self, TransformError> {
        match value {
            None | Some("") => Ok(ComponentRequest::Script),
            Some("template") => Ok(ComponentRequest::Template),
            Some(other) => Err(TransformError::UnsupportedType(other.to_string())),
        }
    }
}

/// Builds the script module for the component at `path`.
///
/// The first `export default` is rebound to `__script`, the render function
/// is imported from the template request and attached, and `__script` is
/// re-exported.
pub fn script_module(path: &str, descriptor: &SfcDescriptor) -> Result<String, TransformError> {
    if descriptor.script_setup.is_some() {
        return Err(TransformError::Unsupported {
            path: path.to_string(),
            feature: "<script setup>",
        });
    }

    let script = match &descriptor.script {
        Some(block) => block.content.as_str(),
        None if descriptor.template.is_some() => "export default {}",
        None => return Err(TransformError::EmptyComponent(path.to_string())),
    };

    let mut code = EXPORT_DEFAULT.replace(script, SCRIPT_BINDING).into_owned();
    if !code.ends_with('\n') {
        code.push('\n');
    }

    if descriptor.template.is_some() {
        code.push_str(&format!(
            "import {{ render as __render }} from \"{}?type=template\"\n",
            path
        ));
        code.push_str("__script.render = __render\n");
    }
    code.push_str("export default __script\n");

    Ok(code)
}

/// Compiles the template of the component at `path` into a render module.
pub fn template_module(
    compiler: &dyn SfcCompiler,
    path: &str,
    descriptor: &SfcDescriptor,
) -> Result<String, TransformError> {
    let template = descriptor
        .template
        .as_ref()
        .ok_or_else(|| TransformError::MissingTemplate(path.to_string()))?;

    compiler
        .compile_template(&template.content)
        .map(|compiled| compiled.code)
        .map_err(|source| TransformError::Compile {
            path: path.to_string(),
            source,
        })
}

/// Stage (c): replaces a loaded component file with generated JavaScript.
pub struct ComponentStage {
    compiler: Arc<dyn SfcCompiler>,
    suffix: String,
}

impl ComponentStage {
    /// `suffix` is the component extension with its dot, e.g. `.vue`.
    pub fn new(compiler: Arc<dyn SfcCompiler>, suffix: impl Into<String>) -> Self {
        Self {
            compiler,
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl Stage for ComponentStage {
    fn name(&self) -> &'static str {
        "component"
    }

    fn applies(&self, ctx: &RequestContext) -> bool {
        ctx.is_found() && ctx.path.ends_with(&self.suffix)
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<(), PipelineError> {
        let request = ComponentRequest::from_type(ctx.request_type.as_deref())?;
        if ctx.is_head() {
            ctx.mark_javascript();
            return Ok(());
        }

        let source = ctx.take_body().into_text().await?;

        let descriptor = self
            .compiler
            .parse(&source)
            .map_err(|source| TransformError::Compile {
                path: ctx.path.clone(),
                source,
            })?;

        let code = match request {
            ComponentRequest::Script => script_module(&ctx.path, &descriptor)?,
            ComponentRequest::Template => {
                template_module(self.compiler.as_ref(), &ctx.path, &descriptor)?
            }
        };

        tracing::debug!(path = %ctx.path, ?request, bytes = code.len(), "compiled component");
        ctx.set_javascript(code);
        Ok(())
    }
}
