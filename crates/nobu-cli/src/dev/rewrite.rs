//! Bare import rewriting for JavaScript responses.
//!
//! Browsers only load URL-like specifiers, so `from "vue"` is rewritten to
//! `from "/@modules/vue"`, which the package entry stage resolves on the
//! next request. `process.env.NODE_ENV` is replaced by the configured mode.

use crate::config::DevConfig;
use crate::dev::context::{ContentKind, RequestContext};
use crate::dev::error::PipelineError;
use crate::dev::pipeline::Stage;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// `from` + whitespace + quote + first specifier character, when that
/// character is not a quote, `.` or `/`.
static BARE_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bfrom(\s+)(["'])([^"'./])"#).expect("valid bare import regex"));

static NODE_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"process\.env\.NODE_ENV").expect("valid NODE_ENV regex"));

/// Rewrites bare import specifiers and `process.env.NODE_ENV`.
#[derive(Debug, Clone)]
pub struct ImportRewriter {
    replacement: String,
    mode_literal: String,
}

impl ImportRewriter {
    /// `prefix` is the virtual module segment (`@modules`), `mode` the
    /// unquoted `NODE_ENV` value.
    pub fn new(prefix: &str, mode: &str) -> Self {
        Self {
            replacement: format!("from${{1}}${{2}}/{}/${{3}}", prefix),
            mode_literal: serde_json::Value::from(mode).to_string(),
        }
    }

    pub fn from_config(config: &DevConfig) -> Self {
        Self::new(&config.module_prefix, &config.mode)
    }

    /// Rewrites `source`. Text outside the matched spans is unchanged.
    pub fn rewrite(&self, source: &str) -> String {
        let imports = BARE_IMPORT.replace_all(source, self.replacement.as_str());
        NODE_ENV
            .replace_all(&imports, NoExpand(&self.mode_literal))
            .into_owned()
    }
}

/// Stage (d): rewrites JavaScript responses.
#[derive(Debug)]
pub struct BareImportStage {
    rewriter: ImportRewriter,
}

impl BareImportStage {
    pub fn new(rewriter: ImportRewriter) -> Self {
        Self { rewriter }
    }
}

#[async_trait]
impl Stage for BareImportStage {
    fn name(&self) -> &'static str {
        "bare-import"
    }

    fn applies(&self, ctx: &RequestContext) -> bool {
        ctx.is_found() && ctx.content_kind() == ContentKind::JavaScript
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<(), PipelineError> {
        if ctx.is_head() {
            ctx.clear_file_headers();
            return Ok(());
        }

        let source = ctx.take_body().into_text().await?;
        ctx.set_text(self.rewriter.rewrite(&source));
        Ok(())
    }
}
