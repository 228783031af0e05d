//! Template compiler: `<template>` markup to an ES module exporting `render`.
//!
//! ```text
//! template source → parser → Node tree → codegen → `export function render(_ctx, _cache)`
//! ```
//!
//! The generated module imports its runtime helpers from the bare specifier
//! `vue`, so it is meant to pass through the dev server's import rewriting.

mod ast;
mod codegen;
mod expr;
mod parser;

pub use ast::{Element, Node};
pub use expr::prefix_identifiers;
pub use parser::parse_template;

use crate::error::SfcError;

/// Output of [`compile_template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    /// Module source exporting `render`
    pub code: String,
}

/// Compiles template markup into a render-function module.
pub fn compile_template(source: &str) -> Result<CompiledTemplate, SfcError> {
    let roots = parse_template(source)?;
    let code = codegen::generate(&roots)?;
    Ok(CompiledTemplate { code })
}
