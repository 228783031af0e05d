//! # nobu-sfc
//!
//! Vue single-file component compiler used by the `nobu` dev server.
//!
//! Two capabilities are exposed, both as free functions and through the
//! [`SfcCompiler`] trait so the server can treat the compiler as a black box:
//!
//! - [`parse`] splits a `.vue` source into an [`SfcDescriptor`] with its
//!   `<template>`, `<script>`, `<script setup>` and `<style>` blocks.
//! - [`compile_template`] turns template markup into an ES module exporting
//!   a `render` function built on Vue's runtime helpers.
//!
//! ```rust
//! use nobu_sfc::{compile_template, parse};
//!
//! let descriptor = parse("<template><div>hi</div></template>").unwrap();
//! let template = descriptor.template.unwrap();
//! let compiled = compile_template(&template.content).unwrap();
//! assert!(compiled.code.contains("export function render"));
//! ```

mod descriptor;
mod error;
mod parse;
mod tag;
pub mod template;

pub use descriptor::{SfcBlock, SfcDescriptor};
pub use error::SfcError;
pub use parse::{parse, MAX_FILE_SIZE};
pub use tag::Attribute;
pub use template::{compile_template, CompiledTemplate};

/// Compiler capability consumed by the dev server.
pub trait SfcCompiler: Send + Sync {
    /// Splits component source into its blocks.
    fn parse(&self, source: &str) -> Result<SfcDescriptor, SfcError>;

    /// Compiles template markup into a module exporting `render`.
    fn compile_template(&self, source: &str) -> Result<CompiledTemplate, SfcError>;
}

/// The built-in compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct VueCompiler;

impl SfcCompiler for VueCompiler {
    fn parse(&self, source: &str) -> Result<SfcDescriptor, SfcError> {
        parse(source)
    }

    fn compile_template(&self, source: &str) -> Result<CompiledTemplate, SfcError> {
        compile_template(source)
    }
}
