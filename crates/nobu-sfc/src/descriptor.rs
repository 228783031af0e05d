//! Parsed representation of a single-file component.

use crate::tag::Attribute;

/// One top-level block of a component (`<template>`, `<script>`, `<style>`, or custom).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcBlock {
    /// Block tag name
    pub tag: String,
    /// Raw text between the opening and closing tag
    pub content: String,
    /// Attributes of the opening tag, in source order
    pub attrs: Vec<Attribute>,
    /// Language identifier (`lang` attribute or the block's default)
    pub lang: String,
    /// Byte offset of `content` within the component source
    pub offset: usize,
}

impl SfcBlock {
    /// Looks up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    /// Returns true when the opening tag carries `name`, with or without a value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

/// Component descriptor with disjoint sections.
///
/// Recomputed from source on every parse; never shared between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcDescriptor {
    pub template: Option<SfcBlock>,
    pub script: Option<SfcBlock>,
    pub script_setup: Option<SfcBlock>,
    pub styles: Vec<SfcBlock>,
    pub custom_blocks: Vec<SfcBlock>,
}

impl SfcDescriptor {
    /// True when the component has neither a script nor a template section.
    pub fn is_empty(&self) -> bool {
        self.template.is_none() && self.script.is_none() && self.script_setup.is_none()
    }
}
