//! Error type shared by the block parser and the template compiler.

/// Errors produced while parsing or compiling a single-file component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SfcError {
    /// Source exceeds maximum allowed size
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        /// Actual source size in bytes
        size: usize,
        /// Maximum allowed size in bytes
        max: usize,
    },

    /// Top-level block opened but never closed
    #[error("Unclosed <{tag}> block starting at byte position {position}")]
    UnclosedBlock {
        /// Block tag name (`template`, `script`, `style`)
        tag: &'static str,
        /// Byte position where the unclosed block begins
        position: usize,
    },

    /// A block that may only appear once appeared again
    #[error("Duplicate <{tag}> block at byte position {position}")]
    DuplicateBlock {
        /// Block description (`template`, `script`, `script setup`)
        tag: &'static str,
        /// Byte position of the second occurrence
        position: usize,
    },

    /// Template element opened but never closed
    #[error("Element <{tag}> is missing its end tag (opened at byte {position})")]
    UnclosedElement {
        /// Element tag name
        tag: String,
        /// Byte offset within the template source
        position: usize,
    },

    /// Closing tag without a matching open element
    #[error("Unexpected closing tag </{tag}> at byte {position}")]
    UnexpectedClosingTag {
        /// Element tag name
        tag: String,
        /// Byte offset within the template source
        position: usize,
    },

    /// Malformed tag, attribute or interpolation
    #[error("Malformed template at byte {position}: {message}")]
    Malformed {
        /// What went wrong
        message: String,
        /// Byte offset within the template source
        position: usize,
    },

    /// Directive the compiler does not implement
    #[error("Unsupported directive '{name}' on <{tag}>")]
    UnsupportedDirective {
        /// Directive attribute as written (e.g. `v-model`)
        name: String,
        /// Element carrying the directive
        tag: String,
    },

    /// `v-for` expression that is not `alias in source`
    #[error("Invalid v-for expression: {0}")]
    InvalidFor(String),

    /// `v-else` / `v-else-if` without a preceding `v-if`
    #[error("v-else/v-else-if has no adjacent v-if on <{0}>")]
    OrphanElse(String),
}
