//! Template node tree.

use crate::tag::Attribute;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Literal text with entities already decoded
    Text(String),
    /// Raw expression between `{{` and `}}`
    Interpolation(String),
}

impl Node {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Byte offset of the opening `<` within the template source
    pub position: usize,
}

impl Element {
    /// Finds an attribute by exact name.
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Value of a directive such as `v-if`, empty string for a bare directive.
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.attr(name)
            .map(|attr| attr.value.as_deref().unwrap_or(""))
    }

    /// True for tags resolved as components rather than native elements.
    pub fn is_component(&self) -> bool {
        self.tag
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            || self.tag.contains('-')
    }
}
