//! HTML-ish template parser producing a [`Node`] tree.

use memchr::{memchr, memmem};

use super::ast::{Element, Node};
use crate::error::SfcError;
use crate::tag::{find_closing_angle, is_tag_name_end, parse_attributes};

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text content keeps its whitespace.
const PRESERVE_WHITESPACE: &[&str] = &["pre", "textarea"];

/// Parses template source into its root nodes.
pub fn parse_template(source: &str) -> Result<Vec<Node>, SfcError> {
    let bytes = source.as_bytes();
    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();
    let mut text = String::new();
    let mut pointer = 0;

    while pointer < bytes.len() {
        let rest = &bytes[pointer..];

        if rest.starts_with(b"{{") {
            flush_text(&mut text, &mut stack, &mut roots);
            let end = memmem::find(&rest[2..], b"}}").ok_or_else(|| SfcError::Malformed {
                message: "unclosed interpolation".to_string(),
                position: pointer,
            })?;
            let expr = source[pointer + 2..pointer + 2 + end].trim().to_string();
            push_node(Node::Interpolation(expr), &mut stack, &mut roots);
            pointer += 2 + end + 2;
            continue;
        }

        if rest.starts_with(b"<!--") {
            flush_text(&mut text, &mut stack, &mut roots);
            pointer = match memmem::find(&rest[4..], b"-->") {
                Some(end) => pointer + 4 + end + 3,
                None => bytes.len(),
            };
            continue;
        }

        if rest.starts_with(b"</") {
            flush_text(&mut text, &mut stack, &mut roots);
            pointer = close_element(source, pointer, &mut stack, &mut roots)?;
            continue;
        }

        if rest[0] == b'<' && rest.len() > 1 && rest[1].is_ascii_alphabetic() {
            flush_text(&mut text, &mut stack, &mut roots);
            pointer = open_element(source, pointer, &mut stack, &mut roots)?;
            continue;
        }

        let next = next_special(bytes, pointer + 1);
        text.push_str(&source[pointer..next]);
        pointer = next;
    }

    flush_text(&mut text, &mut stack, &mut roots);

    if let Some(open) = stack.pop() {
        return Err(SfcError::UnclosedElement {
            tag: open.tag,
            position: open.position,
        });
    }

    condense_whitespace(&mut roots, false);
    Ok(roots)
}

/// Position of the next `<` or `{{` at or after `from`.
fn next_special(bytes: &[u8], from: usize) -> usize {
    let mut cursor = from;
    while cursor < bytes.len() {
        match memchr::memchr2(b'<', b'{', &bytes[cursor..]) {
            Some(pos) => {
                let at = cursor + pos;
                if bytes[at] == b'<' || bytes.get(at + 1) == Some(&b'{') {
                    return at;
                }
                cursor = at + 1;
            }
            None => return bytes.len(),
        }
    }
    bytes.len()
}

fn open_element(
    source: &str,
    start: usize,
    stack: &mut Vec<Element>,
    roots: &mut Vec<Node>,
) -> Result<usize, SfcError> {
    let bytes = source.as_bytes();
    let name_start = start + 1;
    let name_end = bytes[name_start..]
        .iter()
        .position(|&b| is_tag_name_end(b))
        .map(|pos| name_start + pos)
        .unwrap_or(bytes.len());

    let tag = source[name_start..name_end].to_string();
    let tag_end = find_closing_angle(bytes, name_end).ok_or_else(|| SfcError::Malformed {
        message: format!("opening tag <{tag}> is not terminated"),
        position: start,
    })?;

    let self_closing = bytes[tag_end - 1] == b'/';
    let mut attrs = parse_attributes(&source[name_end..tag_end]);
    for attr in &mut attrs {
        if !is_dynamic(&attr.name) {
            if let Some(value) = attr.value.as_mut() {
                *value = decode_entities(value);
            }
        }
    }

    let element = Element {
        tag,
        attrs,
        children: Vec::new(),
        position: start,
    };

    if self_closing || VOID_ELEMENTS.contains(&element.tag.as_str()) {
        push_node(Node::Element(element), stack, roots);
    } else {
        stack.push(element);
    }

    Ok(tag_end + 1)
}

fn close_element(
    source: &str,
    start: usize,
    stack: &mut Vec<Element>,
    roots: &mut Vec<Node>,
) -> Result<usize, SfcError> {
    let bytes = source.as_bytes();
    let end = memchr(b'>', &bytes[start..])
        .map(|pos| start + pos)
        .ok_or_else(|| SfcError::Malformed {
            message: "closing tag is not terminated".to_string(),
            position: start,
        })?;
    let tag = source[start + 2..end].trim();

    if VOID_ELEMENTS.contains(&tag) {
        return Ok(end + 1);
    }

    match stack.pop() {
        Some(element) if element.tag == tag => {
            push_node(Node::Element(element), stack, roots);
            Ok(end + 1)
        }
        Some(element) if stack.iter().any(|open| open.tag == tag) => {
            Err(SfcError::UnclosedElement {
                tag: element.tag,
                position: element.position,
            })
        }
        _ => Err(SfcError::UnexpectedClosingTag {
            tag: tag.to_string(),
            position: start,
        }),
    }
}

fn push_node(node: Node, stack: &mut [Element], roots: &mut Vec<Node>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn flush_text(text: &mut String, stack: &mut [Element], roots: &mut Vec<Node>) {
    if !text.is_empty() {
        let decoded = decode_entities(text);
        text.clear();
        push_node(Node::Text(decoded), stack, roots);
    }
}

/// True for attribute names whose value is an expression.
fn is_dynamic(name: &str) -> bool {
    name.starts_with(':') || name.starts_with('@') || name.starts_with("v-")
}

/// Drops insignificant whitespace and condenses the rest to single spaces.
///
/// Whitespace-only text is removed at the edges of a child list and wherever it
/// contains a newline; otherwise it becomes a single space.
fn condense_whitespace(nodes: &mut Vec<Node>, preserve: bool) {
    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            let keep = preserve || PRESERVE_WHITESPACE.contains(&element.tag.as_str());
            condense_whitespace(&mut element.children, keep);
        }
    }

    if preserve {
        return;
    }

    let len = nodes.len();
    let mut index = 0;
    nodes.retain_mut(|node| {
        let position = index;
        index += 1;

        let Node::Text(text) = node else {
            return true;
        };

        if text.trim().is_empty() {
            if position == 0 || position + 1 == len || text.contains('\n') {
                return false;
            }
            *text = " ".to_string();
            return true;
        }

        let mut condensed = String::with_capacity(text.len());
        let mut in_space = false;
        for c in text.chars() {
            if c.is_ascii_whitespace() {
                if !in_space {
                    condensed.push(' ');
                }
                in_space = true;
            } else {
                condensed.push(c);
                in_space = false;
            }
        }
        *text = condensed;
        true
    });
}

/// Decodes the common named entities and numeric character references.
pub(crate) fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
