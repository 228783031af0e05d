//! Tag-level scanning helpers shared by the block parser and the template parser.

/// A single attribute on an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written (`class`, `:title`, `@click`, `setup`)
    pub name: String,
    /// Unquoted value, `None` for boolean attributes
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }
}

/// Finds the closing `>` of an opening tag, skipping quoted attribute values.
pub(crate) fn find_closing_angle(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;

    for (i, &byte) in bytes[start..].iter().enumerate() {
        match (quote, byte) {
            (None, b'"' | b'\'') => quote = Some(byte),
            (Some(q), _) if q == byte => quote = None,
            (None, b'>') => return Some(start + i),
            _ => {}
        }
    }

    None
}

/// Returns true when `byte` may terminate a tag name.
pub(crate) fn is_tag_name_end(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
}

/// Parses the attribute list between the tag name and the closing `>`.
///
/// A trailing `/` (self-closing marker) is ignored.
pub(crate) fn parse_attributes(input: &str) -> Vec<Attribute> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'>'
            && !(bytes[i] == b'/' && i + 1 == bytes.len())
        {
            i += 1;
        }
        let name = &input[name_start..i];

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        if j < bytes.len() && bytes[j] == b'=' {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }

            let value = if j < bytes.len() && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let quote = bytes[j];
                let value_start = j + 1;
                let value_end = memchr::memchr(quote, &bytes[value_start..])
                    .map(|pos| value_start + pos)
                    .unwrap_or(bytes.len());
                i = (value_end + 1).min(bytes.len());
                &input[value_start..value_end]
            } else {
                let value_start = j;
                while j < bytes.len() && !bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                i = j;
                &input[value_start..j]
            };

            if !name.is_empty() {
                attrs.push(Attribute::new(name, Some(value)));
            }
        } else if name.is_empty() {
            i += 1;
        } else {
            attrs.push(Attribute::new(name, None));
        }
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_mixed() {
        let attrs = parse_attributes(r#" setup lang="ts" data-x='a>b' flag"#);
        assert_eq!(
            attrs,
            vec![
                Attribute::new("setup", None),
                Attribute::new("lang", Some("ts")),
                Attribute::new("data-x", Some("a>b")),
                Attribute::new("flag", None),
            ]
        );
    }

    #[test]
    fn test_parse_attributes_self_closing_marker() {
        let attrs = parse_attributes(r#" src="a.png" /"#);
        assert_eq!(attrs, vec![Attribute::new("src", Some("a.png"))]);
    }

    #[test]
    fn test_parse_attributes_unquoted() {
        let attrs = parse_attributes(" lang=ts scoped");
        assert_eq!(
            attrs,
            vec![
                Attribute::new("lang", Some("ts")),
                Attribute::new("scoped", None)
            ]
        );
    }

    #[test]
    fn test_find_closing_angle_skips_quotes() {
        let src = br#"<div title="a > b">"#;
        assert_eq!(find_closing_angle(src, 4), Some(src.len() - 1));
    }
}
