//! Top-level block parser for `.vue` sources.
//!
//! Scans for `<template>`, `<script>` and `<style>` blocks with `memchr` rather
//! than a full HTML parser. Block contents are copied verbatim.

use memchr::{memchr, memmem};

use crate::descriptor::{SfcBlock, SfcDescriptor};
use crate::error::SfcError;
use crate::tag::{find_closing_angle, is_tag_name_end, parse_attributes};

/// Maximum component source size in bytes (10 MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Parses component source into its descriptor.
pub fn parse(source: &str) -> Result<SfcDescriptor, SfcError> {
    if source.len() > MAX_FILE_SIZE {
        return Err(SfcError::FileTooLarge {
            size: source.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let bytes = source.as_bytes();
    let mut descriptor = SfcDescriptor::default();
    let mut pointer = 0;

    while let Some(found) = memchr(b'<', &bytes[pointer..]) {
        let start = pointer + found;

        if bytes[start..].starts_with(b"<!--") {
            pointer = match memmem::find(&bytes[start + 4..], b"-->") {
                Some(end) => start + 4 + end + 3,
                None => break,
            };
            continue;
        }

        let name_start = start + 1;
        let name_end = bytes[name_start..]
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b'-'))
            .map(|pos| name_start + pos)
            .unwrap_or(bytes.len());

        if name_end == name_start || name_end >= bytes.len() || !is_tag_name_end(bytes[name_end]) {
            pointer = start + 1;
            continue;
        }

        let tag = &source[name_start..name_end];
        let (block, next) = parse_block(source, start, tag, name_end)?;
        pointer = next;
        insert_block(&mut descriptor, block, start)?;
    }

    Ok(descriptor)
}

/// Parses one block whose opening tag starts at `start`.
///
/// Returns the block and the position just past its closing tag.
fn parse_block(
    source: &str,
    start: usize,
    tag: &str,
    name_end: usize,
) -> Result<(SfcBlock, usize), SfcError> {
    let bytes = source.as_bytes();
    let static_tag = block_label(tag);

    let tag_end = find_closing_angle(bytes, name_end).ok_or(SfcError::UnclosedBlock {
        tag: static_tag,
        position: start,
    })?;

    let self_closing = bytes[tag_end - 1] == b'/';
    let attrs = parse_attributes(&source[name_end..tag_end]);
    let lang = attrs
        .iter()
        .find(|attr| attr.name == "lang")
        .and_then(|attr| attr.value.clone())
        .unwrap_or_else(|| default_lang(tag).to_string());

    let content_start = tag_end + 1;
    let (content_end, next) = if self_closing {
        (content_start, content_start)
    } else {
        let close_start = if tag == "template" {
            find_template_end(bytes, content_start)
        } else {
            find_close_tag(bytes, content_start, tag)
        }
        .ok_or(SfcError::UnclosedBlock {
            tag: static_tag,
            position: start,
        })?;

        let close_end = memchr(b'>', &bytes[close_start..])
            .map(|pos| close_start + pos + 1)
            .unwrap_or(bytes.len());
        (close_start, close_end)
    };

    Ok((
        SfcBlock {
            tag: tag.to_string(),
            content: source[content_start..content_end].to_string(),
            attrs,
            lang,
            offset: content_start,
        },
        next,
    ))
}

fn insert_block(
    descriptor: &mut SfcDescriptor,
    block: SfcBlock,
    position: usize,
) -> Result<(), SfcError> {
    let is_setup = block.has_attr("setup");
    let block_tag = block.tag.clone();
    let (slot, tag) = match block_tag.as_str() {
        "template" => (&mut descriptor.template, "template"),
        "script" if is_setup => (&mut descriptor.script_setup, "script setup"),
        "script" => (&mut descriptor.script, "script"),
        "style" => {
            descriptor.styles.push(block);
            return Ok(());
        }
        _ => {
            descriptor.custom_blocks.push(block);
            return Ok(());
        }
    };

    if slot.is_some() {
        return Err(SfcError::DuplicateBlock { tag, position });
    }

    *slot = Some(block);
    Ok(())
}

/// Finds `</tag` (followed by a tag-name terminator) starting at `from`.
fn find_close_tag(bytes: &[u8], from: usize, tag: &str) -> Option<usize> {
    let needle = format!("</{tag}");
    let finder = memmem::Finder::new(needle.as_bytes());
    let mut cursor = from;

    while let Some(pos) = finder.find(&bytes[cursor..]) {
        let at = cursor + pos;
        let after = at + needle.len();
        if after >= bytes.len() || is_tag_name_end(bytes[after]) {
            return Some(at);
        }
        cursor = after;
    }

    None
}

/// Finds the `</template` matching the root template, honouring nested `<template>` elements.
fn find_template_end(bytes: &[u8], from: usize) -> Option<usize> {
    let open = memmem::Finder::new(b"<template");
    let close = memmem::Finder::new(b"</template");
    let mut depth = 0usize;
    let mut cursor = from;

    loop {
        let next_close = cursor + close.find(&bytes[cursor..])?;
        let next_open = open
            .find(&bytes[cursor..next_close])
            .map(|pos| cursor + pos)
            .filter(|&pos| {
                let after = pos + b"<template".len();
                after < bytes.len() && is_tag_name_end(bytes[after])
            });

        match next_open {
            Some(pos) => {
                let tag_end = find_closing_angle(bytes, pos)?;
                if bytes[tag_end - 1] != b'/' {
                    depth += 1;
                }
                cursor = tag_end + 1;
            }
            None if depth == 0 => return Some(next_close),
            None => {
                depth -= 1;
                cursor = next_close + b"</template".len();
            }
        }
    }
}

fn default_lang(tag: &str) -> &'static str {
    match tag {
        "template" => "html",
        "script" => "js",
        "style" => "css",
        _ => "",
    }
}

fn block_label(tag: &str) -> &'static str {
    match tag {
        "template" => "template",
        "script" => "script",
        "style" => "style",
        _ => "custom",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_component() {
        let vue = r#"
<template><div>Hello</div></template>
<script>
export default { name: 'Test' }
</script>
<style scoped>
div { color: red; }
</style>
"#;
        let descriptor = parse(vue).unwrap();
        let template = descriptor.template.unwrap();
        assert_eq!(template.content, "<div>Hello</div>");
        assert_eq!(template.lang, "html");

        let script = descriptor.script.unwrap();
        assert!(script.content.contains("export default"));
        assert_eq!(script.lang, "js");
        assert_eq!(&vue[script.offset..script.offset + 1], "\n");

        assert_eq!(descriptor.styles.len(), 1);
        assert!(descriptor.styles[0].has_attr("scoped"));
        assert!(descriptor.script_setup.is_none());
    }

    #[test]
    fn test_script_setup_is_separate() {
        let vue = r#"
<script>
export default { name: 'Test' }
</script>
<script setup lang="ts">
const count = ref<number>(0)
</script>
"#;
        let descriptor = parse(vue).unwrap();
        assert!(descriptor.script.is_some());
        let setup = descriptor.script_setup.unwrap();
        assert_eq!(setup.lang, "ts");
        assert!(setup.content.contains("const count"));
    }

    #[test]
    fn test_nested_template_elements() {
        let vue = r#"<template>
  <div>
    <template v-if="ok"><span>yes</span></template>
    <template v-else>no</template>
  </div>
</template>
<script>export default {}</script>"#;
        let descriptor = parse(vue).unwrap();
        let template = descriptor.template.unwrap();
        assert!(template.content.contains(r#"<template v-else>no</template>"#));
        assert!(template.content.trim_end().ends_with("</div>"));
        assert!(descriptor.script.is_some());
    }

    #[test]
    fn test_quoted_angle_in_attribute() {
        let vue = r#"<script data-note="a > b">export default {}</script>"#;
        let descriptor = parse(vue).unwrap();
        assert_eq!(descriptor.script.unwrap().content, "export default {}");
    }

    #[test]
    fn test_top_level_comment_skipped() {
        let vue = "<!-- <script>nope</script> -->\n<script>export default {}</script>";
        let descriptor = parse(vue).unwrap();
        assert_eq!(descriptor.script.unwrap().content, "export default {}");
    }

    #[test]
    fn test_custom_block() {
        let vue = "<i18n>{ \"en\": {} }</i18n><template><p/></template>";
        let descriptor = parse(vue).unwrap();
        assert_eq!(descriptor.custom_blocks.len(), 1);
        assert_eq!(descriptor.custom_blocks[0].tag, "i18n");
        assert_eq!(descriptor.template.unwrap().content, "<p/>");
    }

    #[test]
    fn test_no_blocks() {
        let descriptor = parse("just text").unwrap();
        assert!(descriptor.is_empty());
    }

    #[test]
    fn test_unclosed_script() {
        let result = parse("<script>export default {}");
        assert!(matches!(
            result,
            Err(SfcError::UnclosedBlock { tag: "script", position: 0 })
        ));
    }

    #[test]
    fn test_duplicate_template() {
        let result = parse("<template><a/></template><template><b/></template>");
        assert!(matches!(
            result,
            Err(SfcError::DuplicateBlock { tag: "template", .. })
        ));
    }

    #[test]
    fn test_file_too_large() {
        let large = "x".repeat(MAX_FILE_SIZE + 1);
        assert!(matches!(parse(&large), Err(SfcError::FileTooLarge { .. })));
    }
}
