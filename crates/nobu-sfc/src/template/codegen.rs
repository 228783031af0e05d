//! Render-function code generation from the template node tree.

use std::fmt::Write as _;

use rustc_hash::FxHashSet;

use super::ast::{Element, Node};
use super::expr::{is_member_path, prefix_identifiers};
use crate::error::SfcError;

/// Runtime helpers imported from `vue`, in import order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Helper {
    H,
    Fragment,
    ToDisplayString,
    RenderList,
    RenderSlot,
    CreateCommentVNode,
    ResolveComponent,
}

impl Helper {
    fn name(self) -> &'static str {
        match self {
            Helper::H => "h",
            Helper::Fragment => "Fragment",
            Helper::ToDisplayString => "toDisplayString",
            Helper::RenderList => "renderList",
            Helper::RenderSlot => "renderSlot",
            Helper::CreateCommentVNode => "createCommentVNode",
            Helper::ResolveComponent => "resolveComponent",
        }
    }

    fn local(self) -> String {
        format!("_{}", self.name())
    }
}

/// Generates the render module for the given root nodes.
pub fn generate(roots: &[Node]) -> Result<String, SfcError> {
    let mut codegen = Codegen::default();
    let mut children = codegen.children(roots)?;

    let body = match children.len() {
        0 => "null".to_string(),
        1 => children.remove(0),
        _ => codegen.fragment(&children),
    };

    let mut code = String::new();
    let mut helpers: Vec<Helper> = codegen.helpers.iter().copied().collect();
    helpers.sort();
    if !helpers.is_empty() {
        let imports: Vec<String> = helpers
            .iter()
            .map(|helper| format!("{} as {}", helper.name(), helper.local()))
            .collect();
        let _ = writeln!(code, "import {{ {} }} from \"vue\"\n", imports.join(", "));
    }

    code.push_str("export function render(_ctx, _cache) {\n");
    for component in &codegen.components {
        let _ = writeln!(
            code,
            "  const {} = _resolveComponent({})",
            component_var(component),
            js_string(component)
        );
    }
    if !codegen.components.is_empty() {
        code.push('\n');
    }
    let _ = writeln!(code, "  return {body}");
    code.push_str("}\n");

    Ok(code)
}

#[derive(Default)]
struct Codegen {
    helpers: FxHashSet<Helper>,
    /// Component tags in first-use order
    components: Vec<String>,
    /// Identifiers introduced by enclosing `v-for`s
    scope: FxHashSet<String>,
}

impl Codegen {
    fn helper(&mut self, helper: Helper) -> String {
        self.helpers.insert(helper);
        helper.local()
    }

    fn expr(&self, source: &str) -> String {
        prefix_identifiers(source.trim(), &self.scope)
    }

    fn fragment(&mut self, children: &[String]) -> String {
        let h = self.helper(Helper::H);
        let fragment = self.helper(Helper::Fragment);
        format!("{h}({fragment}, null, [{}])", children.join(", "))
    }

    /// Generates one expression per child, merging adjacent text and
    /// interpolations and folding `v-if` chains into conditionals.
    fn children(&mut self, nodes: &[Node]) -> Result<Vec<String>, SfcError> {
        let mut out = Vec::new();
        let mut text_parts: Vec<String> = Vec::new();
        let mut i = 0;

        while i < nodes.len() {
            match &nodes[i] {
                Node::Text(text) => {
                    text_parts.push(js_string(text));
                    i += 1;
                }
                Node::Interpolation(source) => {
                    let display = self.helper(Helper::ToDisplayString);
                    text_parts.push(format!("{display}({})", self.expr(source)));
                    i += 1;
                }
                Node::Element(element) => {
                    if !text_parts.is_empty() {
                        out.push(text_parts.join(" + "));
                        text_parts.clear();
                    }

                    if element.has_attr("v-else") || element.has_attr("v-else-if") {
                        return Err(SfcError::OrphanElse(element.tag.clone()));
                    }

                    if element.has_attr("v-if") {
                        let (expr, next) = self.if_chain(nodes, i)?;
                        out.push(expr);
                        i = next;
                    } else {
                        out.push(self.element(element)?);
                        i += 1;
                    }
                }
            }
        }

        if !text_parts.is_empty() {
            out.push(text_parts.join(" + "));
        }

        Ok(out)
    }

    /// Folds `v-if` / `v-else-if` / `v-else` siblings starting at `start`.
    ///
    /// Returns the conditional expression and the index after the chain.
    fn if_chain(&mut self, nodes: &[Node], start: usize) -> Result<(String, usize), SfcError> {
        let mut branches: Vec<(String, String)> = Vec::new();
        let mut fallback: Option<String> = None;
        let mut i = start;
        let mut next = start;

        while i < nodes.len() {
            let Some(element) = nodes[i].as_element() else {
                if nodes[i].is_whitespace() {
                    i += 1;
                    continue;
                }
                break;
            };

            let condition = if i == start {
                element.directive("v-if")
            } else if let Some(condition) = element.directive("v-else-if") {
                Some(condition)
            } else if element.has_attr("v-else") {
                fallback = Some(self.element(element)?);
                next = i + 1;
                break;
            } else {
                break;
            };

            if let Some(condition) = condition {
                branches.push((self.expr(condition), self.element(element)?));
            }
            i += 1;
            next = i;
        }

        let mut expr = match fallback {
            Some(fallback) => fallback,
            None => {
                let comment = self.helper(Helper::CreateCommentVNode);
                format!("{comment}(\"v-if\", true)")
            }
        };
        for (condition, branch) in branches.into_iter().rev() {
            expr = format!("({condition})\n    ? {branch}\n    : {expr}");
        }

        Ok((expr, next))
    }

    fn element(&mut self, element: &Element) -> Result<String, SfcError> {
        if let Some(source) = element.directive("v-for") {
            return self.for_element(element, source);
        }
        self.element_body(element)
    }

    fn for_element(&mut self, element: &Element, source: &str) -> Result<String, SfcError> {
        let (aliases, list) = parse_for(source)?;
        let list = self.expr(list);

        let added: Vec<String> = aliases
            .iter()
            .filter(|alias| self.scope.insert((*alias).clone()))
            .cloned()
            .collect();
        let item = self.element_body(element);
        for alias in &added {
            self.scope.remove(alias);
        }
        let item = item?;

        let render_list = self.helper(Helper::RenderList);
        let h = self.helper(Helper::H);
        let fragment = self.helper(Helper::Fragment);
        Ok(format!(
            "{h}({fragment}, null, {render_list}({list}, ({}) => {item}))",
            aliases.join(", ")
        ))
    }

    fn element_body(&mut self, element: &Element) -> Result<String, SfcError> {
        match element.tag.as_str() {
            "template" => {
                let mut children = self.children(&element.children)?;
                Ok(match children.len() {
                    1 => children.remove(0),
                    _ => self.fragment(&children),
                })
            }
            "slot" => self.slot(element),
            _ => self.vnode(element),
        }
    }

    fn slot(&mut self, element: &Element) -> Result<String, SfcError> {
        let name = element
            .attr("name")
            .and_then(|attr| attr.value.as_deref())
            .unwrap_or("default");
        let render_slot = self.helper(Helper::RenderSlot);
        let children = self.children(&element.children)?;

        if children.is_empty() {
            Ok(format!("{render_slot}(_ctx.$slots, {})", js_string(name)))
        } else {
            Ok(format!(
                "{render_slot}(_ctx.$slots, {}, {{}}, () => [{}])",
                js_string(name),
                children.join(", ")
            ))
        }
    }

    fn vnode(&mut self, element: &Element) -> Result<String, SfcError> {
        let tag = if element.is_component() {
            self.helper(Helper::ResolveComponent);
            if !self.components.contains(&element.tag) {
                self.components.push(element.tag.clone());
            }
            component_var(&element.tag)
        } else {
            js_string(&element.tag)
        };

        let props = self.props(element)?;
        let children = self.children(&element.children)?;
        let h = self.helper(Helper::H);

        let children = if children.is_empty() {
            None
        } else if element.is_component() {
            Some(format!("{{ default: () => [{}] }}", children.join(", ")))
        } else {
            Some(format!("[{}]", children.join(", ")))
        };

        Ok(match (props, children) {
            (None, None) => format!("{h}({tag})"),
            (Some(props), None) => format!("{h}({tag}, {props})"),
            (props, Some(children)) => format!(
                "{h}({tag}, {}, {children})",
                props.as_deref().unwrap_or("null")
            ),
        })
    }

    /// Builds the props object literal, or `None` when the element has no props.
    fn props(&mut self, element: &Element) -> Result<Option<String>, SfcError> {
        let mut entries: Vec<String> = Vec::new();
        let mut classes: Vec<String> = Vec::new();
        let mut styles: Vec<String> = Vec::new();
        // Handlers sharing a key are called in attribute order
        let mut handlers: Vec<(String, Vec<String>)> = Vec::new();
        let mut add_handler = |key: String, handler: String| {
            match handlers.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, list)) => list.push(handler),
                None => handlers.push((key, vec![handler])),
            }
        };

        for attr in &element.attrs {
            let name = attr.name.as_str();
            let value = attr.value.as_deref().unwrap_or("");

            if let Some(prop) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
                let expr = self.expr(value);
                match prop {
                    "class" => classes.push(expr),
                    "style" => styles.push(expr),
                    _ => entries.push(format!("{}: {expr}", js_key(prop))),
                }
            } else if name == "v-bind" {
                entries.push(format!("...({})", self.expr(value)));
            } else if let Some(event) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:"))
            {
                let (key, handler) = self.handler(event, value, element)?;
                add_handler(key, handler);
            } else if name == "v-model" || name.starts_with("v-model:") || name.starts_with("v-model.") {
                let model = self.model(name, value, element)?;
                entries.push(model.binding);
                add_handler(model.key, model.handler);
            } else if name.starts_with("v-") {
                match name {
                    "v-if" | "v-else-if" | "v-else" | "v-for" | "v-cloak" | "v-once" => {}
                    "v-show" => styles.push(format!(
                        "{{ display: ({}) ? \"\" : \"none\" }}",
                        self.expr(value)
                    )),
                    "v-html" => entries.push(format!("innerHTML: {}", self.expr(value))),
                    "v-text" => entries.push(format!("textContent: {}", self.expr(value))),
                    _ => {
                        return Err(SfcError::UnsupportedDirective {
                            name: name.to_string(),
                            tag: element.tag.clone(),
                        })
                    }
                }
            } else {
                let literal = js_string(value);
                match name {
                    "class" => classes.insert(0, literal),
                    "style" => styles.insert(0, literal),
                    _ => entries.push(format!("{}: {literal}", js_key(name))),
                }
            }
        }

        if let Some(class) = merge(classes) {
            entries.insert(0, format!("class: {class}"));
        }
        entries.extend(handlers.into_iter().map(|(key, list)| match list.len() {
            1 => format!("{key}: {}", list.concat()),
            _ => format!("{key}: [{}]", list.join(", ")),
        }));
        if let Some(style) = merge(styles) {
            entries.push(format!("style: {style}"));
        }

        Ok((!entries.is_empty()).then(|| format!("{{ {} }}", entries.join(", "))))
    }

    /// Returns the props key and the handler expression for `@event.modifiers`.
    fn handler(
        &mut self,
        event: &str,
        value: &str,
        element: &Element,
    ) -> Result<(String, String), SfcError> {
        let mut parts = event.split('.');
        let event_name = parts.next().unwrap_or_default();
        let mut guards = String::new();
        let mut options = String::new();
        for modifier in parts {
            match modifier {
                "prevent" => guards.push_str("$event.preventDefault(); "),
                "stop" => guards.push_str("$event.stopPropagation(); "),
                "self" => guards.push_str("if ($event.target !== $event.currentTarget) return; "),
                // listener options travel as key suffixes: onClickOnce
                "once" => options.push_str("Once"),
                "capture" => options.push_str("Capture"),
                "passive" => options.push_str("Passive"),
                _ => {
                    return Err(SfcError::UnsupportedDirective {
                        name: format!("@{event}"),
                        tag: element.tag.clone(),
                    })
                }
            }
        }

        let added = self.scope.insert("$event".to_string());
        let expr = if value.trim().is_empty() {
            String::new()
        } else {
            self.expr(value)
        };
        if added {
            self.scope.remove("$event");
        }

        let key = js_key(&format!("{}{options}", handler_key(event_name)));
        let is_path = is_member_path(value);

        let handler = match (guards.is_empty(), is_path, expr.is_empty()) {
            (true, true, _) => expr,
            (true, false, true) => "() => {}".to_string(),
            (true, false, false) => format!("$event => ({expr})"),
            (false, true, _) => format!("$event => {{ {guards}{expr}($event) }}"),
            (false, false, _) => format!("$event => {{ {guards}{expr} }}"),
        };

        Ok((key, handler))
    }

    /// Expands `v-model` into a bound value and an update handler.
    ///
    /// Native `input`, `textarea` and `select` elements bind the DOM value
    /// (`checked` for checkboxes and radios); components bind `modelValue`
    /// or the named argument and listen for `update:<prop>`.
    fn model(&mut self, name: &str, value: &str, element: &Element) -> Result<Model, SfcError> {
        let unsupported = || SfcError::UnsupportedDirective {
            name: name.to_string(),
            tag: element.tag.clone(),
        };

        let mut parts = name["v-model".len()..].split('.');
        let arg = parts.next().unwrap_or_default().strip_prefix(':');
        let modifiers: Vec<&str> = parts.collect();

        if !is_member_path(value) {
            return Err(unsupported());
        }
        let target = self.expr(value);

        let (binding, mut event, mut new_value, text_like) = if element.is_component() {
            let prop = arg.unwrap_or("modelValue");
            (
                format!("{}: {target}", js_key(prop)),
                format!("update:{prop}"),
                "$event".to_string(),
                true,
            )
        } else {
            if arg.is_some() || element.attr(":type").is_some() || element.attr("v-bind:type").is_some()
            {
                return Err(unsupported());
            }
            let input_type = element
                .attr("type")
                .and_then(|attr| attr.value.as_deref())
                .unwrap_or("text");

            match (element.tag.as_str(), input_type) {
                ("input", "checkbox") => (
                    format!("checked: {target}"),
                    "change".to_string(),
                    "$event.target.checked".to_string(),
                    false,
                ),
                ("input", "radio") => {
                    let option = self.static_or_bound(element, "value").ok_or_else(unsupported)?;
                    (
                        format!("checked: {target} === {option}"),
                        "change".to_string(),
                        "$event.target.value".to_string(),
                        false,
                    )
                }
                ("select", _) if element.attr("multiple").is_some() => return Err(unsupported()),
                ("select", _) => (
                    format!("value: {target}"),
                    "change".to_string(),
                    "$event.target.value".to_string(),
                    false,
                ),
                ("input" | "textarea", _) => (
                    format!("value: {target}"),
                    "input".to_string(),
                    "$event.target.value".to_string(),
                    true,
                ),
                _ => return Err(unsupported()),
            }
        };

        for modifier in &modifiers {
            match *modifier {
                "lazy" if text_like && !element.is_component() => event = "change".to_string(),
                "trim" if text_like => new_value = format!("{new_value}.trim()"),
                "number" => {
                    new_value = format!("((v, n = parseFloat(v)) => isNaN(n) ? v : n)({new_value})")
                }
                _ => return Err(unsupported()),
            }
        }

        Ok(Model {
            binding,
            key: js_key(&handler_key(&event)),
            handler: format!("$event => ({target} = {new_value})"),
        })
    }

    /// The value of `name` as a JavaScript expression, from `name="..."`
    /// or `:name="..."`.
    fn static_or_bound(&self, element: &Element, name: &str) -> Option<String> {
        if let Some(attr) = element.attr(name) {
            return Some(js_string(attr.value.as_deref().unwrap_or("")));
        }
        element
            .attr(&format!(":{name}"))
            .or_else(|| element.attr(&format!("v-bind:{name}")))
            .map(|attr| self.expr(attr.value.as_deref().unwrap_or("")))
    }
}

/// A compiled `v-model`: the bound prop entry plus its update listener.
struct Model {
    binding: String,
    key: String,
    handler: String,
}

/// Splits `(item, index) in items` into aliases and the source expression.
fn parse_for(source: &str) -> Result<(Vec<String>, &str), SfcError> {
    let invalid = || SfcError::InvalidFor(source.to_string());

    let (left, right) = source
        .split_once(" in ")
        .or_else(|| source.split_once(" of "))
        .ok_or_else(invalid)?;

    let aliases: Vec<String> = left
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|alias| alias.trim().to_string())
        .collect();

    let valid = !aliases.is_empty()
        && aliases.iter().all(|alias| {
            let mut chars = alias.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        });

    if !valid || right.trim().is_empty() {
        return Err(invalid());
    }

    Ok((aliases, right.trim()))
}

/// Merges class/style values: one value stays as-is, several become an array.
fn merge(values: Vec<String>) -> Option<String> {
    match values.len() {
        0 => None,
        1 => values.into_iter().next(),
        _ => Some(format!("[{}]", values.join(", "))),
    }
}

/// `click` -> `onClick`, `update:modelValue` -> `onUpdate:modelValue`, `my-event` -> `onMyEvent`.
fn handler_key(event: &str) -> String {
    let mut key = String::from("on");
    let mut upper = true;
    for c in event.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            key.extend(c.to_uppercase());
            upper = false;
        } else {
            key.push(c);
        }
    }
    key
}

fn component_var(tag: &str) -> String {
    let mut name = String::from("_component_");
    name.extend(
        tag.chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' }),
    );
    name
}

/// Object key, quoted unless it is a plain identifier.
fn js_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_ident = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if is_ident {
        key.to_string()
    } else {
        js_string(key)
    }
}

/// Double-quoted JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_key() {
        assert_eq!(handler_key("click"), "onClick");
        assert_eq!(handler_key("my-event"), "onMyEvent");
        assert_eq!(handler_key("update:modelValue"), "onUpdate:modelValue");
    }

    #[test]
    fn test_js_key_quotes_non_identifiers() {
        assert_eq!(js_key("id"), "id");
        assert_eq!(js_key("data-id"), "\"data-id\"");
        assert_eq!(js_key("onUpdate:modelValue"), "\"onUpdate:modelValue\"");
    }

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("a \"b\"\n"), r#""a \"b\"\n""#);
    }

    #[test]
    fn test_parse_for_forms() {
        let (aliases, list) = parse_for("item in items").unwrap();
        assert_eq!(aliases, vec!["item"]);
        assert_eq!(list, "items");

        let (aliases, list) = parse_for("(item, index) of store.items").unwrap();
        assert_eq!(aliases, vec!["item", "index"]);
        assert_eq!(list, "store.items");

        assert!(matches!(parse_for("items"), Err(SfcError::InvalidFor(_))));
        assert!(matches!(parse_for("1x in items"), Err(SfcError::InvalidFor(_))));
    }

    #[test]
    fn test_component_var() {
        assert_eq!(component_var("MyButton"), "_component_MyButton");
        assert_eq!(component_var("router-link"), "_component_router_link");
    }
}
