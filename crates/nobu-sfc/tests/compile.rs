//! Integration tests for nobu-sfc
//!
//! These tests drive full components through `parse` and `compile_template`
//! and check the generated render modules.

use nobu_sfc::{compile_template, parse, SfcCompiler, SfcError, VueCompiler};
use proptest::prelude::*;

fn render_of(template: &str) -> String {
    compile_template(template).expect("template should compile").code
}

#[test]
fn test_minimal_template_module() {
    assert_eq!(
        render_of("<div>hi</div>"),
        "import { h as _h } from \"vue\"\n\n\
         export function render(_ctx, _cache) {\n  \
         return _h(\"div\", null, [\"hi\"])\n}\n"
    );
}

#[test]
fn test_empty_template_renders_null() {
    assert_eq!(
        render_of("  \n "),
        "export function render(_ctx, _cache) {\n  return null\n}\n"
    );
}

#[test]
fn test_interpolation_and_bindings() {
    let code = render_of(r#"<p class="title" :id="pid">Count: {{ count * 2 }}</p>"#);
    assert!(code.contains("import { h as _h, toDisplayString as _toDisplayString } from \"vue\""));
    assert!(code.contains(
        r#"_h("p", { class: "title", id: _ctx.pid }, ["Count: " + _toDisplayString(_ctx.count * 2)])"#
    ));
}

#[test]
fn test_class_and_style_merge() {
    let code = render_of(
        r#"<div class="box" :class="{ active: isActive }" style="color: red" v-show="visible"></div>"#,
    );
    assert!(code.contains(r#"class: ["box", { active: _ctx.isActive }]"#));
    assert!(code.contains(
        r#"style: ["color: red", { display: (_ctx.visible) ? "" : "none" }]"#
    ));
}

#[test]
fn test_event_handlers() {
    let code = render_of(
        r#"<form @submit.prevent="save"><button @click="count++">+</button><input @input="onInput"></form>"#,
    );
    assert!(code.contains("onSubmit: $event => { $event.preventDefault(); _ctx.save($event) }"));
    assert!(code.contains("onClick: $event => (_ctx.count++)"));
    assert!(code.contains("onInput: _ctx.onInput"));
}

#[test]
fn test_handler_sees_event_argument() {
    let code = render_of(r#"<input @change="update($event.target.value)">"#);
    assert!(code.contains("onChange: $event => (_ctx.update($event.target.value))"));
}

#[test]
fn test_if_else_chain() {
    let code = render_of(
        r#"<div>
  <p v-if="mode === 'a'">A</p>
  <p v-else-if="mode === 'b'">B</p>
  <p v-else>C</p>
</div>"#,
    );
    assert!(code.contains("(_ctx.mode === 'a')\n    ? _h(\"p\", null, [\"A\"])"));
    assert!(code.contains(": (_ctx.mode === 'b')\n    ? _h(\"p\", null, [\"B\"])"));
    assert!(code.contains(": _h(\"p\", null, [\"C\"])"));
    assert!(!code.contains("createCommentVNode"));
}

#[test]
fn test_if_without_else_uses_comment_placeholder() {
    let code = render_of(r#"<span v-if="show">x</span>"#);
    assert!(code.contains("createCommentVNode as _createCommentVNode"));
    assert!(code.contains(": _createCommentVNode(\"v-if\", true)"));
}

#[test]
fn test_orphan_else_is_an_error() {
    let result = compile_template("<div><p v-else>no</p></div>");
    assert!(matches!(result, Err(SfcError::OrphanElse(tag)) if tag == "p"));
}

#[test]
fn test_for_aliases_are_local() {
    let code = render_of(
        r#"<ul><li v-for="(item, i) in items" :key="item.id">{{ i }}: {{ item.label }}{{ suffix }}</li></ul>"#,
    );
    assert!(code.contains("_renderList(_ctx.items, (item, i) => _h(\"li\", { key: item.id }"));
    assert!(code.contains("_toDisplayString(i) + \": \" + _toDisplayString(item.label) + _toDisplayString(_ctx.suffix)"));
    assert!(code.contains("_h(_Fragment, null, _renderList("));
}

#[test]
fn test_components_are_resolved() {
    let code = render_of(r#"<div><MyButton :label="text">Go</MyButton><router-link to="/"/></div>"#);
    assert!(code.contains("  const _component_MyButton = _resolveComponent(\"MyButton\")\n"));
    assert!(code.contains("  const _component_router_link = _resolveComponent(\"router-link\")\n"));
    assert!(code.contains("_h(_component_MyButton, { label: _ctx.text }, { default: () => [\"Go\"] })"));
    assert!(code.contains("_h(_component_router_link, { to: \"/\" })"));
}

#[test]
fn test_multiple_roots_become_fragment() {
    let code = render_of("<h1>a</h1>\n<h2>b</h2>");
    assert!(code.contains("return _h(_Fragment, null, [_h(\"h1\", null, [\"a\"]), _h(\"h2\", null, [\"b\"])])"));
}

#[test]
fn test_slot_outlet() {
    let code = render_of(r#"<div><slot name="header">Default</slot></div>"#);
    assert!(code.contains("_renderSlot(_ctx.$slots, \"header\", {}, () => [\"Default\"])"));
}

#[test]
fn test_unsupported_directive() {
    let result = compile_template(r#"<input v-focus="name">"#);
    assert!(matches!(
        result,
        Err(SfcError::UnsupportedDirective { name, .. }) if name == "v-focus"
    ));
}

#[test]
fn test_event_option_modifiers() {
    let code = render_of(r#"<button @click.once="start" @scroll.passive.capture="track()"></button>"#);
    assert!(code.contains("onClickOnce: _ctx.start"));
    assert!(code.contains("onScrollPassiveCapture: $event => (_ctx.track())"));
}

#[test]
fn test_unknown_event_modifier_is_an_error() {
    let result = compile_template(r#"<input @keyup.enter="submit">"#);
    assert!(matches!(
        result,
        Err(SfcError::UnsupportedDirective { name, .. }) if name == "@keyup.enter"
    ));
}

#[test]
fn test_model_on_text_input() {
    let code = render_of(r#"<input v-model="form.name">"#);
    assert!(code.contains(
        "_h(\"input\", { value: _ctx.form.name, onInput: $event => (_ctx.form.name = $event.target.value) })"
    ));
}

#[test]
fn test_model_modifiers() {
    let code = render_of(r#"<textarea v-model.lazy.trim="bio"></textarea>"#);
    assert!(code.contains("value: _ctx.bio"));
    assert!(code.contains("onChange: $event => (_ctx.bio = $event.target.value.trim())"));
    assert!(!code.contains("onInput"));

    let code = render_of(r#"<input v-model.number="age">"#);
    assert!(code.contains("(_ctx.age = ((v, n = parseFloat(v)) => isNaN(n) ? v : n)($event.target.value))"));
}

#[test]
fn test_model_on_checkbox_radio_and_select() {
    let code = render_of(r#"<input type="checkbox" v-model="done">"#);
    assert!(code.contains("checked: _ctx.done"));
    assert!(code.contains("onChange: $event => (_ctx.done = $event.target.checked)"));

    let code = render_of(r#"<input type="radio" value="a" v-model="pick">"#);
    assert!(code.contains("checked: _ctx.pick === \"a\""));
    assert!(code.contains("onChange: $event => (_ctx.pick = $event.target.value)"));

    let code = render_of(r#"<select v-model="choice"><option>x</option></select>"#);
    assert!(code.contains("value: _ctx.choice"));
    assert!(code.contains("onChange: $event => (_ctx.choice = $event.target.value)"));
}

#[test]
fn test_model_on_component() {
    let code = render_of(r#"<MyInput v-model="query" v-model:title="heading"/>"#);
    assert!(code.contains("modelValue: _ctx.query"));
    assert!(code.contains("\"onUpdate:modelValue\": $event => (_ctx.query = $event)"));
    assert!(code.contains("title: _ctx.heading"));
    assert!(code.contains("\"onUpdate:title\": $event => (_ctx.heading = $event)"));
}

#[test]
fn test_model_shares_listener_with_handler() {
    let code = render_of(r#"<input v-model="text" @input="changed">"#);
    assert!(code.contains(
        "onInput: [$event => (_ctx.text = $event.target.value), _ctx.changed]"
    ));
}

#[test]
fn test_model_rejects_unassignable_targets() {
    for template in [
        r#"<input v-model="a + b">"#,
        r#"<div v-model="x"></div>"#,
        r#"<select multiple v-model="picked"></select>"#,
        r#"<input type="radio" v-model="pick">"#,
    ] {
        assert!(
            matches!(
                compile_template(template),
                Err(SfcError::UnsupportedDirective { .. })
            ),
            "{template}"
        );
    }
}

#[test]
fn test_full_component_through_trait() {
    let source = r#"<template>
  <div>{{ greeting }}</div>
</template>

<script>
import { ref } from 'vue'
export default { name: "App" }
</script>
"#;
    let compiler = VueCompiler;
    let descriptor = compiler.parse(source).unwrap();
    let script = descriptor.script.as_ref().unwrap();
    assert!(script.content.contains(r#"export default { name: "App" }"#));

    let template = descriptor.template.as_ref().unwrap();
    let compiled = compiler.compile_template(&template.content).unwrap();
    assert!(compiled.code.contains("_toDisplayString(_ctx.greeting)"));
    assert!(!compiled.code.contains("export default"));
}

#[test]
fn test_parse_rejects_second_script_setup() {
    let source = "<script setup>a</script><script setup>b</script>";
    assert!(matches!(
        parse(source),
        Err(SfcError::DuplicateBlock { tag: "script setup", .. })
    ));
}

proptest! {
    #[test]
    fn parse_never_panics(source in "\\PC{0,200}") {
        let _ = parse(&source);
    }

    #[test]
    fn compile_never_panics(source in "[<>/{}a-z =\"'.@:!-]{0,120}") {
        let _ = compile_template(&source);
    }
}
