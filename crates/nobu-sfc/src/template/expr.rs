//! Expression rewriting: free identifiers are read from the render context (`_ctx`).

use rustc_hash::FxHashSet;

/// Prefixes free identifiers in `expr` with `_ctx.`.
///
/// Identifiers in `scope` (e.g. `v-for` aliases, `$event`), JS keywords and the
/// allowed globals are left alone, as are member-access properties and
/// object-literal keys. Shorthand properties (`{ a }`) are expanded to `{ a: _ctx.a }`.
pub fn prefix_identifiers(expr: &str, scope: &FxHashSet<String>) -> String {
    let chars: Vec<char> = expr.chars().collect();
    let mut locals = scope.clone();
    locals.extend(arrow_params(&chars));

    let mut prefixer = Prefixer {
        chars: &chars,
        locals: &locals,
        out: String::with_capacity(expr.len() + 16),
    };
    prefixer.run(0, chars.len());
    prefixer.out
}

/// True when `expr` is a plain member path such as `submit` or `form.submit`.
pub fn is_member_path(expr: &str) -> bool {
    let expr = expr.trim();
    !expr.is_empty()
        && expr.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
        })
}

struct Prefixer<'a> {
    chars: &'a [char],
    locals: &'a FxHashSet<String>,
    out: String,
}

impl Prefixer<'_> {
    fn run(&mut self, start: usize, end: usize) {
        let mut brackets: Vec<char> = Vec::new();
        let mut i = start;

        while i < end {
            let c = self.chars[i];
            match c {
                '\'' | '"' => i = self.copy_string(i, end, c),
                '`' => i = self.copy_template_literal(i, end),
                '(' | '[' | '{' => {
                    brackets.push(c);
                    self.out.push(c);
                    i += 1;
                }
                ')' | ']' | '}' => {
                    brackets.pop();
                    self.out.push(c);
                    i += 1;
                }
                c if c.is_ascii_digit() => {
                    while i < end && (is_ident_char(self.chars[i]) || self.chars[i] == '.') {
                        self.out.push(self.chars[i]);
                        i += 1;
                    }
                }
                c if is_ident_start(c) => {
                    let ident_start = i;
                    while i < end && is_ident_char(self.chars[i]) {
                        i += 1;
                    }
                    let ident: String = self.chars[ident_start..i].iter().collect();
                    self.emit_identifier(&ident, ident_start, i, start, end, brackets.last());
                }
                _ => {
                    self.out.push(c);
                    i += 1;
                }
            }
        }
    }

    fn emit_identifier(
        &mut self,
        ident: &str,
        ident_start: usize,
        ident_end: usize,
        start: usize,
        end: usize,
        bracket: Option<&char>,
    ) {
        let prev = self.prev_significant(ident_start, start);
        let next = self.next_significant(ident_end, end);
        let in_object = bracket == Some(&'{');
        let after_separator = matches!(prev, Some((_, '{' | ',')));

        let is_member = match prev {
            Some((at, '.')) => !(at >= 2 && self.chars[at - 1] == '.' && self.chars[at - 2] == '.'),
            _ => false,
        };
        let is_key = in_object && after_separator && next == Some(':');
        let is_shorthand = in_object && after_separator && matches!(next, Some('}' | ','));

        if is_member || is_key || is_reserved(ident) || self.locals.contains(ident) {
            self.out.push_str(ident);
        } else if is_shorthand {
            self.out.push_str(ident);
            self.out.push_str(": _ctx.");
            self.out.push_str(ident);
        } else {
            self.out.push_str("_ctx.");
            self.out.push_str(ident);
        }
    }

    fn prev_significant(&self, before: usize, start: usize) -> Option<(usize, char)> {
        (start..before)
            .rev()
            .map(|at| (at, self.chars[at]))
            .find(|(_, c)| !c.is_whitespace())
    }

    fn next_significant(&self, from: usize, end: usize) -> Option<char> {
        self.chars[from..end].iter().copied().find(|c| !c.is_whitespace())
    }

    fn copy_string(&mut self, at: usize, end: usize, quote: char) -> usize {
        self.out.push(quote);
        let mut i = at + 1;
        while i < end {
            let c = self.chars[i];
            self.out.push(c);
            i += 1;
            if c == '\\' && i < end {
                self.out.push(self.chars[i]);
                i += 1;
            } else if c == quote {
                break;
            }
        }
        i
    }

    fn copy_template_literal(&mut self, at: usize, end: usize) -> usize {
        self.out.push('`');
        let mut i = at + 1;
        while i < end {
            let c = self.chars[i];
            if c == '\\' && i + 1 < end {
                self.out.push(c);
                self.out.push(self.chars[i + 1]);
                i += 2;
            } else if c == '`' {
                self.out.push(c);
                return i + 1;
            } else if c == '$' && self.chars.get(i + 1) == Some(&'{') {
                let close = matching_brace(self.chars, i + 1, end);
                self.out.push_str("${");
                self.run(i + 2, close);
                if close < end {
                    self.out.push('}');
                }
                i = close + 1;
            } else {
                self.out.push(c);
                i += 1;
            }
        }
        i
    }
}

/// Index of the `}` matching the `{` at `open`, or `end` when unbalanced.
fn matching_brace(chars: &[char], open: usize, end: usize) -> usize {
    let mut depth = 0usize;
    for (at, &c) in chars.iter().enumerate().take(end).skip(open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return at;
                }
            }
            _ => {}
        }
    }
    end
}

/// Parameter names of arrow functions (`x => ...`, `(a, b) => ...`).
fn arrow_params(chars: &[char]) -> Vec<String> {
    let mut params = Vec::new();

    for at in 0..chars.len().saturating_sub(1) {
        if chars[at] != '=' || chars[at + 1] != '>' {
            continue;
        }

        let mut cursor = at;
        while cursor > 0 && chars[cursor - 1].is_whitespace() {
            cursor -= 1;
        }
        if cursor == 0 {
            continue;
        }

        if chars[cursor - 1] == ')' {
            let close = cursor - 1;
            let mut depth = 0usize;
            let mut open = close;
            loop {
                match chars[open] {
                    ')' => depth += 1,
                    '(' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                if open == 0 {
                    break;
                }
                open -= 1;
            }
            if chars[open] != '(' {
                continue;
            }
            let inner: String = chars[open + 1..close].iter().collect();
            params.extend(
                inner
                    .split(|c: char| !is_ident_char(c))
                    .filter(|word| word.chars().next().is_some_and(is_ident_start))
                    .map(str::to_string),
            );
        } else {
            let end = cursor;
            while cursor > 0 && is_ident_char(chars[cursor - 1]) {
                cursor -= 1;
            }
            if cursor < end {
                params.push(chars[cursor..end].iter().collect());
            }
        }
    }

    params
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Keywords, literals and globals that are never read from the render context.
fn is_reserved(ident: &str) -> bool {
    matches!(
        ident,
        "true"
            | "false"
            | "null"
            | "undefined"
            | "this"
            | "typeof"
            | "instanceof"
            | "in"
            | "of"
            | "new"
            | "void"
            | "delete"
            | "function"
            | "return"
            | "let"
            | "const"
            | "var"
            | "if"
            | "else"
            | "await"
            | "async"
            | "Infinity"
            | "NaN"
            | "isFinite"
            | "isNaN"
            | "parseFloat"
            | "parseInt"
            | "decodeURI"
            | "decodeURIComponent"
            | "encodeURI"
            | "encodeURIComponent"
            | "Math"
            | "Number"
            | "Date"
            | "Array"
            | "Object"
            | "Boolean"
            | "String"
            | "RegExp"
            | "Map"
            | "Set"
            | "JSON"
            | "Intl"
            | "BigInt"
            | "console"
            | "Error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(expr: &str) -> String {
        prefix_identifiers(expr, &FxHashSet::default())
    }

    #[test]
    fn test_simple_identifier() {
        assert_eq!(prefix("msg"), "_ctx.msg");
    }

    #[test]
    fn test_member_access_not_prefixed() {
        assert_eq!(prefix("user.name.length"), "_ctx.user.name.length");
        assert_eq!(prefix("a?.b"), "_ctx.a?.b");
    }

    #[test]
    fn test_operators_and_literals() {
        assert_eq!(prefix("count + 1 > max"), "_ctx.count + 1 > _ctx.max");
        assert_eq!(prefix("ok ? 'yes' : 'no'"), "_ctx.ok ? 'yes' : 'no'");
        assert_eq!(prefix("flag === true"), "_ctx.flag === true");
    }

    #[test]
    fn test_strings_are_opaque() {
        assert_eq!(prefix(r#""a b" + x"#), r#""a b" + _ctx.x"#);
        assert_eq!(prefix(r"'it\'s' + y"), r"'it\'s' + _ctx.y");
    }

    #[test]
    fn test_template_literal() {
        assert_eq!(prefix("`hi ${name}!`"), "`hi ${_ctx.name}!`");
    }

    #[test]
    fn test_object_literal_keys() {
        assert_eq!(
            prefix("{ active: isActive, 'text-danger': hasError }"),
            "{ active: _ctx.isActive, 'text-danger': _ctx.hasError }"
        );
        assert_eq!(prefix("{ color }"), "{ color: _ctx.color }");
    }

    #[test]
    fn test_globals_untouched() {
        assert_eq!(prefix("Math.max(a, b)"), "Math.max(_ctx.a, _ctx.b)");
    }

    #[test]
    fn test_scope_and_arrow_params() {
        let mut scope = FxHashSet::default();
        scope.insert("item".to_string());
        assert_eq!(
            prefix_identifiers("item.id + offset", &scope),
            "item.id + _ctx.offset"
        );
        assert_eq!(
            prefix("list.map(x => x * factor)"),
            "_ctx.list.map(x => x * _ctx.factor)"
        );
        assert_eq!(prefix("(a, b) => a + b"), "(a, b) => a + b");
    }

    #[test]
    fn test_spread_is_prefixed() {
        assert_eq!(prefix("[...items]"), "[..._ctx.items]");
    }

    #[test]
    fn test_is_member_path() {
        assert!(is_member_path("submit"));
        assert!(is_member_path("form.submit"));
        assert!(!is_member_path("count++"));
        assert!(!is_member_path("go(1)"));
        assert!(!is_member_path(""));
    }
}
