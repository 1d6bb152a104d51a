//! Template strings: literal text with `${expr}` interpolations.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::compile::{compile, Expression};
use super::error::ParseError;
use super::value::{format_number, Value};
use crate::context::Scope;

/// Typographic minus used for negative numbers in rendered text.
const MINUS_SIGN: char = '\u{2013}';

fn marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("marker pattern is valid"))
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Expr(Expression),
}

/// A compiled template. Every embedded expression is parsed once, when the
/// template is compiled; rendering only evaluates.
#[derive(Debug, Clone, Default)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn render<S: Scope + ?Sized>(&self, scope: &S) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Expr(expr) => out.push_str(&format_value(&expr.eval(scope))),
            }
        }
        out
    }

    /// Number of `${…}` interpolations.
    pub fn expression_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Expr(_)))
            .count()
    }

    pub fn into_fn(self) -> Box<dyn Fn(&dyn Scope) -> String + Send + Sync> {
        Box::new(move |scope| self.render(scope))
    }
}

/// Compile a template string.
///
/// `×` anywhere in `source` is first rewritten to `*`, so authored text can
/// use the multiplication sign inside interpolations. A marker needs at least
/// one character between the braces and cannot contain `}`; `${}` is kept as
/// literal text.
pub fn compile_string(source: &str) -> Result<Template, ParseError> {
    let source = source.replace('×', "*");
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in marker().captures_iter(&source) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Text(source[last..whole.start()].to_owned()));
        }
        segments.push(Segment::Expr(compile(inner.as_str())?));
        last = whole.end();
    }
    if last < source.len() {
        segments.push(Segment::Text(source[last..].to_owned()));
    }

    let template = Template { segments };
    debug!(
        segments = template.segments.len(),
        expressions = template.expression_count(),
        "compiled template"
    );
    Ok(template)
}

/// Text for one interpolated value. `undefined` and `null` render as
/// nothing; negative numbers use a typographic minus.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Undefined | Value::Null => String::new(),
        Value::Number(n) if *n < 0.0 => format!("{MINUS_SIGN}{}", format_number(-n)),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn render(src: &str, ctx: &Context) -> String {
        compile_string(src).expect("compile failed").render(ctx)
    }

    #[test]
    fn interpolates() {
        let ctx = Context::new().with("name", "World");
        assert_eq!(render("Hello ${name}!", &ctx), "Hello World!");
        assert_eq!(render("${name}", &ctx), "World");
        assert_eq!(render("no markers", &ctx), "no markers");
        assert_eq!(render("", &ctx), "");
    }

    #[test]
    fn several_markers() {
        let ctx = Context::new().with("a", 2).with("b", 3);
        assert_eq!(render("${a} + ${b} = ${a + b}", &ctx), "2 + 3 = 5");
        assert_eq!(render("${a}${b}", &ctx), "23");
    }

    #[test]
    fn negative_numbers_use_minus_sign() {
        let ctx = Context::new().with("x", -5);
        assert_eq!(render("${x}", &ctx), "\u{2013}5");
        assert_eq!(render("${x * -1}", &ctx), "5");
        assert_eq!(render("${x / 2}", &ctx), "\u{2013}2.5");
    }

    #[test]
    fn multiplication_sign() {
        let ctx = Context::new().with("a", 4);
        assert_eq!(render("${a × 3}", &ctx), "12");
        assert_eq!(render("2 × ${a}", &ctx), "2 * 4");
    }

    #[test]
    fn undefined_renders_empty() {
        let ctx = Context::new();
        assert_eq!(render("[${missing}]", &ctx), "[]");
        assert_eq!(render("[${missing + 1}]", &ctx), "[]");
    }

    #[test]
    fn empty_marker_is_literal() {
        let t = compile_string("cost: ${}").unwrap();
        assert_eq!(t.expression_count(), 0);
        assert_eq!(t.render(&Context::new()), "cost: ${}");
    }

    #[test]
    fn parse_errors_surface_at_compile_time() {
        let err = compile_string("x = ${'abc}").unwrap_err();
        assert!(err.message.starts_with("unclosed quote"));
        assert_eq!(err.expression, "'abc");
    }

    #[test]
    fn overlong_product_fails_to_compile() {
        let product = format!("area ${{{}}}", vec!["2"; 5_000].join("×"));
        let err = compile_string(&product).unwrap_err();
        assert_eq!(err.message, "expression too deeply nested");
    }

    #[test]
    fn closure_form() {
        let f = compile_string("${n} items").unwrap().into_fn();
        assert_eq!(f(&Context::new().with("n", 3)), "3 items");
        assert_eq!(f(&Context::new().with("n", 0)), "0 items");
    }

    #[test]
    fn format_values() {
        assert_eq!(format_value(&Value::Number(-0.5)), "\u{2013}0.5");
        assert_eq!(format_value(&Value::Number(f64::NEG_INFINITY)), "\u{2013}Infinity");
        assert_eq!(format_value(&Value::Bool(false)), "false");
        assert_eq!(format_value(&Value::Null), "");
        assert_eq!(
            format_value(&Value::from(vec![Value::from(-1), Value::from(2)])),
            "-1,2"
        );
    }
}
