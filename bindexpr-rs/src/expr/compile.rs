//! Compile a source string once into a reusable [`Expression`].

use std::sync::Arc;

use tracing::debug;

use super::ast::Node;
use super::error::ParseError;
use super::eval::eval_node;
use super::parser::parse;
use super::value::Value;
use crate::context::Scope;

/// A parsed expression, ready to evaluate against any number of contexts.
///
/// Cloning is cheap; clones share the same tree. The empty expression
/// always evaluates to [`Value::Undefined`].
#[derive(Debug, Clone, Default)]
pub struct Expression {
    root: Option<Arc<Node>>,
}

impl Expression {
    pub fn eval<S: Scope + ?Sized>(&self, scope: &S) -> Value {
        match &self.root {
            Some(node) => eval_node(node, scope),
            None => Value::Undefined,
        }
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The closure form, for callers that store evaluators uniformly.
    pub fn into_fn(self) -> Box<dyn Fn(&dyn Scope) -> Value + Send + Sync> {
        Box::new(move |scope| self.eval(scope))
    }
}

/// Parse `source` and return an [`Expression`] for it.
///
/// All syntax errors surface here; evaluating the result never fails.
pub fn compile(source: &str) -> Result<Expression, ParseError> {
    let root = parse(source).inspect_err(|err| debug!(%err, "expression failed to compile"))?;
    debug!(source, empty = root.is_none(), "compiled expression");
    Ok(Expression {
        root: root.map(Arc::new),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn compile_and_reuse() {
        let expr = compile("a * 2").unwrap();
        for n in 0..5 {
            let ctx = Context::new().with("a", n);
            assert_eq!(expr.eval(&ctx), Value::from(n * 2));
        }
    }

    #[test]
    fn empty_source_is_always_undefined() {
        let expr = compile("   ").unwrap();
        assert!(expr.is_empty());
        assert_eq!(expr.eval(&Context::new().with("a", 1)), Value::Undefined);
    }

    #[test]
    fn errors_surface_at_compile_time() {
        let err = compile("'abc").unwrap_err();
        assert!(err.to_string().contains("unclosed quote"));
        let err = compile("1a").unwrap_err();
        assert!(err.to_string().contains("variable names cannot start with a number"));
    }

    #[test]
    fn long_flat_source_fails_to_compile() {
        let sum = vec!["1"; 10_000].join("+");
        let err = compile(&sum).unwrap_err();
        assert_eq!(err.message, "expression too deeply nested");
        let nested = format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(compile(&nested).is_err());
    }

    #[test]
    fn compiling_twice_is_deterministic() {
        let a = compile("x > 1 ? y.z : [x]").unwrap();
        let b = compile("x > 1 ? y.z : [x]").unwrap();
        assert_eq!(a.root(), b.root());
        let ctx = Context::new()
            .with("x", 2)
            .with("y", Value::object([("z", "ok")]));
        assert_eq!(a.eval(&ctx), b.eval(&ctx));
    }

    #[test]
    fn closure_form() {
        let f = compile("f(x)").unwrap().into_fn();
        let ctx = Context::new()
            .with("f", Value::function(|_, args| Value::Number(args[0].to_number() * 2.0)))
            .with("x", 5);
        assert_eq!(f(&ctx), Value::from(10));
        assert_eq!(f(&()), Value::Undefined);
    }

    #[test]
    fn shared_across_threads() {
        let expr = compile("n * n").unwrap();
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let expr = expr.clone();
                std::thread::spawn(move || expr.eval(&Context::new().with("n", n)))
            })
            .collect();
        for (n, h) in handles.into_iter().enumerate() {
            let n = n as i32;
            assert_eq!(h.join().unwrap(), Value::from(n * n));
        }
    }
}
