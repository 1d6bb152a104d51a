//! Evaluation contexts.
//!
//! Compiled expressions read names through the [`Scope`] trait and never
//! write back. [`Context`] is the owned store most callers use; plain maps
//! and object values work too.

use std::collections::{BTreeMap, HashMap};

use crate::expr::value::Value;

/// Read-only name lookup used by the evaluator.
pub trait Scope {
    /// Resolve `name`, or `None` if it is not bound.
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl<S: Scope + ?Sized> Scope for &S {
    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }
}

/// The empty scope: every name is unbound.
impl Scope for () {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl Scope for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Scope for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// An object value exposes its keys as names.
impl Scope for Value {
    fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.get(name).cloned(),
            _ => None,
        }
    }
}

/// Owned name → value store.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set (or overwrite) a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Remove a variable.  Returns `true` if it existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.vars.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Scope for Context {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        ctx.extend(iter);
        ctx
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Context {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut ctx = Context::new();
        ctx.set("wrap", 1);
        assert_eq!(ctx.get("wrap"), Some(&Value::from(1)));
        assert_eq!(ctx.lookup("wrap"), Some(Value::from(1)));
    }

    #[test]
    fn overwrite() {
        let ctx = Context::new().with("x", "old").with("x", "new");
        assert_eq!(ctx.get("x"), Some(&Value::from("new")));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn unset() {
        let mut ctx = Context::new().with("gone", "bye");
        assert!(ctx.unset("gone"));
        assert_eq!(ctx.get("gone"), None);
        assert!(!ctx.unset("gone"));
        assert!(ctx.is_empty());
    }

    #[test]
    fn missing_returns_none() {
        let ctx = Context::new();
        assert_eq!(ctx.lookup("nope"), None);
        assert!(!ctx.contains("nope"));
        assert_eq!(().lookup("nope"), None);
    }

    #[test]
    fn collect_from_pairs() {
        let ctx: Context = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(ctx.len(), 2);
        assert!(ctx.contains("b"));
    }

    #[test]
    fn iter_visits_every_binding() {
        let mut ctx = Context::new().with("b", 2).with("a", 1);
        ctx.extend([("c", 3)]);
        let mut names: Vec<_> = ctx.iter().map(|(k, v)| (k.as_str(), v.to_number())).collect();
        names.sort_by(|x, y| x.0.cmp(y.0));
        assert_eq!(names, [("a", 1.0), ("b", 2.0), ("c", 3.0)]);
    }

    #[test]
    fn maps_and_objects_are_scopes() {
        let mut map = HashMap::new();
        map.insert("k".to_owned(), Value::from(true));
        assert_eq!(map.lookup("k"), Some(Value::Bool(true)));

        let obj = Value::object([("k", 3)]);
        assert_eq!(obj.lookup("k"), Some(Value::from(3)));
        assert_eq!(Value::from(3).lookup("k"), None);
        assert_eq!((&obj).lookup("k"), Some(Value::from(3)));
    }
}
