//! Memoised compilation keyed by source text.

use std::collections::HashMap;

use tracing::debug;

use super::compile::{compile, Expression};
use super::error::ParseError;
use super::template::{compile_string, Template};

/// Compiles each distinct source at most once.
///
/// Failed compiles are not cached; asking again re-reports the error.
#[derive(Debug, Default)]
pub struct Cache {
    expressions: HashMap<String, Expression>,
    templates: HashMap<String, Template>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression(&mut self, source: &str) -> Result<Expression, ParseError> {
        if let Some(expr) = self.expressions.get(source) {
            return Ok(expr.clone());
        }
        debug!(source, "expression cache miss");
        let expr = compile(source)?;
        self.expressions.insert(source.to_owned(), expr.clone());
        Ok(expr)
    }

    pub fn template(&mut self, source: &str) -> Result<Template, ParseError> {
        if let Some(template) = self.templates.get(source) {
            return Ok(template.clone());
        }
        debug!(source, "template cache miss");
        let template = compile_string(source)?;
        self.templates.insert(source.to_owned(), template.clone());
        Ok(template)
    }

    pub fn len(&self) -> usize {
        self.expressions.len() + self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.expressions.clear();
        self.templates.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
