//! bindexpr: a safe infix expression language for reactive text and
//! attribute bindings.
//!
//! The crate exposes two entry points: [`compile`] turns an expression
//! source into a reusable [`Expression`], and [`compile_string`] turns a
//! template with `${…}` interpolations into a reusable [`Template`]. Both
//! are evaluated against any [`Scope`], usually a [`Context`].

pub mod cli;
pub mod config;
pub mod context;
pub mod expr;

pub use context::{Context, Scope};
pub use expr::{compile, compile_string, Cache, Callable, Expression, ParseError, Template, Value};
