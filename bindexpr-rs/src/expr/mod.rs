//! The expression engine.
//!
//! A small, side-effect-free infix expression language for data bindings:
//!
//! - number, string and boolean literals, `undefined`, array literals
//! - `+ - * / % **`, comparisons, `== != === !==`, `&& ||`, prefix `- + !`
//! - `a ? b : c`
//! - member access (`a.b`, `a[expr]`) and calls (`f(x)`, `o.m(x)`)
//!
//! There are no statements, assignments or user-defined functions. Source is
//! parsed once by [`compile`] (or [`compile_string`] for `${…}` templates);
//! the result is evaluated as often as needed against caller-supplied
//! contexts and never fails at that point.
//!
//! # Quick start
//!
//! ```rust
//! use bindexpr::{compile, compile_string, Context, Value};
//!
//! let area = compile("width * height").unwrap();
//! let ctx = Context::new().with("width", 3).with("height", 4);
//! assert_eq!(area.eval(&ctx), Value::from(12));
//!
//! let label = compile_string("Area: ${width * height}").unwrap();
//! assert_eq!(label.render(&ctx), "Area: 12");
//! ```

pub mod ast;
pub mod cache;
pub mod compile;
mod cursor;
pub mod error;
pub mod eval;
pub mod parser;
pub mod template;
pub mod value;

// Re-exports for convenience.
pub use cache::Cache;
pub use compile::{compile, Expression};
pub use error::ParseError;
pub use parser::parse;
pub use template::{compile_string, Template};
pub use value::{Callable, Value};
