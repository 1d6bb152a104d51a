//! Compile-time failures.

/// A syntax error. Raised once, while compiling; a compiled expression
/// never fails afterwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at character {index} of \"{expression}\"")]
pub struct ParseError {
    pub message: String,
    /// 0-based character position of the cursor when parsing stopped.
    pub index: usize,
    pub expression: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, index: usize, expression: &str) -> Self {
        ParseError {
            message: message.into(),
            index,
            expression: expression.to_owned(),
        }
    }
}
