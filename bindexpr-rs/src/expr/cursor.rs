//! Character cursor and on-demand tokenizer.
//!
//! There is no separate token stream: the parser asks the cursor for the
//! next literal, identifier or operator at the current position and the
//! cursor either advances past it or fails.

use super::ast::{BinaryOp, Node};
use super::error::ParseError;
use super::value::Value;

pub(crate) struct Cursor<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Cursor {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.pos += 1;
        }
    }

    /// A [`ParseError`] at the current position.
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    pub fn error_at(&self, index: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(message, index, self.source)
    }

    /// Error for a character the grammar cannot accept here.
    pub fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(c) => self.error(format!("unexpected character \"{c}\"")),
            None => self.error("unexpected end of expression"),
        }
    }

    fn text(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// `digits [. digits]`, also accepting a leading `.` (`.5`).
    pub fn read_number(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.skip_digits();
        if self.eat('.') {
            self.skip_digits();
        }
        let text = self.text(start);

        match self.peek() {
            Some(c) if is_ident_start(c) => {
                return Err(self.error(format!(
                    "variable names cannot start with a number ({text}{c})"
                )));
            }
            Some('.') => return Err(self.error("unexpected period")),
            _ => {}
        }

        text.parse::<f64>()
            .map(|n| Node::Literal(Value::Number(n)))
            .map_err(|_| self.error_at(start, "unexpected period"))
    }

    /// Quoted text. A backslash keeps the next character from closing the
    /// literal but is otherwise copied through untouched.
    pub fn read_string(&mut self) -> Result<Node, ParseError> {
        let Some(quote) = self.advance() else {
            return Err(self.unexpected());
        };
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error(format!("unclosed quote after \"{s}\""))),
                Some('\\') => {
                    s.push('\\');
                    if let Some(c) = self.advance() {
                        s.push(c);
                    }
                }
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
            }
        }
        Ok(Node::Literal(Value::Str(s)))
    }

    pub fn read_ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => self.pos += 1,
            _ => return Err(self.unexpected()),
        }
        while matches!(self.peek(), Some(c) if is_ident_part(c)) {
            self.pos += 1;
        }
        Ok(self.text(start))
    }

    /// Longest operator at the cursor, trying 3, 2 then 1 characters.
    pub fn read_binary_op(&mut self) -> Option<BinaryOp> {
        self.skip_ws();
        for len in (1..=BinaryOp::MAX_LEN).rev() {
            let end = self.pos + len;
            if end > self.chars.len() {
                continue;
            }
            let candidate: String = self.chars[self.pos..end].iter().collect();
            if let Some(op) = BinaryOp::from_symbol(&candidate) {
                self.pos = end;
                return Some(op);
            }
        }
        None
    }
}

fn is_greek(c: char) -> bool {
    matches!(c, 'Α'..='Ω' | 'α'..='ω')
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '$' || c == '_' || is_greek(c)
}

pub(crate) fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn number(src: &str) -> Result<Node, ParseError> {
        Cursor::new(src).read_number()
    }

    #[test]
    fn numbers() {
        assert_eq!(number("42").unwrap(), Node::Literal(Value::Number(42.0)));
        assert_eq!(number("3.5").unwrap(), Node::Literal(Value::Number(3.5)));
        assert_eq!(number(".5").unwrap(), Node::Literal(Value::Number(0.5)));
        assert_eq!(number("7.").unwrap(), Node::Literal(Value::Number(7.0)));
    }

    #[test]
    fn number_followed_by_letter() {
        let err = number("1a").unwrap_err();
        assert!(err.message.contains("variable names cannot start with a number"));
        assert_eq!(err.index, 1);
    }

    #[test]
    fn stray_periods() {
        assert_eq!(number("1.2.3").unwrap_err().message, "unexpected period");
        assert_eq!(number(".").unwrap_err().message, "unexpected period");
    }

    #[test]
    fn strings() {
        let mut c = Cursor::new("'it''s'");
        assert_eq!(c.read_string().unwrap(), Node::Literal(Value::from("it")));
        assert_eq!(c.read_string().unwrap(), Node::Literal(Value::from("s")));

        let mut c = Cursor::new(r#""a\"b""#);
        assert_eq!(c.read_string().unwrap(), Node::Literal(Value::from(r#"a\"b"#)));
        assert!(c.at_end());
    }

    #[test]
    fn unclosed_string() {
        let err = Cursor::new("'abc").read_string().unwrap_err();
        assert!(err.message.starts_with("unclosed quote"));
        assert_eq!(err.index, 4);
    }

    #[test]
    fn identifiers() {
        let mut c = Cursor::new("$x_1 + y");
        assert_eq!(c.read_ident().unwrap(), "$x_1");
        assert_eq!(Cursor::new("θ2").read_ident().unwrap(), "θ2");
        assert!(Cursor::new("9x").read_ident().is_err());
    }

    #[test]
    fn binary_ops_are_greedy() {
        let mut c = Cursor::new(" !== ** <= < -");
        assert_eq!(c.read_binary_op(), Some(BinaryOp::StrictNe));
        assert_eq!(c.read_binary_op(), Some(BinaryOp::Pow));
        assert_eq!(c.read_binary_op(), Some(BinaryOp::Le));
        assert_eq!(c.read_binary_op(), Some(BinaryOp::Lt));
        assert_eq!(c.read_binary_op(), Some(BinaryOp::Sub));
        assert_eq!(c.read_binary_op(), None);
    }

    #[test]
    fn no_binary_op() {
        let mut c = Cursor::new("= 1");
        assert_eq!(c.read_binary_op(), None);
        assert_eq!(c.peek(), Some('='));
    }
}
