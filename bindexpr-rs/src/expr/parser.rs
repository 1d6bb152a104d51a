//! Recursive-descent parser with precedence climbing for binary operators.
//!
//! Grammar:
//!
//! ```text
//! expr      := ternary
//! ternary   := binary ('?' expr ':' expr)?
//! binary    := token (binop token)*
//! token     := number | string | array | unary | variable
//! unary     := ('-' | '+' | '!') token
//! variable  := (identifier | '(' expr ')') suffix*
//! suffix    := '.' identifier | '[' expr ']' | '(' args ')'
//! array     := '[' args ']'
//! args      := (expr (',' expr)*)?
//! ```
//!
//! Binary operators, loosest to tightest, all left-associative:
//!   `||`  →  `&&`  →  `== != === !==`  →  `< > <= >=`  →  `+ -`  →
//!   `* / %`  →  `**`

use super::ast::{BinaryOp, Node, Property, UnaryOp};
use super::cursor::{is_ident_start, Cursor};
use super::error::ParseError;
use super::value::Value;

/// Deepest tree the parser will build, counting both bracket nesting and
/// left-leaning operator or suffix chains. Evaluating and dropping a tree
/// recurse once per level, so this bounds their stack use.
pub const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    cursor: Cursor<'a>,
    /// Recursion depth of `parse_expr` and unary operands.
    nesting: usize,
}

/// A parsed subtree and its height (a lone token has height 1).
struct Subtree {
    node: Node,
    height: usize,
}

/// Parse a complete expression.
///
/// Returns `Ok(None)` for empty or whitespace-only input. Any text left over
/// after one full expression is an error, as is a tree deeper than
/// [`MAX_DEPTH`].
pub fn parse(source: &str) -> Result<Option<Node>, ParseError> {
    let mut parser = Parser {
        cursor: Cursor::new(source),
        nesting: 0,
    };
    parser.cursor.skip_ws();
    if parser.cursor.at_end() {
        return Ok(None);
    }
    let tree = parser.parse_expr()?;
    parser.cursor.skip_ws();
    if !parser.cursor.at_end() {
        return Err(parser.cursor.unexpected());
    }
    Ok(Some(tree.node))
}

impl Parser<'_> {
    fn parse_expr(&mut self) -> Result<Subtree, ParseError> {
        self.enter()?;
        let tree = self.parse_conditional()?;
        self.nesting -= 1;
        Ok(tree)
    }

    fn parse_conditional(&mut self) -> Result<Subtree, ParseError> {
        let test = self.parse_binary()?;
        self.cursor.skip_ws();
        if !self.cursor.eat('?') {
            return Ok(test);
        }
        let consequent = self.parse_branch()?;
        self.cursor.skip_ws();
        if !self.cursor.eat(':') {
            return Err(self.cursor.error("expected :"));
        }
        let alternate = self.parse_branch()?;
        let height = test.height.max(consequent.height).max(alternate.height) + 1;
        self.build(
            Node::Conditional {
                test: Box::new(test.node),
                consequent: Box::new(consequent.node),
                alternate: Box::new(alternate.node),
            },
            height,
        )
    }

    fn parse_branch(&mut self) -> Result<Subtree, ParseError> {
        self.cursor.skip_ws();
        if matches!(self.cursor.peek(), None | Some(':')) {
            return Err(self.cursor.error("expected expression"));
        }
        self.parse_expr()
    }

    /// Precedence climbing over parallel operand/operator stacks.
    ///
    /// Invariant: `operands.len() == operators.len() + 1`, and operator
    /// precedence strictly increases from bottom to top of `operators`.
    fn parse_binary(&mut self) -> Result<Subtree, ParseError> {
        let first = self.parse_token()?;
        let Some(op) = self.cursor.read_binary_op() else {
            return Ok(first);
        };
        let second = self.parse_operand(op)?;

        let mut operands = vec![first, second];
        let mut operators = vec![op];

        while let Some(op) = self.cursor.read_binary_op() {
            while matches!(operators.last(), Some(top) if op.precedence() <= top.precedence()) {
                self.fold_top(&mut operands, &mut operators)?;
            }
            let operand = self.parse_operand(op)?;
            operators.push(op);
            operands.push(operand);
        }

        while !operators.is_empty() {
            self.fold_top(&mut operands, &mut operators)?;
        }
        operands
            .pop()
            .ok_or_else(|| self.cursor.error("expression parsing error"))
    }

    /// Pop the top operator and its two operands and push back their
    /// combination.
    fn fold_top(
        &self,
        operands: &mut Vec<Subtree>,
        operators: &mut Vec<BinaryOp>,
    ) -> Result<(), ParseError> {
        if let (Some(op), Some(right), Some(left)) = (operators.pop(), operands.pop(), operands.pop()) {
            let height = left.height.max(right.height) + 1;
            operands.push(self.build(Node::binary(op, left.node, right.node), height)?);
        }
        Ok(())
    }

    fn parse_operand(&mut self, op: BinaryOp) -> Result<Subtree, ParseError> {
        self.cursor.skip_ws();
        if self.cursor.at_end() {
            return Err(self.cursor.error(format!("expected expression after {op}")));
        }
        self.parse_token()
    }

    fn parse_token(&mut self) -> Result<Subtree, ParseError> {
        self.cursor.skip_ws();
        let Some(c) = self.cursor.peek() else {
            return Err(self.cursor.unexpected());
        };
        match c {
            '0'..='9' | '.' => self.cursor.read_number().map(leaf),
            '\'' | '"' => self.cursor.read_string().map(leaf),
            '[' => {
                self.cursor.advance();
                let (elements, height) = self.parse_args(']')?;
                self.build(Node::Array(elements), height + 1)
            }
            _ => {
                if let Some(op) = UnaryOp::from_char(c) {
                    self.cursor.advance();
                    self.enter()?;
                    let argument = self.parse_token()?;
                    self.nesting -= 1;
                    return self.build(
                        Node::Unary {
                            op,
                            argument: Box::new(argument.node),
                        },
                        argument.height + 1,
                    );
                }
                if is_ident_start(c) || c == '(' {
                    return self.parse_variable();
                }
                Err(self.cursor.error("expression parsing error"))
            }
        }
    }

    /// An identifier or parenthesised group, extended by any chain of
    /// `.name`, `[expr]` and `(args)` suffixes.
    fn parse_variable(&mut self) -> Result<Subtree, ParseError> {
        let mut tree = if self.cursor.eat('(') {
            self.parse_group()?
        } else {
            leaf(keyword_or_identifier(self.cursor.read_ident()?))
        };

        loop {
            self.cursor.skip_ws();
            tree = match self.cursor.peek() {
                Some('.') => {
                    self.cursor.advance();
                    self.cursor.skip_ws();
                    let name = self.cursor.read_ident()?;
                    self.build(
                        Node::Member {
                            object: Box::new(tree.node),
                            property: Property::Static(name),
                        },
                        tree.height + 1,
                    )?
                }
                Some('[') => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.cursor.skip_ws();
                    if !self.cursor.eat(']') {
                        return Err(self.cursor.error("unclosed ["));
                    }
                    self.build(
                        Node::Member {
                            object: Box::new(tree.node),
                            property: Property::Computed(Box::new(index.node)),
                        },
                        tree.height.max(index.height) + 1,
                    )?
                }
                Some('(') => {
                    self.cursor.advance();
                    let (args, height) = self.parse_args(')')?;
                    self.build(
                        Node::Call {
                            callee: Box::new(tree.node),
                            args,
                        },
                        tree.height.max(height) + 1,
                    )?
                }
                _ => return Ok(tree),
            };
        }
    }

    /// Body of `( expr )`; the opening paren is already consumed.
    fn parse_group(&mut self) -> Result<Subtree, ParseError> {
        let tree = self.parse_expr()?;
        self.cursor.skip_ws();
        if !self.cursor.eat(')') {
            return Err(self.cursor.error("unclosed ("));
        }
        Ok(tree)
    }

    /// Comma-separated expressions up to `terminator`, with the tallest
    /// height among them; the opening bracket is already consumed. A comma
    /// with no expression before it leaves an `undefined` placeholder, so
    /// `[1,,2]` has three elements.
    fn parse_args(&mut self, terminator: char) -> Result<(Vec<Node>, usize), ParseError> {
        let mut args = Vec::new();
        let mut height = 0;
        let mut separators = 0;
        loop {
            self.cursor.skip_ws();
            match self.cursor.peek() {
                None => return Err(self.cursor.error(format!("expected {terminator}"))),
                Some(c) if c == terminator => {
                    self.cursor.advance();
                    return Ok((args, height));
                }
                Some(',') => {
                    self.cursor.advance();
                    separators += 1;
                    while args.len() < separators {
                        args.push(Node::Literal(Value::Undefined));
                        height = height.max(1);
                    }
                }
                Some(_) => {
                    if args.len() > separators {
                        return Err(self.cursor.error(format!("expected , or {terminator}")));
                    }
                    let arg = self.parse_expr()?;
                    height = height.max(arg.height);
                    args.push(arg.node);
                }
            }
        }
    }

    /// Count one level of recursion, failing before the stack can run out.
    fn enter(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(self.cursor.error("expression too deeply nested"));
        }
        Ok(())
    }

    fn build(&self, node: Node, height: usize) -> Result<Subtree, ParseError> {
        if height > MAX_DEPTH {
            return Err(self.cursor.error("expression too deeply nested"));
        }
        Ok(Subtree { node, height })
    }
}

fn leaf(node: Node) -> Subtree {
    Subtree { node, height: 1 }
}

fn keyword_or_identifier(name: String) -> Node {
    match name.as_str() {
        "true" => Node::Literal(Value::Bool(true)),
        "false" => Node::Literal(Value::Bool(false)),
        "undefined" => Node::Literal(Value::Undefined),
        _ => Node::Identifier(name),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
