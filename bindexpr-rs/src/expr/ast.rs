//! Abstract syntax tree produced by the parser.
//!
//! Trees are immutable once built and hold no reference to the source text,
//! so one tree can be evaluated any number of times, from any thread.

use std::fmt;

use super::value::Value;

/// Binary operators, loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 16] = [
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::StrictEq,
        BinaryOp::StrictNe,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
        BinaryOp::Pow,
    ];

    /// Longest operator spelling, in characters.
    pub const MAX_LEN: usize = 3;

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Binding strength, 1 (loosest) to 7 (tightest).
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::StrictEq | BinaryOp::StrictNe => 3,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
            BinaryOp::Pow => 7,
        }
    }

    /// Operators whose result is `undefined` when either operand is.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl UnaryOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(UnaryOp::Neg),
            '+' => Some(UnaryOp::Plus),
            '!' => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            UnaryOp::Neg => '-',
            UnaryOp::Plus => '+',
            UnaryOp::Not => '!',
        }
    }
}

/// The property half of a member access.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `object.name`
    Static(String),
    /// `object[expr]`
    Computed(Box<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Number, string, boolean or `undefined`.
    Literal(Value),
    Identifier(String),
    Array(Vec<Node>),
    Unary {
        op: UnaryOp,
        argument: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Conditional {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    Member {
        object: Box<Node>,
        property: Property,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
}

impl Node {
    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Whether a member access reads its property from an expression.
    pub fn is_computed_member(&self) -> bool {
        matches!(
            self,
            Node::Member {
                property: Property::Computed(_),
                ..
            }
        )
    }
}

/// Fully parenthesised rendering; handy for checking how a source grouped.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(Value::Str(s)) if s.contains('"') => write!(f, "'{s}'"),
            Node::Literal(Value::Str(s)) => write!(f, "\"{s}\""),
            Node::Literal(v) => write!(f, "{v}"),
            Node::Identifier(name) => f.write_str(name),
            Node::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Node::Unary { op, argument } => write!(f, "({}{argument})", op.symbol()),
            Node::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Node::Conditional {
                test,
                consequent,
                alternate,
            } => write!(f, "({test} ? {consequent} : {alternate})"),
            Node::Member {
                object,
                property: Property::Static(name),
            } => write!(f, "{object}.{name}"),
            Node::Member {
                object,
                property: Property::Computed(index),
            } => write!(f, "{object}[{index}]"),
            Node::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Node]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
