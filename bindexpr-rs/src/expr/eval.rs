//! Tree-walking evaluator.
//!
//! Evaluation is total: a missing name, a missing member, a call on
//! something that is not a function all produce [`Value::Undefined`]
//! instead of an error, so bindings can run against half-loaded data.
//!
//! Evaluation is also eager. Both operands of `||` and `&&`, both branches
//! of `?:` and every call argument are always evaluated, even when the
//! result does not need them. A reactive caller that records which names an
//! evaluation touched therefore sees every dependency of the expression, not
//! just those on the branch that happened to be live. Context functions with
//! side effects will observe calls that short-circuit evaluation would skip.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::trace;

use super::ast::{BinaryOp, Node, Property, UnaryOp};
use super::value::Value;
use crate::context::Scope;

/// Evaluate `node` against `scope`.
pub fn eval_node<S: Scope + ?Sized>(node: &Node, scope: &S) -> Value {
    eval_with_receiver(node, scope).0
}

/// Evaluate `node`, also returning the object a member access read from.
///
/// The receiver is what a following call binds as `this`: for `a.b()` the
/// callee `a.b` evaluates to `(a.b, Some(a))`.
fn eval_with_receiver<S: Scope + ?Sized>(node: &Node, scope: &S) -> (Value, Option<Value>) {
    match node {
        Node::Literal(v) => (v.clone(), None),

        Node::Identifier(name) => (scope.lookup(name).unwrap_or_default(), None),

        Node::Array(elements) => {
            let items: Vec<Value> = elements.iter().map(|e| eval_node(e, scope)).collect();
            if items.iter().any(Value::is_undefined) {
                return (Value::Undefined, None);
            }
            (Value::Array(Arc::new(items)), None)
        }

        Node::Unary { op, argument } => {
            let v = eval_node(argument, scope);
            if v.is_undefined() {
                return (Value::Undefined, None);
            }
            let result = match op {
                UnaryOp::Neg => Value::Number(-v.to_number()),
                UnaryOp::Plus => Value::Number(v.to_number()),
                UnaryOp::Not => Value::Bool(!v.is_truthy()),
            };
            (result, None)
        }

        Node::Binary { op, left, right } => {
            let l = eval_node(left, scope);
            let r = eval_node(right, scope);
            (eval_binop(*op, l, r), None)
        }

        Node::Conditional {
            test,
            consequent,
            alternate,
        } => {
            let then = eval_node(consequent, scope);
            let else_ = eval_node(alternate, scope);
            let chosen = if eval_node(test, scope).is_truthy() {
                then
            } else {
                else_
            };
            (chosen, None)
        }

        Node::Member { object, property } => {
            let obj = eval_node(object, scope);
            if obj.is_undefined() {
                return (Value::Undefined, None);
            }
            let value = match property {
                Property::Static(name) => obj.get_member(name),
                Property::Computed(key) => obj.get_member(&eval_node(key, scope).to_string()),
            };
            (value, Some(obj))
        }

        Node::Call { callee, args } => {
            let (target, receiver) = eval_with_receiver(callee, scope);
            let args: Vec<Value> = args.iter().map(|a| eval_node(a, scope)).collect();
            let Value::Function(f) = &target else {
                trace!(callee = %callee, kind = target.type_name(), "call target is not a function");
                return (Value::Undefined, None);
            };
            if args.iter().any(Value::is_undefined) {
                trace!(callee = %callee, "call skipped: undefined argument");
                return (Value::Undefined, None);
            }
            (f.call(&receiver.unwrap_or_default(), &args), None)
        }
    }
}

fn eval_binop(op: BinaryOp, l: Value, r: Value) -> Value {
    if op.is_arithmetic() && (l.is_undefined() || r.is_undefined()) {
        return Value::Undefined;
    }
    match op {
        BinaryOp::Or => {
            if l.is_truthy() {
                l
            } else {
                r
            }
        }
        BinaryOp::And => {
            if l.is_truthy() {
                r
            } else {
                l
            }
        }

        BinaryOp::Eq => Value::Bool(l.loose_eq(&r)),
        BinaryOp::Ne => Value::Bool(!l.loose_eq(&r)),
        BinaryOp::StrictEq => Value::Bool(l.strict_eq(&r)),
        BinaryOp::StrictNe => Value::Bool(!l.strict_eq(&r)),

        BinaryOp::Lt => Value::Bool(l.compare(&r) == Some(Ordering::Less)),
        BinaryOp::Gt => Value::Bool(l.compare(&r) == Some(Ordering::Greater)),
        BinaryOp::Le => Value::Bool(matches!(
            l.compare(&r),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Ge => Value::Bool(matches!(
            l.compare(&r),
            Some(Ordering::Greater | Ordering::Equal)
        )),

        BinaryOp::Add => l.concat_or_add(&r),
        BinaryOp::Sub => Value::Number(l.to_number() - r.to_number()),
        BinaryOp::Mul => Value::Number(l.to_number() * r.to_number()),
        BinaryOp::Div => Value::Number(l.to_number() / r.to_number()),
        BinaryOp::Rem => Value::Number(l.to_number() % r.to_number()),
        BinaryOp::Pow => Value::Number(power(l.to_number(), r.to_number())),
    }
}

/// `**`. Differs from `f64::powf` only where the two disagree on `NaN`.
fn power(base: f64, exp: f64) -> f64 {
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        f64::NAN
    } else {
        base.powf(exp)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
