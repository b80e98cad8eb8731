//! Evaluation of expression trees against the two variables.

use crate::domain::expression::{BinaryOp, Node, Operand, UnaryOp, Variable};

enum Step<'a> {
    Visit(&'a Node),
    Unary(UnaryOp),
    Binary(BinaryOp),
}

/// Evaluate `node` with `a` and `b` bound to the two variables.
///
/// Division follows IEEE-754: dividing by zero yields an infinity or NaN,
/// which propagates as an ordinary value. `>` encodes its result as
/// `1.0` (true) or `-1.0` (false).
///
/// Runs in post-order on an explicit stack, so the call depth does not grow
/// with the tree.
pub fn evaluate(node: &Node, a: f64, b: f64) -> f64 {
    let mut steps = vec![Step::Visit(node)];
    let mut values: Vec<f64> = Vec::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(Node::Operand(operand)) => values.push(operand_value(operand, a, b)),
            Step::Visit(Node::Unary { op, child }) => {
                steps.push(Step::Unary(*op));
                steps.push(Step::Visit(child));
            }
            Step::Visit(Node::Binary { op, left, right }) => {
                steps.push(Step::Binary(*op));
                steps.push(Step::Visit(right));
                steps.push(Step::Visit(left));
            }
            Step::Unary(op) => {
                let value = pop(&mut values);
                values.push(apply_unary(op, value));
            }
            Step::Binary(op) => {
                let rhs = pop(&mut values);
                let lhs = pop(&mut values);
                values.push(apply_binary(op, lhs, rhs));
            }
        }
    }

    debug_assert_eq!(values.len(), 1);
    pop(&mut values)
}

// Every operator step runs after its operand steps pushed their values.
fn pop(values: &mut Vec<f64>) -> f64 {
    values.pop().unwrap_or(f64::NAN)
}

fn operand_value(operand: &Operand, a: f64, b: f64) -> f64 {
    match operand {
        Operand::Variable(Variable::A) => a,
        Operand::Variable(Variable::B) => b,
        Operand::Literal { value, .. } => *value,
    }
}

fn apply_unary(op: UnaryOp, value: f64) -> f64 {
    match op {
        UnaryOp::Abs => value.abs(),
    }
}

fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> f64 {
    match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div => lhs / rhs,
        BinaryOp::Gt => {
            if lhs > rhs {
                1.0
            } else {
                -1.0
            }
        }
    }
}
