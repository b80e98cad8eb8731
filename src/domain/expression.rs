//! Expression tree data model.
//!
//! Every node owns its children; a tree built from N tokens has N nodes.
//! Only the score changes after construction.

use std::fmt;
use std::str::FromStr;

use crate::domain::evaluator;
use crate::domain::render;

/// One of the two free variables an expression is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    A,
    B,
}

impl Variable {
    pub fn name(&self) -> &'static str {
        match self {
            Variable::A => "a",
            Variable::B => "b",
        }
    }
}

/// Leaf payload, fixed at build time.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Variable(Variable),
    /// Numeric literal; `text` is the token as written, used for rendering.
    Literal { value: f64, text: String },
}

impl Operand {
    /// Source text of the operand.
    pub fn text(&self) -> &str {
        match self {
            Operand::Variable(var) => var.name(),
            Operand::Literal { text, .. } => text,
        }
    }
}

/// The fixed operator set, as it appears in postfix tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Abs,
    Add,
    Sub,
    Mul,
    Div,
    Gt,
}

/// Operators taking one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Abs,
}

/// Operators taking two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
}

/// An operator split by arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Abs,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Gt,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Abs => "abs",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Gt => ">",
        }
    }

    pub fn kind(&self) -> OperatorKind {
        match self {
            Operator::Abs => OperatorKind::Unary(UnaryOp::Abs),
            Operator::Add => OperatorKind::Binary(BinaryOp::Add),
            Operator::Sub => OperatorKind::Binary(BinaryOp::Sub),
            Operator::Mul => OperatorKind::Binary(BinaryOp::Mul),
            Operator::Div => OperatorKind::Binary(BinaryOp::Div),
            Operator::Gt => OperatorKind::Binary(BinaryOp::Gt),
        }
    }

    /// Number of operands consumed from the build stack.
    pub fn arity(&self) -> usize {
        match self.kind() {
            OperatorKind::Unary(_) => 1,
            OperatorKind::Binary(_) => 2,
        }
    }

    /// Recognize an operator token; anything else is an operand.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == token)
    }
}

impl From<UnaryOp> for Operator {
    fn from(op: UnaryOp) -> Self {
        match op {
            UnaryOp::Abs => Operator::Abs,
        }
    }
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => Operator::Add,
            BinaryOp::Sub => Operator::Sub,
            BinaryOp::Mul => Operator::Mul,
            BinaryOp::Div => Operator::Div,
            BinaryOp::Gt => Operator::Gt,
        }
    }
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        Operator::from(*self).symbol()
    }
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        Operator::from(*self).symbol()
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or(())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expression tree node.
///
/// Unary and binary operators are separate variants so a node can never
/// carry the wrong number of children.
///
/// Trees can be as deep as their token count. `count`, `depth`, dropping,
/// evaluation and rendering walk an explicit stack; the derived `Clone`,
/// `PartialEq` and `Debug` still recurse.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Operand(Operand),
    Unary {
        op: UnaryOp,
        child: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Operand(_))
    }

    /// Node label: operand text or operator symbol.
    pub fn label(&self) -> &str {
        match self {
            Node::Operand(operand) => operand.text(),
            Node::Unary { op, .. } => op.symbol(),
            Node::Binary { op, .. } => op.symbol(),
        }
    }

    /// Direct children, left before right.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        let (first, second) = match self {
            Node::Operand(_) => (None, None),
            Node::Unary { child, .. } => (Some(child.as_ref()), None),
            Node::Binary { left, right, .. } => (Some(left.as_ref()), Some(right.as_ref())),
        };
        first.into_iter().chain(second)
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// Number of levels; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            depth = depth.max(level);
            stack.extend(node.children().map(|child| (child, level + 1)));
        }
        depth
    }

    /// Move non-leaf children out into `out`, leaving leaves in their place.
    fn detach_subtrees(&mut self, out: &mut Vec<Node>) {
        let mut detach = |slot: &mut Box<Node>| {
            if !slot.is_leaf() {
                out.push(std::mem::replace(slot.as_mut(), placeholder()));
            }
        };
        match self {
            Node::Operand(_) => {}
            Node::Unary { child, .. } => detach(child),
            Node::Binary { left, right, .. } => {
                detach(left);
                detach(right);
            }
        }
    }
}

fn placeholder() -> Node {
    Node::Operand(Operand::Variable(Variable::A))
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_subtrees(&mut pending);
        while let Some(mut node) = pending.pop() {
            // `node` only has leaf children left when it drops here
            node.detach_subtrees(&mut pending);
        }
    }
}

/// A built expression together with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Node,
    size: usize,
    score: Option<f64>,
}

impl Expression {
    pub(crate) fn new(root: Node) -> Self {
        let size = root.count();
        Self {
            root,
            size,
            score: None,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Node count; equals the number of tokens the tree was built from.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Mean evaluation result, `None` until scored.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub(crate) fn set_score(&mut self, score: f64) {
        self.score = Some(score);
    }

    pub fn evaluate(&self, a: f64, b: f64) -> f64 {
        evaluator::evaluate(&self.root, a, b)
    }

    /// Fully parenthesized infix form.
    pub fn render(&self) -> String {
        render::render(&self.root)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(v: Variable) -> Node {
        Node::Operand(Operand::Variable(v))
    }

    #[test]
    fn given_operator_tokens_when_recognized_then_roundtrip_symbol() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_token(op.symbol()), Some(op));
            assert_eq!(op.symbol().parse::<Operator>(), Ok(op));
        }
        assert_eq!(Operator::from_token("a"), None);
        assert_eq!(Operator::from_token("ABS"), None);
        assert_eq!(Operator::from_token("sqrt"), None);
    }

    #[test]
    fn given_operators_when_arity_then_only_abs_is_unary() {
        assert_eq!(Operator::Abs.arity(), 1);
        assert_eq!(Operator::Abs.kind(), OperatorKind::Unary(UnaryOp::Abs));
        for op in [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div, Operator::Gt] {
            assert_eq!(op.arity(), 2, "{op}");
            match op.kind() {
                OperatorKind::Binary(binary) => assert_eq!(Operator::from(binary), op),
                OperatorKind::Unary(_) => panic!("{op} classified as unary"),
            }
        }
    }

    #[test]
    fn given_deep_chain_when_counting_and_dropping_then_no_recursion() {
        let mut node = var(Variable::A);
        for _ in 0..200_000 {
            node = Node::Unary {
                op: UnaryOp::Abs,
                child: Box::new(node),
            };
        }
        node = Node::Binary {
            op: BinaryOp::Add,
            left: Box::new(node),
            right: Box::new(var(Variable::B)),
        };

        assert_eq!(node.count(), 200_002);
        assert_eq!(node.depth(), 200_002);
        drop(node);
    }

    #[test]
    fn given_nested_nodes_when_counting_then_matches_structure() {
        let node = Node::Unary {
            op: UnaryOp::Abs,
            child: Box::new(Node::Binary {
                op: BinaryOp::Sub,
                left: Box::new(var(Variable::A)),
                right: Box::new(var(Variable::B)),
            }),
        };
        let expr = Expression::new(node);

        assert_eq!(expr.size(), 4);
        assert_eq!(expr.depth(), 3);
        assert_eq!(expr.score(), None);
        assert_eq!(expr.root().label(), "abs");
        let labels: Vec<&str> = expr.root().children().map(Node::label).collect();
        assert_eq!(labels, vec!["-"]);
    }

    #[test]
    fn given_literal_operand_when_text_then_returns_source_token() {
        let operand = Operand::Literal {
            value: 2.5,
            text: "2.50".to_string(),
        };
        assert_eq!(operand.text(), "2.50");
        assert!(Node::Operand(operand).is_leaf());
    }
}
