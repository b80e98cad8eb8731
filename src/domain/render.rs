//! Fully parenthesized infix rendering.

use crate::domain::expression::Node;

enum Piece<'a> {
    Node(&'a Node),
    Text(&'static str),
}

/// Render `node` as infix text.
///
/// Leaves print verbatim, `abs` prints as `abs(..)`, and every binary node
/// is wrapped in parentheses with no spaces around the operator.
pub fn render(node: &Node) -> String {
    let mut out = String::new();
    let mut pieces = vec![Piece::Node(node)];

    // Pieces are pushed in reverse so they pop in print order
    while let Some(piece) = pieces.pop() {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Node(Node::Operand(operand)) => out.push_str(operand.text()),
            Piece::Node(Node::Unary { op, child }) => {
                out.push_str(op.symbol());
                out.push('(');
                pieces.push(Piece::Text(")"));
                pieces.push(Piece::Node(child));
            }
            Piece::Node(Node::Binary { op, left, right }) => {
                out.push('(');
                pieces.push(Piece::Text(")"));
                pieces.push(Piece::Node(right));
                pieces.push(Piece::Text(op.symbol()));
                pieces.push(Piece::Node(left));
            }
        }
    }
    out
}
