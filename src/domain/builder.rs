//! Stack-machine builder turning postfix tokens into expression trees.

use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::expression::{Expression, Node, Operand, Operator, OperatorKind, Variable};

/// Constructs expression trees from postfix token sequences.
///
/// The stack is kept between builds so its allocation is reused; it is
/// cleared at the start of every build.
#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    stack: Vec<Node>,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Build one expression from a whitespace-delimited postfix line.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&mut self, line: &str) -> DomainResult<Expression> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        self.build_tokens(&tokens)
    }

    /// Build one expression from already split tokens.
    pub fn build_tokens(&mut self, tokens: &[&str]) -> DomainResult<Expression> {
        self.stack.clear();

        for &token in tokens {
            let node = match Operator::from_token(token) {
                Some(op) => self.reduce(op)?,
                None => Node::Operand(parse_operand(token)?),
            };
            trace!("push {:?}, depth {}", node.label(), self.stack.len() + 1);
            self.stack.push(node);
        }

        if self.stack.len() != 1 {
            let remaining = self.stack.len();
            self.stack.clear();
            return Err(DomainError::MalformedExpression { remaining });
        }

        let root = self
            .stack
            .pop()
            .ok_or(DomainError::MalformedExpression { remaining: 0 })?;
        let expression = Expression::new(root);
        debug_assert_eq!(expression.size(), tokens.len());
        Ok(expression)
    }

    /// Pop the operator's operands and combine them into one node.
    fn reduce(&mut self, op: Operator) -> DomainResult<Node> {
        let available = self.stack.len();
        if available < op.arity() {
            self.stack.clear();
            return Err(DomainError::InsufficientOperands {
                operator: op.symbol().to_string(),
                required: op.arity(),
                available,
            });
        }

        let node = match op.kind() {
            OperatorKind::Unary(op) => {
                let child = self.pop_operand()?;
                Node::Unary {
                    op,
                    child: Box::new(child),
                }
            }
            OperatorKind::Binary(op) => {
                // Last pushed is the right-hand side.
                let right = self.pop_operand()?;
                let left = self.pop_operand()?;
                Node::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        };
        Ok(node)
    }

    fn pop_operand(&mut self) -> DomainResult<Node> {
        self.stack
            .pop()
            .ok_or(DomainError::MalformedExpression { remaining: 0 })
    }
}

/// Interpret an operand token: a variable name or a numeric literal.
pub fn parse_operand(token: &str) -> DomainResult<Operand> {
    match token {
        "a" => Ok(Operand::Variable(Variable::A)),
        "b" => Ok(Operand::Variable(Variable::B)),
        _ => token
            .parse::<f64>()
            .map(|value| Operand::Literal {
                value,
                text: token.to_string(),
            })
            .map_err(|_| DomainError::NumericLiteral {
                token: token.to_string(),
            }),
    }
}
