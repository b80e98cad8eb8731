//! Domain layer: expression trees and the algorithms over them
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod render;
pub mod scoring;

pub use arena::{Position, PositionalTree};
pub use builder::ExpressionBuilder;
pub use dataset::{parse_pair_line, parse_pairs, InputPair};
pub use error::{DomainError, DomainResult};
pub use evaluator::evaluate;
pub use expression::{BinaryOp, Expression, Node, Operand, Operator, OperatorKind, UnaryOp, Variable};
pub use render::render;
pub use scoring::{rank, score, score_all, score_ordering};
