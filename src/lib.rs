//! Postfix expression trees: build, score over a dataset of `(a, b)` pairs,
//! rank by score and render as fully parenthesized infix.
//!
//! ```
//! use postrank::domain::{rank, score_all, ExpressionBuilder, InputPair};
//!
//! let mut builder = ExpressionBuilder::new();
//! let mut exprs = vec![builder.build("a b +")?, builder.build("a abs")?];
//! let pairs = [InputPair::new(-1.0, 2.0), InputPair::new(3.0, 4.0)];
//! score_all(&mut exprs, &pairs, false)?;
//!
//! let ranked = rank(exprs);
//! assert_eq!(ranked[0].to_string(), "abs(a)");
//! assert_eq!(ranked[0].score(), Some(2.0));
//! # Ok::<(), postrank::domain::DomainError>(())
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
