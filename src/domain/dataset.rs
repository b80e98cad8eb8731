//! Input pairs: the `(a, b)` values every expression is scored against.

use std::fmt;

use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};

/// One row of the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputPair {
    pub a: f64,
    pub b: f64,
}

impl InputPair {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

impl From<(f64, f64)> for InputPair {
    fn from((a, b): (f64, f64)) -> Self {
        Self { a, b }
    }
}

impl fmt::Display for InputPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Parse one dataset line.
///
/// Blank lines yield `None`. The first two whitespace-separated values are
/// used; anything after them is ignored. `line` is 1-based and only used
/// for error messages.
pub fn parse_pair_line(line: usize, content: &str) -> DomainResult<Option<InputPair>> {
    let mut values = content.split_whitespace();
    let Some(first) = values.next() else {
        return Ok(None);
    };
    let second = values.next().ok_or_else(|| DomainError::InvalidPair {
        line,
        reason: format!("expected two values, found only {first:?}"),
    })?;

    let a = parse_value(line, first)?;
    let b = parse_value(line, second)?;
    Ok(Some(InputPair { a, b }))
}

/// Parse a whole dataset, skipping blank lines.
pub fn parse_pairs(content: &str) -> DomainResult<Vec<InputPair>> {
    let mut pairs = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(pair) = parse_pair_line(idx + 1, line)? {
            trace!("line {}: {}", idx + 1, pair);
            pairs.push(pair);
        }
    }
    Ok(pairs)
}

fn parse_value(line: usize, token: &str) -> DomainResult<f64> {
    token.parse::<f64>().map_err(|e| DomainError::InvalidPair {
        line,
        reason: format!("{token:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_two_values_when_parsing_line_then_returns_pair() {
        assert_eq!(
            parse_pair_line(1, "1 2").unwrap(),
            Some(InputPair::new(1.0, 2.0))
        );
        assert_eq!(
            parse_pair_line(1, "  -3.5\t4e2  ").unwrap(),
            Some(InputPair::new(-3.5, 400.0))
        );
    }

    #[test]
    fn given_extra_values_when_parsing_line_then_ignores_them() {
        assert_eq!(
            parse_pair_line(1, "1 2 3 4").unwrap(),
            Some(InputPair::new(1.0, 2.0))
        );
    }

    #[test]
    fn given_blank_line_when_parsing_then_returns_none() {
        assert_eq!(parse_pair_line(1, "").unwrap(), None);
        assert_eq!(parse_pair_line(1, "   ").unwrap(), None);
    }

    #[test]
    fn given_single_value_when_parsing_then_invalid_pair() {
        let err = parse_pair_line(7, "1.0").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPair { line: 7, .. }));
    }

    #[test]
    fn given_non_numeric_value_when_parsing_then_invalid_pair() {
        let err = parse_pair_line(3, "1 x").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPair { line: 3, .. }));
        assert!(err.to_string().contains("\"x\""));
    }

    #[test]
    fn given_dataset_with_blank_lines_when_parsing_then_keeps_order_and_line_numbers() {
        let pairs = parse_pairs("1 2\n\n3 4\n").unwrap();
        assert_eq!(pairs, vec![InputPair::new(1.0, 2.0), InputPair::new(3.0, 4.0)]);

        let err = parse_pairs("1 2\n\nbad 4\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPair { line: 3, .. }));
    }

    #[test]
    fn given_pair_when_displayed_then_shows_both_values() {
        assert_eq!(InputPair::new(1.0, -2.5).to_string(), "(1, -2.5)");
    }
}
