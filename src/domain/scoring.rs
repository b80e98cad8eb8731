//! Scoring expressions over a dataset and ranking them by score.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::domain::dataset::InputPair;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::expression::Expression;

/// Mean evaluation result of `expression` over `pairs`, stored on the expression.
pub fn score(expression: &mut Expression, pairs: &[InputPair]) -> DomainResult<f64> {
    let mean = mean_output(expression, pairs)?;
    expression.set_score(mean);
    Ok(mean)
}

fn mean_output(expression: &Expression, pairs: &[InputPair]) -> DomainResult<f64> {
    if pairs.is_empty() {
        return Err(DomainError::EmptyDataset);
    }
    let sum: f64 = pairs
        .iter()
        .map(|pair| expression.evaluate(pair.a, pair.b))
        .sum();
    Ok(sum / pairs.len() as f64)
}

/// Score every expression. With `parallel`, expressions are spread over the
/// rayon pool; each expression's own sum stays sequential in pair order, so
/// both paths produce identical scores. An empty dataset fails as soon as the
/// first expression is scored.
#[instrument(level = "debug", skip_all, fields(expressions = expressions.len(), pairs = pairs.len()))]
pub fn score_all(
    expressions: &mut [Expression],
    pairs: &[InputPair],
    parallel: bool,
) -> DomainResult<()> {
    if parallel {
        expressions
            .par_iter_mut()
            .try_for_each(|expression| score(expression, pairs).map(|_| ()))
    } else {
        for expression in expressions.iter_mut() {
            let value = score(expression, pairs)?;
            debug!("scored {} = {}", expression, value);
        }
        Ok(())
    }
}

/// Total order on scores: numeric ascending, NaN after every number.
/// Missing scores order like NaN.
pub fn score_ordering(lhs: Option<f64>, rhs: Option<f64>) -> Ordering {
    let lhs = lhs.unwrap_or(f64::NAN);
    let rhs = rhs.unwrap_or(f64::NAN);
    lhs.partial_cmp(&rhs)
        .unwrap_or_else(|| lhs.is_nan().cmp(&rhs.is_nan()))
}

/// Sort by ascending score. The sort is stable: equal scores keep input order.
pub fn rank(mut expressions: Vec<Expression>) -> Vec<Expression> {
    expressions.sort_by(|lhs, rhs| score_ordering(lhs.score(), rhs.score()));
    expressions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::ExpressionBuilder;

    fn build(line: &str) -> Expression {
        ExpressionBuilder::new().build(line).unwrap()
    }

    fn pairs(values: &[(f64, f64)]) -> Vec<InputPair> {
        values.iter().copied().map(InputPair::from).collect()
    }

    #[test]
    fn given_sum_expression_when_scoring_then_mean_of_outputs() {
        let mut expr = build("a b +");
        let value = score(&mut expr, &pairs(&[(1.0, 2.0), (3.0, 4.0)])).unwrap();
        assert_eq!(value, 5.0);
        assert_eq!(expr.score(), Some(5.0));
    }

    #[test]
    fn given_comparison_when_scoring_then_sentinels_average_out() {
        let mut expr = build("a b >");
        let value = score(&mut expr, &pairs(&[(1.0, 2.0), (3.0, 1.0)])).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn given_empty_dataset_when_scoring_then_fails_and_leaves_score_unset() {
        let mut expr = build("a");
        assert_eq!(score(&mut expr, &[]), Err(DomainError::EmptyDataset));
        assert_eq!(expr.score(), None);

        let mut all = vec![build("a"), build("b")];
        assert_eq!(score_all(&mut all, &[], false), Err(DomainError::EmptyDataset));
        assert_eq!(score_all(&mut all, &[], true), Err(DomainError::EmptyDataset));
        assert_eq!(score_all(&mut [], &[], false), Ok(()));
    }

    #[test]
    fn given_parallel_flag_when_scoring_all_then_same_scores_as_sequential() {
        let lines = ["a b +", "a b /", "a abs b -", "a b > 3 *", "0.1 a * b +"];
        let data = pairs(&[(1.0, 2.0), (-3.0, 0.5), (0.3, 0.7), (10.0, -4.0)]);

        let mut sequential: Vec<_> = lines.iter().map(|l| build(l)).collect();
        let mut parallel = sequential.clone();
        score_all(&mut sequential, &data, false).unwrap();
        score_all(&mut parallel, &data, true).unwrap();

        let seq: Vec<_> = sequential.iter().map(|e| e.score().unwrap().to_bits()).collect();
        let par: Vec<_> = parallel.iter().map(|e| e.score().unwrap().to_bits()).collect();
        assert_eq!(seq, par);
    }

    #[test]
    fn given_scored_expressions_when_ranking_then_non_decreasing() {
        let data = pairs(&[(1.0, 2.0), (3.0, 4.0)]);
        let mut all: Vec<_> = ["a b *", "a b -", "a", "b a -", "a b +", "7"]
            .iter()
            .map(|l| build(l))
            .collect();
        score_all(&mut all, &data, false).unwrap();

        let ranked = rank(all);
        let scores: Vec<f64> = ranked.iter().map(|e| e.score().unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{scores:?}");
        assert_eq!(ranked[0].to_string(), "(a-b)");
    }

    #[test]
    fn given_equal_scores_when_ranking_then_input_order_kept() {
        let data = pairs(&[(2.0, 2.0)]);
        let mut all: Vec<_> = ["a", "b", "a b + 2 /", "1"].iter().map(|l| build(l)).collect();
        score_all(&mut all, &data, false).unwrap();

        let rendered: Vec<String> = rank(all).iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["1", "a", "b", "((a+b)/2)"]);
    }

    #[test]
    fn given_nan_and_infinite_scores_when_ranking_then_nan_sinks_to_end() {
        let data = pairs(&[(0.0, 0.0)]);
        let mut all: Vec<_> = ["a b /", "1 a /", "-1 a /", "5"].iter().map(|l| build(l)).collect();
        score_all(&mut all, &data, false).unwrap();

        let rendered: Vec<String> = rank(all).iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["(-1/a)", "5", "(1/a)", "(a/b)"]);
    }

    #[test]
    fn given_signed_zero_when_ordering_then_equal() {
        assert_eq!(score_ordering(Some(-0.0), Some(0.0)), Ordering::Equal);
        assert_eq!(score_ordering(Some(f64::NAN), Some(-f64::NAN)), Ordering::Equal);
        assert_eq!(score_ordering(None, Some(f64::INFINITY)), Ordering::Greater);
        assert_eq!(score_ordering(Some(1.0), None), Ordering::Less);
    }
}
