//! Expression ranking service
//!
//! Runs the batch pipeline: build every expression, score each one over the
//! input pairs, sort by score, and render the results.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{self, Expression, ExpressionBuilder, InputPair};
use crate::infrastructure::traits::FileSystem;

/// One line of ranked output.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedExpression {
    /// Fully parenthesized infix form
    pub rendered: String,
    /// Mean output over the dataset
    pub score: f64,
}

impl RankedExpression {
    fn from_scored(expression: &Expression) -> ApplicationResult<Self> {
        let score = expression.score().ok_or_else(|| ApplicationError::OperationFailed {
            context: format!("expression {expression} was never scored"),
            source: "missing score".into(),
        })?;
        Ok(Self {
            rendered: expression.render(),
            score,
        })
    }
}

impl fmt::Display for RankedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exp {} Score {}", self.rendered, self.score)
    }
}

/// Service for building, scoring and ranking expressions.
pub struct RankingService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl RankingService {
    /// Create a new ranking service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Build one expression per non-empty line.
    ///
    /// The first malformed line aborts the whole batch; the error carries
    /// its 1-based line number and text.
    pub fn build_expressions(&self, content: &str) -> ApplicationResult<Vec<Expression>> {
        let mut builder = ExpressionBuilder::new();
        let mut expressions = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let expression = builder
                .build(line)
                .map_err(|source| ApplicationError::Expression {
                    line: idx + 1,
                    text: line.to_string(),
                    source,
                })?;
            expressions.push(expression);
        }
        debug!("build_expressions: built {} expressions", expressions.len());
        Ok(expressions)
    }

    /// Parse the input pairs dataset.
    pub fn parse_pairs(&self, content: &str) -> ApplicationResult<Vec<InputPair>> {
        let pairs =
            domain::parse_pairs(content).map_err(|source| ApplicationError::Dataset { source })?;
        debug!("parse_pairs: read {} pairs", pairs.len());
        Ok(pairs)
    }

    /// Read and build the expressions file.
    pub fn load_expressions(&self, path: &Path) -> ApplicationResult<Vec<Expression>> {
        debug!("load_expressions: path={}", path.display());
        let content = self.read(path, "read expressions")?;
        self.build_expressions(&content)
    }

    /// Read and parse the input pairs file.
    pub fn load_pairs(&self, path: &Path) -> ApplicationResult<Vec<InputPair>> {
        debug!("load_pairs: path={}", path.display());
        let content = self.read(path, "read input pairs")?;
        self.parse_pairs(&content)
    }

    /// Score, sort and render already built expressions.
    #[instrument(level = "debug", skip_all)]
    pub fn rank_expressions(
        &self,
        mut expressions: Vec<Expression>,
        pairs: &[InputPair],
    ) -> ApplicationResult<Vec<RankedExpression>> {
        domain::score_all(&mut expressions, pairs, self.settings.parallel)?;
        domain::rank(expressions)
            .iter()
            .map(RankedExpression::from_scored)
            .collect()
    }

    /// Full pipeline over in-memory sources.
    ///
    /// Every expression is built before the pairs are parsed, so a build
    /// error is reported before any score is computed.
    pub fn rank_sources(
        &self,
        expressions: &str,
        pairs: &str,
    ) -> ApplicationResult<Vec<RankedExpression>> {
        let expressions = self.build_expressions(expressions)?;
        let pairs = self.parse_pairs(pairs)?;
        self.rank_expressions(expressions, &pairs)
    }

    /// Full pipeline over files.
    #[instrument(level = "debug", skip(self))]
    pub fn rank_files(
        &self,
        expressions: &Path,
        pairs: &Path,
    ) -> ApplicationResult<Vec<RankedExpression>> {
        let expressions = self.load_expressions(expressions)?;
        let pairs = self.load_pairs(pairs)?;
        info!(
            "ranking {} expressions over {} pairs",
            expressions.len(),
            pairs.len()
        );
        self.rank_expressions(expressions, &pairs)
    }

    /// Full pipeline over the configured files.
    pub fn rank(&self) -> ApplicationResult<Vec<RankedExpression>> {
        self.rank_files(&self.settings.expressions, &self.settings.inputs)
    }

    fn read(&self, path: &Path, action: &str) -> ApplicationResult<String> {
        if self.fs.exists(path) && !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("{}: {}", action, path.display()),
                source: Box::new(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "not a regular file",
                )),
            });
        }
        self.fs.read_to_string(path).with_path_context(action, path)
    }
}
