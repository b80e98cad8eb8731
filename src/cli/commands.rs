//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{ExpressionBuilder, PositionalTree};
use crate::infrastructure::{InfraError, InfraResult, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;
    match &cli.command {
        None => rank(&config_dir, None, None, false),
        Some(Commands::Rank {
            expressions,
            inputs,
            parallel,
        }) => rank(
            &config_dir,
            expressions.as_deref(),
            inputs.as_deref(),
            *parallel,
        ),
        Some(Commands::Eval { expression, a, b }) => eval(expression, *a, *b),
        Some(Commands::Render { expression }) => render(expression),
        Some(Commands::Tree { expression }) => tree(expression),
        Some(Commands::Config { command }) => config(&config_dir, command),
        Some(Commands::Completion { shell }) => completion(*shell),
    }
}

fn resolve_config_dir(dir: Option<&Path>) -> CliResult<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("determine working directory", e))),
    }
}

#[instrument]
fn rank(
    config_dir: &Path,
    expressions: Option<&Path>,
    inputs: Option<&Path>,
    parallel: bool,
) -> CliResult<()> {
    let mut settings = Settings::load(Some(config_dir))?;
    if let Some(path) = expressions {
        settings.expressions = path.to_path_buf();
    }
    if let Some(path) = inputs {
        settings.inputs = path.to_path_buf();
    }
    settings.parallel |= parallel;
    debug!("rank: settings={:?}", settings);

    let container = ServiceContainer::new(settings);
    for ranked in container.ranking_service().rank()? {
        output::info(&ranked);
    }
    Ok(())
}

#[instrument]
fn eval(expression: &str, a: f64, b: f64) -> CliResult<()> {
    let expression = ExpressionBuilder::new().build(expression)?;
    output::info(&expression.evaluate(a, b));
    Ok(())
}

#[instrument]
fn render(expression: &str) -> CliResult<()> {
    let expression = ExpressionBuilder::new().build(expression)?;
    output::info(&expression);
    Ok(())
}

/// Deepest tree `tree` will draw.
const TREE_DISPLAY_DEPTH_LIMIT: usize = 512;

#[instrument]
fn tree(expression: &str) -> CliResult<()> {
    let expression = ExpressionBuilder::new().build(expression)?;
    check_display_depth(expression.depth())?;
    let tree = PositionalTree::from(&expression);
    debug!("tree: size={}, depth={}", tree.size(), tree.depth());
    print!("{}", tree.to_tree_string());
    Ok(())
}

fn check_display_depth(depth: usize) -> CliResult<()> {
    if depth > TREE_DISPLAY_DEPTH_LIMIT {
        return Err(CliError::Usage(format!(
            "expression too deep to draw (depth {depth}, limit {TREE_DISPLAY_DEPTH_LIMIT}), use `render` instead"
        )));
    }
    Ok(())
}

#[instrument]
fn config(config_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(config_dir))?;
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(config_dir)
            };
            let container = ServiceContainer::new(Settings::default());
            if container.fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            write_template(&container, &path)?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", "<unavailable>"),
            }
            output::action("local", &local_config_path(config_dir).display());
            Ok(())
        }
    }
}

fn write_template(container: &ServiceContainer, path: &Path) -> InfraResult<()> {
    container
        .fs
        .ensure_parent(path)
        .and_then(|_| container.fs.write(path, &Settings::template()))
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
}

fn completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_deep_expression_when_drawing_tree_then_usage_error() {
        let line = format!("a{}", " abs".repeat(TREE_DISPLAY_DEPTH_LIMIT));

        let err = tree(&line).unwrap_err();

        assert_eq!(err.exit_code(), exitcode::USAGE);
        assert!(err.to_string().contains("too deep"));
    }

    #[test]
    fn given_depth_at_limit_when_checking_then_allowed() {
        assert!(check_display_depth(TREE_DISPLAY_DEPTH_LIMIT).is_ok());
        assert!(check_display_depth(TREE_DISPLAY_DEPTH_LIMIT + 1).is_err());
    }
}
