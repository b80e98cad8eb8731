//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/postrank/postrank.toml`
//! 3. Local config: `<dir>/.postrank.toml` (working directory unless given)
//! 4. Environment variables: `POSTRANK_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.
//!
//! Relative paths in a config file resolve against the directory holding that
//! file. Defaults, environment variables and flags stay relative to the
//! working directory.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for postrank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// File with one postfix expression per line
    pub expressions: PathBuf,
    /// File with one `a b` pair per line
    pub inputs: PathBuf,
    /// Score expressions on the rayon thread pool
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expressions: PathBuf::from("expressions.txt"),
            inputs: PathBuf::from("input.txt"),
            parallel: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub expressions: Option<PathBuf>,
    pub inputs: Option<PathBuf>,
    pub parallel: Option<bool>,
}

/// Get the XDG config directory for postrank.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "postrank").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("postrank.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".postrank.toml")
}

/// Load a TOML file into RawSettings for manual merging.
///
/// Path values come back expanded and anchored at the file's directory.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    let mut raw: RawSettings = toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })?;
    if let Some(base) = path.parent() {
        raw.resolve_paths(base);
    }
    Ok(raw)
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Expand `path`, then join it onto `base` if it is still relative.
fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_relative() {
        base.join(expanded)
    } else {
        expanded
    }
}

impl RawSettings {
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(path) = self.expressions.as_mut() {
            *path = resolve_path(path, base);
        }
        if let Some(path) = self.inputs.as_mut() {
            *path = resolve_path(path, base);
        }
    }
}

impl Settings {

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            expressions: overlay
                .expressions
                .clone()
                .unwrap_or_else(|| self.expressions.clone()),
            inputs: overlay.inputs.clone().unwrap_or_else(|| self.inputs.clone()),
            parallel: overlay.parallel.unwrap_or(self.parallel),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.postrank.toml`; `None` skips the local layer
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Apply POSTRANK_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("POSTRANK").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("expressions") {
            settings.expressions = expand_path(Path::new(&val));
        }
        if let Ok(val) = config.get_string("inputs") {
            settings.inputs = expand_path(Path::new(&val));
        }
        match config.get_bool("parallel") {
            Ok(val) => settings.parallel = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# postrank configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/postrank/postrank.toml
#   Local:  ./.postrank.toml
#   Env:    POSTRANK_* environment variables
#   CLI:    --expressions / --inputs / --parallel
#
# Relative paths resolve against the directory holding this file.

# Postfix expressions, one per line
# expressions = "expressions.txt"

# Input pairs "a b", one per line
# inputs = "input.txt"

# Score expressions on all cores
# parallel = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
