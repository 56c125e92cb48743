//! Parser settings loaded from `retrace.toml`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use retrace_syntax::{EmptyLoopPolicy, ParserConfig};
use serde::Deserialize;
use tracing::warn;

pub(crate) const CONFIG_FILES: &[&str] = &["retrace.toml", ".retrace.toml"];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    parser: ParserSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParserSection {
    max_depth: Option<usize>,
    empty_loop: Option<String>,
    debug_checks: Option<bool>,
}

/// Loads settings from an explicit path. Any failure is an error.
pub fn load_from(path: &Path) -> anyhow::Result<ParserConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    from_contents(&contents).with_context(|| format!("invalid config {}", path.display()))
}

/// Looks for a config file in `root`. A missing file yields the defaults;
/// an unreadable or invalid one is reported and ignored.
pub fn discover(root: &Path) -> ParserConfig {
    let Some(path) = find_config_file(root) else {
        return ParserConfig::default();
    };
    let Ok(contents) = std::fs::read_to_string(&path) else {
        warn!("Failed to read retrace config at {}", path.display());
        return ParserConfig::default();
    };
    match from_contents(&contents) {
        Ok(config) => config,
        Err(err) => {
            warn!("Failed to parse retrace config at {}: {err:#}", path.display());
            ParserConfig::default()
        }
    }
}

/// Parses the contents of a config file on top of the defaults.
pub fn from_contents(contents: &str) -> anyhow::Result<ParserConfig> {
    let parsed: ConfigFile = toml::from_str(contents)?;
    let mut config = ParserConfig::default();
    let section = parsed.parser;

    if let Some(max_depth) = section.max_depth {
        anyhow::ensure!(max_depth > 0, "parser.max_depth must be at least 1");
        config.max_depth = max_depth;
    }
    if let Some(policy) = section.empty_loop {
        config.empty_loop = policy.parse::<EmptyLoopPolicy>()?;
    }
    if let Some(debug_checks) = section.debug_checks {
        config.debug_checks = debug_checks;
    }
    Ok(config)
}

fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}
