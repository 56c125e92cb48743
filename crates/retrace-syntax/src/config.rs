//! Parser configuration.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Nesting limit used when no explicit configuration is given.
///
/// A nested code block costs about fifteen stack frames, and unoptimized
/// builds overflow a 2 MiB thread stack at roughly 900 levels. The limit
/// stays well below that so a parse on a plain spawned thread never aborts.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// What to do when a repetition iteration matches without consuming input.
///
/// The loop always stops; the policy only decides how loudly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EmptyLoopPolicy {
    /// Stop the loop silently.
    Ignore,
    /// Stop the loop and emit a `tracing` warning.
    #[default]
    Warn,
    /// Stop the loop, warn, and record a parse error in the tree.
    Report,
}

impl EmptyLoopPolicy {
    /// Returns the lowercase name used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Warn => "warn",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for EmptyLoopPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`EmptyLoopPolicy`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown empty-loop policy '{0}' (expected ignore, warn or report)")]
pub struct UnknownPolicy(pub String);

impl FromStr for EmptyLoopPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "report" => Ok(Self::Report),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Settings for one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of nested guarded rule invocations.
    pub max_depth: usize,
    /// Handling of zero-width repetition iterations.
    pub empty_loop: EmptyLoopPolicy,
    /// Assert LIFO marker resolution while parsing.
    pub debug_checks: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            empty_loop: EmptyLoopPolicy::default(),
            debug_checks: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("warn".parse(), Ok(EmptyLoopPolicy::Warn));
        assert_eq!(" Report ".parse(), Ok(EmptyLoopPolicy::Report));
        assert_eq!("IGNORE".parse(), Ok(EmptyLoopPolicy::Ignore));
        assert_eq!(
            "loud".parse::<EmptyLoopPolicy>(),
            Err(UnknownPolicy("loud".to_string()))
        );
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [
            EmptyLoopPolicy::Ignore,
            EmptyLoopPolicy::Warn,
            EmptyLoopPolicy::Report,
        ] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
    }

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.empty_loop, EmptyLoopPolicy::Warn);
    }
}
