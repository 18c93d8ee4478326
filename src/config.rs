//! Engine configuration
//!
//! Plain values with builder-style setters, plus an environment overlay for
//! deployments that cannot change code.

use std::env;

const ENV_TREE_REDUCTION: &str = "GRAPHOPS_TREE_REDUCTION";
const ENV_VALIDATE_TREE_REDUCTION: &str = "GRAPHOPS_VALIDATE_TREE_REDUCTION";
const ENV_PARALLEL_MIN_ROWS: &str = "GRAPHOPS_PARALLEL_MIN_ROWS";

/// Tunables of an [`Engine`](crate::ops::Engine)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Route `sddmm_tree_reduction` to the registered accelerated module
    pub tree_reduction: bool,
    /// Apply the full shape check on the accelerated tree-reduction path
    pub validate_tree_reduction_shapes: bool,
    /// Minimum rows per parallel task in the CPU kernels
    pub parallel_min_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tree_reduction: false,
            validate_tree_reduction_shapes: true,
            parallel_min_rows: 64,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `GRAPHOPS_*` environment variables
    ///
    /// Booleans accept `1`, `true`, `yes` and `on` (case-insensitive); unset
    /// or empty variables keep the default. An unparsable row count is
    /// ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_bool(ENV_TREE_REDUCTION) {
            config.tree_reduction = v;
        }
        if let Some(v) = env_bool(ENV_VALIDATE_TREE_REDUCTION) {
            config.validate_tree_reduction_shapes = v;
        }
        if let Some(raw) = env_value(ENV_PARALLEL_MIN_ROWS) {
            match raw.trim().parse::<usize>() {
                Ok(rows) => config.parallel_min_rows = rows.max(1),
                Err(_) => tracing::warn!(
                    var = ENV_PARALLEL_MIN_ROWS,
                    value = %raw,
                    "ignoring invalid row count"
                ),
            }
        }
        config
    }

    /// Enable or disable the accelerated tree-reduction path
    pub fn with_tree_reduction(mut self, enabled: bool) -> Self {
        self.tree_reduction = enabled;
        self
    }

    /// Enable or disable shape checks on the tree-reduction path
    pub fn with_tree_reduction_validation(mut self, enabled: bool) -> Self {
        self.validate_tree_reduction_shapes = enabled;
        self
    }

    /// Set the minimum rows per parallel CPU task (at least 1)
    pub fn with_parallel_min_rows(mut self, rows: usize) -> Self {
        self.parallel_min_rows = rows.max(1);
        self
    }
}

fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
    env_value(name).map(|v| parse_bool(&v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = EngineConfig::default();
        assert!(!c.tree_reduction);
        assert!(c.validate_tree_reduction_shapes);
        assert_eq!(c.parallel_min_rows, 64);
    }

    #[test]
    fn test_builders() {
        let c = EngineConfig::default()
            .with_tree_reduction(true)
            .with_tree_reduction_validation(false)
            .with_parallel_min_rows(0);
        assert!(c.tree_reduction);
        assert!(!c.validate_tree_reduction_shapes);
        assert_eq!(c.parallel_min_rows, 1);
    }

    #[test]
    fn test_parse_bool() {
        for v in ["1", "true", "YES", " on "] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["0", "false", "off", "nope"] {
            assert!(!parse_bool(v), "{v}");
        }
    }
}
