//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Move plain filter branches ahead of nested apply operators at setup.
    pub reorder_branches: bool,

    /// Reset a branch sub-pipeline after it produced a row, so pending branch
    /// state never carries over to the next injected candidate.
    pub reset_branches_after_match: bool,

    /// Optional cap on rows returned by `ExecutionPlan::collect`.
    pub max_rows: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reorder_branches: true,
            reset_branches_after_match: true,
            max_rows: None,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `EXAPPLY_REORDER_BRANCHES`: `true`/`false`
    /// - `EXAPPLY_RESET_BRANCHES`: `true`/`false`
    /// - `EXAPPLY_MAX_ROWS`: row cap for collected results
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("EXAPPLY_REORDER_BRANCHES") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.reorder_branches = v;
            }
        }

        if let Ok(s) = std::env::var("EXAPPLY_RESET_BRANCHES") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.reset_branches_after_match = v;
            }
        }

        if let Ok(s) = std::env::var("EXAPPLY_MAX_ROWS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_rows = Some(v);
            }
        }

        cfg
    }

    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{"max_rows": 10}"#).unwrap();
        assert_eq!(cfg.max_rows, Some(10));
        assert!(cfg.reorder_branches);
        assert!(cfg.reset_branches_after_match);
    }

    // Single test so the process-wide variables are never touched concurrently.
    #[test]
    fn env_overrides_defaults_and_ignores_garbage() {
        std::env::set_var("EXAPPLY_REORDER_BRANCHES", "false");
        std::env::set_var("EXAPPLY_RESET_BRANCHES", "false");
        std::env::set_var("EXAPPLY_MAX_ROWS", "25");
        let cfg = EngineConfig::from_env();
        assert!(!cfg.reorder_branches);
        assert!(!cfg.reset_branches_after_match);
        assert_eq!(cfg.max_rows, Some(25));

        std::env::set_var("EXAPPLY_REORDER_BRANCHES", "maybe");
        std::env::set_var("EXAPPLY_RESET_BRANCHES", "0");
        std::env::set_var("EXAPPLY_MAX_ROWS", "lots");
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());

        std::env::remove_var("EXAPPLY_REORDER_BRANCHES");
        std::env::remove_var("EXAPPLY_RESET_BRANCHES");
        std::env::remove_var("EXAPPLY_MAX_ROWS");
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
