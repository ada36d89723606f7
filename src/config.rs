//! Engine configuration.
//!
//! ```
//! use league_store::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "debounce_ms": 50 }"#).unwrap();
//! assert_eq!(config.debounce_ms, 50);
//! assert_eq!(config.leaderboard_limit, 10);
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid engine config: {field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Tunables for the slices and the reconciliation layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Quiet period before a match change is handed to the renderer.
    pub debounce_ms: i64,
    /// Length of each ranked leaderboard list.
    pub leaderboard_limit: usize,
    /// Maximum age of the persisted league slice.
    pub league_ttl_ms: i64,
    /// Maximum age of the leaderboards cache.
    pub leaderboards_ttl_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 120,
            leaderboard_limit: 10,
            league_ttl_ms: 10 * 60 * 1000,
            leaderboards_ttl_ms: 5 * 60 * 1000,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leaderboard_limit == 0 {
            return Err(ConfigError::Zero {
                field: "leaderboard_limit",
            });
        }
        if self.league_ttl_ms <= 0 {
            return Err(ConfigError::Zero {
                field: "league_ttl_ms",
            });
        }
        if self.leaderboards_ttl_ms <= 0 {
            return Err(ConfigError::Zero {
                field: "leaderboards_ttl_ms",
            });
        }
        Ok(())
    }
}
