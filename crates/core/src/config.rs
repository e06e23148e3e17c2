//! Engine-wide settings.
//!
//! A process-wide default is assembled once (from the environment, or from
//! an explicit [`EngineConfig::install`] at startup) and is read-only from
//! then on. Evaluations and report composition also accept an explicit
//! config, which is what tests use.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Environment variable that turns on verbose debug output.
pub const DEBUG_ENV: &str = "PCOND_DEBUG";

/// Default clip length for values rendered in report columns.
pub const DEFAULT_MAX_SNAPSHOT_LEN: usize = 80;

static GLOBAL: OnceLock<EngineConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log every record on leave and keep ignored records in reports.
    pub debug: bool,
    /// Never attach long-form details to records.
    pub suppress_details: bool,
    /// Values longer than this are clipped in report columns.
    pub max_snapshot_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            debug: false,
            suppress_details: false,
            max_snapshot_len: DEFAULT_MAX_SNAPSHOT_LEN,
        }
    }
}

impl EngineConfig {
    /// Defaults, with `debug` taken from `PCOND_DEBUG`.
    pub fn from_env() -> Self {
        let debug = std::env::var(DEBUG_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        EngineConfig {
            debug,
            ..EngineConfig::default()
        }
    }

    /// The process-wide config, initialized from the environment on first use.
    pub fn global() -> &'static EngineConfig {
        GLOBAL.get_or_init(EngineConfig::from_env)
    }

    /// Installs the process-wide config. Fails (returning the rejected
    /// config) if it was already installed or read.
    pub fn install(config: EngineConfig) -> Result<(), EngineConfig> {
        GLOBAL.set(config)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_suppressed_details(mut self, suppress: bool) -> Self {
        self.suppress_details = suppress;
        self
    }

    pub fn with_max_snapshot_len(mut self, max_len: usize) -> Self {
        self.max_snapshot_len = max_len;
        self
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_config_with_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(cfg.debug);
        assert!(!cfg.suppress_details);
        assert_eq!(cfg.max_snapshot_len, DEFAULT_MAX_SNAPSHOT_LEN);
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn builders_override_fields() {
        let cfg = EngineConfig::default()
            .with_debug(true)
            .with_suppressed_details(true)
            .with_max_snapshot_len(12);
        assert!(cfg.debug && cfg.suppress_details);
        assert_eq!(cfg.max_snapshot_len, 12);
    }
}
