//! Application configuration.
//!
//! The configuration is loaded from a JSON file
//! (`$XDG_CONFIG_HOME/hyprlaunch/config.json`).  The top-level schema uses a
//! `"launch"` key so the file can be extended with additional sections later
//! without breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "launch": {
//!     "window_timeout_ms": 4000,
//!     "poll_interval_ms": 250,
//!     "place_attempts": 4,
//!     "place_backoff_ms": 150
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional — a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Launch pipeline timing and policy.
    #[serde(default)]
    pub launch: LaunchTuning,
}

/// Launch pipeline timing and policy.
///
/// All durations are in **milliseconds**.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchTuning {
    /// Ceiling on waiting for a freshly spawned app to present a window.
    /// One slow app never stalls the batch beyond this per-app bound.
    pub window_timeout_ms: u64,
    /// Sleep between window-discovery polls.
    pub poll_interval_ms: u64,
    /// Bounded number of move/resize attempts per window.
    pub place_attempts: u32,
    /// Sleep between placement attempts.
    pub place_backoff_ms: u64,
    /// Pause between apps in sequential mode, giving each application time
    /// to settle before the next launch competes for resources.
    pub sequential_gap_ms: u64,
    /// When a window cannot be moved to its target desktop, still attempt
    /// placement on whatever desktop it ended up on.
    pub place_after_desktop_move_failure: bool,
}

impl Default for LaunchTuning {
    fn default() -> Self {
        Self {
            window_timeout_ms: 4000,
            poll_interval_ms: 250,
            place_attempts: 4,
            place_backoff_ms: 150,
            sequential_gap_ms: 500,
            place_after_desktop_move_failure: true,
        }
    }
}

impl LaunchTuning {
    pub fn window_timeout(&self) -> Duration {
        Duration::from_millis(self.window_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn place_backoff(&self) -> Duration {
        Duration::from_millis(self.place_backoff_ms)
    }

    pub fn sequential_gap(&self) -> Duration {
        Duration::from_millis(self.sequential_gap_ms)
    }

    /// Tuning with every delay zeroed. Used by tests so pipelines that hit
    /// timeouts finish instantly.
    pub fn immediate() -> Self {
        Self {
            window_timeout_ms: 0,
            poll_interval_ms: 0,
            place_attempts: 1,
            place_backoff_ms: 0,
            sequential_gap_ms: 0,
            place_after_desktop_move_failure: true,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "launch": {
                "window_timeout_ms": 2000,
                "poll_interval_ms": 100,
                "place_attempts": 2,
                "place_backoff_ms": 50,
                "sequential_gap_ms": 0,
                "place_after_desktop_move_failure": false
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.launch.window_timeout_ms, 2000);
        assert_eq!(cfg.launch.place_attempts, 2);
        assert!(!cfg.launch.place_after_desktop_move_failure);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let json = "{}";
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.launch, LaunchTuning::default());
    }

    #[test]
    fn deserialize_partial_launch_section() {
        let json = r#"{ "launch": { "window_timeout_ms": 10000 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.launch.window_timeout_ms, 10000);
        let defaults = LaunchTuning::default();
        assert_eq!(cfg.launch.poll_interval_ms, defaults.poll_interval_ms);
        assert_eq!(cfg.launch.place_attempts, defaults.place_attempts);
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "launch": {}, "future_section": { "key": 42 } }"#;
        // Should not fail — unknown keys are silently ignored.
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }
}
