// Configuration module for reading Trailbreaker.toml
//
// The [rules] section holds the game tunables used until the host sends its own at game
// start. The search itself never reads this file: it only sees the Rules inside a GameState.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::game::Rules;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub rules: Rules,
    pub search: SearchConfig,
    pub debug: DebugConfig,
}

/// Search budget
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Half-moves explored per decision
    pub depth: u32,
    /// Wall-clock limit after which the service stops waiting and falls back
    pub decision_timeout_ms: u64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Trailbreaker.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Trailbreaker.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Trailbreaker.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Trailbreaker.toml
    pub fn default_hardcoded() -> Self {
        Config {
            rules: Rules::default(),
            search: SearchConfig {
                depth: 8,
                decision_timeout_ms: 900,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "trailbreaker_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Trailbreaker.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.search.depth == 0 {
            return Err("search.depth must be at least 1".to_string());
        }
        if self.rules.init_health == 0 {
            return Err("rules.init_health must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.depth, 8);
        assert_eq!(config.rules.wall_breaker_cooldown, 12);
    }

    #[test]
    fn test_trailbreaker_toml_can_be_parsed() {
        let result = Config::from_file("Trailbreaker.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Trailbreaker.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config =
            Config::from_file("Trailbreaker.toml").expect("Trailbreaker.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.rules, hardcoded_config.rules);
        assert_eq!(file_config.search.depth, hardcoded_config.search.depth);
        assert_eq!(
            file_config.search.decision_timeout_ms,
            hardcoded_config.search.decision_timeout_ms
        );
        assert_eq!(file_config.debug.enabled, hardcoded_config.debug.enabled);
        assert_eq!(
            file_config.debug.log_file_path,
            hardcoded_config.debug.log_file_path
        );
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let text = fs::read_to_string("Trailbreaker.toml")
            .unwrap()
            .replace("depth = 8", "depth = 0");
        assert!(Config::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
