//! Transpiler configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QBRIDGE_ prefix)
//!
//! Environment variables take precedence over the file, which takes
//! precedence over the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::conversion::{DEFAULT_EDGE_BIAS, Environment};
use crate::graph::GraphOptions;
use crate::scheme::{ConversionScheme, DEFAULT_MAX_PATH_ATTEMPTS};

/// Complete transpiler configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranspilerConfig {
    /// Conversion graph construction
    #[serde(default)]
    pub graph: GraphConfig,

    /// Path search limits
    #[serde(default)]
    pub scheme: SchemeConfig,

    /// Packages available to conversions
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// Conversion graph settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Bias added to every edge cost
    #[serde(default = "default_edge_bias")]
    pub edge_bias: f64,

    /// Only use conversions shipped with the crate
    #[serde(default)]
    pub require_native: bool,

    /// Add every registered program type as a node, even without edges
    #[serde(default)]
    pub include_isolated: bool,
}

/// Path search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// Candidate paths tried per request
    #[serde(default = "default_max_path_attempts")]
    pub max_path_attempts: usize,

    /// Longest path allowed, in conversions (unbounded if absent)
    #[serde(default)]
    pub max_path_depth: Option<i64>,
}

/// Environment settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Names of installed external packages
    #[serde(default)]
    pub packages: Vec<String>,
}

fn default_edge_bias() -> f64 {
    DEFAULT_EDGE_BIAS
}

fn default_max_path_attempts() -> usize {
    DEFAULT_MAX_PATH_ATTEMPTS
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            edge_bias: default_edge_bias(),
            require_native: false,
            include_isolated: false,
        }
    }
}

impl Default for SchemeConfig {
    fn default() -> Self {
        SchemeConfig {
            max_path_attempts: default_max_path_attempts(),
            max_path_depth: None,
        }
    }
}

impl TranspilerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_yaml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Self {
        TranspilerConfig::default().merge_env()
    }

    /// Load the file if one is given, then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => TranspilerConfig::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply `QBRIDGE_*` overrides from `lookup`. Values that fail to parse
    /// are ignored.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Graph
        if let Some(v) = lookup("QBRIDGE_EDGE_BIAS") {
            if let Ok(val) = v.parse() {
                self.graph.edge_bias = val;
            }
        }
        if let Some(v) = lookup("QBRIDGE_REQUIRE_NATIVE") {
            if let Some(val) = parse_flag(&v) {
                self.graph.require_native = val;
            }
        }
        if let Some(v) = lookup("QBRIDGE_INCLUDE_ISOLATED") {
            if let Some(val) = parse_flag(&v) {
                self.graph.include_isolated = val;
            }
        }

        // Scheme
        if let Some(v) = lookup("QBRIDGE_MAX_PATH_ATTEMPTS") {
            if let Ok(val) = v.parse() {
                self.scheme.max_path_attempts = val;
            }
        }
        if let Some(v) = lookup("QBRIDGE_MAX_PATH_DEPTH") {
            if let Ok(val) = v.parse() {
                self.scheme.max_path_depth = Some(val);
            }
        }

        // Environment
        if let Some(v) = lookup("QBRIDGE_PACKAGES") {
            self.environment.packages = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.graph.edge_bias.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "edge_bias must be finite, got {}",
                self.graph.edge_bias
            )));
        }

        if self.scheme.max_path_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_path_attempts must be greater than 0".to_string(),
            ));
        }

        if let Some(depth) = self.scheme.max_path_depth {
            if depth < 0 {
                return Err(ConfigError::ValidationError(format!(
                    "max_path_depth must not be negative, got {depth}"
                )));
            }
        }

        Ok(())
    }

    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            edge_bias: self.graph.edge_bias,
            require_native: self.graph.require_native,
        }
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.environment.packages.iter().cloned())
    }

    /// The scheme described by this configuration, without a graph.
    pub fn scheme(&self) -> Result<ConversionScheme, ConfigError> {
        self.validate()?;
        let depth = self
            .scheme
            .max_path_depth
            .map(usize::try_from)
            .transpose()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(ConversionScheme::new()
            .with_max_path_attempts(self.scheme.max_path_attempts)
            .with_max_path_depth(depth))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = TranspilerConfig::default();
        assert_eq!(config.graph.edge_bias, 0.25);
        assert_eq!(config.scheme.max_path_attempts, 3);
        assert!(config.scheme.max_path_depth.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = TranspilerConfig::from_yaml(
            "scheme:\n  max_path_depth: 2\nenvironment:\n  packages: [cirq, pytket]\n",
        )
        .unwrap();
        assert_eq!(config.scheme.max_path_depth, Some(2));
        assert_eq!(config.scheme.max_path_attempts, 3);
        assert_eq!(config.graph.edge_bias, 0.25);
        assert_eq!(config.environment.packages, ["cirq", "pytket"]);
        assert_eq!(config.scheme().unwrap().max_path_depth(), Some(2));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            TranspilerConfig::from_yaml("graph: [1, 2"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_negative_depth_rejected() {
        let config = TranspilerConfig::from_yaml("scheme:\n  max_path_depth: -1\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(config.scheme().is_err());
    }

    #[test]
    fn test_validate_invalid_values() {
        let mut config = TranspilerConfig::default();
        config.scheme.max_path_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = TranspilerConfig::default();
        config.graph.edge_bias = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("QBRIDGE_EDGE_BIAS", "0.5"),
            ("QBRIDGE_REQUIRE_NATIVE", "yes"),
            ("QBRIDGE_MAX_PATH_ATTEMPTS", "not a number"),
            ("QBRIDGE_MAX_PATH_DEPTH", "4"),
            ("QBRIDGE_PACKAGES", "cirq, ,qiskit"),
        ]
        .into_iter()
        .collect();

        let config =
            TranspilerConfig::default().merge_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.graph.edge_bias, 0.5);
        assert!(config.graph.require_native);
        assert_eq!(config.scheme.max_path_attempts, 3);
        assert_eq!(config.scheme.max_path_depth, Some(4));
        assert_eq!(config.environment.packages, ["cirq", "qiskit"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TranspilerConfig::from_file("/nonexistent/qbridge.yaml"),
            Err(ConfigError::IoError(_))
        ));
    }
}
