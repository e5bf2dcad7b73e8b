//! Mapper configuration
//!
//! Controls the pattern variable the repository queries return and the
//! placeholder syntax used for query parameters. Values come from the
//! environment with programmatic overrides on top.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use crate::security::validate_variable;

const NODE_VARIABLE_ENV: &str = "OGM_NODE_VARIABLE";
const PARAMETER_STYLE_ENV: &str = "OGM_PARAMETER_STYLE";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

/// Configuration source information for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value loaded from environment variable
    EnvVar(String),
    /// Default value used
    Default(String),
    /// Value provided programmatically
    Programmatic,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::EnvVar(var) => write!(f, "Environment variable: {}", var),
            ConfigSource::Default(value) => write!(f, "Default value: {}", value),
            ConfigSource::Programmatic => write!(f, "Programmatically set"),
        }
    }
}

/// Placeholder syntax for query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterStyle {
    /// Legacy `{name}` placeholders
    #[default]
    Braces,
    /// `$name` placeholders
    Dollar,
}

impl ParameterStyle {
    /// Render the placeholder for a named parameter
    pub fn placeholder(self, name: &str) -> String {
        match self {
            ParameterStyle::Braces => format!("{{{}}}", name),
            ParameterStyle::Dollar => format!("${}", name),
        }
    }
}

impl FromStr for ParameterStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "braces" | "legacy" => Ok(ParameterStyle::Braces),
            "dollar" => Ok(ParameterStyle::Dollar),
            _ => Err(ConfigError::InvalidValue {
                field: "parameter_style".to_string(),
                value: s.to_string(),
                expected: "braces or dollar".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ParameterStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterStyle::Braces => f.write_str("braces"),
            ParameterStyle::Dollar => f.write_str("dollar"),
        }
    }
}

/// Mapper configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgmConfig {
    /// Pattern variable bound to the primary node in generated queries
    pub node_variable: String,
    pub parameter_style: ParameterStyle,
}

impl OgmConfig {
    pub fn new() -> Self {
        Self {
            node_variable: "n".to_string(),
            parameter_style: ParameterStyle::Braces,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(variable) = env::var(NODE_VARIABLE_ENV) {
            config.node_variable = variable;
        }

        if let Ok(style) = env::var(PARAMETER_STYLE_ENV) {
            config.parameter_style = style.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_node_variable(mut self, variable: impl Into<String>) -> Self {
        self.node_variable = variable.into();
        self
    }

    pub fn with_parameter_style(mut self, style: ParameterStyle) -> Self {
        self.parameter_style = style;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_variable(&self.node_variable).map_err(|e| ConfigError::ValidationFailed {
            field: "node_variable".to_string(),
            reason: e.to_string(),
        })
    }

    /// Get configuration source information for debugging
    pub fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();

        sources.insert(
            "node_variable".to_string(),
            match env::var(NODE_VARIABLE_ENV) {
                Ok(value) if value == self.node_variable => {
                    ConfigSource::EnvVar(NODE_VARIABLE_ENV.to_string())
                }
                _ if self.node_variable == "n" => ConfigSource::Default("n".to_string()),
                _ => ConfigSource::Programmatic,
            },
        );

        let env_style = env::var(PARAMETER_STYLE_ENV)
            .ok()
            .and_then(|s| s.parse::<ParameterStyle>().ok());
        sources.insert(
            "parameter_style".to_string(),
            match env_style {
                Some(style) if style == self.parameter_style => {
                    ConfigSource::EnvVar(PARAMETER_STYLE_ENV.to_string())
                }
                _ if self.parameter_style == ParameterStyle::Braces => {
                    ConfigSource::Default("braces".to_string())
                }
                _ => ConfigSource::Programmatic,
            },
        );

        sources
    }
}

impl Default for OgmConfig {
    fn default() -> Self {
        Self::new()
    }
}
