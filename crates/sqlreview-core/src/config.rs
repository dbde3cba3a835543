//! Configuration schema (sqlreview.toml)

use serde::{Deserialize, Serialize};

use crate::rule::{RuleLevel, SqlReviewRule};

/// SQL dialect of the reviewed scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL family
    Postgres,

    /// MySQL family
    MySql,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Postgres
    }
}

impl Dialect {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" => Ok(Self::MySql),
            other => Err(ConfigError::ParseError(format!("unknown dialect \"{}\"", other))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// SQL dialect
    #[serde(default)]
    pub dialect: Dialect,

    /// Rule descriptors, evaluated in this order
    #[serde(default)]
    pub rules: Vec<SqlReviewRule>,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: std::path::PathBuf,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            rules: Vec::new(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl ReviewConfig {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Rules that are not disabled
    pub fn enabled_rules(&self) -> impl Iterator<Item = &SqlReviewRule> {
        self.rules.iter().filter(|r| r.level != RuleLevel::Disabled)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid payload for rule {rule}: {message}")]
    InvalidPayload { rule: String, message: String },

    #[error("Rule {rule} is not supported for dialect {dialect}")]
    UnsupportedRule { rule: String, dialect: Dialect },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleType;

    #[test]
    fn default_config() {
        let config = ReviewConfig::default();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn parse_rules_from_toml() {
        let config = ReviewConfig::from_toml(
            r#"
dialect = "mysql"

[[rules]]
type = "statement.disallow-limit"
level = "WARNING"

[[rules]]
type = "comment.length"
level = "DISABLED"
payload = '{"required": true, "maxLength": 20}'
"#,
        )
        .unwrap();

        assert_eq!(config.dialect, Dialect::MySql);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].rule_type, RuleType::StatementDisallowLimit);
        assert_eq!(config.rules[0].payload, "");
        assert_eq!(config.rules[1].level, RuleLevel::Disabled);
        assert_eq!(config.enabled_rules().count(), 1);
    }

    #[test]
    fn unknown_rule_is_parse_error() {
        let err = ReviewConfig::from_toml(
            r#"
[[rules]]
type = "no.such.rule"
level = "ERROR"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut config = ReviewConfig::default();
        config.rules.push(
            SqlReviewRule::new(RuleType::NamingTable, RuleLevel::Error)
                .with_payload(r#"{"format": "^[a-z]+$", "maxLength": 64}"#),
        );
        let toml = toml::to_string(&config).unwrap();
        let parsed = ReviewConfig::from_toml(&toml).unwrap();
        assert_eq!(config.dialect, parsed.dialect);
        assert_eq!(config.rules, parsed.rules);
    }

    #[test]
    fn dialect_from_str() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert!("oracle".parse::<Dialect>().is_err());
    }
}
