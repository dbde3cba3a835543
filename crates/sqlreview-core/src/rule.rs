//! Rule descriptors
//!
//! A rule descriptor is `{type, level, payload}`. The payload stays an opaque JSON
//! string until the advisor for the rule is built, at which point it is
//! deserialized into the advisor's own typed shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::advice::AdviceStatus;
use crate::config::ConfigError;

/// Built-in rule types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleType {
    /// INSERT, UPDATE and DELETE must not use LIMIT
    #[serde(rename = "statement.disallow-limit")]
    StatementDisallowLimit,

    /// COMMENT ON literals are bounded in length
    #[serde(rename = "comment.length")]
    CommentLength,

    /// UPDATE, DELETE and SELECT over tables require WHERE
    #[serde(rename = "statement.where.require")]
    StatementRequireWhere,

    /// LIKE patterns must not start with a wildcard
    #[serde(rename = "statement.where.no-leading-wildcard-like")]
    StatementNoLeadingWildcardLike,

    /// SELECT * is not allowed
    #[serde(rename = "statement.select.no-select-all")]
    StatementNoSelectAll,

    /// Tables need a primary key
    #[serde(rename = "table.require-pk")]
    TableRequirePk,

    /// Foreign keys are not allowed
    #[serde(rename = "table.no-foreign-key")]
    TableNoForeignKey,

    /// Table names follow a naming convention
    #[serde(rename = "naming.table")]
    NamingTable,

    /// Changes must not break existing data or code
    #[serde(rename = "schema.backward-compatibility")]
    SchemaBackwardCompatibility,

    /// Tables carry a required set of columns
    #[serde(rename = "column.required")]
    ColumnRequired,
}

impl RuleType {
    /// Every built-in rule type, in registration order
    pub const ALL: [RuleType; 10] = [
        RuleType::StatementDisallowLimit,
        RuleType::CommentLength,
        RuleType::StatementRequireWhere,
        RuleType::StatementNoLeadingWildcardLike,
        RuleType::StatementNoSelectAll,
        RuleType::TableRequirePk,
        RuleType::TableNoForeignKey,
        RuleType::NamingTable,
        RuleType::SchemaBackwardCompatibility,
        RuleType::ColumnRequired,
    ];

    /// Stable string identifier, also used as advice title
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatementDisallowLimit => "statement.disallow-limit",
            Self::CommentLength => "comment.length",
            Self::StatementRequireWhere => "statement.where.require",
            Self::StatementNoLeadingWildcardLike => "statement.where.no-leading-wildcard-like",
            Self::StatementNoSelectAll => "statement.select.no-select-all",
            Self::TableRequirePk => "table.require-pk",
            Self::TableNoForeignKey => "table.no-foreign-key",
            Self::NamingTable => "naming.table",
            Self::SchemaBackwardCompatibility => "schema.backward-compatibility",
            Self::ColumnRequired => "column.required",
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| ConfigError::ParseError(format!("unknown rule type \"{}\"", s)))
    }
}

/// Configured severity of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleLevel {
    /// Violations block the pipeline
    Error,

    /// Violations are advisory
    Warning,

    /// Rule is not evaluated
    Disabled,
}

impl RuleLevel {
    /// Advice status used for violations of a rule at this level
    ///
    /// `None` for disabled rules, which never produce advice.
    pub fn advice_status(&self) -> Option<AdviceStatus> {
        match self {
            Self::Error => Some(AdviceStatus::Error),
            Self::Warning => Some(AdviceStatus::Warn),
            Self::Disabled => None,
        }
    }
}

/// One rule descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlReviewRule {
    /// Which rule to run
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Severity of violations
    pub level: RuleLevel,

    /// Rule-specific JSON payload
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload: String,
}

impl SqlReviewRule {
    /// Create a rule without payload
    pub fn new(rule_type: RuleType, level: RuleLevel) -> Self {
        Self {
            rule_type,
            level,
            payload: String::new(),
        }
    }

    /// Attach a JSON payload
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Deserialize the payload into the rule's expected shape
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_str(&self.payload).map_err(|e| ConfigError::InvalidPayload {
            rule: self.rule_type.as_str().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct LengthPayload {
        max_length: usize,
    }

    #[test]
    fn rule_type_serde_matches_as_str() {
        for rule in RuleType::ALL {
            let json = serde_json::to_string(&rule).unwrap();
            assert_eq!(json, format!("\"{}\"", rule.as_str()));
            assert_eq!(rule.as_str().parse::<RuleType>().unwrap(), rule);
        }
    }

    #[test]
    fn unknown_rule_type() {
        assert!("statement.whatever".parse::<RuleType>().is_err());
    }

    #[test]
    fn level_to_status() {
        assert_eq!(RuleLevel::Warning.advice_status(), Some(AdviceStatus::Warn));
        assert_eq!(RuleLevel::Error.advice_status(), Some(AdviceStatus::Error));
        assert_eq!(RuleLevel::Disabled.advice_status(), None);
    }

    #[test]
    fn typed_payload() {
        let rule = SqlReviewRule::new(RuleType::CommentLength, RuleLevel::Warning)
            .with_payload(r#"{"maxLength": 20}"#);
        let payload: LengthPayload = rule.payload().unwrap();
        assert_eq!(payload.max_length, 20);
    }

    #[test]
    fn malformed_payload() {
        let rule = SqlReviewRule::new(RuleType::CommentLength, RuleLevel::Warning)
            .with_payload(r#"{"maxLength": "twenty"}"#);
        let err = rule.payload::<LengthPayload>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPayload { .. }));
        assert!(err.to_string().contains("comment.length"));
    }
}
