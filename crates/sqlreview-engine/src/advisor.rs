//! Advisor abstraction
//!
//! An advisor is one configured rule. It is built once per review call from a
//! [`SqlReviewRule`] and then evaluated against every statement of the
//! script. Advisors hold only their parsed configuration, so the same advisor
//! can check statements from several threads at once.

use sqlreview_core::{Advice, AdviceCode, AdviceStatus, ConfigError, Dialect, RuleType, SqlReviewRule};
use sqlreview_sql::{Node, Statement};

use crate::review::ReviewError;

/// What an advisor inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorInput {
    /// Raw statement text and tokens only
    Statements,
    /// The converted AST
    Ast,
}

/// One statement as seen by advisors
#[derive(Debug, Clone, Copy)]
pub struct StatementContext<'a> {
    pub statement: &'a Statement,
    /// Converted node; absent when no configured advisor needs the AST or
    /// the native grammar rejected the statement
    pub node: Option<&'a Node>,
    pub dialect: Dialect,
}

/// A configured rule
pub trait Advisor: Send + Sync {
    /// Rule this advisor implements
    fn rule_type(&self) -> RuleType;

    fn input(&self) -> AdvisorInput {
        AdvisorInput::Ast
    }

    /// Check one statement, returning violations in emission order
    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError>;
}

/// Builds an advisor from a rule descriptor
pub type AdvisorFactory = fn(RuleMeta, &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError>;

/// Title and status shared by every advice of one configured rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMeta {
    pub rule_type: RuleType,
    pub status: AdviceStatus,
}

impl RuleMeta {
    /// `None` for disabled rules
    pub fn from_rule(rule: &SqlReviewRule) -> Option<Self> {
        rule.level.advice_status().map(|status| Self {
            rule_type: rule.rule_type,
            status,
        })
    }

    /// Violation advice titled with the rule type
    pub fn advice(&self, code: AdviceCode, content: impl Into<String>, line: usize) -> Advice {
        Advice::new(self.status, code, self.rule_type.as_str(), content, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlreview_core::RuleLevel;

    #[test]
    fn meta_maps_level_to_status() {
        let rule = SqlReviewRule::new(RuleType::TableRequirePk, RuleLevel::Error);
        let meta = RuleMeta::from_rule(&rule).unwrap();

        let advice = meta.advice(AdviceCode::TableNoPk, "missing", 3);
        assert_eq!(advice.status, AdviceStatus::Error);
        assert_eq!(advice.title, "table.require-pk");
        assert_eq!(advice.line, 3);
    }

    #[test]
    fn disabled_rules_have_no_meta() {
        let rule = SqlReviewRule::new(RuleType::TableRequirePk, RuleLevel::Disabled);
        assert!(RuleMeta::from_rule(&rule).is_none());
    }
}
