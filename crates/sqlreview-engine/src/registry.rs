//! Immutable advisor registry
//!
//! Maps a (dialect, rule type) pair to the factory that builds its advisor.
//! The registry is built once and shared by reference with every reviewer.

use std::collections::HashMap;

use sqlreview_core::{ConfigError, Dialect, RuleType, SqlReviewRule};

use crate::advisor::{Advisor, AdvisorFactory, RuleMeta};
use crate::rules;

#[derive(Default)]
pub struct AdvisorRegistry {
    factories: HashMap<(Dialect, RuleType), AdvisorFactory>,
}

impl AdvisorRegistry {
    /// Registry without any rule
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in rule
    pub fn builtin() -> Self {
        let both = [Dialect::Postgres, Dialect::MySql];
        let mut registry = Self::new();

        for dialect in both {
            registry
                .register(dialect, RuleType::StatementDisallowLimit, rules::disallow_limit::build)
                .register(dialect, RuleType::StatementRequireWhere, rules::where_require::build)
                .register(dialect, RuleType::StatementNoLeadingWildcardLike, rules::leading_wildcard::build)
                .register(dialect, RuleType::StatementNoSelectAll, rules::select_all::build)
                .register(dialect, RuleType::TableRequirePk, rules::table::build_require_pk)
                .register(dialect, RuleType::TableNoForeignKey, rules::table::build_no_foreign_key)
                .register(dialect, RuleType::NamingTable, rules::naming::build)
                .register(dialect, RuleType::SchemaBackwardCompatibility, rules::compatibility::build)
                .register(dialect, RuleType::ColumnRequired, rules::column_required::build);
        }
        registry.register(Dialect::Postgres, RuleType::CommentLength, rules::comment_length::build);

        registry
    }

    /// Add or replace a factory
    pub fn register(&mut self, dialect: Dialect, rule_type: RuleType, factory: AdvisorFactory) -> &mut Self {
        self.factories.insert((dialect, rule_type), factory);
        self
    }

    pub fn supports(&self, dialect: Dialect, rule_type: RuleType) -> bool {
        self.factories.contains_key(&(dialect, rule_type))
    }

    /// Rule types registered for a dialect, in canonical order
    pub fn rule_types(&self, dialect: Dialect) -> Vec<RuleType> {
        RuleType::ALL
            .into_iter()
            .filter(|rule_type| self.supports(dialect, *rule_type))
            .collect()
    }

    /// Build the advisor for one rule descriptor
    ///
    /// Returns `Ok(None)` for disabled rules. Payloads are validated here,
    /// before any statement is checked.
    pub fn build(&self, dialect: Dialect, rule: &SqlReviewRule) -> Result<Option<Box<dyn Advisor>>, ConfigError> {
        let Some(meta) = RuleMeta::from_rule(rule) else {
            return Ok(None);
        };

        let factory = self
            .factories
            .get(&(dialect, rule.rule_type))
            .ok_or_else(|| ConfigError::UnsupportedRule {
                rule: rule.rule_type.as_str().to_string(),
                dialect,
            })?;

        factory(meta, rule).map(Some)
    }
}

impl std::fmt::Debug for AdvisorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort_by_key(|(dialect, rule_type)| (dialect.as_str(), *rule_type));
        f.debug_struct("AdvisorRegistry").field("rules", &keys).finish()
    }
}
