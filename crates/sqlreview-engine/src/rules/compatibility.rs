//! `schema.backward-compatibility`: changes that can break existing data or
//! code reading it

use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};
use sqlreview_sql::ast::{AlterAction, ConstraintType, NodeKind};
use sqlreview_sql::Node;

use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

pub fn build(meta: RuleMeta, _rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    Ok(Box::new(BackwardCompatibility { meta }))
}

struct BackwardCompatibility {
    meta: RuleMeta,
}

impl Advisor for BackwardCompatibility {
    fn rule_type(&self) -> RuleType {
        RuleType::SchemaBackwardCompatibility
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };
        let Some(code) = incompatibility(node) else {
            return Ok(Vec::new());
        };

        Ok(vec![self.meta.advice(
            code,
            format!("\"{}\" may cause incompatibility with the existing data and code", node.text),
            node.last_line,
        )])
    }
}

/// First breaking change of a statement
fn incompatibility(node: &Node) -> Option<AdviceCode> {
    match &node.kind {
        NodeKind::DropDatabase(_) => Some(AdviceCode::CompatibilityDropDatabase),
        NodeKind::DropTable(_) => Some(AdviceCode::CompatibilityDropTable),
        NodeKind::CreateIndex(create) if create.index.unique => Some(AdviceCode::CompatibilityAddUniqueKey),
        NodeKind::AlterTable(alter) => alter.items.iter().find_map(|item| match &item.action {
            AlterAction::RenameTable { .. } => Some(AdviceCode::CompatibilityRenameTable),
            AlterAction::RenameColumn { .. } => Some(AdviceCode::CompatibilityRenameColumn),
            AlterAction::DropColumn { .. } => Some(AdviceCode::CompatibilityDropColumn),
            AlterAction::AlterColumnType { .. } => Some(AdviceCode::CompatibilityAlterColumn),
            AlterAction::AddConstraint { constraint } => match constraint.constraint_type {
                ConstraintType::Primary | ConstraintType::PrimaryUsingIndex => {
                    Some(AdviceCode::CompatibilityAddPrimaryKey)
                }
                ConstraintType::Unique | ConstraintType::UniqueUsingIndex => {
                    Some(AdviceCode::CompatibilityAddUniqueKey)
                }
                ConstraintType::Foreign => Some(AdviceCode::CompatibilityAddForeignKey),
                ConstraintType::Check => Some(AdviceCode::CompatibilityAddCheck),
                _ => None,
            },
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::node;
    use pretty_assertions::assert_eq;
    use sqlreview_core::Dialect;

    fn code(sql: &str) -> Option<AdviceCode> {
        incompatibility(&node(sql, Dialect::Postgres))
    }

    #[test]
    fn breaking_changes() {
        let cases = [
            ("DROP DATABASE shop", Some(AdviceCode::CompatibilityDropDatabase)),
            ("DROP TABLE t", Some(AdviceCode::CompatibilityDropTable)),
            ("DROP VIEW v", Some(AdviceCode::CompatibilityDropTable)),
            ("ALTER TABLE t RENAME TO u", Some(AdviceCode::CompatibilityRenameTable)),
            ("ALTER TABLE t RENAME COLUMN a TO b", Some(AdviceCode::CompatibilityRenameColumn)),
            ("ALTER TABLE t DROP COLUMN a", Some(AdviceCode::CompatibilityDropColumn)),
            ("ALTER TABLE t ADD PRIMARY KEY (id)", Some(AdviceCode::CompatibilityAddPrimaryKey)),
            ("ALTER TABLE t ADD CONSTRAINT uk UNIQUE (a)", Some(AdviceCode::CompatibilityAddUniqueKey)),
            (
                "ALTER TABLE t ADD CONSTRAINT fk FOREIGN KEY (a) REFERENCES u (id)",
                Some(AdviceCode::CompatibilityAddForeignKey),
            ),
            ("ALTER TABLE t ADD CONSTRAINT ck CHECK (a > 0)", Some(AdviceCode::CompatibilityAddCheck)),
            ("ALTER TABLE t ALTER COLUMN a TYPE bigint", Some(AdviceCode::CompatibilityAlterColumn)),
            ("CREATE UNIQUE INDEX idx ON t (a)", Some(AdviceCode::CompatibilityAddUniqueKey)),
        ];

        for (sql, want) in cases {
            assert_eq!(code(sql), want, "{}", sql);
        }
    }

    #[test]
    fn compatible_changes() {
        for sql in [
            "CREATE TABLE t (id int)",
            "ALTER TABLE t ADD COLUMN a int",
            "ALTER TABLE t ALTER COLUMN a SET NOT NULL",
            "CREATE INDEX idx ON t (a)",
            "SELECT * FROM t",
        ] {
            assert_eq!(code(sql), None, "{}", sql);
        }
    }

    #[test]
    fn one_advice_per_statement() {
        let node = node("ALTER TABLE t DROP COLUMN a, DROP COLUMN b", Dialect::Postgres);
        let statements = sqlreview_sql::split_statements(&node.text, Dialect::Postgres).unwrap();
        let rule = SqlReviewRule::new(RuleType::SchemaBackwardCompatibility, sqlreview_core::RuleLevel::Warning);
        let advisor = build(RuleMeta::from_rule(&rule).unwrap(), &rule).unwrap();

        let advice = advisor
            .check(&StatementContext {
                statement: &statements[0],
                node: Some(&node),
                dialect: Dialect::Postgres,
            })
            .unwrap();
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].code, AdviceCode::CompatibilityDropColumn);
    }
}
