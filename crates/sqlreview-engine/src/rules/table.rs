//! Table shape rules: `table.require-pk` and `table.no-foreign-key`

use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};
use sqlreview_sql::ast::{AlterAction, ConstraintType, NodeKind, TableDef};

use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

pub fn build_require_pk(meta: RuleMeta, _rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    Ok(Box::new(RequirePk { meta }))
}

pub fn build_no_foreign_key(meta: RuleMeta, _rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    Ok(Box::new(NoForeignKey { meta }))
}

struct RequirePk {
    meta: RuleMeta,
}

impl Advisor for RequirePk {
    fn rule_type(&self) -> RuleType {
        RuleType::TableRequirePk
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };
        let NodeKind::CreateTable(create) = &node.kind else {
            return Ok(Vec::new());
        };

        if create.has_primary_key() {
            return Ok(Vec::new());
        }
        Ok(vec![self.meta.advice(
            AdviceCode::TableNoPk,
            format!("Table \"{}\" requires PRIMARY KEY", create.table.qualified_name()),
            node.last_line,
        )])
    }
}

struct NoForeignKey {
    meta: RuleMeta,
}

impl NoForeignKey {
    fn advice(&self, table: &TableDef, line: usize) -> Advice {
        self.meta.advice(
            AdviceCode::TableHasFk,
            format!("Foreign key is not allowed in the table \"{}\"", table.qualified_name()),
            line,
        )
    }
}

impl Advisor for NoForeignKey {
    fn rule_type(&self) -> RuleType {
        RuleType::TableNoForeignKey
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        match &node.kind {
            NodeKind::CreateTable(create) => {
                for column in &create.columns {
                    if column.has_constraint(ConstraintType::Foreign) {
                        out.push(self.advice(&create.table, column.line));
                    }
                }
                for constraint in &create.constraints {
                    if constraint.constraint_type == ConstraintType::Foreign {
                        out.push(self.advice(&create.table, constraint.line));
                    }
                }
            }
            NodeKind::AlterTable(alter) => {
                for item in &alter.items {
                    let foreign = match &item.action {
                        AlterAction::AddConstraint { constraint } => constraint.constraint_type == ConstraintType::Foreign,
                        AlterAction::AddColumn { column } => column.has_constraint(ConstraintType::Foreign),
                        _ => false,
                    };
                    if foreign {
                        out.push(self.advice(&alter.table, item.last_line));
                    }
                }
            }
            _ => {}
        }

        Ok(out)
    }
}
