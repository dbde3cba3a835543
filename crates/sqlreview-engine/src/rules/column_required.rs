//! `column.required`: every table keeps a configured set of columns

use serde::Deserialize;
use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};
use sqlreview_sql::ast::{AlterAction, NodeKind, TableDef};

use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequiredColumnsPayload {
    pub list: Vec<String>,
}

pub fn build(meta: RuleMeta, rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    let payload = rule.payload::<RequiredColumnsPayload>()?;
    Ok(Box::new(RequiredColumns {
        meta,
        required: payload.list,
    }))
}

struct RequiredColumns {
    meta: RuleMeta,
    required: Vec<String>,
}

impl RequiredColumns {
    fn advice(&self, table: &TableDef, missing: &[&str], line: usize) -> Advice {
        self.meta.advice(
            AdviceCode::NoRequiredColumn,
            format!(
                "Table \"{}\" requires columns: {}",
                table.qualified_name(),
                missing.join(", ")
            ),
            line,
        )
    }

    fn is_required(&self, column: &str) -> bool {
        self.required.iter().any(|r| r == column)
    }
}

impl Advisor for RequiredColumns {
    fn rule_type(&self) -> RuleType {
        RuleType::ColumnRequired
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };

        let (table, missing) = match &node.kind {
            NodeKind::CreateTable(create) => {
                let missing: Vec<&str> = self
                    .required
                    .iter()
                    .filter(|r| !create.columns.iter().any(|c| &c.name == *r))
                    .map(String::as_str)
                    .collect();
                (&create.table, missing)
            }
            NodeKind::AlterTable(alter) => {
                let missing: Vec<&str> = alter
                    .items
                    .iter()
                    .filter_map(|item| match &item.action {
                        AlterAction::DropColumn { column } => Some(column.as_str()),
                        AlterAction::RenameColumn { from, .. } => Some(from.as_str()),
                        _ => None,
                    })
                    .filter(|column| self.is_required(column))
                    .collect();
                (&alter.table, missing)
            }
            _ => return Ok(Vec::new()),
        };

        if missing.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![self.advice(table, &missing, node.last_line)])
    }
}
