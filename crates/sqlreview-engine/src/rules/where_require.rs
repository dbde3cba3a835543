//! `statement.where.require`: UPDATE, DELETE and table reads need WHERE

use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};
use sqlreview_sql::ast::NodeKind;

use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

pub fn build(meta: RuleMeta, _rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    Ok(Box::new(RequireWhere { meta }))
}

struct RequireWhere {
    meta: RuleMeta,
}

impl Advisor for RequireWhere {
    fn rule_type(&self) -> RuleType {
        RuleType::StatementRequireWhere
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };

        let missing = match &node.kind {
            NodeKind::Update(update) => update.where_clause.is_none(),
            NodeKind::Delete(delete) => delete.where_clause.is_none(),
            NodeKind::Select(select) => select
                .leaves()
                .iter()
                .any(|spec| !spec.tables.is_empty() && spec.where_clause.is_none()),
            _ => false,
        };

        if !missing {
            return Ok(Vec::new());
        }
        Ok(vec![self.meta.advice(
            AdviceCode::StatementNoWhere,
            format!("\"{}\" requires WHERE clause", node.text),
            node.last_line,
        )])
    }
}
