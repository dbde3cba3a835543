//! `naming.table`: table names follow a regex and a length limit

use regex::Regex;
use serde::Deserialize;
use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};
use sqlreview_sql::ast::{AlterAction, NodeKind, TableType};

use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingPayload {
    /// Regular expression a name must match
    pub format: String,
    /// 0 disables the length check
    #[serde(default)]
    pub max_length: usize,
}

pub fn build(meta: RuleMeta, rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    let payload = rule.payload::<NamingPayload>()?;
    let format = Regex::new(&payload.format).map_err(|e| ConfigError::InvalidPayload {
        rule: rule.rule_type.as_str().to_string(),
        message: e.to_string(),
    })?;

    Ok(Box::new(TableNaming {
        meta,
        format,
        max_length: payload.max_length,
    }))
}

struct TableNaming {
    meta: RuleMeta,
    format: Regex,
    max_length: usize,
}

impl TableNaming {
    fn check_name(&self, name: &str, line: usize, out: &mut Vec<Advice>) {
        if !self.format.is_match(name) {
            out.push(self.meta.advice(
                AdviceCode::NamingTableConventionMismatch,
                format!(
                    "\"{}\" mismatches table naming convention, naming format should be \"{}\"",
                    name,
                    self.format.as_str()
                ),
                line,
            ));
        }
        if self.max_length > 0 && name.chars().count() > self.max_length {
            out.push(self.meta.advice(
                AdviceCode::NamingTableConventionMismatch,
                format!(
                    "\"{}\" mismatches table naming convention, its length should be within {} characters",
                    name, self.max_length
                ),
                line,
            ));
        }
    }
}

impl Advisor for TableNaming {
    fn rule_type(&self) -> RuleType {
        RuleType::NamingTable
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        match &node.kind {
            NodeKind::CreateTable(create) => self.check_name(&create.table.name, node.last_line, &mut out),
            NodeKind::AlterTable(alter) if alter.table.table_type != TableType::View => {
                for item in &alter.items {
                    if let AlterAction::RenameTable { to } = &item.action {
                        self.check_name(to, item.last_line, &mut out);
                    }
                }
            }
            _ => {}
        }

        Ok(out)
    }
}
