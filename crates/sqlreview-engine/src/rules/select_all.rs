//! `statement.select.no-select-all`

use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};

use super::query_specs;
use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

pub fn build(meta: RuleMeta, _rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    Ok(Box::new(NoSelectAll { meta }))
}

struct NoSelectAll {
    meta: RuleMeta,
}

impl Advisor for NoSelectAll {
    fn rule_type(&self) -> RuleType {
        RuleType::StatementNoSelectAll
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };

        let select_all = query_specs(node)
            .iter()
            .any(|spec| spec.fields.iter().any(|f| f.is_wildcard()));
        if !select_all {
            return Ok(Vec::new());
        }

        Ok(vec![self.meta.advice(
            AdviceCode::StatementSelectAll,
            format!("\"{}\" uses SELECT all", node.text),
            node.last_line,
        )])
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{run_rule_tests, TestCase};
    use sqlreview_core::{Advice, AdviceCode, AdviceStatus, Dialect, RuleLevel, RuleType, SqlReviewRule};

    fn select_all(sql: &str, line: usize) -> Vec<Advice> {
        vec![Advice::new(
            AdviceStatus::Warn,
            AdviceCode::StatementSelectAll,
            "statement.select.no-select-all",
            format!("\"{}\" uses SELECT all", sql),
            line,
        )]
    }

    #[test]
    fn no_select_all() {
        let multi_line = "SELECT\n  *\nFROM t";
        let cases = vec![
            TestCase::new("SELECT a, b FROM t", vec![Advice::success()]),
            TestCase::new("SELECT * FROM t", select_all("SELECT * FROM t", 1)),
            TestCase::new("SELECT t.* FROM t", select_all("SELECT t.* FROM t", 1)),
            TestCase::new("SELECT count(*) FROM t", vec![Advice::success()]),
            TestCase::new(
                "INSERT INTO t SELECT * FROM u",
                select_all("INSERT INTO t SELECT * FROM u", 1),
            ),
            TestCase::new(multi_line, select_all(multi_line, 3)),
        ];

        let rule = SqlReviewRule::new(RuleType::StatementNoSelectAll, RuleLevel::Warning);
        run_rule_tests(&cases, &rule, Dialect::MySql);
    }
}
