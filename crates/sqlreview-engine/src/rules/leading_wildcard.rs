//! `statement.where.no-leading-wildcard-like`

use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};

use super::pattern_likes;
use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

pub fn build(meta: RuleMeta, _rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    Ok(Box::new(NoLeadingWildcard { meta }))
}

struct NoLeadingWildcard {
    meta: RuleMeta,
}

impl Advisor for NoLeadingWildcard {
    fn rule_type(&self) -> RuleType {
        RuleType::StatementNoLeadingWildcardLike
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };

        // One advice per statement, however many patterns match
        if !pattern_likes(node).iter().any(|p| p.has_leading_wildcard()) {
            return Ok(Vec::new());
        }
        Ok(vec![self.meta.advice(
            AdviceCode::StatementLeadingWildcardLike,
            format!("\"{}\" uses leading wildcard LIKE", node.text),
            node.last_line,
        )])
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{run_rule_tests, TestCase};
    use sqlreview_core::{Advice, AdviceCode, AdviceStatus, Dialect, RuleLevel, RuleType, SqlReviewRule};

    fn leading(sql: &str) -> Vec<Advice> {
        vec![Advice::new(
            AdviceStatus::Error,
            AdviceCode::StatementLeadingWildcardLike,
            "statement.where.no-leading-wildcard-like",
            format!("\"{}\" uses leading wildcard LIKE", sql),
            1,
        )]
    }

    #[test]
    fn leading_wildcard_like() {
        let nested = "SELECT * FROM t WHERE id IN (SELECT id FROM u WHERE name LIKE '%a')";
        let cases = vec![
            TestCase::new("SELECT * FROM t WHERE a LIKE 'abc%'", vec![Advice::success()]),
            TestCase::new("SELECT * FROM t WHERE a LIKE '%abc'", leading("SELECT * FROM t WHERE a LIKE '%abc'")),
            TestCase::new(
                "SELECT * FROM t WHERE a NOT LIKE '%a' OR b LIKE '%b'",
                leading("SELECT * FROM t WHERE a NOT LIKE '%a' OR b LIKE '%b'"),
            ),
            TestCase::new(nested, leading(nested)),
            TestCase::new("DELETE FROM t WHERE a LIKE '%x'", leading("DELETE FROM t WHERE a LIKE '%x'")),
        ];

        let rule = SqlReviewRule::new(RuleType::StatementNoLeadingWildcardLike, RuleLevel::Error);
        run_rule_tests(&cases, &rule, Dialect::Postgres);
    }
}
