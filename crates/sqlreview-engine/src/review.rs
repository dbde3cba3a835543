//! Review orchestration: split, convert, advise

use rayon::prelude::*;
use sqlreview_core::{Advice, ConfigError, Dialect, SqlReviewRule};
use sqlreview_sql::{convert, split_statements, ConvertError, Node, SplitError, SqlParser, Statement};

use crate::advisor::{Advisor, AdvisorInput, StatementContext};
use crate::registry::AdvisorRegistry;

/// Conditions that prevent a script from being reviewed at all
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("cannot split script: {0}")]
    Split(#[from] SplitError),

    #[error("cannot convert statement at line {line}: {source}")]
    Convert {
        line: usize,
        #[source]
        source: ConvertError,
    },

    #[error("invalid rule configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Reviews scripts of one dialect against rule descriptors
#[derive(Debug, Clone, Copy)]
pub struct SqlReviewer<'r> {
    registry: &'r AdvisorRegistry,
    dialect: Dialect,
}

impl<'r> SqlReviewer<'r> {
    pub fn new(registry: &'r AdvisorRegistry, dialect: Dialect) -> Self {
        Self { registry, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Review a script
    ///
    /// The result is never empty: a clean script yields a single success
    /// advice. Advice is ordered by statement, then by rule order, then by
    /// emission order within a rule. A statement the native grammar rejects
    /// contributes a syntax-error advice in its place, followed by whatever
    /// the raw-text advisors report for it.
    pub fn review(&self, script: &str, rules: &[SqlReviewRule]) -> Result<Vec<Advice>, ReviewError> {
        let advisors = self.advisors(rules)?;

        let statements = split_statements(script, self.dialect)?;
        if statements.is_empty() {
            return Ok(vec![Advice::success()]);
        }

        let needs_ast = advisors.iter().any(|a| a.input() == AdvisorInput::Ast);
        let parsed = if needs_ast {
            self.convert_all(&statements)?
        } else {
            statements.iter().map(|_| Parsed::Skipped).collect()
        };

        let dialect = self.dialect;
        let per_statement = statements
            .par_iter()
            .zip(&parsed)
            .map(|(statement, parsed)| {
                let ctx = StatementContext {
                    statement,
                    node: parsed.node(),
                    dialect,
                };
                check_statement(&advisors, &ctx, parsed)
            })
            .collect::<Result<Vec<_>, ReviewError>>()?;

        let advice: Vec<Advice> = per_statement.into_iter().flatten().collect();
        tracing::debug!(
            statements = statements.len(),
            advisors = advisors.len(),
            findings = advice.len(),
            "review finished"
        );

        if advice.is_empty() {
            Ok(vec![Advice::success()])
        } else {
            Ok(advice)
        }
    }

    /// Build advisors in rule order, skipping disabled rules
    fn advisors(&self, rules: &[SqlReviewRule]) -> Result<Vec<Box<dyn Advisor>>, ConfigError> {
        let mut advisors = Vec::with_capacity(rules.len());
        for rule in rules {
            if let Some(advisor) = self.registry.build(self.dialect, rule)? {
                advisors.push(advisor);
            }
        }
        tracing::debug!(count = advisors.len(), dialect = %self.dialect, "built advisors");
        Ok(advisors)
    }

    fn convert_all(&self, statements: &[Statement]) -> Result<Vec<Parsed>, ReviewError> {
        let parser = SqlParser::from_dialect(self.dialect);
        let mut parsed = Vec::with_capacity(statements.len());

        for statement in statements {
            let native = match parser.parse(statement) {
                Ok(native) => native,
                Err(e) => {
                    parsed.push(Parsed::SyntaxError(Advice::syntax_error(e.message, e.line)));
                    continue;
                }
            };
            let node = convert(&native, statement).map_err(|source| ReviewError::Convert {
                line: statement.first_line,
                source,
            })?;
            parsed.push(Parsed::Node(node));
        }

        Ok(parsed)
    }
}

/// Outcome of the native parse for one statement
enum Parsed {
    Node(Node),
    SyntaxError(Advice),
    /// No configured advisor needs the AST
    Skipped,
}

impl Parsed {
    fn node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

fn check_statement(
    advisors: &[Box<dyn Advisor>],
    ctx: &StatementContext<'_>,
    parsed: &Parsed,
) -> Result<Vec<Advice>, ReviewError> {
    let mut out = Vec::new();
    let syntax_error = match parsed {
        Parsed::SyntaxError(advice) => {
            out.push(advice.clone());
            true
        }
        _ => false,
    };

    for advisor in advisors {
        // AST advisors have nothing to inspect in a rejected statement
        if syntax_error && advisor.input() == AdvisorInput::Ast {
            continue;
        }
        out.extend(advisor.check(ctx)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlreview_core::{AdviceCode, AdviceStatus, RuleLevel, RuleType};

    fn rule(rule_type: RuleType) -> SqlReviewRule {
        SqlReviewRule::new(rule_type, RuleLevel::Warning)
    }

    #[test]
    fn empty_script_is_clean() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::Postgres);

        let advice = reviewer.review("  -- nothing here\n", &[rule(RuleType::TableRequirePk)]).unwrap();
        assert_eq!(advice, vec![Advice::success()]);
    }

    #[test]
    fn no_rules_is_clean() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::Postgres);

        let advice = reviewer.review("DELETE FROM t", &[]).unwrap();
        assert_eq!(advice, vec![Advice::success()]);
    }

    #[test]
    fn syntax_error_takes_the_statement_slot() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::Postgres);

        let advice = reviewer
            .review(
                "CREATE TABLE a (id int);\n\nCREATE TABLE (;\nCREATE TABLE b (id int)",
                &[rule(RuleType::TableRequirePk)],
            )
            .unwrap();
        let got: Vec<(AdviceStatus, AdviceCode, usize)> =
            advice.iter().map(|a| (a.status, a.code, a.line)).collect();
        assert_eq!(
            got,
            vec![
                (AdviceStatus::Warn, AdviceCode::TableNoPk, 1),
                (AdviceStatus::Error, AdviceCode::StatementSyntaxError, 3),
                (AdviceStatus::Warn, AdviceCode::TableNoPk, 4),
            ]
        );
    }

    #[test]
    fn text_rules_still_run_on_rejected_statements() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::MySql);

        let advice = reviewer
            .review(
                "DELETE FROM t LIMIT 1 garbage (",
                &[rule(RuleType::StatementRequireWhere), rule(RuleType::StatementDisallowLimit)],
            )
            .unwrap();
        let codes: Vec<AdviceCode> = advice.iter().map(|a| a.code).collect();
        assert_eq!(codes, vec![AdviceCode::StatementSyntaxError, AdviceCode::DeleteUseLimit]);
    }

    #[test]
    fn text_only_rules_skip_the_parser() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::MySql);

        // Not valid SQL, but the LIMIT rule only reads tokens
        let advice = reviewer
            .review("DELETE FROM t LIMIT 1 garbage (", &[rule(RuleType::StatementDisallowLimit)])
            .unwrap();
        assert_eq!(advice[0].code, AdviceCode::DeleteUseLimit);
    }

    #[test]
    fn split_errors_abort() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::Postgres);

        let err = reviewer.review("SELECT 'open", &[]).unwrap_err();
        assert!(matches!(err, ReviewError::Split(_)));
    }

    #[test]
    fn conversion_errors_abort() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::Postgres);

        let err = reviewer
            .review("SELECT 1;\nSELECT a.b.c.d FROM t", &[rule(RuleType::StatementNoSelectAll)])
            .unwrap_err();
        assert!(matches!(err, ReviewError::Convert { line: 2, .. }));
    }

    #[test]
    fn config_errors_come_first() {
        let registry = AdvisorRegistry::builtin();
        let reviewer = SqlReviewer::new(&registry, Dialect::Postgres);

        let bad = SqlReviewRule::new(RuleType::CommentLength, RuleLevel::Warning).with_payload("not json");
        // Even a script that cannot be split reports the configuration problem
        let err = reviewer.review("SELECT 'open", &[bad]).unwrap_err();
        assert!(matches!(err, ReviewError::Config(ConfigError::InvalidPayload { .. })));
    }
}
