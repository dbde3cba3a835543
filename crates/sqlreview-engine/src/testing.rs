//! Regression harness for rule implementations
//!
//! Each case is one script and the exact advice list a rule must produce for
//! it, in order. Used by this crate's tests and available to downstream rule
//! suites.

use sqlreview_core::{Advice, Dialect, SqlReviewRule};

use crate::registry::AdvisorRegistry;
use crate::review::SqlReviewer;

/// One script and its expected advice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub statement: String,
    pub want: Vec<Advice>,
}

impl TestCase {
    pub fn new(statement: impl Into<String>, want: Vec<Advice>) -> Self {
        Self {
            statement: statement.into(),
            want,
        }
    }
}

/// Run every case through the built-in registry
///
/// # Panics
///
/// On a review error or the first case whose advice differs from `want`.
pub fn run_rule_tests(cases: &[TestCase], rule: &SqlReviewRule, dialect: Dialect) {
    run_rule_tests_with(&AdvisorRegistry::builtin(), cases, rule, dialect);
}

/// Run every case through a given registry
pub fn run_rule_tests_with(registry: &AdvisorRegistry, cases: &[TestCase], rule: &SqlReviewRule, dialect: Dialect) {
    let reviewer = SqlReviewer::new(registry, dialect);

    for (i, case) in cases.iter().enumerate() {
        let got = match reviewer.review(&case.statement, std::slice::from_ref(rule)) {
            Ok(got) => got,
            Err(e) => panic!("case {} ({:?}): review failed: {}", i, case.statement, e),
        };
        assert_eq!(
            got, case.want,
            "case {} ({:?}) with rule {} on {}",
            i, case.statement, rule.rule_type, dialect
        );
    }
}
