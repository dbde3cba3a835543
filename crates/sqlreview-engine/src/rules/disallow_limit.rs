//! `statement.disallow-limit`: no LIMIT on INSERT, UPDATE or DELETE
//!
//! Works on tokens, so statements the native grammar rejects are still
//! checked.

use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};
use sqlreview_sql::Token;

use crate::advisor::{Advisor, AdvisorInput, RuleMeta, StatementContext};
use crate::review::ReviewError;

pub fn build(meta: RuleMeta, _rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    Ok(Box::new(DisallowLimit { meta }))
}

struct DisallowLimit {
    meta: RuleMeta,
}

impl Advisor for DisallowLimit {
    fn rule_type(&self) -> RuleType {
        RuleType::StatementDisallowLimit
    }

    fn input(&self) -> AdvisorInput {
        AdvisorInput::Statements
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let tokens = ctx.statement.tokens()?;
        let tokens: Vec<Token<'_>> = tokens.into_iter().filter(|t| !t.is_trivia()).collect();

        let Some(code) = verb(&tokens) else {
            return Ok(Vec::new());
        };
        if !has_statement_limit(&tokens) {
            return Ok(Vec::new());
        }

        let content = format!(
            "LIMIT clause is forbidden in INSERT, UPDATE and DELETE statement, but \"{}\" uses",
            ctx.statement.text
        );
        Ok(vec![self.meta.advice(code, content, ctx.statement.first_line)])
    }
}

/// Advice code for the statement's DML verb, skipping a leading WITH clause
fn verb(tokens: &[Token<'_>]) -> Option<AdviceCode> {
    let first = tokens.first()?;
    let verb = if first.is_keyword("WITH") {
        top_level(tokens).find(|t| is_verb(t) || t.is_keyword("SELECT"))?
    } else {
        first
    };

    if verb.is_keyword("INSERT") || verb.is_keyword("REPLACE") {
        Some(AdviceCode::InsertUseLimit)
    } else if verb.is_keyword("UPDATE") {
        Some(AdviceCode::UpdateUseLimit)
    } else if verb.is_keyword("DELETE") {
        Some(AdviceCode::DeleteUseLimit)
    } else {
        None
    }
}

fn is_verb(token: &Token<'_>) -> bool {
    ["INSERT", "REPLACE", "UPDATE", "DELETE"]
        .iter()
        .any(|k| token.is_keyword(k))
}

/// LIMIT of the statement itself
///
/// Parentheses around the INSERT source or around a set-operation arm belong
/// to the statement. Derived tables, CTE bodies and expression subqueries
/// do not.
fn has_statement_limit(tokens: &[Token<'_>]) -> bool {
    // One entry per open parenthesis: does it wrap part of the statement
    let mut open: Vec<bool> = Vec::new();
    let mut seen_insert = false;
    let mut seen_select = false;

    for (i, token) in tokens.iter().enumerate() {
        let visible = open.iter().all(|&wraps| wraps);

        if token.is_punct('(') {
            let wraps = visible && starts_query(tokens.get(i + 1)) && {
                let insert_source = seen_insert && !seen_select && open.is_empty();
                match i.checked_sub(1).map(|p| &tokens[p]) {
                    None => true,
                    Some(prev) if prev.is_punct('(') || is_set_operator(prev) => true,
                    Some(prev) if prev.is_keyword("ALL") || prev.is_keyword("DISTINCT") => {
                        i >= 2 && is_set_operator(&tokens[i - 2])
                    }
                    Some(prev) => {
                        insert_source
                            && !prev.is_keyword("VALUES")
                            && (prev.is_punct(')') || prev.ident_value().is_some())
                    }
                }
            };
            open.push(wraps);
        } else if token.is_punct(')') {
            open.pop();
        } else if visible {
            if token.is_keyword("LIMIT") {
                return true;
            }
            seen_insert |= token.is_keyword("INSERT") || token.is_keyword("REPLACE");
            seen_select |= token.is_keyword("SELECT");
        }
    }

    false
}

fn starts_query(token: Option<&Token<'_>>) -> bool {
    token.map_or(false, |t| t.is_keyword("SELECT") || t.is_keyword("WITH") || t.is_punct('('))
}

fn is_set_operator(token: &Token<'_>) -> bool {
    ["UNION", "INTERSECT", "EXCEPT"].iter().any(|k| token.is_keyword(k))
}

/// Tokens outside any parentheses
fn top_level<'t, 'a>(tokens: &'t [Token<'a>]) -> impl Iterator<Item = &'t Token<'a>> {
    let mut depth = 0usize;
    tokens.iter().filter(move |t| {
        if t.is_punct('(') {
            depth += 1;
            false
        } else if t.is_punct(')') {
            depth = depth.saturating_sub(1);
            false
        } else {
            depth == 0
        }
    })
}
