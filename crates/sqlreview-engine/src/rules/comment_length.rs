//! `comment.length`: COMMENT ON TABLE / COLUMN conventions

use serde::Deserialize;
use sqlreview_core::{Advice, AdviceCode, ConfigError, RuleType, SqlReviewRule};
use sqlreview_sql::ast::{CommentTarget, NodeKind};

use crate::advisor::{Advisor, RuleMeta, StatementContext};
use crate::review::ReviewError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    #[serde(default)]
    pub required: bool,
    /// Maximum number of characters; 0 disables the length check
    pub max_length: usize,
}

pub fn build(meta: RuleMeta, rule: &SqlReviewRule) -> Result<Box<dyn Advisor>, ConfigError> {
    let payload = rule.payload::<CommentPayload>()?;
    Ok(Box::new(CommentLength { meta, payload }))
}

struct CommentLength {
    meta: RuleMeta,
    payload: CommentPayload,
}

impl Advisor for CommentLength {
    fn rule_type(&self) -> RuleType {
        RuleType::CommentLength
    }

    fn check(&self, ctx: &StatementContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let Some(node) = ctx.node else {
            return Ok(Vec::new());
        };
        let NodeKind::Comment(comment) = &node.kind else {
            return Ok(Vec::new());
        };
        if matches!(comment.target, CommentTarget::Other) {
            return Ok(Vec::new());
        }

        let text = comment.comment.as_deref().unwrap_or_default();
        let mut out = Vec::new();

        if self.payload.required && text.is_empty() {
            out.push(self.meta.advice(AdviceCode::CommentEmpty, "Comment is required", node.last_line));
        }

        let max = self.payload.max_length;
        if max > 0 && text.chars().count() > max {
            out.push(self.meta.advice(
                AdviceCode::CommentTooLong,
                format!("The length of comment should be within {} characters", max),
                node.last_line,
            ));
        }

        Ok(out)
    }
}
