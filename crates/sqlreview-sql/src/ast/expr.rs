//! Expression nodes
//!
//! Expression fidelity is partial on purpose. Shapes without a dedicated
//! variant become [`Expression::Unconverted`], but LIKE predicates and
//! subqueries found anywhere inside them are still reported through
//! [`Converted`].

use serde::Serialize;

use super::dml::SelectStmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    /// String literal
    String { value: String },
    ColumnRef(ColumnRef),
    FunctionCall { name: String, args: Vec<Expression> },
    /// Comparison or arithmetic
    Binary {
        op: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Bool { op: BoolOp, args: Vec<Expression> },
    PatternLike(PatternLike),
    Subquery(Subquery),
    Unconverted,
}

impl Expression {
    /// String literal value, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String { value } => Some(value),
            _ => None,
        }
    }

    /// `*` or `t.*`
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::ColumnRef(c) if c.column == "*")
    }
}

/// Column reference, `column` is `*` for wildcards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: None,
            column: column.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    And,
    Or,
    Not,
}

/// `expression [NOT] LIKE pattern`, ILIKE included
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternLike {
    pub not: bool,
    pub expression: Box<Expression>,
    pub pattern: Box<Expression>,
}

impl PatternLike {
    /// Literal pattern starting with `%`
    pub fn has_leading_wildcard(&self) -> bool {
        self.pattern.as_str().map_or(false, |p| p.starts_with('%'))
    }
}

/// Embedded SELECT
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subquery {
    pub select: Box<SelectStmt>,
}

/// Result of converting one expression
///
/// Bundles the primary node with every LIKE predicate and subquery found
/// while walking it, including those under unconverted shapes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Converted {
    pub expr: Expression,
    pub pattern_likes: Vec<PatternLike>,
    pub subqueries: Vec<Subquery>,
}

impl Default for Expression {
    fn default() -> Self {
        Self::Unconverted
    }
}

impl Converted {
    /// Take over the side lists of a child, returning its primary node
    pub fn absorb(&mut self, child: Converted) -> Expression {
        self.pattern_likes.extend(child.pattern_likes);
        self.subqueries.extend(child.subqueries);
        child.expr
    }
}
