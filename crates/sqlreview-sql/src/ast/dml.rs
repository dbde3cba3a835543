//! Data manipulation statements

use serde::Serialize;

use super::ddl::TableDef;
use super::expr::{Expression, PatternLike, Subquery};
use super::Node;

/// Set operation of a SELECT node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperation {
    None,
    Union,
    Intersect,
    Except,
}

/// SELECT, possibly a tree of set operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectStmt {
    pub body: SelectBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Expression>,
    /// Common table expressions of a WITH clause
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ctes: Vec<Subquery>,
}

/// Leaf row source or interior set-operation node
///
/// Interior nodes carry only the operation and their children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectBody {
    Query(QuerySpec),
    SetOperation {
        op: SetOperation,
        left: Box<SelectStmt>,
        right: Box<SelectStmt>,
    },
}

impl SelectStmt {
    pub fn new(body: SelectBody) -> Self {
        Self {
            body,
            limit: None,
            ctes: Vec::new(),
        }
    }

    pub fn set_operation(&self) -> SetOperation {
        match &self.body {
            SelectBody::Query(_) => SetOperation::None,
            SelectBody::SetOperation { op, .. } => *op,
        }
    }

    /// Leaf query specifications in left-to-right order
    pub fn leaves(&self) -> Vec<&QuerySpec> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a QuerySpec>) {
        match &self.body {
            SelectBody::Query(spec) => out.push(spec),
            SelectBody::SetOperation { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

/// Leaf SELECT
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QuerySpec {
    pub fields: Vec<Expression>,
    /// Base tables named in FROM, joins included
    pub tables: Vec<TableDef>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,
    /// LIKE predicates in fields, join conditions, WHERE and HAVING
    pub pattern_likes: Vec<PatternLike>,
    /// Subqueries in fields, FROM, join conditions, WHERE and HAVING
    pub subqueries: Vec<Subquery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStmt {
    pub table: TableDef,
    pub columns: Vec<String>,
    /// Rows of a literal VALUES list
    pub values: Vec<Vec<Expression>>,
    /// Source query when not a VALUES list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Box<SelectStmt>>,
    pub pattern_likes: Vec<PatternLike>,
    pub subqueries: Vec<Subquery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub column: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStmt {
    pub table: TableDef,
    pub assignments: Vec<Assignment>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,
    /// MySQL `UPDATE ... LIMIT n`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Expression>,
    pub pattern_likes: Vec<PatternLike>,
    pub subqueries: Vec<Subquery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteStmt {
    pub table: TableDef,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Expression>,
    pub pattern_likes: Vec<PatternLike>,
    pub subqueries: Vec<Subquery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainStmt {
    pub statement: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyStmt {
    /// `COPY table ...`; `None` when copying a query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Box<SelectStmt>>,
    /// `COPY ... TO|FROM 'file'`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Direction, true for COPY TO
    pub to: bool,
}
