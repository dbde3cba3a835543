//! Normalized, dialect-agnostic AST
//!
//! Every converted statement is one [`Node`]: its trimmed source text, the
//! line of its last character, and a [`NodeKind`] payload. Text and line are
//! assigned once by the converter and never change afterwards.

pub mod ddl;
pub mod dml;
pub mod expr;

use serde::Serialize;

pub use ddl::{
    AlterAction, AlterTableItem, AlterTableStmt, ColumnDef, CommentStmt, CommentTarget,
    ConstraintDef, ConstraintType, CreateDatabaseStmt, CreateIndexStmt, CreateSchemaStmt,
    CreateTableStmt, DropDatabaseStmt, DropIndexStmt, DropSchemaStmt, DropTableStmt, ForeignDef,
    IndexDef, IndexKey, IndexRef, TableDef, TableType,
};
pub use dml::{
    Assignment, CopyStmt, DeleteStmt, ExplainStmt, InsertStmt, QuerySpec, SelectBody, SelectStmt,
    SetOperation, UpdateStmt,
};
pub use expr::{BoolOp, ColumnRef, Converted, Expression, PatternLike, Subquery};

/// One converted statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Trimmed source text of the originating statement
    pub text: String,

    /// Line of the statement's last character
    pub last_line: usize,

    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Statement variants
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    CreateTable(CreateTableStmt),
    AlterTable(AlterTableStmt),
    CreateIndex(CreateIndexStmt),
    DropIndex(DropIndexStmt),
    DropTable(DropTableStmt),
    DropSchema(DropSchemaStmt),
    DropDatabase(DropDatabaseStmt),
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    Explain(ExplainStmt),
    Copy(CopyStmt),
    Comment(CommentStmt),
    CreateDatabase(CreateDatabaseStmt),
    CreateSchema(CreateSchemaStmt),
    /// Statement form the converter does not model
    Unconverted,
}

impl NodeKind {
    /// Stable variant name, used in logs and the CLI
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "create_table",
            Self::AlterTable(_) => "alter_table",
            Self::CreateIndex(_) => "create_index",
            Self::DropIndex(_) => "drop_index",
            Self::DropTable(_) => "drop_table",
            Self::DropSchema(_) => "drop_schema",
            Self::DropDatabase(_) => "drop_database",
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Explain(_) => "explain",
            Self::Copy(_) => "copy",
            Self::Comment(_) => "comment",
            Self::CreateDatabase(_) => "create_database",
            Self::CreateSchema(_) => "create_schema",
            Self::Unconverted => "unconverted",
        }
    }
}
