//! Definition statements and the value objects they own

use serde::Serialize;

use super::expr::Expression;
use crate::data_type::DataType;

/// Kind of relation a table reference names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    BaseTable,
    View,
    Unknown,
}

/// Table reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    pub table_type: TableType,
}

impl TableDef {
    pub fn new(name: impl Into<String>, table_type: TableType) -> Self {
        Self {
            database: None,
            schema: None,
            name: name.into(),
            table_type,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Dotted name as written, e.g. `public.users`
    pub fn qualified_name(&self) -> String {
        [self.database.as_deref(), self.schema.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ConstraintDef>,
    /// Script line of the column's own definition
    pub line: usize,
}

impl ColumnDef {
    /// Whether an inline constraint of the given type is declared
    pub fn has_constraint(&self, constraint_type: ConstraintType) -> bool {
        self.constraints.iter().any(|c| c.constraint_type == constraint_type)
    }
}

/// Constraint category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    Primary,
    Unique,
    Foreign,
    Check,
    Default,
    NotNull,
    PrimaryUsingIndex,
    UniqueUsingIndex,
    Undefined,
}

/// Target of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignDef {
    pub table: TableDef,
    pub columns: Vec<String>,
}

/// Column or table constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub constraint_type: ConstraintType,
    /// Constrained columns; empty for inline column constraints
    pub keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign: Option<ForeignDef>,
    /// Check or default expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<Expression>,
    /// Source text of `expression`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_text: Option<String>,
    pub line: usize,
}

impl ConstraintDef {
    pub fn new(constraint_type: ConstraintType) -> Self {
        Self {
            name: None,
            constraint_type,
            keys: Vec::new(),
            foreign: None,
            expression: None,
            expression_text: None,
            line: 0,
        }
    }
}

/// Index key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum IndexKey {
    Column(String),
    /// Expression key, kept as source text
    Expression(String),
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub table: TableDef,
    pub keys: Vec<IndexKey>,
    pub unique: bool,
}

/// Index named by DROP INDEX
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTableStmt {
    pub table: TableDef,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    /// Table-level constraints
    pub constraints: Vec<ConstraintDef>,
}

impl CreateTableStmt {
    /// Primary key declared inline or as a table constraint
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.has_constraint(ConstraintType::Primary))
            || self.constraints.iter().any(|c| {
                matches!(
                    c.constraint_type,
                    ConstraintType::Primary | ConstraintType::PrimaryUsingIndex
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlterTableStmt {
    pub table: TableDef,
    /// Recognized sub-commands in document order
    pub items: Vec<AlterTableItem>,
}

/// One ALTER TABLE sub-command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlterTableItem {
    /// Inherited from the enclosing statement
    pub last_line: usize,
    #[serde(flatten)]
    pub action: AlterAction,
}

impl AlterTableItem {
    pub fn new(action: AlterAction) -> Self {
        Self { last_line: 0, action }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AlterAction {
    AddColumn { column: ColumnDef },
    DropColumn { column: String },
    AddConstraint { constraint: ConstraintDef },
    DropConstraint { name: String },
    SetNotNull { column: String },
    DropNotNull { column: String },
    AlterColumnType { column: String, data_type: DataType },
    SetDefault { column: String, expression: Expression, text: String },
    DropDefault { column: String },
    RenameColumn { from: String, to: String },
    RenameTable { to: String },
    RenameConstraint { from: String, to: String },
    RenameIndex { from: String, to: String },
    SetSchema { schema: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIndexStmt {
    pub index: IndexDef,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropIndexStmt {
    pub indexes: Vec<IndexRef>,
    pub if_exists: bool,
}

/// DROP TABLE or DROP VIEW
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropTableStmt {
    pub tables: Vec<TableDef>,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropSchemaStmt {
    pub schemas: Vec<String>,
    pub if_exists: bool,
    pub cascade: bool,
    pub restrict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropDatabaseStmt {
    pub databases: Vec<String>,
    pub if_exists: bool,
}

/// Object a COMMENT ON statement annotates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum CommentTarget {
    Table { table: TableDef },
    Column { table: TableDef, column: String },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentStmt {
    pub target: CommentTarget,
    /// `None` for `IS NULL`, which removes the comment
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDatabaseStmt {
    pub name: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSchemaStmt {
    /// Absent for `CREATE SCHEMA AUTHORIZATION role`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    pub if_not_exists: bool,
}
