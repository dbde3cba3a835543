//! Advice codes and review findings
//!
//! IMPORTANT: Advice codes are versioned and stable.
//! NEVER renumber or remove codes - review UIs and pipeline gates match on them.
//! Add new codes with new names and numbers only.

use serde::{Deserialize, Serialize};

/// Advice code registry (v1)
///
/// Numbers are grouped by concern, e.g. 2xx statement, 3xx naming, 6xx table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdviceCode {
    /// No violation found
    Ok,

    /// Internal error while reviewing
    Internal,

    // Compatibility (1xx)
    /// DROP DATABASE
    CompatibilityDropDatabase,

    /// Renaming a table or view
    CompatibilityRenameTable,

    /// DROP TABLE / DROP VIEW
    CompatibilityDropTable,

    /// Renaming a column
    CompatibilityRenameColumn,

    /// Dropping a column
    CompatibilityDropColumn,

    /// Adding a primary key to an existing table
    CompatibilityAddPrimaryKey,

    /// Adding a unique key to an existing table
    CompatibilityAddUniqueKey,

    /// Adding a foreign key to an existing table
    CompatibilityAddForeignKey,

    /// Adding a check constraint to an existing table
    CompatibilityAddCheck,

    /// Changing a column type
    CompatibilityAlterColumn,

    // Statement (2xx)
    /// The native grammar rejected the statement
    StatementSyntaxError,

    /// Statement has no WHERE clause
    StatementNoWhere,

    /// SELECT *
    StatementSelectAll,

    /// LIKE pattern starting with a wildcard
    StatementLeadingWildcardLike,

    // Naming (3xx)
    /// Table name does not follow the naming convention
    NamingTableConventionMismatch,

    // Column (4xx)
    /// Table is missing a required column
    NoRequiredColumn,

    // Table (6xx)
    /// Table has no primary key
    TableNoPk,

    /// Table declares a foreign key
    TableHasFk,

    // DML (11xx)
    /// DELETE ... LIMIT
    DeleteUseLimit,

    /// UPDATE ... LIMIT
    UpdateUseLimit,

    /// INSERT ... LIMIT
    InsertUseLimit,

    // Comment (13xx)
    /// Comment longer than the configured maximum
    CommentTooLong,

    /// Comment removed although one is required
    CommentEmpty,
}

impl AdviceCode {
    /// Stable numeric value of the code
    pub fn number(&self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::Internal => 1,
            Self::CompatibilityDropDatabase => 101,
            Self::CompatibilityRenameTable => 102,
            Self::CompatibilityDropTable => 103,
            Self::CompatibilityRenameColumn => 104,
            Self::CompatibilityDropColumn => 105,
            Self::CompatibilityAddPrimaryKey => 106,
            Self::CompatibilityAddUniqueKey => 107,
            Self::CompatibilityAddForeignKey => 108,
            Self::CompatibilityAddCheck => 109,
            Self::CompatibilityAlterColumn => 111,
            Self::StatementSyntaxError => 201,
            Self::StatementNoWhere => 202,
            Self::StatementSelectAll => 203,
            Self::StatementLeadingWildcardLike => 204,
            Self::NamingTableConventionMismatch => 301,
            Self::NoRequiredColumn => 401,
            Self::TableNoPk => 601,
            Self::TableHasFk => 602,
            Self::DeleteUseLimit => 1104,
            Self::UpdateUseLimit => 1105,
            Self::InsertUseLimit => 1106,
            Self::CommentTooLong => 1301,
            Self::CommentEmpty => 1302,
        }
    }

    /// Get the advice code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Internal => "INTERNAL",
            Self::CompatibilityDropDatabase => "COMPATIBILITY_DROP_DATABASE",
            Self::CompatibilityRenameTable => "COMPATIBILITY_RENAME_TABLE",
            Self::CompatibilityDropTable => "COMPATIBILITY_DROP_TABLE",
            Self::CompatibilityRenameColumn => "COMPATIBILITY_RENAME_COLUMN",
            Self::CompatibilityDropColumn => "COMPATIBILITY_DROP_COLUMN",
            Self::CompatibilityAddPrimaryKey => "COMPATIBILITY_ADD_PRIMARY_KEY",
            Self::CompatibilityAddUniqueKey => "COMPATIBILITY_ADD_UNIQUE_KEY",
            Self::CompatibilityAddForeignKey => "COMPATIBILITY_ADD_FOREIGN_KEY",
            Self::CompatibilityAddCheck => "COMPATIBILITY_ADD_CHECK",
            Self::CompatibilityAlterColumn => "COMPATIBILITY_ALTER_COLUMN",
            Self::StatementSyntaxError => "STATEMENT_SYNTAX_ERROR",
            Self::StatementNoWhere => "STATEMENT_NO_WHERE",
            Self::StatementSelectAll => "STATEMENT_SELECT_ALL",
            Self::StatementLeadingWildcardLike => "STATEMENT_LEADING_WILDCARD_LIKE",
            Self::NamingTableConventionMismatch => "NAMING_TABLE_CONVENTION_MISMATCH",
            Self::NoRequiredColumn => "NO_REQUIRED_COLUMN",
            Self::TableNoPk => "TABLE_NO_PK",
            Self::TableHasFk => "TABLE_HAS_FK",
            Self::DeleteUseLimit => "DELETE_USE_LIMIT",
            Self::UpdateUseLimit => "UPDATE_USE_LIMIT",
            Self::InsertUseLimit => "INSERT_USE_LIMIT",
            Self::CommentTooLong => "COMMENT_TOO_LONG",
            Self::CommentEmpty => "COMMENT_EMPTY",
        }
    }
}

impl std::fmt::Display for AdviceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdviceStatus {
    /// Nothing to report
    Success,

    /// Advisory only - the pipeline proceeds
    Warn,

    /// Blocking - the pipeline refuses to run the script
    Error,
}

impl std::fmt::Display for AdviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single review finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    /// Severity of the finding
    pub status: AdviceStatus,

    /// Stable code of the violated condition
    pub code: AdviceCode,

    /// Rule that produced the finding
    pub title: String,

    /// Human-readable message
    pub content: String,

    /// 1-based line in the reviewed script, 0 when not tied to a statement
    pub line: usize,
}

impl Advice {
    /// Title of the advice emitted when nothing is wrong
    pub const OK_TITLE: &'static str = "OK";

    /// Title of the advice emitted for statements the grammar rejects
    pub const SYNTAX_ERROR_TITLE: &'static str = "Syntax error";

    /// Create a new advice
    pub fn new(
        status: AdviceStatus,
        code: AdviceCode,
        title: impl Into<String>,
        content: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            status,
            code,
            title: title.into(),
            content: content.into(),
            line,
        }
    }

    /// The single advice returned for a clean review
    pub fn success() -> Self {
        Self::new(AdviceStatus::Success, AdviceCode::Ok, Self::OK_TITLE, "", 0)
    }

    /// Advice for a statement the native grammar cannot parse
    pub fn syntax_error(message: impl Into<String>, line: usize) -> Self {
        Self::new(
            AdviceStatus::Error,
            AdviceCode::StatementSyntaxError,
            Self::SYNTAX_ERROR_TITLE,
            message,
            line,
        )
    }

    /// Whether this advice blocks execution
    pub fn is_blocking(&self) -> bool {
        self.status == AdviceStatus::Error
    }
}
