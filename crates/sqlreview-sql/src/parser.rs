//! Native grammar boundary
//!
//! Parses one split statement with datafusion-sqlparser-rs. A few forms the
//! grammar does not accept but the converter models (`SET SCHEMA`, view
//! renames, MySQL `RENAME TABLE`) are recognized from tokens first. MySQL
//! `UPDATE ... [ORDER BY ...] LIMIT n` is parsed without its tail, and the
//! row count is kept beside the parsed root.

use sqlparser::dialect::{Dialect as NativeDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::{Parser, ParserError};
use sqlreview_core::Dialect;

use crate::ast::TableType;
use crate::splitter::{Statement, Token};

/// SQL parser with configurable dialect
pub struct SqlParser {
    dialect: Box<dyn NativeDialect>,
    kind: Dialect,
}

impl SqlParser {
    /// Create a SQL parser for PostgreSQL
    pub fn postgres() -> Self {
        Self {
            dialect: Box::new(PostgreSqlDialect {}),
            kind: Dialect::Postgres,
        }
    }

    /// Create a SQL parser for MySQL
    pub fn mysql() -> Self {
        Self {
            dialect: Box::new(MySqlDialect {}),
            kind: Dialect::MySql,
        }
    }

    /// Create a parser for a configured dialect
    pub fn from_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Postgres => Self::postgres(),
            Dialect::MySql => Self::mysql(),
        }
    }

    /// Dialect this parser was built for
    pub fn dialect(&self) -> Dialect {
        self.kind
    }

    /// Parse one statement into its native root
    pub fn parse(&self, statement: &Statement) -> Result<NativeStatement, ParseError> {
        if let Some(native) = recognize(statement) {
            return Ok(native);
        }

        if self.kind == Dialect::MySql {
            if let Some(tail) = update_tail(statement) {
                let root = self.parse_one(&statement.text[..tail.cut], statement.first_line)?;
                let limit = match tail.limit {
                    Some(offset) => Some(self.parse_limit(&statement.text[offset..], statement.first_line)?),
                    None => None,
                };
                return Ok(NativeStatement::Update {
                    root: Box::new(root),
                    limit,
                });
            }
        }

        let root = self.parse_one(&statement.text, statement.first_line)?;
        Ok(NativeStatement::Sql(Box::new(root)))
    }

    fn parse_one(&self, text: &str, line: usize) -> Result<sqlparser::ast::Statement, ParseError> {
        let mut parsed = Parser::parse_sql(&*self.dialect, text).map_err(|e| rejected(e, line))?;

        match parsed.len() {
            1 => Ok(parsed.remove(0)),
            n => Err(ParseError {
                message: format!("expected exactly one statement, found {}", n),
                line,
            }),
        }
    }

    fn parse_limit(&self, text: &str, line: usize) -> Result<sqlparser::ast::Expr, ParseError> {
        Parser::new(&*self.dialect)
            .try_with_sql(text)
            .and_then(|mut parser| parser.parse_expr())
            .map_err(|e| rejected(e, line))
    }
}

fn rejected(error: ParserError, line: usize) -> ParseError {
    tracing::warn!(line, error = %error, "native parser rejected statement");
    ParseError {
        message: error.to_string(),
        line,
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::postgres()
    }
}

/// Root of one parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum NativeStatement {
    /// Produced by the grammar parser
    Sql(Box<sqlparser::ast::Statement>),

    /// `ALTER TABLE|VIEW name SET SCHEMA schema`
    SetSchema {
        relation: TableType,
        name: Vec<String>,
        schema: String,
    },

    /// `ALTER VIEW name RENAME TO new` or MySQL `RENAME TABLE name TO new`
    RenameRelation {
        relation: TableType,
        name: Vec<String>,
        to: String,
    },

    /// MySQL `UPDATE` whose `ORDER BY`/`LIMIT` tail was parsed separately
    Update {
        root: Box<sqlparser::ast::Statement>,
        limit: Option<sqlparser::ast::Expr>,
    },

    /// Valid statement with no normalized form, such as a MySQL
    /// `RENAME TABLE` of several tables
    Unconverted,
}

/// Statement rejected by the native grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("SQL parse error at line {line}: {message}")]
pub struct ParseError {
    /// Message from the native parser
    pub message: String,

    /// First line of the rejected statement
    pub line: usize,
}

fn recognize(statement: &Statement) -> Option<NativeStatement> {
    let tokens = statement.tokens().ok()?;
    let tokens: Vec<Token<'_>> = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
    let mut cursor = Cursor { tokens: &tokens, pos: 0 };

    if cursor.keywords(&["ALTER"]) {
        let relation = if cursor.keywords(&["TABLE"]) {
            TableType::BaseTable
        } else if cursor.keywords(&["VIEW"]) {
            TableType::View
        } else {
            return None;
        };
        cursor.keywords(&["IF", "EXISTS"]);
        cursor.keywords(&["ONLY"]);
        let name = cursor.object_name()?;

        if cursor.keywords(&["SET", "SCHEMA"]) {
            let schema = cursor.ident()?;
            return cursor.at_end().then_some(NativeStatement::SetSchema { relation, name, schema });
        }
        if relation == TableType::View && cursor.keywords(&["RENAME", "TO"]) {
            let to = cursor.ident()?;
            return cursor.at_end().then_some(NativeStatement::RenameRelation { relation, name, to });
        }
        return None;
    }

    if statement.dialect == Dialect::MySql && cursor.keywords(&["RENAME", "TABLE"]) {
        let mut pairs = Vec::new();
        loop {
            let name = cursor.object_name()?;
            if !cursor.keywords(&["TO"]) {
                return None;
            }
            let to = cursor.object_name()?.pop()?;
            pairs.push((name, to));
            if !cursor.punct(',') {
                break;
            }
        }
        if !cursor.at_end() {
            return None;
        }
        if pairs.len() > 1 {
            return Some(NativeStatement::Unconverted);
        }
        let (name, to) = pairs.pop()?;
        return Some(NativeStatement::RenameRelation {
            relation: TableType::BaseTable,
            name,
            to,
        });
    }

    None
}

/// Byte offsets of a MySQL `UPDATE` tail
struct UpdateTail {
    /// Start of the top-level `ORDER BY` or `LIMIT`
    cut: usize,
    /// First byte after the `LIMIT` keyword
    limit: Option<usize>,
}

fn update_tail(statement: &Statement) -> Option<UpdateTail> {
    let tokens = statement.tokens().ok()?;
    let tokens: Vec<Token<'_>> = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
    if !tokens.first()?.is_keyword("UPDATE") {
        return None;
    }

    let mut depth = 0usize;
    let mut order_by = None;
    let mut limit = None;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 {
            if order_by.is_none()
                && token.is_keyword("ORDER")
                && tokens.get(i + 1).map_or(false, |t| t.is_keyword("BY"))
            {
                order_by = Some(token.offset);
            } else if token.is_keyword("LIMIT") {
                limit = Some(token);
            }
        }
    }

    let cut = order_by.or(limit.map(|t| t.offset))?;
    Some(UpdateTail {
        cut,
        limit: limit.map(|t| t.offset + t.text.len()),
    })
}

struct Cursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl Cursor<'_, '_> {
    /// Consume the keyword sequence only if all of it matches
    fn keywords(&mut self, words: &[&str]) -> bool {
        let matched = words.iter().enumerate().all(|(i, w)| {
            self.tokens
                .get(self.pos + i)
                .map_or(false, |t| t.is_keyword(w))
        });
        if matched {
            self.pos += words.len();
        }
        matched
    }

    fn ident(&mut self) -> Option<String> {
        let value = self.tokens.get(self.pos)?.ident_value()?;
        self.pos += 1;
        Some(value)
    }

    fn object_name(&mut self) -> Option<Vec<String>> {
        let mut parts = vec![self.ident()?];
        while self.tokens.get(self.pos).map_or(false, |t| t.is_punct('.')) {
            self.pos += 1;
            parts.push(self.ident()?);
        }
        Some(parts)
    }

    fn punct(&mut self, punct: char) -> bool {
        let matched = self.tokens.get(self.pos).map_or(false, |t| t.is_punct(punct));
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn at_end(&self) -> bool {
        self.pos == self.tokens.len()
    }
}
