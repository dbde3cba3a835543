//! SQL splitting, parsing and conversion
//!
//! This crate handles:
//! - Splitting a script into statements with line information
//! - Parsing statements using datafusion-sqlparser-rs
//! - Converting parse trees into the review AST
//! - Normalizing column data types

pub mod splitter;
pub mod parser;
pub mod ast;
pub mod convert;
pub mod data_type;

pub use splitter::{split_statements, tokenize, SplitError, Statement, Token, TokenKind};
pub use parser::{NativeStatement, ParseError, SqlParser};
pub use ast::{Node, NodeKind};
pub use convert::{convert, finalize, ConvertError};
pub use data_type::{normalize, DataType, TypeName};
