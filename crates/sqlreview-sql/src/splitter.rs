//! Statement splitting
//!
//! A small dialect-aware lexer segments a migration script on top-level
//! semicolons. Semicolons inside string literals, quoted identifiers,
//! comments and dollar-quoted bodies never split a statement.

use serde::Serialize;
use sqlreview_core::Dialect;

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    /// Single-quoted literal, or double-quoted literal in MySQL
    String,
    /// Double-quoted identifier in PostgreSQL, backtick identifier in MySQL
    QuotedIdent,
    /// `$tag$ ... $tag$`
    DollarString,
    Word,
    Number,
    Punct,
    Semicolon,
}

/// One token borrowed from the lexed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset in the lexed text
    pub offset: usize,
    /// 1-based line of the first character
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Whitespace and comments
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Case-insensitive keyword test
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Single punctuation character test
    pub fn is_punct(&self, punct: char) -> bool {
        self.kind == TokenKind::Punct && self.text.len() == punct.len_utf8() && self.text.starts_with(punct)
    }

    /// Line of the last character
    pub fn end_line(&self) -> usize {
        self.line + self.text.matches('\n').count()
    }

    /// Identifier value with quoting removed
    pub fn ident_value(&self) -> Option<String> {
        match self.kind {
            TokenKind::Word => Some(self.text.to_string()),
            TokenKind::QuotedIdent => {
                let quote = &self.text[..1];
                let inner = &self.text[1..self.text.len() - 1];
                Some(inner.replace(&quote.repeat(2), quote))
            }
            _ => None,
        }
    }
}

/// Script could not be segmented
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: usize },

    #[error("unterminated quoted identifier starting at line {line}")]
    UnterminatedIdentifier { line: usize },

    #[error("unterminated block comment starting at line {line}")]
    UnterminatedComment { line: usize },

    #[error("unterminated dollar-quoted string starting at line {line}")]
    UnterminatedDollarQuote { line: usize },
}

/// One statement of a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Trimmed source text, without the terminating semicolon
    pub text: String,

    /// 1-based line of the first character of `text`
    pub first_line: usize,

    /// 1-based line of the last character of `text`
    pub last_line: usize,

    pub dialect: Dialect,
}

impl Statement {
    /// Re-lex the statement text
    ///
    /// Token lines are relative to the statement; add `first_line - 1` for
    /// script lines.
    pub fn tokens(&self) -> Result<Vec<Token<'_>>, SplitError> {
        tokenize(&self.text, self.dialect)
    }

    /// Script line of a token produced by [`Statement::tokens`]
    pub fn script_line(&self, token: &Token<'_>) -> usize {
        self.first_line + token.line - 1
    }
}

/// Split a script into statements
pub fn split_statements(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, SplitError> {
    let tokens = tokenize(sql, dialect)?;
    let mut statements = Vec::new();

    for segment in tokens.split(|t| t.kind == TokenKind::Semicolon) {
        let meaningful = segment.iter().any(|t| !t.is_trivia());
        if !meaningful {
            continue;
        }

        let first = segment.iter().find(|t| t.kind != TokenKind::Whitespace);
        let last = segment.iter().rev().find(|t| t.kind != TokenKind::Whitespace);

        if let (Some(first), Some(last)) = (first, last) {
            let end = last.offset + last.text.len();
            statements.push(Statement {
                text: sql[first.offset..end].to_string(),
                first_line: first.line,
                last_line: last.end_line(),
                dialect,
            });
        }
    }

    tracing::debug!(count = statements.len(), %dialect, "split script into statements");

    Ok(statements)
}

/// Lex SQL text into tokens, trivia included
pub fn tokenize(sql: &str, dialect: Dialect) -> Result<Vec<Token<'_>>, SplitError> {
    Lexer::new(sql, dialect).run()
}

struct Lexer<'a> {
    sql: &'a str,
    bytes: &'a [u8],
    dialect: Dialect,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(sql: &'a str, dialect: Dialect) -> Self {
        Self {
            sql,
            bytes: sql.as_bytes(),
            dialect,
            pos: 0,
            line: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Token<'a>>, SplitError> {
        let mut tokens = Vec::new();

        while self.pos < self.bytes.len() {
            let start = self.pos;
            let kind = self.next_kind()?;
            let text = &self.sql[start..self.pos];
            tokens.push(Token {
                kind,
                text,
                offset: start,
                line: self.line,
            });
            self.line += text.matches('\n').count();
        }

        Ok(tokens)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn is_mysql(&self) -> bool {
        self.dialect == Dialect::MySql
    }

    /// Consume one token starting at `self.pos` and return its kind
    fn next_kind(&mut self) -> Result<TokenKind, SplitError> {
        let b = self.bytes[self.pos];

        match b {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0c => {
                while matches!(self.peek(0), Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0c)) {
                    self.pos += 1;
                }
                Ok(TokenKind::Whitespace)
            }
            b'-' if self.peek(1) == Some(b'-') => Ok(self.line_comment()),
            b'#' if self.is_mysql() => Ok(self.line_comment()),
            b'/' if self.peek(1) == Some(b'*') => self.block_comment(),
            b'\'' => {
                self.pos += 1;
                self.quoted(b'\'', self.is_mysql())
                    .ok_or(SplitError::UnterminatedString { line: self.line })?;
                Ok(TokenKind::String)
            }
            b'e' | b'E' if !self.is_mysql() && self.peek(1) == Some(b'\'') => {
                self.pos += 2;
                self.quoted(b'\'', true)
                    .ok_or(SplitError::UnterminatedString { line: self.line })?;
                Ok(TokenKind::String)
            }
            b'"' => {
                self.pos += 1;
                if self.is_mysql() {
                    self.quoted(b'"', true)
                        .ok_or(SplitError::UnterminatedString { line: self.line })?;
                    Ok(TokenKind::String)
                } else {
                    self.quoted(b'"', false)
                        .ok_or(SplitError::UnterminatedIdentifier { line: self.line })?;
                    Ok(TokenKind::QuotedIdent)
                }
            }
            b'`' if self.is_mysql() => {
                self.pos += 1;
                self.quoted(b'`', false)
                    .ok_or(SplitError::UnterminatedIdentifier { line: self.line })?;
                Ok(TokenKind::QuotedIdent)
            }
            b'$' if !self.is_mysql() => self.dollar(),
            b';' => {
                self.pos += 1;
                Ok(TokenKind::Semicolon)
            }
            b'0'..=b'9' => {
                while matches!(self.peek(0), Some(c) if c.is_ascii_alphanumeric() || c == b'.' || c == b'_') {
                    self.pos += 1;
                }
                Ok(TokenKind::Number)
            }
            c if is_word_start(c) => {
                self.pos += 1;
                let dollar_in_words = !self.is_mysql();
                while matches!(self.peek(0), Some(c) if is_word_part(c) || (dollar_in_words && c == b'$')) {
                    self.pos += 1;
                }
                Ok(TokenKind::Word)
            }
            _ => {
                self.pos += 1;
                Ok(TokenKind::Punct)
            }
        }
    }

    fn line_comment(&mut self) -> TokenKind {
        while matches!(self.peek(0), Some(c) if c != b'\n') {
            self.pos += 1;
        }
        TokenKind::LineComment
    }

    fn block_comment(&mut self) -> Result<TokenKind, SplitError> {
        let nested = !self.is_mysql();
        let mut depth = 0usize;

        while self.pos < self.bytes.len() {
            match (self.peek(0), self.peek(1)) {
                (Some(b'/'), Some(b'*')) if depth == 0 || nested => {
                    depth += 1;
                    self.pos += 2;
                }
                (Some(b'*'), Some(b'/')) => {
                    depth -= 1;
                    self.pos += 2;
                    if depth == 0 {
                        return Ok(TokenKind::BlockComment);
                    }
                }
                _ => self.pos += 1,
            }
        }

        Err(SplitError::UnterminatedComment { line: self.line })
    }

    /// Scan to the closing quote; the opening quote is already consumed.
    /// A doubled quote is an escaped quote.
    fn quoted(&mut self, quote: u8, backslash_escapes: bool) -> Option<()> {
        while let Some(c) = self.peek(0) {
            if backslash_escapes && c == b'\\' {
                self.pos += 2;
                continue;
            }
            self.pos += 1;
            if c == quote {
                if self.peek(0) == Some(quote) {
                    self.pos += 1;
                    continue;
                }
                return Some(());
            }
        }
        self.pos = self.bytes.len();
        None
    }

    fn dollar(&mut self) -> Result<TokenKind, SplitError> {
        let start = self.pos;
        let mut end = start + 1;
        while matches!(self.bytes.get(end), Some(&c) if is_word_part(c)) {
            end += 1;
        }

        let is_tag = self.bytes.get(end) == Some(&b'$')
            && !matches!(self.bytes.get(start + 1), Some(c) if c.is_ascii_digit());

        if !is_tag {
            self.pos += 1;
            return Ok(TokenKind::Punct);
        }

        let tag = &self.sql[start..=end];
        let body_start = end + 1;
        match self.sql[body_start..].find(tag) {
            Some(idx) => {
                self.pos = body_start + idx + tag.len();
                Ok(TokenKind::DollarString)
            }
            None => Err(SplitError::UnterminatedDollarQuote { line: self.line }),
        }
    }
}

fn is_word_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

fn is_word_part(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80
}
