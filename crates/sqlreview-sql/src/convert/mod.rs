//! Native parse tree to normalized AST
//!
//! Conversion is two-phase. [`Converter`] builds a [`NodeKind`] from the
//! native tree; [`finalize`] then stamps text and line metadata onto the
//! node: CREATE TABLE columns and constraints get their own script lines from
//! a re-lex of the statement, ALTER TABLE items inherit the statement's last
//! line.

mod ddl;
mod dml;
mod expr;

use sqlparser::ast::{Ident, ObjectName, Statement as NativeRoot};
use sqlreview_core::Dialect;

use crate::ast::{
    AlterAction, AlterTableItem, AlterTableStmt, ColumnDef, CreateTableStmt, ExplainStmt, Node,
    NodeKind, TableDef, TableType,
};
use crate::parser::NativeStatement;
use crate::splitter::{Statement, Token};

/// Native node shape the converter cannot map
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("expected {expected} but found {found}")]
    Unexpected { expected: &'static str, found: String },

    #[error("too many name parts in \"{name}\"")]
    TooManyNameParts { name: String },
}

/// Convert one parsed statement
pub fn convert(native: &NativeStatement, statement: &Statement) -> Result<Node, ConvertError> {
    let converter = Converter { source: statement };

    let kind = match native {
        NativeStatement::Sql(root) => converter.statement(root)?,
        NativeStatement::SetSchema { relation, name, schema } => NodeKind::AlterTable(AlterTableStmt {
            table: converter.table_from_parts(name.clone(), *relation)?,
            items: vec![AlterTableItem::new(AlterAction::SetSchema {
                schema: schema.clone(),
            })],
        }),
        NativeStatement::RenameRelation { relation, name, to } => NodeKind::AlterTable(AlterTableStmt {
            table: converter.table_from_parts(name.clone(), *relation)?,
            items: vec![AlterTableItem::new(AlterAction::RenameTable { to: to.clone() })],
        }),
        NativeStatement::Update { root, limit } => {
            let mut kind = converter.statement(root)?;
            if let (NodeKind::Update(update), Some(limit)) = (&mut kind, limit) {
                update.limit = Some(converter.expression(limit)?.expr);
            }
            kind
        }
        NativeStatement::Unconverted => NodeKind::Unconverted,
    };

    tracing::debug!(line = statement.first_line, kind = kind.name(), "converted statement");

    Ok(finalize(kind, statement))
}

/// Second phase: attach text and lines
pub fn finalize(mut kind: NodeKind, statement: &Statement) -> Node {
    match &mut kind {
        NodeKind::CreateTable(create) => backfill_lines(create, statement),
        NodeKind::AlterTable(alter) => {
            for item in &mut alter.items {
                item.last_line = statement.last_line;
            }
        }
        _ => {}
    }

    Node {
        text: statement.text.trim().to_string(),
        last_line: statement.last_line,
        kind,
    }
}

/// Converts native nodes of one statement
pub(crate) struct Converter<'s> {
    source: &'s Statement,
}

impl Converter<'_> {
    fn dialect(&self) -> Dialect {
        self.source.dialect
    }

    /// Build a table reference from a dotted name
    ///
    /// PostgreSQL reads `a.b` as schema.table, MySQL as database.table.
    fn table_from_parts(&self, mut parts: Vec<String>, table_type: TableType) -> Result<TableDef, ConvertError> {
        let name = parts.join(".");
        let table = match parts.len() {
            1 => TableDef::new(parts.remove(0), table_type),
            2 => {
                let qualifier = parts.remove(0);
                let table = TableDef::new(parts.remove(0), table_type);
                match self.dialect() {
                    Dialect::Postgres => table.with_schema(qualifier),
                    Dialect::MySql => table.with_database(qualifier),
                }
            }
            3 => {
                let database = parts.remove(0);
                let schema = parts.remove(0);
                TableDef::new(parts.remove(0), table_type)
                    .with_database(database)
                    .with_schema(schema)
            }
            _ => return Err(ConvertError::TooManyNameParts { name }),
        };
        Ok(table)
    }

    fn table(&self, name: &ObjectName, table_type: TableType) -> Result<TableDef, ConvertError> {
        self.table_from_parts(idents(&name.0), table_type)
    }

    /// Unqualified object name
    fn single_name(&self, name: &ObjectName) -> Result<String, ConvertError> {
        match name.0.as_slice() {
            [ident] => Ok(ident.value.clone()),
            _ => Err(ConvertError::TooManyNameParts {
                name: name.to_string(),
            }),
        }
    }
}

impl Converter<'_> {
    /// First phase: map one native statement to a node variant
    fn statement(&self, root: &NativeRoot) -> Result<NodeKind, ConvertError> {
        match root {
            NativeRoot::CreateTable(create) => self.create_table(create),
            NativeRoot::AlterTable { name, operations, .. } => self.alter_table(name, operations),
            NativeRoot::AlterIndex { name, operation, .. } => self.alter_index(name, operation),
            NativeRoot::CreateIndex(create) => self.create_index(create),
            NativeRoot::Drop {
                object_type,
                if_exists,
                names,
                cascade,
                restrict,
                ..
            } => self.drop(object_type, names, *if_exists, *cascade, *restrict),
            NativeRoot::Query(query) => Ok(NodeKind::Select(self.query(query)?)),
            NativeRoot::Insert(insert) => self.insert(insert),
            NativeRoot::Update { table, assignments, selection, .. } => {
                self.update(table, assignments, selection.as_ref())
            }
            NativeRoot::Delete(delete) => self.delete(delete),
            NativeRoot::Explain { statement, .. } => {
                let inner = finalize(self.statement(statement)?, self.source);
                Ok(NodeKind::Explain(ExplainStmt {
                    statement: Box::new(inner),
                }))
            }
            NativeRoot::Copy { source, to, target, .. } => self.copy(source, *to, target),
            NativeRoot::Comment { object_type, object_name, comment, .. } => {
                self.comment(object_type, object_name, comment)
            }
            NativeRoot::CreateDatabase { db_name, if_not_exists, .. } => {
                self.create_database(db_name, *if_not_exists)
            }
            NativeRoot::CreateSchema { schema_name, if_not_exists, .. } => {
                self.create_schema(schema_name, *if_not_exists)
            }
            _ => Ok(NodeKind::Unconverted),
        }
    }
}

fn idents(parts: &[Ident]) -> Vec<String> {
    parts.iter().map(|ident| ident.value.clone()).collect()
}

/// Last component of a possibly qualified name
fn last_part(name: &ObjectName) -> String {
    name.0.last().map(|ident| ident.value.clone()).unwrap_or_default()
}

fn backfill_lines(create: &mut CreateTableStmt, statement: &Statement) {
    for column in &mut create.columns {
        set_column_line(column, statement.last_line);
    }
    for constraint in &mut create.constraints {
        constraint.line = statement.last_line;
    }

    if create.columns.is_empty() && create.constraints.is_empty() {
        return;
    }
    let Ok(tokens) = statement.tokens() else {
        return;
    };

    let mut columns = create.columns.iter_mut().peekable();
    let mut constraints = create.constraints.iter_mut();

    for first in table_elements(&tokens) {
        let line = statement.script_line(first);
        let starts_column = match (columns.peek(), first.ident_value()) {
            (Some(column), Some(ident)) => column.name == ident,
            _ => false,
        };

        if starts_column {
            if let Some(column) = columns.next() {
                set_column_line(column, line);
            }
        } else if let Some(constraint) = constraints.next() {
            constraint.line = line;
        }
    }
}

fn set_column_line(column: &mut ColumnDef, line: usize) {
    column.line = line;
    for constraint in &mut column.constraints {
        constraint.line = line;
    }
}

/// First token of every element of the parenthesized table element list
fn table_elements<'t, 'a>(tokens: &'t [Token<'a>]) -> Vec<&'t Token<'a>> {
    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut expect_element = false;

    for token in tokens.iter().filter(|t| !t.is_trivia()) {
        if token.is_punct('(') {
            depth += 1;
            if depth == 1 {
                expect_element = true;
                continue;
            }
        } else if token.is_punct(')') {
            if depth == 1 {
                break;
            }
            depth = depth.saturating_sub(1);
        } else if depth == 1 && token.is_punct(',') {
            expect_element = true;
            continue;
        }

        if expect_element && depth == 1 {
            elements.push(token);
            expect_element = false;
        }
    }

    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        ConstraintType, Expression, IndexKey, QuerySpec, SelectBody, SetOperation,
    };
    use crate::data_type::DataType;
    use crate::parser::SqlParser;
    use crate::splitter::split_statements;
    use pretty_assertions::assert_eq;

    fn convert_one(sql: &str, dialect: Dialect) -> Result<Node, ConvertError> {
        let statement = split_statements(sql, dialect).unwrap().remove(0);
        let native = SqlParser::from_dialect(dialect).parse(&statement).unwrap();
        convert(&native, &statement)
    }

    fn pg(sql: &str) -> Node {
        convert_one(sql, Dialect::Postgres).unwrap()
    }

    fn first_leaf(sql: &str) -> QuerySpec {
        let NodeKind::Select(select) = pg(sql).kind else {
            panic!("expected select: {}", sql);
        };
        select.leaves()[0].clone()
    }

    #[test]
    fn create_table_lines_are_backfilled() {
        let sql = "\nCREATE TABLE public.book (\n  id serial PRIMARY KEY,\n  name varchar(64) NOT NULL,\n  price numeric(10, 2),\n  CONSTRAINT uk_name UNIQUE (name)\n);";
        let node = pg(sql);

        assert_eq!(node.last_line, 7);
        let NodeKind::CreateTable(create) = node.kind else {
            panic!("expected create table");
        };
        assert_eq!(create.table.schema.as_deref(), Some("public"));
        assert_eq!(create.table.name, "book");

        let lines: Vec<usize> = create.columns.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(create.columns[0].data_type, DataType::Serial { size: 4 });
        assert_eq!(create.columns[1].data_type, DataType::CharacterVarying { size: 64 });
        assert_eq!(create.columns[1].constraints[0].constraint_type, ConstraintType::NotNull);
        assert_eq!(create.columns[1].constraints[0].line, 4);
        assert_eq!(create.constraints[0].line, 6);
        assert_eq!(create.constraints[0].name.as_deref(), Some("uk_name"));
        assert_eq!(create.constraints[0].keys, vec!["name".to_string()]);
        assert!(create.has_primary_key());
    }

    #[test]
    fn alter_table_items_inherit_last_line() {
        let node = pg("ALTER TABLE t\n  ADD COLUMN c int,\n  DROP COLUMN d,\n  ALTER COLUMN e SET NOT NULL");
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };

        assert_eq!(alter.items.len(), 3);
        assert!(alter.items.iter().all(|item| item.last_line == 4));
        assert!(matches!(alter.items[0].action, AlterAction::AddColumn { .. }));
        assert_eq!(alter.items[1].action, AlterAction::DropColumn { column: "d".to_string() });
        assert_eq!(alter.items[2].action, AlterAction::SetNotNull { column: "e".to_string() });
    }

    #[test]
    fn renames_become_alter_table() {
        let node = pg("ALTER TABLE t RENAME COLUMN a TO b");
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };
        assert_eq!(
            alter.items[0].action,
            AlterAction::RenameColumn { from: "a".to_string(), to: "b".to_string() }
        );

        let node = pg("ALTER TABLE t RENAME TO t2");
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };
        assert_eq!(alter.items, vec![AlterTableItem {
            last_line: 1,
            action: AlterAction::RenameTable { to: "t2".to_string() },
        }]);

        let node = pg("ALTER INDEX public.idx_a RENAME TO idx_b");
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };
        assert_eq!(
            alter.items[0].action,
            AlterAction::RenameIndex { from: "idx_a".to_string(), to: "idx_b".to_string() }
        );
    }

    #[test]
    fn unmodeled_alter_commands_are_skipped_in_order() {
        let node = pg("ALTER TABLE t\n  ADD COLUMN a int,\n  OWNER TO bob,\n  ALTER COLUMN c ADD GENERATED ALWAYS AS IDENTITY,\n  ENABLE TRIGGER trg,\n  DROP COLUMN b");
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };

        assert_eq!(alter.items.len(), 2);
        assert!(matches!(alter.items[0].action, AlterAction::AddColumn { ref column } if column.name == "a"));
        assert_eq!(alter.items[1].action, AlterAction::DropColumn { column: "b".to_string() });
        assert!(alter.items.iter().all(|item| item.last_line == 6));
    }

    #[test]
    fn set_schema_and_view_rename_become_alter_table() {
        let node = pg("ALTER TABLE public.orders\n  SET SCHEMA archive");
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };
        assert_eq!(alter.table.schema.as_deref(), Some("public"));
        assert_eq!(alter.table.name, "orders");
        assert_eq!(alter.items, vec![AlterTableItem {
            last_line: 2,
            action: AlterAction::SetSchema { schema: "archive".to_string() },
        }]);

        let node = pg("ALTER VIEW v_users RENAME TO v_people");
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };
        assert_eq!(alter.table.table_type, TableType::View);
        assert_eq!(alter.items[0].action, AlterAction::RenameTable { to: "v_people".to_string() });
    }

    #[test]
    fn mysql_rename_table() {
        let node = convert_one("RENAME TABLE a TO b", Dialect::MySql).unwrap();
        let NodeKind::AlterTable(alter) = node.kind else {
            panic!("expected alter table");
        };
        assert_eq!(alter.table.name, "a");
        assert_eq!(alter.items[0].action, AlterAction::RenameTable { to: "b".to_string() });

        let node = convert_one("RENAME TABLE a TO b, c TO d", Dialect::MySql).unwrap();
        assert_eq!(node.kind, NodeKind::Unconverted);
    }

    #[test]
    fn mysql_update_keeps_limit() {
        let node = convert_one("UPDATE tech_book SET name = 'my name' LIMIT 10", Dialect::MySql).unwrap();
        let NodeKind::Update(update) = node.kind else {
            panic!("expected update");
        };
        assert_eq!(update.table.name, "tech_book");
        assert!(update.where_clause.is_none());
        assert!(update.limit.is_some());
        assert_eq!(node.text, "UPDATE tech_book SET name = 'my name' LIMIT 10");
    }

    #[test]
    fn set_operations_form_a_tree() {
        let node = pg("SELECT a FROM t1 UNION SELECT a FROM t2 EXCEPT SELECT a FROM t3 LIMIT 5");
        let NodeKind::Select(select) = node.kind else {
            panic!("expected select");
        };

        assert_eq!(select.set_operation(), SetOperation::Except);
        assert!(select.limit.is_some());
        let SelectBody::SetOperation { left, right, .. } = &select.body else {
            panic!("expected set operation");
        };
        assert_eq!(left.set_operation(), SetOperation::Union);
        assert_eq!(right.set_operation(), SetOperation::None);

        let tables: Vec<String> = select
            .leaves()
            .iter()
            .flat_map(|leaf| leaf.tables.iter().map(|t| t.name.clone()))
            .collect();
        assert_eq!(tables, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn like_and_subqueries_survive_unconverted_shapes() {
        let node = pg("SELECT * FROM t WHERE (a IS NULL OR CAST(b LIKE '%x' AS text) = 'y') AND c IN (SELECT c FROM u)");
        let NodeKind::Select(select) = node.kind else {
            panic!("expected select");
        };
        let leaf = select.leaves()[0];

        assert_eq!(leaf.pattern_likes.len(), 1);
        assert!(leaf.pattern_likes[0].has_leading_wildcard());
        assert_eq!(leaf.subqueries.len(), 1);
        assert!(leaf.fields[0].is_wildcard());
        assert!(matches!(leaf.where_clause, Some(Expression::Bool { .. })));
    }

    #[test]
    fn quantified_comparisons_keep_subqueries() {
        let leaf = first_leaf("SELECT a FROM t WHERE a = ANY (SELECT b FROM u WHERE c LIKE '%x')");
        assert_eq!(leaf.subqueries.len(), 1);
        let inner = leaf.subqueries[0].select.leaves()[0].clone();
        assert_eq!(inner.pattern_likes.len(), 1);

        let leaf = first_leaf("SELECT a FROM t WHERE a > ALL (SELECT b FROM u)");
        assert_eq!(leaf.subqueries.len(), 1);
    }

    #[test]
    fn boolean_tests_keep_like() {
        for sql in [
            "SELECT a FROM t WHERE (a LIKE '%x') IS NOT TRUE",
            "SELECT a FROM t WHERE (a LIKE '%x') IS NOT FALSE",
            "SELECT a FROM t WHERE (a LIKE '%x') IS UNKNOWN",
            "SELECT a FROM t WHERE (a LIKE '%x') IS NOT UNKNOWN",
        ] {
            assert_eq!(first_leaf(sql).pattern_likes.len(), 1, "{}", sql);
        }
    }

    #[test]
    fn special_forms_keep_subqueries() {
        for sql in [
            "SELECT a FROM t WHERE a SIMILAR TO (SELECT p FROM u)",
            "SELECT SUBSTRING(a FROM (SELECT 1)) FROM t",
            "SELECT TRIM(BOTH (SELECT 'x') FROM a) FROM t",
            "SELECT POSITION('x' IN (SELECT b FROM u)) FROM t",
            "SELECT ts AT TIME ZONE (SELECT z FROM u) FROM t",
            "SELECT ARRAY[(SELECT 1), 2] FROM t",
            "SELECT a[(SELECT 1)] FROM t",
        ] {
            assert_eq!(first_leaf(sql).subqueries.len(), 1, "{}", sql);
        }
    }

    #[test]
    fn join_conditions_and_having_are_walked() {
        let leaf = first_leaf(
            "SELECT a FROM t JOIN u ON t.id = u.id AND u.name LIKE '%x' GROUP BY a HAVING count(*) > (SELECT 1)",
        );
        assert_eq!(leaf.pattern_likes.len(), 1);
        assert_eq!(leaf.subqueries.len(), 1);
        let tables: Vec<&str> = leaf.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tables, vec!["t", "u"]);
    }

    #[test]
    fn insert_values_vs_select() {
        let node = pg("INSERT INTO t (a, b) VALUES ('x', 1), ('y', 2)");
        let NodeKind::Insert(insert) = node.kind else {
            panic!("expected insert");
        };
        assert_eq!(insert.columns, vec!["a", "b"]);
        assert_eq!(insert.values.len(), 2);
        assert_eq!(insert.values[0][0], Expression::String { value: "x".to_string() });
        assert!(insert.select.is_none());

        let node = pg("INSERT INTO t SELECT * FROM u");
        let NodeKind::Insert(insert) = node.kind else {
            panic!("expected insert");
        };
        assert!(insert.values.is_empty());
        assert!(insert.select.is_some());
    }

    #[test]
    fn drop_accumulates_targets() {
        let node = pg("DROP TABLE IF EXISTS a, s.b CASCADE");
        let NodeKind::DropTable(drop) = node.kind else {
            panic!("expected drop table");
        };
        assert!(drop.if_exists);
        assert!(drop.cascade);
        assert_eq!(drop.tables.len(), 2);
        assert_eq!(drop.tables[1].schema.as_deref(), Some("s"));

        let node = pg("DROP INDEX idx_a, public.idx_b");
        let NodeKind::DropIndex(drop) = node.kind else {
            panic!("expected drop index");
        };
        assert_eq!(drop.indexes.len(), 2);
        assert_eq!(drop.indexes[1].schema.as_deref(), Some("public"));
    }

    #[test]
    fn create_index_keys() {
        let node = pg("CREATE UNIQUE INDEX idx ON t (a, lower(b))");
        let NodeKind::CreateIndex(create) = node.kind else {
            panic!("expected create index");
        };
        assert!(create.index.unique);
        assert_eq!(create.index.keys[0], IndexKey::Column("a".to_string()));
        assert!(matches!(create.index.keys[1], IndexKey::Expression(_)));
    }

    #[test]
    fn comment_targets() {
        let node = pg("COMMENT ON COLUMN public.name IS 'is a column name'");
        let NodeKind::Comment(comment) = node.kind else {
            panic!("expected comment");
        };
        assert_eq!(comment.comment.as_deref(), Some("is a column name"));
    }

    #[test]
    fn unsupported_statement_is_unconverted() {
        let node = pg("TRUNCATE TABLE t");
        assert_eq!(node.kind, NodeKind::Unconverted);
        assert_eq!(node.text, "TRUNCATE TABLE t");
    }

    #[test]
    fn overqualified_column_is_an_error() {
        let err = convert_one("SELECT a.b.c.d FROM t", Dialect::Postgres).unwrap_err();
        assert_eq!(err, ConvertError::TooManyNameParts { name: "a.b.c.d".to_string() });
    }

    #[test]
    fn mysql_qualifier_is_database() {
        let node = convert_one("DELETE FROM db.t WHERE id = 1 LIMIT 10", Dialect::MySql).unwrap();
        let NodeKind::Delete(delete) = node.kind else {
            panic!("expected delete");
        };
        assert_eq!(delete.table.database.as_deref(), Some("db"));
        assert!(delete.where_clause.is_some());
        assert!(delete.limit.is_some());
    }

    #[test]
    fn text_is_trimmed_source() {
        let sql = "  SELECT 1 ;\n\n  UPDATE t SET a = 1  ";
        for statement in split_statements(sql, Dialect::Postgres).unwrap() {
            let native = SqlParser::postgres().parse(&statement).unwrap();
            let node = convert(&native, &statement).unwrap();
            assert_eq!(node.text, statement.text.trim());
        }
    }
}
