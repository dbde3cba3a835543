//! Integration tests for splitting, parsing and conversion

use pretty_assertions::assert_eq;
use sqlreview_core::Dialect;
use sqlreview_sql::ast::{AlterAction, ConstraintType, Expression, SetOperation, TableType};
use sqlreview_sql::{convert, split_statements, DataType, Node, NodeKind, SqlParser};

fn convert_script(sql: &str, dialect: Dialect) -> Vec<Node> {
    let parser = SqlParser::from_dialect(dialect);
    split_statements(sql, dialect)
        .unwrap()
        .iter()
        .map(|statement| {
            let native = parser.parse(statement).unwrap();
            convert(&native, statement).unwrap()
        })
        .collect()
}

#[test]
fn migration_script_round_trip() {
    let sql = "\
CREATE TABLE public.account (
  id serial PRIMARY KEY,
  email varchar(255) NOT NULL,
  balance numeric(12, 2)
);

ALTER TABLE public.account
  ADD COLUMN nickname text;

COMMENT ON TABLE public.account IS 'user accounts';
";
    let nodes = convert_script(sql, Dialect::Postgres);
    assert_eq!(nodes.len(), 3);

    let NodeKind::CreateTable(create) = &nodes[0].kind else {
        panic!("expected CREATE TABLE, got {:?}", nodes[0].kind);
    };
    assert_eq!(create.table.schema.as_deref(), Some("public"));
    assert_eq!(create.table.name, "account");
    assert_eq!(create.table.table_type, TableType::BaseTable);
    assert!(create.has_primary_key());

    let types: Vec<&DataType> = create.columns.iter().map(|c| &c.data_type).collect();
    assert_eq!(
        types,
        vec![
            &DataType::Serial { size: 4 },
            &DataType::CharacterVarying { size: 255 },
            &DataType::Decimal {
                precision: Some(12),
                scale: Some(2)
            },
        ]
    );
    let lines: Vec<usize> = create.columns.iter().map(|c| c.line).collect();
    assert_eq!(lines, vec![2, 3, 4]);
    assert_eq!(nodes[0].last_line, 5);

    let NodeKind::AlterTable(alter) = &nodes[1].kind else {
        panic!("expected ALTER TABLE");
    };
    assert_eq!(nodes[1].last_line, 8);
    assert_eq!(alter.items.len(), 1);
    assert_eq!(alter.items[0].last_line, 8);
    assert!(matches!(&alter.items[0].action, AlterAction::AddColumn { column } if column.name == "nickname"));

    assert!(matches!(nodes[2].kind, NodeKind::Comment(_)));
    assert_eq!(nodes[2].last_line, 10);
}

#[test]
fn foreign_key_constraint() {
    let sql = "CREATE TABLE orders (
  id int,
  account_id int,
  CONSTRAINT fk_account FOREIGN KEY (account_id) REFERENCES account (id)
)";
    let nodes = convert_script(sql, Dialect::Postgres);
    let NodeKind::CreateTable(create) = &nodes[0].kind else {
        panic!("expected CREATE TABLE");
    };

    assert!(!create.has_primary_key());
    let fk = &create.constraints[0];
    assert_eq!(fk.constraint_type, ConstraintType::Foreign);
    assert_eq!(fk.name.as_deref(), Some("fk_account"));
    assert_eq!(fk.keys, vec!["account_id".to_string()]);
    assert_eq!(fk.line, 4);
}

#[test]
fn union_of_selects() {
    let nodes = convert_script(
        "SELECT a FROM t1 WHERE a LIKE '%x' UNION SELECT * FROM t2",
        Dialect::Postgres,
    );
    let NodeKind::Select(select) = &nodes[0].kind else {
        panic!("expected SELECT");
    };

    assert_eq!(select.set_operation(), SetOperation::Union);
    let leaves = select.leaves();
    assert_eq!(leaves.len(), 2);
    assert!(leaves[0].pattern_likes[0].has_leading_wildcard());
    assert!(leaves[1].fields[0].is_wildcard());
}

#[test]
fn mysql_statements() {
    let sql = "INSERT INTO `db`.`t` (a) VALUES (1), (2); DELETE FROM t WHERE a = 1 LIMIT 5";
    let nodes = convert_script(sql, Dialect::MySql);
    assert_eq!(nodes.len(), 2);

    let NodeKind::Insert(insert) = &nodes[0].kind else {
        panic!("expected INSERT");
    };
    assert_eq!(insert.table.database.as_deref(), Some("db"));
    assert_eq!(insert.table.name, "t");
    assert_eq!(insert.values.len(), 2);

    let NodeKind::Delete(delete) = &nodes[1].kind else {
        panic!("expected DELETE");
    };
    assert!(delete.where_clause.is_some());
    assert!(delete.limit.is_some());
}

#[test]
fn nodes_serialize_with_type_tags() {
    let nodes = convert_script("UPDATE t SET name = 'x' WHERE id = 1", Dialect::Postgres);
    let json = serde_json::to_value(&nodes[0]).unwrap();

    assert_eq!(json["type"], "update");
    assert_eq!(json["last_line"], 1);
    assert_eq!(json["table"]["name"], "t");
    assert_eq!(json["assignments"][0]["column"], "name");

    let NodeKind::Update(update) = &nodes[0].kind else {
        panic!("expected UPDATE");
    };
    assert_eq!(
        update.assignments[0].value,
        Expression::String {
            value: "x".to_string()
        }
    );
}
