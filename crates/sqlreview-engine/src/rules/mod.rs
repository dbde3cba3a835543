//! Built-in advisors
//!
//! Every rule module exposes a `build` factory matching
//! [`AdvisorFactory`](crate::advisor::AdvisorFactory).

pub mod column_required;
pub mod comment_length;
pub mod compatibility;
pub mod disallow_limit;
pub mod leading_wildcard;
pub mod naming;
pub mod select_all;
pub mod table;
pub mod where_require;

use sqlreview_sql::ast::{NodeKind, PatternLike, QuerySpec, SelectStmt};
use sqlreview_sql::Node;

/// Every SELECT reachable from a statement: the statement itself, INSERT
/// sources, CTEs and subqueries at any depth
pub(crate) fn selects(node: &Node) -> Vec<&SelectStmt> {
    let mut out = Vec::new();
    match &node.kind {
        NodeKind::Select(select) => collect_selects(select, &mut out),
        NodeKind::Insert(insert) => {
            if let Some(select) = &insert.select {
                collect_selects(select, &mut out);
            }
            for subquery in &insert.subqueries {
                collect_selects(&subquery.select, &mut out);
            }
        }
        NodeKind::Update(update) => {
            for subquery in &update.subqueries {
                collect_selects(&subquery.select, &mut out);
            }
        }
        NodeKind::Delete(delete) => {
            for subquery in &delete.subqueries {
                collect_selects(&subquery.select, &mut out);
            }
        }
        NodeKind::Copy(copy) => {
            if let Some(select) = &copy.select {
                collect_selects(select, &mut out);
            }
        }
        NodeKind::Explain(explain) => out.extend(selects(&explain.statement)),
        _ => {}
    }
    out
}

fn collect_selects<'a>(select: &'a SelectStmt, out: &mut Vec<&'a SelectStmt>) {
    out.push(select);
    for cte in &select.ctes {
        collect_selects(&cte.select, out);
    }
    for leaf in select.leaves() {
        for subquery in &leaf.subqueries {
            collect_selects(&subquery.select, out);
        }
    }
}

/// Leaf query specifications of every reachable SELECT
pub(crate) fn query_specs(node: &Node) -> Vec<&QuerySpec> {
    selects(node).into_iter().flat_map(|s| s.leaves()).collect()
}

/// LIKE predicates anywhere in a statement
pub(crate) fn pattern_likes(node: &Node) -> Vec<&PatternLike> {
    let own: &[PatternLike] = match &node.kind {
        NodeKind::Insert(insert) => &insert.pattern_likes,
        NodeKind::Update(update) => &update.pattern_likes,
        NodeKind::Delete(delete) => &delete.pattern_likes,
        _ => &[],
    };

    own.iter()
        .chain(query_specs(node).into_iter().flat_map(|spec| spec.pattern_likes.iter()))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlreview_core::Dialect;
    use sqlreview_sql::{convert, split_statements, Node, SqlParser};

    /// Convert a single-statement script
    pub fn node(sql: &str, dialect: Dialect) -> Node {
        let statements = split_statements(sql, dialect).unwrap();
        assert_eq!(statements.len(), 1, "expected one statement in {sql:?}");
        let native = SqlParser::from_dialect(dialect).parse(&statements[0]).unwrap();
        convert(&native, &statements[0]).unwrap()
    }
}
