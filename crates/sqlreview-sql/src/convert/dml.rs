use sqlparser::ast::{
    CopySource, CopyTarget, Delete, Expr, FromTable, Insert, JoinConstraint, JoinOperator, Query,
    Select, SelectItem, SetExpr, SetOperator, TableFactor, TableWithJoins,
};

use super::{ConvertError, Converter};
use crate::ast::{
    Assignment, ColumnRef, Converted, CopyStmt, DeleteStmt, Expression, InsertStmt, NodeKind,
    QuerySpec, SelectBody, SelectStmt, SetOperation, Subquery, TableDef, TableType, UpdateStmt,
};

impl Converter<'_> {
    pub(super) fn query(&self, query: &Query) -> Result<SelectStmt, ConvertError> {
        let mut select = self.set_expr(&query.body)?;

        if let Some(limit) = &query.limit {
            select.limit = Some(self.expression(limit)?.expr);
        }
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                select.ctes.push(Subquery {
                    select: Box::new(self.query(&cte.query)?),
                });
            }
        }

        Ok(select)
    }

    fn set_expr(&self, body: &SetExpr) -> Result<SelectStmt, ConvertError> {
        match body {
            SetExpr::Select(select) => Ok(SelectStmt::new(SelectBody::Query(self.query_spec(select)?))),
            SetExpr::Query(query) => self.query(query),
            SetExpr::SetOperation { op, left, right, .. } => {
                let op = match op {
                    SetOperator::Union => SetOperation::Union,
                    SetOperator::Intersect => SetOperation::Intersect,
                    _ => SetOperation::Except,
                };
                Ok(SelectStmt::new(SelectBody::SetOperation {
                    op,
                    left: Box::new(self.set_expr(left)?),
                    right: Box::new(self.set_expr(right)?),
                }))
            }
            // VALUES lists and TABLE references are row sources without fields
            _ => Ok(SelectStmt::new(SelectBody::Query(QuerySpec::default()))),
        }
    }

    fn query_spec(&self, select: &Select) -> Result<QuerySpec, ConvertError> {
        let mut acc = Converted::default();
        let mut spec = QuerySpec::default();

        for item in &select.projection {
            let field = match item {
                SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                    acc.absorb(self.expression(expr)?)
                }
                SelectItem::Wildcard(_) => Expression::ColumnRef(ColumnRef::new("*")),
                SelectItem::QualifiedWildcard(name, _) => {
                    let mut parts = name.0.clone();
                    parts.push(sqlparser::ast::Ident::new("*"));
                    Expression::ColumnRef(self.column_ref(&parts)?)
                }
            };
            spec.fields.push(field);
        }

        for from in &select.from {
            self.table_with_joins(from, &mut spec.tables, &mut acc)?;
        }

        if let Some(selection) = &select.selection {
            spec.where_clause = Some(acc.absorb(self.expression(selection)?));
        }
        if let Some(having) = &select.having {
            acc.absorb(self.expression(having)?);
        }

        spec.pattern_likes = acc.pattern_likes;
        spec.subqueries = acc.subqueries;
        Ok(spec)
    }

    /// Collect base tables and derived-table subqueries of a FROM item
    fn table_with_joins(
        &self,
        from: &TableWithJoins,
        tables: &mut Vec<TableDef>,
        acc: &mut Converted,
    ) -> Result<(), ConvertError> {
        self.table_factor(&from.relation, tables, acc)?;
        for join in &from.joins {
            self.table_factor(&join.relation, tables, acc)?;
            if let Some(on) = join_condition(&join.join_operator) {
                acc.absorb(self.expression(on)?);
            }
        }
        Ok(())
    }

    fn table_factor(
        &self,
        factor: &TableFactor,
        tables: &mut Vec<TableDef>,
        acc: &mut Converted,
    ) -> Result<(), ConvertError> {
        match factor {
            TableFactor::Table { name, .. } => tables.push(self.table(name, TableType::BaseTable)?),
            TableFactor::Derived { subquery, .. } => acc.subqueries.push(Subquery {
                select: Box::new(self.query(subquery)?),
            }),
            TableFactor::NestedJoin { table_with_joins, .. } => {
                self.table_with_joins(table_with_joins, tables, acc)?
            }
            _ => {}
        }
        Ok(())
    }

    /// Target table of UPDATE or DELETE
    fn target_table(&self, from: &TableWithJoins) -> Result<TableDef, ConvertError> {
        match &from.relation {
            TableFactor::Table { name, .. } => self.table(name, TableType::BaseTable),
            other => Err(ConvertError::Unexpected {
                expected: "table",
                found: other.to_string(),
            }),
        }
    }

    pub(super) fn insert(&self, insert: &Insert) -> Result<NodeKind, ConvertError> {
        let mut acc = Converted::default();
        let mut values = Vec::new();
        let mut select = None;

        if let Some(source) = &insert.source {
            match source.body.as_ref() {
                SetExpr::Values(list) if source.limit.is_none() => {
                    for row in &list.rows {
                        let mut converted = Vec::with_capacity(row.len());
                        for expr in row {
                            converted.push(acc.absorb(self.expression(expr)?));
                        }
                        values.push(converted);
                    }
                }
                _ => select = Some(Box::new(self.query(source)?)),
            }
        }

        Ok(NodeKind::Insert(InsertStmt {
            table: self.table(&insert.table_name, TableType::BaseTable)?,
            columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
            values,
            select,
            pattern_likes: acc.pattern_likes,
            subqueries: acc.subqueries,
        }))
    }

    pub(super) fn update(
        &self,
        table: &TableWithJoins,
        assignments: &[sqlparser::ast::Assignment],
        selection: Option<&sqlparser::ast::Expr>,
    ) -> Result<NodeKind, ConvertError> {
        let mut acc = Converted::default();

        let mut converted = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            converted.push(Assignment {
                column: assignment.target.to_string(),
                value: acc.absorb(self.expression(&assignment.value)?),
            });
        }

        let where_clause = match selection {
            Some(expr) => Some(acc.absorb(self.expression(expr)?)),
            None => None,
        };

        Ok(NodeKind::Update(UpdateStmt {
            table: self.target_table(table)?,
            assignments: converted,
            where_clause,
            limit: None,
            pattern_likes: acc.pattern_likes,
            subqueries: acc.subqueries,
        }))
    }

    pub(super) fn delete(&self, delete: &Delete) -> Result<NodeKind, ConvertError> {
        let from = match &delete.from {
            FromTable::WithFromKeyword(from) | FromTable::WithoutKeyword(from) => from,
        };
        let Some(first) = from.first() else {
            return Err(ConvertError::Unexpected {
                expected: "table",
                found: "empty FROM list".to_string(),
            });
        };

        let mut acc = Converted::default();
        let where_clause = match &delete.selection {
            Some(expr) => Some(acc.absorb(self.expression(expr)?)),
            None => None,
        };
        let limit = match &delete.limit {
            Some(expr) => Some(self.expression(expr)?.expr),
            None => None,
        };

        Ok(NodeKind::Delete(DeleteStmt {
            table: self.target_table(first)?,
            where_clause,
            limit,
            pattern_likes: acc.pattern_likes,
            subqueries: acc.subqueries,
        }))
    }

    pub(super) fn copy(&self, source: &CopySource, to: bool, target: &CopyTarget) -> Result<NodeKind, ConvertError> {
        let (table, select) = match source {
            CopySource::Table { table_name, .. } => (Some(self.table(table_name, TableType::BaseTable)?), None),
            CopySource::Query(query) => (None, Some(Box::new(self.query(query)?))),
        };
        let file_path = match target {
            CopyTarget::File { filename } => Some(filename.clone()),
            _ => None,
        };

        Ok(NodeKind::Copy(CopyStmt {
            table,
            select,
            file_path,
            to,
        }))
    }
}

fn join_condition(operator: &JoinOperator) -> Option<&Expr> {
    let constraint = match operator {
        JoinOperator::Inner(c)
        | JoinOperator::LeftOuter(c)
        | JoinOperator::RightOuter(c)
        | JoinOperator::FullOuter(c)
        | JoinOperator::Semi(c)
        | JoinOperator::LeftSemi(c)
        | JoinOperator::RightSemi(c)
        | JoinOperator::Anti(c)
        | JoinOperator::LeftAnti(c)
        | JoinOperator::RightAnti(c)
        | JoinOperator::AsOf { constraint: c, .. } => c,
        _ => return None,
    };
    match constraint {
        JoinConstraint::On(expr) => Some(expr),
        _ => None,
    }
}
