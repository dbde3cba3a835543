use sqlparser::ast::{
    BinaryOperator, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, Subscript,
    UnaryOperator, Value,
};

use super::{ConvertError, Converter};
use crate::ast::{BoolOp, ColumnRef, Converted, Expression, PatternLike, Subquery};

impl Converter<'_> {
    /// Convert an expression, collecting LIKE predicates and subqueries
    pub(super) fn expression(&self, expr: &Expr) -> Result<Converted, ConvertError> {
        let mut out = Converted::default();

        out.expr = match expr {
            Expr::Value(value) => string_literal(value),
            Expr::Identifier(ident) => Expression::ColumnRef(ColumnRef::new(ident.value.clone())),
            Expr::CompoundIdentifier(parts) => Expression::ColumnRef(self.column_ref(parts)?),
            Expr::Nested(inner) => out.absorb(self.expression(inner)?),
            Expr::BinaryOp { left, op, right } => {
                let left = out.absorb(self.expression(left)?);
                let right = out.absorb(self.expression(right)?);
                match op {
                    BinaryOperator::And => Expression::Bool {
                        op: BoolOp::And,
                        args: vec![left, right],
                    },
                    BinaryOperator::Or => Expression::Bool {
                        op: BoolOp::Or,
                        args: vec![left, right],
                    },
                    other => Expression::Binary {
                        op: other.to_string(),
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                }
            }
            Expr::UnaryOp { op: UnaryOperator::Not, expr } => Expression::Bool {
                op: BoolOp::Not,
                args: vec![out.absorb(self.expression(expr)?)],
            },
            Expr::Like { negated, expr, pattern, .. } | Expr::ILike { negated, expr, pattern, .. } => {
                let like = PatternLike {
                    not: *negated,
                    expression: Box::new(out.absorb(self.expression(expr)?)),
                    pattern: Box::new(out.absorb(self.expression(pattern)?)),
                };
                out.pattern_likes.push(like.clone());
                Expression::PatternLike(like)
            }
            Expr::Subquery(query) => {
                let subquery = Subquery {
                    select: Box::new(self.query(query)?),
                };
                out.subqueries.push(subquery.clone());
                Expression::Subquery(subquery)
            }
            Expr::InSubquery { expr, subquery, .. } => {
                out.absorb(self.expression(expr)?);
                out.subqueries.push(Subquery {
                    select: Box::new(self.query(subquery)?),
                });
                Expression::Unconverted
            }
            Expr::Exists { subquery, .. } => {
                out.subqueries.push(Subquery {
                    select: Box::new(self.query(subquery)?),
                });
                Expression::Unconverted
            }
            Expr::Function(function) => {
                let mut args = Vec::new();
                match &function.args {
                    FunctionArguments::List(list) => {
                        for arg in &list.args {
                            let arg = match arg {
                                FunctionArg::Unnamed(arg) | FunctionArg::Named { arg, .. } => arg,
                                #[allow(unreachable_patterns)]
                                _ => continue,
                            };
                            args.push(match arg {
                                FunctionArgExpr::Expr(expr) => out.absorb(self.expression(expr)?),
                                FunctionArgExpr::Wildcard => Expression::ColumnRef(ColumnRef::new("*")),
                                FunctionArgExpr::QualifiedWildcard(name) => {
                                    let mut parts = name.0.clone();
                                    parts.push(Ident::new("*"));
                                    Expression::ColumnRef(self.column_ref(&parts)?)
                                }
                            });
                        }
                    }
                    FunctionArguments::Subquery(query) => {
                        let subquery = Subquery {
                            select: Box::new(self.query(query)?),
                        };
                        out.subqueries.push(subquery.clone());
                        args.push(Expression::Subquery(subquery));
                    }
                    FunctionArguments::None => {}
                }
                Expression::FunctionCall {
                    name: function.name.to_string(),
                    args,
                }
            }
            other => {
                for child in children(other) {
                    out.absorb(self.expression(child)?);
                }
                Expression::Unconverted
            }
        };

        Ok(out)
    }

    /// `column`, `table.column` or `schema.table.column`
    pub(super) fn column_ref(&self, parts: &[Ident]) -> Result<ColumnRef, ConvertError> {
        let names: Vec<String> = parts.iter().map(|p| p.value.clone()).collect();

        match names.as_slice() {
            [column] => Ok(ColumnRef::new(column.clone())),
            [table, column] => Ok(ColumnRef {
                schema: None,
                table: Some(table.clone()),
                column: column.clone(),
            }),
            [schema, table, column] => Ok(ColumnRef {
                schema: Some(schema.clone()),
                table: Some(table.clone()),
                column: column.clone(),
            }),
            _ => Err(ConvertError::TooManyNameParts {
                name: names.join("."),
            }),
        }
    }
}

fn string_literal(value: &Value) -> Expression {
    match value {
        Value::SingleQuotedString(s)
        | Value::DoubleQuotedString(s)
        | Value::EscapedStringLiteral(s)
        | Value::NationalStringLiteral(s) => Expression::String { value: s.clone() },
        Value::DollarQuotedString(dollar) => Expression::String {
            value: dollar.value.clone(),
        },
        _ => Expression::Unconverted,
    }
}

/// Direct sub-expressions of shapes without a dedicated variant
///
/// Every operand that can hold a subquery or a LIKE predicate must be listed
/// here, otherwise its side lists are lost.
fn children(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::UnaryOp { expr, .. }
        | Expr::Cast { expr, .. }
        | Expr::Convert { expr, .. }
        | Expr::IsNull(expr)
        | Expr::IsNotNull(expr)
        | Expr::IsTrue(expr)
        | Expr::IsNotTrue(expr)
        | Expr::IsFalse(expr)
        | Expr::IsNotFalse(expr)
        | Expr::IsUnknown(expr)
        | Expr::IsNotUnknown(expr)
        | Expr::Collate { expr, .. }
        | Expr::Extract { expr, .. }
        | Expr::Ceil { expr, .. }
        | Expr::Floor { expr, .. }
        | Expr::Named { expr, .. }
        | Expr::CompositeAccess { expr, .. }
        | Expr::OuterJoin(expr)
        | Expr::Prior(expr) => vec![expr.as_ref()],
        Expr::JsonAccess { value, .. } => vec![value.as_ref()],
        Expr::Interval(interval) => vec![interval.value.as_ref()],
        Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
            vec![left.as_ref(), right.as_ref()]
        }
        Expr::AnyOp { left, right, .. } | Expr::AllOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        Expr::SimilarTo { expr, pattern, .. } | Expr::RLike { expr, pattern, .. } => {
            vec![expr.as_ref(), pattern.as_ref()]
        }
        Expr::InList { expr, list, .. } => {
            let mut out = vec![expr.as_ref()];
            out.extend(list.iter());
            out
        }
        Expr::InUnnest { expr, array_expr, .. } => vec![expr.as_ref(), array_expr.as_ref()],
        Expr::Between { expr, low, high, .. } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
        Expr::Position { expr, r#in } => vec![expr.as_ref(), r#in.as_ref()],
        Expr::AtTimeZone { timestamp, time_zone } => vec![timestamp.as_ref(), time_zone.as_ref()],
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => {
            let mut out = vec![expr.as_ref()];
            out.extend(substring_from.iter().map(|e| e.as_ref()));
            out.extend(substring_for.iter().map(|e| e.as_ref()));
            out
        }
        Expr::Trim {
            expr,
            trim_what,
            trim_characters,
            ..
        } => {
            let mut out = vec![expr.as_ref()];
            out.extend(trim_what.iter().map(|e| e.as_ref()));
            out.extend(trim_characters.iter().flatten());
            out
        }
        Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => {
            let mut out = vec![expr.as_ref(), overlay_what.as_ref(), overlay_from.as_ref()];
            out.extend(overlay_for.iter().map(|e| e.as_ref()));
            out
        }
        Expr::Case { operand, conditions, results, else_result } => {
            let mut out: Vec<&Expr> = operand.iter().map(|e| e.as_ref()).collect();
            out.extend(conditions.iter());
            out.extend(results.iter());
            out.extend(else_result.iter().map(|e| e.as_ref()));
            out
        }
        Expr::Subscript { expr, subscript } => {
            let mut out = vec![expr.as_ref()];
            match &**subscript {
                Subscript::Index { index } => out.push(index),
                Subscript::Slice {
                    lower_bound,
                    upper_bound,
                    stride,
                } => {
                    out.extend(lower_bound.iter());
                    out.extend(upper_bound.iter());
                    out.extend(stride.iter());
                }
            }
            out
        }
        Expr::MapAccess { column, keys } => {
            let mut out = vec![column.as_ref()];
            out.extend(keys.iter().map(|k| &k.key));
            out
        }
        Expr::Array(array) => array.elem.iter().collect(),
        Expr::Tuple(items) | Expr::Struct { values: items, .. } => items.iter().collect(),
        Expr::GroupingSets(sets) | Expr::Cube(sets) | Expr::Rollup(sets) => sets.iter().flatten().collect(),
        _ => Vec::new(),
    }
}
