use sqlparser::ast::{
    AlterColumnOperation, AlterIndexOperation, AlterTableOperation, ColumnOption, ColumnOptionDef,
    CommentObject, CreateIndex, CreateTable, Expr, ObjectName, ObjectType, SchemaName,
    TableConstraint,
};

use super::{idents, last_part, ConvertError, Converter};
use crate::ast::{
    AlterAction, AlterTableItem, AlterTableStmt, ColumnDef, CommentStmt, CommentTarget,
    ConstraintDef, ConstraintType, CreateDatabaseStmt, CreateIndexStmt, CreateSchemaStmt,
    CreateTableStmt, DropDatabaseStmt, DropIndexStmt, DropSchemaStmt, DropTableStmt, ForeignDef,
    IndexDef, IndexKey, IndexRef, NodeKind, TableType,
};
use crate::data_type::{normalize, TypeName};

impl Converter<'_> {
    pub(super) fn create_table(&self, create: &CreateTable) -> Result<NodeKind, ConvertError> {
        let columns = create
            .columns
            .iter()
            .map(|column| self.column_def(column))
            .collect::<Result<Vec<_>, _>>()?;
        let constraints = create
            .constraints
            .iter()
            .map(|constraint| self.table_constraint(constraint))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NodeKind::CreateTable(CreateTableStmt {
            table: self.table(&create.name, TableType::BaseTable)?,
            if_not_exists: create.if_not_exists,
            columns,
            constraints,
        }))
    }

    pub(super) fn alter_table(
        &self,
        name: &ObjectName,
        operations: &[AlterTableOperation],
    ) -> Result<NodeKind, ConvertError> {
        let table = self.table(name, TableType::BaseTable)?;
        let mut items = Vec::new();

        for operation in operations {
            items.extend(self.alter_actions(operation)?.into_iter().map(AlterTableItem::new));
        }

        Ok(NodeKind::AlterTable(AlterTableStmt { table, items }))
    }

    /// Sub-commands without a modeled action yield nothing
    fn alter_actions(&self, operation: &AlterTableOperation) -> Result<Vec<AlterAction>, ConvertError> {
        let action = match operation {
            AlterTableOperation::AddColumn { column_def, .. } => AlterAction::AddColumn {
                column: self.column_def(column_def)?,
            },
            AlterTableOperation::DropColumn { column_name, .. } => AlterAction::DropColumn {
                column: column_name.value.clone(),
            },
            AlterTableOperation::AddConstraint(constraint) => AlterAction::AddConstraint {
                constraint: self.table_constraint(constraint)?,
            },
            AlterTableOperation::DropConstraint { name, .. } => AlterAction::DropConstraint {
                name: name.value.clone(),
            },
            AlterTableOperation::RenameColumn { old_column_name, new_column_name } => {
                AlterAction::RenameColumn {
                    from: old_column_name.value.clone(),
                    to: new_column_name.value.clone(),
                }
            }
            AlterTableOperation::RenameTable { table_name } => AlterAction::RenameTable {
                to: last_part(table_name),
            },
            AlterTableOperation::RenameConstraint { old_name, new_name } => {
                AlterAction::RenameConstraint {
                    from: old_name.value.clone(),
                    to: new_name.value.clone(),
                }
            }
            AlterTableOperation::AlterColumn { column_name, op } => {
                let column = column_name.value.clone();
                match op {
                    AlterColumnOperation::SetNotNull => AlterAction::SetNotNull { column },
                    AlterColumnOperation::DropNotNull => AlterAction::DropNotNull { column },
                    AlterColumnOperation::SetDefault { value } => AlterAction::SetDefault {
                        column,
                        expression: self.expression(value)?.expr,
                        text: value.to_string(),
                    },
                    AlterColumnOperation::DropDefault => AlterAction::DropDefault { column },
                    AlterColumnOperation::SetDataType { data_type, .. } => AlterAction::AlterColumnType {
                        column,
                        data_type: normalize(&TypeName::from_native(data_type)),
                    },
                    _ => return Ok(Vec::new()),
                }
            }
            // MySQL MODIFY COLUMN
            AlterTableOperation::ModifyColumn { col_name, data_type, .. } => AlterAction::AlterColumnType {
                column: col_name.value.clone(),
                data_type: normalize(&TypeName::from_native(data_type)),
            },
            // MySQL CHANGE COLUMN renames and retypes in one sub-command
            AlterTableOperation::ChangeColumn { old_name, new_name, data_type, .. } => {
                let mut actions = Vec::new();
                if old_name.value != new_name.value {
                    actions.push(AlterAction::RenameColumn {
                        from: old_name.value.clone(),
                        to: new_name.value.clone(),
                    });
                }
                actions.push(AlterAction::AlterColumnType {
                    column: new_name.value.clone(),
                    data_type: normalize(&TypeName::from_native(data_type)),
                });
                return Ok(actions);
            }
            _ => return Ok(Vec::new()),
        };

        Ok(vec![action])
    }

    pub(super) fn alter_index(
        &self,
        name: &ObjectName,
        operation: &AlterIndexOperation,
    ) -> Result<NodeKind, ConvertError> {
        match operation {
            AlterIndexOperation::RenameIndex { index_name } => Ok(NodeKind::AlterTable(AlterTableStmt {
                table: self.table(name, TableType::Unknown)?,
                items: vec![AlterTableItem::new(AlterAction::RenameIndex {
                    from: last_part(name),
                    to: last_part(index_name),
                })],
            })),
            #[allow(unreachable_patterns)]
            _ => Ok(NodeKind::Unconverted),
        }
    }

    pub(super) fn create_index(&self, create: &CreateIndex) -> Result<NodeKind, ConvertError> {
        let keys = create
            .columns
            .iter()
            .map(|column| match &column.expr {
                Expr::Identifier(ident) => IndexKey::Column(ident.value.clone()),
                other => IndexKey::Expression(other.to_string()),
            })
            .collect();

        Ok(NodeKind::CreateIndex(CreateIndexStmt {
            index: IndexDef {
                name: create.name.as_ref().map(last_part),
                table: self.table(&create.table_name, TableType::BaseTable)?,
                keys,
                unique: create.unique,
            },
            if_not_exists: create.if_not_exists,
        }))
    }

    pub(super) fn drop(
        &self,
        object_type: &ObjectType,
        names: &[ObjectName],
        if_exists: bool,
        cascade: bool,
        restrict: bool,
    ) -> Result<NodeKind, ConvertError> {
        let kind = match object_type {
            ObjectType::Table | ObjectType::View => {
                let table_type = match object_type {
                    ObjectType::View => TableType::View,
                    _ => TableType::BaseTable,
                };
                NodeKind::DropTable(DropTableStmt {
                    tables: names
                        .iter()
                        .map(|name| self.table(name, table_type))
                        .collect::<Result<_, _>>()?,
                    if_exists,
                    cascade,
                })
            }
            ObjectType::Index => NodeKind::DropIndex(DropIndexStmt {
                indexes: names
                    .iter()
                    .map(|name| self.index_ref(name))
                    .collect::<Result<_, _>>()?,
                if_exists,
            }),
            ObjectType::Schema => NodeKind::DropSchema(DropSchemaStmt {
                schemas: names
                    .iter()
                    .map(|name| self.single_name(name))
                    .collect::<Result<_, _>>()?,
                if_exists,
                cascade,
                restrict,
            }),
            ObjectType::Database => NodeKind::DropDatabase(DropDatabaseStmt {
                databases: names
                    .iter()
                    .map(|name| self.single_name(name))
                    .collect::<Result<_, _>>()?,
                if_exists,
            }),
            _ => NodeKind::Unconverted,
        };

        Ok(kind)
    }

    fn index_ref(&self, name: &ObjectName) -> Result<IndexRef, ConvertError> {
        match idents(&name.0).as_slice() {
            [index] => Ok(IndexRef {
                schema: None,
                name: index.clone(),
            }),
            [schema, index] => Ok(IndexRef {
                schema: Some(schema.clone()),
                name: index.clone(),
            }),
            _ => Err(ConvertError::TooManyNameParts {
                name: name.to_string(),
            }),
        }
    }

    pub(super) fn comment(
        &self,
        object_type: &CommentObject,
        object_name: &ObjectName,
        comment: &Option<String>,
    ) -> Result<NodeKind, ConvertError> {
        let target = match object_type {
            CommentObject::Table => CommentTarget::Table {
                table: self.table(object_name, TableType::BaseTable)?,
            },
            CommentObject::Column => {
                let mut parts = idents(&object_name.0);
                let column = parts.pop().unwrap_or_default();
                if parts.is_empty() {
                    return Err(ConvertError::Unexpected {
                        expected: "qualified column name",
                        found: object_name.to_string(),
                    });
                }
                CommentTarget::Column {
                    table: self.table_from_parts(parts, TableType::BaseTable)?,
                    column,
                }
            }
            _ => CommentTarget::Other,
        };

        Ok(NodeKind::Comment(CommentStmt {
            target,
            comment: comment.clone(),
        }))
    }

    pub(super) fn create_database(&self, name: &ObjectName, if_not_exists: bool) -> Result<NodeKind, ConvertError> {
        Ok(NodeKind::CreateDatabase(CreateDatabaseStmt {
            name: self.single_name(name)?,
            if_not_exists,
        }))
    }

    pub(super) fn create_schema(&self, schema: &SchemaName, if_not_exists: bool) -> Result<NodeKind, ConvertError> {
        let (name, authorization) = match schema {
            SchemaName::Simple(name) => (Some(self.single_name(name)?), None),
            SchemaName::UnnamedAuthorization(role) => (None, Some(role.value.clone())),
            SchemaName::NamedAuthorization(name, role) => {
                (Some(self.single_name(name)?), Some(role.value.clone()))
            }
        };

        Ok(NodeKind::CreateSchema(CreateSchemaStmt {
            name,
            authorization,
            if_not_exists,
        }))
    }

    pub(super) fn column_def(&self, column: &sqlparser::ast::ColumnDef) -> Result<ColumnDef, ConvertError> {
        let mut constraints = Vec::new();
        for option in &column.options {
            if let Some(constraint) = self.column_option(option)? {
                constraints.push(constraint);
            }
        }

        Ok(ColumnDef {
            name: column.name.value.clone(),
            data_type: normalize(&TypeName::from_native(&column.data_type)),
            constraints,
            line: 0,
        })
    }

    /// Inline column constraint; NULL and non-constraint options yield `None`
    fn column_option(&self, option: &ColumnOptionDef) -> Result<Option<ConstraintDef>, ConvertError> {
        let mut constraint = match &option.option {
            ColumnOption::NotNull => ConstraintDef::new(ConstraintType::NotNull),
            ColumnOption::Unique { is_primary, .. } => ConstraintDef::new(if *is_primary {
                ConstraintType::Primary
            } else {
                ConstraintType::Unique
            }),
            ColumnOption::ForeignKey { foreign_table, referred_columns, .. } => {
                let mut constraint = ConstraintDef::new(ConstraintType::Foreign);
                constraint.foreign = Some(ForeignDef {
                    table: self.table(foreign_table, TableType::BaseTable)?,
                    columns: idents(referred_columns),
                });
                constraint
            }
            ColumnOption::Default(expr) => self.expression_constraint(ConstraintType::Default, expr)?,
            ColumnOption::Check(expr) => self.expression_constraint(ConstraintType::Check, expr)?,
            _ => return Ok(None),
        };

        constraint.name = option.name.as_ref().map(|name| name.value.clone());
        Ok(Some(constraint))
    }

    pub(super) fn table_constraint(&self, constraint: &TableConstraint) -> Result<ConstraintDef, ConvertError> {
        let converted = match constraint {
            TableConstraint::PrimaryKey { name, columns, .. } => {
                keyed(ConstraintType::Primary, name.as_ref(), columns)
            }
            TableConstraint::Unique { name, columns, .. } => {
                keyed(ConstraintType::Unique, name.as_ref(), columns)
            }
            TableConstraint::ForeignKey { name, columns, foreign_table, referred_columns, .. } => {
                let mut converted = keyed(ConstraintType::Foreign, name.as_ref(), columns);
                converted.foreign = Some(ForeignDef {
                    table: self.table(foreign_table, TableType::BaseTable)?,
                    columns: idents(referred_columns),
                });
                converted
            }
            TableConstraint::Check { name, expr, .. } => {
                let mut converted = self.expression_constraint(ConstraintType::Check, expr)?;
                converted.name = name.as_ref().map(|n| n.value.clone());
                converted
            }
            // MySQL KEY / INDEX / FULLTEXT / SPATIAL
            TableConstraint::Index { name, columns, .. } => {
                keyed(ConstraintType::Undefined, name.as_ref(), columns)
            }
            TableConstraint::FulltextOrSpatial { opt_index_name, columns, .. } => {
                keyed(ConstraintType::Undefined, opt_index_name.as_ref(), columns)
            }
            #[allow(unreachable_patterns)]
            _ => ConstraintDef::new(ConstraintType::Undefined),
        };

        Ok(converted)
    }

    fn expression_constraint(&self, constraint_type: ConstraintType, expr: &Expr) -> Result<ConstraintDef, ConvertError> {
        let mut constraint = ConstraintDef::new(constraint_type);
        constraint.expression = Some(self.expression(expr)?.expr);
        constraint.expression_text = Some(expr.to_string());
        Ok(constraint)
    }
}

fn keyed(
    constraint_type: ConstraintType,
    name: Option<&sqlparser::ast::Ident>,
    columns: &[sqlparser::ast::Ident],
) -> ConstraintDef {
    let mut constraint = ConstraintDef::new(constraint_type);
    constraint.name = name.map(|n| n.value.clone());
    constraint.keys = idents(columns);
    constraint
}
