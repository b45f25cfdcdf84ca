//! Uniform, borrowed view over every node of the typed syntax tree.
//!
//! Rules dispatch on [`Node`] with a single `match`; traversal code only
//! needs [`Node::children`], which always yields children in document order.

use super::ast::*;
use super::span::Span;

#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Script(&'a Script),
    Batch(&'a Batch),
    Statement(&'a Statement),
    Query(&'a Query),
    CommonTableExpression(&'a CommonTableExpression),
    QueryExpr(&'a QueryExpr),
    QuerySpecification(&'a QuerySpecification),
    TopClause(&'a TopClause),
    SelectElement(&'a SelectElement),
    WhereClause(&'a WhereClause),
    OrderByItem(&'a OrderByItem),
    TableReference(&'a TableReference),
    Expr(&'a Expr),
    WhenClause(&'a WhenClause),
    WindowSpec(&'a WindowSpec),
    TableDefinition(&'a TableDefinition),
    ColumnDefinition(&'a ColumnDefinition),
    ConstraintDefinition(&'a ConstraintDefinition),
    IndexDefinition(&'a IndexDefinition),
    IndexColumn(&'a IndexColumn),
    ExecuteParameter(&'a ExecuteParameter),
    VariableDeclaration(&'a VariableDeclaration),
    ProcedureParameter(&'a ProcedureParameter),
    Assignment(&'a Assignment),
    ObjectName(&'a ObjectName),
    Ident(&'a Ident),
    DataType(&'a DataType),
}

/// Closed tag set over node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Script,
    Batch,
    SelectStatement,
    InsertStatement,
    UpdateStatement,
    DeleteStatement,
    CreateTableStatement,
    AlterTableStatement,
    CreateIndexStatement,
    CreateViewStatement,
    CreateProcedureStatement,
    DropStatement,
    TruncateStatement,
    ExecuteStatement,
    DeclareStatement,
    SetVariableStatement,
    SetOptionStatement,
    IfStatement,
    WhileStatement,
    BlockStatement,
    TryCatchStatement,
    TransactionStatement,
    ReturnStatement,
    PrintStatement,
    BreakStatement,
    ContinueStatement,
    OtherStatement,
    Query,
    CommonTableExpression,
    QuerySpecification,
    ParenthesizedQuery,
    SetOperation,
    TopClause,
    SelectElement,
    WhereClause,
    OrderByItem,
    NamedTableReference,
    DerivedTable,
    TableFunction,
    ParenthesizedTableReference,
    QualifiedJoin,
    UnqualifiedJoin,
    ColumnReference,
    VariableReference,
    Literal,
    Wildcard,
    BinaryExpression,
    UnaryExpression,
    ParenthesisExpression,
    FunctionCall,
    ConversionCall,
    CaseExpression,
    ScalarSubquery,
    ExistsPredicate,
    InPredicate,
    BetweenPredicate,
    LikePredicate,
    IsNullPredicate,
    WhenClause,
    WindowSpec,
    TableDefinition,
    ColumnDefinition,
    ConstraintDefinition,
    IndexDefinition,
    IndexColumn,
    ExecuteParameter,
    VariableDeclaration,
    ProcedureParameter,
    Assignment,
    ObjectName,
    Identifier,
    DataType,
}

impl<'a> Node<'a> {
    pub fn span(&self) -> Span {
        match *self {
            Self::Script(n) => n.span,
            Self::Batch(n) => n.span,
            Self::Statement(n) => n.span,
            Self::Query(n) => n.span,
            Self::CommonTableExpression(n) => n.span,
            Self::QueryExpr(n) => n.span,
            Self::QuerySpecification(n) => n.span,
            Self::TopClause(n) => n.span,
            Self::SelectElement(n) => n.span,
            Self::WhereClause(n) => n.span,
            Self::OrderByItem(n) => n.span,
            Self::TableReference(n) => n.span,
            Self::Expr(n) => n.span,
            Self::WhenClause(n) => n.span,
            Self::WindowSpec(n) => n.span,
            Self::TableDefinition(n) => n.span,
            Self::ColumnDefinition(n) => n.span,
            Self::ConstraintDefinition(n) => n.span,
            Self::IndexDefinition(n) => n.span,
            Self::IndexColumn(n) => n.span,
            Self::ExecuteParameter(n) => n.span,
            Self::VariableDeclaration(n) => n.span,
            Self::ProcedureParameter(n) => n.span,
            Self::Assignment(n) => n.span,
            Self::ObjectName(n) => n.span,
            Self::Ident(n) => n.span,
            Self::DataType(n) => n.span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match *self {
            Self::Script(_) => NodeKind::Script,
            Self::Batch(_) => NodeKind::Batch,
            Self::Statement(statement) => statement_kind(&statement.kind),
            Self::Query(_) => NodeKind::Query,
            Self::CommonTableExpression(_) => NodeKind::CommonTableExpression,
            Self::QueryExpr(query) => match query.kind {
                QueryExprKind::Specification(_) => NodeKind::QuerySpecification,
                QueryExprKind::Parenthesized(_) => NodeKind::ParenthesizedQuery,
                QueryExprKind::SetOperation { .. } => NodeKind::SetOperation,
            },
            Self::QuerySpecification(_) => NodeKind::QuerySpecification,
            Self::TopClause(_) => NodeKind::TopClause,
            Self::SelectElement(_) => NodeKind::SelectElement,
            Self::WhereClause(_) => NodeKind::WhereClause,
            Self::OrderByItem(_) => NodeKind::OrderByItem,
            Self::TableReference(table) => match table.kind {
                TableReferenceKind::Named { .. } => NodeKind::NamedTableReference,
                TableReferenceKind::Derived { .. } => NodeKind::DerivedTable,
                TableReferenceKind::Function { .. } => NodeKind::TableFunction,
                TableReferenceKind::Parenthesized(_) => NodeKind::ParenthesizedTableReference,
                TableReferenceKind::QualifiedJoin { .. } => NodeKind::QualifiedJoin,
                TableReferenceKind::UnqualifiedJoin { .. } => NodeKind::UnqualifiedJoin,
            },
            Self::Expr(expr) => expr_kind(&expr.kind),
            Self::WhenClause(_) => NodeKind::WhenClause,
            Self::WindowSpec(_) => NodeKind::WindowSpec,
            Self::TableDefinition(_) => NodeKind::TableDefinition,
            Self::ColumnDefinition(_) => NodeKind::ColumnDefinition,
            Self::ConstraintDefinition(_) => NodeKind::ConstraintDefinition,
            Self::IndexDefinition(_) => NodeKind::IndexDefinition,
            Self::IndexColumn(_) => NodeKind::IndexColumn,
            Self::ExecuteParameter(_) => NodeKind::ExecuteParameter,
            Self::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            Self::ProcedureParameter(_) => NodeKind::ProcedureParameter,
            Self::Assignment(_) => NodeKind::Assignment,
            Self::ObjectName(_) => NodeKind::ObjectName,
            Self::Ident(_) => NodeKind::Identifier,
            Self::DataType(_) => NodeKind::DataType,
        }
    }

    /// Direct children in document order.
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match *self {
            Self::Script(script) => out.extend(script.batches.iter().map(Node::Batch)),
            Self::Batch(batch) => out.extend(batch.statements.iter().map(Node::Statement)),
            Self::Statement(statement) => statement_children(&statement.kind, &mut out),
            Self::Query(query) => {
                out.extend(query.ctes.iter().map(Node::CommonTableExpression));
                out.push(Node::QueryExpr(&query.body));
                out.extend(query.order_by.iter().map(Node::OrderByItem));
                out.extend(query.offset.iter().map(Node::Expr));
                out.extend(query.fetch.iter().map(Node::Expr));
            }
            Self::CommonTableExpression(cte) => {
                out.push(Node::Ident(&cte.name));
                out.extend(cte.columns.iter().map(Node::Ident));
                out.push(Node::Query(&cte.query));
            }
            Self::QueryExpr(query) => match &query.kind {
                QueryExprKind::Specification(spec) => out.push(Node::QuerySpecification(spec)),
                QueryExprKind::Parenthesized(inner) => out.push(Node::Query(inner)),
                QueryExprKind::SetOperation { left, right, .. } => {
                    out.push(Node::QueryExpr(left));
                    out.push(Node::QueryExpr(right));
                }
            },
            Self::QuerySpecification(spec) => {
                out.extend(spec.top.iter().map(Node::TopClause));
                out.extend(spec.select_list.iter().map(Node::SelectElement));
                out.extend(spec.into.iter().map(Node::ObjectName));
                out.extend(spec.from.iter().map(Node::TableReference));
                out.extend(spec.where_clause.iter().map(Node::WhereClause));
                out.extend(spec.group_by.iter().map(Node::Expr));
                out.extend(spec.having.iter().map(Node::Expr));
            }
            Self::TopClause(top) => out.push(Node::Expr(&top.expr)),
            Self::SelectElement(element) => match &element.kind {
                SelectElementKind::Wildcard { qualifier } => {
                    out.extend(qualifier.iter().map(Node::ObjectName));
                }
                SelectElementKind::Expression { expr, alias } => {
                    out.push(Node::Expr(expr));
                    out.extend(alias.iter().map(Node::Ident));
                }
                SelectElementKind::VariableAssignment { variable, value } => {
                    out.push(Node::Ident(variable));
                    out.push(Node::Expr(value));
                }
            },
            Self::WhereClause(clause) => out.push(Node::Expr(&clause.condition)),
            Self::OrderByItem(item) => out.push(Node::Expr(&item.expr)),
            Self::TableReference(table) => table_children(&table.kind, &mut out),
            Self::Expr(expr) => expr_children(&expr.kind, &mut out),
            Self::WhenClause(clause) => {
                out.push(Node::Expr(&clause.condition));
                out.push(Node::Expr(&clause.result));
            }
            Self::WindowSpec(window) => {
                out.extend(window.partition_by.iter().map(Node::Expr));
                out.extend(window.order_by.iter().map(Node::OrderByItem));
            }
            Self::TableDefinition(definition) => {
                out.extend(definition.columns.iter().map(Node::ColumnDefinition));
                out.extend(definition.constraints.iter().map(Node::ConstraintDefinition));
                out.extend(definition.indexes.iter().map(Node::IndexDefinition));
            }
            Self::ColumnDefinition(column) => {
                out.push(Node::Ident(&column.name));
                out.extend(column.data_type.iter().map(Node::DataType));
                out.extend(column.computed.iter().map(Node::Expr));
                out.extend(column.constraints.iter().map(Node::ConstraintDefinition));
                out.extend(column.index.iter().map(Node::IndexDefinition));
            }
            Self::ConstraintDefinition(constraint) => {
                out.extend(constraint.name.iter().map(Node::Ident));
                match &constraint.kind {
                    ConstraintKind::Unique(unique) => {
                        out.extend(unique.columns.iter().map(Node::IndexColumn));
                    }
                    ConstraintKind::ForeignKey(fk) => {
                        out.extend(fk.columns.iter().map(Node::Ident));
                        out.push(Node::ObjectName(&fk.references));
                        out.extend(fk.referenced_columns.iter().map(Node::Ident));
                    }
                    ConstraintKind::Check(expr) => out.push(Node::Expr(expr)),
                    ConstraintKind::Default { value, column } => {
                        out.push(Node::Expr(value));
                        out.extend(column.iter().map(Node::Ident));
                    }
                }
            }
            Self::IndexDefinition(index) => {
                out.push(Node::Ident(&index.name));
                out.extend(index.columns.iter().map(Node::IndexColumn));
                out.extend(index.include.iter().map(Node::Ident));
                out.extend(index.filter.iter().map(Node::Expr));
            }
            Self::IndexColumn(column) => out.push(Node::Ident(&column.name)),
            Self::ExecuteParameter(parameter) => {
                out.extend(parameter.name.iter().map(Node::Ident));
                out.push(Node::Expr(&parameter.value));
            }
            Self::VariableDeclaration(declaration) => {
                out.push(Node::Ident(&declaration.name));
                match &declaration.kind {
                    DeclarationKind::Scalar { data_type, value } => {
                        out.push(Node::DataType(data_type));
                        out.extend(value.iter().map(Node::Expr));
                    }
                    DeclarationKind::Table(definition) => {
                        out.push(Node::TableDefinition(definition));
                    }
                }
            }
            Self::ProcedureParameter(parameter) => {
                out.push(Node::Ident(&parameter.name));
                out.push(Node::DataType(&parameter.data_type));
                out.extend(parameter.default.iter().map(Node::Expr));
            }
            Self::Assignment(assignment) => {
                out.push(Node::Expr(&assignment.target));
                out.push(Node::Expr(&assignment.value));
            }
            Self::ObjectName(name) => out.extend(name.parts.iter().map(Node::Ident)),
            Self::Ident(_) => {}
            Self::DataType(data_type) => out.push(Node::ObjectName(&data_type.name)),
        }

        // Stable sort keeps source order for fields that share an offset.
        out.sort_by_key(|child| child.span().offset);
        out
    }
}

fn statement_kind(kind: &StatementKind) -> NodeKind {
    match kind {
        StatementKind::Select(_) => NodeKind::SelectStatement,
        StatementKind::Insert(_) => NodeKind::InsertStatement,
        StatementKind::Update(_) => NodeKind::UpdateStatement,
        StatementKind::Delete(_) => NodeKind::DeleteStatement,
        StatementKind::CreateTable(_) => NodeKind::CreateTableStatement,
        StatementKind::AlterTable(_) => NodeKind::AlterTableStatement,
        StatementKind::CreateIndex(_) => NodeKind::CreateIndexStatement,
        StatementKind::CreateView(_) => NodeKind::CreateViewStatement,
        StatementKind::CreateProcedure(_) => NodeKind::CreateProcedureStatement,
        StatementKind::Drop(_) => NodeKind::DropStatement,
        StatementKind::Truncate(_) => NodeKind::TruncateStatement,
        StatementKind::Execute(_) => NodeKind::ExecuteStatement,
        StatementKind::Declare(_) => NodeKind::DeclareStatement,
        StatementKind::SetVariable(_) => NodeKind::SetVariableStatement,
        StatementKind::SetOption(_) => NodeKind::SetOptionStatement,
        StatementKind::If(_) => NodeKind::IfStatement,
        StatementKind::While(_) => NodeKind::WhileStatement,
        StatementKind::Block(_) => NodeKind::BlockStatement,
        StatementKind::TryCatch(_) => NodeKind::TryCatchStatement,
        StatementKind::Transaction(_) => NodeKind::TransactionStatement,
        StatementKind::Return(_) => NodeKind::ReturnStatement,
        StatementKind::Print(_) => NodeKind::PrintStatement,
        StatementKind::Break => NodeKind::BreakStatement,
        StatementKind::Continue => NodeKind::ContinueStatement,
        StatementKind::Other(_) => NodeKind::OtherStatement,
    }
}

fn expr_kind(kind: &ExprKind) -> NodeKind {
    match kind {
        ExprKind::Column(_) => NodeKind::ColumnReference,
        ExprKind::Variable(_) => NodeKind::VariableReference,
        ExprKind::Literal(_) => NodeKind::Literal,
        ExprKind::Wildcard => NodeKind::Wildcard,
        ExprKind::Binary { .. } => NodeKind::BinaryExpression,
        ExprKind::Unary { .. } => NodeKind::UnaryExpression,
        ExprKind::Nested(_) => NodeKind::ParenthesisExpression,
        ExprKind::Function(_) => NodeKind::FunctionCall,
        ExprKind::Conversion(_) => NodeKind::ConversionCall,
        ExprKind::Case(_) => NodeKind::CaseExpression,
        ExprKind::Subquery(_) => NodeKind::ScalarSubquery,
        ExprKind::Exists(_) => NodeKind::ExistsPredicate,
        ExprKind::InList { .. } | ExprKind::InSubquery { .. } => NodeKind::InPredicate,
        ExprKind::Between { .. } => NodeKind::BetweenPredicate,
        ExprKind::Like { .. } => NodeKind::LikePredicate,
        ExprKind::IsNull { .. } => NodeKind::IsNullPredicate,
    }
}

fn statement_children<'a>(kind: &'a StatementKind, out: &mut Vec<Node<'a>>) {
    match kind {
        StatementKind::Select(query) => out.push(Node::Query(query)),
        StatementKind::Insert(insert) => {
            out.extend(insert.top.iter().map(Node::TopClause));
            out.push(Node::ObjectName(&insert.target));
            out.extend(insert.columns.iter().map(Node::Ident));
            match &insert.source {
                InsertSource::Values(rows) => out.extend(rows.iter().flatten().map(Node::Expr)),
                InsertSource::Query(query) => out.push(Node::Query(query)),
                InsertSource::Execute(exec) => execute_children(exec, out),
                InsertSource::DefaultValues => {}
            }
        }
        StatementKind::Update(update) => {
            out.extend(update.top.iter().map(Node::TopClause));
            out.push(Node::TableReference(&update.target));
            out.extend(update.assignments.iter().map(Node::Assignment));
            out.extend(update.from.iter().map(Node::TableReference));
            out.extend(update.where_clause.iter().map(Node::WhereClause));
        }
        StatementKind::Delete(delete) => {
            out.extend(delete.top.iter().map(Node::TopClause));
            out.push(Node::TableReference(&delete.target));
            out.extend(delete.from.iter().map(Node::TableReference));
            out.extend(delete.where_clause.iter().map(Node::WhereClause));
        }
        StatementKind::CreateTable(create) => {
            out.push(Node::ObjectName(&create.name));
            out.push(Node::TableDefinition(&create.definition));
        }
        StatementKind::AlterTable(alter) => {
            out.push(Node::ObjectName(&alter.name));
            if let AlterTableAction::Add(definition) = &alter.action {
                out.push(Node::TableDefinition(definition));
            }
        }
        StatementKind::CreateIndex(index) => {
            out.push(Node::Ident(&index.name));
            out.push(Node::ObjectName(&index.on));
            out.extend(index.columns.iter().map(Node::IndexColumn));
            out.extend(index.include.iter().map(Node::Ident));
            out.extend(index.filter.iter().map(Node::Expr));
        }
        StatementKind::CreateView(view) => {
            out.push(Node::ObjectName(&view.name));
            out.extend(view.columns.iter().map(Node::Ident));
            out.push(Node::Query(&view.query));
        }
        StatementKind::CreateProcedure(procedure) => {
            out.push(Node::ObjectName(&procedure.name));
            out.extend(procedure.parameters.iter().map(Node::ProcedureParameter));
            out.extend(procedure.body.iter().map(Node::Statement));
        }
        StatementKind::Drop(drop) => {
            out.extend(drop.names.iter().map(Node::ObjectName));
            out.extend(drop.on.iter().map(Node::ObjectName));
        }
        StatementKind::Truncate(name) => out.push(Node::ObjectName(name)),
        StatementKind::Execute(exec) => execute_children(exec, out),
        StatementKind::Declare(declarations) => {
            out.extend(declarations.iter().map(Node::VariableDeclaration));
        }
        StatementKind::SetVariable(set) => {
            out.push(Node::Ident(&set.variable));
            out.push(Node::Expr(&set.value));
        }
        StatementKind::SetOption(set) => {
            out.extend(set.options.iter().map(Node::Ident));
            out.extend(set.value.iter().map(Node::Ident));
        }
        StatementKind::If(stmt) => {
            out.push(Node::Expr(&stmt.condition));
            out.push(Node::Statement(&stmt.then_statement));
            out.extend(stmt.else_statement.iter().map(Node::Statement));
        }
        StatementKind::While(stmt) => {
            out.push(Node::Expr(&stmt.condition));
            out.push(Node::Statement(&stmt.body));
        }
        StatementKind::Block(statements) => out.extend(statements.iter().map(Node::Statement)),
        StatementKind::TryCatch(stmt) => {
            out.extend(stmt.try_statements.iter().map(Node::Statement));
            out.extend(stmt.catch_statements.iter().map(Node::Statement));
        }
        StatementKind::Transaction(stmt) => out.extend(stmt.name.iter().map(Node::Ident)),
        StatementKind::Return(value) => out.extend(value.iter().map(Node::Expr)),
        StatementKind::Print(value) => out.push(Node::Expr(value)),
        StatementKind::Break | StatementKind::Continue | StatementKind::Other(_) => {}
    }
}

fn execute_children<'a>(exec: &'a ExecuteStatement, out: &mut Vec<Node<'a>>) {
    out.extend(exec.return_variable.iter().map(Node::Ident));
    match &exec.target {
        ExecuteTarget::Procedure { name, parameters } => {
            out.push(Node::ObjectName(name));
            out.extend(parameters.iter().map(Node::ExecuteParameter));
        }
        ExecuteTarget::Dynamic(expr) => out.push(Node::Expr(expr)),
    }
}

fn table_children<'a>(kind: &'a TableReferenceKind, out: &mut Vec<Node<'a>>) {
    match kind {
        TableReferenceKind::Named { name, alias, hints } => {
            out.push(Node::ObjectName(name));
            out.extend(alias.iter().map(Node::Ident));
            out.extend(hints.iter().map(Node::Ident));
        }
        TableReferenceKind::Derived {
            query,
            alias,
            columns,
        } => {
            out.push(Node::Query(query));
            out.extend(alias.iter().map(Node::Ident));
            out.extend(columns.iter().map(Node::Ident));
        }
        TableReferenceKind::Function {
            name,
            arguments,
            alias,
        } => {
            out.push(Node::ObjectName(name));
            out.extend(arguments.iter().map(Node::Expr));
            out.extend(alias.iter().map(Node::Ident));
        }
        TableReferenceKind::Parenthesized(inner) => out.push(Node::TableReference(inner)),
        TableReferenceKind::QualifiedJoin {
            first,
            second,
            condition,
            ..
        } => {
            out.push(Node::TableReference(first));
            out.push(Node::TableReference(second));
            out.push(Node::Expr(condition));
        }
        TableReferenceKind::UnqualifiedJoin { first, second, .. } => {
            out.push(Node::TableReference(first));
            out.push(Node::TableReference(second));
        }
    }
}

fn expr_children<'a>(kind: &'a ExprKind, out: &mut Vec<Node<'a>>) {
    match kind {
        ExprKind::Column(parts) => out.extend(parts.iter().map(Node::Ident)),
        ExprKind::Variable(_) | ExprKind::Literal(_) | ExprKind::Wildcard => {}
        ExprKind::Binary { left, right, .. } => {
            out.push(Node::Expr(left));
            out.push(Node::Expr(right));
        }
        ExprKind::Unary { expr, .. } | ExprKind::Nested(expr) => out.push(Node::Expr(expr)),
        ExprKind::Function(call) => {
            out.push(Node::ObjectName(&call.name));
            out.extend(call.arguments.iter().map(Node::Expr));
            out.extend(call.within_group.iter().map(Node::OrderByItem));
            out.extend(call.over.iter().map(Node::WindowSpec));
        }
        ExprKind::Conversion(conversion) => {
            out.push(Node::DataType(&conversion.data_type));
            out.push(Node::Expr(&conversion.expr));
            out.extend(conversion.style.iter().map(|style| Node::Expr(style)));
        }
        ExprKind::Case(case) => {
            out.extend(case.operand.iter().map(|operand| Node::Expr(operand)));
            out.extend(case.when_clauses.iter().map(Node::WhenClause));
            out.extend(case.else_result.iter().map(|result| Node::Expr(result)));
        }
        ExprKind::Subquery(query) | ExprKind::Exists(query) => out.push(Node::Query(query)),
        ExprKind::InList { expr, list, .. } => {
            out.push(Node::Expr(expr));
            out.extend(list.iter().map(Node::Expr));
        }
        ExprKind::InSubquery { expr, subquery, .. } => {
            out.push(Node::Expr(expr));
            out.push(Node::Query(subquery));
        }
        ExprKind::Between {
            expr, low, high, ..
        } => {
            out.push(Node::Expr(expr));
            out.push(Node::Expr(low));
            out.push(Node::Expr(high));
        }
        ExprKind::Like {
            expr,
            pattern,
            escape,
            ..
        } => {
            out.push(Node::Expr(expr));
            out.push(Node::Expr(pattern));
            out.extend(escape.iter().map(|escape| Node::Expr(escape)));
        }
        ExprKind::IsNull { expr, .. } => out.push(Node::Expr(expr)),
    }
}
