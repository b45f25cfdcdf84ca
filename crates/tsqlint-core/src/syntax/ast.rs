//! Typed syntax tree for the supported T-SQL subset.
//!
//! Every node carries a [`Span`]. Binary operator chains are left-deep, so
//! `a + b + c` is `(a + b) + c`, and joins nest the same way.

use super::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub value: String,
    /// `[`, `"` or `'` for delimited names, `None` for bare words.
    pub quote_style: Option<char>,
    pub span: Span,
}

/// A possibly multi-part name such as `db.dbo.Customer`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectName {
    pub parts: Vec<Ident>,
    pub span: Span,
}

impl ObjectName {
    /// The last part of the name (`Customer` in `dbo.Customer`).
    pub fn base_identifier(&self) -> Option<&Ident> {
        self.parts.last()
    }

    /// The part before the base identifier, when present.
    pub fn schema_identifier(&self) -> Option<&Ident> {
        self.parts.len().checked_sub(2).and_then(|i| self.parts.get(i))
    }

    /// Simple (unqualified) name, matched case-insensitively by callers.
    pub fn simple_name(&self) -> &str {
        self.base_identifier().map_or("", |ident| ident.value.as_str())
    }

    pub fn to_dotted(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.value.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    pub name: ObjectName,
    /// Raw length/precision arguments, e.g. `["50"]` or `["MAX"]`.
    pub arguments: Vec<String>,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Scripts and statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub batches: Vec<Batch>,
    pub span: Span,
}

/// Statements between two `GO` separators.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Select(Box<Query>),
    Insert(Box<InsertStatement>),
    Update(Box<UpdateStatement>),
    Delete(Box<DeleteStatement>),
    CreateTable(Box<CreateTableStatement>),
    AlterTable(Box<AlterTableStatement>),
    CreateIndex(Box<CreateIndexStatement>),
    CreateView(Box<CreateViewStatement>),
    CreateProcedure(Box<CreateProcedureStatement>),
    Drop(Box<DropStatement>),
    Truncate(ObjectName),
    Execute(Box<ExecuteStatement>),
    Declare(Vec<VariableDeclaration>),
    SetVariable(Box<SetVariableStatement>),
    SetOption(SetOptionStatement),
    If(Box<IfStatement>),
    While(Box<WhileStatement>),
    Block(Vec<Statement>),
    TryCatch(Box<TryCatchStatement>),
    Transaction(TransactionStatement),
    Return(Option<Expr>),
    Print(Expr),
    Break,
    Continue,
    /// A statement whose contents are skipped, named by its leading word in
    /// upper case (`MERGE`, `THROW`, `RAISERROR`, `WAITFOR`, `USE`, `GOTO`).
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub top: Option<TopClause>,
    pub target: ObjectName,
    pub columns: Vec<Ident>,
    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Query(Box<Query>),
    Execute(Box<ExecuteStatement>),
    DefaultValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub top: Option<TopClause>,
    pub target: TableReference,
    pub assignments: Vec<Assignment>,
    pub from: Vec<TableReference>,
    pub where_clause: Option<WhereClause>,
}

/// `target = value` in an `UPDATE ... SET` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub top: Option<TopClause>,
    pub target: TableReference,
    pub from: Vec<TableReference>,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteStatement {
    /// `@rc` in `EXEC @rc = dbo.proc`.
    pub return_variable: Option<Ident>,
    pub target: ExecuteTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteTarget {
    Procedure {
        name: ObjectName,
        parameters: Vec<ExecuteParameter>,
    },
    /// `EXEC (@sql)` or `EXEC ('...' + @x)`.
    Dynamic(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteParameter {
    /// `@name` for named arguments, `None` for positional ones.
    pub name: Option<Ident>,
    pub value: Expr,
    pub output: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: Ident,
    pub kind: DeclarationKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    Scalar {
        data_type: DataType,
        value: Option<Expr>,
    },
    Table(TableDefinition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetVariableStatement {
    pub variable: Ident,
    /// Operator of a compound assignment (`SET @x += 1`).
    pub operator: Option<BinaryOperator>,
    pub value: Expr,
}

/// `SET NOCOUNT ON`, `SET TRANSACTION ISOLATION LEVEL ...` and friends.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOptionStatement {
    pub options: Vec<Ident>,
    pub value: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expr,
    pub then_statement: Statement,
    pub else_statement: Option<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expr,
    pub body: Statement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryCatchStatement {
    pub try_statements: Vec<Statement>,
    pub catch_statements: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatement {
    pub kind: TransactionKind,
    pub name: Option<Ident>,
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    Create,
    CreateOrAlter,
    Alter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: ObjectName,
    pub definition: TableDefinition,
}

/// Column, constraint and index elements of a table.
///
/// Shared by `CREATE TABLE`, `ALTER TABLE ... ADD` and table variables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub columns: Vec<ColumnDefinition>,
    pub constraints: Vec<ConstraintDefinition>,
    pub indexes: Vec<IndexDefinition>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: Ident,
    /// `None` for computed columns.
    pub data_type: Option<DataType>,
    pub computed: Option<Expr>,
    pub nullable: Option<bool>,
    pub identity: bool,
    pub constraints: Vec<ConstraintDefinition>,
    /// Inline `INDEX ix [CLUSTERED|NONCLUSTERED]` on the column.
    pub index: Option<IndexDefinition>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDefinition {
    pub name: Option<Ident>,
    pub kind: ConstraintKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    Unique(UniqueConstraint),
    ForeignKey(ForeignKeyConstraint),
    Check(Expr),
    Default {
        value: Expr,
        /// Column named by `DEFAULT x FOR col` in `ALTER TABLE ... ADD`.
        column: Option<Ident>,
    },
}

/// `PRIMARY KEY` or `UNIQUE`.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueConstraint {
    pub primary_key: bool,
    /// `Some(true)` for `CLUSTERED`, `Some(false)` for `NONCLUSTERED`,
    /// `None` when the author left it to the server default.
    pub clustered: Option<bool>,
    /// Empty for column-level constraints.
    pub columns: Vec<IndexColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyConstraint {
    pub columns: Vec<Ident>,
    pub references: ObjectName,
    pub referenced_columns: Vec<Ident>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Clustered,
    NonClustered,
    ClusteredColumnstore,
    NonClusteredColumnstore,
}

impl IndexType {
    pub fn from_options(clustered: Option<bool>, columnstore: bool) -> Option<Self> {
        match (clustered, columnstore) {
            (Some(true), false) => Some(Self::Clustered),
            (Some(false), false) => Some(Self::NonClustered),
            (Some(true), true) => Some(Self::ClusteredColumnstore),
            (_, true) => Some(Self::NonClusteredColumnstore),
            (None, false) => None,
        }
    }

    pub fn is_clustered(self) -> bool {
        matches!(self, Self::Clustered | Self::ClusteredColumnstore)
    }
}

/// An index declared inside a table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: Ident,
    pub unique: bool,
    pub index_type: Option<IndexType>,
    pub columns: Vec<IndexColumn>,
    pub include: Vec<Ident>,
    pub filter: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub name: Ident,
    pub direction: Option<SortDirection>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub name: ObjectName,
    pub action: AlterTableAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    Add(TableDefinition),
    /// Any other alteration; its tokens are kept only through the span.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub name: Ident,
    pub on: ObjectName,
    pub unique: bool,
    pub clustered: Option<bool>,
    pub columnstore: bool,
    pub columns: Vec<IndexColumn>,
    pub include: Vec<Ident>,
    pub filter: Option<Expr>,
}

impl CreateIndexStatement {
    pub fn index_type(&self) -> Option<IndexType> {
        IndexType::from_options(self.clustered, self.columnstore)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStatement {
    pub mode: CreateMode,
    pub name: ObjectName,
    pub columns: Vec<Ident>,
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProcedureStatement {
    pub mode: CreateMode,
    pub name: ObjectName,
    pub parameters: Vec<ProcedureParameter>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParameter {
    pub name: Ident,
    pub data_type: DataType,
    pub default: Option<Expr>,
    pub output: bool,
    pub read_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropStatement {
    /// Upper-cased object type, e.g. `TABLE`, `VIEW`, `INDEX`.
    pub object_type: String,
    pub if_exists: bool,
    pub names: Vec<ObjectName>,
    /// Table named by `DROP INDEX ix ON table`.
    pub on: Option<ObjectName>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub ctes: Vec<CommonTableExpression>,
    pub body: QueryExpr,
    pub order_by: Vec<OrderByItem>,
    pub offset: Option<Expr>,
    pub fetch: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub query: Query,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpr {
    pub kind: QueryExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryExprKind {
    Specification(Box<QuerySpecification>),
    Parenthesized(Box<Query>),
    SetOperation {
        operator: SetOperator,
        all: bool,
        left: Box<QueryExpr>,
        right: Box<QueryExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Except,
    Intersect,
}

/// A single `SELECT ... FROM ... WHERE ...` block.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpecification {
    pub distinct: bool,
    pub top: Option<TopClause>,
    pub select_list: Vec<SelectElement>,
    pub into: Option<ObjectName>,
    pub from: Vec<TableReference>,
    pub where_clause: Option<WhereClause>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopClause {
    pub expr: Expr,
    pub percent: bool,
    pub with_ties: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectElement {
    pub kind: SelectElementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectElementKind {
    /// `*` or `t.*`.
    Wildcard { qualifier: Option<ObjectName> },
    /// `expr [AS] alias`, or `alias = expr` (stored with the alias split out).
    Expression { expr: Expr, alias: Option<Ident> },
    /// `@v = expr`.
    VariableAssignment { variable: Ident, value: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub direction: Option<SortDirection>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    pub kind: TableReferenceKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableReferenceKind {
    Named {
        name: ObjectName,
        alias: Option<Ident>,
        hints: Vec<Ident>,
    },
    Derived {
        query: Box<Query>,
        alias: Option<Ident>,
        columns: Vec<Ident>,
    },
    Function {
        name: ObjectName,
        arguments: Vec<Expr>,
        alias: Option<Ident>,
    },
    Parenthesized(Box<TableReference>),
    QualifiedJoin {
        first: Box<TableReference>,
        second: Box<TableReference>,
        join_type: QualifiedJoinType,
        condition: Expr,
    },
    UnqualifiedJoin {
        first: Box<TableReference>,
        second: Box<TableReference>,
        join_type: UnqualifiedJoinType,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifiedJoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnqualifiedJoinType {
    CrossJoin,
    CrossApply,
    OuterApply,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Drop for Expr {
    // Operator chains are left-deep and unbounded in length; unlink nested
    // binary operands onto a worklist so dropping one never recurses per
    // operand.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_binary_operands(&mut self.kind, &mut pending);
        while let Some(mut expr) = pending.pop() {
            detach_binary_operands(&mut expr.kind, &mut pending);
        }
    }
}

fn detach_binary_operands(kind: &mut ExprKind, pending: &mut Vec<Expr>) {
    if let ExprKind::Binary { left, right, .. } = kind {
        for operand in [left, right] {
            if matches!(operand.kind, ExprKind::Binary { .. }) {
                let placeholder = Expr {
                    kind: ExprKind::Wildcard,
                    span: Span::default(),
                };
                pending.push(std::mem::replace(&mut **operand, placeholder));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Column(Vec<Ident>),
    Variable(Ident),
    Literal(Literal),
    /// `*` inside `COUNT(*)`.
    Wildcard,
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    /// A parenthesized expression.
    Nested(Box<Expr>),
    Function(Box<FunctionCall>),
    Conversion(Box<Conversion>),
    Case(CaseExpr),
    Subquery(Box<Query>),
    Exists(Box<Query>),
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Query>,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        escape: Option<Box<Expr>>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Decoded value; string contents without quotes.
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    NationalString,
    Integer,
    Numeric,
    Binary,
    Null,
    /// `DEFAULT` in a `VALUES` row or procedure argument.
    Default,
}

impl LiteralKind {
    pub fn is_string(self) -> bool {
        matches!(self, Self::String | Self::NationalString)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    NotLt,
    NotGt,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NotEq
                | Self::Lt
                | Self::Gt
                | Self::LtEq
                | Self::GtEq
                | Self::NotLt
                | Self::NotGt
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
    BitNot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: ObjectName,
    pub distinct: bool,
    pub arguments: Vec<Expr>,
    /// `WITHIN GROUP (ORDER BY ...)`.
    pub within_group: Vec<OrderByItem>,
    pub over: Option<WindowSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionFunction {
    Cast,
    TryCast,
    Convert,
    TryConvert,
}

impl ConversionFunction {
    pub fn is_try(self) -> bool {
        matches!(self, Self::TryCast | Self::TryConvert)
    }
}

/// `CAST(x AS t)`, `CONVERT(t, x [, style])` and their `TRY_` forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub function: ConversionFunction,
    pub data_type: DataType,
    pub expr: Box<Expr>,
    pub style: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    /// Present for simple `CASE x WHEN ...`, absent for searched CASE.
    pub operand: Option<Box<Expr>>,
    pub when_clauses: Vec<WhenClause>,
    pub else_result: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
    pub span: Span,
}
