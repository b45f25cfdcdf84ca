//! `CREATE`, `ALTER` and `DROP` statements.
//!
//! Table definitions are shared by `CREATE TABLE`, `ALTER TABLE ... ADD`
//! and `DECLARE @t TABLE (...)`. Storage options (`WITH (...)`,
//! `ON [filegroup]`, `TEXTIMAGE_ON`) are consumed but not modelled.

use super::{Parser, Result};
use crate::syntax::{
    AlterTableAction, AlterTableStatement, ColumnDefinition, ConstraintDefinition,
    ConstraintKind, CreateIndexStatement, CreateMode, CreateProcedureStatement,
    CreateTableStatement, CreateViewStatement, DropStatement, ForeignKeyConstraint, Ident,
    IndexColumn, IndexDefinition, IndexType, Keyword, ProcedureParameter, SortDirection,
    StatementKind, TableDefinition, TokenKind, UniqueConstraint,
};

impl<'t> Parser<'t> {
    pub(super) fn parse_create(&mut self) -> Result<StatementKind> {
        self.expect_keyword(Keyword::Create)?;
        let or_alter = self.check_keyword(Keyword::Or) && self.peek_keyword(1, Keyword::Alter);
        if or_alter {
            self.advance();
            self.advance();
        }
        let mode = if or_alter {
            CreateMode::CreateOrAlter
        } else {
            CreateMode::Create
        };

        let token = self
            .current()
            .ok_or_else(|| self.error_expected("object type"))?;
        match token.kind {
            TokenKind::Keyword(Keyword::Table) if !or_alter => {
                Ok(StatementKind::CreateTable(Box::new(self.parse_create_table()?)))
            }
            TokenKind::Keyword(
                Keyword::Unique | Keyword::Clustered | Keyword::NonClustered | Keyword::Index,
            ) if !or_alter => Ok(StatementKind::CreateIndex(Box::new(
                self.parse_create_index()?,
            ))),
            TokenKind::Identifier if token.is_word("COLUMNSTORE") && !or_alter => Ok(
                StatementKind::CreateIndex(Box::new(self.parse_create_index()?)),
            ),
            TokenKind::Keyword(Keyword::View) => Ok(StatementKind::CreateView(Box::new(
                self.parse_view(mode)?,
            ))),
            TokenKind::Keyword(Keyword::Proc | Keyword::Procedure) => Ok(
                StatementKind::CreateProcedure(Box::new(self.parse_procedure(mode)?)),
            ),
            _ => Err(self.unsupported()),
        }
    }

    pub(super) fn parse_alter(&mut self) -> Result<StatementKind> {
        self.expect_keyword(Keyword::Alter)?;
        let token = self
            .current()
            .ok_or_else(|| self.error_expected("object type"))?;
        match token.kind {
            TokenKind::Keyword(Keyword::Table) => {
                Ok(StatementKind::AlterTable(Box::new(self.parse_alter_table()?)))
            }
            TokenKind::Keyword(Keyword::View) => Ok(StatementKind::CreateView(Box::new(
                self.parse_view(CreateMode::Alter)?,
            ))),
            TokenKind::Keyword(Keyword::Proc | Keyword::Procedure) => {
                Ok(StatementKind::CreateProcedure(Box::new(
                    self.parse_procedure(CreateMode::Alter)?,
                )))
            }
            _ => Err(self.unsupported()),
        }
    }

    pub(super) fn parse_drop(&mut self) -> Result<StatementKind> {
        self.expect_keyword(Keyword::Drop)?;
        let object_type = self.take_ident()?.value.to_ascii_uppercase();
        let if_exists = self.check_keyword(Keyword::If) && self.peek_keyword(1, Keyword::Exists);
        if if_exists {
            self.advance();
            self.advance();
        }

        let mut names = vec![self.parse_object_name()?];
        while self.consume(TokenKind::Comma) {
            names.push(self.parse_object_name()?);
        }
        let on = if self.consume_keyword(Keyword::On) {
            Some(self.parse_object_name()?)
        } else {
            None
        };

        Ok(StatementKind::Drop(Box::new(DropStatement {
            object_type,
            if_exists,
            names,
            on,
        })))
    }

    // ========================================================================
    // Tables
    // ========================================================================

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect_keyword(Keyword::Table)?;
        let name = self.parse_object_name()?;
        let definition = self.parse_table_definition()?;
        self.skip_storage_options()?;
        Ok(CreateTableStatement { name, definition })
    }

    /// `( element [, element...] )`
    pub(super) fn parse_table_definition(&mut self) -> Result<TableDefinition> {
        let start = self.pos;
        self.expect(TokenKind::LParen)?;
        let mut definition = self.parse_table_elements(start)?;
        self.expect(TokenKind::RParen)?;
        definition.span = self.span_from(start);
        Ok(definition)
    }

    fn parse_table_elements(&mut self, start: usize) -> Result<TableDefinition> {
        let mut definition = TableDefinition {
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            span: self.span_from(start),
        };

        loop {
            if self.check_keyword(Keyword::Index) {
                definition.indexes.push(self.parse_index_definition()?);
            } else if let Some(constraint) = self.parse_constraint()? {
                definition.constraints.push(constraint);
            } else {
                definition.columns.push(self.parse_column_definition()?);
            }
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        definition.span = self.span_from(start);
        Ok(definition)
    }

    fn parse_column_definition(&mut self) -> Result<ColumnDefinition> {
        let start = self.pos;
        let name = self.parse_ident()?;

        let mut data_type = None;
        let mut computed = None;
        if self.consume_keyword(Keyword::As) {
            computed = Some(self.parse_expression()?);
            self.consume_word("PERSISTED");
        } else {
            data_type = Some(self.parse_data_type()?);
        }

        let mut nullable = None;
        let mut identity = false;
        let mut constraints = Vec::new();
        let mut index = None;

        loop {
            if self.consume_keyword(Keyword::Null) {
                nullable = Some(true);
            } else if self.check_keyword(Keyword::Not) && self.peek_keyword(1, Keyword::Null) {
                self.advance();
                self.advance();
                nullable = Some(false);
            } else if self.check_keyword(Keyword::Not) && self.peek_keyword(1, Keyword::For) {
                self.advance();
                self.advance();
                self.expect_word("REPLICATION")?;
            } else if self.consume_keyword(Keyword::Identity) {
                if self.check(TokenKind::LParen) {
                    self.skip_parenthesized()?;
                }
                identity = true;
            } else if self.consume_keyword(Keyword::Collate) {
                self.parse_ident()?;
            } else if self.consume_keyword(Keyword::Rowguidcol)
                || self.consume_word("SPARSE")
                || self.consume_word("FILESTREAM")
                || self.consume_word("PERSISTED")
            {
            } else if self.check_keyword(Keyword::Index) {
                index = Some(self.parse_index_definition()?);
            } else if let Some(constraint) = self.parse_constraint()? {
                constraints.push(constraint);
            } else {
                break;
            }
        }

        Ok(ColumnDefinition {
            name,
            data_type,
            computed,
            nullable,
            identity,
            constraints,
            index,
            span: self.span_from(start),
        })
    }

    /// Parses a column or table constraint, or returns `None` without
    /// consuming anything when the current token does not start one.
    fn parse_constraint(&mut self) -> Result<Option<ConstraintDefinition>> {
        let start = self.pos;
        let name = if self.consume_keyword(Keyword::Constraint) {
            Some(self.parse_ident()?)
        } else {
            None
        };

        let kind = if self.consume_keyword(Keyword::Primary) {
            self.expect_keyword(Keyword::Key)?;
            ConstraintKind::Unique(self.parse_unique_body(true)?)
        } else if self.consume_keyword(Keyword::Unique) {
            ConstraintKind::Unique(self.parse_unique_body(false)?)
        } else if self.consume_keyword(Keyword::Foreign) {
            self.expect_keyword(Keyword::Key)?;
            let columns = self.parse_parenthesized_idents()?;
            ConstraintKind::ForeignKey(self.parse_references(columns)?)
        } else if self.check_keyword(Keyword::References) {
            ConstraintKind::ForeignKey(self.parse_references(Vec::new())?)
        } else if self.consume_keyword(Keyword::Check) {
            if self.check_keyword(Keyword::Not) && self.peek_keyword(1, Keyword::For) {
                self.advance();
                self.advance();
                self.expect_word("REPLICATION")?;
            }
            self.expect(TokenKind::LParen)?;
            let condition = self.parse_expression()?;
            self.expect(TokenKind::RParen)?;
            ConstraintKind::Check(condition)
        } else if self.consume_keyword(Keyword::Default) {
            let value = self.parse_expression()?;
            let column = if self.consume_keyword(Keyword::For) {
                Some(self.parse_ident()?)
            } else {
                None
            };
            ConstraintKind::Default { value, column }
        } else if name.is_some() {
            return Err(self.error_expected("constraint"));
        } else {
            return Ok(None);
        };

        Ok(Some(ConstraintDefinition {
            name,
            kind,
            span: self.span_from(start),
        }))
    }

    /// Remainder of `PRIMARY KEY` / `UNIQUE`.
    fn parse_unique_body(&mut self, primary_key: bool) -> Result<UniqueConstraint> {
        let clustered = self.parse_clustered();
        self.consume_word("COLUMNSTORE");
        let columns = if self.check(TokenKind::LParen) {
            self.parse_index_columns()?
        } else {
            Vec::new()
        };
        self.skip_storage_options()?;
        Ok(UniqueConstraint {
            primary_key,
            clustered,
            columns,
        })
    }

    fn parse_clustered(&mut self) -> Option<bool> {
        if self.consume_keyword(Keyword::Clustered) {
            Some(true)
        } else if self.consume_keyword(Keyword::NonClustered) {
            Some(false)
        } else {
            None
        }
    }

    /// `REFERENCES table [(cols)] [ON DELETE|UPDATE action]... [NOT FOR REPLICATION]`
    fn parse_references(&mut self, columns: Vec<Ident>) -> Result<ForeignKeyConstraint> {
        self.expect_keyword(Keyword::References)?;
        let references = self.parse_object_name()?;
        let referenced_columns = if self.check(TokenKind::LParen) {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };

        loop {
            if self.check_keyword(Keyword::On)
                && (self.peek_keyword(1, Keyword::Delete) || self.peek_keyword(1, Keyword::Update))
            {
                self.advance();
                self.advance();
                if self.consume_keyword(Keyword::Cascade) {
                    continue;
                }
                if self.consume_word("NO") {
                    self.expect_word("ACTION")?;
                    continue;
                }
                self.expect_keyword(Keyword::Set)?;
                if !self.consume_keyword(Keyword::Null) {
                    self.expect_keyword(Keyword::Default)?;
                }
            } else if self.check_keyword(Keyword::Not) && self.peek_keyword(1, Keyword::For) {
                self.advance();
                self.advance();
                self.expect_word("REPLICATION")?;
            } else {
                break;
            }
        }

        Ok(ForeignKeyConstraint {
            columns,
            references,
            referenced_columns,
        })
    }

    fn parse_index_columns(&mut self) -> Result<Vec<IndexColumn>> {
        self.expect(TokenKind::LParen)?;
        let mut columns = Vec::new();
        loop {
            let start = self.pos;
            let name = self.parse_ident()?;
            let direction = if self.consume_keyword(Keyword::Asc) {
                Some(SortDirection::Asc)
            } else if self.consume_keyword(Keyword::Desc) {
                Some(SortDirection::Desc)
            } else {
                None
            };
            columns.push(IndexColumn {
                name,
                direction,
                span: self.span_from(start),
            });
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(columns)
    }

    /// Inline `INDEX name [UNIQUE] [CLUSTERED|NONCLUSTERED] [COLUMNSTORE] [(cols)] ...`
    fn parse_index_definition(&mut self) -> Result<IndexDefinition> {
        let start = self.pos;
        self.expect_keyword(Keyword::Index)?;
        let name = self.parse_ident()?;
        let unique = self.consume_keyword(Keyword::Unique);
        let clustered = self.parse_clustered();
        let columnstore = self.consume_word("COLUMNSTORE");

        let columns = if self.check(TokenKind::LParen) {
            self.parse_index_columns()?
        } else {
            Vec::new()
        };
        let include = if self.consume_word("INCLUDE") {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };
        let filter = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.skip_storage_options()?;

        Ok(IndexDefinition {
            name,
            unique,
            index_type: IndexType::from_options(clustered, columnstore),
            columns,
            include,
            filter,
            span: self.span_from(start),
        })
    }

    /// Consumes `WITH (...)`, `WITH FILLFACTOR = n`, `ON filegroup[(col)]`,
    /// `TEXTIMAGE_ON fg` and `FILESTREAM_ON fg` in any order.
    fn skip_storage_options(&mut self) -> Result<()> {
        loop {
            if self.check_keyword(Keyword::With) && self.peek_is(1, TokenKind::LParen) {
                self.advance();
                self.skip_parenthesized()?;
            } else if self.check_keyword(Keyword::With) && self.peek_word(1, "FILLFACTOR") {
                self.advance();
                self.advance();
                self.expect(TokenKind::Eq)?;
                self.advance();
            } else if self.check_keyword(Keyword::On)
                && !self.peek_keyword(1, Keyword::Delete)
                && !self.peek_keyword(1, Keyword::Update)
            {
                self.advance();
                self.take_ident()?;
                if self.check(TokenKind::LParen) {
                    self.skip_parenthesized()?;
                }
            } else if self.check_word("TEXTIMAGE_ON") || self.check_word("FILESTREAM_ON") {
                self.advance();
                self.take_ident()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_alter_table(&mut self) -> Result<AlterTableStatement> {
        self.expect_keyword(Keyword::Table)?;
        let name = self.parse_object_name()?;

        if self.check_keyword(Keyword::With)
            && (self.peek_keyword(1, Keyword::Check) || self.peek_keyword(1, Keyword::Nocheck))
        {
            self.advance();
            self.advance();
        }

        let action = if self.consume_keyword(Keyword::Add) {
            let start = self.pos;
            AlterTableAction::Add(self.parse_table_elements(start)?)
        } else {
            // Consume the action keyword itself (`DROP`, `ALTER`, `SET`, ...)
            // so it is not taken for the start of the next statement.
            self.advance();
            self.skip_to_statement_end();
            AlterTableAction::Other
        };

        Ok(AlterTableStatement { name, action })
    }

    // ========================================================================
    // Indexes, views and procedures
    // ========================================================================

    fn parse_create_index(&mut self) -> Result<CreateIndexStatement> {
        let unique = self.consume_keyword(Keyword::Unique);
        let clustered = self.parse_clustered();
        let columnstore = self.consume_word("COLUMNSTORE");
        self.expect_keyword(Keyword::Index)?;
        let name = self.parse_ident()?;
        self.expect_keyword(Keyword::On)?;
        let on = self.parse_object_name()?;

        let columns = if self.check(TokenKind::LParen) {
            self.parse_index_columns()?
        } else {
            Vec::new()
        };
        let include = if self.consume_word("INCLUDE") {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };
        let filter = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.skip_storage_options()?;

        Ok(CreateIndexStatement {
            name,
            on,
            unique,
            clustered,
            columnstore,
            columns,
            include,
            filter,
        })
    }

    fn parse_view(&mut self, mode: CreateMode) -> Result<CreateViewStatement> {
        self.expect_keyword(Keyword::View)?;
        let name = self.parse_object_name()?;
        let columns = if self.check(TokenKind::LParen) {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };

        // WITH SCHEMABINDING, ENCRYPTION, VIEW_METADATA
        if self.consume_keyword(Keyword::With) {
            loop {
                self.take_ident()?;
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_keyword(Keyword::As)?;
        let query = self.parse_query()?;

        if self.check_keyword(Keyword::With) && self.peek_keyword(1, Keyword::Check) {
            self.advance();
            self.advance();
            self.expect_keyword(Keyword::Option)?;
        }

        Ok(CreateViewStatement {
            mode,
            name,
            columns,
            query,
        })
    }

    fn parse_procedure(&mut self, mode: CreateMode) -> Result<CreateProcedureStatement> {
        self.advance();
        let name = self.parse_object_name()?;

        let mut parameters = Vec::new();
        let parenthesized = self.consume(TokenKind::LParen);
        if self.check(TokenKind::Variable) {
            loop {
                parameters.push(self.parse_procedure_parameter()?);
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        if parenthesized {
            self.expect(TokenKind::RParen)?;
        }

        // WITH RECOMPILE, ENCRYPTION, EXECUTE AS OWNER, ...
        if self.consume_keyword(Keyword::With) {
            loop {
                if self.consume_keyword(Keyword::Execute) || self.consume_keyword(Keyword::Exec) {
                    self.expect_keyword(Keyword::As)?;
                }
                self.take_ident()?;
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        if self.check_keyword(Keyword::For) && self.peek_word(1, "REPLICATION") {
            self.advance();
            self.advance();
        }

        self.expect_keyword(Keyword::As)?;
        let body = self.parse_statement_list(false)?;

        Ok(CreateProcedureStatement {
            mode,
            name,
            parameters,
            body,
        })
    }

    fn parse_procedure_parameter(&mut self) -> Result<ProcedureParameter> {
        let start = self.pos;
        let name = self.parse_variable()?;
        self.consume_keyword(Keyword::As);
        let data_type = self.parse_data_type()?;
        self.consume_word("VARYING");
        let default = if self.consume(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let mut output = false;
        let mut read_only = false;
        loop {
            if self.consume_word("OUTPUT") || self.consume_word("OUT") {
                output = true;
            } else if self.consume_word("READONLY") {
                read_only = true;
            } else {
                break;
            }
        }

        Ok(ProcedureParameter {
            name,
            data_type,
            default,
            output,
            read_only,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_script;
    use crate::syntax::*;

    fn first_statement(sql: &str) -> Statement {
        let tree = parse_script(sql).expect("parse");
        tree.script().batches[0].statements[0].clone()
    }

    #[test]
    fn create_table_collects_columns_constraints_and_indexes() {
        let statement = first_statement(
            "CREATE TABLE dbo.Customer (
                Id INT IDENTITY(1, 1) NOT NULL CONSTRAINT PK_Customer PRIMARY KEY CLUSTERED,
                Code NVARCHAR(20) COLLATE Latin1_General_CI_AS NULL UNIQUE,
                ParentId INT NULL REFERENCES dbo.Customer (Id) ON DELETE NO ACTION,
                Total AS (Id * 2) PERSISTED,
                CONSTRAINT CK_Code CHECK (Code <> N''),
                INDEX IX_Code NONCLUSTERED (Code DESC) INCLUDE (ParentId) WHERE Code IS NOT NULL
            ) ON [PRIMARY] TEXTIMAGE_ON [PRIMARY];",
        );
        let StatementKind::CreateTable(create) = &statement.kind else {
            panic!("expected CREATE TABLE");
        };
        let definition = &create.definition;
        assert_eq!(create.name.to_dotted(), "dbo.Customer");
        assert_eq!(definition.columns.len(), 4);
        assert_eq!(definition.constraints.len(), 1);
        assert_eq!(definition.indexes.len(), 1);

        let id = &definition.columns[0];
        assert!(id.identity);
        assert_eq!(id.nullable, Some(false));
        assert!(matches!(
            &id.constraints[0].kind,
            ConstraintKind::Unique(UniqueConstraint {
                primary_key: true,
                clustered: Some(true),
                ..
            })
        ));
        assert!(definition.columns[3].computed.is_some());
        assert_eq!(
            definition.indexes[0].index_type,
            Some(IndexType::NonClustered)
        );
    }

    #[test]
    fn alter_table_add_and_opaque_actions() {
        let tree = parse_script(
            "ALTER TABLE dbo.T WITH CHECK ADD CONSTRAINT PK_T PRIMARY KEY CLUSTERED (Id);
             ALTER TABLE dbo.T DROP CONSTRAINT PK_T;
             ALTER TABLE dbo.T ADD Name NVARCHAR(10) NULL, CONSTRAINT DF_T DEFAULT (N'') FOR Name",
        )
        .expect("parse");
        let statements = &tree.script().batches[0].statements;
        assert_eq!(statements.len(), 3);

        let StatementKind::AlterTable(first) = &statements[0].kind else {
            panic!("expected ALTER TABLE");
        };
        let AlterTableAction::Add(definition) = &first.action else {
            panic!("expected ADD");
        };
        assert_eq!(definition.constraints.len(), 1);

        let StatementKind::AlterTable(second) = &statements[1].kind else {
            panic!("expected ALTER TABLE");
        };
        assert_eq!(second.action, AlterTableAction::Other);

        let StatementKind::AlterTable(third) = &statements[2].kind else {
            panic!("expected ALTER TABLE");
        };
        let AlterTableAction::Add(definition) = &third.action else {
            panic!("expected ADD");
        };
        assert_eq!(definition.columns.len(), 1);
        assert_eq!(definition.constraints.len(), 1);
    }

    #[test]
    fn create_index_variants() {
        let statement =
            first_statement("CREATE UNIQUE NONCLUSTERED INDEX IX_T ON dbo.T (A, B) INCLUDE (C)");
        let StatementKind::CreateIndex(index) = &statement.kind else {
            panic!("expected CREATE INDEX");
        };
        assert!(index.unique);
        assert_eq!(index.index_type(), Some(IndexType::NonClustered));

        let statement = first_statement("CREATE CLUSTERED COLUMNSTORE INDEX CCI_T ON dbo.T");
        let StatementKind::CreateIndex(index) = &statement.kind else {
            panic!("expected CREATE INDEX");
        };
        assert_eq!(index.index_type(), Some(IndexType::ClusteredColumnstore));
        assert!(index.columns.is_empty());
    }

    #[test]
    fn create_procedure_body_runs_to_end_of_batch() {
        let tree = parse_script(
            "CREATE OR ALTER PROCEDURE dbo.p @id INT, @name NVARCHAR(10) = NULL OUTPUT
             AS
             BEGIN
                 SET NOCOUNT ON;
                 SELECT @id;
             END
             GO
             SELECT 1",
        )
        .expect("parse");
        let batches = &tree.script().batches;
        assert_eq!(batches.len(), 2);
        let StatementKind::CreateProcedure(procedure) = &batches[0].statements[0].kind else {
            panic!("expected CREATE PROCEDURE");
        };
        assert_eq!(procedure.mode, CreateMode::CreateOrAlter);
        assert_eq!(procedure.parameters.len(), 2);
        assert!(procedure.parameters[1].output);
        assert_eq!(procedure.body.len(), 1);
    }

    #[test]
    fn create_view_and_drop() {
        let tree = parse_script(
            "CREATE VIEW dbo.V WITH SCHEMABINDING AS SELECT a FROM dbo.T;
             DROP TABLE IF EXISTS dbo.T, dbo.U;
             DROP INDEX IX_T ON dbo.T;",
        )
        .expect("parse");
        let statements = &tree.script().batches[0].statements;
        assert_eq!(statements.len(), 3);
        let StatementKind::Drop(drop) = &statements[1].kind else {
            panic!("expected DROP");
        };
        assert_eq!(drop.object_type, "TABLE");
        assert!(drop.if_exists);
        assert_eq!(drop.names.len(), 2);
    }
}
