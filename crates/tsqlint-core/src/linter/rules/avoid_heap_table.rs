//! avoid-heap-table: User tables without a clustered index.
//!
//! A table is satisfied by a clustered primary key or unique constraint, a
//! clustered (or clustered columnstore) inline index, or a separately issued
//! `CREATE CLUSTERED INDEX` / `ALTER TABLE ... ADD` anywhere in the script.
//! A `PRIMARY KEY` without `CLUSTERED`/`NONCLUSTERED` counts as clustered.

use super::table_requirement::{check_tables, TableRequirement};
use crate::linter::rule::LintRule;
use crate::linter::sink::ViolationSink;
use crate::syntax::{
    ConstraintDefinition, ConstraintKind, CreateIndexStatement, IndexDefinition, IndexType,
    SyntaxTree,
};
use crate::types::rule_ids;

pub struct AvoidHeapTable;

impl LintRule for AvoidHeapTable {
    fn id(&self) -> &'static str {
        rule_ids::AVOID_HEAP_TABLE
    }

    fn message(&self) -> &'static str {
        "Avoid heap tables by defining a clustered index (or clustered primary key)."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        check_tables(self, tree, sink);
    }
}

impl TableRequirement for AvoidHeapTable {
    fn index_satisfies(&self, index: &IndexDefinition) -> bool {
        index.index_type.is_some_and(IndexType::is_clustered)
    }

    fn constraint_satisfies(&self, constraint: &ConstraintDefinition) -> bool {
        match &constraint.kind {
            ConstraintKind::Unique(unique) => unique.clustered.unwrap_or(unique.primary_key),
            _ => false,
        }
    }

    fn create_index_satisfies(&self, index: &CreateIndexStatement) -> bool {
        index.index_type().is_some_and(IndexType::is_clustered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use crate::types::{Location, Severity, Violation};
    use rstest::rstest;

    fn run(sql: &str) -> Vec<Violation> {
        let tree = parse_script(sql).expect("parse");
        let mut violations = Vec::new();
        AvoidHeapTable.check(&tree, &mut violations);
        violations
    }

    #[test]
    fn test_heap_table_is_reported_at_base_identifier() {
        let violations = run("CREATE TABLE dbo.Customer (Id INT, Name NVARCHAR(100));");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "avoid-heap-table");
        assert_eq!(violations[0].location(), Location::new(1, 18));
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn test_later_clustered_index_satisfies() {
        let violations = run("CREATE TABLE dbo.Customer (Id INT, Name NVARCHAR(100));
             CREATE CLUSTERED INDEX IX_Customer ON dbo.Customer (Id);");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_earlier_clustered_index_satisfies() {
        let violations = run("CREATE CLUSTERED INDEX IX_Customer ON DBO.CUSTOMER (Id);
             GO
             CREATE TABLE dbo.Customer (Id INT);");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_clustered_primary_key_forms() {
        assert!(run("CREATE TABLE dbo.T (Id INT PRIMARY KEY);").is_empty());
        assert!(run("CREATE TABLE dbo.T (Id INT, CONSTRAINT PK_T PRIMARY KEY (Id));").is_empty());
        assert!(run("CREATE TABLE dbo.T (Id INT UNIQUE CLUSTERED);").is_empty());
        assert!(run("CREATE TABLE dbo.T (Id INT INDEX IX_T CLUSTERED);").is_empty());
        assert!(run("CREATE TABLE dbo.T (Id INT, INDEX CCI_T CLUSTERED COLUMNSTORE);").is_empty());
        assert!(
            run("CREATE TABLE dbo.T (Id INT, CONSTRAINT UQ_T UNIQUE CLUSTERED COLUMNSTORE);")
                .is_empty()
        );
    }

    #[rstest]
    #[case::column_primary_key(
        "CREATE TABLE dbo.T (Id INT PRIMARY KEY NONCLUSTERED, Code INT UNIQUE);"
    )]
    #[case::table_primary_key(
        "CREATE TABLE dbo.T (Id INT NOT NULL, CONSTRAINT PK_T PRIMARY KEY NONCLUSTERED (Id));"
    )]
    #[case::table_unique("CREATE TABLE dbo.T (Id INT NOT NULL, CONSTRAINT UQ_T UNIQUE (Id));")]
    #[case::altered_primary_key(
        "CREATE TABLE dbo.T (Id INT NOT NULL);
         ALTER TABLE dbo.T ADD CONSTRAINT PK_T PRIMARY KEY NONCLUSTERED (Id);"
    )]
    #[case::separate_index(
        "CREATE TABLE dbo.T (Id INT);
         CREATE NONCLUSTERED INDEX IX_T ON dbo.T (Id);"
    )]
    fn test_nonclustered_elements_do_not_satisfy(#[case] sql: &str) {
        assert_eq!(run(sql).len(), 1);
    }

    #[test]
    fn test_alter_table_add_satisfies() {
        let violations = run("CREATE TABLE dbo.T (Id INT NOT NULL);
             ALTER TABLE dbo.T ADD CONSTRAINT PK_T PRIMARY KEY CLUSTERED (Id);");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_temp_tables_are_ignored() {
        assert!(run("CREATE TABLE #Work (Id INT);").is_empty());
    }

    #[test]
    fn test_each_definition_of_a_heap_is_reported() {
        let violations = run("CREATE TABLE dbo.T (Id INT);
GO
CREATE TABLE dbo.T (Id INT);");
        assert_eq!(
            violations
                .iter()
                .map(Violation::location)
                .collect::<Vec<_>>(),
            vec![Location::new(1, 18), Location::new(3, 18)]
        );
    }

    #[test]
    fn test_definitions_inside_procedures_are_seen() {
        let violations = run("CREATE PROCEDURE dbo.Setup AS
BEGIN
    CREATE TABLE dbo.Audit (Id INT);
END");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location(), Location::new(3, 22));
    }
}
