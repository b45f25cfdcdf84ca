//! Integration tests for the T-SQL linter.
//!
//! These tests run whole scripts through `lint_sql` / `Linter` with the full
//! rule set and check what a host would receive.

mod common;

use common::{run_lint, run_rule, summarize};
use rstest::rstest;
use tsqlint_core::{
    parse_script, rule_ids, CallbackSink, LintConfig, Linter, Location, NullSink, Severity,
    Violation, ViolationSink,
};

const DOCUMENTED_TABLE: &str = "CREATE TABLE dbo.Customer
(
    Id INT NOT NULL CONSTRAINT PK_Customer PRIMARY KEY CLUSTERED,
    Name NVARCHAR(100) NOT NULL
);
GO
EXEC sys.sp_addextendedproperty
    @name = N'MS_Description', @value = N'Customers',
    @level0type = N'SCHEMA', @level0name = N'dbo',
    @level1type = N'TABLE', @level1name = N'Customer';
GO
";

const MIXED_SCRIPT: &str = "CREATE TABLE dbo.Audit (Id INT, Note NVARCHAR(200));
GO
SELECT a.Id, 'Note: ' + ISNULL(a.Note, '') note
FROM dbo.Audit a
JOIN dbo.Customer AS c ON CAST(c.Id AS VARCHAR(10)) = a.Note;
";

fn expected(rows: &[(&str, usize, usize)]) -> Vec<(String, usize, usize)> {
    rows.iter()
        .map(|(id, line, column)| (id.to_string(), *line, *column))
        .collect()
}

#[test]
fn test_documented_table_file_is_clean() {
    assert!(run_lint(DOCUMENTED_TABLE).is_empty());
}

#[test]
fn test_mixed_script_reports_in_document_order() {
    let violations = run_lint(MIXED_SCRIPT);
    assert_eq!(
        summarize(&violations),
        expected(&[
            (rule_ids::AVOID_HEAP_TABLE, 1, 18),
            (rule_ids::REQUIRE_PRIMARY_KEY_OR_UNIQUE_CONSTRAINT, 1, 18),
            (rule_ids::REQUIRE_MS_DESCRIPTION_FOR_TABLE_DEFINITION_FILE, 1, 18),
            (rule_ids::PREFER_CONCAT_OVER_PLUS, 3, 14),
            (rule_ids::PREFER_CONCAT_OVER_PLUS_WHEN_NULLABLE_OR_CONVERT, 3, 14),
            (rule_ids::REQUIRE_AS_FOR_COLUMN_ALIAS, 3, 44),
            (rule_ids::REQUIRE_AS_FOR_TABLE_ALIAS, 4, 16),
            (rule_ids::REQUIRE_EXPLICIT_JOIN_TYPE, 5, 1),
            (rule_ids::AVOID_IMPLICIT_CONVERSION_IN_PREDICATE, 5, 27),
        ])
    );
    assert_eq!(violations[1].severity, Severity::Error);
    assert!(violations
        .iter()
        .filter(|violation| {
            violation.rule_id != rule_ids::REQUIRE_PRIMARY_KEY_OR_UNIQUE_CONSTRAINT
        })
        .all(|violation| violation.severity == Severity::Warning));
}

#[test]
fn test_json_config_disables_rules() {
    let config = LintConfig::from_json(
        r#"{
            "disabledRules": [
                "avoid-heap-table",
                "require-primary-key-or-unique-constraint",
                "require-ms-description-for-table-definition-file"
            ]
        }"#,
    )
    .unwrap();
    let violations = Linter::new(config).check_sql(MIXED_SCRIPT).unwrap();
    assert_eq!(violations.len(), 6);
    assert_eq!(violations[0].rule_id, rule_ids::PREFER_CONCAT_OVER_PLUS);
}

#[test]
fn test_repeated_runs_are_independent() {
    let linter = Linter::default();
    let tree = parse_script(MIXED_SCRIPT).unwrap();
    let first = linter.check_tree(&tree);
    let second = linter.check_tree(&tree);
    assert_eq!(first, second);

    // State from one script never satisfies a table in another.
    let clustered = linter
        .check_sql("CREATE CLUSTERED INDEX IX ON dbo.Audit (Id);")
        .unwrap();
    assert!(clustered.is_empty());
    assert_eq!(run_rule(MIXED_SCRIPT, rule_ids::AVOID_HEAP_TABLE).len(), 1);
}

#[test]
fn test_one_tree_can_be_linted_from_many_threads() {
    let linter = Linter::default();
    let tree = parse_script(MIXED_SCRIPT).unwrap();
    let expected = linter.check_tree(&tree);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| linter.check_tree(&tree)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_rules_stream_to_a_callback_sink() {
    let tree = parse_script(MIXED_SCRIPT).unwrap();
    let mut ids = Vec::new();
    {
        let mut sink = CallbackSink::new(|id: &str, message: &str, _line, _column| {
            assert!(!message.is_empty());
            ids.push(id.to_string());
        });
        for rule in Linter::default().rules() {
            rule.check(&tree, &mut sink);
        }
    }
    assert_eq!(ids.len(), 9);
    assert_eq!(ids[0], rule_ids::AVOID_HEAP_TABLE);
}

#[test]
fn test_rules_can_be_introspected_without_running() {
    let linter = Linter::default();
    let tree = parse_script("SELECT 1").unwrap();
    let mut sink = NullSink;
    for rule in linter.rules() {
        assert!(!rule.id().is_empty());
        assert!(rule.message().ends_with('.'));
        rule.check(&tree, &mut sink);
        sink.report(Violation::new(
            rule.id(),
            rule.message(),
            Location::new(1, 1),
            rule.severity(),
        ));
    }
}

#[rstest]
#[case::heap_then_index(
    "CREATE TABLE dbo.T (Id INT UNIQUE);\nGO\nCREATE CLUSTERED INDEX IX_T ON dbo.T (Id);",
    rule_ids::AVOID_HEAP_TABLE,
    0
)]
#[case::heap_other_schema(
    "CREATE TABLE dbo.T (Id INT UNIQUE);\nGO\nCREATE CLUSTERED INDEX IX_T ON etl.T (Id);",
    rule_ids::AVOID_HEAP_TABLE,
    1
)]
#[case::concat_ws_only(
    "SELECT a + ', ' + ISNULL(b, '') + ', ' + c FROM t AS x",
    rule_ids::PREFER_CONCAT_OVER_PLUS,
    0
)]
#[case::concat_ws_reported(
    "SELECT a + ', ' + ISNULL(b, '') + ', ' + c FROM t AS x",
    rule_ids::PREFER_CONCAT_WS,
    1
)]
#[case::try_convert_in_procedure(
    "CREATE PROCEDURE dbo.P @v NVARCHAR(20) AS
BEGIN
    SELECT CASE WHEN ISNUMERIC(@v) = 1 THEN CAST(@v AS INT) END AS n;
END",
    rule_ids::PREFER_TRY_CONVERT_PATTERNS,
    1
)]
#[case::conversion_under_if_exists(
    "IF EXISTS (SELECT 1 FROM t AS x WHERE CAST(x.code AS INT) = 1) PRINT 'one';",
    rule_ids::AVOID_IMPLICIT_CONVERSION_IN_PREDICATE,
    1
)]
#[case::table_after_skipped_statements(
    "MERGE dbo.T AS t USING dbo.S AS s ON t.Id = s.Id WHEN MATCHED THEN DELETE;
WAITFOR DELAY '00:00:01';
THROW 50000, N'stop', 1;
CREATE TABLE dbo.U (Id INT);",
    rule_ids::AVOID_HEAP_TABLE,
    1
)]
fn test_rule_counts(#[case] sql: &str, #[case] rule_id: &str, #[case] count: usize) {
    assert_eq!(run_rule(sql, rule_id).len(), count);
}
