#![allow(dead_code)]

use tsqlint_core::{lint_sql, LintConfig, Violation};

/// Lints `sql` with every rule enabled.
pub fn run_lint(sql: &str) -> Vec<Violation> {
    lint_sql(sql, &LintConfig::default()).expect("script should parse")
}

/// Violations of `rule_id` alone, with every rule running.
pub fn run_rule(sql: &str, rule_id: &str) -> Vec<Violation> {
    run_lint(sql)
        .into_iter()
        .filter(|violation| violation.rule_id == rule_id)
        .collect()
}

/// `(rule_id, line, column)` triples for compact assertions.
pub fn summarize(violations: &[Violation]) -> Vec<(String, usize, usize)> {
    violations
        .iter()
        .map(|violation| (violation.rule_id.clone(), violation.line, violation.column))
        .collect()
}
