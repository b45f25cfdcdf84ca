//! Input-size limits: deep nesting fails cleanly, long chains and long lines
//! do not.
//!
//! Each case runs on a thread with a 2 MiB stack, the default for spawned
//! threads and for the test harness.

mod common;

use common::{run_lint, summarize};
use rstest::rstest;
use std::time::{Duration, Instant};
use tsqlint_core::parser::MAX_NESTING_DEPTH;
use tsqlint_core::syntax::tokenize;
use tsqlint_core::{parse_script, rule_ids, ParseError};

const SMALL_STACK: usize = 2 * 1024 * 1024;

fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(SMALL_STACK)
        .spawn(f)
        .expect("spawn")
        .join()
        .expect("worker thread panicked")
}

fn nest(open: &str, inner: &str, close: &str, depth: usize) -> String {
    format!("{}{inner}{}", open.repeat(depth), close.repeat(depth))
}

#[rstest]
#[case::parentheses(format!("SELECT {}", nest("(", "1", ")", 200)))]
#[case::subqueries(format!("SELECT {}", nest("(SELECT ", "1", ")", 200)))]
#[case::negations(format!("SELECT 1 FROM t AS s WHERE {}1 = 1", "NOT ".repeat(200)))]
#[case::unary_operators(format!("SELECT {}1", "- ".repeat(200)))]
#[case::if_statements(format!("{}SELECT 1;", "IF 1 = 1 ".repeat(200)))]
#[case::blocks(nest("BEGIN ", "SELECT 1; ", "END ", 200))]
fn test_deep_nesting_is_a_parse_error(#[case] sql: String) {
    let err = on_small_stack(move || parse_script(&sql).map(|_| ()));
    assert!(
        matches!(err, Err(ParseError::DepthLimit { limit, .. }) if limit == MAX_NESTING_DEPTH),
        "{err:?}"
    );
}

#[test]
fn test_nesting_below_the_limit_lints() {
    let depth = MAX_NESTING_DEPTH - 8;
    let violations = on_small_stack(move || {
        let sql = format!(
            "SELECT {} AS v FROM t AS s",
            nest("(", "'x' + ISNULL(s.a, '')", ")", depth)
        );
        run_lint(&sql)
    });
    // Reported at the chain itself, inside the parentheses.
    let column = "SELECT ".len() + depth + 1;
    assert_eq!(
        summarize(&violations),
        vec![
            (rule_ids::PREFER_CONCAT_OVER_PLUS.to_string(), 1, column),
            (
                rule_ids::PREFER_CONCAT_OVER_PLUS_WHEN_NULLABLE_OR_CONVERT.to_string(),
                1,
                column
            ),
        ]
    );
}

#[rstest]
#[case::single_line(" + ")]
#[case::one_operand_per_line("\n    + ")]
fn test_long_plus_chain_is_one_chain(#[case] joiner: &'static str) {
    let violations = on_small_stack(move || {
        let mut operands = vec!["'x'", "ISNULL(s.a, '')"];
        operands.extend(std::iter::repeat("s.b").take(100_000));
        let sql = format!("SELECT {} AS v FROM t AS s", operands.join(joiner));
        run_lint(&sql)
    });
    let ids: Vec<&str> = violations
        .iter()
        .map(|violation| violation.rule_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            rule_ids::PREFER_CONCAT_OVER_PLUS,
            rule_ids::PREFER_CONCAT_OVER_PLUS_WHEN_NULLABLE_OR_CONVERT,
        ]
    );
}

#[test]
fn test_long_or_chain_in_a_predicate() {
    let violations = on_small_stack(|| {
        let terms: Vec<String> = (0..50_000).map(|value| format!("s.a = {value}")).collect();
        let sql = format!(
            "SELECT s.a FROM t AS s WHERE {} OR CAST(s.code AS INT) = 1",
            terms.join(" OR ")
        );
        run_lint(&sql)
    });
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].rule_id,
        rule_ids::AVOID_IMPLICIT_CONVERSION_IN_PREDICATE
    );
}

#[test]
fn test_long_chain_tree_drops_on_a_small_stack() {
    let operands = on_small_stack(|| {
        let sql = format!("SELECT {}", vec!["1"; 200_000].join(" * "));
        let tree = parse_script(&sql).expect("parse");
        let operands = tree.tokens().iter().filter(|token| token.text == "1").count();
        drop(tree);
        operands
    });
    assert_eq!(operands, 200_000);
}

#[test]
fn test_long_single_line_tokenizes_in_linear_time() {
    let sql = format!("SELECT {} AS v", vec!["N'abc'"; 100_000].join(" + "));
    let started = Instant::now();
    let tokens = tokenize(&sql).expect("tokenize");
    let elapsed = started.elapsed();

    let mut offset = 0;
    for token in &tokens {
        assert_eq!(token.offset, offset);
        offset = token.end();
    }
    assert_eq!(offset, sql.len());
    assert!(elapsed < Duration::from_secs(30), "took {elapsed:?}");
}
