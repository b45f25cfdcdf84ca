use proptest::prelude::*;
use tsqlint_core::linter::token_range::has_token;
use tsqlint_core::syntax::{Keyword, TokenKind};
use tsqlint_core::{lint_sql, parse_script, rule_ids, LintConfig, Linter};

fn count(sql: &str, rule_id: &str) -> usize {
    lint_sql(sql, &LintConfig::default())
        .expect("generated script should parse")
        .iter()
        .filter(|violation| violation.rule_id == rule_id)
        .count()
}

proptest! {
    #[test]
    fn column_alias_without_as_is_reported_at_the_alias(
        column in "c_[a-z]{1,8}",
        alias in "x_[a-z]{1,8}",
        with_as in any::<bool>(),
    ) {
        let keyword = if with_as { "AS " } else { "" };
        let sql = format!("SELECT {column} {keyword}{alias} FROM t AS s");

        let violations: Vec<_> = lint_sql(&sql, &LintConfig::default())
            .unwrap()
            .into_iter()
            .filter(|violation| violation.rule_id == rule_ids::REQUIRE_AS_FOR_COLUMN_ALIAS)
            .collect();

        if with_as {
            prop_assert!(violations.is_empty());
        } else {
            prop_assert_eq!(violations.len(), 1);
            prop_assert_eq!(violations[0].line, 1);
            prop_assert_eq!(violations[0].column, "SELECT ".len() + column.len() + 2);
        }
    }

    #[test]
    fn plus_chain_reports_once_whatever_its_length(extra in 0usize..12) {
        let mut operands = vec!["'x'".to_string(), "ISNULL(c_0, '')".to_string()];
        operands.extend((1..=extra).map(|index| format!("c_{index}")));
        let sql = format!("SELECT {} AS v FROM t AS s", operands.join(" + "));

        prop_assert_eq!(count(&sql, rule_ids::PREFER_CONCAT_OVER_PLUS), 1);
    }

    #[test]
    fn only_unclustered_tables_are_heaps(clustered in prop::collection::vec(any::<bool>(), 1..8)) {
        let mut sql = String::new();
        for (index, has_index) in clustered.iter().enumerate() {
            sql.push_str(&format!("CREATE TABLE dbo.t_{index} (Id INT NOT NULL);\nGO\n"));
            if *has_index {
                sql.push_str(&format!(
                    "CREATE CLUSTERED INDEX IX_{index} ON dbo.t_{index} (Id);\nGO\n"
                ));
            }
        }
        let heaps = clustered.iter().filter(|has_index| !**has_index).count();

        prop_assert_eq!(count(&sql, rule_ids::AVOID_HEAP_TABLE), heaps);
        prop_assert_eq!(
            count(&sql, rule_ids::REQUIRE_PRIMARY_KEY_OR_UNIQUE_CONSTRAINT),
            clustered.len()
        );
    }

    #[test]
    fn linting_is_deterministic(
        table in "t_[a-z]{1,8}",
        alias in "a_[a-z]{1,8}",
        join_alias in "b_[a-z]{1,8}",
    ) {
        let sql = format!(
            "SELECT {alias}.id, {alias}.n + ISNULL({join_alias}.n, '') + '-' x \
             FROM {table} {alias} JOIN {table} {join_alias} \
             ON CAST({alias}.id AS INT) = {join_alias}.id"
        );
        let tree = parse_script(&sql).unwrap();
        let linter = Linter::default();

        prop_assert_eq!(linter.check_tree(&tree), linter.check_tree(&tree));
    }

    #[test]
    fn token_scans_clamp_any_range(start in 0usize..64, end in 0usize..64) {
        let tree = parse_script("SELECT a AS b FROM t").unwrap();
        let tokens = tree.tokens();
        let found = has_token(tokens, start, end, TokenKind::Keyword(Keyword::As));

        let expected = tokens
            .iter()
            .enumerate()
            .any(|(index, token)| {
                index >= start && index < end && token.kind == TokenKind::Keyword(Keyword::As)
            });
        prop_assert_eq!(found, expected);
    }
}
