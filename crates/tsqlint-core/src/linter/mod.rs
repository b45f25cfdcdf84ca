//! T-SQL linter module.
//!
//! Every rule is a stateless [`LintRule`] that walks the whole script once
//! through the shared [`visit`] traversal and reports to a
//! [`sink::ViolationSink`]. Rules whose verdict depends on more than one
//! statement keep their per-run state in a visitor created inside
//! [`LintRule::check`], so the same rule instance can check many scripts,
//! concurrently or not.
//!
//! The four analysis primitives rules are assembled from live next to the
//! rules: [`accumulator`] (cross-statement definitions), [`chain`] (n-ary
//! operator chains), [`token_range`] (optional keywords between nodes) and
//! [`guard`] (guard-to-use correlation).

pub mod accumulator;
pub mod chain;
pub mod config;
pub mod guard;
pub mod rule;
pub mod rules;
pub mod sink;
pub mod token_range;
pub mod visit;

use config::LintConfig;
use rule::LintRule;
use sink::ViolationSink;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::{error::ParseError, parser::parse_script, syntax::SyntaxTree, types::Violation};

/// The T-SQL linter, holding a set of rules and configuration.
pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
    config: LintConfig,
}

impl Linter {
    /// Creates a new linter with the given configuration.
    pub fn new(config: LintConfig) -> Self {
        Self {
            rules: rules::all_rules(),
            config,
        }
    }

    /// Returns true if linting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Rules this linter runs, enabled or not.
    pub fn rules(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Runs every enabled rule over `tree`, reporting into `sink` in rule
    /// order.
    pub fn check_tree_into(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        if !self.config.enabled {
            return;
        }

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.id()) {
                continue;
            }
            rule.check(tree, sink);

            #[cfg(feature = "tracing")]
            debug!(rule = rule.id(), "Rule finished");
        }
    }

    /// Runs every enabled rule over `tree` and returns the violations
    /// ordered by location, then rule order.
    pub fn check_tree(&self, tree: &SyntaxTree) -> Vec<Violation> {
        let mut violations: Vec<Violation> = Vec::new();
        self.check_tree_into(tree, &mut violations);

        // Stable: ties keep rule order.
        violations.sort_by_key(Violation::location);

        #[cfg(feature = "tracing")]
        debug!(violations = violations.len(), "Lint finished");
        violations
    }

    /// Parses `sql` and lints the result.
    pub fn check_sql(&self, sql: &str) -> Result<Vec<Violation>, ParseError> {
        let tree = parse_script(sql)?;
        Ok(self.check_tree(&tree))
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}

/// Parses and lints `sql` with `config` in one call.
pub fn lint_sql(sql: &str, config: &LintConfig) -> Result<Vec<Violation>, ParseError> {
    Linter::new(config.clone()).check_sql(sql)
}
