//! Lint rule trait and the per-run context rules report through.

use super::sink::ViolationSink;
use crate::syntax::{Span, SyntaxTree, Token};
use crate::types::{Location, Severity, Violation};

/// Context for one rule analyzing one tree.
///
/// Created fresh for every [`LintRule::check`] call, so nothing a rule
/// accumulates while walking can leak into the next script.
pub struct LintContext<'t, 's> {
    tree: &'t SyntaxTree,
    rule_id: &'static str,
    message: &'static str,
    severity: Severity,
    sink: &'s mut dyn ViolationSink,
    reported: usize,
}

impl<'t, 's> LintContext<'t, 's> {
    pub fn new(tree: &'t SyntaxTree, rule: &dyn LintRule, sink: &'s mut dyn ViolationSink) -> Self {
        Self {
            tree,
            rule_id: rule.id(),
            message: rule.message(),
            severity: rule.severity(),
            sink,
            reported: 0,
        }
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// The full token stream of the script, trivia included.
    pub fn tokens(&self) -> &'t [Token] {
        self.tree.tokens()
    }

    /// Reports a violation of the current rule at `location`.
    pub fn report(&mut self, location: Location) {
        self.reported += 1;
        self.sink.report(Violation::new(
            self.rule_id,
            self.message,
            location,
            self.severity,
        ));
    }

    /// Reports a violation at the start of `span`.
    pub fn report_at(&mut self, span: &Span) {
        self.report(span.location());
    }

    /// Number of violations reported so far in this run.
    pub fn reported(&self) -> usize {
        self.reported
    }
}

/// A single lint rule that inspects a whole script.
pub trait LintRule: Send + Sync {
    /// Stable kebab-case identifier (e.g., "avoid-heap-table").
    fn id(&self) -> &'static str;

    /// Human-readable explanation attached to every violation.
    fn message(&self) -> &'static str;

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Analyze `tree` once, reporting every violation to `sink`.
    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink);
}
