//! require-primary-key-or-unique-constraint: User tables without a row
//! identity.
//!
//! Any `PRIMARY KEY` or `UNIQUE` constraint, a unique inline index, or a
//! later `CREATE UNIQUE INDEX` / `ALTER TABLE ... ADD` satisfies the table.

use super::table_requirement::{check_tables, TableRequirement};
use crate::linter::rule::LintRule;
use crate::linter::sink::ViolationSink;
use crate::syntax::{
    ConstraintDefinition, ConstraintKind, CreateIndexStatement, IndexDefinition, SyntaxTree,
};
use crate::types::{rule_ids, Severity};

pub struct RequirePrimaryKeyOrUniqueConstraint;

impl LintRule for RequirePrimaryKeyOrUniqueConstraint {
    fn id(&self) -> &'static str {
        rule_ids::REQUIRE_PRIMARY_KEY_OR_UNIQUE_CONSTRAINT
    }

    fn message(&self) -> &'static str {
        "User tables must define a PRIMARY KEY or UNIQUE constraint to ensure row uniqueness."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        check_tables(self, tree, sink);
    }
}

impl TableRequirement for RequirePrimaryKeyOrUniqueConstraint {
    fn index_satisfies(&self, index: &IndexDefinition) -> bool {
        index.unique
    }

    fn constraint_satisfies(&self, constraint: &ConstraintDefinition) -> bool {
        matches!(constraint.kind, ConstraintKind::Unique(_))
    }

    fn create_index_satisfies(&self, index: &CreateIndexStatement) -> bool {
        index.unique
    }
}
