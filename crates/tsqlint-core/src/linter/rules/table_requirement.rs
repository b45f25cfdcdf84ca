//! Shared driver for rules that require every user table to declare some
//! index or constraint somewhere in the script.

use crate::linter::accumulator::{definition_location, DefinitionAccumulator, TableKey};
use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{
    AlterTableAction, ConstraintDefinition, CreateIndexStatement, IndexDefinition, Node,
    StatementKind, SyntaxTree, TableDefinition,
};

/// What satisfies the requirement for one table.
pub(super) trait TableRequirement {
    fn index_satisfies(&self, index: &IndexDefinition) -> bool;

    fn constraint_satisfies(&self, constraint: &ConstraintDefinition) -> bool;

    fn create_index_satisfies(&self, index: &CreateIndexStatement) -> bool;

    /// Checks table- and column-level elements alike.
    fn definition_satisfies(&self, definition: &TableDefinition) -> bool {
        definition
            .indexes
            .iter()
            .any(|index| self.index_satisfies(index))
            || definition
                .constraints
                .iter()
                .any(|constraint| self.constraint_satisfies(constraint))
            || definition.columns.iter().any(|column| {
                column
                    .index
                    .as_ref()
                    .is_some_and(|index| self.index_satisfies(index))
                    || column
                        .constraints
                        .iter()
                        .any(|constraint| self.constraint_satisfies(constraint))
            })
    }
}

struct TableRequirementVisitor<'r, R> {
    requirement: &'r R,
    tables: DefinitionAccumulator,
}

impl<'t, R: TableRequirement> Visitor<'t> for TableRequirementVisitor<'_, R> {
    fn visit(&mut self, node: Node<'t>, _ctx: &mut LintContext<'t, '_>) -> Walk {
        let Node::Statement(statement) = node else {
            return Walk::Continue;
        };

        match &statement.kind {
            StatementKind::CreateTable(create) => {
                if let Some(key) = TableKey::from_object_name(&create.name) {
                    if self.requirement.definition_satisfies(&create.definition) {
                        self.tables.record_satisfaction(key.clone());
                    }
                    self.tables
                        .record_definition(key, definition_location(&create.name));
                }
            }
            StatementKind::AlterTable(alter) => {
                if let AlterTableAction::Add(definition) = &alter.action {
                    if self.requirement.definition_satisfies(definition) {
                        if let Some(key) = TableKey::from_object_name(&alter.name) {
                            self.tables.record_satisfaction(key);
                        }
                    }
                }
            }
            StatementKind::CreateIndex(index) => {
                if self.requirement.create_index_satisfies(index) {
                    if let Some(key) = TableKey::from_object_name(&index.on) {
                        self.tables.record_satisfaction(key);
                    }
                }
            }
            _ => {}
        }

        // Definitions nest inside procedures and control flow.
        Walk::Continue
    }

    fn finish(&mut self, ctx: &mut LintContext<'t, '_>) {
        for location in std::mem::take(&mut self.tables).finalize() {
            ctx.report(location);
        }
    }
}

/// Runs `rule` over `tree`, reporting each user table that never satisfies it.
pub(super) fn check_tables<R>(rule: &R, tree: &SyntaxTree, sink: &mut dyn ViolationSink)
where
    R: TableRequirement + LintRule,
{
    let mut ctx = LintContext::new(tree, rule, sink);
    let mut visitor = TableRequirementVisitor {
        requirement: rule,
        tables: DefinitionAccumulator::new(),
    };
    traverse(&mut visitor, &mut ctx);
}
