//! require-ms-description-for-table-definition-file: Tables without an
//! `MS_Description` extended property.
//!
//! A table is described by an `EXEC sp_addextendedproperty` (or
//! `sp_updateextendedproperty`) call anywhere in the script that names
//! `MS_Description` at level `SCHEMA`/`TABLE`. Arguments may be passed by name
//! or by position; only literal argument values count.

use crate::linter::accumulator::{definition_location, DefinitionAccumulator, TableKey};
use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{ExecuteParameter, ExecuteTarget, Expr, ExprKind, Node, StatementKind, SyntaxTree};
use crate::types::rule_ids;
use std::collections::HashMap;

const EXTENDED_PROPERTY_PROCEDURES: &[&str] =
    &["sp_addextendedproperty", "sp_updateextendedproperty"];

const DESCRIPTION_PROPERTY: &str = "MS_Description";

pub struct RequireMsDescriptionForTableDefinitionFile;

impl LintRule for RequireMsDescriptionForTableDefinitionFile {
    fn id(&self) -> &'static str {
        rule_ids::REQUIRE_MS_DESCRIPTION_FOR_TABLE_DEFINITION_FILE
    }

    fn message(&self) -> &'static str {
        "Table definition files must include an MS_Description extended property for the table."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        traverse(&mut DescriptionVisitor::default(), &mut ctx);
    }
}

#[derive(Default)]
struct DescriptionVisitor {
    tables: DefinitionAccumulator,
}

impl<'t> Visitor<'t> for DescriptionVisitor {
    fn visit(&mut self, node: Node<'t>, _ctx: &mut LintContext<'t, '_>) -> Walk {
        let Node::Statement(statement) = node else {
            return Walk::Continue;
        };

        match &statement.kind {
            StatementKind::CreateTable(create) => {
                if let Some(key) = TableKey::from_object_name(&create.name) {
                    self.tables
                        .record_definition(key, definition_location(&create.name));
                }
            }
            StatementKind::Execute(execute) => {
                if let ExecuteTarget::Procedure { name, parameters } = &execute.target {
                    let is_property_call = EXTENDED_PROPERTY_PROCEDURES
                        .iter()
                        .any(|procedure| procedure.eq_ignore_ascii_case(name.simple_name().trim()));
                    if is_property_call {
                        if let Some(key) = described_table(parameters) {
                            self.tables.record_satisfaction(key);
                        }
                    }
                }
            }
            _ => {}
        }

        Walk::Continue
    }

    fn finish(&mut self, ctx: &mut LintContext<'t, '_>) {
        for location in std::mem::take(&mut self.tables).finalize() {
            ctx.report(location);
        }
    }
}

/// Trimmed text of a literal argument; `None` for blanks and non-literals.
fn literal_text(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Literal(literal) => Some(literal.value.trim()).filter(|value| !value.is_empty()),
        _ => None,
    }
}

fn is(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|value| value.eq_ignore_ascii_case(expected))
}

/// The table an extended-property call describes, if it sets
/// `MS_Description` on a `SCHEMA`/`TABLE` pair.
fn described_table(parameters: &[ExecuteParameter]) -> Option<TableKey> {
    let mut named: HashMap<String, Option<&str>> = HashMap::new();
    let mut positional: Vec<Option<&str>> = Vec::new();
    for parameter in parameters {
        let value = literal_text(&parameter.value);
        match &parameter.name {
            Some(name) => {
                let key = format!("@{}", name.value.trim_start_matches('@')).to_lowercase();
                named.insert(key, value);
            }
            None => positional.push(value),
        }
    }
    let named_value = |key: &str| named.get(key).copied().flatten();

    // Once `@name` is given, positional arguments are not consulted.
    let (property, level0_type, schema, level1_type, table) = if named_value("@name").is_some() {
        (
            named_value("@name"),
            named_value("@level0type"),
            named_value("@level0name"),
            named_value("@level1type"),
            named_value("@level1name"),
        )
    } else {
        if positional.len() < 6 {
            return None;
        }
        (
            positional[0],
            positional[2],
            positional[3],
            positional[4],
            positional[5],
        )
    };

    if !is(property, DESCRIPTION_PROPERTY)
        || !is(level0_type, "SCHEMA")
        || !is(level1_type, "TABLE")
    {
        return None;
    }
    TableKey::from_parts([schema?, table?])
}
