//! Cross-statement correlation of table definitions with the constructs that
//! satisfy a rule for them.
//!
//! A `CREATE TABLE` and the index, constraint or extended property that
//! satisfies it may appear in any order anywhere in the script, so rules
//! record both sides while walking and reconcile once at the end.

use crate::syntax::ObjectName;
use crate::types::Location;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Canonical, case-insensitive table identity (`schema.table` or `table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableKey(String);

impl TableKey {
    /// Joins the name's parts with `.`.
    ///
    /// Returns `None` for temporary tables (`#name`) and for names with an
    /// empty part, so neither can enter a key-based map.
    pub fn from_object_name(name: &ObjectName) -> Option<Self> {
        let base = name.base_identifier()?;
        if base.value.starts_with('#') {
            return None;
        }
        Self::from_parts(name.parts.iter().map(|part| part.value.as_str()))
    }

    /// Builds a key from raw parts, trimming surrounding whitespace.
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut canonical = String::new();
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            if !canonical.is_empty() {
                canonical.push('.');
            }
            canonical.push_str(&part.to_lowercase());
        }
        (!canonical.is_empty()).then_some(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a table definition is reported: its base identifier, falling back
/// to the whole name.
pub fn definition_location(name: &ObjectName) -> Location {
    name.base_identifier()
        .map_or(name.span, |ident| ident.span)
        .location()
}

#[derive(Debug, Default)]
pub struct DefinitionAccumulator {
    definitions: IndexMap<TableKey, Vec<Location>>,
    satisfied: HashSet<TableKey>,
}

impl DefinitionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one defining statement for `key`.
    pub fn record_definition(&mut self, key: TableKey, location: Location) {
        self.definitions.entry(key).or_default().push(location);
    }

    pub fn record_satisfaction(&mut self, key: TableKey) {
        self.satisfied.insert(key);
    }

    pub fn is_satisfied(&self, key: &TableKey) -> bool {
        self.satisfied.contains(key)
    }

    /// Every recorded location whose key was never satisfied, in document
    /// order. A table defined twice yields both locations.
    pub fn finalize(self) -> Vec<Location> {
        let mut unsatisfied: Vec<Location> = self
            .definitions
            .iter()
            .filter(|(key, _)| !self.satisfied.contains(*key))
            .flat_map(|(_, locations)| locations.iter().copied())
            .collect();
        unsatisfied.sort();

        #[cfg(feature = "tracing")]
        debug!(
            definitions = self.definitions.len(),
            satisfied = self.satisfied.len(),
            unsatisfied = unsatisfied.len(),
            "Reconciled table definitions"
        );

        unsatisfied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> TableKey {
        TableKey::from_parts(name.split('.')).expect("key")
    }

    #[test]
    fn keys_compare_case_insensitively() {
        assert_eq!(key("dbo.Customer"), key("DBO.customer"));
        assert_ne!(key("dbo.Customer"), key("Customer"));
        assert_eq!(key("dbo.Customer").to_string(), "dbo.customer");
    }

    #[test]
    fn empty_parts_have_no_key() {
        assert_eq!(TableKey::from_parts(["dbo", " "]), None);
        assert_eq!(TableKey::from_parts(std::iter::empty::<&str>()), None);
    }

    #[test]
    fn satisfaction_may_precede_definition() {
        let mut accumulator = DefinitionAccumulator::new();
        accumulator.record_satisfaction(key("dbo.A"));
        accumulator.record_definition(key("dbo.A"), Location::new(5, 14));
        accumulator.record_definition(key("dbo.B"), Location::new(1, 14));
        assert!(accumulator.is_satisfied(&key("DBO.A")));
        assert_eq!(accumulator.finalize(), vec![Location::new(1, 14)]);
    }

    #[test]
    fn every_unsatisfied_definition_is_reported_in_document_order() {
        let mut accumulator = DefinitionAccumulator::new();
        accumulator.record_definition(key("dbo.A"), Location::new(1, 14));
        accumulator.record_definition(key("dbo.B"), Location::new(2, 14));
        accumulator.record_definition(key("dbo.a"), Location::new(3, 14));
        assert_eq!(
            accumulator.finalize(),
            vec![
                Location::new(1, 14),
                Location::new(2, 14),
                Location::new(3, 14)
            ]
        );
    }
}
