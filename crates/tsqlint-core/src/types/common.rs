//! Common types shared between rules, the linter and hosts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single finding reported by a lint rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Stable kebab-case rule identifier (e.g. `avoid-heap-table`)
    pub rule_id: String,

    /// Human-readable explanation of the violated rule
    pub message: String,

    /// 1-based line of the offending construct
    pub line: usize,

    /// 1-based column of the offending construct
    pub column: usize,

    /// Severity level
    pub severity: Severity,
}

impl Violation {
    pub fn new(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        location: Location,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
            line: location.line,
            column: location.column,
            severity,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A 1-based line/column position in the source script.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Machine-readable rule identifiers.
pub mod rule_ids {
    // Cross-statement definition checks
    pub const AVOID_HEAP_TABLE: &str = "avoid-heap-table";
    pub const REQUIRE_PRIMARY_KEY_OR_UNIQUE_CONSTRAINT: &str =
        "require-primary-key-or-unique-constraint";
    pub const REQUIRE_MS_DESCRIPTION_FOR_TABLE_DEFINITION_FILE: &str =
        "require-ms-description-for-table-definition-file";

    // String building
    pub const PREFER_CONCAT_WS: &str = "prefer-concat-ws";
    pub const PREFER_CONCAT_OVER_PLUS: &str = "prefer-concat-over-plus";
    pub const PREFER_CONCAT_OVER_PLUS_WHEN_NULLABLE_OR_CONVERT: &str =
        "prefer-concat-over-plus-when-nullable-or-convert";

    // Lexical style
    pub const REQUIRE_AS_FOR_COLUMN_ALIAS: &str = "require-as-for-column-alias";
    pub const REQUIRE_AS_FOR_TABLE_ALIAS: &str = "require-as-for-table-alias";
    pub const REQUIRE_EXPLICIT_JOIN_TYPE: &str = "require-explicit-join-type";

    // Conversions
    pub const PREFER_TRY_CONVERT_PATTERNS: &str = "prefer-try-convert-patterns";
    pub const AVOID_IMPLICIT_CONVERSION_IN_PREDICATE: &str =
        "avoid-implicit-conversion-in-predicate";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_serializes_in_camel_case() {
        let violation = Violation::new(
            rule_ids::AVOID_HEAP_TABLE,
            "Avoid heap tables.",
            Location::new(3, 14),
            Severity::Warning,
        );

        let json = serde_json::to_value(&violation).expect("serialize");
        assert_eq!(json["ruleId"], "avoid-heap-table");
        assert_eq!(json["line"], 3);
        assert_eq!(json["column"], 14);
        assert_eq!(json["severity"], "warning");
    }

    #[test]
    fn locations_order_by_line_then_column() {
        assert!(Location::new(1, 20) < Location::new(2, 1));
        assert!(Location::new(2, 1) < Location::new(2, 5));
    }
}
