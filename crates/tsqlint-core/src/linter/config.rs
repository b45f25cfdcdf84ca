//! Configuration for the T-SQL linter.

use crate::error::ConfigError;
use crate::types::rule_ids;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Every rule id the linter knows, in run order.
pub const ALL_RULE_IDS: &[&str] = &[
    rule_ids::AVOID_HEAP_TABLE,
    rule_ids::REQUIRE_PRIMARY_KEY_OR_UNIQUE_CONSTRAINT,
    rule_ids::REQUIRE_MS_DESCRIPTION_FOR_TABLE_DEFINITION_FILE,
    rule_ids::PREFER_CONCAT_WS,
    rule_ids::PREFER_CONCAT_OVER_PLUS,
    rule_ids::PREFER_CONCAT_OVER_PLUS_WHEN_NULLABLE_OR_CONVERT,
    rule_ids::REQUIRE_AS_FOR_COLUMN_ALIAS,
    rule_ids::REQUIRE_AS_FOR_TABLE_ALIAS,
    rule_ids::REQUIRE_EXPLICIT_JOIN_TYPE,
    rule_ids::PREFER_TRY_CONVERT_PATTERNS,
    rule_ids::AVOID_IMPLICIT_CONVERSION_IN_PREDICATE,
];

/// Configuration for the T-SQL linter.
///
/// Controls which lint rules are enabled/disabled. By default, all rules are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    /// Master toggle for linting (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// List of rule ids to disable (e.g., ["avoid-heap-table"]).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rules: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_rules: Vec::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl LintConfig {
    /// Parses a JSON configuration, rejecting unknown rule ids.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if let Some(unknown) = config
            .disabled_rules
            .iter()
            .find(|id| !ALL_RULE_IDS.contains(&id.as_str()))
        {
            return Err(ConfigError::UnknownRule(unknown.clone()));
        }
        Ok(config)
    }

    /// Returns true if a specific rule is enabled.
    pub fn is_rule_enabled(&self, id: &str) -> bool {
        self.enabled && !self.disabled_rules.iter().any(|r| r == id)
    }
}
