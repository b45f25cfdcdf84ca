//! Lint rule implementations and registry.

use super::rule::LintRule;

pub mod avoid_heap_table;
pub mod avoid_implicit_conversion_in_predicate;
pub mod prefer_concat_over_plus;
pub mod prefer_concat_over_plus_when_nullable_or_convert;
pub mod prefer_concat_ws;
pub mod prefer_try_convert_patterns;
pub mod require_as_for_column_alias;
pub mod require_as_for_table_alias;
pub mod require_explicit_join_type;
pub mod require_ms_description_for_table_definition_file;
pub mod require_primary_key_or_unique_constraint;
mod table_requirement;

/// Returns all available lint rules.
pub fn all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(avoid_heap_table::AvoidHeapTable),
        Box::new(require_primary_key_or_unique_constraint::RequirePrimaryKeyOrUniqueConstraint),
        Box::new(
            require_ms_description_for_table_definition_file::RequireMsDescriptionForTableDefinitionFile,
        ),
        Box::new(prefer_concat_ws::PreferConcatWs),
        Box::new(prefer_concat_over_plus::PreferConcatOverPlus),
        Box::new(
            prefer_concat_over_plus_when_nullable_or_convert::PreferConcatOverPlusWhenNullableOrConvert,
        ),
        Box::new(require_as_for_column_alias::RequireAsForColumnAlias),
        Box::new(require_as_for_table_alias::RequireAsForTableAlias),
        Box::new(require_explicit_join_type::RequireExplicitJoinType),
        Box::new(prefer_try_convert_patterns::PreferTryConvertPatterns),
        Box::new(avoid_implicit_conversion_in_predicate::AvoidImplicitConversionInPredicate),
    ]
}
