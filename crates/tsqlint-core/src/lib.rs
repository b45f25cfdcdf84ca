pub mod error;
pub mod linter;
pub mod parser;
pub mod syntax;
pub mod types;

// Re-export main types and functions
pub use error::{ConfigError, ParseError, Position};
pub use linter::config::LintConfig;
pub use linter::rule::{LintContext, LintRule};
pub use linter::sink::{CallbackSink, NullSink, ViolationSink};
pub use linter::{lint_sql, Linter};
pub use parser::parse_script;
pub use syntax::{Node, NodeKind, SyntaxTree};

// Re-export types explicitly
pub use types::{
    // Rule identifiers
    rule_ids,
    Location,
    Severity,
    Violation,
};
