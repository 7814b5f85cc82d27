//! AST-based Oracle-to-PostgreSQL rewriter: a second pass over the parse
//! tree (`ora2pg-parser`) that reads the type cache the first pass
//! (`ora2pg-typeinfer`) populated and emits PostgreSQL text. Falls back to
//! deterministic textual heuristics on a cache miss rather than failing, so
//! a gap in type inference degrades the output instead of stopping the run.
//!
//! `check_constraint` is a separate, narrower fallback: a handful of
//! regex-driven substitutions applied to raw `CHECK` constraint text that
//! was harvested without being parsed in context.

pub mod check_constraint;
pub mod date;
pub mod render;
pub mod strings;

pub use check_constraint::rewrite_check_expression;
pub use render::{render_select, RenderContext};

/// Raised when a rewrite rule refuses to translate a construct rather than
/// guess at semantics. The AST carries no source spans, so the offending
/// construct is identified by function name and its rendered argument text
/// rather than a byte offset; callers that need to report a location to a
/// user should pair this with whatever span the surrounding statement
/// extraction already tracked.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("{function} called with {found} argument(s), which this translator does not handle")]
    UnsupportedArity { function: String, found: usize },

    #[error("{function} with a non-default start position ({position}) is not supported")]
    UnsupportedRegexPosition { function: String, position: i64 },

    #[error("{function} with occurrence {occurrence} is not supported")]
    UnsupportedRegexOccurrence { function: String, occurrence: i64 },

    #[error("{function} is not supported: {suggestion}")]
    Unsupported { function: String, suggestion: String },
}
