//! Two-pass type inference over a parsed `SELECT`. The first pass (this
//! crate) walks the AST once and fills a `node_id -> TypeCategory` cache
//! using column metadata, literal forms, operator rules, and a built-in
//! function signature table. The rewriter (`ora2pg-rewrite`) is the second
//! pass: it reads this cache and, on a miss, falls back to its own
//! textual heuristics rather than failing the whole statement.

mod builtins;
mod cache;
mod index;
mod infer;

pub use cache::TypeCache;
pub use index::MetadataIndex;
pub use infer::infer_select;
