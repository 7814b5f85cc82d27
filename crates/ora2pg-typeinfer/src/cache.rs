use std::collections::HashMap;

use ora2pg_model::TypeCategory;
use ora2pg_parser::NodeId;

/// `node_id -> TypeCategory`, populated by `infer_select` and read by the
/// rewriter. A node with no entry (rather than an explicit `Unknown` entry)
/// means inference never visited it; callers should treat both the same
/// way, but a miss is worth a debug log since it usually means the AST grew
/// a node kind this crate doesn't visit yet.
#[derive(Debug, Default)]
pub struct TypeCache {
    entries: HashMap<NodeId, TypeCategory>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, category: TypeCategory) {
        self.entries.insert(id, category);
    }

    pub fn get(&self, id: NodeId) -> Option<&TypeCategory> {
        self.entries.get(&id)
    }

    pub fn get_or_unknown(&self, id: NodeId) -> TypeCategory {
        self.entries.get(&id).cloned().unwrap_or(TypeCategory::Unknown)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
