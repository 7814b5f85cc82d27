use std::collections::HashMap;

use ora2pg_model::{FunctionMetadata, TableMetadata, TypeCategory};

fn fold(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Read-only view over extracted metadata, keyed for the lookups type
/// inference needs: column categories by `(schema, table, column)` and
/// user function return categories by unqualified name. Built fresh per
/// call from borrowed slices — it never outlives the caller's metadata.
pub struct MetadataIndex<'a> {
    tables: HashMap<(String, String), &'a TableMetadata>,
    functions: HashMap<String, &'a FunctionMetadata>,
}

impl<'a> MetadataIndex<'a> {
    pub fn new(tables: &'a [TableMetadata], functions: &'a [FunctionMetadata]) -> Self {
        let mut table_map = HashMap::new();
        for t in tables {
            table_map.insert((fold(&t.name.schema), fold(&t.name.name)), t);
        }
        let mut function_map = HashMap::new();
        for f in functions {
            function_map.insert(fold(&f.name.name), f);
        }
        Self { tables: table_map, functions: function_map }
    }

    pub fn column_category(&self, schema: &str, table: &str, column: &str) -> Option<TypeCategory> {
        let t = self.tables.get(&(fold(schema), fold(table)))?;
        let c = t.columns.iter().find(|c| c.name.eq_ignore_ascii_case(column))?;
        Some(ora2pg_dialect::category_of(&c.base_type))
    }

    pub fn table_exists(&self, schema: &str, table: &str) -> bool {
        self.tables.contains_key(&(fold(schema), fold(table)))
    }

    pub fn function_return_category(&self, name: &str) -> Option<TypeCategory> {
        let f = self.functions.get(&fold(name))?;
        Some(ora2pg_dialect::category_of(&f.return_type))
    }
}
