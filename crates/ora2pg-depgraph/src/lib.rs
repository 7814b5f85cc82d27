//! Orders constraints so DDL can be emitted in a single deterministic pass
//! — PK, then UNIQUE, then FK in
//! topological (referenced-before-referencing) order with self-references
//! last, then CHECK.
//!
//! # Prior Art
//!
//! Topological ordering uses Kahn's algorithm:
//! - Kahn, A.B. (1962). "Topological sorting of large networks."
//!   Communications of the ACM, 5(11), 558-562.
//!
//! Cycles (mutual FKs) are rare but not impossible; when Kahn's queue runs
//! dry with nodes still unordered, the remainder is appended in
//! lexicographic `schema.table` order so output stays deterministic even
//! though it is no longer a true topological order for that subset.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexSet;
use ora2pg_model::{ConstraintKind, ConstraintMetadata, QualifiedName};

/// Constraints in emission order, plus any warnings raised (currently only
/// "cycle detected").
pub struct Ordering {
    pub constraints: Vec<ConstraintMetadata>,
    pub warnings: Vec<String>,
}

/// Orders `constraints` into emission order. NOT NULL constraints are filtered
/// out — they are applied at column-creation time, never here.
pub fn order_constraints(constraints: &[ConstraintMetadata]) -> Ordering {
    let mut warnings = Vec::new();
    let mut out = Vec::with_capacity(constraints.len());

    // Step 1: PKs in insertion order.
    out.extend(constraints.iter().filter(|c| matches!(c.kind, ConstraintKind::PrimaryKey)).cloned());

    // Step 2: UNIQUE constraints in insertion order.
    out.extend(constraints.iter().filter(|c| matches!(c.kind, ConstraintKind::Unique)).cloned());

    // Step 3: FKs, self-referencing split out and appended last.
    let fks: Vec<&ConstraintMetadata> = constraints.iter().filter(|c| c.is_foreign_key()).collect();
    let (self_refs, cross_refs): (Vec<&ConstraintMetadata>, Vec<&ConstraintMetadata>) =
        fks.into_iter().partition(|c| c.is_self_referencing());

    let table_order = topological_table_order(&cross_refs, &mut warnings);
    for table in &table_order {
        out.extend(
            cross_refs
                .iter()
                .filter(|c| &c.table == table)
                .map(|c| (*c).clone()),
        );
    }
    out.extend(self_refs.into_iter().cloned());

    // Step 4: CHECK constraints last.
    out.extend(constraints.iter().filter(|c| matches!(c.kind, ConstraintKind::Check { .. })).cloned());

    Ordering { constraints: out, warnings }
}

/// Computes a table emission order such that for every FK `(source,
/// target)` in `cross_ref_fks`, `target` precedes `source`.
fn topological_table_order(
    cross_ref_fks: &[&ConstraintMetadata],
    warnings: &mut Vec<String>,
) -> Vec<QualifiedName> {
    // Preserve first-seen order for deterministic iteration before any
    // lexicographic tie-break is needed.
    let mut all_tables: IndexSet<QualifiedName> = IndexSet::new();
    for fk in cross_ref_fks {
        all_tables.insert(fk.table.clone());
        if let Some(target) = fk.fk_target() {
            all_tables.insert(target.clone());
        }
    }

    // edge target -> source ("target must precede source")
    let mut out_edges: HashMap<QualifiedName, Vec<QualifiedName>> = HashMap::new();
    let mut in_degree: HashMap<QualifiedName, usize> = all_tables.iter().map(|t| (t.clone(), 0)).collect();
    for fk in cross_ref_fks {
        if let Some(target) = fk.fk_target() {
            out_edges.entry(target.clone()).or_default().push(fk.table.clone());
            *in_degree.get_mut(&fk.table).unwrap() += 1;
        }
    }

    // A `BTreeSet` keeps the ready set in lexicographic order as nodes join
    // and leave it, so each pop is the next tie-break winner without
    // re-sorting the whole queue.
    let mut queue: BTreeSet<QualifiedName> =
        in_degree.iter().filter(|(_, &deg)| deg == 0).map(|(t, _)| t.clone()).collect();

    let mut order = Vec::with_capacity(all_tables.len());
    let mut emitted: HashSet<QualifiedName> = HashSet::with_capacity(all_tables.len());
    let mut remaining_in_degree = in_degree.clone();

    while let Some(table) = queue.pop_first() {
        order.push(table.clone());
        emitted.insert(table.clone());
        if let Some(dependents) = out_edges.get(&table) {
            for dep in dependents {
                let deg = remaining_in_degree.get_mut(dep).unwrap();
                *deg -= 1;
                if *deg == 0 {
                    queue.insert(dep.clone());
                }
            }
        }
    }

    if order.len() < all_tables.len() {
        let mut remaining_sorted: Vec<QualifiedName> =
            all_tables.iter().filter(|t| !emitted.contains(*t)).cloned().collect();
        remaining_sorted.sort();
        warnings.push(format!(
            "cycle detected among foreign keys on tables: {}",
            remaining_sorted.iter().map(|t| t.display()).collect::<Vec<_>>().join(", ")
        ));
        tracing::warn!(target: "ora2pg_depgraph", tables = ?remaining_sorted, "FK cycle detected; appending remaining tables in lexicographic order");
        order.extend(remaining_sorted);
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_model::{ConstraintMetadata, DeleteRule};

    fn t(n: &str) -> QualifiedName {
        QualifiedName::new("s", n)
    }

    fn pk(table: &str) -> ConstraintMetadata {
        ConstraintMetadata::new(format!("pk_{table}"), t(table), vec!["id".into()], ConstraintKind::PrimaryKey).unwrap()
    }

    fn fk(name: &str, table: &str, column: &str, target: &str) -> ConstraintMetadata {
        ConstraintMetadata::new(
            name,
            t(table),
            vec![column.into()],
            ConstraintKind::ForeignKey {
                referenced_table: t(target),
                referenced_columns: vec!["id".into()],
                delete_rule: DeleteRule::NoAction,
            },
        )
        .unwrap()
    }

    fn check(table: &str, expr: &str) -> ConstraintMetadata {
        ConstraintMetadata::new(format!("chk_{table}"), t(table), vec!["x".into()], ConstraintKind::Check { expression: expr.into() })
            .unwrap()
    }

    /// A(id PK), B(a_id FK->A), C(b_id FK->B, a_id FK->A), C(parent_id
    /// FK->C self) -> PK_A, PK_B, PK_C, FK B->A, FK C->B, FK C->A, FK C->C.
    #[test]
    fn self_and_cross_table_fk_chain_orders_correctly() {
        let constraints = vec![
            pk("a"),
            pk("b"),
            pk("c"),
            fk("fk_b_a", "b", "a_id", "a"),
            fk("fk_c_b", "c", "b_id", "b"),
            fk("fk_c_a", "c", "a_id", "a"),
            fk("fk_c_parent", "c", "parent_id", "c"),
        ];
        let ordering = order_constraints(&constraints);
        let names: Vec<&str> = ordering.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["pk_a", "pk_b", "pk_c", "fk_b_a", "fk_c_b", "fk_c_a", "fk_c_parent"]
        );
        assert!(ordering.warnings.is_empty());
    }

    #[test]
    fn checks_emitted_last() {
        let constraints = vec![check("a", "x > 0"), pk("a"), fk("fk_b_a", "b", "a_id", "a"), pk("b")];
        let ordering = order_constraints(&constraints);
        assert!(matches!(ordering.constraints.last().unwrap().kind, ConstraintKind::Check { .. }));
    }

    #[test]
    fn mutual_fk_cycle_warns_and_is_deterministic() {
        let constraints = vec![fk("fk_a_b", "a", "b_id", "b"), fk("fk_b_a", "b", "a_id", "a")];
        let ordering = order_constraints(&constraints);
        assert_eq!(ordering.warnings.len(), 1);
        assert_eq!(ordering.constraints.len(), 2);
        // Deterministic for equal inputs (testable property 1).
        let ordering2 = order_constraints(&constraints);
        let names1: Vec<&str> = ordering.constraints.iter().map(|c| c.name.as_str()).collect();
        let names2: Vec<&str> = ordering2.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names1, names2);
    }

    #[test]
    fn property_pk_unique_precede_referencing_fk() {
        let constraints = vec![
            fk("fk_b_a", "b", "a_id", "a"),
            pk("a"),
            pk("b"),
        ];
        let ordering = order_constraints(&constraints);
        let pos = |n: &str| ordering.constraints.iter().position(|c| c.name == n).unwrap();
        assert!(pos("pk_a") < pos("fk_b_a"));
        assert!(pos("pk_b") < pos("fk_b_a"));
    }
}
