// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Drill-down resolver
//!
//! Column resolution (see [`crate::resolution`]) finds *where* a foreign-key
//! join side's column lives: a range-table entry and an attribute position
//! within it. That entry might be a base table — in which case the column
//! position is already what the catalog probe needs — or it might be a
//! view, a subquery, a CTE reference, a join's synthetic output row, or a
//! GROUP BY's synthetic output row. Drilling down follows the column
//! through however many of those layers stand between the FK-join
//! construct and the base table the catalog actually knows about.
//!
//! Each step must land all requested columns on the *same* inner
//! range-table entry; a join alias or GROUP BY list that sends two
//! requested columns to different inner relations cannot be drilled any
//! further; it is rejected before it has a chance to.

use fkjoin_catalog::CatalogProbe;
use fkjoin_ir::{Query, RangeTableEntry, RelationRef, ResolvedColumnRef, SourcePos};

use crate::error::{FkJoinError, FkJoinResult};

/// The chain of enclosing queries a CTE reference's `levelsup` counts
/// against. Passed by reference rather than threaded through every
/// function's return value, per the analyzer's convention that query
/// nesting is explicit state, never ambient.
pub struct QueryStack<'a> {
    pub query: &'a Query,
    pub parent: Option<&'a QueryStack<'a>>,
}

impl<'a> QueryStack<'a> {
    /// A stack with no enclosing queries: the query a top-level validation
    /// was invoked on, or a view's defining query (which starts its own,
    /// isolated nesting — a view cannot see the CTEs of whatever query
    /// happens to reference it).
    pub fn root(query: &'a Query) -> Self {
        Self { query, parent: None }
    }

    /// Push a subquery's defining query onto this stack. Unlike a view, a
    /// FROM-list subquery keeps seeing everything its enclosing query can
    /// see, including CTEs further up.
    pub fn child(&'a self, query: &'a Query) -> Self {
        Self {
            query,
            parent: Some(self),
        }
    }

    /// Walk `levelsup` queries up the stack. `levelsup = 0` is this query
    /// itself.
    pub fn ancestor(&self, levelsup: u32) -> Option<&QueryStack<'a>> {
        let mut current = self;
        for _ in 0..levelsup {
            current = current.parent?;
        }
        Some(current)
    }
}

/// Drill a set of columns, all belonging to the same range-table entry,
/// down to the base table and attribute positions the catalog probe can
/// look a foreign key up against.
///
/// `attnums` must be non-empty and every position valid for `rte`;
/// violations are reported the same way a malformed column list from the
/// host would be.
pub fn drill_down(
    rte: &RangeTableEntry,
    attnums: &[usize],
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    location: SourcePos,
) -> FkJoinResult<(String, Vec<usize>)> {
    match &rte.relation {
        RelationRef::BaseTable { relid } => {
            let table = catalog
                .table(relid)
                .ok_or_else(|| FkJoinError::undefined_table(relid.clone(), location))?;
            use fkjoin_catalog::TableType;
            match table.table_type {
                TableType::Table | TableType::Temporary => Ok((relid.clone(), attnums.to_vec())),
                _ => Err(FkJoinError::feature_not_supported(
                    format!("relation \"{relid}\" is not an ordinary table"),
                    location,
                )),
            }
        }
        RelationRef::View { underlying_query } => {
            let child_stack = QueryStack::root(underlying_query);
            drill_query_targets(underlying_query, &child_stack, attnums, catalog, location)
        }
        RelationRef::Subquery { query } => {
            let child_stack = stack.child(query);
            drill_query_targets(query, &child_stack, attnums, catalog, location)
        }
        RelationRef::Cte { levelsup, name } => {
            let ancestor = stack
                .ancestor(*levelsup)
                .ok_or_else(|| FkJoinError::undefined_table(name.clone(), location))?;
            let cte = ancestor
                .query
                .cte_list
                .iter()
                .find(|cte| &cte.name == name)
                .ok_or_else(|| FkJoinError::undefined_table(name.clone(), location))?;
            if cte.recursive {
                return Err(FkJoinError::feature_not_supported(
                    format!("recursive common table expression \"{name}\" cannot be drilled through"),
                    location,
                ));
            }
            let child_stack = QueryStack {
                query: &cte.query,
                parent: Some(ancestor),
            };
            drill_query_targets(&cte.query, &child_stack, attnums, catalog, location)
        }
        RelationRef::Join { alias_vars } => {
            drill_through_resolved(alias_vars, attnums, stack, catalog, location)
        }
        RelationRef::Group { group_exprs } => {
            drill_through_resolved(group_exprs, attnums, stack, catalog, location)
        }
    }
}

/// Shared logic for the `Join`/`Group` cases: each requested attnum is
/// already a direct reference into the current query's range table, no
/// further binding needed.
fn drill_through_resolved(
    alias_vars: &[ResolvedColumnRef],
    attnums: &[usize],
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    location: SourcePos,
) -> FkJoinResult<(String, Vec<usize>)> {
    let refs = fetch_positions(alias_vars, attnums, location)?;
    let rt_index = require_same_inner_relation(&refs, location)?;
    let inner = stack
        .query
        .range_table
        .get(rt_index)
        .ok_or_else(|| FkJoinError::undefined_table(format!("range table entry {rt_index}"), location))?;
    let inner_attnums: Vec<usize> = refs.iter().map(|r| r.attnum).collect();
    drill_down(inner, &inner_attnums, stack, catalog, location)
}

/// The `View`/`Subquery`/`CTE` case: each requested attnum names a
/// target-list entry, which must itself be a plain already-resolved
/// column reference for drilling to continue.
fn drill_query_targets(
    query: &Query,
    stack: &QueryStack<'_>,
    attnums: &[usize],
    catalog: &dyn CatalogProbe,
    location: SourcePos,
) -> FkJoinResult<(String, Vec<usize>)> {
    if !query.is_drillable() {
        return Err(FkJoinError::feature_not_supported(
            "relation's defining query uses a construct the foreign-key-join analyzer cannot see through",
            location,
        ));
    }

    let mut refs = Vec::with_capacity(attnums.len());
    for &attnum in attnums {
        let item = query.target_list.get(attnum - 1).ok_or_else(|| {
            FkJoinError::undefined_column(format!("position {attnum}"), location)
        })?;
        let resolved = item
            .expr()
            .and_then(|e| e.as_resolved_column())
            .ok_or_else(|| {
                FkJoinError::feature_not_supported(
                    format!("target-list entry at position {attnum} is not a plain column reference"),
                    location,
                )
            })?;
        refs.push(resolved);
    }

    let rt_index = require_same_inner_relation(&refs, location)?;
    let inner = query
        .range_table
        .get(rt_index)
        .ok_or_else(|| FkJoinError::undefined_table(format!("range table entry {rt_index}"), location))?;
    let inner_attnums: Vec<usize> = refs.iter().map(|r| r.attnum).collect();
    drill_down(inner, &inner_attnums, stack, catalog, location)
}

fn fetch_positions(
    vars: &[ResolvedColumnRef],
    attnums: &[usize],
    location: SourcePos,
) -> FkJoinResult<Vec<ResolvedColumnRef>> {
    attnums
        .iter()
        .map(|&attnum| {
            vars.get(attnum - 1)
                .copied()
                .ok_or_else(|| FkJoinError::undefined_column(format!("position {attnum}"), location))
        })
        .collect()
}

/// Invariant: drilling a multi-column side through one step must land
/// every column on the same inner range-table entry. Violations are
/// reported as an undefined relation, mirroring the wording used when a
/// join alias's columns come from two different underlying tables.
fn require_same_inner_relation(
    refs: &[ResolvedColumnRef],
    location: SourcePos,
) -> FkJoinResult<usize> {
    let first = refs
        .first()
        .ok_or_else(|| FkJoinError::feature_not_supported("empty column list", location))?
        .rt_index;
    if refs.iter().all(|r| r.rt_index == first) {
        Ok(first)
    } else {
        Err(FkJoinError::undefined_table(
            "columns resolve to different inner relations",
            location,
        ))
    }
}
