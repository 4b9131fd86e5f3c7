// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Join-tree analyzer
//!
//! Validating one foreign-key-join construct requires knowing two facts
//! about each side of the join: does the side still have a provably
//! unique key, and does it still carry every one of its original rows.
//! Both facts can be destroyed by anything standing between the named
//! relation and the FK-join construct — a `WHERE` clause in a wrapping
//! subquery, row-level security, an unbacked `GROUP BY`, a previous join
//! in a chain of several. [`analyze_subtree`] walks a join tree bottom-up
//! to derive these facts, short-circuiting once it reaches the specific
//! relation the caller is asking about.

use fkjoin_catalog::CatalogProbe;
use fkjoin_ir::{
    FkDirection, FromItem, JoinNode, Query, RangeTableEntry, RelationRef, ResolvedColumnRef, RteId, SourcePos,
};

use crate::drill::{drill_down, QueryStack};
use crate::error::{FkJoinError, FkJoinResult};
use crate::properties::{combine, CombineInput, FDSet, UniquenessSet};

/// Result of analyzing one join-tree node or range-table reference.
pub struct AnalysisResult {
    pub uniqueness: UniquenessSet,
    pub fd: FDSet,
    /// True once the relation identified by `target` (if any) has been
    /// located; its sets are then propagated upward unchanged instead of
    /// being combined with anything else.
    pub found: bool,
}

/// Walk `item`, returning the uniqueness/functional-dependency facts for
/// the subtree it roots.
///
/// `target`, when present, is the original `RteId` of a specific relation
/// the caller is looking for (typically the "other" relation located by
/// alias during top-level validation, which may sit arbitrarily deep in
/// an already-built chain of prior foreign-key joins). Once located, its
/// own sets are returned as-is rather than folded into anything further
/// up the tree — only the properties at or below the distinguished
/// relation are meaningful to the caller. Passing `None` (as the
/// recursive inner-query descent does) disables the short-circuit and
/// always runs the combine rule to completion.
pub fn analyze_subtree(
    item: &FromItem,
    query: &Query,
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    target: Option<RteId>,
    location: SourcePos,
) -> FkJoinResult<AnalysisResult> {
    match item {
        FromItem::RangeTblRef(index) => analyze_leaf(*index, query, stack, catalog, target, location),
        FromItem::Join(node) => analyze_join_node(node, query, stack, catalog, target, location),
    }
}

fn analyze_leaf(
    index: usize,
    query: &Query,
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    target: Option<RteId>,
    location: SourcePos,
) -> FkJoinResult<AnalysisResult> {
    let rte = query
        .range_table
        .get(index)
        .ok_or_else(|| FkJoinError::undefined_table(format!("range table entry {index}"), location))?;
    let found = target == Some(rte.id);
    let (uniqueness, fd) = leaf_properties(rte, query, stack, catalog, location)?;
    Ok(AnalysisResult { uniqueness, fd, found })
}

fn leaf_properties(
    rte: &RangeTableEntry,
    query: &Query,
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    location: SourcePos,
) -> FkJoinResult<(UniquenessSet, FDSet)> {
    match &rte.relation {
        RelationRef::BaseTable { relid } => {
            let table = catalog
                .table(relid)
                .ok_or_else(|| FkJoinError::undefined_table(relid.clone(), location))?;
            use fkjoin_catalog::TableType;
            if !matches!(table.table_type, TableType::Table | TableType::Temporary) {
                return Err(FkJoinError::feature_not_supported(
                    format!("relation \"{relid}\" is not an ordinary table"),
                    location,
                ));
            }

            let mut uniqueness = UniquenessSet::new();
            uniqueness.insert(rte.id);

            let mut fd = FDSet::new();
            if !table.row_security_enabled && !query_has_filters(query) {
                fd.insert((rte.id, rte.id));
            }
            Ok((uniqueness, fd))
        }
        RelationRef::View { underlying_query } => {
            let child_stack = QueryStack::root(underlying_query);
            inner_query_leaf_properties(underlying_query, &child_stack, catalog, location)
        }
        RelationRef::Subquery { query: inner } => {
            let child_stack = stack.child(inner);
            inner_query_leaf_properties(inner, &child_stack, catalog, location)
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
                    format!("recursive common table expression \"{name}\" cannot be analyzed"),
                    location,
                ));
            }
            let child_stack = QueryStack {
                query: &cte.query,
                parent: Some(ancestor),
            };
            inner_query_leaf_properties(&cte.query, &child_stack, catalog, location)
        }
        RelationRef::Join { .. } | RelationRef::Group { .. } => Err(FkJoinError::feature_not_supported(
            "join-tree analysis cannot dereference a join-alias or GROUP BY relation directly",
            location,
        )),
    }
}

fn query_has_filters(query: &Query) -> bool {
    query.where_quals.is_some()
        || query.having_quals.is_some()
        || query.limit_count.is_some()
        || query.limit_offset.is_some()
}

/// Compute the uniqueness/row-preservation facts for a view, subquery, or
/// CTE reference by recursing into its single from-list item.
///
/// The returned sets are threaded straight through from that recursive
/// call, keyed on whatever `RteId` the recursion actually bottoms out at
/// (possibly several levels further down, through further views or
/// joins) — there is no relabeling onto the wrapper's own identity. A
/// caller that needs to know whether a *specific* relation's properties
/// survived must check that relation's own id in the returned sets, the
/// same way the top-level validator checks the referenced relation's own
/// `RteId` rather than the wrapping range-table entry's.
fn inner_query_leaf_properties(
    inner_query: &Query,
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    location: SourcePos,
) -> FkJoinResult<(UniquenessSet, FDSet)> {
    if inner_query.from_list.len() != 1 {
        // An implicit cross product: no single relation's properties can
        // be attributed to the wrapper as a whole.
        return Ok((UniquenessSet::new(), FDSet::new()));
    }

    let inner = analyze_subtree(&inner_query.from_list[0], inner_query, stack, catalog, None, location)?;
    let mut uniqueness = inner.uniqueness;
    let fd = inner.fd;

    if !inner_query.group_clause.is_empty() {
        match group_by_uniqueness_basis(inner_query, catalog) {
            Some(base_id) => {
                uniqueness.insert(base_id);
            }
            None => uniqueness.clear(),
        }
    }

    Ok((uniqueness, fd))
}

/// The GROUP BY uniqueness test: every grouping expression must be a bare
/// column reference, all into the same inner relation, and that relation
/// must be a base table with a unique index whose key columns are a
/// superset of the grouped columns.
fn group_by_uniqueness_basis(inner_query: &Query, catalog: &dyn CatalogProbe) -> Option<RteId> {
    let refs: Vec<ResolvedColumnRef> = inner_query
        .group_clause
        .iter()
        .map(|expr| expr.as_resolved_column())
        .collect::<Option<Vec<_>>>()?;
    let first_rt_index = refs.first()?.rt_index;
    if !refs.iter().all(|r| r.rt_index == first_rt_index) {
        return None;
    }
    let rte = inner_query.range_table.get(first_rt_index)?;
    let RelationRef::BaseTable { relid } = &rte.relation else {
        return None;
    };
    let attnums: Vec<usize> = refs.iter().map(|r| r.attnum).collect();
    if catalog.covered_by_unique_index(relid, &attnums) {
        Some(rte.id)
    } else {
        None
    }
}

fn analyze_join_node(
    node: &JoinNode,
    query: &Query,
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    target: Option<RteId>,
    location: SourcePos,
) -> FkJoinResult<AnalysisResult> {
    let fk = node
        .fk_join
        .as_ref()
        .ok_or_else(|| FkJoinError::feature_not_supported("unsupported join-tree node shape", location))?;

    let (referencing_item, referenced_item) = match fk.direction {
        FkDirection::From => (node.left.as_ref(), node.right.as_ref()),
        FkDirection::To => (node.right.as_ref(), node.left.as_ref()),
    };

    let referencing_result = analyze_subtree(referencing_item, query, stack, catalog, target, location)?;
    if referencing_result.found {
        return Ok(referencing_result);
    }
    let referenced_result = analyze_subtree(referenced_item, query, stack, catalog, target, location)?;
    if referenced_result.found {
        return Ok(referenced_result);
    }

    let referencing_rte = query
        .range_table
        .get(fk.referencing_rt_index)
        .ok_or_else(|| FkJoinError::undefined_table("referencing relation", location))?;
    let referenced_rte = query
        .range_table
        .get(fk.referenced_rt_index)
        .ok_or_else(|| FkJoinError::undefined_table("referenced relation", location))?;

    let (base_relid, base_attnums) = drill_down(referencing_rte, &fk.referencing_attnums, stack, catalog, location)?;
    let fk_unique = catalog.cols_unique(&base_relid, &base_attnums);
    let fk_not_null = catalog.cols_not_null(&base_relid, &base_attnums);

    let (uniqueness, fd) = combine(CombineInput {
        u_ing: &referencing_result.uniqueness,
        fd_ing: &referencing_result.fd,
        u_ed: &referenced_result.uniqueness,
        fd_ed: &referenced_result.fd,
        referencing_id: referencing_rte.id,
        referenced_id: referenced_rte.id,
        fk_unique,
        fk_not_null,
        join_type: node.join_type,
        fk_dir: fk.direction,
    });

    Ok(AnalysisResult {
        uniqueness,
        fd,
        found: false,
    })
}

/// Convenience wrapper for the top-level validator: analyze the subtree
/// rooted at `item`, searching for `target`. `target` is always a
/// relation the validator itself located within this very subtree, so a
/// missing result here indicates an inconsistency between the orienting
/// step and the join tree rather than a user error.
pub fn analyze_for(
    item: &FromItem,
    query: &Query,
    stack: &QueryStack<'_>,
    catalog: &dyn CatalogProbe,
    target: RteId,
    location: SourcePos,
) -> FkJoinResult<(UniquenessSet, FDSet)> {
    let result = analyze_subtree(item, query, stack, catalog, Some(target), location)?;
    if !result.found {
        return Err(FkJoinError::feature_not_supported(
            "foreign-key-join side could not be located in its own join tree",
            location,
        ));
    }
    Ok((result.uniqueness, result.fd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fkjoin_catalog::{Catalog, StaticCatalog};
    use fkjoin_ir::{
        ColumnRef, ConstraintId, Dialect, Expr, JoinCondition, JoinType, Literal, RangeTableEntry, ResolvedFkJoin,
        RteId as Id, SelectItem,
    };

    async fn probe() -> Box<dyn CatalogProbe> {
        StaticCatalog::new().preload_probe().await.unwrap()
    }

    #[tokio::test]
    async fn base_table_seeds_its_own_identity() {
        let t1 = RangeTableEntry::new(Id::new(0, 0), RelationRef::BaseTable { relid: "t1".to_string() });
        let query = Query::new(Dialect::PostgreSQL).with_range_table(vec![t1.clone()]);
        let stack = QueryStack::root(&query);
        let catalog = probe().await;
        let item = FromItem::range_tbl_ref(0);
        let result = analyze_subtree(&item, &query, &stack, catalog.as_ref(), Some(t1.id), SourcePos(0)).unwrap();
        assert!(result.found);
        assert!(result.uniqueness.contains(&t1.id));
        assert!(result.fd.contains(&(t1.id, t1.id)));
    }

    #[tokio::test]
    async fn where_clause_on_enclosing_query_breaks_row_preservation_not_uniqueness() {
        let t1 = RangeTableEntry::new(Id::new(0, 0), RelationRef::BaseTable { relid: "t1".to_string() });
        let query = Query::new(Dialect::PostgreSQL)
            .with_range_table(vec![t1.clone()])
            .with_where(Expr::BinaryOp {
                left: Box::new(Expr::Column(ColumnRef::new("c2"))),
                op: fkjoin_ir::BinaryOp::Gt,
                right: Box::new(Expr::Literal(Literal::Integer(0))),
            });
        let stack = QueryStack::root(&query);
        let catalog = probe().await;
        let item = FromItem::range_tbl_ref(0);
        let result = analyze_subtree(&item, &query, &stack, catalog.as_ref(), Some(t1.id), SourcePos(0)).unwrap();
        assert!(result.uniqueness.contains(&t1.id));
        assert!(!result.fd.contains(&(t1.id, t1.id)));
    }

    #[tokio::test]
    async fn filtered_subquery_wrapper_loses_row_preservation_but_keeps_uniqueness() {
        let inner_t1_id = Id::new(1, 0);
        let inner = Query::new(Dialect::PostgreSQL)
            .with_range_table(vec![RangeTableEntry::new(
                inner_t1_id,
                RelationRef::BaseTable { relid: "t1".to_string() },
            )])
            .with_from_list(vec![FromItem::range_tbl_ref(0)])
            .with_target_list(vec![
                SelectItem::UnnamedExpr(Expr::ResolvedColumn(ResolvedColumnRef::new(0, 1))),
                SelectItem::UnnamedExpr(Expr::ResolvedColumn(ResolvedColumnRef::new(0, 2))),
            ])
            .with_where(Expr::BinaryOp {
                left: Box::new(Expr::Column(ColumnRef::new("c2"))),
                op: fkjoin_ir::BinaryOp::Gt,
                right: Box::new(Expr::Literal(Literal::Integer(0))),
            });

        let wrapper = RangeTableEntry::new(Id::new(0, 0), RelationRef::Subquery { query: Box::new(inner) })
            .with_alias("t1f");

        let outer = Query::new(Dialect::PostgreSQL).with_range_table(vec![wrapper.clone()]);
        let stack = QueryStack::root(&outer);
        let catalog = probe().await;
        let item = FromItem::range_tbl_ref(0);
        let result =
            analyze_subtree(&item, &outer, &stack, catalog.as_ref(), Some(wrapper.id), SourcePos(0)).unwrap();
        // Properties stay keyed on the inner base table's own id, not the
        // wrapping subquery's — there is no relabeling onto `wrapper.id`.
        assert!(result.uniqueness.contains(&inner_t1_id));
        assert!(!result.fd.contains(&(inner_t1_id, inner_t1_id)));
    }

    #[tokio::test]
    async fn group_by_on_unique_index_column_preserves_uniqueness() {
        let inner_t1_id = Id::new(1, 0);
        let inner = Query::new(Dialect::PostgreSQL)
            .with_range_table(vec![RangeTableEntry::new(
                inner_t1_id,
                RelationRef::BaseTable { relid: "t1".to_string() },
            )])
            .with_from_list(vec![FromItem::range_tbl_ref(0)])
            .with_target_list(vec![SelectItem::UnnamedExpr(Expr::ResolvedColumn(
                ResolvedColumnRef::new(0, 1),
            ))])
            .with_group_clause(vec![Expr::ResolvedColumn(ResolvedColumnRef::new(0, 1))]);

        let wrapper = RangeTableEntry::new(Id::new(0, 0), RelationRef::Subquery { query: Box::new(inner) });
        let outer = Query::new(Dialect::PostgreSQL).with_range_table(vec![wrapper.clone()]);
        let stack = QueryStack::root(&outer);
        let catalog = probe().await;
        let item = FromItem::range_tbl_ref(0);
        let result =
            analyze_subtree(&item, &outer, &stack, catalog.as_ref(), Some(wrapper.id), SourcePos(0)).unwrap();
        assert!(result.uniqueness.contains(&inner_t1_id));
    }

    #[tokio::test]
    async fn group_by_on_non_unique_column_clears_uniqueness() {
        let inner_t1_id = Id::new(1, 0);
        let inner = Query::new(Dialect::PostgreSQL)
            .with_range_table(vec![RangeTableEntry::new(
                inner_t1_id,
                RelationRef::BaseTable { relid: "t1".to_string() },
            )])
            .with_from_list(vec![FromItem::range_tbl_ref(0)])
            .with_target_list(vec![SelectItem::UnnamedExpr(Expr::ResolvedColumn(
                ResolvedColumnRef::new(0, 2),
            ))])
            .with_group_clause(vec![Expr::ResolvedColumn(ResolvedColumnRef::new(0, 2))]);

        let wrapper = RangeTableEntry::new(Id::new(0, 0), RelationRef::Subquery { query: Box::new(inner) });
        let outer = Query::new(Dialect::PostgreSQL).with_range_table(vec![wrapper.clone()]);
        let stack = QueryStack::root(&outer);
        let catalog = probe().await;
        let item = FromItem::range_tbl_ref(0);
        let result =
            analyze_subtree(&item, &outer, &stack, catalog.as_ref(), Some(wrapper.id), SourcePos(0)).unwrap();
        assert!(result.uniqueness.is_empty());
        assert!(!result.uniqueness.contains(&inner_t1_id));
    }

    #[tokio::test]
    async fn view_wrapping_asymmetric_join_keeps_properties_keyed_on_their_own_relation() {
        // A view wrapping `order_items FULL JOIN orders ON order_items.order_id
        // = orders.id`. order_items.order_id is not part of any unique index
        // on order_items, so the fk is not unique: only order_items keeps its
        // uniqueness, not orders. The view's own properties must stay keyed
        // on whichever of the two actually earned them, not collapsed onto
        // the view's own range-table entry.
        let order_items_id = Id::new(1, 0);
        let orders_id = Id::new(1, 1);
        let order_items = RangeTableEntry::new(order_items_id, RelationRef::BaseTable { relid: "order_items".to_string() });
        let orders = RangeTableEntry::new(orders_id, RelationRef::BaseTable { relid: "orders".to_string() });

        let node = JoinNode {
            join_type: JoinType::Full,
            left: Box::new(FromItem::range_tbl_ref(0)),
            right: Box::new(FromItem::range_tbl_ref(1)),
            condition: JoinCondition::On(Expr::Literal(Literal::Boolean(true))),
            fk_join: Some(ResolvedFkJoin {
                direction: FkDirection::From,
                referencing_rt_index: 0,
                referencing_attnums: vec![2],
                referenced_rt_index: 1,
                referenced_attnums: vec![1],
                constraint: ConstraintId("order_items_order_id_fkey".to_string()),
            }),
        };

        let inner = Query::new(Dialect::PostgreSQL)
            .with_range_table(vec![order_items.clone(), orders.clone()])
            .with_from_list(vec![FromItem::Join(Box::new(node))]);

        let wrapper =
            RangeTableEntry::new(Id::new(0, 0), RelationRef::View { underlying_query: Box::new(inner) });
        let outer = Query::new(Dialect::PostgreSQL).with_range_table(vec![wrapper.clone()]);
        let stack = QueryStack::root(&outer);
        let catalog = probe().await;
        let item = FromItem::range_tbl_ref(0);
        let result = analyze_subtree(&item, &outer, &stack, catalog.as_ref(), None, SourcePos(0)).unwrap();

        assert!(result.uniqueness.contains(&order_items_id));
        assert!(!result.uniqueness.contains(&orders_id));
        assert!(!result.uniqueness.contains(&wrapper.id));

        assert!(result.fd.contains(&(order_items_id, order_items_id)));
        assert!(result.fd.contains(&(orders_id, orders_id)));
        assert!(result.fd.contains(&(order_items_id, orders_id)));
    }

    #[tokio::test]
    async fn nested_join_found_short_circuit_propagates_without_combining() {
        // (t1 FKJOIN t2) analyzed for target = t1: must not be combined
        // with t2's properties, just returned as-is.
        let t1 = RangeTableEntry::new(Id::new(0, 0), RelationRef::BaseTable { relid: "t1".to_string() });
        let t2 = RangeTableEntry::new(Id::new(0, 1), RelationRef::BaseTable { relid: "t2".to_string() });
        let query = Query::new(Dialect::PostgreSQL).with_range_table(vec![t1.clone(), t2.clone()]);
        let stack = QueryStack::root(&query);
        let catalog = probe().await;

        let node = JoinNode {
            join_type: JoinType::Inner,
            left: Box::new(FromItem::range_tbl_ref(0)),
            right: Box::new(FromItem::range_tbl_ref(1)),
            condition: JoinCondition::On(Expr::Literal(Literal::Boolean(true))),
            fk_join: Some(ResolvedFkJoin {
                direction: FkDirection::To,
                referencing_rt_index: 1,
                referencing_attnums: vec![1],
                referenced_rt_index: 0,
                referenced_attnums: vec![1],
                constraint: ConstraintId("t2_c3_fkey".to_string()),
            }),
        };
        let item = FromItem::Join(Box::new(node));
        let result = analyze_subtree(&item, &query, &stack, catalog.as_ref(), Some(t1.id), SourcePos(0)).unwrap();
        assert!(result.found);
        assert!(result.uniqueness.contains(&t1.id));
    }

    #[tokio::test]
    async fn unresolved_join_node_is_unsupported() {
        let t1 = RangeTableEntry::new(Id::new(0, 0), RelationRef::BaseTable { relid: "t1".to_string() });
        let t2 = RangeTableEntry::new(Id::new(0, 1), RelationRef::BaseTable { relid: "t2".to_string() });
        let query = Query::new(Dialect::PostgreSQL).with_range_table(vec![t1.clone(), t2.clone()]);
        let stack = QueryStack::root(&query);
        let catalog = probe().await;

        let node = JoinNode {
            join_type: JoinType::Inner,
            left: Box::new(FromItem::range_tbl_ref(0)),
            right: Box::new(FromItem::range_tbl_ref(1)),
            condition: JoinCondition::Natural,
            fk_join: None,
        };
        let item = FromItem::Join(Box::new(node));
        let err = analyze_subtree(&item, &query, &stack, catalog.as_ref(), Some(t1.id), SourcePos(5)).unwrap_err();
        assert!(matches!(err, FkJoinError::FeatureNotSupported { location, .. } if location == SourcePos(5)));
    }
}
