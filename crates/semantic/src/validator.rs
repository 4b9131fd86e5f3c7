// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Top-level validator
//!
//! The entry point for foreign-key-join resolution (§4.1). Given a join
//! node whose condition is still an unresolved [`FkJoinRequest`],
//! [`validate_fk_join`] carries out the full nine-step procedure: locate
//! the named relation, check arity, orient the two sides by direction,
//! resolve each side's column names to attribute positions, drill both
//! sides down to the base tables the catalog knows about, look up the
//! matching constraint, analyze both sides' join-tree properties, enforce
//! that the referenced side survives as unique and row-preserving, and
//! finally rewrite the join's condition into a plain equality.
//!
//! On success the node's `condition` becomes `JoinCondition::On(..)` and
//! `fk_join` is populated; on failure the node is left untouched and an
//! error carrying the construct's original source position is returned.

use fkjoin_catalog::CatalogProbe;
use fkjoin_ir::{
    FkDirection, FkJoinRequest, FromItem, JoinCondition, JoinNode, Query, RangeTableEntry, ResolvedFkJoin,
};

use crate::alias_resolution::AliasResolver;
use crate::analyzer::analyze_for;
use crate::drill::{drill_down, QueryStack};
use crate::error::{FkJoinError, FkJoinResult};
use crate::namespace::IrNamespace;
use crate::on_clause::{build_on_clause, ExpressionTransformer};
use crate::properties::{combine, CombineInput};
use crate::resolution::ColumnResolver;

/// Resolve one join node's pending foreign-key-join request in place.
///
/// `query` is the query directly enclosing `node`; `catalog` is this
/// analysis pass's snapshot of catalog state; `transformer` is the
/// host's expression service for type-checking the synthesized `ON`
/// clause.
pub fn validate_fk_join(
    node: &mut JoinNode,
    query: &Query,
    catalog: &dyn CatalogProbe,
    transformer: &dyn ExpressionTransformer,
) -> FkJoinResult<()> {
    let request = match &node.condition {
        JoinCondition::ForeignKey(request) => request.clone(),
        _ => return Ok(()),
    };

    // Step 1: locate the relation named by `ref_alias`.
    let namespace = IrNamespace::new(query, catalog);
    let ref_rte = AliasResolver::resolve(&namespace, &request.ref_alias, request.location)?;

    // The relation newly introduced by this join is always the right-hand
    // side; a foreign-key join cannot name a nested join tree as its own
    // local relation.
    let local_rte = require_single_rte(&node.right, query, request.location)?;

    // Step 2: arity.
    if request.local_cols.len() != request.ref_cols.len() {
        return Err(FkJoinError::invalid_foreign_key(
            format!(
                "local column list has {} entries but referenced column list has {}",
                request.local_cols.len(),
                request.ref_cols.len()
            ),
            request.location,
        ));
    }

    // Step 3: orient sides by direction.
    let (referencing_rte, referencing_names, referenced_rte, referenced_names) = match request.direction {
        FkDirection::From => (local_rte, &request.local_cols, ref_rte, &request.ref_cols),
        FkDirection::To => (ref_rte, &request.ref_cols, local_rte, &request.local_cols),
    };

    // Step 4: resolve column names to attribute positions.
    let referencing_attnums =
        ColumnResolver::resolve(&namespace, referencing_rte, referencing_names, request.location)?;
    let referenced_attnums =
        ColumnResolver::resolve(&namespace, referenced_rte, referenced_names, request.location)?;

    // Step 5: drill both sides down to their base tables.
    let root_stack = QueryStack::root(query);
    let (referencing_relid, referencing_base_attnums) =
        drill_down(referencing_rte, &referencing_attnums, &root_stack, catalog, request.location)?;
    let (referenced_relid, referenced_base_attnums) =
        drill_down(referenced_rte, &referenced_attnums, &root_stack, catalog, request.location)?;

    // Step 6: catalog lookup for a matching FK constraint.
    let fk = catalog
        .find_fk(&referencing_relid, &referenced_relid, &referencing_base_attnums, &referenced_base_attnums)
        .ok_or_else(|| {
            FkJoinError::undefined_object(
                referencing_relid.clone(),
                referencing_names,
                referenced_relid.clone(),
                referenced_names,
                request.location,
            )
        })?;

    // Step 7: analyze each side's own join-tree subtree.
    let (local_uniqueness, local_fd) =
        analyze_for(&node.right, query, &root_stack, catalog, local_rte.id, request.location)?;
    let (ref_uniqueness, ref_fd) =
        analyze_for(&node.left, query, &root_stack, catalog, ref_rte.id, request.location)?;
    let (referencing_props, referenced_props) = match request.direction {
        FkDirection::From => ((local_uniqueness, local_fd), (ref_uniqueness, ref_fd)),
        FkDirection::To => ((ref_uniqueness, ref_fd), (local_uniqueness, local_fd)),
    };

    let fk_unique = catalog.cols_unique(&referencing_relid, &referencing_base_attnums);
    let fk_not_null = catalog.cols_not_null(&referencing_relid, &referencing_base_attnums);
    let (combined_uniqueness, combined_fd) = combine(CombineInput {
        u_ing: &referencing_props.0,
        fd_ing: &referencing_props.1,
        u_ed: &referenced_props.0,
        fd_ed: &referenced_props.1,
        referencing_id: referencing_rte.id,
        referenced_id: referenced_rte.id,
        fk_unique,
        fk_not_null,
        join_type: node.join_type,
        fk_dir: request.direction,
    });

    // Step 8: enforce the referenced side's guarantees.
    if !combined_uniqueness.contains(&referenced_rte.id) {
        return Err(FkJoinError::invalid_foreign_key(
            "referenced side of the foreign-key join is not provably unique",
            request.location,
        ));
    }
    if !combined_fd.contains(&(referenced_rte.id, referenced_rte.id)) {
        return Err(FkJoinError::invalid_foreign_key(
            "referenced side of the foreign-key join does not preserve all of its rows",
            request.location,
        ));
    }

    // Step 9: rewrite the ON clause and stamp the resolved node.
    let referencing_rt_index = referencing_rte.id.index as usize;
    let referenced_rt_index = referenced_rte.id.index as usize;
    let on_expr = build_on_clause(
        transformer,
        referencing_rt_index,
        &referencing_attnums,
        referenced_rt_index,
        &referenced_attnums,
        request.location,
    )?;

    node.fk_join = Some(ResolvedFkJoin {
        direction: request.direction,
        referencing_rt_index,
        referencing_attnums,
        referenced_rt_index,
        referenced_attnums,
        constraint: fkjoin_ir::ConstraintId(fk.name.clone()),
    });
    node.condition = JoinCondition::On(on_expr);

    Ok(())
}

fn require_single_rte<'a>(
    item: &FromItem,
    query: &'a Query,
    location: fkjoin_ir::SourcePos,
) -> FkJoinResult<&'a RangeTableEntry> {
    match item {
        FromItem::RangeTblRef(index) => query
            .range_table
            .get(*index)
            .ok_or_else(|| FkJoinError::undefined_table(format!("range table entry {index}"), location)),
        FromItem::Join(_) => Err(FkJoinError::feature_not_supported(
            "a foreign-key join's local side must be a single relation, not a nested join",
            location,
        )),
    }
}
