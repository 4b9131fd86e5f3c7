// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Namespace services
//!
//! The validator needs to answer two questions about a query's range
//! table: "which visible entry has this alias" (step 1 of the top-level
//! validator) and "what column names does this entry expose, in
//! attribute-position order" (step 4). A real host normally answers both
//! from its own parse-time scope tracking; [`Namespace`] is the seam that
//! lets it do so. [`IrNamespace`] is the reference implementation driven
//! purely off this crate's own IR, used by this crate's own tests and
//! available to any host that has no richer scope tracking of its own.

use fkjoin_catalog::CatalogProbe;
use fkjoin_ir::{Expr, Query, RangeTableEntry, RelationRef, SelectItem};

/// Enumerates the relations visible at a program point and their visible
/// column names.
pub trait Namespace {
    /// All range-table entries visible at this point, in range-table
    /// order.
    fn visible_relations(&self) -> &[RangeTableEntry];

    /// The visible entry whose alias equals `alias`, if any.
    fn find_by_alias(&self, alias: &str) -> Option<&RangeTableEntry> {
        self.visible_relations()
            .iter()
            .find(|rte| rte.alias.as_deref() == Some(alias))
    }

    /// The column names `rte` exposes, in 1-based attribute-position
    /// order (index `i` of the returned vec is attribute position `i+1`).
    fn visible_columns(&self, rte: &RangeTableEntry) -> Vec<String>;
}

/// A [`Namespace`] backed by a single query's range table and a catalog
/// probe, with column names for non-base-table entries derived from
/// target-list aliases (and `SELECT *` expanded recursively).
pub struct IrNamespace<'a> {
    query: &'a Query,
    catalog: &'a dyn CatalogProbe,
}

impl<'a> IrNamespace<'a> {
    pub fn new(query: &'a Query, catalog: &'a dyn CatalogProbe) -> Self {
        Self { query, catalog }
    }
}

impl<'a> Namespace for IrNamespace<'a> {
    fn visible_relations(&self) -> &[RangeTableEntry] {
        &self.query.range_table
    }

    fn visible_columns(&self, rte: &RangeTableEntry) -> Vec<String> {
        relation_columns(self.catalog, rte, self.query)
    }
}

/// Column names a range-table entry exposes, dispatching on relation
/// kind. Mutually recursive with [`target_list_names`] for the
/// view/subquery case.
fn relation_columns(
    catalog: &dyn CatalogProbe,
    rte: &RangeTableEntry,
    enclosing: &Query,
) -> Vec<String> {
    match &rte.relation {
        RelationRef::BaseTable { relid } => catalog
            .table(relid)
            .map(|t| t.columns.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default(),
        RelationRef::View { underlying_query } | RelationRef::Subquery { query: underlying_query } => {
            target_list_names(catalog, underlying_query)
        }
        RelationRef::Cte { name, .. } => enclosing
            .cte_list
            .iter()
            .find(|cte| &cte.name == name)
            .map(|cte| {
                if !cte.columns.is_empty() {
                    cte.columns.clone()
                } else {
                    target_list_names(catalog, &cte.query)
                }
            })
            .unwrap_or_default(),
        // Join and GROUP BY relations carry no source column names in
        // this IR; the validator resolves FK columns against them by
        // position, not name, so positional placeholders are sufficient
        // for the rare case a host names one of these as an FK-join side.
        RelationRef::Join { alias_vars } => {
            (1..=alias_vars.len()).map(|i| format!("column{i}")).collect()
        }
        RelationRef::Group { group_exprs } => {
            (1..=group_exprs.len()).map(|i| format!("column{i}")).collect()
        }
    }
}

/// Column names a query's target list exposes. `SELECT *` and
/// `SELECT alias.*` are expanded recursively; an unaliased non-column
/// expression contributes no visible name, mirroring ordinary SQL scope
/// rules.
fn target_list_names(catalog: &dyn CatalogProbe, query: &Query) -> Vec<String> {
    let mut names = Vec::new();
    for item in &query.target_list {
        match item {
            SelectItem::AliasedExpr { alias, .. } => names.push(alias.clone()),
            SelectItem::UnnamedExpr(Expr::Column(c)) => names.push(c.column.clone()),
            SelectItem::UnnamedExpr(_) => {}
            SelectItem::QualifiedWildcard(alias) => {
                if let Some(rte) = query
                    .range_table
                    .iter()
                    .find(|r| r.alias.as_deref() == Some(alias.as_str()))
                {
                    names.extend(relation_columns(catalog, rte, query));
                }
            }
            SelectItem::Wildcard => {
                for rte in &query.range_table {
                    names.extend(relation_columns(catalog, rte, query));
                }
            }
        }
    }
    names
}
