// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Range table and join-tree representation
//!
//! This module models the part of the IR that the foreign-key-join analyzer
//! walks: a query's range table (the flat list of relations a query draws
//! from) and its join tree (how those relations are combined).
//!
//! Every entry in a range table is identified by an [`RteId`], stable across
//! a single analysis pass and comparable by value. A [`RelationRef`]
//! describes what an entry actually is — a base table, a view, a subquery, a
//! CTE reference, the synthetic output row of a join, or the synthetic
//! output row of a GROUP BY. [`FromItem`] is the join-tree shape: either a
//! direct reference into the range table, or a [`JoinNode`] combining two
//! sub-trees.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::query::Query;

/// Stable identity of a range-table entry within a single analysis pass.
///
/// Two `RteId`s are equal iff they denote the same range-table entry at the
/// same query level. `level` counts query nesting (0 = the query the
/// top-level validator was invoked on); `index` is the entry's position
/// within that query's range table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RteId {
    pub level: u32,
    pub index: u32,
}

impl RteId {
    pub fn new(level: u32, index: u32) -> Self {
        Self { level, index }
    }
}

/// A source-position token, carried by errors for diagnostics.
///
/// Opaque to the analyzer; it is whatever the host's parser attached to the
/// original foreign-key-join construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourcePos(pub u32);

/// A resolved reference to a single column of an already-analyzed relation:
/// the `(sub_varno, sub_attno)` pairs the specification talks about for join
/// aliases and GROUP BY expressions.
///
/// This is distinct from [`crate::expr::ColumnRef`], which names a column by
/// table alias and column name before resolution. A `ResolvedColumnRef`
/// instead points directly at a position in a range table, the way an
/// already-analyzed subquery's target list or a join's alias list does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumnRef {
    /// Index into the owning query's range table.
    pub rt_index: usize,
    /// 1-based attribute position within that range-table entry.
    pub attnum: usize,
}

impl ResolvedColumnRef {
    pub fn new(rt_index: usize, attnum: usize) -> Self {
        Self { rt_index, attnum }
    }
}

/// What a range-table entry actually denotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationRef {
    /// An ordinary or partitioned base table, identified by catalog name.
    BaseTable { relid: String },
    /// A view; `underlying_query` is the view's defining query.
    View { underlying_query: Box<Query> },
    /// A subquery in the FROM list.
    Subquery { query: Box<Query> },
    /// A reference to a Common Table Expression defined `levelsup` query
    /// levels up the enclosing-query stack.
    Cte { levelsup: u32, name: String },
    /// The synthetic relation produced by a join sub-tree; each output
    /// column is a direct reference into an inner range-table entry.
    Join { alias_vars: Vec<ResolvedColumnRef> },
    /// The synthetic relation produced by a GROUP BY; each grouping
    /// expression is a direct reference into the grouped relation.
    Group { group_exprs: Vec<ResolvedColumnRef> },
}

/// An entry in a query's range table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTableEntry {
    pub id: RteId,
    pub alias: Option<String>,
    pub relation: RelationRef,
}

impl RangeTableEntry {
    pub fn new(id: RteId, relation: RelationRef) -> Self {
        Self {
            id,
            alias: None,
            relation,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Join type. `Cross` is carried for completeness but never participates in
/// a foreign-key join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// Which side of a foreign-key-join construct is referencing vs referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FkDirection {
    /// `KEY (local_cols) -> ref_alias (ref_cols)`: the right-hand relation
    /// of the join is the referencing side.
    From,
    /// `KEY (local_cols) <- ref_alias (ref_cols)`: the right-hand relation
    /// of the join is the referenced side.
    To,
}

/// The raw foreign-key-join request attached to a join before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FkJoinRequest {
    pub direction: FkDirection,
    pub local_cols: Vec<String>,
    pub ref_cols: Vec<String>,
    pub ref_alias: String,
    pub location: SourcePos,
}

/// Opaque identifier for a matched foreign-key constraint, as handed back by
/// the catalog probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintId(pub String);

impl std::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resolved foreign-key-join node stamped onto a [`JoinNode`] once
/// validation succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFkJoin {
    pub direction: FkDirection,
    pub referencing_rt_index: usize,
    pub referencing_attnums: Vec<usize>,
    pub referenced_rt_index: usize,
    pub referenced_attnums: Vec<usize>,
    pub constraint: ConstraintId,
}

/// A join's predicate, before or after foreign-key-join resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinCondition {
    On(Expr),
    Using(Vec<String>),
    Natural,
    /// Not yet resolved; replaced by `On` once the validator rewrites it.
    ForeignKey(FkJoinRequest),
}

/// A node in the join tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNode {
    pub join_type: JoinType,
    pub left: Box<FromItem>,
    pub right: Box<FromItem>,
    pub condition: JoinCondition,
    /// Populated once `condition` has been resolved from a `ForeignKey`
    /// request into an equality `On` clause.
    pub fk_join: Option<ResolvedFkJoin>,
}

/// A position in a query's FROM list / join tree: either a direct reference
/// into the range table, or a join combining two sub-trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FromItem {
    RangeTblRef(usize),
    Join(Box<JoinNode>),
}

impl FromItem {
    pub fn range_tbl_ref(index: usize) -> Self {
        FromItem::RangeTblRef(index)
    }
}
