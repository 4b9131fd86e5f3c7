// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query representation
//!
//! This module represents the slice of a SQL query the foreign-key-join
//! analyzer reads: its range table and join tree (see
//! [`crate::range_table`]), its target list, and the clauses whose mere
//! *presence* the analyzer treats as invalidating row preservation
//! (`WHERE`, `HAVING`, `LIMIT`, `OFFSET`) or ruling out analysis entirely
//! (set operations, `DISTINCT`, grouping sets, set-returning target
//! expressions).
//!
//! A full parser/planner would carry much more on `Query` — this crate
//! models only what the analyzer and its host collaborators need.

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::expr::Expr;
use crate::range_table::{FromItem, RangeTableEntry};

/// The command a query represents. Only `Select` is analyzable; anything
/// else is rejected by the drill-down resolver with `FEATURE_NOT_SUPPORTED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    Select,
    Other,
}

/// Set operation kind. The analyzer never descends into a set operation's
/// operands — it only needs to know one is present, to reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// Item in a SELECT projection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// Unnamed expression (e.g., `column` or `a + b`).
    UnnamedExpr(Expr),
    /// Expression with alias (e.g., `col AS name`).
    AliasedExpr { expr: Expr, alias: String },
    /// Table-qualified wildcard (e.g., `table.*`).
    QualifiedWildcard(String),
    /// Unqualified wildcard (`*`).
    Wildcard,
}

impl SelectItem {
    /// The underlying expression, if this item carries one (wildcards
    /// don't).
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            SelectItem::UnnamedExpr(e) => Some(e),
            SelectItem::AliasedExpr { expr, .. } => Some(expr),
            SelectItem::QualifiedWildcard(_) | SelectItem::Wildcard => None,
        }
    }
}

/// A Common Table Expression (WITH clause entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonTableExpr {
    pub name: String,
    pub columns: Vec<String>,
    pub query: Box<Query>,
    /// Recursive CTEs are rejected wherever the analyzer encounters them.
    pub recursive: bool,
}

/// A SQL query, restricted to the fields the foreign-key-join analyzer and
/// its host collaborators need to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub command_kind: CommandKind,

    /// The query's range table: every relation it draws from, in range-table
    /// order.
    pub range_table: Vec<RangeTableEntry>,

    /// The FROM clause. More than one entry means an implicit cross
    /// product; the analyzer's inner-query descent only traverses queries
    /// with exactly one entry here.
    pub from_list: Vec<FromItem>,

    pub target_list: Vec<SelectItem>,

    pub where_quals: Option<Expr>,
    pub having_quals: Option<Expr>,
    pub limit_count: Option<Expr>,
    pub limit_offset: Option<Expr>,

    /// GROUP BY expressions, in clause order.
    pub group_clause: Vec<Expr>,

    pub distinct_clause: bool,
    /// True if the query uses GROUPING SETS / ROLLUP / CUBE.
    pub grouping_sets: bool,
    /// Present if the query's body is a UNION/INTERSECT/EXCEPT rather than a
    /// plain SELECT.
    pub set_operation: Option<SetOpKind>,
    /// True if any target-list expression is a set-returning function call.
    pub has_target_srfs: bool,

    pub cte_list: Vec<CommonTableExpr>,

    pub dialect: Dialect,
}

impl Query {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            command_kind: CommandKind::Select,
            range_table: Vec::new(),
            from_list: Vec::new(),
            target_list: Vec::new(),
            where_quals: None,
            having_quals: None,
            limit_count: None,
            limit_offset: None,
            group_clause: Vec::new(),
            distinct_clause: false,
            grouping_sets: false,
            set_operation: None,
            has_target_srfs: false,
            cte_list: Vec::new(),
            dialect,
        }
    }

    /// Whether this query is shaped the way `drill()` and the inner-query
    /// descent require to even attempt analysis: a plain SELECT, no set
    /// operations, no DISTINCT, no grouping sets, no set-returning target
    /// expressions. GROUP BY itself is tolerated here — its effect on
    /// uniqueness is assessed later by the property tracker.
    pub fn is_drillable(&self) -> bool {
        self.command_kind == CommandKind::Select
            && self.set_operation.is_none()
            && !self.distinct_clause
            && !self.grouping_sets
            && !self.has_target_srfs
    }

    pub fn with_range_table(mut self, range_table: Vec<RangeTableEntry>) -> Self {
        self.range_table = range_table;
        self
    }

    pub fn with_from_list(mut self, from_list: Vec<FromItem>) -> Self {
        self.from_list = from_list;
        self
    }

    pub fn with_target_list(mut self, target_list: Vec<SelectItem>) -> Self {
        self.target_list = target_list;
        self
    }

    pub fn with_where(mut self, expr: Expr) -> Self {
        self.where_quals = Some(expr);
        self
    }

    pub fn with_limit(mut self, limit: Expr) -> Self {
        self.limit_count = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: Expr) -> Self {
        self.limit_offset = Some(offset);
        self
    }

    pub fn with_group_clause(mut self, group_clause: Vec<Expr>) -> Self {
        self.group_clause = group_clause;
        self
    }

    pub fn with_ctes(mut self, ctes: impl IntoIterator<Item = CommonTableExpr>) -> Self {
        self.cte_list = ctes.into_iter().collect();
        self
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new(Dialect::PostgreSQL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_query_is_drillable() {
        let q = Query::new(Dialect::PostgreSQL);
        assert!(q.is_drillable());
    }

    #[test]
    fn distinct_is_not_drillable() {
        let mut q = Query::new(Dialect::PostgreSQL);
        q.distinct_clause = true;
        assert!(!q.is_drillable());
    }

    #[test]
    fn set_operation_is_not_drillable() {
        let mut q = Query::new(Dialect::PostgreSQL);
        q.set_operation = Some(SetOpKind::Union);
        assert!(!q.is_drillable());
    }
}
