// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Foreign-key-join IR
//!
//! This crate provides the Intermediate Representation consumed by the
//! foreign-key-join analyzer: queries, expressions, range tables and join
//! trees. It is dialect-agnostic and carries no parsing or planning logic —
//! a host parser builds it, and the semantic-analysis crate reads it.

pub mod dialect;
pub mod expr;
pub mod metadata;
pub mod query;
pub mod range_table;

// Re-export commonly used types
pub use dialect::{Dialect, DialectExtensions, DialectFamily};
pub use expr::{BinaryOp, ColumnRef, Expr, Literal, UnaryOp};
pub use metadata::{DataType, TableReference};
pub use query::{CommandKind, CommonTableExpr, Query, SelectItem, SetOpKind};
pub use range_table::{
    ConstraintId, FkDirection, FkJoinRequest, FromItem, JoinCondition, JoinNode, JoinType,
    RangeTableEntry, RelationRef, ResolvedColumnRef, ResolvedFkJoin, RteId, SourcePos,
};
