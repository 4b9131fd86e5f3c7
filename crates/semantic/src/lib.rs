// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Foreign-key-join semantic analysis
//!
//! This crate resolves a foreign-key-join construct — a join whose `ON`
//! clause names a direction, a local column list, and the alias and
//! column list of the relation it references — against a catalog's
//! actual `FOREIGN KEY` constraints, and rewrites it into a plain
//! equality `ON` clause once it has proven the referenced side keeps
//! every one of its rows and a provably unique key.
//!
//! ## Pipeline
//!
//! [`validator::validate_fk_join`] is the entry point and runs, in
//! order:
//!
//! 1. [`alias_resolution`] — locate the relation named by the request's
//!    alias in the namespace visible at that point.
//! 2. [`resolution`] — resolve each side's column names to attribute
//!    positions, rejecting undefined or ambiguous names.
//! 3. [`drill`] — follow each side's columns down through views,
//!    subqueries, CTE references, join aliases and GROUP BY output rows
//!    to the base table the catalog actually knows about.
//! 4. The catalog ([`fkjoin_catalog::CatalogProbe`]) is asked whether a
//!    `FOREIGN KEY` constraint matches the two drilled-down sides.
//! 5. [`analyzer`] walks each side's own join-tree subtree to derive its
//!    [`properties::UniquenessSet`] and [`properties::FDSet`];
//!    [`properties::combine`] folds the foreign key's own properties in.
//! 6. [`on_clause`] builds and type-checks the replacement equality.
//!
//! [`namespace::Namespace`] and [`on_clause::ExpressionTransformer`] are
//! the two seams a host plugs its own AST and expression services into;
//! [`namespace::IrNamespace`] and [`on_clause::PassthroughTransformer`]
//! are reference implementations driven purely off this crate's own IR,
//! used throughout this crate's own test suite.

pub mod alias_resolution;
pub mod analyzer;
pub mod drill;
pub mod error;
pub mod namespace;
pub mod on_clause;
pub mod properties;
pub mod resolution;
pub mod validator;

pub use alias_resolution::AliasResolver;
pub use analyzer::{analyze_for, analyze_subtree, AnalysisResult};
pub use drill::{drill_down, QueryStack};
pub use error::{FkJoinError, FkJoinResult};
pub use namespace::{IrNamespace, Namespace};
pub use on_clause::{build_on_clause, ExpressionTransformer, PassthroughTransformer};
pub use properties::{combine, CombineInput, FDSet, UniquenessSet};
pub use resolution::ColumnResolver;
pub use validator::validate_fk_join;
