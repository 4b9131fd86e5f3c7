// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog traits for database schema abstraction
//!
//! This module defines two traits over the same underlying schema:
//!
//! - [`Catalog`] is the async, I/O-capable view used to browse schema —
//!   list tables, fetch columns. A live database-backed implementation
//!   talks to the network here.
//! - [`CatalogProbe`] is the synchronous, side-effect-free view the
//!   foreign-key-join analyzer reads during a single analysis pass: find a
//!   matching FK constraint, test whether a column set is covered by a
//!   unique index, test NOT-NULL-ness, test row-level security. These are
//!   pure functions of the catalog state at analysis time, so a live
//!   catalog snapshots itself into a [`CatalogProbe`] once up front
//!   (`preload`) rather than making the analyzer itself async.
use crate::error::CatalogResult;
use crate::metadata::{ColumnMetadata, ForeignKeyMeta, TableMetadata};
use fkjoin_ir::TableReference;

/// Catalog trait for database schema abstraction
///
/// This trait provides an async interface for querying database schema information.
/// Implementations can connect to live databases, read from static files, or use caches.
///
/// # Examples
///
/// ```rust,ignore
/// use fkjoin_catalog::{Catalog, CatalogError};
///
/// async fn list_user_tables(catalog: &impl Catalog) -> Result<Vec<String>, CatalogError> {
///     let tables = catalog.list_tables().await?;
///     Ok(tables.into_iter()
///         .filter(|t| t.schema == "users")
///         .map(|t| t.name)
///         .collect())
/// }
/// ```
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// List all tables in the database
    ///
    /// Returns metadata for all tables accessible to the current connection.
    /// This includes base tables, views, and materialized views.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConnectionFailed` if database connection fails.
    /// Returns `CatalogError::QueryTimeout` if the query exceeds timeout.
    async fn list_tables(&self) -> CatalogResult<Vec<TableMetadata>>;

    /// Get column metadata for a specific table
    ///
    /// # Arguments
    ///
    /// * `table` - Table name (may include schema qualifier like "schema.table")
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::TableNotFound` if the table doesn't exist.
    /// Returns `CatalogError::PermissionDenied` if access is denied.
    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnMetadata>>;

    /// Snapshot the catalog state needed by the foreign-key-join analyzer
    /// into a [`CatalogProbe`]. Implementations that already hold their
    /// state in memory ([`crate::static::StaticCatalog`]) can make this a
    /// cheap clone; a live connection pool instead runs the constraint,
    /// index and RLS queries once and hands back an immutable snapshot.
    async fn preload_probe(&self) -> CatalogResult<Box<dyn CatalogProbe>>;
}

/// The catalog services the foreign-key-join analyzer reads. Each method is
/// a pure function of the catalog state as of the start of analysis — no
/// I/O, no mutation, safe to call repeatedly within one query's analysis.
pub trait CatalogProbe: Send + Sync {
    /// Returns the identifier of a FOREIGN KEY constraint on
    /// `referencing_relid` whose target is `referenced_relid` and whose
    /// `(conkey, confkey)` pair-set equals the supplied attnum pairs
    /// (pairwise, order-insensitive across pairs, order-sensitive within a
    /// pair).
    fn find_fk(
        &self,
        referencing_relid: &str,
        referenced_relid: &str,
        referencing_attnums: &[usize],
        referenced_attnums: &[usize],
    ) -> Option<ForeignKeyMeta>;

    /// True iff some unique index on `relid` has exactly `attnums` as its
    /// key-column set (order irrelevant).
    fn cols_unique(&self, relid: &str, attnums: &[usize]) -> bool;

    /// True iff every column named by `attnums` carries a NOT NULL marker.
    fn cols_not_null(&self, relid: &str, attnums: &[usize]) -> bool;

    /// True iff some unique index's key columns are a superset of
    /// `attnums`.
    fn covered_by_unique_index(&self, relid: &str, attnums: &[usize]) -> bool;

    /// True iff row-level security is enabled on `relid`.
    fn row_security_enabled(&self, relid: &str) -> bool;

    /// Look up table metadata by relation identifier, for resolving column
    /// names to attribute positions.
    fn table(&self, relid: &str) -> Option<&TableMetadata>;
}

/// Test whether two reference tables are paired equivalently, order
/// insensitive across pairs but order-sensitive within a pair — the rule
/// `find_fk` uses to compare `(conkey, confkey)` against the requested
/// attnum pairs.
pub fn pairs_match(
    a_referencing: &[usize],
    a_referenced: &[usize],
    b_referencing: &[usize],
    b_referenced: &[usize],
) -> bool {
    if a_referencing.len() != b_referencing.len() || a_referenced.len() != b_referenced.len() {
        return false;
    }
    let a: std::collections::HashSet<(usize, usize)> = a_referencing
        .iter()
        .copied()
        .zip(a_referenced.iter().copied())
        .collect();
    let b: std::collections::HashSet<(usize, usize)> = b_referencing
        .iter()
        .copied()
        .zip(b_referenced.iter().copied())
        .collect();
    a == b
}
