// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Foreign-key-join catalog layer
//!
//! This crate provides the database schema abstraction the foreign-key-join
//! analyzer reads. It defines two traits over the same schema:
//!
//! - [`Catalog`]: the async, I/O-capable view used to browse schema (list
//!   tables, fetch columns). A live database connection implements this.
//! - [`CatalogProbe`]: the synchronous, side-effect-free view the analyzer
//!   itself reads during a single pass — find a matching FK constraint,
//!   test unique-index coverage, test NOT-NULL-ness, test row-level
//!   security.
//!
//! [`StaticCatalog`] is an in-memory catalog for tests and the scenario
//! schema used throughout this crate's test suite. [`LivePostgreSQLCatalog`]
//! connects to a real PostgreSQL database and snapshots the facts above from
//! `pg_constraint`/`pg_index`/`pg_attribute`/`pg_class`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fkjoin_catalog::{Catalog, CatalogError};
//!
//! async fn print_tables(catalog: &impl Catalog) -> Result<(), CatalogError> {
//!     let tables = catalog.list_tables().await?;
//!     for table in tables {
//!         println!("{}.{}", table.schema, table.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod live_postgres;
pub mod metadata;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use error::{CatalogError, CatalogResult};
pub use live_postgres::LivePostgreSQLCatalog;
pub use metadata::{ColumnMetadata, ForeignKeyMeta, TableMetadata, TableType, UniqueIndexMeta};
pub use r#static::{PreloadedCatalogProbe, StaticCatalog};
pub use r#trait::{Catalog, CatalogProbe, pairs_match};
