// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! This module provides a static catalog implementation that uses predefined schema data.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fkjoin_catalog::StaticCatalog;
//!
//! let catalog = StaticCatalog::new();
//! let tables = catalog.list_tables().await?;
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::metadata::{ColumnMetadata, ForeignKeyMeta, TableMetadata, UniqueIndexMeta};
use crate::r#trait::{CatalogProbe, pairs_match};
use crate::{Catalog, CatalogError, CatalogResult};
use fkjoin_ir::DataType;

/// Static catalog with predefined schema data
///
/// This is used for the playground and testing without requiring a real database.
pub struct StaticCatalog {
    tables: HashMap<String, TableMetadata>,
}

impl StaticCatalog {
    /// Create a new static catalog with default playground schema
    pub fn new() -> Self {
        let mut tables = HashMap::new();

        // Users table
        tables.insert(
            "users".to_string(),
            TableMetadata::new("users", "playground")
                .with_columns(vec![
                    ColumnMetadata::new("id", DataType::Integer)
                        .with_primary_key()
                        .with_default("AUTO_INCREMENT"),
                    ColumnMetadata::new("name", DataType::Varchar(Some(100)))
                        .with_comment("User name"),
                    ColumnMetadata::new("email", DataType::Varchar(Some(255)))
                        .with_comment("User email address"),
                    ColumnMetadata::new("created_at", DataType::Timestamp)
                        .with_nullable(true)
                        .with_default("CURRENT_TIMESTAMP")
                        .with_comment("Account creation timestamp"),
                ])
                .with_row_count(3)
                .with_comment("User accounts table")
                .with_unique_indexes(vec![UniqueIndexMeta {
                    name: "users_pkey".to_string(),
                    key_attnums: vec![1],
                }]),
        );

        // Orders table
        tables.insert(
            "orders".to_string(),
            TableMetadata::new("orders", "playground")
                .with_columns(vec![
                    ColumnMetadata::new("id", DataType::Integer)
                        .with_primary_key()
                        .with_default("AUTO_INCREMENT"),
                    ColumnMetadata::new("user_id", DataType::Integer)
                        .with_foreign_key("users", "id")
                        .with_comment("Foreign key to users.id"),
                    ColumnMetadata::new("total", DataType::Decimal)
                        .with_comment("Order total amount"),
                    ColumnMetadata::new("status", DataType::Varchar(Some(20)))
                        .with_nullable(true)
                        .with_default("'pending'")
                        .with_comment("Order status"),
                    ColumnMetadata::new("created_at", DataType::Timestamp)
                        .with_nullable(true)
                        .with_default("CURRENT_TIMESTAMP")
                        .with_comment("Order creation timestamp"),
                ])
                .with_row_count(3)
                .with_comment("Customer orders table")
                .with_unique_indexes(vec![UniqueIndexMeta {
                    name: "orders_pkey".to_string(),
                    key_attnums: vec![1],
                }])
                .with_foreign_keys(vec![ForeignKeyMeta {
                    name: "orders_user_id_fkey".to_string(),
                    referencing_table: "orders".to_string(),
                    referencing_attnums: vec![2],
                    referenced_table: "users".to_string(),
                    referenced_attnums: vec![1],
                }]),
        );

        // Order items table
        tables.insert(
            "order_items".to_string(),
            TableMetadata::new("order_items", "playground")
                .with_columns(vec![
                    ColumnMetadata::new("id", DataType::Integer)
                        .with_primary_key()
                        .with_default("AUTO_INCREMENT"),
                    ColumnMetadata::new("order_id", DataType::Integer)
                        .with_foreign_key("orders", "id")
                        .with_comment("Foreign key to orders.id"),
                    ColumnMetadata::new("product_name", DataType::Varchar(Some(255)))
                        .with_comment("Product name"),
                    ColumnMetadata::new("quantity", DataType::Integer).with_comment("Item quantity"),
                    ColumnMetadata::new("price", DataType::Decimal).with_comment("Item price"),
                ])
                .with_row_count(4)
                .with_comment("Order line items table")
                .with_unique_indexes(vec![UniqueIndexMeta {
                    name: "order_items_pkey".to_string(),
                    key_attnums: vec![1],
                }])
                .with_foreign_keys(vec![ForeignKeyMeta {
                    name: "order_items_order_id_fkey".to_string(),
                    referencing_table: "order_items".to_string(),
                    referencing_attnums: vec![2],
                    referenced_table: "orders".to_string(),
                    referenced_attnums: vec![1],
                }]),
        );

        // t1(c1 PK, c2), t2(c3 PK REFERENCES t1(c1), c4) — the scenario
        // schema used throughout the foreign-key-join test suite.
        tables.insert(
            "t1".to_string(),
            TableMetadata::new("t1", "playground")
                .with_columns(vec![
                    ColumnMetadata::new("c1", DataType::Integer).with_primary_key(),
                    ColumnMetadata::new("c2", DataType::Integer),
                ])
                .with_unique_indexes(vec![UniqueIndexMeta {
                    name: "t1_pkey".to_string(),
                    key_attnums: vec![1],
                }]),
        );

        tables.insert(
            "t2".to_string(),
            TableMetadata::new("t2", "playground")
                .with_columns(vec![
                    ColumnMetadata::new("c3", DataType::Integer)
                        .with_primary_key()
                        .with_foreign_key("t1", "c1"),
                    ColumnMetadata::new("c4", DataType::Integer),
                ])
                .with_unique_indexes(vec![UniqueIndexMeta {
                    name: "t2_pkey".to_string(),
                    key_attnums: vec![1],
                }])
                .with_foreign_keys(vec![ForeignKeyMeta {
                    name: "t2_c3_fkey".to_string(),
                    referencing_table: "t2".to_string(),
                    referencing_attnums: vec![1],
                    referenced_table: "t1".to_string(),
                    referenced_attnums: vec![1],
                }]),
        );

        Self { tables }
    }

    /// Load static catalog from SQL file
    ///
    /// For now, this just returns the default catalog.
    /// TODO: parse the SQL file and extract schema information.
    pub fn from_file(_path: &str) -> Result<Self, CatalogError> {
        Ok(Self::new())
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn list_tables(&self) -> CatalogResult<Vec<TableMetadata>> {
        Ok(self.tables.values().cloned().collect())
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnMetadata>> {
        self.tables
            .get(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| {
                CatalogError::TableNotFound(
                    format!("Table '{}' not found in static catalog", table),
                    "playground".to_string(),
                )
            })
    }

    async fn preload_probe(&self) -> CatalogResult<Box<dyn CatalogProbe>> {
        Ok(Box::new(PreloadedCatalogProbe {
            tables: Arc::new(self.tables.clone()),
        }))
    }
}

/// An immutable, in-memory snapshot of the FK/index/RLS facts a
/// foreign-key-join analysis pass reads. Shared behind an `Arc` so cloning
/// the snapshot for a probe is cheap.
#[derive(Clone)]
pub struct PreloadedCatalogProbe {
    tables: Arc<HashMap<String, TableMetadata>>,
}

impl PreloadedCatalogProbe {
    pub fn new(tables: HashMap<String, TableMetadata>) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }
}

impl CatalogProbe for PreloadedCatalogProbe {
    fn find_fk(
        &self,
        referencing_relid: &str,
        referenced_relid: &str,
        referencing_attnums: &[usize],
        referenced_attnums: &[usize],
    ) -> Option<ForeignKeyMeta> {
        let table = self.tables.get(referencing_relid)?;
        table
            .foreign_keys
            .iter()
            .find(|fk| {
                fk.referenced_table == referenced_relid
                    && pairs_match(
                        &fk.referencing_attnums,
                        &fk.referenced_attnums,
                        referencing_attnums,
                        referenced_attnums,
                    )
            })
            .cloned()
    }

    fn cols_unique(&self, relid: &str, attnums: &[usize]) -> bool {
        let Some(table) = self.tables.get(relid) else {
            return false;
        };
        let requested: std::collections::HashSet<usize> = attnums.iter().copied().collect();
        table.unique_indexes.iter().any(|idx| {
            let key: std::collections::HashSet<usize> = idx.key_attnums.iter().copied().collect();
            key == requested
        })
    }

    fn cols_not_null(&self, relid: &str, attnums: &[usize]) -> bool {
        let Some(table) = self.tables.get(relid) else {
            return false;
        };
        attnums.iter().all(|&attnum| {
            table
                .columns
                .get(attnum - 1)
                .map(|c| !c.nullable)
                .unwrap_or(false)
        })
    }

    fn covered_by_unique_index(&self, relid: &str, attnums: &[usize]) -> bool {
        let Some(table) = self.tables.get(relid) else {
            return false;
        };
        let requested: std::collections::HashSet<usize> = attnums.iter().copied().collect();
        table.unique_indexes.iter().any(|idx| {
            let key: std::collections::HashSet<usize> = idx.key_attnums.iter().copied().collect();
            requested.is_subset(&key)
        })
    }

    fn row_security_enabled(&self, relid: &str) -> bool {
        self.tables
            .get(relid)
            .map(|t| t.row_security_enabled)
            .unwrap_or(false)
    }

    fn table(&self, relid: &str) -> Option<&TableMetadata> {
        self.tables.get(relid)
    }
}
