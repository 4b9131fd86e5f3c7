// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for database schema information
//!
//! This module defines the types used to represent database schema
//! metadata: tables, columns, and the constraint/index facts the
//! foreign-key-join analyzer's catalog probe reads. Shared scalar types
//! ([`DataType`], [`TableReference`]) live in the IR crate so that a
//! relation's column types and a catalog's column types are the same
//! type.

use serde::{Deserialize, Serialize};
use fkjoin_ir::{DataType, TableReference};

/// Table type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    Table,
    View,
    MaterializedView,
    Temporary,
    System,
}

/// Metadata for a database column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Whether the column is nullable
    pub nullable: bool,
    /// Default value (as SQL expression string)
    pub default_value: Option<String>,
    /// Column comment/description
    pub comment: Option<String>,
    /// Whether this is a primary key column
    pub is_primary_key: bool,
    /// Whether this is a foreign key column
    pub is_foreign_key: bool,
    /// Referenced table (if foreign key)
    pub references: Option<TableReference>,
}

impl ColumnMetadata {
    /// Create a new column metadata with builder pattern
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            default_value: None,
            comment: None,
            is_primary_key: false,
            is_foreign_key: false,
            references: None,
        }
    }

    /// Builder method: set nullable
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: set default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder method: mark as primary key
    pub fn with_primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Builder method: set foreign key reference
    pub fn with_foreign_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.is_foreign_key = true;
        self.references = Some(TableReference {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// A single FOREIGN KEY constraint, as the catalog probe sees it: one
/// `conrelid`/`confrelid` pair plus the ordered attribute-position lists
/// that pair up referencing and referenced columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyMeta {
    pub name: String,
    pub referencing_table: String,
    /// 1-based attribute positions in `referencing_table`, `conkey`.
    pub referencing_attnums: Vec<usize>,
    pub referenced_table: String,
    /// 1-based attribute positions in `referenced_table`, `confkey`,
    /// paired index-for-index with `referencing_attnums`.
    pub referenced_attnums: Vec<usize>,
}

/// A single unique index (or the unique constraint backing a primary
/// key), recorded as its key-column attribute-position set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIndexMeta {
    pub name: String,
    /// 1-based attribute positions making up the index key. Order is
    /// not significant for the uniqueness checks the probe performs.
    pub key_attnums: Vec<usize>,
}

/// Metadata for a database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name
    pub name: String,
    /// Schema/database name
    pub schema: String,
    /// Column definitions, in attribute-number order (1-based: column
    /// `i` in this vec is attnum `i + 1`).
    pub columns: Vec<ColumnMetadata>,
    /// Estimated row count (for query planning)
    pub row_count_estimate: Option<u64>,
    /// Table comment/description
    pub comment: Option<String>,
    /// Table type (TABLE, VIEW, MATERIALIZED VIEW, etc.)
    pub table_type: TableType,
    /// FOREIGN KEY constraints for which this table is the referencing
    /// side.
    pub foreign_keys: Vec<ForeignKeyMeta>,
    /// Unique indexes (including the one backing a primary key).
    pub unique_indexes: Vec<UniqueIndexMeta>,
    /// Whether row-level security is enabled on this table. An enabled
    /// policy means the catalog probe cannot vouch for row preservation
    /// at this leaf.
    pub row_security_enabled: bool,
}

impl TableMetadata {
    /// Create new table metadata with builder pattern
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            columns: Vec::new(),
            row_count_estimate: None,
            comment: None,
            table_type: TableType::Table,
            foreign_keys: Vec::new(),
            unique_indexes: Vec::new(),
            row_security_enabled: false,
        }
    }

    /// Builder method: add columns
    pub fn with_columns(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.columns = columns;
        self
    }

    /// Builder method: set row count estimate
    pub fn with_row_count(mut self, count: u64) -> Self {
        self.row_count_estimate = Some(count);
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder method: set table type
    pub fn with_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    /// Builder method: add foreign-key constraints
    pub fn with_foreign_keys(mut self, fks: Vec<ForeignKeyMeta>) -> Self {
        self.foreign_keys = fks;
        self
    }

    /// Builder method: add unique indexes
    pub fn with_unique_indexes(mut self, indexes: Vec<UniqueIndexMeta>) -> Self {
        self.unique_indexes = indexes;
        self
    }

    /// Builder method: enable row-level security
    pub fn with_row_security(mut self, enabled: bool) -> Self {
        self.row_security_enabled = enabled;
        self
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get primary key columns
    pub fn primary_keys(&self) -> Vec<&ColumnMetadata> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    /// 1-based attribute position of a column by name, if present.
    pub fn attnum_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name).map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_get_column() {
        let col1 = ColumnMetadata::new("id", DataType::Integer);
        let col2 = ColumnMetadata::new("name", DataType::Text);

        let table = TableMetadata::new("users", "public").with_columns(vec![col1, col2]);

        assert!(table.get_column("id").is_some());
        assert!(table.get_column("name").is_some());
        assert!(table.get_column("email").is_none());
    }

    #[test]
    fn test_table_primary_keys() {
        let col1 = ColumnMetadata::new("id", DataType::Integer).with_primary_key();
        let col2 = ColumnMetadata::new("user_id", DataType::Integer).with_primary_key();
        let col3 = ColumnMetadata::new("name", DataType::Text);

        let table = TableMetadata::new("user_roles", "public").with_columns(vec![col1, col2, col3]);

        let pks = table.primary_keys();
        assert_eq!(pks.len(), 2);
        assert_eq!(pks[0].name, "id");
        assert_eq!(pks[1].name, "user_id");
    }

    #[test]
    fn test_attnum_of() {
        let table = TableMetadata::new("t1", "public").with_columns(vec![
            ColumnMetadata::new("c1", DataType::Integer),
            ColumnMetadata::new("c2", DataType::Text),
        ]);

        assert_eq!(table.attnum_of("c1"), Some(1));
        assert_eq!(table.attnum_of("c2"), Some(2));
        assert_eq!(table.attnum_of("c3"), None);
    }

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::Integer, DataType::Integer);
        assert_eq!(DataType::Varchar(Some(255)), DataType::Varchar(Some(255)));
        assert_ne!(DataType::Varchar(Some(100)), DataType::Varchar(Some(255)));
    }

    #[test]
    fn test_data_type_serialization() {
        let dt = DataType::Varchar(Some(255));
        let json = serde_json::to_string(&dt).unwrap();
        let deserialized: DataType = serde_json::from_str(&json).unwrap();
        assert_eq!(dt, deserialized);
    }

    #[test]
    fn test_json_roundtrip() {
        let col = ColumnMetadata::new("data", DataType::Json)
            .with_nullable(true)
            .with_comment("JSON payload");

        let json = serde_json::to_string(&col).unwrap();
        let deserialized: ColumnMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(col, deserialized);
    }

    #[test]
    fn test_table_type_variants() {
        assert_eq!(TableType::Table, TableType::Table);
        assert_eq!(TableType::View, TableType::View);
        assert_ne!(TableType::Table, TableType::View);
    }

    #[test]
    fn test_foreign_key_meta_roundtrip() {
        let fk = ForeignKeyMeta {
            name: "t2_c3_fkey".to_string(),
            referencing_table: "t2".to_string(),
            referencing_attnums: vec![1],
            referenced_table: "t1".to_string(),
            referenced_attnums: vec![1],
        };
        let json = serde_json::to_string(&fk).unwrap();
        let deserialized: ForeignKeyMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(fk, deserialized);
    }
}
