// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Shared metadata types
//!
//! Types shared between the IR and the catalog layer: SQL data types and
//! the cross-table reference used by foreign-key metadata.

use serde::{Deserialize, Serialize};

/// SQL data types (unified across dialects)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DataType {
    // Numeric types
    Integer,
    BigInt,
    SmallInt,
    TinyInt,
    Decimal,
    Float,
    Double,

    // String types
    Varchar(Option<usize>),
    Char(Option<usize>),
    Text,

    // Binary types
    Binary,
    VarBinary(Option<usize>),
    Blob,

    // Date/Time types
    Date,
    Time,
    DateTime,
    Timestamp,

    // Boolean
    Boolean,

    // JSON
    Json,

    // Special types
    Uuid,
    Enum(Vec<String>),
    Array(Box<DataType>),

    // Unknown/Other (with original type name)
    Other(String),
}

/// Reference to a table and column (used by foreign-key metadata)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableReference {
    pub table: String,
    pub column: String,
}
