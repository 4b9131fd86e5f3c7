// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Error categories for foreign-key-join analysis
//!
//! Every failure the analyzer can raise falls into one of six stable
//! categories. Each carries the source-position token of the FK-join
//! construct that failed, so the host can point a diagnostic at the right
//! place in the original query text.

use fkjoin_ir::SourcePos;
use thiserror::Error;

/// Result type alias for foreign-key-join analysis.
pub type FkJoinResult<T> = Result<T, FkJoinError>;

/// Stable error categories raised by the foreign-key-join analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FkJoinError {
    /// Alias not found in the visible namespace, or join-alias/GROUP BY
    /// columns resolve to more than one inner relation.
    #[error("relation \"{name}\" does not exist")]
    UndefinedTable { name: String, location: SourcePos },

    /// Named column absent from the named side's visible columns.
    #[error("column \"{name}\" does not exist")]
    UndefinedColumn { name: String, location: SourcePos },

    /// A named column appears more than once in a side's visible columns.
    #[error("column reference \"{name}\" is ambiguous")]
    AmbiguousColumn { name: String, location: SourcePos },

    /// Column-list arity mismatch, or the referenced side fails one of the
    /// two preservation guarantees.
    #[error("invalid foreign key: {reason}")]
    InvalidForeignKey { reason: String, location: SourcePos },

    /// No FOREIGN KEY constraint matches the requested relations and
    /// column pairs.
    #[error(
        "no foreign-key constraint matches {referencing}({referencing_cols}) references {referenced}({referenced_cols})"
    )]
    UndefinedObject {
        referencing: String,
        referencing_cols: String,
        referenced: String,
        referenced_cols: String,
        location: SourcePos,
    },

    /// An unsupported relation kind, construct, or join-tree shape was
    /// encountered.
    #[error("{reason}")]
    FeatureNotSupported { reason: String, location: SourcePos },
}

impl FkJoinError {
    /// The source-position token every variant carries.
    pub fn location(&self) -> SourcePos {
        match self {
            FkJoinError::UndefinedTable { location, .. }
            | FkJoinError::UndefinedColumn { location, .. }
            | FkJoinError::AmbiguousColumn { location, .. }
            | FkJoinError::InvalidForeignKey { location, .. }
            | FkJoinError::UndefinedObject { location, .. }
            | FkJoinError::FeatureNotSupported { location, .. } => *location,
        }
    }

    pub fn undefined_table(name: impl Into<String>, location: SourcePos) -> Self {
        FkJoinError::UndefinedTable {
            name: name.into(),
            location,
        }
    }

    pub fn undefined_column(name: impl Into<String>, location: SourcePos) -> Self {
        FkJoinError::UndefinedColumn {
            name: name.into(),
            location,
        }
    }

    pub fn ambiguous_column(name: impl Into<String>, location: SourcePos) -> Self {
        FkJoinError::AmbiguousColumn {
            name: name.into(),
            location,
        }
    }

    pub fn invalid_foreign_key(reason: impl Into<String>, location: SourcePos) -> Self {
        FkJoinError::InvalidForeignKey {
            reason: reason.into(),
            location,
        }
    }

    pub fn undefined_object(
        referencing: impl Into<String>,
        referencing_cols: &[String],
        referenced: impl Into<String>,
        referenced_cols: &[String],
        location: SourcePos,
    ) -> Self {
        FkJoinError::UndefinedObject {
            referencing: referencing.into(),
            referencing_cols: referencing_cols.join(", "),
            referenced: referenced.into(),
            referenced_cols: referenced_cols.join(", "),
            location,
        }
    }

    pub fn feature_not_supported(reason: impl Into<String>, location: SourcePos) -> Self {
        FkJoinError::FeatureNotSupported {
            reason: reason.into(),
            location,
        }
    }
}
