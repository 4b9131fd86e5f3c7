// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Column resolution
//!
//! Step 4 of top-level validation (§4.1): resolve each of a foreign-key
//! join side's column names to an attribute position within that side's
//! visible columns. A name absent from the visible list is undefined; a
//! name appearing more than once is ambiguous. Unlike a completion
//! engine's fuzzy suggestions, a foreign-key join's column list is either
//! a valid, unambiguous reference or it is rejected outright.

use fkjoin_ir::{RangeTableEntry, SourcePos};

use crate::error::{FkJoinError, FkJoinResult};
use crate::namespace::Namespace;

/// Resolves column names to attribute positions within one side of a
/// foreign-key-join request.
pub struct ColumnResolver;

impl ColumnResolver {
    /// Resolve `names`, in order, to 1-based attribute positions within
    /// `rte`'s visible columns.
    pub fn resolve(
        namespace: &dyn Namespace,
        rte: &RangeTableEntry,
        names: &[String],
        location: SourcePos,
    ) -> FkJoinResult<Vec<usize>> {
        let columns = namespace.visible_columns(rte);
        names.iter().map(|name| resolve_one(&columns, name, location)).collect()
    }
}

fn resolve_one(columns: &[String], name: &str, location: SourcePos) -> FkJoinResult<usize> {
    let mut matches = columns.iter().enumerate().filter(|(_, candidate)| candidate.as_str() == name);
    let Some((index, _)) = matches.next() else {
        return Err(FkJoinError::undefined_column(name.to_string(), location));
    };
    if matches.next().is_some() {
        return Err(FkJoinError::ambiguous_column(name.to_string(), location));
    }
    Ok(index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fkjoin_catalog::{Catalog, CatalogProbe, StaticCatalog};
    use fkjoin_ir::{ColumnRef, Dialect, Expr, Query, RangeTableEntry as Rte, RelationRef, RteId, SelectItem};

    use crate::namespace::IrNamespace;

    async fn probe() -> Box<dyn CatalogProbe> {
        StaticCatalog::new().preload_probe().await.unwrap()
    }

    #[tokio::test]
    async fn resolves_columns_to_1_based_positions() {
        let rte = Rte::new(RteId::new(0, 0), RelationRef::BaseTable { relid: "t1".to_string() });
        let query = Query::new(Dialect::PostgreSQL);
        let catalog = probe().await;
        let ns = IrNamespace::new(&query, catalog.as_ref());
        let positions =
            ColumnResolver::resolve(&ns, &rte, &["c2".to_string(), "c1".to_string()], SourcePos(0)).unwrap();
        assert_eq!(positions, vec![2, 1]);
    }

    #[tokio::test]
    async fn undefined_column_is_rejected() {
        let rte = Rte::new(RteId::new(0, 0), RelationRef::BaseTable { relid: "t1".to_string() });
        let query = Query::new(Dialect::PostgreSQL);
        let catalog = probe().await;
        let ns = IrNamespace::new(&query, catalog.as_ref());
        let err = ColumnResolver::resolve(&ns, &rte, &["nope".to_string()], SourcePos(4)).unwrap_err();
        assert!(matches!(err, FkJoinError::UndefinedColumn { location, .. } if location == SourcePos(4)));
    }

    #[tokio::test]
    async fn duplicate_visible_name_is_ambiguous() {
        let inner = Query::new(Dialect::PostgreSQL)
            .with_target_list(vec![
                SelectItem::AliasedExpr { expr: Expr::Column(ColumnRef::new("c1")), alias: "x".to_string() },
                SelectItem::AliasedExpr { expr: Expr::Column(ColumnRef::new("c2")), alias: "x".to_string() },
            ]);
        let rte = Rte::new(RteId::new(0, 0), RelationRef::View { underlying_query: Box::new(inner) });
        let query = Query::new(Dialect::PostgreSQL);
        let catalog = probe().await;
        let ns = IrNamespace::new(&query, catalog.as_ref());
        let err = ColumnResolver::resolve(&ns, &rte, &["x".to_string()], SourcePos(2)).unwrap_err();
        assert!(matches!(err, FkJoinError::AmbiguousColumn { location, .. } if location == SourcePos(2)));
    }
}
