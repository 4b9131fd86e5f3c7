// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Alias resolution
//!
//! Step 1 of top-level validation (§4.1): locate the relation named by a
//! foreign-key-join request's `ref_alias` among the relations visible at
//! the point the construct appears. Resolution is an exact match against
//! each visible entry's alias — unlike a completion engine guessing at a
//! user's intent, a foreign-key join either names a real, currently
//! visible relation or it doesn't.

use fkjoin_ir::{RangeTableEntry, SourcePos};
use tracing::{debug, instrument};

use crate::error::{FkJoinError, FkJoinResult};
use crate::namespace::Namespace;

/// Resolves a foreign-key-join request's `ref_alias` against a namespace.
pub struct AliasResolver;

impl AliasResolver {
    /// Locate the visible entry whose alias equals `alias`.
    #[instrument(skip(namespace), fields(alias = %alias))]
    pub fn resolve<'a>(
        namespace: &'a dyn Namespace,
        alias: &str,
        location: SourcePos,
    ) -> FkJoinResult<&'a RangeTableEntry> {
        debug!("resolving foreign-key-join alias");
        match namespace.find_by_alias(alias) {
            Some(rte) => {
                debug!(rte_id = ?rte.id, "alias resolved");
                Ok(rte)
            }
            None => {
                debug!("alias not found in visible namespace");
                Err(FkJoinError::undefined_table(alias.to_string(), location))
            }
        }
    }
}
