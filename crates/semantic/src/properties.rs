// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Property tracker
//!
//! The join-tree analyzer needs two facts about a subtree: which base
//! relations still have unique keys after every join applied so far
//! (`UniquenessSet`), and which relations functionally determine which
//! others (`FDSet`) — in particular, which relations still have all of
//! their original rows (`(r, r) ∈ FDSet`). [`combine`] is the rule that
//! derives both for one more join, given the two children's sets and the
//! facts about the foreign key bridging them.

use std::collections::HashSet;

use fkjoin_ir::{FkDirection, JoinType, RteId};

/// Base relations whose tuples are still unique in the analyzed subtree.
pub type UniquenessSet = HashSet<RteId>;

/// Ordered pairs `(det, dep)`: "`det` functionally determines `dep`" in
/// the analyzed subtree. Logically a multiset — duplicate pairs carry no
/// extra meaning — represented here as a set; callers must not rely on
/// any particular multiplicity surviving a round of [`combine`].
pub type FDSet = HashSet<(RteId, RteId)>;

/// Everything [`combine`] needs to derive the combined property sets for
/// one join node.
pub struct CombineInput<'a> {
    pub u_ing: &'a UniquenessSet,
    pub fd_ing: &'a FDSet,
    pub u_ed: &'a UniquenessSet,
    pub fd_ed: &'a FDSet,
    /// The referencing side's original `RteId`, before this join.
    pub referencing_id: RteId,
    /// The referenced side's original `RteId`, before this join.
    pub referenced_id: RteId,
    /// Whether the foreign-key columns on the referencing side are
    /// themselves a unique key (a one-to-one join).
    pub fk_unique: bool,
    /// Whether the foreign-key columns on the referencing side are all
    /// NOT NULL.
    pub fk_not_null: bool,
    pub join_type: JoinType,
    pub fk_dir: FkDirection,
}

/// Derive the combined `UniquenessSet` and `FDSet` for a join node from
/// its two children's sets.
pub fn combine(input: CombineInput<'_>) -> (UniquenessSet, FDSet) {
    let mut u: UniquenessSet = input.u_ing.clone();
    if input.fk_unique {
        u.extend(input.u_ed.iter().copied());
    }

    let mut fd: FDSet = FDSet::new();

    let preserves_referencing = matches!(
        (input.fk_dir, input.join_type),
        (FkDirection::From, JoinType::Left) | (FkDirection::To, JoinType::Right) | (_, JoinType::Full)
    );
    if preserves_referencing {
        fd.extend(input.fd_ing.iter().copied());
    }

    let preserves_referenced = matches!(
        (input.fk_dir, input.join_type),
        (FkDirection::To, JoinType::Left) | (FkDirection::From, JoinType::Right) | (_, JoinType::Full)
    );
    if preserves_referenced {
        fd.extend(input.fd_ed.iter().copied());
    }

    if !input.fk_not_null {
        return (u, fd);
    }
    if !input
        .fd_ed
        .contains(&(input.referenced_id, input.referenced_id))
    {
        return (u, fd);
    }

    if !preserves_referencing {
        for &(det, dep) in input.fd_ing {
            if dep != input.referencing_id {
                continue;
            }
            for &(det2, dep2) in input.fd_ing {
                if det2 == det {
                    fd.insert((det2, dep2));
                }
            }
        }
    }

    for &(x, dep) in input.fd_ing {
        if dep != input.referencing_id {
            continue;
        }
        for &(det_ed, z) in input.fd_ed {
            if det_ed == input.referenced_id {
                fd.insert((x, z));
            }
        }
    }

    (u, fd)
}
