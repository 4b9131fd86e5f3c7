// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # ON-clause builder
//!
//! Step 9 of top-level validation (§4.6): once a foreign-key-join
//! request has been proven sound, its `ON` clause is synthesized rather
//! than parsed — one equality per paired column, conjoined with `AND`
//! when the key is composite, then handed to the host's expression
//! transformer for the same type-checking and boolean coercion an
//! ordinary parsed `ON` clause would receive.

use fkjoin_ir::{BinaryOp, Expr, ResolvedColumnRef, SourcePos};

use crate::error::{FkJoinError, FkJoinResult};

/// Host-opaque expression services (§6): type-checking and coercion for
/// a synthesized expression, the same way the host would type-check one
/// parsed from source text.
pub trait ExpressionTransformer {
    /// Type-check `expr` and coerce it to boolean, the way a parsed `ON`
    /// clause would be. Returns the (possibly wrapped) checked
    /// expression, or an error if `expr` cannot be used as a join
    /// condition.
    fn check_boolean(&self, expr: &Expr) -> FkJoinResult<Expr>;
}

/// An [`ExpressionTransformer`] that performs no type-checking, returning
/// its input unchanged. Suitable for tests and for hosts whose AST
/// service already guarantees the synthesized expression is well-typed.
pub struct PassthroughTransformer;

impl ExpressionTransformer for PassthroughTransformer {
    fn check_boolean(&self, expr: &Expr) -> FkJoinResult<Expr> {
        Ok(expr.clone())
    }
}

/// Build and type-check the `ON` clause for a resolved foreign-key join.
///
/// `referencing_attnums` and `referenced_attnums` must be the same
/// length and already in corresponding order — the caller (the
/// top-level validator) is responsible for that pairing.
pub fn build_on_clause(
    transformer: &dyn ExpressionTransformer,
    referencing_rt_index: usize,
    referencing_attnums: &[usize],
    referenced_rt_index: usize,
    referenced_attnums: &[usize],
    location: SourcePos,
) -> FkJoinResult<Expr> {
    let pairs: Vec<Expr> = referencing_attnums
        .iter()
        .zip(referenced_attnums.iter())
        .map(|(&l, &r)| equality(referencing_rt_index, l, referenced_rt_index, r))
        .collect();

    let combined = pairs.into_iter().reduce(conjoin).ok_or_else(|| {
        FkJoinError::invalid_foreign_key("foreign key has no columns to join on".to_string(), location)
    })?;

    transformer.check_boolean(&combined)
}

fn equality(left_rt: usize, left_attnum: usize, right_rt: usize, right_attnum: usize) -> Expr {
    Expr::BinaryOp {
        left: Box::new(Expr::ResolvedColumn(ResolvedColumnRef::new(left_rt, left_attnum))),
        op: BinaryOp::Eq,
        right: Box::new(Expr::ResolvedColumn(ResolvedColumnRef::new(right_rt, right_attnum))),
    }
}

fn conjoin(acc: Expr, next: Expr) -> Expr {
    Expr::BinaryOp { left: Box::new(acc), op: BinaryOp::And, right: Box::new(next) }
}
